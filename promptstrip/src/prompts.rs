//! Execution-task template wrapped around every completion call.
//!
//! The oracle is never asked to judge a prompt; it is asked to *act on* it and
//! produce a short sample response. Baseline and candidate prompts go through
//! the exact same wrapper so their outputs are comparable.

/// Opening segment shared by both template shapes.
pub const EXECUTION_TASK_INTRO: &str = "Below are instructions for an AI assistant. \
Imagine you are that assistant. Produce a SHORT sample response (2-3 sentences) ";

/// Default stand-in question when the caller supplies no user input.
pub const EXECUTION_TASK_DEFAULT_INPUT: &str =
    "as you would reply to a user asking 'What can you help me with?' ";

/// Segment used instead of the default question when user input is supplied.
pub const EXECUTION_TASK_WITH_INPUT: &str =
    "The user has sent you the following input. Respond to it. ";

/// Closing segment before the candidate prompt text.
pub const EXECUTION_TASK_OUTRO: &str = "Follow the instructions exactly.\n\n---\n\n";

/// Wraps a candidate prompt in the execution task, optionally appending the
/// user input the prompt should respond to.
pub fn build_execution_task(prompt_text: &str, user_input: Option<&str>) -> String {
    match user_input {
        Some(input) => format!(
            "{EXECUTION_TASK_INTRO}{EXECUTION_TASK_WITH_INPUT}{EXECUTION_TASK_OUTRO}{prompt_text}\n\nUser input:\n{input}"
        ),
        None => format!(
            "{EXECUTION_TASK_INTRO}{EXECUTION_TASK_DEFAULT_INPUT}{EXECUTION_TASK_OUTRO}{prompt_text}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Without user input, the default question is used and no
    /// "User input:" section appears.
    #[test]
    fn default_shape_without_user_input() {
        let task = build_execution_task("Be concise.", None);
        assert!(task.contains("What can you help me with?"));
        assert!(task.contains("Be concise."));
        assert!(!task.contains("User input:"));
    }

    /// **Scenario**: With user input, the input section is appended and the
    /// default question is absent.
    #[test]
    fn input_shape_appends_user_input() {
        let task = build_execution_task("Summarize briefly.", Some("The document to summarize."));
        assert!(task.contains("User input:\nThe document to summarize."));
        assert!(task.contains("Summarize briefly."));
        assert!(!task.contains("What can you help me with?"));
    }

    /// **Scenario**: The candidate prompt sits after the separator line.
    #[test]
    fn prompt_follows_separator() {
        let task = build_execution_task("Always use bullet points.", None);
        let separator_at = task.find("---\n\n").expect("separator present");
        let prompt_at = task.find("Always use bullet points.").expect("prompt present");
        assert!(prompt_at > separator_at);
    }
}
