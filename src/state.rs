//! Conversation state threaded through the pipeline.
//!
//! A `ConversationState` is a value, not shared storage: every update method
//! consumes the state and returns a new one with the change applied. Stages
//! only ever append messages; nothing in the crate removes or reorders
//! entries once they are in the transcript.

use serde::{Deserialize, Serialize};

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The end user's request
    Human,
    /// A pipeline stage speaking on behalf of the agent
    Assistant,
}

/// A single transcript entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Author of the entry
    pub role: Role,

    /// Entry text
    pub content: String,
}

/// State passed between the generation and evaluation stages.
///
/// The transcript is append-only and insertion order is conversational
/// order. `generated_code` is written only by the generator stage and
/// `evaluation_result` only by the evaluator stage; both are overwritten
/// (not accumulated) when a stage runs again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
    generated_code: Option<String>,
    evaluation_result: Option<String>,
}

impl ConversationState {
    /// Create a fresh state seeded with a single human message.
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            messages: vec![Message {
                role: Role::Human,
                content: request.into(),
            }],
            generated_code: None,
            evaluation_result: None,
        }
    }

    /// Return a new state with one message appended.
    pub fn with_message(mut self, role: Role, content: impl Into<String>) -> Self {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        self
    }

    /// Return a new state with `generated_code` replaced.
    pub fn with_generated_code(mut self, code: impl Into<String>) -> Self {
        self.generated_code = Some(code.into());
        self
    }

    /// Return a new state with `evaluation_result` replaced.
    pub fn with_evaluation_result(mut self, result: impl Into<String>) -> Self {
        self.evaluation_result = Some(result.into());
        self
    }

    /// The full transcript, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Content of the most recent human entry, if any.
    pub fn last_human_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Human)
            .map(|m| m.content.as_str())
    }

    /// The most recently extracted source fragment, if any.
    pub fn generated_code(&self) -> Option<&str> {
        self.generated_code.as_deref()
    }

    /// Outcome string of the last execution attempt, if any.
    pub fn evaluation_result(&self) -> Option<&str> {
        self.evaluation_result.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_has_single_human_seed() {
        let state = ConversationState::new("Add 5 and 3");
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].role, Role::Human);
        assert_eq!(state.messages()[0].content, "Add 5 and 3");
        assert!(state.generated_code().is_none());
        assert!(state.evaluation_result().is_none());
    }

    #[test]
    fn with_message_appends_in_order() {
        let state = ConversationState::new("first")
            .with_message(Role::Assistant, "second")
            .with_message(Role::Human, "third");
        let contents: Vec<&str> = state.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn last_human_message_skips_assistant_tail() {
        let state = ConversationState::new("request")
            .with_message(Role::Assistant, "generated something");
        assert_eq!(state.last_human_message(), Some("request"));
    }

    #[test]
    fn generated_code_is_overwritten_not_accumulated() {
        let state = ConversationState::new("request")
            .with_generated_code("function execute() { return 1; }")
            .with_generated_code("function execute() { return 2; }");
        assert_eq!(
            state.generated_code(),
            Some("function execute() { return 2; }")
        );
    }

    #[test]
    fn updates_do_not_disturb_the_transcript() {
        let state = ConversationState::new("request")
            .with_message(Role::Assistant, "reply")
            .with_generated_code("code")
            .with_evaluation_result("result");
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[0].content, "request");
        assert_eq!(state.messages()[1].content, "reply");
    }
}
