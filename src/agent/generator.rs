//! Code generation stage.

use std::sync::Arc;

use crate::extract::extract_fenced_block;
use crate::llm::{ChatMessage, CompletionClient};
use crate::state::{ConversationState, Role};

use super::prompt::build_system_prompt;

/// Fallback request when the transcript has no human entry to answer.
const MISSING_REQUEST: &str = "No user request provided";

/// Turns the latest human request into generated source.
///
/// A total function over the conversation state: every input, including a
/// failed model call or a reply with no parsable code block, yields a valid
/// next state. Only this stage writes `generated_code`.
pub struct CodeGenerator {
    client: Arc<dyn CompletionClient>,
    model: String,
}

impl CodeGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Run the stage: consult the latest human message, request a
    /// completion, and extract the fenced code block from the reply.
    pub async fn run(&self, state: ConversationState) -> ConversationState {
        let request = state
            .last_human_message()
            .unwrap_or(MISSING_REQUEST)
            .to_string();

        let messages = vec![
            ChatMessage::system(build_system_prompt()),
            ChatMessage::user(request),
        ];

        let reply = match self.client.complete(&self.model, &messages).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Completion call failed: {}", e);
                return state.with_message(
                    Role::Assistant,
                    format!("Code generation failed: {}", e),
                );
            }
        };

        match extract_fenced_block(&reply.content) {
            Some(code) => {
                tracing::debug!("Extracted {} bytes of generated code", code.len());
                let summary = format!("Generated code:\n```javascript\n{}\n```", code);
                state
                    .with_message(Role::Assistant, summary)
                    .with_generated_code(code)
            }
            None => {
                tracing::warn!("Model reply contained no parsable code block");
                state.with_message(
                    Role::Assistant,
                    "Code generation failed: the model reply contained no code block.",
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use async_trait::async_trait;

    /// Client that always replies with a fixed message.
    struct ScriptedClient {
        reply: String,
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
        ) -> Result<ChatMessage, LlmError> {
            Ok(ChatMessage::assistant(self.reply.clone()))
        }
    }

    /// Client that always fails.
    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
        ) -> Result<ChatMessage, LlmError> {
            Err(LlmError::Api {
                status: 429,
                body: "rate limited".to_string(),
            })
        }
    }

    fn generator(client: impl CompletionClient + 'static) -> CodeGenerator {
        CodeGenerator::new(Arc::new(client), "test-model")
    }

    #[tokio::test]
    async fn extracts_code_and_appends_summary() {
        let gen = generator(ScriptedClient {
            reply: "Sure:\n```javascript\nfunction execute() { return 5 + 3; }\n```".to_string(),
        });

        let state = gen.run(ConversationState::new("Add 5 and 3")).await;

        assert_eq!(
            state.generated_code(),
            Some("function execute() { return 5 + 3; }")
        );
        assert_eq!(state.messages().len(), 2);
        let last = state.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.content.contains("function execute()"));
    }

    #[tokio::test]
    async fn missing_code_block_is_a_recovered_failure() {
        let gen = generator(ScriptedClient {
            reply: "I cannot write code for that request.".to_string(),
        });

        let state = gen.run(ConversationState::new("Add 5 and 3")).await;

        assert!(state.generated_code().is_none());
        assert_eq!(state.messages().len(), 2);
        assert!(state
            .messages()
            .last()
            .unwrap()
            .content
            .contains("Code generation failed"));
    }

    #[tokio::test]
    async fn failed_completion_call_is_a_recovered_failure() {
        let gen = generator(FailingClient);

        let state = gen.run(ConversationState::new("Add 5 and 3")).await;

        assert!(state.generated_code().is_none());
        let last = state.messages().last().unwrap();
        assert!(last.content.contains("Code generation failed"));
        assert!(last.content.contains("429"));
    }

    #[tokio::test]
    async fn transcript_without_human_entry_uses_fallback_request() {
        // States built through the public constructors always carry a human
        // seed; deserialization is the way a degenerate one can arrive.
        let state: ConversationState = serde_json::from_str(
            r#"{"messages":[{"role":"assistant","content":"stray"}],"generated_code":null,"evaluation_result":null}"#,
        )
        .unwrap();

        let gen = generator(ScriptedClient {
            reply: "```javascript\nfunction execute() { return 0; }\n```".to_string(),
        });

        let result = gen.run(state).await;
        assert_eq!(result.messages().len(), 2);
        assert!(result.generated_code().is_some());
    }
}
