//! Sandboxed evaluation stage.

use std::sync::Arc;

use serde_json::Value;

use crate::sandbox::Sandbox;
use crate::state::{ConversationState, Role};

/// Message appended when the generator left no code behind.
const NO_CODE_MESSAGE: &str = "No code was generated, so there is nothing to evaluate.";

/// Runs previously generated code in isolation and reports a human-readable
/// outcome.
///
/// A total function over the conversation state: success, timeout, runtime
/// fault, and absent code all yield a valid next state, and nothing is ever
/// thrown past the stage boundary. Only this stage writes
/// `evaluation_result`.
pub struct SandboxedEvaluator {
    sandbox: Arc<dyn Sandbox>,
}

impl SandboxedEvaluator {
    pub fn new(sandbox: Arc<dyn Sandbox>) -> Self {
        Self { sandbox }
    }

    /// Run the stage: execute `generated_code` if present and fold the
    /// outcome back into the state.
    pub async fn run(&self, state: ConversationState) -> ConversationState {
        let Some(code) = state.generated_code().map(str::to_string) else {
            tracing::debug!("No generated code to evaluate");
            return state.with_message(Role::Assistant, NO_CODE_MESSAGE);
        };

        let outcome = match self.sandbox.run(&code).await {
            Ok(value) => {
                let rendered = render_value(&value);
                tracing::info!("Sandbox execution succeeded: {}", rendered);
                format!("Execution successful. Result: {}", rendered)
            }
            Err(e) => {
                tracing::warn!("Sandbox execution failed: {}", e);
                format!("Code execution failed. Error: {}", e)
            }
        };

        state
            .with_message(Role::Assistant, outcome.clone())
            .with_evaluation_result(outcome)
    }
}

/// Render a sandbox result for the transcript. Strings are shown bare;
/// everything else keeps its JSON form.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
