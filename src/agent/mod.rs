//! Agent module - the two-stage pipeline.
//!
//! Control flow is a straight line with no branching, retries, or cycles:
//!
//! ```text
//! START -> Generating -> Evaluating -> DONE
//! ```
//!
//! 1. Seed a fresh conversation state with the user's request
//! 2. CodeGenerator asks the model for an `execute` function
//! 3. SandboxedEvaluator runs whatever was generated (or records that
//!    nothing was)
//!
//! Both stages are total functions from state to state, so the pipeline
//! always reaches DONE; the transcript is the only success/failure channel.

mod evaluator;
mod generator;
mod prompt;

pub use evaluator::SandboxedEvaluator;
pub use generator::CodeGenerator;
pub use prompt::build_system_prompt;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::llm::CompletionClient;
use crate::sandbox::Sandbox;
use crate::state::{ConversationState, Role};

/// Final message appended if a stage panics. Last-resort backstop only;
/// every anticipated failure is already recovered inside the stages.
const BACKSTOP_MESSAGE: &str = "An unexpected internal error interrupted the run.";

/// The two-stage pipeline with its collaborators injected.
pub struct Pipeline {
    generator: CodeGenerator,
    evaluator: SandboxedEvaluator,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        sandbox: Arc<dyn Sandbox>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            generator: CodeGenerator::new(client, model),
            evaluator: SandboxedEvaluator::new(sandbox),
        }
    }

    /// Run one request through both stages and return the final state.
    ///
    /// Stages execute strictly sequentially; each external call is awaited
    /// before the next stage starts. Independent runs share no mutable
    /// state, so callers may invoke this concurrently.
    pub async fn run(&self, request: &str) -> ConversationState {
        let seed = ConversationState::new(request);

        let staged = {
            let seed = seed.clone();
            async move {
                let generated = self.generator.run(seed).await;
                self.evaluator.run(generated).await
            }
        };

        match AssertUnwindSafe(staged).catch_unwind().await {
            Ok(state) => state,
            Err(_) => {
                tracing::error!("Pipeline stage panicked; appending backstop message");
                seed.with_message(Role::Assistant, BACKSTOP_MESSAGE)
            }
        }
    }
}
