//! # codebox
//!
//! A two-stage code agent: generate code with an LLM, then evaluate it in a
//! time-boxed, isolated sandbox.
//!
//! This library provides:
//! - An HTTP API for submitting run requests
//! - A linear two-stage pipeline (generate, then evaluate) over an
//!   append-only conversation state
//! - Integration with OpenRouter for LLM access
//! - A JavaScript vm sandbox with an empty global surface and a hard
//!   wall-clock timeout
//!
//! ## Architecture
//!
//! The pipeline is a straight line:
//! 1. Seed a conversation state with the user's request
//! 2. CodeGenerator asks the model for a zero-argument `execute` function
//!    inside a fenced code block
//! 3. SandboxedEvaluator runs the extracted code in isolation and records
//!    the outcome
//!
//! Every failure mode is recovered into the transcript; the pipeline always
//! reaches its terminal state and the caller always receives a complete
//! conversation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use codebox::{agent::Pipeline, llm::OpenRouterClient, sandbox::{ProcessSandbox, SandboxConfig}};
//!
//! let client = Arc::new(OpenRouterClient::new(api_key));
//! let sandbox = Arc::new(ProcessSandbox::detect(SandboxConfig::default()).await?);
//! let pipeline = Pipeline::new(client, sandbox, "anthropic/claude-sonnet-4.5");
//! let state = pipeline.run("Add 5 and 3").await;
//! println!("{:?}", state.evaluation_result());
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod extract;
pub mod llm;
pub mod sandbox;
pub mod state;

pub use config::Config;
pub use state::ConversationState;
