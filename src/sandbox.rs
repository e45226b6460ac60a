//! Isolated, time-boxed execution of generated code.
//!
//! Generated code runs in a JavaScript `vm` context created from a
//! configurable globals object (empty by default), inside a child process
//! spawned with a cleared environment. The executed code therefore sees
//! only the language intrinsics: no `process`, no `require`, no `console`,
//! no filesystem or network reach.
//!
//! Two timers bound every attempt: the vm-level timeout aborts runaway
//! script execution, and an outer wall-clock timeout kills the child if the
//! interpreter itself hangs. One sandbox process is created per evaluation
//! and discarded afterwards; nothing is reused across runs.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use uuid::Uuid;

/// Default wall-clock budget for one evaluation.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Extra wall-clock allowance for interpreter startup, on top of the
/// configured script budget.
const STARTUP_GRACE_MS: u64 = 1500;

/// Harness exit code: the script threw (or failed to parse).
const EXIT_RUNTIME_FAULT: i32 = 64;
/// Harness exit code: the result could not be serialized to JSON.
const EXIT_UNSERIALIZABLE: i32 = 65;
/// Harness exit code: the vm-level timeout fired.
const EXIT_TIMEOUT: i32 = 66;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("No JavaScript runtime found. Install node or bun on the host.")]
    RuntimeUnavailable,

    #[error("Failed to set up sandbox: {0}")]
    Setup(#[from] std::io::Error),

    #[error("Execution timed out after {0} ms")]
    Timeout(u64),

    #[error("Execution failed: {0}")]
    Runtime(String),

    #[error("Result could not be serialized: {0}")]
    Serialization(String),

    #[error("Sandbox produced unreadable output: {0}")]
    Output(String),
}

/// Which JavaScript runtime hosts the sandbox process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsRuntime {
    Node,
    Bun,
}

impl JsRuntime {
    /// The binary name used to launch the runtime.
    pub fn bin(&self) -> &'static str {
        match self {
            JsRuntime::Node => "node",
            JsRuntime::Bun => "bun",
        }
    }
}

/// Detect whether `node` is available on the host system.
pub async fn node_available() -> bool {
    Command::new("node")
        .arg("--version")
        .output()
        .await
        .is_ok_and(|o| o.status.success())
}

/// Detect whether `bun` is available on the host system.
pub async fn bun_available() -> bool {
    Command::new("bun")
        .arg("--version")
        .output()
        .await
        .is_ok_and(|o| o.status.success())
}

/// Return the preferred runtime: **node** if available, else **bun**.
///
/// Node is preferred because its `node:vm` timeout support is complete;
/// bun is accepted as a fallback.
pub async fn preferred_runtime() -> Option<JsRuntime> {
    if node_available().await {
        Some(JsRuntime::Node)
    } else if bun_available().await {
        Some(JsRuntime::Bun)
    } else {
        None
    }
}

/// Sandbox configuration.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Script execution budget in milliseconds.
    pub timeout_ms: u64,

    /// Bindings exposed as globals inside the vm context. Empty by default:
    /// the executed code sees only JS intrinsics.
    pub exposed_globals: serde_json::Map<String, Value>,

    /// Directory for per-run harness scripts.
    pub scratch_dir: PathBuf,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            exposed_globals: serde_json::Map::new(),
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl SandboxConfig {
    /// Config with a custom execution budget.
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }
}

/// An isolated execution context for generated source.
///
/// `run` executes the source (which must define a zero-argument `execute`
/// function) and resolves to the JSON value `execute()` returned.
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn run(&self, source: &str) -> Result<Value, SandboxError>;
}

/// Production sandbox backed by a JS runtime subprocess.
pub struct ProcessSandbox {
    config: SandboxConfig,
    runtime: JsRuntime,
}

impl ProcessSandbox {
    /// Detect a JS runtime on the host and build a sandbox around it.
    pub async fn detect(config: SandboxConfig) -> Result<Self, SandboxError> {
        let runtime = preferred_runtime()
            .await
            .ok_or(SandboxError::RuntimeUnavailable)?;
        tracing::info!("Sandbox runtime: {}", runtime.bin());
        Ok(Self::with_runtime(config, runtime))
    }

    /// Build a sandbox on a known runtime (used by tests).
    pub fn with_runtime(config: SandboxConfig, runtime: JsRuntime) -> Self {
        Self { config, runtime }
    }
}

/// Build the harness script that runs `source` inside a vm context.
///
/// The wrapped source ends with an `execute()` call, so the vm's completion
/// value is the function's return value. The harness serializes that value
/// to JSON on stdout and maps each failure class to a distinct exit code.
fn build_harness(source: &str, config: &SandboxConfig) -> String {
    let wrapped = format!("{source}\n;execute();");
    // JSON-encode the script and globals so arbitrary source embeds safely.
    let wrapped_json = Value::String(wrapped).to_string();
    let globals_json = Value::Object(config.exposed_globals.clone()).to_string();

    format!(
        r#""use strict";
const vm = require("node:vm");
const source = {wrapped_json};
const context = vm.createContext({globals_json});
let result;
try {{
    result = vm.runInContext(source, context, {{ timeout: {timeout} }});
}} catch (err) {{
    if (err && err.code === "ERR_SCRIPT_EXECUTION_TIMEOUT") {{
        process.exit({exit_timeout});
    }}
    process.stderr.write(String(err && err.message ? err.message : err));
    process.exit({exit_runtime});
}}
let serialized;
try {{
    serialized = JSON.stringify(result);
}} catch (err) {{
    process.stderr.write(String(err && err.message ? err.message : err));
    process.exit({exit_unserializable});
}}
if (serialized === undefined) {{
    process.stderr.write("result is not JSON-serializable");
    process.exit({exit_unserializable});
}}
process.stdout.write(serialized);
"#,
        wrapped_json = wrapped_json,
        globals_json = globals_json,
        timeout = config.timeout_ms,
        exit_timeout = EXIT_TIMEOUT,
        exit_runtime = EXIT_RUNTIME_FAULT,
        exit_unserializable = EXIT_UNSERIALIZABLE,
    )
}

#[async_trait]
impl Sandbox for ProcessSandbox {
    async fn run(&self, source: &str) -> Result<Value, SandboxError> {
        let harness = build_harness(source, &self.config);

        let script_path = self
            .config
            .scratch_dir
            .join(format!("codebox-{}.js", Uuid::new_v4()));
        tokio::fs::write(&script_path, &harness).await?;

        tracing::debug!(
            "Sandbox run: {} {} (budget {} ms)",
            self.runtime.bin(),
            script_path.display(),
            self.config.timeout_ms
        );

        // PATH is retained so the interpreter binary itself resolves; the vm
        // context never sees the process environment.
        let spawned = Command::new(self.runtime.bin())
            .arg(&script_path)
            .env_clear()
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .current_dir(&self.config.scratch_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match spawned {
            Ok(c) => c,
            Err(e) => {
                let _ = tokio::fs::remove_file(&script_path).await;
                return Err(SandboxError::Setup(e));
            }
        };

        let wall_clock = Duration::from_millis(self.config.timeout_ms + STARTUP_GRACE_MS);
        let waited = tokio::time::timeout(wall_clock, child.wait_with_output()).await;

        let _ = tokio::fs::remove_file(&script_path).await;

        // Timer expiry drops the child future; kill_on_drop reaps the process.
        let output = match waited {
            Ok(result) => result?,
            Err(_) => return Err(SandboxError::Timeout(self.config.timeout_ms)),
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        match output.status.code() {
            Some(0) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                serde_json::from_str(stdout.trim())
                    .map_err(|e| SandboxError::Output(format!("{} (stdout: {})", e, stdout.trim())))
            }
            Some(EXIT_TIMEOUT) => Err(SandboxError::Timeout(self.config.timeout_ms)),
            Some(EXIT_RUNTIME_FAULT) => Err(SandboxError::Runtime(stderr)),
            Some(EXIT_UNSERIALIZABLE) => Err(SandboxError::Serialization(stderr)),
            Some(code) => Err(SandboxError::Runtime(format!(
                "sandbox exited with code {}: {}",
                code, stderr
            ))),
            None => Err(SandboxError::Runtime(format!(
                "sandbox terminated by signal: {}",
                stderr
            ))),
        }
    }
}
