//! Execution engine abstraction
//!
//! The Stacky interpreter is an external component consumed as an opaque
//! `source -> output` function. Whatever goes wrong inside it is reported in
//! the returned text, so callers display the output verbatim.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

/// Time an interpreter run may take before it is killed.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_millis(500);

/// Common interface for interpreter backends
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Run `source` and return everything the interpreter printed,
    /// including its error reports.
    async fn run(&self, source: &str) -> String;

    /// Get a human-readable name for this engine (for logging/debugging)
    fn engine_name(&self) -> &'static str;
}

/// Configuration for selecting an execution engine
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineConfig {
    /// No interpreter available; `stacky.run` is rejected
    #[default]
    None,

    /// Spawn an interpreter process per run, source on stdin
    Command {
        program: String,
        args: Vec<String>,
        timeout: Duration,
    },
}

impl EngineConfig {
    /// Resolve the engine from the command line, falling back to the
    /// STACKY_ENGINE environment variable. `timeout` bounds every run.
    pub fn from_cli_or_env(program: Option<String>, args: Vec<String>, timeout: Duration) -> Self {
        if let Some(program) = program {
            return Self::Command {
                program,
                args,
                timeout,
            };
        }

        match std::env::var("STACKY_ENGINE") {
            Ok(value) => Self::parse(&value).with_timeout(timeout),
            Err(_) => Self::None,
        }
    }

    /// Replace the run time limit of a command engine.
    pub fn with_timeout(self, limit: Duration) -> Self {
        match self {
            Self::Command { program, args, .. } => Self::Command {
                program,
                args,
                timeout: limit,
            },
            Self::None => Self::None,
        }
    }

    /// Parse an engine setting
    ///
    /// Format:
    /// - "none" -> no engine
    /// - "command:<program> [args...]" -> external interpreter process
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        if s.eq_ignore_ascii_case("none") || s.is_empty() {
            Self::None
        } else if let Some(command) = s.strip_prefix("command:") {
            let mut parts = command.split_whitespace().map(str::to_string);
            match parts.next() {
                Some(program) => Self::Command {
                    program,
                    args: parts.collect(),
                    timeout: DEFAULT_RUN_TIMEOUT,
                },
                None => {
                    warn!("Empty interpreter command in '{}', disabling execution", s);
                    Self::None
                }
            }
        } else {
            warn!("Unknown engine config '{}', disabling execution", s);
            Self::None
        }
    }
}

/// Create an execution engine based on the configuration
pub fn create_engine(config: &EngineConfig) -> Option<Arc<dyn ExecutionEngine>> {
    match config {
        EngineConfig::None => {
            info!("No Stacky interpreter configured");
            None
        }
        EngineConfig::Command {
            program,
            args,
            timeout,
        } => {
            info!(
                "Using Stacky interpreter command: {} {:?} (limit {:?})",
                program, args, timeout
            );
            Some(Arc::new(super::process_engine::ProcessEngine::new(
                program.clone(),
                args.clone(),
                *timeout,
            )))
        }
    }
}
