//! Interpreter backend that runs an external Stacky process.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::execution_provider::ExecutionEngine;
use crate::error::{Result, StackyError};

/// Runs `program args...` once per execution with the source on stdin.
///
/// The returned text is stdout followed by stderr. Failing to start the
/// process, or the process outliving `timeout`, is reported in the text as
/// well; an overdue process is killed.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessEngine {
    pub fn new(program: String, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program,
            args,
            timeout,
        }
    }

    async fn try_run(&self, source: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Feed stdin while the output pipes are drained
        let stdin = child.stdin.take();
        let input = source.as_bytes().to_vec();
        let writer = tokio::spawn(async move {
            if let Some(mut stdin) = stdin {
                // The interpreter may exit before reading all input
                if let Err(e) = stdin.write_all(&input).await {
                    debug!("Interpreter closed stdin early: {}", e);
                }
            }
        });

        let output = child.wait_with_output().await?;
        if let Err(e) = writer.await {
            warn!("Interpreter stdin writer failed: {}", e);
        }

        debug!(
            "Interpreter exited with {} ({} bytes stdout, {} bytes stderr)",
            output.status,
            output.stdout.len(),
            output.stderr.len()
        );

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

#[async_trait]
impl ExecutionEngine for ProcessEngine {
    async fn run(&self, source: &str) -> String {
        let result = match tokio::time::timeout(self.timeout, self.try_run(source)).await {
            Ok(result) => result,
            Err(_) => Err(StackyError::Timeout {
                program: self.program.clone(),
                limit_ms: self.timeout.as_millis(),
            }),
        };

        match result {
            Ok(output) => output,
            Err(StackyError::Io(e)) => {
                warn!("Failed to run interpreter {}: {}", self.program, e);
                format!("failed to run {}: {}\n", self.program, e)
            }
            Err(e) => {
                warn!("Interpreter run aborted: {}", e);
                format!("{}\n", e)
            }
        }
    }

    fn engine_name(&self) -> &'static str {
        "External Process"
    }
}
