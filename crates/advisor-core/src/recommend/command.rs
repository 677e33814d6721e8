//! Subprocess-backed candidate generator.
//!
//! Runs a configured command, writes the generation request as JSON to its
//! stdin and takes stdout as the reply. The command may wrap any model or
//! service; this crate only speaks the stdin/stdout contract.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tracing::{debug, warn};

use super::generator::{CandidateGenerator, GenerationRequest, GeneratorError};

/// Default limit on one generator call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Split a whitespace-separated command line into program and arguments.
    /// Returns `None` for a blank line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program).with_args(parts.map(str::to_owned)))
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn run(&self, payload: Vec<u8>) -> Result<String, GeneratorError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GeneratorError::Spawn {
                command: self.command_line(),
                source,
            })?;

        // Feed stdin while collecting output so a child that replies before
        // reading everything cannot deadlock against a full pipe.
        let stdin = child.stdin.take();
        let (written, output) = tokio::join!(write_request(stdin, &payload), child.wait_with_output());
        written?;
        let output = output?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GeneratorError::ExitStatus {
                status: output.status.to_string(),
                stderr,
            });
        }

        let reply = String::from_utf8_lossy(&output.stdout).into_owned();
        if reply.trim().is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(reply)
    }
}

/// Write the request and close stdin. A child that exits without reading
/// all of it closes the pipe early; that is not an error here.
async fn write_request(stdin: Option<ChildStdin>, payload: &[u8]) -> std::io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    let result = match stdin.write_all(payload).await {
        Ok(()) => stdin.shutdown().await,
        Err(e) => Err(e),
    };
    match result {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {
            debug!(bytes = payload.len(), "generator closed stdin before reading the whole request");
            Ok(())
        }
        other => other,
    }
}

#[async_trait]
impl CandidateGenerator for CommandGenerator {
    fn name(&self) -> &str {
        "command"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GeneratorError> {
        let payload = serde_json::to_vec(request)?;
        debug!(
            command = %self.command_line(),
            attempt = request.attempt,
            bytes = payload.len(),
            "invoking generator"
        );

        match tokio::time::timeout(self.timeout, self.run(payload)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(command = %self.command_line(), timeout = ?self.timeout, "generator timed out");
                Err(GeneratorError::Timeout(self.timeout))
            }
        }
    }
}
