// Raw sample source: session listing, per-process I/O and per-process CPU/memory

mod parse;

pub use parse::{ProcessRow, parse_io_row, parse_mem_cpu_row, parse_sessions, rows};

use crate::error::{CollectError, Dataset, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tracing::instrument;

/// Supplies the three raw datasets as trimmed text, fresh on every call.
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn sessions(&self) -> Result<String>;
    async fn process_io(&self) -> Result<String>;
    async fn process_mem_cpu(&self) -> Result<String>;
}

/// Program and arguments for one dataset.
#[derive(Debug, Clone)]
pub struct SampleCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl SampleCommand {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Runs the host utilities (`w`, `iotop`, `ps`) as child processes.
pub struct CommandSampleRepo {
    sessions: SampleCommand,
    process_io: SampleCommand,
    process_mem_cpu: SampleCommand,
    timeout: Duration,
}

impl CommandSampleRepo {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: SampleCommand::new("w", &[]),
            process_io: SampleCommand::new(
                "/usr/sbin/iotop",
                &["--processes", "-qqq", "--only", "-k", "-b", "-n", "1"],
            ),
            process_mem_cpu: SampleCommand::new(
                "ps",
                &[
                    "-eo",
                    "user:30,pid,pcpu,vsz,rss,cmd",
                    "--sort=-rss",
                    "--no-headers",
                ],
            ),
            timeout,
        }
    }

    /// Replaces the command used for one dataset.
    pub fn with_command(mut self, dataset: Dataset, command: SampleCommand) -> Self {
        match dataset {
            Dataset::Sessions => self.sessions = command,
            Dataset::ProcessIo => self.process_io = command,
            Dataset::ProcessMemCpu => self.process_mem_cpu = command,
        }
        self
    }

    #[instrument(skip(self, command), fields(program = %command.program))]
    async fn run(&self, dataset: Dataset, command: &SampleCommand) -> Result<String> {
        let unavailable = |reason: String| CollectError::SourceUnavailable { dataset, reason };

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&command.program)
                .args(&command.args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| unavailable(format!("timed out after {:?}", self.timeout)))?
        .map_err(|e| unavailable(format!("failed to run {}: {}", command.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(unavailable(format!(
                "{} exited with {}: {}",
                command.program,
                output.status,
                stderr.trim()
            )));
        }
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| unavailable(format!("non UTF-8 output: {}", e)))?;
        Ok(stdout.trim().to_string())
    }
}

#[async_trait]
impl SampleSource for CommandSampleRepo {
    async fn sessions(&self) -> Result<String> {
        self.run(Dataset::Sessions, &self.sessions).await
    }

    async fn process_io(&self) -> Result<String> {
        self.run(Dataset::ProcessIo, &self.process_io).await
    }

    async fn process_mem_cpu(&self) -> Result<String> {
        self.run(Dataset::ProcessMemCpu, &self.process_mem_cpu).await
    }
}
