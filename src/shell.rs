//! Subprocess-mode client.
//!
//! Drives a local ProtonDB console over stdin/stdout. The process is trusted,
//! so there is no login. Results are [`Captured`] lines with no status; see
//! [`ProcessTransport`] for why a capture window can hold the wrong
//! command's output.

use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::config::ShellOptions;
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::query::Statement;
use crate::response::Captured;
use crate::transport::ProcessTransport;

pub struct ProtonShell {
  transport: Mutex<Option<ProcessTransport>>,
}

impl ProtonShell {
  /// Spawn `executable` with default options (1s settle delay).
  pub fn spawn(executable: impl Into<PathBuf>) -> Result<Self> {
    Self::spawn_with_options(ShellOptions::new(executable))
  }

  /// Must be called inside a Tokio runtime.
  pub fn spawn_with_options(options: ShellOptions) -> Result<Self> {
    let transport = ProcessTransport::spawn(&options)?;
    tracing::info!(
      executable = %options.executable.display(),
      settle_ms = options.settle_delay.as_millis() as u64,
      "ProtonDB shell started"
    );
    Ok(Self {
      transport: Mutex::new(Some(transport)),
    })
  }

  pub async fn is_closed(&self) -> bool {
    self.transport.lock().await.is_none()
  }

  /// Send `:q`, then terminate the process if it lingers. Calling this again
  /// is a no-op.
  pub async fn close(&self) {
    if let Some(mut transport) = self.transport.lock().await.take() {
      transport.close().await;
      tracing::info!("ProtonDB shell stopped");
    }
  }

  /// A line break would split the input into two console commands.
  async fn run(&self, line: &str) -> Result<Captured> {
    let mut guard = self.transport.lock().await;
    let transport = guard.as_mut().ok_or(Error::Closed)?;
    if line.contains(['\n', '\r']) {
      return Err(Error::InvalidArgument(
        "shell commands must be a single line".to_string(),
      ));
    }
    Ok(Captured::new(transport.exchange(line).await?))
  }
}

impl Driver for ProtonShell {
  type Output = Captured;

  async fn execute(&self, statement: Statement) -> Result<Captured> {
    self.run(&statement.compile()).await
  }

  async fn execute_raw(&self, dsl: &str) -> Result<Captured> {
    self.run(dsl).await
  }

  async fn ensure_open(&self) -> Result<()> {
    if self.is_closed().await {
      return Err(Error::Closed);
    }
    Ok(())
  }
}
