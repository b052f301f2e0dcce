use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;

use super::CaptureBuffer;
use crate::config::ShellOptions;
use crate::error::{Error, Result};
use crate::events::{Events, TransportEvent};

/// Termination command understood by the shell
pub const QUIT_COMMAND: &str = ":q";

/// Child process running an interactive ProtonDB console.
///
/// A background task drains stdout into a [`CaptureBuffer`] for as long as
/// the process lives. There are no message boundaries: [`exchange`] clears
/// the buffer, writes a line, sleeps for the settle delay and returns what
/// accumulated. Output slower than the delay shows up in the next window.
///
/// [`exchange`]: ProcessTransport::exchange
pub struct ProcessTransport {
  child: Child,
  stdin: Option<ChildStdin>,
  capture: Arc<CaptureBuffer>,
  readers: Vec<JoinHandle<()>>,
  settle_delay: Duration,
  shutdown_grace: Duration,
  label: String,
  events: Events,
}

impl ProcessTransport {
  /// Start the executable with piped stdio. Must be called inside a Tokio
  /// runtime, since the output readers are spawned as tasks.
  pub fn spawn(options: &ShellOptions) -> Result<Self> {
    let label = options.executable.display().to_string();
    let mut child = Command::new(&options.executable)
      .args(&options.args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|e| Error::Connection(format!("Failed to spawn {}: {}", label, e)))?;

    let stdin = child.stdin.take();
    let stdout = child
      .stdout
      .take()
      .ok_or_else(|| Error::Connection(format!("No stdout pipe for {}", label)))?;
    let stderr = child.stderr.take();

    let capture = Arc::new(CaptureBuffer::new());
    let mut readers = vec![tokio::spawn(read_stdout(
      stdout,
      Arc::clone(&capture),
      options.events.clone(),
    ))];
    if let Some(stderr) = stderr {
      readers.push(tokio::spawn(read_stderr(stderr, options.events.clone())));
    }

    options.events.record(TransportEvent::Connected { peer: &label });

    Ok(Self {
      child,
      stdin,
      capture,
      readers,
      settle_delay: options.settle_delay,
      shutdown_grace: options.shutdown_grace,
      label,
      events: options.events.clone(),
    })
  }

  pub fn has_exited(&mut self) -> bool {
    !matches!(self.child.try_wait(), Ok(None))
  }

  /// Write one command line. Fails with [`Error::ChannelClosed`] once the
  /// process has exited or its stdin is gone.
  pub async fn send_line(&mut self, line: &str) -> Result<()> {
    if self.has_exited() {
      self.stdin = None;
      return Err(Error::ChannelClosed);
    }
    let stdin = self.stdin.as_mut().ok_or(Error::ChannelClosed)?;

    let mut frame = String::with_capacity(line.len() + 1);
    frame.push_str(line);
    frame.push('\n');

    let written = match stdin.write_all(frame.as_bytes()).await {
      Ok(()) => stdin.flush().await,
      Err(e) => Err(e),
    };
    if let Err(e) = written {
      tracing::debug!(process = %self.label, error = %e, "stdin write failed");
      self.stdin = None;
      return Err(Error::ChannelClosed);
    }

    self.events.record(TransportEvent::Sent { line });
    Ok(())
  }

  /// Take whatever output has accumulated, leaving the buffer empty.
  pub fn snapshot(&self) -> Vec<String> {
    self.capture.drain()
  }

  /// Clear, write, wait for the settle delay, then snapshot.
  pub async fn exchange(&mut self, line: &str) -> Result<Vec<String>> {
    self.capture.clear();
    self.send_line(line).await?;
    tokio::time::sleep(self.settle_delay).await;
    Ok(self.snapshot())
  }

  /// Send `:q`, give the process `shutdown_grace` to exit, then kill it.
  /// Errors along the way are logged, not returned.
  pub async fn close(&mut self) {
    if self.stdin.is_some() && !self.has_exited() {
      if let Err(e) = self.send_line(QUIT_COMMAND).await {
        tracing::debug!(process = %self.label, error = %e, "quit command not delivered");
      }
    }
    // EOF on stdin also ends most consoles
    self.stdin = None;

    match tokio::time::timeout(self.shutdown_grace, self.child.wait()).await {
      Ok(Ok(status)) => {
        tracing::debug!(process = %self.label, %status, "process exited");
      }
      Ok(Err(e)) => {
        tracing::warn!(process = %self.label, error = %e, "waiting for process failed");
      }
      Err(_) => {
        tracing::debug!(process = %self.label, "process still running after grace period, killing");
        if let Err(e) = self.child.kill().await {
          tracing::warn!(process = %self.label, error = %e, "kill failed");
        }
      }
    }

    for reader in self.readers.drain(..) {
      reader.abort();
    }
    self.events.record(TransportEvent::Closed { peer: &self.label });
  }
}

async fn read_stdout<R>(stdout: R, capture: Arc<CaptureBuffer>, events: Events)
where
  R: AsyncRead + Unpin,
{
  let mut reader = BufReader::new(stdout);
  loop {
    match next_line(&mut reader).await {
      Ok(Some(line)) => {
        events.record(TransportEvent::Received { line: &line });
        capture.push(line);
      }
      Ok(None) => break,
      Err(e) => {
        tracing::debug!(error = %e, "stdout reader stopped");
        break;
      }
    }
  }
}

async fn read_stderr<R>(stderr: R, events: Events)
where
  R: AsyncRead + Unpin,
{
  let mut reader = BufReader::new(stderr);
  while let Ok(Some(line)) = next_line(&mut reader).await {
    events.record(TransportEvent::Stderr { line: &line });
  }
}

/// One output line without its terminator. Console output is not guaranteed
/// to be UTF-8; invalid bytes become U+FFFD instead of ending the stream.
async fn next_line<R>(reader: &mut BufReader<R>) -> std::io::Result<Option<String>>
where
  R: AsyncRead + Unpin,
{
  let mut buf = Vec::new();
  if reader.read_until(b'\n', &mut buf).await? == 0 {
    return Ok(None);
  }
  if buf.last() == Some(&b'\n') {
    buf.pop();
  }
  if buf.last() == Some(&b'\r') {
    buf.pop();
  }
  Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
