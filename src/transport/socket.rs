use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::config::WireFormat;
use crate::error::{Error, Result};
use crate::events::{Events, TransportEvent};

/// Delimiter-framed TCP channel. Exactly one request may be outstanding;
/// the caller serializes access.
pub struct SocketTransport {
  reader: BufReader<OwnedReadHalf>,
  writer: OwnedWriteHalf,
  peer: String,
  delimiter: u8,
  max_line_bytes: usize,
  events: Events,
  closed: bool,
}

impl SocketTransport {
  pub async fn open(
    addr: &str,
    connect_timeout: Duration,
    wire: &WireFormat,
    events: Events,
  ) -> Result<Self> {
    let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
      .await
      .map_err(|_| Error::Connection(format!("Timed out connecting to {}", addr)))?
      .map_err(|e| Error::Connection(format!("Failed to connect to {}: {}", addr, e)))?;

    stream
      .set_nodelay(true)
      .map_err(|e| Error::Connection(format!("Failed to set TCP_NODELAY: {}", e)))?;

    let peer = stream
      .peer_addr()
      .map(|a| a.to_string())
      .unwrap_or_else(|_| addr.to_string());
    let (read, write) = stream.into_split();

    events.record(TransportEvent::Connected { peer: &peer });

    Ok(Self {
      reader: BufReader::new(read),
      writer: write,
      peer,
      delimiter: wire.delimiter,
      max_line_bytes: wire.max_line_bytes,
      events,
      closed: false,
    })
  }

  pub fn peer(&self) -> &str {
    &self.peer
  }

  pub fn is_closed(&self) -> bool {
    self.closed
  }

  /// Write one line followed by the delimiter.
  pub async fn send_line(&mut self, line: &str) -> Result<()> {
    self.send_line_masked(line, line).await
  }

  /// Like [`send_line`](Self::send_line), but reports `shown` to the event
  /// sink instead of the real payload.
  pub(crate) async fn send_line_masked(&mut self, line: &str, shown: &str) -> Result<()> {
    if self.closed {
      return Err(Error::ChannelClosed);
    }

    let mut frame = Vec::with_capacity(line.len() + 1);
    frame.extend_from_slice(line.as_bytes());
    frame.push(self.delimiter);

    let written = match self.writer.write_all(&frame).await {
      Ok(()) => self.writer.flush().await,
      Err(e) => Err(e),
    };
    if let Err(e) = written {
      self.closed = true;
      return Err(Error::Transport(format!("Write to {} failed: {}", self.peer, e)));
    }

    self.events.record(TransportEvent::Sent { line: shown });
    Ok(())
  }

  /// Block until one complete line arrives. The delimiter (and a trailing
  /// carriage return) is stripped.
  pub async fn receive_line(&mut self) -> Result<String> {
    if self.closed {
      return Err(Error::ChannelClosed);
    }

    let limit = self.max_line_bytes as u64 + 1;
    let mut buf = Vec::new();
    let read = {
      let mut limited = (&mut self.reader).take(limit);
      limited.read_until(self.delimiter, &mut buf).await
    };

    let n = match read {
      Ok(n) => n,
      Err(e) => {
        self.closed = true;
        return Err(Error::Transport(format!("Read from {} failed: {}", self.peer, e)));
      }
    };

    if n == 0 {
      self.closed = true;
      return Err(Error::Transport(format!("Connection closed by {}", self.peer)));
    }

    if buf.last() != Some(&self.delimiter) {
      // Either the line is too long or the peer hung up mid-line. In both
      // cases the stream can no longer be framed.
      self.closed = true;
      if buf.len() as u64 >= limit {
        return Err(Error::Protocol(format!(
          "Response exceeds {} bytes",
          self.max_line_bytes
        )));
      }
      return Err(Error::Transport(format!(
        "Connection closed by {} mid-message",
        self.peer
      )));
    }

    buf.pop();
    if buf.last() == Some(&b'\r') {
      buf.pop();
    }

    let line = String::from_utf8(buf)
      .map_err(|e| Error::Protocol(format!("Response is not valid UTF-8: {}", e)))?;
    self.events.record(TransportEvent::Received { line: &line });
    Ok(line)
  }

  /// Shut down the write half. Safe to call more than once.
  pub async fn close(&mut self) -> Result<()> {
    if self.closed {
      return Ok(());
    }
    self.closed = true;
    let result = self.writer.shutdown().await;
    self.events.record(TransportEvent::Closed { peer: &self.peer });
    result.map_err(|e| Error::Transport(format!("Shutdown of {} failed: {}", self.peer, e)))
  }
}
