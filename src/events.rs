//! Transport event reporting.
//!
//! Transports never print. They report what goes over the channel to an
//! injected [`EventSink`]; the default sink forwards to `tracing`.

use std::fmt;
use std::sync::Arc;

/// Something observable that happened on a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent<'a> {
  Connected { peer: &'a str },
  Sent { line: &'a str },
  Received { line: &'a str },
  /// A line the shell process wrote to stderr. Never captured as output.
  Stderr { line: &'a str },
  Closed { peer: &'a str },
}

/// Receiver of transport events. Called from the reader task in shell mode,
/// so implementations must be cheap and thread-safe.
pub trait EventSink: Send + Sync + 'static {
  fn record(&self, event: &TransportEvent<'_>);
}

/// Forwards events to `tracing` under the `protondb::transport` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
  fn record(&self, event: &TransportEvent<'_>) {
    match event {
      TransportEvent::Connected { peer } => {
        tracing::debug!(target: "protondb::transport", peer = %peer, "channel opened")
      }
      TransportEvent::Sent { line } => {
        tracing::trace!(target: "protondb::transport", line = %line, "sent")
      }
      TransportEvent::Received { line } => {
        tracing::trace!(target: "protondb::transport", line = %line, "received")
      }
      TransportEvent::Stderr { line } => {
        tracing::debug!(target: "protondb::transport", line = %line, "process stderr")
      }
      TransportEvent::Closed { peer } => {
        tracing::debug!(target: "protondb::transport", peer = %peer, "channel closed")
      }
    }
  }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
  fn record(&self, _event: &TransportEvent<'_>) {}
}

/// Shared handle to a sink, cloned into each transport.
#[derive(Clone)]
pub struct Events(Arc<dyn EventSink>);

impl Events {
  pub fn new(sink: impl EventSink) -> Self {
    Self(Arc::new(sink))
  }

  pub fn from_arc(sink: Arc<dyn EventSink>) -> Self {
    Self(sink)
  }

  pub fn record(&self, event: TransportEvent<'_>) {
    self.0.record(&event);
  }
}

impl Default for Events {
  fn default() -> Self {
    Self::new(TracingSink)
  }
}

impl fmt::Debug for Events {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Events(..)")
  }
}
