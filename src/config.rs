//! Connection options for both transports.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::error::{Error, Result};
use crate::events::{EventSink, Events};
use crate::protocol::{DEFAULT_PORT, LINE_DELIMITER, MAX_LINE_SIZE};

/// Username and password for the LOGIN handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl Credentials {
  pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      password: password.into(),
    }
  }
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// How credentials are packed into the LOGIN request's `Data` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginFormat {
  /// `"username,password"`
  #[default]
  CommaSeparated,
  /// `"{\"username\":..,\"password\":..}"`
  Json,
}

impl LoginFormat {
  /// The server splits `CommaSeparated` data on `,`, so neither part may
  /// contain one.
  pub fn encode(&self, credentials: &Credentials) -> Result<String> {
    match self {
      LoginFormat::CommaSeparated => {
        if credentials.username.contains(',') || credentials.password.contains(',') {
          return Err(Error::InvalidArgument(
            "username and password must not contain ','".to_string(),
          ));
        }
        Ok(format!("{},{}", credentials.username, credentials.password))
      }
      LoginFormat::Json => Ok(
        json!({
          "username": credentials.username,
          "password": credentials.password,
        })
        .to_string(),
      ),
    }
  }
}

/// Socket framing. The server's exact wire shape is negotiated out of band,
/// so everything here is adjustable.
#[derive(Debug, Clone)]
pub struct WireFormat {
  /// Byte that terminates every message in both directions
  pub delimiter: u8,
  /// Server writes a plain-text greeting line before LOGIN
  pub greeting: bool,
  pub login_format: LoginFormat,
  /// Follow each accepted QUERY with FETCH and return the FETCH reply
  pub auto_fetch: bool,
  /// Longest response line accepted before failing with a protocol error
  pub max_line_bytes: usize,
}

impl Default for WireFormat {
  fn default() -> Self {
    Self {
      delimiter: LINE_DELIMITER,
      greeting: true,
      login_format: LoginFormat::default(),
      auto_fetch: false,
      max_line_bytes: MAX_LINE_SIZE,
    }
  }
}

/// Connection options for a socket session
#[derive(Debug, Clone)]
pub struct ConnectOptions {
  pub host: String,
  pub port: u16,
  pub credentials: Credentials,
  pub connect_timeout: Duration,
  /// Upper bound on one request/response round-trip. `None` blocks until the
  /// server answers.
  pub request_timeout: Option<Duration>,
  pub wire: WireFormat,
  pub events: Events,
}

impl ConnectOptions {
  pub fn new(host: impl Into<String>, port: u16) -> Self {
    Self {
      host: host.into(),
      port,
      credentials: Credentials::new("", ""),
      connect_timeout: Duration::from_secs(5),
      request_timeout: None,
      wire: WireFormat::default(),
      events: Events::default(),
    }
  }

  pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
    self.credentials = Credentials::new(username, password);
    self
  }

  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }

  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout = Some(timeout);
    self
  }

  pub fn with_wire_format(mut self, wire: WireFormat) -> Self {
    self.wire = wire;
    self
  }

  pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
    self.events = Events::from_arc(sink);
    self
  }

  pub fn addr(&self) -> String {
    format!("{}:{}", self.host, self.port)
  }
}

impl Default for ConnectOptions {
  fn default() -> Self {
    Self::new("127.0.0.1", DEFAULT_PORT)
  }
}

/// Options for driving a local ProtonDB shell executable
#[derive(Debug, Clone)]
pub struct ShellOptions {
  pub executable: PathBuf,
  pub args: Vec<String>,
  /// How long to collect output after writing a command
  pub settle_delay: Duration,
  /// How long to wait for the process to exit after `:q` before killing it
  pub shutdown_grace: Duration,
  pub events: Events,
}

impl ShellOptions {
  pub fn new(executable: impl Into<PathBuf>) -> Self {
    Self {
      executable: executable.into(),
      args: Vec::new(),
      settle_delay: Duration::from_secs(1),
      shutdown_grace: Duration::from_millis(500),
      events: Events::default(),
    }
  }

  pub fn with_args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args = args.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_settle_delay(mut self, delay: Duration) -> Self {
    self.settle_delay = delay;
    self
  }

  pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
    self.shutdown_grace = grace;
    self
  }

  pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
    self.events = Events::from_arc(sink);
    self
  }
}
