//! Wire protocol types for ProtonDB socket sessions.
//!
//! Every message is a single JSON object terminated by the line delimiter.
//! Requests carry a command keyword and an optional string payload:
//!
//! ```text
//! {"Command":"QUERY","Data":"db.list()"}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default server port
pub const DEFAULT_PORT: u16 = 9090;

/// Default line delimiter
pub const LINE_DELIMITER: u8 = b'\n';

/// Maximum accepted response line (16MB)
pub const MAX_LINE_SIZE: usize = 16 * 1024 * 1024;

/// Status value the server uses for success (compared case-insensitively)
pub const STATUS_OK: &str = "ok";

/// Server command keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServerCommand {
  Login,
  Query,
  Fetch,
  Debug,
  Profile,
  Quit,
}

impl ServerCommand {
  pub fn as_str(&self) -> &'static str {
    match self {
      ServerCommand::Login => "LOGIN",
      ServerCommand::Query => "QUERY",
      ServerCommand::Fetch => "FETCH",
      ServerCommand::Debug => "DEBUG",
      ServerCommand::Profile => "PROFILE",
      ServerCommand::Quit => "QUIT",
    }
  }
}

impl fmt::Display for ServerCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Client-to-server request. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
  #[serde(rename = "Command")]
  pub command: ServerCommand,
  #[serde(rename = "Data", skip_serializing_if = "Option::is_none", default)]
  pub data: Option<String>,
}

impl Request {
  pub fn new(command: ServerCommand, data: Option<String>) -> Self {
    Self { command, data }
  }

  pub fn login(data: impl Into<String>) -> Self {
    Self::new(ServerCommand::Login, Some(data.into()))
  }

  pub fn query(dsl: impl Into<String>) -> Self {
    Self::new(ServerCommand::Query, Some(dsl.into()))
  }

  pub fn fetch() -> Self {
    Self::new(ServerCommand::Fetch, None)
  }

  pub fn debug(enable: bool) -> Self {
    Self::new(ServerCommand::Debug, Some(enable.to_string()))
  }

  pub fn profile() -> Self {
    Self::new(ServerCommand::Profile, None)
  }

  pub fn quit() -> Self {
    Self::new(ServerCommand::Quit, None)
  }

  /// Encode as one JSON line, without the delimiter.
  pub fn to_line(&self) -> crate::Result<String> {
    Ok(serde_json::to_string(self)?)
  }
}
