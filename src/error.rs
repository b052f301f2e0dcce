//! Error types for the ProtonDB client SDK.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("Connection error: {0}")]
  Connection(String),

  #[error("Authentication failed: {0}")]
  Authentication(String),

  #[error("Transport error: {0}")]
  Transport(String),

  #[error("Protocol error: {0}")]
  Protocol(String),

  #[error("Invalid name: {0:?}")]
  InvalidName(String),

  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  #[error("Serialization error: {0}")]
  Serialization(String),

  #[error("Server error: {0}")]
  Server(String),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Timeout")]
  Timeout,

  #[error("Channel closed")]
  ChannelClosed,

  #[error("Client closed")]
  Closed,
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Self::Serialization(e.to_string())
  }
}

pub type Result<T> = std::result::Result<T, Error>;
