//! LOGIN handshake for socket sessions.

use crate::config::{Credentials, WireFormat};
use crate::error::{Error, Result};
use crate::protocol::Request;
use crate::response::Response;
use crate::transport::SocketTransport;

/// An authenticated socket session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub username: String,
  /// Plain-text banner the server sent before LOGIN, if any
  pub greeting: Option<String>,
  /// Message attached to the LOGIN reply
  pub message: Option<String>,
}

/// Run the LOGIN handshake on a freshly opened transport.
///
/// Any failure, whether a rejected login, a malformed reply or a dropped
/// connection, is reported as [`Error::Authentication`] and the transport is
/// closed before returning. No retry is attempted.
pub async fn authenticate(
  transport: &mut SocketTransport,
  credentials: &Credentials,
  wire: &WireFormat,
) -> Result<Session> {
  match handshake(transport, credentials, wire).await {
    Ok(session) => {
      tracing::debug!(user = %session.username, peer = %transport.peer(), "login accepted");
      Ok(session)
    }
    Err(e) => {
      if let Err(close_err) = transport.close().await {
        tracing::debug!(error = %close_err, "close after failed login");
      }
      tracing::warn!(user = %credentials.username, error = %e, "login failed");
      Err(match e {
        Error::Authentication(_) => e,
        other => Error::Authentication(other.to_string()),
      })
    }
  }
}

async fn handshake(
  transport: &mut SocketTransport,
  credentials: &Credentials,
  wire: &WireFormat,
) -> Result<Session> {
  let greeting = if wire.greeting {
    Some(transport.receive_line().await?)
  } else {
    None
  };

  let request = Request::login(wire.login_format.encode(credentials)?);
  let shown = Request::login("<redacted>").to_line()?;
  transport.send_line_masked(&request.to_line()?, &shown).await?;

  let response = Response::parse(&transport.receive_line().await?)?;
  if !response.is_success() {
    let reason = response
      .message()
      .map(str::to_string)
      .unwrap_or_else(|| format!("status {:?}", response.status()));
    return Err(Error::Authentication(reason));
  }

  Ok(Session {
    username: credentials.username.clone(),
    greeting,
    message: response.message().map(str::to_string),
  })
}
