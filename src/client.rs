//! Socket-mode client.

use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::{ConnectOptions, WireFormat};
use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::protocol::{Request, DEFAULT_PORT};
use crate::query::Statement;
use crate::response::Response;
use crate::session::{authenticate, Session};
use crate::transport::SocketTransport;

/// How long `close` waits for the server's goodbye before hanging up
const QUIT_REPLY_WAIT: Duration = Duration::from_millis(500);

struct Connection {
  transport: SocketTransport,
  current_database: Option<String>,
  /// Set while a request is on the wire and its reply is unread. Still set
  /// on the next call means the caller dropped the previous one mid-flight.
  awaiting_reply: bool,
}

/// Authenticated connection to a ProtonDB server.
///
/// Calls are strictly request/response. An internal lock keeps at most one
/// request in flight, so the client can be shared across tasks.
pub struct ProtonDB {
  conn: Mutex<Option<Connection>>,
  session: Session,
  wire: WireFormat,
  request_timeout: Option<Duration>,
}

impl ProtonDB {
  /// Connect to `host:port` and log in.
  pub async fn connect(addr: &str, username: &str, password: &str) -> Result<Self> {
    let (host, port) = match addr.rsplit_once(':') {
      Some((host, port)) => {
        let port = port
          .parse::<u16>()
          .map_err(|_| Error::Connection(format!("Invalid port in address {:?}", addr)))?;
        (host, port)
      }
      None => (addr, DEFAULT_PORT),
    };
    Self::connect_with_options(ConnectOptions::new(host, port).with_auth(username, password)).await
  }

  /// Open the socket and log in. `connect_timeout` bounds the TCP connect and
  /// the LOGIN handshake separately.
  pub async fn connect_with_options(options: ConnectOptions) -> Result<Self> {
    options.wire.login_format.encode(&options.credentials)?;

    let addr = options.addr();
    let mut transport = SocketTransport::open(
      &addr,
      options.connect_timeout,
      &options.wire,
      options.events.clone(),
    )
    .await?;

    let handshake = authenticate(&mut transport, &options.credentials, &options.wire);
    let outcome = tokio::time::timeout(options.connect_timeout, handshake).await;
    let session = match outcome {
      Ok(session) => session?,
      Err(_) => {
        if let Err(e) = transport.close().await {
          tracing::debug!(error = %e, "close after login timeout");
        }
        return Err(Error::Authentication(format!(
          "No login reply from {} within {:?}",
          addr, options.connect_timeout
        )));
      }
    };
    tracing::info!(addr = %addr, user = %session.username, "connected to ProtonDB");

    Ok(Self {
      conn: Mutex::new(Some(Connection {
        transport,
        current_database: None,
        awaiting_reply: false,
      })),
      session,
      wire: options.wire,
      request_timeout: options.request_timeout,
    })
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  /// Database selected by the last successful `use_db`.
  pub async fn current_database(&self) -> Option<String> {
    self
      .conn
      .lock()
      .await
      .as_ref()
      .and_then(|conn| conn.current_database.clone())
  }

  pub async fn is_closed(&self) -> bool {
    self.conn.lock().await.is_none()
  }

  /// Retrieve the result the server stored for the last query.
  pub async fn fetch(&self) -> Result<Response> {
    let mut guard = self.conn.lock().await;
    self.round_trip(&mut guard, &Request::fetch()).await
  }

  /// Toggle server-side debug logging for this session.
  pub async fn set_debug(&self, enable: bool) -> Result<Response> {
    let mut guard = self.conn.lock().await;
    self.round_trip(&mut guard, &Request::debug(enable)).await
  }

  /// Profile name, privilege and current database as the server sees them.
  pub async fn server_profile(&self) -> Result<Response> {
    let mut guard = self.conn.lock().await;
    self.round_trip(&mut guard, &Request::profile()).await
  }

  /// Say goodbye and hang up. Errors during shutdown are swallowed; calling
  /// this again is a no-op. Every later call fails with [`Error::Closed`].
  pub async fn close(&self) {
    let Some(mut conn) = self.conn.lock().await.take() else {
      return;
    };

    match Request::quit().to_line() {
      Ok(line) => {
        if conn.transport.send_line(&line).await.is_ok() {
          // goodbye content is irrelevant
          let _ = tokio::time::timeout(QUIT_REPLY_WAIT, conn.transport.receive_line()).await;
        }
      }
      Err(e) => tracing::debug!(error = %e, "could not encode quit"),
    }

    if let Err(e) = conn.transport.close().await {
      tracing::debug!(error = %e, "socket shutdown failed");
    }
    tracing::info!(user = %self.session.username, "disconnected from ProtonDB");
  }

  async fn query(&self, dsl: &str, selects: Option<&str>) -> Result<Response> {
    let mut guard = self.conn.lock().await;

    let mut response = self.round_trip(&mut guard, &Request::query(dsl)).await?;
    if self.wire.auto_fetch && response.is_success() {
      response = self.round_trip(&mut guard, &Request::fetch()).await?;
    }

    if let (Some(database), true) = (selects, response.is_success()) {
      if let Some(conn) = guard.as_mut() {
        conn.current_database = Some(database.to_string());
      }
    }
    Ok(response)
  }

  /// One request, one reply. A timeout or a dropped call leaves an unread
  /// reply on the wire, so the connection is dropped rather than reused.
  async fn round_trip(&self, slot: &mut Option<Connection>, request: &Request) -> Result<Response> {
    if slot.as_ref().is_some_and(|conn| conn.awaiting_reply) {
      tracing::warn!(command = %request.command, "previous call abandoned mid-request, dropping connection");
      drop_connection(slot).await;
      return Err(Error::ChannelClosed);
    }

    let conn = slot.as_mut().ok_or(Error::Closed)?;
    conn.awaiting_reply = true;
    let exchange = exchange(&mut conn.transport, request);

    let result = match self.request_timeout {
      Some(limit) => tokio::time::timeout(limit, exchange)
        .await
        .unwrap_or(Err(Error::Timeout)),
      None => exchange.await,
    };

    if !matches!(result, Err(Error::Timeout)) {
      conn.awaiting_reply = false;
      return result;
    }

    tracing::warn!(command = %request.command, "request timed out, dropping connection");
    drop_connection(slot).await;
    result
  }
}

async fn drop_connection(slot: &mut Option<Connection>) {
  if let Some(mut conn) = slot.take() {
    if let Err(e) = conn.transport.close().await {
      tracing::debug!(error = %e, "socket shutdown failed");
    }
  }
}

async fn exchange(transport: &mut SocketTransport, request: &Request) -> Result<Response> {
  transport.send_line(&request.to_line()?).await?;
  let line = transport.receive_line().await?;
  Response::parse(&line)
}

impl Driver for ProtonDB {
  type Output = Response;

  async fn execute(&self, statement: Statement) -> Result<Response> {
    let selects = match &statement {
      Statement::UseDatabase(name) => Some(name.as_str()),
      _ => None,
    };
    self.query(&statement.compile(), selects).await
  }

  async fn execute_raw(&self, dsl: &str) -> Result<Response> {
    self.query(dsl, None).await
  }

  async fn ensure_open(&self) -> Result<()> {
    if self.is_closed().await {
      return Err(Error::Closed);
    }
    Ok(())
  }
}
