//! ProtonDB Rust Client SDK
//!
//! Issues ProtonDB DSL commands over one of two transports:
//!
//! - [`ProtonDB`]: a TCP session with a LOGIN handshake and JSON-framed
//!   request/response. Every call yields a [`Response`] with a status.
//! - [`ProtonShell`]: a local console executable driven over stdin/stdout.
//!   There is no framing, so every call yields the [`Captured`] lines printed
//!   during a fixed settle window. This is best effort: late output is
//!   attributed to the next command.
//!
//! Both implement [`Driver`], which has one method per DSL operation.
//!
//! # Example
//!
//! ```no_run
//! use protondb::{field, Driver, ProtonDB};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> protondb::Result<()> {
//!     let client = ProtonDB::connect("localhost:9090", "admin", "welcome").await?;
//!
//!     client.create_db("school").await?;
//!     client.use_db("school").await?;
//!     client.create_collection("characters").await?;
//!     client.insert_document("characters", &json!({"name": "Anbu", "age": 30})).await?;
//!
//!     let adults = client.print_documents("characters", Some(field("age")?.gte(18))).await?;
//!     if adults.is_success() {
//!         println!("Adults: {:?}", adults.result_lines());
//!     } else {
//!         println!("Server said: {:?}", adults.message());
//!     }
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod driver;
mod error;
pub mod events;
pub mod protocol;
pub mod query;
mod response;
mod session;
mod shell;
pub mod transport;

pub use client::ProtonDB;
pub use config::{ConnectOptions, Credentials, LoginFormat, ShellOptions, WireFormat};
pub use driver::Driver;
pub use error::{Error, Result};
pub use events::{EventSink, NullSink, TracingSink, TransportEvent};
pub use protocol::{Request, ServerCommand, DEFAULT_PORT, MAX_LINE_SIZE};
pub use query::{field, Condition, Document, Name, Role, Statement, UpdateAction};
pub use response::{Captured, Response};
pub use session::{authenticate, Session};
pub use shell::ProtonShell;
