//! Byte-level channels to a ProtonDB server.
//!
//! [`SocketTransport`] is framed: one delimiter-terminated line out, one back.
//! [`ProcessTransport`] drives an interactive console and only offers
//! "whatever the process printed during the settle window".

mod capture;
mod process;
mod socket;

pub use capture::CaptureBuffer;
pub use process::ProcessTransport;
pub use socket::SocketTransport;
