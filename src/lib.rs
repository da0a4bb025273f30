//! A synchronous client core for the XenStore wire protocol.
//!
//! This crate multiplexes a single bidirectional byte stream (supplied by
//! an opaque [`transport::ReadTransport`]/[`transport::WriteTransport`]
//! pair) between concurrent request/reply callers and an asynchronous
//! watch-event stream, and coordinates a suspend/resume barrier for
//! hypervisor save/restore cycles.
//!
//! The transport itself — the real shared-memory ring buffer a guest
//! domain uses to talk to its hypervisor — is not this crate's concern;
//! tests and examples use the in-process mocks under
//! [`transport::mock`].

mod client;
mod config;
mod core_state;
mod dispatch;
mod errno;
mod error;
mod latch;
mod mux;
mod reader;
mod suspend;
mod transport;
mod watch;
mod wire;

pub use client::{Client, SuspendToken, NO_TRANSACTION};
pub use config::ClientConfig;
pub use errno::ErrorKind;
pub use error::{XsError, XsResult};
pub use transport::{ReadTransport, WriteTransport};
pub use watch::{WatchCallback, WatchHandle};
pub use wire::MessageType;

#[cfg(any(test, feature = "testing"))]
pub use transport::mock;
