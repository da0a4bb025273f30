//! The framing codec: the fixed 16-byte message header and the decoded
//! in-memory representation of a message body.
//!
//! Since there is no usecase for anything but one logical message per
//! header, we model header and body together in [`StoredMessage`].

mod header;
mod message;

pub use header::{Header, MessageType, HEADER_SIZE};
pub use message::{join_nul_parts, split_nul_strings, Body, StoredMessage};
