//! Shared black-box test harness: a minimal "fake server" driving the
//! client's mock channel transport, speaking the same wire format the
//! crate's Reader expects without depending on any of its private types.

#![allow(dead_code)]

use std::thread;

use xenstore_client_core::mock::{channel_pair, ChannelReader, ChannelWriter};
use xenstore_client_core::{ReadTransport, WriteTransport};

pub const OP_DEBUG: u32 = 0;
pub const OP_DIRECTORY: u32 = 1;
pub const OP_READ: u32 = 2;
pub const OP_WATCH: u32 = 4;
pub const OP_UNWATCH: u32 = 5;
pub const OP_TRANSACTION_START: u32 = 6;
pub const OP_TRANSACTION_END: u32 = 7;
pub const OP_WRITE: u32 = 11;
pub const OP_MKDIR: u32 = 12;
pub const OP_RM: u32 = 13;
pub const OP_WATCH_EVENT: u32 = 15;
pub const OP_ERROR: u32 = 16;

pub fn encode_header(message_type: u32, req_id: u32, tx_id: u32, len: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(&message_type.to_le_bytes());
    out.extend_from_slice(&req_id.to_le_bytes());
    out.extend_from_slice(&tx_id.to_le_bytes());
    out.extend_from_slice(&len.to_le_bytes());
    out
}

pub fn decode_header(bytes: &[u8]) -> (u32, u32, u32, u32) {
    let message_type = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    let req_id = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    let tx_id = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
    let len = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
    (message_type, req_id, tx_id, len)
}

pub fn join_nul(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(part);
        out.push(0);
    }
    out
}

pub fn frame(message_type: u32, req_id: u32, tx_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = encode_header(message_type, req_id, tx_id, payload.len() as u32);
    out.extend_from_slice(payload);
    out
}

/// One decoded incoming request, as seen by the fake server.
pub struct IncomingRequest {
    pub message_type: u32,
    pub req_id: u32,
    pub tx_id: u32,
    pub payload: Vec<u8>,
}

/// Everything a test needs to drive the fake server side of a connection.
pub struct ServerHarness {
    pub client_reader: ChannelReader,
    pub client_writer: ChannelWriter,
    server_reader: ChannelReader,
    pub server_writer: ChannelWriter,
}

pub fn new_harness() -> ServerHarness {
    let ((client_reader, client_writer), (server_reader, server_writer)) = channel_pair();
    ServerHarness {
        client_reader,
        client_writer,
        server_reader,
        server_writer,
    }
}

impl ServerHarness {
    /// Spawns a thread that reads requests one at a time and replies using
    /// `respond`, until the channel closes. `respond` returns the reply
    /// frame's `(message_type, payload)`; return `None` to send nothing
    /// (simulating a request whose reply arrives out of band, e.g. via a
    /// separately pushed `WATCH_EVENT`).
    pub fn spawn_responder<F>(self, mut respond: F) -> (ChannelReader, ChannelWriter, thread::JoinHandle<()>)
    where
        F: FnMut(IncomingRequest, &mut ChannelWriter) -> Option<(u32, Vec<u8>)> + Send + 'static,
    {
        let mut reader = self.server_reader;
        let mut writer = self.server_writer.clone();
        let handle = thread::spawn(move || loop {
            let mut header_buf = [0u8; 16];
            if reader.read_exact(&mut header_buf).is_err() {
                return;
            }
            let (message_type, req_id, tx_id, len) = decode_header(&header_buf);
            let mut payload = vec![0u8; len as usize];
            if reader.read_exact(&mut payload).is_err() {
                return;
            }
            let request = IncomingRequest {
                message_type,
                req_id,
                tx_id,
                payload,
            };
            if let Some((reply_type, reply_payload)) = respond(request, &mut writer) {
                let out = frame(reply_type, req_id, tx_id, &reply_payload);
                if writer.write_all(&out).is_err() {
                    return;
                }
            }
        });
        (self.client_reader, self.client_writer, handle)
    }
}
