//! The request multiplexer: the single synchronous primitive every other
//! operation in this crate is built from.

use std::sync::atomic::Ordering;

use crate::core_state::ClientCore;
use crate::error::{XsError, XsResult};
use crate::errno;
use crate::wire::{Body, Header, MessageType, StoredMessage};

/// Sends one request and waits for its matching reply.
///
/// Acquires the suspend barrier in shared mode for the duration of the
/// call (transaction start/end additionally keep it held across the
/// matching end, handled by the caller in `client.rs`), then the request
/// lock, writes the framed request, and blocks on the reply queue until a
/// reply for this exchange arrives.
pub(crate) fn talk(
    core: &ClientCore,
    transaction: u32,
    message_type: MessageType,
    parts: &[&[u8]],
) -> XsResult<Vec<u8>> {
    let _suspend = core.suspend.acquire_shared()?;
    talk_under_suspend(core, transaction, message_type, parts)
}

/// Like [`talk`] but assumes the caller already holds the suspend barrier
/// (used by `transaction_start`/`transaction_end`, which manage the hold
/// themselves around a pair of calls).
pub(crate) fn talk_under_suspend(
    core: &ClientCore,
    transaction: u32,
    message_type: MessageType,
    parts: &[&[u8]],
) -> XsResult<Vec<u8>> {
    if core.is_shutdown() {
        return Err(XsError::Cancelled);
    }

    let _request_guard = core.request_lock.acquire()?;

    let req_id = core.next_req_id.fetch_add(1, Ordering::Relaxed);
    let payload = crate::wire::join_nul_parts(parts);
    let header = Header::new(message_type, req_id, transaction, payload.len() as u32);

    let mut frame = Vec::with_capacity(crate::wire::HEADER_SIZE + payload.len());
    header.encode(&mut frame)?;
    frame.extend_from_slice(&payload);

    {
        let mut writer = core.writer.lock()?;
        writer.write_all(&frame)?;
    }

    let reply = wait_for_reply(core, req_id)?;

    match reply.body {
        Body::Reply(body) => {
            if reply.header.message_type == MessageType::Error {
                let mnemonic = crate::wire::split_nul_strings(&body)
                    .into_iter()
                    .next()
                    .unwrap_or_default();
                let kind = errno::lookup(&mnemonic);
                return Err(XsError::ServerError { kind });
            }
            Ok(body)
        }
        Body::WatchEvent(_) => Err(XsError::Framing(
            "reader routed a WATCH_EVENT onto the reply queue",
        )),
    }
}

/// Blocks on the reply queue's condition until a reply tagged with
/// `req_id` is available, or the client is shut down.
///
/// The reply queue is logically at-most-one-deep (the request lock keeps
/// it that way) but is modeled as a FIFO per the framing contract, so this
/// scans for a matching `req_id` rather than assuming the front element
/// matches.
fn wait_for_reply(core: &ClientCore, req_id: u32) -> XsResult<StoredMessage> {
    let mut queue = core.reply_queue.queue.lock()?;
    loop {
        if let Some(pos) = queue.iter().position(|m| m.header.req_id == req_id) {
            return Ok(queue.remove(pos).expect("position just checked"));
        }
        if core.is_shutdown() {
            return Err(XsError::Cancelled);
        }
        queue = core.reply_queue.not_empty.wait(queue)?;
    }
}
