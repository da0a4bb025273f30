//! The Reader loop: the single thread that owns the read half of the
//! transport and demultiplexes the byte stream into the reply queue and
//! the event FIFO.

use std::sync::Arc;

use crate::core_state::ClientCore;
use crate::transport::ReadTransport;
use crate::watch::PendingEvent;
use crate::wire::{Header, MessageType, StoredMessage, HEADER_SIZE};

/// Runs the Reader loop until the transport errors (when
/// `ClientConfig::reader_fail_fast` is set) or the client is shut down.
///
/// Intended to run on its own dedicated thread, spawned by
/// [`crate::Client::init`].
pub(crate) fn run(core: &Arc<ClientCore>, mut transport: Box<dyn ReadTransport>) {
    loop {
        if core.is_shutdown() {
            return;
        }
        match read_one(core, transport.as_mut()) {
            Ok(()) => {}
            Err(err) => {
                log::warn!("reader loop: transport error: {err}");
                if core.config.reader_fail_fast {
                    core.request_shutdown();
                    return;
                }
            }
        }
    }
}

fn read_one(core: &Arc<ClientCore>, transport: &mut dyn ReadTransport) -> std::io::Result<()> {
    let mut header_buf = [0u8; HEADER_SIZE];
    transport.read_exact(&mut header_buf)?;
    let header = match Header::decode(&header_buf) {
        Ok(h) => h,
        Err(err) => {
            log::warn!("reader loop: malformed header: {err}");
            return Ok(());
        }
    };

    let mut body = vec![0u8; header.len as usize];
    transport.read_exact(&mut body)?;

    route(core, header, body);
    Ok(())
}

fn route(core: &Arc<ClientCore>, header: Header, body: Vec<u8>) {
    if header.message_type == MessageType::WatchEvent {
        route_watch_event(core, header, &body);
    } else {
        let message = StoredMessage::reply(header, body);
        let mut queue = match core.reply_queue.queue.lock() {
            Ok(q) => q,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.push_back(message);
        core.reply_queue.not_empty.notify_all();
    }
}

/// Conventional index of the watch token within a `WATCH_EVENT` payload's
/// string vector: `[path, token, ..]`.
const WATCH_TOKEN_INDEX: usize = 1;

fn route_watch_event(core: &Arc<ClientCore>, _header: Header, body: &[u8]) {
    let strings = crate::wire::split_nul_strings(body);

    let Some(token) = strings.get(WATCH_TOKEN_INDEX) else {
        log::warn!("reader loop: WATCH_EVENT payload missing token field, dropping");
        return;
    };

    let registration = {
        let watches = match core.watches.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        watches.lookup(token)
    };

    let Some(registration) = registration else {
        log::debug!("reader loop: WATCH_EVENT for unknown token {token:?}, discarding");
        return;
    };

    let event = PendingEvent {
        registration: std::sync::Arc::downgrade(&registration),
        token: registration.token.clone(),
        strings,
    };

    let mut events = match core.event_fifo.queue.lock() {
        Ok(e) => e,
        Err(poisoned) => poisoned.into_inner(),
    };
    events.push_back(event);
    core.event_fifo.not_empty.notify_all();
}
