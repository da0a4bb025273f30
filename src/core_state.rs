//! The shared state backing a [`crate::Client`]: the request lock and
//! reply queue, the watch registry and event FIFO, the dispatch lock, and
//! the suspend barrier — everything the Reader, the Dispatcher, and every
//! caller thread touch in common.
//!
//! Lock order (see the crate's design notes) is fixed globally:
//! `suspend` before `request`/`watches` before `reply`/`event_fifo` before
//! `dispatch`. Every method here that needs more than one lock acquires
//! them in that order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Condvar, Mutex};

use crate::config::ClientConfig;
use crate::latch::ExclusiveLatch;
use crate::suspend::{SuspendBarrier, SuspendShared};
use crate::transport::WriteTransport;
use crate::watch::{PendingEvent, TokenGenerator, WatchRegistry};
use crate::wire::StoredMessage;

#[derive(Default)]
pub(crate) struct ReplyQueue {
    pub(crate) queue: Mutex<VecDeque<StoredMessage>>,
    pub(crate) not_empty: Condvar,
}

#[derive(Default)]
pub(crate) struct EventFifo {
    pub(crate) queue: Mutex<VecDeque<PendingEvent>>,
    pub(crate) not_empty: Condvar,
}

/// Everything shared between caller threads, the Reader, and the
/// Dispatcher.
pub(crate) struct ClientCore {
    pub(crate) writer: Mutex<Box<dyn WriteTransport>>,
    pub(crate) request_lock: ExclusiveLatch,
    pub(crate) reply_queue: ReplyQueue,
    pub(crate) watches: Mutex<WatchRegistry>,
    pub(crate) event_fifo: EventFifo,
    pub(crate) dispatch_lock: Mutex<()>,
    pub(crate) suspend: SuspendBarrier,
    pub(crate) next_req_id: AtomicU32,
    pub(crate) tokens: TokenGenerator,
    pub(crate) shutdown: AtomicBool,
    pub(crate) config: ClientConfig,
    /// The suspend-shared hold carried from `transaction_start` to
    /// `transaction_end`. At most one entry, per the single-transaction
    /// non-goal.
    pub(crate) active_transaction_hold: Mutex<Option<SuspendShared>>,
}

impl ClientCore {
    pub(crate) fn new(writer: Box<dyn WriteTransport>, config: ClientConfig) -> Self {
        Self {
            writer: Mutex::new(writer),
            request_lock: ExclusiveLatch::new(),
            reply_queue: ReplyQueue::default(),
            watches: Mutex::new(WatchRegistry::default()),
            event_fifo: EventFifo::default(),
            dispatch_lock: Mutex::new(()),
            suspend: SuspendBarrier::new(),
            next_req_id: AtomicU32::new(1),
            tokens: TokenGenerator::default(),
            shutdown: AtomicBool::new(false),
            config,
            active_transaction_hold: Mutex::new(None),
        }
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    pub(crate) fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.reply_queue.not_empty.notify_all();
        self.event_fifo.not_empty.notify_all();
    }
}
