//! The Event Dispatcher: a single worker thread that serializes delivery
//! of watch callbacks.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::core_state::ClientCore;

/// Runs the Dispatcher loop until the client is shut down.
///
/// Intended to run on its own dedicated thread, spawned by
/// [`crate::Client::init`].
pub(crate) fn run(core: &Arc<ClientCore>) {
    loop {
        let event = {
            let mut queue = match core.event_fifo.queue.lock() {
                Ok(q) => q,
                Err(poisoned) => poisoned.into_inner(),
            };
            loop {
                if let Some(event) = queue.pop_front() {
                    break Some(event);
                }
                if core.is_shutdown() {
                    break None;
                }
                queue = match core.event_fifo.not_empty.wait(queue) {
                    Ok(q) => q,
                    Err(poisoned) => poisoned.into_inner(),
                };
            }
        };

        let Some(event) = event else {
            return;
        };

        let Some(registration) = event.registration.upgrade() else {
            log::debug!(
                "dispatcher: watch for token {:?} was unregistered before dispatch, dropping event",
                event.token
            );
            continue;
        };

        let _dispatch_guard = match core.dispatch_lock.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };

        let handle = registration.handle();
        let callback = &registration.callback;
        let strings = &event.strings;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            callback(handle, strings);
        }));
        if let Err(panic) = outcome {
            log::error!(
                "dispatcher: watch callback for token {:?} panicked: {}",
                event.token,
                panic_message(&panic)
            );
        }
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
