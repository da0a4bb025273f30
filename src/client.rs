//! The public façade: `Client` and the read/write/mkdir/rm/directory/
//! exists/transaction/scanf/printf/gather/watch operations built on top
//! of the request mux.

use std::sync::Arc;
use std::thread;

use crate::config::ClientConfig;
use crate::core_state::ClientCore;
use crate::dispatch;
use crate::errno::ErrorKind;
use crate::error::{XsError, XsResult};
use crate::mux;
use crate::reader;
use crate::suspend::SuspendExclusive;
use crate::transport::{ReadTransport, WriteTransport};
use crate::watch::{WatchCallback, WatchHandle, WatchRegistration};
use crate::wire::MessageType;

/// The largest value this crate will hand to `printf`/`write` before
/// rejecting it as oversized (see the design notes on the `printf`
/// buffer-overflow open question).
const MAX_WIRE_PAYLOAD: usize = 4096;

/// No transaction: the sentinel `tx_id` meaning "outside any transaction".
pub const NO_TRANSACTION: u32 = 0;

/// A connected XenStore client: owns the Reader and Dispatcher worker
/// threads and the shared mux/registry/barrier state.
pub struct Client {
    core: Arc<ClientCore>,
    reader_thread: Option<thread::JoinHandle<()>>,
    dispatch_thread: Option<thread::JoinHandle<()>>,
}

/// An in-progress suspend: returned by [`Client::suspend`], consumed by
/// [`Client::resume`].
pub struct SuspendToken {
    exclusive: SuspendExclusive,
    request_guard: Option<crate::latch::ExclusiveLatchGuard>,
}

impl Client {
    /// Creates the suspend barrier, request lock, reply queue, and watch
    /// registry, then spawns the Reader and Dispatcher workers over the
    /// given transport halves.
    pub fn init(
        read_transport: Box<dyn ReadTransport>,
        write_transport: Box<dyn WriteTransport>,
        config: ClientConfig,
    ) -> XsResult<Self> {
        let core = Arc::new(ClientCore::new(write_transport, config));

        let reader_core = Arc::clone(&core);
        let reader_thread = thread::Builder::new()
            .name("xenstore-reader".to_string())
            .spawn(move || reader::run(&reader_core, read_transport))
            .map_err(|err| XsError::from(err))?;

        let dispatch_core = Arc::clone(&core);
        let dispatch_thread = thread::Builder::new()
            .name("xenstore-dispatch".to_string())
            .spawn(move || dispatch::run(&dispatch_core))
            .map_err(|err| XsError::from(err))?;

        Ok(Self {
            core,
            reader_thread: Some(reader_thread),
            dispatch_thread: Some(dispatch_thread),
        })
    }

    /// Signals shutdown: wakes any blocked `talk`/dispatcher waits with
    /// [`XsError::Cancelled`] and joins the Dispatcher thread.
    ///
    /// The Reader thread is not joined: it is typically blocked inside
    /// the transport's own `read_exact`, which this crate has no way to
    /// interrupt (a real ring transport would have its own signalling for
    /// that). It is left to exit on its own the next time it observes a
    /// transport error or the shutdown flag.
    pub fn shutdown(&mut self) {
        self.core.request_shutdown();
        if let Some(handle) = self.dispatch_thread.take() {
            let _ = handle.join();
        }
    }

    /// The raw request primitive, for opcodes the façade does not wrap
    /// (e.g. `GET_PERMS`/`SET_PERMS`/`IS_DOMAIN_INTRODUCED`).
    pub fn talk(&self, transaction: u32, message_type: MessageType, parts: &[&[u8]]) -> XsResult<Vec<u8>> {
        mux::talk(&self.core, transaction, message_type, parts)
    }

    // ---- directory / read / write / mkdir / rm / exists ----

    pub fn directory(&self, path: &str, transaction: u32) -> XsResult<Vec<String>> {
        let body = mux::talk(&self.core, transaction, MessageType::Directory, &[path.as_bytes()])?;
        Ok(crate::wire::split_nul_strings(&body))
    }

    pub fn read(&self, path: &str, transaction: u32) -> XsResult<Vec<u8>> {
        let mut body = mux::talk(&self.core, transaction, MessageType::Read, &[path.as_bytes()])?;
        body.pop();
        Ok(body)
    }

    pub fn write(&self, path: &str, value: &[u8], transaction: u32) -> XsResult<()> {
        mux::talk(&self.core, transaction, MessageType::Write, &[path.as_bytes(), value])?;
        Ok(())
    }

    pub fn mkdir(&self, path: &str, transaction: u32) -> XsResult<()> {
        mux::talk(&self.core, transaction, MessageType::Mkdir, &[path.as_bytes()])?;
        Ok(())
    }

    pub fn rm(&self, path: &str, transaction: u32) -> XsResult<()> {
        mux::talk(&self.core, transaction, MessageType::Rm, &[path.as_bytes()])?;
        Ok(())
    }

    pub fn exists(&self, path: &str, transaction: u32) -> XsResult<bool> {
        match self.read(path, transaction) {
            Ok(_) => Ok(true),
            Err(XsError::ServerError { kind: ErrorKind::NoEntry }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    // ---- transactions ----

    pub fn transaction_start(&self) -> XsResult<u32> {
        // Held for the whole start-if-absent sequence, not just the initial
        // check: releasing it between the `is_some` check and the store
        // below would let two concurrent callers both pass the check before
        // either records its hold, silently dropping one transaction's
        // barrier hold when the second store overwrites the first.
        let mut hold = self.core.active_transaction_hold.lock()?;
        if hold.is_some() {
            return Err(XsError::Usage("a transaction is already active on this client"));
        }
        let shared = self.core.suspend.acquire_shared()?;
        match mux::talk_under_suspend(&self.core, NO_TRANSACTION, MessageType::TransactionStart, &[]) {
            Ok(body) => {
                let tx_id = parse_decimal_u32(&body)?;
                *hold = Some(shared);
                Ok(tx_id)
            }
            Err(err) => {
                drop(shared);
                Err(err)
            }
        }
    }

    pub fn transaction_end(&self, transaction: u32, commit: bool) -> XsResult<()> {
        let mut hold = self.core.active_transaction_hold.lock()?;
        if hold.is_none() {
            return Err(XsError::Usage("transaction_end called with no active transaction"));
        }
        let flag: &[u8] = if commit { b"T" } else { b"F" };
        let result = mux::talk_under_suspend(&self.core, transaction, MessageType::TransactionEnd, &[flag]);
        *hold = None;
        result.map(|_| ())
    }

    // ---- scanf / printf / gather / debug_write ----

    pub fn scanf<T>(&self, path: &str, transaction: u32, parse: impl Fn(&[u8]) -> Option<T>) -> XsResult<T> {
        let bytes = self.read(path, transaction)?;
        parse(&bytes).ok_or(XsError::InvalidArgument("scanf: zero conversions"))
    }

    pub fn printf(&self, path: &str, transaction: u32, value: &[u8]) -> XsResult<()> {
        if value.len() > MAX_WIRE_PAYLOAD {
            return Err(XsError::InvalidArgument(
                "printf: formatted value exceeds the 4096-byte wire buffer",
            ));
        }
        self.write(path, value, transaction)
    }

    pub fn gather<T>(
        &self,
        entries: &[(&str, &dyn Fn(&[u8]) -> Option<T>)],
        transaction: u32,
    ) -> XsResult<Vec<T>> {
        let mut out = Vec::with_capacity(entries.len());
        for (path, parse) in entries {
            let bytes = self.read(path, transaction)?;
            let parsed = parse(&bytes).ok_or(XsError::InvalidArgument("gather: zero conversions for an entry"))?;
            out.push(parsed);
        }
        Ok(out)
    }

    pub fn debug_write(&self, msg: &[u8]) -> XsResult<()> {
        mux::talk(&self.core, NO_TRANSACTION, MessageType::Debug, &[b"print", msg])?;
        Ok(())
    }

    // ---- watches ----

    pub fn register_watch(&self, node: &str, callback: WatchCallback) -> XsResult<WatchHandle> {
        let _suspend = self.core.suspend.acquire_shared()?;
        let token = self.core.tokens.next_token();
        let registration = Arc::new(WatchRegistration {
            node: node.to_string(),
            token: Arc::clone(&token),
            callback,
        });

        {
            let mut watches = self.core.watches.lock()?;
            watches.insert(Arc::clone(&registration));
        }

        match mux::talk_under_suspend(&self.core, NO_TRANSACTION, MessageType::Watch, &[node.as_bytes(), token.as_bytes()]) {
            Ok(_) => Ok(registration.handle()),
            Err(XsError::ServerError { kind: ErrorKind::AlreadyExists }) => Ok(registration.handle()),
            Err(err) => {
                self.core.watches.lock()?.remove(&token);
                Err(err)
            }
        }
    }

    pub fn unregister_watch(&self, handle: &WatchHandle) -> XsResult<()> {
        let registration = {
            let _suspend = self.core.suspend.acquire_shared()?;
            let removed = self.core.watches.lock()?.remove(&handle.0);
            let Some(registration) = removed else {
                return Ok(());
            };
            if let Err(err) = mux::talk_under_suspend(
                &self.core,
                NO_TRANSACTION,
                MessageType::Unwatch,
                &[registration.node.as_bytes(), registration.token.as_bytes()],
            ) {
                log::warn!("unregister_watch: server UNWATCH failed: {err}");
            }
            registration
        };

        self.drain_pending_events_for(&registration);
        Ok(())
    }

    /// The number of watches currently registered on this client.
    pub fn watch_count(&self) -> usize {
        match self.core.watches.lock() {
            Ok(w) => w.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn drain_pending_events_for(&self, registration: &Arc<WatchRegistration>) {
        let mut events = match self.core.event_fifo.queue.lock() {
            Ok(q) => q,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.retain(|event| match event.registration.upgrade() {
            Some(live) => !Arc::ptr_eq(&live, registration),
            None => true,
        });
    }

    // ---- suspend / resume ----

    /// Freezes the system: acquires the suspend barrier exclusively, then
    /// the request lock, blocking until all in-flight requests drain.
    pub fn suspend(&self) -> XsResult<SuspendToken> {
        let exclusive = self.core.suspend.acquire_exclusive()?;
        let request_guard = self.core.request_lock.acquire()?;
        Ok(SuspendToken {
            exclusive,
            request_guard: Some(request_guard),
        })
    }

    /// Releases the request lock, re-issues `WATCH` for every registered
    /// watch (tolerating `ALREADY_EXISTS`), then releases the exclusive
    /// suspend hold.
    pub fn resume(&self, mut token: SuspendToken) -> XsResult<()> {
        token.request_guard.take();

        let registrations = self.core.watches.lock()?.iter_by_token();
        for registration in registrations {
            match mux::talk_under_suspend(
                &self.core,
                NO_TRANSACTION,
                MessageType::Watch,
                &[registration.node.as_bytes(), registration.token.as_bytes()],
            ) {
                Ok(_) => {}
                Err(XsError::ServerError { kind: ErrorKind::AlreadyExists }) => {}
                Err(err) => {
                    log::error!(
                        "resume: re-registering watch on {:?} failed: {err}",
                        registration.node
                    );
                    return Err(err);
                }
            }
        }

        drop(token.exclusive);
        Ok(())
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn parse_decimal_u32(bytes: &[u8]) -> XsResult<u32> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| XsError::Framing("transaction id reply was not valid UTF-8"))?
        .trim_end_matches('\0')
        .trim();
    text.parse::<u32>()
        .map_err(|_| XsError::Framing("transaction id reply was not a decimal integer"))
}
