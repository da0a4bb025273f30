//! The transport boundary: opaque, blocking, byte-oriented I/O over the
//! shared-memory rings. The core depends only on these two half-traits; a
//! real ring-buffer transport is a separate crate's concern (see the
//! crate's top-level docs).
//!
//! Reading and writing are split into separate halves because the Reader
//! loop blocks on reads on its own dedicated thread while callers write
//! concurrently from theirs; a real ring transport keeps the producer and
//! consumer rings independent for exactly this reason.

use std::io::{Read, Write};

/// The read half of a transport: blocking, exact-length reads.
pub trait ReadTransport: Send {
    /// Reads exactly `buf.len()` bytes, blocking until the buffer is full or
    /// an I/O error occurs.
    fn read_exact(&mut self, buf: &mut [u8]) -> std::io::Result<()>;
}

/// The write half of a transport: blocking, whole-buffer writes.
pub trait WriteTransport: Send {
    /// Writes `buf` in full, blocking until done or until an I/O error.
    ///
    /// Implementations must make a single call atomic with respect to other
    /// writers only to the extent the caller serializes access — the
    /// core's *request lock* is what actually guarantees at-most-one writer
    /// (see [`crate::mux`]).
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()>;
}

impl<T: Read + Send> ReadTransport for T {
    fn read_exact(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        Read::read_exact(self, buf)
    }
}

impl<T: Write + Send> WriteTransport for T {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        Write::write_all(self, buf)
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod mock {
    //! In-process transports used in place of the real ring transport for
    //! tests.

    use std::collections::VecDeque;
    use std::io;
    use std::sync::mpsc::{Receiver, Sender};
    use std::sync::{Arc, Mutex};

    use super::{ReadTransport, WriteTransport};

    /// The read half of an in-process duplex pipe.
    pub struct ChannelReader {
        rx: Receiver<Vec<u8>>,
        pending: VecDeque<u8>,
    }

    /// The write half of an in-process duplex pipe.
    #[derive(Clone)]
    pub struct ChannelWriter {
        tx: Sender<Vec<u8>>,
    }

    /// Creates a connected pair of full-duplex endpoints:
    /// `((client_reader, client_writer), (server_reader, server_writer))`.
    pub fn channel_pair() -> ((ChannelReader, ChannelWriter), (ChannelReader, ChannelWriter)) {
        let (tx_a, rx_a) = std::sync::mpsc::channel();
        let (tx_b, rx_b) = std::sync::mpsc::channel();
        (
            (
                ChannelReader {
                    rx: rx_b,
                    pending: VecDeque::new(),
                },
                ChannelWriter { tx: tx_a },
            ),
            (
                ChannelReader {
                    rx: rx_a,
                    pending: VecDeque::new(),
                },
                ChannelWriter { tx: tx_b },
            ),
        )
    }

    impl ReadTransport for ChannelReader {
        fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
            while self.pending.len() < buf.len() {
                let chunk = self
                    .rx
                    .recv()
                    .map_err(|_| io::Error::new(io::ErrorKind::UnexpectedEof, "peer dropped"))?;
                self.pending.extend(chunk);
            }
            for slot in buf.iter_mut() {
                *slot = self.pending.pop_front().expect("checked length above");
            }
            Ok(())
        }
    }

    impl WriteTransport for ChannelWriter {
        fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
            self.tx
                .send(buf.to_vec())
                .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer dropped"))
        }
    }

    /// A write half that records every call's exact byte slice, so tests
    /// can assert concurrent callers never interleave their writes (the
    /// "Concurrent callers" scenario).
    #[derive(Clone, Default)]
    pub struct RecordingWriter {
        writes: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    impl RecordingWriter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn writes(&self) -> Vec<Vec<u8>> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl WriteTransport for RecordingWriter {
        fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
            self.writes.lock().unwrap().push(buf.to_vec());
            Ok(())
        }
    }

    /// A read half that hands out pre-queued canned replies, one push per
    /// logical message.
    #[derive(Clone, Default)]
    pub struct ScriptedReader {
        inner: Arc<Mutex<ScriptedInner>>,
    }

    #[derive(Default)]
    struct ScriptedInner {
        to_feed: VecDeque<u8>,
        feed_queue: VecDeque<Vec<u8>>,
    }

    impl ScriptedReader {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues the exact bytes of one or more complete wire messages to
        /// be handed out in order by subsequent `read_exact` calls.
        pub fn queue(&self, bytes: Vec<u8>) {
            self.inner.lock().unwrap().feed_queue.push_back(bytes);
        }
    }

    impl ReadTransport for ScriptedReader {
        fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
            let mut inner = self.inner.lock().unwrap();
            while inner.to_feed.len() < buf.len() {
                match inner.feed_queue.pop_front() {
                    Some(bytes) => inner.to_feed.extend(bytes),
                    None => {
                        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no more data"))
                    }
                }
            }
            for slot in buf.iter_mut() {
                *slot = inner.to_feed.pop_front().expect("checked length above");
            }
            Ok(())
        }
    }
}
