//! Client-wide configuration knobs.
//!
//! Deliberately small: the transport's own configuration (ring sizes,
//! signalling mechanism, endpoint addressing) is that collaborator's
//! business, not the core's.

/// Configuration for a [`crate::Client`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// When `true`, the Reader loop gives up and stops on the first
    /// transport error instead of logging and retrying indefinitely.
    ///
    /// The original implementation always retries; this crate defaults to
    /// that behavior but exposes the choice (see the design notes on
    /// "Reader Loop").
    pub reader_fail_fast: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reader_fail_fast: false,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reader_fail_fast(mut self, fail_fast: bool) -> Self {
        self.reader_fail_fast = fail_fast;
        self
    }
}
