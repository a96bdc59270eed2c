use std::time::Duration;

use crate::error::Result;

/// Retrieves the raw bytes behind a URL.
///
/// The lifecycle manager only ever talks to this trait, so tests can swap the network for an
/// in-memory map.
pub trait Fetcher {
    /// Downloads `url` and returns the whole response body.
    ///
    /// Implementations must give up after `timeout` instead of blocking indefinitely, and must
    /// treat any non-success status as an error.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>>;
}

impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        (**self).fetch(url, timeout)
    }
}
