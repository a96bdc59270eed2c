use std::time::Duration;

use tracing::{debug, trace};

use crate::{
    error::{DownloadError, Result},
    http_client::SHARED_AGENT,
    traits::Fetcher,
};

/// [`Fetcher`] backed by the shared `ureq` agent.
#[derive(Clone, Copy, Debug, Default)]
pub struct Http;

impl Http {
    /// Performs a GET request bounded by `timeout` and reads the full body.
    pub fn fetch_bytes(url: &str, timeout: Duration) -> Result<Vec<u8>> {
        debug!(url = url, timeout_secs = timeout.as_secs(), "fetching");

        let mut response = SHARED_AGENT
            .get(url)
            .config()
            .timeout_global(Some(timeout))
            .build()
            .call()
            .map_err(|err| DownloadError::from_ureq(err, url, timeout))?;

        trace!(url = url, status = response.status().as_u16(), "response received");

        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|err| DownloadError::from_ureq(err, url, timeout))?;

        debug!(url = url, size = bytes.len(), "fetched");
        Ok(bytes)
    }
}

impl Fetcher for Http {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        Self::fetch_bytes(url, timeout)
    }
}
