use crate::foundation::error::{SyncError, SyncResult};

/// Payload retrieval seam.
///
/// The session never performs I/O directly; annotation and waveform
/// payloads arrive through this trait so hosts can substitute their own
/// transport (or canned fixtures in tests).
pub trait Fetcher {
    /// Fetch the body at `url` as text.
    fn fetch(&self, url: &str) -> SyncResult<String>;
}

/// Blocking HTTP fetcher over `ureq`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> SyncResult<String> {
        let response = ureq::get(url)
            .call()
            .map_err(|e| SyncError::fetch(e.to_string()))?;
        response
            .into_string()
            .map_err(|e| SyncError::fetch(e.to_string()))
    }
}
