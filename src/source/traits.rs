//! Trait definitions for page fetching
//!
//! These traits abstract over HTTP to enable testing with mocks.

use crate::error::FetchError;

/// Fetches the raw status document for a URL
///
/// Implementations perform exactly one attempt; retrying is the Runner's
/// job (by way of the next tick).
pub trait PageFetcher {
    /// Fetch the document body as text
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

impl<F: PageFetcher + ?Sized> PageFetcher for &F {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url)
    }
}

impl<F: PageFetcher + ?Sized> PageFetcher for Box<F> {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url)
    }
}
