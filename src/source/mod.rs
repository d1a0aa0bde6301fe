//! Status page access
//!
//! Fetching, marker extraction and the per-tick `Sampler`.

pub mod http;
pub mod markers;
pub mod sampler;
pub mod traits;

pub use http::HttpFetcher;
pub use markers::extract_markers;
pub use sampler::{classify, MarkerLayout, Sampler};
pub use traits::PageFetcher;
