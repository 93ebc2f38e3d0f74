//! Blocking HTTP downloader used by galaxy-grabber.
//!
//! The crate exposes a process-wide [`SHARED_AGENT`](http_client::SHARED_AGENT)
//! configured through [`configure_http_client`](http_client::configure_http_client),
//! a streaming [`Download`](download::Download) builder, and the
//! [`Fetcher`](traits::Fetcher) capability consumed by the collection resolver.

pub mod download;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod http_client;
pub mod traits;
pub mod types;
pub mod utils;
