//! Network utilities for remote image downloads.
//!
//! This module provides:
//! - HTTP client with a bounded timeout and fixed User-Agent
//! - The `RemoteFetch` seam and its HTTP implementation

mod client;
mod fetch;

pub use client::HttpClient;
pub use fetch::{derive_file_name, extension_for_content_type, HttpFetcher, RemoteFetch};
