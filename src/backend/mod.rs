//! Backends implementing the list endpoint contract
//!
//! The in-memory backend interprets the filter query grammar locally and is
//! the workhorse of the test suite; the HTTP backend talks to a real
//! `{count, results}` endpoint.

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "in-memory")]
pub mod memory;

#[cfg(feature = "http")]
pub use http::HttpBackend;
#[cfg(feature = "in-memory")]
pub use memory::InMemoryBackend;
