//! Outbound adapters implementing domain ports.
//!
//! - **api**: reqwest-backed content and submission adapters for the remote
//!   REST API
//! - **upload**: multipart adapter for the file storage endpoint
//! - **cache**: in-process page cache
//!
//! Adapters translate between wire and domain types and contain no business
//! logic.

pub mod api;
pub mod cache;
pub mod upload;
