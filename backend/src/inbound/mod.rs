//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! HTTP pages and the JSON API live under [`http`].

pub mod http;
