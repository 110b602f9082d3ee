//! Network access for the offline worker.
//!
//! This module provides the request/response types the worker sees, the
//! `Fetcher` capability it uses to reach the network, and `HttpFetcher`,
//! a reqwest-backed implementation for real origins.
//!
//! A fetch only fails on network errors; an HTTP error status is still a
//! response.

pub mod client;
pub mod error;
pub mod request;

pub use client::{Fetcher, HttpFetcher};
pub use error::NetworkError;
pub use request::{Request, RequestMode, Response};
