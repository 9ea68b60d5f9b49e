//! Client library for the Shippo shipping REST API.
//!
//! Requests and responses are plain JSON values; the client only handles
//! authentication, decoding, pagination and polling of asynchronous jobs.

pub mod client;
pub mod config;
pub mod error;
pub mod http;

pub use client::Client;
pub use config::Config;
pub use error::ApiError;
