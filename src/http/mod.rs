//! HTTP transport module
//!
//! The listing and polling code only ever talks to a [`Transport`]; the
//! reqwest-backed [`HttpClient`] is the production implementation.
//!
//! # Features
//!
//! - **Transport trait**: method + URL + query in, status/headers/body out
//! - **Default headers**: `Accept: application/json` and a crate user agent
//! - **Error classification**: non-2xx responses surface as `Error::HttpStatus`

mod client;
mod transport;

pub use client::{HttpClient, HttpClientConfig};
pub use transport::{Transport, TransportResponse};

#[cfg(test)]
pub(crate) mod mock;
