//! REST API access for the movie-catalog service.
//!
//! `SessionTransport` attaches the stored bearer token to every request and
//! transparently refreshes it once when the server answers 401.
//! `ApiClient` layers typed resource and authentication calls over it.

pub mod client;
pub mod error;
pub mod transport;

pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use transport::{ApiResponse, Attempt, RequestDescriptor, SessionTransport};
