//! Core library for marquee, an admin client for a movie-catalog REST API.
//!
//! - [`api`]: the session transport (bearer auth with refresh-on-401) and
//!   the typed catalog client built on top of it
//! - [`auth`]: the injected session and its persisted token stores
//! - [`models`]: genre, actor, movie and review records
//! - [`config`]: user configuration and local paths

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, ApiResponse, RequestDescriptor, SessionTransport};
pub use auth::{CredentialPair, Session, TokenStore};
pub use config::Config;
