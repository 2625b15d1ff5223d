//! Session and credential storage.
//!
//! This module provides:
//! - `Session`: the access/refresh token pair shared by every in-flight
//!   request, injected into the transport
//! - `TokenStore`: where the pair is persisted between runs, backed by a
//!   JSON file (`FileTokenStore`), the OS keychain (`KeyringTokenStore`)
//!   or process memory (`MemoryTokenStore`)

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::KeyringTokenStore;
pub use session::{CredentialPair, Session};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
