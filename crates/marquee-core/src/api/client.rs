//! API client for the movie-catalog REST API.
//!
//! This module provides the `ApiClient` struct for logging in and for
//! listing, creating, updating and deleting catalog records. All catalog
//! calls go through the [`SessionTransport`], so they share its
//! refresh-on-401 handling.

use std::sync::Arc;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiError, RequestDescriptor, Result, SessionTransport};
use crate::auth::{CredentialPair, Session};
use crate::models::{MovieStats, Resource};

/// Exchanges username and password for a token pair
const TOKEN_PATH: &str = "/authentication/token/";

/// Checks whether a token is still valid
const VERIFY_PATH: &str = "/authentication/token/verify/";

const MOVIE_STATS_PATH: &str = "/movies/stats/";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access: String,
    refresh: String,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

/// Typed client for the catalog and authentication endpoints.
/// Clone is cheap - it shares the transport's connection pool and session.
#[derive(Clone)]
pub struct ApiClient {
    transport: SessionTransport,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000/api/v1`)
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self> {
        Ok(Self::from_transport(SessionTransport::new(base_url, session)?))
    }

    pub fn from_transport(transport: SessionTransport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &SessionTransport {
        &self.transport
    }

    pub fn session(&self) -> &Arc<Session> {
        self.transport.session()
    }

    // ===== Authentication =====

    /// Log in and store the returned token pair in the session
    pub async fn login(&self, username: &str, password: &str) -> Result<CredentialPair> {
        let request = RequestDescriptor::post(TOKEN_PATH)
            .json(&LoginRequest { username, password })?
            .public();
        let tokens: TokenResponse = self.fetch(&request).await?;
        let pair = CredentialPair::new(tokens.access, tokens.refresh);

        self.session().store_credentials(pair.clone()).await?;
        info!(username, "Logged in");
        Ok(pair)
    }

    /// Ask the server whether `token` is still valid.
    /// Any HTTP error status counts as invalid; network failures are errors.
    pub async fn verify_token(&self, token: &str) -> Result<bool> {
        let request = RequestDescriptor::post(VERIFY_PATH)
            .json(&VerifyRequest { token })?
            .public();
        match self.transport.send(&request).await {
            Ok(_) => Ok(true),
            Err(ApiError::NetworkError(e)) => Err(ApiError::NetworkError(e)),
            Err(e) => {
                debug!(error = %e, "Token verification rejected");
                Ok(false)
            }
        }
    }

    /// Check a session loaded at startup.
    ///
    /// Returns false when no access token is stored. A stored token that
    /// fails verification erases the whole session. An unreachable server
    /// is returned as an error and leaves the session in place, so a
    /// network outage does not log the user out.
    pub async fn restore_session(&self) -> Result<bool> {
        let Some(access) = self.session().access_token().await else {
            return Ok(false);
        };
        if self.verify_token(&access).await? {
            return Ok(true);
        }
        info!("Stored session is no longer valid, clearing it");
        self.session().clear().await?;
        Ok(false)
    }

    pub async fn logout(&self) -> Result<()> {
        self.session().clear().await?;
        info!("Logged out");
        Ok(())
    }

    // ===== Catalog resources =====

    pub async fn list<R: Resource>(&self) -> Result<Vec<R>> {
        self.fetch(&RequestDescriptor::get(R::collection_path())).await
    }

    pub async fn get<R: Resource>(&self, id: i64) -> Result<R> {
        self.fetch(&RequestDescriptor::get(R::item_path(id))).await
    }

    pub async fn create<R: Resource>(&self, input: &R::Input) -> Result<R> {
        let request = RequestDescriptor::post(R::collection_path()).json(input)?;
        let created: R = self.fetch(&request).await?;
        debug!(resource = R::PATH, id = created.id(), "Created");
        Ok(created)
    }

    pub async fn update<R: Resource>(&self, id: i64, input: &R::Input) -> Result<R> {
        let request = RequestDescriptor::put(R::item_path(id)).json(input)?;
        self.fetch(&request).await
    }

    pub async fn delete<R: Resource>(&self, id: i64) -> Result<()> {
        self.transport
            .send(&RequestDescriptor::delete(R::item_path(id)))
            .await?;
        debug!(resource = R::PATH, id, "Deleted");
        Ok(())
    }

    pub async fn movie_stats(&self) -> Result<MovieStats> {
        self.fetch(&RequestDescriptor::get(MOVIE_STATS_PATH)).await
    }

    /// Send a request whose success response must carry a JSON body.
    async fn fetch<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<T> {
        self.transport
            .send(request)
            .await?
            .json()?
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!("Empty response from {}", request.path()))
            })
    }
}
