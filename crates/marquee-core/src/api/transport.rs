//! Authenticated request transport.
//!
//! Every request carries `Authorization: Bearer <access>` from the shared
//! [`Session`]. When the server answers 401 the transport exchanges the
//! refresh token for a new access token and reissues the request exactly
//! once. If the refresh itself fails the session is erased and the caller
//! gets [`ApiError::SessionInvalidated`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ApiError, Result};
use crate::auth::Session;

/// Endpoint that exchanges a refresh token for a new access token
pub const REFRESH_PATH: &str = "/authentication/token/refresh/";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Whether a descriptor is the original request or its single reissue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

/// Everything needed to issue one API request.
///
/// Built once and then only read; the reissue after a token refresh is a
/// new descriptor produced by [`RequestDescriptor::retried`].
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    body: Option<Value>,
    headers: HeaderMap,
    public: bool,
    attempt: Attempt,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
            public: false,
            attempt: Attempt::First,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Send without a bearer token and never refresh on 401.
    /// Used for the authentication endpoints themselves.
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    /// Copy of this descriptor marked as the single permitted reissue.
    pub fn retried(&self) -> Self {
        Self {
            attempt: Attempt::Retry,
            ..self.clone()
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn attempt(&self) -> Attempt {
        self.attempt
    }
}

/// A successful (2xx) response, body fully read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    /// Read a response, turning any non-2xx status into an [`ApiError`]
    /// carrying the server-provided detail.
    pub(crate) async fn read(response: Response) -> Result<Self> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        let body = if status == StatusCode::NO_CONTENT {
            Vec::new()
        } else {
            response.bytes().await?.to_vec()
        };
        Ok(Self { status, body })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True for 204 and for any response without a body
    pub fn is_empty(&self) -> bool {
        self.status == StatusCode::NO_CONTENT || self.body.iter().all(u8::is_ascii_whitespace)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body, or `None` for an empty response.
    pub fn json<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if self.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e)))
    }
}

/// HTTP transport bound to one API base URL and one session.
/// Clone is cheap - the client and session are both shared.
#[derive(Clone)]
pub struct SessionTransport {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl SessionTransport {
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client, base_url, session))
    }

    /// Build on an existing client, sharing its connection pool.
    pub fn with_client(client: Client, base_url: &str, session: Arc<Session>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issue a request with the stored bearer token.
    ///
    /// A 401 on the first attempt triggers one token refresh and one
    /// reissue; the reissue's outcome is final. Without a stored refresh
    /// token the 401 is returned as is. A failed refresh erases the
    /// session and yields [`ApiError::SessionInvalidated`].
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse> {
        if descriptor.is_public() {
            let response = self.execute(descriptor, None).await?;
            return ApiResponse::read(response).await;
        }

        let mut request = descriptor.clone();
        let mut presented = self.session.access_token().await;

        loop {
            let response = self.execute(&request, presented.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED || request.attempt() == Attempt::Retry
            {
                return ApiResponse::read(response).await;
            }

            match self.renew_access(presented.as_deref()).await? {
                Some(access) => {
                    request = request.retried();
                    presented = Some(access);
                }
                None => return ApiResponse::read(response).await,
            }
        }
    }

    async fn execute(&self, request: &RequestDescriptor, access: Option<&str>) -> Result<Response> {
        debug!(
            method = %request.method(),
            path = request.path(),
            attempt = ?request.attempt(),
            authenticated = access.is_some(),
            "Sending request"
        );

        let mut builder = self
            .client
            .request(request.method().clone(), self.url(request.path()))
            .headers(request.headers().clone());
        if let Some(token) = access {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        debug!(status = %response.status(), path = request.path(), "Received response");
        Ok(response)
    }

    /// Obtain a replacement for the rejected access token.
    ///
    /// Runs under the session's refresh lock. If another request already
    /// replaced the token while this one waited, that token is reused and
    /// no refresh call is made. If the session was erased while it waited,
    /// the request shares that invalidation. Returns `None` when the
    /// request went out without a token and no refresh token is stored.
    async fn renew_access(&self, rejected: Option<&str>) -> Result<Option<String>> {
        let _guard = self.session.lock_refresh().await;

        match self.session.access_token().await {
            Some(current) if rejected != Some(current.as_str()) => {
                debug!("Access token already renewed by a concurrent request");
                return Ok(Some(current));
            }
            None if rejected.is_some() => {
                debug!("Session erased by a concurrent refresh");
                return Err(ApiError::SessionInvalidated);
            }
            _ => {}
        }

        let Some(refresh) = self.session.refresh_token().await else {
            debug!("No refresh token stored, returning 401 to caller");
            return Ok(None);
        };

        match self.request_refresh(&refresh).await {
            Ok(access) => {
                self.session.update_access(access.clone()).await?;
                info!("Access token refreshed");
                Ok(Some(access))
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, invalidating session");
                if let Err(clear_err) = self.session.clear().await {
                    warn!(error = %clear_err, "Failed to erase stored credentials");
                }
                Err(ApiError::SessionInvalidated)
            }
        }
    }

    async fn request_refresh(&self, refresh: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh })
            .send()
            .await?;
        let renewed: RefreshResponse = ApiResponse::read(response)
            .await?
            .json()?
            .ok_or_else(|| ApiError::InvalidResponse("Empty token refresh response".to_string()))?;
        Ok(renewed.access)
    }
}
