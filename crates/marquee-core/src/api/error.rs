use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The refresh token was rejected; stored credentials have been erased
    /// and the user has to log in again.
    #[error("Session expired - please log in again")]
    SessionInvalidated,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {detail}")]
    ServerError { status: StatusCode, detail: String },

    #[error("Request failed with status {status}: {detail}")]
    Http { status: StatusCode, detail: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shown when the server gives no usable error payload
pub const GENERIC_FAILURE: &str = "Request failed";

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage(format!("{err:#}"))
    }
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
            None => body.to_string(),
            Some((cut, _)) => format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            ),
        }
    }

    /// Pull a human-readable message out of an error payload.
    ///
    /// Understands `{"detail": "..."}`, field validation maps such as
    /// `{"name": ["This field is required."]}`, and bare lists or strings.
    /// Returns `None` for empty or non-JSON bodies.
    pub fn extract_detail(body: &str) -> Option<String> {
        let value: Value = serde_json::from_str(body.trim()).ok()?;
        match value {
            Value::Object(map) => {
                if let Some(Value::String(detail)) = map.get("detail") {
                    return Some(detail.clone());
                }
                let fields: Vec<String> = map
                    .iter()
                    .filter_map(|(field, messages)| {
                        let text = Self::join_messages(messages)?;
                        Some(format!("{}: {}", field, text))
                    })
                    .collect();
                if fields.is_empty() {
                    None
                } else {
                    Some(fields.join("; "))
                }
            }
            other => Self::join_messages(&other),
        }
    }

    fn join_messages(value: &Value) -> Option<String> {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            _ => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = Self::extract_detail(body)
            .map(|d| Self::truncate_body(&d))
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        match status.as_u16() {
            400 => ApiError::BadRequest(detail),
            401 => ApiError::Unauthorized(detail),
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError { status, detail },
            _ => ApiError::Http { status, detail },
        }
    }

    /// HTTP status behind this error, when the server produced one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            ApiError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ApiError::AccessDenied(_) => Some(StatusCode::FORBIDDEN),
            ApiError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ApiError::RateLimited => Some(StatusCode::TOO_MANY_REQUESTS),
            ApiError::Http { status, .. } | ApiError::ServerError { status, .. } => {
                Some(*status)
            }
            ApiError::NetworkError(e) => e.status(),
            ApiError::SessionInvalidated
            | ApiError::InvalidResponse(_)
            | ApiError::Storage(_) => None,
        }
    }

    pub fn is_session_invalidated(&self) -> bool {
        matches!(self, ApiError::SessionInvalidated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_field() {
        let body = r#"{"detail": "Given token not valid for any token type"}"#;
        assert_eq!(
            ApiError::extract_detail(body).as_deref(),
            Some("Given token not valid for any token type")
        );
    }

    #[test]
    fn test_extract_detail_flattens_validation_errors() {
        let body = r#"{"title": ["This field is required."], "genre": ["Invalid pk \"9\" - object does not exist."]}"#;
        let detail = ApiError::extract_detail(body).unwrap();
        assert!(detail.contains("title: This field is required."));
        assert!(detail.contains("genre: Invalid pk \"9\" - object does not exist."));
        assert!(detail.contains("; "));
    }

    #[test]
    fn test_extract_detail_fallbacks() {
        assert_eq!(ApiError::extract_detail(""), None);
        assert_eq!(ApiError::extract_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(ApiError::extract_detail("{}"), None);
        assert_eq!(ApiError::extract_detail("42"), None);
        assert_eq!(
            ApiError::extract_detail(r#"["Stars must be between 0 and 5."]"#).as_deref(),
            Some("Stars must be between 0 and 5.")
        );
    }

    #[test]
    fn test_from_status_maps_variants() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail": "expired"}"#),
            ApiError::Unauthorized(d) if d == "expired"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"name": ["required"]}"#),
            ApiError::BadRequest(d) if d == "name: required"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down"),
            ApiError::ServerError { status, detail }
                if status == StatusCode::BAD_GATEWAY && detail == GENERIC_FAILURE
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));

        let err = ApiError::from_status(StatusCode::CONFLICT, "");
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.to_string(), "Request failed with status 409 Conflict: Request failed");
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let long = "é".repeat(MAX_ERROR_BODY_LENGTH + 10);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"é".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("truncated"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }

    #[test]
    fn test_session_invalidated_is_distinct() {
        assert!(ApiError::SessionInvalidated.is_session_invalidated());
        assert!(!ApiError::Unauthorized(GENERIC_FAILURE.into()).is_session_invalidated());
        assert_eq!(ApiError::SessionInvalidated.status(), None);
    }
}
