use thiserror::Error;

/// Longest slice of an upstream response body carried inside an error.
const BODY_EXCERPT_LIMIT: usize = 200;

/// Machine-readable failure class reported to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Upstream,
    NotFound,
    UnknownTool,
    Config,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Upstream => "upstream_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UnknownTool => "unknown_tool",
            ErrorKind::Config => "config_error",
            ErrorKind::Internal => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum NmdcError {
    #[error("Invalid argument '{argument}': {message}")]
    Validation { argument: String, message: String },

    #[error("Upstream request failed ({context}): {message}")]
    Upstream {
        context: String,
        status: Option<u16>,
        transient: bool,
        message: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool not allowed: {0}")]
    ToolNotAllowed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NmdcError>;

impl NmdcError {
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        NmdcError::Validation {
            argument: argument.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        NmdcError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Non-success HTTP status. Request timeouts, rate limiting and server-side
    /// failures are transient; every other status is permanent.
    pub fn upstream_status(
        context: impl Into<String>,
        status: reqwest::StatusCode,
        body: &str,
    ) -> Self {
        let transient = status.is_server_error()
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::REQUEST_TIMEOUT;
        let excerpt = excerpt(body);
        let message = if excerpt.is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, excerpt)
        };

        NmdcError::Upstream {
            context: context.into(),
            status: Some(status.as_u16()),
            transient,
            message,
        }
    }

    /// Transport-level failure (timeout, refused connection, broken body).
    pub fn upstream_transport(context: impl Into<String>, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        // A builder error is a malformed request on our side, everything else is
        // the network or the remote end misbehaving.
        let transient = !err.is_builder();

        NmdcError::Upstream {
            context: context.into(),
            status: err.status().map(|status| status.as_u16()),
            transient,
            message,
        }
    }

    /// Response arrived but could not be understood.
    pub fn upstream_malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        NmdcError::Upstream {
            context: context.into(),
            status: None,
            transient: false,
            message: format!("malformed response: {}", message.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            NmdcError::Validation { .. } => ErrorKind::Validation,
            NmdcError::Upstream { .. } => ErrorKind::Upstream,
            NmdcError::NotFound { .. } => ErrorKind::NotFound,
            NmdcError::UnknownTool(_) | NmdcError::ToolNotAllowed(_) => ErrorKind::UnknownTool,
            NmdcError::Config(_) => ErrorKind::Config,
            NmdcError::Encode(_) => ErrorKind::Internal,
        }
    }

    /// Whether repeating the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, NmdcError::Upstream { transient: true, .. })
    }

    /// Name of the offending argument for validation failures.
    pub fn argument(&self) -> Option<&str> {
        match self {
            NmdcError::Validation { argument, .. } => Some(argument),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            NmdcError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl NmdcError {
    /// Structured form: `{"error": {kind, message, transient, argument?, status?}}`.
    pub fn to_payload(&self) -> serde_json::Value {
        let mut detail = serde_json::Map::new();
        detail.insert("kind".to_string(), self.kind().as_str().into());
        detail.insert("message".to_string(), self.to_string().into());
        detail.insert("transient".to_string(), self.is_transient().into());
        if let Some(argument) = self.argument() {
            detail.insert("argument".to_string(), argument.into());
        }
        if let Some(status) = self.status() {
            detail.insert("status".to_string(), status.into());
        }
        serde_json::json!({ "error": detail })
    }

    /// HTTP status for the REST surface.
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            NmdcError::Validation { .. } => StatusCode::BAD_REQUEST,
            NmdcError::NotFound { .. } | NmdcError::UnknownTool(_) => StatusCode::NOT_FOUND,
            NmdcError::ToolNotAllowed(_) => StatusCode::FORBIDDEN,
            NmdcError::Upstream { transient: true, .. } => StatusCode::SERVICE_UNAVAILABLE,
            NmdcError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            NmdcError::Config(_) | NmdcError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for NmdcError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), axum::Json(self.to_payload())).into_response()
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_EXCERPT_LIMIT {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(BODY_EXCERPT_LIMIT).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            NmdcError::invalid_argument("max_records", "must be positive").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            NmdcError::not_found("biosample", "nmdc:bsm-11-x").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            NmdcError::upstream_malformed("GET /biosample_set", "eof").kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            NmdcError::UnknownTool("nope".to_string()).kind(),
            ErrorKind::UnknownTool
        );
        assert_eq!(ErrorKind::Upstream.as_str(), "upstream_error");
    }

    #[test]
    fn test_error_display() {
        let err = NmdcError::invalid_argument("ecosystem_type", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'ecosystem_type': must not be empty"
        );
        assert_eq!(err.argument(), Some("ecosystem_type"));

        let err = NmdcError::not_found("entity", "nmdc:sty-11-abc");
        assert_eq!(err.to_string(), "entity not found: nmdc:sty-11-abc");
    }

    #[test]
    fn test_status_transience() {
        let rate_limited =
            NmdcError::upstream_status("GET /study_set", StatusCode::TOO_MANY_REQUESTS, "");
        assert!(rate_limited.is_transient());
        assert_eq!(rate_limited.status(), Some(429));

        let unavailable =
            NmdcError::upstream_status("GET /study_set", StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(unavailable.is_transient());

        let bad_request =
            NmdcError::upstream_status("GET /study_set", StatusCode::BAD_REQUEST, "bad filter");
        assert!(!bad_request.is_transient());
        assert!(bad_request.to_string().contains("bad filter"));
    }

    #[test]
    fn test_malformed_is_permanent() {
        let err = NmdcError::upstream_malformed("GET /ids/x", "expected value at line 1");
        assert!(!err.is_transient());
        assert!(err.to_string().contains("malformed response"));
    }

    #[test]
    fn test_payload_fields() {
        let payload = NmdcError::invalid_argument("ecosystem_type", "must be a non-empty string")
            .to_payload();
        assert_eq!(payload["error"]["kind"], "validation_error");
        assert_eq!(payload["error"]["argument"], "ecosystem_type");
        assert_eq!(payload["error"]["transient"], false);
        assert!(payload["error"].get("status").is_none());

        let payload =
            NmdcError::upstream_status("GET /biosample_set", StatusCode::SERVICE_UNAVAILABLE, "")
                .to_payload();
        assert_eq!(payload["error"]["kind"], "upstream_error");
        assert_eq!(payload["error"]["status"], 503);
        assert_eq!(payload["error"]["transient"], true);
        assert!(payload["error"].get("argument").is_none());
    }

    #[test]
    fn test_error_status_codes() {
        use axum::http::StatusCode as HttpStatus;
        assert_eq!(
            NmdcError::invalid_argument("x", "y").status_code(),
            HttpStatus::BAD_REQUEST
        );
        assert_eq!(
            NmdcError::not_found("Entity", "x").status_code(),
            HttpStatus::NOT_FOUND
        );
        assert_eq!(
            NmdcError::ToolNotAllowed("x".to_string()).status_code(),
            HttpStatus::FORBIDDEN
        );
        assert_eq!(
            NmdcError::upstream_malformed("GET /", "eof").status_code(),
            HttpStatus::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_into_response() {
        use axum::response::IntoResponse;

        let response = NmdcError::UnknownTool("drop_database".to_string()).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(BODY_EXCERPT_LIMIT * 3);
        let err = NmdcError::upstream_status("GET /", StatusCode::BAD_GATEWAY, &body);
        let message = err.to_string();
        assert!(message.ends_with("..."));
        assert!(message.len() < body.len());
    }
}
