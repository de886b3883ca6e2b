use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider answered with an `error` field in its payload.
    #[error("{0}")]
    Reported(String),
    #[error("search provider request failed")]
    Transport(#[from] reqwest::Error),
    #[error("search provider returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("malformed search provider response: {0}")]
    Malformed(String),
    #[error("search cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("language model request failed")]
    Transport(#[from] reqwest::Error),
    #[error("language model returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("malformed language model response: {0}")]
    Malformed(String),
    #[error("language model returned no text content")]
    EmptyAnswer,
    #[error("synthesis cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("{0} service is not configured")]
    NotConfigured(&'static str),
    #[error("Latitude and longitude are required")]
    MissingCoordinates,
    #[error("Could not fetch weather data")]
    Weather(#[source] anyhow::Error),
    #[error("Could not fetch stock data")]
    NoQuotes,
}

/// Request-level failure, converted into a single `{"error": ...}` body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Provider(ProviderError),
    #[error(transparent)]
    Synthesis(SynthesisError),
    #[error("request cancelled")]
    Cancelled,
    #[error("An error occurred")]
    Unexpected(#[source] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Which orchestration step produced the error, for server-side logs.
    pub fn step(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validate",
            AppError::Provider(_) => "search",
            AppError::Synthesis(_) => "synthesize",
            AppError::Cancelled => "cancelled",
            AppError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Cancelled => AppError::Cancelled,
            other => AppError::Provider(other),
        }
    }
}

impl From<SynthesisError> for AppError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Cancelled => AppError::Cancelled,
            other => AppError::Synthesis(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl IntoResponse for WidgetError {
    fn into_response(self) -> Response {
        let status = match self {
            WidgetError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            WidgetError::MissingCoordinates => StatusCode::BAD_REQUEST,
            WidgetError::Weather(_) | WidgetError::NoQuotes => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_is_passed_through() {
        let err = AppError::from(ProviderError::Reported("Invalid API key.".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Invalid API key.");
        assert_eq!(err.step(), "search");
    }

    #[test]
    fn test_upstream_body_is_not_leaked() {
        let err = AppError::from(SynthesisError::Status {
            status: 401,
            body: "{\"secret\":\"sk-ant-...\"}".into(),
        });
        assert_eq!(err.to_string(), "language model returned HTTP 401");
        assert_eq!(err.step(), "synthesize");
    }

    #[test]
    fn test_upstream_cancellation_is_reported_as_cancelled() {
        let search = AppError::from(ProviderError::Cancelled);
        assert!(matches!(search, AppError::Cancelled));
        assert_eq!(search.step(), "cancelled");

        let synthesis = AppError::from(SynthesisError::Cancelled);
        assert!(matches!(synthesis, AppError::Cancelled));
        assert_eq!(synthesis.step(), "cancelled");
    }

    #[test]
    fn test_unexpected_is_generic() {
        let err = AppError::Unexpected(anyhow::anyhow!("pool poisoned at 0xdeadbeef"));
        assert_eq!(err.to_string(), "An error occurred");
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = AppError::Validation("Query is required".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
