use axum::http::StatusCode;
use axum::Json;

use crate::fetch::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("missing query parameter: {0}")]
    MissingParam(&'static str),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("upstream fetch failed: {0}")]
    Upstream(FetchError),

    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("resource too large")]
    TooLarge,

    #[error("search keys not configured")]
    SearchUnconfigured,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<FetchError> for GatewayError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::TooLarge(_) => Self::TooLarge,
            other => Self::Upstream(other),
        }
    }
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParam(_) | Self::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::SearchUnconfigured | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
