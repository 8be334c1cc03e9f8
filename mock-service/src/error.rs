use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("team_name already exists")]
    TeamExists,

    #[error("PR id already exists")]
    PrExists,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("injected fault")]
    Injected(StatusCode),

    #[error("store mutex is poisoned")]
    Poisoned,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TeamExists | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PrExists => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Injected(status) => *status,
            Self::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine readable code, for the errors which carry one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::TeamExists => Some("TEAM_EXISTS"),
            Self::PrExists => Some("PR_EXISTS"),
            Self::NotFound(_) => Some("NOT_FOUND"),
            Self::BadRequest(_) | Self::RateLimited | Self::Injected(_) | Self::Poisoned => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.code() {
            Some(code) => (
                status,
                Json(json!({ "error": { "code": code, "message": self.to_string() } })),
            )
                .into_response(),
            None => (status, self.to_string()).into_response(),
        }
    }
}
