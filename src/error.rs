use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A query parameter is missing or malformed. Raised before any storage access.
    #[error("{message}")]
    InvalidParam { field: &'static str, message: String },
    /// A campaign filter matched no joined rows in the requested window.
    #[error("no data for campaign '{campaign_id}' between {start_date} and {end_date}")]
    NoData {
        campaign_id: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ApiError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::InvalidParam {
            field,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidParam { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NoData { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::InvalidParam { field, message } => json!({
                "detail": [{ "loc": ["query", field], "msg": message }]
            }),
            ApiError::NoData { .. } => json!({ "detail": self.to_string() }),
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "campaign query failed");
                json!({ "detail": "failed to load campaign data" })
            }
        };
        (status, Json(body)).into_response()
    }
}
