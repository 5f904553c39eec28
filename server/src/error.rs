use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;
use pool_api::standings::StandingsError;
use pool_api::wire::ErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Standings(#[from] StandingsError),

    #[error("No results found")]
    NoResult,

    #[error("Failed to calculate scores")]
    Scoring(#[source] StoreError),

    #[error("Failed to load results")]
    LoadResult(#[source] StoreError),

    #[error("Failed to save {what}")]
    Persist {
        what: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Unknown matchup keys")]
    UnknownKeys(Vec<String>),

    #[error("Administrator credential required")]
    Unauthorized,
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Standings(StandingsError::NoResultsAvailable) | ServiceError::NoResult => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Scoring(_) | ServiceError::LoadResult(_) | ServiceError::Persist { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::UnknownKeys(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ServiceError::Scoring(e) | ServiceError::LoadResult(e) | ServiceError::Persist { source: e, .. } => {
                Some(e.to_string())
            }
            ServiceError::UnknownKeys(keys) => Some(keys.join(", ")),
            ServiceError::Standings(_) | ServiceError::NoResult | ServiceError::Unauthorized => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}: {}", self.details().unwrap_or_default());
        }
        let mut body = ErrorBody::new(self.to_string());
        body.details = self.details();
        (status, Json(body)).into_response()
    }
}
