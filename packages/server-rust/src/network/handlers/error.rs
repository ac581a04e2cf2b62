//! HTTP-facing error type for the concert handlers.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use concerts_core::{CodecError, ErrorBody, ValidationError};

use crate::storage::StoreError;

/// Everything a concert handler can fail with, mapped to a status code and
/// an [`ErrorBody`] name.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The request body could not be decoded in the negotiated format.
    #[error(transparent)]
    Decode(CodecError),
    /// The response body could not be encoded in the negotiated format.
    #[error(transparent)]
    Encode(CodecError),
    #[error(transparent)]
    Query(#[from] QueryRejection),
    #[error(transparent)]
    Path(#[from] PathRejection),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Query(rejection) => rejection.status(),
            Self::Path(rejection) => rejection.status(),
        }
    }

    /// Error name written to the body (`not_found`, `invalid_pattern`, ...).
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Store(StoreError::NotFound { .. }) => "not_found",
            Self::Validation(err) => err.name(),
            Self::Decode(_) => "decode_payload",
            Self::Encode(_) => "encode_response",
            Self::Query(_) => "invalid_query",
            Self::Path(_) => "invalid_path",
        }
    }

    /// Server-side failures are flagged as faults.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        if self.status().is_server_error() {
            ErrorBody::fault(self.name(), self.to_string())
        } else {
            ErrorBody::new(self.name(), self.to_string())
        }
    }
}
