//! Per-request format negotiation as an axum extractor.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use concerts_core::WireFormat;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use super::error::ApiError;
use super::AppState;

/// Formats chosen for one request: `decoder` from `Content-Type`, `encoder`
/// from `Accept`. Extraction never fails; unknown headers fall back to the
/// registry default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiation {
    pub decoder: WireFormat,
    pub encoder: WireFormat,
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

impl FromRequestParts<AppState> for Negotiation {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            decoder: state
                .codecs
                .decoder_for(header_str(&parts.headers, &CONTENT_TYPE)),
            encoder: state.codecs.encoder_for(header_str(&parts.headers, &ACCEPT)),
        })
    }
}

impl Negotiation {
    /// Decodes a request body with the negotiated decoder.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is malformed.
    pub fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, ApiError> {
        self.decoder.decode(body).map_err(ApiError::Decode)
    }

    /// Encodes `value` with the negotiated encoder and sets `Content-Type`.
    pub fn respond<T: Serialize + ?Sized>(&self, status: StatusCode, value: &T) -> Response {
        match self.encoder.encode(value) {
            Ok(bytes) => (status, [(CONTENT_TYPE, self.encoder.media_type())], bytes).into_response(),
            Err(err) => {
                error!(error = %err, "failed to encode response body");
                self.error(&ApiError::Encode(err))
            }
        }
    }

    /// Encodes the error's body with the negotiated encoder.
    pub fn error(&self, err: &ApiError) -> Response {
        debug!(name = err.name(), error = %err, "request failed");
        match self.encoder.encode(&err.body()) {
            Ok(bytes) => (
                err.status(),
                [(CONTENT_TYPE, self.encoder.media_type())],
                bytes,
            )
                .into_response(),
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }

    /// Responds with `status` and the encoded value, or with the encoded error.
    pub fn reply<T: Serialize>(&self, status: StatusCode, result: Result<T, ApiError>) -> Response {
        match result {
            Ok(value) => self.respond(status, &value),
            Err(err) => self.error(&err),
        }
    }
}
