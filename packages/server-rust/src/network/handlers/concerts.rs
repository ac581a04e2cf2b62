//! Concert CRUD endpoints.
//!
//! Each handler negotiates formats, validates its input, calls exactly one
//! [`ConcertStore`](crate::storage::ConcertStore) operation and encodes the
//! outcome. The store lock is released before any encoding happens.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use concerts_core::schema::{validate_concert_id, validate_create, validate_update};
use concerts_core::{Concert, ConcertPayload, ErrorBody, ListParams};
use serde::Deserialize;

use super::error::ApiError;
use super::negotiation::Negotiation;
use super::AppState;

/// Raw pagination query. Values stay strings so malformed numbers surface
/// as validation errors in the negotiated format.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// List concerts with optional pagination.
#[utoipa::path(
    get,
    path = "/concerts",
    tag = "concerts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1 (default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page, 1 to 100 (default 10)"),
    ),
    responses(
        (status = 200, description = "One page of concerts", body = Vec<Concert>),
        (status = 400, description = "Invalid pagination parameters", body = ErrorBody),
    )
)]
pub async fn list_concerts(
    State(state): State<AppState>,
    negotiation: Negotiation,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let result = query
        .map_err(ApiError::from)
        .and_then(|Query(query)| list(&state, &query));
    negotiation.reply(StatusCode::OK, result)
}

fn list(state: &AppState, query: &ListQuery) -> Result<Vec<Concert>, ApiError> {
    let params = ListParams::parse(query.page.as_deref(), query.limit.as_deref())?;
    Ok(state.store.list(params.page, params.limit))
}

/// Create a new concert entry.
#[utoipa::path(
    post,
    path = "/concerts",
    tag = "concerts",
    request_body = ConcertPayload,
    responses(
        (status = 201, description = "Concert created", body = Concert),
        (status = 400, description = "Missing or invalid attributes", body = ErrorBody),
    )
)]
pub async fn create_concert(
    State(state): State<AppState>,
    negotiation: Negotiation,
    body: Bytes,
) -> Response {
    negotiation.reply(StatusCode::CREATED, create(&state, negotiation, &body))
}

fn create(state: &AppState, negotiation: Negotiation, body: &[u8]) -> Result<Concert, ApiError> {
    let payload: ConcertPayload = negotiation.decode(body)?;
    let concert = validate_create(payload)?;
    Ok(state.store.create(concert))
}

/// Get a single concert by ID.
#[utoipa::path(
    get,
    path = "/concerts/{concert_id}",
    tag = "concerts",
    params(("concert_id" = String, Path, description = "Concert UUID")),
    responses(
        (status = 200, description = "The concert", body = Concert),
        (status = 400, description = "Malformed concert ID", body = ErrorBody),
        (status = 404, description = "Concert not found", body = ErrorBody),
    )
)]
pub async fn show_concert(
    State(state): State<AppState>,
    negotiation: Negotiation,
    concert_id: Result<Path<String>, PathRejection>,
) -> Response {
    let result = concert_id
        .map_err(ApiError::from)
        .and_then(|Path(concert_id)| show(&state, &concert_id));
    negotiation.reply(StatusCode::OK, result)
}

fn show(state: &AppState, concert_id: &str) -> Result<Concert, ApiError> {
    validate_concert_id(concert_id)?;
    Ok(state.store.show(concert_id)?)
}

/// Update an existing concert by ID. Only supplied attributes change.
#[utoipa::path(
    put,
    path = "/concerts/{concert_id}",
    tag = "concerts",
    params(("concert_id" = String, Path, description = "ID of the concert to update")),
    request_body = ConcertPayload,
    responses(
        (status = 200, description = "The updated concert", body = Concert),
        (status = 400, description = "Malformed ID or invalid attributes", body = ErrorBody),
        (status = 404, description = "Concert not found", body = ErrorBody),
    )
)]
pub async fn update_concert(
    State(state): State<AppState>,
    negotiation: Negotiation,
    concert_id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Response {
    let result = concert_id
        .map_err(ApiError::from)
        .and_then(|Path(concert_id)| update(&state, negotiation, &concert_id, &body));
    negotiation.reply(StatusCode::OK, result)
}

fn update(
    state: &AppState,
    negotiation: Negotiation,
    concert_id: &str,
    body: &[u8],
) -> Result<Concert, ApiError> {
    validate_concert_id(concert_id)?;
    let changes: ConcertPayload = negotiation.decode(body)?;
    validate_update(&changes)?;
    Ok(state.store.update(concert_id, changes)?)
}

/// Remove a concert from the system by ID.
#[utoipa::path(
    delete,
    path = "/concerts/{concert_id}",
    tag = "concerts",
    params(("concert_id" = String, Path, description = "ID of the concert to remove")),
    responses(
        (status = 204, description = "Concert deleted"),
        (status = 400, description = "Malformed concert ID", body = ErrorBody),
        (status = 404, description = "Concert not found", body = ErrorBody),
    )
)]
pub async fn delete_concert(
    State(state): State<AppState>,
    negotiation: Negotiation,
    concert_id: Result<Path<String>, PathRejection>,
) -> Response {
    let result = concert_id
        .map_err(ApiError::from)
        .and_then(|Path(concert_id)| delete(&state, &concert_id));
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => negotiation.error(&err),
    }
}

fn delete(state: &AppState, concert_id: &str) -> Result<(), ApiError> {
    validate_concert_id(concert_id)?;
    Ok(state.store.delete(concert_id)?)
}
