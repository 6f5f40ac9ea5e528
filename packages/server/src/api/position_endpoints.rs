//! Position Endpoints
//!
//! # Endpoints
//!
//! - `GET /positions?search=` - List positions, optionally filtered
//! - `POST /positions` - Create a position
//! - `GET /positions/hierarchy` - Whole forest, nested
//! - `GET /positions/integrity` - Dangling/unreachable record sweep
//! - `GET /positions/:id` - Get a position by ID
//! - `PUT /positions/:id` - Update a position
//! - `DELETE /positions/:id` - Delete a position without children
//! - `GET /positions/:id/children` - Direct children
//! - `DELETE /positions/:id/cascade` - Delete a position and its subtree
//! - `DELETE /positions/:id/reassign` - Delete a position, children move up

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use serde::Deserialize;

use crate::api::{AppState, HttpError};
use orgchart_core::{IntegrityReport, Position, PositionInput};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive match against name or description
    search: Option<String>,
}

/// Unwrap a JSON body, reporting malformed input as a validation error
fn json_body(body: Result<Json<PositionInput>, JsonRejection>) -> Result<PositionInput, HttpError> {
    body.map(|Json(input)| input).map_err(|rejection| {
        HttpError::with_details(
            "Invalid position payload",
            "VALIDATION_ERROR",
            rejection.body_text(),
        )
    })
}

/// List all positions
///
/// # Example
///
/// ```bash
/// curl "http://localhost:5063/positions?search=engineer"
/// ```
async fn list_positions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Position>>, HttpError> {
    let positions = match query.search.as_deref() {
        Some(term) => state.positions.search_positions(term).await?,
        None => state.positions.list_positions().await?,
    };

    tracing::debug!("Listed {} position(s)", positions.len());
    Ok(Json(positions))
}

/// Create a new position
///
/// Responds `201 Created` with a `Location` header.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:5063/positions \
///   -H "Content-Type: application/json" \
///   -d '{"name": "CTO", "description": "Technology", "parentId": "<ceo-id>"}'
/// ```
async fn create_position(
    State(state): State<AppState>,
    body: Result<Json<PositionInput>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let input = json_body(body)?;
    let position = state.positions.create_position(input).await?;

    let location = format!("/positions/{}", position.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(position),
    ))
}

async fn get_hierarchy(State(state): State<AppState>) -> Result<Json<Vec<Position>>, HttpError> {
    Ok(Json(state.positions.get_hierarchy().await?))
}

async fn check_integrity(State(state): State<AppState>) -> Result<Json<IntegrityReport>, HttpError> {
    Ok(Json(state.positions.check_integrity().await?))
}

async fn get_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Position>, HttpError> {
    state
        .positions
        .get_position(&id)
        .await?
        .map(Json)
        .ok_or_else(|| HttpError::not_found(&id))
}

/// Direct children of a position
///
/// An unknown id yields an empty list. `parentName` is not resolved here.
async fn get_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Position>>, HttpError> {
    Ok(Json(state.positions.get_children(&id).await?))
}

/// Update an existing position
///
/// # Example
///
/// ```bash
/// curl -X PUT http://localhost:5063/positions/<id> \
///   -H "Content-Type: application/json" \
///   -d '{"name": "VP Engineering", "description": "", "parentId": null}'
/// ```
async fn update_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PositionInput>, JsonRejection>,
) -> Result<Json<Position>, HttpError> {
    let input = json_body(body)?;
    state
        .positions
        .update_position(&id, input)
        .await?
        .map(Json)
        .ok_or_else(|| HttpError::not_found(&id))
}

/// Delete a position that has no children
async fn delete_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    if state.positions.delete_position(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::not_found(&id))
    }
}

/// Delete a position together with every descendant
async fn delete_position_cascade(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    let deleted = state
        .positions
        .delete_position_cascade(&id)
        .await
        .map_err(|e| HttpError::operation_failed("cascade delete", e))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::not_found(&id))
    }
}

/// Delete a position and move its direct children to its parent
async fn delete_position_with_reassignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpError> {
    let deleted = state
        .positions
        .delete_position_with_reassignment(&id)
        .await
        .map_err(|e| HttpError::operation_failed("delete with reassignment", e))?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::not_found(&id))
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/positions", get(list_positions).post(create_position))
        .route("/positions/hierarchy", get(get_hierarchy))
        .route("/positions/integrity", get(check_integrity))
        .route(
            "/positions/:id",
            get(get_position)
                .put(update_position)
                .delete(delete_position),
        )
        .route("/positions/:id/children", get(get_children))
        .route("/positions/:id/cascade", delete(delete_position_cascade))
        .route("/positions/:id/reassign", delete(delete_position_with_reassignment))
        .with_state(state)
}
