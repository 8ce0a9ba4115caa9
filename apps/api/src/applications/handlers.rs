use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::applications::listing::{list_applications, ListOptions, ListParams, ListResponse};
use crate::applications::stats::{compute_stats, StatsResponse};
use crate::applications::validation::{validate_create, validate_update};
use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::models::application::JobApplication;
use crate::state::AppState;

const NOT_FOUND: &str = "Application not found";

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// POST /api/applications
pub async fn handle_create(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<JobApplication>), AppError> {
    let payload = json_body(payload)?;
    let new = validate_create(&payload).map_err(AppError::Validation)?;
    let app = state.store.insert(user.id(), &new).await?;
    Ok((StatusCode::CREATED, Json(app)))
}

/// GET /api/applications
pub async fn handle_list(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse>, AppError> {
    let Query(params) =
        query.map_err(|rejection| AppError::invalid("query", rejection.body_text()))?;
    let options = ListOptions::from_params(&params, state.list_limits)?;
    let response =
        list_applications(state.store.as_ref(), user.id(), options, state.list_limits).await?;
    Ok(Json(response))
}

/// GET /api/applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<JobApplication>, AppError> {
    let id = parse_id(&id)?;
    state
        .store
        .find(user.id(), id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// PUT /api/applications/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<JobApplication>, AppError> {
    let payload = json_body(payload)?;
    let patch = validate_update(&payload).map_err(AppError::Validation)?;
    let id = parse_id(&id)?;
    state
        .store
        .update(user.id(), id, &patch)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// DELETE /api/applications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_id(&id)?;
    if !state.store.delete(user.id(), id).await? {
        return Err(not_found());
    }
    Ok(Json(DeleteResponse {
        message: "Application deleted",
    }))
}

/// GET /api/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<StatsResponse>, AppError> {
    Ok(Json(compute_stats(state.store.as_ref(), user.id()).await?))
}

fn not_found() -> AppError {
    AppError::NotFound(NOT_FOUND.to_string())
}

/// Ids that cannot exist are reported exactly like ids owned by someone else.
fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(not_found)
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::invalid("body", rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_positive_integers() {
        assert_eq!(parse_id("12").unwrap(), 12);
    }

    #[test]
    fn test_parse_id_maps_garbage_to_not_found() {
        for raw in ["abc", "0", "-1", "99999999999"] {
            match parse_id(raw) {
                Err(AppError::NotFound(msg)) => assert_eq!(msg, NOT_FOUND),
                other => panic!("expected not found for {raw}, got {other:?}"),
            }
        }
    }
}
