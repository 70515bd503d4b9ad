use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
};
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    errors::ApiError,
    handlers::common::{
        created_response, map_service_error, success_response, validate_input, MutationResponse,
    },
    services::entrances::EntranceInput,
    services::exits::ExitItem,
    AppState,
};

/// Body of `PATCH /entrances/{id}/exits`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StageExitsRequest {
    pub platforms: i32,
    pub exit_date: Option<NaiveDateTime>,
}

/// Body of `POST /entrances/exits/batch`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExitBatchRequest {
    #[serde(default)]
    pub items: Vec<ExitItem>,
}

#[utoipa::path(
    get,
    path = "/api/v1/entrances",
    responses(
        (status = 200, description = "Entrance summaries with lines and resolved rates", body = [crate::services::entrances::EntranceSummary])
    ),
    tag = "entrances"
)]
pub async fn list_entrances(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = state
        .services
        .entrances
        .list()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(summaries))
}

#[utoipa::path(
    get,
    path = "/api/v1/entrances/{id}",
    params(("id" = i32, Path, description = "Entrance ID")),
    responses(
        (status = 200, description = "Full entrance detail", body = crate::services::entrances::EntranceDetail),
        (status = 404, description = "Entrance not found", body = crate::errors::ErrorResponse)
    ),
    tag = "entrances"
)]
pub async fn get_entrance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .entrances
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

#[utoipa::path(
    get,
    path = "/api/v1/entrances/search/part-number/{text}",
    params(("text" = String, Path, description = "Part number fragment")),
    responses(
        (status = 200, description = "Matches grouped by part number", body = [crate::services::entrances::PartNumberSearchGroup])
    ),
    tag = "entrances"
)]
pub async fn search_by_part_number(
    State(state): State<Arc<AppState>>,
    Path(text): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let groups = state
        .services
        .entrances
        .search_by_part_number(&text)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(groups))
}

#[utoipa::path(
    get,
    path = "/api/v1/entrances/search/folio/{folio}",
    params(("folio" = i32, Path, description = "Folio number")),
    responses(
        (status = 200, description = "Folio matches plus active inventory snapshot", body = crate::services::entrances::FolioSearchResponse)
    ),
    tag = "entrances"
)]
pub async fn search_by_folio(
    State(state): State<Arc<AppState>>,
    Path(folio): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state
        .services
        .entrances
        .search_by_folio(folio)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/entrances",
    request_body = EntranceInput,
    responses(
        (status = 201, description = "Entrance created", body = MutationResponse),
        (status = 400, description = "Validation failure or duplicate folio", body = crate::errors::ErrorResponse)
    ),
    tag = "entrances"
)]
pub async fn create_entrance(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EntranceInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let now = Utc::now().naive_utc();
    let id = state
        .services
        .entrances
        .create(payload, now)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(MutationResponse::with_id(
        "entrance created",
        id,
    )))
}

#[utoipa::path(
    put,
    path = "/api/v1/entrances/{id}",
    params(("id" = i32, Path, description = "Entrance ID")),
    request_body = EntranceInput,
    responses(
        (status = 200, description = "Entrance updated", body = MutationResponse),
        (status = 400, description = "Validation failure or folio collision", body = crate::errors::ErrorResponse),
        (status = 404, description = "Entrance not found", body = crate::errors::ErrorResponse)
    ),
    tag = "entrances"
)]
pub async fn update_entrance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<EntranceInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let now = Utc::now().naive_utc();
    let id = state
        .services
        .entrances
        .update(id, payload, now)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(MutationResponse::with_id(
        "entrance updated",
        id,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/entrances/{id}/exits",
    params(("id" = i32, Path, description = "Entrance ID")),
    request_body = StageExitsRequest,
    responses(
        (status = 200, description = "Exit record updated", body = MutationResponse),
        (status = 400, description = "New pallet count exceeds the current one", body = crate::errors::ErrorResponse),
        (status = 404, description = "Entrance not found", body = crate::errors::ErrorResponse)
    ),
    tag = "entrances"
)]
pub async fn update_exits(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<StageExitsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now().naive_utc();
    state
        .services
        .entrances
        .update_exits(id, payload.platforms, payload.exit_date, now)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(MutationResponse::ok("exit record updated")))
}

#[utoipa::path(
    post,
    path = "/api/v1/entrances/exits/batch",
    request_body = ExitBatchRequest,
    responses(
        (status = 200, description = "Batch processed; per-item outcomes inside", body = crate::services::exits::ExitBatchOutcome),
        (status = 400, description = "Empty batch", body = crate::errors::ErrorResponse)
    ),
    tag = "entrances"
)]
pub async fn process_exit_batch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExitBatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now().naive_utc();
    let outcome = state
        .services
        .exits
        .process_exits(payload.items, now)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(outcome))
}

#[utoipa::path(
    delete,
    path = "/api/v1/entrances/{id}",
    params(("id" = i32, Path, description = "Entrance ID")),
    responses(
        (status = 200, description = "Entrance and lines deleted", body = MutationResponse),
        (status = 404, description = "Entrance not found", body = crate::errors::ErrorResponse)
    ),
    tag = "entrances"
)]
pub async fn delete_entrance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .entrances
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(MutationResponse::ok("entrance deleted")))
}
