use std::sync::Arc;

use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    cluster::{BatchRequest, BatchRouter, ClusterSnapshot, RouteResponse},
    core::{GalleryId, LocalOutcome, Result},
    gallery::{
        models::{
            ApiMessage, ApiResponse, BatchIdsQuery, Gallery, GalleryArt, LeaderUpdate,
            ServersUpdate,
        },
        repository::GalleryRepository,
        state::GalleryState,
    },
    web::{self, ErrorResponse},
};

pub async fn healthcheck() -> Json<ApiResponse<ApiMessage>> {
    Json(ApiResponse {
        data: ApiMessage {
            message: "ok".to_string(),
        },
    })
}

pub async fn get_gallery(
    State(state): State<GalleryState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<GalleryId>,
) -> web::Result<Response> {
    let cluster = state.cluster.snapshot()?;
    if !cluster.is_local(id) {
        return Ok(BatchRouter::temporary_redirect(&cluster, id, uri.path())?.into_response());
    }

    let outcome = gallery_outcome(state.repo.as_ref(), id).await?;
    Ok(outcome_response(outcome))
}

pub async fn get_gallery_arts(
    State(state): State<GalleryState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<GalleryId>,
) -> web::Result<Response> {
    let cluster = state.cluster.snapshot()?;
    if !cluster.is_local(id) {
        return Ok(BatchRouter::temporary_redirect(&cluster, id, uri.path())?.into_response());
    }

    let outcome = arts_outcome(state.repo.as_ref(), id).await?;
    Ok(outcome_response(outcome))
}

pub async fn append_gallery_arts(
    State(state): State<GalleryState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<GalleryId>,
    Json(arts): Json<Vec<GalleryArt>>,
) -> web::Result<Response> {
    let cluster = state.cluster.snapshot()?;
    if !cluster.is_local(id) {
        return Ok(BatchRouter::temporary_redirect(&cluster, id, uri.path())?.into_response());
    }

    let outcome = append_outcome(state.repo.as_ref(), id, arts).await?;
    Ok(outcome_response(outcome))
}

pub async fn replace_gallery_arts(
    State(state): State<GalleryState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<GalleryId>,
    Json(arts): Json<Vec<GalleryArt>>,
) -> web::Result<Response> {
    let cluster = state.cluster.snapshot()?;
    if !cluster.is_local(id) {
        return Ok(BatchRouter::temporary_redirect(&cluster, id, uri.path())?.into_response());
    }

    let outcome = replace_outcome(state.repo.as_ref(), id, arts).await?;
    Ok(outcome_response(outcome))
}

pub async fn read_gallery_batch(
    State(state): State<GalleryState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<BatchIdsQuery>,
) -> web::Result<RouteResponse> {
    let ids = query.parse()?;
    let cluster = state.cluster.snapshot()?;
    let request = BatchRequest::new(method, uri.path());

    let repo = Arc::clone(&state.repo);
    let response = state
        .router
        .route_read(&cluster, &ids, &request, |id| {
            let repo = Arc::clone(&repo);
            async move { gallery_outcome(repo.as_ref(), id).await }
        })
        .await?;
    Ok(response)
}

pub async fn read_arts_batch(
    State(state): State<GalleryState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<BatchIdsQuery>,
) -> web::Result<RouteResponse> {
    let ids = query.parse()?;
    let cluster = state.cluster.snapshot()?;
    let request = BatchRequest::new(method, uri.path());

    let repo = Arc::clone(&state.repo);
    let response = state
        .router
        .route_read(&cluster, &ids, &request, |id| {
            let repo = Arc::clone(&repo);
            async move { arts_outcome(repo.as_ref(), id).await }
        })
        .await?;
    Ok(response)
}

pub async fn append_arts_batch(
    State(state): State<GalleryState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Json(galleries): Json<Vec<Gallery>>,
) -> web::Result<RouteResponse> {
    let cluster = state.cluster.snapshot()?;
    let request = BatchRequest::new(method, uri.path());

    let repo = Arc::clone(&state.repo);
    let response = state
        .router
        .route_write(&cluster, galleries, &request, |gallery: Gallery| {
            let repo = Arc::clone(&repo);
            async move { append_outcome(repo.as_ref(), gallery.id, gallery.art_list).await }
        })
        .await?;
    Ok(response)
}

pub async fn replace_arts_batch(
    State(state): State<GalleryState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Json(galleries): Json<Vec<Gallery>>,
) -> web::Result<RouteResponse> {
    let cluster = state.cluster.snapshot()?;
    let request = BatchRequest::new(method, uri.path());

    let repo = Arc::clone(&state.repo);
    let response = state
        .router
        .route_write(&cluster, galleries, &request, |gallery: Gallery| {
            let repo = Arc::clone(&repo);
            async move { replace_outcome(repo.as_ref(), gallery.id, gallery.art_list).await }
        })
        .await?;
    Ok(response)
}

pub async fn cluster_view(State(state): State<GalleryState>) -> web::Result<Json<ClusterSnapshot>> {
    let snapshot = state.cluster.snapshot()?;
    Ok(Json(ClusterSnapshot::clone(&snapshot)))
}

pub async fn set_leader(
    State(state): State<GalleryState>,
    Json(payload): Json<LeaderUpdate>,
) -> web::Result<Json<ClusterSnapshot>> {
    let snapshot = state.cluster.set_leader(payload.leader_id)?;
    Ok(Json(ClusterSnapshot::clone(&snapshot)))
}

pub async fn replace_servers(
    State(state): State<GalleryState>,
    Json(payload): Json<ServersUpdate>,
) -> web::Result<Json<ClusterSnapshot>> {
    let snapshot = state.cluster.replace_servers(payload.servers)?;
    Ok(Json(ClusterSnapshot::clone(&snapshot)))
}

fn outcome_response(outcome: LocalOutcome) -> Response {
    (outcome.status, Json(outcome.entity)).into_response()
}

fn missing_gallery(id: GalleryId) -> Result<LocalOutcome> {
    LocalOutcome::new(
        StatusCode::NOT_FOUND,
        ErrorResponse {
            error: format!("gallery {} not found", id),
            code: "not_found".to_string(),
        },
    )
}

async fn gallery_outcome(repo: &dyn GalleryRepository, id: GalleryId) -> Result<LocalOutcome> {
    match repo.find_by_id(id).await? {
        Some(gallery) => LocalOutcome::ok(gallery),
        None => missing_gallery(id),
    }
}

async fn arts_outcome(repo: &dyn GalleryRepository, id: GalleryId) -> Result<LocalOutcome> {
    match repo.find_by_id(id).await? {
        Some(gallery) => LocalOutcome::ok(gallery.art_list),
        None => missing_gallery(id),
    }
}

async fn append_outcome(
    repo: &dyn GalleryRepository,
    id: GalleryId,
    arts: Vec<GalleryArt>,
) -> Result<LocalOutcome> {
    match repo.append_arts(id, arts).await? {
        Some(gallery) => LocalOutcome::created(gallery),
        None => missing_gallery(id),
    }
}

async fn replace_outcome(
    repo: &dyn GalleryRepository,
    id: GalleryId,
    arts: Vec<GalleryArt>,
) -> Result<LocalOutcome> {
    match repo.replace_arts(id, arts).await? {
        Some(gallery) => LocalOutcome::ok(gallery),
        None => missing_gallery(id),
    }
}
