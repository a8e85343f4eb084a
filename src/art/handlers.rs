use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    art::{
        models::{Art, ArtPayload},
        state::ArtState,
    },
    core::CatalogError,
    web,
};

pub async fn list_arts(State(state): State<ArtState>) -> web::Result<Json<Vec<Art>>> {
    Ok(Json(state.repo.list_all().await?))
}

pub async fn get_art(
    State(state): State<ArtState>,
    Path(id): Path<i64>,
) -> web::Result<Json<Art>> {
    let art = state
        .repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| CatalogError::not_found(format!("art {}", id)))?;
    Ok(Json(art))
}

pub async fn get_art_by_name(
    State(state): State<ArtState>,
    Path(name): Path<String>,
) -> web::Result<Json<Art>> {
    let art = state
        .repo
        .find_by_name(&name)
        .await?
        .ok_or_else(|| CatalogError::not_found(format!("art named '{}'", name)))?;
    Ok(Json(art))
}

pub async fn list_arts_by_creator(
    State(state): State<ArtState>,
    Path(creator): Path<String>,
) -> web::Result<Json<Vec<Art>>> {
    Ok(Json(state.repo.find_by_creator(&creator).await?))
}

pub async fn list_arts_by_gallery(
    State(state): State<ArtState>,
    Path(gallery): Path<String>,
) -> web::Result<Json<Vec<Art>>> {
    Ok(Json(state.repo.find_by_gallery(&gallery).await?))
}

pub async fn create_art(
    State(state): State<ArtState>,
    Json(payload): Json<ArtPayload>,
) -> web::Result<(StatusCode, Json<Art>)> {
    validate_payload(&payload)?;

    let art = state.repo.persist(payload).await?;
    Ok((StatusCode::CREATED, Json(art)))
}

pub async fn update_art(
    State(state): State<ArtState>,
    Path(id): Path<i64>,
    Json(payload): Json<ArtPayload>,
) -> web::Result<Json<Art>> {
    validate_payload(&payload)?;

    let art = state
        .repo
        .update(id, payload)
        .await?
        .ok_or_else(|| CatalogError::not_found(format!("art {}", id)))?;
    Ok(Json(art))
}

pub async fn delete_art(
    State(state): State<ArtState>,
    Path(id): Path<i64>,
) -> web::Result<StatusCode> {
    if !state.repo.delete_by_id(id).await? {
        return Err(CatalogError::BadRequest(format!("art {} does not exist", id)).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn validate_payload(payload: &ArtPayload) -> Result<(), CatalogError> {
    if payload.name.trim().is_empty() {
        return Err(CatalogError::validation("name must not be blank"));
    }
    if payload.creator.trim().is_empty() {
        return Err(CatalogError::validation("creator must not be blank"));
    }
    Ok(())
}
