use axum::{
    Router,
    routing::{get, put},
};
use tower_http::trace::TraceLayer;

use crate::{
    core::{GalleryId, Result},
    gallery::{handlers, models::Gallery, repository::GalleryRepository, state::GalleryState},
};

pub fn build_router(state: GalleryState) -> Router {
    Router::new()
        .route("/health", get(handlers::healthcheck))
        .route("/galleries/batch", get(handlers::read_gallery_batch))
        .route(
            "/galleries/batch/arts",
            get(handlers::read_arts_batch)
                .post(handlers::append_arts_batch)
                .put(handlers::replace_arts_batch),
        )
        .route("/galleries/:id", get(handlers::get_gallery))
        .route(
            "/galleries/:id/arts",
            get(handlers::get_gallery_arts)
                .post(handlers::append_gallery_arts)
                .put(handlers::replace_gallery_arts),
        )
        .route("/cluster", get(handlers::cluster_view))
        .route("/cluster/leader", put(handlers::set_leader))
        .route("/cluster/servers", put(handlers::replace_servers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Makes sure the gallery hosted by this server exists, leaving stored art alone.
pub async fn ensure_local_gallery(
    repo: &dyn GalleryRepository,
    id: GalleryId,
    name: &str,
) -> Result<Gallery> {
    if let Some(existing) = repo.find_by_id(id).await? {
        return Ok(existing);
    }
    repo.save(Gallery::new(id, name)).await
}
