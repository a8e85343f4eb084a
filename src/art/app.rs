use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::art::{handlers, state::ArtState};

pub fn build_router(state: ArtState) -> Router {
    Router::new()
        .route("/arts", get(handlers::list_arts).post(handlers::create_art))
        .route(
            "/arts/:id",
            get(handlers::get_art)
                .put(handlers::update_art)
                .delete(handlers::delete_art),
        )
        .route("/arts/name/:name", get(handlers::get_art_by_name))
        .route("/arts/creator/:creator", get(handlers::list_arts_by_creator))
        .route("/arts/gallery/:gallery", get(handlers::list_arts_by_gallery))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
