//! Gallery service: hosts one gallery per server and routes batch requests
//! across the cluster.

pub mod app;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod state;

pub use app::{build_router, ensure_local_gallery};
pub use models::{Gallery, GalleryArt};
pub use repository::{GalleryRepository, InMemoryGalleryRepository};
pub use state::GalleryState;
