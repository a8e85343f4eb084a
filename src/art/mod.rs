//! Art service: CRUD over art records.

pub mod app;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod state;

pub use app::build_router;
pub use models::{Art, ArtPayload};
pub use repository::{ArtRepository, InMemoryArtRepository};
pub use state::ArtState;
