pub mod error;
pub mod types;

pub use error::{CatalogError, Result};
pub use types::{GalleryId, LocalOutcome, ServerAddress};
