use std::sync::Arc;

use crate::art::repository::ArtRepository;

#[derive(Clone)]
pub struct ArtState {
    pub repo: Arc<dyn ArtRepository>,
}

impl ArtState {
    pub fn new(repo: Arc<dyn ArtRepository>) -> Self {
        Self { repo }
    }
}
