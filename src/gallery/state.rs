use std::sync::Arc;

use crate::cluster::{BatchRouter, ClusterState};
use crate::gallery::repository::GalleryRepository;

#[derive(Clone)]
pub struct GalleryState {
    pub cluster: Arc<ClusterState>,
    pub router: BatchRouter,
    pub repo: Arc<dyn GalleryRepository>,
}

impl GalleryState {
    pub fn new(
        cluster: Arc<ClusterState>,
        router: BatchRouter,
        repo: Arc<dyn GalleryRepository>,
    ) -> Self {
        Self {
            cluster,
            router,
            repo,
        }
    }
}
