use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::{GalleryId, Result};
use crate::gallery::models::{Gallery, GalleryArt};

#[async_trait]
pub trait GalleryRepository: Send + Sync {
    async fn find_by_id(&self, id: GalleryId) -> Result<Option<Gallery>>;
    async fn save(&self, gallery: Gallery) -> Result<Gallery>;
    async fn append_arts(&self, id: GalleryId, arts: Vec<GalleryArt>) -> Result<Option<Gallery>>;
    async fn replace_arts(&self, id: GalleryId, arts: Vec<GalleryArt>)
    -> Result<Option<Gallery>>;
}

#[derive(Debug)]
pub struct InMemoryGalleryRepository {
    galleries: RwLock<HashMap<GalleryId, Gallery>>,
    next_art_id: AtomicI64,
}

impl Default for InMemoryGalleryRepository {
    fn default() -> Self {
        Self {
            galleries: RwLock::new(HashMap::new()),
            next_art_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryGalleryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_ids(&self, arts: &mut [GalleryArt]) {
        for art in arts {
            if art.id.is_none() {
                art.id = Some(self.next_art_id.fetch_add(1, Ordering::Relaxed));
            }
        }
    }
}

#[async_trait]
impl GalleryRepository for InMemoryGalleryRepository {
    async fn find_by_id(&self, id: GalleryId) -> Result<Option<Gallery>> {
        Ok(self.galleries.read().await.get(&id).cloned())
    }

    async fn save(&self, mut gallery: Gallery) -> Result<Gallery> {
        self.assign_ids(&mut gallery.art_list);
        self.galleries
            .write()
            .await
            .insert(gallery.id, gallery.clone());
        Ok(gallery)
    }

    async fn append_arts(
        &self,
        id: GalleryId,
        mut arts: Vec<GalleryArt>,
    ) -> Result<Option<Gallery>> {
        let mut galleries = self.galleries.write().await;
        let Some(gallery) = galleries.get_mut(&id) else {
            return Ok(None);
        };
        self.assign_ids(&mut arts);
        gallery.art_list.extend(arts);
        Ok(Some(gallery.clone()))
    }

    async fn replace_arts(
        &self,
        id: GalleryId,
        mut arts: Vec<GalleryArt>,
    ) -> Result<Option<Gallery>> {
        let mut galleries = self.galleries.write().await;
        let Some(gallery) = galleries.get_mut(&id) else {
            return Ok(None);
        };
        self.assign_ids(&mut arts);
        gallery.art_list = arts;
        Ok(Some(gallery.clone()))
    }
}
