use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::art::models::{Art, ArtPayload};
use crate::core::Result;

#[async_trait]
pub trait ArtRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Art>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Art>>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Art>>;
    async fn find_by_creator(&self, creator: &str) -> Result<Vec<Art>>;
    async fn find_by_gallery(&self, gallery: &str) -> Result<Vec<Art>>;
    async fn persist(&self, payload: ArtPayload) -> Result<Art>;
    async fn update(&self, id: i64, payload: ArtPayload) -> Result<Option<Art>>;
    async fn delete_by_id(&self, id: i64) -> Result<bool>;
}

#[derive(Debug, Default)]
struct ArtTable {
    rows: BTreeMap<i64, Art>,
    last_id: i64,
}

/// Art store keyed by id; listings come back in id order.
#[derive(Debug, Default)]
pub struct InMemoryArtRepository {
    table: RwLock<ArtTable>,
}

impl InMemoryArtRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filter(&self, predicate: impl Fn(&Art) -> bool) -> Vec<Art> {
        self.table
            .read()
            .await
            .rows
            .values()
            .filter(|&art| predicate(art))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ArtRepository for InMemoryArtRepository {
    async fn list_all(&self) -> Result<Vec<Art>> {
        Ok(self.filter(|_| true).await)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Art>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Art>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|art| art.name == name)
            .cloned())
    }

    async fn find_by_creator(&self, creator: &str) -> Result<Vec<Art>> {
        Ok(self.filter(|art| art.creator == creator).await)
    }

    async fn find_by_gallery(&self, gallery: &str) -> Result<Vec<Art>> {
        Ok(self.filter(|art| art.gallery == gallery).await)
    }

    async fn persist(&self, payload: ArtPayload) -> Result<Art> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let art = Art {
            id: table.last_id,
            name: payload.name.trim().to_string(),
            creator: payload.creator.trim().to_string(),
            gallery: payload.gallery,
        };
        table.rows.insert(art.id, art.clone());
        Ok(art)
    }

    async fn update(&self, id: i64, payload: ArtPayload) -> Result<Option<Art>> {
        let mut table = self.table.write().await;
        let Some(art) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        art.name = payload.name.trim().to_string();
        art.creator = payload.creator.trim().to_string();
        Ok(Some(art.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}
