use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cluster::BatchWriteTarget;
use crate::core::{CatalogError, GalleryId, Result};

/// Art piece as held in a gallery's collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GalleryArt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub creator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gallery {
    pub id: GalleryId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "artList", default)]
    pub art_list: Vec<GalleryArt>,
}

impl Gallery {
    pub fn new(id: GalleryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            art_list: Vec::new(),
        }
    }
}

impl BatchWriteTarget for Gallery {
    fn target_id(&self) -> GalleryId {
        self.id
    }

    /// Peers expose single-gallery art endpoints, so only the art list travels.
    fn forward_body(&self) -> Result<Value> {
        serde_json::to_value(&self.art_list).map_err(|err| CatalogError::Internal(err.to_string()))
    }
}

/// `?ids=1,2,3` on batch read endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchIdsQuery {
    #[serde(default)]
    pub ids: String,
}

impl BatchIdsQuery {
    /// Parses the comma-separated id list, keeping order and duplicates.
    pub fn parse(&self) -> Result<Vec<GalleryId>> {
        self.ids
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse::<GalleryId>().map_err(|_| {
                    CatalogError::BadRequest(format!("'{}' is not a valid gallery id", raw))
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderUpdate {
    pub leader_id: GalleryId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServersUpdate {
    pub servers: std::collections::BTreeMap<GalleryId, crate::core::ServerAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gallery_uses_art_list_field_name() {
        let gallery: Gallery = serde_json::from_value(json!({
            "id": 2,
            "artList": [{"name": "Starry Night", "creator": "Van Gogh"}]
        }))
        .unwrap();

        assert_eq!(gallery.art_list.len(), 1);
        assert_eq!(
            gallery.forward_body().unwrap(),
            json!([{"name": "Starry Night", "creator": "Van Gogh"}])
        );
    }

    #[test]
    fn batch_ids_keep_order_and_reject_garbage() {
        let query = BatchIdsQuery {
            ids: "3, 1,2,".to_string(),
        };
        assert_eq!(query.parse().unwrap(), vec![3, 1, 2]);

        let bad = BatchIdsQuery {
            ids: "1,two".to_string(),
        };
        assert!(matches!(bad.parse(), Err(CatalogError::BadRequest(_))));
    }
}
