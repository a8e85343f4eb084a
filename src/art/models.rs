use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Art {
    pub id: i64,
    pub name: String,
    pub creator: String,
    pub gallery: String,
}

/// Body of `POST /arts` and `PUT /arts/:id`. Updates only apply name and creator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtPayload {
    pub name: String,
    pub creator: String,
    #[serde(default)]
    pub gallery: String,
}
