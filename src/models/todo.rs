use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Body accepted by create and update. An `id` sent by the client is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Builds the stored form of `req` under an already assigned id.
    pub fn from_request(id: i64, req: TodoRequest) -> Self {
        Self {
            id,
            title: req.title,
            description: req.description,
            completed: req.completed,
        }
    }
}
