use std::sync::Arc;

use tracing::info;

use crate::db::TodoStore;
use crate::error::AppError;
use crate::models::{Todo, TodoRequest};

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn get_todo_by_id(&self, id: i64) -> Result<Todo, AppError> {
        self.store.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    pub async fn get_all_todos(&self) -> Result<Vec<Todo>, AppError> {
        self.store.find_all().await
    }

    pub async fn create_todo(&self, req: TodoRequest) -> Result<Todo, AppError> {
        let todo = self.store.insert(req).await?;
        info!("Created todo {}", todo.id);
        Ok(todo)
    }

    /// Replaces every mutable field of todo `id`. The id itself never changes.
    pub async fn update_todo(&self, id: i64, req: TodoRequest) -> Result<Todo, AppError> {
        let todo = self
            .store
            .save(&Todo::from_request(id, req))
            .await?
            .ok_or(AppError::NotFound)?;
        info!("Updated todo {}", id);
        Ok(todo)
    }

    pub async fn delete_todo(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete_by_id(id).await? {
            return Err(AppError::NotFound);
        }
        info!("Deleted todo {}", id);
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.ping().await
    }
}
