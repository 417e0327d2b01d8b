use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::db::TodoStore;
use crate::error::AppError;
use crate::models::{Todo, TodoRequest};

#[derive(Default)]
struct Inner {
    todos: BTreeMap<i64, Todo>,
    last_id: i64,
}

/// Process-local store. Ids keep growing after deletes, like `AUTOINCREMENT`.
#[derive(Default)]
pub struct InMemoryTodoStore {
    inner: RwLock<Inner>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, AppError> {
        Ok(self.inner.read().await.todos.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Todo>, AppError> {
        Ok(self.inner.read().await.todos.values().cloned().collect())
    }

    async fn insert(&self, req: TodoRequest) -> Result<Todo, AppError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let todo = Todo::from_request(inner.last_id, req);
        inner.todos.insert(todo.id, todo.clone());
        debug!("inserted todo {}", todo.id);
        Ok(todo)
    }

    async fn save(&self, todo: &Todo) -> Result<Option<Todo>, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.todos.get_mut(&todo.id).map(|stored| {
            *stored = todo.clone();
            todo.clone()
        }))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.write().await.todos.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
