use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::TodoStore;
use crate::error::AppError;
use crate::models::{Todo, TodoRequest};

#[derive(Clone)]
pub struct SqliteTodoStore {
    db: SqlitePool,
}

impl SqliteTodoStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, AppError> {
        let todo = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, completed FROM todos WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, AppError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, title, description, completed FROM todos ORDER BY id ASC"
        )
        .fetch_all(&self.db)
        .await?;
        Ok(todos)
    }

    async fn insert(&self, req: TodoRequest) -> Result<Todo, AppError> {
        let id = sqlx::query(
            "INSERT INTO todos (title, description, completed) VALUES (?1, ?2, ?3)"
        )
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.completed)
        .execute(&self.db)
        .await?
        .last_insert_rowid();

        debug!("inserted todo {}", id);
        Ok(Todo::from_request(id, req))
    }

    async fn save(&self, todo: &Todo) -> Result<Option<Todo>, AppError> {
        let result = sqlx::query(
            "UPDATE todos SET title = ?1, description = ?2, completed = ?3 WHERE id = ?4"
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.completed)
        .bind(todo.id)
        .execute(&self.db)
        .await?
        .rows_affected();

        if result == 0 {
            return Ok(None);
        }
        Ok(Some(todo.clone()))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        Ok(result > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}
