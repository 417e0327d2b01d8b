//! Persistence for todos.
//!
//! [`TodoStore`] is the seam the service talks to. [`SqliteTodoStore`] is the
//! production backend; [`InMemoryTodoStore`] keeps everything in process.

pub mod memory;
pub mod repository;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::error::AppError;
use crate::models::{Todo, TodoRequest};

pub use memory::InMemoryTodoStore;
pub use repository::SqliteTodoStore;

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, AppError>;
    /// All todos in ascending id order.
    async fn find_all(&self) -> Result<Vec<Todo>, AppError>;
    /// Persists a new todo under a freshly assigned id.
    async fn insert(&self, req: TodoRequest) -> Result<Todo, AppError>;
    /// Replaces the todo stored under `todo.id` in one write. Returns `None`
    /// when no such todo exists; a missing id is never re-created.
    async fn save(&self, todo: &Todo) -> Result<Option<Todo>, AppError>;
    /// Returns `false` when no todo had this id.
    async fn delete_by_id(&self, id: i64) -> Result<bool, AppError>;
    async fn ping(&self) -> Result<(), AppError>;
}

/// Opens a pool for `database_url` and brings the schema up to date.
///
/// In-memory databases live and die with their connection, so they get a
/// single connection that is never recycled.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?
    };

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database ready at {}", database_url);

    Ok(pool)
}
