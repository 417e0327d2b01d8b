use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_backend::api::router;
use todo_backend::config::{AppConfig, StoreKind};
use todo_backend::db::{self, InMemoryTodoStore, SqliteTodoStore, TodoStore};
use todo_backend::services::TodoService;
use todo_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "todo_backend=debug,tower_http=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store: Arc<dyn TodoStore> = match config.store {
        StoreKind::Sqlite => {
            let pool = db::connect(&config.database_url, config.max_connections).await?;
            Arc::new(SqliteTodoStore::new(pool))
        }
        StoreKind::Memory => {
            info!("using in-memory todo store; data is lost on exit");
            Arc::new(InMemoryTodoStore::new())
        }
    };

    let state = AppState::new(TodoService::new(store))
        .with_csrf_enforcement(config.csrf_enforce)
        .with_cors_origin(config.cors_allowed_origin.clone());

    let app = router(state);

    let addr = config.addr();
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
