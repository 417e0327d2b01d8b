use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::{Extension, Json};
use axum::{Router, http::StatusCode, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::csrf::{CsrfToken, csrf_layer};
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub const GREETING: &str = "Hello! Welcome to Todo Webapp.";

pub fn router(state: AppState) -> Router {
    let csrf = csrf_layer(state.csrf_enforce);
    let cors = state.cors_origin.clone().map(cors_layer);

    let router = Router::new()
        .route("/", get(greet))
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/csrf-token", get(csrf_token))
        .layer(csrf)
        .with_state(state);

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-xsrf-token")])
        .allow_credentials(true)
}

async fn greet() -> &'static str {
    GREETING
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.todos.health_check().await?;
    Ok(StatusCode::OK)
}

async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, AppError> {
    let todos = state.todos.get_all_todos().await?;
    Ok(Json(todos))
}

async fn get_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Todo>, AppError> {
    let todo = state.todos.get_todo_by_id(todo_id(id)?).await?;
    Ok(Json(todo))
}

async fn create_todo(
    State(state): State<AppState>,
    req: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let todo = state.todos.create_todo(todo_body(req)?).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    req: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<Json<Todo>, AppError> {
    let todo = state
        .todos
        .update_todo(todo_id(id)?, todo_body(req)?)
        .await?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    state.todos.delete_todo(todo_id(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn csrf_token(Extension(token): Extension<CsrfToken>) -> Json<CsrfToken> {
    Json(token)
}

fn todo_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    id.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn todo_body(req: Result<Json<TodoRequest>, JsonRejection>) -> Result<TodoRequest, AppError> {
    req.map(|Json(req)| req)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}
