use axum::http::HeaderValue;

use crate::services::TodoService;

#[derive(Clone)]
pub struct AppState {
    pub todos: TodoService,
    pub csrf_enforce: bool,
    /// Browser origin allowed to call the API cross-site. `None` disables CORS.
    pub cors_origin: Option<HeaderValue>,
}

impl AppState {
    /// State with CSRF enforcement and CORS turned off.
    pub fn new(todos: TodoService) -> Self {
        Self {
            todos,
            csrf_enforce: false,
            cors_origin: None,
        }
    }

    pub fn with_csrf_enforcement(mut self, enforce: bool) -> Self {
        self.csrf_enforce = enforce;
        self
    }

    pub fn with_cors_origin(mut self, origin: HeaderValue) -> Self {
        self.cors_origin = Some(origin);
        self
    }
}
