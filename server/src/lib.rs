pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use routes::build_router;

use std::sync::Arc;

/// Shared handler state: the store plus the result-posting policy.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub admin_token: Option<String>,
}

impl<S> AppState<S> {
    pub fn new(store: S, admin_token: Option<String>) -> Self {
        Self { store: Arc::new(store), admin_token }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), admin_token: self.admin_token.clone() }
    }
}
