//! HTTP API for the thinking partner
//!
//! `POST /chat` and `POST /feedback` each run exactly one turn of the
//! session named in the body; `GET /health` is a liveness probe.

mod handlers;
mod types;


pub use handlers::create_router;

use crate::runtime::SharedExecutor;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<SharedExecutor>,
}

impl AppState {
    pub fn new(executor: SharedExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }
}
