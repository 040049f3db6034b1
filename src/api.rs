//! HTTP API for the tutoring session

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::runtime::SharedRuntime;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<SharedRuntime>,
}

impl AppState {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self {
            runtime: Arc::new(runtime),
        }
    }
}
