//! HTTP endpoint for the voice platform
//!
//! The platform POSTs one request envelope per invocation and renders
//! whatever directive comes back.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::skill::Dispatcher;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}
