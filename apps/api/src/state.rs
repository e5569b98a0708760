use std::sync::Arc;

use crate::generation::Generator;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Every LLM-backed task runs through this handle.
    pub generator: Generator,
}
