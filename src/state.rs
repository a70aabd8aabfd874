// src/state.rs

use std::sync::Arc;

use crate::config::AppConfig;
use crate::llm::CompletionProvider;
use crate::store::ChatStore;

/// Shared application state, assembled once in `main` and injected into every
/// handler. Trait objects at both seams so tests can swap in an in-memory
/// store or a fake completion provider.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChatStore>,
    pub completions: Arc<dyn CompletionProvider>,
    pub config: Arc<AppConfig>,
}
