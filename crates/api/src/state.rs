use std::sync::Arc;

use ai_client::OllamaClientConfig;
use store::DocumentStore;

/// Shared handler state: the injected document store and the AI client
/// configuration (a client is built per request on a blocking thread, since
/// the ai_client crate speaks blocking HTTP).
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub ai: OllamaClientConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, ai: OllamaClientConfig) -> Self {
        Self { store, ai }
    }
}
