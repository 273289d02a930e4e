//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the stream directory, the optional LLM client and everything a
//! websocket connection needs to build its own `StreamView`. Chat sessions
//! are per connection and never stored here.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::chat::script::ChatScript;
use crate::chat::session::{SessionContext, rng_factory};
use crate::config::AppConfig;
use crate::llm::LlmChat;
use crate::services::catalog::Catalog;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<RwLock<Catalog>>,
    /// Template for each connection's stream view.
    pub session: SessionContext,
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, catalog: Catalog, script: ChatScript, llm: Option<Arc<dyn LlmChat>>) -> Self {
        let session = SessionContext { script: Arc::new(script), cadence: config.cadence, rng: rng_factory(config.rng_seed) };
        Self { config: Arc::new(config), catalog: Arc::new(RwLock::new(catalog)), session, llm }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
