//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers and the edge guard via the
//! `State` extractor. It holds the parsed config and the identity service
//! behind a trait object so tests can substitute a mock backend.

use std::sync::Arc;

use crate::config::Config;
use crate::services::identity::IdentityService;

/// Shared application state. Clone is required by Axum; every field is
/// Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityService>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, identity: Arc<dyn IdentityService>) -> Self {
        Self { config: Arc::new(config), identity }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
