use std::sync::Arc;

use crate::applications::listing::ListLimits;
use crate::applications::store::ApplicationStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence accessor. Production: `PgApplicationStore`.
    pub store: Arc<dyn ApplicationStore>,
    pub list_limits: ListLimits,
}
