use std::sync::Arc;

use crate::config::Config;
use crate::curation::relevance::RelevanceScorer;
use crate::store::DataStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Catalogs and major table, loaded once at startup and read-only afterwards.
    pub store: Arc<DataStore>,
    /// Pluggable relevance scorer. Default: KeywordRelevanceScorer.
    pub scorer: Arc<dyn RelevanceScorer>,
}
