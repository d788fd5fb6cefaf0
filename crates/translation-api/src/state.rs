//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use translation_converter::{ConverterRegistry, FileTranslation};
use translation_core::TranslationConfig;

/// State passed to handlers via `State<AppState>`.
///
/// A snapshot of the service taken when routes are bound; converters added
/// afterwards need a fresh router.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Resolved service configuration.
    pub config: Arc<TranslationConfig>,
    /// Converters the routes were bound from.
    pub registry: Arc<ConverterRegistry>,
}

impl AppState {
    /// Snapshot `translation`.
    pub fn new(translation: &FileTranslation) -> Self {
        Self {
            config: Arc::clone(translation.config()),
            registry: Arc::new(translation.registry().clone()),
        }
    }
}
