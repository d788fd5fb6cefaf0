//! The file translation service object.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use translation_core::TranslationConfig;

use crate::codec::{ImageCodec, RasterCodec};
use crate::converters::{Converter, builtin_converters};
use crate::executor::ToolExecutor;
use crate::registry::ConverterRegistry;
use crate::tools::{PDFTK, PDFTOPPM, PageTools, PdfToolkit};

/// Owns the resolved configuration, the two adapters, and the converter
/// registry. Routes are bound from it by the HTTP layer.
#[derive(Debug, Clone)]
pub struct FileTranslation {
    config: Arc<TranslationConfig>,
    tools: Arc<dyn PageTools>,
    codec: Arc<dyn ImageCodec>,
    registry: ConverterRegistry,
}

impl FileTranslation {
    /// Build the service with the `image`-crate codec and the external PDF
    /// toolkit, registering the built-in converters.
    pub fn new(config: TranslationConfig) -> Self {
        let codec: Arc<dyn ImageCodec> = Arc::new(RasterCodec::new(config.max_output_pixels));
        let tools: Arc<dyn PageTools> = Arc::new(PdfToolkit::new(&config, Arc::clone(&codec)));
        Self::with_adapters(config, tools, codec)
    }

    /// Build the service around caller-supplied adapters.
    pub fn with_adapters(
        config: TranslationConfig,
        tools: Arc<dyn PageTools>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        let mut service = Self {
            config: Arc::new(config),
            tools: Arc::clone(&tools),
            codec: Arc::clone(&codec),
            registry: ConverterRegistry::new(),
        };

        for (pattern, converter) in builtin_converters(tools, codec) {
            service.add_converter(pattern, converter);
        }

        service
    }

    /// Register (or replace) the converter for `pattern`.
    ///
    /// Routes already bound are unaffected; bind again to expose it.
    pub fn add_converter(&mut self, pattern: impl Into<String>, converter: Arc<dyn Converter>) {
        let pattern = pattern.into();

        if self.config.log_level > 0 {
            info!(pattern = %pattern, "Registered converter");
        }

        if self.registry.register(pattern.clone(), converter) {
            info!(pattern = %pattern, "Replaced existing converter");
        }
    }

    /// Registered patterns in registration order.
    pub fn converters(&self) -> Vec<String> {
        self.registry.patterns().map(str::to_string).collect()
    }

    /// The converter registry.
    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// The resolved configuration.
    pub fn config(&self) -> &Arc<TranslationConfig> {
        &self.config
    }

    /// The PDF page tools adapter.
    pub fn tools(&self) -> &Arc<dyn PageTools> {
        &self.tools
    }

    /// The image codec adapter.
    pub fn codec(&self) -> &Arc<dyn ImageCodec> {
        &self.codec
    }

    /// Configured external tools that cannot be found, as `(label, path)`.
    pub async fn missing_tools(&self) -> Vec<(&'static str, PathBuf)> {
        let executor = ToolExecutor::new(self.config.log_level);
        let mut missing = Vec::new();

        for (label, path) in [
            (PDFTK, &self.config.pdftk_path),
            (PDFTOPPM, &self.config.pdftoppm_path),
        ] {
            if !executor.is_available(path).await {
                missing.push((label, path.clone()));
            }
        }

        missing
    }
}
