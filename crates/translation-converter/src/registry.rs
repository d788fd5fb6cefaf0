//! Converter registry: route pattern → converter.

use std::sync::Arc;

use crate::converters::Converter;

/// Registered converters keyed by route pattern.
///
/// Patterns are unique; registering an existing pattern replaces its
/// converter in place. Enumeration follows first-registration order.
#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    entries: Vec<(String, Arc<dyn Converter>)>,
}

impl ConverterRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter. Returns `true` when an existing entry was
    /// replaced.
    pub fn register(&mut self, pattern: impl Into<String>, converter: Arc<dyn Converter>) -> bool {
        let pattern = pattern.into();

        match self.entries.iter_mut().find(|(p, _)| *p == pattern) {
            Some(entry) => {
                entry.1 = converter;
                true
            }
            None => {
                self.entries.push((pattern, converter));
                false
            }
        }
    }

    /// Gets a converter by pattern.
    pub fn get(&self, pattern: &str) -> Option<Arc<dyn Converter>> {
        self.entries
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, c)| Arc::clone(c))
    }

    /// Registered patterns.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    /// Pattern/converter pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Converter>)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c))
    }

    /// Returns converter count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
