// ABOUTME: Registration table mapping source-type strings to handler constructors.
// ABOUTME: Register, lookup, and reset are ordinary methods on an owned registry.

use std::collections::HashMap;
use std::path::Path;

use super::{ChartSource, LocalSource, SourceError, SourceSpec};

/// Constructor building a handler for one source declaration.
pub type SourceConstructor = fn(&SourceSpec) -> Result<Box<dyn ChartSource>, SourceError>;

/// One registered handler type.
#[derive(Clone)]
pub struct SourceEntry {
    pub constructor: SourceConstructor,
}

/// Explicit registration table for chart source handlers.
///
/// Built once at process start and passed by reference to whatever needs to
/// resolve a source type; there is deliberately no package-level singleton.
#[derive(Default)]
pub struct SourceRegistry {
    handlers: HashMap<String, SourceEntry>,
}

impl SourceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in handlers registered.
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::new();
        registry.register("local", SourceEntry {
            constructor: |spec| Ok(Box::new(LocalSource::new(Path::new(&spec.location)))),
        });
        registry
    }

    /// Register a handler for a source type, replacing any previous entry.
    pub fn register(&mut self, source_type: &str, entry: SourceEntry) {
        self.handlers.insert(source_type.to_string(), entry);
    }

    /// Look up the handler entry for a source type.
    pub fn lookup(&self, source_type: &str) -> Option<&SourceEntry> {
        self.handlers.get(source_type)
    }

    /// Remove every registered handler.
    pub fn reset_all(&mut self) {
        self.handlers.clear();
    }

    /// Build a handler for the given source declaration.
    pub fn build(&self, spec: &SourceSpec) -> Result<Box<dyn ChartSource>, SourceError> {
        let entry = self
            .lookup(&spec.source_type)
            .ok_or_else(|| SourceError::UnknownSourceType(spec.source_type.clone()))?;
        (entry.constructor)(spec)
    }
}
