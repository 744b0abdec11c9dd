use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::include::IncludeHandler;
use super::traits::DirectiveHandler;
use crate::fetch::ContentFetcher;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("handler not found: {0}")]
    NotFound(String),
    #[error("invalid directive name: {0:?}")]
    InvalidName(String),
}

/// Registry mapping directive names to handler instances
///
/// Built by the caller and handed to the dispatcher; there is no global
/// registration.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn DirectiveHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name` (without the directive marker),
    /// replacing any previous handler of that name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn DirectiveHandler>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.is_empty() || name.starts_with(';') || name.chars().any(char::is_whitespace) {
            return Err(RegistryError::InvalidName(name));
        }

        self.handlers.insert(name, handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn DirectiveHandler>, RegistryError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Create a registry with the built-in include handler
    pub fn with_defaults(fetcher: Arc<ContentFetcher>) -> Self {
        let mut registry = Self::new();

        // Register the include handler under its current and legacy names
        let include: Arc<dyn DirectiveHandler> = Arc::new(IncludeHandler::new(fetcher));
        registry.handlers.insert("zip".to_string(), Arc::clone(&include));
        registry.handlers.insert("yoink".to_string(), include);

        registry
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::handlers::{DirectiveContext, FnHandler, HandlerError};
    use crate::observability::Metrics;

    fn echo() -> Arc<dyn DirectiveHandler> {
        Arc::new(FnHandler(|ctx: &DirectiveContext| -> Result<String, HandlerError> {
            Ok(ctx.name.clone())
        }))
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = HandlerRegistry::new();
        registry.register("echo", echo()).unwrap();

        assert!(registry.has_handler("echo"));
        assert!(registry.get("echo").is_ok());
        assert_eq!(
            registry.get("missing").err(),
            Some(RegistryError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut registry = HandlerRegistry::new();

        for name in ["", ";comment", "two words"] {
            assert_eq!(
                registry.register(name, echo()),
                Err(RegistryError::InvalidName(name.to_string()))
            );
        }
        assert_eq!(registry.names().count(), 0);
    }

    #[test]
    fn test_with_defaults() {
        let metrics = Arc::new(Metrics::new());
        let fetcher = ContentFetcher::new(&FetchConfig::default(), metrics).unwrap();
        let registry = HandlerRegistry::with_defaults(Arc::new(fetcher));

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["yoink", "zip"]);
    }
}
