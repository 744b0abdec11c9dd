//! Whole-document entry point
//!
//! [`Preprocessor`] ties the pieces together: it splits the input into a
//! [`LineBuffer`], runs the [`Dispatcher`] over it and joins the result.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{Config, DocumentConfig};
use crate::dispatch::{DispatchError, Dispatcher};
use crate::document::LineBuffer;
use crate::fetch::{ContentFetcher, FetchError};
use crate::handlers::HandlerRegistry;
use crate::observability::Metrics;

pub struct Preprocessor {
    dispatcher: Dispatcher,
    comment_prefix: String,
    metrics: Arc<Metrics>,
}

impl Preprocessor {
    pub fn new(
        document: &DocumentConfig,
        registry: HandlerRegistry,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(
                Arc::new(registry),
                document.directive_marker.clone(),
                Arc::clone(&metrics),
            ),
            comment_prefix: document.comment_prefix.clone(),
            metrics,
        }
    }

    /// Build a preprocessor with the built-in directives wired to a fresh fetcher.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let metrics = Arc::new(Metrics::new());
        let fetcher = ContentFetcher::new(&config.fetch, Arc::clone(&metrics))?;
        let registry = HandlerRegistry::with_defaults(Arc::new(fetcher));
        Ok(Self::new(&config.document, registry, metrics))
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Resolve every directive in `input` and return the rewritten document.
    ///
    /// Lines are joined with `\n`; a trailing newline in `input` is not kept.
    pub async fn process(
        &self,
        input: &str,
        source_name: &str,
        cancel: &CancellationToken,
    ) -> Result<String, DispatchError> {
        let buffer = LineBuffer::parse(input).with_comment_prefix(self.comment_prefix.as_str());
        let buffer = Arc::new(buffer);
        debug!(source = source_name, lines = buffer.len(), "Processing document");

        self.dispatcher
            .dispatch(source_name, Arc::clone(&buffer), cancel)
            .await?;

        let stats = self.metrics.snapshot();
        info!(
            dispatched = stats.directives_dispatched,
            unknown = stats.directives_unknown,
            remote = stats.remote_fetches,
            local = stats.local_fetches,
            "Document processed"
        );

        Ok(buffer.join())
    }
}
