use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::traits::{DirectiveHandler, HandlerError};
use super::types::{Directive, DirectiveContext};
use crate::address;
use crate::fetch::ContentFetcher;

/// Substitutes a directive with an excerpt of a local file or URL:
///
/// ```text
/// .zip <URL|filename> [address]
/// ```
#[derive(Debug, Clone)]
pub struct IncludeHandler {
    fetcher: Arc<ContentFetcher>,
}

impl IncludeHandler {
    pub fn new(fetcher: Arc<ContentFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl DirectiveHandler for IncludeHandler {
    async fn resolve(&self, ctx: DirectiveContext) -> Result<String, HandlerError> {
        let directive = Directive::parse(&ctx.name, &ctx.line)?;

        let content = self
            .fetcher
            .fetch(&directive.target, Path::new(&ctx.source_name))
            .await?;

        let text = address::excerpt(&directive.address, &content)?;
        debug!(
            directive_target = %directive.target,
            address = %directive.address,
            fetched = content.len(),
            lines = text.lines().count(),
            "Directive resolved"
        );

        Ok(text)
    }
}
