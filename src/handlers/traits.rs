use async_trait::async_trait;
use thiserror::Error;

use super::types::DirectiveContext;
use crate::address::AddressError;
use crate::fetch::FetchError;

/// Handler errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Failed(String),
}

/// Resolves one directive line into its replacement text
///
/// Handlers run concurrently, one task per directive, so they must be
/// shareable across threads.
#[async_trait]
pub trait DirectiveHandler: Send + Sync {
    async fn resolve(&self, ctx: DirectiveContext) -> Result<String, HandlerError>;
}

/// Adapts a plain function into a [`DirectiveHandler`]
#[derive(Debug, Clone)]
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F> DirectiveHandler for FnHandler<F>
where
    F: Fn(&DirectiveContext) -> Result<String, HandlerError> + Send + Sync,
{
    async fn resolve(&self, ctx: DirectiveContext) -> Result<String, HandlerError> {
        (self.0)(&ctx)
    }
}
