//! Directive handlers
//!
//! A handler turns one directive line into replacement text. Handlers are
//! looked up by name in a [`HandlerRegistry`] owned by the caller.
//!
//! ## Key Components
//!
//! - [`DirectiveHandler`] - Trait implemented by every directive
//! - [`IncludeHandler`] - Built-in `.zip` handler that embeds file or URL excerpts
//! - [`FnHandler`] - Adapter turning a closure into a handler
//! - [`HandlerRegistry`] - Name to handler lookup
//! - [`DirectiveContext`] - Context passed to handlers
//!
//! ## Example
//!
//! ```rust,ignore
//! use zipline::handlers::{HandlerRegistry, DirectiveContext};
//!
//! let registry = HandlerRegistry::with_defaults(fetcher);
//! let handler = registry.get("zip")?;
//! let text = handler.resolve(ctx).await?;
//! ```

mod include;
mod registry;
mod traits;
mod types;

pub use include::IncludeHandler;
pub use registry::{HandlerRegistry, RegistryError};
pub use traits::{DirectiveHandler, FnHandler, HandlerError};
pub use types::{Directive, DirectiveContext};
