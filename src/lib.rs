pub mod address;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod fetch;
pub mod handlers;
pub mod humanize;
pub mod observability;
pub mod preprocess;

pub use config::Config;
pub use dispatch::{DispatchError, Dispatcher, ErrorKind};
pub use document::LineBuffer;
pub use preprocess::Preprocessor;
