//! Mutable line-oriented document storage
//!
//! A [`LineBuffer`] holds the source document while directives are resolved.
//! The dispatcher scans it front to back through a single cursor, and
//! resolution tasks overwrite individual lines concurrently via
//! [`LineBuffer::set`]. The number of lines never changes; a substituted line
//! may itself contain newlines and is flattened when the buffer is joined.

mod buffer;

pub use buffer::{BufferError, LineBuffer, ScannedLine};

/// Separator used to split input and to join lines back into text.
pub const LINE_SEPARATOR: &str = "\n";

/// Comment prefix used by a bare [`LineBuffer`].
pub const DEFAULT_COMMENT_PREFIX: &str = "#";
