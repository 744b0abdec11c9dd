//! Address expressions: selecting an excerpt of fetched content
//!
//! An address is a compact range syntax in the tradition of sam/acme:
//!
//! ```text
//! address := "" | range
//! range   := simple | simple "," [simple]
//! simple  := term { term }
//! term    := "/" regexp "/" | number | "#" number | "$" | "+" [number] | "-" [number]
//! ```
//!
//! - `/re/` selects the first match of `re` at or after the current position
//!   (multi-line mode, `\/` escapes a slash).
//! - `n` selects line `n`; after another term, `+n` / `-n` move `n` lines
//!   forward or backward from it.
//! - `#n` is a character offset, `$` the end of the content.
//! - `a,b` spans from `a` to `b`, where `b` is searched from the end of `a`.
//!
//! Whatever the expression selects is widened to whole lines; lines ending in
//! `OMIT` are dropped and blank lines at either end are trimmed.

mod eval;
mod extract;

use std::ops::Range;
use thiserror::Error;

pub use extract::{OMIT_MARKER, extract_lines, snap_to_lines};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address syntax for {0:?}")]
    Syntax(String),
    #[error("invalid pattern {pattern:?}: {reason}")]
    Pattern { pattern: String, reason: String },
    #[error("{0} not implemented")]
    Unsupported(String),
    #[error("no match for {0:?}")]
    NoMatch(String),
    #[error("address out of range")]
    OutOfRange,
}

/// Resolve `addr` against `data` into a byte range, before line snapping.
///
/// The empty address selects everything. A reversed range is swapped.
pub fn resolve(addr: &str, data: &[u8]) -> Result<Range<usize>, AddressError> {
    if addr.trim().is_empty() {
        return Ok(0..data.len());
    }

    let (lo, hi) = eval::Evaluator::new(data).range(addr.trim(), 0)?;
    Ok(if lo > hi { hi..lo } else { lo..hi })
}

/// Resolve `addr` and render the selected lines as replacement text.
pub fn excerpt(addr: &str, data: &[u8]) -> Result<String, AddressError> {
    let range = snap_to_lines(data, resolve(addr, data)?);
    Ok(extract_lines(data, range).join(crate::document::LINE_SEPARATOR))
}
