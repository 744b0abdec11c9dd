use std::ops::Range;

/// Lines ending with this marker are left out of an excerpt.
pub const OMIT_MARKER: &str = "OMIT";

/// Widen `range` to whole lines: `start` back to the beginning of its line,
/// `end` forward past the end of its line.
pub fn snap_to_lines(data: &[u8], range: Range<usize>) -> Range<usize> {
    let mut lo = range.start.min(data.len());
    let mut hi = range.end.min(data.len());

    while lo > 0 && data[lo - 1] != b'\n' {
        lo -= 1;
    }
    if hi > 0 {
        while hi < data.len() && data[hi - 1] != b'\n' {
            hi += 1;
        }
    }

    lo..hi.max(lo)
}

/// Split `data[range]` into lines, dropping OMIT lines and trimming blank
/// lines from both ends. Interior blank lines are kept.
pub fn extract_lines(data: &[u8], range: Range<usize>) -> Vec<String> {
    let chunk = &data[range];

    let mut lines: Vec<&[u8]> = chunk.split(|&b| b == b'\n').collect();
    // The split after a final newline is not a line of its own.
    if chunk.is_empty() || chunk.ends_with(b"\n") {
        lines.pop();
    }

    let mut lines: Vec<String> = lines
        .into_iter()
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .filter(|line| !line.ends_with(OMIT_MARKER))
        .collect();

    let first = lines.iter().position(|line| !line.is_empty());
    let last = lines.iter().rposition(|line| !line.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => {
            lines.truncate(last + 1);
            lines = lines.split_off(first);
        }
        _ => lines.clear(),
    }

    lines
}
