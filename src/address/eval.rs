use regex::bytes::RegexBuilder;

use super::AddressError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Evaluates address expressions over one piece of content.
pub(super) struct Evaluator<'a> {
    data: &'a [u8],
}

impl<'a> Evaluator<'a> {
    pub(super) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Evaluate `addr` starting at byte offset `start`, returning `(lo, hi)`.
    pub(super) fn range(&self, addr: &str, start: usize) -> Result<(usize, usize), AddressError> {
        let (mut lo, mut hi) = (start, start);
        let mut dir: Option<Direction> = None;
        let mut prev: Option<u8> = None;
        let mut char_offset = false;
        let mut rest = addr;

        while let Some(&c) = rest.as_bytes().first() {
            match c {
                b',' => {
                    if rest.len() == 1 {
                        hi = self.data.len();
                    } else {
                        (_, hi) = self.range(&rest[1..], hi)?;
                    }
                    return Ok((lo, hi));
                }
                b'+' | b'-' => {
                    // "++" means "+1+"
                    if matches!(prev, Some(b'+' | b'-')) {
                        (lo, hi) = self.number(lo, hi, dir, 1, char_offset)?;
                    }
                    dir = Some(if c == b'+' {
                        Direction::Forward
                    } else {
                        Direction::Backward
                    });
                }
                b'$' => {
                    lo = self.data.len();
                    hi = self.data.len();
                    if rest.len() > 1 {
                        dir = Some(Direction::Forward);
                    }
                }
                b'#' => char_offset = true,
                b'0'..=b'9' => {
                    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
                    let n: usize = rest[..digits]
                        .parse()
                        .map_err(|_| AddressError::Syntax(addr.to_string()))?;
                    (lo, hi) = self.number(lo, hi, dir, n, char_offset)?;
                    dir = None;
                    char_offset = false;
                    prev = Some(c);
                    rest = &rest[digits..];
                    continue;
                }
                b'/' => {
                    let (pattern, consumed) = split_pattern(rest);
                    (lo, hi) = self.regexp(hi, dir, pattern)?;
                    dir = None;
                    prev = Some(c);
                    rest = &rest[consumed..];
                    continue;
                }
                _ => return Err(AddressError::Syntax(rest.to_string())),
            }
            prev = Some(c);
            rest = &rest[1..];
        }

        // A trailing "+" or "-" means one line.
        if dir.is_some() {
            (lo, hi) = self.number(lo, hi, dir, 1, char_offset)?;
        }

        Ok((lo, hi))
    }

    /// Apply a line (or character) count relative to `lo..hi`.
    /// With no direction the count is absolute from the start of the content.
    fn number(
        &self,
        lo: usize,
        hi: usize,
        dir: Option<Direction>,
        n: usize,
        char_offset: bool,
    ) -> Result<(usize, usize), AddressError> {
        match dir {
            None => self.forward(0, n, char_offset),
            Some(Direction::Forward) => self.forward(hi, n, char_offset),
            Some(Direction::Backward) => self.backward(lo, n, char_offset),
        }
    }

    fn forward(
        &self,
        from: usize,
        mut n: usize,
        char_offset: bool,
    ) -> Result<(usize, usize), AddressError> {
        let data = self.data;

        if char_offset {
            let mut pos = from;
            while n > 0 && pos < data.len() {
                pos += 1;
                while pos < data.len() && is_continuation(data[pos]) {
                    pos += 1;
                }
                n -= 1;
            }
            return if n == 0 {
                Ok((pos, pos))
            } else {
                Err(AddressError::OutOfRange)
            };
        }

        // Counting starts at the beginning of the next line.
        let mut hi = from;
        if hi > 0 {
            while hi < data.len() && data[hi - 1] != b'\n' {
                hi += 1;
            }
        }
        let mut lo = hi;
        if n == 0 {
            return Ok((lo, hi));
        }

        while hi < data.len() {
            if data[hi] == b'\n' {
                n -= 1;
                match n {
                    0 => return Ok((lo, hi + 1)),
                    1 => lo = hi + 1,
                    _ => {}
                }
            }
            hi += 1;
        }

        // Final line without a trailing newline.
        if n == 1 && lo < data.len() {
            return Ok((lo, data.len()));
        }

        Err(AddressError::OutOfRange)
    }

    fn backward(
        &self,
        from: usize,
        mut n: usize,
        char_offset: bool,
    ) -> Result<(usize, usize), AddressError> {
        let data = self.data;

        if char_offset {
            let mut pos = from.min(data.len());
            while n > 0 && pos > 0 {
                pos -= 1;
                while pos > 0 && is_continuation(data[pos]) {
                    pos -= 1;
                }
                n -= 1;
            }
            return if n == 0 {
                Ok((pos, pos))
            } else {
                Err(AddressError::OutOfRange)
            };
        }

        let mut start = line_start(data, from);
        if n == 0 {
            return Ok((start, start));
        }

        while n > 0 {
            if start == 0 {
                return Err(AddressError::OutOfRange);
            }
            start = line_start(data, start - 1);
            n -= 1;
        }

        Ok((start, line_end(data, start)))
    }

    /// First match of `pattern` at or after `from`. Never wraps around.
    fn regexp(
        &self,
        from: usize,
        dir: Option<Direction>,
        pattern: &str,
    ) -> Result<(usize, usize), AddressError> {
        if dir == Some(Direction::Backward) {
            return Err(AddressError::Unsupported("reverse search".to_string()));
        }

        // ^ and $ match at line boundaries, as in sam and acme.
        let re = RegexBuilder::new(pattern)
            .multi_line(true)
            .build()
            .map_err(|e| AddressError::Pattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        let from = from.min(self.data.len());
        re.find_at(self.data, from)
            .map(|m| (m.start(), m.end()))
            .ok_or_else(|| AddressError::NoMatch(pattern.to_string()))
    }
}

/// Split `/pattern/rest` into the pattern and the number of bytes consumed.
/// A missing closing slash takes the rest of the expression as the pattern.
fn split_pattern(addr: &str) -> (&str, usize) {
    let bytes = addr.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'/' => return (&addr[1..i], i + 1),
            _ => {}
        }
        i += 1;
    }
    (&addr[1..], addr.len())
}

fn is_continuation(b: u8) -> bool {
    b & 0xc0 == 0x80
}

fn line_start(data: &[u8], pos: usize) -> usize {
    let pos = pos.min(data.len());
    data[..pos]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |nl| nl + 1)
}

fn line_end(data: &[u8], pos: usize) -> usize {
    data[pos..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(data.len(), |nl| pos + nl + 1)
}
