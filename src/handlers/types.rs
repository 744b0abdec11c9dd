use super::traits::HandlerError;

/// Context passed to a handler for one directive line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveContext {
    /// Name of the document being processed (a path, or `stdin`)
    pub source_name: String,
    /// 1-based line number of the directive
    pub line_number: usize,
    /// Directive name without the marker
    pub name: String,
    /// The raw directive line
    pub line: String,
}

/// A parsed `<marker><name> <target> [<address>]` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    /// Local path or absolute URL
    pub target: String,
    /// Address expression, empty for the whole content
    pub address: String,
}

impl Directive {
    /// Parse a directive line. The first token (marker and name) is skipped;
    /// the address is the rest of the line after the target, verbatim.
    pub fn parse(name: &str, line: &str) -> Result<Self, HandlerError> {
        let (_, rest) = split_token(line);
        let (target, rest) = split_token(rest);

        if target.is_empty() {
            return Err(HandlerError::Syntax(format!(
                "missing target in {name:?} directive {:?}",
                line.trim()
            )));
        }

        Ok(Self {
            name: name.to_string(),
            target: target.to_string(),
            address: rest.trim().to_string(),
        })
    }
}

/// Split off the first whitespace-delimited token.
fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start_matches(|c: char| c.is_ascii_whitespace());
    match s.find(|c: char| c.is_ascii_whitespace()) {
        Some(end) => s.split_at(end),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_only() {
        let directive = Directive::parse("zip", ".zip code.go").unwrap();
        assert_eq!(directive.name, "zip");
        assert_eq!(directive.target, "code.go");
        assert_eq!(directive.address, "");
    }

    #[test]
    fn test_parse_address_is_verbatim_remainder() {
        let directive =
            Directive::parse("zip", "  .zip\tsnippet2.txt /START outer OMIT/,/END outer OMIT/  ")
                .unwrap();
        assert_eq!(directive.target, "snippet2.txt");
        assert_eq!(directive.address, "/START outer OMIT/,/END outer OMIT/");
    }

    #[test]
    fn test_parse_missing_target() {
        assert!(matches!(
            Directive::parse("zip", ".zip"),
            Err(HandlerError::Syntax(_))
        ));
        assert!(matches!(
            Directive::parse("zip", ".zip   "),
            Err(HandlerError::Syntax(_))
        ));
    }
}
