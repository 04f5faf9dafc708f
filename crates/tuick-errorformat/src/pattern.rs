//! Compiles a small Vim-errorformat-style pattern string (`%f`, `%l`,
//! `%c`, `%t`, `%m`, literal `...` as a wildcard, everything else
//! literal) into a [`regex::Regex`] with named capture groups.

use regex::Regex;
use tuick_core::TuickError;

/// A compiled anchor pattern: matches one line of checker output and
/// extracts the location fields named in the pattern.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMatch {
    pub file: String,
    pub line: Option<u32>,
    pub col: Option<u32>,
}

impl CompiledPattern {
    /// Compile `pattern` into a regex. Fails with [`TuickError::PatternError`]
    /// if the pattern is malformed or the resulting regex fails to build.
    pub fn compile(pattern: &str) -> Result<Self, TuickError> {
        let mut regex_src = String::from("^");
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '%' {
                match chars.next() {
                    Some('f') => regex_src.push_str("(?P<file>[^:]+)"),
                    Some('l') => regex_src.push_str(r"(?P<line>\d+)"),
                    Some('c') => regex_src.push_str(r"(?P<col>\d+)"),
                    Some('t') => regex_src.push_str(r"(?P<etype>\w+)"),
                    Some('m') => regex_src.push_str("(?P<msg>.+)$"),
                    Some('%') => regex_src.push_str("%"),
                    Some(other) => {
                        return Err(TuickError::PatternError(format!(
                            "unknown errorformat directive %{other}"
                        )));
                    }
                    None => {
                        return Err(TuickError::PatternError(
                            "pattern ends with a dangling '%'".into(),
                        ));
                    }
                }
                continue;
            }
            if c == '.' && chars.peek() == Some(&'.') {
                // literal "..." wildcard
                let save = chars.clone();
                chars.next();
                if chars.peek() == Some(&'.') {
                    chars.next();
                    regex_src.push_str(".*?");
                    continue;
                }
                chars = save;
            }
            regex_src.push_str(&regex::escape(&c.to_string()));
        }

        let regex = Regex::new(&regex_src)
            .map_err(|e| TuickError::PatternError(format!("{pattern}: {e}")))?;
        Ok(CompiledPattern { regex })
    }

    /// Try to match `line` (already ANSI-stripped) as an anchor line.
    pub fn match_anchor(&self, line: &str) -> Option<AnchorMatch> {
        let caps = self.regex.captures(line)?;
        let file = caps.name("file")?.as_str().to_string();
        let line_no = caps.name("line").and_then(|m| m.as_str().parse().ok());
        let col = caps.name("col").and_then(|m| m.as_str().parse().ok());
        Some(AnchorMatch {
            file,
            line: line_no,
            col,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_ruff_style_pattern() {
        let p = CompiledPattern::compile("%f:%l:%c: %m").unwrap();
        let m = p.match_anchor("a.py:3:5: oops").unwrap();
        assert_eq!(m.file, "a.py");
        assert_eq!(m.line, Some(3));
        assert_eq!(m.col, Some(5));
    }

    #[test]
    fn compiles_mypy_style_pattern_with_type_token() {
        let p = CompiledPattern::compile("%f:%l:%c: %t: %m").unwrap();
        let m = p.match_anchor("b.py:1:1: error: bad").unwrap();
        assert_eq!(m.file, "b.py");
        assert_eq!(m.line, Some(1));
        assert_eq!(m.col, Some(1));
    }

    #[test]
    fn pytest_style_pattern_without_column() {
        let p = CompiledPattern::compile("%f:%l: %m").unwrap();
        let m = p.match_anchor("test_foo.py:12: AssertionError").unwrap();
        assert_eq!(m.file, "test_foo.py");
        assert_eq!(m.line, Some(12));
        assert_eq!(m.col, None);
    }

    #[test]
    fn non_matching_line_returns_none() {
        let p = CompiledPattern::compile("%f:%l:%c: %m").unwrap();
        assert!(p.match_anchor("    note: see here").is_none());
    }

    #[test]
    fn invalid_directive_is_a_pattern_error() {
        let err = CompiledPattern::compile("%q bogus").unwrap_err();
        assert!(matches!(err, TuickError::PatternError(_)));
    }
}
