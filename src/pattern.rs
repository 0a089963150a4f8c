//! Compiled patterns for the deprecated header formatter directives.

use regex::Regex;
use std::sync::LazyLock;

/// Deprecated metadata directive: `%UPSTREAM_METADATA(["a", "b"])%`.
///
/// Group 1 is the metadata kind, group 2 the JSON array (brackets included,
/// trailing whitespace included). The array may span several lines.
/// Whitespace around the array is ASCII only (`\t \n \f \r` and space).
const METADATA_PATTERN: &str =
    r"%(UPSTREAM|DYNAMIC)_METADATA\([\t\n\f\r ]*(\[(?s:.)+?\][\t\n\f\r ]*)\)%";

/// Deprecated per-request state directive: `%PER_REQUEST_STATE(key)%`.
const PER_REQUEST_STATE_PATTERN: &str = r"%PER_REQUEST_STATE\((.+?)\)%";

/// Literal opener of the deprecated per-request state directive.
pub const PER_REQUEST_STATE_OPENER: &str = "%PER_REQUEST_STATE(";

static SHARED: LazyLock<DirectivePatterns> = LazyLock::new(DirectivePatterns::new);

/// The two directive patterns, compiled once and shared read-only.
#[derive(Debug, Clone)]
pub struct DirectivePatterns {
    metadata: Regex,
    per_request_state: Regex,
}

impl DirectivePatterns {
    /// Compile both patterns.
    ///
    /// # Panics
    ///
    /// Panics if a pattern fails to compile. Both are fixed literals, so this
    /// only happens if the literals above are broken.
    pub fn new() -> Self {
        Self {
            metadata: Regex::new(METADATA_PATTERN).expect("metadata directive pattern is valid"),
            per_request_state: Regex::new(PER_REQUEST_STATE_PATTERN)
                .expect("per-request state directive pattern is valid"),
        }
    }

    /// Process-wide instance, built on first use.
    ///
    /// Concurrent first callers block until the single construction finishes.
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Pattern matching `%<UPSTREAM|DYNAMIC>_METADATA([...])%`.
    pub fn metadata(&self) -> &Regex {
        &self.metadata
    }

    /// Pattern matching `%PER_REQUEST_STATE(<key>)%`.
    pub fn per_request_state(&self) -> &Regex {
        &self.per_request_state
    }
}

impl Default for DirectivePatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Count literal occurrences of any of `openers` in `input`.
pub(crate) fn count_openers(input: &str, openers: &[&str]) -> usize {
    openers.iter().map(|opener| input.matches(opener).count()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_captures() {
        let patterns = DirectivePatterns::new();
        let caps = patterns
            .metadata()
            .captures(r#"x-%UPSTREAM_METADATA( ["a", "b"] )%-y"#)
            .unwrap();
        assert_eq!(&caps[1], "UPSTREAM");
        assert_eq!(&caps[2], r#"["a", "b"] "#);
    }

    #[test]
    fn test_metadata_multiline_payload() {
        let patterns = DirectivePatterns::new();
        let caps = patterns
            .metadata()
            .captures("%DYNAMIC_METADATA([\r\n  \"a\",\n  \"b\"\n])%")
            .unwrap();
        assert_eq!(&caps[1], "DYNAMIC");
        assert_eq!(&caps[2], "[\r\n  \"a\",\n  \"b\"\n]");
    }

    #[test]
    fn test_metadata_rejects_other_kinds() {
        let patterns = DirectivePatterns::new();
        assert!(!patterns.metadata().is_match(r#"%ROUTE_METADATA(["a"])%"#));
        assert!(!patterns.metadata().is_match("%UPSTREAM_METADATA(a:b)%"));
    }

    #[test]
    fn test_metadata_whitespace_is_ascii_only() {
        let patterns = DirectivePatterns::new();
        assert!(patterns
            .metadata()
            .is_match("%UPSTREAM_METADATA(\t\x0c[\"a\"]\r\n )%"));
        assert!(!patterns
            .metadata()
            .is_match("%UPSTREAM_METADATA(\u{a0}[\"a\"])%"));
        assert!(!patterns
            .metadata()
            .is_match("%UPSTREAM_METADATA([\"a\"]\u{2003})%"));
        assert!(!patterns
            .metadata()
            .is_match("%UPSTREAM_METADATA(\x0b[\"a\"])%"));
    }

    #[test]
    fn test_metadata_lazy_payload() {
        let patterns = DirectivePatterns::new();
        let input = r#"%UPSTREAM_METADATA(["a"])% and %UPSTREAM_METADATA(["b"])%"#;
        let caps = patterns.metadata().captures(input).unwrap();
        assert_eq!(&caps[2], r#"["a"]"#);
    }

    #[test]
    fn test_per_request_state_captures() {
        let patterns = DirectivePatterns::new();
        let caps = patterns
            .per_request_state()
            .captures("%PER_REQUEST_STATE(foo.bar)%%PER_REQUEST_STATE(baz)%")
            .unwrap();
        assert_eq!(&caps[1], "foo.bar");
    }

    #[test]
    fn test_per_request_state_requires_key() {
        let patterns = DirectivePatterns::new();
        assert!(!patterns.per_request_state().is_match("%PER_REQUEST_STATE()%"));
    }

    #[test]
    fn test_shared_is_single_instance() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| DirectivePatterns::shared() as *const DirectivePatterns as usize))
            .collect();
        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_count_openers() {
        let input = "%PER_REQUEST_STATE(a)%PER_REQUEST_STATE(%FILTER_STATE(";
        assert_eq!(count_openers(input, &[PER_REQUEST_STATE_OPENER]), 2);
        assert_eq!(count_openers(input, &["%UPSTREAM_METADATA("]), 0);
    }
}
