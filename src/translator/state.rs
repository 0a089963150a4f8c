//! `%PER_REQUEST_STATE(key)%` translation.

use super::{DirectiveTranslator, Translation};
use crate::pattern::{count_openers, DirectivePatterns, PER_REQUEST_STATE_OPENER};
use regex::NoExpand;
use tracing::{debug, warn};

/// Rewrites `%PER_REQUEST_STATE(key)%` into `%FILTER_STATE(key:PLAIN)%`.
pub struct PerRequestStateTranslator<'a> {
    patterns: &'a DirectivePatterns,
}

impl<'a> PerRequestStateTranslator<'a> {
    /// Create a translator borrowing the given patterns.
    pub fn new(patterns: &'a DirectivePatterns) -> Self {
        Self { patterns }
    }
}

impl DirectiveTranslator for PerRequestStateTranslator<'_> {
    fn translate(&self, input: &str) -> Translation {
        let re = self.patterns.per_request_state();
        // Each rewrite consumes one opener and the replacement adds none
        let budget = count_openers(input, &[PER_REQUEST_STATE_OPENER]);
        let mut value = input.to_string();
        let mut rewrites = 0;

        loop {
            let Some(caps) = re.captures(&value) else {
                return Translation::complete(value, rewrites);
            };

            if rewrites == budget {
                debug!(budget, "Per-request state rewrite budget exhausted");
                return Translation::budget_exhausted(value, rewrites);
            }

            let replacement = format!("%FILTER_STATE({}:PLAIN)%", &caps[1]);

            warn!(
                directive = %"PER_REQUEST_STATE",
                replacement = %replacement,
                "PER_REQUEST_STATE header formatter has been obsoleted. Use {}",
                replacement
            );

            value = re.replace(&value, NoExpand(&replacement)).into_owned();
            rewrites += 1;
        }
    }

    fn name(&self) -> &'static str {
        "per_request_state_translator"
    }
}

/// Translate `%PER_REQUEST_STATE(key)%` directives in `input` into
/// `%FILTER_STATE(key:PLAIN)%`.
pub fn translate_per_request_state(patterns: &DirectivePatterns, input: &str) -> String {
    PerRequestStateTranslator::new(patterns).translate(input).value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translate(input: &str) -> Translation {
        PerRequestStateTranslator::new(DirectivePatterns::shared()).translate(input)
    }

    #[test]
    fn test_single_directive() {
        let result = translate("%PER_REQUEST_STATE(foo)%");
        assert_eq!(result.value, "%FILTER_STATE(foo:PLAIN)%");
        assert_eq!(result.rewrites, 1);
        assert!(result.is_complete());
    }

    #[test]
    fn test_multiple_directives() {
        let result = translate("a=%PER_REQUEST_STATE(a.b)%,c=%PER_REQUEST_STATE(c)%");
        assert_eq!(
            result.value,
            "a=%FILTER_STATE(a.b:PLAIN)%,c=%FILTER_STATE(c:PLAIN)%"
        );
        assert_eq!(result.rewrites, 2);
    }

    #[test]
    fn test_key_stops_at_first_close() {
        let result = translate("%PER_REQUEST_STATE(a)b)%");
        assert_eq!(result.value, "%FILTER_STATE(a)b:PLAIN)%");
    }

    #[test]
    fn test_nested_opener_in_key() {
        // Leftmost match swallows the inner opener; a second pass rewrites it
        let result = translate("%PER_REQUEST_STATE(%PER_REQUEST_STATE(x)%");
        assert_eq!(
            result.value,
            "%FILTER_STATE(%FILTER_STATE(x:PLAIN:PLAIN)%"
        );
        assert_eq!(result.rewrites, 2);
        assert!(result.is_complete());
    }

    #[test]
    fn test_no_directive() {
        let input = "%FILTER_STATE(foo:PLAIN)% %PER_REQUEST_STATE()%";
        let result = translate(input);
        assert_eq!(result.value, input);
        assert!(!result.changed());
    }

    #[test]
    fn test_free_function() {
        let patterns = DirectivePatterns::new();
        assert_eq!(
            translate_per_request_state(&patterns, "x-%PER_REQUEST_STATE($0)%"),
            "x-%FILTER_STATE($0:PLAIN)%"
        );
    }
}
