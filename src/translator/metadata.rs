//! `%UPSTREAM_METADATA([...])%` / `%DYNAMIC_METADATA([...])%` translation.

use super::{DirectiveTranslator, Translation};
use crate::params::parse_parameter_list;
use crate::pattern::DirectivePatterns;
use regex::NoExpand;
use tracing::{debug, warn};

/// Rewrites JSON-array metadata directives into colon format.
pub struct MetadataTranslator<'a> {
    patterns: &'a DirectivePatterns,
}

impl<'a> MetadataTranslator<'a> {
    /// Create a translator borrowing the given patterns.
    pub fn new(patterns: &'a DirectivePatterns) -> Self {
        Self { patterns }
    }
}

impl DirectiveTranslator for MetadataTranslator<'_> {
    fn translate(&self, input: &str) -> Translation {
        let re = self.patterns.metadata();
        // Every rewrite shortens the value by at least two bytes
        let budget = input.len() / 2;
        let mut value = input.to_string();
        let mut rewrites = 0;

        loop {
            let Some(caps) = re.captures(&value) else {
                return Translation::complete(value, rewrites);
            };

            if rewrites == budget {
                debug!(budget, "Metadata rewrite budget exhausted");
                return Translation::budget_exhausted(value, rewrites);
            }

            let directive = format!("{}_METADATA", &caps[1]);
            let payload = &caps[2];
            let params = match parse_parameter_list(payload) {
                Ok(params) => params,
                Err(e) => {
                    // Earlier rewrites stay applied
                    debug!(
                        directive = %directive,
                        payload = %payload,
                        error = %e,
                        "Malformed metadata directive payload, leaving header value as is"
                    );
                    return Translation::aborted(value, rewrites, e);
                }
            };

            let replacement = format!("%{}({})%", directive, params);

            warn!(
                directive = %directive,
                replacement = %replacement,
                "Header formatter: JSON format of {} parameters has been obsoleted. Use colon format: {}",
                directive,
                replacement
            );

            value = re.replace(&value, NoExpand(&replacement)).into_owned();
            rewrites += 1;
        }
    }

    fn name(&self) -> &'static str {
        "metadata_translator"
    }
}

/// Translate JSON-array metadata directives in `input` into colon format.
///
/// Stops at the first malformed payload and returns the value as rewritten
/// up to that point.
pub fn translate_metadata_format(patterns: &DirectivePatterns, input: &str) -> String {
    MetadataTranslator::new(patterns).translate(input).value
}
