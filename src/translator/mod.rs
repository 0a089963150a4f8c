//! Translators from deprecated header formatter directives to
//! substitution formatter syntax.

mod metadata;
mod state;

pub use metadata::{translate_metadata_format, MetadataTranslator};
pub use state::{translate_per_request_state, PerRequestStateTranslator};

use crate::params::PayloadError;
use crate::pattern::DirectivePatterns;

/// Trait for rewriting one deprecated directive form inside a header value.
pub trait DirectiveTranslator: Send + Sync {
    /// Rewrite every occurrence of the deprecated form in `input`.
    fn translate(&self, input: &str) -> Translation;

    /// Get the translator name for debugging.
    fn name(&self) -> &'static str;
}

/// Result of a translation.
#[derive(Debug)]
pub struct Translation {
    /// The rewritten header value
    pub value: String,
    /// Number of directives rewritten
    pub rewrites: usize,
    /// How the rewrite loop ended
    pub outcome: TranslationOutcome,
}

/// How a rewrite loop ended.
#[derive(Debug)]
pub enum TranslationOutcome {
    /// No deprecated directive remains
    Complete,
    /// A malformed metadata payload stopped the loop; earlier rewrites are kept
    Aborted(PayloadError),
    /// The loop reached its rewrite limit
    BudgetExhausted,
}

impl Translation {
    /// Create a result for a loop that ran out of matches.
    pub fn complete(value: String, rewrites: usize) -> Self {
        Self {
            value,
            rewrites,
            outcome: TranslationOutcome::Complete,
        }
    }

    /// Create a result for a loop stopped by a malformed payload.
    pub fn aborted(value: String, rewrites: usize, error: PayloadError) -> Self {
        Self {
            value,
            rewrites,
            outcome: TranslationOutcome::Aborted(error),
        }
    }

    /// Create a result for a loop stopped by its occurrence budget.
    pub fn budget_exhausted(value: String, rewrites: usize) -> Self {
        Self {
            value,
            rewrites,
            outcome: TranslationOutcome::BudgetExhausted,
        }
    }

    /// Check if the loop ran until no match was left.
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, TranslationOutcome::Complete)
    }

    /// Check if anything was rewritten.
    pub fn changed(&self) -> bool {
        self.rewrites > 0
    }
}

/// Applies both translators, metadata first, the way header values are
/// prepared before a formatter is built from them.
pub struct HeaderValueTranslator<'a> {
    metadata: MetadataTranslator<'a>,
    state: PerRequestStateTranslator<'a>,
}

impl<'a> HeaderValueTranslator<'a> {
    /// Create a translator borrowing the given patterns.
    pub fn new(patterns: &'a DirectivePatterns) -> Self {
        Self {
            metadata: MetadataTranslator::new(patterns),
            state: PerRequestStateTranslator::new(patterns),
        }
    }

    /// Translate a header value, discarding the bookkeeping.
    pub fn translate_value(&self, input: &str) -> String {
        self.translate(input).value
    }
}

impl DirectiveTranslator for HeaderValueTranslator<'_> {
    fn translate(&self, input: &str) -> Translation {
        let metadata = self.metadata.translate(input);
        let state = self.state.translate(&metadata.value);

        // A metadata abort is the more useful thing to report
        let outcome = match metadata.outcome {
            TranslationOutcome::Complete => state.outcome,
            other => other,
        };

        Translation {
            value: state.value,
            rewrites: metadata.rewrites + state.rewrites,
            outcome,
        }
    }

    fn name(&self) -> &'static str {
        "header_value_translator"
    }
}
