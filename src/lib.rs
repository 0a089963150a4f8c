//! Header formatter compatibility layer for Zentinel.
//!
//! Header values used to accept two directive forms that the substitution
//! formatter no longer understands. This crate rewrites them before a
//! formatter is built from the value:
//!
//! - `%UPSTREAM_METADATA(["a", "b"])%` becomes `%UPSTREAM_METADATA(a:b)%`
//! - `%DYNAMIC_METADATA(["x"])%` becomes `%DYNAMIC_METADATA(x)%`
//! - `%PER_REQUEST_STATE(foo)%` becomes `%FILTER_STATE(foo:PLAIN)%`
//!
//! Every rewrite logs a warning naming the deprecated directive and its
//! replacement. A malformed JSON payload stops metadata translation and
//! leaves the rest of the value untouched.
//!
//! ## Example
//!
//! ```
//! use zentinel_header_compat::{translate_metadata_format, DirectivePatterns};
//!
//! let patterns = DirectivePatterns::shared();
//! let value = translate_metadata_format(patterns, r#"%UPSTREAM_METADATA(["envoy.lb", "host"])%"#);
//! assert_eq!(value, "%UPSTREAM_METADATA(envoy.lb:host)%");
//! ```

pub mod config;
pub mod params;
pub mod pattern;
pub mod translator;

pub use config::{ConfigError, HeaderRewriteConfig, TranslationReport};
pub use params::{parse_parameter_list, ParameterList, PayloadError};
pub use pattern::DirectivePatterns;
pub use translator::{
    translate_metadata_format, translate_per_request_state, DirectiveTranslator,
    HeaderValueTranslator, MetadataTranslator, PerRequestStateTranslator, Translation,
    TranslationOutcome,
};
