//! Content Security Policy data model and per-request resolution.
//!
//! The pieces compose bottom-up: [`Source`] tokens render into a
//! [`DirectiveSet`], a [`PolicyBuilder`] accumulates directive
//! assignments for one configuration scope, [`FormatPolicies`] keys
//! builders by negotiated response format, [`CspOverride`] lets a handler
//! replace or disable the global policy for one request, and
//! [`resolve_policy`] folds all of it into the [`ResolvedPolicy`] the
//! middleware emits.

pub mod builder;
pub mod directives;
pub mod overrides;
pub mod resolve;
pub mod scoped;
pub mod source;

pub use builder::PolicyBuilder;
pub use directives::DirectiveSet;
pub use overrides::{CspExempt, CspOverride, CspRequestExt};
pub use resolve::{resolve_policy, ResolvedPolicy};
pub use scoped::{FormatPolicies, FormatScope};
pub use source::Source;

use thiserror::Error;

/// Configuration-time policy errors.
///
/// These surface while the application assembles its configuration and
/// should abort startup; none of them can occur during request handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("directive `{0}` requires at least one source")]
    EmptySourceList(String),

    #[error("directive `{0}` does not take source values")]
    SourcesOnFlagDirective(String),

    #[error("a policy table cannot mix format-scoped and unscoped registration")]
    MixedScopes,
}
