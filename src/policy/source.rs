//! CSP source expressions and their rendering rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single source expression within a directive's value list.
///
/// The CSP header grammar renders each kind of source differently:
/// keywords are wrapped in single quotes (`'self'`), schemes carry a
/// trailing colon and no quotes (`https:`), and host or URL literals pass
/// through verbatim (`https://cdn.example.com`, `*.example.com`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// `'self'` - the response's own origin
    SelfOrigin,
    /// `'none'` - no sources allowed
    None,
    /// `'unsafe-inline'`
    UnsafeInline,
    /// `'unsafe-eval'`
    UnsafeEval,
    /// `'strict-dynamic'`
    StrictDynamic,
    /// `'report-sample'`
    ReportSample,
    /// `'nonce-<value>'` - per-request cryptographic nonce
    Nonce(String),
    /// Scheme source such as `https:` or `data:`
    Scheme(String),
    /// Host or URL literal, passed through verbatim
    Host(String),
}

impl Source {
    /// Scheme source (`https`, `data`, `blob`, `ws`, ...), rendered with a
    /// trailing colon. A colon supplied by the caller is stripped so both
    /// `"https"` and `"https:"` produce `https:`.
    pub fn scheme(scheme: impl Into<String>) -> Self {
        let mut scheme = scheme.into();
        if scheme.ends_with(':') {
            scheme.pop();
        }
        Source::Scheme(scheme)
    }

    /// Host or URL literal, rendered verbatim.
    pub fn host(host: impl Into<String>) -> Self {
        Source::Host(host.into())
    }

    /// Nonce source for the given per-request value.
    pub fn nonce(value: impl Into<String>) -> Self {
        Source::Nonce(value.into())
    }
}

/// Plain strings are literal sources, passed through to the header verbatim.
impl From<&str> for Source {
    fn from(value: &str) -> Self {
        Source::Host(value.to_string())
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Source::Host(value)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::SelfOrigin => f.write_str("'self'"),
            Source::None => f.write_str("'none'"),
            Source::UnsafeInline => f.write_str("'unsafe-inline'"),
            Source::UnsafeEval => f.write_str("'unsafe-eval'"),
            Source::StrictDynamic => f.write_str("'strict-dynamic'"),
            Source::ReportSample => f.write_str("'report-sample'"),
            Source::Nonce(value) => write!(f, "'nonce-{value}'"),
            Source::Scheme(scheme) => write!(f, "{scheme}:"),
            Source::Host(host) => f.write_str(host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_quoted() {
        assert_eq!(Source::SelfOrigin.to_string(), "'self'");
        assert_eq!(Source::None.to_string(), "'none'");
        assert_eq!(Source::UnsafeInline.to_string(), "'unsafe-inline'");
        assert_eq!(Source::StrictDynamic.to_string(), "'strict-dynamic'");
    }

    #[test]
    fn test_schemes_get_trailing_colon() {
        assert_eq!(Source::scheme("https").to_string(), "https:");
        assert_eq!(Source::scheme("wss").to_string(), "wss:");
        // Caller-supplied colon is not doubled
        assert_eq!(Source::scheme("data:").to_string(), "data:");
    }

    #[test]
    fn test_literals_pass_through_verbatim() {
        assert_eq!(
            Source::host("https://cdn.example.com").to_string(),
            "https://cdn.example.com"
        );
        assert_eq!(Source::from("*.example.com").to_string(), "*.example.com");
    }

    #[test]
    fn test_nonce_rendering() {
        assert_eq!(
            Source::nonce("iyhD0Yc0W+c=").to_string(),
            "'nonce-iyhD0Yc0W+c='"
        );
    }
}
