//! Content security policy configuration.

use crate::nonce::NonceGenerator;
use crate::policy::{FormatPolicies, FormatScope, PolicyBuilder, PolicyError};
use std::env;

const DEFAULT_NONCE_DIRECTIVES: &[&str] = &["script-src", "style-src"];

/// Global CSP configuration: the policy table, the default report-only
/// flag, and the nonce machinery.
///
/// Assembled once at startup and shared read-only across requests by the
/// CSP middleware. Policy registration errors surface here, before the
/// server accepts traffic.
#[derive(Debug, Clone)]
pub struct CspConfig {
    /// Master switch; when off the middleware passes responses through.
    pub enabled: bool,
    /// Emit `Content-Security-Policy-Report-Only` instead of the
    /// enforcing header (handlers can override per request).
    pub report_only: bool,
    policies: FormatPolicies,
    nonce_generator: Option<NonceGenerator>,
    nonce_directives: Vec<String>,
}

impl Default for CspConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            report_only: false,
            policies: FormatPolicies::new(),
            nonce_generator: None,
            nonce_directives: DEFAULT_NONCE_DIRECTIVES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CspConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the scalar settings from environment variables, falling back
    /// to defaults. The policy table and nonce generator are code-level
    /// configuration and are registered separately.
    pub fn from_env() -> Self {
        let enabled = env::var("CSP_ENABLED")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(true);

        let report_only = env::var("CSP_REPORT_ONLY")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let nonce_directives = env::var("CSP_NONCE_DIRECTIVES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                DEFAULT_NONCE_DIRECTIVES
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            });

        Self {
            enabled,
            report_only,
            nonce_directives,
            ..Self::default()
        }
    }

    /// Register or extend the global policy, unscoped style: one builder
    /// applying to every response format.
    pub fn configure(
        &mut self,
        f: impl FnOnce(&mut PolicyBuilder),
    ) -> Result<(), PolicyError> {
        self.policies.configure_default(f)
    }

    /// Register or extend the global policy, format-scoped style.
    pub fn configure_by_format(
        &mut self,
        f: impl FnOnce(&mut FormatScope),
    ) -> Result<(), PolicyError> {
        self.policies.configure_by_format(f)
    }

    /// Install the per-request nonce generator.
    pub fn set_nonce_generator(&mut self, generator: NonceGenerator) {
        self.nonce_generator = Some(generator);
    }

    /// Remove the generator, disabling nonce injection entirely.
    pub fn clear_nonce_generator(&mut self) {
        self.nonce_generator = None;
    }

    /// Replace the list of directives eligible for nonce injection.
    pub fn set_nonce_directives<I>(&mut self, directives: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.nonce_directives = directives.into_iter().map(Into::into).collect();
    }

    pub fn policies(&self) -> &FormatPolicies {
        &self.policies
    }

    pub fn nonce_generator(&self) -> Option<&NonceGenerator> {
        self.nonce_generator.as_ref()
    }

    pub fn nonce_directives(&self) -> &[String] {
        &self.nonce_directives
    }
}
