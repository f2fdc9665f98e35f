//! Per-handler policy overrides, carried in request extensions.

use crate::policy::{FormatPolicies, PolicyError};
use actix_web::HttpMessage;

/// A handler-level override of the global policy for one request.
///
/// An override either disables emission entirely, or supplies a
/// replacement policy table that takes the global table's place wholesale.
/// There is deliberately no directive-level merge between the two layers.
/// The report-only flag can be overridden independently of either.
#[derive(Debug, Clone, Default)]
pub struct CspOverride {
    policy: Option<OverridePolicy>,
    report_only: Option<bool>,
}

#[derive(Debug, Clone)]
enum OverridePolicy {
    /// Explicit "no policy" marker: emit nothing for this request.
    Disabled,
    /// Full replacement for the global policy table.
    Replace(FormatPolicies),
}

impl CspOverride {
    /// An override that disables header emission for the request.
    pub fn disabled() -> Self {
        Self {
            policy: Some(OverridePolicy::Disabled),
            report_only: None,
        }
    }

    /// An override carrying a replacement policy table. Fails fast on any
    /// configuration error inside the block, so prebuilt overrides can be
    /// validated at startup.
    pub fn replacing(
        f: impl FnOnce(&mut FormatPolicies) -> Result<(), PolicyError>,
    ) -> Result<Self, PolicyError> {
        let mut table = FormatPolicies::new();
        f(&mut table)?;
        Ok(Self {
            policy: Some(OverridePolicy::Replace(table)),
            report_only: None,
        })
    }

    /// Override the report-only flag for the request.
    pub fn with_report_only(mut self, report_only: bool) -> Self {
        self.report_only = Some(report_only);
        self
    }

    pub(crate) fn is_disabled(&self) -> bool {
        matches!(self.policy, Some(OverridePolicy::Disabled))
    }

    pub(crate) fn policies(&self) -> Option<&FormatPolicies> {
        match &self.policy {
            Some(OverridePolicy::Replace(table)) => Some(table),
            _ => None,
        }
    }

    pub(crate) fn report_only(&self) -> Option<bool> {
        self.report_only
    }
}

/// Marker set by the surrounding framework on responses that are not
/// eligible for policy injection. The emitter no-ops when it is present.
#[derive(Debug, Clone, Copy)]
pub struct CspExempt;

/// Override registration surface for handler code, implemented for
/// `HttpRequest` and `ServiceRequest`.
pub trait CspRequestExt {
    /// Replace the global policy for this request with the table built by
    /// `f`. Calling it again extends the same replacement table.
    fn override_content_security_policy(
        &self,
        f: impl FnOnce(&mut FormatPolicies) -> Result<(), PolicyError>,
    ) -> Result<(), PolicyError>;

    /// Explicit "no policy" marker: neither the global policy nor any
    /// header is emitted for this request.
    fn disable_content_security_policy(&self);

    /// Override the report-only flag for this request only.
    fn content_security_policy_report_only(&self, report_only: bool);

    /// Attach a prebuilt override (validated at startup) to this request.
    fn set_csp_override(&self, overrides: CspOverride);

    /// Mark this response as not eligible for policy injection.
    fn exempt_from_content_security_policy(&self);
}

impl<M: HttpMessage> CspRequestExt for M {
    fn override_content_security_policy(
        &self,
        f: impl FnOnce(&mut FormatPolicies) -> Result<(), PolicyError>,
    ) -> Result<(), PolicyError> {
        let mut current = self
            .extensions()
            .get::<CspOverride>()
            .cloned()
            .unwrap_or_default();
        let mut table = match current.policy.take() {
            Some(OverridePolicy::Replace(table)) => table,
            _ => FormatPolicies::new(),
        };
        f(&mut table)?;
        current.policy = Some(OverridePolicy::Replace(table));
        self.extensions_mut().insert(current);
        Ok(())
    }

    fn disable_content_security_policy(&self) {
        let mut current = self
            .extensions()
            .get::<CspOverride>()
            .cloned()
            .unwrap_or_default();
        current.policy = Some(OverridePolicy::Disabled);
        self.extensions_mut().insert(current);
    }

    fn content_security_policy_report_only(&self, report_only: bool) {
        let mut current = self
            .extensions()
            .get::<CspOverride>()
            .cloned()
            .unwrap_or_default();
        current.report_only = Some(report_only);
        self.extensions_mut().insert(current);
    }

    fn set_csp_override(&self, overrides: CspOverride) {
        self.extensions_mut().insert(overrides);
    }

    fn exempt_from_content_security_policy(&self) {
        self.extensions_mut().insert(CspExempt);
    }
}
