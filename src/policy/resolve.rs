//! Per-request policy resolution.

use crate::policy::{CspOverride, DirectiveSet, FormatPolicies, Source};

/// The outcome of resolving one request: a frozen directive set and the
/// effective report-only flag. `None` from [`resolve_policy`] means "emit
/// nothing"; a `Some` with an empty directive set still emits a header
/// whose value is the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPolicy {
    directives: DirectiveSet,
    report_only: bool,
}

impl ResolvedPolicy {
    pub fn report_only(&self) -> bool {
        self.report_only
    }

    /// The header this policy should be written to. Exactly one of the
    /// two CSP headers is ever set for a resolved request.
    pub fn header_name(&self) -> &'static str {
        if self.report_only {
            "content-security-policy-report-only"
        } else {
            "content-security-policy"
        }
    }

    pub fn header_value(&self) -> String {
        self.directives.header_value()
    }

    pub fn directives(&self) -> &DirectiveSet {
        &self.directives
    }
}

/// Resolve the policy to emit for one request.
///
/// Layering: a handler override marked "no policy" wins over everything;
/// an override policy table replaces the global table wholesale (no
/// directive-level merge); otherwise the global table is consulted for
/// the request's negotiated format. The override's report-only flag, when
/// set, wins over the global flag even when the policy itself is
/// inherited.
///
/// `nonce` is the per-request memoized nonce source. It is invoked at
/// most once, and only when an injectable directive is actually present;
/// `None` (no generator configured) degrades to a policy without nonces.
pub fn resolve_policy(
    global: &FormatPolicies,
    global_report_only: bool,
    nonce_directives: &[String],
    overrides: Option<&CspOverride>,
    format: &str,
    nonce: &mut dyn FnMut() -> Option<String>,
) -> Option<ResolvedPolicy> {
    let mut report_only = global_report_only;

    let builder = match overrides {
        Some(overrides) => {
            if overrides.is_disabled() {
                return None;
            }
            if let Some(flag) = overrides.report_only() {
                report_only = flag;
            }
            match overrides.policies() {
                Some(table) => table.for_format(format)?,
                None => global.for_format(format)?,
            }
        }
        None => global.for_format(format)?,
    };

    let mut directives = builder.freeze();
    if builder.injects_nonce() {
        inject_nonce(&mut directives, nonce_directives, nonce);
    }

    Some(ResolvedPolicy {
        directives,
        report_only,
    })
}

fn inject_nonce(
    directives: &mut DirectiveSet,
    nonce_directives: &[String],
    nonce: &mut dyn FnMut() -> Option<String>,
) {
    let mut value: Option<Option<String>> = None;
    for name in nonce_directives {
        if !directives.contains(name) {
            continue;
        }
        let cached = value.get_or_insert_with(&mut *nonce);
        match cached {
            Some(nonce_value) => {
                directives.append_source(name, Source::nonce(nonce_value.clone()));
            }
            // No generator configured: leave every directive unmodified.
            None => break,
        }
    }
}
