//! Format-scoped policy registration and lookup.

use crate::policy::{PolicyBuilder, PolicyError};

/// Associates a [`PolicyBuilder`] with each response format, plus one
/// unscoped builder that applies when no format branch matches.
///
/// A table is configured in exactly one of two styles: unscoped via
/// [`configure_default`](Self::configure_default), or format-scoped via
/// [`configure_by_format`](Self::configure_by_format). The two explicit
/// entry points replace any inference from the shape of the supplied
/// closure, and mixing them on one table is rejected outright at
/// registration time.
#[derive(Debug, Clone, Default)]
pub struct FormatPolicies {
    unscoped: Option<PolicyBuilder>,
    by_format: Vec<(String, PolicyBuilder)>,
}

impl FormatPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or extend) the unscoped policy that applies to every
    /// response format. Registering an empty block is meaningful: it
    /// produces a policy that emits an empty-valued header rather than no
    /// header.
    pub fn configure_default(
        &mut self,
        f: impl FnOnce(&mut PolicyBuilder),
    ) -> Result<(), PolicyError> {
        if !self.by_format.is_empty() {
            return Err(PolicyError::MixedScopes);
        }
        let mut builder = self.unscoped.take().unwrap_or_default();
        f(&mut builder);
        let result = builder.take_error();
        self.unscoped = Some(builder);
        result
    }

    /// Register per-format policies. Formats not named here fall back to
    /// the unscoped policy, and with none configured they resolve to "no
    /// policy" - a legitimate configuration, not an error.
    pub fn configure_by_format(
        &mut self,
        f: impl FnOnce(&mut FormatScope),
    ) -> Result<(), PolicyError> {
        if self.unscoped.is_some() {
            return Err(PolicyError::MixedScopes);
        }
        let mut scope = FormatScope {
            by_format: std::mem::take(&mut self.by_format),
        };
        f(&mut scope);
        self.by_format = scope.by_format;
        for (_, builder) in &mut self.by_format {
            builder.take_error()?;
        }
        Ok(())
    }

    /// Look up the policy for a negotiated format: the format's own
    /// branch, else the unscoped policy, else nothing.
    pub fn for_format(&self, format: &str) -> Option<&PolicyBuilder> {
        self.by_format
            .iter()
            .find(|(name, _)| name == format)
            .map(|(_, builder)| builder)
            .or(self.unscoped.as_ref())
    }

    /// True when nothing has been registered at all - the "no policy
    /// configured" state, distinct from a registered-but-empty policy.
    pub fn is_empty(&self) -> bool {
        self.unscoped.is_none() && self.by_format.is_empty()
    }
}

/// Format-dispatch surface handed to `configure_by_format` closures.
#[derive(Debug)]
pub struct FormatScope {
    by_format: Vec<(String, PolicyBuilder)>,
}

impl FormatScope {
    /// Register (or extend) the policy for one response format.
    pub fn on_format(&mut self, format: &str, f: impl FnOnce(&mut PolicyBuilder)) -> &mut Self {
        let index = match self.by_format.iter().position(|(name, _)| name == format) {
            Some(index) => index,
            None => {
                self.by_format
                    .push((format.to_string(), PolicyBuilder::new()));
                self.by_format.len() - 1
            }
        };
        f(&mut self.by_format[index].1);
        self
    }
}
