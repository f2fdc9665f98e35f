//! Mutable construction surface for one policy.

use crate::policy::{DirectiveSet, PolicyError, Source};

/// Boolean-only directives. Assigning sources to one of these is a
/// configuration error.
const FLAG_DIRECTIVES: &[&str] = &["upgrade-insecure-requests", "block-all-mixed-content"];

fn is_flag_directive(name: &str) -> bool {
    FLAG_DIRECTIVES.contains(&name)
}

macro_rules! source_directives {
    ($($(#[$meta:meta])* $method:ident => $name:literal;)+) => {
        $(
            $(#[$meta])*
            pub fn $method<I>(&mut self, sources: I) -> &mut Self
            where
                I: IntoIterator,
                I::Item: Into<Source>,
            {
                self.set($name, sources)
            }
        )+
    };
}

macro_rules! flag_directives {
    ($($(#[$meta:meta])* $method:ident => $name:literal;)+) => {
        $(
            $(#[$meta])*
            pub fn $method(&mut self) -> &mut Self {
                self.directives.assign_flag($name);
                self
            }
        )+
    };
}

/// Accumulates directive assignments for one configuration scope (global,
/// per-format, or per-handler override).
///
/// Builders are mutated only during configuration and frozen into an
/// immutable [`DirectiveSet`] at resolution time. Setter mistakes (an
/// empty source list, sources on a boolean-only directive) are recorded
/// inside the builder and surfaced as an `Err` when the enclosing
/// `configure_*` call returns, so misconfiguration stops the application
/// at startup instead of failing per request.
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    directives: DirectiveSet,
    suppress_nonce: bool,
    error: Option<PolicyError>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    source_directives! {
        /// `default-src` - fallback for the other fetch directives
        default_src => "default-src";
        /// `script-src`
        script_src => "script-src";
        /// `style-src`
        style_src => "style-src";
        /// `img-src`
        img_src => "img-src";
        /// `font-src`
        font_src => "font-src";
        /// `connect-src`
        connect_src => "connect-src";
        /// `media-src`
        media_src => "media-src";
        /// `object-src`
        object_src => "object-src";
        /// `frame-src`
        frame_src => "frame-src";
        /// `child-src`
        child_src => "child-src";
        /// `worker-src`
        worker_src => "worker-src";
        /// `manifest-src`
        manifest_src => "manifest-src";
        /// `form-action`
        form_action => "form-action";
        /// `frame-ancestors`
        frame_ancestors => "frame-ancestors";
        /// `base-uri`
        base_uri => "base-uri";
        /// `report-uri`
        report_uri => "report-uri";
    }

    flag_directives! {
        /// `upgrade-insecure-requests` (boolean, no sources)
        upgrade_insecure_requests => "upgrade-insecure-requests";
        /// `block-all-mixed-content` (boolean, no sources)
        block_all_mixed_content => "block-all-mixed-content";
    }

    /// Generic entry point for directive names without a named setter,
    /// keeping the directive set extensible without code changes here.
    /// An empty source list selects the boolean form, which is only valid
    /// for boolean-only directives.
    pub fn directive<I>(&mut self, name: &str, sources: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Source>,
    {
        let sources: Vec<Source> = sources.into_iter().map(Into::into).collect();
        if sources.is_empty() && is_flag_directive(name) {
            self.directives.assign_flag(name);
            return self;
        }
        self.set_sources(name, sources)
    }

    /// Opt this policy out of nonce injection. The default is opted in:
    /// directives named in the global nonce-directives list receive a
    /// `'nonce-…'` source whenever a generator is configured.
    pub fn nonce(&mut self, inject: bool) -> &mut Self {
        self.suppress_nonce = !inject;
        self
    }

    fn set<I>(&mut self, name: &str, sources: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Source>,
    {
        let sources = sources.into_iter().map(Into::into).collect();
        self.set_sources(name, sources)
    }

    fn set_sources(&mut self, name: &str, sources: Vec<Source>) -> &mut Self {
        // First error wins; later assignments are ignored once poisoned.
        if self.error.is_some() {
            return self;
        }
        if sources.is_empty() {
            self.error = Some(PolicyError::EmptySourceList(name.to_string()));
        } else if is_flag_directive(name) {
            self.error = Some(PolicyError::SourcesOnFlagDirective(name.to_string()));
        } else {
            self.directives.assign(name, sources);
        }
        self
    }

    pub(crate) fn injects_nonce(&self) -> bool {
        !self.suppress_nonce
    }

    /// Freeze into an immutable directive set for one request.
    pub(crate) fn freeze(&self) -> DirectiveSet {
        self.directives.clone()
    }

    /// Surface any deferred setter error, clearing it.
    pub(crate) fn take_error(&mut self) -> Result<(), PolicyError> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_setters_accumulate_in_order() {
        let mut policy = PolicyBuilder::new();
        policy
            .default_src([Source::SelfOrigin, Source::scheme("https")])
            .script_src([Source::SelfOrigin])
            .upgrade_insecure_requests();

        assert_eq!(
            policy.freeze().header_value(),
            "default-src 'self' https:; script-src 'self'; upgrade-insecure-requests"
        );
        assert!(policy.take_error().is_ok());
    }

    #[test]
    fn test_generic_directive_escape_hatch() {
        let mut policy = PolicyBuilder::new();
        policy.directive("prefetch-src", [Source::SelfOrigin]);

        assert_eq!(policy.freeze().header_value(), "prefetch-src 'self'");
    }

    #[test]
    fn test_generic_directive_boolean_form() {
        let mut policy = PolicyBuilder::new();
        policy.directive("upgrade-insecure-requests", Vec::<Source>::new());

        assert_eq!(
            policy.freeze().header_value(),
            "upgrade-insecure-requests"
        );
        assert!(policy.take_error().is_ok());
    }

    #[test]
    fn test_empty_source_list_is_deferred_error() {
        let mut policy = PolicyBuilder::new();
        policy.script_src(Vec::<Source>::new());

        assert_eq!(
            policy.take_error(),
            Err(PolicyError::EmptySourceList("script-src".to_string()))
        );
    }

    #[test]
    fn test_sources_on_boolean_directive_is_deferred_error() {
        let mut policy = PolicyBuilder::new();
        policy.directive("block-all-mixed-content", [Source::SelfOrigin]);

        assert_eq!(
            policy.take_error(),
            Err(PolicyError::SourcesOnFlagDirective(
                "block-all-mixed-content".to_string()
            ))
        );
    }

    #[test]
    fn test_first_error_wins_and_later_assignments_are_ignored() {
        let mut policy = PolicyBuilder::new();
        policy
            .script_src(Vec::<Source>::new())
            .default_src([Source::SelfOrigin]);

        assert_eq!(
            policy.take_error(),
            Err(PolicyError::EmptySourceList("script-src".to_string()))
        );
        assert!(policy.freeze().is_empty());
    }

    #[test]
    fn test_string_sources_are_literals() {
        let mut policy = PolicyBuilder::new();
        policy.default_src(["https://example.com"]);

        assert_eq!(
            policy.freeze().header_value(),
            "default-src https://example.com"
        );
    }

    #[test]
    fn test_nonce_opt_out() {
        let mut policy = PolicyBuilder::new();
        assert!(policy.injects_nonce());
        policy.nonce(false);
        assert!(!policy.injects_nonce());
    }
}
