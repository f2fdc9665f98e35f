//! Ordered directive collection and header serialization.

use crate::policy::Source;
use serde::{Deserialize, Serialize};

/// The value side of one directive: a source list, or nothing at all for
/// boolean directives like `upgrade-insecure-requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum DirectiveValue {
    Sources(Vec<Source>),
    Flag,
}

/// An ordered set of CSP directives.
///
/// Each directive name appears at most once. Re-assigning a directive
/// replaces its sources but keeps the name's original position, so output
/// order always follows first-insertion order. An empty set is a valid
/// policy and serializes to the empty string; "empty policy" and "no
/// policy" are distinct states and are kept apart by the resolver, not
/// here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveSet {
    entries: Vec<(String, DirectiveValue)>,
}

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the source list for `name`, appending the directive if it
    /// was not present before.
    pub fn assign(&mut self, name: &str, sources: Vec<Source>) {
        self.put(name, DirectiveValue::Sources(sources));
    }

    /// Set a boolean directive, rendered as the bare directive name.
    pub fn assign_flag(&mut self, name: &str) {
        self.put(name, DirectiveValue::Flag);
    }

    fn put(&mut self, name: &str, value: DirectiveValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Append one source to an existing directive. Boolean directives and
    /// absent names are left untouched.
    pub(crate) fn append_source(&mut self, name: &str, source: Source) {
        if let Some((_, DirectiveValue::Sources(sources))) =
            self.entries.iter_mut().find(|(n, _)| n == name)
        {
            sources.push(source);
        }
    }

    /// Serialize to the CSP header value grammar: directives joined by
    /// `"; "`, each as `<name> <source> <source> ...`, boolean directives
    /// as the bare name.
    pub fn header_value(&self) -> String {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, value)| match value {
                DirectiveValue::Flag => name.clone(),
                DirectiveValue::Sources(sources) => {
                    let rendered: Vec<String> =
                        sources.iter().map(ToString::to_string).collect();
                    format!("{} {}", name, rendered.join(" "))
                }
            })
            .collect();

        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_follows_insertion_order() {
        let mut set = DirectiveSet::new();
        set.assign("script-src", vec![Source::SelfOrigin]);
        set.assign("default-src", vec![Source::SelfOrigin, Source::scheme("https")]);

        assert_eq!(
            set.header_value(),
            "script-src 'self'; default-src 'self' https:"
        );
    }

    #[test]
    fn test_reassignment_replaces_but_keeps_position() {
        let mut set = DirectiveSet::new();
        set.assign("default-src", vec![Source::SelfOrigin]);
        set.assign("img-src", vec![Source::scheme("data")]);
        set.assign("default-src", vec![Source::None]);

        assert_eq!(set.len(), 2);
        assert_eq!(set.header_value(), "default-src 'none'; img-src data:");
    }

    #[test]
    fn test_boolean_directive_renders_bare() {
        let mut set = DirectiveSet::new();
        set.assign("default-src", vec![Source::SelfOrigin]);
        set.assign_flag("upgrade-insecure-requests");

        assert_eq!(
            set.header_value(),
            "default-src 'self'; upgrade-insecure-requests"
        );
    }

    #[test]
    fn test_empty_set_serializes_to_empty_string() {
        assert_eq!(DirectiveSet::new().header_value(), "");
    }

    #[test]
    fn test_append_source_skips_flags_and_missing_names() {
        let mut set = DirectiveSet::new();
        set.assign("script-src", vec![Source::SelfOrigin]);
        set.assign_flag("upgrade-insecure-requests");

        set.append_source("script-src", Source::nonce("abc"));
        set.append_source("upgrade-insecure-requests", Source::nonce("abc"));
        set.append_source("style-src", Source::nonce("abc"));

        assert_eq!(
            set.header_value(),
            "script-src 'self' 'nonce-abc'; upgrade-insecure-requests"
        );
    }
}
