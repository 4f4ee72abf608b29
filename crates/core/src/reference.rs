//! Binding references — URI-style pointers to configuration fragments.
//!
//! A reference has the shape `<scheme>:/<path>[?<query>]`, e.g.:
//!
//! ```text
//! module:/acme/default          — fragment "acme::default" in module "acme"
//! module:/*/default             — wildcard over all known modules
//! confdir:/default?             — optional confdir fragment
//! module-hiera:/acme/windows    — hierarchical source under module "acme"
//! confdir-hiera:/hiera.toml?    — optional hierarchical source in the confdir
//! ```
//!
//! Identity is structural (scheme + path + query). Set membership during
//! include/exclude subtraction compares the [normalized] form, which drops
//! the query and any trailing slash.
//!
//! [normalized]: BindingReference::normalized

use crate::error::{ComposeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The wildcard path segment that requests expansion over all known modules.
pub const WILDCARD: &str = "*";

/// A parsed reference to a configuration fragment or hierarchical source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingReference {
    /// The scheme deciding which handler resolves this reference.
    pub scheme: String,

    /// The path component, always starting with `/`.
    pub path: String,

    /// The raw query string, if any. `Some("")` and `Some("optional")` mark
    /// the reference optional.
    pub query: Option<String>,
}

impl BindingReference {
    /// Create a concrete (query-free) reference from a scheme and path.
    pub fn new(scheme: impl Into<String>, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            scheme: scheme.into(),
            path,
            query: None,
        }
    }

    /// Parse a reference from its string form.
    ///
    /// Any scheme string is accepted here — whether a handler exists for it
    /// is decided at dispatch time, not parse time.
    pub fn parse(input: &str) -> Result<Self> {
        let (scheme, rest) = input.split_once(':').ok_or_else(|| {
            ComposeError::MalformedReference {
                reference: input.to_string(),
                reason: "missing scheme separator ':'".into(),
            }
        })?;
        if scheme.is_empty() {
            return Err(ComposeError::MalformedReference {
                reference: input.to_string(),
                reason: "empty scheme".into(),
            });
        }
        let (path, query) = match rest.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (rest, None),
        };
        if !path.starts_with('/') {
            return Err(ComposeError::MalformedReference {
                reference: input.to_string(),
                reason: "path must start with '/'".into(),
            });
        }
        Ok(Self {
            scheme: scheme.to_string(),
            path: path.to_string(),
            query,
        })
    }

    /// True iff the query marks this reference optional: a missing target is
    /// silently dropped instead of being an error.
    pub fn is_optional(&self) -> bool {
        matches!(self.query.as_deref(), Some("") | Some("optional"))
    }

    /// Non-empty path segments, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }

    /// The first path segment, if any.
    pub fn first_segment(&self) -> Option<&str> {
        self.segments().next()
    }

    /// True iff the first path segment is the wildcard marker.
    pub fn is_wildcard(&self) -> bool {
        self.first_segment() == Some(WILDCARD)
    }

    /// The normalized string form: scheme and path with the query and any
    /// trailing slash stripped. This is the identity used for set algebra.
    pub fn normalized(&self) -> String {
        let path = self.path.trim_end_matches('/');
        if path.is_empty() {
            format!("{}:/", self.scheme)
        } else {
            format!("{}:{}", self.scheme, path)
        }
    }

    /// A copy of this reference with the query and trailing slash stripped.
    pub fn without_query(&self) -> Self {
        let path = self.path.trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };
        Self {
            scheme: self.scheme.clone(),
            path: path.to_string(),
            query: None,
        }
    }
}

impl fmt::Display for BindingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.path)?;
        if let Some(q) = &self.query {
            write!(f, "?{q}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_reference() {
        let r = BindingReference::parse("module:/acme/default").unwrap();
        assert_eq!(r.scheme, "module");
        assert_eq!(r.path, "/acme/default");
        assert_eq!(r.query, None);
        assert!(!r.is_optional());
    }

    #[test]
    fn parse_optional_empty_query() {
        let r = BindingReference::parse("confdir:/default?").unwrap();
        assert_eq!(r.query.as_deref(), Some(""));
        assert!(r.is_optional());
    }

    #[test]
    fn parse_optional_literal_query() {
        let r = BindingReference::parse("confdir:/default?optional").unwrap();
        assert!(r.is_optional());
    }

    #[test]
    fn other_queries_are_not_optional() {
        let r = BindingReference::parse("confdir:/default?strict").unwrap();
        assert!(!r.is_optional());
    }

    #[test]
    fn parse_rejects_missing_scheme() {
        assert!(BindingReference::parse("/acme/default").is_err());
        assert!(BindingReference::parse(":/acme/default").is_err());
    }

    #[test]
    fn parse_rejects_relative_path() {
        assert!(BindingReference::parse("module:acme/default").is_err());
    }

    #[test]
    fn unknown_scheme_is_accepted_at_parse_time() {
        let r = BindingReference::parse("bogus:/x/y").unwrap();
        assert_eq!(r.scheme, "bogus");
    }

    #[test]
    fn wildcard_detection() {
        assert!(BindingReference::parse("module:/*/default").unwrap().is_wildcard());
        assert!(!BindingReference::parse("module:/acme/default").unwrap().is_wildcard());
    }

    #[test]
    fn normalized_strips_query_and_trailing_slash() {
        let r = BindingReference::parse("module:/acme/default/?optional").unwrap();
        assert_eq!(r.normalized(), "module:/acme/default");
        let bare = BindingReference::parse("module:/acme/default").unwrap();
        assert_eq!(r.normalized(), bare.normalized());
    }

    #[test]
    fn display_round_trips_query() {
        let r = BindingReference::parse("module:/acme/default?optional").unwrap();
        assert_eq!(r.to_string(), "module:/acme/default?optional");
    }

    #[test]
    fn segments_skip_empty() {
        let r = BindingReference::parse("module:/acme//default/").unwrap();
        let segs: Vec<_> = r.segments().collect();
        assert_eq!(segs, vec!["acme", "default"]);
    }
}
