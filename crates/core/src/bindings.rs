//! Opaque binding fragments and the contributions that carry them.

use crate::category::CategorySet;
use serde::{Deserialize, Serialize};

/// An opaque collection of configuration bindings.
///
/// The composition engine never interprets the payload — it only moves it
/// between layers. Loaders must hand out independently-owned copies so that
/// downstream mutation of one layer cannot leak into another or back into a
/// cached source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bindings {
    /// Where this fragment came from (file path, reference string, ...).
    pub source: String,

    /// The fragment payload.
    pub data: serde_json::Value,
}

impl Bindings {
    pub fn new(source: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            source: source.into(),
            data,
        }
    }

    /// An empty fragment, useful for system layers and tests.
    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(source, serde_json::Value::Object(serde_json::Map::new()))
    }
}

/// The result of resolving one concrete reference: a fragment plus the
/// metadata the precedence checker needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Identifies the resolved reference, used as the diagnostic location.
    pub source_id: String,

    /// The loaded fragment.
    pub bindings: Bindings,

    /// The categories this contribution declares itself scoped by.
    /// `None` means "no opinion" — the contribution accepts whatever global
    /// precedence applies and is skipped by the precedence checker.
    pub effective_categories: Option<CategorySet>,
}

impl Contribution {
    /// A contribution from a direct (symbolic) reference, with no declared
    /// categories.
    pub fn direct(source_id: impl Into<String>, bindings: Bindings) -> Self {
        Self {
            source_id: source_id.into(),
            bindings,
            effective_categories: None,
        }
    }

    /// A contribution that declares its own effective categories, as
    /// hierarchical sources do.
    pub fn with_categories(
        source_id: impl Into<String>,
        bindings: Bindings,
        categories: CategorySet,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            bindings,
            effective_categories: Some(categories),
        }
    }

    /// Strip the metadata, keeping only the fragment.
    pub fn into_bindings(self) -> Bindings {
        self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    #[test]
    fn direct_contribution_has_no_opinion() {
        let c = Contribution::direct("module:/acme/default", Bindings::empty("acme"));
        assert!(c.effective_categories.is_none());
    }

    #[test]
    fn categorized_contribution_keeps_order() {
        let cats: CategorySet = [
            Category::new("osfamily", "debian"),
            Category::new("common", "true"),
        ]
        .into_iter()
        .collect();
        let c = Contribution::with_categories("module-hiera:/acme/data", Bindings::empty("x"), cats);
        let set = c.effective_categories.unwrap();
        assert_eq!(set.index_of("osfamily"), Some(0));
        assert_eq!(set.index_of("common"), Some(1));
    }
}
