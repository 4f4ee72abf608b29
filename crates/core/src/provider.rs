//! Collaborator traits consumed by the composition engine.
//!
//! The engine treats fragment storage, hierarchical data sources and the
//! two system layers as external collaborators, specified only at this
//! boundary. `strata-compose` ships filesystem and in-memory
//! implementations.

use crate::bindings::{Bindings, Contribution};
use crate::context::ComposeContext;
use crate::diagnostics::DiagnosticAcceptor;
use crate::error::Result;
use crate::layer::Layer;
use std::path::Path;

/// Loads direct binding fragments by fully-qualified name.
///
/// Implementations must return an independently-owned fragment from
/// [`load`](FragmentLoader::load) — never a shared instance.
pub trait FragmentLoader: Send + Sync {
    /// Load the fragment. `Ok(None)` means no such fragment exists; a
    /// fragment that exists but cannot be read or parsed is an error.
    fn load(&self, root: &Path, qualified_name: &str) -> Result<Option<Bindings>>;

    /// Existence probe without loading.
    fn loadable(&self, root: &Path, qualified_name: &str) -> bool;
}

/// Loads hierarchical data sources rooted at a resolved location.
///
/// The returned contribution already carries its own effective categories
/// and is passed through unmodified by the scheme handler.
pub trait HieraProvider: Send + Sync {
    /// Does a hierarchical source exist at this location?
    fn loadable(&self, resolved_path: &Path) -> bool;

    /// Load the source into a contribution.
    fn load(
        &self,
        source_id: &str,
        resolved_path: &Path,
        ctx: &ComposeContext,
        acceptor: &dyn DiagnosticAcceptor,
    ) -> Result<Contribution>;
}

/// Supplies the two fixed system layers that bound every composition.
pub trait SystemBindings: Send + Sync {
    /// The non-overridable layer placed first.
    fn final_layer(&self) -> Layer;

    /// The fully-overridable layer placed last.
    fn default_layer(&self) -> Layer;
}
