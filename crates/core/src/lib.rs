//! Core domain types and collaborator traits for the strata layered-bindings
//! composition engine.
//!
//! This crate defines the vocabulary shared by every other strata crate:
//!
//! - [`BindingReference`] — URI-style references to configuration fragments
//! - [`Category`] / [`CategorySet`] — named precedence dimensions
//! - [`Bindings`] / [`Contribution`] — loaded fragments and their metadata
//! - [`Layer`] / [`LayeredBindings`] — the assembled, ordered result
//! - [`ComposeContext`] / [`ModuleIndex`] — the per-call environment
//! - Collaborator traits ([`FragmentLoader`], [`HieraProvider`],
//!   [`SystemBindings`], [`DiagnosticAcceptor`]) implemented elsewhere
//!
//! The engine itself lives in `strata-compose`; configuration parsing in
//! `strata-config`.

pub mod bindings;
pub mod category;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod layer;
pub mod provider;
pub mod reference;

pub use bindings::{Bindings, Contribution};
pub use category::{Category, CategorySet};
pub use context::{ComposeContext, ModuleDescriptor, ModuleIndex};
pub use diagnostics::{Diagnostic, DiagnosticAcceptor, DiagnosticLog, IssueKind};
pub use error::{ComposeError, Result};
pub use layer::{Layer, LayeredBindings};
pub use provider::{FragmentLoader, HieraProvider, SystemBindings};
pub use reference::{BindingReference, WILDCARD};
