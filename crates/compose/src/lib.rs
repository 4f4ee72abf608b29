//! strata-compose — the layered-bindings composition engine.
//!
//! The engine turns a layering/categorization configuration plus a per-node
//! context into a layered bindings structure:
//!
//! ```text
//!                  ┌────────────────────────────────┐
//!                  │            Composer            │
//!                  └───────┬───────────────┬────────┘
//!                          │               │
//!              ┌───────────▼──────┐  ┌─────▼─────────────┐
//!              │  LayerResolver   │  │ CategoryEvaluator │
//!              │ include − exclude│  │  expression DSL   │
//!              └───────┬──────────┘  └─────┬─────────────┘
//!                      │                   │
//!              ┌───────▼──────────┐  ┌─────▼─────────────┐
//!              │  SchemeRegistry  │  │ check_precedence  │
//!              │ module / confdir │  │   diagnostics     │
//!              │  *-hiera schemes │  └───────────────────┘
//!              └───────┬──────────┘
//!                      │
//!        ┌─────────────▼───────────────┐
//!        │ FragmentLoader/HieraProvider│
//!        │   (filesystem or memory)    │
//!        └─────────────────────────────┘
//! ```
//!
//! Resolution per layer is `expand(include) − expand(exclude)` over
//! normalized references, then one contribution load per survivor. The
//! result is always bracketed by the two system layers.

pub mod categories;
pub mod composer;
pub mod expr;
pub mod fs;
pub mod memory;
pub mod precedence;
pub mod resolver;
pub mod scheme;

pub use categories::CategoryEvaluator;
pub use composer::Composer;
pub use fs::{FsFragmentLoader, TomlHieraProvider, discover_modules};
pub use memory::{MemoryFragmentLoader, MemoryHieraProvider, StaticSystemBindings};
pub use precedence::check_precedence;
pub use resolver::LayerResolver;
pub use scheme::{SchemeHandler, SchemeRegistry};
