//! Named layers and the assembled layered structure.

use crate::bindings::Bindings;
use serde::{Deserialize, Serialize};

/// A named, ordered collection of binding fragments.
///
/// By the time a layer exists, contribution metadata has been stripped —
/// effective categories are only needed for validation, not for the final
/// structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub bindings: Vec<Bindings>,
}

impl Layer {
    /// An empty layer with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
        }
    }

    pub fn with_bindings(name: impl Into<String>, bindings: Vec<Bindings>) -> Self {
        Self {
            name: name.into(),
            bindings,
        }
    }

    pub fn push(&mut self, bindings: Bindings) {
        self.bindings.push(bindings);
    }
}

/// The finished result of a composition run.
///
/// Layer order is fixed: the final system layer first (its bindings can
/// never be overridden by anything configured), then the configured layers
/// in declared order, then the default system layer last (overridable by
/// everything configured). [`LayeredBindings::assemble`] is the only
/// constructor, so the invariant holds for 0, 1 or many configured layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AssembledLayers")]
pub struct LayeredBindings {
    layers: Vec<Layer>,
}

/// Deserialization shape for [`LayeredBindings`]; rejects inputs missing
/// the two system layers so the accessors stay panic-free.
#[derive(Deserialize)]
struct AssembledLayers {
    layers: Vec<Layer>,
}

impl TryFrom<AssembledLayers> for LayeredBindings {
    type Error = String;

    fn try_from(value: AssembledLayers) -> Result<Self, Self::Error> {
        if value.layers.len() < 2 {
            return Err(format!(
                "layered bindings need the final and default system layers, got {} layer(s)",
                value.layers.len()
            ));
        }
        Ok(Self {
            layers: value.layers,
        })
    }
}

impl LayeredBindings {
    /// Build the result: `[final] + configured + [default]`.
    pub fn assemble(final_layer: Layer, configured: Vec<Layer>, default_layer: Layer) -> Self {
        let mut layers = Vec::with_capacity(configured.len() + 2);
        layers.push(final_layer);
        layers.extend(configured);
        layers.push(default_layer);
        Self { layers }
    }

    /// All layers, highest precedence first.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The non-overridable system layer (always first).
    pub fn final_layer(&self) -> &Layer {
        &self.layers[0]
    }

    /// The fully-overridable system layer (always last).
    pub fn default_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// The configured layers, in declared order.
    pub fn configured(&self) -> &[Layer] {
        &self.layers[1..self.layers.len() - 1]
    }
}
