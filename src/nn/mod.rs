// Neural network module for scalox.
// High-level building blocks (neurons, layers, perceptrons and their
// optimizers) composed from the scalar autodiff engine's public surface.

pub mod layers;
pub mod module;
pub mod optim;
mod tests;

// Re-export the main types and traits for convenience
pub use layers::{Layer, MLP, Neuron};
pub use module::Module;
pub use optim::{Optimizer, SGD};

/// Weight initialization utilities
pub mod init {
    pub use crate::initializers::*;
}
