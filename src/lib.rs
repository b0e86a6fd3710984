//! # Scalox
//!
//! Scalox is a lightweight reverse-mode automatic differentiation engine over
//! scalar values, written in Rust, with a minimal multilayer perceptron built
//! on top of it.
//!
//! ## Features
//!
//! - Reverse-mode automatic differentiation (backpropagation)
//! - Dynamic computation graph construction, arena-indexed
//! - Gradient accumulation at shared (fan-out) nodes
//! - Typed errors for division by zero and power-domain violations
//! - Graph visualization (requires GraphViz installed)
//! - Small neural network building blocks with SGD training
//! - Written 100% in safe Rust
//!
//! ## Example
//!
//! ```rust
//! use scalox::Engine;
//!
//! let mut graph = Engine::new();
//! let a = graph.scalar(2.0);
//! let b = graph.scalar(-3.0);
//! let c = graph.mul(a, b).unwrap();
//! let d = graph.relu(c).unwrap();
//!
//! graph.backward(d).unwrap();
//!
//! assert_eq!(graph.value(c), -6.0);
//! // The ReLU is inactive, so no gradient reaches the inputs.
//! assert_eq!(graph.grad(a), 0.0);
//! ```
pub mod graph;
pub mod initializers;
pub mod nn;

// Re-export commonly used types for convenience
pub use graph::{Engine, GraphError, Node, NodeId, Op};
