use crate::graph::Engine;
use crate::graph::GraphError;
use crate::graph::NodeId;

/// The base trait for all neural network modules.
///
/// A module owns the ids of its parameter leaves inside a shared [`Engine`]
/// and knows how to extend the graph with its forward computation. Parameter
/// values live in the engine; the module is only the structure around them.
///
/// # Examples
///
/// ```rust
/// use scalox::graph::{Engine, GraphError, NodeId};
/// use scalox::nn::Module;
///
/// struct Scale {
///     factor: NodeId,
/// }
///
/// impl Module for Scale {
///     fn forward(&self, graph: &mut Engine, inputs: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
///         let out = graph.mul(inputs[0], self.factor)?;
///         Ok(vec![out])
///     }
///
///     fn parameters(&self) -> Vec<NodeId> {
///         vec![self.factor]
///     }
/// }
///
/// let mut graph = Engine::new();
/// let factor = graph.scalar(2.0);
/// let layer = Scale { factor };
/// let x = graph.scalar(3.0);
/// let y = layer.forward(&mut graph, &[x]).unwrap();
/// assert_eq!(graph.value(y[0]), 6.0);
/// ```
pub trait Module {
    /// Extend the graph with this module's computation over `inputs` and
    /// return the output node ids.
    fn forward(&self, graph: &mut Engine, inputs: &[NodeId]) -> Result<Vec<NodeId>, GraphError>;

    /// All trainable parameter leaves of this module, submodules included.
    fn parameters(&self) -> Vec<NodeId>;

    /// Number of scalar parameters in this module.
    fn num_parameters(&self) -> usize {
        self.parameters().len()
    }

    /// Reset the gradient accumulator of every parameter to 0.
    ///
    /// Backward passes accumulate, so this must run between independent
    /// passes over the same parameters (typically once per training step).
    fn zero_grad(&self, graph: &mut Engine) {
        for param in self.parameters() {
            graph.clear_gradient(param);
        }
    }
}
