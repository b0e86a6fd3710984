// Scalar neural network layers built on the computational graph engine.
// Each construct registers its parameters as leaf nodes in the engine and
// extends the graph node by node during the forward pass.

use crate::graph::{Engine, GraphError, NodeId};
use crate::initializers;
use crate::nn::module::Module;

/// A single neuron: `activation = nonlin(sum_i(w_i * x_i) + b)`.
///
/// Weights default to U(-1, 1) and the bias to 0. The optional ReLU is
/// controlled by `nonlin`; output layers usually disable it.
#[derive(Debug)]
pub struct Neuron {
    weights: Vec<NodeId>,
    bias: NodeId,
    nonlin: bool,
}

impl Neuron {
    pub fn new(graph: &mut Engine, n_in: usize, nonlin: bool) -> Self {
        Self::with_init(graph, n_in, nonlin, initializers::symmetric_uniform(1.0))
    }

    /// Create a neuron drawing each weight from `init`. The bias starts at 0.
    pub fn with_init<F>(graph: &mut Engine, n_in: usize, nonlin: bool, mut init: F) -> Self
    where
        F: FnMut() -> f64,
    {
        let weights = (0..n_in).map(|_| graph.scalar(init())).collect();
        let bias = graph.scalar(0.0);

        Self {
            weights,
            bias,
            nonlin,
        }
    }

    /// Create a neuron with fixed weights and bias. Useful for tests and for
    /// loading trained values.
    pub fn from_weights(graph: &mut Engine, weights: &[f64], bias: f64, nonlin: bool) -> Self {
        Self {
            weights: weights.iter().map(|&w| graph.scalar(w)).collect(),
            bias: graph.scalar(bias),
            nonlin,
        }
    }

    pub fn n_in(&self) -> usize {
        self.weights.len()
    }

    /// Forward pass producing the single activation node.
    pub fn activate(&self, graph: &mut Engine, inputs: &[NodeId]) -> Result<NodeId, GraphError> {
        assert_eq!(
            inputs.len(),
            self.weights.len(),
            "neuron expects {} inputs, got {}",
            self.weights.len(),
            inputs.len()
        );

        let mut act = self.bias;
        for (&w, &x) in self.weights.iter().zip(inputs) {
            let term = graph.mul(w, x)?;
            act = graph.add(act, term)?;
        }

        if self.nonlin { graph.relu(act) } else { Ok(act) }
    }
}

impl Module for Neuron {
    fn forward(&self, graph: &mut Engine, inputs: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        Ok(vec![self.activate(graph, inputs)?])
    }

    fn parameters(&self) -> Vec<NodeId> {
        let mut params = self.weights.clone();
        params.push(self.bias);
        params
    }
}

/// A fully connected layer of [`Neuron`]s sharing the same inputs.
#[derive(Debug)]
pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    pub fn new(graph: &mut Engine, n_in: usize, n_out: usize, nonlin: bool) -> Self {
        Self {
            neurons: (0..n_out).map(|_| Neuron::new(graph, n_in, nonlin)).collect(),
        }
    }

    pub fn with_init<F>(
        graph: &mut Engine,
        n_in: usize,
        n_out: usize,
        nonlin: bool,
        mut init: F,
    ) -> Self
    where
        F: FnMut() -> f64,
    {
        Self {
            neurons: (0..n_out)
                .map(|_| Neuron::with_init(graph, n_in, nonlin, &mut init))
                .collect(),
        }
    }

    pub fn n_out(&self) -> usize {
        self.neurons.len()
    }
}

impl Module for Layer {
    fn forward(&self, graph: &mut Engine, inputs: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        self.neurons
            .iter()
            .map(|n| n.activate(graph, inputs))
            .collect()
    }

    fn parameters(&self) -> Vec<NodeId> {
        self.neurons.iter().flat_map(|n| n.parameters()).collect()
    }
}

/// A multilayer perceptron: a chain of fully connected layers.
///
/// Hidden layers apply ReLU; the output layer is linear, the usual choice
/// when a loss is attached downstream.
#[derive(Debug)]
pub struct MLP {
    layers: Vec<Layer>,
}

impl MLP {
    pub fn new(graph: &mut Engine, n_in: usize, n_outs: &[usize]) -> Self {
        let mut sizes = vec![n_in];
        sizes.extend_from_slice(n_outs);

        let layers = (0..sizes.len() - 1)
            .map(|i| {
                let nonlin = i != sizes.len() - 2;
                Layer::new(graph, sizes[i], sizes[i + 1], nonlin)
            })
            .collect();

        Self { layers }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }
}

impl Module for MLP {
    fn forward(&self, graph: &mut Engine, inputs: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let mut current = inputs.to_vec();
        for layer in &self.layers {
            current = layer.forward(graph, &current)?;
        }
        Ok(current)
    }

    fn parameters(&self) -> Vec<NodeId> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }
}
