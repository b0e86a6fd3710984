use std::collections::HashMap;

use log::debug;

use crate::graph::{Engine, GraphError, NodeId};

/// Interface for gradient-based parameter update strategies.
pub trait Optimizer {
    /// Apply one update to every registered parameter, reading the
    /// gradients accumulated by the last backward pass.
    fn step(&mut self, graph: &mut Engine) -> Result<(), GraphError>;

    /// Reset the gradient accumulators of the registered parameters.
    fn reset_grad(&mut self, graph: &mut Engine);

    fn get_lr(&self) -> f64;

    fn set_lr(&mut self, lr: f64);
}

/// Stochastic gradient descent with optional momentum.
///
/// With momentum 0 the update is the plain `value -= lr * grad`; otherwise a
/// velocity buffer per parameter smooths successive gradients.
pub struct SGD {
    lr: f64,
    momentum: f64,
    params: Vec<NodeId>,
    velocity: HashMap<NodeId, f64>,
}

impl SGD {
    pub fn new(params: Vec<NodeId>, lr: f64, momentum: f64) -> Self {
        Self {
            lr,
            momentum,
            params,
            velocity: HashMap::new(),
        }
    }

    pub fn with_defaults(params: Vec<NodeId>, lr: f64) -> Self {
        Self::new(params, lr, 0.0)
    }

    pub fn num_params(&self) -> usize {
        self.params.len()
    }
}

impl Optimizer for SGD {
    fn step(&mut self, graph: &mut Engine) -> Result<(), GraphError> {
        debug!(
            "SGD step over {} parameters (lr {}, momentum {})",
            self.params.len(),
            self.lr,
            self.momentum
        );

        for &param in &self.params {
            let grad = graph.grad(param);

            let update = if self.momentum == 0.0 {
                grad
            } else {
                let velocity = self.velocity.entry(param).or_insert(0.0);
                *velocity = self.momentum * *velocity + grad;
                *velocity
            };

            let value = graph.value(param) - self.lr * update;
            graph.update_parameter(param, value)?;
        }

        Ok(())
    }

    fn reset_grad(&mut self, graph: &mut Engine) {
        for &param in &self.params {
            graph.clear_gradient(param);
        }
    }

    fn get_lr(&self) -> f64 {
        self.lr
    }

    fn set_lr(&mut self, lr: f64) {
        self.lr = lr;
    }
}
