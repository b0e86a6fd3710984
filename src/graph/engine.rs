use std::collections::HashSet;

use log::debug;

use super::error::GraphError;
use super::node::{Node, NodeId};
use super::op::Op;

/// Main computational graph engine.
///
/// The engine owns every node of one graph in an arena; a [`NodeId`] is an
/// index into it. Forward evaluation is eager: each operation method computes
/// its output immediately and appends a node recording the operand edges and
/// the operation tag, which is all the backward pass needs. One engine is one
/// graph with one logical owner; `&mut self` on construction and on
/// `backward` serializes everything without locks.
#[derive(Debug, Default)]
pub struct Engine {
    nodes: Vec<Node>,
}

impl Engine {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Pre-size the arena when the rough graph size is known up front.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Creates a new leaf node holding an input or parameter value.
    pub fn scalar(&mut self, value: f64) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new_leaf(id, value));
        id
    }

    fn validate_inputs(&self, input_ids: &[NodeId]) -> Result<(), GraphError> {
        for &input_id in input_ids {
            if input_id.0 >= self.nodes.len() {
                return Err(GraphError::NodeNotFound(input_id));
            }
        }
        Ok(())
    }

    /// Evaluate `op` over the operand nodes and append the result node.
    /// On error nothing is appended and the graph is left untouched.
    fn apply_op(&mut self, op: Op, input_ids: Vec<NodeId>) -> Result<NodeId, GraphError> {
        self.validate_inputs(&input_ids)?;
        debug_assert_eq!(input_ids.len(), op.num_inputs());

        let operands: Vec<f64> = input_ids.iter().map(|&i| self.nodes[i.0].value).collect();
        let value = op.compute(&operands)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::from_op(id, op, input_ids, value));
        Ok(id)
    }

    pub fn add(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.apply_op(Op::Add, vec![a, b])
    }

    pub fn mul(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.apply_op(Op::Mul, vec![a, b])
    }

    /// Division `a / b`. Fails with [`GraphError::DivisionByZero`] at forward
    /// time when `b`'s value is exactly 0; nothing is deferred to backward.
    pub fn div(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.apply_op(Op::Div, vec![a, b])
    }

    /// Power `a ^ exponent` with a constant exponent.
    ///
    /// The exponent is a plain number, never a graph node: the backward rule
    /// `k * a^(k-1)` assumes a fixed `k`. A NaN or infinite exponent fails
    /// with [`GraphError::InvalidExponent`]; a negative base with a
    /// non-integer exponent fails with [`GraphError::PowDomain`].
    pub fn pow(&mut self, a: NodeId, exponent: f64) -> Result<NodeId, GraphError> {
        if !exponent.is_finite() {
            return Err(GraphError::InvalidExponent(exponent));
        }
        self.apply_op(Op::Pow { exponent }, vec![a])
    }

    /// Negation, built as multiplication by a lifted `-1` leaf.
    pub fn neg(&mut self, a: NodeId) -> Result<NodeId, GraphError> {
        let minus_one = self.scalar(-1.0);
        self.mul(a, minus_one)
    }

    /// Subtraction, built as `a + (-b)`.
    pub fn sub(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        let neg_b = self.neg(b)?;
        self.add(a, neg_b)
    }

    /// ReLU activation `max(a, 0)`. Its derivative at exactly 0 is 0.
    pub fn relu(&mut self, a: NodeId) -> Result<NodeId, GraphError> {
        self.apply_op(Op::Relu, vec![a])
    }

    // Literal convenience: each lifts the literal into a leaf node and
    // delegates, so `node op literal` builds exactly the graph that
    // `node op node` would. Non-commutative ops get both operand orders.

    pub fn add_scalar(&mut self, a: NodeId, literal: f64) -> Result<NodeId, GraphError> {
        let lit = self.scalar(literal);
        self.add(a, lit)
    }

    pub fn mul_scalar(&mut self, a: NodeId, literal: f64) -> Result<NodeId, GraphError> {
        let lit = self.scalar(literal);
        self.mul(a, lit)
    }

    /// `a - literal`.
    pub fn sub_scalar(&mut self, a: NodeId, literal: f64) -> Result<NodeId, GraphError> {
        let lit = self.scalar(literal);
        self.sub(a, lit)
    }

    /// `literal - a`.
    pub fn scalar_sub(&mut self, literal: f64, a: NodeId) -> Result<NodeId, GraphError> {
        let lit = self.scalar(literal);
        self.sub(lit, a)
    }

    /// `a / literal`.
    pub fn div_scalar(&mut self, a: NodeId, literal: f64) -> Result<NodeId, GraphError> {
        let lit = self.scalar(literal);
        self.div(a, lit)
    }

    /// `literal / a`.
    pub fn scalar_div(&mut self, literal: f64, a: NodeId) -> Result<NodeId, GraphError> {
        let lit = self.scalar(literal);
        self.div(lit, a)
    }

    /// Forward-computed value of a node.
    pub fn value(&self, id: NodeId) -> f64 {
        self.nodes[id.0].value
    }

    /// Current gradient accumulator of a node. Zero until a backward pass
    /// from some root reaches it.
    pub fn grad(&self, id: NodeId) -> f64 {
        self.nodes[id.0].grad
    }

    /// Whether a node is a leaf (no operands). Parameter collection uses
    /// this to tell trainable leaves from derived intermediates.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_leaf()
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Overwrite a node's value in place. This is the optimizer's update
    /// hook; graph construction itself never mutates values.
    pub fn update_parameter(&mut self, id: NodeId, value: f64) -> Result<(), GraphError> {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.value = value;
                Ok(())
            }
            None => Err(GraphError::NodeNotFound(id)),
        }
    }

    /// Reset a single node's gradient accumulator to 0.
    pub fn clear_gradient(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.grad = 0.0;
        }
    }

    /// Reset every gradient accumulator in the graph to 0.
    ///
    /// Backward passes accumulate: running two passes over overlapping nodes
    /// without zeroing in between yields the sum of both. Call this between
    /// independent passes (an optimizer typically zeroes only its parameters
    /// via [`Engine::clear_gradient`] instead).
    pub fn zero_gradients(&mut self) {
        for node in &mut self.nodes {
            node.grad = 0.0;
        }
    }

    /// Topological order of every node reachable from `root`: each node
    /// appears exactly once, strictly after all of its operands.
    pub fn find_topo_sort(&self, root: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut topo_order = Vec::new();
        if root.0 < self.nodes.len() {
            self.topo_visit(root, &mut visited, &mut topo_order);
        }
        topo_order
    }

    fn topo_visit(&self, id: NodeId, visited: &mut HashSet<NodeId>, topo_order: &mut Vec<NodeId>) {
        if visited.contains(&id) {
            return;
        }
        // Mark before recursing so diamond-shaped sharing is walked once.
        visited.insert(id);

        for &input_id in &self.nodes[id.0].inputs {
            self.topo_visit(input_id, visited, topo_order);
        }

        // Post-order append: a node lands after everything it depends on.
        topo_order.push(id);
    }

    /// Reverse pass: computes d(root)/d(node) for every node reachable from
    /// `root`.
    ///
    /// Seeds the root's gradient with 1.0, then walks the topological order
    /// in strict reverse, letting each node's backward rule add its weighted
    /// share into the operand accumulators. A node consumed along several
    /// paths ends up with the sum over all of them (chain rule with fan-out
    /// summation). Contributions from earlier passes are kept, not reset;
    /// see [`Engine::zero_gradients`].
    pub fn backward(&mut self, root: NodeId) -> Result<(), GraphError> {
        if root.0 >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(root));
        }

        let topo_order = self.find_topo_sort(root);
        debug!(
            "backward pass from {} over {} reachable nodes",
            root,
            topo_order.len()
        );

        // Seed: the derivative of the root with respect to itself.
        self.nodes[root.0].grad = 1.0;

        for &node_id in topo_order.iter().rev() {
            self.backward_node(node_id);
        }

        Ok(())
    }

    /// Backward for a single node: distribute its gradient to its operands.
    fn backward_node(&mut self, node_id: NodeId) {
        let (op, input_ids, grad_output) = {
            let node = &self.nodes[node_id.0];
            if node.inputs.is_empty() {
                // Leaf nodes: the gradient stops here.
                return;
            }
            (node.op, node.inputs.clone(), node.grad)
        };

        let operands: Vec<f64> = input_ids.iter().map(|&i| self.nodes[i.0].value).collect();
        let contributions = op.gradient(grad_output, &operands);

        for (&input_id, contribution) in input_ids.iter().zip(contributions) {
            self.nodes[input_id.0].grad += contribution;
        }
    }
}
