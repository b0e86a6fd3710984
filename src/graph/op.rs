// op.rs
// Operation rules for the scalar computational graph. Every node carries one
// of these tags; a single dispatch implements all forward and backward rules
// instead of per-node boxed closures.
use super::error::GraphError;

/// The operation that produced a node.
///
/// `Leaf` marks input/parameter nodes with no operands. `Pow` stores its
/// exponent inline: exponents are non-differentiated constants, never graph
/// nodes, so the backward rule can assume a fixed `k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Leaf,
    Add,
    Mul,
    Div,
    Pow { exponent: f64 },
    Relu,
}

impl Op {
    /// Number of operands this operation expects.
    pub fn num_inputs(&self) -> usize {
        match self {
            Op::Leaf => 0,
            Op::Add | Op::Mul | Op::Div => 2,
            Op::Pow { .. } | Op::Relu => 1,
        }
    }

    /// Forward rule: compute the output value from the operand values.
    ///
    /// Domain violations (zero divisor, negative base with fractional
    /// exponent) fail here, at forward time, never in the backward pass.
    pub fn compute(&self, inputs: &[f64]) -> Result<f64, GraphError> {
        debug_assert_eq!(inputs.len(), self.num_inputs());
        match *self {
            Op::Leaf => panic!("leaf nodes have no forward rule"),
            Op::Add => Ok(inputs[0] + inputs[1]),
            Op::Mul => Ok(inputs[0] * inputs[1]),
            Op::Div => {
                if inputs[1] == 0.0 {
                    return Err(GraphError::DivisionByZero);
                }
                Ok(inputs[0] / inputs[1])
            }
            Op::Pow { exponent } => {
                if inputs[0] < 0.0 && exponent.fract() != 0.0 {
                    return Err(GraphError::PowDomain {
                        base: inputs[0],
                        exponent,
                    });
                }
                Ok(inputs[0].powf(exponent))
            }
            Op::Relu => Ok(inputs[0].max(0.0)),
        }
    }

    /// Backward rule: the contribution to each operand's gradient, given the
    /// output's gradient. The engine accumulates these with `+=`, so a node
    /// consumed by several downstream nodes sums every contribution.
    pub fn gradient(&self, grad_output: f64, inputs: &[f64]) -> Vec<f64> {
        debug_assert_eq!(inputs.len(), self.num_inputs());
        match *self {
            // Leaves absorb gradient; nothing flows further back.
            Op::Leaf => Vec::new(),
            // d(a+b)/da = 1, d(a+b)/db = 1
            Op::Add => vec![grad_output, grad_output],
            // d(a*b)/da = b, d(a*b)/db = a
            Op::Mul => vec![inputs[1] * grad_output, inputs[0] * grad_output],
            // d(a/b)/da = 1/b, d(a/b)/db = -a/b^2
            Op::Div => vec![
                grad_output / inputs[1],
                -inputs[0] / (inputs[1] * inputs[1]) * grad_output,
            ],
            // d(a^k)/da = k * a^(k-1)
            Op::Pow { exponent } => {
                vec![exponent * inputs[0].powf(exponent - 1.0) * grad_output]
            }
            // d(relu(a))/da = 1 if a > 0 else 0; the sub-gradient at
            // exactly 0 is 0.
            Op::Relu => vec![if inputs[0] > 0.0 { grad_output } else { 0.0 }],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Op::Leaf)
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Op::Leaf => Ok(()),
            Op::Add => write!(f, "+"),
            Op::Mul => write!(f, "*"),
            Op::Div => write!(f, "/"),
            Op::Pow { exponent } => write!(f, "**{}", exponent),
            Op::Relu => write!(f, "ReLU"),
        }
    }
}
