use super::node::NodeId;

/// Error type for graph construction and the backward pass.
///
/// All variants are raised synchronously at the offending forward operation.
/// A failed operation appends no node, so previously constructed nodes stay
/// valid and usable.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Division where the divisor's forward value is exactly 0.
    DivisionByZero,
    /// Negative base raised to a non-integer exponent. The real-valued
    /// result is undefined, so this surfaces instead of a silent NaN.
    PowDomain { base: f64, exponent: f64 },
    /// The exponent of a power operation must be a plain finite constant.
    InvalidExponent(f64),
    /// An operand id that does not belong to this engine's arena.
    NodeNotFound(NodeId),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GraphError::DivisionByZero => {
                write!(f, "division by zero: divisor evaluates to exactly 0")
            }
            GraphError::PowDomain { base, exponent } => write!(
                f,
                "power domain error: negative base {} with non-integer exponent {}",
                base, exponent
            ),
            GraphError::InvalidExponent(e) => {
                write!(f, "invalid exponent {}: must be a finite numeric constant", e)
            }
            GraphError::NodeNotFound(id) => write!(f, "node {} not found in this graph", id),
        }
    }
}

impl std::error::Error for GraphError {}
