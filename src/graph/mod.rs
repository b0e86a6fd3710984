pub mod engine;
pub mod error;
pub mod node;
pub mod op;
pub mod plot;

pub use engine::Engine;
pub use error::GraphError;
pub use node::{Node, NodeId};
pub use op::Op;
pub use plot::{EngineVisualization, GraphVisualizer, VisualizationConfig};
