use std::collections::HashSet;
use std::fmt::Write;
use std::fs::File;
use std::io::Write as IoWrite;
use std::process::{Command, Stdio};

use super::engine::Engine;
use super::node::{Node, NodeId};

/// Renders a computational graph through Graphviz.
///
/// A strictly read-only consumer of the engine: it looks at values,
/// gradients, operation tags and operand edges, and never mutates them.
pub struct GraphVisualizer {
    pub config: VisualizationConfig,
}

/// Configuration for graph visualization
#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub show_values: bool,
    pub show_gradients: bool,
    /// Decimal places in value/gradient labels.
    pub precision: usize,
    pub leaf_color: String,
    pub op_color: String,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            show_values: true,
            show_gradients: true,
            precision: 4,
            leaf_color: "#E3F2FD".to_string(),
            op_color: "#FFF3E0".to_string(),
        }
    }
}

impl Default for GraphVisualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphVisualizer {
    pub fn new() -> Self {
        Self {
            config: VisualizationConfig::default(),
        }
    }

    pub fn with_config(config: VisualizationConfig) -> Self {
        Self { config }
    }

    /// Every node reachable from `output_nodes`, in topological order, each
    /// exactly once even when the outputs share subgraphs.
    fn reachable(&self, engine: &Engine, output_nodes: &[NodeId]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        for &output in output_nodes {
            for id in engine.find_topo_sort(output) {
                if seen.insert(id) {
                    order.push(id);
                }
            }
        }
        order
    }

    /// Generate the DOT representation of the graph feeding `output_nodes`.
    ///
    /// Each node becomes a record of its value and gradient. Each derived
    /// node also gets a small node carrying its operation tag, wired between
    /// the operands and their result, so the rendered picture shows where
    /// every value came from.
    pub fn to_dot(&self, engine: &Engine, output_nodes: &[NodeId]) -> String {
        let mut dot = String::new();
        writeln!(dot, "digraph ComputationalGraph {{").unwrap();
        writeln!(dot, "    rankdir=LR;").unwrap();
        writeln!(dot, "    edge [color=gray];").unwrap();

        for id in self.reachable(engine, output_nodes) {
            let Some(node) = engine.get_node(id) else {
                continue;
            };

            writeln!(
                dot,
                "    n{} [label=\"{}\", shape=record, style=filled, fillcolor=\"{}\"];",
                id.0,
                self.record_label(node),
                self.fill_color(node),
            )
            .unwrap();

            if !node.is_leaf() {
                writeln!(dot, "    n{}op [label=\"{}\"];", id.0, node.op).unwrap();
                writeln!(dot, "    n{}op -> n{};", id.0, id.0).unwrap();
                for input in &node.inputs {
                    writeln!(dot, "    n{} -> n{}op;", input.0, id.0).unwrap();
                }
            }
        }

        writeln!(dot, "}}").unwrap();
        dot
    }

    /// The `{ value … | grad … }` record body for one node.
    fn record_label(&self, node: &Node) -> String {
        let mut fields = Vec::new();

        if self.config.show_values {
            fields.push(format!(
                "value {:.prec$}",
                node.value,
                prec = self.config.precision
            ));
        }
        if self.config.show_gradients {
            fields.push(format!(
                "grad {:.prec$}",
                node.grad,
                prec = self.config.precision
            ));
        }
        if fields.is_empty() {
            fields.push(format!("n{}", node.id.0));
        }

        format!("{{ {} }}", fields.join(" | "))
    }

    fn fill_color(&self, node: &Node) -> &str {
        if node.is_leaf() {
            &self.config.leaf_color
        } else {
            &self.config.op_color
        }
    }

    /// Save the graph as a DOT file
    pub fn save_dot(
        &self,
        engine: &Engine,
        output_nodes: &[NodeId],
        filename: &str,
    ) -> Result<(), std::io::Error> {
        let dot_content = self.to_dot(engine, output_nodes);
        let mut file = File::create(filename)?;
        file.write_all(dot_content.as_bytes())?;
        Ok(())
    }

    /// Render the graph to an image through the `dot` binary (requires
    /// Graphviz on the PATH). The DOT text is piped over stdin, so nothing
    /// but the image itself touches the filesystem.
    pub fn save_image(
        &self,
        engine: &Engine,
        output_nodes: &[NodeId],
        filename: &str,
        format: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dot_content = self.to_dot(engine, output_nodes);

        let mut child = Command::new("dot")
            .arg(format!("-T{}", format))
            .arg("-o")
            .arg(filename)
            .stdin(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(dot_content.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(format!(
                "Graphviz failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )
            .into());
        }

        Ok(())
    }

    /// Print the graph to the console, one line per node in topological
    /// order.
    pub fn print_graph(&self, engine: &Engine, output_nodes: &[NodeId]) {
        println!("Computational Graph:");
        println!("===================");

        for id in self.reachable(engine, output_nodes) {
            let Some(node) = engine.get_node(id) else {
                continue;
            };

            let mut line = format!("Node {}: ", id.0);

            if node.is_leaf() {
                line.push_str("leaf");
            } else {
                write!(line, "{}", node.op).unwrap();
            }

            if self.config.show_values {
                write!(
                    line,
                    " value {:.prec$}",
                    node.value,
                    prec = self.config.precision
                )
                .unwrap();
            }
            if self.config.show_gradients {
                write!(
                    line,
                    " grad {:.prec$}",
                    node.grad,
                    prec = self.config.precision
                )
                .unwrap();
            }

            if !node.inputs.is_empty() {
                let operands: Vec<usize> = node.inputs.iter().map(|i| i.0).collect();
                write!(line, " <- {:?}", operands).unwrap();
            }

            println!("{}", line);
        }
    }
}

// Extension trait to add visualization methods directly to Engine
pub trait EngineVisualization {
    fn visualize(&self) -> GraphVisualizer;
    fn plot_graph(&self, output_nodes: &[NodeId]);
    fn save_graph_image(
        &self,
        output_nodes: &[NodeId],
        filename: &str,
    ) -> Result<(), Box<dyn std::error::Error>>;
    fn save_graph_dot(&self, output_nodes: &[NodeId], filename: &str)
    -> Result<(), std::io::Error>;
}

impl EngineVisualization for Engine {
    fn visualize(&self) -> GraphVisualizer {
        GraphVisualizer::new()
    }

    fn plot_graph(&self, output_nodes: &[NodeId]) {
        GraphVisualizer::new().print_graph(self, output_nodes);
    }

    fn save_graph_image(
        &self,
        output_nodes: &[NodeId],
        filename: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        GraphVisualizer::new().save_image(self, output_nodes, filename, "png")
    }

    fn save_graph_dot(
        &self,
        output_nodes: &[NodeId],
        filename: &str,
    ) -> Result<(), std::io::Error> {
        GraphVisualizer::new().save_dot(self, output_nodes, filename)
    }
}
