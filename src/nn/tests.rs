#[cfg(test)]
mod tests {

    use crate::graph::Engine;
    use crate::nn::{Layer, MLP, Module, Neuron, Optimizer, SGD};

    /// Helper function to check if two floating point values are approximately equal
    fn approx_equal(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_neuron_forward_linear() {
        let mut graph = Engine::new();

        let neuron = Neuron::from_weights(&mut graph, &[2.0, -1.0], 0.5, false);

        let x1 = graph.scalar(3.0);
        let x2 = graph.scalar(4.0);
        let out = neuron.activate(&mut graph, &[x1, x2]).unwrap();

        // 0.5 + 2*3 + (-1)*4 = 2.5
        assert_eq!(graph.value(out), 2.5);
    }

    #[test]
    fn test_neuron_forward_relu() {
        let mut graph = Engine::new();

        let neuron = Neuron::from_weights(&mut graph, &[1.0], 0.0, true);

        let x = graph.scalar(-3.0);
        let out = neuron.activate(&mut graph, &[x]).unwrap();

        assert_eq!(graph.value(out), 0.0);

        graph.backward(out).unwrap();
        // The ReLU is inactive, so nothing flows back to the weight.
        assert_eq!(graph.grad(neuron.parameters()[0]), 0.0);
    }

    #[test]
    fn test_neuron_default_init() {
        let mut graph = Engine::new();

        let neuron = Neuron::new(&mut graph, 8, true);
        let params = neuron.parameters();

        assert_eq!(params.len(), 9);
        // Weights are drawn from U(-1, 1); the bias starts at 0.
        for &w in &params[..8] {
            assert!(graph.value(w) > -1.0 && graph.value(w) < 1.0);
        }
        assert_eq!(graph.value(params[8]), 0.0);
    }

    #[test]
    #[should_panic(expected = "neuron expects 2 inputs")]
    fn test_neuron_input_arity_mismatch() {
        let mut graph = Engine::new();

        let neuron = Neuron::from_weights(&mut graph, &[1.0, 1.0], 0.0, false);
        let x = graph.scalar(1.0);
        let _ = neuron.activate(&mut graph, &[x]);
    }

    #[test]
    fn test_layer_output_count() {
        let mut graph = Engine::new();

        let layer = Layer::new(&mut graph, 3, 4, true);
        assert_eq!(layer.n_out(), 4);

        let inputs: Vec<_> = (0..3).map(|i| graph.scalar(i as f64)).collect();
        let outputs = layer.forward(&mut graph, &inputs).unwrap();

        assert_eq!(outputs.len(), 4);
        // 3 weights + 1 bias per neuron
        assert_eq!(layer.num_parameters(), 16);
    }

    #[test]
    fn test_mlp_parameter_count() {
        let mut graph = Engine::new();

        let mlp = MLP::new(&mut graph, 3, &[4, 4, 1]);

        assert_eq!(mlp.num_layers(), 3);
        // (3*4 + 4) + (4*4 + 4) + (4*1 + 1) = 41
        assert_eq!(mlp.num_parameters(), 41);
    }

    #[test]
    fn test_parameters_are_leaves() {
        let mut graph = Engine::new();

        let mlp = MLP::new(&mut graph, 2, &[3, 1]);
        let x1 = graph.scalar(1.0);
        let x2 = graph.scalar(0.5);
        let out = mlp.forward(&mut graph, &[x1, x2]).unwrap();

        for param in mlp.parameters() {
            assert!(graph.is_leaf(param));
        }
        // Derived intermediates are not leaves.
        assert!(!graph.is_leaf(out[0]));
    }

    #[test]
    fn test_mlp_backward_reaches_all_parameters() {
        let mut graph = Engine::new();

        let mlp = MLP::new(&mut graph, 2, &[3, 1]);

        // Pin every parameter to 0.5 so all hidden activations stay strictly
        // positive and every path carries gradient.
        for param in mlp.parameters() {
            graph.update_parameter(param, 0.5).unwrap();
        }

        let x1 = graph.scalar(1.0);
        let x2 = graph.scalar(1.0);
        let out = mlp.forward(&mut graph, &[x1, x2]).unwrap();
        assert_eq!(out.len(), 1);

        graph.backward(out[0]).unwrap();

        for param in mlp.parameters() {
            assert!(graph.grad(param) > 0.0);
        }
    }

    #[test]
    fn test_zero_grad() {
        let mut graph = Engine::new();

        let neuron = Neuron::from_weights(&mut graph, &[1.0, 1.0], 0.0, false);
        let x1 = graph.scalar(2.0);
        let x2 = graph.scalar(3.0);
        let out = neuron.activate(&mut graph, &[x1, x2]).unwrap();

        graph.backward(out).unwrap();
        // Gradients: x1 and x2 for the weights, 1 for the bias.
        for param in neuron.parameters() {
            assert!(graph.grad(param) != 0.0);
        }

        neuron.zero_grad(&mut graph);
        for param in neuron.parameters() {
            assert_eq!(graph.grad(param), 0.0);
        }
    }

    #[test]
    fn test_sgd_step() {
        let mut graph = Engine::new();

        // loss = (w*x - y)^2 with w = 0, x = 1, y = 2
        let w = graph.scalar(0.0);
        let x = graph.scalar(1.0);
        let y = graph.scalar(2.0);

        let pred = graph.mul(w, x).unwrap();
        let err = graph.sub(pred, y).unwrap();
        let loss = graph.pow(err, 2.0).unwrap();

        assert_eq!(graph.value(loss), 4.0);

        graph.backward(loss).unwrap();
        // dloss/dw = 2 * (w*x - y) * x = -4
        assert_eq!(graph.grad(w), -4.0);

        let mut optimizer = SGD::with_defaults(vec![w], 0.1);
        optimizer.step(&mut graph).unwrap();

        assert!(approx_equal(graph.value(w), 0.4, 1e-12));
    }

    #[test]
    fn test_sgd_momentum() {
        let mut graph = Engine::new();

        let w = graph.scalar(0.0);
        let mut optimizer = SGD::new(vec![w], 0.1, 0.5);

        // First step: grad = 2*(0 - 2) = -4, velocity = -4, w -> 0.4
        let x = graph.scalar(1.0);
        let y = graph.scalar(2.0);
        let pred = graph.mul(w, x).unwrap();
        let err = graph.sub(pred, y).unwrap();
        let loss = graph.pow(err, 2.0).unwrap();
        graph.backward(loss).unwrap();
        optimizer.step(&mut graph).unwrap();
        assert!(approx_equal(graph.value(w), 0.4, 1e-12));

        // Second step on a fresh sub-graph over the same parameter:
        // grad = 2*(0.4 - 2) = -3.2, velocity = 0.5*(-4) + (-3.2) = -5.2
        optimizer.reset_grad(&mut graph);
        let pred = graph.mul(w, x).unwrap();
        let err = graph.sub(pred, y).unwrap();
        let loss = graph.pow(err, 2.0).unwrap();
        graph.backward(loss).unwrap();
        optimizer.step(&mut graph).unwrap();
        assert!(approx_equal(graph.value(w), 0.92, 1e-12));
    }

    #[test]
    fn test_sgd_lr_accessors() {
        let mut optimizer = SGD::with_defaults(vec![], 0.1);
        assert_eq!(optimizer.get_lr(), 0.1);
        optimizer.set_lr(0.01);
        assert_eq!(optimizer.get_lr(), 0.01);
    }

    #[test]
    fn test_training_loop_decreases_loss() {
        let mut graph = Engine::new();

        // Fit y = 2x with a single linear neuron starting from w = 0, b = 0.
        let neuron = Neuron::from_weights(&mut graph, &[0.0], 0.0, false);
        let mut optimizer = SGD::with_defaults(neuron.parameters(), 0.01);

        let data = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];

        let epoch_loss = |graph: &mut Engine| -> f64 {
            // Sum of squared errors over the dataset, built as a fresh
            // sub-graph against the shared parameter leaves.
            let mut total = graph.scalar(0.0);
            for &(x, y) in &data {
                let x = graph.scalar(x);
                let pred = neuron.activate(graph, &[x]).unwrap();
                let err = graph.sub_scalar(pred, y).unwrap();
                let sq = graph.pow(err, 2.0).unwrap();
                total = graph.add(total, sq).unwrap();
            }
            graph.backward(total).unwrap();
            graph.value(total)
        };

        let initial_loss = epoch_loss(&mut graph);
        optimizer.step(&mut graph).unwrap();

        let mut last_loss = initial_loss;
        for _ in 0..5 {
            optimizer.reset_grad(&mut graph);
            let loss = epoch_loss(&mut graph);
            assert!(loss < last_loss);
            last_loss = loss;
            optimizer.step(&mut graph).unwrap();
        }

        assert!(last_loss < initial_loss);
        // The weight should be heading towards 2.
        let w = neuron.parameters()[0];
        assert!((graph.value(w) - 2.0).abs() < (0.0f64 - 2.0).abs());
    }
}
