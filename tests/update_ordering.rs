//! Backpropagation must push error through a layer's weights before it updates
//! them. These tests replay one adapt step by hand on the `[2, 2, 1]` network.

use approx::assert_abs_diff_eq;
use mlp_engine::dump::regression_network;
use mlp_engine::{Activation, Network};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Augmented layer-0 weights after one step, with the hidden deltas
/// propagated through `w1` (the output layer's `[w, w, bias]` row).
fn expected_hidden(input: [f64; 2], target: f64, lr: f64, w1: [f64; 3]) -> [f64; 6] {
    let w0 = [6.0, 0.0, -2.0, 2.0, -2.0, 0.0];
    let h = [
        sigmoid(w0[0] * input[0] + w0[1] * input[1] + w0[2]),
        sigmoid(w0[3] * input[0] + w0[4] * input[1] + w0[5]),
    ];
    let out = sigmoid(-4.0 * h[0] + 2.0 * h[1] + 2.0);
    let delta_out = (out - target) * out * (1.0 - out);

    let mut next = w0;
    for j in 0..2 {
        let delta_h = w1[j] * delta_out * h[j] * (1.0 - h[j]);
        next[3 * j] -= lr * delta_h * input[0];
        next[3 * j + 1] -= lr * delta_h * input[1];
        next[3 * j + 2] -= lr * delta_h;
    }
    next
}

fn expected_output_layer(input: [f64; 2], target: f64, lr: f64) -> [f64; 3] {
    let h = [
        sigmoid(6.0 * input[0] - 2.0),
        sigmoid(2.0 * input[0] - 2.0 * input[1]),
    ];
    let out = sigmoid(-4.0 * h[0] + 2.0 * h[1] + 2.0);
    let delta_out = (out - target) * out * (1.0 - out);
    [
        -4.0 - lr * delta_out * h[0],
        2.0 - lr * delta_out * h[1],
        2.0 - lr * delta_out,
    ]
}

#[test]
fn hidden_layer_update_uses_pre_update_output_weights() {
    let (input, target, lr) = ([1.0, 0.0], 1.0, 0.5);
    let mut network = regression_network().unwrap();
    network.adapt(&input, &[target], lr).unwrap();

    let out_layer = network.layer(1).unwrap().augmented();
    for (got, want) in out_layer.iter().zip(expected_output_layer(input, target, lr)) {
        assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
    }

    let hidden = network.layer(0).unwrap().augmented();
    let with_old = expected_hidden(input, target, lr, [-4.0, 2.0, 2.0]);
    for (got, want) in hidden.iter().zip(with_old) {
        assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
    }

    // Propagating through the already-updated output weights gives a
    // measurably different hidden layer.
    let updated = expected_output_layer(input, target, lr);
    let with_new = expected_hidden(input, target, lr, updated);
    let gap: f64 = with_old
        .iter()
        .zip(with_new)
        .map(|(a, b)| (a - b).abs())
        .sum();
    assert!(gap > 1e-6, "test input does not distinguish update orders: {gap}");
}

#[test]
fn adapt_moves_output_towards_target() {
    let mut network = regression_network().unwrap();
    let before = network.forward(&[1.0, 0.0]).unwrap().output()[0];
    for _ in 0..50 {
        network.adapt(&[1.0, 0.0], &[1.0], 0.5).unwrap();
    }
    let after = network.forward(&[1.0, 0.0]).unwrap().output()[0];
    assert!(after > before, "{after} <= {before}");
}

#[test]
fn deep_network_layers_all_move() {
    let mut network = Network::new_with_seed(&[3, 4, 4, 2], Activation::Sigmoid, 1.0, 21).unwrap();
    let before = network.clone();
    network.adapt(&[0.5, -0.5, 1.0], &[1.0, 0.0], 0.2).unwrap();
    for (old, new) in before.layers().iter().zip(network.layers()) {
        assert_ne!(old, new);
    }
}
