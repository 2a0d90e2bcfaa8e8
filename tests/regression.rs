use approx::assert_abs_diff_eq;
use mlp_engine::dump::{
    REGRESSION_INPUT, decode_vectors, regression_fixtures, regression_network,
};

const ACT_FIXTURE: &str = include_str!("fixtures/act_data.b64");
const NET_FIXTURE: &str = include_str!("fixtures/net_act_data.b64");

fn assert_vectors_eq(actual: &[Vec<f64>], expected: &[Vec<f64>]) {
    assert_eq!(actual.len(), expected.len(), "layer count");
    for (layer, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(a.len(), e.len(), "width of layer {layer}");
        for (x, y) in a.iter().zip(e) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }
    }
}

#[test]
fn forward_reproduces_golden_activations_and_nets() {
    let network = regression_network().unwrap();
    let record = network.forward(&REGRESSION_INPUT).unwrap();

    let expected_acts = decode_vectors(ACT_FIXTURE).unwrap();
    let expected_nets = decode_vectors(NET_FIXTURE).unwrap();

    assert_vectors_eq(record.activations(), &expected_acts);
    assert_vectors_eq(record.nets(), &expected_nets);
}

#[test]
fn regenerated_fixtures_match_checked_in_ones() {
    let (acts, nets) = regression_fixtures().unwrap();
    assert_vectors_eq(
        &decode_vectors(&acts).unwrap(),
        &decode_vectors(ACT_FIXTURE).unwrap(),
    );
    assert_vectors_eq(
        &decode_vectors(&nets).unwrap(),
        &decode_vectors(NET_FIXTURE).unwrap(),
    );
}

#[test]
fn golden_values_are_the_expected_numbers() {
    let acts = decode_vectors(ACT_FIXTURE).unwrap();
    let nets = decode_vectors(NET_FIXTURE).unwrap();

    assert_eq!(nets[0], vec![4.0, 2.0]);
    assert_abs_diff_eq!(acts[0][0], 0.982_013_790_037_908_5, epsilon = 1e-12);
    assert_abs_diff_eq!(acts[0][1], 0.880_797_077_977_882_3, epsilon = 1e-12);
    assert_abs_diff_eq!(nets[1][0], -0.166_461_004_195_869_4, epsilon = 1e-12);
    assert_abs_diff_eq!(acts[1][0], 0.458_480_577_430_902_37, epsilon = 1e-12);
}
