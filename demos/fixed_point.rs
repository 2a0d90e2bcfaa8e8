use mlp_engine::dump::{REGRESSION_INPUT, regression_network};

fn main() -> mlp_engine::Result<()> {
    // The [2, 2, 1] network behind the golden regression fixtures.
    let net = regression_network()?;
    print!("{}", net.describe());

    let (output, activations, nets) = net.forward(&REGRESSION_INPUT)?.into_parts();
    for (i, (a, n)) in activations.iter().zip(&nets).enumerate() {
        println!("layer {i}: net={n:?} activation={a:?}");
    }
    println!("output={output:?}");
    Ok(())
}
