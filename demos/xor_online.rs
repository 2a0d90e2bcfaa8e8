use mlp_engine::{Activation, Network, TrainConfig, XorConfig, generate_xor};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() -> mlp_engine::Result<()> {
    let mut rng = StdRng::seed_from_u64(0);

    // 2 -> 4 -> 1 sigmoid network on noisy XOR corners.
    let mut net = Network::new_with_rng(&[2, 4, 1], Activation::Sigmoid, 1.0, &mut rng)?;
    let data = generate_xor(
        &XorConfig {
            size: 200,
            std_dev: 0.1,
        },
        &mut rng,
    )?;
    let (train, test) = data.split(80)?;

    let fit = net.fit_online(
        &train,
        &TrainConfig {
            passes: 50_000,
            learning_rate: 0.5,
        },
        &mut rng,
    )?;
    let eval = net.evaluate(&test)?;

    println!("{net}");
    println!(
        "final_train_loss={:.5} test_error_rate={:.3}",
        fit.final_loss, eval.error_rate
    );
    Ok(())
}
