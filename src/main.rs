//! `mlp-experiment`: classification experiments driving the MLP engine.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mlp_engine::dump::regression_fixtures;
use mlp_engine::{Activation, Network, TrainConfig, XorConfig, generate_xor};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "mlp-experiment")]
#[command(version, about = "Classification experiments driving a multilayer perceptron")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Width of every layer, input first and output last
    #[arg(long, value_delimiter = ',', default_value = "2,2,1", global = true)]
    mlp_dimensions: Vec<usize>,

    /// Activation function for every neuron: sigmoid, relu or unitstep
    #[arg(long, default_value = "sigmoid", global = true)]
    act_function: Activation,

    /// Variance of the normally distributed initial weights
    #[arg(long, default_value_t = 1.0, global = true)]
    weight_variance: f64,

    /// Learning rate for backpropagation
    #[arg(long, default_value_t = 0.05, global = true)]
    learning_rate: f64,

    /// Seed for weight init, data generation and sampling (random if omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: Level,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train on noisy 2-D XOR points and report the test error rate
    Xor {
        /// Number of single-example training updates
        passes: usize,

        /// Number of data points to generate
        #[arg(long, default_value_t = 80)]
        data_size: usize,

        /// Percentage of the data used for training, the rest is for testing
        #[arg(long, default_value_t = 90)]
        train_percentage: u8,

        /// Standard deviation of the noise added to the XOR corners
        #[arg(long, default_value_t = 0.1)]
        std_deviation: f64,
    },

    /// Regenerate the golden activation/net fixtures
    Fixture {
        /// Directory receiving act_data.b64 and net_act_data.b64
        #[arg(long, default_value = "testdata")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("installing log subscriber")?;

    match &cli.command {
        Commands::Xor {
            passes,
            data_size,
            train_percentage,
            std_deviation,
        } => run_xor(&cli, *passes, *data_size, *train_percentage, *std_deviation),
        Commands::Fixture { out_dir } => write_fixtures(out_dir),
    }
}

fn run_xor(
    cli: &Cli,
    passes: usize,
    data_size: usize,
    train_percentage: u8,
    std_deviation: f64,
) -> Result<()> {
    let train_cfg = TrainConfig {
        passes,
        learning_rate: cli.learning_rate,
    };
    train_cfg.validate()?;
    let xor_cfg = XorConfig {
        size: data_size,
        std_dev: std_deviation,
    };
    xor_cfg.validate()?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut network = Network::new_with_rng(
        &cli.mlp_dimensions,
        cli.act_function,
        cli.weight_variance,
        &mut rng,
    )
    .context("couldn't instantiate an MLP")?;
    print!("{network}");

    info!(size = data_size, std_deviation, "generating XOR data");
    let data = generate_xor(&xor_cfg, &mut rng)?;
    let (train, test) = data.split(train_percentage)?;
    if train.is_empty() || test.is_empty() {
        bail!(
            "a {train_percentage}% split of {data_size} points leaves {} training and {} testing points; both must be non-empty",
            train.len(),
            test.len()
        );
    }

    network
        .fit_online(&train, &train_cfg, &mut rng)
        .context("training the MLP")?;
    let report = network.evaluate(&test).context("testing the MLP")?;

    let rule = "+ ------------------------------------------- +";
    println!("\nTESTING RESULTS:\n\t{rule}");
    for (idx, (input, target)) in test.iter().enumerate() {
        println!(
            "\t| Output for [{:6.3}; {:6.3}]: {:6.3} [{}] [{}] |",
            input[0], input[1], report.outputs[idx], report.predictions[idx], target[0]
        );
    }
    println!(
        "\t{rule}\n\t|       TESTING ERROR RATE -> {:2.5}         |\n\t{rule}",
        report.error_rate
    );
    Ok(())
}

fn write_fixtures(out_dir: &Path) -> Result<()> {
    let (acts, nets) = regression_fixtures()?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    for (name, contents) in [("act_data.b64", acts), ("net_act_data.b64", nets)] {
        let path = out_dir.join(name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote fixture");
    }
    Ok(())
}
