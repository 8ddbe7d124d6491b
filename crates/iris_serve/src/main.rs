//! Iris species classifier
//!
//! Trains a classifier on the built-in Iris dataset and serves
//! predictions over HTTP.

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use iris_data::FeatureVector;
use iris_serve::commands;
use ml_model::{ModelConfig, TrainingConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Iris species classifier
#[derive(Parser)]
#[command(name = "iris-serve")]
#[command(about = "Train an Iris classifier and serve its predictions over HTTP")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the classifier and save the model artifact
    Train {
        /// Where to save the model (defaults to `MODEL_PATH`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of training epochs
        #[arg(short, long, default_value = "200")]
        epochs: usize,

        /// Batch size for training
        #[arg(short, long, default_value = "16")]
        batch_size: usize,

        /// Learning rate
        #[arg(short, long, default_value = "0.05")]
        learning_rate: f64,

        /// Seed for the split and shuffling
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Fraction of the dataset held out for evaluation
        #[arg(short, long, default_value = "0.2")]
        test_ratio: f64,
    },

    /// Serve predictions over HTTP
    Serve {
        /// Model artifact to load (defaults to `MODEL_PATH`)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Address to bind (defaults to `HOST`)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to bind (defaults to `PORT`)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify one measurement, e.g. `--input 5.1,3.5,1.4,0.2`
    Predict {
        /// Comma-separated sepal length, sepal width, petal length, petal width
        #[arg(short, long)]
        input: FeatureVector,

        /// Model artifact to load (defaults to `MODEL_PATH`)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber; RUST_LOG takes precedence when set
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::from_env()?;
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Train {
            output,
            epochs,
            batch_size,
            learning_rate,
            seed,
            test_ratio,
        } => {
            let training = TrainingConfig::new(ModelConfig::new())
                .with_epochs(epochs)
                .with_batch_size(batch_size)
                .with_learning_rate(learning_rate)
                .with_seed(seed)
                .with_test_ratio(test_ratio);
            let output = output.unwrap_or(config.model_path);

            commands::train::run(&training, &output)?;
        }
        Commands::Serve { model, host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            let model = model.unwrap_or_else(|| config.model_path.clone());

            commands::serve::run(&model, config.bind_addr()).await?;
        }
        Commands::Predict { input, model } => {
            let model = model.unwrap_or(config.model_path);

            commands::predict::run(&input, &model)?;
        }
    }

    Ok(())
}
