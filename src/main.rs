//! CIFAR-10 Image Classification CLI
//!
//! Downloads the CIFAR-10 images dataset, trains a small CNN with Burn, and
//! reports the macro accuracy on the test split. Running `train` with no
//! arguments performs the whole pipeline with the default seed and the
//! temp-directory cache.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use cifar_classifier::backend::TrainingBackend;
use cifar_classifier::dataset::download::{default_data_dir, ensure_dataset};
use cifar_classifier::dataset::loader::{enumerate_samples, ClassVocabulary, DatasetStats};
use cifar_classifier::training::supervised::{run_training, TrainOptions};
use cifar_classifier::utils::logging::{init_logging, LogConfig};

/// CIFAR-10 image classification with Burn
#[derive(Parser, Debug)]
#[command(name = "cifar-classifier")]
#[command(version)]
#[command(about = "Train a CIFAR-10 image classifier and report macro accuracy", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download the dataset (if needed), train, evaluate, and print accuracy
    Train {
        /// Dataset cache directory (defaults to <temp>/cifar)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Random seed for shuffling
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Use only this many samples (shuffled first)
        #[arg(long)]
        max_samples: Option<usize>,

        /// Number of training epochs
        #[arg(short, long, default_value = "10")]
        epochs: usize,

        /// Batch size for training
        #[arg(short, long, default_value = "64")]
        batch_size: usize,

        /// Learning rate
        #[arg(short, long, default_value = "0.001")]
        learning_rate: f64,

        /// Output directory for the model checkpoint
        #[arg(short, long, default_value = "output/models")]
        output_dir: PathBuf,
    },

    /// Download and extract the dataset without training
    Download {
        /// Dataset cache directory (defaults to <temp>/cifar)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Show dataset statistics
    Stats {
        /// Dataset cache directory (defaults to <temp>/cifar)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let _ = init_logging(&log_config);

    match cli.command {
        Commands::Train {
            data_dir,
            seed,
            max_samples,
            epochs,
            batch_size,
            learning_rate,
            output_dir,
        } => {
            let data_dir = data_dir.unwrap_or_else(default_data_dir);

            ensure_dataset(&data_dir).context("Failed to acquire the dataset")?;

            let options = TrainOptions {
                data_dir,
                seed,
                max_samples,
                epochs,
                batch_size,
                learning_rate,
                output_dir,
            };

            run_training::<TrainingBackend>(&options).context("Training failed")?;
        }

        Commands::Download { data_dir } => {
            let data_dir = data_dir.unwrap_or_else(default_data_dir);
            ensure_dataset(&data_dir).context("Failed to acquire the dataset")?;
            println!("{} Dataset ready at {:?}", "Done:".green(), data_dir);
        }

        Commands::Stats { data_dir } => {
            let data_dir = data_dir.unwrap_or_else(default_data_dir);
            info!("Computing dataset statistics for {:?}", data_dir);

            let samples = enumerate_samples(&data_dir)
                .context("Failed to enumerate samples; run `download` first")?;
            let vocab = ClassVocabulary::from_samples(&samples);
            let stats = DatasetStats::compute(&samples, &vocab);
            stats.print();
        }
    }

    Ok(())
}
