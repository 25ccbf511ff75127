//! Supervised training and evaluation.
//!
//! A custom training loop on Burn's API: cross-entropy loss, Adam, seeded
//! per-epoch shuffling, then a single evaluation pass over the test split
//! that accumulates a confusion matrix and reports macro accuracy.

use std::path::PathBuf;

use anyhow::Result;
use burn::{
    data::dataloader::batcher::Batcher,
    data::dataset::Dataset,
    module::{AutodiffModule, Module},
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    record::CompactRecorder,
    tensor::{backend::AutodiffBackend, backend::Backend, ElementConversion},
};
use chrono::Local;
use colored::Colorize;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::dataset::batcher::{CifarBatcher, CifarDataset};
use crate::dataset::loader::{
    enumerate_samples, shuffle_and_truncate, split_samples, ClassVocabulary, DatasetStats,
};
use crate::model::cnn::{CifarClassifier, CifarClassifierConfig};
use crate::utils::metrics::{ConfusionMatrix, EvaluationReport};
use crate::IMAGE_SIZE;

/// Options for a training run
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Dataset cache directory (extracted image tree)
    pub data_dir: PathBuf,
    /// Random seed driving the sample shuffle and per-epoch batching
    pub seed: u64,
    /// Truncate the shuffled sample list to this many samples
    pub max_samples: Option<usize>,
    /// Number of training epochs
    pub epochs: usize,
    /// Batch size
    pub batch_size: usize,
    /// Learning rate
    pub learning_rate: f64,
    /// Directory for the saved model checkpoint
    pub output_dir: PathBuf,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            data_dir: crate::dataset::download::default_data_dir(),
            seed: 0,
            max_samples: None,
            epochs: 10,
            batch_size: 64,
            learning_rate: 1e-3,
            output_dir: PathBuf::from("output/models"),
        }
    }
}

/// Run the full train-and-evaluate pipeline.
///
/// Enumerates samples under `data_dir`, splits them into train/test by
/// path, fits the classifier on the train split, evaluates on the test
/// split, prints the macro accuracy, and returns it.
pub fn run_training<B>(options: &TrainOptions) -> Result<f64>
where
    B: AutodiffBackend,
{
    if options.batch_size == 0 {
        anyhow::bail!("batch size must be at least 1");
    }

    let device = B::Device::default();
    info!("Training on device {:?}", device);

    std::fs::create_dir_all(&options.output_dir)?;

    // Enumerate and shuffle samples
    let mut samples = enumerate_samples(&options.data_dir)?;
    if samples.is_empty() {
        anyhow::bail!(
            "no image samples found under {:?}; delete the directory to force a fresh download",
            options.data_dir
        );
    }
    shuffle_and_truncate(&mut samples, options.seed, options.max_samples);

    // Label vocabulary is shared by both splits
    let vocab = ClassVocabulary::from_samples(&samples);
    let stats = DatasetStats::compute(&samples, &vocab);
    stats.print();

    let split = split_samples(samples);
    if split.train.is_empty() {
        anyhow::bail!("train split is empty");
    }
    if split.test.is_empty() {
        anyhow::bail!("test split is empty");
    }

    println!();
    println!("{}", "Dataset splits:".cyan().bold());
    println!("  Training samples: {}", split.train.len());
    println!("  Test samples:     {}", split.test.len());

    println!();
    println!("{}", "Loading training data...".cyan());
    let train_dataset = CifarDataset::load(&split.train, &vocab, IMAGE_SIZE)?;
    println!("{}", "Loading test data...".cyan());
    let test_dataset = CifarDataset::load(&split.test, &vocab, IMAGE_SIZE)?;

    let batcher = CifarBatcher::<B>::new(device.clone(), IMAGE_SIZE);

    // Model and optimizer
    let model_config = CifarClassifierConfig {
        num_classes: vocab.len(),
        input_size: IMAGE_SIZE,
        dropout_rate: 0.3,
        in_channels: 3,
        base_filters: 32,
    };
    let mut model = CifarClassifier::<B>::new(&model_config, &device);

    let mut optimizer = AdamConfig::new()
        .with_weight_decay(Some(burn::optim::decay::WeightDecayConfig::new(1e-4)))
        .init();

    println!();
    println!("{}", "Training configuration:".cyan().bold());
    println!("  Classes:       {}", vocab.len());
    println!("  Epochs:        {}", options.epochs);
    println!("  Batch size:    {}", options.batch_size);
    println!("  Learning rate: {}", options.learning_rate);
    println!("  Seed:          {}", options.seed);
    println!();

    let mut epoch_rng = ChaCha8Rng::seed_from_u64(options.seed);

    for epoch in 0..options.epochs {
        println!(
            "{}",
            format!("Epoch {}/{}", epoch + 1, options.epochs).yellow().bold()
        );

        let mut epoch_loss = 0.0f64;
        let mut correct = 0usize;
        let mut seen = 0usize;

        let mut indices: Vec<usize> = (0..train_dataset.len()).collect();
        indices.shuffle(&mut epoch_rng);
        let num_batches = (indices.len() + options.batch_size - 1) / options.batch_size;

        for batch_idx in 0..num_batches {
            let start = batch_idx * options.batch_size;
            let end = (start + options.batch_size).min(indices.len());
            let items: Vec<_> = indices[start..end]
                .iter()
                .filter_map(|&i| train_dataset.get(i))
                .collect();

            if items.is_empty() {
                continue;
            }

            let batch = batcher.batch(items);

            let output = model.forward(batch.images.clone());
            let loss = CrossEntropyLossConfig::new()
                .init(&output.device())
                .forward(output.clone(), batch.targets.clone());

            let loss_value: f64 = loss.clone().into_scalar().elem();
            epoch_loss += loss_value;

            let predictions = output.argmax(1).squeeze::<1>(1);
            let batch_correct: i64 = predictions
                .equal(batch.targets.clone())
                .int()
                .sum()
                .into_scalar()
                .elem();
            correct += batch_correct as usize;
            seen += batch.targets.dims()[0];

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(options.learning_rate, model, grads);

            if (batch_idx + 1) % 10 == 0 || batch_idx == num_batches - 1 {
                let running_acc = 100.0 * correct as f64 / seen as f64;
                println!(
                    "  Batch {:>4}/{}: loss = {:.4}, acc = {:.2}%",
                    batch_idx + 1,
                    num_batches,
                    loss_value,
                    running_acc
                );
            }
        }

        let avg_loss = epoch_loss / num_batches.max(1) as f64;
        let train_acc = 100.0 * correct as f64 / seen.max(1) as f64;
        println!(
            "  {} Loss: {:.4} | Train Acc: {:.2}%",
            "→".cyan(),
            avg_loss,
            train_acc
        );
        println!();
    }

    // Evaluate on the test split
    println!("{}", "Evaluating on test split...".cyan().bold());
    let matrix = evaluate(&model, &test_dataset, options.batch_size, vocab.len());
    let macro_accuracy = matrix.macro_accuracy();

    info!(
        "Evaluated {} test samples, micro accuracy {:.4}",
        matrix.total(),
        matrix.accuracy()
    );

    println!("Accuracy: {}", macro_accuracy);

    let report = EvaluationReport::from_matrix(&matrix, vocab.classes());
    let report_path = options.output_dir.join("evaluation.json");
    report.write_json(&report_path)?;
    info!("Evaluation report written to {:?}", report_path);

    save_model(&model, &options.output_dir)?;

    Ok(macro_accuracy)
}

/// Evaluate the model on a dataset, accumulating a confusion matrix
fn evaluate<B: AutodiffBackend>(
    model: &CifarClassifier<B>,
    dataset: &CifarDataset,
    batch_size: usize,
    num_classes: usize,
) -> ConfusionMatrix {
    // The validation model runs on the inner backend, so the batcher must too
    let device = <B::InnerBackend as Backend>::Device::default();
    let batcher = CifarBatcher::<B::InnerBackend>::new(device, IMAGE_SIZE);
    let inner_model = model.clone().valid();

    let mut matrix = ConfusionMatrix::new(num_classes);
    let len = dataset.len();

    for start in (0..len).step_by(batch_size) {
        let end = (start + batch_size).min(len);
        let items: Vec<_> = (start..end).filter_map(|i| dataset.get(i)).collect();
        if items.is_empty() {
            continue;
        }

        let actuals: Vec<usize> = items.iter().map(|item| item.label).collect();
        let batch = batcher.batch(items);

        let output = inner_model.forward(batch.images);
        let predictions = output.argmax(1).squeeze::<1>(1);
        let predicted: Vec<i64> = predictions.into_data().iter::<i64>().collect();

        for (actual, pred) in actuals.iter().zip(predicted.iter()) {
            matrix.record(*actual, *pred as usize);
        }
    }

    matrix
}

/// Save the fitted model with a timestamped name
fn save_model<B: AutodiffBackend>(model: &CifarClassifier<B>, output_dir: &PathBuf) -> Result<()> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let checkpoint_path = output_dir.join(format!("cifar_classifier_{}", timestamp));

    let recorder = CompactRecorder::new();
    model
        .clone()
        .save_file(&checkpoint_path, &recorder)
        .map_err(|e| anyhow::anyhow!("Failed to save model: {:?}", e))?;

    info!("Model saved to {:?}", checkpoint_path);
    Ok(())
}
