//! Training logic for the Iris classifier.

use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use iris_data::{Sample, Species, load_iris, train_test_split};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::dataset::{IrisBatcher, IrisDataset, IrisItem};
use crate::metrics::ClassificationReport;
use crate::{IrisClassifier, TrainingConfig, create_model};

/// Output from training.
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    /// Mean training loss over the last epoch.
    pub final_train_loss: f32,
    /// Number of epochs completed.
    pub epochs_completed: usize,
}

/// Trains the model on the provided samples.
///
/// Uses mini-batch Adam with cross-entropy loss. Batches are reshuffled
/// every epoch from an RNG seeded with `config.seed`, so a given
/// configuration always produces the same weights.
///
/// # Arguments
///
/// * `model` - The model to train (will be modified in place).
/// * `samples` - The training samples.
/// * `config` - Training configuration.
/// * `device` - The device holding the model.
///
/// # Errors
///
/// Returns an error if there is nothing to train on or the batch size is zero.
pub fn train<B: AutodiffBackend>(
    model: &mut IrisClassifier<B>,
    samples: &[Sample],
    config: &TrainingConfig,
    device: &B::Device,
) -> anyhow::Result<TrainingOutput> {
    if samples.is_empty() {
        anyhow::bail!("No training data provided");
    }
    if config.batch_size == 0 {
        anyhow::bail!("Batch size must be at least 1");
    }

    let dataset = IrisDataset::from_slice(samples);
    let batcher = IrisBatcher::<B>::new(device.clone());

    let mut optimizer = AdamConfig::new().init::<B, IrisClassifier<B>>();
    let loss_fn = CrossEntropyLossConfig::new().init(device);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    let mut final_train_loss = 0.0;

    for epoch in 0..config.epochs {
        let mut epoch_loss = 0.0;
        let mut batch_count: u32 = 0;

        indices.shuffle(&mut rng);

        for batch_indices in indices.chunks(config.batch_size) {
            let items: Vec<IrisItem> = batch_indices
                .iter()
                .filter_map(|&i| dataset.get(i))
                .collect();

            if items.is_empty() {
                continue;
            }

            let batch = batcher.batch(&items);

            // Forward pass
            let logits = model.forward(batch.inputs);
            let loss = loss_fn.forward(logits, batch.targets);

            epoch_loss += f64::from(loss.clone().into_scalar().elem::<f32>());
            batch_count += 1;

            // Backward pass
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, model);

            // Update weights
            *model = optimizer.step(config.learning_rate, model.clone(), grads);
        }

        final_train_loss = if batch_count > 0 {
            (epoch_loss / f64::from(batch_count)) as f32
        } else {
            0.0
        };

        if epoch % 25 == 0 || epoch + 1 == config.epochs {
            log_progress(epoch + 1, final_train_loss);
        }
    }

    Ok(TrainingOutput {
        final_train_loss,
        epochs_completed: config.epochs,
    })
}

/// Evaluates a model against labelled samples.
///
/// # Errors
///
/// Returns an error if `samples` is empty or predictions cannot be decoded.
pub fn evaluate<B: Backend>(
    model: &IrisClassifier<B>,
    samples: &[Sample],
    device: &B::Device,
) -> anyhow::Result<ClassificationReport> {
    if samples.is_empty() {
        anyhow::bail!("No evaluation data provided");
    }

    let batcher = IrisBatcher::<B>::new(device.clone());
    let input = batcher.inputs(samples.iter().map(|s| s.features.values()));
    let predicted = model.classify(input)?;
    let truth: Vec<Species> = samples.iter().map(|s| s.species).collect();

    Ok(ClassificationReport::new(&truth, &predicted))
}

/// Everything produced by a full fit on the built-in dataset.
#[derive(Debug)]
pub struct FitOutcome<B: AutodiffBackend> {
    /// The trained model.
    pub model: IrisClassifier<B>,
    /// Metrics on the held-out split.
    pub report: ClassificationReport,
    /// Training loop summary.
    pub output: TrainingOutput,
    /// Number of samples used for fitting.
    pub train_samples: usize,
    /// Number of samples held out.
    pub test_samples: usize,
}

/// Loads the Iris dataset, splits it, fits a fresh model and evaluates it.
///
/// # Errors
///
/// Returns an error if the split ratio is invalid or training fails.
pub fn fit_iris<B: AutodiffBackend>(
    config: &TrainingConfig,
    device: &B::Device,
) -> anyhow::Result<FitOutcome<B>> {
    let samples = load_iris();
    let split = train_test_split(&samples, config.test_ratio, config.seed)?;

    debug!(
        train = split.train.len(),
        test = split.test.len(),
        seed = config.seed,
        "Split dataset"
    );

    let mut model = create_model::<B>(device, &config.model);
    let output = train(&mut model, &split.train, config, device)?;
    let report = evaluate(&model.valid(), &split.test, device)?;

    Ok(FitOutcome {
        model,
        report,
        output,
        train_samples: split.train.len(),
        test_samples: split.test.len(),
    })
}

/// Logs training progress.
fn log_progress(epoch: usize, train_loss: f32) {
    println!("Epoch {epoch}: train_loss = {train_loss:.6}");
}
