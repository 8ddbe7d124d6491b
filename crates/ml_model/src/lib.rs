//! ML model crate for Iris species classification.
//!
//! This crate uses the Burn deep learning framework to define, train,
//! persist and run inference with a multinomial logistic regression that
//! maps the four Iris measurements to one of three species.

use anyhow::anyhow;
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::prelude::*;
use iris_data::{CLASS_COUNT, FEATURE_COUNT, FeatureVector, Species};

pub mod checkpoint;
pub mod dataset;
pub mod metrics;
pub mod predictor;
pub mod training;

pub use checkpoint::{ModelManifest, artifact_path, load_checkpoint, manifest_path, save_checkpoint};
pub use metrics::{ClassMetrics, ClassificationReport};
pub use predictor::Predictor;
pub use training::{FitOutcome, TrainingOutput, evaluate, fit_iris, train};

/// Configuration for the classifier.
#[derive(Config, Debug)]
pub struct ModelConfig {
    /// Number of input features.
    #[config(default = "FEATURE_COUNT")]
    pub d_input: usize,
    /// Number of output classes.
    #[config(default = "CLASS_COUNT")]
    pub num_classes: usize,
}

/// Configuration for training the model.
#[derive(Config, Debug)]
pub struct TrainingConfig {
    /// Model architecture configuration.
    pub model: ModelConfig,
    /// Number of training epochs.
    #[config(default = 200)]
    pub epochs: usize,
    /// Batch size for training.
    #[config(default = 16)]
    pub batch_size: usize,
    /// Learning rate for the optimizer.
    #[config(default = 0.05)]
    pub learning_rate: f64,
    /// Seed for the train/test split and per-epoch shuffling.
    #[config(default = 42)]
    pub seed: u64,
    /// Fraction of the dataset held out for evaluation.
    #[config(default = 0.2)]
    pub test_ratio: f64,
}

/// The Iris species classifier.
///
/// A single linear layer producing one logit per class. Trained with
/// cross-entropy, this is multinomial logistic regression.
#[derive(Module, Debug)]
pub struct IrisClassifier<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> IrisClassifier<B> {
    /// Creates a new classifier with zero-initialized weights.
    ///
    /// Zero initialization keeps fitting independent of the backend RNG.
    pub fn new(device: &B::Device, config: &ModelConfig) -> Self {
        let linear = LinearConfig::new(config.d_input, config.num_classes)
            .with_initializer(Initializer::Zeros)
            .init(device);

        Self { linear }
    }

    /// Forward pass through the network.
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape [`batch_size`, `FEATURE_COUNT`]
    ///
    /// # Returns
    ///
    /// Tensor of shape [`batch_size`, `CLASS_COUNT`] containing class logits.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        self.linear.forward(input)
    }

    /// Returns the most likely species for every row of `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if the predicted labels cannot be read back.
    pub fn classify(&self, input: Tensor<B, 2>) -> anyhow::Result<Vec<Species>> {
        let labels = self
            .forward(input)
            .argmax(1)
            .flatten::<1>(0, 1)
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| anyhow!("failed to read predicted labels: {e:?}"))?;

        labels
            .into_iter()
            .map(|label| {
                usize::try_from(label)
                    .ok()
                    .and_then(Species::from_index)
                    .ok_or_else(|| anyhow!("predicted label {label} is out of range"))
            })
            .collect()
    }
}

/// Creates a new model with the given configuration.
pub fn create_model<B: Backend>(device: &B::Device, config: &ModelConfig) -> IrisClassifier<B> {
    IrisClassifier::new(device, config)
}

/// Predicts the species for a single feature vector.
///
/// # Errors
///
/// Returns an error if the model output cannot be decoded.
pub fn predict<B: Backend>(
    model: &IrisClassifier<B>,
    features: &FeatureVector,
    device: &B::Device,
) -> anyhow::Result<Species> {
    let batcher = dataset::IrisBatcher::<B>::new(device.clone());
    let input = batcher.inputs([features.values()]);

    model
        .classify(input)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("model returned no prediction"))
}
