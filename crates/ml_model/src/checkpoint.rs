//! Persisting trained models.
//!
//! A checkpoint is two files side by side: the Burn record (`<stem>.mpk`)
//! and a JSON manifest (`<stem>.config.json`) carrying the configuration
//! needed to rebuild the module before loading its weights.

use std::path::{Path, PathBuf};

use anyhow::Context;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use iris_data::{FEATURE_NAMES, Species};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics::ClassificationReport;
use crate::{IrisClassifier, ModelConfig, TrainingConfig};

type Recorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Metadata stored next to the model weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Architecture used to rebuild the module.
    pub model: ModelConfig,
    /// Hyperparameters the weights were produced with.
    pub training: TrainingConfig,
    /// Number of samples used for fitting.
    pub train_samples: usize,
    /// Number of samples held out for evaluation.
    pub test_samples: usize,
    /// Evaluation on the held-out split.
    pub report: ClassificationReport,
    /// Class names, indexed by label.
    pub classes: Vec<String>,
    /// Feature names, in input order.
    pub features: Vec<String>,
}

impl ModelManifest {
    /// Creates a manifest for a freshly trained model.
    #[must_use]
    pub fn new(
        training: &TrainingConfig,
        report: ClassificationReport,
        train_samples: usize,
        test_samples: usize,
    ) -> Self {
        Self {
            model: training.model.clone(),
            training: training.clone(),
            train_samples,
            test_samples,
            report,
            classes: Species::ALL.iter().map(|s| s.name().to_string()).collect(),
            features: FEATURE_NAMES.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

/// Returns the path the model weights are written to for `path`.
#[must_use]
pub fn artifact_path(path: &Path) -> PathBuf {
    path.with_extension("mpk")
}

/// Returns the path of the manifest that accompanies `path`.
#[must_use]
pub fn manifest_path(path: &Path) -> PathBuf {
    path.with_extension("config.json")
}

/// Saves the model weights and manifest to disk.
///
/// Parent directories are created as needed. Existing files are replaced.
///
/// # Arguments
///
/// * `model` - The model to save.
/// * `manifest` - Metadata describing the model.
/// * `path` - The path to save to. The extension is replaced by the recorder's.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn save_checkpoint<B: Backend>(
    model: IrisClassifier<B>,
    manifest: &ModelManifest,
    path: &Path,
) -> anyhow::Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let weights = artifact_path(path);
    model
        .save_file(weights.clone(), &Recorder::new())
        .with_context(|| format!("Failed to save model to {}", weights.display()))?;

    let manifest_file = manifest_path(path);
    let json = serde_json::to_string_pretty(manifest).context("Failed to encode manifest")?;
    std::fs::write(&manifest_file, json)
        .with_context(|| format!("Failed to write manifest {}", manifest_file.display()))?;

    info!(
        weights = %weights.display(),
        manifest = %manifest_file.display(),
        "Saved model checkpoint"
    );

    Ok(weights)
}

/// Loads a model checkpoint from disk.
///
/// # Arguments
///
/// * `path` - The path the checkpoint was saved to.
/// * `device` - The device to load the model to.
///
/// # Errors
///
/// Returns an error if the manifest or weights are missing or unreadable.
pub fn load_checkpoint<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> anyhow::Result<(IrisClassifier<B>, ModelManifest)> {
    let manifest_file = manifest_path(path);
    let raw = std::fs::read_to_string(&manifest_file).with_context(|| {
        format!(
            "Failed to read model manifest {} (train a model first)",
            manifest_file.display()
        )
    })?;
    let manifest: ModelManifest = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid model manifest {}", manifest_file.display()))?;

    let weights = artifact_path(path);
    let model = IrisClassifier::new(device, &manifest.model)
        .load_file(weights.clone(), &Recorder::new(), device)
        .with_context(|| format!("Failed to load model weights {}", weights.display()))?;

    info!(weights = %weights.display(), "Loaded model checkpoint");

    Ok((model, manifest))
}
