//! Train command - fits the classifier and writes the artifact.

use std::path::{Path, PathBuf};

use anyhow::Result;
use burn::module::AutodiffModule;
use ml_model::{ModelManifest, TrainingConfig, fit_iris, save_checkpoint};
use tracing::info;

use super::{TrainingBackend, init_device};

/// Runs the train command.
///
/// Prints the test accuracy and the classification report to stdout and
/// returns the path the weights were written to.
///
/// # Arguments
///
/// * `config` - Training configuration
/// * `output` - Where to save the model artifact
///
/// # Errors
///
/// Returns an error if training fails or the artifact cannot be written.
pub fn run(config: &TrainingConfig, output: &Path) -> Result<PathBuf> {
    info!(
        epochs = config.epochs,
        batch_size = config.batch_size,
        learning_rate = config.learning_rate,
        seed = config.seed,
        "Starting training"
    );

    let device = init_device();
    let outcome = fit_iris::<TrainingBackend>(config, &device)?;

    info!(
        train_samples = outcome.train_samples,
        test_samples = outcome.test_samples,
        final_train_loss = outcome.output.final_train_loss,
        "Training complete"
    );

    println!("Test accuracy: {:.4}", outcome.report.accuracy);
    println!();
    println!("Classification report:");
    print!("{}", outcome.report);

    let manifest = ModelManifest::new(
        config,
        outcome.report,
        outcome.train_samples,
        outcome.test_samples,
    );
    let saved = save_checkpoint(outcome.model.valid(), &manifest, output)?;

    println!();
    println!("Model saved to {}", saved.display());

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use ml_model::{ModelConfig, Predictor};

    use super::*;

    #[test]
    fn test_train_writes_loadable_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = TrainingConfig::new(ModelConfig::new()).with_epochs(30);

        let saved = run(&config, &dir.path().join("artifacts/model.pkl")).expect("train");
        assert_eq!(saved, dir.path().join("artifacts/model.mpk"));

        let predictor = Predictor::load(&saved).expect("load");
        assert_eq!(predictor.manifest().train_samples, 120);
        assert_eq!(predictor.manifest().training.epochs, 30);
    }
}
