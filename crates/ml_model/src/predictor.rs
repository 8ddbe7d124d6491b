//! Inference handle shared by the CLI and the HTTP service.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use burn::backend::NdArray;
use burn::backend::ndarray::NdArrayDevice;
use iris_data::{FeatureVector, Species};

use crate::checkpoint::{ModelManifest, load_checkpoint};
use crate::{IrisClassifier, predict};

type InferenceBackend = NdArray;

/// A loaded model ready to answer predictions.
///
/// Burn modules are not `Sync`, so the model sits behind a mutex. The lock
/// is only held while cloning the module; the forward pass runs unlocked.
#[derive(Debug)]
pub struct Predictor {
    model: Mutex<IrisClassifier<InferenceBackend>>,
    manifest: ModelManifest,
    device: NdArrayDevice,
}

impl Predictor {
    /// Wraps an already loaded model.
    #[must_use]
    pub fn new(model: IrisClassifier<InferenceBackend>, manifest: ModelManifest) -> Self {
        Self {
            model: Mutex::new(model),
            manifest,
            device: NdArrayDevice::default(),
        }
    }

    /// Loads the checkpoint saved at `path` onto the CPU.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint is missing or unreadable.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let device = NdArrayDevice::default();
        let (model, manifest) = load_checkpoint::<InferenceBackend>(path, &device)?;

        Ok(Self::new(model, manifest))
    }

    /// Predicts the species for one feature vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the model output cannot be decoded.
    pub fn predict(&self, features: &FeatureVector) -> anyhow::Result<Species> {
        let model = self
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        predict(&model, features, &self.device)
    }

    /// Metadata recorded when the model was trained.
    #[must_use]
    pub const fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::Autodiff;
    use burn::module::AutodiffModule;

    use super::*;
    use crate::{ModelConfig, TrainingConfig, fit_iris, save_checkpoint};

    fn trained_predictor() -> Predictor {
        let device = NdArrayDevice::default();
        let config = TrainingConfig::new(ModelConfig::new()).with_epochs(100);
        let outcome = fit_iris::<Autodiff<NdArray>>(&config, &device).expect("fit");
        let manifest = ModelManifest::new(
            &config,
            outcome.report,
            outcome.train_samples,
            outcome.test_samples,
        );

        Predictor::new(outcome.model.valid(), manifest)
    }

    #[test]
    fn test_smoke_prediction() {
        let predictor = trained_predictor();
        let features = FeatureVector::new([5.1, 3.5, 1.4, 0.2]).expect("finite");

        let species = predictor.predict(&features).expect("prediction");
        assert!(species.index() < 3);
        assert_eq!(species, Species::Setosa);
    }

    #[test]
    fn test_repeated_predictions_agree() {
        let predictor = trained_predictor();
        let features = FeatureVector::new([6.7, 3.0, 5.2, 2.3]).expect("finite");

        let first = predictor.predict(&features).expect("prediction");
        for _ in 0..5 {
            assert_eq!(predictor.predict(&features).expect("prediction"), first);
        }
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.mpk");
        let predictor = trained_predictor();
        let model = predictor
            .model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        save_checkpoint(model, predictor.manifest(), &path).expect("save");

        let loaded = Predictor::load(&path).expect("load");
        assert_eq!(loaded.manifest().test_samples, 30);

        let features = FeatureVector::new([5.9, 3.0, 5.1, 1.8]).expect("finite");
        assert_eq!(
            loaded.predict(&features).expect("prediction"),
            predictor.predict(&features).expect("prediction")
        );
    }

    #[test]
    fn test_load_missing_model() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(Predictor::load(&dir.path().join("missing.mpk")).is_err());
    }
}
