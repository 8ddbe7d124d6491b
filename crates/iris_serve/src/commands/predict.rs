//! Predict command - classifies one measurement from the command line.

use std::path::Path;

use anyhow::Result;
use iris_data::{FeatureVector, Species};
use ml_model::Predictor;
use tracing::info;

/// Runs the predict command.
///
/// # Arguments
///
/// * `features` - The measurements to classify
/// * `model_path` - Path to the saved model artifact
///
/// # Errors
///
/// Returns an error if the model cannot be loaded or prediction fails.
pub fn run(features: &FeatureVector, model_path: &Path) -> Result<Species> {
    info!(model_path = %model_path.display(), "Loading model");

    let predictor = Predictor::load(model_path)?;
    let species = predictor.predict(features)?;

    println!("Prediction: {} ({species})", species.index());

    Ok(species)
}
