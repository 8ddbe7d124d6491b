//! Request handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use iris_data::FeatureVector;
use ml_model::ModelManifest;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AppState;
use super::error::ApiError;

/// Body returned by the liveness route.
pub const HOME_MESSAGE: &str = "ML Flask App Running!";

/// Body of `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Sepal length, sepal width, petal length and petal width, in cm.
    pub input: Vec<f64>,
}

/// Response of `POST /predict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Class index: 0 setosa, 1 versicolor, 2 virginica.
    pub prediction: usize,
}

/// `GET /`
pub async fn home() -> &'static str {
    HOME_MESSAGE
}

/// `POST /predict`
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let features = FeatureVector::try_from(request.input.as_slice())?;

    let species = state
        .predictor
        .predict(&features)
        .map_err(|e| ApiError::internal(&e))?;
    debug!(?features, %species, "Predicted");

    Ok(Json(PredictResponse {
        prediction: species.index(),
    }))
}

/// `GET /model`
pub async fn model_info(State(state): State<AppState>) -> Json<ModelManifest> {
    Json(state.predictor.manifest().clone())
}
