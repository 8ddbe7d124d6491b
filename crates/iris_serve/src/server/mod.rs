//! HTTP prediction service.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use ml_model::Predictor;

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{HOME_MESSAGE, PredictRequest, PredictResponse};

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The model loaded at startup.
    pub predictor: Arc<Predictor>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/predict", post(handlers::predict))
        .route("/model", get(handlers::model_info))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, Bytes};
    use axum::http::{Request, StatusCode, header};
    use burn::module::AutodiffModule;
    use ml_model::{ModelConfig, ModelManifest, TrainingConfig, fit_iris};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::commands::{TrainingBackend, init_device};

    fn app() -> Router {
        let device = init_device();
        let config = TrainingConfig::new(ModelConfig::new()).with_epochs(100);
        let outcome = fit_iris::<TrainingBackend>(&config, &device).expect("fit");
        let manifest = ModelManifest::new(
            &config,
            outcome.report,
            outcome.train_samples,
            outcome.test_samples,
        );
        let predictor = Predictor::new(outcome.model.valid(), manifest);

        router(AppState {
            predictor: Arc::new(predictor),
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = app.oneshot(request).await.expect("infallible");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, body)
    }

    fn predict_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn error_message(body: &Bytes) -> String {
        let value: Value = serde_json::from_slice(body).expect("json error body");
        value["error"].as_str().expect("error field").to_string()
    }

    #[tokio::test]
    async fn test_home() {
        let request = Request::builder().uri("/").body(Body::empty()).expect("request");
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], HOME_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_predict_valid_input() {
        let (status, body) = send(app(), predict_request(r#"{"input":[5.1,3.5,1.4,0.2]}"#)).await;
        assert_eq!(status, StatusCode::OK);

        let response: PredictResponse = serde_json::from_slice(&body).expect("response");
        assert!(response.prediction < 3);
        assert_eq!(response.prediction, 0);
    }

    #[tokio::test]
    async fn test_predict_is_repeatable() {
        let app = app();
        let body = r#"{"input":[6.4,2.9,4.3,1.3]}"#;

        let (_, first) = send(app.clone(), predict_request(body)).await;
        let (_, second) = send(app, predict_request(body)).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_predict_wrong_arity() {
        let (status, body) = send(app(), predict_request(r#"{"input":[1,2]}"#)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_message(&body), "expected 4 features, got 2");
    }

    #[tokio::test]
    async fn test_predict_non_finite() {
        let (status, body) = send(app(), predict_request(r#"{"input":[1e300,2,3,4]}"#)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(error_message(&body).contains("not a finite number"));
    }

    #[tokio::test]
    async fn test_predict_missing_field() {
        let (status, body) = send(app(), predict_request(r#"{"features":[1,2,3,4]}"#)).await;

        assert!(status.is_client_error(), "unexpected status {status}");
        assert!(!error_message(&body).is_empty());
    }

    #[tokio::test]
    async fn test_predict_invalid_json() {
        let (status, body) = send(app(), predict_request(r#"{"input": [1, 2"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!error_message(&body).is_empty());
    }

    #[tokio::test]
    async fn test_predict_without_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .body(Body::from(r#"{"input":[5.1,3.5,1.4,0.2]}"#))
            .expect("request");
        let (status, _) = send(app(), request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_model_info() {
        let request = Request::builder()
            .uri("/model")
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);

        let manifest: Value = serde_json::from_slice(&body).expect("manifest");
        assert_eq!(manifest["test_samples"], 30);
        assert_eq!(manifest["training"]["seed"], 42);
        assert_eq!(manifest["classes"][2], "virginica");
    }
}
