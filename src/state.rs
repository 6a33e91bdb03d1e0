use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::ml::{load_model, AnomalyDetector, InferenceEngine, MLModel, SolarForecaster};

/// Registry id of the solar production model
pub const SOLAR_MODEL_ID: &str = "solar_forecast";
/// Registry id of the meter anomaly model
pub const ANOMALY_MODEL_ID: &str = "anomaly_detection";

/// Shared state handed to every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub engine: InferenceEngine,
    pub solar: Option<SolarForecaster>,
    pub anomaly: Option<AnomalyDetector>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// State with no models attached
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg: Arc::new(cfg),
            engine: InferenceEngine::new(),
            solar: None,
            anomaly: None,
            started_at: Utc::now(),
        }
    }

    /// Builds the state and loads the model artifacts named in `[models]`.
    ///
    /// A model that fails to load only disables its endpoint; the calculator
    /// keeps working.
    pub async fn from_config(cfg: Config) -> Self {
        let solar_path = cfg.models.solar_model_path.clone();
        let anomaly_path = cfg.models.anomaly_model_path.clone();
        let mut state = Self::new(cfg);

        if let Some(path) = solar_path {
            let attached = match load_model(&path) {
                Ok(model) => state.attach_solar_model(model).await,
                Err(e) => Err(e),
            };
            report_attach("solar", &path, attached);
        }

        if let Some(path) = anomaly_path {
            let attached = match load_model(&path) {
                Ok(model) => state.attach_anomaly_model(model).await,
                Err(e) => Err(e),
            };
            report_attach("anomaly", &path, attached);
        }

        state
    }

    pub async fn attach_solar_model(&mut self, model: Arc<dyn MLModel>) -> Result<()> {
        let forecaster = SolarForecaster::new(Arc::clone(&model))?;
        self.engine.register_model(SOLAR_MODEL_ID, model).await;
        self.solar = Some(forecaster);
        Ok(())
    }

    pub async fn attach_anomaly_model(&mut self, model: Arc<dyn MLModel>) -> Result<()> {
        let detector = AnomalyDetector::new(Arc::clone(&model))?;
        self.engine.register_model(ANOMALY_MODEL_ID, model).await;
        self.anomaly = Some(detector);
        Ok(())
    }

    /// Every model named in the configuration is loaded
    pub fn models_ready(&self) -> bool {
        let models = &self.cfg.models;
        (models.solar_model_path.is_none() || self.solar.is_some())
            && (models.anomaly_model_path.is_none() || self.anomaly.is_some())
    }
}

fn report_attach(role: &str, path: &Path, attached: Result<()>) {
    match attached {
        Ok(()) => info!(role, path = %path.display(), "model attached"),
        Err(e) => warn!(
            role,
            path = %path.display(),
            error = %format!("{:#}", e),
            "model unavailable, its prediction endpoint is disabled"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{LinearRegressionModel, ModelArtifact, ModelMetadata, ModelType};
    use crate::ml::solar_forecast::SOLAR_FEATURES;

    fn solar_model() -> Arc<dyn MLModel> {
        Arc::new(LinearRegressionModel::new(
            vec![0.005, 0.0, 0.0, 0.0, 0.0],
            0.0,
            ModelMetadata::new("solar_lr", ModelType::LinearRegression, &SOLAR_FEATURES),
        ))
    }

    #[tokio::test]
    async fn test_attach_solar_model_registers_it() {
        let mut state = AppState::new(Config::default());
        state.attach_solar_model(solar_model()).await.unwrap();
        assert!(state.solar.is_some());
        assert_eq!(state.engine.list_models().await, vec![SOLAR_MODEL_ID.to_string()]);
    }

    #[tokio::test]
    async fn test_regression_model_rejected_for_anomaly() {
        let mut state = AppState::new(Config::default());
        assert!(state.attach_anomaly_model(solar_model()).await.is_err());
        assert!(state.anomaly.is_none());
        assert_eq!(state.engine.registry().count().await, 0);
    }

    #[tokio::test]
    async fn test_solar_model_with_other_features_is_rejected() {
        let mut state = AppState::new(Config::default());
        let model = Arc::new(LinearRegressionModel::new(
            vec![0.004, 0.0],
            0.0,
            ModelMetadata::new("ghi_lr", ModelType::LinearRegression, &["ghi", "temp"]),
        ));
        assert!(state.attach_solar_model(model).await.is_err());
        assert!(state.solar.is_none());
        assert_eq!(state.engine.registry().count().await, 0);
    }

    #[tokio::test]
    async fn test_artifact_with_other_features_leaves_state_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ghi.json");
        let artifact = ModelArtifact::LinearRegression(LinearRegressionModel::new(
            vec![0.004, 0.0],
            0.0,
            ModelMetadata::new("ghi_lr", ModelType::LinearRegression, &["ghi", "temp"]),
        ));
        std::fs::write(&path, serde_json::to_string(&artifact).unwrap()).unwrap();

        let mut cfg = Config::default();
        cfg.models.solar_model_path = Some(path);
        let state = AppState::from_config(cfg).await;
        assert!(state.solar.is_none());
        assert!(!state.models_ready());
    }

    #[tokio::test]
    async fn test_missing_artifact_disables_endpoint() {
        let mut cfg = Config::default();
        cfg.models.solar_model_path = Some("does/not/exist.json".into());
        let state = AppState::from_config(cfg).await;
        assert!(state.solar.is_none());
        assert!(!state.models_ready());
    }

    #[test]
    fn test_ready_without_configured_models() {
        assert!(AppState::new(Config::default()).models_ready());
    }
}
