//! ML Model Inference Engine
//!
//! Keeps loaded models addressable by id and runs predictions against them.

use super::{models::MLModel, FeatureVector, ModelMetadata, Prediction};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Model Registry for managing multiple models
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Arc<RwLock<HashMap<String, Arc<dyn MLModel>>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, replacing any model with the same id
    pub async fn register(&self, model_id: impl Into<String>, model: Arc<dyn MLModel>) {
        let mut models = self.models.write().await;
        models.insert(model_id.into(), model);
    }

    /// Get a model by ID
    pub async fn get(&self, model_id: &str) -> Option<Arc<dyn MLModel>> {
        let models = self.models.read().await;
        models.get(model_id).cloned()
    }

    /// List all registered model IDs, sorted
    pub async fn list_model_ids(&self) -> Vec<String> {
        let models = self.models.read().await;
        let mut ids: Vec<String> = models.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Metadata of every registered model, keyed by registry id
    pub async fn describe(&self) -> Vec<(String, ModelMetadata)> {
        let models = self.models.read().await;
        let mut out: Vec<(String, ModelMetadata)> = models
            .iter()
            .map(|(id, m)| (id.clone(), m.metadata().clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Remove a model
    pub async fn unregister(&self, model_id: &str) -> bool {
        let mut models = self.models.write().await;
        models.remove(model_id).is_some()
    }

    /// Get model count
    pub async fn count(&self) -> usize {
        let models = self.models.read().await;
        models.len()
    }
}

/// Inference Engine for running predictions
#[derive(Debug, Clone, Default)]
pub struct InferenceEngine {
    registry: ModelRegistry,
}

impl InferenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Register a model with the engine
    pub async fn register_model(&self, model_id: impl Into<String>, model: Arc<dyn MLModel>) {
        self.registry.register(model_id, model).await;
    }

    /// Run inference with a specific model
    pub async fn predict(&self, model_id: &str, features: &FeatureVector) -> Result<Prediction> {
        let model = self
            .registry
            .get(model_id)
            .await
            .ok_or_else(|| anyhow::anyhow!("Model '{}' not found", model_id))?;

        let prediction = model.predict(features)?;
        debug!(model_id, value = prediction.value, "inference served");
        Ok(prediction)
    }

    /// List available models
    pub async fn list_models(&self) -> Vec<String> {
        self.registry.list_model_ids().await
    }

    /// Remove a model from the registry
    pub async fn unregister_model(&self, model_id: &str) -> bool {
        self.registry.unregister(model_id).await
    }
}

/// Runs one model over many feature vectors
pub struct BatchPredictor {
    model: Arc<dyn MLModel>,
}

impl BatchPredictor {
    pub fn new(model: Arc<dyn MLModel>) -> Self {
        Self { model }
    }

    /// Run batch predictions, failing on the first bad row
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<Prediction>> {
        features.iter().map(|f| self.model.predict(f)).collect()
    }
}
