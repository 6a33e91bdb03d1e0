//! SmartCore ML Model Wrapper
//!
//! Restores a pre-fit SmartCore `RandomForestRegressor` from the bincode
//! bytes stored in a model artifact and runs inference through [`MLModel`].

use super::{models::MLModel, FeatureVector, ModelMetadata, ModelType, Prediction};
use anyhow::Result;
use serde::{Deserialize, Serialize};

use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// SmartCore RandomForest Model Wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct SmartcoreRandomForest {
    pub metadata: ModelMetadata,
    /// Serialized forest, as written by the producer of the artifact
    model_bytes: Vec<u8>,
    #[serde(skip)]
    model: Option<Forest>,
}

impl SmartcoreRandomForest {
    /// Wrap an already fit forest
    pub fn new(model: Forest, metadata: ModelMetadata) -> Result<Self> {
        let model_bytes = bincode::serialize(&model)
            .map_err(|e| anyhow::anyhow!("Failed to serialize model: {}", e))?;
        Ok(Self {
            metadata,
            model_bytes,
            model: Some(model),
        })
    }

    /// Restore model from serialized bytes
    pub fn restore_from_serialization(&mut self) -> Result<()> {
        if self.model.is_none() {
            let model: Forest = bincode::deserialize(&self.model_bytes)
                .map_err(|e| anyhow::anyhow!("Failed to deserialize model: {}", e))?;
            self.model = Some(model);
        }
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }
}

impl MLModel for SmartcoreRandomForest {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Model not loaded"))?;

        features.ensure_matches(&self.metadata.feature_names)?;

        // 1 row, n features
        let x = DenseMatrix::new(1, features.len(), features.features.clone(), false);

        let predictions = model
            .predict(&x)
            .map_err(|e| anyhow::anyhow!("Prediction failed: {:?}", e))?;

        let value = *predictions
            .first()
            .ok_or_else(|| anyhow::anyhow!("Model returned empty predictions"))?;

        if !value.is_finite() {
            anyhow::bail!("Invalid prediction: {}", value);
        }

        Ok(Prediction::new(value))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }
}
