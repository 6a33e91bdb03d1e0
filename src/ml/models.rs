//! ML Model Definitions
//!
//! Concrete model implementations that can be restored from an artifact.

use super::{FeatureVector, ModelMetadata, ModelType, Prediction};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Trait for ML models
pub trait MLModel: Send + Sync + std::fmt::Debug {
    /// Predict a value from features
    fn predict(&self, features: &FeatureVector) -> Result<Prediction>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Get model type
    fn model_type(&self) -> ModelType {
        self.metadata().model_type
    }

    /// Feature names in the order the model expects them
    fn feature_names(&self) -> &[String] {
        &self.metadata().feature_names
    }
}

/// Z-score parameters captured when the model was fit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Standardization {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

fn prepare(
    features: &FeatureVector,
    metadata: &ModelMetadata,
    scaler: Option<&Standardization>,
) -> Result<FeatureVector> {
    features.ensure_matches(&metadata.feature_names)?;
    match scaler {
        Some(s) => features.standardize(&s.means, &s.stds),
        None => Ok(features.clone()),
    }
}

fn linear_score(features: &FeatureVector, coefficients: &[f64], intercept: f64) -> Result<f64> {
    if features.len() != coefficients.len() {
        anyhow::bail!(
            "Feature count mismatch: expected {}, got {}",
            coefficients.len(),
            features.len()
        );
    }

    Ok(features
        .features
        .iter()
        .zip(coefficients.iter())
        .map(|(f, c)| f * c)
        .sum::<f64>()
        + intercept)
}

/// Ordinary least squares regression
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearRegressionModel {
    pub metadata: ModelMetadata,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub standardization: Option<Standardization>,
}

impl LinearRegressionModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64, metadata: ModelMetadata) -> Self {
        Self {
            metadata,
            coefficients,
            intercept,
            standardization: None,
        }
    }

    pub fn with_standardization(mut self, means: Vec<f64>, stds: Vec<f64>) -> Self {
        self.standardization = Some(Standardization { means, stds });
        self
    }
}

impl MLModel for LinearRegressionModel {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let x = prepare(features, &self.metadata, self.standardization.as_ref())?;
        let value = linear_score(&x, &self.coefficients, self.intercept)?;

        // Widen the point estimate by the recorded RMSE when there is one
        Ok(match &self.metadata.validation_metrics {
            Some(m) if m.rmse > 0.0 => Prediction::with_bounds(value, value - m.rmse, value + m.rmse),
            _ => Prediction::new(value),
        })
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn model_type(&self) -> ModelType {
        ModelType::LinearRegression
    }
}

fn default_threshold() -> f64 {
    0.5
}

/// Binary logistic regression classifier.
///
/// The prediction value is the class (0 or 1), the confidence is the
/// probability of the predicted class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogisticRegressionModel {
    pub metadata: ModelMetadata,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub standardization: Option<Standardization>,
}

impl LogisticRegressionModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64, metadata: ModelMetadata) -> Self {
        Self {
            metadata,
            coefficients,
            intercept,
            threshold: default_threshold(),
            standardization: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Probability of the positive class
    pub fn probability(&self, features: &FeatureVector) -> Result<f64> {
        let x = prepare(features, &self.metadata, self.standardization.as_ref())?;
        let z = linear_score(&x, &self.coefficients, self.intercept)?;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl MLModel for LogisticRegressionModel {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let p = self.probability(features)?;
        Ok(if p >= self.threshold {
            Prediction::with_confidence(1.0, p)
        } else {
            Prediction::with_confidence(0.0, 1.0 - p)
        })
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn model_type(&self) -> ModelType {
        ModelType::LogisticRegression
    }
}
