//! Machine Learning Module
//!
//! Inference against pre-trained model artifacts:
//! - Solar production forecasting (regression)
//! - Smart-meter anomaly detection (binary classification)
//!
//! # Architecture
//! - Artifacts are loaded from `.json` or `.bin` files at startup
//! - Every model is used through the same [`MLModel::predict`] interface
//! - A registry keeps loaded models addressable by id
//!
//! Models are never fit here; the artifacts are produced elsewhere.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod anomaly;
pub mod artifact;
pub mod inference;
pub mod models;
pub mod solar_forecast;

#[cfg(feature = "ml")]
pub mod smartcore;

pub use anomaly::{AnomalyDetector, AnomalyVerdict, MeterReading};
pub use artifact::{load_model, ModelArtifact};
pub use inference::{InferenceEngine, ModelRegistry};
pub use models::{LinearRegressionModel, LogisticRegressionModel, MLModel, Standardization};
pub use solar_forecast::{SolarConditions, SolarForecast, SolarForecaster};

/// ML Model Type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ModelType {
    LinearRegression,
    LogisticRegression,
    RandomForest,
}

impl ModelType {
    pub fn is_classifier(&self) -> bool {
        matches!(self, Self::LogisticRegression)
    }
}

/// ML Model Metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    pub model_id: String,
    pub model_type: ModelType,
    pub version: String,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub training_samples: usize,
    #[serde(default)]
    pub validation_metrics: Option<ValidationMetrics>,
    pub feature_names: Vec<String>,
}

impl ModelMetadata {
    pub fn new(model_id: impl Into<String>, model_type: ModelType, feature_names: &[&str]) -> Self {
        Self {
            model_id: model_id.into(),
            model_type,
            version: "1.0.0".to_string(),
            trained_at: None,
            training_samples: 0,
            validation_metrics: None,
            feature_names: feature_names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Fails unless the model was fit on exactly `expected`, in that order
    pub fn ensure_features(&self, expected: &[&str]) -> Result<()> {
        if self.feature_names.len() != expected.len()
            || self.feature_names.iter().zip(expected).any(|(got, want)| got != want)
        {
            anyhow::bail!(
                "model '{}' was fit on features [{}], expected [{}]",
                self.model_id,
                self.feature_names.join(", "),
                expected.join(", ")
            );
        }
        Ok(())
    }
}

/// Validation Metrics recorded when the artifact was produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationMetrics {
    pub mae: f64,  // Mean Absolute Error
    pub rmse: f64, // Root Mean Square Error
    pub mape: f64, // Mean Absolute Percentage Error
    pub r2: f64,   // R-squared
}

impl ValidationMetrics {
    pub fn new(mae: f64, rmse: f64, mape: f64, r2: f64) -> Self {
        Self {
            mae,
            rmse,
            mape,
            r2,
        }
    }

    /// Check if metrics meet quality thresholds
    pub fn meets_quality_threshold(&self, max_mape: f64, min_r2: f64) -> bool {
        self.mape <= max_mape && self.r2 >= min_r2
    }
}

/// Feature Vector for ML models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: Vec<f64>,
    pub feature_names: Vec<String>,
}

impl FeatureVector {
    pub fn new(features: Vec<f64>, feature_names: Vec<String>) -> Result<Self> {
        if features.len() != feature_names.len() {
            anyhow::bail!(
                "Feature count mismatch: {} features, {} names",
                features.len(),
                feature_names.len()
            );
        }
        if let Some((name, value)) = feature_names
            .iter()
            .zip(features.iter())
            .find(|(_, v)| !v.is_finite())
        {
            anyhow::bail!("Feature '{}' is not finite: {}", name, value);
        }
        Ok(Self {
            features,
            feature_names,
        })
    }

    /// Build from `(name, value)` pairs
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Result<Self> {
        Self::new(
            pairs.iter().map(|(_, v)| *v).collect(),
            pairs.iter().map(|(n, _)| n.to_string()).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Normalize features using min-max scaling
    pub fn normalize(&self, min_vals: &[f64], max_vals: &[f64]) -> Result<Self> {
        if min_vals.len() != self.features.len() || max_vals.len() != self.features.len() {
            anyhow::bail!("Normalization parameter count mismatch");
        }

        let normalized = self
            .features
            .iter()
            .zip(min_vals.iter().zip(max_vals.iter()))
            .map(|(f, (min, max))| {
                if (max - min).abs() < 1e-10 {
                    0.5
                } else {
                    (f - min) / (max - min)
                }
            })
            .collect();

        Ok(Self {
            features: normalized,
            feature_names: self.feature_names.clone(),
        })
    }

    /// Standardize features using z-score normalization
    pub fn standardize(&self, means: &[f64], stds: &[f64]) -> Result<Self> {
        if means.len() != self.features.len() || stds.len() != self.features.len() {
            anyhow::bail!("Standardization parameter count mismatch");
        }

        let standardized = self
            .features
            .iter()
            .zip(means.iter().zip(stds.iter()))
            .map(|(f, (mean, std))| {
                if std.abs() < 1e-10 {
                    0.0
                } else {
                    (f - mean) / std
                }
            })
            .collect();

        Ok(Self {
            features: standardized,
            feature_names: self.feature_names.clone(),
        })
    }

    /// Check the vector against the feature names a model was fit on
    pub fn ensure_matches(&self, expected: &[String]) -> Result<()> {
        if self.features.len() != expected.len() {
            anyhow::bail!(
                "Feature count mismatch: expected {}, got {}",
                expected.len(),
                self.features.len()
            );
        }
        if let Some((got, want)) = self
            .feature_names
            .iter()
            .zip(expected.iter())
            .find(|(got, want)| got != want)
        {
            anyhow::bail!("Feature order mismatch: expected '{}', got '{}'", want, got);
        }
        Ok(())
    }
}

/// ML Prediction Result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub value: f64,
    pub confidence: f64,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

impl Prediction {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            confidence: 1.0,
            lower_bound: None,
            upper_bound: None,
        }
    }

    pub fn with_confidence(value: f64, confidence: f64) -> Self {
        Self {
            value,
            confidence,
            lower_bound: None,
            upper_bound: None,
        }
    }

    pub fn with_bounds(value: f64, lower: f64, upper: f64) -> Self {
        Self {
            value,
            confidence: 1.0,
            lower_bound: Some(lower),
            upper_bound: Some(upper),
        }
    }
}
