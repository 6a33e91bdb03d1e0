//! Smart-meter anomaly detection
//!
//! Wraps a pre-trained binary classifier over a single meter reading.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use validator::Validate;

use super::{FeatureVector, MLModel};

/// Feature order the anomaly artifacts are fit on
pub const METER_FEATURES: [&str; 5] = [
    "voltage_v",
    "current_a",
    "power_factor",
    "consumption_kwh",
    "hour_of_day",
];

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct MeterReading {
    #[validate(range(min = 0.0, max = 1000.0))]
    pub voltage_v: f64,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub current_a: f64,
    #[validate(range(min = -1.0, max = 1.0))]
    pub power_factor: f64,
    #[validate(range(min = 0.0))]
    pub consumption_kwh: f64,
    #[validate(range(max = 23))]
    pub hour_of_day: u8,
}

impl MeterReading {
    pub fn to_features(&self) -> Result<FeatureVector> {
        FeatureVector::from_pairs(&[
            (METER_FEATURES[0], self.voltage_v),
            (METER_FEATURES[1], self.current_a),
            (METER_FEATURES[2], self.power_factor),
            (METER_FEATURES[3], self.consumption_kwh),
            (METER_FEATURES[4], f64::from(self.hour_of_day)),
        ])
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AnomalyLabel {
    Normal,
    Anomaly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnomalyVerdict {
    pub is_anomaly: bool,
    /// Probability that the reading is anomalous
    pub probability: f64,
    pub label: AnomalyLabel,
}

#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    model: Arc<dyn MLModel>,
}

impl AnomalyDetector {
    pub fn new(model: Arc<dyn MLModel>) -> Result<Self> {
        if !model.model_type().is_classifier() {
            anyhow::bail!(
                "model '{}' is a {} model, anomaly detection needs a classifier",
                model.metadata().model_id,
                model.model_type()
            );
        }
        model.metadata().ensure_features(&METER_FEATURES)?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &Arc<dyn MLModel> {
        &self.model
    }

    pub fn detect(&self, reading: &MeterReading) -> Result<AnomalyVerdict> {
        let prediction = self.model.predict(&reading.to_features()?)?;
        let is_anomaly = prediction.value >= 0.5;
        let probability = if is_anomaly {
            prediction.confidence
        } else {
            1.0 - prediction.confidence
        };

        if is_anomaly {
            warn!(
                voltage_v = reading.voltage_v,
                current_a = reading.current_a,
                probability,
                "meter reading flagged as anomalous"
            );
        }

        Ok(AnomalyVerdict {
            is_anomaly,
            probability,
            label: if is_anomaly {
                AnomalyLabel::Anomaly
            } else {
                AnomalyLabel::Normal
            },
        })
    }
}
