//! Solar production forecasting
//!
//! Wraps a pre-trained regression model that maps weather conditions for a
//! time slot to the energy the array produces in it (kWh).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use super::inference::BatchPredictor;
use super::{FeatureVector, MLModel, Prediction};

/// Feature order the forecasting artifacts are fit on
pub const SOLAR_FEATURES: [&str; 5] = [
    "irradiance_w_per_m2",
    "temperature_c",
    "cloud_cover_percent",
    "humidity_percent",
    "hour_of_day",
];

/// Weather conditions for one forecast slot
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SolarConditions {
    #[validate(range(min = 0.0, max = 1500.0))]
    pub irradiance_w_per_m2: f64,
    #[validate(range(min = -60.0, max = 70.0))]
    pub temperature_c: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub cloud_cover_percent: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub humidity_percent: f64,
    #[validate(range(max = 23))]
    pub hour_of_day: u8,
}

impl SolarConditions {
    pub fn to_features(&self) -> Result<FeatureVector> {
        FeatureVector::from_pairs(&[
            (SOLAR_FEATURES[0], self.irradiance_w_per_m2),
            (SOLAR_FEATURES[1], self.temperature_c),
            (SOLAR_FEATURES[2], self.cloud_cover_percent),
            (SOLAR_FEATURES[3], self.humidity_percent),
            (SOLAR_FEATURES[4], f64::from(self.hour_of_day)),
        ])
    }
}

/// Forecast for one slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolarForecast {
    pub hour_of_day: u8,
    pub production_kwh: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_kwh: Option<f64>,
}

impl SolarForecast {
    // Production can't be negative, whatever the regression says
    fn from_prediction(hour_of_day: u8, p: &Prediction) -> Self {
        Self {
            hour_of_day,
            production_kwh: p.value.max(0.0),
            lower_kwh: p.lower_bound.map(|v| v.max(0.0)),
            upper_kwh: p.upper_bound.map(|v| v.max(0.0)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolarForecaster {
    model: Arc<dyn MLModel>,
}

impl SolarForecaster {
    pub fn new(model: Arc<dyn MLModel>) -> Result<Self> {
        if model.model_type().is_classifier() {
            anyhow::bail!(
                "model '{}' is a {} classifier, solar forecasting needs a regression model",
                model.metadata().model_id,
                model.model_type()
            );
        }
        model.metadata().ensure_features(&SOLAR_FEATURES)?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &Arc<dyn MLModel> {
        &self.model
    }

    pub fn forecast(&self, conditions: &SolarConditions) -> Result<SolarForecast> {
        let prediction = self.model.predict(&conditions.to_features()?)?;
        Ok(SolarForecast::from_prediction(conditions.hour_of_day, &prediction))
    }

    pub fn forecast_series(&self, series: &[SolarConditions]) -> Result<Vec<SolarForecast>> {
        let features = series
            .iter()
            .map(SolarConditions::to_features)
            .collect::<Result<Vec<_>>>()?;

        let predictions = BatchPredictor::new(Arc::clone(&self.model)).predict_batch(&features)?;
        Ok(series
            .iter()
            .zip(predictions.iter())
            .map(|(c, p)| SolarForecast::from_prediction(c.hour_of_day, p))
            .collect())
    }
}
