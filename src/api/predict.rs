use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    ml::{AnomalyVerdict, MeterReading, ModelMetadata, SolarConditions, SolarForecast},
    state::AppState,
};

/// A run of forecast slots, typically one per hour
#[derive(Debug, Deserialize, Validate)]
pub struct SolarForecastRequest {
    #[validate(length(min = 1, max = 168), nested)]
    pub conditions: Vec<SolarConditions>,
}

#[derive(Debug, Serialize)]
pub struct SolarForecastResponse {
    pub model_id: String,
    pub forecasts: Vec<SolarForecast>,
    pub total_kwh: f64,
}

#[derive(Debug, Serialize)]
pub struct AnomalyResponse {
    pub model_id: String,
    #[serde(flatten)]
    pub verdict: AnomalyVerdict,
}

#[derive(Debug, Serialize)]
pub struct ModelSummary {
    /// Id the model is registered under
    pub id: String,
    pub metadata: ModelMetadata,
}

/// POST /api/v1/predict/solar - Solar production forecast
pub async fn predict_solar(
    State(state): State<AppState>,
    Json(req): Json<SolarForecastRequest>,
) -> Result<Json<ApiResponse<SolarForecastResponse>>, ApiError> {
    let start = Instant::now();
    req.validate()?;

    let forecaster = state
        .solar
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("solar forecast model is not loaded".into()))?;

    let forecasts = forecaster.forecast_series(&req.conditions)?;
    let total_kwh: f64 = forecasts.iter().map(|f| f.production_kwh).sum();
    let model_id = forecaster.model().metadata().model_id.clone();

    tracing::info!(
        model_id = %model_id,
        slots = forecasts.len(),
        total_kwh,
        "solar forecast served"
    );

    Ok(Json(
        ApiResponse::success(SolarForecastResponse {
            model_id,
            forecasts,
            total_kwh,
        })
        .timed(start),
    ))
}

/// POST /api/v1/predict/anomaly - Classify one meter reading
pub async fn predict_anomaly(
    State(state): State<AppState>,
    Json(reading): Json<MeterReading>,
) -> Result<Json<ApiResponse<AnomalyResponse>>, ApiError> {
    let start = Instant::now();
    reading.validate()?;

    let detector = state
        .anomaly
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("anomaly model is not loaded".into()))?;

    let verdict = detector.detect(&reading)?;
    let model_id = detector.model().metadata().model_id.clone();
    tracing::info!(model_id = %model_id, is_anomaly = verdict.is_anomaly, "anomaly check served");

    Ok(Json(
        ApiResponse::success(AnomalyResponse { model_id, verdict }).timed(start),
    ))
}

/// GET /api/v1/models - Metadata of every loaded model
pub async fn list_models(State(state): State<AppState>) -> Json<ApiResponse<Vec<ModelSummary>>> {
    let models: Vec<ModelSummary> = state
        .engine
        .registry()
        .describe()
        .await
        .into_iter()
        .map(|(id, metadata)| ModelSummary { id, metadata })
        .collect();
    let count = models.len();
    Json(ApiResponse::success(models).with_count(count))
}

/// GET /api/v1/models/:model_id - Metadata of one loaded model
pub async fn get_model(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<Json<ApiResponse<ModelSummary>>, ApiError> {
    let model = state
        .engine
        .registry()
        .get(&model_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("model '{}'", model_id)))?;

    Ok(Json(ApiResponse::success(ModelSummary {
        metadata: model.metadata().clone(),
        id: model_id,
    })))
}
