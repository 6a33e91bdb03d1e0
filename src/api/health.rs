use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: &'static str,
    uptime_secs: i64,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

/// Individual health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    calculator: ComponentHealth,
    solar_model: ComponentHealth,
    anomaly_model: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ComponentHealth {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            error: None,
        }
    }

    fn unhealthy(error: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            error: Some(error),
        }
    }

    /// Not configured, so not expected to be up
    fn disabled() -> Self {
        Self {
            status: "disabled".to_string(),
            error: None,
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.error.is_some()
    }
}

fn check_model(configured: bool, loaded: bool) -> ComponentHealth {
    match (configured, loaded) {
        (_, true) => ComponentHealth::healthy(),
        (true, false) => ComponentHealth::unhealthy("configured model failed to load".to_string()),
        (false, false) => ComponentHealth::disabled(),
    }
}

/// GET /health - Health check endpoint
///
/// Reports the calculator and each prediction model. A configured model
/// that failed to load degrades the service.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let models = &state.cfg.models;
    let checks = HealthChecks {
        calculator: ComponentHealth::healthy(),
        solar_model: check_model(models.solar_model_path.is_some(), state.solar.is_some()),
        anomaly_model: check_model(
            models.anomaly_model_path.is_some(),
            state.anomaly.is_some(),
        ),
    };

    let all_healthy = !checks.solar_model.is_unhealthy() && !checks.anomaly_model.is_unhealthy();
    let now = chrono::Utc::now();

    let response = HealthResponse {
        status: if all_healthy {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: (now - state.started_at).num_seconds(),
        timestamp: now,
        checks,
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::debug!(healthy = all_healthy, "Health check completed");
    (status_code, Json(response))
}

/// GET /health/ready - Readiness probe for Kubernetes
///
/// Returns 200 once every configured model is loaded
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.models_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe for Kubernetes
///
/// Returns 200 if the application is running
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
