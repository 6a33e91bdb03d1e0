//! Calculator endpoints: appliance catalog, consumption, bill, sizing and
//! the combined estimate.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use crate::{
    api::{error::ApiError, response::ApiResponse},
    domain::{ApplianceInput, ApplianceKind, CatalogEntry, Energy, Rate},
    energy::{
        self, breakdown, compute_bill, energy_balance, resolve_all, solar_generation, size_system,
        Bill, ConsumptionBreakdown, EnergyBalance, EstimateReport, EstimateRequest, SolarSetup,
        SystemSizing,
    },
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct ConsumptionRequest {
    #[validate(length(max = 200), nested)]
    pub appliances: Vec<ApplianceInput>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BillRequest {
    #[validate(length(max = 200), nested)]
    pub appliances: Vec<ApplianceInput>,
    #[validate(nested)]
    pub solar: SolarSetup,
    /// Overrides the configured tariff
    #[validate(range(min = 0.0))]
    pub tariff_per_kwh: Option<f64>,
    /// Overrides the configured export credit
    #[validate(range(min = 0.0))]
    pub export_credit_per_kwh: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub balance: EnergyBalance,
    pub bill: Bill,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SizingRequest {
    #[validate(range(min = 0.0))]
    pub daily_energy_wh: f64,
    #[validate(range(min = 1.0, max = 10000.0))]
    pub panel_watt: f64,
    /// Overrides the configured sun hours
    #[validate(range(min = 0.1, max = 24.0))]
    pub sun_hours: Option<f64>,
}

/// GET /api/v1/appliances - Built-in appliance catalog
pub async fn list_appliances() -> Json<ApiResponse<Vec<CatalogEntry>>> {
    let catalog = ApplianceKind::catalog();
    let count = catalog.len();
    Json(ApiResponse::success(catalog).with_count(count))
}

/// POST /api/v1/consumption - Per-appliance and total consumption
pub async fn consumption(
    State(state): State<AppState>,
    Json(req): Json<ConsumptionRequest>,
) -> Result<Json<ApiResponse<ConsumptionBreakdown>>, ApiError> {
    let start = Instant::now();
    req.validate()?;

    let usages = resolve_all(&req.appliances)?;
    let result = breakdown(&usages, state.cfg.assumptions.days_per_month);

    Ok(Json(ApiResponse::success(result).timed(start)))
}

/// POST /api/v1/bill - Bill with and without solar
pub async fn bill(
    State(state): State<AppState>,
    Json(req): Json<BillRequest>,
) -> Result<Json<ApiResponse<BillResponse>>, ApiError> {
    let start = Instant::now();
    req.validate()?;

    let assumptions = &state.cfg.assumptions;
    let tariff = req
        .tariff_per_kwh
        .map(Rate::per_kwh)
        .unwrap_or_else(|| assumptions.tariff());
    let export_credit = req
        .export_credit_per_kwh
        .map(Rate::per_kwh)
        .unwrap_or_else(|| assumptions.export_credit());

    let usages = resolve_all(&req.appliances)?;
    let demand = energy::daily_energy(&usages);
    let solar = solar_generation(&req.solar, assumptions.sun_hours)?;
    let balance = energy_balance(demand, solar);
    let bill = compute_bill(
        &balance,
        tariff,
        export_credit,
        assumptions.days_per_month,
        &assumptions.currency,
    );

    Ok(Json(
        ApiResponse::success(BillResponse { balance, bill }).timed(start),
    ))
}

/// POST /api/v1/sizing - Panels, battery and inverter for a day's demand
pub async fn sizing(
    State(state): State<AppState>,
    Json(req): Json<SizingRequest>,
) -> Result<Json<ApiResponse<SystemSizing>>, ApiError> {
    let start = Instant::now();
    req.validate()?;

    let sun_hours = req.sun_hours.unwrap_or(state.cfg.assumptions.sun_hours);
    let result = size_system(
        Energy::watt_hours(req.daily_energy_wh),
        req.panel_watt,
        sun_hours,
        &state.cfg.costs,
    )?;

    Ok(Json(ApiResponse::success(result).timed(start)))
}

/// POST /api/v1/estimate - Full report with recommendation
pub async fn estimate(
    State(state): State<AppState>,
    Json(req): Json<EstimateRequest>,
) -> Result<Json<ApiResponse<EstimateReport>>, ApiError> {
    let start = Instant::now();
    req.validate()?;

    let report = energy::estimate(&req, &state.cfg.assumptions, &state.cfg.costs)?;
    tracing::info!(
        appliances = req.appliances.len(),
        recommendation = %report.recommendation,
        "estimate served"
    );

    Ok(Json(ApiResponse::success(report).timed(start)))
}
