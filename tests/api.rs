use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use solar_savings::{api, config::Config, ml::load_model, state::AppState};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn app_without_models() -> Router {
    api::router(AppState::new(Config::default()))
}

async fn app_with_models() -> Router {
    let mut state = AppState::new(Config::default());
    state
        .attach_solar_model(load_model(fixture("solar_linear.json")).unwrap())
        .await
        .unwrap();
    state
        .attach_anomaly_model(load_model(fixture("meter_logistic.json")).unwrap())
        .await
        .unwrap();
    api::router(state)
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn approx(value: &Value, expected: f64) -> bool {
    value.as_f64().map(|v| (v - expected).abs() < 1e-6).unwrap_or(false)
}

#[tokio::test]
async fn health_endpoints() {
    let (status, body) = send(app_without_models(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["solar_model"]["status"], "disabled");

    let (status, _) = send(app_without_models(), "GET", "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app_without_models(), "GET", "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_degraded_when_configured_model_missing() {
    let mut cfg = Config::default();
    cfg.models.anomaly_model_path = Some(fixture("missing.json").into());
    let app = api::router(AppState::from_config(cfg).await);

    let (status, body) = send(app.clone(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["anomaly_model"]["status"], "unhealthy");

    let (status, _) = send(app, "GET", "/health/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn lists_appliance_catalog() {
    let (status, body) = send(app_without_models(), "GET", "/api/v1/appliances", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let catalog = body["data"].as_array().unwrap();
    assert_eq!(catalog.len(), 8);
    assert_eq!(body["metadata"]["total_count"], 8);
    assert!(catalog
        .iter()
        .any(|e| e["kind"] == "air_conditioner" && approx(&e["watts"], 1500.0)));
}

#[tokio::test]
async fn consumption_breakdown() {
    let request = json!({
        "appliances": [
            { "kind": "fan", "hours_per_day": 10, "quantity": 3 },
            { "kind": "refrigerator", "hours_per_day": 24 },
            { "kind": "iron", "hours_per_day": 1, "selected": false }
        ]
    });
    let (status, body) = send(app_without_models(), "POST", "/api/v1/consumption", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert!(approx(&data["daily_energy_wh"], 7050.0));
    assert!(approx(&data["monthly_energy_kwh"], 211.5));
    assert_eq!(data["appliances"].as_array().unwrap().len(), 3);
    assert!(body["metadata"]["duration_ms"].is_u64());
}

#[tokio::test]
async fn bill_with_partial_solar() {
    let request = json!({
        "appliances": [{ "name": "Heater", "watts": 1000, "hours_per_day": 5 }],
        "solar": { "panel_watt": 400, "panel_count": 2, "efficiency_percent": 90 }
    });
    let (status, body) = send(app_without_models(), "POST", "/api/v1/bill", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert!(approx(&data["balance"]["solar_wh"], 3600.0));
    assert!(approx(&data["balance"]["grid_wh"], 1400.0));
    assert!(approx(&data["bill"]["daily"]["without_solar"], 40.0));
    assert!(approx(&data["bill"]["daily"]["with_solar"], 11.2));
    assert!(approx(&data["bill"]["monthly"]["with_solar"], 336.0));
    assert!(approx(&data["bill"]["monthly"]["savings"], 864.0));
    assert_eq!(data["bill"]["currency"], "INR");
}

#[tokio::test]
async fn bill_tariff_override() {
    let request = json!({
        "appliances": [{ "name": "Heater", "watts": 1000, "hours_per_day": 5 }],
        "solar": { "panel_watt": 400, "panel_count": 0 },
        "tariff_per_kwh": 10
    });
    let (status, body) = send(app_without_models(), "POST", "/api/v1/bill", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["data"]["bill"]["daily"]["with_solar"], 50.0));
    assert!(approx(&body["data"]["bill"]["tariff_per_kwh"], 10.0));
}

#[tokio::test]
async fn sizing_for_daily_demand() {
    let request = json!({ "daily_energy_wh": 6000, "panel_watt": 400 });
    let (status, body) = send(app_without_models(), "POST", "/api/v1/sizing", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["panels_required"], 3);
    assert!(approx(&data["battery_capacity_kwh"], 12.0));
    assert!(approx(&data["inverter_capacity_w"], 1440.0));
    assert!(approx(&data["cost"]["panels"], 36000.0));
    assert!(approx(&data["cost"]["battery"], 180000.0));
    assert!(approx(&data["cost"]["total"], 230400.0));
}

#[tokio::test]
async fn estimate_fully_covered() {
    let request = json!({
        "appliances": [{ "kind": "led_bulb", "hours_per_day": 5, "quantity": 4 }],
        "solar": { "panel_watt": 400, "panel_count": 2 }
    });
    let (status, body) = send(app_without_models(), "POST", "/api/v1/estimate", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["recommendation"], "fully_covered");
    assert!(approx(&data["bill"]["monthly"]["with_solar"], 0.0));
    assert!(approx(&data["balance"]["excess_wh"], 3400.0));
    assert!(data["message"].as_str().unwrap().contains("No electricity bill"));
}

#[tokio::test]
async fn estimate_rejects_invalid_panel() {
    let request = json!({
        "appliances": [{ "kind": "fan", "hours_per_day": 4 }],
        "solar": { "panel_watt": 0, "panel_count": 2 }
    });
    let (status, body) = send(app_without_models(), "POST", "/api/v1/estimate", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
    assert!(body["message"].as_str().unwrap().contains("panel_watt"));
}

#[tokio::test]
async fn estimate_rejects_appliance_without_wattage() {
    let request = json!({
        "appliances": [{ "name": "Mystery box", "hours_per_day": 4 }],
        "solar": { "panel_watt": 400, "panel_count": 2 }
    });
    let (status, body) = send(app_without_models(), "POST", "/api/v1/estimate", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");
    assert!(body["message"].as_str().unwrap().contains("Mystery box"));
}

#[tokio::test]
async fn predictions_unavailable_without_models() {
    let request = json!({
        "conditions": [{
            "irradiance_w_per_m2": 800, "temperature_c": 30,
            "cloud_cover_percent": 20, "humidity_percent": 40, "hour_of_day": 12
        }]
    });
    let (status, body) = send(app_without_models(), "POST", "/api/v1/predict/solar", Some(request)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "ServiceUnavailable");

    let reading = json!({
        "voltage_v": 230, "current_a": 4, "power_factor": 0.95,
        "consumption_kwh": 0.9, "hour_of_day": 19
    });
    let (status, _) = send(app_without_models(), "POST", "/api/v1/predict/anomaly", Some(reading)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn solar_forecast_series() {
    let request = json!({
        "conditions": [
            { "irradiance_w_per_m2": 800, "temperature_c": 30,
              "cloud_cover_percent": 20, "humidity_percent": 40, "hour_of_day": 12 },
            { "irradiance_w_per_m2": 200, "temperature_c": 22,
              "cloud_cover_percent": 0, "humidity_percent": 55, "hour_of_day": 8 }
        ]
    });
    let (status, body) = send(app_with_models().await, "POST", "/api/v1/predict/solar", Some(request)).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["model_id"], "solar_lr_v1");
    assert!(approx(&data["total_kwh"], 4.8));
    let first = &data["forecasts"][0];
    assert_eq!(first["hour_of_day"], 12);
    assert!(approx(&first["production_kwh"], 3.8));
    assert!(approx(&first["lower_kwh"], 3.6));
    assert!(approx(&first["upper_kwh"], 4.0));
}

#[tokio::test]
async fn solar_forecast_rejects_empty_series() {
    let (status, body) = send(
        app_with_models().await,
        "POST",
        "/api/v1/predict/solar",
        Some(json!({ "conditions": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
}

#[tokio::test]
async fn anomaly_detection() {
    let normal = json!({
        "voltage_v": 230, "current_a": 4, "power_factor": 0.95,
        "consumption_kwh": 0.9, "hour_of_day": 19
    });
    let (status, body) = send(app_with_models().await, "POST", "/api/v1/predict/anomaly", Some(normal)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_anomaly"], false);
    assert_eq!(body["data"]["label"], "normal");
    assert_eq!(body["data"]["model_id"], "meter_anomaly_v1");

    let surge = json!({
        "voltage_v": 275, "current_a": 4, "power_factor": 0.95,
        "consumption_kwh": 0.9, "hour_of_day": 3
    });
    let (status, body) = send(app_with_models().await, "POST", "/api/v1/predict/anomaly", Some(surge)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_anomaly"], true);
    assert_eq!(body["data"]["label"], "anomaly");
    assert!(body["data"]["probability"].as_f64().unwrap() > 0.99);
}

#[tokio::test]
async fn model_listing() {
    let app = app_with_models().await;
    let (status, body) = send(app.clone(), "GET", "/api/v1/models", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["total_count"], 2);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["anomaly_detection", "solar_forecast"]);

    let (status, body) = send(app.clone(), "GET", "/api/v1/models/solar_forecast", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["metadata"]["model_type"], "linear_regression");
    assert_eq!(body["data"]["metadata"]["training_samples"], 8760);

    let (status, body) = send(app, "GET", "/api/v1/models/price_lstm", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}
