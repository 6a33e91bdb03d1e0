use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    api::{calculator, predict},
    state::AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/appliances", get(calculator::list_appliances))
        .route("/consumption", post(calculator::consumption))
        .route("/bill", post(calculator::bill))
        .route("/sizing", post(calculator::sizing))
        .route("/estimate", post(calculator::estimate))
        .route("/predict/solar", post(predict::predict_solar))
        .route("/predict/anomaly", post(predict::predict_anomaly))
        .route("/models", get(predict::list_models))
        .route("/models/:model_id", get(predict::get_model))
        .with_state(state)
}
