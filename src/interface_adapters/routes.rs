use crate::interface_adapters::handlers::{
    advance_stage, create_simulation, delete_simulation, get_simulation, health, list_simulations,
    pause, reset, resume, set_accelerator, set_params, set_stage,
};
use crate::interface_adapters::net::{default_ws_handler, ws_handler};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(default_ws_handler))
        .route("/simulations", get(list_simulations).post(create_simulation))
        .route(
            "/simulations/{id}",
            get(get_simulation).delete(delete_simulation),
        )
        .route("/simulations/{id}/params", post(set_params))
        .route("/simulations/{id}/stage", post(set_stage))
        .route("/simulations/{id}/advance", post(advance_stage))
        .route("/simulations/{id}/reset", post(reset))
        .route("/simulations/{id}/accelerator", post(set_accelerator))
        .route("/simulations/{id}/pause", post(pause))
        .route("/simulations/{id}/resume", post(resume))
        .route("/simulations/{id}/ws", get(ws_handler))
        .with_state(state)
}
