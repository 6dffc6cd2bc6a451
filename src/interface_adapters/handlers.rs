use crate::domain::{ControlParameters, Stage};
use crate::interface_adapters::http::{ApiError, error_response, map_command_error, map_registry_error};
use crate::interface_adapters::net::spawn_simulation_serializer;
use crate::interface_adapters::protocol::{
    AcceleratorRequest, CreateSimulationRequest, CreateSimulationResponse, ParamsPatchDto,
    SimulationListResponse, SimulationStateResponse, SnapshotDto, StageRequest, StatusDto,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng;
use crate::use_cases::{SimCommand, SimulationHandle};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

// Liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_simulations(State(state): State<AppState>) -> Json<SimulationListResponse> {
    Json(SimulationListResponse {
        simulation_ids: state.registry.simulation_ids().await,
    })
}

// Handler for creating a new simulation with optional initial parameters.
pub async fn create_simulation(
    State(state): State<AppState>,
    Json(payload): Json<CreateSimulationRequest>,
) -> Result<(StatusCode, Json<CreateSimulationResponse>), ApiError> {
    let simulation_id = payload
        .simulation_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(rng::simulation_id);

    let params = payload
        .params
        .map(|patch| patch.apply_to(ControlParameters::default()))
        .unwrap_or_default();

    let (handle, update_rx) = state
        .registry
        .create_simulation(simulation_id.clone(), params, false)
        .await
        .map_err(map_registry_error)?;

    spawn_simulation_serializer(&handle, update_rx);

    Ok((
        StatusCode::CREATED,
        Json(CreateSimulationResponse { simulation_id }),
    ))
}

pub async fn delete_simulation(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .remove_simulation(&simulation_id)
        .await
        .map_err(map_registry_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// Latest published snapshot; never blocks on the simulation task.
pub async fn get_simulation(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> Result<Json<SimulationStateResponse>, ApiError> {
    let handle = lookup(&state, &simulation_id).await?;
    let snapshot = handle.latest_snapshot();

    Ok(Json(SimulationStateResponse {
        simulation_id,
        status: StatusDto::from(handle.status()).status,
        snapshot: SnapshotDto::from(&snapshot),
    }))
}

pub async fn set_params(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
    Json(payload): Json<ParamsPatchDto>,
) -> Result<StatusCode, ApiError> {
    let updates = payload.into_updates();
    if updates.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "no parameters given"));
    }
    dispatch(&state, &simulation_id, SimCommand::SetParams(updates)).await
}

pub async fn set_stage(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
    Json(payload): Json<StageRequest>,
) -> Result<StatusCode, ApiError> {
    let handle = lookup(&state, &simulation_id).await?;
    let stage = parse_stage(&payload.stage)?;
    send(&handle, SimCommand::SetStage(stage)).await
}

pub async fn advance_stage(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, &simulation_id, SimCommand::AdvanceStage).await
}

pub async fn reset(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, &simulation_id, SimCommand::Reset).await
}

pub async fn set_accelerator(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
    Json(payload): Json<AcceleratorRequest>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, &simulation_id, SimCommand::SetAccelerator(payload.value)).await
}

pub async fn pause(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, &simulation_id, SimCommand::Pause).await
}

pub async fn resume(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    dispatch(&state, &simulation_id, SimCommand::Resume).await
}

/// Parse a stage name, mapping unknown names to a 400.
fn parse_stage(name: &str) -> Result<Stage, ApiError> {
    Stage::parse_name(name).map_err(|err| error_response(StatusCode::BAD_REQUEST, err.to_string()))
}

async fn lookup(state: &AppState, simulation_id: &str) -> Result<SimulationHandle, ApiError> {
    state
        .registry
        .get_simulation(simulation_id)
        .await
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("simulation {simulation_id} not found")))
}

async fn dispatch(
    state: &AppState,
    simulation_id: &str,
    command: SimCommand,
) -> Result<StatusCode, ApiError> {
    let handle = lookup(state, simulation_id).await?;
    send(&handle, command).await
}

async fn send(handle: &SimulationHandle, command: SimCommand) -> Result<StatusCode, ApiError> {
    debug!(simulation_id = %handle.simulation_id, ?command, "queueing command");
    handle.send(command).await.map_err(map_command_error)?;
    Ok(StatusCode::ACCEPTED)
}
