use crate::domain::Stage;
use crate::interface_adapters::protocol::{
    ClientMessage, ServerMessage, StageChangeDto, StatusDto, TickSnapshotDto,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::rand_id;
use crate::use_cases::{SimCommand, SimStatus, SimUpdate, SimulationHandle};

use axum::{
    Error,
    extract::{
        Path, Query, State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures::SinkExt;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    UpdatesClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    // Simulation to stream; defaults to the pinned simulation.
    #[serde(default)]
    simulation_id: Option<String>,
}

fn encode(msg: &ServerMessage) -> Option<Utf8Bytes> {
    match serde_json::to_string(msg) {
        Ok(txt) => Some(Utf8Bytes::from(txt)),
        Err(e) => {
            error!(error = ?e, "failed to serialize server message");
            None
        }
    }
}

pub async fn simulation_update_serializer(
    mut update_rx: broadcast::Receiver<SimUpdate>,
    update_bytes_tx: broadcast::Sender<Utf8Bytes>,
    update_latest_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each update once and broadcast the shared bytes.
    loop {
        match update_rx.recv().await {
            Ok(update) => {
                if let Some(change) = update.stage_change {
                    let msg = ServerMessage::StageChanged(StageChangeDto::new(update.tick, change));
                    if let Some(bytes) = encode(&msg) {
                        let _ = update_bytes_tx.send(bytes);
                    }
                }

                let msg = ServerMessage::Snapshot(TickSnapshotDto::from(&update));
                let Some(bytes) = encode(&msg) else {
                    continue;
                };
                // Store the latest snapshot for new clients and lag recovery.
                let _ = update_latest_tx.send(bytes.clone());
                let _ = update_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "serializer lagged; skipping to latest update");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

/// `update_rx` must be the receiver handed out by the registry, which exists
/// before the tick task starts, so the first tick is not lost.
pub fn spawn_simulation_serializer(handle: &SimulationHandle, update_rx: broadcast::Receiver<SimUpdate>) {
    tokio::spawn(simulation_update_serializer(
        update_rx,
        handle.update_bytes_tx.clone(),
        handle.update_latest_tx.clone(),
    ));
}

// Stream for the simulation named in the path.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> impl IntoResponse {
    upgrade(ws, &state, &simulation_id).await
}

// `/ws?simulation_id=...`, falling back to the pinned simulation.
pub async fn default_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    let simulation_id = query
        .simulation_id
        .unwrap_or_else(|| state.default_simulation_id.to_string());
    upgrade(ws, &state, &simulation_id).await
}

async fn upgrade(ws: WebSocketUpgrade, state: &AppState, simulation_id: &str) -> axum::response::Response {
    let handle = match state.registry.get_simulation(simulation_id).await {
        Some(handle) => handle,
        None => return StatusCode::NOT_FOUND.into_response(),
    };

    ws.on_upgrade(|socket| handle_socket(socket, handle))
}

struct ConnCtx {
    input_tx: mpsc::Sender<SimCommand>,
    update_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    update_latest_rx: watch::Receiver<Utf8Bytes>,
    status_rx: watch::Receiver<SimStatus>,

    lag_recovery_count: u64,
    msgs_in: u64,
    msgs_out: u64,
    invalid_json: u32,

    last_lag_log: Instant,
    last_invalid_log: Instant,
    last_input_full_log: Instant,

    close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn handle_socket(socket: WebSocket, handle: SimulationHandle) {
    // Separate connection id for correlating logs of one client.
    let conn_id = rand_id();
    let span = info_span!("conn", conn_id, simulation_id = %handle.simulation_id);
    serve_socket(socket, handle).instrument(span).await;
}

async fn serve_socket(mut socket: WebSocket, handle: SimulationHandle) {
    // Subscribe before any await so no update is missed.
    let mut ctx = bootstrap_connection(&handle);
    drop(handle);

    if let Err(e) = send_initial_state(&mut socket, &mut ctx).await {
        error!(error = ?e, "failed to bootstrap connection");
        let _ = socket.close().await;
        return;
    }

    info!("client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }

    info!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        invalid_json = ctx.invalid_json,
        lag_recoveries = ctx.lag_recovery_count,
        "client disconnected"
    );
}

fn bootstrap_connection(handle: &SimulationHandle) -> ConnCtx {
    let now = Instant::now() - LOG_THROTTLE;
    ConnCtx {
        input_tx: handle.input_tx.clone(),
        update_bytes_rx: handle.update_bytes_tx.subscribe(),
        update_latest_rx: handle.update_latest_tx.subscribe(),
        status_rx: handle.status_tx.subscribe(),
        lag_recovery_count: 0,
        msgs_in: 0,
        msgs_out: 0,
        invalid_json: 0,
        last_lag_log: now,
        last_invalid_log: now,
        last_input_full_log: now,
        close_frame: None,
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    socket.send(Message::Text(txt.into())).await?;
    Ok(())
}

async fn send_initial_state(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    // Clone as soon as we borrow so no lock is held across the await.
    let status = *ctx.status_rx.borrow_and_update();
    send_message(socket, &ServerMessage::Status(StatusDto::from(status))).await?;
    ctx.msgs_out += 1;

    let latest = ctx.update_latest_rx.borrow().clone();
    if !latest.is_empty() {
        socket.send(Message::Text(latest)).await?;
        ctx.msgs_out += 1;
    }
    Ok(())
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, ctx) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            update = ctx.update_bytes_rx.recv() => {
                match update {
                    Ok(bytes) => forward_bytes(socket, ctx, bytes).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(&mut ctx.last_lag_log) {
                            warn!(missed = n, "updates lagged; sending latest snapshot");
                        }

                        // Resync strategy: send the latest snapshot.
                        let latest = ctx.update_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            ctx.lag_recovery_count += 1;
                            forward_bytes(socket, ctx, latest).await
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::UpdatesClosed);
                        true
                    }
                }
            }

            changed = ctx.status_rx.changed() => {
                match changed {
                    Ok(()) => {
                        let status = *ctx.status_rx.borrow_and_update();
                        let msg = ServerMessage::Status(StatusDto::from(status));
                        match send_message(socket, &msg).await {
                            Ok(()) => {
                                ctx.msgs_out += 1;
                                if status == SimStatus::Stopped {
                                    ctx.close_frame = Some(CloseFrame {
                                        code: close_code::AWAY,
                                        reason: "simulation stopped".into(),
                                    });
                                    true
                                } else {
                                    false
                                }
                            }
                            Err(e) => {
                                debug!(error = ?e, "failed to send status");
                                true
                            }
                        }
                    }
                    // Status sender is gone: the simulation was removed.
                    Err(_) => true,
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn forward_bytes(socket: &mut WebSocket, ctx: &mut ConnCtx, bytes: Utf8Bytes) -> bool {
    match socket.send(Message::Text(bytes)).await {
        Ok(()) => {
            ctx.msgs_out += 1;
            false
        }
        Err(e) => {
            debug!(error = %e, "failed to forward update; disconnecting");
            true
        }
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(Message::Text(text))) => {
            ctx.msgs_in += 1;
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => match into_command(msg) {
                    Some(command) => queue_command(ctx, command),
                    // Stage::parse_name already logged the rejection.
                    None => Ok(LoopControl::Continue),
                },
                Err(parse_err) => {
                    ctx.invalid_json += 1;
                    if should_log(&mut ctx.last_invalid_log) {
                        warn!(bytes = text.len(), error = %parse_err, "failed to parse client message");
                    }

                    if ctx.invalid_json > MAX_INVALID_JSON {
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: "too many invalid messages".into(),
                        });
                        return Ok(LoopControl::Disconnect);
                    }
                    Ok(LoopControl::Continue)
                }
            }
        }
        Some(Ok(Message::Binary(_))) => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            Ok(LoopControl::Disconnect)
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => Ok(LoopControl::Continue),
        Some(Ok(Message::Close(_))) => Ok(LoopControl::Disconnect),
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

/// Maps a client message to a command; `None` for an unknown stage name.
fn into_command(msg: ClientMessage) -> Option<SimCommand> {
    let command = match msg {
        ClientMessage::SetParams(patch) => SimCommand::SetParams(patch.into_updates()),
        ClientMessage::SetStage(request) => SimCommand::SetStage(Stage::parse_name(&request.stage).ok()?),
        ClientMessage::Advance => SimCommand::AdvanceStage,
        ClientMessage::Reset => SimCommand::Reset,
        ClientMessage::SetAccelerator(request) => SimCommand::SetAccelerator(request.value),
        ClientMessage::Pause => SimCommand::Pause,
        ClientMessage::Resume => SimCommand::Resume,
    };
    Some(command)
}

fn queue_command(ctx: &mut ConnCtx, command: SimCommand) -> Result<LoopControl, NetError> {
    match ctx.input_tx.try_send(command) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(TrySendError::Full(_)) => {
            if should_log(&mut ctx.last_input_full_log) {
                warn!("command channel full; dropping command");
            }
            Ok(LoopControl::Continue)
        }
        Err(TrySendError::Closed(_)) => Err(NetError::InputClosed),
    }
}
