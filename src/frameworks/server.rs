// Framework bootstrap for the lesion simulation server.

use crate::domain::ControlParameters;
use crate::frameworks::config;
use crate::interface_adapters::net::spawn_simulation_serializer;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{SimulationRegistry, SimulationSettings};

use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state().await?;
    let app = app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

async fn build_state() -> Result<AppState> {
    let settings = SimulationSettings {
        input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
        update_broadcast_capacity: config::UPDATE_BROADCAST_CAPACITY,
        tick_interval: config::tick_interval(),
        hours_per_tick: config::hours_per_tick(),
    };
    tracing::debug!(
        tick_interval_ms = settings.tick_interval.as_millis(),
        hours_per_tick = settings.hours_per_tick,
        "simulation settings"
    );

    // Owns the set of active simulation tasks.
    let registry = Arc::new(SimulationRegistry::new(settings));

    // Pinned so it always exists for clients that do not create their own.
    let (default_simulation, update_rx) = registry
        .create_simulation(
            config::DEFAULT_SIMULATION_ID.to_string(),
            ControlParameters::default(),
            true,
        )
        .await
        .map_err(|e| std::io::Error::other(format!("failed to create default simulation: {e}")))?;
    spawn_simulation_serializer(&default_simulation, update_rx);

    Ok(AppState {
        registry,
        default_simulation_id: Arc::from(config::DEFAULT_SIMULATION_ID),
    })
}
