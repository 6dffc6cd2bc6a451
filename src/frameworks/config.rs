use std::{env, time::Duration};

// Runtime/server constants (not biological tuning).

pub fn http_port() -> u16 {
    env::var("LESION_SIM_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3004)
}

pub fn tick_interval() -> Duration {
    let millis = env::var("SIM_TICK_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .unwrap_or(100);
    Duration::from_millis(millis)
}

// Simulated hours that pass on every tick.
pub fn hours_per_tick() -> f64 {
    env::var("SIM_HOURS_PER_TICK")
        .ok()
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|hours| hours.is_finite() && *hours > 0.0)
        .unwrap_or(1.0)
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const UPDATE_BROADCAST_CAPACITY: usize = 128;

// Pinned simulation created at startup.
pub const DEFAULT_SIMULATION_ID: &str = "default";
