use super::types::{SimCommand, SimStatus, SimUpdate};
use crate::domain::{LesionEngine, LesionSnapshot, StageChange};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{Notify, broadcast, mpsc, watch};
use tracing::{debug, info};

/// Real-time pacing and simulated tick length for one simulation.
#[derive(Debug, Clone, Copy)]
pub struct TickSettings {
    /// Wall-clock time between ticks.
    pub tick_interval: Duration,
    /// Simulated hours passed to `LesionEngine::update` per tick.
    pub hours_per_tick: f64,
}

/// Authoritative loop for one lesion.
///
/// The task is the only owner of the engine. Commands queued since the last
/// tick are applied first, then the engine advances one tick unless paused.
pub async fn simulation_task(
    mut engine: LesionEngine,
    mut input_rx: mpsc::Receiver<SimCommand>,
    update_tx: broadcast::Sender<SimUpdate>,
    latest_tx: watch::Sender<LesionSnapshot>,
    status_tx: watch::Sender<SimStatus>,
    settings: TickSettings,
    shutdown: Arc<Notify>,
) {
    let mut tick: u64 = 0;
    let mut paused = false;
    let _ = status_tx.send(SimStatus::Running);

    let mut interval = tokio::time::interval(settings.tick_interval);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                // Exit cleanly when the simulation is removed.
                break;
            }
            _ = interval.tick() => {}
        }

        let stage_before = engine.stage();
        let mut applied = 0usize;
        let mut inputs_closed = false;

        loop {
            match input_rx.try_recv() {
                Ok(command) => {
                    applied += 1;
                    apply_command(&mut engine, command, &mut paused, &status_tx);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    inputs_closed = true;
                    break;
                }
            }
        }

        if inputs_closed {
            info!(tick, "command channel closed; simulation stopping");
            break;
        }

        if paused {
            // Nothing changed; keep the last published snapshot.
            if applied == 0 {
                continue;
            }
        } else {
            engine.update(settings.hours_per_tick);
            tick += 1;
        }

        let stage_after = engine.stage();
        let stage_change = (stage_before != stage_after).then_some(StageChange {
            from: stage_before,
            to: stage_after,
        });

        let snapshot = engine.snapshot();
        let _ = latest_tx.send(snapshot.clone());
        let _ = update_tx.send(SimUpdate {
            tick,
            snapshot,
            stage_change,
        });
    }

    let _ = status_tx.send(SimStatus::Stopped);
    info!(tick, stage = %engine.stage(), "simulation stopped");
}

fn apply_command(
    engine: &mut LesionEngine,
    command: SimCommand,
    paused: &mut bool,
    status_tx: &watch::Sender<SimStatus>,
) {
    debug!(?command, "applying command");
    match command {
        SimCommand::SetParams(values) => {
            for (name, value) in values {
                engine.set_param(name, value);
            }
        }
        SimCommand::SetStage(stage) => engine.set_stage(stage),
        SimCommand::AdvanceStage => {
            engine.advance_to_next_stage();
        }
        SimCommand::Reset => engine.reset(),
        SimCommand::SetAccelerator(value) => {
            engine.set_progression_accelerator(value);
        }
        SimCommand::Pause => {
            if !*paused {
                *paused = true;
                let _ = status_tx.send(SimStatus::Paused);
                info!(simulation_time = engine.simulation_time(), "simulation paused");
            }
        }
        SimCommand::Resume => {
            if *paused {
                *paused = false;
                let _ = status_tx.send(SimStatus::Running);
                info!(simulation_time = engine.simulation_time(), "simulation resumed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ParamName, Stage};

    struct Harness {
        input_tx: mpsc::Sender<SimCommand>,
        update_rx: broadcast::Receiver<SimUpdate>,
        latest_rx: watch::Receiver<LesionSnapshot>,
        status_rx: watch::Receiver<SimStatus>,
        shutdown: Arc<Notify>,
    }

    fn spawn_simulation(hours_per_tick: f64) -> Harness {
        let engine = LesionEngine::default();
        let (input_tx, input_rx) = mpsc::channel(16);
        let (update_tx, update_rx) = broadcast::channel(1024);
        let (latest_tx, latest_rx) = watch::channel(engine.snapshot());
        let (status_tx, status_rx) = watch::channel(SimStatus::Stopped);
        let shutdown = Arc::new(Notify::new());

        tokio::spawn(simulation_task(
            engine,
            input_rx,
            update_tx,
            latest_tx,
            status_tx,
            TickSettings {
                tick_interval: Duration::from_millis(1),
                hours_per_tick,
            },
            shutdown.clone(),
        ));

        Harness {
            input_tx,
            update_rx,
            latest_rx,
            status_rx,
            shutdown,
        }
    }

    async fn next_update(rx: &mut broadcast::Receiver<SimUpdate>) -> SimUpdate {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("expected an update before timeout")
            .expect("expected update channel to stay open")
    }

    async fn wait_for_status(rx: &mut watch::Receiver<SimStatus>, expected: SimStatus) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while *rx.borrow_and_update() != expected {
                rx.changed().await.expect("status channel open");
            }
        })
        .await
        .expect("expected status before timeout");
    }

    #[tokio::test]
    async fn when_running_then_each_update_advances_tick_and_time() {
        let mut h = spawn_simulation(0.5);

        let first = next_update(&mut h.update_rx).await;
        let second = next_update(&mut h.update_rx).await;

        assert_eq!(second.tick, first.tick + 1);
        assert!((second.snapshot.simulation_time - first.snapshot.simulation_time - 0.5).abs() < 1e-9);
        assert_eq!(*h.status_rx.borrow(), SimStatus::Running);
    }

    #[tokio::test]
    async fn when_params_are_queued_then_next_snapshot_reflects_them_clamped() {
        let mut h = spawn_simulation(1.0);
        next_update(&mut h.update_rx).await;

        h.input_tx
            .send(SimCommand::SetParams(vec![
                (ParamName::Medication, 1500),
                (ParamName::Humidity, 700),
            ]))
            .await
            .expect("send params");

        let update = loop {
            let update = next_update(&mut h.update_rx).await;
            if update.snapshot.params.medication != 0 {
                break update;
            }
        };

        assert_eq!(update.snapshot.params.medication, 1000);
        assert_eq!(update.snapshot.params.humidity, 700);
        // Rates are derived in the same tick that first sees the new values.
        assert!((update.snapshot.rates.bacteria_growth_rate - 0.025).abs() < 1e-12);
    }

    #[tokio::test]
    async fn when_stage_is_set_then_update_reports_the_stage_change() {
        let mut h = spawn_simulation(0.0);
        next_update(&mut h.update_rx).await;

        h.input_tx
            .send(SimCommand::SetStage(Stage::Pustule))
            .await
            .expect("send stage");

        let update = loop {
            let update = next_update(&mut h.update_rx).await;
            if update.stage_change.is_some() {
                break update;
            }
        };

        let change = update.stage_change.expect("stage change");
        assert_eq!(change.from, Stage::Incubation);
        assert_eq!(change.to, Stage::Pustule);
        assert_eq!(update.snapshot.stage, Stage::Pustule);
        assert_eq!(h.latest_rx.borrow().stage, Stage::Pustule);
    }

    #[tokio::test]
    async fn when_paused_then_time_stops_until_resumed() {
        let mut h = spawn_simulation(1.0);
        next_update(&mut h.update_rx).await;

        h.input_tx.send(SimCommand::Pause).await.expect("send pause");
        wait_for_status(&mut h.status_rx, SimStatus::Paused).await;

        let paused_time = h.latest_rx.borrow().simulation_time;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(h.latest_rx.borrow().simulation_time, paused_time);

        h.input_tx.send(SimCommand::Resume).await.expect("send resume");
        wait_for_status(&mut h.status_rx, SimStatus::Running).await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(h.latest_rx.borrow().simulation_time > paused_time);
    }

    #[tokio::test]
    async fn when_command_arrives_while_paused_then_snapshot_is_still_published() {
        let mut h = spawn_simulation(1.0);
        next_update(&mut h.update_rx).await;
        h.input_tx.send(SimCommand::Pause).await.expect("send pause");
        wait_for_status(&mut h.status_rx, SimStatus::Paused).await;

        h.input_tx.send(SimCommand::Reset).await.expect("send reset");

        let update = loop {
            let update = next_update(&mut h.update_rx).await;
            if update.snapshot.simulation_time == 0.0 {
                break update;
            }
        };
        assert_eq!(update.snapshot.stage, Stage::Incubation);
    }

    #[tokio::test]
    async fn when_shutdown_is_notified_then_status_becomes_stopped() {
        let mut h = spawn_simulation(1.0);
        next_update(&mut h.update_rx).await;

        h.shutdown.notify_one();

        wait_for_status(&mut h.status_rx, SimStatus::Stopped).await;
    }
}
