//! # homesimd — homesim daemon
//!
//! Composition root that wires devices, decorators and listeners together and
//! runs the simulation.
//!
//! ## Responsibilities
//! - Load configuration (`homesim.toml`, env vars)
//! - Initialise `tracing` with the configured filter
//! - Build the event router and subscribe the event log and notification service
//! - Create devices through the factories and stack their decorators
//! - Play the demonstration scenario when no devices are configured
//! - Run the schedule runner until SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod home;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use homesim_domain::entity::{StateMap, state_map};
use homesim_domain::event::{Event, EventType};
use homesim_domain::time;

use crate::config::Config;
use crate::home::Home;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("unable to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let home = Home::build(&config)?;
    tracing::debug!(subscribers = ?home.router.subscriber_count(), "router ready");
    if config.is_demo() {
        run_demo(&home)?;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = tokio::spawn(home.schedule_runner().run(config.tick_period(), shutdown_rx));

    tracing::info!("homesimd running, press ctrl-c to stop");
    tokio::signal::ctrl_c()
        .await
        .context("unable to listen for shutdown signal")?;

    tracing::info!("shutting down");
    let _ = shutdown_tx.send(true);
    runner.await?;
    Ok(())
}

/// Walk through the demo devices: a timed light, a thermostat keeping
/// history, a lock publishing its changes and a simulated motion event.
fn run_demo(home: &Home) -> anyhow::Result<()> {
    let mut devices = home.lock_devices();

    let light = "light-living-1";
    devices.update_state(
        light,
        &state_map([("power", true.into()), ("brightness", 80.into())]),
    )?;
    let off_at = time::now() + chrono::Duration::hours(2);
    devices.schedule(light, off_at, state_map([("power", false.into())]))?;
    log_state(light, &devices.get_state(light)?);

    let thermostat = "therm-bed-1";
    devices.update_state(
        thermostat,
        &state_map([("target_temperature", 22.5.into()), ("mode", "heat".into())]),
    )?;
    log_state(thermostat, &devices.get_state(thermostat)?);
    for record in devices.history(thermostat)? {
        tracing::info!(
            device = thermostat,
            at = %record.recorded_at.to_rfc3339(),
            changes = %serde_json::to_string(&record.changes)?,
            "history"
        );
    }

    let lock = "lock-front-1";
    devices.update_state(
        lock,
        &state_map([("locked", false.into()), ("last_user", "user_123".into())]),
    )?;
    log_state(lock, &devices.get_state(lock)?);

    devices.inject_event(
        Event::builder(EventType::MotionDetected, "sensor-hall-1")
            .field("location", "Hallway")
            .field("confidence", 0.95)
            .build(),
    )?;

    let records = home.event_log.records();
    for record in records.iter().rev().take(2).rev() {
        tracing::info!(
            at = %record.timestamp,
            event_type = %record.event_type,
            source = %record.source,
            "event log"
        );
    }
    tracing::info!(
        notifications = home.notifications.history().len(),
        "demo scenario completed"
    );
    Ok(())
}

fn log_state(device: &str, state: &StateMap) {
    match serde_json::to_string(state) {
        Ok(state) => tracing::info!(device, %state, "device state"),
        Err(err) => tracing::warn!(device, error = %err, "unable to render state"),
    }
}
