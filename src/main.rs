//! # EMS Bridge
//!
//! Host-side bridge between the energy management rule engine and a
//! real-time plant simulator, speaking the fixed 13-byte frame protocol
//! over a serial link.
//!
//! Three long-lived tasks share the frame queues and the plant state:
//!
//! - the **transport task** runs one protocol turn per tick (send or
//!   filler, duplex exchange, dedup + CRC-gated admission, head
//!   retirement, receive drain) and applies the delivered values to the
//!   plant state,
//! - the **producer task** posts the latency probe and, once the simulator
//!   has left its init mode, the planned power setpoints,
//! - the **display task** logs periodic plant-state snapshots and feeds
//!   the JSONL telemetry writer.
//!
//! Ctrl+C shuts the bridge down.

use std::sync::PoisonError;
use std::time::Duration;

use anyhow::Result;
use tokio::time::interval;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use ems_bridge::config::Config;
use ems_bridge::ems::{self, PlantState};
use ems_bridge::link::{LinkDriver, SerialExchange};
use ems_bridge::queue::FrameQueue;
use ems_bridge::sgp::crc::CrcEngine;
use ems_bridge::telemetry::TelemetryLogger;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(std::env::args().nth(1))?;

    // Console logging always; file logging when configured. The appender
    // guard must stay alive for the process lifetime.
    let (file_layer, _guard) = if config.logging.file_enabled {
        let appender = tracing_appender::rolling::daily(&config.logging.dir, "ems-bridge.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    info!("EMS Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    // A bad CRC configuration is fatal, never defaulted
    let crc = CrcEngine::new(config.crc.to_crc_config())?;

    let device_paths: Vec<&str> = config.link.device_paths.iter().map(String::as_str).collect();
    let exchange = SerialExchange::open_with_paths(&device_paths, config.link.baud_rate)?;
    info!("Simulator link opened at: {}", exchange.device_path());

    let transmit = FrameQueue::shared(config.queue.transmit_capacity);
    let receive = FrameQueue::shared(config.queue.receive_capacity);
    let state = PlantState::shared(config.ems.strategy);

    info!(
        "Starting transport tick every {}ms, producer every {}ms ({:?} strategy)",
        config.link.tick_period_ms, config.ems.producer_period_ms, config.ems.strategy
    );

    // Transport task: protocol turns and delivery into the plant state
    let mut driver = LinkDriver::new(exchange, crc.clone(), transmit.clone(), receive.clone());
    let link_state = state.clone();
    let tick_period = Duration::from_millis(config.link.tick_period_ms);
    let transport_task = tokio::spawn(async move {
        let mut tick = interval(tick_period);
        loop {
            tick.tick().await;
            let deliveries = driver.run_tick().await;
            if !deliveries.is_empty() {
                let mut state = link_state.lock().unwrap_or_else(PoisonError::into_inner);
                for (identifier, value) in deliveries {
                    state.apply(identifier, value);
                }
            }
        }
    });

    // Producer task: latency probe and setpoint posts
    let producer_state = state.clone();
    let producer_transmit = transmit.clone();
    let producer_crc = crc.clone();
    let producer_period = Duration::from_millis(config.ems.producer_period_ms);
    let producer_task = tokio::spawn(async move {
        let mut cycle = interval(producer_period);
        let mut cycle_counter: u32 = 0;
        loop {
            cycle.tick().await;
            cycle_counter = cycle_counter.wrapping_add(1);
            ems::produce_setpoints(&producer_state, &producer_transmit, &producer_crc, cycle_counter);
        }
    });

    // Display task: periodic snapshot log and JSONL telemetry
    let display_state = state.clone();
    let snapshot_period = Duration::from_millis(config.telemetry.snapshot_interval_ms);
    let mut telemetry = if config.telemetry.enabled {
        match TelemetryLogger::new(
            &config.telemetry.log_dir,
            config.telemetry.max_records_per_file,
            config.telemetry.max_files_to_keep,
        ) {
            Ok(logger) => Some(logger),
            Err(e) => {
                warn!("Telemetry disabled, cannot open {}: {}", config.telemetry.log_dir, e);
                None
            }
        }
    } else {
        None
    };
    let display_task = tokio::spawn(async move {
        let mut tick = interval(snapshot_period);
        loop {
            tick.tick().await;
            let snapshot = display_state.lock().unwrap_or_else(PoisonError::into_inner).clone();
            info!(
                "{} | DG {}/{} kW | battery {:.0}/{:.0} kW | SOC {:.1}/{:.1}% | probe {}",
                snapshot.mode.label(),
                snapshot.generator_power[0],
                snapshot.generator_power[1],
                snapshot.battery_power[0],
                snapshot.battery_power[1],
                snapshot.battery_soc[0],
                snapshot.battery_soc[1],
                snapshot.latency_counter,
            );
            if let Some(logger) = telemetry.as_mut() {
                if let Err(e) = logger.log_snapshot(&snapshot) {
                    warn!("Telemetry write failed: {}", e);
                }
            }
        }
    });

    info!("Press Ctrl+C to exit");
    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down...");

    transport_task.abort();
    producer_task.abort();
    display_task.abort();

    Ok(())
}
