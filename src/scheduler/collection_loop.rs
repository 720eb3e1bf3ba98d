//! The collection loop
//!
//! Bootstraps once (controller login, store ping, device enumeration) and then
//! repeats fetch → classify → publish → sleep until the process is stopped.
//!
//! The device list is captured at bootstrap and never refreshed: devices added
//! to the controller later are not picked up until a restart, and devices that
//! disappear are skipped with a warning on every cycle.
//!
//! Failures after bootstrap never stop the loop. A device whose stats cannot
//! be fetched is skipped for the cycle, and a failed write is logged and the
//! point is lost; nothing is retried or buffered.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::convert::Infallible;
use std::time::Duration;
use tokio::time::Instant;

use super::report::{CycleReport, SkippedDevice};
use super::timing::{plan_sleep, SleepPlan};
use crate::collectors::stats::StatExtractor;
use crate::collectors::unifi::{DeviceProbe, UnifiController};
use crate::config::AppConfig;
use crate::models::{Direction, MeasurementBatch, PORT_TAG};
use crate::storage::{InfluxWriter, MetricsSink};

/// Cadence and naming used by the loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSettings {
    /// Target wall-clock period of one cycle
    pub interval: Duration,
    /// Measurement name for the per-port rx/tx points
    pub port_measurement: String,
}

impl LoopSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            interval: config.interval(),
            port_measurement: config.store.measurement.clone(),
        }
    }
}

/// Owns the probe, the sink and the fixed device list for the process lifetime
pub struct CollectionLoop {
    probe: DeviceProbe,
    sink: MetricsSink,
    extractor: StatExtractor,
    devices: Vec<String>,
    settings: LoopSettings,
    cycle_count: u64,
}

impl CollectionLoop {
    /// Connects to the controller and the store described by `config`, then bootstraps
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        info!(
            "Attempting connection to UniFi controller at {} (site={})",
            config.controller.url, config.controller.site_id
        );
        let controller = UnifiController::connect(&config.controller)
            .await
            .context("UniFi controller connection failed")?;

        info!(
            "Attempting connection to InfluxDB at {}:{} (database={})",
            config.store.url, config.store.port, config.store.database
        );
        let writer = InfluxWriter::new(&config.store).context("Invalid InfluxDB settings")?;

        Self::bootstrap(
            DeviceProbe::new(Box::new(controller)),
            MetricsSink::new(Box::new(writer)),
            LoopSettings::from_config(config),
        )
        .await
    }

    /// Checks the store and enumerates devices once; an error here is fatal for the process
    pub async fn bootstrap(
        mut probe: DeviceProbe,
        sink: MetricsSink,
        settings: LoopSettings,
    ) -> Result<Self> {
        sink.check_connection()
            .await
            .context("InfluxDB connection failed")?;
        info!("InfluxDB answered ping");

        let devices = probe
            .list_devices()
            .await
            .context("Failed to get UniFi devices")?;

        if devices.is_empty() {
            warn!("Controller reported no devices - every cycle will publish nothing until restart");
        }
        info!(
            "UniFi devices ({}): {} (interval={}s, port_measurement={})",
            devices.len(),
            devices.join(", "),
            settings.interval.as_secs(),
            settings.port_measurement
        );

        Ok(Self {
            probe,
            sink,
            extractor: StatExtractor::new(),
            devices,
            settings,
            cycle_count: 0,
        })
    }

    /// Device names captured at bootstrap
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Runs one fetch → classify → publish pass over every device
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle_count += 1;
        let cycle = self.cycle_count;
        let started_at = Utc::now();
        let start = Instant::now();
        let writes_ok_before = self.sink.writes_ok();
        let writes_failed_before = self.sink.writes_failed();

        debug!(
            "Starting cycle #{} at {} over {} devices",
            cycle,
            started_at.format("%H:%M:%S%.3f"),
            self.devices.len()
        );

        let mut batches = Vec::with_capacity(self.devices.len());
        let mut skipped = Vec::new();

        for device in &self.devices {
            let raw = match self.probe.get_stats(device).await {
                Ok(raw) => raw,
                Err(probe_error) => {
                    warn!(
                        "Cycle #{}: skipping device '{}' ({}): {}",
                        cycle,
                        device,
                        probe_error.kind(),
                        probe_error
                    );
                    skipped.push(SkippedDevice {
                        device: device.clone(),
                        kind: probe_error.kind(),
                        reason: probe_error.to_string(),
                    });
                    continue;
                }
            };

            let classified = self.extractor.classify(&raw);
            debug!(
                "Cycle #{}: device '{}' has {} raw stats, {} numeric (general={}, rx_ports={}, tx_ports={})",
                cycle,
                device,
                raw.len(),
                classified.len(),
                classified.general.len(),
                classified.rx.len(),
                classified.tx.len()
            );

            let batch =
                MeasurementBatch::from_classified(device, &classified, &self.settings.port_measurement);
            info!("Cycle #{}: pushing '{}' data to InfluxDB", cycle, device);
            publish_batch(&mut self.sink, cycle, &batch).await;
            batches.push(batch);
        }

        let elapsed = start.elapsed();
        let report = CycleReport {
            cycle,
            started_at,
            finished_at: Utc::now(),
            elapsed,
            batches,
            skipped,
            writes_ok: self.sink.writes_ok() - writes_ok_before,
            writes_failed: self.sink.writes_failed() - writes_failed_before,
        };

        let summary = format!(
            "Cycle #{} finished in {:.3}s: {}/{} devices polled, {} skipped, {} writes ok, {} failed",
            cycle,
            elapsed.as_secs_f64(),
            report.devices_polled(),
            self.devices.len(),
            report.devices_skipped(),
            report.writes_ok,
            report.writes_failed
        );
        if report.writes_failed > 0 || report.devices_skipped() > 0 {
            warn!("{summary}");
        } else {
            info!("{summary}");
        }

        report
    }

    /// Runs cycles forever, sleeping out the remainder of each interval
    pub async fn run(&mut self) -> Infallible {
        info!(
            "Collection loop running every {}s over {} devices",
            self.settings.interval.as_secs(),
            self.devices.len()
        );

        loop {
            let report = self.run_cycle().await;

            match plan_sleep(self.settings.interval, report.elapsed) {
                SleepPlan::Sleep(remaining) => {
                    debug!(
                        "Cycle #{}: sleeping for {:.3}s",
                        report.cycle,
                        remaining.as_secs_f64()
                    );
                    tokio::time::sleep(remaining).await;
                }
                SleepPlan::Overrun { overrun } => {
                    warn!(
                        "Cycle #{} took {:.3}s, {:.3}s longer than the {}s interval - starting the next cycle immediately",
                        report.cycle,
                        report.elapsed.as_secs_f64(),
                        overrun.as_secs_f64(),
                        self.settings.interval.as_secs()
                    );
                }
            }
        }
    }
}

/// Writes a device's measurements; every write is attempted regardless of earlier failures
async fn publish_batch(sink: &mut MetricsSink, cycle: u64, batch: &MeasurementBatch) {
    if batch.general.has_no_fields() {
        debug!(
            "Cycle #{}: device '{}' has no general numeric stats - skipping general write",
            cycle, batch.device
        );
    } else if let Err(sink_error) = sink.write(&batch.general).await {
        error!(
            "Cycle #{}: general write for device '{}' failed: {}",
            cycle, batch.device, sink_error
        );
    }

    for (direction, measurements) in [(Direction::Rx, &batch.rx), (Direction::Tx, &batch.tx)] {
        for measurement in measurements {
            if let Err(sink_error) = sink.write(measurement).await {
                error!(
                    "Cycle #{}: {} write for device '{}' port '{}' failed: {}",
                    cycle,
                    direction,
                    batch.device,
                    measurement.tag(PORT_TAG).unwrap_or("unknown"),
                    sink_error
                );
            }
        }
    }
}
