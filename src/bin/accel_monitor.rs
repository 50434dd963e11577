//! Stream acceleration change events from a Phidget accelerometer.
//!
//! ```text
//! accel_monitor --serial 12345 --trigger 0.05 --trigger 0.05 --trigger 0.1
//! accel_monitor --simulate --duration-secs 10
//! ```
//!
//! Settings come from `phidget_accel.toml` (or `--config`), then `PHIDGET_*`
//! environment variables, then the command line.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use phidget_accel::{logging, AccelConfig, Phidget, PhidgetDriver};
use tokio::runtime::Runtime;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "accel_monitor", about = "Print acceleration changes from a Phidget accelerometer")]
struct Cli {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial number of the device to open (default: any)
    #[arg(short, long)]
    serial: Option<i32>,

    /// Attachment timeout in milliseconds, 0 waits forever
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(short, long)]
    duration_secs: Option<u64>,

    /// Change trigger in g, one per axis in axis order
    #[arg(short, long = "trigger")]
    triggers: Vec<f64>,

    /// Use a simulated 3-axis board instead of hardware
    #[cfg(feature = "mock")]
    #[arg(long)]
    simulate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AccelConfig::load_from(path),
        None => AccelConfig::load(),
    }
    .context("loading configuration")?;
    if cli.serial.is_some() {
        config.serial = cli.serial;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.attach_timeout_ms = timeout_ms;
    }
    if !cli.triggers.is_empty() {
        config.change_triggers = cli.triggers.clone();
    }
    config.validate()?;

    logging::init_tracing(&config.log_level);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;

    let duration = cli
        .duration_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    #[cfg(feature = "mock")]
    if cli.simulate {
        return simulate(&runtime, &config, duration).map(|_| ());
    }

    #[cfg(feature = "phidget_hardware")]
    let result = monitor(
        &runtime,
        Arc::new(phidget_accel::NativeDriver::new()),
        &config,
        duration,
        || (),
    )
    .map(|_| ());
    #[cfg(not(feature = "phidget_hardware"))]
    let result = Err(anyhow::anyhow!(
        "built without the `phidget_hardware` feature; use --simulate or rebuild with hardware support"
    ));
    result
}

/// Open, attach, and print events until the deadline or Ctrl-C. Returns the
/// number of events received.
///
/// `start_feed` runs once the device is attached; whatever it returns is
/// dropped before the device is closed, on every exit path.
fn monitor<D, F, G>(
    runtime: &Runtime,
    driver: Arc<D>,
    config: &AccelConfig,
    duration: Option<Duration>,
    start_feed: F,
) -> Result<u64>
where
    D: PhidgetDriver,
    F: FnOnce() -> G,
{
    let device = Phidget::create(driver).context("creating accelerometer object")?;
    device.open(config.serial).context("opening accelerometer")?;
    info!(
        timeout_ms = config.attach_timeout_ms,
        "Waiting for accelerometer to attach"
    );
    device
        .wait_for_attachment(config.attach_timeout())
        .context("waiting for accelerometer")?;
    // Declared after `device`, so it is dropped first on early returns.
    let feed = start_feed();

    println!(
        "{} (serial {}, version {})",
        device.device_name()?,
        device.serial_number()?,
        device.device_version()?
    );

    let accel = device.accelerometer();
    accel.apply_config(config)?;
    for (axis, (min, max)) in accel.axis_ranges()?.into_iter().enumerate() {
        println!(
            "  axis {}: {:+.3} g .. {:+.3} g, trigger {:.3} g",
            axis,
            min,
            max,
            accel.accel_change_trigger(axis)?
        );
    }

    let mut events = accel.subscribe(config.channel_capacity)?;
    let received = runtime.block_on(async {
        let deadline = async {
            match duration {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut received: u64 = 0;
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                signal = &mut ctrl_c => {
                    if let Err(e) = signal {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                    }
                    break;
                }
                change = events.recv() => match change {
                    Some(change) => {
                        received += 1;
                        println!("axis {} -> {:+.4} g", change.axis, change.acceleration);
                    }
                    None => break,
                },
            }
        }
        received
    });

    drop(feed);
    accel.clear_on_acceleration_change_handler();
    device.close().context("closing accelerometer")?;
    info!(received, "Monitor stopped");
    Ok(received)
}

#[cfg(feature = "mock")]
fn simulate(runtime: &Runtime, config: &AccelConfig, duration: Option<Duration>) -> Result<u64> {
    use phidget_accel::{MockBoard, MockDriver};

    let driver = Arc::new(MockDriver::new(MockBoard::three_axis()));
    let feed_driver = driver.clone();
    monitor(runtime, driver, config, duration, move || {
        SampleGenerator::start(feed_driver)
    })
}

/// Feeds the simulated board a slow sine on every axis, plus gravity on z
/// and a little noise. Stops and joins its thread on drop.
#[cfg(feature = "mock")]
struct SampleGenerator {
    stop: Arc<std::sync::atomic::AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(feature = "mock")]
impl SampleGenerator {
    fn start(driver: Arc<phidget_accel::MockDriver>) -> Self {
        use std::f64::consts::{FRAC_PI_2, TAU};
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::Instant;

        use rand::Rng;

        let stop = Arc::new(AtomicBool::new(false));
        let stopped = stop.clone();
        let thread = std::thread::spawn(move || {
            let mut rng = rand::thread_rng();
            let axes = driver.board().axes.len();
            let start = Instant::now();
            while !stopped.load(Ordering::Relaxed) {
                let t = start.elapsed().as_secs_f64();
                for axis in 0..axes {
                    let gravity = if axis == 2 { 1.0 } else { 0.0 };
                    let phase = axis as f64 * FRAC_PI_2;
                    let value = gravity
                        + 0.5 * (TAU * 0.5 * t + phase).sin()
                        + rng.gen_range(-0.01..0.01);
                    driver.inject_acceleration(axis, value);
                }
                std::thread::sleep(Duration::from_millis(20));
            }
        });
        Self {
            stop,
            thread: Some(thread),
        }
    }
}

#[cfg(feature = "mock")]
impl Drop for SampleGenerator {
    fn drop(&mut self) {
        self.stop
            .store(true, std::sync::atomic::Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Sample generator thread panicked");
            }
        }
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;

    fn runtime() -> Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn test_simulated_monitor_receives_events() {
        let config = AccelConfig::default();
        let received = simulate(&runtime(), &config, Some(Duration::from_millis(300))).unwrap();
        assert!(received > 0, "no events from the simulated board");
    }

    #[test]
    fn test_simulated_monitor_applies_triggers() {
        let config = AccelConfig {
            change_triggers: vec![0.2, 0.2, 0.2, 0.2],
            ..AccelConfig::default()
        };
        simulate(&runtime(), &config, Some(Duration::from_millis(100))).unwrap();
    }

    #[test]
    fn test_cli_parses_repeated_triggers() {
        let cli = Cli::try_parse_from([
            "accel_monitor",
            "--serial",
            "42",
            "-t",
            "0.1",
            "--trigger",
            "0.2",
            "--simulate",
        ])
        .unwrap();
        assert_eq!(cli.serial, Some(42));
        assert_eq!(cli.triggers, vec![0.1, 0.2]);
        assert!(cli.simulate);
    }
}
