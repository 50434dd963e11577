//! Tests against a physically attached accelerometer.
//!
//! Run with `cargo test --features hardware_tests -- --test-threads=1`.
//! Set `PHIDGET_SERIAL` to pick a specific board.
#![cfg(feature = "hardware_tests")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use phidget_accel::{NativeDriver, Phidget};

fn serial() -> Option<i32> {
    std::env::var("PHIDGET_SERIAL").ok()?.parse().ok()
}

fn open() -> Phidget<NativeDriver> {
    let device = Phidget::create(Arc::new(NativeDriver::new())).unwrap();
    device.open(serial()).unwrap();
    device
        .wait_for_attachment(Duration::from_secs(5))
        .expect("no accelerometer attached");
    device
}

#[test]
fn hardware_reports_identity_and_axes() {
    let device = open();
    println!(
        "{} serial {} version {}",
        device.device_name().unwrap(),
        device.serial_number().unwrap(),
        device.device_version().unwrap()
    );
    let accel = device.accelerometer();
    let axes = accel.axis_count().unwrap();
    assert!(axes == 2 || axes == 3);
    for axis in 0..axes {
        let value = accel.acceleration(axis).unwrap();
        assert!(accel.acceleration_min(axis).unwrap() <= value);
        assert!(value <= accel.acceleration_max(axis).unwrap());
    }
    device.close().unwrap();
}

#[test]
fn hardware_trigger_round_trip() {
    let device = open();
    let accel = device.accelerometer();
    accel.set_accel_change_trigger(0, 0.25).unwrap();
    assert!((accel.accel_change_trigger(0).unwrap() - 0.25).abs() < 1e-6);
}

#[test]
fn hardware_delivers_events_with_zero_trigger() {
    let device = open();
    let accel = device.accelerometer();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    accel.set_accel_change_trigger(0, 0.0).unwrap();
    accel
        .set_on_acceleration_change_handler(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    std::thread::sleep(Duration::from_secs(1));
    assert!(calls.load(Ordering::SeqCst) > 0, "no events from a live sensor");
    device.close().unwrap();
}

#[test]
fn library_describes_error_codes() {
    let text = NativeDriver::error_description(phidget21_sys::EPHIDGET_TIMEOUT);
    assert!(text.is_some_and(|t| !t.is_empty()));
}
