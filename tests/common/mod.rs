//! Shared setup for accelerometer integration tests.

#![allow(dead_code)] // Not every test binary uses every helper

use std::sync::{Arc, Mutex};
use std::time::Duration;

use phidget_accel::{AccelerationChange, MockBoard, MockDriver, Phidget};

/// Attachment timeout for simulated boards, which attach immediately.
pub const ATTACH_TIMEOUT: Duration = Duration::from_millis(200);

/// Create, open and attach a device on a fresh simulated `board`.
pub fn attached(board: MockBoard) -> (Arc<MockDriver>, Phidget<MockDriver>) {
    let driver = Arc::new(MockDriver::new(board));
    let device = Phidget::create(driver.clone()).unwrap();
    device.open(None).unwrap();
    device.wait_for_attachment(ATTACH_TIMEOUT).unwrap();
    (driver, device)
}

/// A handler that records every change it receives.
pub fn recorder() -> (
    Arc<Mutex<Vec<AccelerationChange>>>,
    impl Fn(AccelerationChange) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |change| sink.lock().unwrap().push(change))
}

pub fn change(axis: usize, acceleration: f64) -> AccelerationChange {
    AccelerationChange { axis, acceleration }
}
