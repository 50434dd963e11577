//! Channel delivery of acceleration changes.
#![cfg(feature = "mock")]

mod common;

use std::time::Duration;

use common::{attached, change};
use phidget_accel::MockBoard;
use tokio::time::timeout;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn subscriber_receives_events_in_order() {
    let (driver, device) = attached(MockBoard::three_axis());
    let mut events = device.accelerometer().subscribe(16).unwrap();

    let producer = tokio::task::spawn_blocking(move || {
        driver.inject_acceleration(0, 0.1);
        driver.inject_acceleration(1, -0.2);
        driver.inject_acceleration(2, 0.9);
    });
    producer.await.unwrap();

    let mut received = Vec::new();
    for _ in 0..3 {
        let event = timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("channel closed");
        received.push(event);
    }
    assert_eq!(
        received,
        vec![change(0, 0.1), change(1, -0.2), change(2, 0.9)]
    );
}

#[tokio::test]
async fn full_channel_drops_instead_of_blocking() {
    let (driver, device) = attached(MockBoard::two_axis());
    let mut events = device.accelerometer().subscribe(2).unwrap();

    // The callback runs on this thread; it must return even when nobody reads.
    for step in 1..=5 {
        assert_eq!(driver.inject_acceleration(0, f64::from(step) * 0.1), 1);
    }

    assert_eq!(events.recv().await, Some(change(0, 0.1)));
    assert_eq!(events.recv().await, Some(change(0, 0.2)));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn dropping_device_closes_channel() {
    let (driver, device) = attached(MockBoard::three_axis());
    let mut events = device.accelerometer().subscribe(4).unwrap();
    driver.inject_acceleration(2, 1.5);

    drop(device);

    assert_eq!(events.recv().await, Some(change(2, 1.5)));
    assert_eq!(events.recv().await, None);
}

#[tokio::test]
async fn new_subscription_replaces_previous() {
    let (driver, device) = attached(MockBoard::three_axis());
    let accel = device.accelerometer();
    let mut old = accel.subscribe(4).unwrap();
    let mut new = accel.subscribe(4).unwrap();

    driver.inject_acceleration(1, 0.3);

    assert_eq!(new.recv().await, Some(change(1, 0.3)));
    // The old sender was dropped with the handler it lived in.
    assert_eq!(old.recv().await, None);
}
