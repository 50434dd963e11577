//! Typed accelerometer accessors.
//!
//! [`Accelerometer`] is a borrowed view over an open [`Phidget`]. Every
//! accessor forwards exactly one driver call, converts a failure status into
//! [`NativeDriverError`], and otherwise returns the out-value. Readings and
//! triggers are in g (1 g = standard gravity).
//!
//! All accessors require the device to be opened and attached; the driver
//! reports `EPHIDGET_NOTATTACHED` otherwise.

use std::ffi::c_int;
use std::sync::Arc;

use phidget21_sys as sys;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use crate::config::AccelConfig;
use crate::device::Phidget;
use crate::driver::{invoke, read_out, DeviceHandle, PhidgetDriver};
use crate::error::{DriverResult, NativeDriverError};
use crate::handler::{acceleration_change_trampoline, AccelerationChange, AccelerationHandler};

/// Largest event channel [`Accelerometer::subscribe`] will allocate.
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 20;

/// Conventional axis names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Index 0.
    X,
    /// Index 1.
    Y,
    /// Only present on 3-axis boards.
    Z,
}

impl Axis {
    /// Axis index as used by the driver.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl From<Axis> for usize {
    fn from(axis: Axis) -> Self {
        axis.index()
    }
}

/// Accessors for the accelerometer behind a [`Phidget`].
pub struct Accelerometer<'a, D: PhidgetDriver> {
    device: &'a Phidget<D>,
}

impl<D: PhidgetDriver> Clone for Accelerometer<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: PhidgetDriver> Copy for Accelerometer<'_, D> {}

impl<'a, D: PhidgetDriver> Accelerometer<'a, D> {
    pub(crate) fn new(device: &'a Phidget<D>) -> Self {
        Self { device }
    }

    fn driver(&self) -> &D {
        self.device.driver()
    }

    fn handle(&self) -> DeviceHandle {
        self.device.handle()
    }

    /// Current acceleration of `axis`, in g.
    ///
    /// Always within [`acceleration_min`](Self::acceleration_min) and
    /// [`acceleration_max`](Self::acceleration_max).
    pub fn acceleration(&self, axis: usize) -> DriverResult<f64> {
        let index = native_index(axis)?;
        read_out("acceleration", |out| {
            self.driver().acceleration(self.handle(), index, out)
        })
    }

    /// Highest value `axis` reports. A reading equal to it means saturation.
    pub fn acceleration_max(&self, axis: usize) -> DriverResult<f64> {
        let index = native_index(axis)?;
        read_out("acceleration_max", |out| {
            self.driver().acceleration_max(self.handle(), index, out)
        })
    }

    /// Lowest value `axis` reports. A reading equal to it means saturation.
    pub fn acceleration_min(&self, axis: usize) -> DriverResult<f64> {
        let index = native_index(axis)?;
        read_out("acceleration_min", |out| {
            self.driver().acceleration_min(self.handle(), index, out)
        })
    }

    /// Number of axes: 2 or 3 on current hardware.
    pub fn axis_count(&self) -> DriverResult<usize> {
        let count: c_int = read_out("axis_count", |out| {
            self.driver().axis_count(self.handle(), out)
        })?;
        usize::try_from(count).map_err(|_| NativeDriverError::new(sys::EPHIDGET_UNEXPECTED))
    }

    /// Change trigger of `axis`, in g. Defaults to 0.
    pub fn accel_change_trigger(&self, axis: usize) -> DriverResult<f64> {
        let index = native_index(axis)?;
        read_out("accel_change_trigger", |out| {
            self.driver().change_trigger(self.handle(), index, out)
        })
    }

    /// Set the minimum change on `axis` between two successive change events.
    pub fn set_accel_change_trigger(&self, axis: usize, trigger: f64) -> DriverResult<()> {
        let index = native_index(axis)?;
        invoke("set_accel_change_trigger", || {
            self.driver()
                .set_change_trigger(self.handle(), index, trigger)
        })?;
        debug!(axis, trigger, "Set acceleration change trigger");
        Ok(())
    }

    /// Register the acceleration change handler, replacing any previous one.
    ///
    /// The handler runs on the driver's event thread whenever an axis has
    /// moved by at least its change trigger since the last event for that
    /// axis. It should return quickly.
    ///
    /// The slot is updated before the driver registration is attempted, so
    /// on failure the new handler stays stored.
    pub fn set_on_acceleration_change_handler<F>(&self, handler: F) -> DriverResult<()>
    where
        F: Fn(AccelerationChange) + Send + Sync + 'static,
    {
        self.install(Arc::new(handler))
    }

    /// Empty the handler slot. Later events are dropped.
    pub fn clear_on_acceleration_change_handler(&self) {
        if self.device.handler_slot().replace(None).is_some() {
            info!("Cleared acceleration change handler");
        }
    }

    /// Deliver change events into a bounded channel.
    ///
    /// Replaces any registered handler. The driver thread never blocks: when
    /// the channel is full the event is dropped with a warning. `capacity`
    /// is clamped to `1..=MAX_CHANNEL_CAPACITY`.
    pub fn subscribe(&self, capacity: usize) -> DriverResult<mpsc::Receiver<AccelerationChange>> {
        let (tx, rx) = mpsc::channel(capacity.clamp(1, MAX_CHANNEL_CAPACITY));
        self.set_on_acceleration_change_handler(move |change| match tx.try_send(change) {
            Ok(()) => {}
            Err(TrySendError::Full(change)) => {
                warn!(axis = change.axis, "Event channel full, dropping acceleration change");
            }
            Err(TrySendError::Closed(_)) => {}
        })?;
        Ok(rx)
    }

    fn install(&self, handler: AccelerationHandler) -> DriverResult<()> {
        let slot = self.device.handler_slot();
        slot.replace(Some(handler));
        invoke("set_on_acceleration_change_handler", || {
            self.driver().set_on_acceleration_change_handler(
                self.handle(),
                Some(acceleration_change_trampoline),
                slot.as_user_ptr(),
            )
        })?;
        info!("Registered acceleration change handler");
        Ok(())
    }

    /// Current reading of every axis.
    pub fn readings(&self) -> DriverResult<Vec<f64>> {
        (0..self.axis_count()?)
            .map(|axis| self.acceleration(axis))
            .collect()
    }

    /// `(min, max)` of every axis.
    pub fn axis_ranges(&self) -> DriverResult<Vec<(f64, f64)>> {
        (0..self.axis_count()?)
            .map(|axis| Ok((self.acceleration_min(axis)?, self.acceleration_max(axis)?)))
            .collect()
    }

    /// Write the configured change triggers. Extra entries are skipped.
    pub fn apply_config(&self, config: &AccelConfig) -> DriverResult<()> {
        let axes = self.axis_count()?;
        for (axis, &trigger) in config.change_triggers.iter().enumerate() {
            if axis >= axes {
                warn!(axis, axes, "Ignoring change trigger for missing axis");
                continue;
            }
            self.set_accel_change_trigger(axis, trigger)?;
        }
        Ok(())
    }
}

fn native_index(axis: usize) -> DriverResult<c_int> {
    c_int::try_from(axis).map_err(|_| NativeDriverError::new(sys::EPHIDGET_OUTOFBOUNDS))
}
