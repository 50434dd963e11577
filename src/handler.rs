//! Acceleration change handler slot and the native callback trampoline.
//!
//! The driver delivers change events on its own thread by calling a plain
//! function pointer with a user-data pointer. The trampoline below is that
//! function; the user-data pointer is the address of the [`HandlerSlot`]
//! owned by [`crate::device::Phidget`], which keeps it alive until the
//! native object has been deleted.
//!
//! The slot is read by the driver thread and written by whichever thread
//! registers a handler, so it sits behind an `RwLock`. The trampoline clones
//! the handler out of the lock before calling it; a handler may therefore
//! replace itself without deadlocking.

#![allow(unsafe_code)]

use std::ffi::{c_double, c_int, c_void};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use phidget21_sys::{CPhidgetAccelerometerHandle, EVENT_CONTINUE};
use tracing::{error, trace, warn};

/// A single acceleration change reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerationChange {
    /// Axis index (0 = x, 1 = y, 2 = z).
    pub axis: usize,
    /// New acceleration in g.
    pub acceleration: f64,
}

/// Shared, type-erased change handler.
pub type AccelerationHandler = Arc<dyn Fn(AccelerationChange) + Send + Sync + 'static>;

/// The one handler slot of a device. Last write wins.
#[derive(Default)]
pub struct HandlerSlot {
    handler: RwLock<Option<AccelerationHandler>>,
}

impl HandlerSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `handler`, returning whatever was registered before.
    pub fn replace(&self, handler: Option<AccelerationHandler>) -> Option<AccelerationHandler> {
        std::mem::replace(&mut *self.handler.write(), handler)
    }

    /// Whether a handler is currently registered.
    pub fn is_set(&self) -> bool {
        self.handler.read().is_some()
    }

    /// Invoke the current handler, if any. Returns `false` when the event
    /// was dropped because the slot is empty.
    pub fn dispatch(&self, change: AccelerationChange) -> bool {
        let handler = self.handler.read().clone();
        match handler {
            Some(handler) => {
                handler(change);
                true
            }
            None => {
                trace!(axis = change.axis, "no handler registered; event dropped");
                false
            }
        }
    }

    /// The pointer handed to the driver as callback user data.
    pub(crate) fn as_user_ptr(self: &Arc<Self>) -> *mut c_void {
        Arc::as_ptr(self).cast_mut().cast()
    }
}

impl fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("registered", &self.is_set())
            .finish()
    }
}

/// Callback registered with the driver for every device.
///
/// Always returns `EVENT_CONTINUE`; a panicking handler is logged and
/// swallowed so that no unwind crosses into the driver.
///
/// # Safety
///
/// `user_ptr` must be null or point to a live [`HandlerSlot`].
pub(crate) unsafe extern "system" fn acceleration_change_trampoline(
    _phid: CPhidgetAccelerometerHandle,
    user_ptr: *mut c_void,
    index: c_int,
    acceleration: c_double,
) -> c_int {
    if user_ptr.is_null() {
        return EVENT_CONTINUE;
    }
    // SAFETY: guaranteed by the caller contract above.
    let slot = unsafe { &*user_ptr.cast_const().cast::<HandlerSlot>() };

    let Ok(axis) = usize::try_from(index) else {
        warn!(index, "driver reported a negative axis index");
        return EVENT_CONTINUE;
    };

    let change = AccelerationChange { axis, acceleration };
    if catch_unwind(AssertUnwindSafe(|| slot.dispatch(change))).is_err() {
        error!(axis, acceleration, "acceleration change handler panicked");
    }
    EVENT_CONTINUE
}
