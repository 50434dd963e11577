//! The native function table as a Rust trait.
//!
//! [`PhidgetDriver`] mirrors the `phidget21` entry points one-to-one: every
//! method takes the device handle plus the native arguments, writes its
//! result through an out-parameter, and returns the raw status code. Status
//! translation happens once, in the callers ([`crate::device`] and
//! [`crate::accelerometer`]), so implementations stay as thin as the C API.
//!
//! Two implementations exist:
//! - `NativeDriver` (feature `phidget_hardware`) calls the vendor library.
//! - `MockDriver` (feature `mock`) simulates a board in-process.

#![allow(unsafe_code)]

use std::ffi::{c_double, c_int, c_void};
use std::fmt;
use std::ptr::NonNull;

use phidget21_sys::{
    AccelerationChangeHandler, CPhidgetAccelerometer, CPhidgetAccelerometerHandle, CPhidgetHandle,
};
use tracing::{debug, trace};

use crate::error::{DriverResult, NativeDriverError};

/// Non-null reference to a native accelerometer object.
///
/// The handle is only an address; ownership of the native object lies with
/// [`crate::device::Phidget`], which never hands its handle out. Outside this
/// crate a handle can only be made with the unsafe [`DeviceHandle::from_raw`],
/// so the safe driver methods cannot be pointed at an object a `Phidget`
/// still owns or has already deleted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(NonNull<CPhidgetAccelerometer>);

// SAFETY: phidget21 device objects are internally locked by the library and
// may be used from any thread. The handle itself is just an address.
unsafe impl Send for DeviceHandle {}
unsafe impl Sync for DeviceHandle {}

impl DeviceHandle {
    /// Wrap a raw handle, rejecting null.
    ///
    /// # Safety
    ///
    /// `raw` must be null or come from `accelerometer_create` on the driver
    /// it will be passed to, and must not be deleted while any copy of the
    /// returned handle is still used.
    pub unsafe fn from_raw(raw: CPhidgetAccelerometerHandle) -> Option<Self> {
        NonNull::new(raw).map(Self)
    }

    /// Raw accelerometer handle for accelerometer entry points.
    pub fn as_raw(self) -> CPhidgetAccelerometerHandle {
        self.0.as_ptr()
    }

    /// The same object viewed as a generic device, for `CPhidget_*` calls.
    pub fn as_phidget(self) -> CPhidgetHandle {
        self.0.as_ptr().cast()
    }

    /// Address of the native object.
    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceHandle({:#x})", self.addr())
    }
}

/// The accelerometer subset of the `phidget21` function table.
///
/// Every method returns the raw status code; zero is success.
pub trait PhidgetDriver: Send + Sync + 'static {
    /// `CPhidgetAccelerometer_create`
    fn accelerometer_create(&self, handle: &mut CPhidgetAccelerometerHandle) -> c_int;

    /// `CPhidget_open`; `serial` of -1 matches any device.
    fn open(&self, handle: DeviceHandle, serial: c_int) -> c_int;

    /// `CPhidget_waitForAttachment`; zero milliseconds waits forever.
    fn wait_for_attachment(&self, handle: DeviceHandle, timeout_ms: c_int) -> c_int;

    /// `CPhidget_close`
    fn close(&self, handle: DeviceHandle) -> c_int;

    /// `CPhidget_delete`. The handle must not be used afterwards.
    fn delete(&self, handle: DeviceHandle) -> c_int;

    /// `CPhidget_getDeviceStatus`
    fn device_status(&self, handle: DeviceHandle, status: &mut c_int) -> c_int;

    /// `CPhidget_getSerialNumber`
    fn serial_number(&self, handle: DeviceHandle, serial: &mut c_int) -> c_int;

    /// `CPhidget_getDeviceVersion`
    fn device_version(&self, handle: DeviceHandle, version: &mut c_int) -> c_int;

    /// `CPhidget_getDeviceName`
    fn device_name(&self, handle: DeviceHandle, name: &mut String) -> c_int;

    /// `CPhidgetAccelerometer_getAxisCount`
    fn axis_count(&self, handle: DeviceHandle, count: &mut c_int) -> c_int;

    /// `CPhidgetAccelerometer_getAcceleration`
    fn acceleration(&self, handle: DeviceHandle, index: c_int, value: &mut c_double) -> c_int;

    /// `CPhidgetAccelerometer_getAccelerationMax`
    fn acceleration_max(&self, handle: DeviceHandle, index: c_int, value: &mut c_double)
        -> c_int;

    /// `CPhidgetAccelerometer_getAccelerationMin`
    fn acceleration_min(&self, handle: DeviceHandle, index: c_int, value: &mut c_double)
        -> c_int;

    /// `CPhidgetAccelerometer_getAccelerationChangeTrigger`
    fn change_trigger(&self, handle: DeviceHandle, index: c_int, value: &mut c_double) -> c_int;

    /// `CPhidgetAccelerometer_setAccelerationChangeTrigger`
    fn set_change_trigger(&self, handle: DeviceHandle, index: c_int, value: c_double) -> c_int;

    /// `CPhidgetAccelerometer_set_OnAccelerationChange_Handler`
    ///
    /// `user_ptr` is passed back verbatim on every callback invocation.
    fn set_on_acceleration_change_handler(
        &self,
        handle: DeviceHandle,
        callback: AccelerationChangeHandler,
        user_ptr: *mut c_void,
    ) -> c_int;
}

/// Run a driver call that writes through an out-parameter.
///
/// The out-value is returned only when the status is success; on failure it
/// is discarded and the status is surfaced as [`NativeDriverError`].
pub(crate) fn read_out<T, F>(op: &'static str, call: F) -> DriverResult<T>
where
    T: Default + fmt::Debug,
    F: FnOnce(&mut T) -> c_int,
{
    let mut out = T::default();
    let code = call(&mut out);
    match NativeDriverError::check(code) {
        Ok(()) => {
            trace!(op, value = ?out, "driver read");
            Ok(out)
        }
        Err(err) => {
            debug!(op, code, "driver call failed: {}", err.kind());
            Err(err)
        }
    }
}

/// Run a driver call that only returns a status.
pub(crate) fn invoke<F>(op: &'static str, call: F) -> DriverResult<()>
where
    F: FnOnce() -> c_int,
{
    let code = call();
    NativeDriverError::check(code).inspect_err(|err| {
        debug!(op, code, "driver call failed: {}", err.kind());
    })
}
