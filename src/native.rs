//! [`PhidgetDriver`] backed by the vendor `phidget21` library.
//!
//! Each method is a single call into `phidget21-sys`. Requires the
//! `phidget_hardware` feature, which links the library.

#![allow(unsafe_code)]

use std::ffi::{c_char, c_double, c_int, c_void, CStr};
use std::ptr;

use phidget21_sys::{self as sys, AccelerationChangeHandler, CPhidgetAccelerometerHandle};

use crate::driver::{DeviceHandle, PhidgetDriver};

/// The vendor driver library.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDriver;

impl NativeDriver {
    /// The library has no per-process setup; this is a unit value.
    pub fn new() -> Self {
        Self
    }

    /// Description of `code` as reported by the library itself.
    pub fn error_description(code: c_int) -> Option<String> {
        let mut text: *const c_char = ptr::null();
        // SAFETY: the library writes a pointer to a static string.
        let status = unsafe { sys::CPhidget_getErrorDescription(code, &mut text) };
        if status != sys::EPHIDGET_OK || text.is_null() {
            return None;
        }
        // SAFETY: non-null, NUL-terminated, static storage.
        Some(unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned())
    }
}

// SAFETY (all methods below): handles come from CPhidgetAccelerometer_create
// through DeviceHandle and stay valid until `delete`; out-pointers are
// derived from live Rust references.
impl PhidgetDriver for NativeDriver {
    fn accelerometer_create(&self, handle: &mut CPhidgetAccelerometerHandle) -> c_int {
        unsafe { sys::CPhidgetAccelerometer_create(handle) }
    }

    fn open(&self, handle: DeviceHandle, serial: c_int) -> c_int {
        unsafe { sys::CPhidget_open(handle.as_phidget(), serial) }
    }

    fn wait_for_attachment(&self, handle: DeviceHandle, timeout_ms: c_int) -> c_int {
        unsafe { sys::CPhidget_waitForAttachment(handle.as_phidget(), timeout_ms) }
    }

    fn close(&self, handle: DeviceHandle) -> c_int {
        unsafe { sys::CPhidget_close(handle.as_phidget()) }
    }

    fn delete(&self, handle: DeviceHandle) -> c_int {
        unsafe { sys::CPhidget_delete(handle.as_phidget()) }
    }

    fn device_status(&self, handle: DeviceHandle, status: &mut c_int) -> c_int {
        unsafe { sys::CPhidget_getDeviceStatus(handle.as_phidget(), status) }
    }

    fn serial_number(&self, handle: DeviceHandle, serial: &mut c_int) -> c_int {
        unsafe { sys::CPhidget_getSerialNumber(handle.as_phidget(), serial) }
    }

    fn device_version(&self, handle: DeviceHandle, version: &mut c_int) -> c_int {
        unsafe { sys::CPhidget_getDeviceVersion(handle.as_phidget(), version) }
    }

    fn device_name(&self, handle: DeviceHandle, name: &mut String) -> c_int {
        let mut text: *const c_char = ptr::null();
        let status = unsafe { sys::CPhidget_getDeviceName(handle.as_phidget(), &mut text) };
        if status == sys::EPHIDGET_OK && !text.is_null() {
            // The string is owned by the device object; copy it out.
            *name = unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned();
        }
        status
    }

    fn axis_count(&self, handle: DeviceHandle, count: &mut c_int) -> c_int {
        unsafe { sys::CPhidgetAccelerometer_getAxisCount(handle.as_raw(), count) }
    }

    fn acceleration(&self, handle: DeviceHandle, index: c_int, value: &mut c_double) -> c_int {
        unsafe { sys::CPhidgetAccelerometer_getAcceleration(handle.as_raw(), index, value) }
    }

    fn acceleration_max(
        &self,
        handle: DeviceHandle,
        index: c_int,
        value: &mut c_double,
    ) -> c_int {
        unsafe { sys::CPhidgetAccelerometer_getAccelerationMax(handle.as_raw(), index, value) }
    }

    fn acceleration_min(
        &self,
        handle: DeviceHandle,
        index: c_int,
        value: &mut c_double,
    ) -> c_int {
        unsafe { sys::CPhidgetAccelerometer_getAccelerationMin(handle.as_raw(), index, value) }
    }

    fn change_trigger(&self, handle: DeviceHandle, index: c_int, value: &mut c_double) -> c_int {
        unsafe {
            sys::CPhidgetAccelerometer_getAccelerationChangeTrigger(handle.as_raw(), index, value)
        }
    }

    fn set_change_trigger(&self, handle: DeviceHandle, index: c_int, value: c_double) -> c_int {
        unsafe {
            sys::CPhidgetAccelerometer_setAccelerationChangeTrigger(handle.as_raw(), index, value)
        }
    }

    fn set_on_acceleration_change_handler(
        &self,
        handle: DeviceHandle,
        callback: AccelerationChangeHandler,
        user_ptr: *mut c_void,
    ) -> c_int {
        unsafe {
            sys::CPhidgetAccelerometer_set_OnAccelerationChange_Handler(
                handle.as_raw(),
                callback,
                user_ptr,
            )
        }
    }
}
