//! Raw FFI declarations for the `phidget21` driver library.
//!
//! Only the generic device lifecycle and the accelerometer entry points are
//! declared. All functions return a status code: `EPHIDGET_OK` (0) on
//! success, one of the `EPHIDGET_*` constants otherwise.
//!
//! The vendor headers declare every entry point with `CCONV`, which is
//! `__stdcall` on 32-bit Windows and the C convention elsewhere. That is
//! exactly what `extern "system"` means, so both the declarations and the
//! callback type use it.
//!
//! Linking is only requested when the `phidget-sdk` feature is enabled.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::{c_char, c_double, c_int, c_void};
use std::marker::{PhantomData, PhantomPinned};

/// Opaque generic device object.
#[repr(C)]
pub struct CPhidget {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// Opaque accelerometer device object.
#[repr(C)]
pub struct CPhidgetAccelerometer {
    _data: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

pub type CPhidgetHandle = *mut CPhidget;
pub type CPhidgetAccelerometerHandle = *mut CPhidgetAccelerometer;

/// Acceleration change callback: `(handle, user pointer, axis index, value) -> status`.
pub type AccelerationChangeHandler = Option<
    unsafe extern "system" fn(
        phid: CPhidgetAccelerometerHandle,
        user_ptr: *mut c_void,
        index: c_int,
        acceleration: c_double,
    ) -> c_int,
>;

// Status codes (phidget21.h)
pub const EPHIDGET_OK: c_int = 0;
pub const EPHIDGET_NOTFOUND: c_int = 1;
pub const EPHIDGET_NOMEMORY: c_int = 2;
pub const EPHIDGET_UNEXPECTED: c_int = 3;
pub const EPHIDGET_INVALIDARG: c_int = 4;
pub const EPHIDGET_NOTATTACHED: c_int = 5;
pub const EPHIDGET_INTERRUPTED: c_int = 6;
pub const EPHIDGET_INVALID: c_int = 7;
pub const EPHIDGET_NETWORK: c_int = 8;
pub const EPHIDGET_UNKNOWNVAL: c_int = 9;
pub const EPHIDGET_BADPASSWORD: c_int = 10;
pub const EPHIDGET_UNSUPPORTED: c_int = 11;
pub const EPHIDGET_DUPLICATE: c_int = 12;
pub const EPHIDGET_TIMEOUT: c_int = 13;
pub const EPHIDGET_OUTOFBOUNDS: c_int = 14;
pub const EPHIDGET_EVENT: c_int = 15;
pub const EPHIDGET_NETWORK_NOTCONNECTED: c_int = 16;
pub const EPHIDGET_WRONGDEVICE: c_int = 17;
pub const EPHIDGET_CLOSED: c_int = 18;
pub const EPHIDGET_BADVERSION: c_int = 19;

// Device status values returned by CPhidget_getDeviceStatus
pub const PHIDGET_NOTATTACHED: c_int = 0;
pub const PHIDGET_ATTACHED: c_int = 1;

/// Return value for event handlers that want further events.
pub const EVENT_CONTINUE: c_int = 0;

/// Serial number wildcard accepted by `CPhidget_open`.
pub const PHIDGET_ANY_SERIAL: c_int = -1;

extern "system" {
    pub fn CPhidget_open(phid: CPhidgetHandle, serialNumber: c_int) -> c_int;
    pub fn CPhidget_close(phid: CPhidgetHandle) -> c_int;
    pub fn CPhidget_delete(phid: CPhidgetHandle) -> c_int;
    pub fn CPhidget_waitForAttachment(phid: CPhidgetHandle, milliseconds: c_int) -> c_int;
    pub fn CPhidget_getDeviceStatus(phid: CPhidgetHandle, deviceStatus: *mut c_int) -> c_int;
    pub fn CPhidget_getSerialNumber(phid: CPhidgetHandle, serialNumber: *mut c_int) -> c_int;
    pub fn CPhidget_getDeviceVersion(phid: CPhidgetHandle, deviceVersion: *mut c_int) -> c_int;
    pub fn CPhidget_getDeviceName(phid: CPhidgetHandle, deviceName: *mut *const c_char) -> c_int;
    pub fn CPhidget_getErrorDescription(errorCode: c_int, errorString: *mut *const c_char) -> c_int;

    pub fn CPhidgetAccelerometer_create(phid: *mut CPhidgetAccelerometerHandle) -> c_int;
    pub fn CPhidgetAccelerometer_getAxisCount(
        phid: CPhidgetAccelerometerHandle,
        count: *mut c_int,
    ) -> c_int;
    pub fn CPhidgetAccelerometer_getAcceleration(
        phid: CPhidgetAccelerometerHandle,
        index: c_int,
        acceleration: *mut c_double,
    ) -> c_int;
    pub fn CPhidgetAccelerometer_getAccelerationMax(
        phid: CPhidgetAccelerometerHandle,
        index: c_int,
        max: *mut c_double,
    ) -> c_int;
    pub fn CPhidgetAccelerometer_getAccelerationMin(
        phid: CPhidgetAccelerometerHandle,
        index: c_int,
        min: *mut c_double,
    ) -> c_int;
    pub fn CPhidgetAccelerometer_getAccelerationChangeTrigger(
        phid: CPhidgetAccelerometerHandle,
        index: c_int,
        trigger: *mut c_double,
    ) -> c_int;
    pub fn CPhidgetAccelerometer_setAccelerationChangeTrigger(
        phid: CPhidgetAccelerometerHandle,
        index: c_int,
        trigger: c_double,
    ) -> c_int;
    pub fn CPhidgetAccelerometer_set_OnAccelerationChange_Handler(
        phid: CPhidgetAccelerometerHandle,
        fptr: AccelerationChangeHandler,
        userPtr: *mut c_void,
    ) -> c_int;
}
