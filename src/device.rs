//! Device lifecycle: create, open, attach, close.
//!
//! [`Phidget`] owns the native accelerometer object for its whole life and
//! the handler slot the driver calls back into. Accessors live on the
//! borrowed [`Accelerometer`] view, so the compiler rejects any use of the
//! view after [`Phidget::close`] has consumed the device.
//!
//! ```rust,ignore
//! let device = Phidget::create(driver)?;
//! device.open(None)?;
//! device.wait_for_attachment(Duration::from_secs(5))?;
//! let accel = device.accelerometer();
//! println!("{} axes", accel.axis_count()?);
//! device.close()?;
//! ```

use std::ffi::c_int;
use std::ptr;
use std::sync::Arc;
use std::time::Duration;

use phidget21_sys as sys;
use tracing::{debug, info, warn};

use crate::accelerometer::Accelerometer;
use crate::driver::{invoke, read_out, DeviceHandle, PhidgetDriver};
use crate::error::{DriverResult, NativeDriverError};
use crate::handler::HandlerSlot;

/// An accelerometer device object owned by this process.
pub struct Phidget<D: PhidgetDriver> {
    driver: Arc<D>,
    handle: DeviceHandle,
    handlers: Arc<HandlerSlot>,
    closed: bool,
}

impl<D: PhidgetDriver> Phidget<D> {
    /// Create a new, unopened accelerometer object.
    pub fn create(driver: Arc<D>) -> DriverResult<Self> {
        let mut raw: sys::CPhidgetAccelerometerHandle = ptr::null_mut();
        invoke("accelerometer_create", || {
            driver.accelerometer_create(&mut raw)
        })?;
        // SAFETY: `raw` was just created by `driver`, and this device is its
        // only owner until `shutdown` deletes it.
        #[allow(unsafe_code)]
        let handle = unsafe { DeviceHandle::from_raw(raw) }
            .ok_or_else(|| NativeDriverError::new(sys::EPHIDGET_UNEXPECTED))?;
        debug!(?handle, "Created accelerometer object");

        Ok(Self {
            driver,
            handle,
            handlers: Arc::new(HandlerSlot::new()),
            closed: false,
        })
    }

    /// Start looking for a device. `None` accepts any serial number.
    ///
    /// Opening does not wait; see [`Phidget::wait_for_attachment`].
    pub fn open(&self, serial: Option<i32>) -> DriverResult<()> {
        let serial = serial.unwrap_or(sys::PHIDGET_ANY_SERIAL);
        invoke("open", || self.driver.open(self.handle, serial))?;
        info!(serial, "Opened accelerometer");
        Ok(())
    }

    /// Block until the device is attached.
    ///
    /// A zero timeout waits forever, as the native call does. Any other
    /// timeout is rounded up to whole milliseconds, and clamped at `i32::MAX`.
    pub fn wait_for_attachment(&self, timeout: Duration) -> DriverResult<()> {
        let timeout_ms = timeout_millis(timeout);
        invoke("wait_for_attachment", || {
            self.driver.wait_for_attachment(self.handle, timeout_ms)
        })?;
        info!(?timeout, "Accelerometer attached");
        Ok(())
    }

    /// Whether the device is currently attached.
    pub fn is_attached(&self) -> DriverResult<bool> {
        let status: c_int = read_out("device_status", |out| {
            self.driver.device_status(self.handle, out)
        })?;
        Ok(status == sys::PHIDGET_ATTACHED)
    }

    /// Serial number of the attached device.
    pub fn serial_number(&self) -> DriverResult<i32> {
        read_out("serial_number", |out| {
            self.driver.serial_number(self.handle, out)
        })
    }

    /// Firmware version of the attached device.
    pub fn device_version(&self) -> DriverResult<i32> {
        read_out("device_version", |out| {
            self.driver.device_version(self.handle, out)
        })
    }

    /// Product name of the attached device.
    pub fn device_name(&self) -> DriverResult<String> {
        read_out("device_name", |out| self.driver.device_name(self.handle, out))
    }

    /// Accelerometer accessors, borrowing this device.
    pub fn accelerometer(&self) -> Accelerometer<'_, D> {
        Accelerometer::new(self)
    }

    pub(crate) fn handle(&self) -> DeviceHandle {
        self.handle
    }

    pub(crate) fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    pub(crate) fn handler_slot(&self) -> &Arc<HandlerSlot> {
        &self.handlers
    }

    /// Close and delete the native object.
    ///
    /// Both steps are attempted; the first failure is returned.
    pub fn close(mut self) -> DriverResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closed = invoke("close", || self.driver.close(self.handle));
        let deleted = invoke("delete", || self.driver.delete(self.handle));
        info!(handle = ?self.handle, "Closed accelerometer");
        closed.and(deleted)
    }
}

/// Native timeout for `timeout`. Only `Duration::ZERO` maps to 0 (forever).
fn timeout_millis(timeout: Duration) -> c_int {
    if timeout.is_zero() {
        return 0;
    }
    c_int::try_from(timeout.as_nanos().div_ceil(1_000_000)).unwrap_or(c_int::MAX)
}

impl<D: PhidgetDriver> Drop for Phidget<D> {
    fn drop(&mut self) {
        // The handler slot field is dropped after this body, i.e. only once the
        // driver can no longer call back into it.
        if let Err(e) = self.shutdown() {
            warn!(handle = ?self.handle, "Failed to close accelerometer: {}", e);
        }
    }
}

impl<D: PhidgetDriver> std::fmt::Debug for Phidget<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Phidget")
            .field("handle", &self.handle)
            .field("handlers", &self.handlers)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::mock::{MockBoard, MockDriver};

    fn attached(board: MockBoard) -> (Arc<MockDriver>, Phidget<MockDriver>) {
        let driver = Arc::new(MockDriver::new(board));
        let device = Phidget::create(driver.clone()).unwrap();
        device.open(None).unwrap();
        device.wait_for_attachment(Duration::from_millis(100)).unwrap();
        (driver, device)
    }

    #[test]
    fn test_create_is_not_attached() {
        let driver = Arc::new(MockDriver::default());
        let device = Phidget::create(driver).unwrap();
        assert!(!device.is_attached().unwrap());
        assert_eq!(
            device.serial_number().unwrap_err().kind(),
            ErrorCode::NotAttached
        );
    }

    #[test]
    fn test_open_and_attach_reports_identity() {
        let board = MockBoard::three_axis().with_serial(4242).with_version(102);
        let (_driver, device) = attached(board);
        assert!(device.is_attached().unwrap());
        assert_eq!(device.serial_number().unwrap(), 4242);
        assert_eq!(device.device_version().unwrap(), 102);
        assert_eq!(device.device_name().unwrap(), "Phidget Accelerometer 3-axis");
    }

    #[test]
    fn test_wait_times_out_when_unplugged() {
        let driver = Arc::new(MockDriver::default());
        driver.unplug();
        let device = Phidget::create(driver).unwrap();
        device.open(None).unwrap();
        let err = device
            .wait_for_attachment(Duration::from_millis(20))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorCode::Timeout);
    }

    #[test]
    fn test_timeout_rounds_up_to_whole_millis() {
        assert_eq!(timeout_millis(Duration::ZERO), 0);
        assert_eq!(timeout_millis(Duration::from_nanos(1)), 1);
        assert_eq!(timeout_millis(Duration::from_micros(500)), 1);
        assert_eq!(timeout_millis(Duration::from_millis(250)), 250);
        assert_eq!(timeout_millis(Duration::from_nanos(1_000_001)), 2);
        assert_eq!(timeout_millis(Duration::from_secs(u64::MAX)), c_int::MAX);
    }

    #[test]
    fn test_sub_millisecond_wait_is_bounded() {
        let driver = Arc::new(MockDriver::default());
        driver.unplug();
        let device = Phidget::create(driver).unwrap();
        device.open(None).unwrap();

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let result = device.wait_for_attachment(Duration::from_micros(500));
            let _ = tx.send(result);
        });

        let result = rx
            .recv_timeout(Duration::from_secs(2))
            .expect("wait_for_attachment blocked past its timeout");
        assert_eq!(result.unwrap_err().kind(), ErrorCode::Timeout);
    }

    #[test]
    fn test_wrong_serial_never_attaches() {
        let driver = Arc::new(MockDriver::new(MockBoard::two_axis().with_serial(1)));
        let device = Phidget::create(driver).unwrap();
        device.open(Some(2)).unwrap();
        assert!(device
            .wait_for_attachment(Duration::from_millis(10))
            .is_err());
        assert!(!device.is_attached().unwrap());
    }

    #[test]
    fn test_close_deletes_native_object() {
        let (driver, device) = attached(MockBoard::two_axis());
        assert_eq!(driver.live_handles(), 1);
        device.close().unwrap();
        assert_eq!(driver.live_handles(), 0);
    }

    #[test]
    fn test_drop_deletes_native_object() {
        let (driver, device) = attached(MockBoard::two_axis());
        drop(device);
        assert_eq!(driver.live_handles(), 0);
    }
}
