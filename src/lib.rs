//! Safe bindings for Phidget accelerometers on the `phidget21` driver.
//!
//! The crate is layered:
//!
//! - [`driver`]: the [`PhidgetDriver`] seam, one method per native call,
//!   returning raw status codes. [`native::NativeDriver`] (feature
//!   `phidget_hardware`) forwards to the vendor library; [`mock::MockDriver`]
//!   (feature `mock`, on by default) simulates a board in-process.
//! - [`device`]: [`Phidget`], owning the native object from create to delete.
//! - [`accelerometer`]: [`Accelerometer`], typed accessors and the
//!   acceleration change handler.
//! - [`config`] and [`logging`]: runtime settings and tracing setup for
//!   the `accel_monitor` binary.
//!
//! ```rust,ignore
//! use phidget_accel::{MockDriver, Phidget};
//!
//! let device = Phidget::create(Arc::new(MockDriver::default()))?;
//! device.open(None)?;
//! device.wait_for_attachment(Duration::from_secs(1))?;
//! device
//!     .accelerometer()
//!     .set_on_acceleration_change_handler(|c| println!("{}: {}", c.axis, c.acceleration))?;
//! ```

pub mod accelerometer;
pub mod config;
pub mod device;
pub mod driver;
pub mod error;
pub mod handler;
pub mod logging;
#[cfg(feature = "mock")]
pub mod mock;
#[cfg(feature = "phidget_hardware")]
pub mod native;

pub use accelerometer::{Accelerometer, Axis, MAX_CHANNEL_CAPACITY};
pub use config::AccelConfig;
pub use device::Phidget;
pub use driver::{DeviceHandle, PhidgetDriver};
pub use error::{DriverResult, Error, ErrorCode, NativeDriverError, Result};
pub use handler::{AccelerationChange, AccelerationHandler, HandlerSlot};
#[cfg(feature = "mock")]
pub use mock::{MockAxis, MockBoard, MockDriver};
#[cfg(feature = "phidget_hardware")]
pub use native::NativeDriver;
