//! Simulated phidget21 driver.
//!
//! [`MockDriver`] implements [`PhidgetDriver`] in-process against one
//! simulated board, so everything above the driver seam can be exercised
//! without the vendor library or hardware. Status codes follow what the
//! native library returns for the same situations.
//!
//! Change events are produced with [`MockDriver::inject_acceleration`], which
//! applies the per-handle change trigger and calls the registered callback
//! the same way the native event thread does: through the raw function
//! pointer, with the registered user pointer, outside any internal lock.
//! `close` and `delete` wait for callbacks already running on other threads,
//! as the native library joins its event thread; a callback that has not
//! started yet re-reads the registration and is skipped once the handle is
//! closed or deleted.
//!
//! # Example
//!
//! ```rust,ignore
//! let driver = Arc::new(MockDriver::new(MockBoard::three_axis()));
//! let device = Phidget::create(driver.clone())?;
//! device.open(None)?;
//! device.wait_for_attachment(Duration::from_millis(100))?;
//! driver.inject_acceleration(2, 1.0);
//! assert_eq!(device.accelerometer().acceleration(2)?, 1.0);
//! ```

#![allow(unsafe_code)]

use std::collections::HashMap;
use std::ffi::{c_double, c_int, c_void};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};
use phidget21_sys::{self as sys, AccelerationChangeHandler, CPhidgetAccelerometerHandle};
use tracing::{debug, trace, warn};

use crate::device::Phidget;
use crate::driver::{DeviceHandle, PhidgetDriver};

/// First fake handle address; later handles follow at `HANDLE_STRIDE`.
const HANDLE_BASE: usize = 0x1000;
const HANDLE_STRIDE: usize = 0x10;

/// One axis of a simulated board.
#[derive(Debug, Clone, PartialEq)]
pub struct MockAxis {
    /// Saturation floor, in g.
    pub min: f64,
    /// Saturation ceiling, in g.
    pub max: f64,
    /// Reading reported before anything is injected. `None` reports
    /// `EPHIDGET_UNKNOWNVAL` until the first injection.
    pub initial: Option<f64>,
}

impl MockAxis {
    fn symmetric(limit: f64, initial: f64) -> Self {
        Self {
            min: -limit,
            max: limit,
            initial: Some(initial),
        }
    }
}

/// Identity and axes of the simulated board.
#[derive(Debug, Clone, PartialEq)]
pub struct MockBoard {
    /// Reported by `device_name`.
    pub name: String,
    /// Reported by `serial_number`; matched against the serial given to `open`.
    pub serial: i32,
    /// Reported by `device_version`.
    pub version: i32,
    /// One entry per axis, in index order.
    pub axes: Vec<MockAxis>,
}

impl MockBoard {
    /// 2-axis board, ±5 g, lying flat.
    pub fn two_axis() -> Self {
        Self {
            name: "Phidget Accelerometer 2-axis".to_string(),
            serial: 10053,
            version: 300,
            axes: vec![MockAxis::symmetric(5.1, 0.0), MockAxis::symmetric(5.1, 0.0)],
        }
    }

    /// 3-axis board, ±3 g, lying flat (z reads 1 g).
    pub fn three_axis() -> Self {
        Self {
            name: "Phidget Accelerometer 3-axis".to_string(),
            serial: 10059,
            version: 400,
            axes: vec![
                MockAxis::symmetric(3.1, 0.0),
                MockAxis::symmetric(3.1, 0.0),
                MockAxis::symmetric(3.1, 1.0),
            ],
        }
    }

    /// Same board with another serial number.
    pub fn with_serial(mut self, serial: i32) -> Self {
        self.serial = serial;
        self
    }

    /// Same board with another firmware version.
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Report every axis as unknown until the first injection.
    pub fn without_initial_readings(mut self) -> Self {
        for axis in &mut self.axes {
            axis.initial = None;
        }
        self
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::three_axis()
    }
}

/// Per-object state, i.e. what the native library keeps per handle.
struct HandleState {
    opened_serial: Option<c_int>,
    triggers: Vec<f64>,
    last_delivered: Vec<Option<f64>>,
    callback: AccelerationChangeHandler,
    // Stored as an address so the state stays Send.
    user_ptr: usize,
    // Threads currently inside this handle's callback.
    delivering: Vec<ThreadId>,
    // Set by delete; no callback starts afterwards.
    retired: bool,
}

impl HandleState {
    fn new(axes: usize) -> Self {
        Self {
            opened_serial: None,
            triggers: vec![0.0; axes],
            last_delivered: vec![None; axes],
            callback: None,
            user_ptr: 0,
            delivering: Vec::new(),
            retired: false,
        }
    }
}

struct MockState {
    board: MockBoard,
    readings: Vec<Option<f64>>,
    plugged: bool,
    next_handle: usize,
    handles: HashMap<usize, HandleState>,
}

impl MockState {
    fn is_attached(&self, handle: &HandleState) -> bool {
        match handle.opened_serial {
            Some(serial) => {
                self.plugged && (serial == sys::PHIDGET_ANY_SERIAL || serial == self.board.serial)
            }
            None => false,
        }
    }

    /// Look up an attached handle, or return the status the library would.
    fn attached(&self, handle: DeviceHandle) -> Result<&HandleState, c_int> {
        let state = self
            .handles
            .get(&handle.addr())
            .ok_or(sys::EPHIDGET_INVALIDARG)?;
        if self.is_attached(state) {
            Ok(state)
        } else {
            Err(sys::EPHIDGET_NOTATTACHED)
        }
    }

    fn axis(&self, index: c_int) -> Result<usize, c_int> {
        usize::try_from(index)
            .ok()
            .filter(|&axis| axis < self.board.axes.len())
            .ok_or(sys::EPHIDGET_OUTOFBOUNDS)
    }
}

/// A claimed callback invocation, taken under the lock and run after it.
struct Delivery {
    callback: unsafe extern "system" fn(
        CPhidgetAccelerometerHandle,
        *mut c_void,
        c_int,
        c_double,
    ) -> c_int,
    handle: usize,
    user_ptr: usize,
}

/// In-process stand-in for the phidget21 library with one simulated board.
pub struct MockDriver {
    state: Mutex<MockState>,
    attach_changed: Condvar,
    delivery_done: Condvar,
}

impl MockDriver {
    /// Simulate `board`, plugged in.
    pub fn new(board: MockBoard) -> Self {
        let readings = board.axes.iter().map(|axis| axis.initial).collect();
        Self {
            state: Mutex::new(MockState {
                board,
                readings,
                plugged: true,
                next_handle: HANDLE_BASE,
                handles: HashMap::new(),
            }),
            attach_changed: Condvar::new(),
            delivery_done: Condvar::new(),
        }
    }

    /// A copy of the simulated board description.
    pub fn board(&self) -> MockBoard {
        self.state.lock().board.clone()
    }

    /// Number of native objects created and not yet deleted.
    pub fn live_handles(&self) -> usize {
        self.state.lock().handles.len()
    }

    /// Whether `device` has a callback registered with this driver.
    pub fn has_callback(&self, device: &Phidget<MockDriver>) -> bool {
        self.has_callback_on(device.handle())
    }

    pub(crate) fn has_callback_on(&self, handle: DeviceHandle) -> bool {
        self.state
            .lock()
            .handles
            .get(&handle.addr())
            .is_some_and(|h| h.callback.is_some())
    }

    /// Physically connect the board.
    pub fn plug(&self) {
        self.state.lock().plugged = true;
        self.attach_changed.notify_all();
        debug!("Mock board plugged in");
    }

    /// Physically disconnect the board.
    pub fn unplug(&self) {
        let mut state = self.state.lock();
        state.plugged = false;
        for handle in state.handles.values_mut() {
            handle.last_delivered.fill(None);
        }
        drop(state);
        self.attach_changed.notify_all();
        debug!("Mock board unplugged");
    }

    /// Feed a new sample for `axis`, as the board would report it.
    ///
    /// The value is clamped to the axis range. Every attached handle with a
    /// callback receives an event if the value moved by at least its change
    /// trigger since its last event on that axis. Returns the number of
    /// callbacks invoked.
    pub fn inject_acceleration(&self, axis: usize, value: f64) -> usize {
        let (clamped, targets) = {
            let mut state = self.state.lock();
            let Some(range) = state.board.axes.get(axis).cloned() else {
                warn!(axis, "Ignoring sample for missing axis");
                return 0;
            };
            let clamped = value.clamp(range.min, range.max);
            state.readings[axis] = Some(clamped);

            let MockState {
                board,
                plugged,
                handles,
                ..
            } = &mut *state;
            let mut targets = Vec::new();
            for (&addr, handle) in handles.iter_mut() {
                let attached = *plugged
                    && handle.opened_serial.is_some_and(|serial| {
                        serial == sys::PHIDGET_ANY_SERIAL || serial == board.serial
                    });
                if handle.callback.is_none() || !attached {
                    continue;
                }
                let fire = match handle.last_delivered[axis] {
                    Some(last) => (clamped - last).abs() >= handle.triggers[axis],
                    None => true,
                };
                if fire {
                    handle.last_delivered[axis] = Some(clamped);
                    targets.push(addr);
                }
            }
            (clamped, targets)
        };

        let index = axis as c_int;
        let delivered = targets
            .into_iter()
            .filter(|&addr| self.deliver(addr, index, clamped, true).is_some())
            .count();
        trace!(axis, value = clamped, events = delivered, "Injected sample");
        delivered
    }

    /// Invoke `device`'s registered callback directly, bypassing triggers
    /// and attachment. Returns the callback's status, or `None` if no
    /// callback is registered.
    pub fn fire_raw_event(
        &self,
        device: &Phidget<MockDriver>,
        index: c_int,
        value: f64,
    ) -> Option<c_int> {
        self.fire_raw_event_on(device.handle(), index, value)
    }

    pub(crate) fn fire_raw_event_on(
        &self,
        handle: DeviceHandle,
        index: c_int,
        value: f64,
    ) -> Option<c_int> {
        self.deliver(handle.addr(), index, value, false)
    }

    /// Run the callback currently registered on `addr`.
    ///
    /// The registration is read under the lock, so a handle closed or
    /// deleted since the event was generated gets nothing. The calling
    /// thread stays recorded on the handle until the callback returns.
    fn deliver(&self, addr: usize, index: c_int, value: f64, attached_only: bool) -> Option<c_int> {
        let me = thread::current().id();
        let delivery = {
            let mut guard = self.state.lock();
            let state: &mut MockState = &mut guard;
            let h = state.handles.get(&addr)?;
            if h.retired || (attached_only && !state.is_attached(h)) {
                return None;
            }
            let delivery = Delivery {
                callback: h.callback?,
                handle: addr,
                user_ptr: h.user_ptr,
            };
            state.handles.get_mut(&addr)?.delivering.push(me);
            delivery
        };

        let status = run_callback(&delivery, index, value);

        let mut state = self.state.lock();
        if let Some(h) = state.handles.get_mut(&addr) {
            if let Some(pos) = h.delivering.iter().position(|id| *id == me) {
                h.delivering.swap_remove(pos);
            }
        }
        drop(state);
        self.delivery_done.notify_all();
        Some(status)
    }

    /// Block until no other thread is inside a callback of `addr`.
    ///
    /// The current thread is exempt, so a handler may close its own device.
    fn wait_for_deliveries(&self, state: &mut MutexGuard<'_, MockState>, addr: usize) {
        let me = thread::current().id();
        while state
            .handles
            .get(&addr)
            .is_some_and(|h| h.delivering.iter().any(|id| *id != me))
        {
            self.delivery_done.wait(state);
        }
    }

    fn with_attached<F>(&self, handle: DeviceHandle, f: F) -> c_int
    where
        F: FnOnce(&MockState, &HandleState) -> Result<(), c_int>,
    {
        let guard = self.state.lock();
        let state: &MockState = &guard;
        match state.attached(handle).and_then(|h| f(state, h)) {
            Ok(()) => sys::EPHIDGET_OK,
            Err(code) => code,
        }
    }

    fn read_axis<F>(&self, handle: DeviceHandle, index: c_int, out: &mut c_double, f: F) -> c_int
    where
        F: FnOnce(&MockState, &HandleState, usize) -> Result<f64, c_int>,
    {
        self.with_attached(handle, |state, h| {
            let axis = state.axis(index)?;
            *out = f(state, h, axis)?;
            Ok(())
        })
    }

    fn wait_attached(
        &self,
        state: &mut MutexGuard<'_, MockState>,
        handle: DeviceHandle,
        deadline: Option<Instant>,
    ) -> c_int {
        let mut expired = false;
        loop {
            let Some(h) = state.handles.get(&handle.addr()) else {
                return sys::EPHIDGET_INVALIDARG;
            };
            if h.opened_serial.is_none() {
                return sys::EPHIDGET_CLOSED;
            }
            if state.is_attached(h) {
                return sys::EPHIDGET_OK;
            }
            if expired {
                return sys::EPHIDGET_TIMEOUT;
            }
            match deadline {
                Some(deadline) => {
                    expired = self.attach_changed.wait_until(state, deadline).timed_out();
                }
                None => self.attach_changed.wait(state),
            }
        }
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new(MockBoard::default())
    }
}

fn run_callback(delivery: &Delivery, index: c_int, value: f64) -> c_int {
    let phid = delivery.handle as CPhidgetAccelerometerHandle;
    let user_ptr = delivery.user_ptr as *mut c_void;
    // SAFETY: the callback and user pointer were registered together through
    // set_on_acceleration_change_handler, whose caller guarantees the user
    // pointer stays valid until the handle is deleted.
    let status = unsafe { (delivery.callback)(phid, user_ptr, index, value) };
    if status != sys::EVENT_CONTINUE {
        warn!(status, "Acceleration change callback returned an error");
    }
    status
}

impl PhidgetDriver for MockDriver {
    fn accelerometer_create(&self, handle: &mut CPhidgetAccelerometerHandle) -> c_int {
        let mut state = self.state.lock();
        let addr = state.next_handle;
        state.next_handle += HANDLE_STRIDE;
        let axes = state.board.axes.len();
        state.handles.insert(addr, HandleState::new(axes));
        *handle = addr as CPhidgetAccelerometerHandle;
        sys::EPHIDGET_OK
    }

    fn open(&self, handle: DeviceHandle, serial: c_int) -> c_int {
        let mut state = self.state.lock();
        let Some(h) = state.handles.get_mut(&handle.addr()) else {
            return sys::EPHIDGET_INVALIDARG;
        };
        if h.opened_serial.is_some() {
            return sys::EPHIDGET_DUPLICATE;
        }
        h.opened_serial = Some(serial);
        drop(state);
        self.attach_changed.notify_all();
        sys::EPHIDGET_OK
    }

    fn wait_for_attachment(&self, handle: DeviceHandle, timeout_ms: c_int) -> c_int {
        let deadline = match u64::try_from(timeout_ms) {
            Ok(0) | Err(_) => None,
            Ok(ms) => Some(Instant::now() + Duration::from_millis(ms)),
        };
        let mut state = self.state.lock();
        self.wait_attached(&mut state, handle, deadline)
    }

    fn close(&self, handle: DeviceHandle) -> c_int {
        let mut state = self.state.lock();
        let Some(h) = state.handles.get_mut(&handle.addr()) else {
            return sys::EPHIDGET_INVALIDARG;
        };
        h.opened_serial = None;
        h.last_delivered.fill(None);
        self.wait_for_deliveries(&mut state, handle.addr());
        drop(state);
        self.attach_changed.notify_all();
        sys::EPHIDGET_OK
    }

    fn delete(&self, handle: DeviceHandle) -> c_int {
        let mut state = self.state.lock();
        let Some(h) = state.handles.get_mut(&handle.addr()) else {
            return sys::EPHIDGET_INVALIDARG;
        };
        h.retired = true;
        self.wait_for_deliveries(&mut state, handle.addr());
        state.handles.remove(&handle.addr());
        sys::EPHIDGET_OK
    }

    fn device_status(&self, handle: DeviceHandle, status: &mut c_int) -> c_int {
        let state = self.state.lock();
        let Some(h) = state.handles.get(&handle.addr()) else {
            return sys::EPHIDGET_INVALIDARG;
        };
        *status = if state.is_attached(h) {
            sys::PHIDGET_ATTACHED
        } else {
            sys::PHIDGET_NOTATTACHED
        };
        sys::EPHIDGET_OK
    }

    fn serial_number(&self, handle: DeviceHandle, serial: &mut c_int) -> c_int {
        self.with_attached(handle, |state, _| {
            *serial = state.board.serial;
            Ok(())
        })
    }

    fn device_version(&self, handle: DeviceHandle, version: &mut c_int) -> c_int {
        self.with_attached(handle, |state, _| {
            *version = state.board.version;
            Ok(())
        })
    }

    fn device_name(&self, handle: DeviceHandle, name: &mut String) -> c_int {
        self.with_attached(handle, |state, _| {
            name.clone_from(&state.board.name);
            Ok(())
        })
    }

    fn axis_count(&self, handle: DeviceHandle, count: &mut c_int) -> c_int {
        self.with_attached(handle, |state, _| {
            *count = state.board.axes.len() as c_int;
            Ok(())
        })
    }

    fn acceleration(&self, handle: DeviceHandle, index: c_int, value: &mut c_double) -> c_int {
        self.read_axis(handle, index, value, |state, _, axis| {
            state.readings[axis].ok_or(sys::EPHIDGET_UNKNOWNVAL)
        })
    }

    fn acceleration_max(
        &self,
        handle: DeviceHandle,
        index: c_int,
        value: &mut c_double,
    ) -> c_int {
        self.read_axis(handle, index, value, |state, _, axis| {
            Ok(state.board.axes[axis].max)
        })
    }

    fn acceleration_min(
        &self,
        handle: DeviceHandle,
        index: c_int,
        value: &mut c_double,
    ) -> c_int {
        self.read_axis(handle, index, value, |state, _, axis| {
            Ok(state.board.axes[axis].min)
        })
    }

    fn change_trigger(&self, handle: DeviceHandle, index: c_int, value: &mut c_double) -> c_int {
        self.read_axis(handle, index, value, |_, h, axis| Ok(h.triggers[axis]))
    }

    fn set_change_trigger(&self, handle: DeviceHandle, index: c_int, value: c_double) -> c_int {
        let mut state = self.state.lock();
        let axis = match state.attached(handle).and_then(|_| state.axis(index)) {
            Ok(axis) => axis,
            Err(code) => return code,
        };
        let range = &state.board.axes[axis];
        if !(0.0..=range.max - range.min).contains(&value) {
            return sys::EPHIDGET_INVALIDARG;
        }
        if let Some(h) = state.handles.get_mut(&handle.addr()) {
            h.triggers[axis] = value;
        }
        sys::EPHIDGET_OK
    }

    fn set_on_acceleration_change_handler(
        &self,
        handle: DeviceHandle,
        callback: AccelerationChangeHandler,
        user_ptr: *mut c_void,
    ) -> c_int {
        let mut state = self.state.lock();
        let Some(h) = state.handles.get_mut(&handle.addr()) else {
            return sys::EPHIDGET_INVALIDARG;
        };
        h.callback = callback;
        h.user_ptr = user_ptr as usize;
        sys::EPHIDGET_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    unsafe extern "system" fn counting_callback(
        _phid: CPhidgetAccelerometerHandle,
        user_ptr: *mut c_void,
        _index: c_int,
        _value: c_double,
    ) -> c_int {
        let counter = unsafe { &*user_ptr.cast_const().cast::<AtomicUsize>() };
        counter.fetch_add(1, Ordering::SeqCst);
        sys::EVENT_CONTINUE
    }

    fn create(driver: &MockDriver) -> DeviceHandle {
        let mut raw = std::ptr::null_mut();
        assert_eq!(driver.accelerometer_create(&mut raw), sys::EPHIDGET_OK);
        unsafe { DeviceHandle::from_raw(raw) }.unwrap()
    }

    fn attached(driver: &MockDriver) -> DeviceHandle {
        let handle = create(driver);
        assert_eq!(driver.open(handle, -1), sys::EPHIDGET_OK);
        assert_eq!(driver.wait_for_attachment(handle, 10), sys::EPHIDGET_OK);
        handle
    }

    #[test]
    fn test_handles_are_distinct() {
        let driver = MockDriver::default();
        let a = create(&driver);
        let b = create(&driver);
        assert_ne!(a, b);
        assert_eq!(driver.live_handles(), 2);
    }

    #[test]
    fn test_unopened_handle_is_not_attached() {
        let driver = MockDriver::default();
        let handle = create(&driver);
        let mut value = 0.0;
        assert_eq!(
            driver.acceleration(handle, 0, &mut value),
            sys::EPHIDGET_NOTATTACHED
        );
        let mut count = 0;
        assert_eq!(driver.axis_count(handle, &mut count), sys::EPHIDGET_NOTATTACHED);
    }

    #[test]
    fn test_double_open_is_duplicate() {
        let driver = MockDriver::default();
        let handle = create(&driver);
        assert_eq!(driver.open(handle, -1), sys::EPHIDGET_OK);
        assert_eq!(driver.open(handle, -1), sys::EPHIDGET_DUPLICATE);
    }

    #[test]
    fn test_unknown_value_before_first_sample() {
        let driver = MockDriver::new(MockBoard::two_axis().without_initial_readings());
        let handle = attached(&driver);
        let mut value = 0.0;
        assert_eq!(
            driver.acceleration(handle, 0, &mut value),
            sys::EPHIDGET_UNKNOWNVAL
        );
        driver.inject_acceleration(0, 0.4);
        assert_eq!(driver.acceleration(handle, 0, &mut value), sys::EPHIDGET_OK);
        assert_eq!(value, 0.4);
    }

    #[test]
    fn test_trigger_upper_bound() {
        let driver = MockDriver::new(MockBoard::two_axis());
        let handle = attached(&driver);
        assert_eq!(driver.set_change_trigger(handle, 0, 10.2), sys::EPHIDGET_OK);
        assert_eq!(
            driver.set_change_trigger(handle, 0, 10.3),
            sys::EPHIDGET_INVALIDARG
        );
        assert_eq!(
            driver.set_change_trigger(handle, 5, 0.1),
            sys::EPHIDGET_OUTOFBOUNDS
        );
    }

    #[test]
    fn test_trigger_suppresses_small_changes() {
        let driver = MockDriver::default();
        let handle = attached(&driver);
        let counter = Arc::new(AtomicUsize::new(0));
        driver.set_on_acceleration_change_handler(
            handle,
            Some(counting_callback),
            Arc::as_ptr(&counter).cast_mut().cast(),
        );
        driver.set_change_trigger(handle, 0, 0.5);

        assert_eq!(driver.inject_acceleration(0, 0.0), 1);
        assert_eq!(driver.inject_acceleration(0, 0.3), 0);
        assert_eq!(driver.inject_acceleration(0, 0.6), 1);
        assert_eq!(driver.inject_acceleration(0, 0.2), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unplugged_board_delivers_nothing() {
        let driver = MockDriver::default();
        let handle = attached(&driver);
        let counter = Arc::new(AtomicUsize::new(0));
        driver.set_on_acceleration_change_handler(
            handle,
            Some(counting_callback),
            Arc::as_ptr(&counter).cast_mut().cast(),
        );
        driver.unplug();
        assert_eq!(driver.inject_acceleration(1, 0.9), 0);
        driver.plug();
        assert_eq!(driver.inject_acceleration(1, 0.9), 1);
    }

    #[test]
    fn test_fire_raw_event_without_callback() {
        let driver = MockDriver::default();
        let handle = attached(&driver);
        assert!(!driver.has_callback_on(handle));
        assert_eq!(driver.fire_raw_event_on(handle, 0, 0.1), None);
    }

    #[test]
    fn test_wait_wakes_on_plug() {
        let driver = Arc::new(MockDriver::default());
        driver.unplug();
        let handle = create(&driver);
        driver.open(handle, -1);

        let plugger = driver.clone();
        let thread = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            plugger.plug();
        });
        assert_eq!(driver.wait_for_attachment(handle, 2000), sys::EPHIDGET_OK);
        thread.join().unwrap();
    }

    #[test]
    fn test_wait_on_closed_handle() {
        let driver = MockDriver::default();
        let handle = create(&driver);
        assert_eq!(driver.wait_for_attachment(handle, 10), sys::EPHIDGET_CLOSED);
    }
}
