//! A software reader for tests and hardware-less kiosks.
//!
//! [`SimulatedReader`] behaves like a real device from the kiosk's point of
//! view: it must be opened and attached before it accepts commands, it
//! reports events through the registered [`EventSink`], and it remembers
//! antenna and LED state so tests can assert on them.
//!
//! Handles are clones of one shared device. A test keeps one handle to
//! "present" cards while the kiosk owns another.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{DeviceInfo, EventSink, Reader, ReaderError, ReaderEvent};

const SIMULATED_SERIAL: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    None,
    /// `open` fails.
    Open,
    /// `wait_for_attach` never sees a device.
    Attach,
}

#[derive(Debug)]
struct Device {
    fault: Fault,
    sink: Mutex<Option<EventSink>>,
    attached: AtomicBool,
    antenna_on: AtomicBool,
    led_on: AtomicBool,
    /// Number of `set_led_on` calls, for tests that count toggles.
    led_writes: AtomicUsize,
    /// Events that made it into the sink.
    delivered: AtomicU64,
}

/// An in-memory RFID reader.
#[derive(Debug, Clone)]
pub struct SimulatedReader {
    device: Arc<Device>,
}

impl SimulatedReader {
    /// A reader that opens and attaches normally.
    pub fn new() -> Self {
        Self::with_fault(Fault::None)
    }

    /// A reader whose `open` fails, like a missing driver.
    pub fn failing_open() -> Self {
        Self::with_fault(Fault::Open)
    }

    /// A reader that opens but never attaches, like an unplugged device.
    pub fn never_attaches() -> Self {
        Self::with_fault(Fault::Attach)
    }

    fn with_fault(fault: Fault) -> Self {
        Self {
            device: Arc::new(Device {
                fault,
                sink: Mutex::new(None),
                attached: AtomicBool::new(false),
                antenna_on: AtomicBool::new(false),
                led_on: AtomicBool::new(false),
                led_writes: AtomicUsize::new(0),
                delivered: AtomicU64::new(0),
            }),
        }
    }

    /// Brings a card into the field. Returns `false` if the event could not
    /// be delivered (not attached, or the kiosk is not listening).
    pub fn present(&self, tag: &str) -> bool {
        self.emit_when_attached(ReaderEvent::TagGained(tag.to_owned()))
    }

    /// Takes a card out of the field.
    pub fn remove(&self, tag: &str) -> bool {
        self.emit_when_attached(ReaderEvent::TagLost(tag.to_owned()))
    }

    /// Unplugs the device.
    pub fn detach(&self) -> bool {
        if !self.device.attached.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.emit(ReaderEvent::Detach {
            serial: SIMULATED_SERIAL,
        })
    }

    /// Reports an arbitrary event, attached or not.
    pub fn emit(&self, event: ReaderEvent) -> bool {
        // Clone the sink out so the lock is not held across the send.
        let sink = self.lock_sink().clone();
        let delivered = match sink {
            Some(sink) => sink.emit(event),
            None => false,
        };
        if delivered {
            self.device.delivered.fetch_add(1, Ordering::SeqCst);
        }
        delivered
    }

    /// Number of events delivered to the kiosk so far, the attach event
    /// included. Dropped events are not counted.
    pub fn delivered(&self) -> u64 {
        self.device.delivered.load(Ordering::SeqCst)
    }

    pub fn is_attached(&self) -> bool {
        self.device.attached.load(Ordering::SeqCst)
    }

    pub fn antenna_on(&self) -> bool {
        self.device.antenna_on.load(Ordering::SeqCst)
    }

    pub fn led_on(&self) -> bool {
        self.device.led_on.load(Ordering::SeqCst)
    }

    pub fn led_writes(&self) -> usize {
        self.device.led_writes.load(Ordering::SeqCst)
    }

    fn emit_when_attached(&self, event: ReaderEvent) -> bool {
        if !self.is_attached() {
            tracing::debug!(%event, "simulated reader not attached, event ignored");
            return false;
        }
        self.emit(event)
    }

    fn lock_sink(&self) -> std::sync::MutexGuard<'_, Option<EventSink>> {
        // A poisoned lock only means a test thread panicked mid-emit; the
        // Option inside is still usable.
        self.device
            .sink
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "Simulated RFID Reader".into(),
            serial: SIMULATED_SERIAL,
            version: 1,
            outputs: 2,
            antenna_on: self.antenna_on(),
            led_on: self.led_on(),
        }
    }

    fn require_attached(&self) -> Result<(), ReaderError> {
        if self.is_attached() {
            Ok(())
        } else {
            Err(ReaderError::NotAttached)
        }
    }
}

impl Default for SimulatedReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for SimulatedReader {
    fn open(&self, sink: EventSink) -> Result<(), ReaderError> {
        if self.device.fault == Fault::Open {
            return Err(ReaderError::OpenFailed(
                "simulated driver unavailable".into(),
            ));
        }
        *self.lock_sink() = Some(sink);
        Ok(())
    }

    async fn wait_for_attach(
        &self,
        timeout: Duration,
    ) -> Result<DeviceInfo, ReaderError> {
        if self.device.fault == Fault::Attach {
            tokio::time::sleep(timeout).await;
            return Err(ReaderError::AttachTimeout(timeout));
        }
        if self.lock_sink().is_none() {
            return Err(ReaderError::OpenFailed("reader was never opened".into()));
        }

        self.device.attached.store(true, Ordering::SeqCst);
        self.emit(ReaderEvent::Attach {
            serial: SIMULATED_SERIAL,
        });
        Ok(self.info())
    }

    fn set_antenna_on(&self, on: bool) -> Result<(), ReaderError> {
        self.require_attached()?;
        self.device.antenna_on.store(on, Ordering::SeqCst);
        Ok(())
    }

    fn set_led_on(&self, on: bool) -> Result<(), ReaderError> {
        self.require_attached()?;
        self.device.led_on.store(on, Ordering::SeqCst);
        self.device.led_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<(), ReaderError> {
        self.device.attached.store(false, Ordering::SeqCst);
        *self.lock_sink() = None;
        Ok(())
    }
}
