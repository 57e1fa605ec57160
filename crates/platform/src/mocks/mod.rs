//! Mock implementations for testing
//!
//! Every mock writes into one shared [`Trace`], so a test can assert on the
//! exact interleaving of bus writes, GPIO edges and delays a driver produced
//! (for example "speaker muted, then 200 ms, then headphones muted").

#![cfg(any(test, feature = "std"))]
// Mock bookkeeping: counters and register indices stay far below their bounds
// in tests, and control-word fields are masked before use.
#![allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embassy_time::Duration;

use crate::audio_types::I2cAddr;
use crate::bus::{AwacsPort, BusError, RegisterBus};

// ── Trace ────────────────────────────────────────────────────────────────────

/// One observable side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A register write that reached the device.
    BusWrite {
        /// 7-bit device address.
        addr: u8,
        /// Sub-address.
        register: u8,
        /// Payload bytes.
        bytes: Vec<u8>,
    },
    /// A register write the mock bus rejected.
    BusFailed {
        /// Sub-address.
        register: u8,
    },
    /// An output pin was driven.
    Pin {
        /// Name given to the mock pin.
        name: &'static str,
        /// Electrical level driven.
        high: bool,
    },
    /// A delay was awaited.
    Delay(Duration),
    /// A control word was posted to the codec port.
    PortWrite(u32),
}

/// Shared, append-only log of [`TraceEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<TraceEvent>>>);

impl Trace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }

    /// Snapshot of every event so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.0.borrow().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Successful bus writes as `(register, bytes)` pairs, in order.
    pub fn bus_writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::BusWrite {
                    register, bytes, ..
                } => Some((*register, bytes.clone())),
                _ => None,
            })
            .collect()
    }

    /// Sub-addresses of successful bus writes, in order.
    pub fn registers_written(&self) -> Vec<u8> {
        self.bus_writes().into_iter().map(|(r, _)| r).collect()
    }

    /// Edges driven on the named pin, in order.
    pub fn pin_edges(&self, name: &str) -> Vec<bool> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Pin { name: n, high } if *n == name => Some(*high),
                _ => None,
            })
            .collect()
    }

    /// Every awaited delay, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Delay(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Control words posted to the codec port, in order.
    pub fn port_writes(&self) -> Vec<u32> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::PortWrite(w) => Some(*w),
                _ => None,
            })
            .collect()
    }
}

// ── MockBus ──────────────────────────────────────────────────────────────────

/// Register bus that records writes and fails on command.
pub struct MockBus {
    trace: Trace,
    /// Number of transactions attempted, including failed ones.
    pub transactions: usize,
    fail_next: usize,
    fail_at: Vec<usize>,
}

impl MockBus {
    /// Create a bus recording into `trace`.
    pub fn new(trace: Trace) -> Self {
        Self {
            trace,
            transactions: 0,
            fail_next: 0,
            fail_at: Vec::new(),
        }
    }

    /// Fail the next `count` transactions.
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }

    /// Fail the transaction with the given zero-based sequence number.
    pub fn fail_transaction(&mut self, index: usize) {
        self.fail_at.push(index);
    }
}

impl RegisterBus for MockBus {
    async fn transact(
        &mut self,
        addr: I2cAddr,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), BusError> {
        let index = self.transactions;
        self.transactions += 1;

        if self.fail_next > 0 || self.fail_at.contains(&index) {
            self.fail_next = self.fail_next.saturating_sub(1);
            self.trace.push(TraceEvent::BusFailed { register });
            return Err(BusError::NoAcknowledge);
        }

        self.trace.push(TraceEvent::BusWrite {
            addr: addr.get(),
            register,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

// ── MockPin ──────────────────────────────────────────────────────────────────

/// GPIO pin usable as input and output.
///
/// Clones share the same level, so a test can keep one clone to move a sense
/// line while the driver owns the other.
#[derive(Debug, Clone)]
pub struct MockPin {
    name: &'static str,
    level: Rc<Cell<bool>>,
    trace: Trace,
}

impl MockPin {
    /// Create a pin at electrical level `high`.
    pub fn new(name: &'static str, high: bool, trace: Trace) -> Self {
        Self {
            name,
            level: Rc::new(Cell::new(high)),
            trace,
        }
    }

    /// Move the electrical level without recording an edge.
    pub fn set_level(&self, high: bool) {
        self.level.set(high);
    }

    /// Current electrical level.
    pub fn level(&self) -> bool {
        self.level.get()
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.set(true);
        self.trace.push(TraceEvent::Pin {
            name: self.name,
            high: true,
        });
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.set(false);
        self.trace.push(TraceEvent::Pin {
            name: self.name,
            high: false,
        });
        Ok(())
    }
}

impl embedded_hal::digital::InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.level.get())
    }
}

// ── MockDelay ────────────────────────────────────────────────────────────────

/// Delay provider that returns immediately and records what was asked for.
#[derive(Debug, Clone)]
pub struct MockDelay {
    trace: Trace,
}

impl MockDelay {
    /// Create a delay recording into `trace`.
    pub fn new(trace: Trace) -> Self {
        Self { trace }
    }
}

impl embedded_hal_async::delay::DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.trace
            .push(TraceEvent::Delay(Duration::from_nanos(u64::from(ns))));
    }

    async fn delay_us(&mut self, us: u32) {
        self.trace
            .push(TraceEvent::Delay(Duration::from_micros(u64::from(us))));
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.trace
            .push(TraceEvent::Delay(Duration::from_millis(u64::from(ms))));
    }
}

// ── MockAwacsPort ────────────────────────────────────────────────────────────

/// Codec-control port backed by an eight-slot register file.
///
/// Writes land in the register file so that read-back behaves like a
/// Screamer. The status word is shared between clones so a test can move the
/// jack-sense bits while the driver owns the port.
#[derive(Debug, Clone)]
pub struct MockAwacsPort {
    registers: Rc<RefCell<[u32; 8]>>,
    status: Rc<Cell<u32>>,
    trace: Trace,
}

impl MockAwacsPort {
    /// Create a port with all registers zero and the given status word.
    pub fn new(status: u32, trace: Trace) -> Self {
        Self {
            registers: Rc::new(RefCell::new([0; 8])),
            status: Rc::new(Cell::new(status)),
            trace,
        }
    }

    /// Replace the status word.
    pub fn set_status(&self, status: u32) {
        self.status.set(status);
    }

    /// Preload a register (as if left there by firmware).
    pub fn preload(&self, register: u8, value: u32) {
        self.registers.borrow_mut()[usize::from(register & 0x7)] = value & 0xFFF;
    }

    /// Current contents of a register.
    pub fn register(&self, register: u8) -> u32 {
        self.registers.borrow()[usize::from(register & 0x7)]
    }
}

impl AwacsPort for MockAwacsPort {
    fn write_control(&mut self, word: u32) {
        let register = ((word >> 12) & 0x7) as usize;
        self.registers.borrow_mut()[register] = word & 0xFFF;
        self.trace.push(TraceEvent::PortWrite(word));
    }

    fn read_control(&mut self, register: u8) -> u32 {
        self.register(register)
    }

    fn read_status(&mut self) -> u32 {
        self.status.get()
    }
}
