//! Control-bus seams for the codec drivers.
//!
//! Two very different transports sit underneath the drivers:
//!
//! - [`RegisterBus`]: sub-addressed register writes over an I²C-style serial
//!   bus. The TAS3001C is written this way and cannot be read back, so the
//!   trait deliberately has no read operation.
//! - [`AwacsPort`]: the memory-mapped AWACS/Screamer codec-control port,
//!   which takes complete 12-bit control words tagged with their register
//!   number, and exposes a status word with jack-sense and revision fields.
//!
//! Neither transport retries. Retry policy belongs to the caller (the reset
//! sequencer), which knows the acceptable bound and what a partial failure
//! leaves behind.

use embedded_hal_async::i2c::{Error as _, ErrorKind, I2c};
use heapless::Vec;

use crate::audio_types::I2cAddr;

/// Largest frame a single register write can produce: one sub-address byte
/// plus the widest register (a 15-byte biquad).
pub const MAX_FRAME_LEN: usize = 16;

// ── Error type ───────────────────────────────────────────────────────────────

/// Register bus transaction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The device did not acknowledge its address or a data byte.
    #[error("device did not acknowledge")]
    NoAcknowledge,
    /// Another master won arbitration or the bus is wedged.
    #[error("bus arbitration lost or bus busy")]
    Arbitration,
    /// The payload does not fit in one bus frame.
    #[error("register payload exceeds the bus frame")]
    FrameTooLong,
    /// Any other controller-reported failure.
    #[error("bus transaction failed")]
    Other,
}

impl BusError {
    /// Classify an embedded-hal I²C error kind.
    pub fn from_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::NoAcknowledge,
            ErrorKind::ArbitrationLoss | ErrorKind::Bus => Self::Arbitration,
            _ => Self::Other,
        }
    }
}

// ── RegisterBus ──────────────────────────────────────────────────────────────

/// Sub-addressed register writes on a serial control bus.
///
/// Implementations must hold exclusive access to the bus for the duration of
/// one call and release it on every exit path, including failure. A failed
/// transaction is reported, never retried.
pub trait RegisterBus {
    /// Write `bytes` to sub-address `register` of the device at `addr`.
    async fn transact(&mut self, addr: I2cAddr, register: u8, bytes: &[u8])
        -> Result<(), BusError>;
}

/// [`RegisterBus`] over any `embedded_hal_async::i2c::I2c` device.
///
/// Exclusive access comes from the `&mut` borrow of the I²C device. When the
/// bus is shared with other devices, pass an `embedded-hal-bus` shared
/// device; its lock is held exactly for the one `write` call.
pub struct I2cRegisterBus<I> {
    i2c: I,
}

impl<I: I2c> I2cRegisterBus<I> {
    /// Wrap an async I²C device.
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Release the wrapped I²C device.
    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cRegisterBus<I> {
    async fn transact(
        &mut self,
        addr: I2cAddr,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), BusError> {
        let mut frame: Vec<u8, MAX_FRAME_LEN> = Vec::new();
        frame.push(register).map_err(|_| BusError::FrameTooLong)?;
        frame
            .extend_from_slice(bytes)
            .map_err(|_| BusError::FrameTooLong)?;
        self.i2c
            .write(addr.get(), &frame)
            .await
            .map_err(|e| BusError::from_kind(e.kind()))
    }
}

// ── AwacsPort ────────────────────────────────────────────────────────────────

/// Memory-mapped AWACS/Screamer codec port.
///
/// Control words carry their register number in bits 12..=14 and the 12-bit
/// register payload in bits 0..=11. Register writes are posted; the port
/// itself waits for the codec to accept the previous word.
pub trait AwacsPort {
    /// Post one tagged control word.
    fn write_control(&mut self, word: u32);

    /// Read a control register back. Only Screamer parts implement read-back;
    /// AWACS returns garbage and callers must not rely on it.
    fn read_control(&mut self, register: u8) -> u32;

    /// Read the codec status word.
    fn read_status(&mut self) -> u32;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[tokio::test]
    async fn transact_prefixes_sub_address() {
        let expectations = [I2cTransaction::write(0x34, vec![0x04, 1, 2, 3, 4, 5, 6])];
        let mut bus = I2cRegisterBus::new(I2cMock::new(&expectations));

        bus.transact(I2cAddr::TAS3001C, 0x04, &[1, 2, 3, 4, 5, 6])
            .await
            .unwrap();

        bus.into_inner().done();
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected_before_the_bus() {
        let mut bus = I2cRegisterBus::new(I2cMock::new(&[]));
        let payload = [0u8; MAX_FRAME_LEN];

        let err = bus.transact(I2cAddr::TAS3001C, 0x0A, &payload).await;

        assert_eq!(err, Err(BusError::FrameTooLong));
        bus.into_inner().done();
    }

    #[tokio::test]
    async fn controller_errors_are_reported_not_retried() {
        let expectations = [I2cTransaction::write(0x34, vec![0x01, 0x60])
            .with_error(ErrorKind::Other)];
        let mut bus = I2cRegisterBus::new(I2cMock::new(&expectations));

        let err = bus.transact(I2cAddr::TAS3001C, 0x01, &[0x60]).await;

        assert_eq!(err, Err(BusError::Other));
        // A single expectation: a retry would have tripped the mock.
        bus.into_inner().done();
    }

    #[test]
    fn no_acknowledge_kind_is_classified() {
        let kind = ErrorKind::NoAcknowledge(embedded_hal_async::i2c::NoAcknowledgeSource::Address);
        assert_eq!(BusError::from_kind(kind), BusError::NoAcknowledge);
        assert_eq!(BusError::from_kind(ErrorKind::ArbitrationLoss), BusError::Arbitration);
        assert_eq!(BusError::from_kind(ErrorKind::Overrun), BusError::Other);
    }
}
