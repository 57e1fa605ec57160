//! GPIO control and sense lines with board-defined polarity
//!
//! Codec boards wire their reset, amplifier-mute and jack-sense lines with
//! whatever polarity the layout requires, so the drivers never talk about
//! "high" or "low". They assert, negate and sense through these wrappers,
//! which carry the active level read from the board description.

use embedded_hal::digital::{Error as _, ErrorKind, InputPin, OutputPin};

// ── Error type ───────────────────────────────────────────────────────────────

/// GPIO access failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("GPIO line access failed")]
pub struct GpioError;

impl GpioError {
    fn from_kind(_kind: ErrorKind) -> Self {
        Self
    }
}

// ── ActiveLevel ──────────────────────────────────────────────────────────────

/// Electrical level at which a line is considered asserted / active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Asserted when driven or read high.
    #[default]
    High,
    /// Asserted when driven or read low.
    Low,
}

impl ActiveLevel {
    /// Map a logical state to the electrical "is high" level.
    #[must_use]
    pub const fn drive_high(self, asserted: bool) -> bool {
        match self {
            Self::High => asserted,
            Self::Low => !asserted,
        }
    }

    /// Build from a raw "active state" word as found in board properties.
    ///
    /// Only bit 0 is meaningful; anything else is ignored.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        if raw & 1 == 1 {
            Self::High
        } else {
            Self::Low
        }
    }
}

// ── ControlLine ──────────────────────────────────────────────────────────────

/// Output line driven by logical assert/negate.
///
/// Remembers the last state it drove. A freshly created line has no history
/// (`asserted() == None`); the reset sequencer uses that to decide how long
/// to hold the part before pulsing it.
pub struct ControlLine<P> {
    pin: P,
    active: ActiveLevel,
    asserted: Option<bool>,
}

impl<P: OutputPin> ControlLine<P> {
    /// Wrap an output pin. The pin is not touched until the first write.
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        Self {
            pin,
            active,
            asserted: None,
        }
    }

    /// Drive the line to the logical state `assert`.
    pub fn set(&mut self, assert: bool) -> Result<(), GpioError> {
        let result = if self.active.drive_high(assert) {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| GpioError::from_kind(e.kind()))?;
        self.asserted = Some(assert);
        Ok(())
    }

    /// Drive the line to its active level.
    pub fn assert(&mut self) -> Result<(), GpioError> {
        self.set(true)
    }

    /// Drive the line to its inactive level.
    pub fn negate(&mut self) -> Result<(), GpioError> {
        self.set(false)
    }

    /// Drive to `assert` only when the last driven state differs.
    ///
    /// Returns `true` when the pin was written.
    pub fn set_if_changed(&mut self, assert: bool) -> Result<bool, GpioError> {
        if self.asserted == Some(assert) {
            return Ok(false);
        }
        self.set(assert)?;
        Ok(true)
    }

    /// Last driven logical state, `None` if never driven.
    pub fn asserted(&self) -> Option<bool> {
        self.asserted
    }

    /// Configured active level.
    pub fn active_level(&self) -> ActiveLevel {
        self.active
    }

    /// Release the wrapped pin.
    pub fn into_inner(self) -> P {
        self.pin
    }
}

// ── SenseLine ────────────────────────────────────────────────────────────────

/// Input line read as logically active/inactive.
pub struct SenseLine<P> {
    pin: P,
    active: ActiveLevel,
}

impl<P: InputPin> SenseLine<P> {
    /// Wrap an input pin.
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        Self { pin, active }
    }

    /// Sample the pin and map it through the active level.
    pub fn is_active(&mut self) -> Result<bool, GpioError> {
        let high = self
            .pin
            .is_high()
            .map_err(|e| GpioError::from_kind(e.kind()))?;
        Ok(self.level_is_active(high))
    }

    /// Map an already-sampled electrical level (as carried by an interrupt
    /// event) through the active level.
    pub fn level_is_active(&self, high: bool) -> bool {
        self.active.drive_high(true) == high
    }

    /// Configured active level.
    pub fn active_level(&self) -> ActiveLevel {
        self.active
    }
}
