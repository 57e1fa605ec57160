//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `I2cAddr`: validates the 7-bit address range, converts from the 8-bit
//!   form found in firmware property tables
//! - `LayoutId`: machine sound-layout identifier (device-id property)
//! - `SpeakerId`: identifier read from an external speaker's ID ROM

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── I2cAddr ──────────────────────────────────────────────────────────────────

/// 7-bit I²C device address.
///
/// Valid range: `0x08..=0x77` (the reserved blocks at both ends are rejected).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct I2cAddr(u8);

impl I2cAddr {
    /// Lowest non-reserved 7-bit address.
    pub const MIN: u8 = 0x08;

    /// Highest non-reserved 7-bit address.
    pub const MAX: u8 = 0x77;

    /// TAS3001C digital equalizer (ADDR pin low).
    pub const TAS3001C: Self = Self(0x34);

    /// Create an address, returning an error outside `0x08..=0x77`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] for reserved addresses.
    pub fn new(addr: u8) -> Result<Self, OutOfRangeError> {
        if (Self::MIN..=Self::MAX).contains(&addr) {
            Ok(Self(addr))
        } else {
            Err(OutOfRangeError {
                value: u32::from(addr),
                min: u32::from(Self::MIN),
                max: u32::from(Self::MAX),
            })
        }
    }

    /// Create an address from its 8-bit (write-address) form.
    ///
    /// Property tables store the address already shifted left by one; the
    /// bus layer shifts it back up on every transaction.
    #[allow(clippy::arithmetic_side_effects)] // Safety: right shift of a u8 by 1 cannot overflow
    pub fn from_8bit(addr: u8) -> Result<Self, OutOfRangeError> {
        Self::new(addr >> 1)
    }

    /// Return the 7-bit address.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

// ── LayoutId ─────────────────────────────────────────────────────────────────

/// Machine sound-layout identifier.
///
/// Every supported machine publishes one of these in its sound node; EQ
/// presets and amplifier quirks are keyed on it. `0` means "unknown layout"
/// and never matches an EQ preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct LayoutId(u32);

impl LayoutId {
    /// Layout not published / not known.
    pub const UNKNOWN: Self = Self(0);
    /// Sawtooth.
    pub const SAWTOOTH: Self = Self(5);
    /// Pismo.
    pub const PISMO: Self = Self(10);
    /// Mercury.
    pub const MERCURY: Self = Self(13);
    /// Tangent.
    pub const TANGENT: Self = Self(14);
    /// Tessera: internal speaker is mono, right channel gets mixed.
    pub const TESSERA: Self = Self(15);
    /// P29: non-standard headphone mute circuit.
    pub const P29: Self = Self(16);

    /// Wrap a raw layout identifier.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Return the raw layout identifier.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// `true` for [`LayoutId::UNKNOWN`].
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == 0
    }
}

// ── SpeakerId ────────────────────────────────────────────────────────────────

/// Speaker identifier read from byte 1 of an external speaker's ID EEPROM.
///
/// `0` is reserved: in a lookup request it means "no identification" and in
/// a preset table it marks the wildcard entry for a layout/device pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SpeakerId(u8);

impl SpeakerId {
    /// No identification / wildcard.
    pub const ANY: Self = Self(0);

    /// Wrap a raw speaker identifier.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// `true` for [`SpeakerId::ANY`].
    #[must_use]
    pub const fn is_any(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn i2c_addr_rejects_reserved_ranges() {
        assert!(I2cAddr::new(0x07).is_err());
        assert!(I2cAddr::new(0x78).is_err());
        assert_eq!(I2cAddr::new(0x34).unwrap().get(), 0x34);
    }

    #[test]
    fn i2c_addr_from_8bit_shifts_down() {
        assert_eq!(I2cAddr::from_8bit(0x68).unwrap(), I2cAddr::TAS3001C);
    }

    #[test]
    fn i2c_addr_error_reports_bounds() {
        let err = I2cAddr::new(0x7F).unwrap_err();
        assert_eq!(err.value, 0x7F);
        assert_eq!(err.min, 0x08);
        assert_eq!(err.max, 0x77);
    }

    #[test]
    fn layout_unknown_is_zero() {
        assert!(LayoutId::UNKNOWN.is_unknown());
        assert!(!LayoutId::TESSERA.is_unknown());
        assert_eq!(LayoutId::P29.get(), 16);
    }

    #[test]
    fn speaker_any_is_zero() {
        assert!(SpeakerId::ANY.is_any());
        assert!(!SpeakerId::new(7).is_any());
    }
}
