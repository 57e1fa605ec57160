//! TAS3001C register map
//!
//! Source: Texas Instruments TAS3001C Stereo Audio Digital Equalizer data
//! manual (SLAS226).
//!
//! # Key I²C Constraints
//!
//! ## Write-only
//! The part has no read path. Every register is written whole (no partial
//! writes) and the driver keeps a shadow copy of everything it wrote.
//!
//! ## Load modes
//! Biquad registers are loaded in fast-load mode (MCR bit 7 set). Entering
//! fast load resets every biquad not written afterwards to unity all-pass and
//! corrupts VOL, TRE, BAS, MIX1 and MIX2, which must be re-sent on the way
//! back to normal load.

// ---------------------------------------------------------------------------
// Register identities
// ---------------------------------------------------------------------------

/// Every physical TAS3001C register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterId {
    /// Main control: load mode, SCLK rate, serial format, word length.
    MainControl,
    /// Dynamic range compressor.
    Drc,
    /// Left and right volume, 4.16 coefficients.
    Volume,
    /// Treble control.
    Treble,
    /// Bass control.
    Bass,
    /// Output mixer.
    Mixer1,
    /// Call-progress mixer.
    Mixer2,
    /// Left-channel biquad `0..=5`.
    LeftBiquad(u8),
    /// Right-channel biquad `0..=5`.
    RightBiquad(u8),
}

/// Number of biquads per channel.
pub const BIQUADS_PER_CHANNEL: u8 = 6;

/// Widest register, in bytes (a biquad).
pub const MAX_REGISTER_WIDTH: usize = BIQUAD_WIDTH;

/// Width of the MCR.
pub const MCR_WIDTH: usize = 1;
/// Width of the DRC register.
pub const DRC_WIDTH: usize = 2;
/// Width of the volume register (two 24-bit coefficients).
pub const VOLUME_WIDTH: usize = 6;
/// Width of each mixer register.
pub const MIXER_WIDTH: usize = 3;
/// Width of a biquad register (five 24-bit 4.20 coefficients).
pub const BIQUAD_WIDTH: usize = 15;

const LEFT_BIQUAD_BASE: u8 = 0x0A;
const RIGHT_BIQUAD_BASE: u8 = 0x13;

impl RegisterId {
    /// Registers re-sent after leaving fast load, in the order they are sent.
    pub const FAST_LOAD_CORRUPTED: [Self; 5] = [
        Self::Volume,
        Self::Mixer1,
        Self::Mixer2,
        Self::Treble,
        Self::Bass,
    ];

    /// Normal-load registers in reset-reflush order.
    pub const REFLUSH_NORMAL: [Self; 6] = [
        Self::Drc,
        Self::Volume,
        Self::Treble,
        Self::Bass,
        Self::Mixer1,
        Self::Mixer2,
    ];

    /// All twelve biquads, left channel first.
    pub const ALL_BIQUADS: [Self; 12] = [
        Self::LeftBiquad(0),
        Self::LeftBiquad(1),
        Self::LeftBiquad(2),
        Self::LeftBiquad(3),
        Self::LeftBiquad(4),
        Self::LeftBiquad(5),
        Self::RightBiquad(0),
        Self::RightBiquad(1),
        Self::RightBiquad(2),
        Self::RightBiquad(3),
        Self::RightBiquad(4),
        Self::RightBiquad(5),
    ];

    /// I²C sub-address, or `None` for a biquad index out of range.
    #[allow(clippy::arithmetic_side_effects)] // Safety: index checked < 6 before the add
    pub const fn address(self) -> Option<u8> {
        match self {
            Self::MainControl => Some(0x01),
            Self::Drc => Some(0x02),
            Self::Volume => Some(0x04),
            Self::Treble => Some(0x05),
            Self::Bass => Some(0x06),
            Self::Mixer1 => Some(0x07),
            Self::Mixer2 => Some(0x08),
            Self::LeftBiquad(n) if n < BIQUADS_PER_CHANNEL => Some(LEFT_BIQUAD_BASE + n),
            Self::RightBiquad(n) if n < BIQUADS_PER_CHANNEL => Some(RIGHT_BIQUAD_BASE + n),
            Self::LeftBiquad(_) | Self::RightBiquad(_) => None,
        }
    }

    /// Register width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Self::MainControl | Self::Treble | Self::Bass => MCR_WIDTH,
            Self::Drc => DRC_WIDTH,
            Self::Volume => VOLUME_WIDTH,
            Self::Mixer1 | Self::Mixer2 => MIXER_WIDTH,
            Self::LeftBiquad(_) | Self::RightBiquad(_) => BIQUAD_WIDTH,
        }
    }

    /// `true` for the biquad registers.
    pub const fn is_biquad(self) -> bool {
        matches!(self, Self::LeftBiquad(_) | Self::RightBiquad(_))
    }
}

// ---------------------------------------------------------------------------
// MCR fields
// ---------------------------------------------------------------------------

/// MCR bit 7: fast load.
pub const MCR_FAST_LOAD: u8 = 1 << 7;
/// MCR bit 6: SCLK = 64 fs.
pub const MCR_SCLK_64FS: u8 = 1 << 6;
/// MCR bits 5:4 = 10: I²S serial mode.
pub const MCR_I2S: u8 = 0b10 << 4;
/// MCR bits 1:0 = 00: 16-bit words.
pub const MCR_WORD_16: u8 = 0;

/// MCR value for normal load with the fixed serial format.
pub const MCR_NORMAL: u8 = MCR_SCLK_64FS | MCR_I2S | MCR_WORD_16;
/// MCR value for fast load with the fixed serial format.
pub const MCR_FAST: u8 = MCR_FAST_LOAD | MCR_NORMAL;

// ---------------------------------------------------------------------------
// Power-on register contents
// ---------------------------------------------------------------------------

/// DRC byte 0: compressor disabled, 3:1 ratio.
pub const DRC_DISABLED_3_TO_1: u8 = 0xC0;
/// DRC byte 0: compressor enabled, 3:1 ratio.
pub const DRC_ENABLED_3_TO_1: u8 = 0xC1;
/// DRC byte 1: 0 dB threshold.
pub const DRC_UNITY_THRESHOLD: u8 = 0xF0;

/// Treble at 0 dB.
pub const TREBLE_UNITY: u8 = 0x72;
/// Bass at 0 dB.
pub const BASS_UNITY: u8 = 0x3E;
/// Mixer channel at 0 dB.
pub const MIXER_UNITY: [u8; MIXER_WIDTH] = [0x10, 0x00, 0x00];
/// Mixer channel muted (-70 dB).
pub const MIXER_MUTE: [u8; MIXER_WIDTH] = [0x00, 0x00, 0x00];

/// Unity-gain all-pass biquad: b0 = 1.0, everything else 0.
pub const BIQUAD_UNITY: [u8; BIQUAD_WIDTH] = [0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
