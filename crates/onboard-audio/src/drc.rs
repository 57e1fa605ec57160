//! Dynamic range compressor settings and the volume range they imply.

use crate::tas3001c::registers::{
    DRC_DISABLED_3_TO_1, DRC_ENABLED_3_TO_1, DRC_UNITY_THRESHOLD, DRC_WIDTH,
};
use crate::volume::{TAS_MAX_LEVEL, TAS_MIN_LEVEL, TAS_UNITY_LEVEL};

/// Threshold step of the DRC register, in millidecibels.
pub const THRESHOLD_STEP_MILLIDB: i32 = 375;

/// Lowest threshold the register can encode, in steps below 0 dB (-36 dB).
pub const MAX_THRESHOLD_STEPS: i32 = 96;

/// Compressor parameters, as carried by an EQ preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrcInfo {
    /// Compression ratio numerator. Only 3:1 is supported by the part.
    pub ratio_numerator: u32,
    /// Compression ratio denominator.
    pub ratio_denominator: u32,
    /// Threshold in millidecibels, 0 or negative.
    pub threshold_millidb: i32,
    /// Offset into the volume table, in half-dB steps, applied to the
    /// volume range while this preset is active.
    pub maximum_volume: i32,
    /// Compressor on/off.
    pub enabled: bool,
}

impl DrcInfo {
    /// Compressor off, 3:1, 0 dB threshold, no volume offset.
    pub const DISABLED: Self = Self {
        ratio_numerator: 3,
        ratio_denominator: 1,
        threshold_millidb: 0,
        maximum_volume: 0,
        enabled: false,
    };

    /// DRC register contents for these settings.
    ///
    /// When disabled the threshold is ignored and the register gets the
    /// power-on value.
    #[allow(clippy::arithmetic_side_effects)] // Safety: steps clamped to 0..=96, 0xF0 - 96 > 0
    pub fn register_bytes(&self) -> [u8; DRC_WIDTH] {
        if !self.enabled {
            return [DRC_DISABLED_3_TO_1, DRC_UNITY_THRESHOLD];
        }
        let steps = self
            .threshold_millidb
            .saturating_neg()
            .max(0)
            / THRESHOLD_STEP_MILLIDB;
        let steps = u8::try_from(steps.min(MAX_THRESHOLD_STEPS)).unwrap_or(0);
        [DRC_ENABLED_3_TO_1, DRC_UNITY_THRESHOLD - steps]
    }
}

impl Default for DrcInfo {
    fn default() -> Self {
        Self::DISABLED
    }
}

// ── VolumeRange ─────────────────────────────────────────────────────────────

/// Level range the host volume control exposes, with the matching gains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VolumeRange {
    /// Lowest selectable level.
    pub min: u8,
    /// Gain at `min`, 16.16 dB.
    pub min_db: i32,
    /// Highest selectable level.
    pub max: u8,
    /// Gain at `max`, 16.16 dB.
    pub max_db: i32,
}

impl VolumeRange {
    /// Range implied by the compressor's `maximum_volume` offset.
    ///
    /// A positive offset raises both ends, a negative one only lowers the
    /// top. Both ends are clamped to the volume table.
    pub fn for_drc(drc: &DrcInfo) -> Self {
        let base_min = i32::from(TAS_MIN_LEVEL);
        let base_max = i32::from(TAS_UNITY_LEVEL);
        let min = clamp_level(base_min.saturating_add(drc.maximum_volume.max(0)));
        let max = clamp_level(base_max.saturating_add(drc.maximum_volume));
        Self {
            min,
            min_db: level_to_db(min),
            max,
            max_db: level_to_db(max),
        }
    }
}

impl Default for VolumeRange {
    fn default() -> Self {
        Self::for_drc(&DrcInfo::DISABLED)
    }
}

fn clamp_level(level: i32) -> u8 {
    let clamped = level.clamp(i32::from(TAS_MIN_LEVEL), i32::from(TAS_MAX_LEVEL));
    u8::try_from(clamped).unwrap_or(TAS_MAX_LEVEL)
}

/// Gain of a TAS volume level in 16.16 dB (half a dB per level, 0 dB at
/// level 140).
#[allow(clippy::arithmetic_side_effects)] // Safety: |level - 140| <= 140, times 2^15 fits i32
pub fn level_to_db(level: u8) -> i32 {
    (i32::from(level) - i32::from(TAS_UNITY_LEVEL)) * 0x8000
}
