//! Volume level translation for both codec families.
//!
//! - AWACS/Screamer: levels `0..=15` map to a 4-bit attenuation field
//!   (`15` is quietest), and left = right = 0 collapses to a hardware mute.
//! - TAS3001C: levels `0..=176` index a table of 4.16 gain coefficients in
//!   0.5 dB steps, -70 dB at level 0 up to +18 dB at level 176, with unity
//!   gain at level 140.

/// Highest AWACS/Screamer volume level.
pub const LEGACY_MAX_LEVEL: u8 = 15;

/// Largest (quietest) AWACS/Screamer attenuation step.
pub const LEGACY_MAX_ATTENUATION: u8 = 15;

/// Lowest TAS volume level (-70 dB).
pub const TAS_MIN_LEVEL: u8 = 0;
/// TAS volume level with unity gain.
pub const TAS_UNITY_LEVEL: u8 = 140;
/// Highest TAS volume level (+18 dB).
pub const TAS_MAX_LEVEL: u8 = 176;

const TAS_TABLE_LEN: usize = TAS_MAX_LEVEL as usize + 1;

/// Attenuation step for an AWACS/Screamer volume level.
///
/// Levels 0 and 1 both give the maximum step; the caller decides whether
/// level 0 is a mute.
pub const fn legacy_attenuation(level: u8) -> u8 {
    let step = level.saturating_sub(1);
    let step = if step > 14 { 14 } else { step };
    LEGACY_MAX_ATTENUATION.saturating_sub(step)
}

// ── TAS coefficient table ───────────────────────────────────────────────────

/// 10^(0.5/20) in Q32.
const HALF_DB_UP_Q32: u128 = 4_549_460_108;
/// 10^(-0.5/20) in Q32.
const HALF_DB_DOWN_Q32: u128 = 4_054_710_589;

/// Table builder. Runs at compile time over fixed bounds: indices stay in
/// `0..TAS_TABLE_LEN`, the Q32 accumulator stays below 2^36 and its
/// products below 2^69.
#[allow(clippy::arithmetic_side_effects, clippy::indexing_slicing, clippy::cast_possible_truncation)]
const fn build_tas_table() -> [u32; TAS_TABLE_LEN] {
    const fn to_4_16(q32: u128) -> u32 {
        ((q32 * 65_536 + (1 << 31)) >> 32) as u32
    }

    let mut table = [0u32; TAS_TABLE_LEN];
    let unity = TAS_UNITY_LEVEL as usize;
    table[unity] = 1 << 16;

    let mut gain: u128 = 1 << 32;
    let mut i = unity;
    while i < TAS_TABLE_LEN - 1 {
        gain = (gain * HALF_DB_UP_Q32) >> 32;
        i += 1;
        table[i] = to_4_16(gain);
    }

    gain = 1 << 32;
    i = unity;
    while i > 0 {
        gain = (gain * HALF_DB_DOWN_Q32) >> 32;
        i -= 1;
        table[i] = to_4_16(gain);
    }
    table
}

/// 4.16 gain coefficient per TAS volume level.
pub static TAS_VOLUME_TABLE: [u32; TAS_TABLE_LEN] = build_tas_table();

/// 4.16 coefficient for a TAS volume level, `None` above the table.
pub fn tas_coefficient(level: u8) -> Option<u32> {
    TAS_VOLUME_TABLE.get(usize::from(level)).copied()
}

/// TAS volume register bytes: left then right, 24-bit big-endian each.
pub fn tas_volume_bytes(left: u32, right: u32) -> [u8; 6] {
    let l = left.to_be_bytes();
    let r = right.to_be_bytes();
    [l[1], l[2], l[3], r[1], r[2], r[3]]
}

// ── VolumeState ─────────────────────────────────────────────────────────────

/// Requested volume, as last set by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VolumeState {
    /// Left level.
    pub left: u8,
    /// Right level.
    pub right: u8,
    /// Mute requested by the host.
    pub mute_requested: bool,
}

impl VolumeState {
    /// `true` if the output should be silent: mute was requested or either
    /// channel is at level 0.
    pub const fn muted(&self) -> bool {
        self.mute_requested || self.left == 0 || self.right == 0
    }
}
