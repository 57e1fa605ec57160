//! Equalizer presets and biquad coefficients.
//!
//! A preset is selected by `(layout, device, speaker)`:
//!
//! - `layout` is the machine's sound layout,
//! - `device` is the device-match code of the active route (see
//!   [`RoutingDecision::code`](crate::jack::RoutingDecision::code)),
//! - `speaker` is the ID read from an identified external speaker, or
//!   [`SpeakerId::ANY`].
//!
//! Table order is priority order: the first exact match wins, then the first
//! wildcard entry (`speaker == ANY`) for the same layout and device.

use platform::{LayoutId, SpeakerId};

use crate::drc::DrcInfo;
use crate::tas3001c::registers::{BIQUAD_WIDTH, BIQUADS_PER_CHANNEL};

/// Most filters a preset can carry (six per channel).
pub const MAX_FILTERS: usize = BIQUADS_PER_CHANNEL as usize * 2;

/// 24-bit signed fixed-point coefficient, 4 integer bits and 20 fraction
/// bits, stored as the three big-endian bytes the part expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FourDotTwenty([u8; 3]);

impl FourDotTwenty {
    /// 0.0
    pub const ZERO: Self = Self([0, 0, 0]);
    /// 1.0
    pub const ONE: Self = Self([0x10, 0, 0]);

    /// From the three register bytes, most significant first.
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// From a raw two's-complement value; bits above 24 are discarded.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_raw(raw: i32) -> Self {
        let bits = raw as u32;
        Self([(bits >> 16) as u8, (bits >> 8) as u8, bits as u8])
    }

    /// Raw value, sign-extended from 24 bits.
    #[allow(clippy::cast_possible_wrap)]
    pub const fn raw(self) -> i32 {
        let [hi, mid, lo] = self.0;
        let bits = ((hi as u32) << 24) | ((mid as u32) << 16) | ((lo as u32) << 8);
        (bits as i32) >> 8
    }

    /// Register bytes.
    pub const fn bytes(self) -> [u8; 3] {
        self.0
    }
}

/// One second-order section: `b0 b1 b2 a1 a2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Biquad {
    /// Feed-forward coefficients.
    pub b: [FourDotTwenty; 3],
    /// Feedback coefficients.
    pub a: [FourDotTwenty; 2],
}

impl Biquad {
    /// Unity-gain all-pass: `b0 = 1`, everything else 0.
    pub const UNITY: Self = Self {
        b: [FourDotTwenty::ONE, FourDotTwenty::ZERO, FourDotTwenty::ZERO],
        a: [FourDotTwenty::ZERO, FourDotTwenty::ZERO],
    };

    /// The 15 register bytes, coefficients in `b0 b1 b2 a1 a2` order.
    pub fn register_bytes(&self) -> [u8; BIQUAD_WIDTH] {
        let mut out = [0u8; BIQUAD_WIDTH];
        for (chunk, coeff) in out
            .chunks_exact_mut(3)
            .zip(self.b.iter().chain(self.a.iter()))
        {
            chunk.copy_from_slice(&coeff.bytes());
        }
        out
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::UNITY
    }
}

/// A tuned equalizer and compressor setting for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqPreset {
    /// Machine sound layout.
    pub layout: LayoutId,
    /// Device-match code of the route.
    pub device: u32,
    /// Speaker ID, or [`SpeakerId::ANY`] for a wildcard entry.
    pub speaker: SpeakerId,
    /// Compressor settings applied with the filters.
    pub drc: DrcInfo,
    /// Filters, left channel first: the first half go to the left biquads,
    /// the rest to the right.
    pub filters: &'static [Biquad],
}

/// An empty preset table: every route plays flat.
pub const NO_PRESETS: &[EqPreset] = &[];

/// Find the preset for a route.
///
/// Returns `None` for an unknown layout, or when neither an exact nor a
/// wildcard entry exists. A request for [`SpeakerId::ANY`] takes the first
/// entry for the layout and device, whatever its speaker.
pub fn lookup(
    table: &[EqPreset],
    layout: LayoutId,
    device: u32,
    speaker: SpeakerId,
) -> Option<&EqPreset> {
    if layout.is_unknown() {
        return None;
    }
    let mut route = table
        .iter()
        .filter(|p| p.layout == layout && p.device == device);
    if speaker.is_any() {
        return route.next();
    }
    route
        .clone()
        .find(|p| p.speaker == speaker)
        .or_else(|| route.find(|p| p.speaker.is_any()))
}
