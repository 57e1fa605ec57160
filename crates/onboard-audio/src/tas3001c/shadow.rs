//! Write-through shadow of the TAS3001C register file.
//!
//! The TAS3001C cannot be read, so every byte the driver sends is first
//! recorded here. The shadow is what `read` returns, what the changed-only
//! path compares against, and what the reset sequencer replays after the
//! part loses its configuration.

use platform::{I2cAddr, RegisterBus};

use super::registers::{
    RegisterId, BASS_UNITY, BIQUAD_UNITY, BIQUAD_WIDTH, DRC_DISABLED_3_TO_1, DRC_UNITY_THRESHOLD,
    MCR_FAST_LOAD, MCR_NORMAL, MIXER_MUTE, MIXER_UNITY, MIXER_WIDTH, TREBLE_UNITY, VOLUME_WIDTH,
};
use crate::error::CodecError;

/// How a register write reaches the shadow and the part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteMode {
    /// Record in the shadow only.
    ShadowOnly,
    /// Send to the part only; the shadow keeps its contents.
    HardwareOnly,
    /// Record and send, but only if the bytes differ from the shadow.
    ShadowAndHardwareIfChanged,
}

/// Chip load mode, mirrored from MCR bit 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadMode {
    /// Normal load: volume, tone and mixer registers take effect.
    Normal,
    /// Fast load: biquads are loaded, everything else is held.
    Fast,
}

impl LoadMode {
    /// Decode from an MCR byte.
    pub const fn from_mcr(mcr: u8) -> Self {
        if mcr & MCR_FAST_LOAD == 0 {
            Self::Normal
        } else {
            Self::Fast
        }
    }
}

// ── ShadowRegisters ─────────────────────────────────────────────────────────

/// One slot per physical register, at power-on contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRegisters {
    mcr: [u8; 1],
    drc: [u8; 2],
    volume: [u8; VOLUME_WIDTH],
    treble: [u8; 1],
    bass: [u8; 1],
    mixer1: [u8; MIXER_WIDTH],
    mixer2: [u8; MIXER_WIDTH],
    left: [[u8; BIQUAD_WIDTH]; 6],
    right: [[u8; BIQUAD_WIDTH]; 6],
}

impl ShadowRegisters {
    /// Power-on contents: normal load, 64 fs I²S 16-bit, DRC off, volume
    /// muted, flat tone, unity mixer, unity all-pass biquads.
    pub const fn new() -> Self {
        Self {
            mcr: [MCR_NORMAL],
            drc: [DRC_DISABLED_3_TO_1, DRC_UNITY_THRESHOLD],
            volume: [0; VOLUME_WIDTH],
            treble: [TREBLE_UNITY],
            bass: [BASS_UNITY],
            mixer1: MIXER_UNITY,
            mixer2: MIXER_MUTE,
            left: [BIQUAD_UNITY; 6],
            right: [BIQUAD_UNITY; 6],
        }
    }

    /// Shadow bytes of `id`, `None` for an out-of-range biquad.
    pub fn get(&self, id: RegisterId) -> Option<&[u8]> {
        Some(match id {
            RegisterId::MainControl => &self.mcr,
            RegisterId::Drc => &self.drc,
            RegisterId::Volume => &self.volume,
            RegisterId::Treble => &self.treble,
            RegisterId::Bass => &self.bass,
            RegisterId::Mixer1 => &self.mixer1,
            RegisterId::Mixer2 => &self.mixer2,
            RegisterId::LeftBiquad(n) => self.left.get(usize::from(n))?,
            RegisterId::RightBiquad(n) => self.right.get(usize::from(n))?,
        })
    }

    fn get_mut(&mut self, id: RegisterId) -> Option<&mut [u8]> {
        Some(match id {
            RegisterId::MainControl => &mut self.mcr,
            RegisterId::Drc => &mut self.drc,
            RegisterId::Volume => &mut self.volume,
            RegisterId::Treble => &mut self.treble,
            RegisterId::Bass => &mut self.bass,
            RegisterId::Mixer1 => &mut self.mixer1,
            RegisterId::Mixer2 => &mut self.mixer2,
            RegisterId::LeftBiquad(n) => self.left.get_mut(usize::from(n))?,
            RegisterId::RightBiquad(n) => self.right.get_mut(usize::from(n))?,
        })
    }

    /// Load mode recorded in the shadow MCR.
    pub fn load_mode(&self) -> LoadMode {
        LoadMode::from_mcr(self.mcr[0])
    }
}

impl Default for ShadowRegisters {
    fn default() -> Self {
        Self::new()
    }
}

// ── ShadowStore ─────────────────────────────────────────────────────────────

/// The shadow registers plus the bus they are written through.
///
/// Every TAS3001C register access in the crate goes through
/// [`write`](Self::write) and [`read`](Self::read).
pub struct ShadowStore<B> {
    bus: B,
    address: I2cAddr,
    shadow: ShadowRegisters,
    strict_load_mode: bool,
}

impl<B: RegisterBus> ShadowStore<B> {
    /// Create a store at power-on contents. Nothing is sent to the part.
    pub fn new(bus: B, address: I2cAddr, strict_load_mode: bool) -> Self {
        Self {
            bus,
            address,
            shadow: ShadowRegisters::new(),
            strict_load_mode,
        }
    }

    /// Write `bytes` to register `id` according to `mode`.
    ///
    /// Returns `true` if a bus transaction was issued. A failed transaction
    /// on the changed-only path leaves the shadow holding the new bytes, so
    /// the next reset reflush sends what the caller asked for.
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidArgument`] if `bytes` is not exactly the
    ///   register width or the biquad index is out of range.
    /// - [`CodecError::WrongLoadMode`] for a changed-only biquad write while
    ///   the shadow MCR says normal load and strict checking is on.
    /// - [`CodecError::TransportFailure`] if the bus transaction failed.
    pub async fn write(
        &mut self,
        id: RegisterId,
        bytes: &[u8],
        mode: WriteMode,
    ) -> Result<bool, CodecError> {
        let register = id.address().ok_or(CodecError::InvalidArgument)?;
        if bytes.len() != id.width() {
            return Err(CodecError::InvalidArgument);
        }

        let push = match mode {
            WriteMode::ShadowOnly => {
                self.copy_into_shadow(id, bytes)?;
                false
            }
            WriteMode::HardwareOnly => true,
            WriteMode::ShadowAndHardwareIfChanged => {
                if id.is_biquad()
                    && self.strict_load_mode
                    && self.shadow.load_mode() == LoadMode::Normal
                {
                    return Err(CodecError::WrongLoadMode);
                }
                let changed = self.shadow.get(id) != Some(bytes);
                if changed {
                    self.copy_into_shadow(id, bytes)?;
                }
                changed
            }
        };

        if push {
            self.bus
                .transact(self.address, register, bytes)
                .await
                .map_err(|e| {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("TAS3001C write to 0x{=u8:02X} failed: {}", register, e);
                    #[cfg(feature = "std")]
                    tracing::warn!(register, error = %e, "TAS3001C register write failed");
                    CodecError::from(e)
                })?;
        }
        Ok(push)
    }

    /// Shadow copy of register `id`.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidArgument`] for an out-of-range biquad index.
    pub fn read(&self, id: RegisterId) -> Result<&[u8], CodecError> {
        self.shadow.get(id).ok_or(CodecError::InvalidArgument)
    }

    /// Load mode recorded in the shadow MCR.
    pub fn load_mode(&self) -> LoadMode {
        self.shadow.load_mode()
    }

    /// Snapshot of the whole shadow.
    pub fn snapshot(&self) -> ShadowRegisters {
        self.shadow.clone()
    }

    /// The underlying bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn copy_into_shadow(&mut self, id: RegisterId, bytes: &[u8]) -> Result<(), CodecError> {
        let slot = self.shadow.get_mut(id).ok_or(CodecError::InvalidArgument)?;
        slot.copy_from_slice(bytes);
        Ok(())
    }
}
