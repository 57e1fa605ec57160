//! Chip capability trait.
//!
//! [`CodecBackend`] is the seam between the chip-independent logic in
//! [`crate::codec::Codec`] (jack routing, EQ selection, volume policy, power
//! sequencing) and the chip drivers. Operations a chip does not have
//! default to [`CodecError::Unsupported`].

use platform::ActiveLevel;

use crate::drc::DrcInfo;
use crate::eq::Biquad;
use crate::error::CodecError;
use crate::jack::{JackId, JackState};
use crate::reset::ResetSetup;
use crate::volume::VolumeState;

/// Codec family, as identified at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecKind {
    /// TAS3001C digital EQ over I²C.
    Tas3001c,
    /// AWACS (no register read-back).
    Awacs,
    /// Screamer (AWACS successor with read-back).
    Screamer,
}

/// What the chip can do, so the facade knows which policies apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Needs the I²S clock gated around sleep.
    pub i2s_clock: bool,
    /// Has biquad EQ and DRC.
    pub equalizer: bool,
    /// Jacks report through interrupts.
    pub jack_interrupts: bool,
    /// Jacks must be polled through the status register.
    pub polled_jacks: bool,
}

/// Output selection. `Output1` is always the headphone output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputTarget {
    /// Everything muted.
    #[default]
    None,
    /// Headphones (Screamer port A).
    Output1,
    /// Speaker (Screamer port C).
    Output2,
    /// Alternate speaker path.
    Output3,
    /// Alternate speaker path.
    Output4,
}

impl OutputTarget {
    /// `true` for the speaker outputs.
    pub const fn is_speaker(self) -> bool {
        matches!(self, Self::Output2 | Self::Output3 | Self::Output4)
    }
}

/// Input selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputSource {
    /// No input.
    #[default]
    None,
    /// Input A (CD / line).
    A,
    /// Input B (microphone).
    B,
    /// Input C (line / modem).
    C,
    /// PC Card audio.
    Pcmcia,
}

/// System power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Running.
    Active,
    /// Idle: treated like sleep.
    Idle,
    /// Asleep.
    Sleep,
}

/// Hardware operations a codec family provides.
#[allow(async_fn_in_trait)]
pub trait CodecBackend {
    /// Codec family.
    fn kind(&self) -> CodecKind;

    /// Feature set.
    fn capabilities(&self) -> Capabilities;

    /// Highest volume level accepted by [`apply_volume`](Self::apply_volume).
    fn max_volume_level(&self) -> u8;

    /// Sense polarity of `jack`, `None` if the board has no such jack.
    fn jack_polarity(&self, _jack: JackId) -> Option<ActiveLevel> {
        None
    }

    /// Sample `jack`'s sense line, `None` if the board has no such jack.
    fn sense_jack(&mut self, _jack: JackId) -> Result<Option<JackState>, CodecError> {
        Ok(None)
    }

    /// Bring the chip to a known state from the driver's shadow.
    async fn initialize(&mut self, setup: ResetSetup) -> Result<(), CodecError>;

    /// Quiesce the chip before detach.
    async fn shutdown(&mut self) -> Result<(), CodecError>;

    /// Route output. `touch_biquad` first flattens the EQ.
    async fn set_active_output(
        &mut self,
        target: OutputTarget,
        touch_biquad: bool,
    ) -> Result<(), CodecError>;

    /// Current output.
    fn active_output(&self) -> OutputTarget;

    /// Route input.
    async fn set_active_input(&mut self, _input: InputSource) -> Result<(), CodecError> {
        Err(CodecError::Unsupported)
    }

    /// Current input.
    fn active_input(&self) -> InputSource {
        InputSource::None
    }

    /// Push a volume/mute request to the hardware.
    async fn apply_volume(&mut self, volume: &VolumeState) -> Result<(), CodecError>;

    /// Program the dynamic range compressor.
    async fn set_drc(&mut self, _drc: &DrcInfo) -> Result<(), CodecError> {
        Err(CodecError::Unsupported)
    }

    /// Last compressor settings applied.
    fn drc(&self) -> DrcInfo {
        DrcInfo::DISABLED
    }

    /// Load a full EQ: first half of `filters` left, rest right.
    async fn set_output_biquad_group(&mut self, _filters: &[Biquad]) -> Result<(), CodecError> {
        Err(CodecError::Unsupported)
    }

    /// Flatten the EQ and disable the compressor.
    async fn set_unity_all_pass(&mut self) -> Result<(), CodecError> {
        Err(CodecError::Unsupported)
    }

    /// Put the chip to sleep. Outputs are already muted.
    async fn enter_low_power(&mut self) -> Result<(), CodecError>;

    /// Wake the chip and restore its configuration.
    async fn leave_low_power(&mut self) -> Result<(), CodecError>;

    /// Mix the call-progress (modem) signal into the output.
    async fn set_modem_sound(&mut self, _on: bool) -> Result<(), CodecError> {
        Err(CodecError::Unsupported)
    }

    /// Route the selected input straight to the output.
    async fn set_play_through(&mut self, _on: bool) -> Result<(), CodecError> {
        Err(CodecError::Unsupported)
    }

    /// Drive the programmable output bits.
    async fn set_prog_output(&mut self, _bits: u8) -> Result<(), CodecError> {
        Err(CodecError::Unsupported)
    }

    /// Set input gain, per channel.
    async fn set_input_gain(&mut self, _left: u8, _right: u8) -> Result<(), CodecError> {
        Err(CodecError::Unsupported)
    }

    /// Sample the jack-sense status. Returns the connected-device bits when
    /// they changed since the last call, or always when `force` is set.
    fn poll_in_sense(&mut self, _force: bool) -> Option<u32> {
        None
    }
}
