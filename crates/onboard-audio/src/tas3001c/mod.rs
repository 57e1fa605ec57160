//! TAS3001C ("Texas") backend.
//!
//! The TAS3001C sits on I²C behind the I²S port. It cannot be read, so
//! every register lives in a [`ShadowStore`] and hardware is only touched
//! through its write path. The board wires a reset line, optional headphone
//! and speaker amplifier mutes, and optional headphone and Dallas jack
//! sense lines.
//!
//! All output lines share one pin type and both sense lines another, which
//! is how HALs with erased pin types (`Output<'d>` / `Input<'d>`) hand them
//! out.

pub mod load_mode;
pub mod output;
pub mod registers;
pub mod shadow;

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use platform::{ActiveLevel, ControlLine, RegisterBus, SenseLine};

pub use load_mode::Restore;
pub use output::AmpMutes;
pub use registers::RegisterId;
pub use shadow::{LoadMode, ShadowRegisters, ShadowStore, WriteMode};

use crate::backend::{Capabilities, CodecBackend, CodecKind, OutputTarget};
use crate::config::CodecConfig;
use crate::drc::DrcInfo;
use crate::eq::{Biquad, MAX_FILTERS};
use crate::error::CodecError;
use crate::jack::{JackId, JackState};
use crate::reset::{ResetSequencer, ResetSetup};
use crate::volume::{tas_coefficient, tas_volume_bytes, VolumeState, TAS_MAX_LEVEL};
use registers::{BIQUADS_PER_CHANNEL, BIQUAD_UNITY, MIXER_MUTE, MIXER_UNITY};

/// Which channel(s) a single biquad write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BiquadChannel {
    /// Left only.
    Left,
    /// Right only.
    Right,
    /// Same filter on both channels.
    Stereo,
}

/// Board wiring of a TAS3001C.
pub struct TasPins<P, S> {
    /// Chip reset.
    pub reset: ControlLine<P>,
    /// Headphone amplifier mute.
    pub headphone_mute: Option<ControlLine<P>>,
    /// Speaker amplifier mute.
    pub speaker_mute: Option<ControlLine<P>>,
    /// Headphone jack sense.
    pub headphone_sense: Option<SenseLine<S>>,
    /// Dallas speaker jack sense.
    pub dallas_sense: Option<SenseLine<S>>,
}

/// TAS3001C driver.
pub struct Tas3001c<B, P, S, D> {
    store: ShadowStore<B>,
    reset_line: ControlLine<P>,
    amps: AmpMutes<P>,
    headphone_sense: Option<SenseLine<S>>,
    dallas_sense: Option<SenseLine<S>>,
    delay: D,
    sequencer: ResetSequencer,
    drc: DrcInfo,
    output: OutputTarget,
    modem_sound: bool,
}

impl<B, P, S, D> Tas3001c<B, P, S, D>
where
    B: RegisterBus,
    P: OutputPin,
    S: InputPin,
    D: DelayNs,
{
    /// Wrap the bus and pins. Nothing is sent until
    /// [`initialize`](CodecBackend::initialize).
    pub fn new(bus: B, pins: TasPins<P, S>, delay: D, config: &CodecConfig) -> Self {
        Self {
            store: ShadowStore::new(bus, config.tas.address, config.tas.strict_load_mode),
            reset_line: pins.reset,
            amps: AmpMutes::new(
                pins.headphone_mute,
                pins.speaker_mute,
                config.holds_headphone_mute(),
                config.amp_recovery,
            ),
            headphone_sense: pins.headphone_sense,
            dallas_sense: pins.dallas_sense,
            delay,
            sequencer: ResetSequencer::new(config.max_reset_attempts),
            drc: DrcInfo::DISABLED,
            output: OutputTarget::None,
            modem_sound: false,
        }
    }

    /// The shadow register store.
    pub fn store(&self) -> &ShadowStore<B> {
        &self.store
    }

    /// Mutable shadow register store, for direct register access.
    pub fn store_mut(&mut self) -> &mut ShadowStore<B> {
        &mut self.store
    }

    /// The reset sequencer.
    pub fn sequencer(&self) -> &ResetSequencer {
        &self.sequencer
    }

    /// Amplifier mute lines.
    pub fn amps(&self) -> &AmpMutes<P> {
        &self.amps
    }

    /// Write one biquad without a fast-load excursion.
    ///
    /// Fast load would reset every other biquad to unity, so this path
    /// leaves the load mode alone. With strict load-mode checking the part
    /// must already be in fast load.
    pub async fn set_output_biquad(
        &mut self,
        channel: BiquadChannel,
        index: u8,
        biquad: &Biquad,
    ) -> Result<(), CodecError> {
        if index >= BIQUADS_PER_CHANNEL {
            return Err(CodecError::InvalidArgument);
        }
        let bytes = biquad.register_bytes();
        let mode = WriteMode::ShadowAndHardwareIfChanged;
        if matches!(channel, BiquadChannel::Left | BiquadChannel::Stereo) {
            self.store
                .write(RegisterId::LeftBiquad(index), &bytes, mode)
                .await?;
        }
        if matches!(channel, BiquadChannel::Right | BiquadChannel::Stereo) {
            self.store
                .write(RegisterId::RightBiquad(index), &bytes, mode)
                .await?;
        }
        Ok(())
    }

    async fn write_biquads(&mut self, filters: &[Biquad]) -> Result<(), CodecError> {
        let left_count = filters.len() / 2;
        for (i, filter) in filters.iter().enumerate() {
            let id = match i.checked_sub(left_count) {
                None => RegisterId::LeftBiquad(u8::try_from(i).unwrap_or(u8::MAX)),
                Some(r) => RegisterId::RightBiquad(u8::try_from(r).unwrap_or(u8::MAX)),
            };
            self.store
                .write(
                    id,
                    &filter.register_bytes(),
                    WriteMode::ShadowAndHardwareIfChanged,
                )
                .await?;
        }
        Ok(())
    }
}

impl<B, P, S, D> CodecBackend for Tas3001c<B, P, S, D>
where
    B: RegisterBus,
    P: OutputPin,
    S: InputPin,
    D: DelayNs,
{
    fn kind(&self) -> CodecKind {
        CodecKind::Tas3001c
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            i2s_clock: true,
            equalizer: true,
            jack_interrupts: true,
            polled_jacks: false,
        }
    }

    fn max_volume_level(&self) -> u8 {
        TAS_MAX_LEVEL
    }

    fn jack_polarity(&self, jack: JackId) -> Option<ActiveLevel> {
        match jack {
            JackId::Headphone => self.headphone_sense.as_ref().map(SenseLine::active_level),
            JackId::Dallas => self.dallas_sense.as_ref().map(SenseLine::active_level),
        }
    }

    fn sense_jack(&mut self, jack: JackId) -> Result<Option<JackState>, CodecError> {
        let line = match jack {
            JackId::Headphone => self.headphone_sense.as_mut(),
            JackId::Dallas => self.dallas_sense.as_mut(),
        };
        match line {
            Some(line) => Ok(Some(JackState::from_active(line.is_active()?))),
            None => Ok(None),
        }
    }

    async fn initialize(&mut self, setup: ResetSetup) -> Result<(), CodecError> {
        self.sequencer
            .run(&mut self.store, &mut self.reset_line, &mut self.delay, setup)
            .await?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), CodecError> {
        self.amps.route(OutputTarget::None, &mut self.delay).await?;
        self.output = OutputTarget::None;
        self.reset_line.assert()?;
        Ok(())
    }

    async fn set_active_output(
        &mut self,
        target: OutputTarget,
        touch_biquad: bool,
    ) -> Result<(), CodecError> {
        #[cfg(feature = "defmt")]
        defmt::debug!("TAS3001C output -> {} (touch biquad: {})", target, touch_biquad);
        #[cfg(feature = "std")]
        tracing::debug!(?target, touch_biquad, "TAS3001C set active output");

        if touch_biquad {
            self.set_unity_all_pass().await?;
        }
        self.amps.route(target, &mut self.delay).await?;
        self.output = target;
        Ok(())
    }

    fn active_output(&self) -> OutputTarget {
        self.output
    }

    async fn apply_volume(&mut self, volume: &VolumeState) -> Result<(), CodecError> {
        let left = tas_coefficient(volume.left).ok_or(CodecError::InvalidArgument)?;
        let right = tas_coefficient(volume.right).ok_or(CodecError::InvalidArgument)?;
        let bytes = if volume.muted() {
            tas_volume_bytes(0, 0)
        } else {
            tas_volume_bytes(left, right)
        };
        self.store
            .write(
                RegisterId::Volume,
                &bytes,
                WriteMode::ShadowAndHardwareIfChanged,
            )
            .await?;
        Ok(())
    }

    async fn set_drc(&mut self, drc: &DrcInfo) -> Result<(), CodecError> {
        self.store
            .write(
                RegisterId::Drc,
                &drc.register_bytes(),
                WriteMode::ShadowAndHardwareIfChanged,
            )
            .await?;
        self.drc = *drc;
        Ok(())
    }

    fn drc(&self) -> DrcInfo {
        self.drc
    }

    async fn set_output_biquad_group(&mut self, filters: &[Biquad]) -> Result<(), CodecError> {
        if filters.is_empty() || filters.len() > MAX_FILTERS {
            return Err(CodecError::InvalidArgument);
        }
        self.store
            .set_load_mode(LoadMode::Fast, Restore::DontRestore)
            .await?;
        let written = self.write_biquads(filters).await;
        let restored = self
            .store
            .set_load_mode(LoadMode::Normal, Restore::RestoreOnNormal)
            .await;
        written.and(restored)
    }

    async fn set_unity_all_pass(&mut self) -> Result<(), CodecError> {
        let previous = self.store.load_mode();
        if previous == LoadMode::Fast {
            self.store
                .set_load_mode(LoadMode::Normal, Restore::RestoreOnNormal)
                .await?;
        }

        // Entering fast load already returns every biquad to unity; the
        // writes keep the shadow in step with that.
        self.store
            .set_load_mode(LoadMode::Fast, Restore::DontRestore)
            .await?;
        for id in RegisterId::ALL_BIQUADS {
            self.store
                .write(id, &BIQUAD_UNITY, WriteMode::ShadowAndHardwareIfChanged)
                .await?;
        }
        self.store
            .set_load_mode(LoadMode::Normal, Restore::RestoreOnNormal)
            .await?;

        self.set_drc(&DrcInfo::DISABLED).await?;

        if previous == LoadMode::Fast {
            self.store
                .set_load_mode(LoadMode::Fast, Restore::DontRestore)
                .await?;
        }
        Ok(())
    }

    async fn enter_low_power(&mut self) -> Result<(), CodecError> {
        self.reset_line.assert()?;
        Ok(())
    }

    async fn leave_low_power(&mut self) -> Result<(), CodecError> {
        self.reset_line.negate()?;
        self.initialize(ResetSetup::Force).await
    }

    async fn set_modem_sound(&mut self, on: bool) -> Result<(), CodecError> {
        if on == self.modem_sound {
            return Ok(());
        }
        let bytes = if on { MIXER_UNITY } else { MIXER_MUTE };
        self.store
            .write(RegisterId::Mixer2, &bytes, WriteMode::HardwareOnly)
            .await?;
        self.modem_sound = on;
        Ok(())
    }
}
