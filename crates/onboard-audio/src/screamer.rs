//! AWACS and Screamer backend.
//!
//! Both parts sit behind a memory-mapped codec-control port. Control words
//! carry a register number and a 12-bit payload; the port keeps no state, so
//! the driver keeps a [`SCREAMER_REGISTERS`]-slot shadow and always writes
//! whole registers from it. Screamer can read its registers back, AWACS
//! cannot.
//!
//! Neither part raises jack interrupts. The four in-sense bits in the status
//! word are polled instead, see [`CodecBackend::poll_in_sense`].

use embedded_hal_async::delay::DelayNs;
use platform::AwacsPort;

use crate::backend::{Capabilities, CodecBackend, CodecKind, InputSource, OutputTarget};
use crate::error::CodecError;
use crate::reset::ResetSetup;
use crate::volume::{legacy_attenuation, VolumeState, LEGACY_MAX_LEVEL};

/// Number of control registers (register 3 is unused).
pub const SCREAMER_REGISTERS: usize = 7;

// ----------------------------------------------------------------------------
// Control register map
// ----------------------------------------------------------------------------

/// Input gain and input select.
pub const REG_GAIN_INPUT: u8 = 0;
/// Mutes, loop-through, recalibrate and programmable outputs.
pub const REG_CONTROL: u8 = 1;
/// Output A (headphone) attenuation.
pub const REG_OUTPUT_A_ATTEN: u8 = 2;
/// Output C (speaker) attenuation.
pub const REG_OUTPUT_C_ATTEN: u8 = 4;
/// PC Card attenuation and enable (Screamer only).
pub const REG_PCMCIA: u8 = 5;
/// Power and misc (Screamer only).
pub const REG_MISC: u8 = 6;

const GAIN_LEFT_MASK: u32 = 0x0F0;
const GAIN_LEFT_SHIFT: u32 = 4;
const GAIN_RIGHT_MASK: u32 = 0x00F;
const INPUT_A: u32 = 0x800;
const INPUT_B: u32 = 0x400;
const INPUT_C: u32 = 0x200;
const INPUT_FIELD: u32 = INPUT_A | INPUT_B | INPUT_C;

const RECALIBRATE: u32 = 0x004;
const LOOP_THROUGH: u32 = 0x040;
const MUTE_OUTPUT_A: u32 = 0x080;
const MUTE_OUTPUT_C: u32 = 0x200;
const MUTE_FIELD: u32 = MUTE_OUTPUT_A | MUTE_OUTPUT_C;
const PROG_OUTPUT_FIELD: u32 = 0xC00;
const PROG_OUTPUT_SHIFT: u32 = 10;
/// Highest value [`CodecBackend::set_prog_output`] accepts.
pub const PROG_OUTPUT_MAX: u8 = 0b11;

const ATTEN_LEFT_MASK: u32 = 0x3C0;
const ATTEN_LEFT_SHIFT: u32 = 6;
const ATTEN_RIGHT_MASK: u32 = 0x00F;

const PCMCIA_ON: u32 = 0x008;

/// Highest input gain step per channel.
pub const MAX_INPUT_GAIN: u8 = 0x0F;

// ----------------------------------------------------------------------------
// Status word
// ----------------------------------------------------------------------------

const STATUS_IN_SENSE_MASK: u32 = 0x00F;
const STATUS_MANUFACTURER_MASK: u32 = 0xF00;
const STATUS_REVISION_MASK: u32 = 0xF000;
const STATUS_REVISION_SHIFT: u32 = 12;

const REVISION_AWACS: u32 = 2;
const REVISION_SCREAMER: u32 = 3;

/// Settling time some Crystal parts need before a recalibration.
pub const PRE_RECALIBRATE_DELAY_MS: u32 = 10;
/// How long the recalibrate bit is held.
pub const RECALIBRATE_MS: u32 = 1000;

/// Codec silicon vendor, from the status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Manufacturer {
    /// Crystal Semiconductor.
    Crystal,
    /// National Semiconductor.
    National,
    /// Texas Instruments.
    TexasInstruments,
    /// Not recognised.
    Unknown,
}

impl Manufacturer {
    /// Decode the manufacturer field of a status word.
    pub const fn from_status(status: u32) -> Self {
        match status & STATUS_MANUFACTURER_MASK {
            0x100 => Self::Crystal,
            0x200 => Self::National,
            0x300 => Self::TexasInstruments,
            _ => Self::Unknown,
        }
    }
}

/// Codec family from the revision field of a status word, `None` for a
/// revision this driver does not know.
#[allow(clippy::arithmetic_side_effects)] // Safety: constant shift of a masked u32
pub const fn kind_from_status(status: u32) -> Option<CodecKind> {
    match (status & STATUS_REVISION_MASK) >> STATUS_REVISION_SHIFT {
        REVISION_AWACS => Some(CodecKind::Awacs),
        REVISION_SCREAMER => Some(CodecKind::Screamer),
        _ => None,
    }
}

/// In-sense bits from a status word. The hardware reports them in reverse
/// order.
pub const fn in_sense_bits(status: u32) -> u32 {
    let raw = status & STATUS_IN_SENSE_MASK;
    let mut bits = 0;
    if raw & 0b0001 != 0 {
        bits |= 0b1000;
    }
    if raw & 0b0010 != 0 {
        bits |= 0b0100;
    }
    if raw & 0b0100 != 0 {
        bits |= 0b0010;
    }
    if raw & 0b1000 != 0 {
        bits |= 0b0001;
    }
    bits
}

#[allow(clippy::arithmetic_side_effects)] // Safety: register is 0..=6, constant shift
fn control_word(register: u8, value: u32) -> u32 {
    (u32::from(register) << 12) | (value & 0xFFF)
}

/// AWACS / Screamer driver.
pub struct Screamer<A, D> {
    port: A,
    delay: D,
    kind: CodecKind,
    manufacturer: Manufacturer,
    shadow: [u32; SCREAMER_REGISTERS],
    output: OutputTarget,
    volume: VolumeState,
    last_in_sense: Option<u32>,
}

impl<A: AwacsPort, D: DelayNs> Screamer<A, D> {
    /// Identify the part and build the register shadow.
    ///
    /// Screamer registers are read back; AWACS starts from zero. Returns
    /// [`CodecError::Unsupported`] for an unknown revision.
    pub fn new(mut port: A, delay: D) -> Result<Self, CodecError> {
        let status = port.read_status();
        let kind = kind_from_status(status).ok_or(CodecError::Unsupported)?;
        let manufacturer = Manufacturer::from_status(status);

        let mut shadow = [0; SCREAMER_REGISTERS];
        if kind == CodecKind::Screamer {
            for (register, slot) in (0u8..).zip(shadow.iter_mut()) {
                *slot = port.read_control(register) & 0xFFF;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("{} codec, manufacturer {}", kind, manufacturer);
        #[cfg(feature = "std")]
        tracing::info!(?kind, ?manufacturer, "AWACS-family codec found");

        Ok(Self {
            port,
            delay,
            kind,
            manufacturer,
            shadow,
            output: OutputTarget::None,
            volume: VolumeState::default(),
            last_in_sense: None,
        })
    }

    /// Silicon vendor.
    pub fn manufacturer(&self) -> Manufacturer {
        self.manufacturer
    }

    /// Shadow copy of a control register, `None` past the register file.
    pub fn register(&self, register: u8) -> Option<u32> {
        self.shadow.get(usize::from(register)).copied()
    }

    /// Current programmable output bits.
    #[allow(clippy::arithmetic_side_effects)] // Safety: constant shift of a masked u32
    pub fn prog_output(&self) -> u8 {
        let bits = (self.reg(REG_CONTROL) & PROG_OUTPUT_FIELD) >> PROG_OUTPUT_SHIFT;
        u8::try_from(bits).unwrap_or(0)
    }

    /// Re-run the analog calibration with both outputs muted.
    pub async fn recalibrate(&mut self) {
        self.delay.delay_ms(PRE_RECALIBRATE_DELAY_MS).await;
        let saved = self.reg(REG_CONTROL);
        self.write_register(REG_CONTROL, saved | MUTE_FIELD | RECALIBRATE);
        self.delay.delay_ms(RECALIBRATE_MS).await;
        self.write_register(REG_CONTROL, saved);
    }

    fn has_extended_registers(&self) -> bool {
        self.kind == CodecKind::Screamer
    }

    fn reg(&self, register: u8) -> u32 {
        self.shadow.get(usize::from(register)).copied().unwrap_or(0)
    }

    fn write_register(&mut self, register: u8, value: u32) {
        let value = value & 0xFFF;
        if let Some(slot) = self.shadow.get_mut(usize::from(register)) {
            *slot = value;
        }
        self.port.write_control(control_word(register, value));
    }

    fn write_if_changed(&mut self, register: u8, value: u32) {
        if self.reg(register) != value & 0xFFF {
            self.write_register(register, value);
        }
    }

    fn restore_registers(&mut self) {
        for register in [REG_GAIN_INPUT, REG_CONTROL, REG_OUTPUT_A_ATTEN, REG_OUTPUT_C_ATTEN] {
            self.write_register(register, self.reg(register));
        }
        if self.has_extended_registers() {
            for register in [REG_PCMCIA, REG_MISC] {
                self.write_register(register, self.reg(register));
            }
        }
    }

    fn update_mute(&mut self) {
        let volume = self.volume;
        let silent = volume.mute_requested || (volume.left == 0 && volume.right == 0);
        let mut value = self.reg(REG_CONTROL) & !MUTE_FIELD;
        if silent || self.output != OutputTarget::Output1 {
            value |= MUTE_OUTPUT_A;
        }
        if silent || self.output != OutputTarget::Output2 {
            value |= MUTE_OUTPUT_C;
        }
        self.write_if_changed(REG_CONTROL, value);
    }

    #[allow(clippy::arithmetic_side_effects)] // Safety: constant shift of a 4-bit value
    fn attenuation_value(current: u32, left: u8, right: u8) -> u32 {
        let left = u32::from(legacy_attenuation(left));
        let right = u32::from(legacy_attenuation(right));
        (current & !(ATTEN_LEFT_MASK | ATTEN_RIGHT_MASK))
            | ((left << ATTEN_LEFT_SHIFT) & ATTEN_LEFT_MASK)
            | (right & ATTEN_RIGHT_MASK)
    }
}

impl<A: AwacsPort, D: DelayNs> CodecBackend for Screamer<A, D> {
    fn kind(&self) -> CodecKind {
        self.kind
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            i2s_clock: false,
            equalizer: false,
            jack_interrupts: false,
            polled_jacks: true,
        }
    }

    fn max_volume_level(&self) -> u8 {
        LEGACY_MAX_LEVEL
    }

    async fn initialize(&mut self, _setup: ResetSetup) -> Result<(), CodecError> {
        self.restore_registers();
        self.last_in_sense = None;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), CodecError> {
        self.output = OutputTarget::None;
        self.update_mute();
        Ok(())
    }

    async fn set_active_output(
        &mut self,
        target: OutputTarget,
        _touch_biquad: bool,
    ) -> Result<(), CodecError> {
        if matches!(target, OutputTarget::Output3 | OutputTarget::Output4) {
            return Err(CodecError::InvalidArgument);
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("{} output -> {}", self.kind, target);
        #[cfg(feature = "std")]
        tracing::debug!(kind = ?self.kind, ?target, "set active output");

        self.output = target;
        self.update_mute();
        Ok(())
    }

    fn active_output(&self) -> OutputTarget {
        self.output
    }

    async fn set_active_input(&mut self, input: InputSource) -> Result<(), CodecError> {
        if input == InputSource::Pcmcia && !self.has_extended_registers() {
            return Err(CodecError::Unsupported);
        }
        let needs_recalibrate = input != self.active_input() && input != InputSource::Pcmcia;

        let mut select = self.reg(REG_GAIN_INPUT) & !INPUT_FIELD;
        let mut pcmcia = self.reg(REG_PCMCIA) & !PCMCIA_ON;
        match input {
            InputSource::None => {}
            InputSource::A => select |= INPUT_A,
            InputSource::B => select |= INPUT_B,
            InputSource::C => select |= INPUT_C,
            InputSource::Pcmcia => pcmcia |= PCMCIA_ON,
        }
        self.write_register(REG_GAIN_INPUT, select);
        if self.has_extended_registers() {
            self.write_if_changed(REG_PCMCIA, pcmcia);
        }

        if needs_recalibrate {
            self.recalibrate().await;
        }
        Ok(())
    }

    fn active_input(&self) -> InputSource {
        match self.reg(REG_GAIN_INPUT) & INPUT_FIELD {
            INPUT_A => InputSource::A,
            INPUT_B => InputSource::B,
            INPUT_C => InputSource::C,
            _ if self.has_extended_registers() && self.reg(REG_PCMCIA) & PCMCIA_ON != 0 => {
                InputSource::Pcmcia
            }
            _ => InputSource::None,
        }
    }

    async fn apply_volume(&mut self, volume: &VolumeState) -> Result<(), CodecError> {
        if volume.left > LEGACY_MAX_LEVEL || volume.right > LEGACY_MAX_LEVEL {
            return Err(CodecError::InvalidArgument);
        }
        for register in [REG_OUTPUT_A_ATTEN, REG_OUTPUT_C_ATTEN] {
            let value = Self::attenuation_value(self.reg(register), volume.left, volume.right);
            self.write_if_changed(register, value);
        }
        self.volume = *volume;
        self.update_mute();
        Ok(())
    }

    async fn enter_low_power(&mut self) -> Result<(), CodecError> {
        // The part keeps its registers across sleep; nothing to do.
        Ok(())
    }

    async fn leave_low_power(&mut self) -> Result<(), CodecError> {
        self.restore_registers();
        self.recalibrate().await;
        Ok(())
    }

    async fn set_play_through(&mut self, on: bool) -> Result<(), CodecError> {
        let mut value = self.reg(REG_CONTROL) & !LOOP_THROUGH;
        if on {
            value |= LOOP_THROUGH;
        }
        self.write_register(REG_CONTROL, value);
        Ok(())
    }

    #[allow(clippy::arithmetic_side_effects)] // Safety: bits <= 3, constant shift
    async fn set_prog_output(&mut self, bits: u8) -> Result<(), CodecError> {
        if bits > PROG_OUTPUT_MAX {
            return Err(CodecError::InvalidArgument);
        }
        let value = (self.reg(REG_CONTROL) & !PROG_OUTPUT_FIELD)
            | ((u32::from(bits) << PROG_OUTPUT_SHIFT) & PROG_OUTPUT_FIELD);
        self.write_register(REG_CONTROL, value);
        Ok(())
    }

    #[allow(clippy::arithmetic_side_effects)] // Safety: gains <= 15, constant shift
    async fn set_input_gain(&mut self, left: u8, right: u8) -> Result<(), CodecError> {
        if left > MAX_INPUT_GAIN || right > MAX_INPUT_GAIN {
            return Err(CodecError::InvalidArgument);
        }
        let value = (self.reg(REG_GAIN_INPUT) & !(GAIN_LEFT_MASK | GAIN_RIGHT_MASK))
            | ((u32::from(left) << GAIN_LEFT_SHIFT) & GAIN_LEFT_MASK)
            | (u32::from(right) & GAIN_RIGHT_MASK);
        self.write_register(REG_GAIN_INPUT, value);
        Ok(())
    }

    fn poll_in_sense(&mut self, force: bool) -> Option<u32> {
        let raw = self.port.read_status() & STATUS_IN_SENSE_MASK;
        if !force && self.last_in_sense == Some(raw) {
            return None;
        }
        self.last_in_sense = Some(raw);
        let bits = in_sense_bits(raw);

        #[cfg(feature = "defmt")]
        defmt::debug!("in-sense changed: {=u32:#b}", bits);
        #[cfg(feature = "std")]
        tracing::debug!(bits, "in-sense changed");

        Some(bits)
    }
}
