//! Shared rig for the integration tests: a TAS3001C on mock bus and pins.

#![allow(dead_code)]

use onboard_audio::{CodecConfig, Tas3001c, TasPins};
use platform::mocks::{MockBus, MockDelay, MockPin, Trace};
use platform::{ActiveLevel, ControlLine, LayoutId, SenseLine};

/// TAS3001C on mocks.
pub type TestTas = Tas3001c<MockBus, MockPin, MockPin, MockDelay>;

/// Handles the test keeps after the driver takes ownership of the pins.
pub struct Rig {
    /// Everything the driver did, in order.
    pub trace: Trace,
    /// Headphone sense line, active high.
    pub headphone: MockPin,
    /// Dallas sense line, active low.
    pub dallas: MockPin,
}

impl Rig {
    /// Plug or unplug headphones.
    pub fn headphones(&self, plugged: bool) {
        self.headphone.set_level(plugged);
    }

    /// Plug or unplug external speakers.
    pub fn speakers(&self, plugged: bool) {
        self.dallas.set_level(!plugged);
    }
}

/// A TAS3001C wired the way the desktop boards are: both amplifier mutes
/// and both sense lines present, nothing plugged in.
pub fn tas(config: &CodecConfig) -> (TestTas, Rig) {
    let trace = Trace::new();
    let headphone = MockPin::new("hp_sense", false, trace.clone());
    let dallas = MockPin::new("dallas_sense", true, trace.clone());
    let pins = TasPins {
        reset: ControlLine::new(MockPin::new("reset", true, trace.clone()), ActiveLevel::Low),
        headphone_mute: Some(ControlLine::new(
            MockPin::new("hp_mute", false, trace.clone()),
            ActiveLevel::High,
        )),
        speaker_mute: Some(ControlLine::new(
            MockPin::new("amp_mute", false, trace.clone()),
            ActiveLevel::High,
        )),
        headphone_sense: Some(SenseLine::new(headphone.clone(), ActiveLevel::High)),
        dallas_sense: Some(SenseLine::new(dallas.clone(), ActiveLevel::Low)),
    };
    let chip = Tas3001c::new(
        MockBus::new(trace.clone()),
        pins,
        MockDelay::new(trace.clone()),
        config,
    );
    (
        chip,
        Rig {
            trace,
            headphone,
            dallas,
        },
    )
}

/// [`tas`] with the default configuration for `layout`.
pub fn tas_for_layout(layout: LayoutId) -> (TestTas, Rig) {
    tas(&CodecConfig::for_layout(layout))
}
