//! Chip-independent codec facade.
//!
//! [`Codec`] owns a [`CodecBackend`] and everything that is policy rather
//! than chip: jack debounce and routing, EQ preset selection, the volume
//! request, the speaker notifier and power sequencing. It is driven by one
//! task, see [`crate::task::run_jack_events`].

use embassy_time::Instant;
use platform::{LayoutId, SpeakerId};

use crate::backend::{CodecBackend, InputSource, OutputTarget, PowerState};
use crate::config::CodecConfig;
use crate::drc::{DrcInfo, VolumeRange};
use crate::eq::{lookup, Biquad, EqPreset};
use crate::error::CodecError;
use crate::host::AudioHost;
use crate::jack::{
    self, JackDebounceController, JackEvent, JackId, JackResponse, JackState, NotifierStep,
    RoutingDecision, SpeakerNotifier,
};
use crate::reset::ResetSetup;
use crate::timer::{earliest, OneShot};
use crate::volume::VolumeState;

/// A codec with its policy state.
pub struct Codec<B, H> {
    backend: B,
    host: H,
    config: CodecConfig,
    presets: &'static [EqPreset],
    jacks: JackDebounceController,
    notifier: SpeakerNotifier,
    poll_timer: OneShot,
    volume: VolumeState,
    volume_range: VolumeRange,
    connected: u32,
    speaker_connect_failed: bool,
}

impl<B: CodecBackend, H: AudioHost> Codec<B, H> {
    /// Wrap a backend. The jack sources follow the backend's sense lines.
    pub fn new(backend: B, host: H, config: CodecConfig, presets: &'static [EqPreset]) -> Self {
        let jacks = JackDebounceController::new(
            backend.jack_polarity(JackId::Headphone),
            backend.jack_polarity(JackId::Dallas),
            &config,
        );
        Self {
            backend,
            host,
            config,
            presets,
            jacks,
            notifier: SpeakerNotifier::new(),
            poll_timer: OneShot::new(),
            volume: VolumeState::default(),
            volume_range: VolumeRange::default(),
            connected: 0,
            speaker_connect_failed: false,
        }
    }

    /// The chip driver.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable chip driver, for chip-specific operations.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The host hooks.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host hooks.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Jack state machine.
    pub fn jacks(&self) -> &JackDebounceController {
        &self.jacks
    }

    /// Active configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Reset the chip, push the current volume and route to whatever is
    /// plugged in.
    pub async fn initialize(&mut self, now: Instant) -> Result<(), CodecError> {
        self.backend.initialize(ResetSetup::Force).await?;
        self.backend.apply_volume(&self.volume).await?;
        self.route_after_reset(now).await
    }

    /// Cancel timers and quiesce the chip.
    pub async fn shutdown(&mut self) -> Result<(), CodecError> {
        self.jacks.reset();
        self.notifier.cancel();
        self.poll_timer.cancel();
        self.backend.shutdown().await
    }

    /// Handle a system power transition.
    pub async fn on_power_state_change(
        &mut self,
        state: PowerState,
        now: Instant,
    ) -> Result<(), CodecError> {
        #[cfg(feature = "defmt")]
        defmt::info!("codec power -> {}", state);
        #[cfg(feature = "std")]
        tracing::info!(?state, "codec power state change");

        let i2s_clock = self.backend.capabilities().i2s_clock;
        match state {
            PowerState::Sleep | PowerState::Idle => {
                self.poll_timer.cancel();
                self.backend
                    .set_active_output(OutputTarget::None, true)
                    .await?;
                self.backend.enter_low_power().await?;
                if i2s_clock {
                    self.host.set_i2s_clock(false);
                }
                Ok(())
            }
            PowerState::Active => {
                if i2s_clock {
                    self.host.set_i2s_clock(true);
                }
                self.backend.leave_low_power().await?;
                self.route_after_reset(now).await
            }
        }
    }

    // ── Routing ─────────────────────────────────────────────────────────────

    /// Select an output directly.
    pub async fn set_active_output(&mut self, target: OutputTarget) -> Result<(), CodecError> {
        self.backend.set_active_output(target, false).await
    }

    /// Current output.
    pub fn active_output(&self) -> OutputTarget {
        self.backend.active_output()
    }

    /// Select an input.
    pub async fn set_active_input(&mut self, input: InputSource) -> Result<(), CodecError> {
        self.backend.set_active_input(input).await
    }

    /// Current input.
    pub fn active_input(&self) -> InputSource {
        self.backend.active_input()
    }

    /// Current device-match mask.
    pub fn connected_devices(&self) -> u32 {
        self.connected
    }

    /// `true` when external speakers are plugged in but could not be
    /// identified.
    pub fn speaker_connect_failed(&self) -> bool {
        self.speaker_connect_failed
    }

    // ── Volume ──────────────────────────────────────────────────────────────

    /// Set both channel levels.
    pub async fn set_system_volume(&mut self, left: u8, right: u8) -> Result<(), CodecError> {
        let max = self.backend.max_volume_level();
        if left > max || right > max {
            return Err(CodecError::InvalidArgument);
        }
        let next = VolumeState {
            left,
            right,
            ..self.volume
        };
        self.backend.apply_volume(&next).await?;
        self.volume = next;
        Ok(())
    }

    /// Set both channels to the same level.
    pub async fn set_system_volume_mono(&mut self, level: u8) -> Result<(), CodecError> {
        self.set_system_volume(level, level).await
    }

    /// `true` if the host asked for mute.
    pub fn system_mute(&self) -> bool {
        self.volume.mute_requested
    }

    /// Mute or unmute without losing the levels.
    pub async fn set_system_mute(&mut self, mute: bool) -> Result<(), CodecError> {
        let next = VolumeState {
            mute_requested: mute,
            ..self.volume
        };
        self.backend.apply_volume(&next).await?;
        self.volume = next;
        Ok(())
    }

    /// Last volume request.
    pub fn volume(&self) -> VolumeState {
        self.volume
    }

    /// Level range last pushed to the host.
    pub fn volume_range(&self) -> VolumeRange {
        self.volume_range
    }

    // ── Equalizer ───────────────────────────────────────────────────────────

    /// Program the compressor and re-publish the volume range it implies.
    pub async fn set_drc(&mut self, drc: &DrcInfo) -> Result<(), CodecError> {
        self.backend.set_drc(drc).await?;
        self.publish_volume_range();
        Ok(())
    }

    /// Load a full EQ.
    pub async fn set_output_biquad_group(&mut self, filters: &[Biquad]) -> Result<(), CodecError> {
        self.backend.set_output_biquad_group(filters).await
    }

    // ── Misc chip features ──────────────────────────────────────────────────

    /// Mix the modem call-progress signal into the output.
    pub async fn set_modem_sound(&mut self, on: bool) -> Result<(), CodecError> {
        self.backend.set_modem_sound(on).await
    }

    /// Route the input straight to the output.
    pub async fn set_play_through(&mut self, on: bool) -> Result<(), CodecError> {
        self.backend.set_play_through(on).await
    }

    /// Drive the programmable output bits.
    pub async fn set_prog_output(&mut self, bits: u8) -> Result<(), CodecError> {
        self.backend.set_prog_output(bits).await
    }

    /// Set the input gain.
    pub async fn set_input_gain(&mut self, left: u8, right: u8) -> Result<(), CodecError> {
        self.backend.set_input_gain(left, right).await
    }

    // ── Events ──────────────────────────────────────────────────────────────

    /// Handle a jack interrupt.
    pub async fn on_jack_event(&mut self, event: JackEvent, now: Instant) -> Result<(), CodecError> {
        let response = self.jacks.on_interrupt(event, now);

        #[cfg(feature = "defmt")]
        defmt::debug!("jack event {} -> {}", event, response);
        #[cfg(feature = "std")]
        tracing::debug!(?event, ?response, "jack event");

        match response {
            JackResponse::HeadphoneChanged(state) => self.headphone_changed(state, now).await,
            JackResponse::NoSuchJack
            | JackResponse::SourceDisabled
            | JackResponse::Coalesced
            | JackResponse::ConfirmationArmed(_) => Ok(()),
        }
    }

    /// Run every timer that is due at `now`.
    ///
    /// All due timers run even if an earlier one fails; the first error is
    /// returned.
    pub async fn on_timer(&mut self, now: Instant) -> Result<(), CodecError> {
        let mut result = Ok(());
        if self.jacks.take_confirmation(now) {
            result = result.and(self.confirm_dallas(now).await);
        }
        if self.notifier.take_expired(now) {
            result = result.and(self.notifier_fired(now).await);
        }
        if self.poll_timer.take_expired(now) {
            self.poll(now);
        }
        result
    }

    /// Sample polled jack sensing and re-arm the poll tick.
    pub fn poll(&mut self, now: Instant) {
        self.poll_in_sense(false);
        if self.backend.capabilities().polled_jacks {
            self.poll_timer.arm(now, self.config.poll_interval);
        }
    }

    /// Nearest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(
            jack::next_deadline(&self.jacks, &self.notifier),
            self.poll_timer.deadline(),
        )
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn poll_in_sense(&mut self, force: bool) {
        if let Some(bits) = self.backend.poll_in_sense(force) {
            let devices = self.host.refresh_devices(bits);
            self.connected = devices;
            self.host.set_current_devices(devices);
        }
    }

    /// Routing after a reset or wake, from the sense lines rather than from
    /// interrupts (a wake can deliver a stale headphone interrupt).
    async fn route_after_reset(&mut self, now: Instant) -> Result<(), CodecError> {
        let caps = self.backend.capabilities();
        if caps.polled_jacks {
            self.poll_in_sense(true);
            self.poll_timer.arm(now, self.config.poll_interval);
        }
        if !caps.jack_interrupts {
            return Ok(());
        }

        self.jacks.reset();
        let headphones = self.sense(JackId::Headphone);
        if headphones.is_connected() {
            return self.headphone_changed(headphones, now).await;
        }

        self.backend
            .set_active_output(OutputTarget::Output2, true)
            .await?;
        if self.jacks.has_jack(JackId::Dallas) {
            let event = JackEvent {
                jack: JackId::Dallas,
                raw_level: false,
            };
            self.jacks.on_interrupt(event, now);
            Ok(())
        } else {
            self.device_service(now).await
        }
    }

    async fn headphone_changed(&mut self, state: JackState, now: Instant) -> Result<(), CodecError> {
        let target = if state.is_connected() {
            OutputTarget::Output1
        } else {
            OutputTarget::Output2
        };
        self.backend.set_active_output(target, true).await?;
        self.device_service(now).await
    }

    async fn confirm_dallas(&mut self, now: Instant) -> Result<(), CodecError> {
        self.sense(JackId::Dallas);
        let result = if self.sense(JackId::Headphone).is_connected() {
            Ok(())
        } else {
            let result = self.device_service(now).await;
            self.jacks.mark_handled(now);
            result
        };
        if let Some(source) = self.jacks.source_mut(JackId::Dallas) {
            source.enable();
        }
        result
    }

    async fn notifier_fired(&mut self, now: Instant) -> Result<(), CodecError> {
        let step = self
            .notifier
            .step(now, self.host.user_logged_in(), &self.config);
        if step != NotifierStep::Retry
            || self.jacks.routing() != RoutingDecision::ExternalSpeakers
            || !self.host.has_speaker_identifier()
        {
            return Ok(());
        }

        let id = self.with_dallas_disabled_read_id().await;
        self.jacks.mark_handled(now);
        if id.is_none() {
            #[cfg(feature = "defmt")]
            defmt::warn!("external speakers not fully connected");
            #[cfg(feature = "std")]
            tracing::warn!("external speakers not fully connected");
            self.host.post_speakers_not_connected_notice();
            return Ok(());
        }

        self.set_dallas_enabled(false);
        let result = self.device_service(now).await;
        self.set_dallas_enabled(true);
        self.jacks.mark_handled(now);
        result
    }

    async fn with_dallas_disabled_read_id(&mut self) -> Option<SpeakerId> {
        self.set_dallas_enabled(false);
        let id = self.host.read_speaker_id().await;
        self.set_dallas_enabled(true);
        id
    }

    fn set_dallas_enabled(&mut self, enabled: bool) {
        if let Some(source) = self.jacks.source_mut(JackId::Dallas) {
            if enabled {
                source.enable();
            } else {
                source.disable();
            }
        }
    }

    /// Re-read a jack's sense line into the controller. Falls back to the
    /// recorded state if the line is missing or unreadable.
    fn sense(&mut self, jack: JackId) -> JackState {
        match self.backend.sense_jack(jack) {
            Ok(Some(state)) => {
                self.jacks.set_state(jack, state);
                state
            }
            Ok(None) => self.jacks.state(jack),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("sense read failed for {}: {}", jack, _e);
                #[cfg(feature = "std")]
                tracing::warn!(?jack, error = %_e, "sense read failed");
                self.jacks.state(jack)
            }
        }
    }

    /// Re-evaluate the routing and load the matching EQ.
    async fn device_service(&mut self, now: Instant) -> Result<(), CodecError> {
        let routing = self.jacks.routing();
        let device = routing.code();
        self.connected = device;
        self.host.set_current_devices(device);

        let mono_speaker = self.config.layout == LayoutId::TESSERA
            && routing == RoutingDecision::InternalSpeaker;
        self.host.set_right_channel_mixed(mono_speaker);

        let identifier = self.host.has_speaker_identifier();
        let mut speaker = SpeakerId::ANY;
        let mut identified = false;
        if identifier && routing == RoutingDecision::ExternalSpeakers {
            if let Some(id) = self.host.read_speaker_id().await {
                speaker = id;
                identified = true;
            }
        }

        self.speaker_connect_failed =
            identifier && self.jacks.state(JackId::Dallas).is_connected() && !identified;
        self.host
            .set_speaker_connect_failed(self.speaker_connect_failed);

        if identifier && !identified && routing == RoutingDecision::ExternalSpeakers {
            let step = self
                .notifier
                .step(now, self.host.user_logged_in(), &self.config);
            if step == NotifierStep::Retry {
                self.notifier.schedule_retry(now);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("route {} (device {}, speaker {})", routing, device, speaker.get());
        #[cfg(feature = "std")]
        tracing::info!(?routing, device, speaker = speaker.get(), "device service");

        let result = if self.backend.capabilities().equalizer {
            self.load_eq(device, speaker).await
        } else {
            Ok(())
        };
        self.publish_volume_range();
        result
    }

    async fn load_eq(&mut self, device: u32, speaker: SpeakerId) -> Result<(), CodecError> {
        match lookup(self.presets, self.config.layout, device, speaker) {
            Some(preset) => {
                self.backend.set_drc(&preset.drc).await?;
                if preset.filters.is_empty() {
                    Ok(())
                } else {
                    self.backend.set_output_biquad_group(preset.filters).await
                }
            }
            None => self.backend.set_unity_all_pass().await,
        }
    }

    fn publish_volume_range(&mut self) {
        let range = VolumeRange::for_drc(&self.backend.drc());
        self.volume_range = range;
        self.host.set_volume_range(range);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::backend::{Capabilities, CodecKind};
    use crate::mocks::{HostCall, MockHost};
    use embassy_time::Duration;
    use platform::ActiveLevel;
    use std::vec::Vec;

    /// Backend that records what the facade asked for.
    #[derive(Default)]
    struct FakeBackend {
        headphone: Option<JackState>,
        dallas: Option<JackState>,
        polled: bool,
        outputs: Vec<(OutputTarget, bool)>,
        unity_calls: usize,
        drc: DrcInfo,
        groups: Vec<usize>,
        volumes: Vec<VolumeState>,
        in_sense: Option<u32>,
        power: Vec<&'static str>,
    }

    impl CodecBackend for FakeBackend {
        fn kind(&self) -> CodecKind {
            CodecKind::Tas3001c
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities {
                i2s_clock: !self.polled,
                equalizer: !self.polled,
                jack_interrupts: !self.polled,
                polled_jacks: self.polled,
            }
        }

        fn max_volume_level(&self) -> u8 {
            176
        }

        fn jack_polarity(&self, jack: JackId) -> Option<ActiveLevel> {
            let wired = match jack {
                JackId::Headphone => self.headphone.is_some(),
                JackId::Dallas => self.dallas.is_some(),
            };
            wired.then_some(ActiveLevel::High)
        }

        fn sense_jack(&mut self, jack: JackId) -> Result<Option<JackState>, CodecError> {
            Ok(match jack {
                JackId::Headphone => self.headphone,
                JackId::Dallas => self.dallas,
            })
        }

        async fn initialize(&mut self, _setup: ResetSetup) -> Result<(), CodecError> {
            self.power.push("init");
            Ok(())
        }

        async fn shutdown(&mut self) -> Result<(), CodecError> {
            Ok(())
        }

        async fn set_active_output(
            &mut self,
            target: OutputTarget,
            touch_biquad: bool,
        ) -> Result<(), CodecError> {
            self.outputs.push((target, touch_biquad));
            Ok(())
        }

        fn active_output(&self) -> OutputTarget {
            self.outputs.last().map_or(OutputTarget::None, |o| o.0)
        }

        async fn apply_volume(&mut self, volume: &VolumeState) -> Result<(), CodecError> {
            self.volumes.push(*volume);
            Ok(())
        }

        async fn set_drc(&mut self, drc: &DrcInfo) -> Result<(), CodecError> {
            self.drc = *drc;
            Ok(())
        }

        fn drc(&self) -> DrcInfo {
            self.drc
        }

        async fn set_output_biquad_group(&mut self, filters: &[Biquad]) -> Result<(), CodecError> {
            self.groups.push(filters.len());
            Ok(())
        }

        async fn set_unity_all_pass(&mut self) -> Result<(), CodecError> {
            self.unity_calls += 1;
            self.drc = DrcInfo::DISABLED;
            Ok(())
        }

        async fn enter_low_power(&mut self) -> Result<(), CodecError> {
            self.power.push("sleep");
            Ok(())
        }

        async fn leave_low_power(&mut self) -> Result<(), CodecError> {
            self.power.push("wake");
            Ok(())
        }

        fn poll_in_sense(&mut self, _force: bool) -> Option<u32> {
            self.in_sense.take()
        }
    }

    static FILTERS: [Biquad; 4] = [Biquad::UNITY; 4];
    static PRESETS: [EqPreset; 1] = [EqPreset {
        layout: LayoutId::SAWTOOTH,
        device: 4,
        speaker: SpeakerId::ANY,
        drc: DrcInfo {
            maximum_volume: -6,
            enabled: true,
            threshold_millidb: -7_500,
            ..DrcInfo::DISABLED
        },
        filters: &FILTERS,
    }];

    fn codec(backend: FakeBackend, host: MockHost) -> Codec<FakeBackend, MockHost> {
        Codec::new(
            backend,
            host,
            CodecConfig::for_layout(LayoutId::SAWTOOTH),
            &PRESETS,
        )
    }

    fn wired(headphone: JackState, dallas: JackState) -> FakeBackend {
        FakeBackend {
            headphone: Some(headphone),
            dallas: Some(dallas),
            ..FakeBackend::default()
        }
    }

    fn t(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[tokio::test]
    async fn headphone_interrupt_routes_and_flattens() {
        let backend = wired(JackState::Disconnected, JackState::Disconnected);
        let mut codec = codec(backend, MockHost::new());

        let event = JackEvent {
            jack: JackId::Headphone,
            raw_level: true,
        };
        codec.on_jack_event(event, t(0)).await.unwrap();

        assert_eq!(codec.backend().outputs, vec![(OutputTarget::Output1, true)]);
        assert_eq!(codec.connected_devices(), 2);
        assert_eq!(codec.backend().unity_calls, 1);
        assert_eq!(codec.host().last_devices(), Some(2));
    }

    #[tokio::test]
    async fn dallas_confirmation_loads_the_speaker_preset() {
        let backend = wired(JackState::Disconnected, JackState::Connected);
        let mut host = MockHost::new();
        host.answer_speaker_id(Some(SpeakerId::new(3)));
        let mut codec = codec(backend, host);

        let event = JackEvent {
            jack: JackId::Dallas,
            raw_level: true,
        };
        codec.on_jack_event(event, t(0)).await.unwrap();
        assert!(codec.backend().groups.is_empty());
        assert_eq!(codec.next_deadline(), Some(t(4_000)));

        codec.on_timer(t(4_000)).await.unwrap();

        assert_eq!(codec.backend().groups, vec![4]);
        assert_eq!(codec.connected_devices(), 4);
        assert!(!codec.speaker_connect_failed());
        assert!(codec.jacks().source(JackId::Dallas).unwrap().enabled());
        let range = codec.host().last_volume_range().unwrap();
        assert_eq!((range.min, range.max), (0, 134));
    }

    #[tokio::test]
    async fn failed_identification_defers_the_notice() {
        let backend = wired(JackState::Disconnected, JackState::Connected);
        let mut host = MockHost::new();
        host.logged_in = false;
        let mut codec = codec(backend, host);

        codec
            .on_jack_event(
                JackEvent {
                    jack: JackId::Dallas,
                    raw_level: true,
                },
                t(0),
            )
            .await
            .unwrap();
        codec.on_timer(t(4_000)).await.unwrap();

        assert!(codec.speaker_connect_failed());
        // No ID: the first preset for the route still applies.
        assert_eq!(codec.backend().groups, vec![4]);
        assert_eq!(codec.next_deadline(), Some(t(64_000)));

        codec.host_mut().logged_in = true;
        codec.on_timer(t(64_000)).await.unwrap();
        assert_eq!(codec.next_deadline(), Some(t(84_000)));

        codec.on_timer(t(84_000)).await.unwrap();
        assert_eq!(codec.host().notices(), 1);
        assert_eq!(codec.next_deadline(), None);
    }

    #[tokio::test]
    async fn tessera_internal_speaker_mixes_right_channel() {
        let backend = wired(JackState::Disconnected, JackState::Disconnected);
        let mut codec = Codec::new(
            backend,
            MockHost::new(),
            CodecConfig::for_layout(LayoutId::TESSERA),
            &PRESETS,
        );
        codec.initialize(t(0)).await.unwrap();

        // Dallas wired: the wake path arms the confirmation instead.
        codec.on_timer(t(4_000)).await.unwrap();
        assert!(codec
            .host()
            .calls
            .contains(&HostCall::RightChannelMixed(true)));
    }

    #[tokio::test]
    async fn volume_is_validated_against_the_chip() {
        let mut codec = codec(FakeBackend::default(), MockHost::new());
        assert_eq!(
            codec.set_system_volume(177, 0).await,
            Err(CodecError::InvalidArgument)
        );
        codec.set_system_volume_mono(100).await.unwrap();
        codec.set_system_mute(true).await.unwrap();
        assert!(codec.system_mute());
        assert_eq!(
            codec.volume(),
            VolumeState {
                left: 100,
                right: 100,
                mute_requested: true
            }
        );
        assert_eq!(codec.backend().volumes.len(), 2);
    }

    #[tokio::test]
    async fn sleep_and_wake_sequence() {
        let backend = wired(JackState::Connected, JackState::Disconnected);
        let mut codec = codec(backend, MockHost::new());

        codec
            .on_power_state_change(PowerState::Sleep, t(0))
            .await
            .unwrap();
        codec
            .on_power_state_change(PowerState::Active, t(10))
            .await
            .unwrap();

        assert_eq!(codec.backend().power, vec!["sleep", "wake"]);
        assert_eq!(
            codec.backend().outputs,
            vec![(OutputTarget::None, true), (OutputTarget::Output1, true)]
        );
        let clocks: Vec<_> = codec
            .host()
            .calls
            .iter()
            .filter(|c| matches!(c, HostCall::I2sClock(_)))
            .copied()
            .collect();
        assert_eq!(clocks, vec![HostCall::I2sClock(false), HostCall::I2sClock(true)]);
    }

    #[tokio::test]
    async fn polled_backend_publishes_in_sense_changes() {
        let backend = FakeBackend {
            polled: true,
            in_sense: Some(0b1000),
            ..FakeBackend::default()
        };
        let mut codec = codec(backend, MockHost::new());
        codec.initialize(t(0)).await.unwrap();

        assert_eq!(codec.connected_devices(), 0b1000);
        assert_eq!(codec.next_deadline(), Some(t(1_000)));

        codec.on_timer(t(1_000)).await.unwrap();
        assert_eq!(codec.next_deadline(), Some(t(1_000) + Duration::from_secs(1)));
        assert!(codec.backend().outputs.is_empty());
    }
}
