//! Jack detection, debounce and routing.
//!
//! Two jacks matter to the routing decision:
//!
//! - the headphone jack, handled as soon as its interrupt arrives;
//! - the "Dallas" external-speaker jack, whose plug carries an ID ROM. Its
//!   interrupt only arms a confirmation; the jack is re-read once the plug
//!   has had [`CodecConfig::dallas_insertion_delay`] to seat, because a
//!   half-inserted plug makes the ROM unreadable.
//!
//! Each source is disabled while its event is handled and re-enabled
//! afterwards. Events that arrive for a disabled source are dropped, and
//! Dallas events within [`CodecConfig::debounce_quiet`] of the last handled
//! one are coalesced.
//!
//! This module only keeps state. Reading pins and acting on a decision is
//! up to [`crate::codec::Codec`].

use embassy_time::{Duration, Instant};
use platform::ActiveLevel;

use crate::config::CodecConfig;
use crate::timer::{earliest, OneShot};

/// Device-match code: internal speaker.
pub const DEVICE_INTERNAL_SPEAKER: u32 = 1;
/// Device-match code: headphones.
pub const DEVICE_HEADPHONES: u32 = 2;
/// Device-match code: external (Dallas) speakers.
pub const DEVICE_EXTERNAL_SPEAKERS: u32 = 4;

/// Jacks the codec tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JackId {
    /// Headphone jack.
    Headphone,
    /// External-speaker jack with ID ROM.
    Dallas,
}

/// Last known state of a jack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JackState {
    /// Never sampled.
    #[default]
    Unknown,
    /// Plug inserted.
    Connected,
    /// No plug.
    Disconnected,
}

impl JackState {
    /// From a logical "sense line active" reading.
    pub const fn from_active(active: bool) -> Self {
        if active {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    /// `true` only for [`JackState::Connected`].
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Where audio goes, derived from the jack states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoutingDecision {
    /// Built-in speaker.
    InternalSpeaker,
    /// Headphone jack.
    Headphones,
    /// Identified external speakers.
    ExternalSpeakers,
}

impl RoutingDecision {
    /// Headphones win over external speakers, which win over the internal
    /// speaker. `Unknown` counts as not connected.
    pub const fn from_states(headphone: JackState, dallas: JackState) -> Self {
        if headphone.is_connected() {
            Self::Headphones
        } else if dallas.is_connected() {
            Self::ExternalSpeakers
        } else {
            Self::InternalSpeaker
        }
    }

    /// Device-match code used to select EQ presets.
    pub const fn code(self) -> u32 {
        match self {
            Self::InternalSpeaker => DEVICE_INTERNAL_SPEAKER,
            Self::Headphones => DEVICE_HEADPHONES,
            Self::ExternalSpeakers => DEVICE_EXTERNAL_SPEAKERS,
        }
    }
}

/// Raw interrupt report posted by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JackEvent {
    /// Which jack fired.
    pub jack: JackId,
    /// Electrical level of the sense line when the interrupt was taken.
    pub raw_level: bool,
}

// ── JackSource ──────────────────────────────────────────────────────────────

/// Bookkeeping for one jack's interrupt source.
#[derive(Debug, Clone, Copy)]
pub struct JackSource {
    active: ActiveLevel,
    enabled: bool,
    state: JackState,
}

impl JackSource {
    /// An enabled source in the `Unknown` state.
    pub const fn new(active: ActiveLevel) -> Self {
        Self {
            active,
            enabled: true,
            state: JackState::Unknown,
        }
    }

    /// `true` while events from this source are accepted.
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Accept events again.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Drop events until re-enabled.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Last recorded state.
    pub const fn state(&self) -> JackState {
        self.state
    }

    /// Map an electrical level through the source polarity.
    pub fn state_for_level(&self, raw_level: bool) -> JackState {
        JackState::from_active(self.active.drive_high(true) == raw_level)
    }

    fn record_level(&mut self, raw_level: bool) -> JackState {
        self.state = self.state_for_level(raw_level);
        self.state
    }
}

// ── Debounce controller ─────────────────────────────────────────────────────

/// Outcome of a jack interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JackResponse {
    /// The board has no such jack.
    NoSuchJack,
    /// The source was disabled; the event was dropped.
    SourceDisabled,
    /// Headphone state recorded; re-route now.
    HeadphoneChanged(JackState),
    /// Within the quiet interval of the last handled Dallas event.
    Coalesced,
    /// Dallas confirmation armed for the given deadline. The source stays
    /// disabled until the confirmation has run.
    ConfirmationArmed(Instant),
}

/// Jack state machine shared by every backend with interrupt-driven jacks.
#[derive(Debug, Clone)]
pub struct JackDebounceController {
    headphone: Option<JackSource>,
    dallas: Option<JackSource>,
    quiet: Duration,
    insertion_delay: Duration,
    last_handled: Option<Instant>,
    confirmation: OneShot,
}

impl JackDebounceController {
    /// Controller for a board with the given jacks. `None` means the jack is
    /// not wired.
    pub fn new(
        headphone: Option<ActiveLevel>,
        dallas: Option<ActiveLevel>,
        config: &CodecConfig,
    ) -> Self {
        Self {
            headphone: headphone.map(JackSource::new),
            dallas: dallas.map(JackSource::new),
            quiet: config.debounce_quiet,
            insertion_delay: config.dallas_insertion_delay,
            last_handled: None,
            confirmation: OneShot::new(),
        }
    }

    /// `true` if the board has `jack`.
    pub fn has_jack(&self, jack: JackId) -> bool {
        self.source(jack).is_some()
    }

    /// Interrupt source of `jack`.
    pub fn source(&self, jack: JackId) -> Option<&JackSource> {
        match jack {
            JackId::Headphone => self.headphone.as_ref(),
            JackId::Dallas => self.dallas.as_ref(),
        }
    }

    /// Mutable interrupt source of `jack`.
    pub fn source_mut(&mut self, jack: JackId) -> Option<&mut JackSource> {
        match jack {
            JackId::Headphone => self.headphone.as_mut(),
            JackId::Dallas => self.dallas.as_mut(),
        }
    }

    /// Last recorded state of `jack`; `Unknown` if not wired.
    pub fn state(&self, jack: JackId) -> JackState {
        self.source(jack).map_or(JackState::Unknown, JackSource::state)
    }

    /// Record a freshly sampled electrical level for `jack`.
    pub fn record_level(&mut self, jack: JackId, raw_level: bool) -> JackState {
        self.source_mut(jack)
            .map_or(JackState::Unknown, |s| s.record_level(raw_level))
    }

    /// Record a state sampled through the backend's sense line.
    pub fn set_state(&mut self, jack: JackId, state: JackState) {
        if let Some(source) = self.source_mut(jack) {
            source.state = state;
        }
    }

    /// Current routing.
    pub fn routing(&self) -> RoutingDecision {
        RoutingDecision::from_states(self.state(JackId::Headphone), self.state(JackId::Dallas))
    }

    /// Handle an interrupt report.
    pub fn on_interrupt(&mut self, event: JackEvent, now: Instant) -> JackResponse {
        let quiet = self.quiet;
        let insertion_delay = self.insertion_delay;
        let last_handled = self.last_handled;

        let Some(source) = self.source_mut(event.jack) else {
            return JackResponse::NoSuchJack;
        };
        if !source.enabled() {
            return JackResponse::SourceDisabled;
        }

        match event.jack {
            JackId::Headphone => {
                let state = source.record_level(event.raw_level);
                JackResponse::HeadphoneChanged(state)
            }
            JackId::Dallas => {
                source.disable();
                let recent = last_handled
                    .and_then(|t| now.checked_duration_since(t))
                    .is_some_and(|elapsed| elapsed <= quiet);
                if recent {
                    source.enable();
                    return JackResponse::Coalesced;
                }
                self.confirmation.arm(now, insertion_delay);
                JackResponse::ConfirmationArmed(
                    self.confirmation.deadline().unwrap_or(Instant::MAX),
                )
            }
        }
    }

    /// Disarm and return `true` if the Dallas confirmation is due.
    pub fn take_confirmation(&mut self, now: Instant) -> bool {
        self.confirmation.take_expired(now)
    }

    /// Stamp the time a Dallas-triggered re-route completed.
    pub fn mark_handled(&mut self, now: Instant) {
        self.last_handled = Some(now);
    }

    /// Pending Dallas confirmation deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.confirmation.deadline()
    }

    /// Drop any pending confirmation and re-enable every source.
    pub fn reset(&mut self) {
        self.confirmation.cancel();
        for source in [self.headphone.as_mut(), self.dallas.as_mut()]
            .into_iter()
            .flatten()
        {
            source.enable();
        }
    }
}

// ── Speaker notifier ────────────────────────────────────────────────────────

/// What the notifier decided when it fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotifierStep {
    /// Nobody logged in; re-armed for `notify_delay`.
    WaitingForUser,
    /// First login seen; re-armed for `login_delay`.
    DelayedForLogin,
    /// A user is present: retry identification now.
    Retry,
}

/// Deferred "speakers not fully connected" notice.
///
/// The notice must not be posted to an empty console or hidden behind the
/// login window, so the notifier waits for a user and then gives the login
/// a head start before retrying the speaker ID.
#[derive(Debug, Clone, Default)]
pub struct SpeakerNotifier {
    timer: OneShot,
    done_waiting: bool,
}

impl SpeakerNotifier {
    /// A disarmed notifier.
    pub const fn new() -> Self {
        Self {
            timer: OneShot::new(),
            done_waiting: false,
        }
    }

    /// Decide what to do now; re-arms the timer when waiting.
    pub fn step(&mut self, now: Instant, user_logged_in: bool, config: &CodecConfig) -> NotifierStep {
        if !user_logged_in {
            self.timer.arm(now, config.notify_delay);
            NotifierStep::WaitingForUser
        } else if !self.done_waiting {
            self.timer.arm(now, config.login_delay);
            self.done_waiting = true;
            NotifierStep::DelayedForLogin
        } else {
            NotifierStep::Retry
        }
    }

    /// Fire on the next timer check instead of retrying inline.
    pub fn schedule_retry(&mut self, now: Instant) {
        self.timer.arm(now, Duration::from_ticks(0));
    }

    /// Disarm and return `true` if the timer is due.
    pub fn take_expired(&mut self, now: Instant) -> bool {
        self.timer.take_expired(now)
    }

    /// Pending deadline.
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Stop waiting.
    pub fn cancel(&mut self) {
        self.timer.cancel();
    }
}

/// Earliest of the jack controller's and the notifier's deadlines.
pub fn next_deadline(jacks: &JackDebounceController, notifier: &SpeakerNotifier) -> Option<Instant> {
    earliest(jacks.next_deadline(), notifier.deadline())
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    use JackState::{Connected, Disconnected, Unknown};

    fn controller() -> JackDebounceController {
        JackDebounceController::new(
            Some(ActiveLevel::High),
            Some(ActiveLevel::Low),
            &CodecConfig::default(),
        )
    }

    fn dallas(raw_level: bool) -> JackEvent {
        JackEvent {
            jack: JackId::Dallas,
            raw_level,
        }
    }

    #[test]
    fn routing_truth_table() {
        use RoutingDecision::*;
        let cases = [
            (Connected, Disconnected, Headphones),
            (Connected, Connected, Headphones),
            (Disconnected, Connected, ExternalSpeakers),
            (Disconnected, Disconnected, InternalSpeaker),
            (Unknown, Unknown, InternalSpeaker),
            (Unknown, Connected, ExternalSpeakers),
        ];
        for (hp, dallas, expected) in cases {
            assert_eq!(RoutingDecision::from_states(hp, dallas), expected);
        }
    }

    #[test]
    fn device_codes() {
        assert_eq!(RoutingDecision::InternalSpeaker.code(), 1);
        assert_eq!(RoutingDecision::Headphones.code(), 2);
        assert_eq!(RoutingDecision::ExternalSpeakers.code(), 4);
    }

    #[test]
    fn headphone_interrupt_maps_polarity() {
        let mut jacks = controller();
        let now = Instant::from_millis(0);

        let response = jacks.on_interrupt(
            JackEvent {
                jack: JackId::Headphone,
                raw_level: true,
            },
            now,
        );

        assert_eq!(response, JackResponse::HeadphoneChanged(Connected));
        assert_eq!(jacks.routing(), RoutingDecision::Headphones);
    }

    #[test]
    fn dallas_interrupt_arms_confirmation_and_disables_source() {
        let mut jacks = controller();
        let now = Instant::from_millis(100);

        let response = jacks.on_interrupt(dallas(false), now);

        assert_eq!(
            response,
            JackResponse::ConfirmationArmed(now + Duration::from_secs(4))
        );
        assert!(!jacks.source(JackId::Dallas).is_some_and(JackSource::enabled));
        assert_eq!(jacks.on_interrupt(dallas(false), now), JackResponse::SourceDisabled);
    }

    #[test]
    fn dallas_interrupt_inside_quiet_interval_is_coalesced() {
        let mut jacks = controller();
        let t0 = Instant::from_millis(5_000);
        jacks.mark_handled(t0);

        let response = jacks.on_interrupt(dallas(false), t0 + Duration::from_millis(5));

        assert_eq!(response, JackResponse::Coalesced);
        assert!(jacks.source(JackId::Dallas).is_some_and(JackSource::enabled));
        assert_eq!(jacks.next_deadline(), None);
    }

    #[test]
    fn dallas_interrupt_after_quiet_interval_is_handled() {
        let mut jacks = controller();
        let t0 = Instant::from_millis(5_000);
        jacks.mark_handled(t0);

        let response = jacks.on_interrupt(dallas(false), t0 + Duration::from_millis(11));

        assert!(matches!(response, JackResponse::ConfirmationArmed(_)));
    }

    #[test]
    fn record_level_uses_active_low_polarity() {
        let mut jacks = controller();
        assert_eq!(jacks.record_level(JackId::Dallas, false), Connected);
        assert_eq!(jacks.record_level(JackId::Dallas, true), Disconnected);
    }

    #[test]
    fn missing_jack_is_reported() {
        let mut jacks = JackDebounceController::new(None, None, &CodecConfig::default());
        assert_eq!(
            jacks.on_interrupt(dallas(true), Instant::from_millis(0)),
            JackResponse::NoSuchJack
        );
        assert_eq!(jacks.state(JackId::Headphone), Unknown);
    }

    #[test]
    fn notifier_waits_for_user_then_login() {
        let config = CodecConfig::default();
        let mut notifier = SpeakerNotifier::new();
        let t0 = Instant::from_millis(0);

        assert_eq!(notifier.step(t0, false, &config), NotifierStep::WaitingForUser);
        assert_eq!(notifier.deadline(), Some(t0 + Duration::from_secs(60)));

        assert_eq!(notifier.step(t0, true, &config), NotifierStep::DelayedForLogin);
        assert_eq!(notifier.deadline(), Some(t0 + Duration::from_secs(20)));

        assert!(notifier.take_expired(t0 + Duration::from_secs(20)));
        assert_eq!(notifier.step(t0, true, &config), NotifierStep::Retry);
        assert_eq!(notifier.deadline(), None);
    }

    #[test]
    fn scheduled_retry_is_due_immediately() {
        let mut notifier = SpeakerNotifier::new();
        let t0 = Instant::from_millis(5);
        notifier.schedule_retry(t0);
        assert_eq!(notifier.deadline(), Some(t0));
        assert!(notifier.take_expired(t0));
    }
}
