//! Headphone and speaker amplifier mute sequencing.
//!
//! The speaker amplifier can latch up when a plug goes into the speaker
//! jack; muting it releases the latch. Switching to a speaker output
//! therefore mutes it, waits for the amplifier to recover, and only then
//! brings it back.

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use platform::ControlLine;

use crate::backend::OutputTarget;
use crate::error::CodecError;

/// The two amplifier mute lines. Either may be absent on a given board.
pub struct AmpMutes<P> {
    headphone: Option<ControlLine<P>>,
    speaker: Option<ControlLine<P>>,
    hold_headphone_mute: bool,
    recovery: Duration,
}

impl<P: OutputPin> AmpMutes<P> {
    /// Mute lines with the board's settings.
    ///
    /// With `hold_headphone_mute` the headphone amplifier stays muted while
    /// the speakers play.
    pub fn new(
        headphone: Option<ControlLine<P>>,
        speaker: Option<ControlLine<P>>,
        hold_headphone_mute: bool,
        recovery: Duration,
    ) -> Self {
        Self {
            headphone,
            speaker,
            hold_headphone_mute,
            recovery,
        }
    }

    /// Drive both mute lines for `target`.
    pub async fn route<D: DelayNs>(
        &mut self,
        target: OutputTarget,
        delay: &mut D,
    ) -> Result<(), CodecError> {
        match target {
            OutputTarget::None => {
                self.mute_headphone(true)?;
                self.mute_speaker(true)?;
            }
            OutputTarget::Output1 => {
                self.mute_headphone(false)?;
                self.mute_speaker(true)?;
                self.recover(delay).await;
            }
            OutputTarget::Output2 | OutputTarget::Output3 | OutputTarget::Output4 => {
                self.mute_speaker(true)?;
                self.recover(delay).await;
                self.mute_headphone(true)?;
                self.mute_speaker(false)?;
                self.recover(delay).await;
                if !self.hold_headphone_mute {
                    self.mute_headphone(false)?;
                }
            }
        }
        Ok(())
    }

    /// Last driven headphone mute state.
    pub fn headphone_muted(&self) -> Option<bool> {
        self.headphone.as_ref().and_then(ControlLine::asserted)
    }

    /// Last driven speaker mute state.
    pub fn speaker_muted(&self) -> Option<bool> {
        self.speaker.as_ref().and_then(ControlLine::asserted)
    }

    fn mute_headphone(&mut self, mute: bool) -> Result<(), CodecError> {
        if let Some(line) = self.headphone.as_mut() {
            line.set_if_changed(mute)?;
        }
        Ok(())
    }

    fn mute_speaker(&mut self, mute: bool) -> Result<(), CodecError> {
        if let Some(line) = self.speaker.as_mut() {
            line.set_if_changed(mute)?;
        }
        Ok(())
    }

    async fn recover<D: DelayNs>(&self, delay: &mut D) {
        let ms = u32::try_from(self.recovery.as_millis()).unwrap_or(u32::MAX);
        delay.delay_ms(ms).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::{MockDelay, MockPin, Trace, TraceEvent};
    use platform::ActiveLevel;

    fn mutes(trace: &Trace, hold: bool) -> AmpMutes<MockPin> {
        AmpMutes::new(
            Some(ControlLine::new(
                MockPin::new("hp_mute", false, trace.clone()),
                ActiveLevel::High,
            )),
            Some(ControlLine::new(
                MockPin::new("amp_mute", false, trace.clone()),
                ActiveLevel::High,
            )),
            hold,
            Duration::from_millis(200),
        )
    }

    fn pin(name: &'static str, high: bool) -> TraceEvent {
        TraceEvent::Pin { name, high }
    }

    #[tokio::test]
    async fn speaker_output_sequence() {
        let trace = Trace::new();
        let mut amps = mutes(&trace, false);
        let mut delay = MockDelay::new(trace.clone());

        amps.route(OutputTarget::Output2, &mut delay).await.unwrap();

        let wait = TraceEvent::Delay(Duration::from_millis(200));
        assert_eq!(
            trace.events(),
            vec![
                pin("amp_mute", true),
                wait.clone(),
                pin("hp_mute", true),
                pin("amp_mute", false),
                wait,
                pin("hp_mute", false),
            ]
        );
    }

    #[tokio::test]
    async fn hold_layout_keeps_headphones_muted_on_speakers() {
        let trace = Trace::new();
        let mut amps = mutes(&trace, true);
        let mut delay = MockDelay::new(trace.clone());

        amps.route(OutputTarget::Output3, &mut delay).await.unwrap();

        assert_eq!(trace.pin_edges("hp_mute"), vec![true]);
        assert_eq!(amps.headphone_muted(), Some(true));
        assert_eq!(amps.speaker_muted(), Some(false));
    }

    #[tokio::test]
    async fn headphone_output_unmutes_headphones_only() {
        let trace = Trace::new();
        let mut amps = mutes(&trace, false);
        let mut delay = MockDelay::new(trace.clone());

        amps.route(OutputTarget::Output1, &mut delay).await.unwrap();

        assert_eq!(trace.pin_edges("hp_mute"), vec![false]);
        assert_eq!(trace.pin_edges("amp_mute"), vec![true]);
        assert_eq!(trace.delays(), vec![Duration::from_millis(200)]);
    }

    #[tokio::test]
    async fn unchanged_lines_are_not_rewritten() {
        let trace = Trace::new();
        let mut amps = mutes(&trace, false);
        let mut delay = MockDelay::new(trace.clone());

        amps.route(OutputTarget::None, &mut delay).await.unwrap();
        trace.clear();
        amps.route(OutputTarget::None, &mut delay).await.unwrap();

        assert!(trace.events().is_empty());
    }

    #[tokio::test]
    async fn missing_lines_are_skipped() {
        let trace = Trace::new();
        let mut amps: AmpMutes<MockPin> =
            AmpMutes::new(None, None, false, Duration::from_millis(200));
        let mut delay = MockDelay::new(trace.clone());

        amps.route(OutputTarget::Output2, &mut delay).await.unwrap();

        assert!(trace.pin_edges("hp_mute").is_empty());
        assert_eq!(trace.delays().len(), 2);
    }
}
