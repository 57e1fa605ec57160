//! Event loop that owns a [`Codec`].
//!
//! Jack interrupts are posted into a [`Channel`] by the platform layer (from
//! an EXTI task or interrupt handler). One task drains the channel and wakes
//! up for the codec's own deadlines: Dallas confirmation, the speaker
//! notifier and the jack poll tick.
//!
//! ```text
//! EXTI task ──try_post_jack_event──▶ JACK_EVENTS ──▶ run_jack_events ──▶ Codec
//!                                        Timer::at(next_deadline) ──┘
//! ```

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Instant, Timer};

use crate::backend::CodecBackend;
use crate::codec::Codec;
use crate::error::CodecError;
use crate::host::AudioHost;
use crate::jack::JackEvent;

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Depth of the jack event channel.
pub const JACK_EVENT_DEPTH: usize = 8;

/// Jack events shared between the interrupt side and the codec task.
pub static JACK_EVENTS: Channel<CriticalSectionRawMutex, JackEvent, JACK_EVENT_DEPTH> =
    Channel::new();

/// Post a jack event without blocking.
///
/// Returns `false` if the channel was full and the event was dropped. A
/// dropped event is harmless: the next one for the same jack carries the
/// current level.
pub fn try_post_jack_event<M: RawMutex, const N: usize>(
    tx: &Sender<'_, M, JackEvent, N>,
    event: JackEvent,
) -> bool {
    match tx.try_send(event) {
        Ok(()) => true,
        Err(_) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("jack event channel full, dropped {}", event);
            #[cfg(feature = "std")]
            tracing::warn!(?event, "jack event channel full, event dropped");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// Wait for the next event or deadline and handle it.
pub async fn service_once<B, H, M, const N: usize>(
    codec: &mut Codec<B, H>,
    events: &Receiver<'_, M, JackEvent, N>,
) -> Result<(), CodecError>
where
    B: CodecBackend,
    H: AudioHost,
    M: RawMutex,
{
    let deadline = codec.next_deadline();
    match select(events.receive(), wait_until(deadline)).await {
        Either::First(event) => codec.on_jack_event(event, Instant::now()).await,
        Either::Second(()) => codec.on_timer(Instant::now()).await,
    }
}

/// Drive `codec` forever. Errors are logged and the loop carries on.
pub async fn run_jack_events<B, H, M, const N: usize>(
    codec: &mut Codec<B, H>,
    events: Receiver<'_, M, JackEvent, N>,
) -> !
where
    B: CodecBackend,
    H: AudioHost,
    M: RawMutex,
{
    loop {
        if let Err(_e) = service_once(codec, &events).await {
            #[cfg(feature = "defmt")]
            defmt::warn!("codec event failed: {}", _e);
            #[cfg(feature = "std")]
            tracing::warn!(error = %_e, "codec event failed");
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => Timer::at(at).await,
        None => core::future::pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::eq::NO_PRESETS;
    use crate::jack::JackId;
    use crate::mocks::MockHost;
    use crate::screamer::Screamer;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_time::Duration;
    use platform::mocks::{MockAwacsPort, MockDelay, Trace};
    use platform::LayoutId;

    const SCREAMER: u32 = 0x3100;

    fn screamer_codec(port: &MockAwacsPort, trace: &Trace) -> Codec<Screamer<MockAwacsPort, MockDelay>, MockHost> {
        let chip = Screamer::new(port.clone(), MockDelay::new(trace.clone())).unwrap();
        let config = CodecConfig {
            poll_interval: Duration::from_millis(5),
            ..CodecConfig::for_layout(LayoutId::UNKNOWN)
        };
        Codec::new(chip, MockHost::new(), config, NO_PRESETS)
    }

    #[test]
    fn full_channel_drops_events() {
        let channel: Channel<NoopRawMutex, JackEvent, 1> = Channel::new();
        let event = JackEvent {
            jack: JackId::Headphone,
            raw_level: true,
        };
        assert!(try_post_jack_event(&channel.sender(), event));
        assert!(!try_post_jack_event(&channel.sender(), event));
    }

    #[tokio::test]
    async fn posted_event_is_handled_before_any_deadline() {
        let trace = Trace::new();
        let port = MockAwacsPort::new(SCREAMER, trace.clone());
        let mut codec = screamer_codec(&port, &trace);
        let channel: Channel<NoopRawMutex, JackEvent, 4> = Channel::new();

        try_post_jack_event(
            &channel.sender(),
            JackEvent {
                jack: JackId::Headphone,
                raw_level: true,
            },
        );
        service_once(&mut codec, &channel.receiver()).await.unwrap();

        assert!(channel.is_empty());
    }

    #[tokio::test]
    async fn poll_tick_picks_up_in_sense_changes() {
        let trace = Trace::new();
        let port = MockAwacsPort::new(SCREAMER, trace.clone());
        let mut codec = screamer_codec(&port, &trace);
        let channel: Channel<NoopRawMutex, JackEvent, 4> = Channel::new();

        codec.initialize(Instant::now()).await.unwrap();
        assert_eq!(codec.connected_devices(), 0);

        port.set_status(SCREAMER | 0b0010);
        service_once(&mut codec, &channel.receiver()).await.unwrap();

        assert_eq!(codec.connected_devices(), 0b0100);
        assert!(codec.next_deadline().is_some());
    }
}
