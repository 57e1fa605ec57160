#![allow(clippy::unwrap_used, clippy::indexing_slicing)]
//! AWACS / Screamer behind the codec facade: polled jacks, volume, power.

use embassy_time::{Duration, Instant};
use onboard_audio::drc::VolumeRange;
use onboard_audio::screamer::{REG_CONTROL, REG_OUTPUT_A_ATTEN, REG_OUTPUT_C_ATTEN};
use onboard_audio::{
    AudioHost, Codec, CodecConfig, CodecError, DrcInfo, InputSource, OutputTarget, PowerState,
    Screamer,
};
use platform::mocks::{MockAwacsPort, MockDelay, Trace};
use platform::{LayoutId, SpeakerId};

const SCREAMER_CRYSTAL: u32 = 0x3100;
const AWACS_NATIONAL: u32 = 0x2200;

/// In-sense bit 0 (after reversal) is the headphone jack on these boards.
const HEADPHONE_SENSE: u32 = 0b1000;
const HEADPHONES: u32 = 2;
const INTERNAL_SPEAKER: u32 = 1;

/// Host that maps in-sense bits to device codes and records them.
#[derive(Default)]
struct BoardHost {
    devices: Vec<u32>,
}

impl AudioHost for BoardHost {
    fn has_speaker_identifier(&self) -> bool {
        false
    }

    async fn read_speaker_id(&mut self) -> Option<SpeakerId> {
        None
    }

    fn user_logged_in(&self) -> bool {
        true
    }

    fn post_speakers_not_connected_notice(&mut self) {}

    fn set_volume_range(&mut self, _range: VolumeRange) {}

    fn set_current_devices(&mut self, devices: u32) {
        self.devices.push(devices);
    }

    fn refresh_devices(&mut self, in_sense: u32) -> u32 {
        if in_sense & HEADPHONE_SENSE != 0 {
            HEADPHONES
        } else {
            INTERNAL_SPEAKER
        }
    }
}

type TestCodec = Codec<Screamer<MockAwacsPort, MockDelay>, BoardHost>;

fn screamer_codec(status: u32) -> (TestCodec, MockAwacsPort, Trace) {
    let trace = Trace::new();
    let port = MockAwacsPort::new(status, trace.clone());
    let chip = Screamer::new(port.clone(), MockDelay::new(trace.clone())).unwrap();
    let config = CodecConfig {
        poll_interval: Duration::from_millis(250),
        ..CodecConfig::for_layout(LayoutId::UNKNOWN)
    };
    (Codec::new(chip, BoardHost::default(), config, &[]), port, trace)
}

fn t(ms: u64) -> Instant {
    Instant::from_millis(ms)
}

#[tokio::test]
async fn polling_tracks_the_headphone_jack() {
    let (mut codec, port, _trace) = screamer_codec(SCREAMER_CRYSTAL);
    codec.initialize(t(0)).await.unwrap();
    assert_eq!(codec.connected_devices(), INTERNAL_SPEAKER);
    assert_eq!(codec.next_deadline(), Some(t(250)));

    // Bit 0 of the status reads back as bit 3 of the in-sense mask.
    port.set_status(SCREAMER_CRYSTAL | 0b0001);
    codec.on_timer(t(250)).await.unwrap();
    assert_eq!(codec.connected_devices(), HEADPHONES);

    // No change: nothing is published.
    codec.on_timer(t(500)).await.unwrap();
    assert_eq!(codec.host().devices, vec![INTERNAL_SPEAKER, HEADPHONES]);
    assert_eq!(codec.next_deadline(), Some(t(750)));
}

#[tokio::test]
async fn volume_drives_both_attenuators() {
    let (mut codec, port, _trace) = screamer_codec(SCREAMER_CRYSTAL);
    codec.initialize(t(0)).await.unwrap();
    codec.set_active_output(OutputTarget::Output2).await.unwrap();

    assert_eq!(
        codec.set_system_volume(16, 3).await,
        Err(CodecError::InvalidArgument)
    );
    codec.set_system_volume(15, 8).await.unwrap();

    let expected = (1 << 6) | 8;
    assert_eq!(port.register(REG_OUTPUT_A_ATTEN), expected);
    assert_eq!(port.register(REG_OUTPUT_C_ATTEN), expected);

    codec.set_system_mute(true).await.unwrap();
    assert_eq!(port.register(REG_CONTROL) & 0x280, 0x280);
    codec.set_system_mute(false).await.unwrap();
    // Output 2 is the speaker on port C: only port A stays muted.
    assert_eq!(port.register(REG_CONTROL) & 0x280, 0x080);
}

#[tokio::test]
async fn equalizer_operations_are_unsupported() {
    let (mut codec, _port, _trace) = screamer_codec(SCREAMER_CRYSTAL);
    assert_eq!(
        codec.set_drc(&DrcInfo::DISABLED).await,
        Err(CodecError::Unsupported)
    );
    assert_eq!(
        codec.set_output_biquad_group(&[]).await,
        Err(CodecError::Unsupported)
    );
}

#[tokio::test]
async fn input_switch_recalibrates() {
    let (mut codec, _port, trace) = screamer_codec(SCREAMER_CRYSTAL);
    codec.initialize(t(0)).await.unwrap();
    trace.clear();

    codec.set_active_input(InputSource::A).await.unwrap();

    assert_eq!(codec.active_input(), InputSource::A);
    assert_eq!(
        trace.delays(),
        vec![Duration::from_millis(10), Duration::from_millis(1000)]
    );
}

#[tokio::test]
async fn pc_card_input_needs_a_screamer() {
    let (mut codec, _port, _trace) = screamer_codec(AWACS_NATIONAL);
    assert_eq!(
        codec.set_active_input(InputSource::Pcmcia).await,
        Err(CodecError::Unsupported)
    );

    let (mut codec, _port, _trace) = screamer_codec(SCREAMER_CRYSTAL);
    codec.set_active_input(InputSource::Pcmcia).await.unwrap();
    assert_eq!(codec.active_input(), InputSource::Pcmcia);
}

#[tokio::test]
async fn sleep_mutes_and_wake_recalibrates() {
    let (mut codec, port, trace) = screamer_codec(AWACS_NATIONAL);
    codec.initialize(t(0)).await.unwrap();
    codec.set_active_output(OutputTarget::Output1).await.unwrap();

    codec
        .on_power_state_change(PowerState::Sleep, t(100))
        .await
        .unwrap();
    assert_eq!(codec.active_output(), OutputTarget::None);
    assert_eq!(port.register(REG_CONTROL) & 0x280, 0x280);
    assert_eq!(codec.next_deadline(), None);

    trace.clear();
    codec
        .on_power_state_change(PowerState::Active, t(5_000))
        .await
        .unwrap();
    assert_eq!(
        trace.delays(),
        vec![Duration::from_millis(10), Duration::from_millis(1000)]
    );
    assert_eq!(codec.next_deadline(), Some(t(5_250)));
}
