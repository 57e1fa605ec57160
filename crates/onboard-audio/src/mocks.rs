//! Host mock for testing
//!
//! [`MockHost`] records every call the codec makes in order, and answers
//! speaker-ID reads from a queue the test fills.

#![cfg(any(test, feature = "std"))]

use std::collections::VecDeque;
use std::vec::Vec;

use platform::SpeakerId;

use crate::drc::VolumeRange;
use crate::host::AudioHost;

/// One call into the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    /// `read_speaker_id`.
    ReadSpeakerId,
    /// `post_speakers_not_connected_notice`.
    SpeakersNotConnected,
    /// `set_volume_range`.
    VolumeRange(VolumeRange),
    /// `set_i2s_clock`.
    I2sClock(bool),
    /// `set_right_channel_mixed`.
    RightChannelMixed(bool),
    /// `set_speaker_connect_failed`.
    SpeakerConnectFailed(bool),
    /// `set_current_devices`.
    CurrentDevices(u32),
}

/// Scriptable [`AudioHost`].
#[derive(Debug, Default)]
pub struct MockHost {
    /// Calls so far.
    pub calls: Vec<HostCall>,
    /// Whether a speaker ID reader exists.
    pub speaker_identifier: bool,
    /// Console login state.
    pub logged_in: bool,
    /// Answers for successive ID reads; an empty queue fails the read.
    pub speaker_ids: VecDeque<Option<SpeakerId>>,
}

impl MockHost {
    /// Host with a speaker ID reader and a logged-in user.
    pub fn new() -> Self {
        Self {
            speaker_identifier: true,
            logged_in: true,
            ..Self::default()
        }
    }

    /// Queue the answer to the next ID read.
    pub fn answer_speaker_id(&mut self, id: Option<SpeakerId>) {
        self.speaker_ids.push_back(id);
    }

    /// Number of notices posted.
    pub fn notices(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::SpeakersNotConnected))
            .count()
    }

    /// Number of ID reads.
    pub fn id_reads(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::ReadSpeakerId))
            .count()
    }

    /// Most recent volume range pushed.
    pub fn last_volume_range(&self) -> Option<VolumeRange> {
        self.calls.iter().rev().find_map(|c| match c {
            HostCall::VolumeRange(r) => Some(*r),
            _ => None,
        })
    }

    /// Most recent device mask published.
    pub fn last_devices(&self) -> Option<u32> {
        self.calls.iter().rev().find_map(|c| match c {
            HostCall::CurrentDevices(d) => Some(*d),
            _ => None,
        })
    }
}

impl AudioHost for MockHost {
    fn has_speaker_identifier(&self) -> bool {
        self.speaker_identifier
    }

    async fn read_speaker_id(&mut self) -> Option<SpeakerId> {
        self.calls.push(HostCall::ReadSpeakerId);
        self.speaker_ids.pop_front().flatten()
    }

    fn user_logged_in(&self) -> bool {
        self.logged_in
    }

    fn post_speakers_not_connected_notice(&mut self) {
        self.calls.push(HostCall::SpeakersNotConnected);
    }

    fn set_volume_range(&mut self, range: VolumeRange) {
        self.calls.push(HostCall::VolumeRange(range));
    }

    fn set_i2s_clock(&mut self, on: bool) {
        self.calls.push(HostCall::I2sClock(on));
    }

    fn set_right_channel_mixed(&mut self, mixed: bool) {
        self.calls.push(HostCall::RightChannelMixed(mixed));
    }

    fn set_speaker_connect_failed(&mut self, failed: bool) {
        self.calls.push(HostCall::SpeakerConnectFailed(failed));
    }

    fn set_current_devices(&mut self, devices: u32) {
        self.calls.push(HostCall::CurrentDevices(devices));
    }
}
