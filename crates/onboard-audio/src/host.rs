//! Services the codec needs from the rest of the system.
//!
//! The audio framework owns the volume controls and the user notice, the
//! platform owns the I²S clock, and the speaker ID ROM sits behind its own
//! one-wire driver. [`crate::codec::Codec`] reaches all of them through
//! [`AudioHost`].

use platform::SpeakerId;

use crate::drc::VolumeRange;

/// Host-side hooks used by the codec facade.
#[allow(async_fn_in_trait)]
pub trait AudioHost {
    /// `true` if an external-speaker ID reader is present.
    fn has_speaker_identifier(&self) -> bool;

    /// Read the speaker ID ROM. `None` if the read failed, usually because
    /// the plug is not fully inserted.
    async fn read_speaker_id(&mut self) -> Option<SpeakerId>;

    /// `true` once a user is logged in at the console.
    fn user_logged_in(&self) -> bool;

    /// Tell the user the external speakers are not fully plugged in.
    fn post_speakers_not_connected_notice(&mut self);

    /// Update the level range of the output volume control.
    fn set_volume_range(&mut self, range: VolumeRange);

    /// Gate the I²S clock.
    fn set_i2s_clock(&mut self, _on: bool) {}

    /// Fold the right channel into the left for a mono speaker.
    fn set_right_channel_mixed(&mut self, _mixed: bool) {}

    /// Publish the speaker-connect-failed flag.
    fn set_speaker_connect_failed(&mut self, _failed: bool) {}

    /// Publish the connected-device mask.
    fn set_current_devices(&mut self, _devices: u32) {}

    /// Turn polled in-sense bits into a connected-device mask. The default
    /// takes the bits as they are.
    fn refresh_devices(&mut self, in_sense: u32) -> u32 {
        in_sense
    }
}
