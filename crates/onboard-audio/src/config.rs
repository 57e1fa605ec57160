//! Codec configuration.
//!
//! Every timing constant the drivers use lives here so a board can tune it
//! without touching the state machines. `Default` reproduces the values the
//! shipping machines were qualified with:
//!
//! | Setting                       | Default |
//! |-------------------------------|---------|
//! | `max_reset_attempts`          | 5       |
//! | `amp_recovery`                | 200 ms  |
//! | `dallas_insertion_delay`      | 4 s     |
//! | `debounce_quiet`              | 10 ms   |
//! | `notify_delay`                | 60 s    |
//! | `login_delay`                 | 20 s    |
//! | `poll_interval`               | 1 s     |
//! | `hold_headphone_mute_layouts` | `[P29]` |

use embassy_time::Duration;
use platform::{I2cAddr, LayoutId};

/// Layouts whose headphone amplifier must stay muted while the speakers play.
pub const DEFAULT_HOLD_HEADPHONE_MUTE: &[LayoutId] = &[LayoutId::P29];

/// Board- and policy-level settings shared by both codec backends.
#[derive(Debug, Clone, Copy)]
pub struct CodecConfig {
    /// Machine sound layout (selects EQ presets and amplifier quirks).
    pub layout: LayoutId,
    /// Reset attempts before the codec is declared dead.
    pub max_reset_attempts: u8,
    /// Settling time after an amplifier mute change.
    pub amp_recovery: Duration,
    /// Wait between a Dallas-jack edge and reading the speaker ID ROM.
    pub dallas_insertion_delay: Duration,
    /// Jack interrupts closer than this to the last handled one are dropped.
    pub debounce_quiet: Duration,
    /// Notifier re-arm interval while nobody is logged in.
    pub notify_delay: Duration,
    /// Notifier delay after the first login, so the notice is not hidden
    /// behind the login window.
    pub login_delay: Duration,
    /// Jack-sense poll period for codecs without jack interrupts.
    pub poll_interval: Duration,
    /// Layouts that keep the headphone mute asserted on speaker outputs.
    pub hold_headphone_mute_layouts: &'static [LayoutId],
    /// TAS3001C-specific settings.
    pub tas: TasConfig,
}

impl CodecConfig {
    /// Default configuration for `layout`.
    pub fn for_layout(layout: LayoutId) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// `true` if this layout keeps the headphone mute asserted on speakers.
    pub fn holds_headphone_mute(&self) -> bool {
        self.hold_headphone_mute_layouts.contains(&self.layout)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            layout: LayoutId::UNKNOWN,
            max_reset_attempts: 5,
            amp_recovery: Duration::from_millis(200),
            dallas_insertion_delay: Duration::from_secs(4),
            debounce_quiet: Duration::from_millis(10),
            notify_delay: Duration::from_secs(60),
            login_delay: Duration::from_secs(20),
            poll_interval: Duration::from_secs(1),
            hold_headphone_mute_layouts: DEFAULT_HOLD_HEADPHONE_MUTE,
            tas: TasConfig::default(),
        }
    }
}

/// TAS3001C bus and protocol settings.
#[derive(Debug, Clone, Copy)]
pub struct TasConfig {
    /// 7-bit I²C address of the equalizer.
    pub address: I2cAddr,
    /// Reject biquad writes while the shadow MCR says normal load.
    pub strict_load_mode: bool,
}

impl Default for TasConfig {
    fn default() -> Self {
        Self {
            address: I2cAddr::TAS3001C,
            strict_load_mode: true,
        }
    }
}
