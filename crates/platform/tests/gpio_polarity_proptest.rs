#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Property-based tests for GPIO polarity mapping.
//! Whatever the board polarity, assert/negate and sense must agree.

use platform::gpio::{ActiveLevel, ControlLine, SenseLine};
use platform::mocks::{MockPin, Trace};

fn level(active_high: bool) -> ActiveLevel {
    if active_high {
        ActiveLevel::High
    } else {
        ActiveLevel::Low
    }
}

proptest::proptest! {
    /// A sense line wired to a control line of the same polarity reads back
    /// exactly what was asserted.
    #[test]
    fn sense_reads_back_asserted_state(active_high: bool, assert: bool) {
        let trace = Trace::new();
        let pin = MockPin::new("line", !active_high, trace.clone());
        let mut control = ControlLine::new(pin.clone(), level(active_high));
        let mut sense = SenseLine::new(pin, level(active_high));

        control.set(assert).unwrap();
        proptest::prop_assert_eq!(sense.is_active().unwrap(), assert);
    }

    /// Raw interrupt levels and sampled levels map identically.
    #[test]
    fn raw_level_matches_sampled_level(active_high: bool, high: bool) {
        let trace = Trace::new();
        let pin = MockPin::new("sense", high, trace);
        let mut sense = SenseLine::new(pin, level(active_high));

        let sampled = sense.is_active().unwrap();
        proptest::prop_assert_eq!(sense.level_is_active(high), sampled);
    }

    /// Repeated writes of the same state produce at most one edge.
    #[test]
    fn set_if_changed_emits_one_edge(assert: bool, repeats in 1usize..8) {
        let trace = Trace::new();
        let pin = MockPin::new("mute", false, trace.clone());
        let mut control = ControlLine::new(pin, ActiveLevel::High);

        for _ in 0..repeats {
            control.set_if_changed(assert).unwrap();
        }
        proptest::prop_assert_eq!(trace.pin_edges("mute").len(), 1);
    }
}
