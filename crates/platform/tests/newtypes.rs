#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Type system enforcement tests for the shared driver newtypes.
//! These newtypes keep board-description values from being mixed up.

// ── I2cAddr ──────────────────────────────────────────────────────────────────

#[test]
fn i2c_addr_accepts_codec_address() {
    use platform::audio_types::I2cAddr;
    let addr = I2cAddr::new(0x34).unwrap();
    assert_eq!(addr, I2cAddr::TAS3001C);
}

#[test]
fn i2c_addr_rejects_general_call_block() {
    use platform::audio_types::I2cAddr;
    for raw in 0x00..0x08 {
        assert!(I2cAddr::new(raw).is_err(), "0x{raw:02X} is reserved");
    }
}

#[test]
fn i2c_addr_rejects_ten_bit_prefix_block() {
    use platform::audio_types::I2cAddr;
    for raw in 0x78..=0x7F {
        assert!(I2cAddr::new(raw).is_err(), "0x{raw:02X} is reserved");
    }
}

#[test]
fn i2c_addr_from_property_table_form() {
    use platform::audio_types::I2cAddr;
    // Board properties carry the 8-bit write address.
    assert_eq!(I2cAddr::from_8bit(0x6A).unwrap().get(), 0x35);
}

// ── LayoutId ─────────────────────────────────────────────────────────────────

#[test]
fn layout_id_round_trips_raw_value() {
    use platform::audio_types::LayoutId;
    assert_eq!(LayoutId::new(14), LayoutId::TANGENT);
    assert_eq!(LayoutId::MERCURY.get(), 13);
}

#[test]
fn layout_id_orders_by_raw_value() {
    use platform::audio_types::LayoutId;
    assert!(LayoutId::SAWTOOTH < LayoutId::PISMO);
}

// ── SpeakerId ────────────────────────────────────────────────────────────────

#[test]
fn speaker_id_zero_is_wildcard() {
    use platform::audio_types::SpeakerId;
    assert_eq!(SpeakerId::new(0), SpeakerId::ANY);
    assert!(!SpeakerId::new(9).is_any());
}
