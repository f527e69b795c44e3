use crate::catalog::{BridgeBaud, Parity};
use crate::error::ProfileError;
use crate::settings::{PROFILE_SCHEMA_VERSION, Profile, Timing};

#[test]
fn minimal_profile_uses_defaults() {
    let p = Profile::from_json_str(r#"{ "schema_version": 1 }"#).expect("parse");
    assert_eq!(p, Profile::default());
    assert_eq!(p.timing.connect_retry_ms, 5_000);
    assert_eq!(p.timing.step_interval_ms, 2_000);
    assert_eq!(p.bridge.initial_baud, BridgeBaud::B9600);
    assert_eq!(p.bridge.target_baud, BridgeBaud::B38400);
    assert_eq!(p.receiver.device_mask, 0x03);
}

#[test]
fn partial_sections_override_only_given_fields() {
    let p = Profile::from_json_str(
        r#"
{
    "schema_version": 1,
    "timing": { "bridge_switch_settle_ms": 8000, "done_polls": 0 },
    "bridge": { "target_baud": 57600, "parity": "E", "exit_command_mode": true },
    "receiver": { "port_id": 2 }
}
        "#,
    )
    .expect("parse");

    assert_eq!(p.timing.bridge_switch_settle_ms, 8_000);
    assert_eq!(p.timing.done_polls, 0);
    assert_eq!(p.timing.receiver_save_settle_ms, Timing::default().receiver_save_settle_ms);
    assert_eq!(p.bridge.target_baud, BridgeBaud::B57600);
    assert_eq!(p.bridge.initial_baud, BridgeBaud::B9600);
    assert_eq!(p.bridge.parity, Parity::Even);
    assert!(p.bridge.exit_command_mode);
    assert_eq!(p.receiver.port_id, 2);
    assert_eq!(p.receiver.save_mask, 0xFFFF);
}

#[test]
fn unknown_schema_version_is_rejected() {
    let err = Profile::from_json_str(r#"{ "schema_version": 9 }"#).expect_err("schema");
    assert!(matches!(
        err,
        ProfileError::UnsupportedSchema(9, PROFILE_SCHEMA_VERSION)
    ));
}

#[test]
fn unsupported_baud_is_a_json_error() {
    let err = Profile::from_json_str(r#"{ "schema_version": 1, "bridge": { "target_baud": 31337 } }"#)
        .expect_err("baud");
    assert!(matches!(err, ProfileError::Json(_)));
    assert!(err.to_string().contains("31337"));
}

#[test]
fn empty_masks_are_invalid() {
    let err = Profile::from_json_str(r#"{ "schema_version": 1, "receiver": { "device_mask": 0 } }"#)
        .expect_err("mask");
    assert!(matches!(err, ProfileError::Invalid(_)));
}

#[test]
fn profile_round_trips_through_json() {
    let p = Profile::default();
    let raw = serde_json::to_string(&p).expect("serialize");
    assert_eq!(Profile::from_json_str(&raw).expect("parse"), p);
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("qedcfg-rs-no-such-profile.json");
    let err = Profile::from_path(&path).expect_err("missing");
    assert!(matches!(err, ProfileError::Io(_)));
}
