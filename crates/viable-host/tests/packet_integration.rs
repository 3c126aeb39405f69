//! Integration tests for the host emulator.
//!
//! These build the device exactly as `main` does (config → `open_device` →
//! router → `serve`) against a store file in a temporary directory, then
//! check that what a client wrote is still there after the emulator is
//! reopened.

use std::path::Path;

use viable_core::{ManualClock, PacketRouter};
use viable_host::application::dump_state::StateSnapshot;
use viable_host::application::open_device::{open_device, OpenError};
use viable_host::application::serve_packets::serve;
use viable_host::infrastructure::legacy::ViaLegacy;
use viable_host::infrastructure::sinks::TracingActions;
use viable_host::infrastructure::storage::config::HostConfig;

fn config_in(dir: &Path) -> HostConfig {
    let mut config = HostConfig::default();
    config.storage.store_path = dir.join("viable.bin");
    config.viable.keyboard_uid = *b"HOSTTEST";
    config
}

/// Feeds `script` through a freshly opened device and returns the reply lines.
async fn run(config: &HostConfig, script: &str) -> Vec<String> {
    let clock = ManualClock::new(0x0003_0000);
    let viable = open_device(config).expect("device opens");
    let mut router = PacketRouter::new(viable, ViaLegacy, &clock);
    let mut actions = TracingActions::default();
    let mut output = Vec::new();

    serve(
        &mut router,
        &mut actions,
        script.as_bytes(),
        &mut output,
        config.host.packet_size,
    )
    .await
    .expect("serve succeeds");

    String::from_utf8(output)
        .expect("hex output is ascii")
        .lines()
        .map(str::to_owned)
        .collect()
}

#[tokio::test]
async fn test_combo_written_over_the_wire_survives_restart() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    let combo = "df 04 02 0d00 0e00 0000 0000 2900 2880";

    // Act
    let first = run(&config, combo).await;
    let second = run(&config, "df 03 02").await;

    // Assert
    assert!(first[0].starts_with("df0400"));
    assert!(second[0].starts_with("df03020d000e000000000029002880"));
}

#[tokio::test]
async fn test_get_info_reports_configured_uid() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());

    // Act
    let replies = run(&config, "df00\n").await;

    // Assert
    let bytes = hex::decode(&replies[0]).expect("reply is hex");
    assert_eq!(&bytes[11..19], b"HOSTTEST");
    assert_eq!(bytes[6], 16);
}

#[tokio::test]
async fn test_wrapped_bootstrap_then_viable_command() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    let clock = ManualClock::new(0x0005_0000);
    let viable = open_device(&config).expect("device opens");
    let mut router = PacketRouter::new(viable, ViaLegacy, &clock);
    let mut actions = TracingActions::default();

    let mut bootstrap = Vec::new();
    serve(&mut router, &mut actions, &b"dd00000000\n"[..], &mut bootstrap, 32)
        .await
        .expect("serve");
    let reply = hex::decode(String::from_utf8(bootstrap).unwrap().trim()).unwrap();
    let id = &reply[25..29];

    // Act
    let request = format!("dd{}df00\n", hex::encode(id));
    let mut output = Vec::new();
    serve(&mut router, &mut actions, request.as_bytes(), &mut output, 32)
        .await
        .expect("serve");

    // Assert
    let reply = hex::decode(String::from_utf8(output).unwrap().trim()).unwrap();
    assert_eq!(&reply[1..5], id);
    assert_eq!(&reply[5..7], &[0xDF, 0x00]);
    assert_eq!(&reply[7..11], &1u32.to_le_bytes());
}

#[tokio::test]
async fn test_settings_change_is_visible_in_dump_after_reopen() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());

    // Act: QSID 7 (tapping term) = 0x00FA
    let replies = run(&config, "df 12 0700 fa00").await;
    let viable = open_device(&config).expect("reopen");
    let snapshot = StateSnapshot::capture(&viable).expect("snapshot");

    // Assert
    assert!(replies[0].starts_with("df1200"));
    assert_eq!(snapshot.settings.tapping_term, 250);
    assert_eq!(snapshot.keyboard_uid, hex::encode(b"HOSTTEST"));
}

#[test]
fn test_missing_definition_file_is_an_open_error() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path());
    config.storage.definition_path = Some(dir.path().join("absent.def"));

    // Act
    let result = open_device(&config);

    // Assert
    assert!(matches!(result, Err(OpenError::Definition { .. })));
}

#[tokio::test]
async fn test_definition_file_is_served_in_chunks() {
    // Arrange
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path());
    let def_path = dir.path().join("kb.def");
    std::fs::write(&def_path, (0u8..50).collect::<Vec<u8>>()).expect("write def");
    config.storage.definition_path = Some(def_path);

    // Act
    let replies = run(&config, "df0d\ndf0e 1c00\n").await;

    // Assert
    let size = hex::decode(&replies[0]).unwrap();
    assert_eq!(&size[2..6], &50u32.to_le_bytes());
    let chunk = hex::decode(&replies[1]).unwrap();
    assert_eq!(&chunk[2..4], &[0x1C, 0x00]);
    assert_eq!(&chunk[4..26], &(28u8..50).collect::<Vec<u8>>()[..]);
    assert!(chunk[26..].iter().all(|&b| b == 0));
}
