//! Building buses from configuration files.

#![allow(clippy::unwrap_used)]

use latch_events::{BusConfig, ConfigError, EventBus, Handle};
use latch_test::{Recorder, test_file};

#[test]
fn test_bus_from_config_file() {
    let file = test_file(
        r#"
        name = "overlay"
        preregistered_types = ["authorize"]
        log_payloads = true
        "#,
    );

    let config = BusConfig::load(file.path()).unwrap();
    let bus = EventBus::with_config(config);

    assert_eq!(bus.name(), "overlay");
    assert!(bus.config().log_payloads);
    assert_eq!(bus.listener_count("authorize"), 0);

    let recorder = Recorder::new();
    let handle = bus.on("authorize", recorder.callback("a"), false).unwrap();
    assert_eq!(handle, Handle::from_raw(1));

    bus.emit("authorize", &"token", false).unwrap();
    assert_eq!(recorder.count(), 1);
}

#[test]
fn test_invalid_config_file() {
    let file = test_file("preregistered_types = [\"a\", \"a\"]");
    let err = BusConfig::load(file.path()).unwrap_err();

    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

#[test]
fn test_malformed_config_file_reports_path() {
    let file = test_file("name = ");
    let err = BusConfig::load(file.path()).unwrap_err();

    match err {
        ConfigError::ParseError { path, .. } => {
            assert_eq!(path, file.path().display().to_string());
        },
        other => panic!("unexpected error: {other}"),
    }
}
