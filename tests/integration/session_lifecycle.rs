//! Session lifecycle tests against the mock bridge.

use atem::bridge::mock::{BridgeCall, MockBridge, MockBridgeBuilder, Operation};
use atem::error::AtemError;
use atem::switcher::Switcher;

use crate::common::init_test_logging;

#[test]
fn queries_share_one_connection() {
    init_test_logging();
    let mock = MockBridge::hd();
    let mut switcher = Switcher::new(&mock, "192.168.10.240");

    assert_eq!(switcher.product_name().unwrap(), "ATEM Television Studio HD");
    assert_eq!(switcher.video_dimensions().unwrap(), (1920, 1080));
    assert_eq!(switcher.video_width().unwrap(), 1920);
    assert_eq!(switcher.video_height().unwrap(), 1080);
    switcher.close();

    assert_eq!(mock.open_count(), 1);
    assert_eq!(mock.close_count(), 1);
    assert_eq!(mock.open_connections(), 0);
}

#[test]
fn scoped_session_records_full_exchange() {
    init_test_logging();
    let mock = MockBridgeBuilder::new()
        .product_name("ATEM Constellation 8K")
        .video_mode(27)
        .dimensions(3840, 2160)
        .build();

    let (name, mode) = Switcher::scoped(&mock, "atem.studio", |switcher| {
        Ok((switcher.product_name()?, switcher.video_mode()?))
    })
    .unwrap();

    assert_eq!(name, "ATEM Constellation 8K");
    assert_eq!(mode, 27);
    mock.assert_operations(&[
        Operation::Open {
            address: "atem.studio".to_string(),
        },
        Operation::ProductName,
        Operation::VideoMode,
        Operation::Close { handle: 1 },
    ]);
}

#[test]
fn connection_failure_carries_bridge_text() {
    init_test_logging();
    let mock = MockBridge::hd();
    mock.fail_next(BridgeCall::Open, 1, Some("No response from 10.0.0.99"));
    let mut switcher = Switcher::new(&mock, "10.0.0.99");

    let err = switcher.product_name().unwrap_err();
    match err {
        AtemError::Connection { message, fail_reason } => {
            assert_eq!(message, "No response from 10.0.0.99");
            assert_eq!(fail_reason, 1);
        }
        other => panic!("expected connection error, got {other:?}"),
    }
    assert!(!switcher.is_connected());
    assert_eq!(mock.count(|op| matches!(op, Operation::ProductName)), 0);
}

#[test]
fn failed_connection_can_be_retried() {
    init_test_logging();
    let mock = MockBridge::hd720();
    mock.fail_next(BridgeCall::Open, 1, None);
    let mut switcher = Switcher::new(&mock, "10.0.0.1");

    assert_eq!(
        switcher.connect().unwrap_err().to_string(),
        "Unable to connect to switcher"
    );
    switcher.connect().unwrap();
    assert!(switcher.is_connected());
    assert_eq!(switcher.video_dimensions().unwrap(), (1280, 720));
    switcher.close();
}

#[test]
fn query_failure_keeps_session_usable() {
    init_test_logging();
    let mock = MockBridge::hd();
    mock.fail_next(BridgeCall::VideoDimensions, 5, Some("switcher busy"));

    Switcher::scoped(&mock, "10.0.0.1", |switcher| {
        let err = switcher.video_dimensions().unwrap_err();
        assert!(matches!(err, AtemError::Query(ref m) if m == "switcher busy"));
        assert_eq!(switcher.video_dimensions()?, (1920, 1080));
        Ok(())
    })
    .unwrap();

    assert_eq!(mock.open_count(), 1);
    assert_eq!(mock.open_connections(), 0);
}

#[test]
fn dropped_session_releases_connection() {
    init_test_logging();
    let mock = MockBridge::hd();
    {
        let mut switcher = Switcher::new(&mock, "10.0.0.1");
        switcher.connect().unwrap();
        assert_eq!(mock.open_connections(), 1);
    }
    assert_eq!(mock.open_connections(), 0);
    assert_eq!(mock.close_count(), 1);
}

#[test]
fn separate_sessions_get_separate_handles() {
    init_test_logging();
    let mock = MockBridge::hd();
    let mut first = Switcher::new(&mock, "10.0.0.1");
    let mut second = Switcher::new(&mock, "10.0.0.1");
    first.connect().unwrap();
    second.connect().unwrap();
    assert_eq!(mock.open_connections(), 2);

    first.close();
    assert_eq!(second.product_name().unwrap(), "ATEM Television Studio HD");
    second.close();

    mock.assert_contains(&Operation::Close { handle: 1 });
    mock.assert_contains(&Operation::Close { handle: 2 });
}
