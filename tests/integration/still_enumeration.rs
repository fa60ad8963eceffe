//! Media pool listing tests against the mock bridge.

use atem::bridge::StillInfo;
use atem::bridge::mock::{BridgeCall, MockBridge, MockBridgeBuilder, Operation};
use atem::error::AtemError;
use atem::switcher::Switcher;

use crate::common::init_test_logging;

const HASH_A: &str = "0123456789abcdef0123456789abcdef";
const HASH_B: &str = "fedcba9876543210fedcba9876543210";

#[test]
fn lists_stills_as_csv_lines() {
    init_test_logging();
    let mock = MockBridgeBuilder::new()
        .still(1, 1, "Logo", HASH_A)
        .still(2, 0, "Lower Third", HASH_B)
        .build();

    let stills = Switcher::scoped(&mock, "10.0.0.1", Switcher::stills).unwrap();
    let lines: Vec<String> = stills.iter().map(|still| still.to_csv()).collect();

    assert_eq!(
        lines,
        vec![
            format!("1,\"Logo\",\"{HASH_A}\",1"),
            format!("2,\"Lower Third\",\"{HASH_B}\",0"),
        ]
    );
}

#[test]
fn probes_count_before_fetching() {
    init_test_logging();
    let mock = MockBridgeBuilder::new()
        .still(1, 0, "A", HASH_A)
        .still(2, 0, "B", HASH_B)
        .still(3, 2, "C", HASH_A)
        .build();

    let stills = Switcher::scoped(&mock, "10.0.0.1", Switcher::stills).unwrap();
    assert_eq!(stills.len(), 3);
    assert_eq!(stills[2].media_player(), 2);

    let stills_calls: Vec<Operation> = mock
        .operations()
        .into_iter()
        .filter(|op| matches!(op, Operation::Stills { .. }))
        .collect();
    assert_eq!(
        stills_calls,
        vec![
            Operation::Stills { capacity: 0 },
            Operation::Stills { capacity: 3 },
        ]
    );
}

#[test]
fn empty_pool_still_issues_fetch() {
    init_test_logging();
    let mock = MockBridge::hd();
    let stills = Switcher::scoped(&mock, "10.0.0.1", Switcher::stills).unwrap();
    assert!(stills.is_empty());

    let stills_calls: Vec<Operation> = mock
        .operations()
        .into_iter()
        .filter(|op| matches!(op, Operation::Stills { .. }))
        .collect();
    assert_eq!(
        stills_calls,
        vec![
            Operation::Stills { capacity: 0 },
            Operation::Stills { capacity: 0 },
        ]
    );
}

#[test]
fn empty_pool_fetch_failure_is_reported() {
    init_test_logging();
    let mock = MockBridge::hd();
    mock.fail_next(BridgeCall::StillsFetch, 3, Some("media pool not ready"));

    let err = Switcher::scoped(&mock, "10.0.0.1", Switcher::stills).unwrap_err();
    assert!(matches!(err, AtemError::Query(_)));
    assert_eq!(err.to_string(), "media pool not ready");
    assert_eq!(mock.open_connections(), 0);
}

#[test]
fn probe_failure_uses_count_fallback() {
    init_test_logging();
    let mock = MockBridge::hd();
    mock.fail_next(BridgeCall::StillsProbe, 2, None);

    let err = Switcher::scoped(&mock, "10.0.0.1", Switcher::stills).unwrap_err();
    assert!(matches!(err, AtemError::Query(_)));
    assert_eq!(err.to_string(), "Unable to get still count");
    assert_eq!(mock.open_connections(), 0);
}

#[test]
fn fetch_failure_reports_bridge_text() {
    init_test_logging();
    let mock = MockBridgeBuilder::new().still(1, 0, "A", HASH_A).build();
    mock.fail_next(BridgeCall::StillsFetch, 2, Some("media pool lock lost"));

    let err = Switcher::scoped(&mock, "10.0.0.1", Switcher::stills).unwrap_err();
    assert_eq!(err.to_string(), "media pool lock lost");
}

#[test]
fn long_names_are_truncated_to_record_width() {
    init_test_logging();
    let long_name = "x".repeat(300);
    let mock = MockBridge::hd();
    mock.set_stills(vec![StillInfo::new(1, 0, &long_name, HASH_A)]);

    let stills = Switcher::scoped(&mock, "10.0.0.1", Switcher::stills).unwrap();
    assert_eq!(stills[0].name().len(), 127);
    assert_eq!(stills[0].hash(), HASH_A);
}

#[test]
fn stills_serialize_for_json_output() {
    init_test_logging();
    let mock = MockBridgeBuilder::new().still(4, 1, "Bug", HASH_B).build();
    let stills = Switcher::scoped(&mock, "10.0.0.1", Switcher::stills).unwrap();

    let json = serde_json::to_value(&stills).unwrap();
    assert_eq!(json[0]["slot"], 4);
    assert_eq!(json[0]["name"], "Bug");
    assert_eq!(json[0]["hash"], HASH_B);
    assert_eq!(json[0]["media_player"], 1);
}
