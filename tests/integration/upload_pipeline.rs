//! End-to-end still upload tests against the mock bridge.

use atem::bridge::mock::{BridgeCall, MockBridge, MockBridgeBuilder, Operation};
use atem::error::AtemError;
use atem::switcher::Switcher;
use atem::upload::{Upload, UploadStatus};

use crate::common::fixtures::TestStills;
use crate::common::init_test_logging;

#[test]
fn uploaded_still_appears_in_listing() {
    init_test_logging();
    let stills = TestStills::new();
    let logo = stills.solid("station-logo.png", 1280, 720, [200, 100, 50, 255]);
    let mock = MockBridge::hd720();

    let listing = Switcher::scoped(&mock, "10.0.0.1", |switcher| {
        let mut upload = Upload::new(switcher, &logo, 4)?;
        upload.start()?;
        assert_eq!(upload.status(), UploadStatus::Completed);
        switcher.stills()
    })
    .unwrap();

    // Zero-based slot 4 is listed as slot 5.
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].slot(), 5);
    assert_eq!(listing[0].name(), "station-logo");
    assert_eq!(mock.open_count(), 1);
    assert_eq!(mock.open_connections(), 0);
}

#[test]
fn pixels_reach_bridge_in_bgra_row_order() {
    init_test_logging();
    let stills = TestStills::new();
    let path = stills.coordinates("grid.png", 6, 4);
    let mock = MockBridgeBuilder::new().dimensions(6, 4).build();

    Switcher::scoped(&mock, "10.0.0.1", |switcher| {
        Upload::new(switcher, &path, 0)?.start()
    })
    .unwrap();

    let bytes = mock.last_upload().unwrap();
    assert_eq!(bytes.len(), 6 * 4 * 4);
    for y in 0..4_usize {
        for x in 0..6_usize {
            let offset = (y * 6 + x) * 4;
            #[allow(clippy::cast_possible_truncation)]
            let expected = [(x ^ y) as u8, y as u8, x as u8, 255];
            assert_eq!(&bytes[offset..offset + 4], &expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn bmp_input_is_accepted() {
    init_test_logging();
    let stills = TestStills::new();
    let path = stills.solid("slate.bmp", 8, 8, [0, 0, 255, 255]);
    let mock = MockBridgeBuilder::new().dimensions(8, 8).build();

    Switcher::scoped(&mock, "10.0.0.1", |switcher| {
        Upload::new(switcher, &path, 1)?.start()
    })
    .unwrap();

    mock.assert_contains(&Operation::Upload {
        slot: 1,
        name: "slate".to_string(),
        byte_len: 8 * 8 * 4,
        width: 8,
        height: 8,
    });
    assert_eq!(&mock.last_upload().unwrap()[..4], &[255, 0, 0, 255]);
}

#[test]
fn mismatched_resolution_never_reaches_bridge() {
    init_test_logging();
    let stills = TestStills::new();
    let path = stills.solid("wrong.png", 1920, 1080, [0, 0, 0, 255]);
    let mock = MockBridge::hd720();

    let err = Switcher::scoped(&mock, "10.0.0.1", |switcher| {
        Upload::new(switcher, &path, 0)?.start()
    })
    .unwrap_err();

    assert!(matches!(err, AtemError::Validation(_)));
    assert!(
        err.to_string()
            .starts_with("Image is 1920x1080 it needs to be the same resolution as the switcher")
    );
    assert_eq!(mock.upload_count(), 0);
    assert_eq!(mock.open_connections(), 0);
}

#[test]
fn missing_file_never_connects() {
    init_test_logging();
    let stills = TestStills::new();
    let path = stills.missing("absent.png");
    let mock = MockBridge::hd();

    let err = Switcher::scoped(&mock, "10.0.0.1", |switcher| {
        Upload::new(switcher, &path, 0).map(|_| ())
    })
    .unwrap_err();

    assert_eq!(err.to_string(), format!("{} does not exist", path.display()));
    assert_eq!(mock.open_count(), 0);
}

#[test]
fn connection_failure_surfaces_at_construction() {
    init_test_logging();
    let stills = TestStills::new();
    let path = stills.solid("logo.png", 1920, 1080, [0, 0, 0, 255]);
    let mock = MockBridge::hd();
    mock.fail_next(BridgeCall::Open, 1, Some("connection refused"));

    let err = Switcher::scoped(&mock, "10.0.0.1", |switcher| {
        Upload::new(switcher, &path, 0).map(|_| ())
    })
    .unwrap_err();

    assert!(matches!(err, AtemError::Connection { .. }));
    assert_eq!(err.to_string(), "connection refused");
    assert_eq!(mock.upload_count(), 0);
}

#[test]
fn retry_needs_a_new_upload() {
    init_test_logging();
    let stills = TestStills::new();
    let path = stills.solid("logo.png", 16, 9, [1, 2, 3, 4]);
    let mock = MockBridgeBuilder::new().dimensions(16, 9).build();
    mock.fail_next(BridgeCall::Upload, 7, Some("media pool full"));

    Switcher::scoped(&mock, "10.0.0.1", |switcher| {
        let mut first = Upload::new(&mut *switcher, &path, 2)?;
        assert!(matches!(first.start(), Err(AtemError::Upload(ref m)) if m == "media pool full"));
        assert!(first.in_progress());
        first.start()?;
        assert_eq!(first.status(), UploadStatus::Started);

        let mut second = Upload::new(switcher, &path, 2)?;
        second.start()?;
        assert_eq!(second.progress(), 100);
        Ok(())
    })
    .unwrap();

    assert_eq!(mock.upload_count(), 2);
    assert_eq!(mock.open_count(), 1);
}
