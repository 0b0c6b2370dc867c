//! Protocol records persisted through the file store.

use chargelink::messages::v16::{
    BootNotificationResponse, ChargePointErrorCode, ChargePointStatus, RegistrationStatus,
    StatusNotificationRequest,
};
use chargelink::storage::{DocumentStore, FsDocumentStore};
use chargelink::types::DateTime;

fn status(connector: i32, status: ChargePointStatus) -> StatusNotificationRequest {
    StatusNotificationRequest {
        connector_id: connector,
        error_code: ChargePointErrorCode::NoError,
        status,
        timestamp: Some(DateTime::parse("2024-03-01T10:00:00Z")),
        ..StatusNotificationRequest::default()
    }
}

#[test]
fn registration_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let boot = BootNotificationResponse {
        status: RegistrationStatus::Pending,
        current_time: DateTime::parse("2024-03-01T09:59:58+01:00"),
        interval: 300,
    };
    FsDocumentStore::open(dir.path())
        .unwrap()
        .save("registration.jsn", &boot)
        .unwrap();

    let reopened = FsDocumentStore::open(dir.path()).unwrap();
    let loaded: BootNotificationResponse = reopened.load("registration.jsn").unwrap().unwrap();
    assert_eq!(loaded, boot);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("registration.jsn")).unwrap(),
        r#"{"status":"Pending","currentTime":"2024-03-01T08:59:58Z","interval":300}"#
    );
}

#[test]
fn offline_queue_keeps_append_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsDocumentStore::open(dir.path().join("queue")).unwrap();
    store
        .append_line("status.log", &status(1, ChargePointStatus::Preparing))
        .unwrap();
    store
        .append_line("status.log", &status(1, ChargePointStatus::Charging))
        .unwrap();
    store
        .append_line("status.log", &status(2, ChargePointStatus::Faulted))
        .unwrap();

    let queued: Vec<StatusNotificationRequest> = store.read_lines("status.log").unwrap();
    let summary: Vec<(i32, ChargePointStatus)> =
        queued.iter().map(|s| (s.connector_id, s.status)).collect();
    assert_eq!(
        summary,
        vec![
            (1, ChargePointStatus::Preparing),
            (1, ChargePointStatus::Charging),
            (2, ChargePointStatus::Faulted),
        ]
    );

    assert!(store.remove("status.log").unwrap());
    assert!(store.read_lines::<StatusNotificationRequest>("status.log").unwrap().is_empty());
}

#[test]
fn missing_required_field_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsDocumentStore::open(dir.path()).unwrap();
    std::fs::write(dir.path().join("boot.jsn"), br#"{"status":"Accepted"}"#).unwrap();
    let err = store.load::<BootNotificationResponse>("boot.jsn").unwrap_err();
    let text = format!("{err:#}");
    assert!(text.contains("boot.jsn"), "{text}");
    assert!(text.contains("currentTime"), "{text}");
}
