//! Generic codec engine exercised through the message catalogue.

use chargelink::codec::{JsonWriter, WireValue, decode_record, encode_record, to_vec};
use chargelink::error::{DecodeError, FieldFault, StringError};
use chargelink::messages::v16::{
    ChargePointErrorCode, ChargePointStatus, HeartbeatResponse, StatusNotificationRequest,
};
use chargelink::messages::v201::{
    Component, NotifyReportRequest, ReportData, SetVariablesResponse, Variable,
};
use chargelink::types::{BoundedString, CiString50, DateTime, OmitEmpty, Sequence};

fn encode<R: chargelink::codec::Record>(r: &R) -> String {
    String::from_utf8(to_vec(r).unwrap()).unwrap()
}

#[test]
fn bounded_string_five_and_six_bytes() {
    let mut s = BoundedString::<5>::default();
    assert!(s.decode_json(&serde_json::json!("12345")).is_ok());
    assert_eq!(s, "12345");
    assert_eq!(
        s.decode_json(&serde_json::json!("123456")),
        Err(DecodeError::Fault(FieldFault::String(StringError::TooLong {
            max: 5,
            len: 6
        })))
    );
}

#[test]
fn sequence_emptiness_policies() {
    // Always-emit: empty list still written, missing key is an error.
    assert_eq!(
        encode(&SetVariablesResponse::default()),
        r#"{"setVariableResult":[]}"#
    );
    assert_eq!(
        decode_record::<SetVariablesResponse>(&serde_json::json!({})),
        Err(DecodeError::MissingField("setVariableResult"))
    );

    // Omit-when-empty: key dropped, missing key decodes as empty.
    let report: NotifyReportRequest = decode_record(&serde_json::json!({
        "requestId": 1, "generatedAt": "2024-01-01T00:00:00Z", "seqNo": 0
    }))
    .unwrap();
    assert!(report.report_data.is_empty());
    assert!(!encode(&report).contains("reportData"));

    let mut filled = report.clone();
    filled.report_data.push(ReportData {
        component: Component {
            name: CiString50::from_static("Connector").unwrap(),
            ..Component::default()
        },
        variable: Variable {
            name: CiString50::from_static("Available").unwrap(),
            instance: None,
        },
        ..ReportData::default()
    });
    let text = encode(&filled);
    assert!(
        text.contains(r#""reportData":[{"component":{"name":"Connector"},"variable":{"name":"Available"},"variableAttribute":[]}]"#),
        "{text}"
    );
}

#[test]
fn unset_datetime_is_written_as_null() {
    assert_eq!(encode(&HeartbeatResponse::default()), r#"{"currentTime":null}"#);
    let back: HeartbeatResponse =
        decode_record(&serde_json::json!({"currentTime": null})).unwrap();
    assert!(!back.current_time.is_set());
}

#[test]
fn invalid_datetime_text_is_kept_and_reemitted() {
    let resp: HeartbeatResponse =
        decode_record(&serde_json::json!({"currentTime": "2024-13-01T00:00:00Z"})).unwrap();
    assert!(!resp.current_time.is_valid());
    assert_eq!(encode(&resp), r#"{"currentTime":"2024-13-01T00:00:00Z"}"#);
}

#[test]
fn datetime_is_normalised_to_utc_seconds() {
    let resp: HeartbeatResponse = decode_record(&serde_json::json!({
        "currentTime": "2022-10-17T14:37:09.123+03:00"
    }))
    .unwrap();
    assert_eq!(encode(&resp), r#"{"currentTime":"2022-10-17T11:37:09Z"}"#);
    assert_eq!(resp.current_time, DateTime::parse("2022-10-17T11:37:09.123Z"));
}

#[test]
fn unknown_enum_value_decodes_to_sentinel() {
    let req: StatusNotificationRequest = decode_record(&serde_json::json!({
        "connectorId": 2,
        "errorCode": "TotallyUnknownValue",
        "status": "Charging"
    }))
    .unwrap();
    assert_eq!(req.error_code, ChargePointErrorCode::Unrecognized);
    assert_eq!(req.status, ChargePointStatus::Charging);
}

#[test]
fn wrong_types_name_the_field() {
    let err = decode_record::<StatusNotificationRequest>(&serde_json::json!({
        "connectorId": "2",
        "errorCode": "NoError",
        "status": "Charging"
    }))
    .unwrap_err();
    assert_eq!(
        err,
        DecodeError::InvalidField {
            field: "connectorId",
            fault: FieldFault::TypeMismatch("integer")
        }
    );
}

#[test]
fn standalone_sequence_encoding() {
    let seq: OmitEmpty<i32> = Sequence::from(vec![3, 1, 2]);
    let mut buf = Vec::new();
    seq.write_json(&mut JsonWriter::new(&mut buf)).unwrap();
    assert_eq!(buf, b"[3,1,2]");
}

#[test]
fn encode_into_any_writer() {
    let req = StatusNotificationRequest {
        connector_id: 0,
        error_code: ChargePointErrorCode::NoError,
        status: ChargePointStatus::Available,
        timestamp: Some(DateTime::from_millis(86_400_000)),
        ..StatusNotificationRequest::default()
    };
    let mut buf = Vec::new();
    encode_record(&req, &mut JsonWriter::new(&mut buf)).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        r#"{"connectorId":0,"errorCode":"NoError","status":"Available","timestamp":"1970-01-02T00:00:00Z"}"#
    );
}
