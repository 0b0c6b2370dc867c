//! Envelope parsing and writing through the stream adapters.

use chargelink::messages::v16::{BootNotificationRequest, HeartbeatRequest};
use chargelink::rpc::envelope::{self, CallError, ErrorCode, Message};
use chargelink::rpc::stream::{BufferedReader, BufferedWriter, SizeCalculator, StringReader};
use chargelink::types::CiString20;
use std::io::Write;

use crate::mock_transport::MockTransport;

#[test]
fn heartbeat_envelope_round_trip() {
    let raw = br#"[2,"123","Heartbeat",{}]"#;
    let msg = Message::parse(raw).unwrap();
    assert_eq!(msg.message_type(), envelope::CALL);
    assert_eq!(msg.unique_id(), "123");

    let mut out = Vec::new();
    msg.write_to(&mut out).unwrap();
    assert_eq!(out, raw);

    let mut typed = Vec::new();
    envelope::write_call(&mut typed, "123", "Heartbeat", &HeartbeatRequest {}).unwrap();
    assert_eq!(typed, raw);
}

#[test]
fn call_read_from_buffered_transport() {
    let mut mock = MockTransport::new();
    mock.max_read = 5;
    mock.push_inbound(br#"[2,"a-1","BootNotification",{"chargePointVendor":"V","chargePointModel":"M"}]"#);

    let msg = Message::read_from(BufferedReader::new(&mut mock)).unwrap();
    let Message::Call { action, payload, .. } = msg else {
        panic!("expected Call");
    };
    assert_eq!(action, "BootNotification");
    let req: BootNotificationRequest = chargelink::codec::decode_record(&payload).unwrap();
    assert_eq!(req.charge_point_vendor, "V");
}

#[test]
fn frame_split_across_deliveries_is_not_lost() {
    let mut mock = MockTransport::new();
    mock.push_inbound(br#"[3,"1",{"curr"#);
    let mut reader = BufferedReader::new(&mut mock);

    // Nothing more pending: the half frame is held, not parsed.
    assert_eq!(reader.next_frame().unwrap(), None);
    assert!(reader.partial_frame() > 0);

    reader.transport_mut().push_inbound(br#"entTime":null}]"#);
    let frame = reader.next_frame().unwrap().unwrap();
    let msg = Message::parse(&frame).unwrap();
    let Message::CallResult { unique_id, payload } = msg else {
        panic!("expected CallResult");
    };
    assert_eq!(unique_id.as_str(), "1");
    assert_eq!(payload, serde_json::json!({"currentTime": null}));
    assert_eq!(reader.next_frame().unwrap(), None);
}

#[test]
fn empty_transport_read_is_would_block_for_blocking_parsers() {
    let mut mock = MockTransport::new();
    mock.push_inbound(br#"[3,"1",{"curr"#);
    let mut reader = BufferedReader::new(&mut mock);
    let mut half = Vec::new();
    let err = std::io::Read::read_to_end(&mut reader, &mut half).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::WouldBlock);
    assert_eq!(half, br#"[3,"1",{"curr"#);
}

#[test]
fn string_reader_feeds_parser() {
    let msg = Message::read_from(StringReader::new(r#"[3,"77",{"currentTime":null}]"#)).unwrap();
    assert!(matches!(msg, Message::CallResult { .. }));
}

#[test]
fn call_error_is_written_through_buffered_writer() {
    let mut mock = MockTransport::new();
    {
        let mut w = BufferedWriter::new(&mut mock);
        let err = CallError::new(ErrorCode::GenericError, "boom")
            .with_details(serde_json::json!({"code": 7}));
        envelope::write_call_error(&mut w, "e1", &err).unwrap();
        w.flush().unwrap();
    }
    assert_eq!(mock.outbound_text(), r#"[4,"e1","GenericError","boom",{"code":7}]"#);
    assert_eq!(mock.flushes, 1);
}

#[test]
fn size_calculator_matches_encoded_length() {
    let req = BootNotificationRequest {
        charge_point_vendor: CiString20::from_static("Vendor \"Q\"").unwrap(),
        charge_point_model: CiString20::from_static("Model-ü").unwrap(),
        ..BootNotificationRequest::default()
    };
    let mut calc = SizeCalculator::new();
    envelope::write_call(&mut calc, "42", "BootNotification", &req).unwrap();
    let mut buf = Vec::new();
    envelope::write_call(&mut buf, "42", "BootNotification", &req).unwrap();
    assert_eq!(calc.size(), buf.len());
}

#[test]
fn garbage_is_rejected_without_panic() {
    for raw in [&b"\xff\xfe"[..], b"[2", b"null", b"[2,\"x\",\"A\",{}, 5]x"] {
        assert!(Message::parse(raw).is_err());
    }
}
