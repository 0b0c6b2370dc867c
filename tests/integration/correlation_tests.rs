//! Request/response correlation across the full send → receive path.

use chargelink::config::RpcConfig;
use chargelink::error::RpcError;
use chargelink::messages::v16::{
    AuthorizationStatus, AuthorizeRequest, BootNotificationRequest, HeartbeatRequest,
    RegistrationStatus,
};
use chargelink::rpc::stream::{BufferedWriter, StringWriter};
use chargelink::rpc::{ErrorCode, Message, Resolution, RpcClient};
use chargelink::types::CiString20;
use futures_lite::future::block_on;

use crate::mock_transport::MockTransport;

fn client() -> RpcClient {
    RpcClient::new(&RpcConfig::default())
}

fn boot() -> BootNotificationRequest {
    BootNotificationRequest {
        charge_point_vendor: CiString20::from_static("Chargelink").unwrap(),
        charge_point_model: CiString20::from_static("CL-22").unwrap(),
        ..BootNotificationRequest::default()
    }
}

fn reply(text: &str) -> Message {
    Message::parse(text.as_bytes()).unwrap()
}

#[test]
fn responses_in_reverse_order_reach_their_requests() {
    let c = client();
    let mut out = StringWriter::new();
    let boot_h = c.send_request(&boot(), 0, &mut out).unwrap();
    let auth_h = c
        .send_request(
            &AuthorizeRequest {
                id_tag: CiString20::new("TAG-1").unwrap(),
            },
            0,
            &mut out,
        )
        .unwrap();

    let auth_reply = format!(
        r#"[3,"{}",{{"idTagInfo":{{"status":"Blocked"}}}}]"#,
        auth_h.unique_id()
    );
    let boot_reply = format!(
        r#"[3,"{}",{{"status":"Accepted","currentTime":"2024-01-01T00:00:00Z","interval":60}}]"#,
        boot_h.unique_id()
    );
    assert_eq!(c.handle_message(&reply(&auth_reply)), Resolution::Resolved);
    assert!(!boot_h.is_ready());
    assert_eq!(c.handle_message(&reply(&boot_reply)), Resolution::Resolved);

    let auth = auth_h.try_take().unwrap().unwrap();
    assert_eq!(auth.id_tag_info.status, AuthorizationStatus::Blocked);
    let boot = boot_h.try_take().unwrap().unwrap();
    assert_eq!(boot.status, RegistrationStatus::Accepted);
    assert_eq!(boot.interval, 60);
    assert_eq!(c.pending_count(), 0);
}

#[test]
fn timeout_fires_once_and_late_result_is_discarded() {
    let c = client();
    let h = c
        .send_request_with_timeout(&HeartbeatRequest {}, 1_000, 5_000, &mut StringWriter::new())
        .unwrap();
    let id = h.unique_id().to_owned();

    assert_eq!(c.expire(5_999), 0);
    assert_eq!(c.expire(6_000), 1);
    assert_eq!(h.try_take(), Some(Err(RpcError::Timeout)));

    let late = format!(r#"[3,"{id}",{{"currentTime":"2024-01-01T00:00:00Z"}}]"#);
    assert_eq!(c.handle_message(&reply(&late)), Resolution::Unmatched);
    assert_eq!(c.expire(u64::MAX), 0);
    assert_eq!(h.try_take(), None);
}

#[test]
fn call_error_reaches_the_caller() {
    let c = client();
    let h = c
        .send_request(&HeartbeatRequest {}, 0, &mut StringWriter::new())
        .unwrap();
    let err = format!(
        r#"[4,"{}","NotSupported","no heartbeat here",{{"hint":1}}]"#,
        h.unique_id()
    );
    c.handle_message(&reply(&err));
    match h.try_take() {
        Some(Err(RpcError::CallError(e))) => {
            assert_eq!(e.code, ErrorCode::NotSupported);
            assert_eq!(e.description, "no heartbeat here");
            assert_eq!(e.details, serde_json::json!({"hint": 1}));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn wait_completes_from_another_thread() {
    let c = client();
    let h = c
        .send_request(&HeartbeatRequest {}, 0, &mut StringWriter::new())
        .unwrap();
    let result = format!(
        r#"[3,"{}",{{"currentTime":"2030-06-01T12:00:00+02:00"}}]"#,
        h.unique_id()
    );

    std::thread::scope(|s| {
        s.spawn(|| c.handle_message(&reply(&result)));
        let resp = block_on(h.wait()).unwrap();
        assert_eq!(
            resp.current_time.to_text().unwrap().as_str(),
            "2030-06-01T10:00:00Z"
        );
    });
}

#[test]
fn write_failure_leaves_no_pending_entry() {
    let c = client();
    let mut mock = MockTransport::new();
    mock.connected = false;
    let mut w = BufferedWriter::new(&mut mock);
    assert!(c.send_request(&boot(), 0, &mut w).is_err());
    assert_eq!(c.pending_count(), 0);
}

#[test]
fn call_is_flushed_to_transport() {
    let c = client();
    let mut mock = MockTransport::new();
    let h = {
        let mut w = BufferedWriter::new(&mut mock);
        c.send_request(&HeartbeatRequest {}, 0, &mut w).unwrap()
    };
    assert_eq!(
        mock.outbound_text(),
        format!(r#"[2,"{}","Heartbeat",{{}}]"#, h.unique_id())
    );
    assert_eq!(mock.flushes, 1);
    assert!(c.is_pending(h.unique_id()));
}
