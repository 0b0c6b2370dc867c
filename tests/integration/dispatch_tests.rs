//! Inbound Calls: dispatcher + client sharing one receive loop.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};

use chargelink::config::{ProtocolVersion, RpcConfig};
use chargelink::messages::v16::{
    DataTransferRequest, DataTransferResponse, DataTransferStatus, HeartbeatRequest, ResetRequest,
    ResetResponse, ResetStatus, ResetType,
};
use chargelink::messages::v201::{
    SetVariableResult, SetVariableStatus, SetVariablesRequest, SetVariablesResponse,
};
use chargelink::rpc::stream::{BufferedReader, BufferedWriter};
use chargelink::rpc::transport::negotiated_version;
use chargelink::rpc::{Dispatcher, Message, Reply, Resolution, RpcClient};

use crate::mock_transport::MockTransport;

fn v16_dispatcher(resets: &'static AtomicUsize) -> Dispatcher {
    let mut d = Dispatcher::new(ProtocolVersion::V16);
    d.on::<ResetRequest, _>(move |req| {
        resets.fetch_add(1, Ordering::SeqCst);
        Reply::Result(ResetResponse {
            status: if req.kind == ResetType::Soft {
                ResetStatus::Accepted
            } else {
                ResetStatus::Rejected
            },
        })
    })
    .on::<DataTransferRequest, _>(|req| {
        if req.message_id.as_deref() == Some("Snapshot") {
            // Pre-rendered payload straight to the wire.
            Reply::Custom(Box::new(|w: &mut dyn Write| {
                w.write_all(br#"{"status":"Accepted","data":"{\"soc\":81}"}"#)
            }))
        } else {
            Reply::Result(DataTransferResponse {
                status: DataTransferStatus::UnknownMessageId,
                data: None,
            })
        }
    });
    d
}

/// Read every queued message, route responses to the client and Calls to
/// the dispatcher, and return what was written back.
fn pump(mock: &mut MockTransport, client: &RpcClient, dispatcher: &Dispatcher) -> String {
    let mut inbound = Vec::new();
    {
        let mut reader = BufferedReader::new(&mut *mock);
        while let Some(frame) = reader.next_frame().unwrap() {
            if let Ok(msg) = Message::parse(&frame) {
                inbound.push(msg);
            }
        }
    }
    {
        let mut w = BufferedWriter::new(&mut *mock);
        for msg in &inbound {
            if client.handle_message(msg) == Resolution::Call {
                dispatcher.dispatch(msg, &mut w).unwrap();
            }
        }
        w.flush().unwrap();
    }
    mock.take_outbound()
}

#[test]
fn calls_and_responses_share_one_stream() {
    static RESETS: AtomicUsize = AtomicUsize::new(0);
    let client = RpcClient::new(&RpcConfig::default());
    let dispatcher = v16_dispatcher(&RESETS);
    let mut mock = MockTransport::new();

    let hb = {
        let mut w = BufferedWriter::new(&mut mock);
        client.send_request(&HeartbeatRequest {}, 0, &mut w).unwrap()
    };
    mock.take_outbound();

    mock.push_inbound(br#"[2,"cs-1","Reset",{"type":"Soft"}]"#);
    mock.push_inbound(
        format!(
            r#"[3,"{}",{{"currentTime":"2024-05-01T08:00:00Z"}}]"#,
            hb.unique_id()
        )
        .as_bytes(),
    );
    mock.push_inbound(br#"[2,"cs-2","Reset",{"type":"Hard"}]"#);

    let written = pump(&mut mock, &client, &dispatcher);
    assert_eq!(
        written,
        r#"[3,"cs-1",{"status":"Accepted"}][3,"cs-2",{"status":"Rejected"}]"#
    );
    assert_eq!(RESETS.load(Ordering::SeqCst), 2);
    assert!(hb.try_take().unwrap().is_ok());
}

#[test]
fn custom_response_is_framed_as_call_result() {
    static RESETS: AtomicUsize = AtomicUsize::new(0);
    let client = RpcClient::new(&RpcConfig::default());
    let dispatcher = v16_dispatcher(&RESETS);
    let mut mock = MockTransport::new();

    mock.push_inbound(br#"[2,"dt","DataTransfer",{"vendorId":"cl","messageId":"Snapshot"}]"#);
    let written = pump(&mut mock, &client, &dispatcher);
    assert_eq!(
        written,
        r#"[3,"dt",{"status":"Accepted","data":"{\"soc\":81}"}]"#
    );
    let parsed = Message::parse(written.as_bytes()).unwrap();
    assert!(matches!(parsed, Message::CallResult { .. }));
}

#[test]
fn unknown_action_and_bad_payload() {
    static RESETS: AtomicUsize = AtomicUsize::new(0);
    let client = RpcClient::new(&RpcConfig::default());
    let dispatcher = v16_dispatcher(&RESETS);
    let mut mock = MockTransport::new();

    mock.push_inbound(br#"[2,"u1","UnlockConnector",{"connectorId":1}]"#);
    mock.push_inbound(br#"[2,"u2","Reset",{"type":3}]"#);
    let written = pump(&mut mock, &client, &dispatcher);

    assert!(written.starts_with(r#"[4,"u1","NotImplemented","#), "{written}");
    assert!(
        written.contains(r#"[4,"u2","TypeConstraintViolation","#),
        "{written}"
    );
    assert_eq!(RESETS.load(Ordering::SeqCst), 0);
}

#[test]
fn v201_set_variables_round_trip() {
    let mut mock = MockTransport::new();
    mock.subprotocol = Some("ocpp2.0.1");
    let version = negotiated_version(&mock).unwrap();
    assert_eq!(version, ProtocolVersion::V201);

    let mut d = Dispatcher::new(version);
    d.on::<SetVariablesRequest, _>(|req| {
        let mut resp = SetVariablesResponse::default();
        for data in req.set_variable_data.iter() {
            resp.set_variable_result.push(SetVariableResult {
                attribute_type: data.attribute_type,
                attribute_status: SetVariableStatus::RebootRequired,
                component: data.component.clone(),
                variable: data.variable.clone(),
            });
        }
        Reply::Result(resp)
    });

    let client = RpcClient::new(&RpcConfig::default());
    mock.push_inbound(
        br#"[2,"sv","SetVariables",{"setVariableData":[{"attributeValue":"60","component":{"name":"OCPPCommCtrlr"},"variable":{"name":"HeartbeatInterval"}}]}]"#,
    );
    let written = pump(&mut mock, &client, &d);
    assert_eq!(
        written,
        r#"[3,"sv",{"setVariableResult":[{"attributeStatus":"RebootRequired","component":{"name":"OCPPCommCtrlr"},"variable":{"name":"HeartbeatInterval"}}]}]"#
    );

    mock.push_inbound(br#"[2,"sv2","SetVariables",{}]"#);
    let written = pump(&mut mock, &client, &d);
    assert!(
        written.contains("\"OccurrenceConstraintViolation\""),
        "{written}"
    );
}
