//! Fuzz target: typed record decoding
//!
//! Any JSON document fed to the record decoder must decode or fail with a
//! field-level error. A successful decode without enum sentinels must
//! encode again and decode back.
//!
//! cargo fuzz run fuzz_record_decode

#![no_main]

use chargelink::codec::{Record, decode_record, is_encodable, to_vec};
use chargelink::messages::v16::{BootNotificationRequest, StatusNotificationRequest};
use chargelink::messages::v201::{NotifyReportRequest, SetVariablesRequest};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fn check<R: Record>(value: &Value) {
    let Ok(record) = decode_record::<R>(value) else {
        return;
    };
    // Unknown enum names decode to the sentinel, which has no wire form.
    if !is_encodable(&record) {
        return;
    }
    let bytes = to_vec(&record).expect("encode decoded record");
    let again: Value = serde_json::from_slice(&bytes).expect("encoder wrote invalid JSON");
    decode_record::<R>(&again).expect("re-decode encoded record");
}

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    check::<BootNotificationRequest>(&value);
    check::<StatusNotificationRequest>(&value);
    check::<SetVariablesRequest>(&value);
    check::<NotifyReportRequest>(&value);
});
