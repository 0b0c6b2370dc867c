//! Fuzz target: `Message::parse`
//!
//! Arbitrary bytes must either parse into an envelope that writes back to
//! something parseable, or fail with a `DecodeError`. Never panic.
//!
//! cargo fuzz run fuzz_message_parse

#![no_main]

use chargelink::rpc::Message;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(msg) = Message::parse(data) else {
        return;
    };

    let mut out = Vec::new();
    msg.write_to(&mut out).expect("write to Vec cannot fail");
    let again = Message::parse(&out).expect("re-encoded envelope must parse");
    assert_eq!(again.unique_id(), msg.unique_id());
    assert_eq!(again.message_type(), msg.message_type());
});
