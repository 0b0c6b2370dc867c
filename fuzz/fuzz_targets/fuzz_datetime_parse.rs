//! Fuzz target: RFC 3339 timestamp parser
//!
//! Anything that parses must format to a UTC string that parses back to
//! the same second.
//!
//! cargo fuzz run fuzz_datetime_parse

#![no_main]

use chargelink::types::datetime::{format_millis, parse_millis};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Some(millis) = parse_millis(text) else {
        return;
    };

    let formatted = format_millis(millis);
    if let Some(back) = parse_millis(&formatted) {
        assert_eq!(back, millis.div_euclid(1000) * 1000, "{text} -> {formatted}");
    }
});
