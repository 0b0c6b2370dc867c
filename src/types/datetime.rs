//! ISO-8601 timestamps with hand-rolled calendar arithmetic.
//!
//! The firmware's C library has no usable `timegm`, and its `gmtime`
//! behaves differently between toolchains, so conversion between epoch
//! milliseconds and civil UTC time is done here with plain Gregorian rules.
//!
//! Output is always `YYYY-MM-DDTHH:MM:SSZ` (milliseconds are dropped).
//! Input accepts up to three fractional digits (further digits are ignored)
//! and a mandatory zone suffix: `Z`, `±HH`, `±HH:MM` or `±HHMM`.

use core::fmt::Write as _;
use std::io;

use log::warn;
use serde_json::Value;

use crate::codec::{JsonWriter, WireValue};
use crate::error::{DecodeError, FieldFault};

const SECS_PER_DAY: i64 = 86_400;
/// Any 400 consecutive Gregorian years contain exactly 97 leap years.
const DAYS_PER_400_YEARS: i64 = 146_097;
const EPOCH_YEAR: i64 = 1970;

const MONTH_DAYS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Formatted timestamp buffer; sized for the full `i64` millisecond range.
pub type DateTimeText = heapless::String<32>;

pub const fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Length of `month` (1-12) in `year`; `None` for any other month number.
pub const fn days_in_month(year: i64, month: u8) -> Option<u8> {
    match month {
        2 if is_leap_year(year) => Some(29),
        1..=12 => Some(MONTH_DAYS[(month - 1) as usize]),
        _ => None,
    }
}

const fn days_in_year(year: i64) -> i64 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Days since 1970-01-01 for a validated civil date.
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let cycles = (year - EPOCH_YEAR).div_euclid(400);
    let mut days = cycles * DAYS_PER_400_YEARS;
    let mut y = EPOCH_YEAR + cycles * 400;
    while y < year {
        days += days_in_year(y);
        y += 1;
    }
    for m in 1..month {
        days += days_in_month(year, m).map_or(0, i64::from);
    }
    days + i64::from(day) - 1
}

/// Civil date `(year, month, day)` for a day count since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let mut year = EPOCH_YEAR + 400 * days.div_euclid(DAYS_PER_400_YEARS);
    let mut rem = days.rem_euclid(DAYS_PER_400_YEARS);
    loop {
        let len = days_in_year(year);
        if rem < len {
            break;
        }
        rem -= len;
        year += 1;
    }
    let mut month = 1u8;
    loop {
        // rem < days_in_year, so month never passes 12.
        let len = days_in_month(year, month).map_or(i64::MAX, i64::from);
        if rem < len {
            break;
        }
        rem -= len;
        month += 1;
    }
    (year, month, rem as u8 + 1)
}

/// Format epoch milliseconds as `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Negative sub-second remainders are floored into the previous second,
/// so `-1` formats as `1969-12-31T23:59:59Z`.
pub fn format_millis(millis: i64) -> DateTimeText {
    let secs = millis.div_euclid(1000);
    let days = secs.div_euclid(SECS_PER_DAY);
    let second_of_day = secs.rem_euclid(SECS_PER_DAY);
    let (year, month, day) = civil_from_days(days);

    let mut text = DateTimeText::new();
    // Capacity covers the longest year the i64 range can produce.
    let _ = write!(
        text,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        second_of_day / 3600,
        second_of_day % 3600 / 60,
        second_of_day % 60,
    );
    text
}

/// Parse an ISO-8601 timestamp into epoch milliseconds.
///
/// Returns `None` (and logs) on any structural or range violation.
pub fn parse_millis(text: &str) -> Option<i64> {
    match parse_inner(text.as_bytes()) {
        Ok(millis) => Some(millis),
        Err(reason) => {
            warn!("datetime: rejecting '{}': {}", text, reason);
            None
        }
    }
}

fn parse_inner(bytes: &[u8]) -> Result<i64, &'static str> {
    const BODY_LEN: usize = 19; // YYYY-MM-DDTHH:MM:SS

    if bytes.len() < BODY_LEN {
        return Err("too short");
    }
    let (body, mut rest) = bytes.split_at(BODY_LEN);

    // (a) fractional seconds: keep at most three digits
    let mut millis = 0i64;
    if let [b'.', tail @ ..] = rest {
        let digits = tail.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return Err("empty fraction");
        }
        for (i, scale) in [100, 10, 1].into_iter().enumerate() {
            if i < digits {
                millis += i64::from(tail[i] - b'0') * scale;
            }
        }
        rest = &tail[digits..];
    }

    // (b) timezone suffix is mandatory
    let offset_minutes = parse_zone(rest)?;

    // (c) calendar fields
    if body[4] != b'-' || body[7] != b'-' || body[10] != b'T' || body[13] != b':' || body[16] != b':'
    {
        return Err("bad separators");
    }
    let year = i64::from(digits(&body[0..4]).ok_or("bad year")?);
    let month = digits(&body[5..7]).ok_or("bad month")? as u8;
    let day = digits(&body[8..10]).ok_or("bad day")? as u8;
    let hour = i64::from(digits(&body[11..13]).ok_or("bad hour")?);
    let minute = i64::from(digits(&body[14..16]).ok_or("bad minute")?);
    let second = i64::from(digits(&body[17..19]).ok_or("bad second")?);

    let Some(month_len) = days_in_month(year, month) else {
        return Err("month out of range");
    };
    if day == 0 || day > month_len {
        return Err("day out of range");
    }
    if hour > 23 || minute > 59 || second > 59 {
        return Err("time out of range");
    }

    // (d) days since epoch, (e) zone offset, (f) milliseconds
    let secs = days_from_civil(year, month, day) * SECS_PER_DAY + hour * 3600 + minute * 60 + second
        - offset_minutes * 60;
    Ok(secs * 1000 + millis)
}

/// Zone suffix to an offset in minutes east of UTC.
fn parse_zone(zone: &[u8]) -> Result<i64, &'static str> {
    let (sign, rest) = match zone {
        [b'Z'] => return Ok(0),
        [] => return Err("missing timezone"),
        [b'+', rest @ ..] => (1, rest),
        [b'-', rest @ ..] => (-1, rest),
        _ => return Err("bad timezone"),
    };
    let (hours, minutes) = match rest {
        [h1, h2] => (digits(&[*h1, *h2]), Some(0)),
        [h1, h2, b':', m1, m2] | [h1, h2, m1, m2] => (digits(&[*h1, *h2]), digits(&[*m1, *m2])),
        _ => return Err("bad timezone"),
    };
    let (Some(hours), Some(minutes)) = (hours, minutes) else {
        return Err("bad timezone");
    };
    if hours > 23 || minutes > 59 {
        return Err("timezone out of range");
    }
    Ok(sign * i64::from(hours * 60 + minutes))
}

fn digits(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |acc, b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

// ── DateTime value ───────────────────────────────────────────

/// Protocol timestamp: the raw text as received plus the parsed epoch
/// milliseconds.
///
/// A value built from milliseconds carries no raw text; its text form is
/// produced on demand. A value parsed from unparseable text keeps the text
/// and has no timestamp. Equality compares timestamps only, so two values
/// that both failed to parse are equal regardless of their text.
#[derive(Debug, Clone, Default)]
pub struct DateTime {
    raw: Option<String>,
    millis: Option<i64>,
}

impl DateTime {
    pub const fn from_millis(millis: i64) -> Self {
        Self {
            raw: None,
            millis: Some(millis),
        }
    }

    /// Parse `text`; failure is kept as text without a timestamp.
    pub fn parse(text: &str) -> Self {
        Self {
            millis: parse_millis(text),
            raw: Some(text.to_owned()),
        }
    }

    pub fn millis(&self) -> Option<i64> {
        self.millis
    }

    /// Text exactly as it was received, if this value was decoded.
    pub fn raw_text(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Canonical `YYYY-MM-DDTHH:MM:SSZ` form.
    pub fn to_text(&self) -> Option<DateTimeText> {
        self.millis.map(format_millis)
    }

    pub fn is_set(&self) -> bool {
        self.millis.is_some() || self.raw.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.millis.is_some()
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &Self) -> bool {
        self.millis == other.millis
    }
}

impl WireValue for DateTime {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        *self = match value {
            Value::Null => Self::default(),
            Value::String(text) => Self::parse(text),
            _ => return Err(FieldFault::TypeMismatch("date-time string").into()),
        };
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        match (&self.millis, &self.raw) {
            (Some(millis), _) => w.string(&format_millis(*millis)),
            (None, Some(raw)) => w.string(raw),
            (None, None) => w.null(),
        }
    }
}
