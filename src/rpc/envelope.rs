//! RPC envelope: the three positional JSON array shapes.
//!
//! ```text
//! [2, "<uniqueId>", "<Action>", {payload}]                   Call
//! [3, "<uniqueId>", {payload}]                               CallResult
//! [4, "<uniqueId>", "<code>", "<description>", {details}]    CallError
//! ```
//!
//! Inbound parsing produces a [`Message`] whose payload is still an untyped
//! JSON value; typed decoding happens once the action (for Calls) or the
//! pending request (for responses) is known. Outbound messages are written
//! straight from typed records with the `write_*` functions.

use std::io;

use log::warn;
use serde_json::{Map, Value};

use crate::codec::{JsonWriter, Record, encode_record};
use crate::error::DecodeError;
use crate::types::WireEnum;

pub const CALL: u64 = 2;
pub const CALL_RESULT: u64 = 3;
pub const CALL_ERROR: u64 = 4;

/// Maximum unique-id length in bytes.
pub const UNIQUE_ID_LEN: usize = 36;

/// Bytes of raw input quoted when a message is rejected.
const SNIPPET_LEN: usize = 64;

pub type UniqueId = heapless::String<UNIQUE_ID_LEN>;

crate::wire_enum! {
    /// CallError codes of both protocol revisions.
    pub enum ErrorCode {
        NotImplemented => "NotImplemented",
        NotSupported => "NotSupported",
        InternalError => "InternalError",
        ProtocolError => "ProtocolError",
        SecurityError => "SecurityError",
        /// 1.6 spelling.
        FormationViolation => "FormationViolation",
        /// 2.0.1 spelling.
        FormatViolation => "FormatViolation",
        PropertyConstraintViolation => "PropertyConstraintViolation",
        /// 1.6 spelling.
        OccurenceConstraintViolation => "OccurenceConstraintViolation",
        /// 2.0.1 spelling.
        OccurrenceConstraintViolation => "OccurrenceConstraintViolation",
        TypeConstraintViolation => "TypeConstraintViolation",
        GenericError => "GenericError",
        MessageTypeNotSupported => "MessageTypeNotSupported",
        RpcFrameworkError => "RpcFrameworkError",
    }
}

/// Protocol-level error reported by the peer (or to it).
#[derive(Debug, Clone, PartialEq)]
pub struct CallError {
    pub code: ErrorCode,
    pub description: String,
    /// Free-form JSON object; `{}` when the peer sent none.
    pub details: Value,
    /// Code text as received when `code` is `Unrecognized`.
    unknown_code: Option<String>,
}

impl CallError {
    pub fn new(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            details: Value::Object(Map::new()),
            unknown_code: None,
        }
    }

    /// Wire spelling of the code. An unknown code read from the peer is
    /// kept verbatim; a locally built `Unrecognized` reads `GenericError`.
    pub fn code_text(&self) -> &str {
        match (self.code.as_wire(), &self.unknown_code) {
            (Some(name), _) => name,
            (None, Some(raw)) => raw,
            (None, None) => "GenericError",
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// A parsed inbound envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Call {
        unique_id: UniqueId,
        action: String,
        payload: Value,
    },
    CallResult {
        unique_id: UniqueId,
        payload: Value,
    },
    CallError {
        unique_id: UniqueId,
        error: CallError,
    },
}

impl Message {
    /// Parse one envelope from a complete text frame.
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice::<Value>(bytes)
            .map_err(DecodeError::from)
            .and_then(Self::from_value)
            .inspect_err(|e| {
                let end = bytes.len().min(SNIPPET_LEN);
                warn!(
                    "RPC: rejected message ({}): {}",
                    e,
                    String::from_utf8_lossy(&bytes[..end])
                );
            })
    }

    /// Parse the next envelope from a blocking byte stream. Input after the
    /// first complete JSON value is left unread.
    ///
    /// Input consumed before a `WouldBlock` is lost. For a transport that
    /// delivers frames in pieces, collect them with
    /// [`BufferedReader::next_frame`](super::stream::BufferedReader::next_frame)
    /// and hand each to [`parse`](Self::parse).
    pub fn read_from(reader: impl io::Read) -> Result<Self, DecodeError> {
        let value = serde_json::Deserializer::from_reader(reader)
            .into_iter::<Value>()
            .next()
            .ok_or(DecodeError::Malformed("empty input"))??;
        Self::from_value(value).inspect_err(|e| warn!("RPC: rejected message: {}", e))
    }

    /// Classify an already-parsed JSON array.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let Value::Array(items) = value else {
            return Err(DecodeError::Malformed("envelope is not an array"));
        };
        let mut items = items.into_iter();

        let kind = items
            .next()
            .and_then(|v| v.as_u64())
            .ok_or(DecodeError::Malformed("missing message type"))?;
        let unique_id = take_unique_id(items.next())?;

        match kind {
            CALL => {
                let action = take_string(items.next(), "missing action")?;
                let payload = take_object(items.next(), "missing payload")?;
                Ok(Self::Call {
                    unique_id,
                    action,
                    payload,
                })
            }
            CALL_RESULT => {
                let payload = take_object(items.next(), "missing payload")?;
                Ok(Self::CallResult { unique_id, payload })
            }
            CALL_ERROR => {
                let code = take_string(items.next(), "missing error code")?;
                let description = take_string(items.next(), "missing error description")?;
                let details = match items.next() {
                    None => Value::Object(Map::new()),
                    some => take_object(some, "missing error details")?,
                };
                let parsed = ErrorCode::from_wire(&code);
                Ok(Self::CallError {
                    unique_id,
                    error: CallError {
                        code: parsed,
                        description,
                        details,
                        unknown_code: (!parsed.is_recognized()).then_some(code),
                    },
                })
            }
            _ => Err(DecodeError::Malformed("unknown message type")),
        }
    }

    pub fn unique_id(&self) -> &str {
        match self {
            Self::Call { unique_id, .. }
            | Self::CallResult { unique_id, .. }
            | Self::CallError { unique_id, .. } => unique_id,
        }
    }

    pub fn message_type(&self) -> u64 {
        match self {
            Self::Call { .. } => CALL,
            Self::CallResult { .. } => CALL_RESULT,
            Self::CallError { .. } => CALL_ERROR,
        }
    }

    /// Re-encode this envelope.
    pub fn write_to(&self, out: &mut dyn io::Write) -> io::Result<()> {
        let mut w = JsonWriter::new(out);
        begin(&mut w, self.message_type(), self.unique_id())?;
        match self {
            Self::Call { action, payload, .. } => {
                w.element()?;
                w.string(action)?;
                w.element()?;
                w.value(payload)?;
            }
            Self::CallResult { payload, .. } => {
                w.element()?;
                w.value(payload)?;
            }
            Self::CallError { error, .. } => write_error_fields(&mut w, error)?,
        }
        w.end_array()
    }
}

fn take_unique_id(item: Option<Value>) -> Result<UniqueId, DecodeError> {
    let Some(Value::String(text)) = item else {
        return Err(DecodeError::Malformed("missing unique id"));
    };
    let mut id = UniqueId::new();
    id.push_str(&text)
        .map_err(|()| DecodeError::Malformed("unique id too long"))?;
    Ok(id)
}

fn take_string(item: Option<Value>, what: &'static str) -> Result<String, DecodeError> {
    match item {
        Some(Value::String(text)) => Ok(text),
        _ => Err(DecodeError::Malformed(what)),
    }
}

fn take_object(item: Option<Value>, what: &'static str) -> Result<Value, DecodeError> {
    match item {
        Some(object @ Value::Object(_)) => Ok(object),
        _ => Err(DecodeError::Malformed(what)),
    }
}

// ── Outbound writers ─────────────────────────────────────────

fn begin(w: &mut JsonWriter<'_>, kind: u64, unique_id: &str) -> io::Result<()> {
    w.begin_array()?;
    w.element()?;
    w.u64(kind)?;
    w.element()?;
    w.string(unique_id)
}

fn write_error_fields(w: &mut JsonWriter<'_>, error: &CallError) -> io::Result<()> {
    w.element()?;
    w.string(error.code_text())?;
    w.element()?;
    w.string(&error.description)?;
    w.element()?;
    w.value(&error.details)
}

pub fn write_call<R: Record>(
    out: &mut dyn io::Write,
    unique_id: &str,
    action: &str,
    payload: &R,
) -> io::Result<()> {
    let mut w = JsonWriter::new(out);
    begin(&mut w, CALL, unique_id)?;
    w.element()?;
    w.string(action)?;
    w.element()?;
    encode_record(payload, &mut w)?;
    w.end_array()
}

pub fn write_call_result<R: Record>(
    out: &mut dyn io::Write,
    unique_id: &str,
    payload: &R,
) -> io::Result<()> {
    let mut w = JsonWriter::new(out);
    begin(&mut w, CALL_RESULT, unique_id)?;
    w.element()?;
    encode_record(payload, &mut w)?;
    w.end_array()
}

pub fn write_call_error(
    out: &mut dyn io::Write,
    unique_id: &str,
    error: &CallError,
) -> io::Result<()> {
    let mut w = JsonWriter::new(out);
    begin(&mut w, CALL_ERROR, unique_id)?;
    write_error_fields(&mut w, error)?;
    w.end_array()
}

/// Write a CallResult whose payload bytes come from `payload`, framed as
/// `[3,"<id>",` + payload + `]`. The closure must emit one JSON value.
pub fn write_custom_result(
    out: &mut dyn io::Write,
    unique_id: &str,
    payload: impl FnOnce(&mut dyn io::Write) -> io::Result<()>,
) -> io::Result<()> {
    {
        let mut w = JsonWriter::new(&mut *out);
        begin(&mut w, CALL_RESULT, unique_id)?;
        w.element()?;
    }
    payload(&mut *out)?;
    out.write_all(b"]")
}
