//! Unified error types for the charge-point communication stack.
//!
//! Every failure on the message path is a returned value: decode faults,
//! correlation failures and transport errors are all typed here so the
//! receive loop can handle them without unwinding. Value-level faults are
//! `Copy` so they travel through the codec engine without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Bounded string construction
// ---------------------------------------------------------------------------

/// Failure to build a [`BoundedString`](crate::types::BoundedString) or
/// [`IdentifierString`](crate::types::IdentifierString).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringError {
    /// Input is longer than the declared capacity (in bytes).
    TooLong { max: usize, len: usize },
    /// Input contains a character outside the identifier charset.
    InvalidCharset { position: usize },
}

impl fmt::Display for StringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { max, len } => write!(f, "string of {len} bytes exceeds limit of {max}"),
            Self::InvalidCharset { position } => {
                write!(f, "invalid identifier character at byte {position}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Field-level decode faults
// ---------------------------------------------------------------------------

/// Why a single JSON value could not be decoded into its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFault {
    /// The JSON value had the wrong type; carries the expected type name.
    TypeMismatch(&'static str),
    /// A bounded string was too long or used forbidden characters.
    String(StringError),
    /// A number did not fit the declared integer width.
    OutOfRange,
}

impl fmt::Display for FieldFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch(expected) => write!(f, "expected {expected}"),
            Self::String(e) => write!(f, "{e}"),
            Self::OutOfRange => write!(f, "number out of range"),
        }
    }
}

impl std::error::Error for StringError {}

impl From<StringError> for FieldFault {
    fn from(e: StringError) -> Self {
        Self::String(e)
    }
}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// A message or payload could not be decoded.
///
/// Nested records report the innermost field that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Input is not syntactically valid JSON.
    Syntax { line: usize, column: usize },
    /// Input is valid JSON but not the expected structure.
    Malformed(&'static str),
    /// A value fault not yet attributed to a field.
    Fault(FieldFault),
    /// A required key is absent (or `null`).
    MissingField(&'static str),
    /// A key is present but its value is unusable.
    InvalidField {
        field: &'static str,
        fault: FieldFault,
    },
}

impl DecodeError {
    /// Attribute a bare value fault to `field`. Errors that already name a
    /// field are passed through unchanged.
    pub fn in_field(self, field: &'static str) -> Self {
        match self {
            Self::Fault(fault) => Self::InvalidField { field, fault },
            other => other,
        }
    }

    /// Field name carried by this error, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field) | Self::InvalidField { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { line, column } => write!(f, "invalid JSON at {line}:{column}"),
            Self::Malformed(what) => write!(f, "malformed message: {what}"),
            Self::Fault(fault) => write!(f, "{fault}"),
            Self::MissingField(field) => write!(f, "missing required field '{field}'"),
            Self::InvalidField { field, fault } => write!(f, "field '{field}': {fault}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<FieldFault> for DecodeError {
    fn from(fault: FieldFault) -> Self {
        Self::Fault(fault)
    }
}

impl From<StringError> for DecodeError {
    fn from(e: StringError) -> Self {
        Self::Fault(FieldFault::String(e))
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Syntax {
            line: e.line(),
            column: e.column(),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound request errors
// ---------------------------------------------------------------------------

/// A request could not be sent.
#[derive(Debug)]
pub enum SendError {
    /// The pending-request table is full.
    TooManyPending,
    /// The encoded Call exceeds the configured maximum message size.
    TooLarge { size: usize, max: usize },
    /// Writing or flushing the transport failed.
    Io(std::io::Error),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyPending => write!(f, "too many pending requests"),
            Self::TooLarge { size, max } => {
                write!(f, "message of {size} bytes exceeds limit of {max}")
            }
            Self::Io(e) => write!(f, "transport: {e}"),
        }
    }
}

impl std::error::Error for SendError {}

impl From<std::io::Error> for SendError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Request outcome errors
// ---------------------------------------------------------------------------

/// Terminal failure of an outstanding request.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcError {
    /// The peer answered with a CallError.
    CallError(crate::rpc::envelope::CallError),
    /// The CallResult payload did not match the expected response type.
    Decode(DecodeError),
    /// No response arrived before the deadline.
    Timeout,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CallError(e) => write!(f, "peer error {}: {}", e.code, e.description),
            Self::Decode(e) => write!(f, "response decode: {e}"),
            Self::Timeout => write!(f, "request timed out"),
        }
    }
}

impl std::error::Error for RpcError {}

impl From<DecodeError> for RpcError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Configuration rejected at load or validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The stored document could not be deserialized.
    Corrupted,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(why) => write!(f, "config validation failed: {why}"),
            Self::Corrupted => write!(f, "stored config is corrupted"),
        }
    }
}

impl std::error::Error for ConfigError {}
