//! Per-type JSON conversion.
//!
//! [`WireValue`] is implemented by every type that can appear as a record
//! field. Decoding writes into an existing value (records are
//! default-constructed and then filled), so the trait stays object safe
//! and the record engine can walk fields through `&mut dyn WireValue`.

use std::io;

use serde_json::Value;

use super::JsonWriter;
use crate::error::{DecodeError, FieldFault};
use crate::types::{BoundedString, IdentifierString, Sequence};

/// Whether a field must be present in its enclosing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Absent key is a `MissingField` error.
    Required,
    /// Absent key (or `null`) leaves the default in place.
    Optional,
}

pub trait WireValue {
    /// Replace `self` with the value decoded from `value`.
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError>;

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()>;

    fn presence(&self) -> Presence {
        Presence::Required
    }

    /// `true` when the field's key should be left out of the object.
    fn is_omitted(&self) -> bool {
        false
    }

    /// `false` if the value holds an enum sentinel anywhere inside it.
    fn is_encodable(&self) -> bool {
        true
    }
}

fn mismatch(expected: &'static str) -> DecodeError {
    DecodeError::Fault(FieldFault::TypeMismatch(expected))
}

impl WireValue for bool {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        *self = value.as_bool().ok_or_else(|| mismatch("boolean"))?;
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.bool(*self)
    }
}

/// Integers must be JSON integers; `3.0` is rejected like `"3"`.
fn decode_integer(value: &Value) -> Result<i64, DecodeError> {
    match value {
        Value::Number(n) if n.is_i64() => n.as_i64().ok_or_else(|| mismatch("integer")),
        // Positive beyond i64::MAX.
        Value::Number(n) if n.is_u64() => Err(DecodeError::Fault(FieldFault::OutOfRange)),
        _ => Err(mismatch("integer")),
    }
}

impl WireValue for i64 {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        *self = decode_integer(value)?;
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.i64(*self)
    }
}

impl WireValue for i32 {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        *self = i32::try_from(decode_integer(value)?)
            .map_err(|_| DecodeError::Fault(FieldFault::OutOfRange))?;
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.i64(i64::from(*self))
    }
}

impl WireValue for u32 {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        *self = u32::try_from(decode_integer(value)?)
            .map_err(|_| DecodeError::Fault(FieldFault::OutOfRange))?;
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.u64(u64::from(*self))
    }
}

impl WireValue for f64 {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        *self = value.as_f64().ok_or_else(|| mismatch("number"))?;
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.f64(*self)
    }
}

impl WireValue for String {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        let text = value.as_str().ok_or_else(|| mismatch("string"))?;
        text.clone_into(self);
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.string(self)
    }
}

/// Opaque JSON passthrough (e.g. CallError details, DataTransfer data).
impl WireValue for Value {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        value.clone_into(self);
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.value(self)
    }
}

impl<const N: usize> WireValue for BoundedString<N> {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        let text = value.as_str().ok_or_else(|| mismatch("string"))?;
        *self = BoundedString::new(text)?;
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.string(self)
    }
}

impl<const N: usize> WireValue for IdentifierString<N> {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        let text = value.as_str().ok_or_else(|| mismatch("string"))?;
        *self = IdentifierString::new(text)?;
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.string(self)
    }
}

/// `None` is omitted on output; absent key or `null` decodes to `None`.
impl<T: WireValue + Default> WireValue for Option<T> {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.decode_json(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        match self {
            Some(inner) => inner.write_json(w),
            None => w.null(),
        }
    }

    fn presence(&self) -> Presence {
        Presence::Optional
    }

    fn is_omitted(&self) -> bool {
        self.is_none()
    }

    fn is_encodable(&self) -> bool {
        self.as_ref().is_none_or(T::is_encodable)
    }
}

impl<T: WireValue + Default, const OMIT_EMPTY: bool> WireValue for Sequence<T, OMIT_EMPTY> {
    fn decode_json(&mut self, value: &Value) -> Result<(), DecodeError> {
        let items = value.as_array().ok_or_else(|| mismatch("array"))?;
        self.clear();
        self.reserve(items.len());
        for item in items {
            let mut decoded = T::default();
            decoded.decode_json(item)?;
            self.push(decoded);
        }
        Ok(())
    }

    fn write_json(&self, w: &mut JsonWriter<'_>) -> io::Result<()> {
        w.begin_array()?;
        for item in self {
            w.element()?;
            item.write_json(w)?;
        }
        w.end_array()
    }

    fn presence(&self) -> Presence {
        if OMIT_EMPTY {
            Presence::Optional
        } else {
            Presence::Required
        }
    }

    fn is_omitted(&self) -> bool {
        OMIT_EMPTY && self.is_empty()
    }

    fn is_encodable(&self) -> bool {
        self.iter().all(T::is_encodable)
    }
}
