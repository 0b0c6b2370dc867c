//! Schema-driven record encoding and decoding.
//!
//! A record type exposes its fields as an ordered list of
//! `("jsonKey", &field)` pairs through [`Record::visit`] and
//! [`Record::visit_mut`]. One generic engine walks that list in both
//! directions, so the field order written on the wire is the declaration
//! order and the two directions cannot drift apart.
//!
//! Records are normally declared with [`record!`](crate::record).

use std::io;

use serde_json::Value;

use super::{JsonWriter, Presence, WireValue};
use crate::error::{DecodeError, FieldFault};

pub type FieldVisitor<'v> = dyn FnMut(&'static str, &dyn WireValue) -> io::Result<()> + 'v;
pub type FieldVisitorMut<'v> =
    dyn FnMut(&'static str, &mut dyn WireValue) -> Result<(), DecodeError> + 'v;

pub trait Record: Default {
    /// Visit every field in declaration order.
    fn visit(&self, f: &mut FieldVisitor<'_>) -> io::Result<()>;

    /// Visit every field mutably in declaration order.
    fn visit_mut(&mut self, f: &mut FieldVisitorMut<'_>) -> Result<(), DecodeError>;
}

/// Fill `record` from a JSON object.
///
/// Keys not declared by the record are ignored. A missing required key
/// fails with `MissingField`; a missing optional key keeps its default.
/// The first failing field aborts decoding.
pub fn decode_fields<R: Record>(record: &mut R, value: &Value) -> Result<(), DecodeError> {
    let object = value
        .as_object()
        .ok_or(DecodeError::Fault(FieldFault::TypeMismatch("object")))?;

    record.visit_mut(&mut |key, field| match object.get(key) {
        None => match field.presence() {
            Presence::Required => Err(DecodeError::MissingField(key)),
            Presence::Optional => Ok(()),
        },
        Some(Value::Null) if field.presence() == Presence::Optional => Ok(()),
        Some(v) => field.decode_json(v).map_err(|e| e.in_field(key)),
    })
}

/// Decode a fresh `R` from a JSON object.
pub fn decode_record<R: Record>(value: &Value) -> Result<R, DecodeError> {
    let mut record = R::default();
    decode_fields(&mut record, value)?;
    Ok(record)
}

/// Write `record` as a JSON object, skipping omitted fields.
pub fn encode_record<R: Record>(record: &R, w: &mut JsonWriter<'_>) -> io::Result<()> {
    w.begin_object()?;
    record.visit(&mut |key, field| {
        if field.is_omitted() {
            return Ok(());
        }
        w.key(key)?;
        field.write_json(w)
    })?;
    w.end_object()
}

/// `true` when no field of `record`, at any depth, holds an enum
/// sentinel.
///
/// Records decoded from peer input can carry `Unrecognized` values. Check
/// this before writing such a record back out.
pub fn is_encodable<R: Record>(record: &R) -> bool {
    let mut encodable = true;
    // The visitor never fails.
    let _ = record.visit(&mut |_, field| {
        encodable &= field.is_encodable();
        Ok(())
    });
    encodable
}

/// Encode `record` into a freshly allocated byte buffer.
///
/// The record must not contain an `Unrecognized` enum value (see
/// [`is_encodable`]); debug builds panic on one, release builds write
/// `null` in its place.
pub fn to_vec<R: Record>(record: &R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_record(record, &mut JsonWriter::new(&mut buf))?;
    Ok(buf)
}

/// Declare a protocol record: a plain struct plus its ordered field
/// schema.
///
/// ```
/// chargelink::record! {
///     pub struct Meter {
///         "connectorId" => pub connector_id: i32,
///         "label" => pub label: Option<String>,
///     }
/// }
///
/// let meter: Meter = chargelink::codec::decode_record(
///     &serde_json::json!({"connectorId": 2}),
/// ).unwrap();
/// assert_eq!(meter.connector_id, 2);
/// assert_eq!(meter.label, None);
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $key:literal => $fvis:vis $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( $(#[$fmeta])* $fvis $field: $ty, )*
        }

        impl $crate::codec::Record for $name {
            #[allow(unused_variables)]
            fn visit(
                &self,
                f: &mut $crate::codec::FieldVisitor<'_>,
            ) -> ::std::io::Result<()> {
                $( f($key, &self.$field)?; )*
                Ok(())
            }

            #[allow(unused_variables)]
            fn visit_mut(
                &mut self,
                f: &mut $crate::codec::FieldVisitorMut<'_>,
            ) -> ::core::result::Result<(), $crate::error::DecodeError> {
                $( f($key, &mut self.$field)?; )*
                Ok(())
            }
        }

        impl $crate::codec::WireValue for $name {
            fn decode_json(
                &mut self,
                value: &$crate::codec::Value,
            ) -> ::core::result::Result<(), $crate::error::DecodeError> {
                *self = <Self as ::core::default::Default>::default();
                $crate::codec::decode_fields(self, value)
            }

            fn write_json(&self, w: &mut $crate::codec::JsonWriter<'_>) -> ::std::io::Result<()> {
                $crate::codec::encode_record(self, w)
            }

            fn is_encodable(&self) -> bool {
                $crate::codec::is_encodable(self)
            }
        }
    };
}
