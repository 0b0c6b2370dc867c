//! JSON codec: streaming writer, per-type conversion and the record
//! engine.

pub mod record;
pub mod value;
pub mod writer;

pub use record::{
    FieldVisitor, FieldVisitorMut, Record, decode_fields, decode_record, encode_record,
    is_encodable, to_vec,
};
pub use serde_json::Value;
pub use value::{Presence, WireValue};
pub use writer::JsonWriter;
