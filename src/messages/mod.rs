//! Message catalogue.
//!
//! Pure data: every message is declared with `record!` and every enum with
//! `wire_enum!`, so encoding and decoding go through the generic codec
//! engine. Each request type names its action and response via
//! [`Request`](crate::rpc::Request).

pub mod v16;
pub mod v201;
