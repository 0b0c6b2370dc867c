//! Protocol value types: bounded strings, wire enums, sequences and
//! timestamps.

pub mod bounded;
pub mod datetime;
pub mod enums;
pub mod sequence;

pub use bounded::{
    BoundedString, CiString20, CiString25, CiString50, CiString255, CiString500, IdToken,
    IdentifierString,
};
pub use datetime::DateTime;
pub use enums::WireEnum;
pub use sequence::{AlwaysEmit, OmitEmpty, Sequence};
