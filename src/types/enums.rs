//! Enumerated values with exact wire names and a sentinel fallback.
//!
//! Every protocol enum is declared once through [`wire_enum!`](crate::wire_enum),
//! which generates the Rust enum, its static `(variant, "WireName")` table
//! and an extra `Unrecognized` variant. Decoding a name that is not in the
//! table yields `Unrecognized` instead of failing, so a peer running a newer
//! protocol revision cannot break message parsing by adding values.
//!
//! Encoding `Unrecognized` is a caller bug: outbound messages are built
//! from known variants only. Debug builds assert; release builds log and
//! write `null`. Records that echo peer input can be checked with
//! [`codec::is_encodable`](crate::codec::is_encodable) first.

use std::io;

use log::error;
use serde_json::Value;

use crate::codec::JsonWriter;
use crate::error::{DecodeError, FieldFault};

/// Static name mapping shared by all generated enums.
pub trait WireEnum: Copy + PartialEq + 'static {
    /// Every named variant with its exact wire spelling.
    const TABLE: &'static [(Self, &'static str)];
    /// Sentinel produced for unknown wire names.
    const UNRECOGNIZED: Self;
    /// Enum name used in log messages.
    const NAME: &'static str;

    fn from_wire(name: &str) -> Self {
        Self::TABLE
            .iter()
            .find(|(_, wire)| *wire == name)
            .map_or(Self::UNRECOGNIZED, |(variant, _)| *variant)
    }

    /// Wire name of this variant, `None` for the sentinel.
    fn as_wire(self) -> Option<&'static str> {
        Self::TABLE
            .iter()
            .find(|(variant, _)| *variant == self)
            .map(|(_, wire)| *wire)
    }

    fn is_recognized(self) -> bool {
        self != Self::UNRECOGNIZED
    }
}

#[doc(hidden)]
pub fn decode_enum<E: WireEnum>(value: &Value) -> Result<E, DecodeError> {
    let name = value
        .as_str()
        .ok_or(DecodeError::Fault(FieldFault::TypeMismatch("enum string")))?;
    let variant = E::from_wire(name);
    if !variant.is_recognized() {
        log::debug!("{}: unrecognized value '{}'", E::NAME, name);
    }
    Ok(variant)
}

#[doc(hidden)]
pub fn write_enum<E: WireEnum>(variant: E, w: &mut JsonWriter<'_>) -> io::Result<()> {
    debug_assert!(
        variant.is_recognized(),
        "attempted to encode unrecognized {} value",
        E::NAME
    );
    match variant.as_wire() {
        Some(name) => w.string(name),
        None => {
            error!("{}: encoding unrecognized value as null", E::NAME);
            w.null()
        }
    }
}

/// Declare a protocol enum with explicit wire names.
///
/// ```
/// chargelink::wire_enum! {
///     pub enum ResetType {
///         Hard => "Hard",
///         Soft => "Soft",
///     }
/// }
///
/// use chargelink::types::WireEnum;
/// assert_eq!(ResetType::from_wire("Soft"), ResetType::Soft);
/// assert_eq!(ResetType::from_wire("Warm"), ResetType::Unrecognized);
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Wire value not present in the mapping table.
            #[default]
            Unrecognized,
        }

        impl $crate::types::WireEnum for $name {
            const TABLE: &'static [(Self, &'static str)] = &[ $( ($name::$variant, $wire), )+ ];
            const UNRECOGNIZED: Self = $name::Unrecognized;
            const NAME: &'static str = stringify!($name);
        }

        impl $crate::codec::WireValue for $name {
            fn decode_json(
                &mut self,
                value: &$crate::codec::Value,
            ) -> ::core::result::Result<(), $crate::error::DecodeError> {
                *self = $crate::types::enums::decode_enum(value)?;
                Ok(())
            }

            fn write_json(&self, w: &mut $crate::codec::JsonWriter<'_>) -> ::std::io::Result<()> {
                $crate::types::enums::write_enum(*self, w)
            }

            fn is_encodable(&self) -> bool {
                $crate::types::WireEnum::is_recognized(*self)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str($crate::types::WireEnum::as_wire(*self).unwrap_or("<unrecognized>"))
            }
        }
    };
}
