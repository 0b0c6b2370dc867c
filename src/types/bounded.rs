//! Length-bounded protocol strings.
//!
//! Field lengths in the protocol are hard limits (`CiString20Type`,
//! `identifierString[36]`, ...). A value built from a `'static` literal
//! borrows it and never allocates; a value built from runtime text owns an
//! exact-size heap copy. Oversized input is rejected, never truncated.

use core::fmt;
use core::ops::Deref;

use crate::error::StringError;

#[derive(Clone)]
enum Repr {
    Borrowed(&'static str),
    Owned(Box<str>),
}

/// Immutable text of at most `N` bytes.
#[derive(Clone)]
pub struct BoundedString<const N: usize> {
    repr: Repr,
}

impl<const N: usize> BoundedString<N> {
    /// Maximum length in bytes.
    pub const MAX_LEN: usize = N;

    /// Wrap a literal without allocating.
    pub const fn from_static(text: &'static str) -> Result<Self, StringError> {
        if text.len() > N {
            return Err(StringError::TooLong {
                max: N,
                len: text.len(),
            });
        }
        Ok(Self {
            repr: Repr::Borrowed(text),
        })
    }

    /// Copy runtime text into an owned, exact-size buffer.
    pub fn new(text: &str) -> Result<Self, StringError> {
        check_len::<N>(text)?;
        Ok(Self {
            repr: Repr::Owned(Box::from(text)),
        })
    }

    pub fn as_str(&self) -> &str {
        match &self.repr {
            Repr::Borrowed(s) => s,
            Repr::Owned(s) => s,
        }
    }

    /// `true` when the value points at a `'static` literal.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.repr, Repr::Borrowed(_))
    }
}

fn check_len<const N: usize>(text: &str) -> Result<(), StringError> {
    if text.len() > N {
        Err(StringError::TooLong {
            max: N,
            len: text.len(),
        })
    } else {
        Ok(())
    }
}

impl<const N: usize> Default for BoundedString<N> {
    fn default() -> Self {
        Self {
            repr: Repr::Borrowed(""),
        }
    }
}

impl<const N: usize> Deref for BoundedString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> AsRef<str> for BoundedString<N> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> PartialEq for BoundedString<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl<const N: usize> Eq for BoundedString<N> {}

impl<const N: usize> PartialEq<str> for BoundedString<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl<const N: usize> PartialEq<&str> for BoundedString<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<const N: usize> fmt::Debug for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> TryFrom<&str> for BoundedString<N> {
    type Error = StringError;

    fn try_from(text: &str) -> Result<Self, StringError> {
        Self::new(text)
    }
}

impl<const N: usize> TryFrom<String> for BoundedString<N> {
    type Error = StringError;

    fn try_from(text: String) -> Result<Self, StringError> {
        check_len::<N>(&text)?;
        Ok(Self {
            repr: Repr::Owned(text.into_boxed_str()),
        })
    }
}

// ── Identifier strings ───────────────────────────────────────

/// Bounded string restricted to the protocol identifier charset:
/// ASCII letters, digits and `* - _ = : + | @ .`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct IdentifierString<const N: usize>(BoundedString<N>);

/// Returns `true` for bytes allowed in an identifier string.
pub const fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'*' | b'-' | b'_' | b'=' | b':' | b'+' | b'|' | b'@' | b'.')
}

const fn check_charset(text: &str) -> Result<(), StringError> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !is_identifier_byte(bytes[i]) {
            return Err(StringError::InvalidCharset { position: i });
        }
        i += 1;
    }
    Ok(())
}

impl<const N: usize> IdentifierString<N> {
    pub const fn from_static(text: &'static str) -> Result<Self, StringError> {
        if text.len() > N {
            return Err(StringError::TooLong {
                max: N,
                len: text.len(),
            });
        }
        if let Err(e) = check_charset(text) {
            return Err(e);
        }
        Ok(Self(BoundedString {
            repr: Repr::Borrowed(text),
        }))
    }

    pub fn new(text: &str) -> Result<Self, StringError> {
        check_len::<N>(text)?;
        check_charset(text)?;
        BoundedString::new(text).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_bounded(&self) -> &BoundedString<N> {
        &self.0
    }
}

impl<const N: usize> Deref for IdentifierString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl<const N: usize> PartialEq<&str> for IdentifierString<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl<const N: usize> fmt::Debug for IdentifierString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for IdentifierString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> TryFrom<&str> for IdentifierString<N> {
    type Error = StringError;

    fn try_from(text: &str) -> Result<Self, StringError> {
        Self::new(text)
    }
}

// ── Protocol aliases ─────────────────────────────────────────

pub type CiString20 = BoundedString<20>;
pub type CiString25 = BoundedString<25>;
pub type CiString50 = BoundedString<50>;
pub type CiString255 = BoundedString<255>;
pub type CiString500 = BoundedString<500>;
pub type IdToken = IdentifierString<36>;
