//! Streaming compact-JSON writer.
//!
//! Writes directly into any `io::Write` sink so encoding never builds an
//! intermediate document tree. Separators are tracked with a single flag:
//! the writer inserts a comma before every key or array element except the
//! first in its container.

use std::io;

use serde_json::Value;

pub struct JsonWriter<'a> {
    out: &'a mut dyn io::Write,
    first: bool,
}

impl<'a> JsonWriter<'a> {
    pub fn new(out: &'a mut dyn io::Write) -> Self {
        Self { out, first: true }
    }

    pub fn begin_object(&mut self) -> io::Result<()> {
        self.first = true;
        self.out.write_all(b"{")
    }

    /// Write `"key":` preceded by a separator when needed.
    pub fn key(&mut self, key: &str) -> io::Result<()> {
        self.separator()?;
        self.string(key)?;
        self.out.write_all(b":")
    }

    pub fn end_object(&mut self) -> io::Result<()> {
        self.first = false;
        self.out.write_all(b"}")
    }

    pub fn begin_array(&mut self) -> io::Result<()> {
        self.first = true;
        self.out.write_all(b"[")
    }

    /// Mark the start of the next array element.
    pub fn element(&mut self) -> io::Result<()> {
        self.separator()
    }

    pub fn end_array(&mut self) -> io::Result<()> {
        self.first = false;
        self.out.write_all(b"]")
    }

    pub fn string(&mut self, s: &str) -> io::Result<()> {
        serde_json::to_writer(&mut *self.out, s).map_err(io::Error::from)
    }

    pub fn bool(&mut self, b: bool) -> io::Result<()> {
        self.out.write_all(if b { b"true" } else { b"false" })
    }

    pub fn i64(&mut self, n: i64) -> io::Result<()> {
        write!(self.out, "{n}")
    }

    pub fn u64(&mut self, n: u64) -> io::Result<()> {
        write!(self.out, "{n}")
    }

    /// Non-finite floats have no JSON form and are written as `null`.
    pub fn f64(&mut self, n: f64) -> io::Result<()> {
        serde_json::to_writer(&mut *self.out, &n).map_err(io::Error::from)
    }

    pub fn null(&mut self) -> io::Result<()> {
        self.out.write_all(b"null")
    }

    /// Copy an already-built JSON value.
    pub fn value(&mut self, v: &Value) -> io::Result<()> {
        serde_json::to_writer(&mut *self.out, v).map_err(io::Error::from)
    }

    /// Write pre-encoded bytes verbatim. The caller guarantees they form a
    /// single valid JSON value.
    pub fn raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    fn separator(&mut self) -> io::Result<()> {
        if self.first {
            self.first = false;
            Ok(())
        } else {
            self.out.write_all(b",")
        }
    }
}
