//! Little-endian primitives over in-memory recordings
//!

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

fn truncated(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::EndOfStream,
        _ => Error::IOError(e),
    }
}

/// A forward-only reader over a complete in-memory byte buffer
///
/// Every read either yields the full value or fails with [`Error::EndOfStream`]. Byte slices are
/// borrowed from the underlying buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.inner.read_u8().map_err(truncated)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.inner.read_u16::<LittleEndian>().map_err(truncated)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.inner.read_u32::<LittleEndian>().map_err(truncated)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.inner.read_u64::<LittleEndian>().map_err(truncated)
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let data: &'a [u8] = *self.inner.get_ref();
        let start = self.position();
        let end = start
            .checked_add(len)
            .filter(|end| *end <= data.len())
            .ok_or(Error::EndOfStream)?;

        self.inner.set_position(end as u64);
        Ok(&data[start..end])
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Borrow everything that has not been read yet
    pub fn read_rest(&mut self) -> &'a [u8] {
        let data: &'a [u8] = *self.inner.get_ref();
        let start = self.position().min(data.len());
        self.inner.set_position(data.len() as u64);
        &data[start..]
    }

    pub fn position(&self) -> usize {
        self.inner.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.inner.get_ref().len().saturating_sub(self.position())
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

impl Read for ByteReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for ByteReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// Little-endian counterpart of [`ByteReader`] for any [`Write`]
#[derive(Debug)]
pub struct ByteWriter<W: Write> {
    inner: W,
    written: u64,
}

impl<W: Write> ByteWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value)?;
        self.written += 1;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.inner.write_u16::<LittleEndian>(value)?;
        self.written += 2;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.inner.write_u32::<LittleEndian>(value)?;
        self.written += 4;
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.inner.write_u64::<LittleEndian>(value)?;
        self.written += 8;
        Ok(())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Number of bytes written through this writer
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
