use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use super::{Error, Result};

/// Encodes one little-endian base-128 integer using the minimal number of
/// bytes. Always emits at least one byte, even for zero.
fn write_variable_length<W: Write + ?Sized>(w: &mut W, x: u32) -> Result<()> {
    let mut bytes = [0u8; 5];
    let mut n = 1;
    bytes[0] = (x & 0x7f) as u8;
    while n < 5 && (x >> (n as u32 * 7)) != 0 {
        // mark the previous byte as not last
        bytes[n - 1] |= 0x80;
        bytes[n] = ((x >> (n as u32 * 7)) & 0x7f) as u8;
        n += 1;
    }
    w.write_all(&bytes[..n])?;
    Ok(())
}

/// Writes the scalar primitives of the ABC format to any byte sink.
///
/// The exact inverse of [`AbcRead`](super::AbcRead): every value written by
/// one of these operations reads back identically, and the emitted encoding
/// matches what the AS3 compiler produces.
pub trait AbcWrite: Write {
    fn write_u8(&mut self, x: u8) -> Result<()> {
        WriteBytesExt::write_u8(self, x).map_err(Error::Io)
    }

    fn write_u16(&mut self, x: u16) -> Result<()> {
        WriteBytesExt::write_u16::<LittleEndian>(self, x).map_err(Error::Io)
    }

    /// Writes the low three bytes of `x` in little-endian order.
    fn write_s24(&mut self, x: i32) -> Result<()> {
        let bytes = [(x & 0xff) as u8, ((x >> 8) & 0xff) as u8, ((x >> 16) & 0xff) as u8];
        self.write_all(&bytes)?;
        Ok(())
    }

    fn write_u30(&mut self, x: u32) -> Result<()> {
        AbcWrite::write_u32(self, x)
    }

    fn write_u32(&mut self, x: u32) -> Result<()> {
        write_variable_length(self, x)
    }

    /// Writes a variable-length s32.
    ///
    /// The value is reinterpreted as u32 and emitted like
    /// [`write_u32`](AbcWrite::write_u32), so negative values always occupy
    /// 5 bytes.
    fn write_s32(&mut self, x: i32) -> Result<()> {
        write_variable_length(self, x as u32)
    }

    fn write_d64(&mut self, x: f64) -> Result<()> {
        WriteBytesExt::write_f64::<LittleEndian>(self, x).map_err(Error::Io)
    }
}

impl<W: Write + ?Sized> AbcWrite for W {}

/// A sink adapter that tracks how many bytes have been written through it.
pub(crate) struct CountWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> CountWriter<W> {
    pub(crate) fn new(inner: W) -> CountWriter<W> {
        CountWriter { inner, written: 0 }
    }

    pub(crate) fn written(&self) -> u64 {
        self.written
    }
}

impl<W: Write> Write for CountWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
