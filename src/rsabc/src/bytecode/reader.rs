use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{Error, Result};

/// Decodes one little-endian base-128 integer.
///
/// Each byte carries 7 payload bits in its low bits; a set high bit means
/// another byte follows. At most 5 bytes may be consumed — a sixth
/// continuation byte is malformed.
fn read_variable_length<R: Read + ?Sized>(r: &mut R) -> Result<(u32, u32)> {
    let mut v: u32 = 0;
    let mut n: u32 = 0;
    loop {
        if n >= 5 {
            return Err(Error::MalformedVariableInteger);
        }
        let b = AbcRead::read_u8(r)?;
        v |= u32::from(b & 0x7f) << (n * 7);
        n += 1;
        if b & 0x80 == 0 {
            break;
        }
    }
    Ok((v, n))
}

/// Reads the scalar primitives of the ABC format from any byte source.
///
/// All fixed-width scalars are little-endian. The stream is consumed in
/// strict forward order; no seeking is performed.
pub trait AbcRead: Read {
    fn read_u8(&mut self) -> Result<u8> {
        ReadBytesExt::read_u8(self).map_err(Error::from_read)
    }

    fn read_u16(&mut self) -> Result<u16> {
        ReadBytesExt::read_u16::<LittleEndian>(self).map_err(Error::from_read)
    }

    /// Reads a 3-byte little-endian integer, sign-extended from bit 23.
    fn read_s24(&mut self) -> Result<i32> {
        let mut bytes = [0u8; 3];
        self.read_exact(&mut bytes).map_err(Error::from_read)?;
        let mut v = u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16;
        if v >> 23 != 0 {
            v |= 0xff00_0000;
        }
        Ok(v as i32)
    }

    /// Reads a variable-length u30.
    ///
    /// The encoding is identical to [`read_u32`](AbcRead::read_u32); the "30"
    /// only describes the range the AS3 compiler emits, and is not enforced.
    fn read_u30(&mut self) -> Result<u32> {
        AbcRead::read_u32(self)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let (v, _) = read_variable_length(self)?;
        Ok(v)
    }

    /// Reads a variable-length s32.
    ///
    /// Decoded as u32 over `n` bytes, then sign-extended when the sign bit of
    /// the highest payload byte is set. A 5-byte encoding already fills bits
    /// 28..=31, so no extension applies there.
    fn read_s32(&mut self) -> Result<i32> {
        let (mut v, n) = read_variable_length(self)?;
        let shift = n * 7;
        if shift < 32 && v & (1 << (shift - 1)) != 0 {
            v |= 0xffff_ffff << shift;
        }
        Ok(v as i32)
    }

    fn read_d64(&mut self) -> Result<f64> {
        ReadBytesExt::read_f64::<LittleEndian>(self).map_err(Error::from_read)
    }

    fn read_bytes(&mut self, n: u32) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; n as usize];
        self.read_exact(&mut bytes).map_err(Error::from_read)?;
        Ok(bytes)
    }
}

impl<R: Read + ?Sized> AbcRead for R {}
