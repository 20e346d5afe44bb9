use crate::be_read::VAR_INT_MAX_BYTES;
use crate::error::Converter;
use crate::Result;
use std::io::Write;

/// Writes the big endian primitives used by the binary point cloud fragments.
pub struct BigEndianWriter<W: Write> {
    writer: W,
    offset: u64,
}

impl<W: Write> BigEndianWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, offset: 0 }
    }

    /// Number of bytes written so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_bytes(&mut self, bytes: &[u8], what: &str) -> Result<()> {
        let offset = self.offset;
        self.writer
            .write_all(bytes)
            .write_err(format!("Failed to write {what} at offset {offset}"))?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    pub fn write_var_int(&mut self, value: u32) -> Result<()> {
        let (bytes, len) = encode_var_int(value);
        self.write_bytes(&bytes[..len], "var-int")
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write_bytes(&value.to_be_bytes(), "big endian float")
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_be_bytes(), "big endian u16")
    }
}

/// Encodes a value into the var-int layout expected by `BigEndianReader::read_var_int`.
/// Returns the buffer and the number of used bytes.
pub fn encode_var_int(value: u32) -> ([u8; VAR_INT_MAX_BYTES], usize) {
    let mut groups = [0_u8; VAR_INT_MAX_BYTES];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7F) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }

    // Groups were collected least significant first
    groups[..len].reverse();
    groups[len - 1] |= 0x80;
    (groups, len)
}
