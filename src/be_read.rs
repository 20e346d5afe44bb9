use crate::error::Converter;
use crate::Error;
use crate::Result;
use std::io::Read;

/// Longest var-int the service produces: five 7-bit groups cover 32 bits.
pub const VAR_INT_MAX_BYTES: usize = 5;

/// Reads the big endian primitives used by the binary point cloud fragments.
///
/// Every read either returns a complete value or fails.
/// A stream ending in the middle of a value yields `Error::Truncated`.
pub struct BigEndianReader<R: Read> {
    reader: R,
    offset: u64,
}

impl<R: Read> BigEndianReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut buffer = [0_u8; N];
        let offset = self.offset;
        self.reader
            .read_exact(&mut buffer)
            .read_err(format!("Failed to read {what} at offset {offset}"))?;
        self.offset += N as u64;
        Ok(buffer)
    }

    /// Reads one variable length integer.
    ///
    /// The value is stored as 7-bit groups, most significant group first.
    /// Continuation bytes have the top bit cleared, the final byte has it set.
    pub fn read_var_int(&mut self) -> Result<u32> {
        let start = self.offset;
        let mut value = 0_u32;
        for _ in 0..VAR_INT_MAX_BYTES {
            let [byte] = self.read_array::<1>("var-int")?;
            if value > u32::MAX >> 7 {
                Error::invalid(format!(
                    "Var-int starting at offset {start} does not fit into 32 bits"
                ))?
            }
            value = (value << 7) | u32::from(byte & 0x7F);
            if byte & 0x80 != 0 {
                return Ok(value);
            }
        }
        Error::invalid(format!(
            "Var-int starting at offset {start} is longer than {VAR_INT_MAX_BYTES} bytes"
        ))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.read_array::<4>("big endian float")?;
        Ok(f32::from_be_bytes(bytes))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_array::<2>("big endian u16")?;
        Ok(u16::from_be_bytes(bytes))
    }
}
