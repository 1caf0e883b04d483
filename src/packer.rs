//! Fixed-format packing of single primitive values
//!
//! Maps an endianness token and a one-char format code to a byte width and a
//! pack/unpack pair, in the classic fixed-size integer/float set.

use crate::error::{Error, Result};
use crate::value::Value;
use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};

/// Byte order for format fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
    Native,
}

impl Endian {
    /// Parse an endianness token: `'>'` big, `'<'` little, `'='` native.
    ///
    /// Anything else is rejected.
    pub fn from_symbol(symbol: char) -> Result<Self> {
        match symbol {
            '>' => Ok(Self::Big),
            '<' => Ok(Self::Little),
            '=' => Ok(Self::Native),
            other => Err(Error::value(format!(
                "endianness must be '<', '>' or '=', got {other:?}"
            ))),
        }
    }
}

/// A fixed-size primitive format code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Code {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl Code {
    fn from_char(code: char) -> Result<Self> {
        match code {
            'b' => Ok(Self::I8),
            'B' => Ok(Self::U8),
            'h' => Ok(Self::I16),
            'H' => Ok(Self::U16),
            'l' => Ok(Self::I32),
            'L' => Ok(Self::U32),
            'q' => Ok(Self::I64),
            'Q' => Ok(Self::U64),
            'f' => Ok(Self::F32),
            'd' => Ok(Self::F64),
            other => Err(Error::value(format!("unknown format code {other:?}"))),
        }
    }

    fn width(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }
}

/// Packs and unpacks one primitive value at a fixed width
#[derive(Debug, Clone, Copy)]
pub struct Packer {
    endian: Endian,
    code: Code,
}

impl Packer {
    /// Create a packer from an endianness token and a format code char
    pub fn new(endian: char, code: char) -> Result<Self> {
        Ok(Self {
            endian: Endian::from_symbol(endian)?,
            code: Code::from_char(code)?,
        })
    }

    /// Create a packer from an already-resolved endianness
    pub fn with_endian(endian: Endian, code: char) -> Result<Self> {
        Ok(Self {
            endian,
            code: Code::from_char(code)?,
        })
    }

    /// The fixed byte width of this format
    pub fn width(&self) -> usize {
        self.code.width()
    }

    /// Serialize one value, range-checked against the format's domain
    pub fn pack(&self, value: &Value) -> Result<Vec<u8>> {
        match self.endian {
            Endian::Big => self.pack_as::<BigEndian>(value),
            Endian::Little => self.pack_as::<LittleEndian>(value),
            Endian::Native => self.pack_as::<NativeEndian>(value),
        }
    }

    /// Deserialize one value from exactly `width()` bytes
    pub fn unpack(&self, data: &[u8]) -> Result<Value> {
        if data.len() != self.width() {
            return Err(Error::FieldSize {
                expected: self.width(),
                actual: data.len(),
            });
        }
        match self.endian {
            Endian::Big => self.unpack_as::<BigEndian>(data),
            Endian::Little => self.unpack_as::<LittleEndian>(data),
            Endian::Native => self.unpack_as::<NativeEndian>(data),
        }
    }

    fn pack_as<E: ByteOrder>(&self, value: &Value) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.width()];
        match self.code {
            Code::I8 => buf[0] = self.int_in_range(value, i64::from(i8::MIN), i64::from(i8::MAX))? as u8,
            Code::U8 => buf[0] = self.int_in_range(value, 0, i64::from(u8::MAX))? as u8,
            Code::I16 => E::write_i16(
                &mut buf,
                self.int_in_range(value, i64::from(i16::MIN), i64::from(i16::MAX))? as i16,
            ),
            Code::U16 => E::write_u16(
                &mut buf,
                self.int_in_range(value, 0, i64::from(u16::MAX))? as u16,
            ),
            Code::I32 => E::write_i32(
                &mut buf,
                self.int_in_range(value, i64::from(i32::MIN), i64::from(i32::MAX))? as i32,
            ),
            Code::U32 => E::write_u32(
                &mut buf,
                self.int_in_range(value, 0, i64::from(u32::MAX))? as u32,
            ),
            Code::I64 => E::write_i64(&mut buf, value.expect_int()?),
            Code::U64 => {
                let v = value.expect_int()?;
                if v < 0 {
                    return Err(Error::value(format!("{v} out of range for unsigned format")));
                }
                E::write_u64(&mut buf, v as u64);
            }
            Code::F32 => E::write_f32(&mut buf, self.float_of(value)? as f32),
            Code::F64 => E::write_f64(&mut buf, self.float_of(value)?),
        }
        Ok(buf)
    }

    fn unpack_as<E: ByteOrder>(&self, data: &[u8]) -> Result<Value> {
        let value = match self.code {
            Code::I8 => Value::Int(i64::from(data[0] as i8)),
            Code::U8 => Value::Int(i64::from(data[0])),
            Code::I16 => Value::Int(i64::from(E::read_i16(data))),
            Code::U16 => Value::Int(i64::from(E::read_u16(data))),
            Code::I32 => Value::Int(i64::from(E::read_i32(data))),
            Code::U32 => Value::Int(i64::from(E::read_u32(data))),
            Code::I64 => Value::Int(E::read_i64(data)),
            Code::U64 => {
                let v = E::read_u64(data);
                let v = i64::try_from(v).map_err(|_| {
                    Error::value(format!("{v} exceeds the signed 64-bit value domain"))
                })?;
                Value::Int(v)
            }
            Code::F32 => Value::Float(f64::from(E::read_f32(data))),
            Code::F64 => Value::Float(E::read_f64(data)),
        };
        Ok(value)
    }

    fn int_in_range(&self, value: &Value, min: i64, max: i64) -> Result<i64> {
        let v = value.expect_int()?;
        if v < min || v > max {
            return Err(Error::value(format!("{v} out of range [{min}, {max}]")));
        }
        Ok(v)
    }

    fn float_of(&self, value: &Value) -> Result<f64> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(i) => Ok(*i as f64),
            other => Err(Error::TypeMismatch {
                expected: "float",
                actual: other.type_name(),
            }),
        }
    }
}
