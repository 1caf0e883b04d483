//! The adapter library: value transformations layered over inner constructs
//!
//! Each adapter here is a [`Transform`] plugged into the generic
//! [`Adapter`](crate::Adapter) subconstruct, except [`PaddingAdapter`],
//! which needs its child's context-dependent size on the encode side and is
//! therefore a dedicated subconstruct with the same decode/encode
//! discipline.

use crate::bits::{bits_to_int, int_to_bits, swap_bit_groups};
use crate::construct::{BoxedConstruct, BuildMode, Construct, Context, Flags, ParseMode, Transform};
use crate::error::{Error, Result};
use crate::stream::{ReadStream, WriteStream};
use crate::value::Value;

/// Converts byte-per-bit buffers to integers and back.
///
/// `width` is the size in bits; `swapped` reverses `bytesize`-bit groups
/// before conversion; `signed` selects two's-complement interpretation.
pub struct BitInteger {
    width: usize,
    swapped: bool,
    signed: bool,
    bytesize: usize,
}

impl BitInteger {
    pub fn new(width: usize, swapped: bool, signed: bool, bytesize: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::value("bit integer width must be positive"));
        }
        Ok(Self {
            width,
            swapped,
            signed,
            bytesize,
        })
    }
}

impl Transform for BitInteger {
    fn decode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        let bits = obj.expect_bytes()?;
        let bits = if self.swapped {
            swap_bit_groups(bits, self.bytesize)?
        } else {
            bits.to_vec()
        };
        Ok(Value::Int(bits_to_int(&bits, self.signed)?))
    }

    fn encode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        let value = obj.expect_int()?;
        if value < 0 && !self.signed {
            return Err(Error::BitInteger {
                reason: format!("{value} is negative but the field is unsigned"),
            });
        }
        let bits = int_to_bits(value, self.width)?;
        let bits = if self.swapped {
            swap_bit_groups(&bits, self.bytesize)?
        } else {
            bits
        };
        Ok(Value::Bytes(bits))
    }
}

/// Behavior when a value is missing from a mapping
#[derive(Debug, Clone, PartialEq)]
pub enum MapDefault {
    /// Raise a mapping error
    Fail,
    /// Return the unmapped value unchanged
    PassThrough,
    /// Substitute a fixed value
    Replace(Value),
}

/// Maps parsed values to other values and back (enums and symbolic names).
///
/// On decode, a one-byte sequence is first normalized to its byte value so
/// integer keys match fields that parse to raw bytes.
pub struct Mapping {
    decoding: Vec<(Value, Value)>,
    encoding: Vec<(Value, Value)>,
    dec_default: MapDefault,
    enc_default: MapDefault,
}

impl Mapping {
    pub fn new(
        decoding: Vec<(Value, Value)>,
        encoding: Vec<(Value, Value)>,
        dec_default: MapDefault,
        enc_default: MapDefault,
    ) -> Self {
        Self {
            decoding,
            encoding,
            dec_default,
            enc_default,
        }
    }

    fn apply(pairs: &[(Value, Value)], default: &MapDefault, key: Value) -> Result<Value> {
        if let Some((_, mapped)) = pairs.iter().find(|(k, _)| *k == key) {
            return Ok(mapped.clone());
        }
        match default {
            MapDefault::Fail => Err(Error::Mapping {
                value: key.to_string(),
            }),
            MapDefault::PassThrough => Ok(key),
            MapDefault::Replace(value) => Ok(value.clone()),
        }
    }
}

impl Transform for Mapping {
    fn decode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        let key = match &obj {
            Value::Bytes(b) if b.len() == 1 => Value::Int(i64::from(b[0])),
            _ => obj,
        };
        Self::apply(&self.decoding, &self.dec_default, key)
    }

    fn encode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        Self::apply(&self.encoding, &self.enc_default, obj)
    }
}

/// Enforces a constant value (magic numbers).
///
/// Decoding checks the parsed value; building substitutes the constant when
/// given `Null` and otherwise requires a match.
pub struct ConstValue {
    expected: Value,
}

impl ConstValue {
    pub fn new(expected: impl Into<Value>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl Transform for ConstValue {
    fn decode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        if obj != self.expected {
            return Err(Error::Const {
                expected: self.expected.to_string(),
                actual: obj.to_string(),
            });
        }
        Ok(obj)
    }

    fn encode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        if obj.is_null() || obj == self.expected {
            Ok(self.expected.clone())
        } else {
            Err(Error::Const {
                expected: self.expected.to_string(),
                actual: obj.to_string(),
            })
        }
    }
}

/// Renders bytes as a hex-dump string and parses one back.
///
/// The dump is lowercase two-digit pairs separated by spaces, one line per
/// `line_size` bytes. Encoding strips spaces and newlines before decoding
/// the hex digits, so edited dumps build as long as the digits survive.
pub struct HexDump {
    line_size: usize,
}

impl HexDump {
    pub fn new(line_size: usize) -> Self {
        Self { line_size }
    }

    fn dump(&self, data: &[u8]) -> String {
        data.chunks(self.line_size.max(1))
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Transform for HexDump {
    fn decode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        let data = obj.expect_bytes()?;
        Ok(Value::Str(self.dump(data)))
    }

    fn encode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        let text = obj.as_str().ok_or(Error::TypeMismatch {
            expected: "str",
            actual: obj.type_name(),
        })?;
        let digits: String = text.chars().filter(|c| *c != ' ' && *c != '\n').collect();
        let data = hex::decode(&digits)
            .map_err(|e| Error::value(format!("invalid hex dump: {e}")))?;
        Ok(Value::Bytes(data))
    }
}

/// User-supplied transformation function
pub type ExprFn = Box<dyn Fn(Value, &Context<'_>) -> Result<Value> + Send + Sync>;

/// A generic adapter built from an encode and a decode function, for
/// one-off transformations that do not warrant a dedicated type
pub struct Expr {
    encoder: ExprFn,
    decoder: ExprFn,
}

impl Expr {
    pub fn new(encoder: ExprFn, decoder: ExprFn) -> Self {
        Self { encoder, decoder }
    }
}

impl Transform for Expr {
    fn decode(&self, obj: Value, ctx: &Context<'_>) -> Result<Value> {
        (self.decoder)(obj, ctx)
    }

    fn encode(&self, obj: Value, ctx: &Context<'_>) -> Result<Value> {
        (self.encoder)(obj, ctx)
    }
}

/// Predicate used by [`Validator`]
pub type ValidateFn = Box<dyn Fn(&Value, &Context<'_>) -> bool + Send + Sync>;

/// Validates a condition on the value, identically on parse and build.
///
/// The value passes through unchanged when the predicate accepts it.
pub struct Validator {
    accept: ValidateFn,
}

impl Validator {
    pub fn new(accept: ValidateFn) -> Self {
        Self { accept }
    }

    fn check(&self, obj: Value, ctx: &Context<'_>) -> Result<Value> {
        if (self.accept)(&obj, ctx) {
            Ok(obj)
        } else {
            Err(Error::Validation {
                value: obj.to_string(),
            })
        }
    }
}

impl Transform for Validator {
    fn decode(&self, obj: Value, ctx: &Context<'_>) -> Result<Value> {
        self.check(obj, ctx)
    }

    fn encode(&self, obj: Value, ctx: &Context<'_>) -> Result<Value> {
        self.check(obj, ctx)
    }
}

/// Compatibility adapter carrying the legacy magnitude-based integer width:
/// values below 256 serialize as one byte, below 65536 as two, and
/// otherwise as four, big-endian.
///
/// The inference silently promotes widths as values grow, so new schemas
/// should prefer a format field; this exists for layouts that relied on it.
pub struct CompactInt;

impl Transform for CompactInt {
    fn decode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        let data = obj.expect_bytes()?;
        if data.len() > 8 {
            return Err(Error::value(format!(
                "{} bytes exceed the integer value domain",
                data.len()
            )));
        }
        let mut acc = 0i64;
        for &b in data {
            acc = (acc << 8) | i64::from(b);
        }
        Ok(Value::Int(acc))
    }

    fn encode(&self, obj: Value, _ctx: &Context<'_>) -> Result<Value> {
        let value = obj.expect_int()?;
        if value < 0 {
            return Err(Error::value(format!(
                "{value} is negative; magnitude widths are unsigned"
            )));
        }
        let width = if value < 0x100 {
            1
        } else if value < 0x1_0000 {
            2
        } else if value <= i64::from(u32::MAX) {
            4
        } else {
            return Err(Error::value(format!("{value} does not fit in four bytes")));
        };
        let be = value.to_be_bytes();
        Ok(Value::Bytes(be[8 - width..].to_vec()))
    }
}

/// Pads with a fill pattern; optionally verifies the pattern on parse.
///
/// Building ignores the supplied value and emits the child's size worth of
/// the pattern byte. With `strict`, parsing fails unless every byte equals
/// the pattern.
pub struct PaddingAdapter {
    child: BoxedConstruct,
    pattern: u8,
    strict: bool,
}

impl PaddingAdapter {
    pub fn new(child: BoxedConstruct, pattern: u8, strict: bool) -> Self {
        Self {
            child,
            pattern,
            strict,
        }
    }
}

impl Construct for PaddingAdapter {
    fn name(&self) -> Option<&str> {
        self.child.name()
    }

    fn flags(&self) -> Flags {
        self.child.flags()
    }

    fn parse_from(
        &self,
        stream: &mut ReadStream<'_>,
        ctx: &mut Context<'_>,
        mode: ParseMode<'_>,
    ) -> Result<Value> {
        let obj = self.child.parse_from(stream, ctx, mode)?;
        if self.strict {
            let expected = vec![self.pattern; self.child.size_from(ctx)?];
            if obj != Value::Bytes(expected) {
                return Err(Error::Padding {
                    reason: format!("expected fill byte {:#04x}, found {obj}", self.pattern),
                });
            }
        }
        Ok(obj)
    }

    fn build_into(
        &self,
        _value: &Value,
        out: &mut WriteStream,
        ctx: &mut Context<'_>,
        mode: BuildMode,
    ) -> Result<()> {
        let fill = vec![self.pattern; self.child.size_from(ctx)?];
        self.child.build_into(&Value::Bytes(fill), out, ctx, mode)
    }

    fn size_from(&self, ctx: &Context<'_>) -> Result<usize> {
        self.child.size_from(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context<'static> {
        Context::new()
    }

    #[test]
    fn bit_integer_decode_and_encode() {
        let t = BitInteger::new(3, false, false, 8).unwrap();
        assert_eq!(
            t.decode(Value::Bytes(vec![1, 1, 1]), &ctx()).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            t.encode(Value::Int(5), &ctx()).unwrap(),
            Value::Bytes(vec![1, 0, 1])
        );
    }

    #[test]
    fn bit_integer_rejects_negative_unsigned() {
        let t = BitInteger::new(4, false, false, 8).unwrap();
        assert!(matches!(
            t.encode(Value::Int(-1), &ctx()),
            Err(Error::BitInteger { .. })
        ));
        let signed = BitInteger::new(4, false, true, 8).unwrap();
        assert_eq!(
            signed.encode(Value::Int(-1), &ctx()).unwrap(),
            Value::Bytes(vec![1, 1, 1, 1])
        );
    }

    #[test]
    fn bit_integer_width_must_be_positive() {
        assert!(BitInteger::new(0, false, false, 8).is_err());
    }

    #[test]
    fn mapping_normalizes_single_bytes() {
        let t = Mapping::new(
            vec![(Value::Int(1), Value::from("A"))],
            vec![(Value::from("A"), Value::Int(1))],
            MapDefault::Fail,
            MapDefault::Fail,
        );
        assert_eq!(
            t.decode(Value::Bytes(vec![1]), &ctx()).unwrap(),
            Value::from("A")
        );
        assert!(matches!(
            t.decode(Value::Bytes(vec![9]), &ctx()),
            Err(Error::Mapping { .. })
        ));
    }

    #[test]
    fn mapping_defaults() {
        let t = Mapping::new(
            vec![],
            vec![],
            MapDefault::PassThrough,
            MapDefault::Replace(Value::Int(0)),
        );
        assert_eq!(t.decode(Value::Int(3), &ctx()).unwrap(), Value::Int(3));
        assert_eq!(t.encode(Value::Int(3), &ctx()).unwrap(), Value::Int(0));
    }

    #[test]
    fn const_checks_and_substitutes() {
        let t = ConstValue::new("MZ");
        assert_eq!(
            t.decode(Value::Bytes(b"MZ".to_vec()), &ctx()).unwrap(),
            Value::Bytes(b"MZ".to_vec())
        );
        assert!(matches!(
            t.decode(Value::Bytes(b"ZM".to_vec()), &ctx()),
            Err(Error::Const { .. })
        ));
        assert_eq!(t.encode(Value::Null, &ctx()).unwrap(), Value::from("MZ"));
        assert!(matches!(
            t.encode(Value::from("XX"), &ctx()),
            Err(Error::Const { .. })
        ));
    }

    #[test]
    fn hex_dump_round_trip() {
        let t = HexDump::new(4);
        let decoded = t
            .decode(Value::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01]), &ctx())
            .unwrap();
        assert_eq!(decoded, Value::Str("de ad be ef\n01".into()));
        let encoded = t.encode(decoded, &ctx()).unwrap();
        assert_eq!(encoded, Value::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01]));
    }

    #[test]
    fn compact_int_widths() {
        let t = CompactInt;
        assert_eq!(
            t.encode(Value::Int(255), &ctx()).unwrap(),
            Value::Bytes(vec![0xFF])
        );
        assert_eq!(
            t.encode(Value::Int(256), &ctx()).unwrap(),
            Value::Bytes(vec![0x01, 0x00])
        );
        assert_eq!(
            t.encode(Value::Int(0x1_0000), &ctx()).unwrap(),
            Value::Bytes(vec![0x00, 0x01, 0x00, 0x00])
        );
        assert!(t.encode(Value::Int(-1), &ctx()).is_err());
        assert_eq!(
            t.decode(Value::Bytes(vec![0x01, 0x00]), &ctx()).unwrap(),
            Value::Int(256)
        );
    }
}
