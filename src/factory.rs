//! Factory functions assembling common descriptors
//!
//! These helpers mirror how layouts are written in practice: shorthand
//! integer fields, bit-level structs, flags, padding and magic numbers. All
//! of them box the result so descriptors compose freely.

use crate::adapters::{
    BitInteger, CompactInt, ConstValue, Expr, HexDump, MapDefault, Mapping, PaddingAdapter,
    Validator,
};
use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::buffered::Buffered;
use crate::construct::{Adapter, BoxedConstruct, Context};
use crate::error::{Error, Result};
use crate::field::{ComputedField, FormatField, StaticField};
use crate::packer::Endian;
use crate::structure::{Embedded, Struct};
use crate::value::Value;

/// A named fixed-length raw byte field
pub fn field(name: &str, length: usize) -> Result<BoxedConstruct> {
    Ok(Box::new(StaticField::new(Some(name), length)?))
}

/// A raw byte field whose length is computed from the context, typically
/// from a previously parsed sibling:
///
/// ```
/// use binform::factory::{computed_field, struct_of, ubint8};
/// use binform::{Construct, Error, Value};
///
/// let packet = struct_of(
///     "packet",
///     vec![
///         ubint8("len")?,
///         computed_field("data", |ctx| {
///             ctx.get_int("len")
///                 .map(|n| n as usize)
///                 .ok_or_else(|| Error::Value { reason: "len not parsed yet".into() })
///         })?,
///     ],
/// )?;
/// let parsed = packet.parse(&[2, 0xAA, 0xBB])?;
/// let data = parsed.as_container().unwrap().get("data").unwrap();
/// assert_eq!(*data, Value::Bytes(vec![0xAA, 0xBB]));
/// # Ok::<(), binform::Error>(())
/// ```
pub fn computed_field(
    name: &str,
    length: impl Fn(&Context<'_>) -> Result<usize> + Send + Sync + 'static,
) -> Result<BoxedConstruct> {
    Ok(Box::new(ComputedField::new(Some(name), length)?))
}

fn format(name: &str, endian: Endian, code: char) -> Result<BoxedConstruct> {
    Ok(Box::new(FormatField::with_endian(Some(name), endian, code)?))
}

/// Unsigned big-endian 8-bit integer
pub fn ubint8(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'B')
}

/// Unsigned big-endian 16-bit integer
pub fn ubint16(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'H')
}

/// Unsigned big-endian 32-bit integer
pub fn ubint32(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'L')
}

/// Unsigned big-endian 64-bit integer
pub fn ubint64(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'Q')
}

/// Signed big-endian 8-bit integer
pub fn sbint8(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'b')
}

/// Signed big-endian 16-bit integer
pub fn sbint16(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'h')
}

/// Signed big-endian 32-bit integer
pub fn sbint32(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'l')
}

/// Signed big-endian 64-bit integer
pub fn sbint64(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'q')
}

/// Unsigned little-endian 16-bit integer
pub fn ulint16(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Little, 'H')
}

/// Unsigned little-endian 32-bit integer
pub fn ulint32(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Little, 'L')
}

/// Unsigned little-endian 64-bit integer
pub fn ulint64(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Little, 'Q')
}

/// Signed little-endian 16-bit integer
pub fn slint16(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Little, 'h')
}

/// Signed little-endian 32-bit integer
pub fn slint32(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Little, 'l')
}

/// Signed little-endian 64-bit integer
pub fn slint64(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Little, 'q')
}

/// Unsigned native-endian 16-bit integer
pub fn unint16(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Native, 'H')
}

/// Unsigned native-endian 32-bit integer
pub fn unint32(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Native, 'L')
}

/// Big-endian 32-bit float
pub fn bfloat32(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'f')
}

/// Big-endian 64-bit float
pub fn bfloat64(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Big, 'd')
}

/// Little-endian 32-bit float
pub fn lfloat32(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Little, 'f')
}

/// Little-endian 64-bit float
pub fn lfloat64(name: &str) -> Result<BoxedConstruct> {
    format(name, Endian::Little, 'd')
}

/// An ordered sequence of named children; see [`Struct`]
pub fn struct_of(name: &str, children: Vec<BoxedConstruct>) -> Result<BoxedConstruct> {
    Ok(Box::new(Struct::new(Some(name), children)?))
}

/// Mark a child struct's fields for inclusion directly in the enclosing
/// struct's container
pub fn embedded(child: BoxedConstruct) -> BoxedConstruct {
    Box::new(Embedded::new(child))
}

/// A struct whose children operate on bits.
///
/// The wrapped struct sees a byte-per-bit buffer; its total width must come
/// to a whole number of bytes on the wire.
///
/// ```
/// use binform::factory::{bit_field, bit_struct, flag, padding};
/// use binform::Construct;
///
/// let header = bit_struct(
///     "header",
///     vec![bit_field("version", 3)?, flag("secure")?, padding(4)?],
/// )?;
/// assert_eq!(header.sizeof()?, 1);
/// # Ok::<(), binform::Error>(())
/// ```
pub fn bit_struct(name: &str, children: Vec<BoxedConstruct>) -> Result<BoxedConstruct> {
    let inner = Struct::new(Some(name), children)?;
    Ok(Box::new(Buffered::new(
        Box::new(inner),
        Box::new(bits_to_bytes),
        Box::new(|data| Ok(bytes_to_bits(data))),
        Box::new(|bits| {
            if bits % 8 != 0 {
                return Err(Error::value(format!(
                    "bit struct covers {bits} bits, not a whole number of bytes"
                )));
            }
            Ok(bits / 8)
        }),
    )))
}

/// An unsigned big-endian integer of `width` bits, for use inside
/// [`bit_struct`]
pub fn bit_field(name: &str, width: usize) -> Result<BoxedConstruct> {
    let child = StaticField::new(Some(name), width)?;
    Ok(Box::new(Adapter::new(
        Box::new(child),
        BitInteger::new(width, false, false, 8)?,
    )))
}

/// A bit integer with explicit byte-swapping and signedness over any child
pub fn bit_integer_adapter(
    child: BoxedConstruct,
    width: usize,
    swapped: bool,
    signed: bool,
    bytesize: usize,
) -> Result<BoxedConstruct> {
    Ok(Box::new(Adapter::new(
        child,
        BitInteger::new(width, swapped, signed, bytesize)?,
    )))
}

/// A single bit, parsed as 0 or 1
pub fn bit(name: &str) -> Result<BoxedConstruct> {
    bit_field(name, 1)
}

/// Four bits
pub fn nibble(name: &str) -> Result<BoxedConstruct> {
    bit_field(name, 4)
}

/// Eight bits
pub fn octet(name: &str) -> Result<BoxedConstruct> {
    bit_field(name, 8)
}

/// A single bit parsed as a boolean.
///
/// A set bit decodes to `true`; anything else decodes to `false`.
pub fn flag(name: &str) -> Result<BoxedConstruct> {
    let child = StaticField::new(Some(name), 1)?;
    Ok(Box::new(Adapter::new(
        Box::new(child),
        Mapping::new(
            vec![
                (Value::Int(1), Value::Bool(true)),
                (Value::Int(0), Value::Bool(false)),
            ],
            vec![
                (Value::Bool(true), Value::Bytes(vec![1])),
                (Value::Bool(false), Value::Bytes(vec![0])),
            ],
            MapDefault::Replace(Value::Bool(false)),
            MapDefault::Fail,
        ),
    )))
}

/// Anonymous zero-fill padding of `length` units (bytes, or bits inside a
/// [`bit_struct`])
pub fn padding(length: usize) -> Result<BoxedConstruct> {
    padding_with(length, 0, false)
}

/// Padding with an explicit fill pattern; `strict` verifies it on parse
pub fn padding_with(length: usize, pattern: u8, strict: bool) -> Result<BoxedConstruct> {
    let child = StaticField::new(None, length)?;
    Ok(Box::new(PaddingAdapter::new(
        Box::new(child),
        pattern,
        strict,
    )))
}

/// Require a fixed value from the child on parse; substitute it on build
pub fn const_adapter(child: BoxedConstruct, expected: impl Into<Value>) -> BoxedConstruct {
    Box::new(Adapter::new(child, ConstValue::new(expected)))
}

/// An anonymous magic-number guard over exactly `data`
pub fn magic(data: &[u8]) -> Result<BoxedConstruct> {
    let child = StaticField::new(None, data.len())?;
    Ok(const_adapter(Box::new(child), data.to_vec()))
}

/// Map parsed values through `decoding` and built values through `encoding`
pub fn mapping_adapter(
    child: BoxedConstruct,
    decoding: Vec<(Value, Value)>,
    encoding: Vec<(Value, Value)>,
    dec_default: MapDefault,
    enc_default: MapDefault,
) -> BoxedConstruct {
    Box::new(Adapter::new(
        child,
        Mapping::new(decoding, encoding, dec_default, enc_default),
    ))
}

/// A mapping applied symmetrically: `pairs` maps plain values to their
/// encoded form on build and back on parse; `default` applies both ways
pub fn symmetric_mapping(
    child: BoxedConstruct,
    pairs: Vec<(Value, Value)>,
    default: MapDefault,
) -> BoxedConstruct {
    let decoding = pairs
        .iter()
        .map(|(plain, encoded)| (encoded.clone(), plain.clone()))
        .collect();
    mapping_adapter(child, decoding, pairs, default.clone(), default)
}

/// Accept only values for which `accept` returns true, on parse and build
pub fn validator(
    child: BoxedConstruct,
    accept: impl Fn(&Value, &Context<'_>) -> bool + Send + Sync + 'static,
) -> BoxedConstruct {
    Box::new(Adapter::new(child, Validator::new(Box::new(accept))))
}

/// Accept only values from `valids`:
///
/// ```
/// use binform::factory::{one_of, ubint8};
/// use binform::{Construct, Value};
///
/// let f = one_of(ubint8("foo")?, vec![4.into(), 5.into(), 6.into(), 7.into()]);
/// assert_eq!(f.parse(&[0x05])?, Value::Int(5));
/// assert!(f.parse(&[0x08]).is_err());
/// # Ok::<(), binform::Error>(())
/// ```
pub fn one_of(child: BoxedConstruct, valids: Vec<Value>) -> BoxedConstruct {
    validator(child, move |value, _| valids.contains(value))
}

/// Render the child's bytes as a hex-dump string
pub fn hex_dump_adapter(child: BoxedConstruct, line_size: usize) -> BoxedConstruct {
    Box::new(Adapter::new(child, HexDump::new(line_size)))
}

/// A one-off adapter from an encode and a decode function
pub fn expr_adapter(
    child: BoxedConstruct,
    encoder: impl Fn(Value, &Context<'_>) -> Result<Value> + Send + Sync + 'static,
    decoder: impl Fn(Value, &Context<'_>) -> Result<Value> + Send + Sync + 'static,
) -> BoxedConstruct {
    Box::new(Adapter::new(
        child,
        Expr::new(Box::new(encoder), Box::new(decoder)),
    ))
}

/// Integers at the legacy magnitude-inferred width; see
/// [`CompactInt`](crate::adapters::CompactInt)
pub fn compact_int_adapter(child: BoxedConstruct) -> BoxedConstruct {
    Box::new(Adapter::new(child, CompactInt))
}
