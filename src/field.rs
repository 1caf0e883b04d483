//! Primitive fields: raw bytes, packed primitives, context-sized bytes

use crate::construct::{checked_name, BuildMode, Construct, Context, Flags, ParseMode};
use crate::error::Result;
use crate::packer::{Endian, Packer};
use crate::stream::{ReadStream, WriteStream};
use crate::value::Value;
use tracing::trace;

/// A fixed-size raw byte field.
///
/// Parses to [`Value::Bytes`]; accepts `Bytes` or `Str` (latin-1) on build.
pub struct StaticField {
    name: Option<String>,
    length: usize,
}

impl StaticField {
    /// Create a field of exactly `length` bytes; `None` names an anonymous
    /// field whose parsed value a struct discards
    pub fn new(name: Option<&str>, length: usize) -> Result<Self> {
        Ok(Self {
            name: checked_name(name)?,
            length,
        })
    }
}

impl Construct for StaticField {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parse_from(
        &self,
        stream: &mut ReadStream<'_>,
        _ctx: &mut Context<'_>,
        _mode: ParseMode<'_>,
    ) -> Result<Value> {
        let data = stream.read_exact(self.length)?;
        Ok(Value::Bytes(data.to_vec()))
    }

    fn build_into(
        &self,
        value: &Value,
        out: &mut WriteStream,
        _ctx: &mut Context<'_>,
        _mode: BuildMode,
    ) -> Result<()> {
        out.write_exact(self.length, &value.to_field_bytes()?)
    }

    fn size_from(&self, _ctx: &Context<'_>) -> Result<usize> {
        Ok(self.length)
    }
}

/// A field that packs and unpacks one primitive value at a fixed width.
///
/// The format code selects the width and value kind; the endianness token
/// must be one of `'<'`, `'>'`, `'='`.
pub struct FormatField {
    name: Option<String>,
    packer: Packer,
}

impl FormatField {
    /// Create a format field from an endianness token and a format code
    pub fn new(name: Option<&str>, endianness: char, code: char) -> Result<Self> {
        Ok(Self {
            name: checked_name(name)?,
            packer: Packer::new(endianness, code)?,
        })
    }

    /// Create a format field from an already-resolved [`Endian`]
    pub fn with_endian(name: Option<&str>, endian: Endian, code: char) -> Result<Self> {
        Ok(Self {
            name: checked_name(name)?,
            packer: Packer::with_endian(endian, code)?,
        })
    }
}

impl Construct for FormatField {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parse_from(
        &self,
        stream: &mut ReadStream<'_>,
        _ctx: &mut Context<'_>,
        _mode: ParseMode<'_>,
    ) -> Result<Value> {
        let data = stream.read_exact(self.packer.width())?;
        self.packer.unpack(data)
    }

    fn build_into(
        &self,
        value: &Value,
        out: &mut WriteStream,
        _ctx: &mut Context<'_>,
        _mode: BuildMode,
    ) -> Result<()> {
        let data = self.packer.pack(value)?;
        out.write_exact(self.packer.width(), &data)
    }

    fn size_from(&self, _ctx: &Context<'_>) -> Result<usize> {
        Ok(self.packer.width())
    }
}

/// Length function for a [`ComputedField`]
pub type LengthFn = Box<dyn Fn(&Context<'_>) -> Result<usize> + Send + Sync>;

/// A raw byte field whose length is derived from the context.
///
/// Typically the length references a previously parsed sibling, e.g. a
/// byte-count prefix. Because the size depends on runtime data, a size query
/// fails unless the context carries the referenced values.
pub struct ComputedField {
    name: Option<String>,
    length: LengthFn,
}

impl ComputedField {
    pub fn new(
        name: Option<&str>,
        length: impl Fn(&Context<'_>) -> Result<usize> + Send + Sync + 'static,
    ) -> Result<Self> {
        Ok(Self {
            name: checked_name(name)?,
            length: Box::new(length),
        })
    }
}

impl Construct for ComputedField {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn flags(&self) -> Flags {
        Flags::DYNAMIC
    }

    fn parse_from(
        &self,
        stream: &mut ReadStream<'_>,
        ctx: &mut Context<'_>,
        _mode: ParseMode<'_>,
    ) -> Result<Value> {
        let length = (self.length)(ctx)?;
        trace!(length, "computed field length");
        let data = stream.read_exact(length)?;
        Ok(Value::Bytes(data.to_vec()))
    }

    fn build_into(
        &self,
        value: &Value,
        out: &mut WriteStream,
        ctx: &mut Context<'_>,
        _mode: BuildMode,
    ) -> Result<()> {
        let length = (self.length)(ctx)?;
        out.write_exact(length, &value.to_field_bytes()?)
    }

    fn size_from(&self, ctx: &Context<'_>) -> Result<usize> {
        (self.length)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn static_field_round_trip() {
        let f = StaticField::new(Some("raw"), 3).unwrap();
        let v = f.parse(&[1, 2, 3]).unwrap();
        assert_eq!(v, Value::Bytes(vec![1, 2, 3]));
        assert_eq!(f.build(&v).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn static_field_is_not_required_to_exhaust_input() {
        let f = StaticField::new(Some("raw"), 2).unwrap();
        assert_eq!(f.parse(&[1, 2, 3]).unwrap(), Value::Bytes(vec![1, 2]));
    }

    #[test]
    fn static_field_length_mismatch_on_build() {
        let f = StaticField::new(Some("raw"), 2).unwrap();
        assert!(matches!(
            f.build(&Value::Bytes(vec![1, 2, 3])),
            Err(Error::FieldSize { .. })
        ));
    }

    #[test]
    fn reserved_names_rejected_at_construction() {
        assert!(StaticField::new(Some("_"), 1).is_err());
        assert!(StaticField::new(Some("<unnested>"), 1).is_err());
        assert!(FormatField::new(Some("_"), '>', 'B').is_err());
    }

    #[test]
    fn format_field_round_trip() {
        let f = FormatField::new(Some("n"), '>', 'H').unwrap();
        assert_eq!(f.parse(&[0x01, 0x02]).unwrap(), Value::Int(0x0102));
        assert_eq!(f.build(&Value::Int(0x0102)).unwrap(), vec![0x01, 0x02]);
        assert_eq!(f.sizeof().unwrap(), 2);
    }

    #[test]
    fn format_field_rejects_bad_endianness() {
        assert!(FormatField::new(Some("n"), '!', 'H').is_err());
    }

    #[test]
    fn computed_field_sizeof_needs_context() {
        let f = ComputedField::new(Some("data"), |ctx| {
            ctx.get_int("len")
                .map(|n| n as usize)
                .ok_or_else(|| Error::value("len not in context"))
        })
        .unwrap();
        assert!(matches!(f.sizeof(), Err(Error::Sizeof { .. })));

        let mut ctx = Context::new();
        ctx.set("len", 5);
        assert_eq!(f.sizeof_with(&ctx).unwrap(), 5);
    }
}
