//! The construct contract: the trait every layout descriptor satisfies
//!
//! A descriptor is immutable after construction and holds no per-call state;
//! one descriptor tree can serve any number of concurrent parse and build
//! calls. Each call owns its cursor, output buffer and context frames.

use crate::container::Container;
use crate::error::{Error, Result};
use crate::stream::{ReadStream, WriteStream};
use crate::value::{latin1_bytes, Value};
use std::ops::{BitOr, BitOrAssign};

/// Behavioral flags carried by descriptors.
///
/// Flags propagate from inner descriptors to their wrappers at construction
/// time. Only `EMBED` changes behavior in this crate; the rest are carried
/// through for extension compatibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// Repeaters should pass each iteration a copy of the context
    pub const COPY_CONTEXT: Flags = Flags(0x01);
    /// The descriptor's size depends on runtime data
    pub const DYNAMIC: Flags = Flags(0x02);
    /// A struct's fields land directly in the enclosing container
    pub const EMBED: Flags = Flags(0x04);
    /// The descriptor introduces a nested context frame
    pub const NESTING: Flags = Flags(0x08);

    /// True when every bit of `other` is set in `self`
    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets
    pub fn union(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    /// Flag set with the bits of `other` cleared
    pub fn without(self, other: Flags) -> Flags {
        Flags(self.0 & !other.0)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        self.union(rhs)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        *self = self.union(rhs);
    }
}

/// One frame of the parse/build context.
///
/// Frames form a cons-list linked by shared reference: each struct that
/// nests creates a fresh frame pointing at its parent. Children write named
/// values into their own frame only; ancestor frames are reachable read-only
/// through [`parent`](Context::parent).
#[derive(Debug, Default)]
pub struct Context<'a> {
    values: Container,
    parent: Option<&'a Context<'a>>,
}

impl<'a> Context<'a> {
    /// A fresh root frame with no parent
    pub fn new() -> Self {
        Self {
            values: Container::new(),
            parent: None,
        }
    }

    /// A fresh child frame whose parent is `self`
    pub fn nest(&self) -> Context<'_> {
        Context {
            values: Container::new(),
            parent: Some(self),
        }
    }

    /// The parent frame, when one exists
    pub fn parent(&self) -> Option<&Context<'a>> {
        self.parent
    }

    /// Look up a value in this frame only
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Integer convenience lookup in this frame
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    /// Record a value in this frame
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name, value);
    }

    /// The named values recorded in this frame
    pub fn values(&self) -> &Container {
        &self.values
    }
}

/// How a parse call should deliver its result
pub enum ParseMode<'o> {
    /// Produce and return an own value
    Normal,
    /// Populate the given container directly; used when a parent struct
    /// embeds this one
    Embed(&'o mut Container),
}

/// How a build call receives its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// The value belongs to this construct alone
    Normal,
    /// The value is the parent's whole container and no new context frame
    /// should be introduced
    Embedded,
}

/// A boxed descriptor, the unit of composition
pub type BoxedConstruct = Box<dyn Construct>;

/// The polymorphic contract every layout descriptor satisfies.
///
/// Implementors provide `parse_from`, `build_into` and `size_from`; callers
/// use the provided [`parse`](Construct::parse), [`build`](Construct::build)
/// and [`sizeof`](Construct::sizeof) drivers, which allocate the per-call
/// cursor, buffer and root context.
pub trait Construct: Send + Sync {
    /// The descriptor's name, or `None` for anonymous fields such as padding
    fn name(&self) -> Option<&str>;

    /// Behavioral flags; wrappers report their child's flags
    fn flags(&self) -> Flags {
        Flags::NONE
    }

    /// Parse a value from the stream with the given context and mode
    fn parse_from(
        &self,
        stream: &mut ReadStream<'_>,
        ctx: &mut Context<'_>,
        mode: ParseMode<'_>,
    ) -> Result<Value>;

    /// Write the value's byte rendition to the output buffer
    fn build_into(
        &self,
        value: &Value,
        out: &mut WriteStream,
        ctx: &mut Context<'_>,
        mode: BuildMode,
    ) -> Result<()>;

    /// The serialized size in bytes under the given context.
    ///
    /// Data-dependent descriptors fail here when the context lacks the
    /// values their size derives from.
    fn size_from(&self, ctx: &Context<'_>) -> Result<usize>;

    /// Parse a fully materialized input buffer
    fn parse(&self, data: &[u8]) -> Result<Value> {
        let mut stream = ReadStream::new(data);
        let mut ctx = Context::new();
        self.parse_from(&mut stream, &mut ctx, ParseMode::Normal)
    }

    /// Parse text, taking each char as one byte (latin-1)
    fn parse_text(&self, text: &str) -> Result<Value> {
        self.parse(&latin1_bytes(text)?)
    }

    /// Build a value into a fresh byte buffer
    fn build(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = WriteStream::new();
        let mut ctx = Context::new();
        self.build_into(value, &mut out, &mut ctx, BuildMode::Normal)?;
        Ok(out.into_bytes())
    }

    /// Serialized size with a fresh, empty context
    fn sizeof(&self) -> Result<usize> {
        self.sizeof_with(&Context::new())
    }

    /// Serialized size under `ctx`; any failure is wrapped as a size error
    fn sizeof_with(&self, ctx: &Context<'_>) -> Result<usize> {
        self.size_from(ctx).map_err(|e| Error::Sizeof {
            source: Box::new(e),
        })
    }
}

/// Validate a descriptor name at construction.
///
/// `"_"` and names starting with `"<"` are reserved; empty names are
/// rejected. `None` stands for an anonymous field and is always accepted.
pub(crate) fn checked_name(name: Option<&str>) -> Result<Option<String>> {
    match name {
        None => Ok(None),
        Some(n) if n.is_empty() => Err(Error::value("name must not be empty")),
        Some(n) if n == "_" || n.starts_with('<') => {
            Err(Error::value(format!("reserved name {n:?}")))
        }
        Some(n) => Ok(Some(n.to_string())),
    }
}

/// A value transformation applied around a wrapped descriptor.
///
/// `decode` runs after the child parses; `encode` runs before the child
/// builds. Transforms never touch the stream; the child does all I/O.
pub trait Transform: Send + Sync {
    fn decode(&self, obj: Value, ctx: &Context<'_>) -> Result<Value>;
    fn encode(&self, obj: Value, ctx: &Context<'_>) -> Result<Value>;
}

/// Subconstruct inserting a [`Transform`] between caller and child.
///
/// Name, flags and size pass through from the child unchanged.
pub struct Adapter<T: Transform> {
    child: BoxedConstruct,
    transform: T,
}

impl<T: Transform> Adapter<T> {
    pub fn new(child: BoxedConstruct, transform: T) -> Self {
        Self { child, transform }
    }

    /// The wrapped descriptor
    pub fn child(&self) -> &dyn Construct {
        self.child.as_ref()
    }
}

impl<T: Transform> Construct for Adapter<T> {
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
        self.transform.decode(obj, ctx)
    }

    fn build_into(
        &self,
        value: &Value,
        out: &mut WriteStream,
        ctx: &mut Context<'_>,
        mode: BuildMode,
    ) -> Result<()> {
        let encoded = self.transform.encode(value.clone(), ctx)?;
        self.child.build_into(&encoded, out, ctx, mode)
    }

    fn size_from(&self, ctx: &Context<'_>) -> Result<usize> {
        self.child.size_from(ctx)
    }
}

/// The do-nothing descriptor.
///
/// Parses to [`Value::Null`], writes nothing, and has size zero. Useful as
/// a default branch and as the pass-through sentinel in mapping defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pass;

impl Construct for Pass {
    fn name(&self) -> Option<&str> {
        None
    }

    fn parse_from(
        &self,
        _stream: &mut ReadStream<'_>,
        _ctx: &mut Context<'_>,
        _mode: ParseMode<'_>,
    ) -> Result<Value> {
        Ok(Value::Null)
    }

    fn build_into(
        &self,
        _value: &Value,
        _out: &mut WriteStream,
        _ctx: &mut Context<'_>,
        _mode: BuildMode,
    ) -> Result<()> {
        Ok(())
    }

    fn size_from(&self, _ctx: &Context<'_>) -> Result<usize> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_rejected() {
        assert!(checked_name(Some("_")).is_err());
        assert!(checked_name(Some("<obj>")).is_err());
        assert!(checked_name(Some("<")).is_err());
        assert!(checked_name(Some("")).is_err());
        assert_eq!(checked_name(Some("len")).unwrap(), Some("len".to_string()));
        assert_eq!(checked_name(None).unwrap(), None);
    }

    #[test]
    fn flag_algebra() {
        let f = Flags::EMBED | Flags::DYNAMIC;
        assert!(f.contains(Flags::EMBED));
        assert!(f.contains(Flags::DYNAMIC));
        assert!(!f.contains(Flags::NESTING));
        assert!(f.contains(Flags::NONE));
        assert_eq!(f.without(Flags::EMBED), Flags::DYNAMIC);
    }

    #[test]
    fn context_frames_link_to_parents() {
        let mut root = Context::new();
        root.set("outer", 1);
        let mut mid = root.nest();
        mid.set("inner", 2);
        let leaf = mid.nest();

        assert_eq!(leaf.get("inner"), None);
        assert_eq!(leaf.parent().unwrap().get_int("inner"), Some(2));
        assert_eq!(
            leaf.parent().unwrap().parent().unwrap().get_int("outer"),
            Some(1)
        );
        assert!(leaf.parent().unwrap().parent().unwrap().parent().is_none());
    }

    #[test]
    fn pass_is_inert() {
        assert_eq!(Pass.parse(b"anything").unwrap(), Value::Null);
        assert_eq!(Pass.build(&Value::Null).unwrap(), Vec::<u8>::new());
        assert_eq!(Pass.sizeof().unwrap(), 0);
    }
}
