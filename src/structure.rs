//! Struct composition: ordered sequences of named subconstructs

use crate::construct::{
    checked_name, BoxedConstruct, BuildMode, Construct, Context, Flags, ParseMode,
};
use crate::container::Container;
use crate::error::Result;
use crate::stream::{ReadStream, WriteStream};
use crate::value::Value;
use tracing::trace;

/// An ordered sequence of named subconstructs, parsed and built in
/// declaration order.
///
/// Each named child's parsed value lands in the output container and in the
/// current context frame, so later children can reference earlier ones.
/// Anonymous children (padding, alignment) do their I/O but contribute no
/// entry. A nested struct introduces a fresh context frame whose parent is
/// the enclosing frame.
///
/// ```
/// use binform::factory::{struct_of, ubint8, ubint16};
/// use binform::{container, Construct, Value};
///
/// let header = struct_of(
///     "header",
///     vec![ubint8("version")?, ubint16("length")?],
/// )?;
/// let parsed = header.parse(&[0x02, 0x00, 0x10])?;
/// assert_eq!(
///     parsed,
///     Value::Container(container! { "version" => 2, "length" => 16 })
/// );
/// # Ok::<(), binform::Error>(())
/// ```
pub struct Struct {
    name: Option<String>,
    children: Vec<BoxedConstruct>,
    nested: bool,
}

impl Struct {
    /// Create a struct that nests its context (the default)
    pub fn new(name: Option<&str>, children: Vec<BoxedConstruct>) -> Result<Self> {
        Self::with_nesting(name, children, true)
    }

    /// Create a struct, choosing whether it introduces a context frame
    pub fn with_nesting(
        name: Option<&str>,
        children: Vec<BoxedConstruct>,
        nested: bool,
    ) -> Result<Self> {
        Ok(Self {
            name: checked_name(name)?,
            children,
            nested,
        })
    }

    fn parse_children(
        &self,
        stream: &mut ReadStream<'_>,
        ctx: &mut Context<'_>,
        obj: &mut Container,
    ) -> Result<()> {
        for child in &self.children {
            if child.flags().contains(Flags::EMBED) {
                child.parse_from(stream, ctx, ParseMode::Embed(obj))?;
            } else if let Some(name) = child.name() {
                trace!(field = name, "parsing struct field");
                let sub = child.parse_from(stream, ctx, ParseMode::Normal)?;
                obj.insert(name, sub.clone());
                ctx.set(name, sub);
            } else {
                child.parse_from(stream, ctx, ParseMode::Normal)?;
            }
        }
        Ok(())
    }

    fn build_children(
        &self,
        value: &Value,
        out: &mut WriteStream,
        ctx: &mut Context<'_>,
    ) -> Result<()> {
        for child in &self.children {
            if child.flags().contains(Flags::EMBED) {
                // The embedded struct consumes the whole current value.
                child.build_into(value, out, ctx, BuildMode::Embedded)?;
                continue;
            }
            let Some(name) = child.name() else {
                child.build_into(&Value::Null, out, ctx, BuildMode::Normal)?;
                continue;
            };
            if let Value::Container(container) = value {
                let sub = container.get(name).cloned().unwrap_or(Value::Null);
                ctx.set(name, sub.clone());
                trace!(field = name, "building struct field");
                child.build_into(&sub, out, ctx, BuildMode::Normal)?;
            }
            // A non-container value for a named child is skipped silently.
        }
        Ok(())
    }

    fn children_size(&self, ctx: &Context<'_>) -> Result<usize> {
        let mut sum = 0;
        for child in &self.children {
            sum += child.size_from(ctx)?;
        }
        Ok(sum)
    }
}

impl Construct for Struct {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parse_from(
        &self,
        stream: &mut ReadStream<'_>,
        ctx: &mut Context<'_>,
        mode: ParseMode<'_>,
    ) -> Result<Value> {
        match mode {
            // Executing an embed on behalf of a parent: populate the
            // parent's container within the parent's frame.
            ParseMode::Embed(obj) => {
                self.parse_children(stream, ctx, obj)?;
                Ok(Value::Null)
            }
            ParseMode::Normal => {
                let mut obj = Container::new();
                if self.nested {
                    let mut frame = ctx.nest();
                    self.parse_children(stream, &mut frame, &mut obj)?;
                } else {
                    self.parse_children(stream, ctx, &mut obj)?;
                }
                Ok(Value::Container(obj))
            }
        }
    }

    fn build_into(
        &self,
        value: &Value,
        out: &mut WriteStream,
        ctx: &mut Context<'_>,
        mode: BuildMode,
    ) -> Result<()> {
        match mode {
            BuildMode::Embedded => self.build_children(value, out, ctx),
            BuildMode::Normal if self.nested => {
                let mut frame = ctx.nest();
                self.build_children(value, out, &mut frame)
            }
            BuildMode::Normal => self.build_children(value, out, ctx),
        }
    }

    fn size_from(&self, ctx: &Context<'_>) -> Result<usize> {
        if self.nested {
            self.children_size(&ctx.nest())
        } else {
            self.children_size(ctx)
        }
    }
}

/// Marks a child struct's fields for inclusion directly in the enclosing
/// struct's container.
///
/// Forwards everything to the wrapped descriptor and adds the embed flag;
/// the wrapped descriptor is expected to be a [`Struct`] or an adapter over
/// one.
pub struct Embedded {
    child: BoxedConstruct,
}

impl Embedded {
    pub fn new(child: BoxedConstruct) -> Self {
        Self { child }
    }
}

impl Construct for Embedded {
    fn name(&self) -> Option<&str> {
        self.child.name()
    }

    fn flags(&self) -> Flags {
        self.child.flags() | Flags::EMBED
    }

    fn parse_from(
        &self,
        stream: &mut ReadStream<'_>,
        ctx: &mut Context<'_>,
        mode: ParseMode<'_>,
    ) -> Result<Value> {
        self.child.parse_from(stream, ctx, mode)
    }

    fn build_into(
        &self,
        value: &Value,
        out: &mut WriteStream,
        ctx: &mut Context<'_>,
        mode: BuildMode,
    ) -> Result<()> {
        self.child.build_into(value, out, ctx, mode)
    }

    fn size_from(&self, ctx: &Context<'_>) -> Result<usize> {
        self.child.size_from(ctx)
    }
}
