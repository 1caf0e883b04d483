//! # binform
//!
//! Declarative parsing and building of binary data. A layout is described
//! once by composing small descriptors ("constructs"); the same description
//! drives both directions — parsing bytes into structured values and
//! building values back into bytes — plus a size query.
//!
//! ## Parsing and building
//!
//! ```rust
//! use binform::factory::{struct_of, ubint8, ubint16};
//! use binform::{container, Construct, Value};
//!
//! let header = struct_of("header", vec![ubint8("version")?, ubint16("length")?])?;
//!
//! let parsed = header.parse(&[0x02, 0x00, 0x2A])?;
//! assert_eq!(
//!     parsed,
//!     Value::Container(container! { "version" => 2, "length" => 42 })
//! );
//!
//! let bytes = header.build(&parsed)?;
//! assert_eq!(bytes, vec![0x02, 0x00, 0x2A]);
//! # Ok::<(), binform::Error>(())
//! ```
//!
//! ## Bit-level layouts
//!
//! ```rust
//! use binform::factory::{bit_field, bit_struct, flag, padding};
//! use binform::{Construct, Value};
//!
//! let header = bit_struct(
//!     "header",
//!     vec![bit_field("version", 3)?, flag("secure")?, padding(3)?, bit_field("kind", 9)?],
//! )?;
//! let parsed = header.parse(&[0b1010_0001, 0b0000_0011])?;
//! let c = parsed.as_container().unwrap();
//! assert_eq!(c.get("version"), Some(&Value::Int(5)));
//! assert_eq!(c.get("secure"), Some(&Value::Bool(false)));
//! # Ok::<(), binform::Error>(())
//! ```
//!
//! Descriptors are immutable after construction and safe to share across
//! threads; every parse or build call owns its cursor, output buffer and
//! context frames.

pub mod adapters;
pub mod bits;
pub mod buffered;
pub mod construct;
pub mod container;
pub mod error;
pub mod factory;
pub mod field;
pub mod packer;
pub mod stream;
pub mod structure;
pub mod value;

pub use adapters::{
    BitInteger, CompactInt, ConstValue, Expr, HexDump, MapDefault, Mapping, PaddingAdapter,
    Validator,
};
pub use buffered::Buffered;
pub use construct::{
    Adapter, BoxedConstruct, BuildMode, Construct, Context, Flags, ParseMode, Pass, Transform,
};
pub use container::Container;
pub use error::{Error, Result};
pub use field::{ComputedField, FormatField, StaticField};
pub use packer::{Endian, Packer};
pub use stream::{ReadStream, WriteStream};
pub use structure::{Embedded, Struct};
pub use value::Value;
