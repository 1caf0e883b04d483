//! Buffered: an encoded intermediate view between stream and subconstruct

use crate::construct::{BoxedConstruct, BuildMode, Construct, Context, Flags, ParseMode};
use crate::error::{Error, Result};
use crate::stream::{ReadStream, WriteStream};
use crate::value::Value;
use tracing::debug;

/// Byte-buffer codec function used by [`Buffered`]
pub type CodecFn = Box<dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync>;

/// Maps the inner construct's size to the outer on-wire size
pub type ResizeFn = Box<dyn Fn(usize) -> Result<usize> + Send + Sync>;

/// Materializes an intermediate byte buffer so the wrapped construct sees an
/// encoded/decoded view of the stream.
///
/// On parse, `resizer(child size)` raw bytes are read and run through the
/// decoder before the child parses them. On build, the child builds into a
/// scratch buffer which the encoder maps back to raw bytes; the encoded
/// length must equal the resized size, so encoders have to be
/// length-preserving under the resizer.
///
/// The classic use is bit-level access: the decoder explodes bytes into a
/// byte-per-bit buffer and the resizer divides the bit count by eight.
/// Offset-based constructs must not be used inside a `Buffered`; the inner
/// buffer has no position mapping back to the outer stream.
pub struct Buffered {
    child: BoxedConstruct,
    encoder: CodecFn,
    decoder: CodecFn,
    resizer: ResizeFn,
}

impl Buffered {
    /// Wrap `child` with an encoder (applied after building), a decoder
    /// (applied before parsing) and a size mapping
    pub fn new(child: BoxedConstruct, encoder: CodecFn, decoder: CodecFn, resizer: ResizeFn) -> Self {
        Self {
            child,
            encoder,
            decoder,
            resizer,
        }
    }
}

impl Construct for Buffered {
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
        let size = self.size_from(ctx)?;
        let raw = stream.read_exact(size)?;
        let decoded = (self.decoder)(raw)?;
        debug!(raw = size, decoded = decoded.len(), "buffered parse");
        let mut inner = ReadStream::new(&decoded);
        self.child.parse_from(&mut inner, ctx, mode)
    }

    fn build_into(
        &self,
        value: &Value,
        out: &mut WriteStream,
        ctx: &mut Context<'_>,
        mode: BuildMode,
    ) -> Result<()> {
        let size = self.size_from(ctx)?;
        let mut scratch = WriteStream::new();
        self.child.build_into(value, &mut scratch, ctx, mode)?;
        let encoded = (self.encoder)(scratch.as_bytes())?;
        if encoded.len() != size {
            return Err(Error::FieldSize {
                expected: size,
                actual: encoded.len(),
            });
        }
        out.write_exact(size, &encoded)
    }

    fn size_from(&self, ctx: &Context<'_>) -> Result<usize> {
        (self.resizer)(self.child.size_from(ctx)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::StaticField;

    /// Identity-codec Buffered around a raw field
    fn passthrough(length: usize) -> Buffered {
        Buffered::new(
            Box::new(StaticField::new(Some("body"), length).unwrap()),
            Box::new(|data| Ok(data.to_vec())),
            Box::new(|data| Ok(data.to_vec())),
            Box::new(|size| Ok(size)),
        )
    }

    #[test]
    fn identity_codec_round_trips() {
        let b = passthrough(3);
        let v = b.parse(&[1, 2, 3]).unwrap();
        assert_eq!(v, Value::Bytes(vec![1, 2, 3]));
        assert_eq!(b.build(&v).unwrap(), vec![1, 2, 3]);
        assert_eq!(b.sizeof().unwrap(), 3);
    }

    #[test]
    fn length_changing_encoder_is_rejected() {
        let b = Buffered::new(
            Box::new(StaticField::new(Some("body"), 2).unwrap()),
            Box::new(|data| {
                let mut grown = data.to_vec();
                grown.push(0);
                Ok(grown)
            }),
            Box::new(|data| Ok(data.to_vec())),
            Box::new(|size| Ok(size)),
        );
        assert!(matches!(
            b.build(&Value::Bytes(vec![1, 2])),
            Err(Error::FieldSize { .. })
        ));
    }
}
