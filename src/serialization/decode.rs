//! Expression body decoder.
//!
//! The eager mode copies every value out of the buffer. The lazy mode maps
//! bool, long and double span payloads straight over the buffer (a
//! `Bytes::split_to` shares the allocation), everything else is copied.

use super::encode::{
    MAX_DEPTH, TAG_BOOL, TAG_COMPLEX, TAG_DOUBLE, TAG_INT64, TAG_STRING, TAG_SYMBOL,
};
use super::error::{SerializationError, SerializationResult};
use crate::expression::{
    ComplexExpression, Expression, ExpressionSpanArgument, FixedWidthElement, Span, Symbol,
};
use bytes::{Buf, Bytes};

pub struct Decoder {
    buf: Bytes,
    lazy: bool,
    depth: usize,
}

impl Decoder {
    pub fn new(body: Bytes, lazy: bool) -> Self {
        Self {
            buf: body,
            lazy,
            depth: 0,
        }
    }

    /// Decode exactly one expression; leftover bytes are an error.
    pub fn decode(mut self) -> SerializationResult<Expression> {
        let expr = self.expression()?;
        if self.buf.has_remaining() {
            return Err(SerializationError::TrailingBytes(self.buf.remaining()));
        }
        Ok(expr)
    }

    fn ensure(&self, needed: usize, context: &'static str) -> SerializationResult<()> {
        if self.buf.remaining() < needed {
            return Err(SerializationError::Truncated {
                context,
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    fn u8(&mut self, context: &'static str) -> SerializationResult<u8> {
        self.ensure(1, context)?;
        Ok(self.buf.get_u8())
    }

    fn len(&mut self, context: &'static str) -> SerializationResult<usize> {
        self.ensure(4, context)?;
        Ok(self.buf.get_u32_le() as usize)
    }

    fn bool(&mut self) -> SerializationResult<bool> {
        match self.u8("bool")? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SerializationError::InvalidBool(other)),
        }
    }

    fn string(&mut self, context: &'static str) -> SerializationResult<String> {
        let len = self.len(context)?;
        self.ensure(len, context)?;
        let bytes = self.buf.split_to(len);
        std::str::from_utf8(&bytes)
            .map(str::to_string)
            .map_err(|source| SerializationError::InvalidUtf8 { context, source })
    }

    fn expression(&mut self) -> SerializationResult<Expression> {
        let tag = self.u8("expression")?;
        Ok(match tag {
            TAG_BOOL => Expression::Bool(self.bool()?),
            TAG_INT64 => {
                self.ensure(8, "long")?;
                Expression::Int64(self.buf.get_i64_le())
            }
            TAG_DOUBLE => {
                self.ensure(8, "double")?;
                Expression::Double(self.buf.get_f64_le())
            }
            TAG_STRING => Expression::String(self.string("string")?),
            TAG_SYMBOL => Expression::Symbol(Symbol::from(self.string("symbol")?)),
            TAG_COMPLEX => Expression::Complex(self.complex()?),
            tag => {
                return Err(SerializationError::InvalidTag {
                    context: "expression",
                    tag,
                })
            }
        })
    }

    fn complex(&mut self) -> SerializationResult<ComplexExpression> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(SerializationError::TooDeep { depth: self.depth });
        }
        let head = Symbol::from(self.string("head")?);
        let dynamic_count = self.len("dynamic argument count")?;
        let span_count = self.len("span argument count")?;

        // Every argument takes at least one byte, so counts beyond the
        // remaining buffer are truncation and must not drive allocation.
        let mut dynamics = Vec::with_capacity(dynamic_count.min(self.buf.remaining()));
        for _ in 0..dynamic_count {
            dynamics.push(self.expression()?);
        }
        let mut spans = Vec::with_capacity(span_count.min(self.buf.remaining()));
        for _ in 0..span_count {
            spans.push(self.span()?);
        }
        self.depth -= 1;
        Ok(ComplexExpression::from_parts(head, (), dynamics, spans))
    }

    fn fixed<T: FixedWidthElement>(
        &mut self,
        count: usize,
        context: &'static str,
    ) -> SerializationResult<Span<T>> {
        let size = count
            .checked_mul(T::WIDTH)
            .ok_or(SerializationError::TooLarge { context, len: count })?;
        self.ensure(size, context)?;
        let payload = self.buf.split_to(size);
        if self.lazy {
            if let Some(span) = Span::mapped(payload.clone()) {
                return Ok(span);
            }
        }
        Ok(payload.chunks_exact(T::WIDTH).map(T::decode).collect())
    }

    fn span(&mut self) -> SerializationResult<ExpressionSpanArgument> {
        let tag = self.u8("span")?;
        let count = self.len("span element count")?;
        Ok(match tag {
            TAG_BOOL => {
                self.ensure(count, "bool span")?;
                if let Some(&bad) = self.buf[..count].iter().find(|&&b| b > 1) {
                    return Err(SerializationError::InvalidBool(bad));
                }
                self.fixed::<bool>(count, "bool span")?.into()
            }
            TAG_INT64 => self.fixed::<i64>(count, "long span")?.into(),
            TAG_DOUBLE => self.fixed::<f64>(count, "double span")?.into(),
            TAG_STRING => {
                let mut values = Vec::with_capacity(count.min(self.buf.remaining()));
                for _ in 0..count {
                    values.push(self.string("string span")?);
                }
                Span::from_vec(values).into()
            }
            TAG_SYMBOL => {
                let mut values = Vec::with_capacity(count.min(self.buf.remaining()));
                for _ in 0..count {
                    values.push(Symbol::from(self.string("symbol span")?));
                }
                Span::from_vec(values).into()
            }
            tag => {
                return Err(SerializationError::InvalidTag {
                    context: "span",
                    tag,
                })
            }
        })
    }
}
