//! Binary wire format for expressions.
//!
//! A serialized expression is a [`WireHeader`] followed by the encoded body.
//! It can be turned back into an expression eagerly (fully owned, independent
//! of the buffer) or lazily (bulk span payloads reference the buffer, which
//! stays alive as long as any such span does).

pub mod decode;
pub mod encode;
pub mod error;
pub mod header;

pub use encode::MAX_DEPTH;
pub use error::{SerializationError, SerializationResult};
pub use header::{WireHeader, FORMAT_VERSION, HEADER_SIZE, MAGIC};

use crate::expression::Expression;
use bytes::{BufMut, Bytes, BytesMut};
use decode::Decoder;
use log::debug;
use std::fs;
use std::path::Path;

/// An expression in wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedExpression {
    buffer: Bytes,
}

impl SerializedExpression {
    /// Serialize `expr`, consuming it.
    pub fn new(expr: Expression) -> SerializationResult<Self> {
        let mut body = BytesMut::new();
        encode::encode_expression(&expr, &mut body)?;

        let header = WireHeader::new(body.len() as u64).encode()?;
        let mut buffer = BytesMut::with_capacity(header.len() + body.len());
        buffer.put_slice(&header);
        buffer.put_slice(&body);
        debug!("serialized {} expression into {} bytes", expr.type_name(), buffer.len());
        Ok(Self {
            buffer: buffer.freeze(),
        })
    }

    /// Wrap a buffer received from elsewhere. The header is checked here;
    /// the body is checked when it is decoded.
    pub fn from_bytes(buffer: impl Into<Bytes>) -> SerializationResult<Self> {
        let buffer = buffer.into();
        let header = WireHeader::decode(&buffer)?;
        let actual = buffer.len() - HEADER_SIZE;
        if header.body_len != actual as u64 {
            return Err(SerializationError::LengthMismatch {
                declared: header.body_len,
                actual,
            });
        }
        Ok(Self { buffer })
    }

    pub fn header(&self) -> SerializationResult<WireHeader> {
        WireHeader::decode(&self.buffer)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Bytes {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn body(&self) -> Bytes {
        self.buffer.slice(HEADER_SIZE..)
    }

    /// Fully materialised copy of the expression.
    pub fn deserialize(&self) -> SerializationResult<Expression> {
        Decoder::new(self.body(), false).decode()
    }

    /// Expression whose bool, long and double spans are views into this
    /// buffer.
    pub fn lazily_deserialize(&self) -> SerializationResult<Expression> {
        Decoder::new(self.body(), true).decode()
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> SerializationResult<()> {
        fs::write(path.as_ref(), &self.buffer)?;
        debug!(
            "wrote {} bytes to {}",
            self.buffer.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    pub fn read_from(path: impl AsRef<Path>) -> SerializationResult<Self> {
        let buffer = fs::read(path.as_ref())?;
        Self::from_bytes(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex;
    use crate::expression::{CloneReason, ComplexExpression, Span, Symbol};

    fn mixed() -> Expression {
        let mut c = ComplexExpression::from_parts(
            Symbol::new("Mixed"),
            (),
            vec![Expression::from(1.5), Expression::from("text")],
            vec![
                Span::from_vec(vec![1i64, 2, 3]).into(),
                Span::from_vec(vec![0.25, 0.5]).into(),
                Span::from_vec(vec![true, false, true]).into(),
                Span::from_vec(vec!["a".to_string(), "bc".to_string()]).into(),
                Span::from_vec(vec![Symbol::new("s")]).into(),
            ],
        );
        c.dynamic_arguments_mut()
            .push(Expression::from(complex!("Nested", complex!("Deeper", -7))));
        Expression::from(c)
    }

    #[test]
    fn test_round_trip_mixed() -> SerializationResult<()> {
        let expr = mixed();
        let serialized = SerializedExpression::new(expr.clone(CloneReason::ForTesting))?;
        assert_eq!(serialized.deserialize()?, expr);
        assert_eq!(serialized.lazily_deserialize()?, expr);
        Ok(())
    }

    #[test]
    fn test_lazy_outlives_serialized() -> SerializationResult<()> {
        let lazy = SerializedExpression::new(mixed())?.lazily_deserialize()?;
        assert_eq!(lazy, mixed());
        Ok(())
    }

    #[test]
    fn test_from_bytes_checks_length() -> SerializationResult<()> {
        let bytes = SerializedExpression::new(Expression::from(5))?.into_bytes();
        let mut longer = bytes.to_vec();
        longer.push(0);
        assert!(matches!(
            SerializedExpression::from_bytes(longer),
            Err(SerializationError::LengthMismatch {
                declared: 9,
                actual: 10
            })
        ));
        let shorter = bytes.slice(..bytes.len() - 1);
        assert!(matches!(
            SerializedExpression::from_bytes(shorter),
            Err(SerializationError::LengthMismatch { .. })
        ));
        assert_eq!(
            SerializedExpression::from_bytes(bytes)?.deserialize()?,
            Expression::Int64(5)
        );
        Ok(())
    }

    #[test]
    fn test_mutating_lazy_span_leaves_buffer() -> SerializationResult<()> {
        let serialized = SerializedExpression::new(mixed())?;
        let Expression::Complex(mut lazy) = serialized.lazily_deserialize()? else {
            panic!("expected a complex expression");
        };
        if let crate::expression::ExpressionSpanArgument::Int64(span) =
            &mut lazy.span_arguments_mut()[0]
        {
            assert!(span.is_mapped());
            span.make_mut()[0] = 100;
            assert!(!span.is_mapped());
        }
        assert_eq!(serialized.deserialize()?, mixed());
        Ok(())
    }
}
