//! Expression body encoder.
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! expression := tag:u8 payload
//!   0 bool     byte 0 or 1
//!   1 long     i64
//!   2 double   f64
//!   3 string   len:u32 utf8
//!   4 symbol   len:u32 utf8
//!   5 complex  head:(len:u32 utf8) dynamics:u32 spans:u32 expression* span*
//! span := element_tag:u8 count:u32 payload
//!   bool: one byte per element, long/double: 8 bytes per element,
//!   string/symbol: len:u32 utf8 per element
//! ```
//!
//! Complex nodes nest at most [`MAX_DEPTH`] levels deep.

use super::error::{SerializationError, SerializationResult};
use crate::expression::{
    ComplexExpression, Expression, ExpressionSpanArgument, FixedWidthElement, Span,
};
use bytes::{BufMut, BytesMut};

pub const TAG_BOOL: u8 = 0;
pub const TAG_INT64: u8 = 1;
pub const TAG_DOUBLE: u8 = 2;
pub const TAG_STRING: u8 = 3;
pub const TAG_SYMBOL: u8 = 4;
pub const TAG_COMPLEX: u8 = 5;

/// Deepest nesting of complex nodes the format carries. The encoder and
/// the decoder both reject anything deeper with
/// [`SerializationError::TooDeep`].
pub const MAX_DEPTH: usize = 512;

fn put_len(out: &mut BytesMut, len: usize, context: &'static str) -> SerializationResult<()> {
    let len = u32::try_from(len).map_err(|_| SerializationError::TooLarge { context, len })?;
    out.put_u32_le(len);
    Ok(())
}

fn put_str(out: &mut BytesMut, s: &str, context: &'static str) -> SerializationResult<()> {
    put_len(out, s.len(), context)?;
    out.put_slice(s.as_bytes());
    Ok(())
}

fn put_fixed<T: FixedWidthElement>(out: &mut BytesMut, span: &Span<T>) {
    out.reserve(span.len() * T::WIDTH);
    for value in span.iter() {
        value.encode(out);
    }
}

/// Append the encoding of `expr` to `out`.
pub fn encode_expression(expr: &Expression, out: &mut BytesMut) -> SerializationResult<()> {
    encode_nested(expr, out, 0)
}

fn encode_nested(expr: &Expression, out: &mut BytesMut, depth: usize) -> SerializationResult<()> {
    match expr {
        Expression::Bool(b) => {
            out.put_u8(TAG_BOOL);
            out.put_u8(u8::from(*b));
        }
        Expression::Int64(i) => {
            out.put_u8(TAG_INT64);
            out.put_i64_le(*i);
        }
        Expression::Double(d) => {
            out.put_u8(TAG_DOUBLE);
            out.put_f64_le(*d);
        }
        Expression::String(s) => {
            out.put_u8(TAG_STRING);
            put_str(out, s, "string")?;
        }
        Expression::Symbol(s) => {
            out.put_u8(TAG_SYMBOL);
            put_str(out, s.name(), "symbol")?;
        }
        Expression::Complex(c) => {
            if depth >= MAX_DEPTH {
                return Err(SerializationError::TooDeep { depth: depth + 1 });
            }
            out.put_u8(TAG_COMPLEX);
            encode_complex(c, out, depth + 1)?;
        }
        Expression::Extension(x) => match *x {},
    }
    Ok(())
}

fn encode_complex(
    c: &ComplexExpression,
    out: &mut BytesMut,
    depth: usize,
) -> SerializationResult<()> {
    put_str(out, c.head().name(), "head")?;
    put_len(out, c.dynamic_arguments().len(), "dynamic argument count")?;
    put_len(out, c.span_arguments().len(), "span argument count")?;
    for argument in c.dynamic_arguments() {
        encode_nested(argument, out, depth)?;
    }
    for span in c.span_arguments() {
        encode_span(span, out)?;
    }
    Ok(())
}

fn encode_span(span: &ExpressionSpanArgument, out: &mut BytesMut) -> SerializationResult<()> {
    match span {
        ExpressionSpanArgument::Bool(s) => {
            out.put_u8(TAG_BOOL);
            put_len(out, s.len(), "span")?;
            put_fixed(out, s);
        }
        ExpressionSpanArgument::Int64(s) => {
            out.put_u8(TAG_INT64);
            put_len(out, s.len(), "span")?;
            put_fixed(out, s);
        }
        ExpressionSpanArgument::Double(s) => {
            out.put_u8(TAG_DOUBLE);
            put_len(out, s.len(), "span")?;
            put_fixed(out, s);
        }
        ExpressionSpanArgument::String(s) => {
            out.put_u8(TAG_STRING);
            put_len(out, s.len(), "span")?;
            for value in s.iter() {
                put_str(out, &value, "string")?;
            }
        }
        ExpressionSpanArgument::Symbol(s) => {
            out.put_u8(TAG_SYMBOL);
            put_len(out, s.len(), "span")?;
            for value in s.iter() {
                put_str(out, value.name(), "symbol")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex;

    #[test]
    fn test_encode_atoms() -> SerializationResult<()> {
        let mut out = BytesMut::new();
        encode_expression(&Expression::from(true), &mut out)?;
        assert_eq!(&out[..], &[TAG_BOOL, 1]);

        let mut out = BytesMut::new();
        encode_expression(&Expression::from(258), &mut out)?;
        assert_eq!(&out[..], &[TAG_INT64, 2, 1, 0, 0, 0, 0, 0, 0]);

        let mut out = BytesMut::new();
        encode_expression(&Expression::from("hi"), &mut out)?;
        assert_eq!(&out[..], &[TAG_STRING, 2, 0, 0, 0, b'h', b'i']);
        Ok(())
    }

    #[test]
    fn test_encode_complex_layout() -> SerializationResult<()> {
        let mut out = BytesMut::new();
        encode_expression(&Expression::from(complex!("F", false)), &mut out)?;
        assert_eq!(
            &out[..],
            &[TAG_COMPLEX, 1, 0, 0, 0, b'F', 1, 0, 0, 0, 0, 0, 0, 0, TAG_BOOL, 0]
        );
        Ok(())
    }

    #[test]
    fn test_encode_span_layout() -> SerializationResult<()> {
        let e = ComplexExpression::with_spans(
            crate::expression::Symbol::new("S"),
            vec![Span::from_vec(vec![true, false]).into()],
        );
        let mut out = BytesMut::new();
        encode_expression(&Expression::from(e), &mut out)?;
        assert_eq!(
            &out[..],
            &[
                TAG_COMPLEX, 1, 0, 0, 0, b'S', 0, 0, 0, 0, 1, 0, 0, 0, TAG_BOOL, 2, 0, 0, 0, 1, 0
            ]
        );
        Ok(())
    }

    fn nested(depth: usize) -> Expression {
        let mut expr = Expression::from(true);
        for _ in 0..depth {
            expr = complex!("N", expr).into();
        }
        expr
    }

    #[test]
    fn test_encode_depth_limit() {
        let mut out = BytesMut::new();
        assert!(encode_expression(&nested(MAX_DEPTH), &mut out).is_ok());

        let mut out = BytesMut::new();
        assert!(matches!(
            encode_expression(&nested(MAX_DEPTH + 1), &mut out),
            Err(SerializationError::TooDeep { depth }) if depth == MAX_DEPTH + 1
        ));
    }
}
