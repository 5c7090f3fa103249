//! Spans: contiguous, homogeneous runs of values used for bulk (columnar)
//! arguments of complex expressions.
//!
//! A span is either *owned* (a shared, reference-counted vector plus a window
//! into it) or *mapped* (a window over a packed little-endian byte buffer,
//! typically a serialized expression). Readers cannot tell the two apart.
//! Mapped spans keep their buffer alive through the `Bytes` reference count
//! and are never written to: mutation first materialises an owned copy.
//!
//! Indexing outside `[0, len)` and out-of-range subspans are programming
//! errors and panic.

use crate::expression::Symbol;
use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Element types that can live in a span.
pub trait SpanElement: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Name used in type-mismatch messages.
    const TYPE_NAME: &'static str;

    fn element_ref(value: Cow<'_, Self>) -> ElementRef<'_>;

    fn into_span_argument(span: Span<Self>) -> ExpressionSpanArgument;
}

/// Elements with a fixed-width little-endian encoding. Only these can be
/// mapped directly over a byte buffer.
pub trait FixedWidthElement: SpanElement {
    const WIDTH: usize;

    fn decode(bytes: &[u8]) -> Self;

    fn encode(&self, out: &mut BytesMut);
}

/// One element of a span, viewed without knowing the span's element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementRef<'a> {
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(Cow<'a, str>),
    Symbol(Cow<'a, Symbol>),
}

enum Storage<T> {
    Owned {
        data: Arc<Vec<T>>,
        offset: usize,
        len: usize,
    },
    Mapped {
        bytes: Bytes,
        width: usize,
        decode: fn(&[u8]) -> T,
    },
}

/// Contiguous homogeneous sequence of `T`.
pub struct Span<T: SpanElement> {
    storage: Storage<T>,
}

impl<T: SpanElement> Span<T> {
    pub fn from_vec(values: Vec<T>) -> Self {
        let len = values.len();
        Self {
            storage: Storage::Owned {
                data: Arc::new(values),
                offset: 0,
                len,
            },
        }
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Owned { len, .. } => *len,
            Storage::Mapped { bytes, width, .. } => bytes.len() / width,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this span references an external byte buffer.
    pub fn is_mapped(&self) -> bool {
        matches!(self.storage, Storage::Mapped { .. })
    }

    pub fn get(&self, index: usize) -> Option<Cow<'_, T>> {
        if index >= self.len() {
            return None;
        }
        Some(match &self.storage {
            Storage::Owned { data, offset, .. } => Cow::Borrowed(&data[offset + index]),
            Storage::Mapped {
                bytes,
                width,
                decode,
            } => {
                let start = index * width;
                Cow::Owned(decode(&bytes[start..start + width]))
            }
        })
    }

    /// Element at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn at(&self, index: usize) -> Cow<'_, T> {
        match self.get(index) {
            Some(value) => value,
            None => panic!(
                "span index {} out of range for span of length {}",
                index,
                self.len()
            ),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Cow<'_, T>> + '_ {
        (0..self.len()).map(move |i| self.at(i))
    }

    /// Borrow the elements as a slice. Mapped spans have no typed backing
    /// slice and return `None`.
    pub fn as_slice(&self) -> Option<&[T]> {
        match &self.storage {
            Storage::Owned { data, offset, len } => Some(&data[*offset..*offset + *len]),
            Storage::Mapped { .. } => None,
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().map(Cow::into_owned).collect()
    }

    /// A span over `len` elements starting at `offset`, sharing this span's
    /// backing storage.
    ///
    /// # Panics
    /// Panics unless `offset + len <= self.len()`.
    pub fn subspan(self, offset: usize, len: usize) -> Span<T> {
        let size = self.len();
        match offset.checked_add(len) {
            Some(end) if end <= size => {}
            _ => panic!(
                "subspan [{}, {}+{}) out of range for span of length {}",
                offset, offset, len, size
            ),
        }
        let storage = match self.storage {
            Storage::Owned {
                data,
                offset: base,
                ..
            } => Storage::Owned {
                data,
                offset: base + offset,
                len,
            },
            Storage::Mapped {
                bytes,
                width,
                decode,
            } => Storage::Mapped {
                bytes: bytes.slice(offset * width..(offset + len) * width),
                width,
                decode,
            },
        };
        Span { storage }
    }

    /// The tail of this span starting at `offset`.
    ///
    /// # Panics
    /// Panics if `offset > self.len()`.
    pub fn subspan_from(self, offset: usize) -> Span<T> {
        let size = self.len();
        if offset > size {
            panic!(
                "subspan offset {} out of range for span of length {}",
                offset, size
            );
        }
        self.subspan(offset, size - offset)
    }

    /// Mutable access to the elements.
    ///
    /// Shared storage is copied first, and mapped spans are materialised into
    /// owned storage, so neither the source buffer nor other holders ever
    /// observe the write.
    pub fn make_mut(&mut self) -> &mut [T] {
        if self.is_mapped() {
            self.storage = Span::from_vec(self.to_vec()).storage;
        }
        match &mut self.storage {
            Storage::Owned { data, offset, len } => {
                if Arc::strong_count(data) > 1 || data.len() != *len {
                    let window = data[*offset..*offset + *len].to_vec();
                    *data = Arc::new(window);
                    *offset = 0;
                }
                &mut Arc::make_mut(data)[..]
            }
            Storage::Mapped { .. } => unreachable!("mapped spans are materialised above"),
        }
    }

    /// Independent copy. Owned storage is shared copy-on-write; mapped spans
    /// are materialised so the copy no longer depends on the source buffer.
    pub fn clone_owned(&self) -> Span<T> {
        match &self.storage {
            Storage::Owned { data, offset, len } => Span {
                storage: Storage::Owned {
                    data: Arc::clone(data),
                    offset: *offset,
                    len: *len,
                },
            },
            Storage::Mapped { .. } => Span::from_vec(self.to_vec()),
        }
    }
}

impl<T: FixedWidthElement> Span<T> {
    /// Map a span over packed little-endian elements without copying them.
    /// Returns `None` if the buffer length is not a multiple of the element
    /// width.
    pub fn mapped(bytes: Bytes) -> Option<Self> {
        if bytes.len() % T::WIDTH != 0 {
            return None;
        }
        Some(Self {
            storage: Storage::Mapped {
                bytes,
                width: T::WIDTH,
                decode: T::decode,
            },
        })
    }
}

impl<T: SpanElement> From<Vec<T>> for Span<T> {
    fn from(values: Vec<T>) -> Self {
        Span::from_vec(values)
    }
}

impl<T: SpanElement> FromIterator<T> for Span<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Span::from_vec(iter.into_iter().collect())
    }
}

impl<T: SpanElement> PartialEq for Span<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: SpanElement> fmt::Debug for Span<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl SpanElement for bool {
    const TYPE_NAME: &'static str = "bool";

    fn element_ref(value: Cow<'_, Self>) -> ElementRef<'_> {
        ElementRef::Bool(*value)
    }

    fn into_span_argument(span: Span<Self>) -> ExpressionSpanArgument {
        ExpressionSpanArgument::Bool(span)
    }
}

impl FixedWidthElement for bool {
    const WIDTH: usize = 1;

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_u8(u8::from(*self));
    }
}

impl SpanElement for i64 {
    const TYPE_NAME: &'static str = "long";

    fn element_ref(value: Cow<'_, Self>) -> ElementRef<'_> {
        ElementRef::Int64(*value)
    }

    fn into_span_argument(span: Span<Self>) -> ExpressionSpanArgument {
        ExpressionSpanArgument::Int64(span)
    }
}

impl FixedWidthElement for i64 {
    const WIDTH: usize = 8;

    fn decode(bytes: &[u8]) -> Self {
        LittleEndian::read_i64(bytes)
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_i64_le(*self);
    }
}

impl SpanElement for f64 {
    const TYPE_NAME: &'static str = "double";

    fn element_ref(value: Cow<'_, Self>) -> ElementRef<'_> {
        ElementRef::Double(*value)
    }

    fn into_span_argument(span: Span<Self>) -> ExpressionSpanArgument {
        ExpressionSpanArgument::Double(span)
    }
}

impl FixedWidthElement for f64 {
    const WIDTH: usize = 8;

    fn decode(bytes: &[u8]) -> Self {
        LittleEndian::read_f64(bytes)
    }

    fn encode(&self, out: &mut BytesMut) {
        out.put_f64_le(*self);
    }
}

impl SpanElement for String {
    const TYPE_NAME: &'static str = "string";

    fn element_ref(value: Cow<'_, Self>) -> ElementRef<'_> {
        ElementRef::String(match value {
            Cow::Borrowed(s) => Cow::Borrowed(s.as_str()),
            Cow::Owned(s) => Cow::Owned(s),
        })
    }

    fn into_span_argument(span: Span<Self>) -> ExpressionSpanArgument {
        ExpressionSpanArgument::String(span)
    }
}

impl SpanElement for Symbol {
    const TYPE_NAME: &'static str = "Symbol";

    fn element_ref(value: Cow<'_, Self>) -> ElementRef<'_> {
        ElementRef::Symbol(value)
    }

    fn into_span_argument(span: Span<Self>) -> ExpressionSpanArgument {
        ExpressionSpanArgument::Symbol(span)
    }
}

/// A span argument of a complex expression: homogeneous within, but spans of
/// different element types can sit side by side in one expression.
#[derive(Debug, PartialEq)]
pub enum ExpressionSpanArgument {
    Bool(Span<bool>),
    Int64(Span<i64>),
    Double(Span<f64>),
    String(Span<String>),
    Symbol(Span<Symbol>),
}

/// Ordered span channel of a complex expression.
pub type ExpressionSpanArguments = Vec<ExpressionSpanArgument>;

impl ExpressionSpanArgument {
    pub fn len(&self) -> usize {
        match self {
            ExpressionSpanArgument::Bool(s) => s.len(),
            ExpressionSpanArgument::Int64(s) => s.len(),
            ExpressionSpanArgument::Double(s) => s.len(),
            ExpressionSpanArgument::String(s) => s.len(),
            ExpressionSpanArgument::Symbol(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type_name(&self) -> &'static str {
        match self {
            ExpressionSpanArgument::Bool(_) => bool::TYPE_NAME,
            ExpressionSpanArgument::Int64(_) => i64::TYPE_NAME,
            ExpressionSpanArgument::Double(_) => f64::TYPE_NAME,
            ExpressionSpanArgument::String(_) => String::TYPE_NAME,
            ExpressionSpanArgument::Symbol(_) => Symbol::TYPE_NAME,
        }
    }

    pub fn is_mapped(&self) -> bool {
        match self {
            ExpressionSpanArgument::Bool(s) => s.is_mapped(),
            ExpressionSpanArgument::Int64(s) => s.is_mapped(),
            ExpressionSpanArgument::Double(s) => s.is_mapped(),
            ExpressionSpanArgument::String(s) => s.is_mapped(),
            ExpressionSpanArgument::Symbol(s) => s.is_mapped(),
        }
    }

    pub fn element(&self, index: usize) -> Option<ElementRef<'_>> {
        match self {
            ExpressionSpanArgument::Bool(s) => s.get(index).map(bool::element_ref),
            ExpressionSpanArgument::Int64(s) => s.get(index).map(i64::element_ref),
            ExpressionSpanArgument::Double(s) => s.get(index).map(f64::element_ref),
            ExpressionSpanArgument::String(s) => s.get(index).map(String::element_ref),
            ExpressionSpanArgument::Symbol(s) => s.get(index).map(Symbol::element_ref),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.element(i))
    }

    pub fn clone_owned(&self) -> ExpressionSpanArgument {
        match self {
            ExpressionSpanArgument::Bool(s) => ExpressionSpanArgument::Bool(s.clone_owned()),
            ExpressionSpanArgument::Int64(s) => ExpressionSpanArgument::Int64(s.clone_owned()),
            ExpressionSpanArgument::Double(s) => ExpressionSpanArgument::Double(s.clone_owned()),
            ExpressionSpanArgument::String(s) => ExpressionSpanArgument::String(s.clone_owned()),
            ExpressionSpanArgument::Symbol(s) => ExpressionSpanArgument::Symbol(s.clone_owned()),
        }
    }
}

impl<T: SpanElement> From<Span<T>> for ExpressionSpanArgument {
    fn from(span: Span<T>) -> Self {
        T::into_span_argument(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(values: &[i64]) -> Bytes {
        let mut out = BytesMut::new();
        for v in values {
            v.encode(&mut out);
        }
        out.freeze()
    }

    #[test]
    fn test_subspan() {
        let input = Span::from_vec(vec![1i64, 2, 4, 3]);
        let sub = input.subspan(1, 3);
        assert_eq!(sub.len(), 3);
        assert_eq!(*sub.at(0), 2);
        assert_eq!(*sub.at(1), 4);
        assert_eq!(*sub.at(2), 3);

        let tail = Span::from_vec(vec![1i64, 2, 3, 2]).subspan_from(2);
        assert_eq!(tail.to_vec(), vec![3, 2]);
    }

    #[test]
    fn test_nested_subspan_shares_storage() {
        let span = Span::from_vec((0..10i64).collect());
        let inner = span.subspan(2, 6).subspan(1, 3);
        assert_eq!(inner.to_vec(), vec![3, 4, 5]);
        assert!(inner.as_slice().is_some());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_subspan_out_of_range_panics() {
        let _ = Span::from_vec(vec![1i64, 2]).subspan(1, 2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_index_out_of_range_panics() {
        let span = Span::from_vec(vec![true]);
        let _ = span.at(1);
    }

    #[test]
    fn test_mapped_span_reads_buffer() {
        let bytes = packed(&[7, -3, 11]);
        let span = Span::<i64>::mapped(bytes).unwrap();
        assert!(span.is_mapped());
        assert_eq!(span.len(), 3);
        assert_eq!(*span.at(1), -3);
        assert_eq!(span, Span::from_vec(vec![7, -3, 11]));

        let sub = span.subspan(1, 2);
        assert!(sub.is_mapped());
        assert_eq!(sub.to_vec(), vec![-3, 11]);
    }

    #[test]
    fn test_mapped_span_rejects_ragged_buffer() {
        assert!(Span::<i64>::mapped(Bytes::from_static(&[1, 2, 3])).is_none());
        assert!(Span::<f64>::mapped(Bytes::new()).unwrap().is_empty());
    }

    #[test]
    fn test_make_mut_is_copy_on_write() {
        let original = Span::from_vec(vec![1i64, 2, 3]);
        let mut copy = original.clone_owned();
        copy.make_mut()[0] = 100;
        assert_eq!(original.to_vec(), vec![1, 2, 3]);
        assert_eq!(copy.to_vec(), vec![100, 2, 3]);
    }

    #[test]
    fn test_make_mut_materialises_mapped_span() {
        let bytes = packed(&[1, 2]);
        let mut span = Span::<i64>::mapped(bytes.clone()).unwrap();
        span.make_mut()[1] = 9;
        assert!(!span.is_mapped());
        assert_eq!(span.to_vec(), vec![1, 9]);
        assert_eq!(Span::<i64>::mapped(bytes).unwrap().to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_clone_owned_materialises_mapped_span() {
        let span = Span::<i64>::mapped(packed(&[5, 6])).unwrap();
        let copy = span.clone_owned();
        assert!(!copy.is_mapped());
        assert_eq!(copy, span);
    }

    #[test]
    fn test_span_argument_elements() {
        let arg = ExpressionSpanArgument::from(Span::from_vec(vec![
            "a".to_string(),
            "b".to_string(),
        ]));
        assert_eq!(arg.len(), 2);
        assert_eq!(arg.element_type_name(), "string");
        assert_eq!(arg.element(1), Some(ElementRef::String(Cow::Borrowed("b"))));
        assert_eq!(arg.element(2), None);

        let symbols = ExpressionSpanArgument::from(Span::from_vec(vec![Symbol::new("x")]));
        let collected: Vec<_> = symbols.elements().collect();
        assert_eq!(collected, vec![ElementRef::Symbol(Cow::Owned(Symbol::new("x")))]);
    }
}
