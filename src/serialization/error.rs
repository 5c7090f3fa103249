//! Serialization error types.

use thiserror::Error;

/// Errors raised while encoding or decoding serialized expressions.
///
/// Decoding fails closed: any buffer that does not describe exactly one
/// well-formed expression is rejected with one of these.
#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Bad magic: expected VXPR, found {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u16),

    #[error("Unsupported header flags: {0:#06x}")]
    UnsupportedFlags(u16),

    #[error("Length mismatch: header declares {declared} body bytes, buffer holds {actual}")]
    LengthMismatch { declared: u64, actual: usize },

    #[error("Truncated buffer: {context} needs {needed} bytes but only {remaining} remain")]
    Truncated {
        context: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid {context} tag: {tag}")]
    InvalidTag { context: &'static str, tag: u8 },

    #[error("Invalid bool byte: {0}")]
    InvalidBool(u8),

    #[error("Invalid UTF-8 in {context}: {source}")]
    InvalidUtf8 {
        context: &'static str,
        source: std::str::Utf8Error,
    },

    #[error("Trailing bytes after expression: {0}")]
    TrailingBytes(usize),

    #[error("Expression nested too deeply: depth {depth} exceeds the limit")]
    TooDeep { depth: usize },

    #[error("{context} too large to encode: {len}")]
    TooLarge { context: &'static str, len: usize },

    #[error("Header error: {0}")]
    Header(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for serialization operations.
pub type SerializationResult<T> = Result<T, SerializationError>;
