//! Wire header of a serialized expression.

use super::error::{SerializationError, SerializationResult};
use serde::{Deserialize, Serialize};

pub const MAGIC: [u8; 4] = *b"VXPR";

/// Current wire format version. Decoders reject every other version.
pub const FORMAT_VERSION: u16 = 1;

/// Encoded size of [`WireHeader`].
pub const HEADER_SIZE: usize = 16;

/// Fixed-size header in front of every serialized expression body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireHeader {
    pub magic: [u8; 4],
    pub version: u16,
    /// Reserved, must be zero.
    pub flags: u16,
    pub body_len: u64,
}

impl WireHeader {
    pub fn new(body_len: u64) -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            flags: 0,
            body_len,
        }
    }

    pub fn encode(&self) -> SerializationResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode and validate the header at the start of `buffer`.
    pub fn decode(buffer: &[u8]) -> SerializationResult<Self> {
        if buffer.len() < HEADER_SIZE {
            return Err(SerializationError::Truncated {
                context: "header",
                needed: HEADER_SIZE,
                remaining: buffer.len(),
            });
        }
        let header: WireHeader = bincode::deserialize(&buffer[..HEADER_SIZE])?;
        if header.magic != MAGIC {
            return Err(SerializationError::BadMagic {
                found: header.magic,
            });
        }
        if header.version != FORMAT_VERSION {
            return Err(SerializationError::UnsupportedVersion(header.version));
        }
        if header.flags != 0 {
            return Err(SerializationError::UnsupportedFlags(header.flags));
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() -> SerializationResult<()> {
        let bytes = WireHeader::new(42).encode()?;
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[..4], b"VXPR");
        assert_eq!(WireHeader::decode(&bytes)?, WireHeader::new(42));
        Ok(())
    }

    #[test]
    fn test_header_rejects() -> SerializationResult<()> {
        let mut bytes = WireHeader::new(0).encode()?;
        bytes[0] = b'X';
        assert!(matches!(
            WireHeader::decode(&bytes),
            Err(SerializationError::BadMagic { .. })
        ));

        let mut header = WireHeader::new(0);
        header.version = 2;
        assert!(matches!(
            WireHeader::decode(&header.encode()?),
            Err(SerializationError::UnsupportedVersion(2))
        ));

        let mut header = WireHeader::new(0);
        header.flags = 1;
        assert!(matches!(
            WireHeader::decode(&header.encode()?),
            Err(SerializationError::UnsupportedFlags(1))
        ));

        assert!(matches!(
            WireHeader::decode(&[0u8; 3]),
            Err(SerializationError::Truncated { needed: 16, .. })
        ));
        Ok(())
    }
}
