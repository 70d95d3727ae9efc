//! Entry codec: the payload layout shared by every backend.
//!
//! ```text
//! +---------+--------+-------+------------------+-----------------------+
//! | version | format | flags | expire (i64 BE)  | body {key: value}     |
//! | 1 byte  | 1 byte | 1 byte| 8 bytes, unix ms | format-specific bytes |
//! +---------+--------+-------+------------------+-----------------------+
//! ```
//!
//! Because the layout does not depend on the backend, moving data between a
//! remote and an embedded store is a byte copy per key. The header is enough
//! to tell whether an entry is still alive, so existence checks never decode
//! the body.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::format::{FormatError, ValueFormat};
use crate::key::StorageKey;

/// Current payload layout version.
pub const CODEC_VERSION: u8 = 1;

/// Size of the fixed entry header in bytes.
pub const HEADER_LEN: usize = 11;

const FLAG_EXPIRE: u8 = 0b0000_0001;

/// Decoded fixed-size header of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    /// Format the body was encoded with.
    pub format: ValueFormat,
    /// Instant after which the entry must be treated as absent.
    pub expire: Option<DateTime<Utc>>,
}

impl EntryHeader {
    /// Parses the header at the start of `payload`.
    pub fn parse(payload: &[u8]) -> Result<Self, FormatError> {
        if payload.len() < HEADER_LEN {
            return Err(FormatError::Truncated(payload.len()));
        }
        let mut buf = &payload[..HEADER_LEN];
        let version = buf.get_u8();
        if version != CODEC_VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }
        let format = ValueFormat::from_id(buf.get_u8())?;
        let flags = buf.get_u8();
        let expire_ms = buf.get_i64();
        let expire = if flags & FLAG_EXPIRE != 0 {
            let expire = DateTime::from_timestamp_millis(expire_ms).ok_or_else(|| {
                FormatError::Deserialize(Box::new(std::io::Error::other(
                    "expiry timestamp out of range",
                )))
            })?;
            Some(expire)
        } else {
            None
        };
        Ok(Self { format, expire })
    }

    /// Returns `true` once the expiry instant has passed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns `true` if the entry is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire.is_some_and(|expire| expire <= now)
    }
}

/// Encodes values into payloads and back.
///
/// The configured format is used for writing only; reading follows the
/// format recorded in each payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCodec {
    format: ValueFormat,
}

impl EntryCodec {
    /// Creates a codec writing bodies in `format`.
    pub fn new(format: ValueFormat) -> Self {
        Self { format }
    }

    /// Format used for new payloads.
    pub fn format(&self) -> ValueFormat {
        self.format
    }

    /// Encodes `{key: value}` with an optional expiry instant.
    pub fn encode<T>(
        &self,
        key: &StorageKey,
        value: &T,
        expire: Option<DateTime<Utc>>,
    ) -> Result<Bytes, FormatError>
    where
        T: Serialize + ?Sized,
    {
        let body = self.format.encode_entry(key.as_str(), value)?;
        let mut payload = BytesMut::with_capacity(HEADER_LEN + body.len());
        payload.put_u8(CODEC_VERSION);
        payload.put_u8(self.format.id());
        match expire {
            Some(expire) => {
                payload.put_u8(FLAG_EXPIRE);
                payload.put_i64(expire.timestamp_millis());
            }
            None => {
                payload.put_u8(0);
                payload.put_i64(0);
            }
        }
        payload.put_slice(&body);
        Ok(payload.freeze())
    }

    /// Decodes the value stored under `key` together with its header.
    pub fn decode<T>(&self, key: &StorageKey, payload: &[u8]) -> Result<(EntryHeader, T), FormatError>
    where
        T: DeserializeOwned,
    {
        let header = EntryHeader::parse(payload)?;
        let value = header
            .format
            .decode_entry(key.as_str(), &payload[HEADER_LEN..])?;
        Ok((header, value))
    }
}
