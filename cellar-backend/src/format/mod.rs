//! Value serialization formats.
//!
//! A cache entry body is a single-key map `{storage_key: value}`. The map is
//! encoded with one of the formats below; the format used is recorded in the
//! entry header, so readers never have to guess.
//!
//! | Format | Self-describing | Dynamic values (`serde_json::Value`) |
//! |--------|-----------------|--------------------------------------|
//! | [`Json`](ValueFormat::Json) | Yes | Yes |
//! | [`Bincode`](ValueFormat::Bincode) | No | No, typed values only |

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer, de::DeserializeOwned};
use thiserror::Error;

mod bincode;
mod json;

/// Errors produced while encoding or decoding a cache entry.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The value could not be serialized.
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    /// The body could not be deserialized into the requested type.
    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),

    /// The payload was written by a codec version this build cannot read.
    #[error("unsupported entry codec version {0}")]
    UnsupportedVersion(u8),

    /// The payload names a value format this build does not know.
    #[error("unknown value format id {0}")]
    UnknownFormat(u8),

    /// The payload is shorter than the entry header.
    #[error("entry payload truncated: {0} bytes")]
    Truncated(usize),

    /// The body does not hold exactly the requested key.
    #[error("entry does not contain key {0}")]
    MissingEntry(String),
}

/// Serialization format for entry bodies.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    /// JSON via `serde_json`.
    ///
    /// Default. Keeps integer and float identity and round-trips
    /// dynamically-typed values.
    /// NaN and infinities have no JSON form and are refused at encode
    /// time; store them with [`Bincode`](ValueFormat::Bincode).
    #[default]
    Json,

    /// Compact binary encoding via `bincode`.
    ///
    /// Not self-describing: values must be read back as the same Rust type
    /// they were written with.
    Bincode,
}

impl ValueFormat {
    /// Identifier stored in the entry header.
    pub fn id(&self) -> u8 {
        match self {
            ValueFormat::Json => 0,
            ValueFormat::Bincode => 1,
        }
    }

    /// Looks a format up by its header identifier.
    pub fn from_id(id: u8) -> Result<Self, FormatError> {
        match id {
            0 => Ok(ValueFormat::Json),
            1 => Ok(ValueFormat::Bincode),
            other => Err(FormatError::UnknownFormat(other)),
        }
    }

    /// Encodes `{key: value}`.
    pub fn encode_entry<T>(&self, key: &str, value: &T) -> Result<Vec<u8>, FormatError>
    where
        T: Serialize + ?Sized,
    {
        let entry = EntryRef { key, value };
        match self {
            ValueFormat::Json => json::encode(&entry),
            ValueFormat::Bincode => bincode::encode(&entry),
        }
    }

    /// Decodes a body and returns the value stored under `key`.
    pub fn decode_entry<T>(&self, key: &str, data: &[u8]) -> Result<T, FormatError>
    where
        T: DeserializeOwned,
    {
        let mut entry: BTreeMap<String, T> = match self {
            ValueFormat::Json => json::decode(data)?,
            ValueFormat::Bincode => bincode::decode(data)?,
        };
        if entry.len() != 1 {
            return Err(FormatError::MissingEntry(key.to_owned()));
        }
        entry
            .remove(key)
            .ok_or_else(|| FormatError::MissingEntry(key.to_owned()))
    }
}

/// Borrowed single-key map, serialized without building a real map.
struct EntryRef<'a, T: ?Sized> {
    key: &'a str,
    value: &'a T,
}

impl<T> Serialize for EntryRef<'_, T>
where
    T: Serialize + ?Sized,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.value)?;
        map.end()
    }
}
