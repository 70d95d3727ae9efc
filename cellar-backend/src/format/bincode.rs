use ::bincode::config::standard as bincode_config;
use ::bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Serialize, de::DeserializeOwned};

use super::FormatError;

pub(super) fn encode<T>(value: &T) -> Result<Vec<u8>, FormatError>
where
    T: Serialize + ?Sized,
{
    encode_to_vec(value, bincode_config()).map_err(|err| FormatError::Serialize(Box::new(err)))
}

// Trailing bytes after the decoded map mean the body was not written by us.
pub(super) fn decode<T>(data: &[u8]) -> Result<T, FormatError>
where
    T: DeserializeOwned,
{
    let (value, read) = decode_from_slice(data, bincode_config())
        .map_err(|err| FormatError::Deserialize(Box::new(err)))?;
    if read != data.len() {
        return Err(FormatError::Deserialize(Box::new(std::io::Error::other(
            "trailing bytes after bincode entry",
        ))));
    }
    Ok(value)
}
