use serde::de::DeserializeOwned;
use serde::ser::{self, Error as _, Serialize};

use super::FormatError;

pub(super) fn encode<T>(value: &T) -> Result<Vec<u8>, FormatError>
where
    T: Serialize + ?Sized,
{
    // serde_json writes NaN and infinities as `null`, which no longer reads
    // back as a float.
    value
        .serialize(FiniteFloats)
        .map_err(|err| FormatError::Serialize(Box::new(err)))?;
    serde_json::to_vec(value).map_err(|err| FormatError::Serialize(Box::new(err)))
}

pub(super) fn decode<T>(data: &[u8]) -> Result<T, FormatError>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(data).map_err(|err| FormatError::Deserialize(Box::new(err)))
}

/// Walks a value without producing output and fails on the first float
/// JSON has no representation for.
#[derive(Clone, Copy)]
struct FiniteFloats;

type Checked = Result<(), serde_json::Error>;

fn check_float(value: f64) -> Checked {
    if value.is_finite() {
        Ok(())
    } else {
        Err(serde_json::Error::custom(format!(
            "{value} cannot be stored as JSON, use the bincode format"
        )))
    }
}

macro_rules! accept {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(fn $method(self, _: $ty) -> Checked {
            Ok(())
        })*
    };
}

impl ser::Serializer for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    accept! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_char: char,
        serialize_str: &str,
        serialize_bytes: &[u8],
        serialize_unit_struct: &'static str,
    }

    fn serialize_f32(self, value: f32) -> Checked {
        check_float(f64::from(value))
    }

    fn serialize_f64(self, value: f64) -> Checked {
        check_float(value)
    }

    fn serialize_none(self) -> Checked {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Checked {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Checked {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Checked {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Checked {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Checked {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, Self::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, Self::Error> {
        Ok(self)
    }
}

macro_rules! compound {
    ($($trait:ident::$method:ident),* $(,)?) => {
        $(impl ser::$trait for FiniteFloats {
            type Ok = ();
            type Error = serde_json::Error;

            fn $method<T: Serialize + ?Sized>(&mut self, value: &T) -> Checked {
                value.serialize(*self)
            }

            fn end(self) -> Checked {
                Ok(())
            }
        })*
    };
}

compound! {
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field,
}

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Checked {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Checked {
        value.serialize(*self)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Checked {
        value.serialize(*self)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Checked {
        value.serialize(*self)
    }

    fn end(self) -> Checked {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(serde::Serialize)]
    struct Reading {
        sensor: &'static str,
        samples: Vec<f32>,
        peak: Option<f64>,
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert!(encode(&f64::NAN).is_err());
        assert!(encode(&[1.0, f64::INFINITY]).is_err());
        assert!(encode(&Reading {
            sensor: "t1",
            samples: vec![0.5, f32::NEG_INFINITY],
            peak: None,
        })
        .is_err());
        assert!(encode(&Some(BTreeMap::from([("x", f64::NAN)]))).is_err());
    }

    #[test]
    fn finite_values_pass_through() {
        let reading = Reading {
            sensor: "t1",
            samples: vec![0.5, -1.25],
            peak: Some(f64::MAX),
        };
        let body = encode(&reading).unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap()["samples"][1],
            -1.25
        );
        assert_eq!(encode(&(1u128, 'c', ())).unwrap(), br#"[1,"c",null]"#);
    }
}
