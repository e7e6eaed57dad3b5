//! Form encoding of a model's fields.
//!
//! # Design
//! The encoder is a `serde::Serializer`, so every `Serialize` type can be
//! encoded without per-type code. The top level must be a struct of named
//! fields; each field is rendered by a second serializer that only accepts
//! integers, booleans, text and byte strings. A field holding `None` is left
//! out of the body entirely. Anything else fails the whole encoding, so a
//! partial body is never produced.
//!
//! Text is escaped the way HTML forms expect: unreserved characters
//! (`A-Z a-z 0-9 - _ . ~`) pass through, a space becomes `+`, every other
//! byte becomes `%XX`.
//!
//! `Vec<u8>` serializes as a sequence under serde's derive; mark such fields
//! `#[serde(with = "serde_bytes")]` to have them encoded as byte strings.

use serde::ser::{Impossible, Serialize, SerializeStruct, Serializer};

use crate::error::EncodeError;

/// Encode `model` as an `application/x-www-form-urlencoded` body.
///
/// Fields appear in declaration order under their serde names.
pub fn encode_fields<T: Serialize + ?Sized>(model: &T) -> Result<String, EncodeError> {
    let pairs = model.serialize(ModelSerializer)?;
    Ok(pairs
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&"))
}

fn escape_text(text: &str) -> String {
    urlencoding::encode(text).replace("%20", "+")
}

fn escape_bytes(bytes: &[u8]) -> String {
    urlencoding::encode_binary(bytes).replace("%20", "+")
}

type Pairs = Vec<(&'static str, String)>;

macro_rules! reject {
    ($($method:ident($ty:ty) => $kind:literal),* $(,)?) => {
        $(
            fn $method(self, _: $ty) -> Result<Self::Ok, Self::Error> {
                self.reject($kind)
            }
        )*
    };
}

macro_rules! render {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, value: $ty) -> Result<Self::Ok, Self::Error> {
                Ok(Some(value.to_string()))
            }
        )*
    };
}

/// Accepts a struct (possibly behind `Some` or newtype wrappers) and hands
/// each of its fields to `FieldSerializer`.
#[derive(Clone, Copy)]
struct ModelSerializer;

impl ModelSerializer {
    fn reject<T>(self, kind: &'static str) -> Result<T, EncodeError> {
        Err(EncodeError::NotAStruct { kind })
    }
}

impl Serializer for ModelSerializer {
    type Ok = Pairs;
    type Error = EncodeError;
    type SerializeSeq = Impossible<Pairs, EncodeError>;
    type SerializeTuple = Impossible<Pairs, EncodeError>;
    type SerializeTupleStruct = Impossible<Pairs, EncodeError>;
    type SerializeTupleVariant = Impossible<Pairs, EncodeError>;
    type SerializeMap = Impossible<Pairs, EncodeError>;
    type SerializeStruct = FieldCollector;
    type SerializeStructVariant = Impossible<Pairs, EncodeError>;

    reject! {
        serialize_bool(bool) => "bool",
        serialize_i8(i8) => "integer",
        serialize_i16(i16) => "integer",
        serialize_i32(i32) => "integer",
        serialize_i64(i64) => "integer",
        serialize_i128(i128) => "integer",
        serialize_u8(u8) => "integer",
        serialize_u16(u16) => "integer",
        serialize_u32(u32) => "integer",
        serialize_u64(u64) => "integer",
        serialize_u128(u128) => "integer",
        serialize_f32(f32) => "float",
        serialize_f64(f64) => "float",
        serialize_char(char) => "char",
        serialize_str(&str) => "string",
        serialize_bytes(&[u8]) => "byte string",
    }

    fn serialize_none(self) -> Result<Pairs, EncodeError> {
        Err(EncodeError::NilObject)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Pairs, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Pairs, EncodeError> {
        self.reject("unit")
    }

    /// A struct without fields encodes as an empty body.
    fn serialize_unit_struct(self, _name: &'static str) -> Result<Pairs, EncodeError> {
        Ok(Vec::new())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Pairs, EncodeError> {
        self.reject("enum")
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Pairs, EncodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Pairs, EncodeError> {
        self.reject("enum")
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, EncodeError> {
        self.reject("sequence")
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, EncodeError> {
        self.reject("tuple")
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodeError> {
        self.reject("tuple struct")
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodeError> {
        self.reject("enum")
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, EncodeError> {
        self.reject("map")
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, EncodeError> {
        Ok(FieldCollector {
            pairs: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, EncodeError> {
        self.reject("enum")
    }
}

struct FieldCollector {
    pairs: Pairs,
}

impl SerializeStruct for FieldCollector {
    type Ok = Pairs;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        if let Some(encoded) = value.serialize(FieldSerializer { field: key })? {
            self.pairs.push((key, encoded));
        }
        Ok(())
    }

    fn end(self) -> Result<Pairs, EncodeError> {
        Ok(self.pairs)
    }
}

/// Renders one field value. `Ok(None)` means the field is absent and must be
/// omitted from the body.
#[derive(Clone, Copy)]
struct FieldSerializer {
    field: &'static str,
}

impl FieldSerializer {
    fn reject<T>(self, kind: &'static str) -> Result<T, EncodeError> {
        Err(EncodeError::UnsupportedFieldKind {
            field: self.field.to_string(),
            kind,
        })
    }
}

impl Serializer for FieldSerializer {
    type Ok = Option<String>;
    type Error = EncodeError;
    type SerializeSeq = Impossible<Option<String>, EncodeError>;
    type SerializeTuple = Impossible<Option<String>, EncodeError>;
    type SerializeTupleStruct = Impossible<Option<String>, EncodeError>;
    type SerializeTupleVariant = Impossible<Option<String>, EncodeError>;
    type SerializeMap = Impossible<Option<String>, EncodeError>;
    type SerializeStruct = Impossible<Option<String>, EncodeError>;
    type SerializeStructVariant = Impossible<Option<String>, EncodeError>;

    render! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
    }

    reject! {
        serialize_f32(f32) => "float",
        serialize_f64(f64) => "float",
    }

    fn serialize_char(self, value: char) -> Result<Option<String>, EncodeError> {
        Ok(Some(escape_text(value.encode_utf8(&mut [0; 4]))))
    }

    fn serialize_str(self, value: &str) -> Result<Option<String>, EncodeError> {
        Ok(Some(escape_text(value)))
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Option<String>, EncodeError> {
        Ok(Some(escape_bytes(value)))
    }

    fn serialize_none(self) -> Result<Option<String>, EncodeError> {
        Ok(None)
    }

    fn serialize_some<T: ?Sized + Serialize>(
        self,
        value: &T,
    ) -> Result<Option<String>, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Option<String>, EncodeError> {
        self.reject("unit")
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Option<String>, EncodeError> {
        self.reject("unit struct")
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Option<String>, EncodeError> {
        self.reject("enum")
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Option<String>, EncodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Option<String>, EncodeError> {
        self.reject("enum")
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, EncodeError> {
        self.reject("sequence")
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, EncodeError> {
        self.reject("tuple")
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, EncodeError> {
        self.reject("tuple struct")
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, EncodeError> {
        self.reject("enum")
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, EncodeError> {
        self.reject("map")
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, EncodeError> {
        self.reject("struct")
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, EncodeError> {
        self.reject("enum")
    }
}
