//! Wire spelling of struct field names.
//!
//! Renaming works at the serde layer rather than on the parsed document, so
//! only struct fields change spelling. Map keys are data and pass through
//! untouched. Decoding does not invert the case conversion; it matches each
//! wire key against the renamed spelling of the fields serde expects, which
//! keeps names like `address_line_1` or `#[serde(rename = "ID")]` stable.
//!
//! A struct holding a `#[serde(flatten)]` field is written by serde as a map,
//! so none of its keys are respelled in either direction. Enums with an
//! internal, adjacent or untagged representation are buffered by serde while
//! decoding, before the field list is known; give those types their own
//! `#[serde(rename_all)]` and use `NamingPolicy::AsIs`.

use std::fmt;

use serde::de::{self, DeserializeSeed, IntoDeserializer, Visitor};
use serde::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Error, Map, Value};

/// How struct field names are spelled on the wire.
///
/// Map keys are never renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// Field names are left exactly as serde produces them.
    #[default]
    AsIs,
    /// `widget_id` is sent as `widgetId`.
    CamelCase,
    /// `widgetId` is sent as `widget_id`.
    SnakeCase,
}

impl NamingPolicy {
    /// Spells a field name the way this policy sends it.
    pub fn apply(self, field: &str) -> String {
        match self {
            Self::AsIs => field.to_string(),
            Self::CamelCase => to_camel_case(field),
            Self::SnakeCase => to_snake_case(field),
        }
    }
}

fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for (i, c) in key.chars().enumerate() {
        if c == '_' && i > 0 {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn tagged(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut map = Map::new();
            map.insert(name.to_string(), value);
            Value::Object(map)
        }
        None => value,
    }
}

/// Serializes into a [`Value`], spelling struct fields by policy.
#[derive(Debug, Clone, Copy)]
pub(super) struct FieldRenamer {
    naming: NamingPolicy,
}

impl FieldRenamer {
    pub(super) fn new(naming: NamingPolicy) -> Self {
        Self { naming }
    }
}

macro_rules! delegate_scalar {
    ($($method:ident($ty:ty))*) => {
        $(
            fn $method(self, v: $ty) -> Result<Value, Error> {
                serde_json::value::Serializer.$method(v)
            }
        )*
    };
}

impl Serializer for FieldRenamer {
    type Ok = Value;
    type Error = Error;
    type SerializeSeq = ArrayRenamer;
    type SerializeTuple = ArrayRenamer;
    type SerializeTupleStruct = ArrayRenamer;
    type SerializeTupleVariant = ArrayRenamer;
    type SerializeMap = ObjectRenamer;
    type SerializeStruct = ObjectRenamer;
    type SerializeStructVariant = ObjectRenamer;

    delegate_scalar! {
        serialize_bool(bool)
        serialize_i8(i8)
        serialize_i16(i16)
        serialize_i32(i32)
        serialize_i64(i64)
        serialize_i128(i128)
        serialize_u8(u8)
        serialize_u16(u16)
        serialize_u32(u32)
        serialize_u64(u64)
        serialize_u128(u128)
        serialize_f32(f32)
        serialize_f64(f64)
        serialize_char(char)
        serialize_str(&str)
        serialize_bytes(&[u8])
    }

    fn serialize_none(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value, Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value, Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Error>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(Some(variant), value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ArrayRenamer, Error> {
        Ok(ArrayRenamer::new(self.naming, None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<ArrayRenamer, Error> {
        Ok(ArrayRenamer::new(self.naming, None, len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<ArrayRenamer, Error> {
        Ok(ArrayRenamer::new(self.naming, None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<ArrayRenamer, Error> {
        Ok(ArrayRenamer::new(self.naming, Some(variant), len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<ObjectRenamer, Error> {
        Ok(ObjectRenamer::new(self.naming, None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<ObjectRenamer, Error> {
        Ok(ObjectRenamer::new(self.naming, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<ObjectRenamer, Error> {
        Ok(ObjectRenamer::new(self.naming, Some(variant)))
    }
}

pub(super) struct ArrayRenamer {
    naming: NamingPolicy,
    variant: Option<&'static str>,
    items: Vec<Value>,
}

impl ArrayRenamer {
    fn new(naming: NamingPolicy, variant: Option<&'static str>, len: usize) -> Self {
        Self {
            naming,
            variant,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(value.serialize(FieldRenamer::new(self.naming))?);
        Ok(())
    }

    fn finish(self) -> Result<Value, Error> {
        Ok(tagged(self.variant, Value::Array(self.items)))
    }
}

impl ser::SerializeSeq for ArrayRenamer {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        self.finish()
    }
}

impl ser::SerializeTuple for ArrayRenamer {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for ArrayRenamer {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for ArrayRenamer {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value, Error> {
        self.finish()
    }
}

pub(super) struct ObjectRenamer {
    naming: NamingPolicy,
    variant: Option<&'static str>,
    members: Map<String, Value>,
    pending_key: Option<String>,
}

impl ObjectRenamer {
    fn new(naming: NamingPolicy, variant: Option<&'static str>) -> Self {
        Self {
            naming,
            variant,
            members: Map::new(),
            pending_key: None,
        }
    }

    fn insert_field<T>(&mut self, field: &'static str, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(FieldRenamer::new(self.naming))?;
        self.members.insert(self.naming.apply(field), value);
        Ok(())
    }

    fn finish(self) -> Result<Value, Error> {
        Ok(tagged(self.variant, Value::Object(self.members)))
    }
}

impl ser::SerializeMap for ObjectRenamer {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        // Keys are written as serde_json would write them, never renamed.
        let key = match key.serialize(FieldRenamer::new(NamingPolicy::AsIs))? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return Err(<Error as ser::Error>::custom("key must be a string")),
        };
        self.pending_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| <Error as ser::Error>::custom("map value without a key"))?;
        let value = value.serialize(FieldRenamer::new(self.naming))?;
        self.members.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        self.finish()
    }
}

impl ser::SerializeStruct for ObjectRenamer {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        self.insert_field(key, value)
    }

    fn end(self) -> Result<Value, Error> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for ObjectRenamer {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        self.insert_field(key, value)
    }

    fn end(self) -> Result<Value, Error> {
        self.finish()
    }
}

/// Deserializer that maps wire keys back onto the fields serde asks for.
pub(super) struct FieldMatcher<D> {
    inner: D,
    naming: NamingPolicy,
}

impl<D> FieldMatcher<D> {
    pub(super) fn new(inner: D, naming: NamingPolicy) -> Self {
        Self { inner, naming }
    }
}

macro_rules! forward_deserialize {
    ($($method:ident($($arg:ident: $ty:ty),*))*) => {
        $(
            fn $method<V>(self, $($arg: $ty,)* visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                self.inner
                    .$method($($arg,)* MatchingVisitor::new(visitor, self.naming, None))
            }
        )*
    };
}

impl<'de, D> Deserializer<'de> for FieldMatcher<D>
where
    D: Deserializer<'de>,
{
    type Error = D::Error;

    forward_deserialize! {
        deserialize_any()
        deserialize_bool()
        deserialize_i8()
        deserialize_i16()
        deserialize_i32()
        deserialize_i64()
        deserialize_i128()
        deserialize_u8()
        deserialize_u16()
        deserialize_u32()
        deserialize_u64()
        deserialize_u128()
        deserialize_f32()
        deserialize_f64()
        deserialize_char()
        deserialize_str()
        deserialize_string()
        deserialize_bytes()
        deserialize_byte_buf()
        deserialize_option()
        deserialize_unit()
        deserialize_unit_struct(name: &'static str)
        deserialize_newtype_struct(name: &'static str)
        deserialize_seq()
        deserialize_tuple(len: usize)
        deserialize_tuple_struct(name: &'static str, len: usize)
        deserialize_map()
        deserialize_enum(name: &'static str, variants: &'static [&'static str])
        deserialize_identifier()
        deserialize_ignored_any()
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.inner.deserialize_struct(
            name,
            fields,
            MatchingVisitor::new(visitor, self.naming, Some(fields)),
        )
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

struct MatchingSeed<S> {
    seed: S,
    naming: NamingPolicy,
}

impl<'de, S> DeserializeSeed<'de> for MatchingSeed<S>
where
    S: DeserializeSeed<'de>,
{
    type Value = S::Value;

    fn deserialize<D>(self, deserializer: D) -> Result<S::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        self.seed
            .deserialize(FieldMatcher::new(deserializer, self.naming))
    }
}

struct MatchingVisitor<V> {
    visitor: V,
    naming: NamingPolicy,
    fields: Option<&'static [&'static str]>,
}

impl<V> MatchingVisitor<V> {
    fn new(visitor: V, naming: NamingPolicy, fields: Option<&'static [&'static str]>) -> Self {
        Self {
            visitor,
            naming,
            fields,
        }
    }
}

macro_rules! forward_visit {
    ($($method:ident($ty:ty))*) => {
        $(
            fn $method<E>(self, v: $ty) -> Result<V::Value, E>
            where
                E: de::Error,
            {
                self.visitor.$method(v)
            }
        )*
    };
}

impl<'de, V> Visitor<'de> for MatchingVisitor<V>
where
    V: Visitor<'de>,
{
    type Value = V::Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        self.visitor.expecting(formatter)
    }

    forward_visit! {
        visit_bool(bool)
        visit_i64(i64)
        visit_i128(i128)
        visit_u64(u64)
        visit_u128(u128)
        visit_f64(f64)
        visit_str(&str)
        visit_borrowed_str(&'de str)
        visit_string(String)
        visit_bytes(&[u8])
        visit_borrowed_bytes(&'de [u8])
        visit_byte_buf(Vec<u8>)
    }

    fn visit_none<E>(self) -> Result<V::Value, E>
    where
        E: de::Error,
    {
        self.visitor.visit_none()
    }

    fn visit_unit<E>(self) -> Result<V::Value, E>
    where
        E: de::Error,
    {
        self.visitor.visit_unit()
    }

    fn visit_some<D>(self, deserializer: D) -> Result<V::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        self.visitor
            .visit_some(FieldMatcher::new(deserializer, self.naming))
    }

    fn visit_newtype_struct<D>(self, deserializer: D) -> Result<V::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        self.visitor
            .visit_newtype_struct(FieldMatcher::new(deserializer, self.naming))
    }

    fn visit_seq<A>(self, seq: A) -> Result<V::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        self.visitor.visit_seq(MatchingSeq {
            inner: seq,
            naming: self.naming,
        })
    }

    fn visit_map<A>(self, map: A) -> Result<V::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        self.visitor.visit_map(MatchingMap {
            inner: map,
            naming: self.naming,
            fields: self.fields,
        })
    }

    fn visit_enum<A>(self, data: A) -> Result<V::Value, A::Error>
    where
        A: de::EnumAccess<'de>,
    {
        self.visitor.visit_enum(MatchingEnum {
            inner: data,
            naming: self.naming,
        })
    }
}

struct MatchingSeq<A> {
    inner: A,
    naming: NamingPolicy,
}

impl<'de, A> de::SeqAccess<'de> for MatchingSeq<A>
where
    A: de::SeqAccess<'de>,
{
    type Error = A::Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, A::Error>
    where
        T: DeserializeSeed<'de>,
    {
        self.inner.next_element_seed(MatchingSeed {
            seed,
            naming: self.naming,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        self.inner.size_hint()
    }
}

struct MatchingMap<A> {
    inner: A,
    naming: NamingPolicy,
    fields: Option<&'static [&'static str]>,
}

impl<'de, A> de::MapAccess<'de> for MatchingMap<A>
where
    A: de::MapAccess<'de>,
{
    type Error = A::Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, A::Error>
    where
        K: DeserializeSeed<'de>,
    {
        // Without a field list this is a map and its keys are data.
        let Some(fields) = self.fields else {
            return self.inner.next_key_seed(seed);
        };
        let Some(key) = self.inner.next_key::<String>()? else {
            return Ok(None);
        };
        let key = fields
            .iter()
            .find(|field| self.naming.apply(field) == key)
            .map_or(key, |field| (*field).to_string());
        let key: de::value::StringDeserializer<A::Error> = key.into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<T>(&mut self, seed: T) -> Result<T::Value, A::Error>
    where
        T: DeserializeSeed<'de>,
    {
        self.inner.next_value_seed(MatchingSeed {
            seed,
            naming: self.naming,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        self.inner.size_hint()
    }
}

struct MatchingEnum<A> {
    inner: A,
    naming: NamingPolicy,
}

impl<'de, A> de::EnumAccess<'de> for MatchingEnum<A>
where
    A: de::EnumAccess<'de>,
{
    type Error = A::Error;
    type Variant = MatchingVariant<A::Variant>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), A::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let (value, variant) = self.inner.variant_seed(seed)?;
        Ok((
            value,
            MatchingVariant {
                inner: variant,
                naming: self.naming,
            },
        ))
    }
}

struct MatchingVariant<A> {
    inner: A,
    naming: NamingPolicy,
}

impl<'de, A> de::VariantAccess<'de> for MatchingVariant<A>
where
    A: de::VariantAccess<'de>,
{
    type Error = A::Error;

    fn unit_variant(self) -> Result<(), A::Error> {
        self.inner.unit_variant()
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, A::Error>
    where
        T: DeserializeSeed<'de>,
    {
        self.inner.newtype_variant_seed(MatchingSeed {
            seed,
            naming: self.naming,
        })
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value, A::Error>
    where
        V: Visitor<'de>,
    {
        self.inner
            .tuple_variant(len, MatchingVisitor::new(visitor, self.naming, None))
    }

    fn struct_variant<V>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, A::Error>
    where
        V: Visitor<'de>,
    {
        self.inner.struct_variant(
            fields,
            MatchingVisitor::new(visitor, self.naming, Some(fields)),
        )
    }
}
