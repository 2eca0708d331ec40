//! Inspection of any `serde::Serialize` type
//!
//! Records keep the names serde reports for them, enum variants are named
//! `Enum::Variant`, and `Option` becomes a nullable reference.

use serde::ser::{self, Serialize};
use tracing::warn;

use crate::error::{InspectError, InspectResult};
use crate::inspect::Inspect;
use crate::type_name::short_type_name;
use crate::value::{
    Field, Mapping, Record, Reference, Scalar, Sequence, Uninspectable, Value,
};

/// Type name given to anonymous tuples
const TUPLE: &str = "(tuple)";

/// Inspect a value through its `Serialize` impl
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> InspectResult<Value> {
    value.serialize(ValueSerializer)
}

/// Adapter that makes any `Serialize` type comparable
///
/// ```
/// use deepcheck_equality::{is_equal, Inspect, Serialized};
///
/// #[derive(serde::Serialize)]
/// struct Point {
///     x: i32,
/// }
///
/// let a = Serialized(&Point { x: 1 }).inspect_value();
/// let b = Serialized(&Point { x: 1 }).inspect_value();
/// assert!(is_equal(&a, &b));
/// assert_eq!(a.to_string(), "Point { x: 1 }");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Serialized<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> Inspect for Serialized<'_, T> {
    fn inspect_value(&self) -> Value {
        to_value(self.0).unwrap_or_else(|err| {
            warn!(
                type_name = %short_type_name::<T>(),
                error = %err,
                "Serialization failed during inspection"
            );
            Value::Uninspectable(Uninspectable {
                type_name: short_type_name::<T>(),
                error: err,
            })
        })
    }
}

fn variant_name(name: &str, variant: &str) -> String {
    format!("{}::{}", name, variant)
}

fn option(target: Option<Value>) -> Value {
    Value::Reference(Reference {
        type_name: "Option".to_string(),
        target: target.map(Box::new),
    })
}

struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = InspectError;

    type SerializeSeq = SerializeSequence;
    type SerializeTuple = SerializeFields;
    type SerializeTupleStruct = SerializeFields;
    type SerializeTupleVariant = SerializeFields;
    type SerializeMap = SerializeMapping;
    type SerializeStruct = SerializeFields;
    type SerializeStructVariant = SerializeFields;

    fn serialize_bool(self, v: bool) -> InspectResult<Value> {
        Ok(Value::Scalar(Scalar::Bool(v)))
    }

    fn serialize_i8(self, v: i8) -> InspectResult<Value> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_i16(self, v: i16) -> InspectResult<Value> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_i32(self, v: i32) -> InspectResult<Value> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_i64(self, v: i64) -> InspectResult<Value> {
        self.serialize_i128(i128::from(v))
    }

    fn serialize_i128(self, v: i128) -> InspectResult<Value> {
        Ok(Value::Scalar(Scalar::Int(v)))
    }

    fn serialize_u8(self, v: u8) -> InspectResult<Value> {
        self.serialize_u128(u128::from(v))
    }

    fn serialize_u16(self, v: u16) -> InspectResult<Value> {
        self.serialize_u128(u128::from(v))
    }

    fn serialize_u32(self, v: u32) -> InspectResult<Value> {
        self.serialize_u128(u128::from(v))
    }

    fn serialize_u64(self, v: u64) -> InspectResult<Value> {
        self.serialize_u128(u128::from(v))
    }

    fn serialize_u128(self, v: u128) -> InspectResult<Value> {
        Ok(Value::Scalar(Scalar::Uint(v)))
    }

    fn serialize_f32(self, v: f32) -> InspectResult<Value> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> InspectResult<Value> {
        Ok(Value::Scalar(Scalar::Float(v)))
    }

    fn serialize_char(self, v: char) -> InspectResult<Value> {
        Ok(Value::Scalar(Scalar::Char(v)))
    }

    fn serialize_str(self, v: &str) -> InspectResult<Value> {
        Ok(Value::str(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> InspectResult<Value> {
        Ok(Value::Scalar(Scalar::Bytes(v.to_vec())))
    }

    fn serialize_none(self) -> InspectResult<Value> {
        Ok(option(None))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> InspectResult<Value> {
        Ok(option(Some(value.serialize(ValueSerializer)?)))
    }

    fn serialize_unit(self) -> InspectResult<Value> {
        Ok(Value::Scalar(Scalar::Unit))
    }

    fn serialize_unit_struct(self, name: &'static str) -> InspectResult<Value> {
        Ok(Value::named_record(name).finish())
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> InspectResult<Value> {
        Ok(Value::named_record(variant_name(name, variant)).finish())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> InspectResult<Value> {
        Ok(Value::named_record(name)
            .value("0", value.serialize(ValueSerializer)?)
            .finish())
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> InspectResult<Value> {
        Ok(Value::named_record(variant_name(name, variant))
            .value("0", value.serialize(ValueSerializer)?)
            .finish())
    }

    fn serialize_seq(self, len: Option<usize>) -> InspectResult<SerializeSequence> {
        Ok(SerializeSequence {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> InspectResult<SerializeFields> {
        Ok(SerializeFields::new(TUPLE.to_string(), len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> InspectResult<SerializeFields> {
        Ok(SerializeFields::new(name.to_string(), len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> InspectResult<SerializeFields> {
        Ok(SerializeFields::new(variant_name(name, variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> InspectResult<SerializeMapping> {
        Ok(SerializeMapping {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> InspectResult<SerializeFields> {
        Ok(SerializeFields::new(name.to_string(), len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> InspectResult<SerializeFields> {
        Ok(SerializeFields::new(variant_name(name, variant), len))
    }
}

struct SerializeSequence {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SerializeSequence {
    type Ok = Value;
    type Error = InspectError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> InspectResult<()> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> InspectResult<Value> {
        Ok(Value::Sequence(Sequence {
            type_name: "Seq".to_string(),
            items: Some(self.items),
        }))
    }
}

struct SerializeMapping {
    entries: Vec<(Value, Value)>,
    pending_key: Option<Value>,
}

impl ser::SerializeMap for SerializeMapping {
    type Ok = Value;
    type Error = InspectError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> InspectResult<()> {
        self.pending_key = Some(key.serialize(ValueSerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> InspectResult<()> {
        let key = self.pending_key.take().ok_or(InspectError::MissingMapKey)?;
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> InspectResult<Value> {
        Ok(Value::Mapping(Mapping {
            type_name: "Map".to_string(),
            entries: Some(self.entries),
        }))
    }
}

/// Collects struct, tuple and variant fields into a [`Record`]
struct SerializeFields {
    record: Record,
}

impl SerializeFields {
    fn new(type_name: String, len: usize) -> Self {
        Self {
            record: Record {
                type_name,
                fields: Vec::with_capacity(len),
            },
        }
    }

    fn push(&mut self, name: String, value: Value) {
        self.record.fields.push(Field { name, value });
    }

    fn push_positional<T: ?Sized + Serialize>(&mut self, value: &T) -> InspectResult<()> {
        let name = self.record.fields.len().to_string();
        self.push(name, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn push_named<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> InspectResult<()> {
        self.push(key.to_string(), value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> InspectResult<Value> {
        Ok(Value::Record(self.record))
    }
}

impl ser::SerializeTuple for SerializeFields {
    type Ok = Value;
    type Error = InspectError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> InspectResult<()> {
        self.push_positional(value)
    }

    fn end(self) -> InspectResult<Value> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SerializeFields {
    type Ok = Value;
    type Error = InspectError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> InspectResult<()> {
        self.push_positional(value)
    }

    fn end(self) -> InspectResult<Value> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SerializeFields {
    type Ok = Value;
    type Error = InspectError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> InspectResult<()> {
        self.push_positional(value)
    }

    fn end(self) -> InspectResult<Value> {
        self.finish()
    }
}

impl ser::SerializeStruct for SerializeFields {
    type Ok = Value;
    type Error = InspectError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> InspectResult<()> {
        self.push_named(key, value)
    }

    fn end(self) -> InspectResult<Value> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for SerializeFields {
    type Ok = Value;
    type Error = InspectError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> InspectResult<()> {
        self.push_named(key, value)
    }

    fn end(self) -> InspectResult<Value> {
        self.finish()
    }
}
