//! Closed value model every comparison operates on

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::error::InspectError;
use crate::inspect::Inspect;
use crate::type_name::short_type_name;

/// The shape tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Absent,
    Scalar,
    Record,
    Sequence,
    Mapping,
    Reference,
    Callable,
    Stream,
    Uninspectable,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Absent => write!(f, "absent"),
            Shape::Scalar => write!(f, "scalar"),
            Shape::Record => write!(f, "record"),
            Shape::Sequence => write!(f, "sequence"),
            Shape::Mapping => write!(f, "mapping"),
            Shape::Reference => write!(f, "reference"),
            Shape::Callable => write!(f, "callable"),
            Shape::Stream => write!(f, "stream"),
            Shape::Uninspectable => write!(f, "uninspectable"),
        }
    }
}

/// An inspected value
///
/// Nil-able shapes (sequence, mapping, reference, callable, stream) carry
/// their storage as an `Option`; `None` means the storage is unset, which is
/// different from an allocated but empty container.
#[derive(Debug, Clone)]
pub enum Value {
    /// The untyped absence marker
    Absent,
    Scalar(Scalar),
    Record(Record),
    Sequence(Sequence),
    Mapping(Mapping),
    Reference(Reference),
    Callable(Callable),
    Stream(Stream),
    /// A value whose inspection failed; never equal to anything
    Uninspectable(Uninspectable),
}

/// Primitive values
#[derive(Debug, Clone)]
pub enum Scalar {
    Unit,
    Bool(bool),
    Int(i128),
    Uint(u128),
    Float(f64),
    Char(char),
    Str(String),
    Bytes(Vec<u8>),
    /// A point in time, compared by instant
    Time(DateTime<FixedOffset>),
    /// A signed span in nanoseconds
    Duration(i128),
}

/// A structured record with named fields
///
/// Tuples and tuple structs use their positions ("0", "1", ...) as names.
#[derive(Debug, Clone)]
pub struct Record {
    pub type_name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

/// An ordered sequence
#[derive(Debug, Clone)]
pub struct Sequence {
    pub type_name: String,
    pub items: Option<Vec<Value>>,
}

/// A key-value mapping, matched by key regardless of entry order
#[derive(Debug, Clone)]
pub struct Mapping {
    pub type_name: String,
    pub entries: Option<Vec<(Value, Value)>>,
}

/// A nullable reference
#[derive(Debug, Clone)]
pub struct Reference {
    pub type_name: String,
    pub target: Option<Box<Value>>,
}

/// A function value; only its presence is observable
#[derive(Debug, Clone)]
pub struct Callable {
    pub type_name: String,
    pub set: bool,
}

/// A channel endpoint, identified by the channel it belongs to
#[derive(Debug, Clone)]
pub struct Stream {
    pub type_name: String,
    pub endpoint: Option<Arc<dyn Endpoint>>,
}

/// A live handle to one end of a channel
///
/// The handle is kept inside the [`Value`], so the channel stays open for as
/// long as the inspected value lives.
pub trait Endpoint: fmt::Debug + Send + Sync + 'static {
    /// Whether `other` is a handle to the same channel
    fn same_channel(&self, other: &dyn Endpoint) -> bool;

    fn as_any(&self) -> &dyn Any;
}

/// A value that could not be inspected
#[derive(Debug, Clone)]
pub struct Uninspectable {
    pub type_name: String,
    pub error: InspectError,
}

impl Value {
    /// Start describing a record named after `T`
    pub fn record<T: ?Sized>() -> RecordBuilder {
        RecordBuilder::new(short_type_name::<T>())
    }

    /// Start describing a record with an explicit type name
    pub fn named_record(type_name: impl Into<String>) -> RecordBuilder {
        RecordBuilder::new(type_name.into())
    }

    pub fn str(value: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Str(value.into()))
    }

    pub fn shape(&self) -> Shape {
        match self {
            Value::Absent => Shape::Absent,
            Value::Scalar(_) => Shape::Scalar,
            Value::Record(_) => Shape::Record,
            Value::Sequence(_) => Shape::Sequence,
            Value::Mapping(_) => Shape::Mapping,
            Value::Reference(_) => Shape::Reference,
            Value::Callable(_) => Shape::Callable,
            Value::Stream(_) => Shape::Stream,
            Value::Uninspectable(_) => Shape::Uninspectable,
        }
    }

    /// Type name of the inspected value, when the shape carries one
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Value::Absent | Value::Scalar(_) => None,
            Value::Record(r) => Some(&r.type_name),
            Value::Sequence(s) => Some(&s.type_name),
            Value::Mapping(m) => Some(&m.type_name),
            Value::Reference(r) => Some(&r.type_name),
            Value::Callable(c) => Some(&c.type_name),
            Value::Stream(s) => Some(&s.type_name),
            Value::Uninspectable(u) => Some(&u.type_name),
        }
    }

    /// First part of this value, depth first, that could not be inspected
    pub fn uninspectable(&self) -> Option<&Uninspectable> {
        match self {
            Value::Uninspectable(u) => Some(u),
            Value::Record(record) => record.fields.iter().find_map(|f| f.value.uninspectable()),
            Value::Sequence(Sequence {
                items: Some(items), ..
            }) => items.iter().find_map(Value::uninspectable),
            Value::Mapping(Mapping {
                entries: Some(entries),
                ..
            }) => entries
                .iter()
                .find_map(|(k, v)| k.uninspectable().or_else(|| v.uninspectable())),
            Value::Reference(Reference {
                target: Some(target),
                ..
            }) => target.uninspectable(),
            _ => None,
        }
    }

    /// Rendering that quotes strings and chars, used in difference lines
    pub fn literal(&self) -> Literal<'_> {
        Literal(self)
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, quoted: bool) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "None"),
            Value::Scalar(scalar) => scalar.render(f, quoted),
            Value::Record(record) => record.render(f),
            Value::Sequence(Sequence { items: None, .. })
            | Value::Mapping(Mapping { entries: None, .. })
            | Value::Reference(Reference { target: None, .. })
            | Value::Callable(Callable { set: false, .. })
            | Value::Stream(Stream { endpoint: None, .. }) => write!(f, "None"),
            Value::Sequence(Sequence {
                items: Some(items), ..
            }) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.render(f, true)?;
                }
                write!(f, "]")
            }
            Value::Mapping(Mapping {
                entries: Some(entries),
                ..
            }) => {
                let is_set = entries
                    .iter()
                    .all(|(_, v)| matches!(v, Value::Scalar(Scalar::Unit)));
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    key.render(f, true)?;
                    if !is_set {
                        write!(f, ": ")?;
                        value.render(f, true)?;
                    }
                }
                write!(f, "}}")
            }
            Value::Reference(Reference {
                target: Some(target),
                ..
            }) => {
                write!(f, "Some(")?;
                target.render(f, true)?;
                write!(f, ")")
            }
            Value::Callable(c) => write!(f, "<{}>", c.type_name),
            Value::Stream(s) => write!(f, "<{}>", s.type_name),
            Value::Uninspectable(u) => write!(f, "<{}: {}>", u.type_name, u.error),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, false)
    }
}

/// See [`Value::literal`]
pub struct Literal<'a>(&'a Value);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.render(f, true)
    }
}

impl Scalar {
    fn render(&self, f: &mut fmt::Formatter<'_>, quoted: bool) -> fmt::Result {
        match self {
            Scalar::Unit => write!(f, "()"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Uint(u) => write!(f, "{u}"),
            Scalar::Float(x) => write!(f, "{x:?}"),
            Scalar::Char(c) if quoted => write!(f, "{c:?}"),
            Scalar::Char(c) => write!(f, "{c}"),
            Scalar::Str(s) if quoted => write!(f, "{s:?}"),
            Scalar::Str(s) => write!(f, "{s}"),
            Scalar::Bytes(bytes) => write!(f, "{bytes:?}"),
            Scalar::Time(time) => write!(f, "{}", time.to_rfc3339()),
            Scalar::Duration(nanos) => write!(f, "{}", format_nanos(*nanos)),
        }
    }
}

impl Record {
    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    fn is_positional(&self) -> bool {
        !self.fields.is_empty()
            && self
                .fields
                .iter()
                .enumerate()
                .all(|(i, field)| field.name == i.to_string())
    }

    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return write!(f, "{}", self.type_name);
        }

        if self.is_positional() {
            // Tuples already spell their own parentheses in the type name
            if !self.type_name.starts_with('(') {
                write!(f, "{}", self.type_name)?;
            }
            write!(f, "(")?;
            for (i, field) in self.fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                field.value.render(f, true)?;
            }
            if self.fields.len() == 1 && self.type_name.starts_with('(') {
                write!(f, ",")?;
            }
            return write!(f, ")");
        }

        write!(f, "{} {{ ", self.type_name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: ", field.name)?;
            field.value.render(f, true)?;
        }
        write!(f, " }}")
    }
}

/// Builder for [`Record`] values
///
/// ```
/// use deepcheck_equality::{Inspect, Value};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Inspect for Point {
///     fn inspect_value(&self) -> Value {
///         Value::record::<Self>()
///             .field("x", &self.x)
///             .field("y", &self.y)
///             .finish()
///     }
/// }
///
/// assert_eq!(Point { x: 1, y: 2 }.inspect_value().to_string(), "Point { x: 1, y: 2 }");
/// ```
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    fn new(type_name: String) -> Self {
        Self {
            record: Record {
                type_name,
                fields: Vec::new(),
            },
        }
    }

    pub fn field<T: Inspect + ?Sized>(self, name: impl Into<String>, value: &T) -> Self {
        self.value(name, value.inspect_value())
    }

    /// Add a field from an already inspected value
    pub fn value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.record.fields.push(Field {
            name: name.into(),
            value,
        });
        self
    }

    pub fn finish(self) -> Value {
        Value::Record(self.record)
    }
}

/// Render a nanosecond span the way `std::time::Duration`'s `Debug` does,
/// with a leading sign for negative spans.
pub fn format_nanos(nanos: i128) -> String {
    let sign = if nanos < 0 { "-" } else { "" };
    let magnitude = nanos.unsigned_abs();
    let secs = u64::try_from(magnitude / 1_000_000_000).unwrap_or(u64::MAX);
    // The remainder is always below one second
    let subsec = (magnitude % 1_000_000_000) as u32;
    format!("{sign}{:?}", std::time::Duration::new(secs, subsec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_nested_strings_only() {
        let value = Value::Sequence(Sequence {
            type_name: "Vec<&str>".to_string(),
            items: Some(vec![Value::str("a"), Value::str("b")]),
        });
        assert_eq!(value.to_string(), r#"["a", "b"]"#);
        assert_eq!(Value::str("foo").to_string(), "foo");
        assert_eq!(Value::str("foo").literal().to_string(), "\"foo\"");
    }

    #[test]
    fn test_display_unset_shapes() {
        let unset = [
            Value::Absent,
            Value::Sequence(Sequence {
                type_name: "Vec<i32>".to_string(),
                items: None,
            }),
            Value::Mapping(Mapping {
                type_name: "HashMap<String, i32>".to_string(),
                entries: None,
            }),
            Value::Reference(Reference {
                type_name: "Option<i32>".to_string(),
                target: None,
            }),
            Value::Callable(Callable {
                type_name: "fn()".to_string(),
                set: false,
            }),
            Value::Stream(Stream {
                type_name: "Sender<i32>".to_string(),
                endpoint: None,
            }),
        ];
        for value in unset {
            assert_eq!(value.to_string(), "None");
        }
    }

    #[test]
    fn test_display_records() {
        let point = Value::named_record("Point")
            .value("x", Value::Scalar(Scalar::Int(1)))
            .value("y", Value::Scalar(Scalar::Int(-2)))
            .finish();
        assert_eq!(point.to_string(), "Point { x: 1, y: -2 }");

        let wrapper = Value::named_record("Meters")
            .value("0", Value::Scalar(Scalar::Float(1.5)))
            .finish();
        assert_eq!(wrapper.to_string(), "Meters(1.5)");

        let single = Value::named_record("(char,)")
            .value("0", Value::Scalar(Scalar::Char('x')))
            .finish();
        assert_eq!(single.to_string(), "('x',)");

        assert_eq!(Value::named_record("Marker").finish().to_string(), "Marker");
    }

    #[test]
    fn test_format_nanos() {
        assert_eq!(format_nanos(5_000_000_000), "5s");
        assert_eq!(format_nanos(-1_500_000), "-1.5ms");
        assert_eq!(format_nanos(0), "0ns");
    }

    #[test]
    fn test_uninspectable_found_in_nested_values() {
        let broken = Value::Uninspectable(Uninspectable {
            type_name: "Broken".to_string(),
            error: InspectError::Custom {
                message: "no".to_string(),
            },
        });
        let value = Value::named_record("Outer")
            .value("ok", Value::str("fine"))
            .value(
                "items",
                Value::Sequence(Sequence {
                    type_name: "Vec<Broken>".to_string(),
                    items: Some(vec![broken.clone()]),
                }),
            )
            .finish();

        let found = value.uninspectable().unwrap();
        assert_eq!(found.type_name, "Broken");
        assert_eq!(broken.to_string(), "<Broken: failed to inspect value: no>");
        assert!(Value::str("fine").uninspectable().is_none());
    }
}
