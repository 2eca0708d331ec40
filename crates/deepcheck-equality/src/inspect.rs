//! Conversion of Rust values into the closed [`Value`] model

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Offset, TimeZone, Utc};
use tokio::sync::mpsc;

use crate::type_name::short_type_name;
use crate::value::{Callable, Endpoint, Mapping, Reference, Scalar, Sequence, Stream, Value};

/// Describe a value as a [`Value`] so it can be compared and diffed
///
/// References and smart pointers are transparent. `Option<T>` takes the
/// shape given by [`Inspect::inspect_option`], which is how the nil-able
/// shapes get their unset state.
pub trait Inspect {
    fn inspect_value(&self) -> Value;

    /// Shape of `Option<Self>`
    ///
    /// Sequences, mappings, callables and streams keep their own shape with
    /// unset storage; every other type becomes a nullable reference.
    fn inspect_option(value: Option<&Self>) -> Value {
        Value::Reference(Reference {
            type_name: format!("Option<{}>", short_type_name::<Self>()),
            target: value.map(|v| Box::new(v.inspect_value())),
        })
    }
}

/// Implement [`Inspect`] for a struct by listing its fields
///
/// ```
/// use deepcheck_equality::{inspect_record, Inspect};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// inspect_record!(Point { x, y });
///
/// assert_eq!(Point { x: 3, y: 4 }.inspect_value().to_string(), "Point { x: 3, y: 4 }");
/// ```
#[macro_export]
macro_rules! inspect_record {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Inspect for $ty {
            fn inspect_value(&self) -> $crate::Value {
                $crate::Value::record::<Self>()
                    $(.field(stringify!($field), &self.$field))*
                    .finish()
            }
        }
    };
}

impl Inspect for Value {
    fn inspect_value(&self) -> Value {
        self.clone()
    }
}

// ==================== Scalars ====================

macro_rules! impl_scalar {
    ($variant:ident($wide:ty): $($ty:ty),*) => {
        $(
            impl Inspect for $ty {
                fn inspect_value(&self) -> Value {
                    Value::Scalar(Scalar::$variant(<$wide>::from(*self)))
                }
            }
        )*
    };
}

impl_scalar!(Int(i128): i8, i16, i32, i64, i128);
impl_scalar!(Uint(u128): u8, u16, u32, u64, u128);
impl_scalar!(Float(f64): f32, f64);
impl_scalar!(Bool(bool): bool);
impl_scalar!(Char(char): char);

impl Inspect for isize {
    fn inspect_value(&self) -> Value {
        // isize is at most 64 bits wide on every supported target
        Value::Scalar(Scalar::Int(*self as i128))
    }
}

impl Inspect for usize {
    fn inspect_value(&self) -> Value {
        Value::Scalar(Scalar::Uint(*self as u128))
    }
}

impl Inspect for () {
    fn inspect_value(&self) -> Value {
        Value::Scalar(Scalar::Unit)
    }
}

impl Inspect for str {
    fn inspect_value(&self) -> Value {
        Value::str(self)
    }
}

impl Inspect for String {
    fn inspect_value(&self) -> Value {
        Value::str(self.as_str())
    }
}

// ==================== Transparent pointers ====================

impl<T: Inspect + ?Sized> Inspect for &T {
    fn inspect_value(&self) -> Value {
        (**self).inspect_value()
    }

    fn inspect_option(value: Option<&Self>) -> Value {
        T::inspect_option(value.map(|v| &**v))
    }
}

impl<T: Inspect + ?Sized> Inspect for &mut T {
    fn inspect_value(&self) -> Value {
        (**self).inspect_value()
    }

    fn inspect_option(value: Option<&Self>) -> Value {
        T::inspect_option(value.map(|v| &**v))
    }
}

macro_rules! impl_smart_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Inspect + ?Sized> Inspect for $ptr<T> {
                fn inspect_value(&self) -> Value {
                    (**self).inspect_value()
                }

                fn inspect_option(value: Option<&Self>) -> Value {
                    T::inspect_option(value.map(|v| &**v))
                }
            }
        )*
    };
}

impl_smart_pointer!(Box, Rc, Arc);

impl<T: Inspect> Inspect for Option<T> {
    fn inspect_value(&self) -> Value {
        T::inspect_option(self.as_ref())
    }
}

// ==================== Sequences ====================

fn sequence<'a, C, T, I>(items: Option<I>) -> Value
where
    C: ?Sized,
    T: Inspect + 'a,
    I: IntoIterator<Item = &'a T>,
{
    Value::Sequence(Sequence {
        type_name: short_type_name::<C>(),
        items: items.map(|items| items.into_iter().map(Inspect::inspect_value).collect()),
    })
}

impl<T: Inspect> Inspect for [T] {
    fn inspect_value(&self) -> Value {
        Self::inspect_option(Some(self))
    }

    fn inspect_option(value: Option<&Self>) -> Value {
        sequence::<Self, _, _>(value)
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn inspect_value(&self) -> Value {
        Self::inspect_option(Some(self))
    }

    fn inspect_option(value: Option<&Self>) -> Value {
        sequence::<Self, _, _>(value)
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn inspect_value(&self) -> Value {
        Self::inspect_option(Some(self))
    }

    fn inspect_option(value: Option<&Self>) -> Value {
        sequence::<Self, _, _>(value)
    }
}

/// Arrays can never be unset, so `Option<[T; N]>` stays a nullable reference
impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn inspect_value(&self) -> Value {
        sequence::<Self, _, _>(Some(self))
    }
}

// ==================== Mappings ====================

fn mapping<'a, C, K, V, I>(entries: Option<I>) -> Value
where
    C: ?Sized,
    K: Inspect + 'a,
    V: Inspect + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    Value::Mapping(Mapping {
        type_name: short_type_name::<C>(),
        entries: entries.map(|entries| {
            entries
                .into_iter()
                .map(|(k, v)| (k.inspect_value(), v.inspect_value()))
                .collect()
        }),
    })
}

fn set<'a, C, T, I>(members: Option<I>) -> Value
where
    C: ?Sized,
    T: Inspect + 'a,
    I: IntoIterator<Item = &'a T>,
{
    Value::Mapping(Mapping {
        type_name: short_type_name::<C>(),
        entries: members.map(|members| {
            members
                .into_iter()
                .map(|m| (m.inspect_value(), Value::Scalar(Scalar::Unit)))
                .collect()
        }),
    })
}

impl<K: Inspect, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn inspect_value(&self) -> Value {
        Self::inspect_option(Some(self))
    }

    fn inspect_option(value: Option<&Self>) -> Value {
        mapping::<Self, _, _, _>(value)
    }
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn inspect_value(&self) -> Value {
        Self::inspect_option(Some(self))
    }

    fn inspect_option(value: Option<&Self>) -> Value {
        mapping::<Self, _, _, _>(value)
    }
}

impl<T: Inspect, S> Inspect for HashSet<T, S> {
    fn inspect_value(&self) -> Value {
        Self::inspect_option(Some(self))
    }

    fn inspect_option(value: Option<&Self>) -> Value {
        set::<Self, _, _>(value)
    }
}

impl<T: Inspect> Inspect for BTreeSet<T> {
    fn inspect_value(&self) -> Value {
        Self::inspect_option(Some(self))
    }

    fn inspect_option(value: Option<&Self>) -> Value {
        set::<Self, _, _>(value)
    }
}

// ==================== Tuples ====================

macro_rules! impl_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Inspect),+> Inspect for ($($name,)+) {
            fn inspect_value(&self) -> Value {
                Value::record::<Self>()
                    $(.field(stringify!($idx), &self.$idx))+
                    .finish()
            }
        }
    };
}

impl_tuple!(A: 0);
impl_tuple!(A: 0, B: 1);
impl_tuple!(A: 0, B: 1, C: 2);
impl_tuple!(A: 0, B: 1, C: 2, D: 3);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);

// ==================== Callables ====================

fn callable<C: ?Sized>(set: bool) -> Value {
    Value::Callable(Callable {
        type_name: short_type_name::<C>(),
        set,
    })
}

macro_rules! impl_callable {
    ($($ty:ty => [$($arg:ident),*]);* $(;)?) => {
        $(
            impl<R, $($arg),*> Inspect for $ty {
                fn inspect_value(&self) -> Value {
                    callable::<Self>(true)
                }

                fn inspect_option(value: Option<&Self>) -> Value {
                    callable::<Self>(value.is_some())
                }
            }
        )*
    };
}

impl_callable! {
    fn() -> R => [];
    fn(A) -> R => [A];
    fn(A, B) -> R => [A, B];
    fn(A, B, C) -> R => [A, B, C];
    dyn Fn() -> R => [];
    dyn Fn(A) -> R => [A];
    dyn Fn(A, B) -> R => [A, B];
    dyn Fn(A, B, C) -> R => [A, B, C];
    dyn Fn() -> R + Send + Sync => [];
    dyn Fn(A) -> R + Send + Sync => [A];
    dyn Fn(A, B) -> R + Send + Sync => [A, B];
    dyn Fn(A, B, C) -> R + Send + Sync => [A, B, C];
    dyn FnMut() -> R => [];
    dyn FnMut(A) -> R => [A];
    dyn FnMut(A, B) -> R => [A, B];
    dyn FnMut(A, B, C) -> R => [A, B, C];
    dyn FnOnce() -> R => [];
    dyn FnOnce(A) -> R => [A];
    dyn FnOnce(A, B) -> R => [A, B];
    dyn FnOnce(A, B, C) -> R => [A, B, C];
}

// ==================== Streams ====================

fn stream<C: Endpoint + Clone>(value: Option<&C>) -> Value {
    Value::Stream(Stream {
        type_name: short_type_name::<C>(),
        endpoint: value.map(|v| Arc::new(v.clone()) as Arc<dyn Endpoint>),
    })
}

macro_rules! impl_stream {
    ($($endpoint:ty),*) => {
        $(
            impl<T: Send + 'static> Endpoint for $endpoint {
                fn same_channel(&self, other: &dyn Endpoint) -> bool {
                    other
                        .as_any()
                        .downcast_ref::<Self>()
                        .is_some_and(|other| <$endpoint>::same_channel(self, other))
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }

            impl<T: Send + 'static> Inspect for $endpoint {
                fn inspect_value(&self) -> Value {
                    stream(Some(self))
                }

                fn inspect_option(value: Option<&Self>) -> Value {
                    stream(value)
                }
            }
        )*
    };
}

impl_stream!(mpsc::Sender<T>, mpsc::UnboundedSender<T>);

// ==================== Time ====================

impl<Tz: TimeZone> Inspect for DateTime<Tz> {
    fn inspect_value(&self) -> Value {
        let offset = self.offset().fix();
        Value::Scalar(Scalar::Time(self.with_timezone(&offset)))
    }
}

impl Inspect for NaiveDateTime {
    fn inspect_value(&self) -> Value {
        Utc.from_utc_datetime(self).inspect_value()
    }
}

impl Inspect for chrono::Duration {
    fn inspect_value(&self) -> Value {
        let nanos = self
            .num_nanoseconds()
            .map(i128::from)
            .unwrap_or_else(|| i128::from(self.num_milliseconds()) * 1_000_000);
        Value::Scalar(Scalar::Duration(nanos))
    }
}

impl Inspect for std::time::Duration {
    fn inspect_value(&self) -> Value {
        let nanos = i128::try_from(self.as_nanos()).unwrap_or(i128::MAX);
        Value::Scalar(Scalar::Duration(nanos))
    }
}

// ==================== JSON ====================

/// JSON `null` is the untyped absence marker
impl Inspect for serde_json::Value {
    fn inspect_value(&self) -> Value {
        use serde_json::Value as Json;

        match self {
            Json::Null => Value::Absent,
            Json::Bool(b) => Value::Scalar(Scalar::Bool(*b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Scalar(Scalar::Int(i128::from(i)))
                } else if let Some(u) = n.as_u64() {
                    Value::Scalar(Scalar::Uint(u128::from(u)))
                } else {
                    Value::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Json::String(s) => Value::str(s.as_str()),
            Json::Array(items) => Value::Sequence(Sequence {
                type_name: "Array".to_string(),
                items: Some(items.iter().map(Inspect::inspect_value).collect()),
            }),
            Json::Object(object) => Value::Mapping(Mapping {
                type_name: "Object".to_string(),
                entries: Some(
                    object
                        .iter()
                        .map(|(k, v)| (Value::str(k.as_str()), v.inspect_value()))
                        .collect(),
                ),
            }),
        }
    }
}
