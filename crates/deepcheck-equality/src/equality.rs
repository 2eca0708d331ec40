//! Deep equality and absence detection

use crate::value::{Mapping, Record, Scalar, Sequence, Value};

/// Decide whether two inspected values are semantically equal
///
/// An `Absent` expected value matches anything [`is_absent`] accepts.
/// Otherwise the values must share a shape and compare equal recursively.
/// Callables are never equal unless both are unset, so a set callable is
/// not even equal to itself. The same holds for uninspectable values.
/// Streams are equal when they are handles to the same channel.
pub fn is_equal(expected: &Value, actual: &Value) -> bool {
    if let Value::Absent = expected {
        return is_absent(actual);
    }
    deep_equal(expected, actual)
}

/// Whether a value is the absence marker or a nil-able shape with unset storage
///
/// Scalars and records are never absent, even when zero-valued.
pub fn is_absent(value: &Value) -> bool {
    match value {
        Value::Absent => true,
        Value::Sequence(s) => s.items.is_none(),
        Value::Mapping(m) => m.entries.is_none(),
        Value::Reference(r) => r.target.is_none(),
        Value::Callable(c) => !c.set,
        Value::Stream(s) => s.endpoint.is_none(),
        Value::Scalar(_) | Value::Record(_) | Value::Uninspectable(_) => false,
    }
}

/// Structural equality without the root absence rule
pub(crate) fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Absent, Value::Absent) => true,
        (Value::Scalar(x), Value::Scalar(y)) => scalar_equal(x, y),
        (Value::Record(x), Value::Record(y)) => record_equal(x, y),
        (Value::Sequence(x), Value::Sequence(y)) => sequence_equal(x, y),
        (Value::Mapping(x), Value::Mapping(y)) => mapping_equal(x, y),
        (Value::Reference(x), Value::Reference(y)) => match (&x.target, &y.target) {
            (None, None) => true,
            (Some(x), Some(y)) => deep_equal(x, y),
            _ => false,
        },
        (Value::Callable(x), Value::Callable(y)) => !x.set && !y.set,
        (Value::Stream(x), Value::Stream(y)) => match (&x.endpoint, &y.endpoint) {
            (None, None) => true,
            (Some(x), Some(y)) => x.same_channel(y.as_ref()),
            _ => false,
        },
        _ => false,
    }
}

fn scalar_equal(a: &Scalar, b: &Scalar) -> bool {
    match (a, b) {
        (Scalar::Unit, Scalar::Unit) => true,
        (Scalar::Bool(x), Scalar::Bool(y)) => x == y,
        (Scalar::Int(x), Scalar::Int(y)) => x == y,
        (Scalar::Uint(x), Scalar::Uint(y)) => x == y,
        // Widths are normalised, so only the numeric value matters
        (Scalar::Int(i), Scalar::Uint(u)) | (Scalar::Uint(u), Scalar::Int(i)) => {
            u128::try_from(*i).is_ok_and(|i| i == *u)
        }
        (Scalar::Float(x), Scalar::Float(y)) => x == y,
        (Scalar::Char(x), Scalar::Char(y)) => x == y,
        (Scalar::Str(x), Scalar::Str(y)) => x == y,
        (Scalar::Bytes(x), Scalar::Bytes(y)) => x == y,
        (Scalar::Time(x), Scalar::Time(y)) => x == y,
        (Scalar::Duration(x), Scalar::Duration(y)) => x == y,
        _ => false,
    }
}

fn record_equal(a: &Record, b: &Record) -> bool {
    a.type_name == b.type_name
        && a.fields.len() == b.fields.len()
        && a.fields.iter().all(|field| {
            b.field(&field.name)
                .is_some_and(|other| deep_equal(&field.value, other))
        })
}

fn sequence_equal(a: &Sequence, b: &Sequence) -> bool {
    match (&a.items, &b.items) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        _ => false,
    }
}

fn mapping_equal(a: &Mapping, b: &Mapping) -> bool {
    match (&a.entries, &b.entries) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, value)| {
                    lookup(b, key).is_some_and(|other| deep_equal(value, other))
                })
        }
        _ => false,
    }
}

/// Find the value stored under a deep-equal key
pub(crate) fn lookup<'a>(entries: &'a [(Value, Value)], key: &Value) -> Option<&'a Value> {
    entries
        .iter()
        .find(|(k, _)| deep_equal(key, k))
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InspectError;
    use crate::inspect::Inspect;
    use crate::value::Uninspectable;
    use std::collections::{BTreeMap, HashMap};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct Node {
        sub: Option<Box<Node>>,
    }

    crate::inspect_record!(Node { sub });

    fn eq<E: Inspect + ?Sized, A: Inspect + ?Sized>(expected: &E, actual: &A) -> bool {
        is_equal(&expected.inspect_value(), &actual.inspect_value())
    }

    #[test]
    fn test_absent_expected_delegates_to_absence() {
        assert!(is_equal(&Value::Absent, &None::<Vec<u8>>.inspect_value()));
        assert!(is_equal(&Value::Absent, &Value::Absent));
        assert!(!is_equal(&Value::Absent, &false.inspect_value()));
        assert!(!is_equal(&Value::Absent, &Node::default().inspect_value()));
    }

    #[test]
    fn test_absence_of_every_nil_shape() {
        let (tx, _rx) = mpsc::channel::<i32>(1);
        let (unbounded_tx, _unbounded_rx) = mpsc::unbounded_channel::<i32>();

        assert!(is_absent(&Value::Absent));
        assert!(is_absent(&None::<Node>.inspect_value()));
        assert!(is_absent(&None::<HashMap<String, String>>.inspect_value()));
        assert!(is_absent(&None::<Vec<String>>.inspect_value()));
        assert!(is_absent(&None::<fn(i32) -> i32>.inspect_value()));
        assert!(is_absent(&None::<mpsc::Sender<i32>>.inspect_value()));
        assert!(is_absent(&None::<mpsc::UnboundedSender<i32>>.inspect_value()));

        assert!(!is_absent(&Some(Node::default()).inspect_value()));
        assert!(!is_absent(&HashMap::<String, String>::new().inspect_value()));
        assert!(!is_absent(&Vec::<String>::new().inspect_value()));
        assert!(!is_absent(&Some((|x: i32| x) as fn(i32) -> i32).inspect_value()));
        assert!(!is_absent(&tx.inspect_value()));
        assert!(!is_absent(&unbounded_tx.inspect_value()));
    }

    #[test]
    fn test_zero_values_are_present() {
        assert!(!is_absent(&0i32.inspect_value()));
        assert!(!is_absent(&"".inspect_value()));
        assert!(!is_absent(&().inspect_value()));
        // Only the field is unset, not the record holding it
        assert!(!is_absent(&Node::default().inspect_value()));
        assert!(is_absent(&Node::default().sub.inspect_value()));
    }

    #[test]
    fn test_scalars() {
        assert!(eq("foo", &String::from("foo")));
        assert!(!eq("foo", "bar"));
        assert!(eq(&5i32, &5usize));
        assert!(!eq(&-1i64, &u64::MAX));
        assert!(!eq(&1i32, &1.0f64));
        assert!(!eq(&f64::NAN, &f64::NAN));
        assert!(!eq(&'a', "a"));
    }

    #[test]
    fn test_integers_compare_by_value_across_widths() {
        // Integers compare by value whatever their width or signedness
        assert!(eq(&7u8, &7i64));
        assert!(eq(&255u8, &255u64));
        assert!(eq(&-3i8, &-3i128));
        assert!(!eq(&-1i32, &u32::MAX));
        assert!(!eq(&7u8, &8u8));
    }

    #[test]
    fn test_records_compare_type_and_fields() {
        assert!(eq(&Node::default(), &Node::default()));
        let nested = Node {
            sub: Some(Box::new(Node::default())),
        };
        assert!(!eq(&Node::default(), &nested));
        assert!(!eq(&Some(Node::default()), &Node::default()));

        let a = Value::named_record("Pair")
            .value("a", 1i32.inspect_value())
            .value("b", 2i32.inspect_value())
            .finish();
        let reordered = Value::named_record("Pair")
            .value("b", 2i32.inspect_value())
            .value("a", 1i32.inspect_value())
            .finish();
        let renamed = Value::named_record("Other")
            .value("a", 1i32.inspect_value())
            .value("b", 2i32.inspect_value())
            .finish();
        assert!(is_equal(&a, &reordered));
        assert!(!is_equal(&a, &renamed));
    }

    #[test]
    fn test_sequences_are_order_sensitive() {
        assert!(eq(&vec![1, 2, 3], &[1, 2, 3]));
        assert!(!eq(&vec![1, 2, 3], &vec![3, 2, 1]));
        assert!(!eq(&vec![1, 2], &vec![1, 2, 3]));
        assert!(!eq(&None::<Vec<i32>>, &Vec::<i32>::new()));
        assert!(eq(&None::<Vec<i32>>, &None::<Vec<i32>>));
    }

    #[test]
    fn test_mappings_match_by_key() {
        let a: HashMap<&str, i32> = [("x", 1), ("y", 2)].into_iter().collect();
        let b: BTreeMap<&str, i32> = [("y", 2), ("x", 1)].into_iter().collect();
        let c: BTreeMap<&str, i32> = [("y", 2), ("x", 3)].into_iter().collect();
        let d: BTreeMap<&str, i32> = [("y", 2), ("z", 1)].into_iter().collect();
        assert!(eq(&a, &b));
        assert!(!eq(&a, &c));
        assert!(!eq(&a, &d));
    }

    #[test]
    fn test_callables_never_equal_unless_unset() {
        let f: fn(i32) -> i32 = |x| x + 1;
        assert!(!eq(&f, &f));
        assert!(eq(&None::<fn(i32) -> i32>, &None::<fn(i32) -> i32>));
    }

    #[test]
    fn test_streams_compare_by_channel() {
        let (tx, _rx) = mpsc::channel::<i32>(1);
        let (other_tx, _other_rx) = mpsc::channel::<i32>(1);
        assert!(eq(&tx, &tx));
        assert!(eq(&tx, &tx.clone()));
        assert!(!eq(&tx, &other_tx));
        assert!(eq(&None::<mpsc::Sender<i32>>, &None::<mpsc::Sender<i32>>));
        assert!(!eq(&Some(tx), &None::<mpsc::Sender<i32>>));
    }

    #[test]
    fn test_distinct_short_lived_channels_differ() {
        fn fresh() -> Value {
            let (tx, _rx) = mpsc::channel::<i32>(1);
            tx.inspect_value()
        }

        let first = fresh();
        let second = fresh();
        assert!(!is_equal(&first, &second));
        assert!(is_equal(&first, &first.clone()));
    }

    #[test]
    fn test_moved_handle_keeps_channel_identity() {
        let (tx, _rx) = mpsc::unbounded_channel::<i32>();
        let before = tx.inspect_value();
        let moved = Box::new(tx);
        assert!(is_equal(&before, &moved.inspect_value()));
    }

    #[test]
    fn test_senders_of_different_kinds_differ() {
        let (tx, _rx) = mpsc::channel::<i32>(1);
        let (unbounded_tx, _unbounded_rx) = mpsc::unbounded_channel::<i32>();
        assert!(!eq(&tx, &unbounded_tx));
    }

    #[test]
    fn test_uninspectable_never_equal() {
        let broken = Value::Uninspectable(Uninspectable {
            type_name: "Broken".to_string(),
            error: InspectError::Custom {
                message: "no".to_string(),
            },
        });
        assert!(!is_equal(&broken, &broken));
        assert!(!is_absent(&broken));
        assert!(!is_equal(&Value::Absent, &broken));
    }
}
