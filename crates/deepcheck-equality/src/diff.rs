//! Structural diff between two inspected values

use std::fmt;

use crate::equality::{deep_equal, is_equal, lookup};
use crate::value::{Mapping, Record, Sequence, Value};

/// A specific difference between an expected and an actual value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    pub category: DiffCategory,
    /// Location of the difference; empty at the root
    pub path: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffCategory {
    /// Shapes or record types differ
    Type,
    Value,
    Length,
    Missing,
    Extra,
}

impl fmt::Display for DiffCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffCategory::Type => write!(f, "TYPE"),
            DiffCategory::Value => write!(f, "VALUE"),
            DiffCategory::Length => write!(f, "LENGTH"),
            DiffCategory::Missing => write!(f, "MISSING"),
            DiffCategory::Extra => write!(f, "EXTRA"),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} != {}", self.expected, self.actual)
        } else {
            write!(f, "{}: {} != {}", self.path, self.expected, self.actual)
        }
    }
}

/// Service that explains why two values differ, one line per difference
pub trait DiffFormatter {
    /// Empty when the values are structurally identical
    fn differences(&self, expected: &Value, actual: &Value) -> Vec<String>;
}

/// The default [`DiffFormatter`], backed by [`diff`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralDiff;

impl DiffFormatter for StructuralDiff {
    fn differences(&self, expected: &Value, actual: &Value) -> Vec<String> {
        diff(expected, actual)
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

/// Walk both values and collect every field, element or entry that differs
///
/// The result is empty exactly when [`is_equal`] holds.
pub fn diff(expected: &Value, actual: &Value) -> Vec<Difference> {
    let mut differences = Vec::new();
    // The absence rule only applies to the root value
    if !(matches!(expected, Value::Absent) && is_equal(expected, actual)) {
        compare_values("", expected, actual, &mut differences);
    }
    differences
}

fn compare_values(
    path: &str,
    expected: &Value,
    actual: &Value,
    differences: &mut Vec<Difference>,
) {
    match (expected, actual) {
        (Value::Record(exp), Value::Record(act)) if exp.type_name == act.type_name => {
            compare_records(path, exp, act, differences);
        }
        (
            Value::Sequence(Sequence {
                items: Some(exp), ..
            }),
            Value::Sequence(Sequence {
                items: Some(act), ..
            }),
        ) => {
            if exp.len() != act.len() {
                differences.push(Difference {
                    category: DiffCategory::Length,
                    path: join(path, "len()"),
                    expected: exp.len().to_string(),
                    actual: act.len().to_string(),
                });
            }

            // Elements past the shorter length are covered by the length line
            for (i, (exp_item, act_item)) in exp.iter().zip(act.iter()).enumerate() {
                let item_path = format!("{}[{}]", path, i);
                compare_values(&item_path, exp_item, act_item, differences);
            }
        }
        (
            Value::Mapping(Mapping {
                entries: Some(exp), ..
            }),
            Value::Mapping(Mapping {
                entries: Some(act), ..
            }),
        ) => {
            compare_entries(path, exp, act, differences);
        }
        (Value::Reference(exp), Value::Reference(act)) => {
            if let (Some(exp_target), Some(act_target)) = (&exp.target, &act.target) {
                compare_values(path, exp_target, act_target, differences);
            } else {
                compare_leaf(path, expected, actual, differences);
            }
        }
        _ => compare_leaf(path, expected, actual, differences),
    }
}

fn compare_records(
    path: &str,
    expected: &Record,
    actual: &Record,
    differences: &mut Vec<Difference>,
) {
    for field in &expected.fields {
        let field_path = join(path, &field.name);
        match actual.field(&field.name) {
            Some(act_value) => {
                compare_values(&field_path, &field.value, act_value, differences);
            }
            None => {
                differences.push(Difference {
                    category: DiffCategory::Missing,
                    path: field_path,
                    expected: field.value.literal().to_string(),
                    actual: "(missing)".to_string(),
                });
            }
        }
    }

    for field in &actual.fields {
        if expected.field(&field.name).is_none() {
            differences.push(Difference {
                category: DiffCategory::Extra,
                path: join(path, &field.name),
                expected: "(not present)".to_string(),
                actual: field.value.literal().to_string(),
            });
        }
    }
}

fn compare_entries(
    path: &str,
    expected: &[(Value, Value)],
    actual: &[(Value, Value)],
    differences: &mut Vec<Difference>,
) {
    for (key, exp_value) in expected {
        let entry_path = format!("{}[{}]", path, key.literal());
        match lookup(actual, key) {
            Some(act_value) => {
                compare_values(&entry_path, exp_value, act_value, differences);
            }
            None => {
                differences.push(Difference {
                    category: DiffCategory::Missing,
                    path: entry_path,
                    expected: exp_value.literal().to_string(),
                    actual: "(missing)".to_string(),
                });
            }
        }
    }

    for (key, act_value) in actual {
        if lookup(expected, key).is_none() {
            differences.push(Difference {
                category: DiffCategory::Extra,
                path: format!("{}[{}]", path, key.literal()),
                expected: "(not present)".to_string(),
                actual: act_value.literal().to_string(),
            });
        }
    }
}

fn compare_leaf(
    path: &str,
    expected: &Value,
    actual: &Value,
    differences: &mut Vec<Difference>,
) {
    if deep_equal(expected, actual) {
        return;
    }

    let same_type = expected.shape() == actual.shape()
        && expected.type_name().is_none() == actual.type_name().is_none()
        && !matches!((expected, actual), (Value::Record(_), Value::Record(_)));

    let (expected_text, actual_text) = if same_type {
        (expected.literal().to_string(), actual.literal().to_string())
    } else {
        (describe(expected), describe(actual))
    };

    differences.push(Difference {
        category: if same_type {
            DiffCategory::Value
        } else {
            DiffCategory::Type
        },
        path: path.to_string(),
        expected: expected_text,
        actual: actual_text,
    });
}

/// Literal rendering, prefixed with the type name when the shape has one
fn describe(value: &Value) -> String {
    match value.type_name() {
        Some(type_name) if !matches!(value, Value::Record(_)) => {
            format!("{}({})", type_name, value.literal())
        }
        _ => value.literal().to_string(),
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::Inspect;
    use std::collections::BTreeMap;

    struct Address {
        city: String,
        zip: Option<u32>,
    }

    struct Person {
        name: String,
        tags: Vec<String>,
        address: Address,
    }

    crate::inspect_record!(Address { city, zip });
    crate::inspect_record!(Person { name, tags, address });

    fn person() -> Person {
        Person {
            name: "ada".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            address: Address {
                city: "london".to_string(),
                zip: Some(1),
            },
        }
    }

    fn lines<E: Inspect + ?Sized, A: Inspect + ?Sized>(expected: &E, actual: &A) -> Vec<String> {
        StructuralDiff.differences(&expected.inspect_value(), &actual.inspect_value())
    }

    #[test]
    fn test_root_scalar_difference() {
        assert_eq!(lines("foo", "bar"), vec![r#""foo" != "bar""#]);
        assert!(lines("foo", "foo").is_empty());
    }

    #[test]
    fn test_nested_record_paths() {
        let mut other = person();
        other.name = "grace".to_string();
        other.tags.push("c".to_string());
        other.address.zip = None;

        assert_eq!(
            lines(&person(), &other),
            vec![
                r#"name: "ada" != "grace""#.to_string(),
                "tags.len(): 2 != 3".to_string(),
                "address.zip: Some(1) != None".to_string(),
            ]
        );
    }

    #[test]
    fn test_sequence_elements() {
        let differences = diff(&vec![1i32, 2, 3].inspect_value(), &vec![1i32, 5, 3].inspect_value());
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].category, DiffCategory::Value);
        assert_eq!(differences[0].to_string(), "[1]: 2 != 5");
    }

    #[test]
    fn test_mapping_missing_and_extra_keys() {
        let expected: BTreeMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
        let actual: BTreeMap<&str, i32> = [("a", 1), ("c", 3)].into_iter().collect();

        let differences = diff(&expected.inspect_value(), &actual.inspect_value());
        assert_eq!(differences.len(), 2);
        assert_eq!(differences[0].category, DiffCategory::Missing);
        assert_eq!(differences[0].to_string(), r#"["b"]: 2 != (missing)"#);
        assert_eq!(differences[1].category, DiffCategory::Extra);
        assert_eq!(differences[1].to_string(), r#"["c"]: (not present) != 3"#);
    }

    #[test]
    fn test_shape_mismatch_is_a_type_difference() {
        let differences = diff(&Some(5i32).inspect_value(), &5i32.inspect_value());
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].category, DiffCategory::Type);
        assert_eq!(differences[0].to_string(), "Option<i32>(Some(5)) != 5");
    }

    #[test]
    fn test_unset_versus_empty_sequence() {
        let differences = diff(&None::<Vec<i32>>.inspect_value(), &Vec::<i32>::new().inspect_value());
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].to_string(), "None != []");
    }

    #[test]
    fn test_record_type_mismatch() {
        let a = Value::named_record("A").finish();
        let b = Value::named_record("B").finish();
        let differences = diff(&a, &b);
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].category, DiffCategory::Type);
        assert_eq!(differences[0].to_string(), "A != B");
    }

    #[test]
    fn test_absence_rule_applies_at_root_only() {
        assert!(diff(&Value::Absent, &None::<Vec<i32>>.inspect_value()).is_empty());

        let differences = diff(&Value::Absent, &"hello!".inspect_value());
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].to_string(), r#"None != "hello!""#);

        // A nested null only matches another null
        let expected = serde_json::json!({"a": null}).inspect_value();
        let actual = Value::Mapping(Mapping {
            type_name: "Object".to_string(),
            entries: Some(vec![(Value::str("a"), None::<Vec<i32>>.inspect_value())]),
        });
        assert!(!is_equal(&expected, &actual));
        assert_eq!(diff(&expected, &actual).len(), 1);
    }

    #[test]
    fn test_callables_always_differ() {
        let f: fn() -> i32 = || 1;
        assert_eq!(lines(&f, &f), vec!["<fn() -> i32> != <fn() -> i32>"]);
    }
}
