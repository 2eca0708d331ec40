//! Deep equality engine for test assertions
//!
//! Values are inspected into a closed model ([`Value`]) of shapes: scalars,
//! records, sequences, mappings, nullable references, callables and
//! streams. On top of that model this crate provides:
//!
//! - [`is_equal`] / [`is_absent`] - deep equality with the absence rule
//! - [`diff`] - a per-field/per-element explanation of why values differ
//! - [`Value::uninspectable`] - the first part of a value that could not be
//!   inspected
//! - [`short_type_name`] - canonical type names used by type assertions
//! - [`to_value`] / [`Serialized`] - inspection of any `serde::Serialize` type
//!
//! # Example
//!
//! ```
//! use deepcheck_equality::{diff, inspect_record, is_absent, is_equal, Inspect};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! inspect_record!(Point { x, y });
//!
//! let a = Point { x: 1, y: 2 }.inspect_value();
//! let b = Point { x: 1, y: 3 }.inspect_value();
//! assert!(!is_equal(&a, &b));
//! assert_eq!(diff(&a, &b)[0].to_string(), "y: 2 != 3");
//!
//! assert!(is_absent(&None::<Vec<Point>>.inspect_value()));
//! assert!(!is_absent(&Vec::<Point>::new().inspect_value()));
//! ```

mod diff;
mod equality;
mod error;
mod inspect;
mod ser;
mod type_name;
mod value;

pub use diff::{diff, DiffCategory, DiffFormatter, Difference, StructuralDiff};
pub use equality::{is_absent, is_equal};
pub use error::{InspectError, InspectResult};
pub use inspect::Inspect;
pub use ser::{to_value, Serialized};
pub use type_name::{short_type_name, shorten};
pub use value::{
    format_nanos, Callable, Endpoint, Field, Literal, Mapping, Record, RecordBuilder, Reference,
    Scalar, Sequence, Shape, Stream, Uninspectable, Value,
};
