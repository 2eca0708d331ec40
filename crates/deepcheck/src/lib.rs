//! Deep-equality assertions for tests
//!
//! Assertions report through a [`Reporter`]: [`TestContext`] for tests run by
//! the standard harness, [`Recorder`] to capture what an assertion reports.
//! Values are compared with the deep-equality engine of
//! [`deepcheck_equality`], re-exported here.
//!
//! ```
//! use deepcheck::{contains, equal, inspect_record, nil, Recorder};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! inspect_record!(Point { x, y });
//!
//! let mut t = Recorder::new();
//! equal(&mut t, Point { x: 1, y: 2 }, Point { x: 1, y: 2 }, &[]);
//! nil(&mut t, None::<Vec<Point>>, &[]);
//! contains(&mut t, "needle", "haystack with a needle", &[]);
//! assert!(t.passed());
//!
//! equal(&mut t, Point { x: 1, y: 2 }, Point { x: 1, y: 3 }, &["moved"]);
//! assert!(t.failed && t.aborted);
//! assert_eq!(t.lines[1], "! Expected `Point { x: 1, y: 2 }` to equal `Point { x: 1, y: 3 }`");
//! assert_eq!(t.lines[2], "- y: 2 != 3");
//! assert_eq!(t.lines[3], "- moved");
//! ```

mod assertions;
mod call_site;
mod config;
mod error;
mod protect;
mod reporter;

pub use assertions::{
    assert, contains, equal, is_false, is_true, nil, not_contains, not_equal, not_nil, panics,
    type_of, within_duration,
};
pub use call_site::{CallSite, CallSiteResolver, CallStack};
pub use config::{
    Settings, DEFAULT_SETTINGS, DETAIL_PREFIX_VAR, ERROR_PREFIX_VAR, MAX_DIFFERENCES_VAR,
};
pub use error::{ConfigError, ConfigResult};
pub use protect::{protected, PanicPayload, OPAQUE_PAYLOAD};
pub use reporter::{Recorder, Reporter, TestContext};

pub use deepcheck_equality::{
    diff, inspect_record, is_absent, is_equal, short_type_name, to_value, DiffFormatter,
    Difference, Inspect, Serialized, StructuralDiff, Value,
};
