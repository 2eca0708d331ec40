//! The assertion catalog
//!
//! Every assertion takes the reporter first and a slice of extra message
//! fragments last. A passing assertion has no effect on the reporter. A
//! failing one reports, in order:
//!
//! 1. the call site (`<file>:<line>`) of the test author's call
//! 2. a headline naming the failed expectation
//! 3. detail lines (differences, unexpected values)
//! 4. the extra fragments, concatenated onto a single line
//!
//! and then marks the test failed and aborts it. A value that could not be
//! inspected fails every comparison it takes part in, with the inspection
//! error as the detail.

use chrono::{DateTime, Duration, TimeZone};
use deepcheck_equality::{is_equal, short_type_name, Inspect, Value};
use tracing::{debug, trace};

use crate::call_site::{CallSite, CallSiteResolver, CallStack};
use crate::config::Settings;
use crate::protect::{protected, PanicPayload};
use crate::reporter::Reporter;

/// Frames between a direct assertion's entry point and its check
const DIRECT_DEPTH: usize = 1;

/// Frames between [`panics`] and its check: the protected scope and the
/// recovery handler sit on top of the direct depth
const RECOVERY_DEPTH: usize = DIRECT_DEPTH + 2;

/// Assert deep equality of `expected` and `actual`
///
/// An `Option` set to `None`, an empty `Option<Vec<_>>` and friends all count
/// as equal to [`Value::Absent`], but only at the top level.
#[track_caller]
pub fn equal<R, E, A>(t: &mut R, expected: E, actual: A, extra: &[&str])
where
    R: Reporter + ?Sized,
    E: Inspect,
    A: Inspect,
{
    let mut stack = CallStack::capture();
    check_equal(
        t,
        &expected.inspect_value(),
        &actual.inspect_value(),
        extra,
        &mut stack,
        DIRECT_DEPTH,
    );
}

/// Assert `expected` and `actual` are not deeply equal
#[track_caller]
pub fn not_equal<R, E, A>(t: &mut R, expected: E, actual: A, extra: &[&str])
where
    R: Reporter + ?Sized,
    E: Inspect,
    A: Inspect,
{
    let mut stack = CallStack::capture();
    check_not_equal(
        t,
        &expected.inspect_value(),
        &actual.inspect_value(),
        extra,
        &mut stack,
        DIRECT_DEPTH,
    );
}

#[track_caller]
pub fn is_true<R: Reporter + ?Sized>(t: &mut R, actual: bool, extra: &[&str]) {
    let mut stack = CallStack::capture();
    check_bool(t, true, actual, extra, &mut stack, DIRECT_DEPTH);
}

#[track_caller]
pub fn is_false<R: Reporter + ?Sized>(t: &mut R, actual: bool, extra: &[&str]) {
    let mut stack = CallStack::capture();
    check_bool(t, false, actual, extra, &mut stack, DIRECT_DEPTH);
}

/// Assert `actual` is absent (`None`, or an unset sequence, map, callable...)
#[track_caller]
pub fn nil<R, A>(t: &mut R, actual: A, extra: &[&str])
where
    R: Reporter + ?Sized,
    A: Inspect,
{
    let mut stack = CallStack::capture();
    check_nil(t, &actual.inspect_value(), extra, &mut stack, DIRECT_DEPTH);
}

/// Assert `actual` is present
#[track_caller]
pub fn not_nil<R, A>(t: &mut R, actual: A, extra: &[&str])
where
    R: Reporter + ?Sized,
    A: Inspect,
{
    let mut stack = CallStack::capture();
    check_not_nil(t, &actual.inspect_value(), extra, &mut stack, DIRECT_DEPTH);
}

/// Assert `haystack` contains `needle` literally
#[track_caller]
pub fn contains<R: Reporter + ?Sized>(t: &mut R, needle: &str, haystack: &str, extra: &[&str]) {
    let mut stack = CallStack::capture();
    check_contains(t, true, needle, haystack, extra, &mut stack, DIRECT_DEPTH);
}

/// Assert `haystack` does not contain `needle`
#[track_caller]
pub fn not_contains<R: Reporter + ?Sized>(
    t: &mut R,
    needle: &str,
    haystack: &str,
    extra: &[&str],
) {
    let mut stack = CallStack::capture();
    check_contains(t, false, needle, haystack, extra, &mut stack, DIRECT_DEPTH);
}

/// Assert the static type of `actual` is named `expected`
///
/// Names are short: module paths are stripped, so a `Vec<my_crate::Point>`
/// is named `Vec<Point>`. References keep their `&`.
#[track_caller]
pub fn type_of<R, A>(t: &mut R, expected: &str, _actual: A, extra: &[&str])
where
    R: Reporter + ?Sized,
{
    let mut stack = CallStack::capture();
    check_type(
        t,
        expected,
        &short_type_name::<A>(),
        extra,
        &mut stack,
        DIRECT_DEPTH,
    );
}

/// Assert `actual` is no further than `tolerance` from `goal`, in either
/// direction
#[track_caller]
pub fn within_duration<R, Tz1, Tz2>(
    t: &mut R,
    tolerance: Duration,
    goal: DateTime<Tz1>,
    actual: DateTime<Tz2>,
    extra: &[&str],
) where
    R: Reporter + ?Sized,
    Tz1: TimeZone,
    Tz2: TimeZone,
{
    let mut stack = CallStack::capture();
    let delta = actual.clone().signed_duration_since(goal.clone());
    let delta = if delta < Duration::zero() { -delta } else { delta };

    let outcome = if delta <= tolerance {
        Ok(())
    } else {
        Err(Failure::new(format!(
            "Expected `{}` to be within `{}` of `{}`",
            actual.inspect_value(),
            tolerance.inspect_value(),
            goal.inspect_value()
        ))
        .detail(format!("Difference `{}`", delta.inspect_value())))
    };
    stack.enter();
    report(
        t,
        "within_duration",
        outcome,
        extra,
        &mut stack,
        DIRECT_DEPTH + 1,
    );
}

/// Assert `f` panics with the message `expected`
///
/// Panics carrying something other than a string are rendered as
/// `Box<dyn Any>` and never match.
#[track_caller]
pub fn panics<R, F>(t: &mut R, expected: &str, f: F, extra: &[&str])
where
    R: Reporter + ?Sized,
    F: FnOnce(),
{
    let mut stack = CallStack::capture();
    let outcome = run_protected(f, &mut stack);
    check_panic(t, expected, outcome, extra, &mut stack, RECOVERY_DEPTH);
}

/// Generic predicate assertion: fail with `message` unless `ok`
#[track_caller]
pub fn assert<R: Reporter + ?Sized>(t: &mut R, ok: bool, message: &str, extra: &[&str]) {
    let mut stack = CallStack::capture();
    let outcome = if ok {
        Ok(())
    } else {
        Err(Failure::new(message))
    };
    stack.enter();
    report(t, "assert", outcome, extra, &mut stack, DIRECT_DEPTH + 1);
}

// ==================== Checks ====================

fn check_equal<R: Reporter + ?Sized>(
    t: &mut R,
    expected: &Value,
    actual: &Value,
    extra: &[&str],
    stack: &mut CallStack,
    depth: usize,
) {
    stack.enter();
    let outcome = if let Some(failure) = uninspectable(&[expected, actual]) {
        Err(failure)
    } else if is_equal(expected, actual) {
        Ok(())
    } else {
        Err(
            Failure::new(format!("Expected `{expected}` to equal `{actual}`"))
                .differences(t.differ().differences(expected, actual)),
        )
    };
    report(t, "equal", outcome, extra, stack, depth + 1);
}

fn check_not_equal<R: Reporter + ?Sized>(
    t: &mut R,
    expected: &Value,
    actual: &Value,
    extra: &[&str],
    stack: &mut CallStack,
    depth: usize,
) {
    stack.enter();
    let outcome = if let Some(failure) = uninspectable(&[expected, actual]) {
        Err(failure)
    } else if is_equal(expected, actual) {
        Err(
            Failure::new(format!("Expected `{expected}` to not equal `{actual}`"))
                .detail(format!("Unexpected `{actual}`")),
        )
    } else {
        Ok(())
    };
    report(t, "not_equal", outcome, extra, stack, depth + 1);
}

fn check_bool<R: Reporter + ?Sized>(
    t: &mut R,
    expected: bool,
    actual: bool,
    extra: &[&str],
    stack: &mut CallStack,
    depth: usize,
) {
    stack.enter();
    let outcome = if is_equal(&expected.inspect_value(), &actual.inspect_value()) {
        Ok(())
    } else {
        Err(Failure::new(format!("Expected to be {expected}")))
    };
    let assertion = if expected { "is_true" } else { "is_false" };
    report(t, assertion, outcome, extra, stack, depth + 1);
}

fn check_nil<R: Reporter + ?Sized>(
    t: &mut R,
    actual: &Value,
    extra: &[&str],
    stack: &mut CallStack,
    depth: usize,
) {
    stack.enter();
    let outcome = if let Some(failure) = uninspectable(&[actual]) {
        Err(failure)
    } else if is_equal(&Value::Absent, actual) {
        Ok(())
    } else {
        Err(Failure::new("Expected None").detail(format!("Unexpected `{actual}`")))
    };
    report(t, "nil", outcome, extra, stack, depth + 1);
}

fn check_not_nil<R: Reporter + ?Sized>(
    t: &mut R,
    actual: &Value,
    extra: &[&str],
    stack: &mut CallStack,
    depth: usize,
) {
    stack.enter();
    let outcome = if let Some(failure) = uninspectable(&[actual]) {
        Err(failure)
    } else if is_equal(&Value::Absent, actual) {
        Err(Failure::new("Unexpected None"))
    } else {
        Ok(())
    };
    report(t, "not_nil", outcome, extra, stack, depth + 1);
}

fn check_contains<R: Reporter + ?Sized>(
    t: &mut R,
    expect_found: bool,
    needle: &str,
    haystack: &str,
    extra: &[&str],
    stack: &mut CallStack,
    depth: usize,
) {
    stack.enter();
    let found = haystack.contains(needle);
    let (assertion, outcome) = match (expect_found, found) {
        (true, false) => (
            "contains",
            Err(Failure::new(format!("Expected to find `{needle}`"))),
        ),
        (false, true) => (
            "not_contains",
            Err(Failure::new(format!("Expected not to find `{needle}`"))),
        ),
        (true, true) => ("contains", Ok(())),
        (false, false) => ("not_contains", Ok(())),
    };
    let outcome = outcome.map_err(|failure| failure.detail(format!("in `{haystack}`")));
    report(t, assertion, outcome, extra, stack, depth + 1);
}

fn check_type<R: Reporter + ?Sized>(
    t: &mut R,
    expected: &str,
    actual: &str,
    extra: &[&str],
    stack: &mut CallStack,
    depth: usize,
) {
    stack.enter();
    let outcome = if expected == actual {
        Ok(())
    } else {
        Err(Failure::new(format!(
            "Expected type `{expected}` but got `{actual}`"
        )))
    };
    report(t, "type_of", outcome, extra, stack, depth + 1);
}

fn check_panic<R: Reporter + ?Sized>(
    t: &mut R,
    expected: &str,
    outcome: Result<(), PanicPayload>,
    extra: &[&str],
    stack: &mut CallStack,
    depth: usize,
) {
    stack.enter();
    let headline = || Failure::new(format!("Expected panic `{expected}`"));
    let outcome = match outcome {
        Ok(()) => Err(headline().detail("No panic")),
        Err(payload) => {
            let matches = payload.message.is_some()
                && is_equal(&Value::str(expected), &Value::str(payload.text()));
            if matches {
                Ok(())
            } else {
                Err(headline().detail(format!("Unexpected `{payload}`")))
            }
        }
    };
    report(t, "panics", outcome, extra, stack, depth + 1);
}

/// Failure for the first operand holding a value whose inspection failed
fn uninspectable(values: &[&Value]) -> Option<Failure> {
    let broken = values.iter().find_map(|value| value.uninspectable())?;
    Some(
        Failure::new(format!("Cannot inspect `{}`", broken.type_name))
            .detail(broken.error.to_string()),
    )
}

fn run_protected<F: FnOnce()>(f: F, stack: &mut CallStack) -> Result<(), PanicPayload> {
    stack.enter();
    let outcome = protected(f);
    recover(outcome, stack)
}

fn recover(
    outcome: Result<(), PanicPayload>,
    stack: &mut CallStack,
) -> Result<(), PanicPayload> {
    stack.enter();
    if let Err(payload) = &outcome {
        trace!("Recovered panic: {}", payload);
    }
    outcome
}

// ==================== Reporting ====================

/// What a failed assertion has to say
#[derive(Debug)]
struct Failure {
    headline: String,
    details: Vec<String>,
    differences: Vec<String>,
}

impl Failure {
    fn new(headline: impl Into<String>) -> Self {
        Self {
            headline: headline.into(),
            details: Vec::new(),
            differences: Vec::new(),
        }
    }

    fn detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }

    fn differences(mut self, differences: Vec<String>) -> Self {
        self.differences = differences;
        self
    }

    fn lines(
        &self,
        call_site: Option<CallSite>,
        settings: &Settings,
        extra: &[&str],
    ) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(site) = call_site {
            lines.push(site.to_string());
        }
        lines.push(format!("{}{}", settings.error_prefix, self.headline));

        let detail = |line: &str| format!("{}{}", settings.detail_prefix, line);
        lines.extend(self.details.iter().map(|line| detail(line)));

        let shown = settings
            .max_differences
            .unwrap_or(usize::MAX)
            .min(self.differences.len());
        lines.extend(self.differences[..shown].iter().map(|line| detail(line)));
        let hidden = self.differences.len() - shown;
        if hidden > 0 {
            lines.push(detail(&format!("... and {hidden} more differences")));
        }

        let message = extra.concat();
        if !message.is_empty() {
            lines.push(detail(&message));
        }
        lines
    }
}

fn report<R: Reporter + ?Sized>(
    t: &mut R,
    assertion: &'static str,
    outcome: Result<(), Failure>,
    extra: &[&str],
    stack: &mut CallStack,
    depth: usize,
) {
    stack.enter();
    let call_site = stack.resolve(depth);
    let location = call_site.map_or_else(|| "<unknown>".to_string(), |site| site.to_string());

    let failure = match outcome {
        Ok(()) => {
            trace!(assertion, call_site = %location, "Assertion passed");
            return;
        }
        Err(failure) => failure,
    };
    debug!(assertion, call_site = %location, "Assertion failed: {}", failure.headline);

    let lines = failure.lines(call_site, t.settings(), extra);
    for line in &lines {
        t.error(format_args!("{line}"));
    }
    t.fail();
    t.fail_now();
}
