//! Host test-runner interface and the two provided hosts

use std::fmt;

use deepcheck_equality::{DiffFormatter, StructuralDiff};
use tracing::warn;

use crate::config::{Settings, DEFAULT_SETTINGS};

/// The failure-reporting capabilities an assertion needs from its host
///
/// Assertions only ever write to a reporter: one call to [`Reporter::error`]
/// per diagnostic line, then [`Reporter::fail`] and [`Reporter::fail_now`].
pub trait Reporter {
    /// Report one diagnostic line
    fn error(&mut self, line: fmt::Arguments<'_>);

    /// Mark the current test as failed
    fn fail(&mut self);

    /// Stop the current test; the rest of the test run continues
    fn fail_now(&mut self);

    fn settings(&self) -> &Settings {
        &DEFAULT_SETTINGS
    }

    /// Service used to explain why two values differ
    fn differ(&self) -> &dyn DiffFormatter {
        &StructuralDiff
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn error(&mut self, line: fmt::Arguments<'_>) {
        (**self).error(line)
    }

    fn fail(&mut self) {
        (**self).fail()
    }

    fn fail_now(&mut self) {
        (**self).fail_now()
    }

    fn settings(&self) -> &Settings {
        (**self).settings()
    }

    fn differ(&self) -> &dyn DiffFormatter {
        (**self).differ()
    }
}

/// Reporter for tests run by the standard test harness
///
/// Lines are buffered and surface once, in the panic message of the abort,
/// which the harness prints next to the name of the failing test. Aborting
/// fails only the current test. A context that was marked failed without
/// being aborted panics with its lines when it is dropped.
///
/// ```should_panic
/// use deepcheck::{equal, TestContext};
///
/// let mut t = TestContext::new();
/// equal(&mut t, 1, 2, &["totals"]);
/// ```
#[derive(Debug)]
pub struct TestContext {
    lines: Vec<String>,
    failed: bool,
    settings: Settings,
}

impl TestContext {
    /// Create a context with settings from the environment
    ///
    /// Invalid environment values are logged and replaced by defaults.
    pub fn new() -> Self {
        let settings = Settings::from_env().unwrap_or_else(|err| {
            warn!(error = %err, "Invalid assertion settings in environment, using defaults");
            Settings::default()
        });
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            lines: Vec::new(),
            failed: false,
            settings,
        }
    }

    /// Diagnostic lines reported so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TestContext {
    fn error(&mut self, line: fmt::Arguments<'_>) {
        self.lines.push(line.to_string());
        self.failed = true;
    }

    fn fail(&mut self) {
        self.failed = true;
    }

    fn fail_now(&mut self) {
        self.failed = true;
        panic!("assertion failed\n{}", self.lines.join("\n"));
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if self.failed && !std::thread::panicking() {
            panic!("test marked failed\n{}", self.lines.join("\n"));
        }
    }
}

/// In-memory reporter that records everything an assertion does
///
/// Useful for testing assertion helpers built on top of this crate.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub lines: Vec<String>,
    pub failed: bool,
    pub aborted: bool,
    settings: Settings,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Whether nothing was reported at all
    pub fn passed(&self) -> bool {
        self.lines.is_empty() && !self.failed && !self.aborted
    }
}

impl Reporter for Recorder {
    fn error(&mut self, line: fmt::Arguments<'_>) {
        self.lines.push(line.to_string());
    }

    fn fail(&mut self) {
        self.failed = true;
    }

    fn fail_now(&mut self) {
        self.failed = true;
        self.aborted = true;
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_recorder_records() {
        let mut recorder = Recorder::new();
        assert!(recorder.passed());

        recorder.error(format_args!("{}:{}", "file.rs", 3));
        recorder.fail();
        assert_eq!(recorder.lines, vec!["file.rs:3"]);
        assert!(recorder.failed);
        assert!(!recorder.aborted);

        recorder.fail_now();
        assert!(recorder.aborted);
    }

    #[test]
    fn test_reporter_through_mut_reference() {
        let mut recorder = Recorder::with_settings(Settings::default().with_max_differences(2));
        {
            let mut by_ref = &mut recorder;
            by_ref.error(format_args!("line"));
            assert_eq!(by_ref.settings().max_differences, Some(2));
        }
        assert_eq!(recorder.lines, vec!["line"]);
    }

    #[test]
    fn test_context_fail_now_panics_with_lines() {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut t = TestContext::with_settings(Settings::default());
            t.error(format_args!("first"));
            t.error(format_args!("second"));
            t.fail_now();
        }));

        let payload = result.unwrap_err();
        let message = payload.downcast_ref::<String>().unwrap();
        assert_eq!(message, "assertion failed\nfirst\nsecond");
    }

    #[test]
    fn test_context_marked_failed_panics_on_drop() {
        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut t = TestContext::with_settings(Settings::default());
            t.error(format_args!("only"));
            t.fail();
        }));

        let payload = result.unwrap_err();
        let message = payload.downcast_ref::<String>().unwrap();
        assert_eq!(message, "test marked failed\nonly");
    }

    #[test]
    fn test_context_buffers_lines_until_abort() {
        let mut t = TestContext::with_settings(Settings::default());
        t.error(format_args!("first"));
        assert_eq!(t.lines(), ["first"]);
        assert!(t.failed());
        // Disarm the drop check
        t.failed = false;
    }

    #[test]
    fn test_clean_context_drops_quietly() {
        let t = TestContext::with_settings(Settings::default());
        assert!(!t.failed());
        assert!(t.lines().is_empty());
    }
}
