//! Settings that shape failure messages

use std::borrow::Cow;
use std::env;

use crate::error::{ConfigError, ConfigResult};

/// Environment variable overriding [`Settings::error_prefix`]
pub const ERROR_PREFIX_VAR: &str = "DEEPCHECK_ERROR_PREFIX";

/// Environment variable overriding [`Settings::detail_prefix`]
pub const DETAIL_PREFIX_VAR: &str = "DEEPCHECK_DETAIL_PREFIX";

/// Environment variable overriding [`Settings::max_differences`]
pub const MAX_DIFFERENCES_VAR: &str = "DEEPCHECK_MAX_DIFFERENCES";

/// Settings used when nothing is configured
pub static DEFAULT_SETTINGS: Settings = Settings::DEFAULT;

/// How failure messages are laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Prefix of the headline that names the failed expectation
    pub error_prefix: Cow<'static, str>,
    /// Prefix of every detail line (differences, extra fragments)
    pub detail_prefix: Cow<'static, str>,
    /// Cap on structural-difference lines per failure
    pub max_differences: Option<usize>,
}

impl Settings {
    const DEFAULT: Settings = Settings {
        error_prefix: Cow::Borrowed("! "),
        detail_prefix: Cow::Borrowed("- "),
        max_differences: None,
    };

    /// Load settings from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut settings = Self::default();

        if let Some(prefix) = lookup(ERROR_PREFIX_VAR) {
            settings.error_prefix = Cow::Owned(prefix);
        }
        if let Some(prefix) = lookup(DETAIL_PREFIX_VAR) {
            settings.detail_prefix = Cow::Owned(prefix);
        }
        if let Some(raw) = lookup(MAX_DIFFERENCES_VAR) {
            settings.max_differences = Some(parse_max_differences(&raw)?);
        }

        Ok(settings)
    }

    pub fn with_max_differences(mut self, max: usize) -> Self {
        self.max_differences = Some(max);
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn parse_max_differences(raw: &str) -> ConfigResult<usize> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        name: MAX_DIFFERENCES_VAR,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    match raw.trim().parse::<usize>() {
        Ok(0) => Err(invalid("must be at least 1")),
        Ok(max) => Ok(max),
        Err(err) => Err(invalid(&err.to_string())),
    }
}
