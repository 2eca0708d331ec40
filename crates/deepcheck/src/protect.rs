//! Protected execution scope for panic assertions

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Rendering of a payload that is neither `&str` nor `String`
pub const OPAQUE_PAYLOAD: &str = "Box<dyn Any>";

/// What a captured panic carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicPayload {
    /// Text of the payload, `None` when it was not a string
    pub message: Option<String>,
}

impl PanicPayload {
    pub fn text(&self) -> &str {
        self.message.as_deref().unwrap_or(OPAQUE_PAYLOAD)
    }
}

impl From<Box<dyn Any + Send>> for PanicPayload {
    fn from(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => Some(*message),
            Err(payload) => payload.downcast_ref::<&str>().map(|s| s.to_string()),
        };
        Self { message }
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Run `f`, capturing a panic instead of letting it unwind further
pub fn protected<F: FnOnce()>(f: F) -> Result<(), PanicPayload> {
    catch_unwind(AssertUnwindSafe(f)).map_err(PanicPayload::from)
}
