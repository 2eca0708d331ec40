//! Call-site resolution for failure messages
//!
//! Public assertions are `#[track_caller]` and capture the test author's
//! location into a [`CallStack`]. Every internal helper pushes its own frame
//! on the way in, so a failure resolves its location by unwinding an
//! explicit number of frames, the same way for every assertion.

use std::fmt;
use std::panic::Location;

/// A source location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Resolves the location `depth` frames above the innermost one
pub trait CallSiteResolver {
    fn resolve(&self, depth: usize) -> Option<CallSite>;
}

/// Frames captured on the way into an assertion, outermost first
#[derive(Debug, Clone, Default)]
pub struct CallStack {
    frames: Vec<CallSite>,
}

impl CallStack {
    /// Start a stack at the caller of the enclosing `#[track_caller]` function
    #[track_caller]
    pub fn capture() -> Self {
        Self {
            frames: vec![Location::caller().into()],
        }
    }

    /// Push the frame of the calling helper
    #[track_caller]
    pub fn enter(&mut self) {
        self.frames.push(Location::caller().into());
    }

    /// Number of captured frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl CallSiteResolver for CallStack {
    fn resolve(&self, depth: usize) -> Option<CallSite> {
        self.frames.iter().rev().nth(depth).copied()
    }
}
