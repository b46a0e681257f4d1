//! Numeric backends.
//!
//! A backend is chosen once, when a root finder is constructed, and the
//! approximator inherits it from its root finder. Both backends run the same
//! arithmetic in the same order; they differ in what is checked and logged
//! inside the hot loop:
//!
//! - [`Reference`] validates every residual and traces every iteration.
//! - [`Fast`] does neither, and its approximators additionally offer a
//!   degraded entry point that records failures instead of aborting.

use core::fmt;

mod sealed {
    pub trait Sealed {}
}

/// Backend selector, usable in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BackendKind {
    #[default]
    Reference,
    Fast,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Reference => write!(f, "reference"),
            BackendKind::Fast => write!(f, "fast"),
        }
    }
}

/// Compile-time backend marker.
pub trait Backend: sealed::Sealed + Copy + Default + fmt::Debug + Send + Sync + 'static {
    const KIND: BackendKind;

    /// Validate residuals and emit per-iteration trace events.
    const INSTRUMENTED: bool;
}

/// Checked, traced backend. The canonical behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reference;

/// Unchecked backend for production runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fast;

impl sealed::Sealed for Reference {}
impl sealed::Sealed for Fast {}

impl Backend for Reference {
    const KIND: BackendKind = BackendKind::Reference;
    const INSTRUMENTED: bool = true;
}

impl Backend for Fast {
    const KIND: BackendKind = BackendKind::Fast;
    const INSTRUMENTED: bool = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_report_their_kind() {
        assert_eq!(Reference::KIND, BackendKind::Reference);
        assert_eq!(Fast::KIND, BackendKind::Fast);
        assert_eq!(BackendKind::default(), BackendKind::Reference);
        assert_eq!(BackendKind::Fast.to_string(), "fast");
    }
}
