//! How a wrapper relates to the native memory behind its handle

use std::fmt;

/// Ownership mode, decided once at construction.
///
/// The same native call can hand out handles in any of these modes depending
/// on context, so the mode is always stated by the factory and never guessed
/// from the handle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// A fresh native allocation. Freed on disposal, tracked by its context.
    Owned,
    /// An extra reference on an existing native object. Disposal drops that
    /// reference through the native release entry point, exactly once.
    Duplicate,
    /// A field or slice inside another object's memory. Never freed.
    View,
}

impl Ownership {
    /// Whether disposal calls a native release entry point.
    pub fn releases_handle(self) -> bool {
        !matches!(self, Ownership::View)
    }

    /// Whether the resource joins its context's registry.
    ///
    /// Duplicates only join when they were created with an explicit parent.
    pub fn is_tracked(self, has_parent: bool) -> bool {
        match self {
            Ownership::Owned => true,
            Ownership::Duplicate => has_parent,
            Ownership::View => false,
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Ownership::Owned => "owned",
            Ownership::Duplicate => "duplicate",
            Ownership::View => "view",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_never_release() {
        assert!(Ownership::Owned.releases_handle());
        assert!(Ownership::Duplicate.releases_handle());
        assert!(!Ownership::View.releases_handle());
    }

    #[test]
    fn parentless_duplicates_stay_untracked() {
        assert!(Ownership::Owned.is_tracked(true));
        assert!(Ownership::Duplicate.is_tracked(true));
        assert!(!Ownership::Duplicate.is_tracked(false));
        assert!(!Ownership::View.is_tracked(true));
    }
}
