//! Error taxonomy.
//!
//! Only two things are hard errors in this crate: entity construction with
//! the wrong argument count, and removal of a listener that was never
//! registered (a bookkeeping bug on the caller's side). Everything else is a
//! documented soft fallback: the coordinate transform passes points through
//! when headless, and the circle clipper truncates rather than failing.

use thiserror::Error;

/// Crate-level error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Entity construction received the wrong number of input arguments.
    ///
    /// The expected count is the declared positional-parameter count plus
    /// the declared value-parameter count of the entity kind.
    #[error("entity `{kind}` expects {expected} input arguments, got {given}")]
    ArgumentCount {
        kind: &'static str,
        expected: usize,
        given: usize,
    },

    /// A positional argument slot received a non-point input.
    #[error("entity `{kind}` positional argument {index} must be a point")]
    PositionalKind { kind: &'static str, index: usize },

    /// Attempted to remove a listener that is not registered.
    #[error("no listener registered with id {0}")]
    UnknownListener(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ArgumentCount {
            kind: "disc",
            expected: 2,
            given: 3,
        };
        assert_eq!(
            err.to_string(),
            "entity `disc` expects 2 input arguments, got 3"
        );
        assert_eq!(
            Error::UnknownListener(7).to_string(),
            "no listener registered with id 7"
        );
    }
}
