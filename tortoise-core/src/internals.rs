//! Fixed quantities of the turtle: defaults, limits and the read-only
//! variables every program can see.

use tortoise_graphics::types::Scalar;

/// Heading set by `A` without an argument.
pub const DEFAULT_ANGLE: Scalar = 0.0;
/// Turn used by `+` and `-` without an argument.
pub const DEFAULT_ANGLE_INCREMENT: Scalar = 45.0;
pub const DEFAULT_STEP: Scalar = 20.0;
pub const DEFAULT_STROKE_WIDTH: Scalar = 1.0;
pub const DEFAULT_RECURSION_LIMIT: Scalar = 100.0;
pub const MAX_RECURSION_LIMIT: usize = 1000;
pub const MAX_POSITION_STACK: usize = 1000;
/// Deepest `{...}` nesting that is parsed. Bodies are parsed and run
/// recursively, so this bounds native stack use.
pub const MAX_NESTING_DEPTH: usize = 200;
pub const DEFAULT_MAX_OPERATIONS: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// Built-in variables
// ---------------------------------------------------------------------------

/// Variables computed from the turtle state. They are looked up before
/// any scope, so programs cannot shadow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `$X`: turtle x coordinate.
    X,
    /// `$Y`: turtle y coordinate.
    Y,
    /// `$A`: heading in degrees.
    Angle,
    /// `$S`: step length.
    Step,
    /// `$WIDTH`: canvas width.
    Width,
    /// `$HEIGHT`: canvas height.
    Height,
    /// `$RND`: next pseudo-random number in (0, 1).
    Random,
}

impl Builtin {
    /// Map an upper-case name (without `$`) to a built-in.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "X" => Self::X,
            "Y" => Self::Y,
            "A" => Self::Angle,
            "S" => Self::Step,
            "WIDTH" => Self::Width,
            "HEIGHT" => Self::Height,
            "RND" => Self::Random,
            _ => return None,
        })
    }
}

/// Name of the loop counter inside `R` bodies.
pub const ITERATION_VARIABLE: &str = "IT";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        assert_eq!(Builtin::lookup("X"), Some(Builtin::X));
        assert_eq!(Builtin::lookup("A"), Some(Builtin::Angle));
        assert_eq!(Builtin::lookup("WIDTH"), Some(Builtin::Width));
        assert_eq!(Builtin::lookup("RND"), Some(Builtin::Random));
        assert_eq!(Builtin::lookup("IT"), None);
        assert_eq!(Builtin::lookup("x"), None);
    }
}
