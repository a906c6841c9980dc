//! Errors reported for rejected physics-object parameters

/// Errors that can occur when constructing physics objects
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// A size parameter (half extent, radius, height) was not strictly positive
    NonPositiveSize {
        /// Which parameter was rejected
        what: &'static str,
        /// The rejected value
        value: f32,
    },
    /// A body mass was negative
    NegativeMass(f32),
    /// An axis enumerant outside {X, Y, Z}
    InvalidAxis(i32),
    /// An activation state code outside 1..=5
    InvalidActivationState(i32),
    /// A plane normal of zero length
    ZeroNormal,
}

impl std::fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveSize { what, value } => {
                write!(f, "{what} must be positive, got {value}")
            }
            Self::NegativeMass(mass) => write!(f, "mass must not be negative, got {mass}"),
            Self::InvalidAxis(axis) => write!(f, "invalid axis {axis}, expected 0, 1 or 2"),
            Self::InvalidActivationState(state) => {
                write!(f, "invalid activation state {state}, expected 1..=5")
            }
            Self::ZeroNormal => write!(f, "plane normal must not be zero"),
        }
    }
}

impl std::error::Error for PhysicsError {}

/// Reject anything that is not strictly positive (NaN included)
pub(crate) fn require_positive(what: &'static str, value: f32) -> Result<f32, PhysicsError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(PhysicsError::NonPositiveSize { what, value })
    }
}
