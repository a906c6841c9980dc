//! Sleep/wake classification of a body

use crate::error::PhysicsError;

/// Activation state with its stable numeric encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ActivationState {
    /// Simulated and allowed to fall asleep
    #[default]
    Active = 1,
    /// Asleep together with its island
    IslandSleeping = 2,
    /// Ready to be put to sleep
    WantsDeactivation = 3,
    /// Never put to sleep
    DisableDeactivation = 4,
    /// Excluded from simulation entirely
    DisableSimulation = 5,
}

impl ActivationState {
    /// Raw encoding
    #[must_use]
    pub const fn raw(self) -> i32 {
        self as i32
    }

    /// States that only `force_activation_state` may leave
    #[must_use]
    pub const fn is_pinned(self) -> bool {
        matches!(self, Self::DisableDeactivation | Self::DisableSimulation)
    }

    /// Whether a body in this state takes part in simulation
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::IslandSleeping | Self::DisableSimulation)
    }
}

impl TryFrom<i32> for ActivationState {
    type Error = PhysicsError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Active),
            2 => Ok(Self::IslandSleeping),
            3 => Ok(Self::WantsDeactivation),
            4 => Ok(Self::DisableDeactivation),
            5 => Ok(Self::DisableSimulation),
            other => Err(PhysicsError::InvalidActivationState(other)),
        }
    }
}
