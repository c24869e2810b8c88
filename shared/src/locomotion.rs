//! Locomotion state machine.
//!
//! Three states drive which velocity-resolution branch applies:
//! - `Airborne` (initial): no ground support.
//! - `Grounded`: supported by a walkable surface.
//! - `JumpStart`: one-tick transitional state used only to inject the jump
//!   impulse; it always decays to `Airborne` on the next tick.
//!
//! The transition is evaluated once per physics tick, before velocity
//! resolution; the resulting state applies the same tick and is retained for
//! the next.

use nalgebra::Vector3;

/// Per-tick snapshot of ground support under the character.
///
/// Recomputed every tick by the collision world's downward probe; never
/// retained across ticks.
#[derive(Clone, Copy, Debug)]
pub struct SupportInfo {
    pub supported: bool,
    /// Averaged unit normal of the supporting contacts.
    pub average_normal: Vector3<f32>,
    /// Averaged velocity of the supporting surfaces (moving platforms).
    pub average_surface_velocity: Vector3<f32>,
}

impl SupportInfo {
    /// No support: normal defaults to +Y, surface velocity to zero.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            average_normal: Vector3::y(),
            average_surface_velocity: Vector3::zeros(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LocomotionState {
    #[default]
    Airborne,
    Grounded,
    JumpStart,
}

/// Transition function, evaluated once per physics tick.
#[inline]
pub fn next_state(state: LocomotionState, supported: bool, want_jump: bool) -> LocomotionState {
    match state {
        LocomotionState::Airborne => {
            if supported {
                LocomotionState::Grounded
            } else {
                LocomotionState::Airborne
            }
        }
        LocomotionState::Grounded => {
            if !supported {
                LocomotionState::Airborne
            } else if want_jump {
                LocomotionState::JumpStart
            } else {
                LocomotionState::Grounded
            }
        }
        LocomotionState::JumpStart => LocomotionState::Airborne,
    }
}
