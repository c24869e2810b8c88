//! Per-tick character orchestration.
//!
//! `CharacterController::tick` pins the required ordering within a physics
//! sub-step: support snapshot in, state transition, velocity resolution,
//! velocity handed back out. Resolving with a stale state (e.g. the state
//! from before this tick's support check) is a class of bug this interface
//! makes impossible.

use nalgebra::Vector3;

use crate::intent::InputIntent;
use crate::locomotion::{LocomotionState, SupportInfo, next_state};
use crate::velocity::{SpeedConfig, SweptMove, resolve_velocity};
use crate::{Quat, Vec3};

/// Output of a single `tick()`.
#[derive(Clone, Copy, Debug)]
pub struct TickResult {
    /// Locomotion state after this tick's transition.
    pub state: LocomotionState,
    /// Velocity to hand to the integrator.
    pub velocity: Vec3,
}

/// Owns the locomotion state and speed tuning for one character.
#[derive(Clone, Copy, Debug)]
pub struct CharacterController {
    pub state: LocomotionState,
    pub speeds: SpeedConfig,
}

impl CharacterController {
    pub fn new(speeds: SpeedConfig) -> Self {
        Self {
            state: LocomotionState::Airborne,
            speeds,
        }
    }

    /// Run one physics tick.
    ///
    /// Returns `None` without mutating any state when `dt` is zero,
    /// negative, or non-finite — a skipped tick, not an error.
    pub fn tick(
        &mut self,
        dt: f32,
        support: &SupportInfo,
        current_velocity: Vec3,
        intent: &InputIntent,
        yaw: f32,
        gravity: Vec3,
        solver: &impl SweptMove,
    ) -> Option<TickResult> {
        if !dt.is_finite() || dt <= 0.0 {
            return None;
        }

        self.state = next_state(self.state, support.supported, intent.want_jump);

        let orientation = Quat::from_axis_angle(&Vector3::y_axis(), yaw);
        let velocity = resolve_velocity(
            self.state,
            dt,
            support,
            current_velocity,
            intent,
            orientation,
            gravity,
            &self.speeds,
            solver,
        );

        Some(TickResult {
            state: self.state,
            velocity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locomotion::LocomotionState::*;

    const G: Vec3 = Vec3::new(0.0, -18.0, 0.0);

    struct Passthrough;
    impl SweptMove for Passthrough {
        fn swept_move(
            &self,
            _dt: f32,
            _forward: Vec3,
            _normal: Vec3,
            _current: Vec3,
            _surface_velocity: Vec3,
            desired: Vec3,
            _up: Vec3,
        ) -> Vec3 {
            desired
        }
    }

    fn flat_support() -> SupportInfo {
        SupportInfo {
            supported: true,
            average_normal: Vector3::y(),
            average_surface_velocity: Vec3::zeros(),
        }
    }

    #[test]
    fn jump_from_rest_launches_and_goes_airborne_next_tick() {
        let mut controller = CharacterController::new(SpeedConfig {
            jump_height: 2.0,
            ..SpeedConfig::default()
        });
        controller.state = Grounded;

        let jump = InputIntent {
            want_jump: true,
            ..InputIntent::NEUTRAL
        };
        let result = controller
            .tick(
                1.0 / 60.0,
                &flat_support(),
                Vec3::zeros(),
                &jump,
                0.0,
                G,
                &Passthrough,
            )
            .unwrap();
        assert_eq!(result.state, JumpStart);
        // sqrt(2 * 18 * 2.0) ~= 8.49
        assert!((result.velocity.y - 8.485281).abs() < 1.0e-4);

        // Next tick goes airborne regardless of support.
        for supported in [true, false] {
            let mut next = controller;
            let support = SupportInfo {
                supported,
                ..flat_support()
            };
            let result = next
                .tick(
                    1.0 / 60.0,
                    &support,
                    result.velocity,
                    &InputIntent::NEUTRAL,
                    0.0,
                    G,
                    &Passthrough,
                )
                .unwrap();
            assert_eq!(result.state, Airborne);
        }
    }

    #[test]
    fn zero_dt_tick_is_a_no_op() {
        let mut controller = CharacterController::new(SpeedConfig::default());
        controller.state = Grounded;

        let jump = InputIntent {
            want_jump: true,
            ..InputIntent::NEUTRAL
        };
        for dt in [0.0, -0.25, f32::NAN, f32::INFINITY] {
            assert!(
                controller
                    .tick(
                        dt,
                        &flat_support(),
                        Vec3::new(1.0, 0.0, 0.0),
                        &jump,
                        0.0,
                        G,
                        &Passthrough,
                    )
                    .is_none()
            );
            assert_eq!(controller.state, Grounded);
        }
    }

    #[test]
    fn landing_then_walking() {
        let mut controller = CharacterController::new(SpeedConfig::default());
        assert_eq!(controller.state, Airborne);

        let walk = InputIntent {
            axis: nalgebra::Vector2::new(0.0, 1.0),
            want_jump: false,
            boost: false,
        };
        let result = controller
            .tick(
                1.0 / 60.0,
                &flat_support(),
                Vec3::zeros(),
                &walk,
                0.0,
                G,
                &Passthrough,
            )
            .unwrap();
        assert_eq!(result.state, Grounded);
        // Walking forward at identity yaw moves along -Z at ground speed.
        assert!((result.velocity.z + controller.speeds.ground_speed).abs() < 1.0e-4);
    }
}
