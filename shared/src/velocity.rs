//! Velocity resolution.
//!
//! `resolve_velocity` computes the character's next velocity from the
//! locomotion state, the per-tick support snapshot, and the player's intent.
//! The collision-aware movement solver is an opaque collaborator behind the
//! [`SweptMove`] trait so the branch math stays testable without a scene.

use nalgebra::Vector3;

use crate::constants::{
    AIR_SPEED_MPS, BOOST_MULTIPLIER, DIST_EPS, GROUND_SPEED_MPS, JUMP_HEIGHT_M,
    REPROJECT_DENOM_EPS, UP_VELOCITY_EPS,
};
use crate::intent::InputIntent;
use crate::locomotion::{LocomotionState, SupportInfo};
use crate::{Quat, Vec3};

/// Movement speed tuning for one character.
#[derive(Clone, Copy, Debug)]
pub struct SpeedConfig {
    pub ground_speed: f32,
    pub air_speed: f32,
    pub jump_height: f32,
    pub boost_multiplier: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            ground_speed: GROUND_SPEED_MPS,
            air_speed: AIR_SPEED_MPS,
            jump_height: JUMP_HEIGHT_M,
            boost_multiplier: BOOST_MULTIPLIER,
        }
    }
}

/// Collision-aware movement solver.
///
/// Given the surface context and a desired velocity, produce a candidate
/// velocity that respects blocking contacts. `forward` is the character's
/// world-space facing, `up` the world up direction.
pub trait SweptMove {
    fn swept_move(
        &self,
        dt: f32,
        forward: Vec3,
        surface_normal: Vec3,
        current: Vec3,
        surface_velocity: Vec3,
        desired: Vec3,
        up: Vec3,
    ) -> Vec3;
}

/// World up direction derived from gravity. Falls back to +Y when gravity is
/// degenerate.
#[inline]
pub fn up_from_gravity(gravity: Vec3) -> Vec3 {
    if gravity.norm_squared() <= DIST_EPS {
        Vector3::y()
    } else {
        -gravity.normalize()
    }
}

/// Local-space intent direction: +x strafes right, +y walks forward (-Z).
/// Normalized so diagonal input is not faster than straight input.
#[inline]
fn local_direction(intent: &InputIntent) -> Vec3 {
    let dir = Vec3::new(intent.axis.x, 0.0, -intent.axis.y);
    let len_sq = dir.norm_squared();
    if len_sq <= DIST_EPS {
        Vec3::zeros()
    } else {
        dir / len_sq.sqrt()
    }
}

/// Compute the next velocity for this tick.
///
/// Branches by locomotion state:
/// - `Airborne`: horizontal movement is recomputed from the intent at air
///   speed; the pre-existing vertical speed is carried over, then gravity is
///   integrated for this sub-step.
/// - `Grounded`: intent at ground speed against the actual surface context.
///   If the surface-relative result is pushed off the surface (upward
///   component beyond a small epsilon, e.g. walking up a slope), it is
///   reprojected onto the surface-horizontal plane and returned without
///   re-adding the surface velocity.
/// - `JumpStart`: the up component of the current velocity is replaced by
///   the launch speed `sqrt(2 g h)`.
pub fn resolve_velocity(
    state: LocomotionState,
    dt: f32,
    support: &SupportInfo,
    current: Vec3,
    intent: &InputIntent,
    orientation: Quat,
    gravity: Vec3,
    config: &SpeedConfig,
    solver: &impl SweptMove,
) -> Vec3 {
    let up = up_from_gravity(gravity);
    let forward = orientation * Vec3::new(0.0, 0.0, -1.0);
    let boost = if intent.boost {
        config.boost_multiplier
    } else {
        1.0
    };

    match state {
        LocomotionState::Airborne => {
            let desired = orientation * (local_direction(intent) * (config.air_speed * boost));
            let candidate =
                solver.swept_move(dt, forward, up, current, Vec3::zeros(), desired, up);
            // Horizontal movement is recomputed from scratch; vertical speed
            // carries over from the previous tick.
            let horizontal = candidate - up * candidate.dot(&up);
            horizontal + up * current.dot(&up) + gravity * dt
        }
        LocomotionState::Grounded => {
            let desired = orientation * (local_direction(intent) * (config.ground_speed * boost));
            let candidate = solver.swept_move(
                dt,
                forward,
                support.average_normal,
                current,
                support.average_surface_velocity,
                desired,
                up,
            );
            let relative = candidate - support.average_surface_velocity;
            if relative.dot(&up) > UP_VELOCITY_EPS {
                // Pushed off the surface (e.g. on a slope): reproject onto
                // the surface-horizontal plane, scaling by the slope so the
                // planar speed is preserved. The denominator floor keeps the
                // result bounded on near-vertical surfaces.
                let speed = relative.norm();
                let denom = support.average_normal.dot(&up).max(REPROJECT_DENOM_EPS);
                let across = support.average_normal.cross(&(relative / speed));
                let dir = across.cross(&up);
                let dir_len = dir.norm();
                if dir_len <= DIST_EPS {
                    // Relative velocity parallel to the normal: nothing
                    // horizontal to preserve.
                    return support.average_surface_velocity;
                }
                // Surface velocity is deliberately not re-added here.
                return dir * (speed / denom / dir_len);
            }
            relative + support.average_surface_velocity
        }
        LocomotionState::JumpStart => {
            let height = config.jump_height * boost;
            let launch = (2.0 * gravity.norm() * height).sqrt();
            current + up * (launch - current.dot(&up))
        }
    }
}
