//! Camera rig math and the post-drag character realignment lerp.
//!
//! The rig's persistent state is a single offset vector: the camera position
//! relative to its target, rotated by the target's yaw before use. Wheel and
//! two-finger-pan gestures mutate the offset; the depth component is
//! re-clamped to the zoom range after every mutation, never only eventually.
//!
//! The Bevy-side systems that feed gestures in and blend the camera
//! transform live in the client crate; everything here is deterministic.

use std::f32::consts::{PI, TAU};

use nalgebra::{Vector2, Vector3};

use crate::constants::{
    DEFAULT_CAMERA_OFFSET, DIST_EPS, DRAG_SENSITIVITY, FOLLOW_DECAY_FAR, FOLLOW_DECAY_NEAR,
    PAN_SCALE, WHEEL_ZOOM_SCALE, ZOOM_MAX, ZOOM_MIN,
};
use crate::{Quat, Vec3};

/// Wrap an angle into `[-PI, PI)`.
#[inline]
pub fn wrap_angle(radians: f32) -> f32 {
    (radians + PI).rem_euclid(TAU) - PI
}

/// Signed shortest angular path from `from` to `to`, always within
/// `[-PI, PI]`, handling wraparound at the half-turn boundary.
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Yaw (about +Y, forward = -Z) that faces along a planar direction.
/// `None` when the planar component is degenerate.
#[inline]
pub fn yaw_from_planar(dir: Vec3) -> Option<f32> {
    if dir.x * dir.x + dir.z * dir.z <= DIST_EPS {
        return None;
    }
    Some((-dir.x).atan2(-dir.z))
}

/// Yaw that faces a target directly away from the camera.
#[inline]
pub fn yaw_away_from_camera(camera_pos: Vec3, target_pos: Vec3) -> Option<f32> {
    yaw_from_planar(target_pos - camera_pos)
}

/// Cubic ease-in-out on `[0, 1]`.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

/// Follow-camera rig: a yaw-relative offset from the target with a clamped
/// zoom range on the offset depth.
#[derive(Clone, Copy, Debug)]
pub struct CameraRig {
    /// Camera position relative to the target, before yaw rotation:
    /// x right, y height, z depth behind the character.
    pub offset: Vec3,
    /// Gesture sensitivity (meters per pixel of pointer travel).
    pub sensitivity: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        let [x, y, z] = DEFAULT_CAMERA_OFFSET;
        Self::new(Vec3::new(x, y, z), DRAG_SENSITIVITY, ZOOM_MIN, ZOOM_MAX)
    }
}

impl CameraRig {
    pub fn new(offset: Vec3, sensitivity: f32, zoom_min: f32, zoom_max: f32) -> Self {
        let mut rig = Self {
            offset,
            sensitivity,
            zoom_min,
            zoom_max,
        };
        rig.clamp_depth();
        rig
    }

    #[inline]
    fn clamp_depth(&mut self) {
        self.offset.z = self.offset.z.clamp(self.zoom_min, self.zoom_max);
    }

    /// Zoom by a horizontal wheel delta. The depth is re-clamped before
    /// returning.
    pub fn apply_wheel(&mut self, delta_x: f32) {
        self.offset.z += delta_x * self.sensitivity * WHEEL_ZOOM_SCALE;
        self.clamp_depth();
    }

    /// Pan by the average frame-to-frame motion of a two-finger gesture,
    /// expressed along the camera's right and forward directions.
    pub fn apply_pan(&mut self, average_delta: Vector2<f32>, camera_right: Vec3, camera_forward: Vec3) {
        let motion = camera_right * (-average_delta.x) + camera_forward * average_delta.y;
        self.offset += motion * (self.sensitivity * PAN_SCALE);
        self.clamp_depth();
    }

    /// Resync the offset height to the live camera-to-target height
    /// difference, so releasing a drag does not snap the camera vertically.
    pub fn resync_height(&mut self, camera_y: f32, target_y: f32) {
        self.offset.y = camera_y - target_y;
    }

    /// Desired camera position for a target at `target_pos` facing
    /// `target_yaw` (yaw-only rotation of the offset).
    pub fn desired_position(&self, target_pos: Vec3, target_yaw: f32) -> Vec3 {
        let rotation = Quat::from_axis_angle(&Vector3::y_axis(), target_yaw);
        target_pos + rotation * self.offset
    }

    /// Where the current depth sits in the zoom range: 0 at minimum zoom,
    /// 1 at maximum.
    pub fn zoom_fraction(&self) -> f32 {
        if self.zoom_max > self.zoom_min {
            ((self.offset.z - self.zoom_min) / (self.zoom_max - self.zoom_min)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Exponential decay rate for the smooth-follow blend: tight when the
    /// camera is close, loose when it is far.
    pub fn follow_decay_rate(&self) -> f32 {
        FOLLOW_DECAY_NEAR + (FOLLOW_DECAY_FAR - FOLLOW_DECAY_NEAR) * self.zoom_fraction()
    }
}

/// Timed, eased reorientation of the character's yaw after a drag gesture.
///
/// While one of these is alive it owns the yaw exclusively; the holder must
/// suspend other yaw-writing paths. Elapsed time is threaded in as a
/// delta-time parameter so progress is deterministic under test.
#[derive(Clone, Copy, Debug)]
pub struct RotationLerp {
    start_yaw: f32,
    delta: f32,
    duration: f32,
    elapsed: f32,
}

impl RotationLerp {
    /// Start a lerp from `current_yaw` to `target_yaw` along the shortest
    /// angular path.
    pub fn new(current_yaw: f32, target_yaw: f32, duration: f32) -> Self {
        Self {
            start_yaw: current_yaw,
            delta: shortest_angle_delta(current_yaw, target_yaw),
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
        }
    }

    /// Advance by a frame delta and return the yaw to apply this frame.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt.max(0.0);
        self.start_yaw + self.delta * ease_in_out_cubic(self.progress())
    }

    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target_yaw(&self) -> f32 {
        self.start_yaw + self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_path_is_bounded_and_congruent() {
        let cases = [
            (0.0, 1.0),
            (1.0, 0.0),
            (3.0, -3.0),
            (-3.0, 3.0),
            (0.1, TAU + 0.2),
            (-PI, PI),
            (5.9, 0.2),
        ];
        for (from, to) in cases {
            let d = shortest_angle_delta(from, to);
            assert!(d.abs() <= PI + 1.0e-6, "|{d}| > pi for {from} -> {to}");
            // from + d must equal to, modulo a full turn.
            let residue = wrap_angle(from + d - to);
            assert!(residue.abs() < 1.0e-5, "residue {residue} for {from} -> {to}");
        }
    }

    #[test]
    fn wraparound_never_takes_the_long_way() {
        // 3.0 to -3.0 should go forward through pi (delta ~ +0.283), not
        // backward through almost a full turn.
        let d = shortest_angle_delta(3.0, -3.0);
        assert!((d - (TAU - 6.0)).abs() < 1.0e-5);
    }

    #[test]
    fn ease_endpoints_and_monotonicity() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1.0e-6);
        assert!((ease_in_out_cubic(1.0) - 1.0).abs() < 1.0e-6);
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = ease_in_out_cubic(i as f32 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn depth_stays_clamped_after_every_mutation() {
        let mut rig = CameraRig::default();
        let right = Vector3::x();
        let forward = -Vector3::z();
        // Alternating large wheel and pan mutations; the invariant must hold
        // after each one, not merely at the end.
        for i in 0..50 {
            if i % 2 == 0 {
                rig.apply_wheel(if i % 4 == 0 { 5000.0 } else { -5000.0 });
            } else {
                rig.apply_pan(Vector2::new(0.0, 3000.0), right, forward);
            }
            assert!(rig.offset.z >= rig.zoom_min && rig.offset.z <= rig.zoom_max);
        }
    }

    #[test]
    fn pan_moves_offset_along_camera_axes() {
        let mut rig = CameraRig::new(Vec3::new(0.0, 2.0, 6.0), 0.01, ZOOM_MIN, ZOOM_MAX);
        let before = rig.offset;
        let right = Vector3::x();
        let forward = -Vector3::z();
        rig.apply_pan(Vector2::new(3.0, 2.0), right, forward);

        let moved = rig.offset - before;
        // (-dx, dy) * sensitivity * 4 along right/forward.
        assert!((moved.dot(&right) - (-3.0 * 0.01 * 4.0)).abs() < 1.0e-6);
        assert!((moved.dot(&forward) - (2.0 * 0.01 * 4.0)).abs() < 1.0e-6);
        assert!(moved.y.abs() < 1.0e-6);
    }

    #[test]
    fn desired_position_rotates_offset_by_target_yaw() {
        let rig = CameraRig::new(Vec3::new(0.0, 2.0, 6.0), 0.01, ZOOM_MIN, ZOOM_MAX);
        let target = Vec3::new(10.0, 0.0, -4.0);

        // Identity yaw: camera sits straight behind (+Z).
        let p = rig.desired_position(target, 0.0);
        assert!((p - Vec3::new(10.0, 2.0, 2.0)).norm() < 1.0e-5);

        // Quarter turn: the offset swings around the target.
        let p = rig.desired_position(target, PI / 2.0);
        assert!((p - Vec3::new(16.0, 2.0, -4.0)).norm() < 1.0e-4);
    }

    #[test]
    fn follow_decay_rate_tracks_zoom() {
        let mut rig = CameraRig::default();
        rig.offset.z = rig.zoom_min;
        assert!((rig.follow_decay_rate() - FOLLOW_DECAY_NEAR).abs() < 1.0e-5);
        rig.offset.z = rig.zoom_max;
        assert!((rig.follow_decay_rate() - FOLLOW_DECAY_FAR).abs() < 1.0e-5);

        // Closer camera, snappier follow.
        rig.offset.z = rig.zoom_min;
        let near = rig.follow_decay_rate();
        rig.offset.z = (rig.zoom_min + rig.zoom_max) / 2.0;
        let mid = rig.follow_decay_rate();
        assert!(near > mid && mid > FOLLOW_DECAY_FAR);
    }

    #[test]
    fn rotation_lerp_reaches_target_and_finishes() {
        let mut lerp = RotationLerp::new(0.0, 2.0, 0.5);
        let mut yaw = 0.0;
        for _ in 0..30 {
            yaw = lerp.advance(0.5 / 30.0);
        }
        assert!(lerp.finished());
        assert!((yaw - 2.0).abs() < 1.0e-4);
        assert!((lerp.target_yaw() - 2.0).abs() < 1.0e-6);
    }

    #[test]
    fn rotation_lerp_takes_shortest_path_across_the_seam() {
        let mut lerp = RotationLerp::new(3.0, -3.0, 0.5);
        let yaw = lerp.advance(1.0);
        // Ends just past pi rather than winding back through zero.
        assert!((wrap_angle(yaw) - (-3.0)).abs() < 1.0e-4);
        assert!((lerp.target_yaw() - (3.0 + (TAU - 6.0))).abs() < 1.0e-4);
    }

    #[test]
    fn yaw_away_from_camera_faces_out() {
        // Camera straight behind (+Z): facing away is -Z, i.e. yaw 0.
        let yaw = yaw_away_from_camera(Vec3::new(0.0, 2.0, 6.0), Vec3::zeros()).unwrap();
        assert!(yaw.abs() < 1.0e-6);

        // Camera to +X: facing away is -X, i.e. yaw pi/2.
        let yaw = yaw_away_from_camera(Vec3::new(6.0, 2.0, 0.0), Vec3::zeros()).unwrap();
        assert!((yaw - PI / 2.0).abs() < 1.0e-5);

        // Degenerate: camera directly above.
        assert!(yaw_away_from_camera(Vec3::new(0.0, 5.0, 0.0), Vec3::zeros()).is_none());
    }
}
