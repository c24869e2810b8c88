//! Tuning constants for movement, camera, and collision.
//!
//! Distances are in meters, speeds in meters per second, angles in radians,
//! time in seconds. Favor practical world-space tolerances over machine
//! epsilon for robust behavior.

/// Gravity magnitude (positive value). The demo uses stronger-than-earth
/// gravity for snappier jump arcs.
pub const GRAVITY_MPS2: f32 = 18.0;

/// Walking speed while supported by the ground.
pub const GROUND_SPEED_MPS: f32 = 10.0;

/// Planar steering speed while airborne.
pub const AIR_SPEED_MPS: f32 = 8.0;

/// Apex height of an unboosted jump.
pub const JUMP_HEIGHT_M: f32 = 1.5;

/// Speed and jump-height multiplier applied while the boost key is held.
pub const BOOST_MULTIPLIER: f32 = 2.0;

/// Turn rate applied by the keyboard turn keys.
pub const TURN_RATE_RAD_PER_SEC: f32 = 2.5;

/// Upward relative-velocity threshold above which the grounded resolver
/// reprojects onto the surface-horizontal plane.
pub const UP_VELOCITY_EPS: f32 = 1.0e-3;

/// Floor for the `normal · up` denominator in the grounded reprojection.
/// Keeps the reprojected speed bounded on near-vertical support surfaces.
pub const REPROJECT_DENOM_EPS: f32 = 1.0e-2;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;

/// Separation from surfaces kept when landing or sliding (meters).
/// Too large creates visible gaps; too small risks jitter on contact.
pub const CONTACT_SKIN: f32 = 0.02;

/// Maximum number of slide iterations per kinematic step.
/// Higher values help with tight corners at the cost of more casts.
pub const MAX_SLIDE_ITERATIONS: u32 = 4;

/// Downward probe distance used by the support check (meters).
pub const GROUND_PROBE_DISTANCE: f32 = 0.12;

/// Closest allowed camera offset depth (meters behind the character).
pub const ZOOM_MIN: f32 = 2.5;

/// Farthest allowed camera offset depth (meters behind the character).
pub const ZOOM_MAX: f32 = 16.0;

/// Default camera offset from the character, before yaw rotation:
/// x (right), y (height), z (depth behind).
pub const DEFAULT_CAMERA_OFFSET: [f32; 3] = [0.0, 1.8, 6.0];

/// Pointer drag sensitivity (meters of camera travel per pixel).
pub const DRAG_SENSITIVITY: f32 = 0.01;

/// Wheel-to-zoom gain on top of the drag sensitivity.
pub const WHEEL_ZOOM_SCALE: f32 = 6.0;

/// Two-finger-pan gain on top of the drag sensitivity.
pub const PAN_SCALE: f32 = 4.0;

/// Follow decay rate at minimum zoom (closer camera, snappier follow).
/// Used as the `decay_rate` of an exponential position blend.
pub const FOLLOW_DECAY_NEAR: f32 = 24.0;

/// Follow decay rate at maximum zoom (farther camera, looser follow).
pub const FOLLOW_DECAY_FAR: f32 = 6.0;

/// Duration of the post-drag character realignment lerp.
pub const ROTATION_LERP_SECONDS: f32 = 0.5;
