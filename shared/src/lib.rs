pub mod camera;
pub mod character;
pub mod constants;
pub mod intent;
pub mod locomotion;
pub mod velocity;
pub mod world;

/// Common math aliases for clarity and consistency.
pub type Vec3 = nalgebra::Vector3<f32>;
pub type Quat = nalgebra::UnitQuaternion<f32>;
pub type Iso = nalgebra::Isometry3<f32>;

pub use camera::{
    CameraRig, RotationLerp, ease_in_out_cubic, shortest_angle_delta, wrap_angle,
    yaw_away_from_camera, yaw_from_planar,
};
pub use character::{CharacterController, TickResult};
pub use intent::{HeldKey, InputAggregator, InputIntent};
pub use locomotion::{LocomotionState, SupportInfo, next_state};
pub use velocity::{SpeedConfig, SweptMove, resolve_velocity, up_from_gravity};
pub use world::{CapsuleSpec, CapsuleSweep, MoveHit, StaticBody, StaticShape, StaticWorld};
