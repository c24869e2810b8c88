//! Third-person follow camera.
//!
//! The camera orbits a rig offset behind the character. Left-button drags
//! move it freely (re-synced into the rig height), a two-finger touch pan
//! slides it, and the wheel zooms. When movement starts after a drag, the
//! character is realigned camera-forward through a timed yaw lerp.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use nalgebra::Vector2;
use shared::constants::ROTATION_LERP_SECONDS;
use shared::{CameraRig, RotationLerp, yaw_away_from_camera};

use crate::character::{MovementStarted, Player, Yaw};
use crate::input::InputAction;
use crate::world::{to_bevy, to_na};

/// Marks the camera entity driven by this module.
#[derive(Component)]
struct FollowCamera;

#[derive(Resource)]
pub struct CameraState {
    pub rig: CameraRig,
    /// True while the drag button is held; suppresses following.
    dragging: bool,
    /// Armed by releasing a drag; the next walk-start consumes it.
    rotate_on_walk: bool,
    lerp: Option<RotationLerp>,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            rig: CameraRig::default(),
            dragging: false,
            rotate_on_walk: false,
            lerp: None,
        }
    }
}

impl CameraState {
    /// True while the realignment lerp is driving the character's heading.
    pub fn owns_yaw(&self) -> bool {
        self.lerp.is_some()
    }
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CameraState>();
    app.add_systems(Startup, spawn_camera);
    app.add_systems(
        Update,
        (
            drag_camera,
            pan_camera,
            zoom_camera,
            start_rotation_lerp,
            advance_rotation_lerp,
            follow_target,
        )
            .chain(),
    );
}

fn spawn_camera(mut commands: Commands, state: Res<CameraState>) {
    commands.spawn((
        FollowCamera,
        Camera3d::default(),
        Transform::from_translation(to_bevy(state.rig.desired_position(
            shared::Vec3::new(0.0, 2.0, 0.0),
            0.0,
        )))
        .looking_at(Vec3::new(0.0, 2.0, 0.0), Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            falloff: FogFalloff::from_visibility_colors(
                300.0,
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
            ..default()
        },
    ));
}

fn drag_camera(
    actions: Res<ActionState<InputAction>>,
    mut motion: MessageReader<MouseMotion>,
    mut state: ResMut<CameraState>,
    camera: Single<&mut Transform, With<FollowCamera>>,
    player: Single<&Transform, (With<Player>, Without<FollowCamera>)>,
) {
    if !actions.pressed(&InputAction::Drag) {
        if actions.just_released(&InputAction::Drag) && state.dragging {
            state.dragging = false;
            state.rotate_on_walk = true;
        }
        motion.clear();
        return;
    }
    state.dragging = true;

    let mut delta = Vec2::ZERO;
    for message in motion.read() {
        delta += message.delta;
    }
    if delta == Vec2::ZERO {
        return;
    }

    let mut cam_tf = camera.into_inner();
    let step = (*cam_tf.right() * -delta.x + *cam_tf.up() * delta.y) * state.rig.sensitivity;
    cam_tf.translation += step;

    let focus = player.translation + Vec3::Y * 1.0;
    cam_tf.look_at(focus, Vec3::Y);
    state.rig.resync_height(cam_tf.translation.y, player.translation.y);
}

fn pan_camera(
    touches: Res<Touches>,
    mut state: ResMut<CameraState>,
    camera: Single<&Transform, With<FollowCamera>>,
) {
    let active: Vec<_> = touches.iter().collect();
    if active.len() != 2 {
        return;
    }

    let delta = (active[0].delta() + active[1].delta()) / 2.0;
    if delta == Vec2::ZERO {
        return;
    }

    let cam_tf = camera.into_inner();
    state.rig.apply_pan(
        Vector2::new(delta.x, delta.y),
        to_na(*cam_tf.right()),
        to_na(*cam_tf.forward()),
    );
}

fn zoom_camera(mut wheel: MessageReader<MouseWheel>, mut state: ResMut<CameraState>) {
    for message in wheel.read() {
        state.rig.apply_wheel(message.x);
    }
}

fn start_rotation_lerp(
    mut walk_started: MessageReader<MovementStarted>,
    mut state: ResMut<CameraState>,
    camera: Single<&Transform, With<FollowCamera>>,
    player: Single<(&Transform, &Yaw), (With<Player>, Without<FollowCamera>)>,
) {
    let started = walk_started.read().next().is_some();
    walk_started.clear();
    if !started || !state.rotate_on_walk || state.lerp.is_some() {
        return;
    }
    state.rotate_on_walk = false;

    let (player_tf, yaw) = player.into_inner();
    if let Some(target_yaw) = yaw_away_from_camera(
        to_na(camera.into_inner().translation),
        to_na(player_tf.translation),
    ) {
        state.lerp = Some(RotationLerp::new(yaw.0, target_yaw, ROTATION_LERP_SECONDS));
    }
}

fn advance_rotation_lerp(
    time: Res<Time>,
    mut state: ResMut<CameraState>,
    player: Single<(&mut Transform, &mut Yaw), With<Player>>,
) {
    let Some(mut lerp) = state.lerp.take() else {
        return;
    };

    let (mut transform, mut yaw) = player.into_inner();
    yaw.0 = lerp.advance(time.delta_secs());
    transform.rotation = Quat::from_rotation_y(yaw.0);

    if !lerp.finished() {
        state.lerp = Some(lerp);
    }
}

fn follow_target(
    time: Res<Time>,
    state: Res<CameraState>,
    camera: Single<&mut Transform, With<FollowCamera>>,
    player: Single<(&Transform, &Yaw), (With<Player>, Without<FollowCamera>)>,
) {
    // Dragging and the realignment lerp both want the camera parked.
    if state.dragging || state.lerp.is_some() {
        return;
    }

    let (player_tf, yaw) = player.into_inner();
    let desired = to_bevy(
        state
            .rig
            .desired_position(to_na(player_tf.translation), yaw.0),
    );

    let mut cam_tf = camera.into_inner();
    cam_tf
        .translation
        .smooth_nudge(&desired, state.rig.follow_decay_rate(), time.delta_secs());
    cam_tf.look_at(player_tf.translation + Vec3::Y * 1.0, Vec3::Y);
}
