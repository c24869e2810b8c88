//! The player character: spawning, the fixed-tick movement pipeline, and
//! keyboard turning.
//!
//! Each fixed tick runs three chained stages: probe the ground under the
//! capsule, resolve the velocity for this tick, then integrate the result
//! through the collision world.

use bevy::prelude::*;
use shared::constants::{GRAVITY_MPS2, GROUND_PROBE_DISTANCE, TURN_RATE_RAD_PER_SEC};
use shared::{
    CapsuleSpec, CapsuleSweep, CharacterController, SpeedConfig, SupportInfo, wrap_angle,
};

use crate::camera::CameraState;
use crate::input::PlayerInput;
use crate::world::{CollisionWorld, to_bevy, to_na};

#[derive(Component)]
pub struct Player;

/// Heading about +Y, in radians. Zero faces -Z.
#[derive(Component)]
pub struct Yaw(pub f32);

#[derive(Component, Default)]
pub struct Velocity(pub shared::Vec3);

#[derive(Component)]
pub struct Controller(pub CharacterController);

#[derive(Component)]
pub struct PlayerCapsule(pub CapsuleSpec);

/// Ground-probe result from the current fixed tick.
#[derive(Resource)]
pub struct CurrentSupport(pub SupportInfo);

impl Default for CurrentSupport {
    fn default() -> Self {
        Self(SupportInfo::unsupported())
    }
}

/// Fired on the idle-to-walking edge; the camera uses it to realign behind
/// the character.
#[derive(Message)]
pub struct MovementStarted;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CurrentSupport>();
    app.add_message::<MovementStarted>();

    app.add_systems(Startup, spawn_player);
    app.add_systems(
        FixedUpdate,
        (probe_support, step_character, integrate).chain(),
    );
    app.add_systems(Update, (turn_with_keyboard, emit_walk_edge, draw_facing));
}

const CAPSULE_RADIUS: f32 = 0.4;
const CAPSULE_HALF_HEIGHT: f32 = 0.5;

fn spawn_player(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let body = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.7, 0.6),
        perceptual_roughness: 0.6,
        ..default()
    });
    let eye = materials.add(Color::srgb(0.05, 0.05, 0.05));
    let eye_mesh = meshes.add(Sphere::new(0.07));

    commands
        .spawn((
            Player,
            Yaw(0.0),
            Velocity::default(),
            Controller(CharacterController::new(SpeedConfig::default())),
            PlayerCapsule(CapsuleSpec {
                radius: CAPSULE_RADIUS,
                half_height: CAPSULE_HALF_HEIGHT,
            }),
            Mesh3d(meshes.add(Capsule3d::new(CAPSULE_RADIUS, CAPSULE_HALF_HEIGHT * 2.0))),
            MeshMaterial3d(body),
            Transform::from_xyz(0.0, 2.0, 0.0),
        ))
        .with_children(|parent| {
            // Eyes on the -Z face so the facing direction reads at a glance.
            for x in [-0.18, 0.18] {
                parent.spawn((
                    Mesh3d(eye_mesh.clone()),
                    MeshMaterial3d(eye.clone()),
                    Transform::from_xyz(x, CAPSULE_HALF_HEIGHT, -CAPSULE_RADIUS),
                ));
            }
        });
}

pub(crate) fn probe_support(
    collision: Res<CollisionWorld>,
    mut support: ResMut<CurrentSupport>,
    player: Single<(&Transform, &PlayerCapsule), With<Player>>,
) {
    let (transform, capsule) = player.into_inner();
    support.0 = collision
        .0
        .support_check(to_na(transform.translation), capsule.0, GROUND_PROBE_DISTANCE);
}

fn step_character(
    time: Res<Time<Fixed>>,
    support: Res<CurrentSupport>,
    input: Res<PlayerInput>,
    collision: Res<CollisionWorld>,
    player: Single<(&Transform, &Yaw, &mut Velocity, &mut Controller, &PlayerCapsule), With<Player>>,
) {
    let (transform, yaw, mut velocity, mut controller, capsule) = player.into_inner();

    let sweep = CapsuleSweep {
        world: &collision.0,
        center: to_na(transform.translation),
        capsule: capsule.0,
    };
    let before = controller.0.state;
    let gravity = shared::Vec3::new(0.0, -GRAVITY_MPS2, 0.0);

    if let Some(result) = controller.0.tick(
        time.delta_secs(),
        &support.0,
        velocity.0,
        &input.0.intent(),
        yaw.0,
        gravity,
        &sweep,
    ) {
        velocity.0 = result.velocity;
        if result.state != before {
            debug!("locomotion {:?} -> {:?}", before, result.state);
        }
    }
}

fn integrate(
    time: Res<Time<Fixed>>,
    collision: Res<CollisionWorld>,
    player: Single<(&mut Transform, &mut Velocity, &PlayerCapsule), With<Player>>,
) {
    let (mut transform, mut velocity, capsule) = player.into_inner();
    let dt = time.delta_secs();

    let (pos, hit) = collision.0.move_capsule(
        to_na(transform.translation),
        capsule.0,
        velocity.0 * dt,
    );
    transform.translation = to_bevy(pos);

    // Stop accumulating speed into whatever we slid along.
    if let Some(hit) = hit {
        let into = velocity.0.dot(&hit.normal);
        if into < 0.0 {
            velocity.0 -= hit.normal * into;
        }
    }
}

fn turn_with_keyboard(
    time: Res<Time>,
    input: Res<PlayerInput>,
    camera_state: Res<CameraState>,
    player: Single<(&mut Transform, &mut Yaw), With<Player>>,
) {
    let (mut transform, mut yaw) = player.into_inner();

    // While the camera realignment lerp is driving the heading, keyboard
    // turning is suspended rather than fighting it.
    if !camera_state.owns_yaw() {
        let turn = input.0.turn();
        if turn != 0.0 {
            yaw.0 = wrap_angle(yaw.0 - turn * TURN_RATE_RAD_PER_SEC * time.delta_secs());
        }
    }
    transform.rotation = Quat::from_rotation_y(yaw.0);
}

fn emit_walk_edge(
    input: Res<PlayerInput>,
    mut was_active: Local<bool>,
    mut writer: MessageWriter<MovementStarted>,
) {
    let active = input.0.movement_active();
    if active && !*was_active {
        writer.write(MovementStarted);
    }
    *was_active = active;
}

fn draw_facing(mut gizmos: Gizmos, player: Single<&GlobalTransform, With<Player>>) {
    let transform = player.into_inner();
    let start = transform.translation() + Vec3::Y * 0.2;
    let end = start + transform.forward() * 1.2;
    gizmos.arrow(start, end, Color::srgb(1.0, 1.0, 0.2));
}
