//! Level geometry: rendered meshes plus the matching collision bodies.

use std::f32::consts::TAU;

use bevy::prelude::*;
use nalgebra as na;
use shared::{StaticBody, StaticShape, StaticWorld};

use crate::character;

/// The static collision world the character moves through.
#[derive(Resource, Default)]
pub struct CollisionWorld(pub StaticWorld);

/// Marks a platform that oscillates along X; `index` is its collision body.
#[derive(Component)]
struct MovingPlatform {
    index: usize,
    origin: Vec3,
    amplitude: f32,
    period: f32,
}

#[inline]
pub fn to_na(v: Vec3) -> shared::Vec3 {
    shared::Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn to_bevy(v: shared::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<CollisionWorld>();
    app.add_systems(Startup, setup);
    // Platform poses and velocities must be current before the character's
    // support check runs this tick.
    app.add_systems(
        FixedUpdate,
        animate_platforms.before(character::probe_support),
    );
}

const RAMP_ANGLE: f32 = -0.35;

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut collision: ResMut<CollisionWorld>,
) {
    info!("World setup");

    // Ground
    collision.0.push(StaticBody::fixed(StaticShape::Plane {
        normal: na::Vector3::y(),
        dist: 0.0,
    }));
    commands.spawn((
        Transform::from_xyz(0., 0., 0.),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(60., 60.).build())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.2, 0.3, 0.25),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        })),
    ));

    let block_material = materials.add(StandardMaterial {
        base_color: Color::srgb_u8(124, 144, 255),
        ..default()
    });

    // Ramp up to the high platform.
    spawn_block(
        &mut commands,
        &mut meshes,
        &mut collision,
        block_material.clone(),
        Vec3::new(4.0, 0.25, 6.0),
        Vec3::new(8.0, 1.0, -6.0),
        Quat::from_rotation_x(RAMP_ANGLE),
    );

    // Static platforms at jumpable heights.
    spawn_block(
        &mut commands,
        &mut meshes,
        &mut collision,
        block_material.clone(),
        Vec3::new(3.0, 0.25, 3.0),
        Vec3::new(8.0, 3.0, -14.0),
        Quat::IDENTITY,
    );
    spawn_block(
        &mut commands,
        &mut meshes,
        &mut collision,
        block_material.clone(),
        Vec3::new(2.0, 0.5, 2.0),
        Vec3::new(-6.0, 0.5, -10.0),
        Quat::IDENTITY,
    );

    // Oscillating platform; its surface velocity feeds the support check.
    let origin = Vec3::new(-8.0, 1.5, 4.0);
    let half_extents = Vec3::new(2.0, 0.25, 2.0);
    let index = collision.0.push(StaticBody::moving(
        StaticShape::Cuboid {
            half_extents: to_na(half_extents),
            translation: to_na(origin),
            rotation: shared::Quat::identity(),
        },
        shared::Vec3::zeros(),
    ));
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_size(half_extents * 2.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.85, 0.6, 0.2))),
        Transform::from_translation(origin),
        MovingPlatform {
            index,
            origin,
            amplitude: 4.0,
            period: 6.0,
        },
    ));

    // Light
    commands.spawn((
        PointLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, 4.0),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 4_000.0,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn spawn_block(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    collision: &mut CollisionWorld,
    material: Handle<StandardMaterial>,
    half_extents: Vec3,
    translation: Vec3,
    rotation: Quat,
) {
    collision.0.push(StaticBody::fixed(StaticShape::Cuboid {
        half_extents: to_na(half_extents),
        translation: to_na(translation),
        rotation: to_na_quat(rotation),
    }));
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_size(half_extents * 2.0))),
        MeshMaterial3d(material),
        Transform::from_translation(translation).with_rotation(rotation),
    ));
}

fn to_na_quat(q: Quat) -> shared::Quat {
    shared::Quat::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

fn animate_platforms(
    time: Res<Time<Fixed>>,
    mut collision: ResMut<CollisionWorld>,
    mut platforms: Query<(&mut Transform, &MovingPlatform)>,
) {
    let t = time.elapsed_secs();
    for (mut transform, platform) in &mut platforms {
        let omega = TAU / platform.period;
        let x = platform.origin.x + platform.amplitude * (omega * t).sin();
        let vx = platform.amplitude * omega * (omega * t).cos();

        transform.translation.x = x;
        if let Some(body) = collision.0.body_mut(platform.index) {
            if let StaticShape::Cuboid { translation, .. } = &mut body.shape {
                translation.x = x;
            }
            body.velocity = shared::Vec3::new(vx, 0.0, 0.0);
        }
    }
}
