//! Collectible orbs scattered around the level.

use bevy::prelude::*;

use crate::character::Player;

const COLLECT_DISTANCE: f32 = 1.2;
const SPIN_RATE: f32 = 1.4;

#[derive(Component)]
struct Pickup;

/// Running collection tally shown on the HUD.
#[derive(Resource, Default)]
pub struct Score {
    pub collected: u32,
    pub total: u32,
}

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Score>();
    app.add_systems(Startup, spawn_pickups);
    app.add_systems(Update, (spin, collect));
}

const SPOTS: [[f32; 3]; 8] = [
    [3.0, 0.8, -3.0],
    [-4.0, 0.8, -6.0],
    [8.0, 1.8, -6.0],
    [8.0, 4.0, -14.0],
    [-6.0, 1.8, -10.0],
    [-8.0, 2.5, 4.0],
    [0.0, 0.8, 8.0],
    [12.0, 0.8, 2.0],
];

fn spawn_pickups(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut score: ResMut<Score>,
) {
    let mesh = meshes.add(Sphere::new(0.25));
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(1.0, 0.85, 0.2),
        emissive: LinearRgba::new(2.0, 1.6, 0.2, 1.0),
        ..default()
    });

    for [x, y, z] in SPOTS {
        commands.spawn((
            Pickup,
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_xyz(x, y, z),
        ));
    }
    score.total = SPOTS.len() as u32;
}

fn spin(time: Res<Time>, mut pickups: Query<&mut Transform, With<Pickup>>) {
    for mut transform in &mut pickups {
        transform.rotate_y(SPIN_RATE * time.delta_secs());
    }
}

fn collect(
    mut commands: Commands,
    mut score: ResMut<Score>,
    player: Single<&Transform, With<Player>>,
    pickups: Query<(Entity, &Transform), (With<Pickup>, Without<Player>)>,
) {
    for (entity, transform) in &pickups {
        if transform.translation.distance(player.translation) <= COLLECT_DISTANCE {
            commands.entity(entity).despawn();
            score.collected += 1;
            info!("orb collected ({}/{})", score.collected, score.total);
        }
    }
}
