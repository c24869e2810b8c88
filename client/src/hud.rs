//! On-screen text: collection tally, boost indicator, and an F3-toggled
//! movement readout.

use bevy::prelude::*;

use crate::character::{Controller, Player, Velocity};
use crate::input::PlayerInput;
use crate::pickups::Score;

/// Whether the extra movement readout line is shown. Toggled by F3.
#[derive(Resource, Default)]
pub struct DebugReadout(pub bool);

#[derive(Component)]
struct HudText;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<DebugReadout>();
    app.add_systems(Startup, spawn_hud);
    app.add_systems(Update, update_hud);
}

fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        HudText,
        Text(String::new()),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn update_hud(
    score: Res<Score>,
    input: Res<PlayerInput>,
    readout: Res<DebugReadout>,
    player: Single<(&Controller, &Velocity), With<Player>>,
    text: Single<&mut Text, With<HudText>>,
) {
    let mut line = format!("Orbs {}/{}", score.collected, score.total);
    if input.0.intent().boost {
        line.push_str("  BOOST");
    }
    if readout.0 {
        let (controller, velocity) = player.into_inner();
        line.push_str(&format!(
            "\n{:?}, speed {:.1} m/s",
            controller.0.state,
            velocity.0.norm()
        ));
    }
    text.into_inner().0 = line;
}
