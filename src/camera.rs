use bevy::{input::common_conditions::input_just_pressed, prelude::*};
use bevy_pancam::{PanCam, PanCamPlugin};

use crate::prelude::{BG_COLOR, BOARD_POS};

const DEFAULT_SCALE: f32 = 1.0;

pub struct CamPlugin;

impl Plugin for CamPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PanCamPlugin)
            .insert_resource(ClearColor(BG_COLOR))
            .add_systems(Startup, spawn_cam)
            .add_systems(Update, recenter_cam.run_if(input_just_pressed(KeyCode::Home)));
    }
}

// Init
fn spawn_cam(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        // left click toggles cells, so panning uses the other buttons
        PanCam {
            grab_buttons: vec![MouseButton::Right, MouseButton::Middle],
            ..default()
        },
        OrthographicProjection {
            scaling_mode: bevy::render::camera::ScalingMode::WindowSize,
            scale: DEFAULT_SCALE,
            near: -1000.0,
            far: 1000.0,
            ..OrthographicProjection::default_2d()
        },
        Transform::from_translation(BOARD_POS.extend(0.0)),
        Msaa::Off,
    ));
}

fn recenter_cam(mut cams: Query<(&mut Transform, &mut OrthographicProjection), With<Camera2d>>) {
    for (mut transform, mut projection) in cams.iter_mut() {
        transform.translation = BOARD_POS.extend(transform.translation.z);
        projection.scale = DEFAULT_SCALE;
    }
}
