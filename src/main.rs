use bevy::prelude::*;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::gizmos::config::{DefaultGizmoConfigGroup, GizmoConfigStore};
use bevy::math::bounding::Aabb2d;
use bevy::pbr::wireframe::{WireframeConfig, WireframePlugin};
use bevy::window::{WindowMode, WindowPlugin, WindowResolution};
use bevy_egui::EguiPlugin;
use bevy_rts_camera::{RtsCamera, RtsCameraControls, RtsCameraPlugin};

use block_massing_gen::config::{SITE_DEPTH, SITE_WIDTH};

mod systems;

use systems::district::DistrictPlugin;
use systems::ui::UIPlugin;

fn main() -> AppExit {
    let window = Window {
        title: "block massing".to_string(),
        mode: WindowMode::Windowed,
        resolution: WindowResolution::new(1600.0, 900.0),
        ..default()
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin { primary_window: Some(window), ..default() }))
        .add_plugins((
            EguiPlugin::default(),
            FrameTimeDiagnosticsPlugin::default(),
            WireframePlugin::default(),
            RtsCameraPlugin,
        ))
        .add_plugins((DistrictPlugin, UIPlugin))
        // toggled from the panel, off so tower faces stay readable
        .insert_resource(WireframeConfig { global: false, default_color: Color::BLACK })
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.06)))
        .add_systems(Startup, setup_scene)
        .run()
}

// camera framing the site, a sun, and gizmos drawn over the meshes
fn setup_scene(mut commands: Commands, mut config_store: ResMut<GizmoConfigStore>) {
    let (gizmos, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    gizmos.depth_bias = -1.0;
    gizmos.line.width = 1.5;

    let half = Vec2::new(SITE_WIDTH as f32, SITE_DEPTH as f32) * 0.5;
    commands.spawn((
        RtsCamera {
            bounds: Aabb2d::new(half, half + Vec2::splat(50.0)),
            min_angle: 0.5,
            height_max: 500.0,
            ..default()
        },
        RtsCameraControls {
            key_up: KeyCode::KeyW,
            key_down: KeyCode::KeyS,
            key_left: KeyCode::KeyA,
            key_right: KeyCode::KeyD,
            key_rotate_left: KeyCode::KeyQ,
            key_rotate_right: KeyCode::KeyE,
            pan_speed: 120.0,
            zoom_sensitivity: 0.15,
            edge_pan_width: 0.0,
            ..default()
        },
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 3_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(half.x + 300.0, 600.0, half.y - 200.0).looking_at(Vec3::new(half.x, 0.0, half.y), Vec3::Y),
    ));
    commands.insert_resource(AmbientLight { color: Color::WHITE, brightness: 300.0, ..default() });
}
