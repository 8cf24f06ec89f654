use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use rand::Rng;

use swell::config::{load_water_config, WaterConfig};
use swell::graphics::{self, CameraTarget};
use swell::water::{buoyancy_system, Buoyant, KeepDrag, SeaState, WaterPlugin, WaterReference};

/// The player's hull, pushed along by the wind.
#[derive(Component)]
struct Ship;

/// Flotsam spawned ahead of the view to exercise splash and buoyancy.
#[derive(Component)]
struct Flotsam;

#[derive(Resource)]
struct FlotsamSpawner {
    timer: Timer,
}

impl Default for FlotsamSpawner {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(2.5, TimerMode::Repeating),
        }
    }
}

/// Wind and wave change per second while an arrow key is held.
const WIND_STEP: f32 = 10.0;
const INTENSITY_STEP: f32 = 1.0;

/// Configure Rapier physics: gravity from the water configuration.
fn setup_physics_config(
    water: Res<WaterConfig>,
    mut config: Query<&mut RapierConfiguration>,
) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::new(0.0, -water.gravity);
    }
}

fn spawn_ship(mut commands: Commands) {
    commands.spawn((
        Ship,
        CameraTarget,
        Buoyant,
        KeepDrag,
        RigidBody::Dynamic,
        Collider::cuboid(3.0, 0.6),
        ColliderMassProperties::Density(0.4),
        Velocity::default(),
        ExternalForce::default(),
        Damping {
            linear_damping: 0.0,
            angular_damping: 1.0,
        },
        Transform::from_xyz(0.0, 1.0, 0.0),
    ));
    info!("Ship spawned");
}

/// Push the ship downwind.  Runs after the buoyancy system so it adds to,
/// rather than replaces, the buoyant force.
fn ship_wind_system(sea: Res<SeaState>, mut q: Query<&mut ExternalForce, With<Ship>>) {
    if let Ok(mut force) = q.single_mut() {
        force.force.x += sea.wind_speed;
    }
}

/// Arrow keys: left/right change the wind, up/down the wave intensity.
fn sea_state_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut sea: ResMut<SeaState>,
) {
    let dt = time.delta_secs();
    if keys.pressed(KeyCode::ArrowRight) {
        sea.wind_speed += WIND_STEP * dt;
    } else if keys.pressed(KeyCode::ArrowLeft) {
        sea.wind_speed -= WIND_STEP * dt;
    }
    if keys.pressed(KeyCode::ArrowUp) {
        sea.wave_intensity += INTENSITY_STEP * dt;
    } else if keys.pressed(KeyCode::ArrowDown) {
        sea.wave_intensity -= INTENSITY_STEP * dt;
    }
    sea.clamp_to_ranges();
}

/// Drop a random crate, barrel or buoy just inside the right edge of the view.
fn flotsam_spawner_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<WaterConfig>,
    mut spawner: ResMut<FlotsamSpawner>,
    q_reference: Query<&Transform, With<WaterReference>>,
) {
    if !spawner.timer.tick(time.delta()).just_finished() {
        return;
    }
    let Ok(reference) = q_reference.single() else {
        return;
    };

    let mut rng = rand::thread_rng();
    let x = reference.translation.x + config.view_half_width * rng.gen_range(0.5_f32..0.9_f32);
    let y = config.water_level + rng.gen_range(2.0_f32..6.0_f32);
    let collider = match rng.gen_range(0..3) {
        0 => Collider::cuboid(rng.gen_range(0.3_f32..1.2_f32), rng.gen_range(0.3_f32..1.0_f32)),
        1 => Collider::capsule_y(rng.gen_range(0.3_f32..0.8_f32), rng.gen_range(0.2_f32..0.5_f32)),
        _ => Collider::ball(rng.gen_range(0.3_f32..0.9_f32)),
    };

    commands.spawn((
        Flotsam,
        Buoyant,
        RigidBody::Dynamic,
        collider,
        ColliderMassProperties::Density(rng.gen_range(0.2_f32..0.8_f32)),
        Velocity::default(),
        Transform::from_xyz(x, y, 0.0)
            .with_rotation(Quat::from_rotation_z(rng.gen_range(-0.6_f32..0.6_f32))),
    ));
}

/// Despawn flotsam that has fallen behind the trailing edge of the window.
fn flotsam_culling_system(
    mut commands: Commands,
    config: Res<WaterConfig>,
    q_reference: Query<&Transform, With<WaterReference>>,
    q_flotsam: Query<(Entity, &Transform), With<Flotsam>>,
) {
    let Ok(reference) = q_reference.single() else {
        return;
    };
    let behind = reference.translation.x - config.view_half_width - config.despawn_distance;
    for (entity, transform) in q_flotsam.iter() {
        if transform.translation.x < behind {
            commands.entity(entity).despawn();
        }
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Swell".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.02, 0.03, 0.08)))
        // pixels_per_meter(1.0) keeps world units identical to physics units so
        // buoyant forces and the configured gravity share one scale.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0).in_fixed_schedule())
        .add_plugins(WaterPlugin)
        .init_resource::<FlotsamSpawner>()
        .add_systems(
            Startup,
            (
                // The camera is the window reference, so it must exist before the ocean is built.
                graphics::setup_camera.before(load_water_config),
                setup_physics_config.after(load_water_config),
                spawn_ship,
            ),
        )
        .add_systems(FixedUpdate, ship_wind_system.after(buoyancy_system))
        .add_systems(
            Update,
            (
                sea_state_input_system,
                flotsam_spawner_system,
                flotsam_culling_system,
                graphics::camera_follow_system,
                graphics::surface_gizmo_system,
                graphics::body_gizmo_system,
            ),
        )
        .run();
}
