//! Bevy + Rapier integration for the ocean.
//!
//! [`WaterPlugin`] owns the driver loop: it loads [`WaterConfig`], builds the
//! [`Ocean`] resource around the [`WaterReference`] entity, steps it in
//! `FixedUpdate` and tracks the window in `Update`.  Rigid bodies opt in with
//! the [`Buoyant`] marker; their collider shape is resolved once into a
//! [`FloatingShape`].
//!
//! ## Fixed-step order
//!
//! 1. `register_floating_bodies_system`: new `Buoyant` bodies get a shape.
//! 2. `ocean_fixed_step_system`: edge forcing, springs, diffusion.
//! 3. `water_contact_system`: splashes and wet/dry drag.
//! 4. `buoyancy_system`: overwrites each body's `ExternalForce`.
//!
//! Systems that add their own forces to floating bodies must run after
//! `buoyancy_system` and add to `ExternalForce` rather than replace it.

use super::buoyancy::{FloatingBody, ShapeKind};
use super::ocean::{FrameContext, Ocean};
use super::wave::WaveParams;
use crate::config::{load_water_config, WaterConfig};
use crate::constants::{
    WAVE_INTENSITY_RANGE, WAVE_NOISE_FACTOR_RANGE, WAVE_PERIOD_RANGE, WIND_SPEED_RANGE,
};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Components ────────────────────────────────────────────────────────────────

/// Opt-in marker: this rigid body floats.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Buoyant;

/// Collider shape resolved at registration.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct FloatingShape(pub ShapeKind);

/// The water leaves this body alone: no buoyancy, no splash, no drag.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct IgnoreWater;

/// Keep the in-water drag after leaving the water (the player's ship).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct KeepDrag;

/// Whether the body overlapped the water on the previous fixed step.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaterContact {
    pub wet: bool,
}

/// The entity the scrolling window follows (usually the camera).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct WaterReference;

// ── Resources ─────────────────────────────────────────────────────────────────

/// Live sea-state parameters, seeded from [`WaterConfig`] and changed at
/// runtime by gameplay.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SeaState {
    pub wind_speed: f32,
    pub wave_intensity: f32,
    pub wave_period: f32,
    pub wave_noise_factor: f32,
}

impl Default for SeaState {
    fn default() -> Self {
        Self::from_config(&WaterConfig::default())
    }
}

impl SeaState {
    pub fn from_config(config: &WaterConfig) -> Self {
        Self {
            wind_speed: config.wind_speed,
            wave_intensity: config.wave_intensity,
            wave_period: config.wave_period,
            wave_noise_factor: config.wave_noise_factor,
        }
    }

    /// Driver parameters for this tick.
    pub fn wave_params(&self) -> WaveParams {
        WaveParams {
            intensity: self.wave_intensity,
            period: self.wave_period,
            noise_factor: self.wave_noise_factor,
        }
    }

    /// Pull every value back into its tested range.
    pub fn clamp_to_ranges(&mut self) {
        self.wind_speed = self.wind_speed.clamp(WIND_SPEED_RANGE.0, WIND_SPEED_RANGE.1);
        self.wave_intensity = self
            .wave_intensity
            .clamp(WAVE_INTENSITY_RANGE.0, WAVE_INTENSITY_RANGE.1);
        self.wave_period = self
            .wave_period
            .clamp(WAVE_PERIOD_RANGE.0, WAVE_PERIOD_RANGE.1);
        self.wave_noise_factor = self
            .wave_noise_factor
            .clamp(WAVE_NOISE_FACTOR_RANGE.0, WAVE_NOISE_FACTOR_RANGE.1);
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct WaterPlugin;

impl Plugin for WaterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WaterConfig>()
            .init_resource::<SeaState>()
            .add_systems(Startup, (load_water_config, setup_ocean).chain())
            .add_systems(
                FixedUpdate,
                (
                    register_floating_bodies_system,
                    ocean_fixed_step_system,
                    water_contact_system,
                    buoyancy_system,
                )
                    .chain(),
            )
            .add_systems(Update, window_tracking_system);
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Build the ocean around the reference entity (or the origin) and seed the
/// sea state from the loaded configuration.
pub fn setup_ocean(
    mut commands: Commands,
    config: Res<WaterConfig>,
    mut sea: ResMut<SeaState>,
    time: Res<Time<Fixed>>,
    reference: Query<&Transform, With<WaterReference>>,
) {
    let center_x = reference
        .iter()
        .next()
        .map_or(0.0, |t| t.translation.x);
    let fixed_dt = time.timestep().as_secs_f32();

    match Ocean::initialize(center_x, &config, fixed_dt) {
        Ok(ocean) => {
            info!(
                "Ocean spawned: {} nodes over [{:.1}, {:.1}]",
                ocean.field().len(),
                ocean.field().left_x(),
                ocean.field().right_x()
            );
            commands.insert_resource(ocean);
            *sea = SeaState::from_config(&config);
        }
        Err(e) => error!("Failed to build ocean: {e}"),
    }
}

/// Resolve the collider of each new `Buoyant` body into a [`FloatingShape`].
///
/// Bodies whose collider is not a cuboid, capsule or ball are tagged
/// [`IgnoreWater`] with a warning.
pub fn register_floating_bodies_system(
    mut commands: Commands,
    query: Query<
        (Entity, &Collider),
        (With<Buoyant>, Without<FloatingShape>, Without<IgnoreWater>),
    >,
) {
    for (entity, collider) in query.iter() {
        let Some(kind) = shape_kind(collider) else {
            warn!("Buoyant entity {entity:?} has an unsupported collider shape; ignoring water");
            commands.entity(entity).insert(IgnoreWater);
            continue;
        };
        commands.entity(entity).insert((
            FloatingShape(kind),
            WaterContact::default(),
        ));
        commands.entity(entity).insert_if_new((
            ExternalForce::default(),
            ReadMassProperties::default(),
            Damping::default(),
        ));
    }
}

/// Shape-specific footprint source for a Rapier collider.
pub fn shape_kind(collider: &Collider) -> Option<ShapeKind> {
    if let Some(cuboid) = collider.as_cuboid() {
        return Some(ShapeKind::Box {
            half_extents: cuboid.half_extents(),
        });
    }
    if let Some(capsule) = collider.as_capsule() {
        let segment = capsule.segment();
        let axis = segment.b() - segment.a();
        return Some(ShapeKind::Capsule {
            radius: capsule.radius(),
            half_height: capsule.half_height(),
            horizontal: axis.x.abs() > axis.y.abs(),
        });
    }
    collider.as_ball().map(|ball| ShapeKind::Circle {
        radius: ball.radius(),
    })
}

/// Snapshot of a Rapier body in the form the resolver reads.
pub fn floating_body(
    transform: &Transform,
    shape: &FloatingShape,
    mass: &ReadMassProperties,
    velocity: Vec2,
) -> FloatingBody {
    let props = mass.get();
    let center_of_mass = transform
        .transform_point(props.local_center_of_mass.extend(0.0))
        .truncate();
    FloatingBody {
        center_of_mass,
        rotation: transform.rotation.to_euler(EulerRot::XYZ).2,
        velocity,
        mass: props.mass,
        size: shape.0.footprint(),
    }
}

pub fn ocean_fixed_step_system(
    time: Res<Time>,
    sea: Res<SeaState>,
    ocean: Option<ResMut<Ocean>>,
) {
    let Some(mut ocean) = ocean else {
        return;
    };
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    ocean.step_fixed(dt, &sea.wave_params());
}

/// Splash the surface under every overlapping body and set its linear drag.
///
/// Runs on entry and on every step while overlapping.  On exit the drag
/// drops to the air value unless the body has [`KeepDrag`].
#[allow(clippy::type_complexity)]
pub fn water_contact_system(
    ocean: Option<ResMut<Ocean>>,
    mut query: Query<
        (
            &Transform,
            &FloatingShape,
            &ReadMassProperties,
            &mut Velocity,
            &mut Damping,
            &mut WaterContact,
            Has<KeepDrag>,
        ),
        Without<IgnoreWater>,
    >,
) {
    let Some(mut ocean) = ocean else {
        return;
    };

    for (transform, shape, mass, mut velocity, mut damping, mut contact, keep_drag) in
        query.iter_mut()
    {
        let body = floating_body(transform, shape, mass, velocity.linvel);
        let bounds = body.aabb();

        if ocean.covers(bounds) && ocean.overlaps(bounds) {
            velocity.linvel = ocean.splash(&body);
            damping.linear_damping = ocean.wet_drag(&body);
            contact.wet = true;
        } else if contact.wet {
            contact.wet = false;
            if !keep_drag {
                damping.linear_damping = ocean.dry_drag(&body);
            }
        }
    }
}

/// Replace each floating body's external force with this step's buoyancy.
///
/// Bodies outside the window get no force; a lookup failure inside the
/// window is logged and the body skipped.
pub fn buoyancy_system(
    ocean: Option<Res<Ocean>>,
    mut query: Query<
        (
            Entity,
            &Transform,
            &FloatingShape,
            &ReadMassProperties,
            &Velocity,
            &mut ExternalForce,
        ),
        Without<IgnoreWater>,
    >,
) {
    let Some(ocean) = ocean else {
        return;
    };

    for (entity, transform, shape, mass, velocity, mut external) in query.iter_mut() {
        *external = ExternalForce::default();

        let body = floating_body(transform, shape, mass, velocity.linvel);
        if !ocean.covers(body.aabb()) {
            continue;
        }

        match ocean.resolve(&body) {
            Ok(Some(buoyancy)) => {
                external.force = buoyancy.force;
                external.torque = (buoyancy.point - body.center_of_mass).perp_dot(buoyancy.force);
            }
            Ok(None) => {}
            Err(e) => error!("Buoyancy skipped for {entity:?}: {e}"),
        }
    }
}

/// Keep the node window around the [`WaterReference`] entity.
pub fn window_tracking_system(
    ocean: Option<ResMut<Ocean>>,
    sea: Res<SeaState>,
    config: Res<WaterConfig>,
    reference: Query<&Transform, With<WaterReference>>,
) {
    let (Some(mut ocean), Some(transform)) = (ocean, reference.iter().next()) else {
        return;
    };
    let frame = FrameContext {
        reference_x: transform.translation.x,
        view_half_width: config.view_half_width,
    };
    ocean.step_frame(&frame, &sea.wave_params());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_state_seeds_from_config() {
        let config = WaterConfig {
            wave_intensity: 3.0,
            wind_speed: 20.0,
            ..Default::default()
        };
        let sea = SeaState::from_config(&config);
        assert_eq!(sea.wave_params().intensity, 3.0);
        assert_eq!(sea.wind_speed, 20.0);
    }

    #[test]
    fn sea_state_clamps_to_tested_ranges() {
        let mut sea = SeaState {
            wind_speed: 100.0,
            wave_intensity: 0.0,
            wave_period: 2.0,
            wave_noise_factor: 0.1,
        };
        sea.clamp_to_ranges();
        assert_eq!(sea.wind_speed, 60.0);
        assert_eq!(sea.wave_intensity, 0.1);
        assert_eq!(sea.wave_period, 1.1);
        assert_eq!(sea.wave_noise_factor, 0.5);
    }

    #[test]
    fn collider_shapes_map_to_footprints() {
        let cuboid = shape_kind(&Collider::cuboid(1.0, 0.5)).unwrap();
        assert_eq!(cuboid.footprint(), Vec2::new(2.0, 1.0));

        let ball = shape_kind(&Collider::ball(0.5)).unwrap();
        assert_eq!(ball, ShapeKind::Circle { radius: 0.5 });

        let capsule = shape_kind(&Collider::capsule_y(1.0, 0.5)).unwrap();
        assert_eq!(capsule.footprint(), Vec2::new(1.0, 3.0));

        let lying = shape_kind(&Collider::capsule_x(1.0, 0.5)).unwrap();
        assert_eq!(lying.footprint(), Vec2::new(3.0, 1.0));

        let triangle = Collider::triangle(Vec2::ZERO, Vec2::X, Vec2::Y);
        assert!(shape_kind(&triangle).is_none());
    }
}
