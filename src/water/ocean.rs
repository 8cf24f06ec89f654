//! The simulation object the engine layer drives.
//!
//! [`Ocean`] bundles the height-field, the wave driver phase and the buoyancy
//! constants, and exposes the two cadences explicitly:
//!
//! | Call | Cadence | Work |
//! |------|---------|------|
//! | [`Ocean::step_fixed`] | fixed timestep | edge forcing, springs, diffusion, phase |
//! | [`Ocean::step_frame`] | once per rendered frame | window recycling |
//!
//! Sea-state parameters are passed in on every call rather than read from
//! global state.  Both calls must run on the same thread, never interleaved.

use super::buoyancy::{dry_drag, resolve_buoyancy, wet_drag, Buoyancy, BuoyancyParams, FloatingBody};
use super::field::WaveField;
use super::wave::{WaveParams, WavePhase};
use super::window::{RecycleReport, WaveSeed, WindowBounds};
use crate::config::WaterConfig;
use crate::error::{validate_positive, SimResult};
use bevy::log::debug;
use bevy::math::{Rect, Vec2};
use bevy::prelude::Resource;

/// Per-frame input for window tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// x of the camera or tracked entity the window follows.
    pub reference_x: f32,
    pub view_half_width: f32,
}

/// A scrolling body of water.
#[derive(Resource, Debug, Clone)]
pub struct Ocean {
    field: WaveField,
    phase: WavePhase,
    fixed_dt: f32,
    despawn_distance: f32,
    performance_factor: u32,
    buoyancy: BuoyancyParams,
    standard_drag: f32,
    air_drag_factor: f32,
}

impl Ocean {
    /// A calm ocean centred on `center_x`.
    ///
    /// `fixed_dt` is the step the fixed schedule will use; recycling needs it
    /// between fixed steps to seed new nodes consistently with the driver.
    pub fn initialize(center_x: f32, config: &WaterConfig, fixed_dt: f32) -> SimResult<Self> {
        config.validate()?;
        validate_positive("FIXED_DT", fixed_dt)?;
        Ok(Self {
            field: WaveField::new(center_x, config)?,
            phase: WavePhase::default(),
            fixed_dt,
            despawn_distance: config.despawn_distance,
            performance_factor: config.performance_factor,
            buoyancy: BuoyancyParams {
                fluid_density: config.fluid_density,
                gravity: Vec2::new(0.0, -config.gravity),
            },
            standard_drag: config.standard_drag,
            air_drag_factor: config.air_drag_factor,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn field(&self) -> &WaveField {
        &self.field
    }

    #[inline]
    pub fn field_mut(&mut self) -> &mut WaveField {
        &mut self.field
    }

    #[inline]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    #[inline]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    #[inline]
    pub fn buoyancy_params(&self) -> &BuoyancyParams {
        &self.buoyancy
    }

    /// Spread-speed-scaled step used by the wave driver.
    #[inline]
    pub fn wave_dt(&self) -> f32 {
        self.field.solver.spread_speed as f32 * self.fixed_dt
    }

    // ── Cadences ──────────────────────────────────────────────────────────────

    /// One fixed step: drive the right edge from the wave function, run the
    /// springs and the diffusion passes, then advance the phase.
    pub fn step_fixed(&mut self, dt: f32, wave: &WaveParams) {
        self.fixed_dt = dt;
        let wave_dt = self.wave_dt();

        let edge_x = self.field.right_x();
        let offset = self.phase.sample(edge_x, wave_dt, wave);
        self.field.disturb_right_edge(offset);

        self.field.apply_spring_forces(dt);
        self.field.propagate_waves(dt);

        self.phase.advance(dt, wave.period);
    }

    /// Keep the window around `frame.reference_x`.  Does not advance the phase.
    pub fn step_frame(&mut self, frame: &FrameContext, wave: &WaveParams) -> RecycleReport {
        let seed = WaveSeed {
            phase: &self.phase,
            params: wave,
            wave_dt: self.field.solver.spread_speed as f32 * self.fixed_dt,
        };
        let bounds = WindowBounds {
            reference_x: frame.reference_x,
            view_half_width: frame.view_half_width,
            despawn_distance: self.despawn_distance,
        };
        let report = self.field.track(&bounds, &seed);
        if !report.is_empty() {
            debug!(
                "Recycled water window around x = {:.1}: {:?} (now [{:.1}, {:.1}])",
                frame.reference_x,
                report,
                self.field.left_x(),
                self.field.right_x()
            );
        }
        report
    }

    // ── Bodies ────────────────────────────────────────────────────────────────

    /// Buoyant force on `body` against the current surface.
    pub fn resolve(&self, body: &FloatingBody) -> SimResult<Option<Buoyancy>> {
        resolve_buoyancy(body, self.field.nodes(), &self.buoyancy)
    }

    /// Splash the nodes under `body`; returns the body's new velocity.
    pub fn splash(&mut self, body: &FloatingBody) -> Vec2 {
        self.field.splash(body.aabb(), body.mass, body.velocity)
    }

    /// Whether `bounds` lies horizontally inside the window.
    pub fn covers(&self, bounds: Rect) -> bool {
        self.field.covers(bounds.min.x, bounds.max.x)
    }

    /// Whether `bounds` touches the water body (between the bottom and the
    /// highest node under it).
    pub fn overlaps(&self, bounds: Rect) -> bool {
        let nodes = self.field.nodes();
        if nodes.is_empty()
            || bounds.max.y < self.field.bottom()
            || bounds.max.x < self.field.left_x()
            || bounds.min.x > self.field.right_x()
        {
            return false;
        }
        let start = nodes
            .partition_point(|n| n.position.x < bounds.min.x)
            .saturating_sub(1);
        let end = nodes
            .partition_point(|n| n.position.x <= bounds.max.x)
            .min(nodes.len() - 1);
        nodes
            .range(start..=end)
            .any(|n| n.position.y >= bounds.min.y)
    }

    pub fn wet_drag(&self, body: &FloatingBody) -> f32 {
        wet_drag(body.velocity, body.aabb().size(), self.standard_drag)
    }

    pub fn dry_drag(&self, body: &FloatingBody) -> f32 {
        dry_drag(
            body.velocity,
            body.aabb().size(),
            self.standard_drag,
            self.air_drag_factor,
        )
    }

    // ── Export ────────────────────────────────────────────────────────────────

    pub fn surface_points(&self) -> Vec<Vec2> {
        self.field.surface_points()
    }

    /// Decimated outline for a physics collider, every
    /// `performance_factor`-th node.
    pub fn collider_outline(&self) -> Vec<Vec2> {
        self.field.collider_outline(self.performance_factor)
    }
}
