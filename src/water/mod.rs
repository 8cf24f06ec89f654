//! Water module: scrolling height-field ocean and rigid-body buoyancy.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`node`] | `WaterNode`: one spring-mass surface sample (update, splash, disturb, reset) |
//! | [`wave`] | Analytic boundary wave (`wave_function`) and its accumulated phase |
//! | [`field`] | `WaveField`: spring solve, neighbour diffusion, splash reaction, mesh/collider export |
//! | [`window`] | Recycling whole units of nodes between the window edges as the reference moves |
//! | [`geometry`] | Closest-segment lookup, local surface line, rectangle clipping, triangulation, centroids |
//! | [`buoyancy`] | `ShapeKind`, `FloatingBody`, `resolve_buoyancy`, wet/dry drag |
//! | [`ocean`] | `Ocean`: the simulation object with explicit fixed-step and per-frame entry points |
//! | [`plugin`] | `WaterPlugin`: Bevy/Rapier systems driving the ocean and floating bodies |
//!
//! All public items are re-exported at this level so callers can use flat
//! `crate::water::*` imports.

pub mod buoyancy;
pub mod field;
pub mod geometry;
pub mod node;
pub mod ocean;
pub mod plugin;
pub mod wave;
pub mod window;

// ── Flat re-exports ───────────────────────────────────────────────────────────

pub use buoyancy::{
    dry_drag, local_surface, resolve_buoyancy, wet_drag, Buoyancy, BuoyancyParams, FloatingBody,
    ShapeKind, Submersion,
};
pub use field::{SolverParams, WaveField};
pub use geometry::{find_closest_segment, SurfaceLine, SurfacePoint};
pub use node::WaterNode;
pub use ocean::{FrameContext, Ocean};
pub use plugin::{
    buoyancy_system, ocean_fixed_step_system, register_floating_bodies_system, setup_ocean,
    water_contact_system, window_tracking_system, Buoyant, FloatingShape, IgnoreWater, KeepDrag,
    SeaState, WaterContact, WaterPlugin, WaterReference,
};
pub use wave::{wave_function, WaveParams, WavePhase};
pub use window::{RecycleReport, WaveSeed, WindowBounds};
