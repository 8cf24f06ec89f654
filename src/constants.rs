//! Centralised water simulation constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Tuning guidance
//!
//! Each constant includes the tested range and the observable consequence of
//! changing it.  [`crate::config::WaterConfig`] mirrors every value and can
//! override any subset from `assets/water.toml`.

// ── Surface Window ────────────────────────────────────────────────────────────

/// Height-field samples per world unit.
///
/// Higher values give a smoother surface and finer splashes at a linear cost
/// in the spring solve and the diffusion passes.  Tested range: 2–10.
pub const NODES_PER_UNIT: u32 = 5;

/// Horizontal extent of the node window (world units).
///
/// Must comfortably exceed the visible width plus twice `DESPAWN_DISTANCE`,
/// otherwise the window edge becomes visible while recycling.
pub const LONGITUDE: f32 = 60.0;

/// Depth of the water body below the rest level (world units).
///
/// Also scales the per-node mass (`depth / nodes_per_unit`), so deeper water
/// reacts more sluggishly to splashes.
pub const WATER_DEPTH: f32 = 10.0;

/// Rest height of the undisturbed surface.
pub const WATER_LEVEL: f32 = 0.0;

/// Slack (world units) kept beyond each side of the view before nodes are
/// recycled to the opposite edge.
pub const DESPAWN_DISTANCE: f32 = 5.0;

/// Half the visible width around the reference point used for window bounds.
pub const VIEW_HALF_WIDTH: f32 = 20.0;

/// Keep every Nth surface node in the decimated collider outline.
pub const PERFORMANCE_FACTOR: u32 = 2;

// ── Spring Solver ─────────────────────────────────────────────────────────────

/// Spring stiffness pulling each node back to its rest height.
///
/// Tested range: 0.0–0.1.  Higher values shorten wave period.
pub const SPRING_CONSTANT: f32 = 0.02;

/// Velocity damping and disturbance decay factor per step.
///
/// Tested range: 0.0–0.1.  At 0.0 waves ring forever.
pub const DAMPING: f32 = 0.04;

/// Fraction of the height difference passed to each neighbour per diffusion pass.
///
/// Stable in [0.0, 0.5].  At 0.5 with many passes the scheme approaches a
/// discrete wave equation; above it the diffusion diverges.
pub const SPREAD_RATIO: f32 = 0.25;

/// Diffusion passes per fixed step.  Also scales the wave phase speed.
pub const SPREAD_SPEED: u32 = 6;

// ── Buoyancy ──────────────────────────────────────────────────────────────────

/// Fluid density used in `F = -ρ · g · A`.
pub const FLUID_DENSITY: f32 = 1.0;

/// Magnitude of gravity (world units / s²), applied along −Y.
pub const GRAVITY: f32 = 9.81;

/// Largest footprint dimension expected for a floating body.
///
/// Used only by configuration validation to reject windows too narrow to
/// cover a body.
pub const MAX_BODY_EXTENT: f32 = 6.0;

/// The window must span at least this many maximal body footprints.
pub const MIN_WINDOW_BODY_RATIO: f32 = 2.0;

/// Base linear drag coefficient for a body moving through water.
pub const STANDARD_DRAG: f32 = 1.05;

/// Fraction of `STANDARD_DRAG` applied once a body leaves the water.
pub const AIR_DRAG_FACTOR: f32 = 0.001;

// ── Sea State ─────────────────────────────────────────────────────────────────

/// Amplitude multiplier of the boundary wave.  Tested range: 0.1–10.0.
pub const WAVE_INTENSITY: f32 = 1.0;

/// Period divisor of the boundary wave.  Tested range: 0.95–1.1.
pub const WAVE_PERIOD: f32 = 1.0;

/// Skew of the boundary wave.  Tested range: 0.5–2.0.
///
/// Low values give a clean sinusoid, high values a sharp, asymmetric crest.
/// Must be strictly positive (the base term divides by it).
pub const WAVE_NOISE_FACTOR: f32 = 0.5;

/// Wind speed pushing the demo ship (force units).  Tested range: 0–60.
pub const WIND_SPEED: f32 = 12.0;

/// Allowed range for live `SeaState::wave_intensity` changes.
pub const WAVE_INTENSITY_RANGE: (f32, f32) = (0.1, 10.0);

/// Allowed range for live `SeaState::wave_period` changes.
pub const WAVE_PERIOD_RANGE: (f32, f32) = (0.95, 1.1);

/// Allowed range for live `SeaState::wave_noise_factor` changes.
pub const WAVE_NOISE_FACTOR_RANGE: (f32, f32) = (0.5, 2.0);

/// Allowed range for live `SeaState::wind_speed` changes.
pub const WIND_SPEED_RANGE: (f32, f32) = (0.0, 60.0);
