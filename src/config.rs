//! Runtime water configuration loaded from `assets/water.toml`.
//!
//! [`WaterConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_water_config`] reads
//! `assets/water.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the constants you care about.
//!
//! A file that parses but fails [`WaterConfig::validate`] is rejected as a
//! whole; the compiled defaults stay in place.

use crate::constants::*;
use crate::error::{validate_positive, validate_range, validate_spread_ratio, validate_window};
use crate::error::{SimError, SimResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the override file, relative to the working directory.
pub const WATER_CONFIG_PATH: &str = "assets/water.toml";

/// Runtime-tunable water, buoyancy and sea-state configuration.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    // ── Surface Window ────────────────────────────────────────────────────────
    pub nodes_per_unit: u32,
    pub longitude: f32,
    pub water_depth: f32,
    pub water_level: f32,
    pub despawn_distance: f32,
    pub view_half_width: f32,
    pub performance_factor: u32,

    // ── Spring Solver ─────────────────────────────────────────────────────────
    pub spring_constant: f32,
    pub damping: f32,
    pub spread_ratio: f32,
    pub spread_speed: u32,

    // ── Buoyancy ──────────────────────────────────────────────────────────────
    pub fluid_density: f32,
    pub gravity: f32,
    pub max_body_extent: f32,
    pub standard_drag: f32,
    pub air_drag_factor: f32,

    // ── Sea State ─────────────────────────────────────────────────────────────
    pub wave_intensity: f32,
    pub wave_period: f32,
    pub wave_noise_factor: f32,
    pub wind_speed: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            // Surface Window
            nodes_per_unit: NODES_PER_UNIT,
            longitude: LONGITUDE,
            water_depth: WATER_DEPTH,
            water_level: WATER_LEVEL,
            despawn_distance: DESPAWN_DISTANCE,
            view_half_width: VIEW_HALF_WIDTH,
            performance_factor: PERFORMANCE_FACTOR,
            // Spring Solver
            spring_constant: SPRING_CONSTANT,
            damping: DAMPING,
            spread_ratio: SPREAD_RATIO,
            spread_speed: SPREAD_SPEED,
            // Buoyancy
            fluid_density: FLUID_DENSITY,
            gravity: GRAVITY,
            max_body_extent: MAX_BODY_EXTENT,
            standard_drag: STANDARD_DRAG,
            air_drag_factor: AIR_DRAG_FACTOR,
            // Sea State
            wave_intensity: WAVE_INTENSITY,
            wave_period: WAVE_PERIOD,
            wave_noise_factor: WAVE_NOISE_FACTOR,
            wind_speed: WIND_SPEED,
        }
    }
}

impl WaterConfig {
    /// Parse a TOML document, falling back to defaults for missing keys.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Number of nodes the window holds (`longitude × nodes_per_unit`).
    pub fn node_count(&self) -> usize {
        (self.longitude * self.nodes_per_unit as f32) as usize
    }

    /// Check every value against its safe operating range.
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> SimResult<()> {
        if self.nodes_per_unit == 0 {
            return Err(SimError::UnsafeConstant {
                name: "NODES_PER_UNIT",
                value: 0.0,
                safe_range: "[1, ∞)",
            });
        }
        if self.performance_factor == 0 {
            return Err(SimError::UnsafeConstant {
                name: "PERFORMANCE_FACTOR",
                value: 0.0,
                safe_range: "[1, ∞)",
            });
        }
        validate_range(
            "SPREAD_SPEED",
            self.spread_speed as f32,
            1.0,
            10.0,
            "[1, 10]",
        )?;
        validate_spread_ratio(self.spread_ratio)?;
        validate_range(
            "SPRING_CONSTANT",
            self.spring_constant,
            0.0,
            0.1,
            "[0.0, 0.1]",
        )?;
        validate_range("DAMPING", self.damping, 0.0, 0.1, "[0.0, 0.1]")?;
        validate_positive("WATER_DEPTH", self.water_depth)?;
        validate_positive("FLUID_DENSITY", self.fluid_density)?;
        validate_positive("WAVE_PERIOD", self.wave_period)?;
        validate_positive("WAVE_NOISE_FACTOR", self.wave_noise_factor)?;
        validate_window(self.longitude, self.max_body_extent, MIN_WINDOW_BODY_RATIO)?;
        if self.node_count() < 2 {
            return Err(SimError::TooFewNodes {
                got: self.node_count(),
                required: 2,
            });
        }
        Ok(())
    }
}

/// Startup system: attempt to load `assets/water.toml` and overwrite the
/// `WaterConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are logged but do not abort the simulation.  A missing file is only noted.
pub fn load_water_config(mut config: ResMut<WaterConfig>) {
    let path = WATER_CONFIG_PATH;
    match std::fs::read_to_string(path) {
        Ok(contents) => match WaterConfig::from_toml_str(&contents) {
            Ok(loaded) => match loaded.validate() {
                Ok(()) => {
                    *config = loaded;
                    info!("Loaded water config from {path}");
                }
                Err(e) => warn!("Rejected {path}: {e}; using defaults"),
            },
            Err(e) => warn!("Failed to parse {path}: {e}; using defaults"),
        },
        Err(_) => info!("No {path} found; using compiled defaults"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(WaterConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = WaterConfig::from_toml_str("spread_ratio = 0.1\nlongitude = 40.0\n")
            .expect("partial toml should parse");
        assert_eq!(config.spread_ratio, 0.1);
        assert_eq!(config.longitude, 40.0);
        assert_eq!(config.nodes_per_unit, NODES_PER_UNIT);
        assert_eq!(config.damping, DAMPING);
    }

    #[test]
    fn shipped_asset_matches_defaults() {
        let config = WaterConfig::from_toml_str(include_str!("../assets/water.toml"))
            .expect("assets/water.toml should parse");
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config, WaterConfig::default());
    }

    #[test]
    fn unstable_spread_ratio_is_rejected() {
        let config = WaterConfig {
            spread_ratio: 0.75,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::UnsafeConstant {
                name: "SPREAD_RATIO",
                ..
            })
        ));
    }

    #[test]
    fn narrow_window_is_rejected() {
        let config = WaterConfig {
            longitude: 4.0,
            max_body_extent: 6.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::WindowTooNarrow { .. })
        ));
    }

    #[test]
    fn zero_noise_factor_is_rejected() {
        let config = WaterConfig {
            wave_noise_factor: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn node_count_matches_density() {
        let config = WaterConfig {
            longitude: 20.0,
            nodes_per_unit: 5,
            ..Default::default()
        };
        assert_eq!(config.node_count(), 100);
    }
}
