//! Simulation-specific error types.
//!
//! Construction and configuration paths propagate errors through these types
//! rather than panicking, so a bad `assets/water.toml` degrades to defaults
//! instead of a hard crash.
//!
//! Numerical degeneracies inside a step (zero submerged area, NaN centroid,
//! parallel lines) are *not* errors; they are absorbed where they occur.

use std::fmt;

/// Top-level error enum for the water simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Physics constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// The node window is too narrow to cover the largest expected body.
    WindowTooNarrow {
        /// Configured window extent.
        longitude: f32,
        /// Minimum extent required by the body size.
        required: f32,
    },

    /// The window would hold too few nodes to form a single surface segment.
    TooFewNodes {
        /// Node count the configuration produces.
        got: usize,
        /// Minimum required.
        required: usize,
    },

    /// A surface lookup fell outside the node window.
    ///
    /// The window must always cover every interacting body; hitting this means
    /// the window bounds and the reference point have drifted apart.
    OutsideWindow {
        /// Queried horizontal position.
        x: f32,
        /// Leftmost node x.
        left: f32,
        /// Rightmost node x.
        right: f32,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            SimError::WindowTooNarrow {
                longitude,
                required,
            } => write!(
                f,
                "water window of {} units is narrower than the required {} units",
                longitude, required
            ),
            SimError::TooFewNodes { got, required } => write!(
                f,
                "water window holds {} nodes, need at least {}",
                got, required
            ),
            SimError::OutsideWindow { x, left, right } => write!(
                f,
                "surface lookup at x = {} is outside the node window [{}, {}]",
                x, left, right
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `min <= value <= max`.
pub fn validate_range(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
    safe_range: &'static str,
) -> SimResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range,
        })
    }
}

/// Returns an error if `value` is not strictly positive (NaN included).
pub fn validate_positive(name: &'static str, value: f32) -> SimResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error if diffusion would be numerically unstable.
///
/// Above 0.5 the neighbour exchange overshoots and the surface diverges.
pub fn validate_spread_ratio(value: f32) -> SimResult<()> {
    validate_range("SPREAD_RATIO", value, 0.0, 0.5, "[0.0, 0.5]")
}

/// Returns an error if the window cannot cover a body of `max_body_extent`.
pub fn validate_window(longitude: f32, max_body_extent: f32, ratio: f32) -> SimResult<()> {
    let required = max_body_extent * ratio;
    if longitude >= required {
        Ok(())
    } else {
        Err(SimError::WindowTooNarrow {
            longitude,
            required,
        })
    }
}
