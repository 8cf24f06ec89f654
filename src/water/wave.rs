//! Analytic wave driver.
//!
//! The live right edge of the window and every node recycled onto an edge are
//! seeded from the same function of `(x, phase)`, so a scrolled-in node lines
//! up with the wave already travelling through its neighbours.

use std::f32::consts::TAU;

/// Sea-state parameters read each tick from the game state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    /// Amplitude multiplier.
    pub intensity: f32,
    /// Period divisor for both the spatial and temporal phase.
    pub period: f32,
    /// Skew between the plain sinusoid and the sharpened crest term.  Must be > 0.
    pub noise_factor: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            intensity: crate::constants::WAVE_INTENSITY,
            period: crate::constants::WAVE_PERIOD,
            noise_factor: crate::constants::WAVE_NOISE_FACTOR,
        }
    }
}

/// Skewed sinusoid:
/// `intensity · (sin t / (2·noise) + noise · cos³ t · sin t)`.
#[inline]
pub fn wave_function(t: f32, params: &WaveParams) -> f32 {
    let (sin_t, cos_t) = t.sin_cos();
    params.intensity
        * (sin_t / (2.0 * params.noise_factor) + params.noise_factor * cos_t.powi(3) * sin_t)
}

/// Accumulated temporal phase of the wave driver, wrapped to `[0, 2π)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WavePhase {
    time: f32,
}

impl WavePhase {
    pub fn new(time: f32) -> Self {
        Self {
            time: time.rem_euclid(TAU),
        }
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Phase at horizontal position `x`.
    ///
    /// `wave_dt` is the spread-speed-scaled step (`spread_speed · dt`); it sets
    /// how many radians one world unit represents.
    #[inline]
    pub fn phase_at(&self, x: f32, wave_dt: f32, period: f32) -> f32 {
        x * wave_dt / period + self.time
    }

    /// Driver value at `x` for the current phase.
    #[inline]
    pub fn sample(&self, x: f32, wave_dt: f32, params: &WaveParams) -> f32 {
        wave_function(self.phase_at(x, wave_dt, params.period), params)
    }

    /// Advance by one tick of `dt`.
    pub fn advance(&mut self, dt: f32, period: f32) {
        self.time = (self.time + dt / period).rem_euclid(TAU);
    }
}
