//! Damped spring-mass height-field.
//!
//! [`WaveField`] owns the x-sorted node sequence and the solver coefficients.
//! Each fixed step every node runs its own spring ([`WaveField::apply_spring_forces`])
//! and then neighbouring nodes exchange height over `spread_speed` diffusion
//! passes ([`WaveField::propagate_waves`]).
//!
//! The sequence is a `VecDeque` so that window recycling (see
//! [`super::window`]) can move nodes between the two ends in O(1) each.

use super::geometry::{find_closest_segment, SurfaceLine, SurfacePoint};
use super::node::WaterNode;
use crate::config::WaterConfig;
use crate::error::{validate_positive, validate_range, validate_spread_ratio, SimError, SimResult};
use bevy::math::{Rect, Vec2};
use std::collections::VecDeque;

/// Spring and diffusion coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    pub spring_constant: f32,
    pub damping: f32,
    /// Stable in [0, 0.5].
    pub spread_ratio: f32,
    /// Diffusion passes per fixed step.
    pub spread_speed: u32,
}

impl SolverParams {
    pub fn from_config(config: &WaterConfig) -> Self {
        Self {
            spring_constant: config.spring_constant,
            damping: config.damping,
            spread_ratio: config.spread_ratio,
            spread_speed: config.spread_speed,
        }
    }
}

/// The water height-field: nodes spaced `1 / nodes_per_unit` apart.
#[derive(Debug, Clone)]
pub struct WaveField {
    pub(super) nodes: VecDeque<WaterNode>,
    left_deltas: Vec<f32>,
    right_deltas: Vec<f32>,
    pub solver: SolverParams,
    pub(super) nodes_per_unit: u32,
    pub(super) position_delta: f32,
    mass_per_node: f32,
    pub(super) water_level: f32,
    water_depth: f32,
}

impl WaveField {
    /// Build a field at rest spanning `[center_x - longitude/2, center_x + longitude/2)`.
    pub fn new(center_x: f32, config: &WaterConfig) -> SimResult<Self> {
        if config.nodes_per_unit == 0 {
            return Err(SimError::UnsafeConstant {
                name: "NODES_PER_UNIT",
                value: 0.0,
                safe_range: "[1, ∞)",
            });
        }
        validate_spread_ratio(config.spread_ratio)?;
        validate_range(
            "SPREAD_SPEED",
            config.spread_speed as f32,
            1.0,
            10.0,
            "[1, 10]",
        )?;
        validate_positive("WATER_DEPTH", config.water_depth)?;

        let count = config.node_count();
        if count < 2 {
            return Err(SimError::TooFewNodes {
                got: count,
                required: 2,
            });
        }

        let position_delta = 1.0 / config.nodes_per_unit as f32;
        let left = center_x - config.longitude / 2.0;
        let nodes = (0..count)
            .map(|i| {
                WaterNode::new(Vec2::new(
                    left + i as f32 * position_delta,
                    config.water_level,
                ))
            })
            .collect();

        Ok(Self {
            nodes,
            left_deltas: vec![0.0; count],
            right_deltas: vec![0.0; count],
            solver: SolverParams::from_config(config),
            nodes_per_unit: config.nodes_per_unit,
            position_delta,
            mass_per_node: position_delta * config.water_depth,
            water_level: config.water_level,
            water_depth: config.water_depth,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn nodes(&self) -> &VecDeque<WaterNode> {
        &self.nodes
    }

    #[inline]
    pub fn node_mut(&mut self, index: usize) -> Option<&mut WaterNode> {
        self.nodes.get_mut(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn position_delta(&self) -> f32 {
        self.position_delta
    }

    #[inline]
    pub fn mass_per_node(&self) -> f32 {
        self.mass_per_node
    }

    #[inline]
    pub fn water_level(&self) -> f32 {
        self.water_level
    }

    #[inline]
    pub fn nodes_per_unit(&self) -> u32 {
        self.nodes_per_unit
    }

    /// x of the leftmost node.
    pub fn left_x(&self) -> f32 {
        self.nodes.front().map_or(f32::NAN, |n| n.position.x)
    }

    /// x of the rightmost node.
    pub fn right_x(&self) -> f32 {
        self.nodes.back().map_or(f32::NAN, |n| n.position.x)
    }

    /// Whether `[min_x, max_x]` lies inside the window.
    pub fn covers(&self, min_x: f32, max_x: f32) -> bool {
        self.left_x() <= min_x && max_x <= self.right_x()
    }

    /// Surface height at `x`, linearly interpolated between the bracketing nodes.
    pub fn surface_height_at(&self, x: f32) -> SimResult<f32> {
        let (l, r) = find_closest_segment(x, &self.nodes)?;
        let (a, b) = (self.nodes[l].position(), self.nodes[r].position());
        Ok(SurfaceLine::through(a, b).map_or(a.y.max(b.y), |line| line.height_at(x)))
    }

    // ── Solver ────────────────────────────────────────────────────────────────

    /// Advance every node's spring by `dt`.
    pub fn apply_spring_forces(&mut self, dt: f32) {
        let SolverParams {
            spring_constant,
            damping,
            ..
        } = self.solver;
        let mass = self.mass_per_node;
        for node in self.nodes.iter_mut() {
            node.update(spring_constant, damping, mass, dt);
        }
    }

    /// Spread height differences to neighbours over `spread_speed` passes.
    ///
    /// Each pass first computes all deltas from the heights at the start of the
    /// pass (feeding them into neighbour velocities), then applies them to
    /// neighbour heights, so the result does not depend on iteration order.
    pub fn propagate_waves(&mut self, dt: f32) {
        let n = self.nodes.len();
        let ratio = self.solver.spread_ratio;

        for _ in 0..self.solver.spread_speed {
            for i in (0..n).rev() {
                if i > 0 {
                    let delta = ratio * (self.nodes[i].position.y - self.nodes[i - 1].position.y);
                    self.left_deltas[i] = delta;
                    self.nodes[i - 1].velocity += delta;
                }
                if i + 1 < n {
                    let delta = ratio * (self.nodes[i].position.y - self.nodes[i + 1].position.y);
                    self.right_deltas[i] = delta;
                    self.nodes[i + 1].velocity += delta;
                }
            }

            for i in 0..n {
                if i > 0 {
                    self.nodes[i - 1].position.y += self.left_deltas[i] * dt;
                }
                if i + 1 < n {
                    self.nodes[i + 1].position.y += self.right_deltas[i] * dt;
                }
            }
        }
    }

    /// Force the rightmost node to `water_level + offset`.
    pub fn disturb_right_edge(&mut self, offset: f32) {
        if let Some(node) = self.nodes.back_mut() {
            node.disturb(offset);
        }
    }

    // ── Splash ────────────────────────────────────────────────────────────────

    /// Let a body with world-space `bounds` hit the nodes beneath it.
    ///
    /// The body's mass is shared evenly across the candidate nodes under its
    /// horizontal extent; a node participates when a contact circle one node
    /// spacing below it touches the body.  Returns the body's velocity after
    /// the rebounds; a degenerate result leaves `velocity` untouched.
    pub fn splash(&mut self, bounds: Rect, mass: f32, velocity: Vec2) -> Vec2 {
        let n = self.nodes.len();
        if n == 0 || mass <= 0.0 {
            return velocity;
        }

        let first_x = self.left_x();
        let npu = self.nodes_per_unit as f32;
        let start = (((bounds.min.x - first_x).floor() * npu).max(0.0) as usize).min(n - 1);
        let end = (((bounds.max.x - first_x).ceil() * npu).max(0.0) as usize).min(n - 1);
        if end < start {
            return velocity;
        }

        let mass_per_splash = mass / (end - start).max(1) as f32;
        let probe_radius = self.position_delta;
        let node_mass = self.mass_per_node;
        let mut result = velocity;

        for node in self.nodes.range_mut(start..=end) {
            let probe = node.position - Vec2::new(0.0, probe_radius);
            let nearest = probe.clamp(bounds.min, bounds.max);
            if nearest.distance(probe) > probe_radius {
                continue;
            }
            let rebound = node.splash(mass_per_splash, result.y, node_mass);
            result.y += rebound * mass_per_splash / mass;
        }

        if result.is_finite() {
            result
        } else {
            velocity
        }
    }

    // ── Export ────────────────────────────────────────────────────────────────

    /// Current surface polyline, left to right.
    pub fn surface_points(&self) -> Vec<Vec2> {
        self.nodes.iter().map(|n| n.position).collect()
    }

    /// Height of the flat bottom of the water body.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.water_level - self.water_depth
    }

    /// Triangle-strip vertices: for each node its surface point followed by
    /// the point straight below it on the bottom.
    pub fn strip_vertices(&self) -> Vec<Vec2> {
        let bottom = self.bottom();
        self.nodes
            .iter()
            .flat_map(|n| [n.position, Vec2::new(n.position.x, bottom)])
            .collect()
    }

    /// Two triangles per quad between consecutive vertex pairs of
    /// [`Self::strip_vertices`].
    pub fn strip_indices(&self) -> Vec<u32> {
        (1..self.nodes.len() as u32)
            .flat_map(|i| {
                let base = (i - 1) * 2;
                [base, base + 2, base + 1, base + 2, base + 3, base + 1]
            })
            .collect()
    }

    /// Decimated closed outline for a physics collider.
    ///
    /// Every `performance_factor`-th surface point, then the last surface
    /// point, the bottom below it and the bottom below the first node.
    pub fn collider_outline(&self, performance_factor: u32) -> Vec<Vec2> {
        let step = performance_factor.max(1) as usize;
        let (Some(first), Some(last)) = (self.nodes.front(), self.nodes.back()) else {
            return Vec::new();
        };
        let bottom = self.bottom();

        let mut outline: Vec<Vec2> = self.nodes.iter().step_by(step).map(|n| n.position).collect();
        outline.push(last.position);
        outline.push(Vec2::new(last.position.x, bottom));
        outline.push(Vec2::new(first.position.x, bottom));
        outline
    }

    /// Whether `nodes[i].x < nodes[i + 1].x` holds everywhere.
    pub fn is_sorted(&self) -> bool {
        self.nodes
            .iter()
            .zip(self.nodes.iter().skip(1))
            .all(|(a, b)| a.position.x < b.position.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn config(longitude: f32, nodes_per_unit: u32) -> WaterConfig {
        WaterConfig {
            longitude,
            nodes_per_unit,
            water_depth: 1.0,
            water_level: 0.0,
            spring_constant: 0.02,
            damping: 0.05,
            spread_ratio: 0.0,
            spread_speed: 1,
            max_body_extent: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn field_spans_the_window_sorted() {
        let field = WaveField::new(0.0, &config(20.0, 5)).unwrap();
        assert_eq!(field.len(), 100);
        assert!((field.left_x() + 10.0).abs() < 1e-5);
        assert!((field.right_x() - 9.8).abs() < 1e-4);
        assert!(field.is_sorted());
        assert!((field.position_delta() - 0.2).abs() < 1e-6);
        assert!((field.mass_per_node() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let mut bad = config(20.0, 5);
        bad.spread_ratio = 0.9;
        assert!(WaveField::new(0.0, &bad).is_err());

        let tiny = config(0.1, 5);
        assert!(matches!(
            WaveField::new(0.0, &tiny),
            Err(SimError::TooFewNodes { .. })
        ));
    }

    #[test]
    fn displaced_node_decays_without_overshoot() {
        let mut field = WaveField::new(0.0, &config(10.0, 1)).unwrap();
        field.node_mut(5).unwrap().position.y = 2.0;

        let mut previous = 2.0_f32;
        for _ in 0..200 {
            field.apply_spring_forces(DT);
            let h = field.nodes()[5].position.y;
            assert!(h.abs() <= 2.0, "height {h} exceeded the initial displacement");
            assert!(h <= previous + 1e-6, "height rose from {previous} to {h}");
            previous = h;
        }
        assert!(previous < 0.6, "expected decay toward rest, got {previous}");
        assert!(previous > 0.0);
    }

    #[test]
    fn diffusion_spreads_symmetrically() {
        let mut cfg = config(10.0, 1);
        cfg.spread_ratio = 0.1;
        cfg.spread_speed = 5;
        let mut field = WaveField::new(0.0, &cfg).unwrap();
        field.node_mut(5).unwrap().position.y = 2.0;

        field.propagate_waves(DT);

        let h: Vec<f32> = field.nodes().iter().map(|n| n.position.y).collect();
        for d in 1..=4 {
            assert!(
                (h[5 - d] - h[5 + d]).abs() < 1e-6,
                "asymmetry at distance {d}: {} vs {}",
                h[5 - d],
                h[5 + d]
            );
        }
        for d in 0..4 {
            assert!(h[5 - d] > h[5 - d - 1], "not decreasing leftward at {d}");
        }
        assert!(h[5] < 2.0);
    }

    #[test]
    fn spread_ratio_zero_leaves_heights_alone() {
        let mut field = WaveField::new(0.0, &config(10.0, 1)).unwrap();
        field.node_mut(3).unwrap().position.y = 1.0;
        field.propagate_waves(DT);
        assert_eq!(field.nodes()[3].position.y, 1.0);
        assert_eq!(field.nodes()[2].position.y, 0.0);
    }

    #[test]
    fn surface_height_interpolates() {
        let mut field = WaveField::new(0.0, &config(10.0, 1)).unwrap();
        field.node_mut(5).unwrap().position.y = 2.0; // x = 0
        let h = field.surface_height_at(0.5).unwrap();
        assert!((h - 1.0).abs() < 1e-5);
        assert!(field.surface_height_at(100.0).is_err());
    }

    #[test]
    fn splash_pushes_nodes_under_a_falling_body() {
        let mut field = WaveField::new(0.0, &config(20.0, 5)).unwrap();
        let bounds = Rect::new(-1.0, -0.1, 1.0, 0.9);
        let after = field.splash(bounds, 1.0, Vec2::new(0.0, -4.0));

        assert!(after.y > -4.0, "body should slow down, got {after:?}");
        let hit = field
            .nodes()
            .iter()
            .filter(|n| n.velocity < 0.0)
            .count();
        assert!(hit > 0);
        for node in field.nodes() {
            if node.position.x < -1.5 || node.position.x > 1.5 {
                assert_eq!(node.velocity, 0.0, "node at {} moved", node.position.x);
            }
        }
    }

    #[test]
    fn massless_splash_is_ignored() {
        let mut field = WaveField::new(0.0, &config(20.0, 5)).unwrap();
        let v = Vec2::new(1.0, -3.0);
        assert_eq!(field.splash(Rect::new(-1.0, -1.0, 1.0, 1.0), 0.0, v), v);
    }

    #[test]
    fn strip_and_outline_shapes() {
        let field = WaveField::new(0.0, &config(10.0, 1)).unwrap();
        let strip = field.strip_vertices();
        assert_eq!(strip.len(), 20);
        assert_eq!(strip[1], Vec2::new(strip[0].x, -1.0));
        assert_eq!(field.strip_indices().len(), 6 * 9);

        let outline = field.collider_outline(2);
        // 5 decimated points + last surface point + two bottom corners
        assert_eq!(outline.len(), 8);
        assert_eq!(outline[outline.len() - 1], Vec2::new(field.left_x(), -1.0));
    }
}
