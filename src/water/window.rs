//! Scrolling window over an unbounded ocean.
//!
//! The field never grows or shrinks.  When the reference point (camera or
//! tracked ship) moves, whole world units of nodes are taken off the trailing
//! edge and re-seated past the leading edge, seeded from the wave driver at
//! their new x so the scroll leaves no seam.

use super::field::WaveField;
use super::wave::{WaveParams, WavePhase};
use bevy::math::Vec2;

/// Where the reference point is and how much slack to keep around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowBounds {
    pub reference_x: f32,
    /// Half of the visible width around the reference point.
    pub view_half_width: f32,
    /// Extra slack beyond the view on each side.
    pub despawn_distance: f32,
}

impl WindowBounds {
    /// Half-width of the allowed node range around the reference point.
    ///
    /// Never narrower than half the window plus one recycle unit, otherwise a
    /// recycle on one edge would immediately violate the opposite bound.
    pub fn half_span(&self, longitude: f32) -> f32 {
        (self.view_half_width + self.despawn_distance).max((longitude + 1.0) / 2.0)
    }
}

/// What a tracking pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecycleReport {
    /// Nodes moved from the left edge to the right edge.
    pub moved_right: usize,
    /// Nodes moved from the right edge to the left edge.
    pub moved_left: usize,
    /// The reference jumped further than the window is wide; every node was re-seated.
    pub reseated: bool,
}

impl RecycleReport {
    pub fn is_empty(&self) -> bool {
        self.moved_right == 0 && self.moved_left == 0 && !self.reseated
    }
}

/// Phase-coupled driver state needed to seed recycled nodes.
#[derive(Debug, Clone, Copy)]
pub struct WaveSeed<'a> {
    pub phase: &'a WavePhase,
    pub params: &'a WaveParams,
    /// Spread-speed-scaled step, `spread_speed · dt`.
    pub wave_dt: f32,
}

impl WaveSeed<'_> {
    #[inline]
    fn height_at(&self, x: f32) -> f32 {
        self.phase.sample(x, self.wave_dt, self.params)
    }

    /// Finite-difference divisor; a non-positive step seeds no motion.
    #[inline]
    fn rate(&self, difference: f32) -> f32 {
        if self.wave_dt > 0.0 {
            difference / self.wave_dt
        } else {
            0.0
        }
    }
}

impl WaveField {
    /// Width of the window in world units.
    pub fn longitude(&self) -> f32 {
        self.nodes.len() as f32 * self.position_delta
    }

    /// Move one world unit of nodes from the left edge to the right edge.
    ///
    /// Each moved node is re-based one spacing past the current rightmost
    /// node, takes the driver height at that x, and gets its velocity and
    /// acceleration as finite differences against its new left neighbour.
    pub fn recycle_right(&mut self, seed: &WaveSeed<'_>) -> usize {
        let mut moved = 0;
        for _ in 0..self.nodes_per_unit {
            if self.nodes.len() < 2 {
                break;
            }
            let (Some(mut node), Some(neighbour)) = (self.nodes.pop_front(), self.nodes.back().copied())
            else {
                break;
            };

            let x = neighbour.position.x + self.position_delta;
            node.rebase(Vec2::new(x, self.water_level));
            node.position.y = self.water_level + seed.height_at(x);
            node.velocity = seed.rate(node.position.y - neighbour.position.y);
            node.acceleration = seed.rate(node.velocity - neighbour.velocity);

            self.nodes.push_back(node);
            moved += 1;
        }
        moved
    }

    /// Move one world unit of nodes from the right edge to the left edge.
    ///
    /// Mirror of [`Self::recycle_right`]; differences are taken against the
    /// new right neighbour (the old leftmost node).
    pub fn recycle_left(&mut self, seed: &WaveSeed<'_>) -> usize {
        let mut moved = 0;
        for _ in 0..self.nodes_per_unit {
            if self.nodes.len() < 2 {
                break;
            }
            let (Some(mut node), Some(neighbour)) = (self.nodes.pop_back(), self.nodes.front().copied())
            else {
                break;
            };

            let x = neighbour.position.x - self.position_delta;
            node.rebase(Vec2::new(x, self.water_level));
            node.position.y = self.water_level + seed.height_at(x);
            node.velocity = seed.rate(neighbour.position.y - node.position.y);
            node.acceleration = seed.rate(neighbour.velocity - node.velocity);

            self.nodes.push_front(node);
            moved += 1;
        }
        moved
    }

    /// Lay the whole window out again centred on `center_x`, every node seeded
    /// from the driver with no motion.
    pub fn reseat(&mut self, center_x: f32, seed: &WaveSeed<'_>) {
        let left = center_x - self.longitude() / 2.0;
        let (delta, level) = (self.position_delta, self.water_level);
        for (i, node) in self.nodes.iter_mut().enumerate() {
            let x = left + i as f32 * delta;
            node.rebase(Vec2::new(x, level));
            node.position.y = level + seed.height_at(x);
        }
    }

    /// Recycle whole units until both edges sit inside the allowed range
    /// around the reference point.
    ///
    /// Work is proportional to the number of recycled nodes.  A jump wider
    /// than the window itself falls back to [`Self::reseat`].
    pub fn track(&mut self, bounds: &WindowBounds, seed: &WaveSeed<'_>) -> RecycleReport {
        let mut report = RecycleReport::default();
        if self.nodes.len() < 2 {
            return report;
        }

        let longitude = self.longitude();
        let half_span = bounds.half_span(longitude);
        let left_bound = bounds.reference_x - half_span;
        let right_bound = bounds.reference_x + half_span;

        let left_drift = left_bound - self.left_x();
        let right_drift = self.right_x() - right_bound;

        if left_drift > longitude || right_drift > longitude {
            self.reseat(bounds.reference_x, seed);
            report.reseated = true;
            return report;
        }

        if left_drift > 0.0 {
            for _ in 0..left_drift.ceil() as usize {
                report.moved_right += self.recycle_right(seed);
            }
        } else if right_drift > 0.0 {
            for _ in 0..right_drift.ceil() as usize {
                report.moved_left += self.recycle_left(seed);
            }
        }
        report
    }
}
