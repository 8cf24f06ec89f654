//! A single sample of the water height-field.

use super::geometry::SurfacePoint;
use bevy::math::Vec2;

/// One point of the surface: a unit of mass hanging from its rest position on
/// a damped vertical spring.
///
/// Only `position.y` evolves during a step.  `position.x` and the rest
/// position change only when the window recycles the node to the other edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterNode {
    position_base: Vec2,
    pub position: Vec2,
    /// Vertical velocity.
    pub velocity: f32,
    /// Last computed vertical acceleration.
    pub acceleration: f32,
    /// Decaying forcing term injected by the wave driver.
    pub disturbance: f32,
}

impl WaterNode {
    /// A node at rest at `position`.
    pub fn new(position: Vec2) -> Self {
        Self {
            position_base: position,
            position,
            velocity: 0.0,
            acceleration: 0.0,
            disturbance: 0.0,
        }
    }

    /// Rest position (undisturbed water level at this x).
    #[inline]
    pub fn position_base(&self) -> Vec2 {
        self.position_base
    }

    /// Height above (positive) or below (negative) the rest level.
    #[inline]
    pub fn displacement(&self) -> f32 {
        self.position.y - self.position_base.y
    }

    /// Advance the spring by one fixed step.
    ///
    /// Height moves with the velocity from the *previous* step before the new
    /// acceleration is folded into velocity.  Swapping the two updates makes
    /// the solver gain energy.
    pub fn update(&mut self, spring_constant: f32, damping: f32, mass: f32, dt: f32) {
        let force = spring_constant * self.displacement() + self.velocity * damping;
        self.acceleration = -force / mass + self.disturbance * dt;
        self.disturbance -= self.disturbance * damping;

        self.position.y += self.velocity * dt;
        self.velocity += self.acceleration;
    }

    /// Exchange momentum with a body hitting the surface from above.
    ///
    /// Treated as a 1D elastic collision between the node and a splasher of
    /// `splasher_mass`.  Only downward splasher motion participates.  Returns
    /// the splasher's rebound velocity.
    pub fn splash(&mut self, splasher_mass: f32, splasher_velocity: f32, mass: f32) -> f32 {
        let splasher_velocity = splasher_velocity.min(0.0);
        let node_velocity = self.velocity;
        let total = splasher_mass + mass;

        self.velocity =
            (2.0 * splasher_mass * splasher_velocity + (mass - splasher_mass) * node_velocity)
                / total;

        ((splasher_mass - mass) * splasher_velocity + 2.0 * mass * node_velocity) / total
    }

    /// Force the height to `rest + offset`, leaving velocity untouched.
    pub fn disturb(&mut self, offset: f32) {
        self.position.y = self.position_base.y + offset;
    }

    /// Back to rest: position restored, motion cleared.
    pub fn reset(&mut self) {
        self.position = self.position_base;
        self.velocity = 0.0;
        self.acceleration = 0.0;
        self.disturbance = 0.0;
    }

    /// Move the node to a new rest position (used by window recycling).
    pub fn rebase(&mut self, position_base: Vec2) {
        self.position_base = position_base;
        self.reset();
    }
}

impl SurfacePoint for WaterNode {
    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }
}
