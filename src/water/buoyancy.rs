//! Buoyant force on a rectangular footprint floating in the height-field.
//!
//! The surface under the body is reduced to one straight line through the
//! nodes bracketing its leftmost and rightmost corners.  The part of the
//! rotated footprint below that line gives the displaced area and the point
//! where the force acts; the force itself is `ρ · |g| · area` along the line's
//! upward normal while the body straddles the surface, and straight up once it
//! is fully under.

use super::geometry::{
    clip_below_surface, compute_centroid, find_closest_segment, rect_corners,
    split_into_triangles, upper_corner_index, SurfaceLine, SurfacePoint,
};
use crate::error::SimResult;
use bevy::math::{Rect, Vec2};
use std::collections::VecDeque;

/// Collision shape of a floating body, resolved once at registration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Box { half_extents: Vec2 },
    /// `horizontal` when the capsule's segment runs along x.
    Capsule {
        radius: f32,
        half_height: f32,
        horizontal: bool,
    },
    Circle { radius: f32 },
}

impl ShapeKind {
    /// Width and height of the rectangle the resolver uses for this shape.
    ///
    /// A capsule is two caps of `radius` on a segment of `2 · half_height`,
    /// laid along its own axis.
    pub fn footprint(&self) -> Vec2 {
        match *self {
            ShapeKind::Box { half_extents } => half_extents * 2.0,
            ShapeKind::Capsule {
                radius,
                half_height,
                horizontal,
            } => {
                let (across, along) = (2.0 * radius, 2.0 * (half_height + radius));
                if horizontal {
                    Vec2::new(along, across)
                } else {
                    Vec2::new(across, along)
                }
            }
            ShapeKind::Circle { radius } => Vec2::splat(2.0 * radius),
        }
    }
}

/// Everything the resolver reads from a rigid body for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingBody {
    /// World-space centre of mass; also the centre of the footprint.
    pub center_of_mass: Vec2,
    /// Radians, counter-clockwise.
    pub rotation: f32,
    pub velocity: Vec2,
    pub mass: f32,
    /// Footprint width and height.
    pub size: Vec2,
}

impl FloatingBody {
    /// Rotated footprint, clockwise from the unrotated top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        rect_corners(self.center_of_mass, self.size, self.rotation)
    }

    /// Axis-aligned bounds of the rotated footprint.
    pub fn aabb(&self) -> Rect {
        let corners = self.corners();
        let (min, max) = corners
            .iter()
            .skip(1)
            .fold((corners[0], corners[0]), |(lo, hi), &c| (lo.min(c), hi.max(c)));
        Rect::from_corners(min, max)
    }
}

/// Fluid and world constants for one resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuoyancyParams {
    pub fluid_density: f32,
    /// Gravity vector (pointing down for a normal world).
    pub gravity: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submersion {
    Partial,
    Full,
}

/// Resolved buoyancy for one body and one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Buoyancy {
    pub force: Vec2,
    /// Centroid of the submerged polygon, where `force` acts.
    pub point: Vec2,
    pub submerged_area: f32,
    pub submersion: Submersion,
    /// Local straight-line surface the footprint was clipped against.
    pub waterline: SurfaceLine,
}

/// Straight-line surface spanning the body's horizontal extent.
///
/// Runs from the left node of the segment under the leftmost corner to the
/// right node of the segment under the rightmost corner.
pub fn local_surface<T: SurfacePoint>(
    corners: &[Vec2; 4],
    nodes: &VecDeque<T>,
) -> SimResult<SurfaceLine> {
    let upper = upper_corner_index(corners);
    let leftmost = corners[(upper + 3) % 4];
    let rightmost = corners[(upper + 1) % 4];
    let (left_x, right_x) = (leftmost.x.min(rightmost.x), leftmost.x.max(rightmost.x));

    let (ll, _) = find_closest_segment(left_x, nodes)?;
    let (_, rr) = find_closest_segment(right_x, nodes)?;
    let (a, b) = (nodes[ll].position(), nodes[rr].position());

    // Distinct indices in a sorted window never share an x; flat fallback.
    Ok(SurfaceLine::through(a, b).unwrap_or(SurfaceLine {
        slope: 0.0,
        offset: a.y.max(b.y),
    }))
}

/// Buoyant force on `body`, or `None` when nothing is submerged.
///
/// Fails only when part of the body lies outside the node window, which the
/// caller must prevent by keeping the window wide enough.  A degenerate
/// submerged polygon (zero area or a non-finite centroid) yields `None`
/// rather than a force.
pub fn resolve_buoyancy<T: SurfacePoint>(
    body: &FloatingBody,
    nodes: &VecDeque<T>,
    params: &BuoyancyParams,
) -> SimResult<Option<Buoyancy>> {
    let corners = body.corners();
    let waterline = local_surface(&corners, nodes)?;

    let below = corners.iter().filter(|&&c| waterline.is_below(c)).count();
    if below == 0 {
        return Ok(None);
    }

    let (submerged, submersion) = if below == corners.len() {
        (corners.to_vec(), Submersion::Full)
    } else {
        (clip_below_surface(&corners, &waterline), Submersion::Partial)
    };

    let triangles = split_into_triangles(submerged.len());
    let Some((point, submerged_area)) = compute_centroid(&submerged, &triangles) else {
        return Ok(None);
    };

    let upthrust = -params.fluid_density * params.gravity * submerged_area;
    let force = match submersion {
        Submersion::Partial => Vec2::from_angle(waterline.normal_tilt()).rotate(upthrust),
        Submersion::Full => upthrust,
    };
    if !force.is_finite() {
        return Ok(None);
    }

    Ok(Some(Buoyancy {
        force,
        point,
        submerged_area,
        submersion,
        waterline,
    }))
}

/// Linear drag while in the water: `standard_drag · |v̂ ⊙ size|`.
///
/// `size` is the body's axis-aligned extent, so a body moving broadside
/// meets more resistance than one moving end-on.
pub fn wet_drag(velocity: Vec2, size: Vec2, standard_drag: f32) -> f32 {
    standard_drag * (velocity.normalize_or_zero() * size).length()
}

/// Linear drag after leaving the water.
pub fn dry_drag(velocity: Vec2, size: Vec2, standard_drag: f32, air_drag_factor: f32) -> f32 {
    air_drag_factor * wet_drag(velocity, size, standard_drag)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAVITY: Vec2 = Vec2::new(0.0, -9.81);

    fn flat(height: f32) -> VecDeque<Vec2> {
        (-5..=5).map(|x| Vec2::new(x as f32, height)).collect()
    }

    fn params() -> BuoyancyParams {
        BuoyancyParams {
            fluid_density: 1.0,
            gravity: GRAVITY,
        }
    }

    fn plank(center: Vec2, rotation: f32) -> FloatingBody {
        FloatingBody {
            center_of_mass: center,
            rotation,
            velocity: Vec2::ZERO,
            mass: 1.0,
            size: Vec2::new(2.0, 1.0),
        }
    }

    #[test]
    fn footprints_per_shape() {
        assert_eq!(
            ShapeKind::Box {
                half_extents: Vec2::new(1.0, 0.5)
            }
            .footprint(),
            Vec2::new(2.0, 1.0)
        );
        assert_eq!(
            ShapeKind::Capsule {
                radius: 0.5,
                half_height: 1.0,
                horizontal: false,
            }
            .footprint(),
            Vec2::new(1.0, 3.0)
        );
        assert_eq!(
            ShapeKind::Capsule {
                radius: 0.5,
                half_height: 1.0,
                horizontal: true,
            }
            .footprint(),
            Vec2::new(3.0, 1.0)
        );
        assert_eq!(ShapeKind::Circle { radius: 0.75 }.footprint(), Vec2::splat(1.5));
    }

    #[test]
    fn fully_submerged_plank_displaces_its_whole_area() {
        let body = plank(Vec2::new(0.0, -3.0), 0.0);
        let b = resolve_buoyancy(&body, &flat(0.0), &params())
            .unwrap()
            .expect("submerged plank should float");
        assert_eq!(b.submersion, Submersion::Full);
        assert!((b.submerged_area - 2.0).abs() < 1e-5);
        assert!((b.point - Vec2::new(0.0, -3.0)).length() < 1e-5);
        assert!((b.force - Vec2::new(0.0, 9.81 * 2.0)).length() < 1e-3);
    }

    #[test]
    fn plank_touching_the_surface_from_below() {
        let body = plank(Vec2::new(0.0, -0.5), 0.0);
        let b = resolve_buoyancy(&body, &flat(0.0), &params())
            .unwrap()
            .expect("plank is under water");
        assert!((b.submerged_area - 2.0).abs() < 1e-5);
        assert!((b.point - Vec2::new(0.0, -0.5)).length() < 1e-5);
    }

    #[test]
    fn plank_resting_on_the_surface_gets_nothing() {
        let body = plank(Vec2::new(0.0, 0.5), 0.0);
        assert_eq!(resolve_buoyancy(&body, &flat(0.0), &params()).unwrap(), None);
    }

    #[test]
    fn half_submerged_plank() {
        let body = plank(Vec2::ZERO, 0.0);
        let b = resolve_buoyancy(&body, &flat(0.0), &params())
            .unwrap()
            .unwrap();
        assert_eq!(b.submersion, Submersion::Partial);
        assert!((b.submerged_area - 1.0).abs() < 1e-5);
        assert!((b.point - Vec2::new(0.0, -0.25)).length() < 1e-5);
        assert!(b.force.x.abs() < 1e-5);
    }

    #[test]
    fn sloped_surface_tilts_the_force() {
        let nodes: VecDeque<Vec2> = (-5..=5)
            .map(|x| Vec2::new(x as f32, 0.2 * x as f32))
            .collect();
        let body = plank(Vec2::ZERO, 0.0);
        let b = resolve_buoyancy(&body, &nodes, &params())
            .unwrap()
            .unwrap();
        assert!((b.waterline.slope - 0.2).abs() < 1e-5);
        // Normal of a rising surface leans left.
        assert!(b.force.x < 0.0);
        assert!(b.force.y > 0.0);
        let magnitude = 9.81 * b.submerged_area;
        assert!((b.force.length() - magnitude).abs() < 1e-3);
    }

    #[test]
    fn rotated_body_stays_within_its_own_area() {
        let body = plank(Vec2::new(0.0, 0.1), 0.6);
        let b = resolve_buoyancy(&body, &flat(0.0), &params())
            .unwrap()
            .unwrap();
        assert!(b.submerged_area > 0.0 && b.submerged_area < 2.0);
        assert!(b.point.y < 0.0);
    }

    #[test]
    fn body_outside_the_window_is_an_error() {
        let body = plank(Vec2::new(5.5, 0.0), 0.0);
        assert!(resolve_buoyancy(&body, &flat(0.0), &params()).is_err());
    }

    #[test]
    fn aabb_covers_rotated_corners() {
        let body = plank(Vec2::ZERO, std::f32::consts::FRAC_PI_2);
        let aabb = body.aabb();
        assert!((aabb.width() - 1.0).abs() < 1e-5);
        assert!((aabb.height() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn drag_scales_with_exposed_extent() {
        let size = Vec2::new(2.0, 1.0);
        assert!((wet_drag(Vec2::new(0.0, -1.0), size, 1.05) - 1.05).abs() < 1e-6);
        assert!((wet_drag(Vec2::new(3.0, 0.0), size, 1.05) - 2.1).abs() < 1e-6);
        assert_eq!(wet_drag(Vec2::ZERO, size, 1.05), 0.0);
        assert!((dry_drag(Vec2::new(0.0, -1.0), size, 1.05, 0.001) - 0.00105).abs() < 1e-7);
    }
}
