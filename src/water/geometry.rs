//! Plane geometry used by the buoyancy resolver.
//!
//! The fluid boundary is the piecewise-linear polyline through the node
//! positions.  Around a floating body it is approximated by one straight
//! [`SurfaceLine`]; the body's rotated rectangle is clipped against that line
//! and the submerged part is fan-triangulated to get its area and centroid.

use crate::error::{SimError, SimResult};
use bevy::math::{Mat3, Vec2};
use std::collections::VecDeque;

/// Anything with a position on the fluid boundary.
pub trait SurfacePoint {
    fn position(&self) -> Vec2;
}

impl SurfacePoint for Vec2 {
    #[inline]
    fn position(&self) -> Vec2 {
        *self
    }
}

/// Indices of the two consecutive nodes whose segment brackets `x`.
///
/// `nodes` must be sorted by ascending x.  O(log n).  A query outside the
/// window (or a window with fewer than two nodes) is a contract violation and
/// is reported as [`SimError::OutsideWindow`].
pub fn find_closest_segment<T: SurfacePoint>(
    x: f32,
    nodes: &VecDeque<T>,
) -> SimResult<(usize, usize)> {
    let (Some(first), Some(last)) = (nodes.front(), nodes.back()) else {
        return Err(SimError::OutsideWindow {
            x,
            left: f32::NAN,
            right: f32::NAN,
        });
    };
    let (left, right) = (first.position().x, last.position().x);
    if nodes.len() < 2 || !(left..=right).contains(&x) {
        return Err(SimError::OutsideWindow { x, left, right });
    }

    let upper = nodes
        .partition_point(|node| node.position().x < x)
        .clamp(1, nodes.len() - 1);
    Ok((upper - 1, upper))
}

/// Straight-line approximation of the surface: `y = slope · x + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLine {
    pub slope: f32,
    pub offset: f32,
}

impl SurfaceLine {
    /// Line through `a` and `b`; `None` when the two points share an x.
    pub fn through(a: Vec2, b: Vec2) -> Option<Self> {
        let dx = b.x - a.x;
        if dx == 0.0 || !dx.is_finite() {
            return None;
        }
        let slope = (b.y - a.y) / dx;
        Some(Self {
            slope,
            offset: b.y - slope * b.x,
        })
    }

    #[inline]
    pub fn height_at(&self, x: f32) -> f32 {
        self.slope * x + self.offset
    }

    /// Vertical distance from `point` up to the line; positive when submerged.
    #[inline]
    pub fn depth_of(&self, point: Vec2) -> f32 {
        self.height_at(point.x) - point.y
    }

    #[inline]
    pub fn is_below(&self, point: Vec2) -> bool {
        self.depth_of(point) > 0.0
    }

    /// Upward unit normal.
    pub fn normal(&self) -> Vec2 {
        Vec2::new(-self.slope, 1.0).normalize()
    }

    /// Angle between the upward normal and +Y, counter-clockwise.
    #[inline]
    pub fn normal_tilt(&self) -> f32 {
        self.slope.atan()
    }
}

/// Corners of a `size` rectangle centred at `center` and rotated by
/// `rotation` radians, clockwise from the (unrotated) top-left.
pub fn rect_corners(center: Vec2, size: Vec2, rotation: f32) -> [Vec2; 4] {
    let rot = Vec2::from_angle(rotation);
    let half = size / 2.0;
    [
        Vec2::new(-half.x, half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(-half.x, -half.y),
    ]
    .map(|corner| center + rot.rotate(corner))
}

/// Index of the highest corner (first one on ties).
pub fn upper_corner_index(corners: &[Vec2; 4]) -> usize {
    let mut upper = 0;
    for (i, corner) in corners.iter().enumerate() {
        if corner.y > corners[upper].y {
            upper = i;
        }
    }
    upper
}

/// Point where segment `p → q` crosses `line`, given their signed depths.
#[inline]
fn crossing(p: Vec2, q: Vec2, depth_p: f32, depth_q: f32) -> Vec2 {
    let t = depth_p / (depth_p - depth_q);
    p + (q - p) * t
}

#[inline]
fn crosses(depth_p: f32, depth_q: f32) -> bool {
    (depth_p > 0.0 && depth_q < 0.0) || (depth_p < 0.0 && depth_q > 0.0)
}

/// Each outline edge as its start vertex, that vertex's depth under `line`,
/// and the point where the edge crosses `line` (if it does).
fn edges_against<'a>(
    vertices: &'a [Vec2],
    line: &'a SurfaceLine,
) -> impl Iterator<Item = (Vec2, f32, Option<Vec2>)> + 'a {
    let n = vertices.len();
    (0..n).map(move |i| {
        let (p, q) = (vertices[i], vertices[(i + 1) % n]);
        let (dp, dq) = (line.depth_of(p), line.depth_of(q));
        (p, dp, crosses(dp, dq).then(|| crossing(p, q, dp, dq)))
    })
}

/// The points where the polygon outline crosses the surface line, in outline
/// order.
///
/// Each crossing is found parametrically along the edge, so vertical and
/// horizontal edges need no special casing.  `None` unless the outline
/// crosses exactly twice (a convex shape partially submerged).
pub fn find_intersections_on_surface(
    vertices: &[Vec2],
    line: &SurfaceLine,
) -> Option<(Vec2, Vec2)> {
    let mut hits = edges_against(vertices, line).filter_map(|(_, _, hit)| hit);
    match (hits.next(), hits.next(), hits.next()) {
        (Some(a), Some(b), None) => Some((a, b)),
        _ => None,
    }
}

/// Part of the convex polygon at or below the surface line.
///
/// Vertices above the line are dropped and the crossing points spliced in
/// where they occur, so the output keeps the input winding and stays convex.
pub fn clip_below_surface(vertices: &[Vec2], line: &SurfaceLine) -> Vec<Vec2> {
    let mut clipped = Vec::with_capacity(vertices.len() + 2);
    for (p, dp, hit) in edges_against(vertices, line) {
        if dp >= 0.0 {
            clipped.push(p);
        }
        clipped.extend(hit);
    }
    clipped
}

/// Fan triangulation from vertex 0.  Valid for convex polygons only.
pub fn split_into_triangles(vertex_count: usize) -> Vec<[usize; 3]> {
    (1..vertex_count.saturating_sub(1))
        .map(|i| [0, i, i + 1])
        .collect()
}

/// Determinant of a row-major 3×3 matrix.
#[inline]
pub fn compute_3x3_determinant(rows: [[f32; 3]; 3]) -> f32 {
    // Transposing does not change the determinant.
    Mat3::from_cols_array_2d(&rows).determinant()
}

/// Unsigned triangle area from the homogeneous-coordinate determinant.
pub fn compute_triangle_area(p1: Vec2, p2: Vec2, p3: Vec2) -> f32 {
    compute_3x3_determinant([[p1.x, p1.y, 1.0], [p2.x, p2.y, 1.0], [p3.x, p3.y, 1.0]]).abs() / 2.0
}

#[inline]
pub fn compute_triangle_centroid(p1: Vec2, p2: Vec2, p3: Vec2) -> Vec2 {
    (p1 + p2 + p3) / 3.0
}

/// Area-weighted centroid and total area of a triangulated polygon.
///
/// `None` when the area is zero or the result is not finite (collinear or
/// otherwise degenerate input).
pub fn compute_centroid(vertices: &[Vec2], triangles: &[[usize; 3]]) -> Option<(Vec2, f32)> {
    let mut weighted = Vec2::ZERO;
    let mut area = 0.0;
    for &[a, b, c] in triangles {
        let (p1, p2, p3) = (vertices[a], vertices[b], vertices[c]);
        let t_area = compute_triangle_area(p1, p2, p3);
        weighted += t_area * compute_triangle_centroid(p1, p2, p3);
        area += t_area;
    }

    let centroid = weighted / area;
    (area > 0.0 && centroid.is_finite()).then_some((centroid, area))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_surface(from: i32, to: i32, height: f32) -> VecDeque<Vec2> {
        (from..=to).map(|x| Vec2::new(x as f32, height)).collect()
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    // ── find_closest_segment ──────────────────────────────────────────────────

    #[test]
    fn segment_brackets_interior_point() {
        let nodes = flat_surface(-5, 5, 0.0);
        let (l, r) = find_closest_segment(0.3, &nodes).unwrap();
        assert_eq!((nodes[l].x, nodes[r].x), (0.0, 1.0));
    }

    #[test]
    fn segment_at_window_edges() {
        let nodes = flat_surface(-5, 5, 0.0);
        assert_eq!(find_closest_segment(-5.0, &nodes).unwrap(), (0, 1));
        assert_eq!(find_closest_segment(5.0, &nodes).unwrap(), (9, 10));
    }

    #[test]
    fn segment_on_a_node_picks_a_containing_pair() {
        let nodes = flat_surface(-5, 5, 0.0);
        let (l, r) = find_closest_segment(2.0, &nodes).unwrap();
        assert!(nodes[l].x <= 2.0 && 2.0 <= nodes[r].x);
        assert_eq!(r, l + 1);
    }

    #[test]
    fn segment_outside_window_is_an_error() {
        let nodes = flat_surface(-5, 5, 0.0);
        assert!(matches!(
            find_closest_segment(7.5, &nodes),
            Err(SimError::OutsideWindow { .. })
        ));
        let empty: VecDeque<Vec2> = VecDeque::new();
        assert!(find_closest_segment(0.0, &empty).is_err());
    }

    // ── SurfaceLine ───────────────────────────────────────────────────────────

    #[test]
    fn line_through_two_points() {
        let line = SurfaceLine::through(Vec2::new(0.0, 1.0), Vec2::new(2.0, 2.0)).unwrap();
        assert!((line.slope - 0.5).abs() < 1e-6);
        assert!((line.height_at(4.0) - 3.0).abs() < 1e-6);
        assert!(line.is_below(Vec2::new(4.0, 2.0)));
        assert!(!line.is_below(Vec2::new(4.0, 3.5)));
    }

    #[test]
    fn vertical_line_is_rejected() {
        assert!(SurfaceLine::through(Vec2::new(1.0, 0.0), Vec2::new(1.0, 3.0)).is_none());
    }

    #[test]
    fn normal_tilts_against_the_slope() {
        let line = SurfaceLine {
            slope: 1.0,
            offset: 0.0,
        };
        let n = line.normal();
        assert!(approx(n, Vec2::new(-1.0, 1.0).normalize()));
        let rotated = Vec2::from_angle(line.normal_tilt()).rotate(Vec2::Y);
        assert!(approx(rotated, n));
    }

    // ── corners ───────────────────────────────────────────────────────────────

    #[test]
    fn unrotated_corners_are_clockwise_from_top_left() {
        let c = rect_corners(Vec2::new(1.0, 1.0), Vec2::new(2.0, 4.0), 0.0);
        assert!(approx(c[0], Vec2::new(0.0, 3.0)));
        assert!(approx(c[1], Vec2::new(2.0, 3.0)));
        assert!(approx(c[2], Vec2::new(2.0, -1.0)));
        assert!(approx(c[3], Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn quarter_turn_moves_top_left_to_bottom_left() {
        let c = rect_corners(Vec2::ZERO, Vec2::new(2.0, 2.0), std::f32::consts::FRAC_PI_2);
        assert!(approx(c[0], Vec2::new(-1.0, -1.0)));
        assert!(approx(c[2], Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn upper_corner_neighbours_are_the_horizontal_extremes() {
        let c = rect_corners(Vec2::ZERO, Vec2::new(2.0, 2.0), std::f32::consts::FRAC_PI_4);
        let upper = upper_corner_index(&c);
        assert_eq!(upper, 1);
        let left = c[(upper + 3) % 4];
        let right = c[(upper + 1) % 4];
        assert!(c.iter().all(|p| p.x >= left.x - 1e-5 && p.x <= right.x + 1e-5));
    }

    // ── clipping ──────────────────────────────────────────────────────────────

    #[test]
    fn half_submerged_square_is_clipped_at_the_waterline() {
        let square = rect_corners(Vec2::ZERO, Vec2::new(2.0, 2.0), 0.0);
        let line = SurfaceLine {
            slope: 0.0,
            offset: 0.0,
        };
        let (p1, p2) = find_intersections_on_surface(&square, &line).unwrap();
        assert!(approx(p1, Vec2::new(1.0, 0.0)));
        assert!(approx(p2, Vec2::new(-1.0, 0.0)));

        let clipped = clip_below_surface(&square, &line);
        assert_eq!(clipped.len(), 4);
        let (centroid, area) =
            compute_centroid(&clipped, &split_into_triangles(clipped.len())).unwrap();
        assert!((area - 2.0).abs() < 1e-5);
        assert!(approx(centroid, Vec2::new(0.0, -0.5)));
    }

    #[test]
    fn diagonal_waterline_cuts_a_triangle() {
        let square = rect_corners(Vec2::ZERO, Vec2::new(2.0, 2.0), 0.0);
        // y = x passes through two opposite corners.
        let line = SurfaceLine {
            slope: 1.0,
            offset: 0.0,
        };
        let clipped = clip_below_surface(&square, &line);
        let (centroid, area) =
            compute_centroid(&clipped, &split_into_triangles(clipped.len())).unwrap();
        assert!((area - 2.0).abs() < 1e-5);
        assert!(approx(centroid, Vec2::new(1.0 / 3.0, -1.0 / 3.0)));
    }

    #[test]
    fn clipped_outline_contains_both_crossings() {
        let plank = rect_corners(Vec2::new(0.2, 0.1), Vec2::new(3.0, 1.0), 0.4);
        let line = SurfaceLine {
            slope: 0.1,
            offset: 0.0,
        };
        let (p1, p2) = find_intersections_on_surface(&plank, &line).unwrap();
        let clipped = clip_below_surface(&plank, &line);
        assert!(clipped.iter().any(|&c| approx(c, p1)));
        assert!(clipped.iter().any(|&c| approx(c, p2)));
        assert!(line.depth_of(p1).abs() < 1e-5 && line.depth_of(p2).abs() < 1e-5);
    }

    #[test]
    fn fully_dry_polygon_clips_to_nothing() {
        let square = rect_corners(Vec2::new(0.0, 5.0), Vec2::new(2.0, 2.0), 0.3);
        let line = SurfaceLine {
            slope: 0.0,
            offset: 0.0,
        };
        assert!(clip_below_surface(&square, &line).is_empty());
        assert!(find_intersections_on_surface(&square, &line).is_none());
    }

    // ── triangulation and areas ───────────────────────────────────────────────

    #[test]
    fn fan_triangulation_counts() {
        assert_eq!(split_into_triangles(3), vec![[0, 1, 2]]);
        assert_eq!(split_into_triangles(5).len(), 3);
        assert!(split_into_triangles(2).is_empty());
        assert!(split_into_triangles(0).is_empty());
    }

    #[test]
    fn unit_right_triangle_area() {
        let area = compute_triangle_area(Vec2::ZERO, Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
        assert!((area - 0.5).abs() < 1e-6);
    }

    #[test]
    fn determinant_of_identity_and_swap() {
        assert_eq!(
            compute_3x3_determinant([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]),
            1.0
        );
        assert_eq!(
            compute_3x3_determinant([[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]),
            -1.0
        );
    }

    #[test]
    fn collinear_polygon_has_no_centroid() {
        let line = [Vec2::ZERO, Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)];
        assert!(compute_centroid(&line, &split_into_triangles(3)).is_none());
    }
}
