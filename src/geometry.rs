//! Geometry primitives shared by the beachline, circle predictor and clipper.
//!
//! All formulas here follow spec.md §4.1 and are cross-checked against the
//! original Python implementation (`events.py`, `beachline.py`,
//! `voronoi.py`) where the prose leaves a detail under-specified.

use cgmath::{InnerSpace, MetricSpace};

/// A point in the plane. Equality is exact; geometric comparisons use
/// [`EPSILON`].
pub type Coord = cgmath::Point2<f64>;

/// Epsilon used throughout for coordinate equality, circle degeneracy and
/// zero-length edge collapse (spec.md §6).
pub const EPSILON: f64 = 1e-10;

pub fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// `y` of the parabola with the given `focus`, evaluated at `x`, for a
/// sweep-line (directrix) at `sweepline`. `None` when the arc is
/// degenerate (the focus sits on the sweep-line, so the arc is a vertical
/// ray rather than a parabola).
pub fn parabola_y(focus: Coord, x: f64, sweepline: f64) -> Option<f64> {
    let denom = focus.y - sweepline;
    if denom.abs() < EPSILON {
        return None;
    }
    let dx = x - focus.x;
    Some((dx * dx + focus.y * focus.y - sweepline * sweepline) / (2.0 * denom))
}

/// Whether the breakpoint `(i, j)` has a real intersection under the
/// current sweep-line (spec.md §4.1). A breakpoint between two sites at
/// the same height only exists when `i` is to the left of `j`.
pub fn does_intersect(i: Coord, j: Coord) -> bool {
    !(nearly_equal(i.y, j.y) && j.x < i.x)
}

/// The breakpoint `(i, j)` under directrix `l`, following the case split
/// of spec.md §4.1. `max_y` caps the y returned for the degenerate
/// same-height, wrong-order case (used while evaluating an edge far below
/// the bounding polygon during clipping).
pub fn breakpoint_intersection(i: Coord, j: Coord, l: f64, max_y: Option<f64>) -> Coord {
    let (a, b, c, d) = (i.x, i.y, j.x, j.y);
    let u = 2.0 * (b - l);
    let v = 2.0 * (d - l);

    let mut focus_for_y = i;
    let x = if nearly_equal(i.y, j.y) {
        if j.x < i.x {
            return Coord::new((a + c) / 2.0, max_y.unwrap_or(f64::INFINITY));
        }
        (a + c) / 2.0
    } else if nearly_equal(i.y, l) {
        focus_for_y = j;
        a
    } else if nearly_equal(j.y, l) {
        c
    } else if (u - v).abs() < EPSILON {
        (a + c) / 2.0
    } else {
        let discriminant = v * (a * a * u - 2.0 * a * c * u + b * b * (u - v) + c * c * u)
            + d * d * u * (v - u)
            + l * l * (u - v) * (u - v);
        let discriminant = discriminant.max(0.0);
        -(discriminant.sqrt() + a * v - c * u) / (u - v)
    };

    let y = parabola_y(focus_for_y, x, l).unwrap_or(f64::INFINITY);
    Coord::new(x, y)
}

/// The circumcircle of three points, or `None` if they are (near-)colinear.
/// Follows the determinant form of `events.py: CircleEvent.create_circle`.
pub fn circumcircle(a: Coord, b: Coord, c: Coord) -> Option<(Coord, f64)> {
    let big_a = b.x - a.x;
    let big_b = b.y - a.y;
    let big_c = c.x - a.x;
    let big_d = c.y - a.y;
    let e = big_a * (a.x + b.x) + big_b * (a.y + b.y);
    let f = big_c * (a.x + c.x) + big_d * (a.y + c.y);
    let g = 2.0 * (big_a * (c.y - b.y) - big_b * (c.x - b.x));

    if g.abs() < EPSILON {
        return None;
    }

    let x = (big_d * e - big_b * f) / g;
    let y = (big_a * f - big_c * e) / g;
    let center = Coord::new(x, y);
    let radius = center.distance(a);
    Some((center, radius))
}

/// Angle in degrees of `point` around `center`, measured like `atan2` and
/// normalized to `[0, 360)` (spec.md §4.7/§4.8).
pub fn angle_degrees(point: Coord, center: Coord) -> f64 {
    let d = point - center;
    let degrees = d.y.atan2(d.x).to_degrees();
    degrees.rem_euclid(360.0)
}

/// Whether the triple `(a, b, c)` winds clockwise around `center`, the
/// orientation guard of spec.md §4.7.
pub fn is_clockwise(a: Coord, b: Coord, c: Coord, center: Coord) -> bool {
    let angle_a = angle_degrees(a, center);
    let angle_b = angle_degrees(b, center);
    let angle_c = angle_degrees(c, center);
    let counter_clockwise = (angle_c - angle_a).rem_euclid(360.0) > (angle_c - angle_b).rem_euclid(360.0);
    !counter_clockwise
}

/// Intersection of the open ray from `origin` in `direction` with the
/// segment `(p1, p2)`. Follows the cross-product method of
/// `polygon.py: _line_ray_intersection_point`; valid when `t1 > 0` (past
/// the ray's origin) and `0 <= t2 <= 1` (within the segment).
pub fn ray_segment_intersection(
    origin: Coord,
    direction: cgmath::Vector2<f64>,
    p1: Coord,
    p2: Coord,
) -> Option<Coord> {
    let direction = direction.normalize();
    let v1 = origin - p1;
    let v2 = p2 - p1;
    let v3 = cgmath::Vector2::new(-direction.y, direction.x);

    let dot = v2.dot(v3);
    if dot.abs() < EPSILON {
        return None;
    }

    let t1 = (v2.x * v1.y - v2.y * v1.x) / dot;
    let t2 = v1.dot(v3) / dot;

    if t1 > 0.0 && (0.0..=1.0).contains(&t2) {
        Some(origin + direction * t1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parabola_degenerate_on_sweepline() {
        assert_eq!(parabola_y(Coord::new(0.0, 5.0), 0.0, 5.0), None);
    }

    #[test]
    fn breakpoint_midpoint_same_height() {
        let p = breakpoint_intersection(Coord::new(0.4, 0.5), Coord::new(0.6, 0.5), 0.8, None);
        assert_abs_diff_eq!(p.x, 0.5, epsilon = EPSILON);
    }

    #[test]
    fn does_intersect_rejects_wrong_order_same_height() {
        assert!(!does_intersect(Coord::new(0.6, 0.5), Coord::new(0.4, 0.5)));
        assert!(does_intersect(Coord::new(0.4, 0.5), Coord::new(0.6, 0.5)));
    }

    #[test]
    fn circumcircle_of_right_isoceles_triangle() {
        let (center, radius) = circumcircle(
            Coord::new(0.0, 0.0),
            Coord::new(1.0, 0.0),
            Coord::new(0.5, 1.0),
        )
        .unwrap();
        assert_abs_diff_eq!(center.x, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(center.y, 0.375, epsilon = 1e-9);
        assert_abs_diff_eq!(radius, 0.625, epsilon = 1e-9);
    }

    #[test]
    fn circumcircle_colinear_is_degenerate() {
        assert!(circumcircle(Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(2.0, 0.0)).is_none());
    }

    #[test]
    fn clockwise_orientation_guard() {
        let center = Coord::new(0.0, 0.0);
        assert!(is_clockwise(
            Coord::new(1.0, 0.0),
            Coord::new(0.0, -1.0),
            Coord::new(-1.0, 0.0),
            center
        ));
        assert!(!is_clockwise(
            Coord::new(-1.0, 0.0),
            Coord::new(0.0, -1.0),
            Coord::new(1.0, 0.0),
            center
        ));
    }
}
