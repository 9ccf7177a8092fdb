//! The convex bounding polygon sites are clipped to (spec.md §4.8).
//!
//! Vertices are always stored in clockwise order, matching
//! `examples/original_source/polygon.py`'s `_order_points`: each vertex is
//! sorted by the angle `(-180 - atan2_degrees(v - centroid)) % 360`, which
//! walks the polygon clockwise starting from the point nearest due south
//! of the centroid.

use crate::geometry::{angle_degrees, ray_segment_intersection, Coord};

#[derive(Debug)]
pub struct BoundingPolygon {
    vertices: Vec<Coord>,
}

impl BoundingPolygon {
    /// Order `points` clockwise around their centroid and build a polygon
    /// from them. Does not itself reject degenerate input — callers
    /// needing the `DegeneratePolygon` error check call [`Self::is_degenerate`].
    pub fn new(points: Vec<Coord>) -> Self {
        let centroid = centroid_of(&points);
        let mut vertices = points;
        vertices.sort_by(|a, b| {
            let key_a = sort_key(*a, centroid);
            let key_b = sort_key(*b, centroid);
            key_a.partial_cmp(&key_b).unwrap_or(std::cmp::Ordering::Equal)
        });
        BoundingPolygon { vertices }
    }

    /// An axis-aligned rectangle, clockwise from the bottom-left.
    pub fn axis_aligned(min: Coord, max: Coord) -> Self {
        BoundingPolygon::new(vec![
            Coord::new(min.x, min.y),
            Coord::new(min.x, max.y),
            Coord::new(max.x, max.y),
            Coord::new(max.x, min.y),
        ])
    }

    /// The default polygon for a set of sites: their axis-aligned bounding
    /// box padded by 2 units on every side (spec.md §6).
    pub fn default_for_sites(sites: &[Coord]) -> Self {
        let mut min = Coord::new(f64::INFINITY, f64::INFINITY);
        let mut max = Coord::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for s in sites {
            min.x = min.x.min(s.x);
            min.y = min.y.min(s.y);
            max.x = max.x.max(s.x);
            max.y = max.y.max(s.y);
        }
        const PADDING: f64 = 2.0;
        BoundingPolygon::axis_aligned(
            Coord::new(min.x - PADDING, min.y - PADDING),
            Coord::new(max.x + PADDING, max.y + PADDING),
        )
    }

    pub fn vertices(&self) -> &[Coord] {
        &self.vertices
    }

    /// The polygon's edges as `(start, end)` pairs, in clockwise order.
    pub fn edges(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// Shoelace area; zero (within epsilon) or fewer than 3 distinct
    /// vertices means the polygon is degenerate.
    pub fn area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        let n = self.vertices.len();
        let sum: f64 = (0..n)
            .map(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();
        sum.abs() * 0.5
    }

    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3 || self.area() < crate::geometry::EPSILON
    }

    /// Ray-casting point-in-polygon test: cast a ray due east from
    /// `point` and count crossings, following
    /// `examples/original_source/polygon.py: Polygon.inside`.
    pub fn contains(&self, point: Coord) -> bool {
        let mut inside = false;
        let n = self.vertices.len();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let crosses = (a.y > point.y) != (b.y > point.y);
            if crosses {
                let x_at_y = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x_at_y {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// The point where the ray from `origin` in `direction` first leaves
    /// the polygon through one of its edges, plus that edge.
    pub fn ray_exit(&self, origin: Coord, direction: cgmath::Vector2<f64>) -> Option<(Coord, usize)> {
        self.edges()
            .enumerate()
            .filter_map(|(i, (p1, p2))| ray_segment_intersection(origin, direction, p1, p2).map(|pt| (pt, i)))
            .min_by(|(a, _), (b, _)| {
                let da = (*a - origin).x.hypot((*a - origin).y);
                let db = (*b - origin).x.hypot((*b - origin).y);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

fn centroid_of(points: &[Coord]) -> Coord {
    let n = points.len() as f64;
    let sum = points.iter().fold(Coord::new(0.0, 0.0), |acc, p| Coord::new(acc.x + p.x, acc.y + p.y));
    Coord::new(sum.x / n, sum.y / n)
}

fn sort_key(point: Coord, centroid: Coord) -> f64 {
    (-180.0 - angle_degrees(point, centroid)).rem_euclid(360.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn axis_aligned_rectangle_has_expected_area() {
        let poly = BoundingPolygon::axis_aligned(Coord::new(0.0, 0.0), Coord::new(2.0, 3.0));
        assert_abs_diff_eq!(poly.area(), 6.0, epsilon = 1e-9);
        assert!(!poly.is_degenerate());
    }

    #[test]
    fn default_for_sites_pads_bounding_box() {
        let poly = BoundingPolygon::default_for_sites(&[Coord::new(0.0, 0.0), Coord::new(4.0, 4.0)]);
        assert_abs_diff_eq!(poly.area(), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn contains_detects_interior_and_exterior_points() {
        let poly = BoundingPolygon::axis_aligned(Coord::new(0.0, 0.0), Coord::new(10.0, 10.0));
        assert!(poly.contains(Coord::new(5.0, 5.0)));
        assert!(!poly.contains(Coord::new(15.0, 5.0)));
    }

    #[test]
    fn degenerate_polygon_detected() {
        let poly = BoundingPolygon::new(vec![Coord::new(0.0, 0.0), Coord::new(1.0, 0.0)]);
        assert!(poly.is_degenerate());
    }

    #[test]
    fn ray_exit_hits_the_nearest_edge() {
        let poly = BoundingPolygon::axis_aligned(Coord::new(0.0, 0.0), Coord::new(10.0, 10.0));
        let (point, _edge) = poly.ray_exit(Coord::new(5.0, 5.0), cgmath::Vector2::new(1.0, 0.0)).unwrap();
        assert_abs_diff_eq!(point.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(point.y, 5.0, epsilon = 1e-9);
    }
}
