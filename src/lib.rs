#![warn(clippy::all)]
#![forbid(unsafe_code)]
//!# Docs
//!
//! A Rust implementation of
//! [Fortune's algorithm](https://en.wikipedia.org/wiki/Fortune%27s_algorithm) for building a
//! bounded [Voronoi diagram](https://en.wikipedia.org/wiki/Voronoi_diagram) of the plane.
//!
//!## Implementation Details
//! The sweep is entirely safe Rust: the beachline, event queue and DCEL are
//! all arena-backed and referenced via typed indices, so there is no
//! `unsafe`, no `Rc<RefCell<_>>` cycle for the graph itself, and no node is
//! ever physically freed mid-construction.
//!
//! Sites may be supplied in any units; the diagram is clipped to a convex
//! bounding polygon, either user-supplied or derived automatically as the
//! sites' bounding box padded by 2 units.
//!
//!## Example Usage
//!
//! ```rust
//! use voronoi_sweep::geometry::Coord;
//!
//! let points = vec![Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(0.5, 1.0)];
//! let diagram = voronoi_sweep::build_diagram(&points, None).unwrap();
//! assert_eq!(diagram.sites().count(), 3);
//! ```

mod builder;
pub mod diagram;
pub mod error;
pub mod event;
pub mod geometry;
pub mod polygon;
pub mod status_tree;
pub mod typedvector;

pub use builder::build_diagram;
pub use diagram::Diagram;
pub use error::ConstructionError;
pub use polygon::BoundingPolygon;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geometry::Coord;
    use rand::Rng;

    /// Scenario 1 (spec §8): three sites forming a wide isoceles triangle
    /// produce three cells whose areas sum to the polygon's area.
    #[test]
    fn three_sites_produce_three_cells_summing_to_polygon_area() {
        let points = vec![Coord::new(1.0, 1.0), Coord::new(5.0, 5.0), Coord::new(9.0, 1.0)];
        let diagram = build_diagram(&points, None).unwrap();
        assert_eq!(diagram.sites().count(), 3);
        let total_area: f64 = diagram.sites().map(|(s, _)| diagram.cell_area(s)).sum();
        assert_abs_diff_eq!(total_area, diagram.bounding_poly().area(), epsilon = 1e-6);
    }

    /// Scenario 2 (spec §8): the exact circumcircle of a right isoceles
    /// triangle, cross-checked independently in `geometry::tests`.
    #[test]
    fn right_isoceles_triangle_circumcircle_matches_expected_center() {
        let (center, radius) = geometry::circumcircle(
            Coord::new(0.0, 0.0),
            Coord::new(1.0, 0.0),
            Coord::new(0.5, 1.0),
        )
        .unwrap();
        assert_abs_diff_eq!(center.x, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(center.y, 0.375, epsilon = 1e-9);
        assert_abs_diff_eq!(radius * radius, 0.390625, epsilon = 1e-9);
    }

    /// Scenario 3 (spec §8): a unit square of sites in a padded square
    /// polygon produces a single internal vertex at the square's center
    /// and four equal-area cells.
    #[test]
    fn square_of_sites_produces_central_vertex_and_equal_cells() {
        let points = vec![
            Coord::new(0.0, 0.0),
            Coord::new(2.0, 0.0),
            Coord::new(0.0, 2.0),
            Coord::new(2.0, 2.0),
        ];
        let polygon = BoundingPolygon::new(vec![
            Coord::new(-1.0, -1.0),
            Coord::new(3.0, -1.0),
            Coord::new(3.0, 3.0),
            Coord::new(-1.0, 3.0),
        ]);
        let diagram = build_diagram(&points, Some(polygon)).unwrap();

        let has_central_vertex = diagram
            .vertices()
            .any(|(_, v)| (v.point().x - 1.0).abs() < 1e-6 && (v.point().y - 1.0).abs() < 1e-6);
        assert!(has_central_vertex, "expected a vertex at (1, 1)");

        let areas: Vec<f64> = diagram.sites().map(|(s, _)| diagram.cell_area(s)).collect();
        for area in &areas {
            assert_abs_diff_eq!(*area, 4.0, epsilon = 1e-6);
        }
    }

    /// Scenario 4 (spec §8): sites arranged evenly on a circle converge to
    /// a single vertex at the circle's center with equal-area cells.
    ///
    /// The bounding polygon is a regular 60-gon, not the auto-derived
    /// bounding box: a square only shares a 4-element symmetry subgroup
    /// with 10 sites spaced 36 degrees apart, so clipping against it would
    /// split the cells into unequal-area orbits for reasons having nothing
    /// to do with the sweep itself. A regular polygon with a multiple of
    /// 10 sides preserves the full rotational symmetry of the site set.
    #[test]
    fn sites_on_a_circle_share_a_central_vertex() {
        let center = Coord::new(50.0, 50.0);
        let radius = 40.0;
        let n = 10;
        let points: Vec<Coord> = (0..n)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
                Coord::new(center.x + radius * theta.cos(), center.y + radius * theta.sin())
            })
            .collect();
        let boundary_sides = 60;
        let boundary_radius = 70.0;
        let boundary: Vec<Coord> = (0..boundary_sides)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * (i as f64) / (boundary_sides as f64);
                Coord::new(
                    center.x + boundary_radius * theta.cos(),
                    center.y + boundary_radius * theta.sin(),
                )
            })
            .collect();
        let polygon = BoundingPolygon::new(boundary);
        let diagram = build_diagram(&points, Some(polygon)).unwrap();

        let has_central_vertex = diagram
            .vertices()
            .any(|(_, v)| (v.point().x - center.x).abs() < 1e-6 && (v.point().y - center.y).abs() < 1e-6);
        assert!(has_central_vertex, "expected a vertex at the circle's center");

        let areas: Vec<f64> = diagram.sites().map(|(s, _)| diagram.cell_area(s)).collect();
        let mean = areas.iter().sum::<f64>() / areas.len() as f64;
        for area in &areas {
            assert_abs_diff_eq!(*area, mean, epsilon = 1e-3);
        }
    }

    /// Scenario 5 (spec §8): a 3x3 grid of sites produces the four
    /// expected interior vertices of the axis-aligned cross pattern.
    #[test]
    fn grid_of_sites_produces_expected_interior_vertices() {
        let mut points = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                points.push(Coord::new((col * 10) as f64, (row * 10) as f64));
            }
        }
        let diagram = build_diagram(&points, None).unwrap();
        for (x, y) in [(5.0, 5.0), (15.0, 5.0), (5.0, 15.0), (15.0, 15.0)] {
            let found = diagram
                .vertices()
                .any(|(_, v)| (v.point().x - x).abs() < 1e-6 && (v.point().y - y).abs() < 1e-6);
            assert!(found, "expected an interior vertex at ({x}, {y})", x = x, y = y);
        }
    }

    /// Scenario 6 (spec §8): duplicate sites are a hard construction error.
    #[test]
    fn duplicate_sites_are_rejected() {
        let points = vec![Coord::new(0.0, 0.0), Coord::new(0.0, 0.0)];
        let err = build_diagram(&points, None).unwrap_err();
        assert_eq!(err, ConstructionError::DuplicateSite { index: 1 });
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = build_diagram(&[], None).unwrap_err();
        assert_eq!(err, ConstructionError::TooFewSites);
    }

    #[test]
    fn single_site_produces_one_cell_equal_to_the_polygon() {
        let points = vec![Coord::new(0.0, 0.0)];
        let diagram = build_diagram(&points, None).unwrap();
        assert_eq!(diagram.sites().count(), 1);
    }

    /// Randomized smoke test: every non-removed half-edge's fixed origins
    /// land inside (or on) the bounding polygon (invariant 1, spec §8).
    #[test]
    fn random_points_keep_every_resolved_origin_inside_the_polygon() {
        let mut rng = rand::thread_rng();
        let points: Vec<Coord> = (0..40)
            .map(|_| Coord::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)))
            .collect();
        let diagram = build_diagram(&points, None).unwrap();
        for (_, edge) in diagram.edges() {
            if edge.is_removed() {
                continue;
            }
            if let diagram::Origin::Fixed(v) = edge.origin().unwrap() {
                let point = diagram.vertex(v).point();
                let poly = diagram.bounding_poly();
                assert!(
                    poly.contains(point) || on_any_edge(poly, point),
                    "vertex {point:?} outside polygon",
                    point = point
                );
            }
        }
    }

    fn on_any_edge(poly: &BoundingPolygon, point: Coord) -> bool {
        poly.edges().any(|(a, b)| {
            let cross = (point.x - a.x) * (b.y - a.y) - (point.y - a.y) * (b.x - a.x);
            cross.abs() < 1e-6
        })
    }
}
