use log::info;
use voronoi_sweep::geometry::Coord;

/// Builds a small diagram from a handful of sites and logs a summary of
/// each cell. Run with `RUST_LOG=debug` to see the sweep driver's
/// event-by-event trace.
fn main() {
    env_logger::init();

    let points = vec![
        Coord::new(0.7, 0.5),
        Coord::new(0.2, 0.2),
        Coord::new(0.4, 0.3),
        Coord::new(0.8, 0.9),
    ];

    let diagram = voronoi_sweep::build_diagram(&points, None).expect("valid input");

    info!("built diagram with {} sites, {} vertices", diagram.sites().count(), diagram.vertices().count());
    for (site, data) in diagram.sites() {
        info!("site {} at {:?}: area {:.4}", data.name(), data.point(), diagram.cell_area(site));
    }
}
