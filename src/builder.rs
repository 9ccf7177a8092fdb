//! The sweep driver: pulls events from the queue, dispatches them to the
//! site/circle handlers, then hands the half-finished diagram to the
//! bounding-polygon clipper (spec.md §4.4, §4.6, §4.8).
//!
//! Half-edge wiring order below follows
//! `examples/original_source/voronoi.py`'s `handle_site_event` /
//! `handle_circle_event` / `_update_breakpoints` exactly; this is the one
//! part of the algorithm where getting the order of operations wrong
//! produces a diagram that looks right on simple inputs and falls apart
//! on anything with more than a few sites.

use log::{debug, trace, warn};
use std::cell::Cell;
use std::rc::Rc;

use crate::diagram::{Diagram, HalfEdgeIndex, Origin, SiteIndex, VertexIndex};
use crate::error::ConstructionError;
use crate::event::{CircleEventData, Event, EventKind, EventQueue};
use crate::geometry::{breakpoint_intersection, circumcircle, is_clockwise, nearly_equal, Coord};
use crate::polygon::BoundingPolygon;
use crate::status_tree::{BreakpointData, NodeIndex, StatusTree};

/// Build the Voronoi diagram of `points`, clipped to `polygon` (or, if
/// `None`, the default axis-aligned box padded by 2 units around the
/// sites' bounding box).
pub fn build_diagram(points: &[Coord], polygon: Option<BoundingPolygon>) -> Result<Diagram, ConstructionError> {
    if points.is_empty() {
        return Err(ConstructionError::TooFewSites);
    }
    check_duplicates(points)?;

    let polygon = polygon.unwrap_or_else(|| BoundingPolygon::default_for_sites(points));
    if polygon.is_degenerate() {
        return Err(ConstructionError::DegeneratePolygon);
    }

    let mut builder = Builder::new(polygon);
    for (name, &point) in points.iter().enumerate() {
        let site = builder.diagram.add_site(point, name);
        builder.queue.push(Event::site(site, point));
    }

    builder.run();
    builder.finish_edges();
    builder.finish_polygon();
    builder.close_dangling_edges();
    builder.collapse_zero_length_edges();

    Ok(builder.diagram)
}

fn check_duplicates(points: &[Coord]) -> Result<(), ConstructionError> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .partial_cmp(&points[b].x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| points[a].y.partial_cmp(&points[b].y).unwrap_or(std::cmp::Ordering::Equal))
    });
    for window in order.windows(2) {
        let (a, b) = (points[window[0]], points[window[1]]);
        if nearly_equal(a.x, b.x) && nearly_equal(a.y, b.y) {
            return Err(ConstructionError::DuplicateSite { index: window[1] });
        }
    }
    Ok(())
}

struct Builder {
    diagram: Diagram,
    tree: StatusTree,
    queue: EventQueue,
    sweepline: f64,
}

impl Builder {
    fn new(polygon: BoundingPolygon) -> Self {
        Builder {
            diagram: Diagram::new(polygon),
            tree: StatusTree::new(),
            queue: EventQueue::new(),
            sweepline: f64::INFINITY,
        }
    }

    fn site_point(&self, site: SiteIndex) -> Coord {
        self.diagram.site(site).point()
    }

    fn run(&mut self) {
        while let Some(event) = self.queue.pop() {
            match event.kind {
                EventKind::Site { site, point } => {
                    self.sweepline = point.y;
                    trace!("site event at {:?}", point);
                    self.handle_site_event(site, point);
                }
                EventKind::Circle(data) => {
                    self.sweepline = data.center.y - data.radius;
                    trace!("circle event centered at {:?} r={}", data.center, data.radius);
                    self.handle_circle_event(&data);
                }
            }
        }
    }

    fn handle_site_event(&mut self, new_site: SiteIndex, new_point: Coord) {
        if self.tree.is_empty() {
            self.tree.insert_root_arc(new_site);
            return;
        }

        let arc = self
            .tree
            .find_arc_above(new_point.x, self.sweepline, |s| self.site_point(s));
        let q_site = self.tree.node(arc).as_arc().unwrap().site;
        let q_point = self.site_point(q_site);

        if let Some(weak) = &self.tree.node(arc).as_arc().unwrap().circle_event {
            if let Some(rc) = weak.upgrade() {
                rc.invalidate();
            }
        }

        let (left_bp, right_bp, left_q, middle_p, right_q) =
            self.tree.split_arc(arc, new_site, new_point, q_point);

        // The degenerate (same-height) split collapses both new edges onto a
        // single live breakpoint node. Give `right_edge` its own detached
        // snapshot rather than having it alias `left_bp` directly, so a
        // later circle event reusing `left_bp` for an unrelated adjacency
        // can't silently corrupt what `right_edge` still needs to resolve
        // against (spec.md §4.9 "Transient polymorphic origin").
        let right_origin_bp = right_bp.unwrap_or_else(|| {
            self.tree.insert_detached_breakpoint(BreakpointData {
                sites: (new_site, q_site),
                edge: None,
            })
        });

        let (left_edge, right_edge) = self.diagram.add_edge_pair(
            new_site,
            q_site,
            Some(Origin::Pending(left_bp)),
            Some(Origin::Pending(right_origin_bp)),
        );
        self.tree.node_mut(left_bp).as_breakpoint_mut().unwrap().edge = Some(left_edge);
        self.tree.node_mut(right_origin_bp).as_breakpoint_mut().unwrap().edge = Some(right_edge);

        let right_q = match right_q {
            Some(right_q) => right_q,
            None => return,
        };

        let predecessor = self.tree.predecessor_arc(left_q);
        let successor = self.tree.successor_arc(right_q);
        self.check_circles((predecessor, left_q, Some(middle_p)));
        self.check_circles((Some(middle_p), right_q, successor));
    }

    fn handle_circle_event(&mut self, data: &Rc<CircleEventData>) {
        if !data.is_valid.get() {
            return;
        }
        let arc_node = data.arc;
        let predecessor = match self.tree.predecessor_arc(arc_node) {
            Some(p) => p,
            None => return,
        };
        let successor = match self.tree.successor_arc(arc_node) {
            Some(s) => s,
            None => return,
        };

        let parent = self.tree.node(arc_node).parent.expect("arc_node is not the root");
        let was_left_child = self.tree.node(parent).left == Some(arc_node);
        let pred_site = self.tree.node(predecessor).as_arc().unwrap().site;
        let succ_site = self.tree.node(successor).as_arc().unwrap().site;
        let arc_site = self.tree.node(arc_node).as_arc().unwrap().site;

        let (removed_bp, _sibling) = self.tree.remove_arc(arc_node);

        // A missing adjacent breakpoint means this circle event is stale
        // under floating-point drift (`examples/original_source/voronoi.py:
        // _update_breakpoints` returns `updated = None` for the same
        // reason) — discard it silently rather than crash a valid-input
        // build.
        let updated_bp = if was_left_child {
            let found = match self.tree.find_value(|bp| bp.sites == (pred_site, arc_site)) {
                Some(f) => f,
                None => return,
            };
            self.tree.node_mut(found).as_breakpoint_mut().unwrap().sites = (pred_site, succ_site);
            found
        } else {
            let found = match self.tree.find_value(|bp| bp.sites == (arc_site, succ_site)) {
                Some(f) => f,
                None => return,
            };
            self.tree.node_mut(found).as_breakpoint_mut().unwrap().sites = (pred_site, succ_site);
            found
        };

        // Only invalidate the neighbors' predicted events once we know this
        // event isn't itself being discarded as stale, so a spurious event
        // can't wrongly clear two still-valid neighbor events
        // (`examples/original_source/voronoi.py:112-121`).
        self.invalidate_arc_event(predecessor);
        self.invalidate_arc_event(successor);

        let (left_bp, right_bp) = if was_left_child {
            (updated_bp, removed_bp)
        } else {
            (removed_bp, updated_bp)
        };

        let vertex = self.find_or_add_vertex(data.center);
        let removed_edge = self.tree.node(removed_bp).as_breakpoint().unwrap().edge.unwrap();
        let updated_edge = self.tree.node(updated_bp).as_breakpoint().unwrap().edge.unwrap();
        self.diagram.set_origin(removed_edge, Origin::Fixed(vertex));
        self.diagram.set_origin(updated_edge, Origin::Fixed(vertex));
        self.diagram.connect_vertex(vertex, removed_edge);
        self.diagram.connect_vertex(vertex, updated_edge);

        let (site_a, site_b) = self.tree.node(updated_bp).as_breakpoint().unwrap().sites;
        let (new_edge, new_edge_twin) =
            self.diagram
                .add_edge_pair(site_a, site_b, Some(Origin::Fixed(vertex)), Some(Origin::Pending(updated_bp)));
        self.diagram.connect_vertex(vertex, new_edge);

        let left_edge = self.tree.node(left_bp).as_breakpoint().unwrap().edge.unwrap();
        let right_edge = self.tree.node(right_bp).as_breakpoint().unwrap().edge.unwrap();
        let left_twin = self.diagram.half_edge(left_edge).twin().unwrap();
        let right_twin = self.diagram.half_edge(right_edge).twin().unwrap();
        self.diagram.link(left_twin, new_edge);
        self.diagram.link(right_twin, left_edge);
        self.diagram.link(new_edge_twin, right_edge);

        self.tree.node_mut(updated_bp).as_breakpoint_mut().unwrap().edge = Some(new_edge_twin);

        debug!("vertex {:?} resolved via arcs {:?}/{:?}/{:?}", data.center, pred_site, arc_site, succ_site);

        let left_triple_pred = self.tree.predecessor_arc(predecessor);
        let right_triple_succ = self.tree.successor_arc(successor);
        self.check_circles((left_triple_pred, predecessor, Some(successor)));
        self.check_circles((Some(predecessor), successor, right_triple_succ));
    }

    fn invalidate_arc_event(&mut self, arc: NodeIndex) {
        if let Some(weak) = &self.tree.node(arc).as_arc().unwrap().circle_event {
            if let Some(rc) = weak.upgrade() {
                rc.invalidate();
            }
        }
    }

    /// The circle predictor (spec.md §4.7): given a left/middle/right arc
    /// triple, compute the circumcircle of their sites and, if it is a
    /// real circle the beachline sweeps clockwise through, enqueue a
    /// circle event on the middle arc.
    fn check_circles(&mut self, triple: (Option<NodeIndex>, NodeIndex, Option<NodeIndex>)) {
        let (left, middle, right) = match triple {
            (Some(l), m, Some(r)) => (l, m, r),
            _ => return,
        };
        let a = self.tree.node(left).as_arc().unwrap().site;
        let b = self.tree.node(middle).as_arc().unwrap().site;
        let c = self.tree.node(right).as_arc().unwrap().site;
        if a == c {
            return;
        }
        let (pa, pb, pc) = (self.site_point(a), self.site_point(b), self.site_point(c));
        let (center, radius) = match circumcircle(pa, pb, pc) {
            Some(result) => result,
            None => return,
        };
        if !is_clockwise(pa, pb, pc, center) {
            return;
        }
        if center.y - radius > self.sweepline + 1e-9 {
            warn!("circle event predicted above current sweep line, discarding");
            return;
        }

        let data = Rc::new(CircleEventData {
            arc: middle,
            center,
            radius,
            is_valid: Cell::new(true),
        });
        self.tree.node_mut(middle).as_arc_mut().unwrap().circle_event = Some(Rc::downgrade(&data));
        trace!("circle event queued: center={:?} radius={} arcs={:?}/{:?}/{:?}", center, radius, a, b, c);
        self.queue.push(Event::circle(data));
    }

    /// Resolve every half-edge whose origin is still a beachline
    /// breakpoint (or a fixed vertex outside the polygon) against the
    /// bounding polygon, using a synthetic sweep-line far below the
    /// polygon so every breakpoint's asymptotic position is well-defined
    /// (`examples/original_source/polygon.py: finish_edges`/`_finish_edge`).
    fn finish_edges(&mut self) {
        let (min_y, max_y) = self.polygon_y_extent();
        let synthetic_sweep = min_y - max_y.abs();

        let all_edges: Vec<HalfEdgeIndex> = self.diagram.edges().map(|(i, _)| i).collect();
        for edge in all_edges {
            if !self.needs_clipping(edge) {
                continue;
            }
            let twin = self.diagram.half_edge(edge).twin().unwrap();
            let own = self.far_point(edge, twin, synthetic_sweep, max_y);
            let other = self.clip_origin(twin, synthetic_sweep, max_y);
            let direction = own - other;
            if direction.x.abs() < 1e-12 && direction.y.abs() < 1e-12 {
                continue;
            }
            if let Some((point, _)) = self.diagram.bounding_poly().ray_exit(other, direction) {
                let vertex = self.find_or_add_vertex(point);
                self.diagram.set_origin(edge, Origin::Fixed(vertex));
                self.diagram.connect_vertex(vertex, edge);
            } else {
                // `examples/original_source/polygon.py: _finish_edge` always
                // replaces the origin, falling back to an unresolved vertex
                // when no boundary crossing exists; that unresolved state is
                // what makes the second pass below drop the edge. Without
                // this, a `Fixed` origin that was already outside the
                // polygon (a genuine circumcenter the clip ray never
                // reaches) would be left in place and survive as a
                // resolved-but-out-of-bounds edge.
                self.diagram.mark_removed(edge);
                self.diagram.mark_removed(twin);
            }
        }

        let all_edges: Vec<HalfEdgeIndex> = self.diagram.edges().map(|(i, _)| i).collect();
        for edge in all_edges {
            if self.diagram.half_edge(edge).is_removed() {
                continue;
            }
            let twin = self.diagram.half_edge(edge).twin().unwrap();
            if !self.is_resolved(edge) || !self.is_resolved(twin) {
                self.diagram.mark_removed(edge);
                self.diagram.mark_removed(twin);
            }
        }
    }

    fn polygon_y_extent(&self) -> (f64, f64) {
        let ys: Vec<f64> = self.diagram.bounding_poly().vertices().iter().map(|p| p.y).collect();
        let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (min_y, max_y)
    }

    fn needs_clipping(&self, edge: HalfEdgeIndex) -> bool {
        match self.diagram.half_edge(edge).origin() {
            Some(Origin::Fixed(v)) => !self.diagram.bounding_poly().contains(self.diagram.vertex(v).point()),
            Some(Origin::Pending(_)) => true,
            None => true,
        }
    }

    /// Whether `edge`'s origin was ever pinned to a concrete point, which is
    /// all that matters for keeping an edge (`examples/original_source/
    /// polygon.py: finish_edges` only deletes edges whose origin is still
    /// `None` after clipping — a resolved point exactly on the polygon
    /// boundary is a perfectly good edge, just not one that `contains`'s
    /// ray-cast reliably calls "inside").
    fn is_resolved(&self, edge: HalfEdgeIndex) -> bool {
        matches!(self.diagram.half_edge(edge).origin(), Some(Origin::Fixed(_)))
    }

    /// Like [`Self::clip_origin`], but for a half-edge whose origin is still
    /// `Pending` on a breakpoint node that a later [`StatusTree::remove_arc`]
    /// has since bypassed (`!self.tree.is_live(bp)`) — a same-height
    /// breakpoint whose twin was fixed by the circle event that collapsed
    /// it out of the beachline. `breakpoint_intersection`'s same-height
    /// branch is the bisector's vertical line, monotone increasing in the
    /// sweep line parameter; a bypassed node's content is frozen at the
    /// moment it left the tree, so evaluating it at the far, very-negative
    /// `synthetic_sweep` walks *past* that moment into territory the
    /// breakpoint never actually reached, landing on the wrong side of the
    /// vertex. A breakpoint that is still live (merely never resolved by a
    /// second circle event before the sweep ended) has no such frozen
    /// moment to overshoot, so the ordinary very-negative evaluation is
    /// correct for it.
    fn far_point(&self, edge: HalfEdgeIndex, twin: HalfEdgeIndex, synthetic_sweep: f64, max_y: f64) -> Coord {
        if let Some(Origin::Pending(bp)) = self.diagram.half_edge(edge).origin() {
            let data = self.tree.node(bp).as_breakpoint().unwrap();
            let (site_a, site_b) = (self.site_point(data.sites.0), self.site_point(data.sites.1));
            if nearly_equal(site_a.y, site_b.y) && self.is_resolved(twin) && !self.tree.is_live(bp) {
                let epsilon = (1.0 + site_a.y.abs()) * 1e-6;
                let open_branch_sweep = site_a.y - epsilon;
                return breakpoint_intersection(site_a, site_b, open_branch_sweep, Some(max_y));
            }
        }
        self.clip_origin(edge, synthetic_sweep, max_y)
    }

    fn clip_origin(&self, edge: HalfEdgeIndex, synthetic_sweep: f64, max_y: f64) -> Coord {
        match self.diagram.half_edge(edge).origin() {
            Some(Origin::Fixed(v)) => self.diagram.vertex(v).point(),
            Some(Origin::Pending(bp)) => {
                let data = self.tree.node(bp).as_breakpoint().unwrap();
                breakpoint_intersection(
                    self.site_point(data.sites.0),
                    self.site_point(data.sites.1),
                    synthetic_sweep,
                    Some(max_y),
                )
            }
            None => unreachable!("every half-edge is constructed with an origin"),
        }
    }

    /// Close each cell's boundary along the bounding polygon by walking
    /// the polygon's vertices (its own corners plus the clip points
    /// `finish_edges` produced) in clockwise order and linking a new
    /// border half-edge between each consecutive pair
    /// (`examples/original_source/polygon.py: finish_polygon`).
    fn finish_polygon(&mut self) {
        let corners: Vec<Coord> = self.diagram.bounding_poly().vertices().to_vec();
        for corner in corners {
            self.find_or_add_vertex(corner);
        }

        let mut boundary_vertices: Vec<VertexIndex> = self
            .diagram
            .vertices()
            .filter(|(_, v)| {
                self.on_boundary(v.point())
            })
            .map(|(i, _)| i)
            .collect();

        if boundary_vertices.len() < 2 {
            return;
        }

        let centroid = {
            let pts: Vec<Coord> = boundary_vertices.iter().map(|&v| self.diagram.vertex(v).point()).collect();
            let n = pts.len() as f64;
            let sum = pts.iter().fold(Coord::new(0.0, 0.0), |acc, p| Coord::new(acc.x + p.x, acc.y + p.y));
            Coord::new(sum.x / n, sum.y / n)
        };
        boundary_vertices.sort_by(|&a, &b| {
            let ka = crate::geometry::angle_degrees(self.diagram.vertex(a).point(), centroid);
            let kb = crate::geometry::angle_degrees(self.diagram.vertex(b).point(), centroid);
            let key_a = (-180.0 - ka).rem_euclid(360.0);
            let key_b = (-180.0 - kb).rem_euclid(360.0);
            key_a.partial_cmp(&key_b).unwrap_or(std::cmp::Ordering::Equal)
        });

        let n = boundary_vertices.len();
        for i in 0..n {
            let origin = boundary_vertices[i];
            let end = boundary_vertices[(i + 1) % n];
            let incident_site = self
                .diagram
                .vertex(origin)
                .connected_edges()
                .first()
                .and_then(|&e| self.diagram.half_edge(e).twin())
                .and_then(|twin| self.diagram.half_edge(twin).incident_site())
                .unwrap_or_else(|| self.closest_site(self.diagram.vertex(origin).point()));

            let border_edge = self
                .diagram
                .add_raw_half_edge(Some(incident_site), Some(Origin::Fixed(origin)));
            let border_twin = self.diagram.add_raw_half_edge(None, Some(Origin::Fixed(end)));
            self.diagram.link_twins(border_edge, border_twin);
            self.diagram.connect_vertex(origin, border_edge);
            self.diagram.connect_vertex(end, border_twin);
        }
    }

    /// Reuse an existing vertex at `point` rather than creating a
    /// duplicate. Distinct circle events (or a circle event and a
    /// polygon corner) can resolve to the exact same coordinate — most
    /// visibly the degree-4 vertex at the center of four cocircular
    /// sites, where two circle events fire at the identical point — and
    /// without this dedup a cell's half-edge loop never closes back
    /// through what should be a single shared vertex.
    fn find_or_add_vertex(&mut self, point: Coord) -> VertexIndex {
        let existing = self
            .diagram
            .vertices()
            .find(|(_, v)| nearly_equal(v.point().x, point.x) && nearly_equal(v.point().y, point.y))
            .map(|(i, _)| i);
        existing.unwrap_or_else(|| self.diagram.add_vertex(point))
    }

    /// The input site nearest `point`, used as the initial cell assignment
    /// for whichever polygon corner is processed first in
    /// [`Self::finish_polygon`] (`examples/original_source/polygon.py:
    /// _get_closest_point`).
    fn closest_site(&self, point: Coord) -> SiteIndex {
        use cgmath::MetricSpace;
        self.diagram
            .sites()
            .min_by(|(_, a), (_, b)| {
                point
                    .distance2(a.point())
                    .partial_cmp(&point.distance2(b.point()))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .expect("at least one site exists")
    }

    /// Link every half-edge whose `next` is still unset (an internal ray
    /// that was clipped to the boundary, but whose continuation around its
    /// cell was never set since it didn't create the border edge itself)
    /// to the outgoing edge of the same cell at the vertex it points into.
    fn close_dangling_edges(&mut self) {
        let all_edges: Vec<HalfEdgeIndex> = self.diagram.edges().map(|(i, _)| i).collect();
        for edge in all_edges {
            if self.diagram.half_edge(edge).is_removed() || self.diagram.half_edge(edge).next().is_some() {
                continue;
            }
            let twin = match self.diagram.half_edge(edge).twin() {
                Some(t) => t,
                None => continue,
            };
            let endpoint = match self.diagram.half_edge(twin).origin() {
                Some(Origin::Fixed(v)) => v,
                _ => continue,
            };
            let incident = self.diagram.half_edge(edge).incident_site();
            let candidate = self
                .diagram
                .vertex(endpoint)
                .connected_edges()
                .iter()
                .copied()
                .find(|&e| e != twin && self.diagram.half_edge(e).incident_site() == incident);
            if let Some(next) = candidate {
                self.diagram.link(edge, next);
            }
        }
    }

    fn on_boundary(&self, point: Coord) -> bool {
        self.diagram
            .bounding_poly()
            .edges()
            .any(|(p1, p2)| point_on_segment(point, p1, p2))
    }

    /// Drop edges whose two endpoints coincide (spec.md §4.9): reroute
    /// everything connected to the disappearing vertex onto its twin's
    /// endpoint, then mark both halves removed.
    fn collapse_zero_length_edges(&mut self) {
        let pairs: Vec<(HalfEdgeIndex, HalfEdgeIndex)> = self
            .diagram
            .edges()
            .filter(|(_, e)| !e.is_removed())
            .filter_map(|(i, e)| e.twin().map(|t| (i, t)))
            .filter(|&(a, b)| a.into() < b.into())
            .collect();

        for (edge, twin) in pairs {
            if self.diagram.half_edge(edge).is_removed() {
                continue;
            }
            let start = self.diagram.origin_point(edge);
            let end = self.diagram.origin_point(twin);
            if let (Some(start), Some(end)) = (start, end) {
                if nearly_equal(start.x, end.x) && nearly_equal(start.y, end.y) {
                    if let (Some(Origin::Fixed(v1)), Some(Origin::Fixed(v2))) =
                        (self.diagram.half_edge(edge).origin(), self.diagram.half_edge(twin).origin())
                    {
                        let connected: Vec<HalfEdgeIndex> = self.diagram.vertex(v1).connected_edges().to_vec();
                        for connected_edge in connected {
                            if connected_edge == edge || connected_edge == twin {
                                continue;
                            }
                            self.diagram.set_origin(connected_edge, Origin::Fixed(v2));
                            self.diagram.remove_connected_edge(v1, connected_edge);
                            self.diagram.connect_vertex(v2, connected_edge);
                        }
                    }
                    self.reassign_first_edge_if_collapsed(edge);
                    self.reassign_first_edge_if_collapsed(twin);
                    self.diagram.mark_removed(edge);
                    self.diagram.mark_removed(twin);
                    self.bypass_in_face_loop(edge);
                    self.bypass_in_face_loop(twin);
                }
            }
        }
    }

    /// If `edge` is its incident site's `first_edge`, move that pointer to
    /// `edge`'s own successor, matching `HalfEdge.delete()` in
    /// `examples/original_source/geometry.py`. Otherwise a later `cell_edges`
    /// walk would start at an edge `bypass_in_face_loop` has spliced out of
    /// the cycle and never see `next == start_edge` again.
    fn reassign_first_edge_if_collapsed(&mut self, edge: HalfEdgeIndex) {
        if let Some(site) = self.diagram.half_edge(edge).incident_site() {
            if self.diagram.site(site).first_edge() == Some(edge) {
                if let Some(next) = self.diagram.half_edge(edge).next() {
                    self.diagram.set_first_edge(site, next);
                }
            }
        }
    }

    /// Splice a removed edge out of its face's `next`/`prev` chain so the
    /// cell loop continues straight from its predecessor to its successor.
    fn bypass_in_face_loop(&mut self, edge: HalfEdgeIndex) {
        let prev = self.diagram.half_edge(edge).prev();
        let next = self.diagram.half_edge(edge).next();
        if let (Some(prev), Some(next)) = (prev, next) {
            self.diagram.link(prev, next);
        }
    }
}

fn point_on_segment(point: Coord, a: Coord, b: Coord) -> bool {
    let cross = (point.x - a.x) * (b.y - a.y) - (point.y - a.y) * (b.x - a.x);
    if cross.abs() > 1e-7 {
        return false;
    }
    let dot = (point.x - a.x) * (b.x - a.x) + (point.y - a.y) * (b.y - a.y);
    let len_sq = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    dot >= -1e-9 && dot <= len_sq + 1e-9
}
