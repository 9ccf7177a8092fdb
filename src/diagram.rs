//! The doubly-connected edge list that is the final output of
//! [`crate::build_diagram`].
//!
//! Structurally this follows the teacher's `diagram.rs`: every node kind
//! lives in its own [`TypedVec`] arena and is referenced by a
//! [`TypedIndex`], so the graph's heavy cross-referencing (half-edge ↔
//! twin ↔ next/prev ↔ vertex ↔ site) never needs `Rc`/`RefCell`.

use crate::geometry::Coord;
use crate::polygon::BoundingPolygon;
use crate::status_tree::NodeIndex;
use crate::typedvector::{TypedIndex, TypedVec};

pub type SiteIndex = TypedIndex<Site>;
pub type VertexIndex = TypedIndex<Vertex>;
pub type HalfEdgeIndex = TypedIndex<HalfEdge>;

/// An input site together with its assigned name and one incident
/// half-edge of its Voronoi cell.
#[derive(Debug)]
pub struct Site {
    point: Coord,
    name: usize,
    first_edge: Option<HalfEdgeIndex>,
}

impl Site {
    fn new(point: Coord, name: usize) -> Self {
        Site {
            point,
            name,
            first_edge: None,
        }
    }

    pub fn point(&self) -> Coord {
        self.point
    }

    pub fn name(&self) -> usize {
        self.name
    }

    pub fn first_edge(&self) -> Option<HalfEdgeIndex> {
        self.first_edge
    }
}

/// A Voronoi vertex: a circle-event convergence point or a point where an
/// edge crosses the bounding polygon.
#[derive(Debug)]
pub struct Vertex {
    point: Coord,
    connected_edges: Vec<HalfEdgeIndex>,
}

impl Vertex {
    fn new(point: Coord) -> Self {
        Vertex {
            point,
            connected_edges: Vec::new(),
        }
    }

    pub fn point(&self) -> Coord {
        self.point
    }

    pub fn connected_edges(&self) -> &[HalfEdgeIndex] {
        &self.connected_edges
    }
}

/// A half-edge's origin, before and after it has a fixed location.
///
/// While the sweep is in progress a half-edge's origin is the breakpoint
/// that traces it out; once a circle event (or the boundary clipper)
/// fixes its location it becomes a concrete [`Vertex`] (spec.md §9,
/// "Transient polymorphic origin").
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Origin {
    Pending(NodeIndex),
    Fixed(VertexIndex),
}

/// A directed edge of the DCEL.
#[derive(Debug)]
pub struct HalfEdge {
    origin: Option<Origin>,
    incident_site: Option<SiteIndex>,
    twin: Option<HalfEdgeIndex>,
    next: Option<HalfEdgeIndex>,
    prev: Option<HalfEdgeIndex>,
    removed: bool,
}

impl HalfEdge {
    fn new(incident_site: Option<SiteIndex>, origin: Option<Origin>) -> Self {
        HalfEdge {
            origin,
            incident_site,
            twin: None,
            next: None,
            prev: None,
            removed: false,
        }
    }

    pub fn origin(&self) -> Option<Origin> {
        self.origin
    }

    pub fn incident_site(&self) -> Option<SiteIndex> {
        self.incident_site
    }

    pub fn twin(&self) -> Option<HalfEdgeIndex> {
        self.twin
    }

    pub fn next(&self) -> Option<HalfEdgeIndex> {
        self.next
    }

    pub fn prev(&self) -> Option<HalfEdgeIndex> {
        self.prev
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// An iterator around the half-edges bordering a single Voronoi cell.
pub struct EdgeIterator<'a> {
    diagram: &'a Diagram,
    start_edge: HalfEdgeIndex,
    current_edge: Option<HalfEdgeIndex>,
    done: bool,
}

impl<'a> Iterator for EdgeIterator<'a> {
    type Item = HalfEdgeIndex;

    fn next(&mut self) -> Option<HalfEdgeIndex> {
        if self.done {
            return None;
        }
        let edge = match self.current_edge {
            None => self.start_edge,
            Some(current) => match self.diagram.half_edge(current).next() {
                Some(next) if next != self.start_edge => next,
                _ => {
                    self.done = true;
                    return None;
                }
            },
        };
        self.current_edge = Some(edge);
        Some(edge)
    }
}

/// The final diagram: sites, vertices, half-edges and the bounding
/// polygon they were clipped to. Read-only once returned from
/// `build_diagram`.
#[derive(Debug)]
pub struct Diagram {
    sites: TypedVec<Site>,
    vertices: TypedVec<Vertex>,
    edges: TypedVec<HalfEdge>,
    bounding_poly: BoundingPolygon,
}

impl Diagram {
    pub(crate) fn new(bounding_poly: BoundingPolygon) -> Self {
        Diagram {
            sites: TypedVec::new(),
            vertices: TypedVec::new(),
            edges: TypedVec::new(),
            bounding_poly,
        }
    }

    pub(crate) fn add_site(&mut self, point: Coord, name: usize) -> SiteIndex {
        self.sites.insert(Site::new(point, name))
    }

    pub(crate) fn add_vertex(&mut self, point: Coord) -> VertexIndex {
        self.vertices.insert(Vertex::new(point))
    }

    pub(crate) fn add_edge_pair(
        &mut self,
        left_site: SiteIndex,
        right_site: SiteIndex,
        left_origin: Option<Origin>,
        right_origin: Option<Origin>,
    ) -> (HalfEdgeIndex, HalfEdgeIndex) {
        let left = self.edges.insert(HalfEdge::new(Some(left_site), left_origin));
        let right = self.edges.insert(HalfEdge::new(Some(right_site), right_origin));
        self.set_twin(left, right);
        self.set_twin(right, left);
        if self.site(left_site).first_edge.is_none() {
            self.site_mut(left_site).first_edge = Some(left);
        }
        if self.site(right_site).first_edge.is_none() {
            self.site_mut(right_site).first_edge = Some(right);
        }
        (left, right)
    }

    pub(crate) fn add_raw_half_edge(
        &mut self,
        incident_site: Option<SiteIndex>,
        origin: Option<Origin>,
    ) -> HalfEdgeIndex {
        let edge = self.edges.insert(HalfEdge::new(incident_site, origin));
        if let Some(site) = incident_site {
            if self.site(site).first_edge.is_none() {
                self.site_mut(site).first_edge = Some(edge);
            }
        }
        edge
    }

    fn set_twin(&mut self, edge: HalfEdgeIndex, twin: HalfEdgeIndex) {
        self.edges.get_mut(edge).unwrap().twin = Some(twin);
    }

    /// Link two independently-created half-edges as each other's twin, for
    /// the border edges `finish_polygon` builds one at a time rather than
    /// in a pair via [`Self::add_edge_pair`].
    pub(crate) fn link_twins(&mut self, a: HalfEdgeIndex, b: HalfEdgeIndex) {
        self.set_twin(a, b);
        self.set_twin(b, a);
    }

    pub(crate) fn set_origin(&mut self, edge: HalfEdgeIndex, origin: Origin) {
        self.edges.get_mut(edge).unwrap().origin = Some(origin);
    }

    pub(crate) fn link(&mut self, prev: HalfEdgeIndex, next: HalfEdgeIndex) {
        self.edges.get_mut(prev).unwrap().next = Some(next);
        self.edges.get_mut(next).unwrap().prev = Some(prev);
    }

    pub(crate) fn connect_vertex(&mut self, vertex: VertexIndex, edge: HalfEdgeIndex) {
        self.vertices.get_mut(vertex).unwrap().connected_edges.push(edge);
    }

    pub(crate) fn mark_removed(&mut self, edge: HalfEdgeIndex) {
        self.edges.get_mut(edge).unwrap().removed = true;
    }

    /// Reassign `site`'s `first_edge`, for when the edge it currently points
    /// at is spliced out of the face loop (`HalfEdge.delete()` in
    /// `examples/original_source/geometry.py`).
    pub(crate) fn set_first_edge(&mut self, site: SiteIndex, edge: HalfEdgeIndex) {
        self.site_mut(site).first_edge = Some(edge);
    }

    pub(crate) fn remove_connected_edge(&mut self, vertex: VertexIndex, edge: HalfEdgeIndex) {
        self.vertices
            .get_mut(vertex)
            .unwrap()
            .connected_edges
            .retain(|&e| e != edge);
    }

    fn site_mut(&mut self, index: SiteIndex) -> &mut Site {
        self.sites.get_mut(index).unwrap()
    }

    pub fn site(&self, index: SiteIndex) -> &Site {
        self.sites.get(index).unwrap()
    }

    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        self.vertices.get(index).unwrap()
    }

    pub fn half_edge(&self, index: HalfEdgeIndex) -> &HalfEdge {
        self.edges.get(index).unwrap()
    }

    pub fn sites(&self) -> impl Iterator<Item = (SiteIndex, &Site)> {
        self.sites.iter()
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexIndex, &Vertex)> {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (HalfEdgeIndex, &HalfEdge)> {
        self.edges.iter()
    }

    pub fn bounding_poly(&self) -> &BoundingPolygon {
        &self.bounding_poly
    }

    /// The resolved coordinate of a half-edge's origin. `None` for a
    /// half-edge whose origin was never fixed to a vertex (it was
    /// removed by the clipper).
    pub fn origin_point(&self, edge: HalfEdgeIndex) -> Option<Coord> {
        match self.half_edge(edge).origin() {
            Some(Origin::Fixed(v)) => Some(self.vertex(v).point()),
            _ => None,
        }
    }

    /// Iterate the half-edges bordering `site`'s cell, starting at its
    /// `first_edge`.
    ///
    /// # Panics
    /// If `site` has no `first_edge` (an empty/unclosed cell).
    pub fn cell_edges(&self, site: SiteIndex) -> EdgeIterator<'_> {
        let start_edge = self.site(site).first_edge.expect("site has no first_edge");
        EdgeIterator {
            diagram: self,
            start_edge,
            current_edge: None,
            done: false,
        }
    }

    /// The area of a site's cell via the shoelace formula.
    pub fn cell_area(&self, site: SiteIndex) -> f64 {
        self.cell_edges(site)
            .filter_map(|edge| {
                let origin = self.origin_point(edge)?;
                let twin = self.half_edge(edge).twin()?;
                let dest = self.origin_point(twin)?;
                Some(origin.x * dest.y - dest.x * origin.y)
            })
            .sum::<f64>()
            .abs()
            * 0.5
    }
}
