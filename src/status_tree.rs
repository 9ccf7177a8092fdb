//! The beachline status structure: an AVL-balanced binary tree over arena
//! indices (spec.md §4.2).
//!
//! Leaves hold [`ArcData`] (one parabolic arc of the beachline); internal
//! nodes hold [`BreakpointData`] (the traced-out edge between two
//! neighboring arcs). A breakpoint's x-coordinate is never cached — it is
//! recomputed from its two sites and the current sweep-line every time it
//! is needed, since the sweep-line advances between queries.

use std::rc::Weak;

use crate::diagram::{HalfEdgeIndex, SiteIndex};
use crate::event::CircleEventData;
use crate::geometry::{breakpoint_intersection, does_intersect, Coord};
use crate::typedvector::{TypedIndex, TypedVec};

pub type NodeIndex = TypedIndex<Node>;

pub struct ArcData {
    pub site: SiteIndex,
    pub left_edge: Option<HalfEdgeIndex>,
    pub right_edge: Option<HalfEdgeIndex>,
    pub circle_event: Option<Weak<CircleEventData>>,
}

impl ArcData {
    fn new(site: SiteIndex) -> Self {
        ArcData {
            site,
            left_edge: None,
            right_edge: None,
            circle_event: None,
        }
    }
}

pub struct BreakpointData {
    pub sites: (SiteIndex, SiteIndex),
    pub edge: Option<HalfEdgeIndex>,
}

pub enum Content {
    Arc(ArcData),
    Breakpoint(BreakpointData),
}

pub struct Node {
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
    height: i32,
    pub content: Content,
}

impl Node {
    fn leaf(content: ArcData) -> Self {
        Node {
            parent: None,
            left: None,
            right: None,
            height: 0,
            content: Content::Arc(content),
        }
    }

    fn internal(content: BreakpointData) -> Self {
        Node {
            parent: None,
            left: None,
            right: None,
            height: 1,
            content: Content::Breakpoint(content),
        }
    }

    pub fn as_arc(&self) -> Option<&ArcData> {
        match &self.content {
            Content::Arc(a) => Some(a),
            Content::Breakpoint(_) => None,
        }
    }

    pub fn as_arc_mut(&mut self) -> Option<&mut ArcData> {
        match &mut self.content {
            Content::Arc(a) => Some(a),
            Content::Breakpoint(_) => None,
        }
    }

    pub fn as_breakpoint(&self) -> Option<&BreakpointData> {
        match &self.content {
            Content::Breakpoint(b) => Some(b),
            Content::Arc(_) => None,
        }
    }

    pub fn as_breakpoint_mut(&mut self) -> Option<&mut BreakpointData> {
        match &mut self.content {
            Content::Breakpoint(b) => Some(b),
            Content::Arc(_) => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, Content::Arc(_))
    }
}

/// The beachline. An empty tree (`root == None`) represents "sweep hasn't
/// started" / "no arcs remain".
pub struct StatusTree {
    nodes: TypedVec<Node>,
    root: Option<NodeIndex>,
}

impl Default for StatusTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTree {
    pub fn new() -> Self {
        StatusTree {
            nodes: TypedVec::new(),
            root: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        self.nodes.get(index).unwrap()
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        self.nodes.get_mut(index).unwrap()
    }

    /// Insert a breakpoint node that is never linked into the tree
    /// structure: a frozen snapshot for a half-edge to reference when its
    /// own breakpoint is about to be reused for an unrelated pair of sites.
    /// The degenerate (same-height) branch of [`Self::split_arc`] shares a
    /// single live node between both of a new arc's edges, so once a later
    /// circle event repurposes that node for a different adjacency, the
    /// *other* edge's `Origin::Pending` would silently start reading the
    /// wrong sites. [`Self::is_live`] always reports `false` for a node
    /// inserted here, since nothing ever points down to it.
    pub fn insert_detached_breakpoint(&mut self, data: BreakpointData) -> NodeIndex {
        self.nodes.insert(Node::internal(data))
    }

    /// Insert the very first arc when the tree is empty.
    pub fn insert_root_arc(&mut self, site: SiteIndex) -> NodeIndex {
        let node = self.nodes.insert(Node::leaf(ArcData::new(site)));
        self.root = Some(node);
        node
    }

    /// Locate the leaf (arc) whose parabola is directly above `x` at the
    /// current `sweepline`, walking down from the root by comparing `x`
    /// against each breakpoint's current x-intersection.
    pub fn find_arc_above(&self, x: f64, sweepline: f64, site_point: impl Fn(SiteIndex) -> Coord) -> NodeIndex {
        let mut current = self.root.expect("find_arc_above called on empty tree");
        loop {
            let node = self.node(current);
            match &node.content {
                Content::Arc(_) => return current,
                Content::Breakpoint(bp) => {
                    let (left_site, right_site) = bp.sites;
                    let bp_x = breakpoint_intersection(
                        site_point(left_site),
                        site_point(right_site),
                        sweepline,
                        None,
                    )
                    .x;
                    current = if x < bp_x {
                        node.left.unwrap()
                    } else {
                        node.right.unwrap()
                    };
                }
            }
        }
    }

    /// Replace the leaf `arc` with the subtree produced by a site event
    /// landing inside it (spec.md §4.5). In the usual case this is the
    /// 3-arc subtree `new(left=q, right=new(left=p, right=q))` where `p`
    /// is the new site and `q` is the arc being split; when `q` and `p`
    /// sit at the same height with `p` to `q`'s right (the `does_intersect`
    /// guard of `examples/original_source/beachline.py`), the right-hand
    /// breakpoint degenerates and only `new(left=q, right=p)` is built —
    /// there is no third arc, since the beachline has no room for `q` to
    /// reappear to the right of a zero-width arc.
    ///
    /// Returns the left breakpoint, the (optional) right breakpoint, the
    /// left `q` arc, the middle `p` arc, and the (optional) right `q` arc.
    pub fn split_arc(
        &mut self,
        arc: NodeIndex,
        new_site: SiteIndex,
        new_site_point: Coord,
        q_point: Coord,
    ) -> (NodeIndex, Option<NodeIndex>, NodeIndex, NodeIndex, Option<NodeIndex>) {
        let q_site = self.node(arc).as_arc().unwrap().site;
        let parent = self.node(arc).parent;
        let was_left_child = parent.map(|p| self.node(p).left == Some(arc));

        let left_q = self.nodes.insert(Node::leaf(ArcData::new(q_site)));
        let middle_p = self.nodes.insert(Node::leaf(ArcData::new(new_site)));

        let right_intersects = does_intersect(new_site_point, q_point);

        let (left_bp_right_child, right_bp, right_q) = if right_intersects {
            let right_q = self.nodes.insert(Node::leaf(ArcData::new(q_site)));
            let right_bp = self.nodes.insert(Node::internal(BreakpointData {
                sites: (new_site, q_site),
                edge: None,
            }));
            self.attach(right_bp, middle_p, right_q);
            (right_bp, Some(right_bp), Some(right_q))
        } else {
            (middle_p, None, None)
        };

        let left_bp = self.nodes.insert(Node::internal(BreakpointData {
            sites: (q_site, new_site),
            edge: None,
        }));
        self.attach(left_bp, left_q, left_bp_right_child);

        self.nodes.get_mut(left_bp).unwrap().parent = parent;
        match (parent, was_left_child) {
            (Some(p), Some(true)) => self.nodes.get_mut(p).unwrap().left = Some(left_bp),
            (Some(p), Some(false)) => self.nodes.get_mut(p).unwrap().right = Some(left_bp),
            (None, _) => self.root = Some(left_bp),
            _ => unreachable!(),
        }

        self.propagate_height(parent.unwrap_or(left_bp));
        self.rebalance_to_root(left_bp);

        (left_bp, right_bp, left_q, middle_p, right_q)
    }

    fn attach(&mut self, parent: NodeIndex, left: NodeIndex, right: NodeIndex) {
        self.nodes.get_mut(parent).unwrap().left = Some(left);
        self.nodes.get_mut(parent).unwrap().right = Some(right);
        self.nodes.get_mut(left).unwrap().parent = Some(parent);
        self.nodes.get_mut(right).unwrap().parent = Some(parent);
    }

    /// Remove a leaf and the breakpoint directly above it during a circle
    /// event (spec.md §4.6): the leaf's sibling subtree takes the place
    /// of its parent breakpoint. Returns the breakpoint that disappears
    /// (needed by the caller to finish that breakpoint's edge) and the
    /// surviving sibling.
    pub fn remove_arc(&mut self, arc: NodeIndex) -> (NodeIndex, NodeIndex) {
        let parent = self.node(arc).parent.expect("cannot remove the root arc");
        let sibling = if self.node(parent).left == Some(arc) {
            self.node(parent).right.unwrap()
        } else {
            self.node(parent).left.unwrap()
        };
        let grandparent = self.node(parent).parent;

        self.nodes.get_mut(sibling).unwrap().parent = grandparent;
        match grandparent {
            Some(gp) => {
                if self.node(gp).left == Some(parent) {
                    self.nodes.get_mut(gp).unwrap().left = Some(sibling);
                } else {
                    self.nodes.get_mut(gp).unwrap().right = Some(sibling);
                }
            }
            None => self.root = Some(sibling),
        }

        self.propagate_height(grandparent.unwrap_or(sibling));
        self.rebalance_to_root(sibling);
        (parent, sibling)
    }

    /// Whether `node` is still reachable from the root, i.e. its subtree
    /// was not bypassed by a later [`Self::remove_arc`]. `remove_arc` never
    /// clears the detached breakpoint's own `parent` pointer, only the
    /// grandparent's child slot that used to lead down to it, so walking
    /// up via `parent` alone can't tell live from stale — each step must
    /// also check that the parent still points back down.
    pub fn is_live(&self, node: NodeIndex) -> bool {
        let mut current = node;
        loop {
            match self.node(current).parent {
                Some(parent) => {
                    if self.node(parent).left != Some(current) && self.node(parent).right != Some(current) {
                        return false;
                    }
                    current = parent;
                }
                None => return self.root == Some(current),
            }
        }
    }

    /// The arc immediately to the left of `node` in in-order sequence:
    /// walk up until `node` is a right child, then descend into the
    /// left sibling's right spine.
    pub fn predecessor_arc(&self, node: NodeIndex) -> Option<NodeIndex> {
        let mut current = node;
        loop {
            let parent = self.node(current).parent?;
            if self.node(parent).right == Some(current) {
                let mut n = self.node(parent).left.unwrap();
                while let Some(right) = self.node(n).right {
                    n = right;
                }
                return Some(n);
            }
            current = parent;
        }
    }

    /// The arc immediately to the right of `node` in in-order sequence.
    pub fn successor_arc(&self, node: NodeIndex) -> Option<NodeIndex> {
        let mut current = node;
        loop {
            let parent = self.node(current).parent?;
            if self.node(parent).left == Some(current) {
                let mut n = self.node(parent).right.unwrap();
                while let Some(left) = self.node(n).left {
                    n = left;
                }
                return Some(n);
            }
            current = parent;
        }
    }

    /// Full-tree search for the breakpoint satisfying `predicate`, used by
    /// `update_breakpoints` (spec.md §4.6.1) to find the other breakpoint
    /// that traces the same pair of sites as a vanishing arc's two edges.
    pub fn find_value(&self, predicate: impl Fn(&BreakpointData) -> bool) -> Option<NodeIndex> {
        self.root.and_then(|root| self.find_value_from(root, &predicate))
    }

    fn find_value_from(&self, node: NodeIndex, predicate: &impl Fn(&BreakpointData) -> bool) -> Option<NodeIndex> {
        match &self.node(node).content {
            Content::Arc(_) => None,
            Content::Breakpoint(bp) => {
                if predicate(bp) {
                    return Some(node);
                }
                let n = self.node(node);
                n.left
                    .and_then(|l| self.find_value_from(l, predicate))
                    .or_else(|| n.right.and_then(|r| self.find_value_from(r, predicate)))
            }
        }
    }

    /// In-order collection of all leaves, left to right.
    pub fn arcs_in_order(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_arcs(root, &mut out);
        }
        out
    }

    fn collect_arcs(&self, node: NodeIndex, out: &mut Vec<NodeIndex>) {
        let n = self.node(node);
        match &n.content {
            Content::Arc(_) => out.push(node),
            Content::Breakpoint(_) => {
                self.collect_arcs(n.left.unwrap(), out);
                self.collect_arcs(n.right.unwrap(), out);
            }
        }
    }

    fn height(&self, node: Option<NodeIndex>) -> i32 {
        node.map(|n| self.node(n).height).unwrap_or(-1)
    }

    fn balance_factor(&self, node: NodeIndex) -> i32 {
        self.height(self.node(node).left) - self.height(self.node(node).right)
    }

    fn update_height(&mut self, node: NodeIndex) {
        let h = 1 + self.height(self.node(node).left).max(self.height(self.node(node).right));
        self.nodes.get_mut(node).unwrap().height = h;
    }

    fn propagate_height(&mut self, from: NodeIndex) {
        let mut current = Some(from);
        while let Some(n) = current {
            if self.node(n).is_leaf() {
                current = self.node(n).parent;
                continue;
            }
            self.update_height(n);
            current = self.node(n).parent;
        }
    }

    /// Rebalance every breakpoint ancestor of `from` up to the root.
    fn rebalance_to_root(&mut self, from: NodeIndex) {
        let mut current = self.node(from).parent;
        while let Some(n) = current {
            let next = self.node(n).parent;
            self.rebalance_at(n);
            current = next;
        }
    }

    fn rebalance_at(&mut self, node: NodeIndex) {
        self.update_height(node);
        let balance = self.balance_factor(node);
        if balance > 1 {
            let left = self.node(node).left.unwrap();
            if self.balance_factor(left) < 0 {
                self.rotate_left(left);
            }
            self.rotate_right(node);
        } else if balance < -1 {
            let right = self.node(node).right.unwrap();
            if self.balance_factor(right) > 0 {
                self.rotate_right(right);
            }
            self.rotate_left(node);
        }
    }

    fn replace_child(&mut self, parent: Option<NodeIndex>, old: NodeIndex, new: NodeIndex) {
        match parent {
            Some(p) => {
                if self.node(p).left == Some(old) {
                    self.nodes.get_mut(p).unwrap().left = Some(new);
                } else {
                    self.nodes.get_mut(p).unwrap().right = Some(new);
                }
            }
            None => self.root = Some(new),
        }
    }

    fn rotate_left(&mut self, node: NodeIndex) {
        let pivot = self.node(node).right.unwrap();
        let parent = self.node(node).parent;
        let pivot_left = self.node(pivot).left;

        self.nodes.get_mut(node).unwrap().right = pivot_left;
        if let Some(pl) = pivot_left {
            self.nodes.get_mut(pl).unwrap().parent = Some(node);
        }

        self.nodes.get_mut(pivot).unwrap().left = Some(node);
        self.nodes.get_mut(node).unwrap().parent = Some(pivot);

        self.nodes.get_mut(pivot).unwrap().parent = parent;
        self.replace_child(parent, node, pivot);

        self.update_height(node);
        self.update_height(pivot);
    }

    fn rotate_right(&mut self, node: NodeIndex) {
        let pivot = self.node(node).left.unwrap();
        let parent = self.node(node).parent;
        let pivot_right = self.node(pivot).right;

        self.nodes.get_mut(node).unwrap().left = pivot_right;
        if let Some(pr) = pivot_right {
            self.nodes.get_mut(pr).unwrap().parent = Some(node);
        }

        self.nodes.get_mut(pivot).unwrap().right = Some(node);
        self.nodes.get_mut(node).unwrap().parent = Some(pivot);

        self.nodes.get_mut(pivot).unwrap().parent = parent;
        self.replace_child(parent, node, pivot);

        self.update_height(node);
        self.update_height(pivot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::Diagram;
    use crate::polygon::BoundingPolygon;

    fn sample_diagram() -> (Diagram, Vec<SiteIndex>) {
        let poly = BoundingPolygon::axis_aligned(Coord::new(-10.0, -10.0), Coord::new(10.0, 10.0));
        let mut diagram = Diagram::new(poly);
        let sites = vec![
            diagram.add_site(Coord::new(0.0, 10.0), 0),
            diagram.add_site(Coord::new(4.0, 0.0), 1),
            diagram.add_site(Coord::new(2.0, 2.0), 2),
        ];
        (diagram, sites)
    }

    #[test]
    fn split_arc_preserves_in_order_sequence() {
        let (diagram, sites) = sample_diagram();
        let mut tree = StatusTree::new();
        let root = tree.insert_root_arc(sites[0]);
        let (_, _, left, middle, right) = tree.split_arc(
            root,
            sites[1],
            diagram.site(sites[1]).point(),
            diagram.site(sites[0]).point(),
        );
        let right = right.unwrap();
        assert_eq!(tree.arcs_in_order(), vec![left, middle, right]);
        assert_eq!(tree.node(left).as_arc().unwrap().site, sites[0]);
        assert_eq!(tree.node(middle).as_arc().unwrap().site, sites[1]);
        assert_eq!(tree.node(right).as_arc().unwrap().site, sites[0]);
    }

    #[test]
    fn remove_arc_collapses_parent_breakpoint() {
        let (diagram, sites) = sample_diagram();
        let mut tree = StatusTree::new();
        let root = tree.insert_root_arc(sites[0]);
        let (_, _, left, middle, right) = tree.split_arc(
            root,
            sites[1],
            diagram.site(sites[1]).point(),
            diagram.site(sites[0]).point(),
        );
        let right = right.unwrap();
        let (_removed_bp, sibling) = tree.remove_arc(middle);
        assert_eq!(sibling, right);
        assert_eq!(tree.arcs_in_order(), vec![left, right]);
    }

    #[test]
    fn predecessor_and_successor_walk_parent_chain() {
        let (diagram, sites) = sample_diagram();
        let mut tree = StatusTree::new();
        let root = tree.insert_root_arc(sites[0]);
        let (_, _, left, middle, right) = tree.split_arc(
            root,
            sites[1],
            diagram.site(sites[1]).point(),
            diagram.site(sites[0]).point(),
        );
        let right = right.unwrap();
        assert_eq!(tree.predecessor_arc(middle), Some(left));
        assert_eq!(tree.successor_arc(middle), Some(right));
        assert_eq!(tree.predecessor_arc(left), None);
        assert_eq!(tree.successor_arc(right), None);
    }

    #[test]
    fn find_value_locates_matching_breakpoint() {
        let (diagram, sites) = sample_diagram();
        let mut tree = StatusTree::new();
        let root = tree.insert_root_arc(sites[0]);
        let (left_bp, right_bp, ..) = tree.split_arc(
            root,
            sites[1],
            diagram.site(sites[1]).point(),
            diagram.site(sites[0]).point(),
        );
        let right_bp = right_bp.unwrap();
        let found = tree.find_value(|bp| bp.sites == (sites[1], sites[0]));
        assert_eq!(found, Some(right_bp));
        let found = tree.find_value(|bp| bp.sites == (sites[0], sites[1]));
        assert_eq!(found, Some(left_bp));
    }
}
