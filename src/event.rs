//! The sweep's priority queue (spec.md §4.3).
//!
//! Circle events are invalidated lazily: rather than reaching into a
//! priority queue to remove or re-key an entry when the arc it predicts
//! vanishes early (teacher's `event.rs` used `Rc<RefCell<Event>>` for the
//! same reason; `original_source/events.py` keeps an explicit `is_valid`
//! flag), we flip a shared `Cell<bool>` and let the stale event fall out
//! when it is eventually popped.

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::rc::Rc;

use crate::diagram::SiteIndex;
use crate::geometry::Coord;
use crate::status_tree::NodeIndex;

/// The arc that will vanish, the circumcenter that predicts when, and the
/// shared validity flag the beachline arc holds a [`std::rc::Weak`] to.
pub struct CircleEventData {
    pub arc: NodeIndex,
    pub center: Coord,
    pub radius: f64,
    pub is_valid: Cell<bool>,
}

impl CircleEventData {
    pub fn invalidate(&self) {
        self.is_valid.set(false);
    }
}

pub enum EventKind {
    Site { site: SiteIndex, point: Coord },
    Circle(Rc<CircleEventData>),
}

pub struct Event {
    pub y: f64,
    pub x: f64,
    pub kind: EventKind,
}

impl Event {
    pub fn site(site: SiteIndex, point: Coord) -> Self {
        Event {
            y: point.y,
            x: point.x,
            kind: EventKind::Site { site, point },
        }
    }

    /// The circle event fires when the sweep-line becomes tangent to the
    /// *bottom* of the circumcircle — `center.y - radius` — which is when
    /// the shrinking arc is guaranteed to have vanished.
    pub fn circle(data: Rc<CircleEventData>) -> Self {
        let y = data.center.y - data.radius;
        let x = data.center.x;
        Event {
            y,
            x,
            kind: EventKind::Circle(data),
        }
    }

    fn is_circle(&self) -> bool {
        matches!(self.kind, EventKind::Circle(_))
    }
}

/// Priority order (spec.md §3): highest `y` first; ties broken by lowest
/// `x`; remaining ties broken in favor of circle events over site events,
/// so a site landing exactly on a predicted vertex still collapses its
/// arc first.
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .partial_cmp(&other.y)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.x.partial_cmp(&self.x).unwrap_or(Ordering::Equal))
            .then_with(|| self.is_circle().cmp(&other.is_circle()))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// Wraps `BinaryHeap` (a max-heap) with [`Event`]'s `Ord` so that `pop`
/// always returns the event the sweep should handle next.
pub struct EventQueue {
    heap: BinaryHeap<Event>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue { heap: BinaryHeap::new() }
    }

    pub fn push(&mut self, event: Event) {
        self.heap.push(event);
    }

    /// Pop the next event, skipping (and dropping) any circle events that
    /// were invalidated after being enqueued.
    pub fn pop(&mut self) -> Option<Event> {
        loop {
            let event = self.heap.pop()?;
            if let EventKind::Circle(data) = &event.kind {
                if !data.is_valid.get() {
                    continue;
                }
            }
            return Some(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.iter().all(|e| match &e.kind {
            EventKind::Circle(data) => !data.is_valid.get(),
            EventKind::Site { .. } => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typedvector::TypedIndex;

    fn site_index(i: usize) -> SiteIndex {
        TypedIndex::new(i)
    }

    #[test]
    fn pops_highest_y_first() {
        let mut queue = EventQueue::new();
        queue.push(Event::site(site_index(0), Coord::new(0.0, 1.0)));
        queue.push(Event::site(site_index(1), Coord::new(0.0, 5.0)));
        let first = queue.pop().unwrap();
        assert_eq!(first.y, 5.0);
        let second = queue.pop().unwrap();
        assert_eq!(second.y, 1.0);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn circle_before_site_on_full_tie() {
        let mut queue = EventQueue::new();
        queue.push(Event::site(site_index(0), Coord::new(0.0, 0.0)));
        let circle_data = Rc::new(CircleEventData {
            arc: TypedIndex::new(0),
            center: Coord::new(0.0, 0.0),
            radius: 0.0,
            is_valid: Cell::new(true),
        });
        queue.push(Event::circle(circle_data));
        let first = queue.pop().unwrap();
        assert!(first.is_circle());
    }

    #[test]
    fn invalidated_circle_event_is_skipped() {
        let mut queue = EventQueue::new();
        let circle_data = Rc::new(CircleEventData {
            arc: TypedIndex::new(0),
            center: Coord::new(0.0, 0.0),
            radius: 1.0,
            is_valid: Cell::new(true),
        });
        circle_data.invalidate();
        queue.push(Event::circle(circle_data));
        assert!(queue.pop().is_none());
    }
}
