use thiserror::Error;

/// Reasons `build_diagram` refuses to construct a [`crate::diagram::Diagram`].
///
/// Per the degenerate-input taxonomy, construction either succeeds fully or
/// fails with one of these variants; no partial diagram is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    /// Two input sites share the same coordinate.
    #[error("duplicate site at index {index} (coincides with an earlier site)")]
    DuplicateSite { index: usize },

    /// Fewer than one site was supplied.
    #[error("at least one site is required to build a diagram")]
    TooFewSites,

    /// The bounding polygon has fewer than 3 distinct vertices or
    /// (near-)zero area.
    #[error("bounding polygon is degenerate (non-convex or zero-area)")]
    DegeneratePolygon,
}
