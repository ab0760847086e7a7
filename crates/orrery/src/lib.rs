#![forbid(unsafe_code)]

//! Headless hierarchy layouts.
//!
//! `orrery` positions the nodes of a parent-linked forest on a 2D canvas, either on concentric
//! rings around the roots (radial) or as a layered dendrogram (tree). Both engines mutate node
//! positions in place and keep no state between calls.

pub mod algo;
pub mod error;
pub mod geom;
pub mod hierarchy;

pub use algo::radial::{Angle, RadialReport};
pub use algo::tree::TreeReport;
pub use algo::{Algorithm, RadialOptions, TreeOptions};
pub use error::{Error, Result};
pub use geom::{Point, Rect};
pub use hierarchy::{Hierarchy, LayoutState, Node, NodeId, RadialState, TreeState};

/// Report returned by [`layout`], one variant per engine.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutReport {
    Radial(RadialReport),
    Tree(TreeReport),
}

/// Headless layout entry point.
pub fn layout(bounds: Rect, hierarchy: &mut Hierarchy, algorithm: Algorithm) -> LayoutReport {
    match algorithm {
        Algorithm::Radial(opts) => LayoutReport::Radial(radial_layout(bounds, hierarchy, &opts)),
        Algorithm::Tree(opts) => LayoutReport::Tree(tree_layout(bounds, hierarchy, &opts)),
    }
}

/// Concentric-ring layout over the hierarchy's own shells (see [`Hierarchy::levels`]).
pub fn radial_layout(bounds: Rect, hierarchy: &mut Hierarchy, opts: &RadialOptions) -> RadialReport {
    let shells = hierarchy.levels();
    algo::radial::layout(bounds, hierarchy, &shells, opts)
}

/// Concentric-ring layout over a caller-supplied shell array.
///
/// `shells[0]` holds the roots, every other node sits one shell outside its parent, and
/// children of one parent are contiguous. Violations produce a wrong but finite layout;
/// debug builds assert them.
pub fn radial_layout_with_levels(
    bounds: Rect,
    hierarchy: &mut Hierarchy,
    shells: &[Vec<NodeId>],
    opts: &RadialOptions,
) -> RadialReport {
    debug_assert!(
        hierarchy.check_levels(shells).is_ok(),
        "invalid shell array: {:?}",
        hierarchy.check_levels(shells)
    );
    algo::radial::layout(bounds, hierarchy, shells, opts)
}

/// Layered tree layout over the hierarchy's own levels.
pub fn tree_layout(bounds: Rect, hierarchy: &mut Hierarchy, opts: &TreeOptions) -> TreeReport {
    let levels = hierarchy.levels();
    algo::tree::layout(bounds, hierarchy, &levels, opts)
}

/// Layered tree layout over a caller-supplied level array. Same preconditions as
/// [`radial_layout_with_levels`].
pub fn tree_layout_with_levels(
    bounds: Rect,
    hierarchy: &mut Hierarchy,
    levels: &[Vec<NodeId>],
    opts: &TreeOptions,
) -> TreeReport {
    debug_assert!(
        hierarchy.check_levels(levels).is_ok(),
        "invalid level array: {:?}",
        hierarchy.check_levels(levels)
    );
    algo::tree::layout(bounds, hierarchy, levels, opts)
}
