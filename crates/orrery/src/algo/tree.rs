//! Layered tree (dendrogram) layout.
//!
//! Subtrees are packed bottom-up: every node records the horizontal extent of its descendants
//! per relative depth, siblings are pushed apart until no two subtrees overlap at any shared
//! depth, and each parent is centered over its children. A top-down pass then turns the
//! relative offsets into absolute positions and maps them onto the canvas.

use crate::algo::TreeOptions;
use crate::geom::{Point, Rect};
use crate::hierarchy::{Hierarchy, LayoutState, NodeId, TreeState};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeReport {
    pub level_count: usize,
    /// Pixels between consecutive levels.
    pub layer_spacing: f64,
    /// Pixels per unit of relative offset; adjacent siblings are at least this far apart.
    pub neighbor_spacing: f64,
    /// Width of the packed forest in relative units.
    pub spread_range: f64,
}

/// Occupied offsets at one relative depth, relative to the subtree root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    const ORIGIN: Extent = Extent { min: 0.0, max: 0.0 };

    fn shifted(self, by: f64) -> Extent {
        Extent {
            min: self.min + by,
            max: self.max + by,
        }
    }
}

pub fn layout(
    bounds: Rect,
    hierarchy: &mut Hierarchy,
    levels: &[Vec<NodeId>],
    opts: &TreeOptions,
) -> TreeReport {
    let used = levels
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    let levels = &levels[..used];
    let total: usize = levels.iter().map(Vec::len).sum();
    if total == 0 {
        return TreeReport::default();
    }

    if total == 1 {
        if let Some(node) = levels
            .iter()
            .flatten()
            .next()
            .and_then(|&id| hierarchy.node_mut(id))
        {
            node.position = bounds.center();
            node.state = LayoutState::Tree(TreeState { relative_pos: 0.0 });
        }
        return TreeReport {
            level_count: 1,
            ..Default::default()
        };
    }

    let mut relative = vec![0.0f64; hierarchy.len()];
    let mut profiles: Vec<Vec<Extent>> = vec![Vec::new(); hierarchy.len()];
    for &id in levels.iter().flatten() {
        profiles[id.0].push(Extent::ORIGIN);
    }

    for depth in (0..levels.len().saturating_sub(1)).rev() {
        for (parent, children) in sibling_runs(&levels[depth + 1], hierarchy) {
            let Some(parent) = parent else {
                continue;
            };
            let child_profiles: Vec<&[Extent]> =
                children.iter().map(|c| profiles[c.0].as_slice()).collect();
            let (offsets, contour) = pack_siblings(&child_profiles);
            for (c, offset) in children.iter().zip(offsets) {
                relative[c.0] = offset;
            }
            profiles[parent.0].extend(contour);
        }
    }

    // Roots are packed like the children of one virtual parent.
    let root_profiles: Vec<&[Extent]> = levels[0]
        .iter()
        .map(|r| profiles[r.0].as_slice())
        .collect();
    let (root_offsets, forest) = pack_siblings(&root_profiles);
    for (r, offset) in levels[0].iter().zip(root_offsets) {
        relative[r.0] = offset;
    }

    let (spread_min, spread_max) = forest
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, e| match acc {
            Some((lo, hi)) => Some((lo.min(e.min), hi.max(e.max))),
            None => Some((e.min, e.max)),
        })
        .unwrap_or((0.0, 0.0));
    let mid = (spread_min + spread_max) / 2.0;
    let spread_range = spread_max - spread_min;

    let mut absolute = vec![0.0f64; hierarchy.len()];
    for &id in levels.iter().flatten() {
        let base = hierarchy.parent(id).map(|p| absolute[p.0]).unwrap_or(0.0);
        absolute[id.0] = base + relative[id.0];
    }

    let (spread_avail, layer_avail) = if opts.vertical {
        (bounds.height, bounds.width)
    } else {
        (bounds.width, bounds.height)
    };
    let level_count = levels.len();
    let layer_spacing = opts
        .max_layer_distance
        .min(layer_avail / (level_count as f64 + 1.0));
    let neighbor_spacing = opts
        .max_neighbor_distance
        .min(spread_avail / (spread_range + 2.0));
    let direction = if opts.inverted { -1.0 } else { 1.0 };
    let center = bounds.center();

    for (depth, level) in levels.iter().enumerate() {
        let layer = direction * (depth as f64 - (level_count as f64 - 1.0) / 2.0) * layer_spacing;
        for &id in level {
            let spread = (absolute[id.0] - mid) * neighbor_spacing;
            let (dx, dy) = if opts.vertical {
                (layer, spread)
            } else {
                (spread, layer)
            };
            if let Some(node) = hierarchy.node_mut(id) {
                node.position = Point {
                    x: center.x + dx,
                    y: center.y + dy,
                };
                node.state = LayoutState::Tree(TreeState {
                    relative_pos: relative[id.0],
                });
            }
        }
    }

    tracing::debug!(
        levels = level_count,
        spread_range,
        layer_spacing,
        neighbor_spacing,
        "tree layout finished"
    );

    TreeReport {
        level_count,
        layer_spacing,
        neighbor_spacing,
        spread_range,
    }
}

/// Contiguous same-parent runs of one level, in level order.
fn sibling_runs<'a>(
    level: &'a [NodeId],
    hierarchy: &Hierarchy,
) -> Vec<(Option<NodeId>, &'a [NodeId])> {
    let mut runs: Vec<(Option<NodeId>, &'a [NodeId])> = Vec::new();
    let mut start = 0;
    for i in 1..=level.len() {
        let boundary =
            i == level.len() || hierarchy.parent(level[i]) != hierarchy.parent(level[start]);
        if boundary {
            runs.push((hierarchy.parent(level[start]), &level[start..i]));
            start = i;
        }
    }
    runs
}

/// Places sibling subtrees left to right, one unit apart at least and without overlap at any
/// shared depth, then centers the run on 0.
///
/// `profiles[i][d]` is the extent of sibling `i`'s descendants `d` levels below it (index 0 is
/// the sibling itself). Returns the sibling offsets and the combined extents per depth.
pub(crate) fn pack_siblings(profiles: &[&[Extent]]) -> (Vec<f64>, Vec<Extent>) {
    let mut offsets: Vec<f64> = Vec::with_capacity(profiles.len());
    let mut contour: Vec<Extent> = Vec::new();

    for profile in profiles {
        let mut offset = offsets.last().map_or(0.0, |prev| prev + 1.0);
        for (extent, placed) in profile.iter().zip(&contour) {
            offset = offset.max(placed.max + 1.0 - extent.min);
        }
        for (d, extent) in profile.iter().enumerate() {
            let e = extent.shifted(offset);
            match contour.get_mut(d) {
                Some(c) => {
                    c.min = c.min.min(e.min);
                    c.max = c.max.max(e.max);
                }
                None => contour.push(e),
            }
        }
        offsets.push(offset);
    }

    let shift = -0.5 * offsets.last().copied().unwrap_or(0.0);
    for o in &mut offsets {
        *o += shift;
    }
    for c in &mut contour {
        *c = c.shifted(shift);
    }
    (offsets, contour)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(min: f64, max: f64) -> Extent {
        Extent { min, max }
    }

    #[test]
    fn leaves_are_packed_one_unit_apart_and_centered() {
        let leaf = [Extent::ORIGIN];
        let (offsets, contour) = pack_siblings(&[&leaf[..], &leaf[..], &leaf[..]]);
        assert_eq!(offsets, vec![-1.0, 0.0, 1.0]);
        assert_eq!(contour, vec![e(-1.0, 1.0)]);
    }

    #[test]
    fn collisions_are_resolved_at_every_shared_depth() {
        // Two wide subtrees around a leaf: they only clash two levels down.
        let wide = [Extent::ORIGIN, e(-0.5, 0.5), e(-1.5, 1.5)];
        let leaf = [Extent::ORIGIN];
        let (offsets, contour) = pack_siblings(&[&wide[..], &leaf[..], &wide[..]]);
        assert_eq!(offsets, vec![-2.0, -1.0, 2.0]);
        assert_eq!(contour, vec![e(-2.0, 2.0), e(-2.5, 2.5), e(-3.5, 3.5)]);
    }

    #[test]
    fn single_sibling_sits_under_its_parent() {
        let wide = [Extent::ORIGIN, e(-1.0, 1.0)];
        let (offsets, contour) = pack_siblings(&[&wide[..]]);
        assert_eq!(offsets, vec![0.0]);
        assert_eq!(contour, vec![Extent::ORIGIN, e(-1.0, 1.0)]);
    }
}
