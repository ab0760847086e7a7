pub mod radial;
pub mod tree;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Algorithm {
    /// Concentric rings, one per shell, relaxed by angular springs.
    Radial(RadialOptions),
    /// Layered dendrogram with bottom-up subtree packing.
    Tree(TreeOptions),
}

/// Tunables of the radial engine. The defaults are empirically tuned for visual quality; they
/// are exposed so hosts can experiment, not because other values are known to be better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialOptions {
    /// Minimum ring separation and minimum arc length per node on a ring, in layout units.
    pub preferred_marker_distance: f64,
    /// Padding between sibling runs of a rigid shell, as a fraction of one node slot.
    pub radial_spacing: f64,
    /// Increment of the cooling parameter per converged (or stalled) stage.
    pub cooling_step: f64,
    /// A stage converges once no group's net force in a sweep reaches this magnitude.
    pub force_threshold: f64,
    /// Sweeps after which a stage is abandoned even without convergence.
    pub stall_sweeps: usize,
    /// Ideal slots per shell index: shell `s` packs nodes `2π / (shell_slots * s)` apart.
    pub shell_slots: f64,
    /// Pixels kept free between the outermost ring and the canvas edge.
    pub margin: f64,
}

impl Default for RadialOptions {
    fn default() -> Self {
        Self {
            preferred_marker_distance: 20.0,
            radial_spacing: 0.5,
            cooling_step: 0.02,
            force_threshold: 0.1,
            stall_sweeps: 1000,
            shell_slots: 6.0,
            margin: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeOptions {
    /// Stack levels left to right (spread vertically) instead of top to bottom.
    pub vertical: bool,
    /// Stack levels in the opposite direction (bottom to top, or right to left).
    pub inverted: bool,
    /// Upper bound on the distance between consecutive levels, in pixels.
    pub max_layer_distance: f64,
    /// Upper bound on the distance between neighboring nodes of one level, in pixels.
    pub max_neighbor_distance: f64,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            vertical: false,
            inverted: false,
            max_layer_distance: 100.0,
            max_neighbor_distance: 50.0,
        }
    }
}
