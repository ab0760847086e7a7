//! Same-shell node clusters that rotate as one unit during relaxation.

use super::angle::Angle;
use crate::hierarchy::NodeId;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Contiguous run of group members sharing one parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Subgroup {
    pub start: usize,
    pub end: usize,
    pub parent: Option<NodeId>,
    /// Mean strength of the run; scales its alignment spring.
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeGroup {
    pub shell: usize,
    pub members: Vec<NodeId>,
    /// Angular distance from the first to the last member. Fixed for the group's lifetime.
    pub angle_span: f64,
    pub subgroups: Vec<Subgroup>,
    /// Next group clockwise on the same shell (global group index; may be the group itself).
    pub right: usize,
    /// Net angular force of the current sweep.
    pub force: f64,
    pub d_force: f64,
}

impl NodeGroup {
    pub fn new(shell: usize, members: Vec<NodeId>, subgroups: Vec<Subgroup>, angle_span: f64) -> Self {
        Self {
            shell,
            members,
            angle_span,
            subgroups,
            right: 0,
            force: 0.0,
            d_force: 0.0,
        }
    }

    pub fn reset_forces(&mut self) {
        self.force = 0.0;
        self.d_force = 0.0;
    }

    pub fn add_force(&mut self, force: f64, derivative: f64) {
        self.force += force;
        self.d_force += derivative;
    }

    pub fn first_angle(&self, angles: &[Angle]) -> Angle {
        self.members
            .first()
            .map(|m| angles[m.0])
            .unwrap_or(Angle::ZERO)
    }

    pub fn center(&self, angles: &[Angle]) -> Angle {
        self.first_angle(angles) + self.angle_span / 2.0
    }

    pub fn subgroup_mean(&self, sub: &Subgroup, angles: &[Angle]) -> Option<Angle> {
        Angle::run_mean(self.members[sub.start..sub.end].iter().map(|m| angles[m.0]))
    }

    /// Damped Newton step on the accumulated force; returns the applied rotation.
    pub fn rotate(&self, angles: &mut [Angle], damping: f64) -> f64 {
        if self.members.is_empty() || !(self.d_force > 0.0) {
            return 0.0;
        }
        let delta = damping * self.force / self.d_force;
        if !delta.is_finite() {
            return 0.0;
        }
        for m in &self.members {
            angles[m.0] += delta;
        }
        delta
    }
}

/// Repulsive spring between neighboring groups, in first-shell-equivalent units.
///
/// Returns `(force, d_force/d_gap)` or `None` once the gap reaches a quarter turn.
pub(crate) fn gap_spring(normalized_gap: f64) -> Option<(f64, f64)> {
    if normalized_gap >= FRAC_PI_2 {
        return None;
    }
    let force = (3.0 - 6.0 * normalized_gap / PI).powi(2);
    let derivative = (36.0 / PI * (2.0 * normalized_gap / PI - 1.0)).abs();
    Some((force, derivative))
}

/// Quadratic spring pulling a subgroup's mean angle towards its parent's angle.
pub(crate) fn alignment_spring(delta: f64) -> (f64, f64) {
    (delta.signum() * delta * delta, 2.0 * delta.abs())
}

/// Pushes `gi` and its clockwise neighbor apart when their gap is too small.
pub(crate) fn apply_neighbor_force(groups: &mut [NodeGroup], gi: usize, angles: &[Angle]) {
    let right = groups[gi].right;
    if right == gi {
        return;
    }
    let (this, next) = (&groups[gi], &groups[right]);
    if this.members.is_empty() || next.members.is_empty() {
        return;
    }

    let centers = (next.center(angles).radians() - this.center(angles).radians()).rem_euclid(TAU);
    let gap = centers - (this.angle_span + next.angle_span) / 2.0;
    let shell = this.shell as f64;

    if let Some((force, derivative)) = gap_spring(gap * shell) {
        let derivative = derivative * shell;
        groups[gi].add_force(-force, derivative);
        groups[right].add_force(force, derivative);
    }
}

/// Pulls every subgroup of `gi` towards its parent, and the parent's group towards it.
pub(crate) fn apply_alignment_force(
    groups: &mut [NodeGroup],
    gi: usize,
    angles: &[Angle],
    group_of: &[Option<usize>],
) {
    if groups[gi].shell < 2 {
        return;
    }
    for k in 0..groups[gi].subgroups.len() {
        let sub = groups[gi].subgroups[k];
        let Some(parent) = sub.parent else {
            continue;
        };
        if !(sub.weight > 0.0) {
            continue;
        }
        let Some(mean) = groups[gi].subgroup_mean(&sub, angles) else {
            continue;
        };

        let delta = angles[parent.0].difference(mean);
        let (force, derivative) = alignment_spring(delta);
        let (force, derivative) = (force * sub.weight, derivative * sub.weight);

        groups[gi].add_force(force, derivative);
        if let Some(pg) = group_of[parent.0] {
            groups[pg].add_force(-force, derivative);
        }
    }
}
