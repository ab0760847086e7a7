//! Concentric-ring layout.
//!
//! Shell `s` of the hierarchy becomes a ring of radius `radius[s]` around the canvas center.
//! Nodes are first fanned out around their parents, then same-shell groups are rotated by an
//! iterative angular relaxation: neighboring groups repel each other and every run of siblings
//! is pulled towards its parent's angle. A cooling parameter `v` damps each step by `cos(v)`
//! and grows until `v` reaches π/2, which bounds the number of sweeps.

mod angle;
mod group;

pub use angle::Angle;

use crate::algo::RadialOptions;
use crate::geom::{Point, Rect};
use crate::hierarchy::{Hierarchy, LayoutState, NodeId, RadialState};
use group::{NodeGroup, Subgroup, apply_alignment_force, apply_neighbor_force};
use std::f64::consts::{FRAC_PI_2, TAU};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadialReport {
    /// Ring radius per used shell, before zooming. `shell_radii[0]` is always 0.
    pub shell_radii: Vec<f64>,
    /// Scale applied to every radius so the outermost ring fits the canvas.
    pub zoom: f64,
    pub group_count: usize,
    pub sweeps: usize,
    /// Times the cooling parameter advanced; it advances on convergence or on a stall.
    pub cooling_advances: usize,
    /// Advances forced by the sweep cap rather than by convergence.
    pub stalled_advances: usize,
}

pub fn layout(
    bounds: Rect,
    hierarchy: &mut Hierarchy,
    shells: &[Vec<NodeId>],
    opts: &RadialOptions,
) -> RadialReport {
    let used = shells
        .iter()
        .rposition(|s| !s.is_empty())
        .map_or(0, |i| i + 1);
    let shells = &shells[..used];
    if shells.is_empty() {
        return RadialReport::default();
    }

    let mut angles = vec![Angle::ZERO; hierarchy.len()];
    let mut group_of: Vec<Option<usize>> = vec![None; hierarchy.len()];
    let mut groups: Vec<NodeGroup> = Vec::new();

    for (s, shell) in shells.iter().enumerate().skip(1) {
        if shell.is_empty() {
            continue;
        }
        let first = groups.len();
        if s == 1 {
            fan_out_first_shell(shell, hierarchy, &mut angles, &mut groups);
        } else {
            build_shell_groups(s, shell, hierarchy, opts, &mut angles, &mut groups);
        }
        link_neighbors(&mut groups, first, &angles);
        for (gi, g) in groups.iter().enumerate().skip(first) {
            for m in &g.members {
                group_of[m.0] = Some(gi);
            }
        }
    }

    let mut report = RadialReport {
        group_count: groups.len(),
        ..Default::default()
    };
    relax(&mut groups, &mut angles, &group_of, opts, &mut report);

    report.shell_radii = shell_radii(shells, opts.preferred_marker_distance);
    let outer = report.shell_radii.last().copied().unwrap_or(0.0);
    let available = (bounds.min_side() / 2.0 - opts.margin).max(0.0);
    report.zoom = if outer > 0.0 { available / outer } else { 1.0 };

    let center = bounds.center();
    for (s, shell) in shells.iter().enumerate() {
        let radius = report.zoom * report.shell_radii[s];
        for &id in shell {
            let angle = angles[id.0];
            if let Some(node) = hierarchy.node_mut(id) {
                node.position = Point {
                    x: center.x + radius * angle.sin(),
                    y: center.y - radius * angle.cos(),
                };
                node.state = LayoutState::Radial(RadialState {
                    angle,
                    group: group_of[id.0],
                });
            }
        }
    }

    tracing::debug!(
        shells = shells.len(),
        groups = report.group_count,
        sweeps = report.sweeps,
        stalled = report.stalled_advances,
        zoom = report.zoom,
        "radial layout finished"
    );
    report
}

/// Shell 1 nodes move independently, evenly spaced around the full circle.
fn fan_out_first_shell(
    shell: &[NodeId],
    hierarchy: &Hierarchy,
    angles: &mut [Angle],
    groups: &mut Vec<NodeGroup>,
) {
    let step = TAU / shell.len() as f64;
    for (i, &id) in shell.iter().enumerate() {
        angles[id.0] = Angle::new(i as f64 * step);
        let sub = Subgroup {
            start: 0,
            end: 1,
            parent: hierarchy.parent(id),
            weight: strength(hierarchy, id),
        };
        groups.push(NodeGroup::new(1, vec![id], vec![sub], 0.0));
    }
}

/// Splits shell `s >= 2` into groups, either one rigid ring or one fan per parent.
fn build_shell_groups(
    s: usize,
    shell: &[NodeId],
    hierarchy: &Hierarchy,
    opts: &RadialOptions,
    angles: &mut [Angle],
    groups: &mut Vec<NodeGroup>,
) {
    let runs = sibling_runs(shell, hierarchy);
    let opt_angle_dif = TAU / (opts.shell_slots * s as f64);
    let max_angle_dif = TAU / (shell.len() as f64 + opts.radial_spacing * runs.len() as f64);

    if max_angle_dif <= opt_angle_dif {
        // Too crowded for per-parent fans: the whole shell turns as one evenly spaced ring.
        let first_len = (runs[0].end - runs[0].start) as f64;
        let lead = (first_len - 1.0) / 2.0 * max_angle_dif;
        let mut angle = parent_angle(&runs[0], angles) - lead;
        let mut span = 0.0;
        for (k, sub) in runs.iter().enumerate() {
            for (i, &id) in shell[sub.start..sub.end].iter().enumerate() {
                if k > 0 || i > 0 {
                    let step = if i == 0 {
                        max_angle_dif * (1.0 + opts.radial_spacing)
                    } else {
                        max_angle_dif
                    };
                    angle += step;
                    span += step;
                }
                angles[id.0] = angle;
            }
        }
        tracing::trace!(shell = s, nodes = shell.len(), runs = runs.len(), "rigid shell");
        groups.push(NodeGroup::new(s, shell.to_vec(), runs, span));
        return;
    }

    for sub in runs {
        let members = shell[sub.start..sub.end].to_vec();
        let k = members.len() as f64;
        let first = parent_angle(&sub, angles) - (k - 1.0) / 2.0 * opt_angle_dif;
        for (i, id) in members.iter().enumerate() {
            angles[id.0] = first + i as f64 * opt_angle_dif;
        }
        let local = Subgroup {
            start: 0,
            end: members.len(),
            ..sub
        };
        groups.push(NodeGroup::new(s, members, vec![local], (k - 1.0) * opt_angle_dif));
    }
}

fn parent_angle(sub: &Subgroup, angles: &[Angle]) -> Angle {
    sub.parent.map(|p| angles[p.0]).unwrap_or(Angle::ZERO)
}

/// Contiguous same-parent runs of a shell, in shell order.
fn sibling_runs(shell: &[NodeId], hierarchy: &Hierarchy) -> Vec<Subgroup> {
    let mut runs: Vec<Subgroup> = Vec::new();
    for (i, &id) in shell.iter().enumerate() {
        let parent = hierarchy.parent(id);
        match runs.last_mut() {
            Some(run) if run.parent == parent => {
                run.end = i + 1;
                run.weight += strength(hierarchy, id);
            }
            _ => runs.push(Subgroup {
                start: i,
                end: i + 1,
                parent,
                weight: strength(hierarchy, id),
            }),
        }
    }
    for run in &mut runs {
        run.weight /= (run.end - run.start) as f64;
    }
    runs
}

fn strength(hierarchy: &Hierarchy, id: NodeId) -> f64 {
    hierarchy.node(id).map(|n| n.strength).unwrap_or(0.0)
}

/// Links the groups created for one shell in clockwise order of their start angles.
fn link_neighbors(groups: &mut [NodeGroup], first: usize, angles: &[Angle]) {
    let mut order: Vec<usize> = (first..groups.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (groups[a].first_angle(angles), groups[b].first_angle(angles));
        a.radians().total_cmp(&b.radians())
    });
    for (k, &gi) in order.iter().enumerate() {
        groups[gi].right = order[(k + 1) % order.len()];
    }
}

fn relax(
    groups: &mut [NodeGroup],
    angles: &mut [Angle],
    group_of: &[Option<usize>],
    opts: &RadialOptions,
    report: &mut RadialReport,
) {
    if groups.is_empty() {
        return;
    }
    let cooling_step = if opts.cooling_step > 0.0 {
        opts.cooling_step
    } else {
        RadialOptions::default().cooling_step
    };
    let stall_sweeps = opts.stall_sweeps.max(1);

    let mut v = 0.0f64;
    let mut stage_sweeps = 0usize;
    while v < FRAC_PI_2 {
        for g in groups.iter_mut() {
            g.reset_forces();
        }
        for gi in 0..groups.len() {
            apply_neighbor_force(groups, gi, angles);
        }
        for gi in 0..groups.len() {
            apply_alignment_force(groups, gi, angles, group_of);
        }

        // Net force per group; springs that cancel out count as settled.
        let max_force = groups.iter().map(|g| g.force.abs()).fold(0.0, f64::max);
        let damping = v.cos();
        for g in groups.iter() {
            g.rotate(angles, damping);
        }

        report.sweeps += 1;
        stage_sweeps += 1;
        let converged = max_force < opts.force_threshold;
        if converged || stage_sweeps >= stall_sweeps {
            if !converged {
                report.stalled_advances += 1;
            }
            tracing::trace!(v, stage_sweeps, max_force, converged, "cooling stage done");
            report.cooling_advances += 1;
            stage_sweeps = 0;
            v += cooling_step;
        }
    }
}

/// `radius[s] = max(radius[s-1] + d, n(s) * d / 2π)`: rings stay `d` apart and every ring is
/// long enough to give each of its nodes an arc of `d`.
fn shell_radii(shells: &[Vec<NodeId>], preferred_marker_distance: f64) -> Vec<f64> {
    let d = preferred_marker_distance;
    let mut radii = Vec::with_capacity(shells.len());
    radii.push(0.0);
    for shell in shells.iter().skip(1) {
        let prev = radii.last().copied().unwrap_or(0.0);
        radii.push((prev + d).max(shell.len() as f64 * d / TAU));
    }
    radii
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(children: usize, grandchildren_each: usize) -> Hierarchy {
        let mut h = Hierarchy::new();
        let root = h.add_root(1.0);
        for _ in 0..children {
            let c = h.add_child(root, 1.0).unwrap();
            for _ in 0..grandchildren_each {
                h.add_child(c, 1.0).unwrap();
            }
        }
        h
    }

    #[test]
    fn sparse_shell_gets_one_fan_per_parent() {
        let h = star(3, 3);
        let shells = h.levels();
        let mut angles = vec![Angle::ZERO; h.len()];
        let mut groups = Vec::new();
        fan_out_first_shell(&shells[1], &h, &mut angles, &mut groups);
        build_shell_groups(2, &shells[2], &h, &RadialOptions::default(), &mut angles, &mut groups);

        assert_eq!(groups.len(), 6);
        for g in &groups[3..] {
            assert_eq!(g.members.len(), 3);
            let parent = g.subgroups[0].parent.unwrap();
            let mean = g.subgroup_mean(&g.subgroups[0], &angles).unwrap();
            assert!(angles[parent.0].difference(mean).abs() < 1e-12);
        }
    }

    #[test]
    fn crowded_shell_becomes_one_rigid_ring() {
        let h = star(2, 12);
        let shells = h.levels();
        let mut angles = vec![Angle::ZERO; h.len()];
        let mut groups = Vec::new();
        let opts = RadialOptions::default();
        fan_out_first_shell(&shells[1], &h, &mut angles, &mut groups);
        build_shell_groups(2, &shells[2], &h, &opts, &mut angles, &mut groups);

        assert_eq!(groups.len(), 3);
        let ring = &groups[2];
        assert_eq!(ring.members.len(), 24);
        assert_eq!(ring.subgroups.len(), 2);
        assert_eq!(ring.subgroups[1].start, 12);

        // Slots plus inter-run padding cover exactly one turn.
        let dif = TAU / (24.0 + opts.radial_spacing * 2.0);
        assert!((ring.angle_span + dif * (1.0 + opts.radial_spacing) - TAU).abs() < 1e-9);
    }

    #[test]
    fn radii_respect_ring_distance_and_circumference() {
        let shells = vec![
            vec![NodeId(0)],
            vec![NodeId(1)],
            (2..202).map(NodeId).collect::<Vec<_>>(),
        ];
        let radii = shell_radii(&shells, 20.0);
        assert_eq!(radii[0], 0.0);
        assert_eq!(radii[1], 20.0);
        assert!((radii[2] - 200.0 * 20.0 / TAU).abs() < 1e-9);
    }
}
