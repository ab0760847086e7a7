//! Arena-backed forest of parent-linked nodes.
//!
//! Parent links and child lists are kept in sync by every mutation, so a node's child count is
//! always `children.len()`. Layout engines only touch `position` and `state`.

use crate::algo::radial::Angle;
use crate::error::{Error, Result};
use crate::geom::Point;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-engine transient state, overwritten by whichever engine ran last.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LayoutState {
    #[default]
    Unplaced,
    Radial(RadialState),
    Tree(TreeState),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialState {
    pub angle: Angle,
    /// Relaxation group the node rotated with; `None` for roots at the center.
    pub group: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeState {
    /// Offset along the spread axis relative to the parent, in neighbor-distance units.
    pub relative_pos: f64,
}

#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Edge weight towards the parent; scales the radial alignment spring.
    pub strength: f64,
    pub position: Point,
    pub state: LayoutState,
}

impl Node {
    fn new(parent: Option<NodeId>, strength: f64) -> Self {
        Self {
            parent,
            children: Vec::new(),
            strength,
            position: Point::default(),
            state: LayoutState::Unplaced,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn angle(&self) -> Option<Angle> {
        match self.state {
            LayoutState::Radial(s) => Some(s.angle),
            _ => None,
        }
    }

    pub fn relative_pos(&self) -> Option<f64> {
        match self.state {
            LayoutState::Tree(s) => Some(s.relative_pos),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: Vec<Node>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Builds a hierarchy from keyed parent links, e.g. the output of a clustering step.
    ///
    /// Children keep the order in which they appear in `links`. The returned map resolves each
    /// key to its node, in insertion order.
    pub fn from_links<K, I>(links: I) -> Result<(Self, IndexMap<K, NodeId, FxBuildHasher>)>
    where
        K: Hash + Eq + Clone + fmt::Display,
        I: IntoIterator<Item = (K, Option<K>, f64)>,
    {
        let links: Vec<(K, Option<K>, f64)> = links.into_iter().collect();
        let mut ids: IndexMap<K, NodeId, FxBuildHasher> =
            IndexMap::with_capacity_and_hasher(links.len(), FxBuildHasher);
        let mut h = Self::with_capacity(links.len());

        for (key, _, strength) in &links {
            if ids.contains_key(key) {
                return Err(Error::DuplicateKey {
                    key: key.to_string(),
                });
            }
            let id = h.add_root(*strength);
            ids.insert(key.clone(), id);
        }

        for (key, parent, _) in &links {
            let Some(parent) = parent else {
                continue;
            };
            let Some(&parent_id) = ids.get(parent) else {
                return Err(Error::UnknownParentKey {
                    key: key.to_string(),
                    parent: parent.to_string(),
                });
            };
            h.set_parent(ids[key], Some(parent_id))?;
        }

        Ok((h, ids))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_root(&mut self, strength: f64) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(None, strength));
        id
    }

    pub fn add_child(&mut self, parent: NodeId, strength: f64) -> Result<NodeId> {
        self.check_id(parent)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(Some(parent), strength));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Moves `node` under `parent` (or makes it a root). The node is appended after the new
    /// parent's existing children.
    pub fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.check_id(node)?;
        if let Some(p) = parent {
            self.check_id(p)?;
            if p == node {
                return Err(Error::SelfParent { node });
            }
            let mut cursor = Some(p);
            while let Some(c) = cursor {
                if c == node {
                    return Err(Error::Cycle { node, parent: p });
                }
                cursor = self.nodes[c.0].parent;
            }
        }

        if let Some(old) = self.nodes[node.0].parent {
            self.nodes[old.0].children.retain(|&c| c != node);
        }
        self.nodes[node.0].parent = parent;
        if let Some(p) = parent {
            self.nodes[p.0].children.push(node);
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.parent(id);
        while let Some(p) = cursor {
            depth += 1;
            cursor = self.parent(p);
        }
        depth
    }

    /// Nodes grouped by depth, roots first.
    ///
    /// Built breadth-first in child order, so every node sits one level below its parent and
    /// siblings always form one contiguous run.
    pub fn levels(&self) -> Vec<Vec<NodeId>> {
        let mut levels = Vec::new();
        let mut current = self.roots();
        while !current.is_empty() {
            let next: Vec<NodeId> = current
                .iter()
                .flat_map(|&id| self.nodes[id.0].children.iter().copied())
                .collect();
            levels.push(current);
            current = next;
        }
        levels
    }

    /// Verifies that `levels` covers every node once, that each level sits directly below its
    /// parents' level, and that siblings are contiguous.
    pub fn check_levels(&self, levels: &[Vec<NodeId>]) -> Result<()> {
        let mut level_of: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for (depth, level) in levels.iter().enumerate() {
            for &id in level {
                self.check_id(id)?;
                if level_of[id.0].replace(depth).is_some() {
                    return Err(mismatch(format!("{id} appears more than once")));
                }
            }
        }
        if let Some(missing) = level_of.iter().position(Option::is_none) {
            return Err(mismatch(format!("{} is not in any level", NodeId(missing))));
        }

        for (depth, level) in levels.iter().enumerate() {
            let mut seen_parents: Vec<NodeId> = Vec::new();
            for &id in level {
                let parent = self.nodes[id.0].parent;
                match (parent, depth) {
                    (None, 0) => continue,
                    (None, _) => return Err(mismatch(format!("root {id} is on level {depth}"))),
                    (Some(_), 0) => return Err(mismatch(format!("{id} on level 0 has a parent"))),
                    (Some(p), _) if level_of[p.0] != Some(depth - 1) => {
                        return Err(mismatch(format!(
                            "{id} on level {depth} has parent {p} outside level {}",
                            depth - 1
                        )));
                    }
                    (Some(p), _) => {
                        if seen_parents.last() != Some(&p) {
                            if seen_parents.contains(&p) {
                                return Err(mismatch(format!(
                                    "children of {p} are not contiguous on level {depth}"
                                )));
                            }
                            seen_parents.push(p);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_id(&self, id: NodeId) -> Result<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::UnknownNode { node: id })
        }
    }
}

fn mismatch(message: String) -> Error {
    Error::LevelMismatch { message }
}
