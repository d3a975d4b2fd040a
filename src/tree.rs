//! Branching game record.
//!
//! Nodes live in a flat arena indexed by [`NodeId`]: `nodes[i].id == i`, a
//! parent id is always smaller than its child's id, and ids are never
//! reused. The cursor can move to any node; only new moves and edits append.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GameError, Result};
use crate::grid::{Color, Point};

/// Index of a node in the arena.
pub type NodeId = usize;

/// A single free-placement change: what the point held before the edit
/// node and what it holds after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditChange {
    pub before: Option<Color>,
    pub after: Option<Color>,
}

/// What produced a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Play { color: Color, point: Point },
    Pass { color: Color },
    /// Stones set or cleared directly, bypassing the rules
    Edit { changes: BTreeMap<Point, EditChange> },
}

impl Action {
    /// The color that acted, for moves.
    pub fn color(&self) -> Option<Color> {
        match self {
            Action::Play { color, .. } | Action::Pass { color } => Some(*color),
            Action::Edit { .. } => None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Action::Pass { .. })
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, Action::Edit { .. })
    }
}

/// Board markers drawn by demo tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Triangle,
    Square,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Letter(char),
    Number(u32),
}

/// Mutable payload of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub symbols: BTreeMap<Point, Symbol>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<Point, Label>,
    /// Owner of every intersection from the latest count, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_points: Option<Vec<Option<Color>>>,
    /// Stones marked dead while this node was current
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dead: BTreeSet<Point>,
}

impl Annotations {
    /// Set `symbol` at `pt`, or remove it if that exact symbol is already there.
    pub fn toggle_symbol(&mut self, pt: Point, symbol: Symbol) {
        if self.symbols.get(&pt) == Some(&symbol) {
            self.symbols.remove(&pt);
        } else {
            self.symbols.insert(pt, symbol);
        }
    }

    /// Remove the label at `pt`, or give it the first unused letter.
    ///
    /// Returns the label now at `pt`. Once all 26 letters are in use nothing
    /// is added.
    pub fn toggle_label(&mut self, pt: Point) -> Option<Label> {
        if self.labels.remove(&pt).is_some() {
            return None;
        }
        let label = ('A'..='Z')
            .map(Label::Letter)
            .find(|l| !self.labels.values().any(|v| v == l))?;
        self.labels.insert(pt, label);
        Some(label)
    }

    /// Remove the label at `pt`, or give it the smallest unused number.
    pub fn toggle_number(&mut self, pt: Point) -> Option<Label> {
        if self.labels.remove(&pt).is_some() {
            return None;
        }
        let label = (1..)
            .map(Label::Number)
            .find(|l| !self.labels.values().any(|v| v == l))?;
        self.labels.insert(pt, label);
        Some(label)
    }
}

/// One entry of the game record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Child ids in creation order
    pub children: Vec<NodeId>,
    pub action: Action,
    #[serde(default)]
    pub annotations: Annotations,
}

/// Append-only forest of nodes plus a cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameTree {
    nodes: Vec<Node>,
    current: Option<NodeId>,
}

impl GameTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(GameError::InvalidNode(id))
    }

    pub fn current_id(&self) -> Option<NodeId> {
        self.current
    }

    pub fn current(&self) -> Option<&Node> {
        self.current.and_then(|id| self.nodes.get(id))
    }

    pub fn current_mut(&mut self) -> Option<&mut Node> {
        self.current.and_then(|id| self.nodes.get_mut(id))
    }

    /// Children of `parent`, or the root nodes when `parent` is `None`.
    pub fn children_of(&self, parent: Option<NodeId>) -> Vec<NodeId> {
        match parent {
            Some(id) => self.nodes.get(id).map(|n| n.children.clone()).unwrap_or_default(),
            None => self
                .nodes
                .iter()
                .filter(|n| n.parent.is_none())
                .map(|n| n.id)
                .collect(),
        }
    }

    /// Move the cursor along `action`, reusing an existing child that made
    /// the same move instead of growing a duplicate branch.
    ///
    /// Returns the node id and whether a new node was created. Edits are
    /// never reused.
    pub fn advance(&mut self, action: Action) -> (NodeId, bool) {
        if !action.is_edit() {
            let existing = self
                .children_of(self.current)
                .into_iter()
                .find(|&id| self.nodes[id].action == action);
            if let Some(id) = existing {
                debug!(node = id, "reusing existing node");
                self.current = Some(id);
                return (id, false);
            }
        }
        (self.push(action), true)
    }

    /// Append a new node under the cursor and move the cursor to it.
    pub fn push(&mut self, action: Action) -> NodeId {
        let id = self.nodes.len();
        let parent = self.current;
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        self.nodes.push(Node {
            id,
            parent,
            children: Vec::new(),
            action,
            annotations: Annotations::default(),
        });
        debug!(node = id, parent = ?parent, "created node");
        self.current = Some(id);
        id
    }

    /// Mutable access for ids handed out by this tree.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Fold one more change into the edit node `id`, dropping entries that
    /// end up where they started.
    pub(crate) fn record_edit(
        &mut self,
        id: NodeId,
        pt: Point,
        before: Option<Color>,
        after: Option<Color>,
    ) {
        let Some(Node {
            action: Action::Edit { changes },
            ..
        }) = self.nodes.get_mut(id)
        else {
            return;
        };
        let before = changes.get(&pt).map_or(before, |c| c.before);
        if before == after {
            changes.remove(&pt);
        } else {
            changes.insert(pt, EditChange { before, after });
        }
    }

    pub fn set_current(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        self.current = Some(id);
        Ok(())
    }

    /// Ids from the root down to and including `id`.
    pub fn path_to(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut path = Vec::new();
        let mut next = Some(id);
        while let Some(n) = next {
            path.push(n);
            next = self.node(n)?.parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Check the arena invariants of a record loaded from storage.
    pub fn validate(&self) -> Result<()> {
        let corrupt = |msg: String| Err(GameError::CorruptState(msg));
        for (i, node) in self.nodes.iter().enumerate() {
            if node.id != i {
                return corrupt(format!("node at index {i} has id {}", node.id));
            }
            if let Some(p) = node.parent {
                if p >= i {
                    return corrupt(format!("node {i} has parent {p}"));
                }
                if !self.nodes[p].children.contains(&i) {
                    return corrupt(format!("node {p} does not list child {i}"));
                }
            }
            for &c in &node.children {
                if self.nodes.get(c).and_then(|n| n.parent) != Some(i) {
                    return corrupt(format!("node {i} lists {c}, which is not its child"));
                }
            }
        }
        if let Some(id) = self.current {
            if id >= self.nodes.len() {
                return corrupt(format!("cursor points at missing node {id}"));
            }
        }
        Ok(())
    }
}
