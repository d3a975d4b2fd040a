//! A game record: the live position, the position play started from, and
//! the branching tree of moves and edits in between.
//!
//! The live position is always the setup position with the cursor's path
//! applied. Moving the cursor replays that path from the setup.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GameError, MoveError, Result};
use crate::grid::{Color, Grid, Point};
use crate::position::{Move, Position, PositionState};
use crate::scoring::{Score, count_score};
use crate::tree::{Action, EditChange, GameTree, Label, Node, NodeId, Symbol};

/// Persisted form of a [`Board`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    /// Position before the first node (handicap stones, imported stones)
    pub setup: PositionState,
    /// Position at the cursor
    pub position: PositionState,
    #[serde(default)]
    pub tree: GameTree,
}

/// Board state plus its game tree, owned together by one game.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    setup: Position,
    pos: Position,
    tree: GameTree,
}

impl Board {
    /// Create a board, optionally rehydrated from a stored position.
    ///
    /// A stored position whose grid disagrees with `size` is rejected.
    pub fn new(size: usize, initial: Option<PositionState>) -> Result<Self> {
        let pos = match initial {
            Some(state) => {
                if state.size != size {
                    return Err(GameError::CorruptState(format!(
                        "stored board is {}x{0}, expected {size}x{size}",
                        state.size
                    )));
                }
                Position::from_state(&state)?
            }
            None => Position::new(size)?,
        };
        Ok(Self::from_position(pos))
    }

    /// Start a record from an arbitrary position.
    pub fn from_position(pos: Position) -> Self {
        Board {
            setup: pos.clone(),
            pos,
            tree: GameTree::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.pos.size()
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    pub fn tree(&self) -> &GameTree {
        &self.tree
    }

    /// Color to move.
    pub fn current(&self) -> Color {
        self.pos.current
    }

    pub fn at(&self, pt: Point) -> Option<Color> {
        self.pos.at(pt)
    }

    pub fn current_node(&self) -> Option<&Node> {
        self.tree.current()
    }

    pub fn current_node_id(&self) -> Option<NodeId> {
        self.tree.current_id()
    }

    /// Play a move for the color to move and record it under the cursor.
    ///
    /// Replaying a move that already exists as a child of the cursor moves
    /// onto that child instead of creating a new branch.
    pub fn play(&mut self, mv: Move) -> Result<NodeId> {
        let action = match mv {
            Move::Resign => return Err(MoveError::Resign.into()),
            Move::Pass => {
                let color = self.pos.current;
                self.pos.pass();
                Action::Pass { color }
            }
            Move::Play(pt) => {
                let placement = self.pos.play(pt)?;
                Action::Play {
                    color: placement.color,
                    point: pt,
                }
            }
        };
        let (id, created) = self.tree.advance(action);
        if created {
            self.store_dead_marks();
        } else {
            self.pos.dead = self.tree.node(id)?.annotations.dead.clone();
        }
        Ok(id)
    }

    pub fn pass_turn(&mut self) -> Result<NodeId> {
        self.play(Move::Pass)
    }

    /// True when the last two nodes on the cursor's path are both passes.
    pub fn both_passed(&self) -> bool {
        let Some(node) = self.tree.current() else {
            return false;
        };
        let parent = node.parent.and_then(|p| self.tree.get(p));
        node.action.is_pass() && parent.is_some_and(|p| p.action.is_pass())
    }

    /// Move the cursor and rebuild the live position by replaying from the setup.
    pub fn set_current_node(&mut self, id: NodeId) -> Result<()> {
        let path = self.tree.path_to(id)?;
        let pos = self.replay(&path)?;
        self.tree.set_current(id)?;
        self.pos = pos;
        debug!(node = id, depth = path.len(), "moved cursor");
        Ok(())
    }

    fn replay(&self, path: &[NodeId]) -> Result<Position> {
        let mut pos = self.setup.clone();
        for &id in path {
            apply(&mut pos, &self.tree.node(id)?.action).map_err(|e| {
                GameError::CorruptState(format!("node {id} cannot be replayed: {e}"))
            })?;
        }
        if let Some(&last) = path.last() {
            pos.dead = self.tree.node(last)?.annotations.dead.clone();
        }
        Ok(pos)
    }

    /// Place fixed handicap stones. Only allowed before the first node.
    pub fn place_handicap(&mut self, count: u32) -> Result<Vec<Point>> {
        if !self.tree.is_empty() {
            return Err(GameError::AlreadyStarted);
        }
        let points = self.pos.place_handicap(count)?;
        self.setup = self.pos.clone();
        debug!(count, stones = points.len(), "placed handicap");
        Ok(points)
    }

    /// Choose who moves first. Only allowed before the first node.
    pub fn set_first_player(&mut self, color: Color) -> Result<()> {
        if !self.tree.is_empty() {
            return Err(GameError::AlreadyStarted);
        }
        self.pos.current = color;
        self.setup.current = color;
        Ok(())
    }

    /// Mark the loose chain at `pt` dead. Marks are kept on the current node
    /// and come back when the cursor returns to it.
    pub fn mark_dead(&mut self, pt: Point) -> Result<()> {
        self.pos.mark_dead(pt)?;
        self.store_dead_marks();
        Ok(())
    }

    /// Flip the dead mark of the loose chain at `pt`; see [`Position::toggle_marked_dead`].
    pub fn toggle_marked_dead(&mut self, pt: Point) -> Result<bool> {
        let marked = self.pos.toggle_marked_dead(pt)?;
        self.store_dead_marks();
        Ok(marked)
    }

    fn store_dead_marks(&mut self) {
        if let Some(node) = self.tree.current_mut() {
            node.annotations.dead = self.pos.dead.clone();
        }
    }

    pub fn is_marked_dead(&self, pt: Point) -> bool {
        self.pos.is_marked_dead(pt)
    }

    /// Count the live position. Never cached: every call reflects the current marks.
    pub fn score(&self, komi: f64) -> Score {
        count_score(&self.pos, komi)
    }

    /// Store the owner map of a count on the current node.
    pub fn set_score_points(&mut self, points: Vec<Option<Color>>) {
        if let Some(node) = self.tree.current_mut() {
            node.annotations.score_points = Some(points);
        }
    }

    pub fn toggle_symbol(&mut self, pt: Point, symbol: Symbol) -> Result<()> {
        self.pos.grid.check(pt)?;
        self.annotated_node().annotations.toggle_symbol(pt, symbol);
        Ok(())
    }

    pub fn toggle_label(&mut self, pt: Point) -> Result<Option<Label>> {
        self.pos.grid.check(pt)?;
        Ok(self.annotated_node().annotations.toggle_label(pt))
    }

    pub fn toggle_number(&mut self, pt: Point) -> Result<Option<Label>> {
        self.pos.grid.check(pt)?;
        Ok(self.annotated_node().annotations.toggle_number(pt))
    }

    /// Node that annotation tools write to; an empty edit node is created
    /// when the record has no current node yet.
    fn annotated_node(&mut self) -> &mut Node {
        let id = match self.tree.current_id() {
            Some(id) => id,
            None => self.tree.push(Action::Edit {
                changes: BTreeMap::new(),
            }),
        };
        self.tree.node_mut(id)
    }

    /// Flip `pt` between `color` and empty, bypassing the rules.
    ///
    /// Consecutive edits collect in one edit node as long as that node is a
    /// leaf; otherwise a new edit node is started under the cursor.
    pub fn toggle_edit(&mut self, pt: Point, color: Color) -> Result<()> {
        self.pos.grid.check(pt)?;
        let id = match self.tree.current() {
            Some(node) if node.action.is_edit() && node.children.is_empty() => node.id,
            _ => self.tree.push(Action::Edit {
                changes: BTreeMap::new(),
            }),
        };

        let before = self.pos.at(pt);
        let after = if before == Some(color) {
            None
        } else {
            Some(color)
        };
        self.pos.grid.set(pt, after)?;
        self.pos.ko = None;
        self.pos.dead.clear();
        self.tree.record_edit(id, pt, before, after);
        self.store_dead_marks();
        Ok(())
    }

    /// Add one edit node setting black stones, white stones and empty points.
    ///
    /// A point listed more than once takes the state of its last list
    /// (black, then white, then empty).
    pub fn add_edits(
        &mut self,
        black: &[Point],
        white: &[Point],
        empty: &[Point],
    ) -> Result<NodeId> {
        let targets: Vec<(Point, Option<Color>)> = black
            .iter()
            .map(|&p| (p, Some(Color::Black)))
            .chain(white.iter().map(|&p| (p, Some(Color::White))))
            .chain(empty.iter().map(|&p| (p, None)))
            .collect();
        for &(pt, _) in &targets {
            self.pos.grid.check(pt)?;
        }

        let mut changes = BTreeMap::new();
        for (pt, after) in targets {
            let before = changes
                .get(&pt)
                .map_or(self.pos.at(pt), |c: &EditChange| c.before);
            changes.insert(pt, EditChange { before, after });
        }
        changes.retain(|_, c| c.before != c.after);

        let action = Action::Edit { changes };
        apply(&mut self.pos, &action)?;
        Ok(self.tree.push(action))
    }

    pub fn to_state(&self) -> BoardState {
        BoardState {
            setup: self.setup.to_state(),
            position: self.pos.to_state(),
            tree: self.tree.clone(),
        }
    }

    /// Rehydrate a persisted board.
    ///
    /// The tree must satisfy its arena invariants and replaying the cursor's
    /// path from the setup must reproduce the stored stones, turn and ko.
    pub fn from_state(state: BoardState) -> Result<Self> {
        let setup = Position::from_state(&state.setup)?;
        let pos = Position::from_state(&state.position)?;
        if setup.size() != pos.size() {
            return Err(GameError::CorruptState(format!(
                "setup is {}x{0} but position is {}x{1}",
                setup.size(),
                pos.size()
            )));
        }
        state.tree.validate()?;

        let board = Board {
            setup,
            pos,
            tree: state.tree,
        };
        let path = match board.tree.current_id() {
            Some(id) => board.tree.path_to(id)?,
            None => Vec::new(),
        };
        let replayed = board.replay(&path)?;
        if replayed.grid != board.pos.grid {
            return Err(GameError::CorruptState(
                "stored position does not match its game record".into(),
            ));
        }
        if replayed.current != board.pos.current || replayed.ko != board.pos.ko {
            return Err(GameError::CorruptState(format!(
                "stored position has {} to move with ko {:?}, record gives {} with ko {:?}",
                board.pos.current, board.pos.ko, replayed.current, replayed.ko
            )));
        }
        Ok(board)
    }
}

/// Apply one node's action to a position.
fn apply(pos: &mut Position, action: &Action) -> Result<()> {
    match action {
        Action::Play { color, point } => {
            pos.current = *color;
            pos.play(*point)?;
        }
        Action::Pass { color } => {
            pos.current = *color;
            pos.pass();
        }
        Action::Edit { changes } => {
            for (&pt, change) in changes {
                pos.grid.set(pt, change.after)?;
            }
            pos.ko = None;
            pos.dead.clear();
        }
    }
    Ok(())
}

impl FromStr for Board {
    type Err = GameError;

    /// Board with Black to move over the compact string form.
    fn from_str(s: &str) -> Result<Self> {
        let grid: Grid = s.parse()?;
        Ok(Board::from_position(Position::from_grid(grid)))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pos.grid)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_play_records_nodes() {
        let mut board = Board::new(9, None).unwrap();
        assert_eq!(board.current_node_id(), None);

        board.play(Move::Play(30)).unwrap();
        let node = board.current_node().unwrap();
        assert_eq!(node.id, 0);
        assert_eq!(node.parent, None);
        assert_eq!(node.action, Action::Play { color: Color::Black, point: 30 });

        board.play(Move::Play(40)).unwrap();
        assert_eq!(board.current_node().unwrap().parent, Some(0));
        assert_eq!(board.tree().node(0).unwrap().children, vec![1]);
        assert_eq!(board.current(), Color::Black);
    }

    #[test]
    fn test_resign_is_rejected() {
        let mut board = Board::new(9, None).unwrap();
        assert_eq!(
            board.play(Move::Resign),
            Err(GameError::IllegalMove(MoveError::Resign))
        );
        assert!(board.tree().is_empty());
    }

    #[test]
    fn test_illegal_move_records_nothing() {
        let mut board = Board::new(9, None).unwrap();
        board.play(Move::Play(0)).unwrap();
        assert!(board.play(Move::Play(0)).is_err());
        assert_eq!(board.tree().len(), 1);
        assert_eq!(board.current(), Color::White);
    }

    #[test]
    fn test_both_passed() {
        let mut board = Board::new(9, None).unwrap();
        assert!(!board.both_passed());
        board.pass_turn().unwrap();
        assert!(!board.both_passed());
        board.pass_turn().unwrap();
        assert!(board.both_passed());
    }

    #[test]
    fn test_navigation_replays_position() {
        let mut board = Board::new(9, None).unwrap();
        board.play(Move::Play(10)).unwrap();
        board.play(Move::Play(20)).unwrap();
        board.play(Move::Play(30)).unwrap();

        board.set_current_node(0).unwrap();
        assert_eq!(board.at(10), Some(Color::Black));
        assert_eq!(board.at(20), None);
        assert_eq!(board.current(), Color::White);

        board.set_current_node(2).unwrap();
        assert_eq!(board.at(30), Some(Color::Black));
        assert_eq!(board.current(), Color::White);

        assert_eq!(board.set_current_node(3), Err(GameError::InvalidNode(3)));
        assert_eq!(board.current_node_id(), Some(2));
    }

    #[test]
    fn test_handicap_after_start() {
        let mut board = Board::new(9, None).unwrap();
        board.pass_turn().unwrap();
        assert_eq!(board.place_handicap(2), Err(GameError::AlreadyStarted));
        assert_eq!(board.set_first_player(Color::White), Err(GameError::AlreadyStarted));
    }

    #[test]
    fn test_toggle_edit_collects_changes() {
        let mut board = Board::new(9, None).unwrap();
        board.toggle_edit(4, Color::Black).unwrap();
        board.toggle_edit(5, Color::White).unwrap();
        assert_eq!(board.tree().len(), 1);
        assert_eq!(board.at(4), Some(Color::Black));

        board.toggle_edit(4, Color::Black).unwrap();
        assert_eq!(board.at(4), None);
        let Action::Edit { changes } = &board.current_node().unwrap().action else {
            panic!("expected an edit node");
        };
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[&5],
            EditChange {
                before: None,
                after: Some(Color::White)
            }
        );
    }

    #[test]
    fn test_edits_survive_navigation() {
        let mut board = Board::new(9, None).unwrap();
        board.play(Move::Play(0)).unwrap();
        board.add_edits(&[1, 2], &[3], &[0]).unwrap();
        assert_eq!(board.at(0), None);

        board.set_current_node(0).unwrap();
        assert_eq!(board.at(0), Some(Color::Black));
        assert_eq!(board.at(1), None);

        board.set_current_node(1).unwrap();
        assert_eq!(board.at(0), None);
        assert_eq!(board.at(1), Some(Color::Black));
        assert_eq!(board.at(3), Some(Color::White));
        assert_eq!(board.current(), Color::White);
    }

    #[test]
    fn test_annotation_creates_node_when_empty() {
        let mut board = Board::new(9, None).unwrap();
        board.toggle_symbol(3, Symbol::Triangle).unwrap();
        assert_eq!(board.tree().len(), 1);
        let node = board.current_node().unwrap();
        assert!(node.action.is_edit());
        assert_eq!(node.annotations.symbols.get(&3), Some(&Symbol::Triangle));

        board.toggle_label(4).unwrap();
        assert_eq!(board.tree().len(), 1);
        assert!(board.toggle_number(81).is_err());
    }

    #[test]
    fn test_dead_marks_survive_navigation() {
        let mut board = Board::new(9, None).unwrap();
        board.play(Move::Play(0)).unwrap();
        board.pass_turn().unwrap();
        board.pass_turn().unwrap();
        assert!(board.toggle_marked_dead(0).unwrap());
        let marked = board.score(7.5);

        board.set_current_node(0).unwrap();
        assert!(!board.is_marked_dead(0));
        board.set_current_node(2).unwrap();
        assert!(board.is_marked_dead(0));
        assert_eq!(board.score(7.5), marked);
        assert_eq!(board.current_node().unwrap().annotations.dead, BTreeSet::from([0]));
    }

    #[test]
    fn test_pass_keeps_dead_marks_on_new_node() {
        let mut board = Board::new(9, None).unwrap();
        board.play(Move::Play(0)).unwrap();
        board.mark_dead(0).unwrap();
        board.pass_turn().unwrap();
        assert!(board.is_marked_dead(0));

        board.set_current_node(0).unwrap();
        board.set_current_node(1).unwrap();
        assert!(board.is_marked_dead(0));

        board.set_current_node(0).unwrap();
        board.play(Move::Play(1)).unwrap();
        assert!(!board.is_marked_dead(0));
    }

    #[test]
    fn test_from_state_rejects_wrong_turn_or_ko() {
        let mut board = Board::new(9, None).unwrap();
        board.play(Move::Play(10)).unwrap();

        let mut state = board.to_state();
        state.position.current = Color::Black;
        assert!(matches!(
            Board::from_state(state),
            Err(GameError::CorruptState(_))
        ));

        let mut state = board.to_state();
        state.position.ko = Some(40);
        assert!(matches!(
            Board::from_state(state),
            Err(GameError::CorruptState(_))
        ));

        assert_eq!(Board::from_state(board.to_state()).unwrap(), board);
    }

    #[test]
    fn test_new_rejects_size_mismatch() {
        let state = Position::new(9).unwrap().to_state();
        assert!(matches!(
            Board::new(13, Some(state)),
            Err(GameError::CorruptState(_))
        ));
    }
}
