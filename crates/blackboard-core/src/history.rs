//! Reversible commands and the bounded undo/redo history.

use crate::elements::{Element, ElementId};
use crate::store::{ElementStore, LayerChange};
use kurbo::Point;
use std::collections::VecDeque;

/// Default number of undoable commands kept.
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// A deep copy of an element plus the insertion slot it occupied.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub element: Element,
    pub index: Option<usize>,
}

impl Snapshot {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            index: None,
        }
    }
}

/// One reversible mutation of the element store.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `(id, old, new)` positions.
    Move(Vec<(ElementId, Point, Point)>),
    /// Elements that exist after execute.
    Create(Vec<Snapshot>),
    /// Elements that are gone after execute.
    Delete(Vec<Snapshot>),
    LayerOrder(Vec<LayerChange>),
}

impl Command {
    /// Create command for a single element.
    pub fn create(element: Element) -> Self {
        Command::Create(vec![Snapshot::new(element)])
    }

    /// Create command for elements already present in the store.
    pub fn create_from_store(store: &ElementStore, ids: &[ElementId]) -> Self {
        Command::Create(
            ids.iter()
                .filter_map(|id| {
                    let index = store.index_of(id)?;
                    store.element(id).map(|element| Snapshot {
                        element: element.clone(),
                        index: Some(index),
                    })
                })
                .collect(),
        )
    }

    /// Delete command snapshotting the given elements. Missing ids are skipped.
    pub fn delete(store: &ElementStore, ids: &[ElementId]) -> Self {
        let mut snapshots: Vec<Snapshot> = ids
            .iter()
            .filter_map(|id| {
                let index = store.index_of(id)?;
                store.element(id).map(|element| Snapshot {
                    element: element.clone(),
                    index: Some(index),
                })
            })
            .collect();
        // Restoring in ascending slot order puts each element back exactly
        snapshots.sort_by_key(|s| s.index);
        Command::Delete(snapshots)
    }

    /// Move command from `(id, old)` pairs and a shared displacement.
    pub fn translate(moves: Vec<(ElementId, Point)>, delta: kurbo::Vec2) -> Self {
        Command::Move(
            moves
                .into_iter()
                .map(|(id, old)| (id, old, old + delta))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Command::Move(moves) => moves.is_empty(),
            Command::Create(items) | Command::Delete(items) => items.is_empty(),
            Command::LayerOrder(changes) => changes.is_empty(),
        }
    }

    /// Ids of every element this command touches.
    pub fn affected_ids(&self) -> Vec<ElementId> {
        match self {
            Command::Move(moves) => moves.iter().map(|(id, _, _)| id.clone()).collect(),
            Command::Create(items) | Command::Delete(items) => {
                items.iter().map(|s| s.element.id.clone()).collect()
            }
            Command::LayerOrder(changes) => changes.iter().map(|c| c.id.clone()).collect(),
        }
    }

    pub fn execute(&self, store: &mut ElementStore) {
        match self {
            Command::Move(moves) => {
                for (id, _, new) in moves {
                    store.set_position(id, *new);
                }
            }
            Command::Create(items) => restore_snapshots(store, items),
            Command::Delete(items) => remove_snapshots(store, items),
            Command::LayerOrder(changes) => {
                for change in changes {
                    store.set_z_index(&change.id, change.new);
                }
            }
        }
    }

    pub fn undo(&self, store: &mut ElementStore) {
        match self {
            Command::Move(moves) => {
                for (id, old, _) in moves {
                    store.set_position(id, *old);
                }
            }
            Command::Create(items) => remove_snapshots(store, items),
            Command::Delete(items) => restore_snapshots(store, items),
            Command::LayerOrder(changes) => {
                for change in changes {
                    store.set_z_index(&change.id, change.old);
                }
            }
        }
    }

    pub fn redo(&self, store: &mut ElementStore) {
        self.execute(store);
    }
}

fn restore_snapshots(store: &mut ElementStore, items: &[Snapshot]) {
    for snapshot in items {
        // Idempotent: an element that is still present is left as is
        store.insert_element(snapshot.element.clone(), snapshot.index);
    }
}

fn remove_snapshots(store: &mut ElementStore, items: &[Snapshot]) {
    for snapshot in items.iter().rev() {
        store.remove_element(&snapshot.element.id);
    }
}

/// Bounded undo/redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Run a command and record it. Clears the redo stack.
    pub fn execute(&mut self, command: Command, store: &mut ElementStore) {
        command.execute(store);
        self.push(command);
    }

    /// Record a command whose effect is already applied to the store.
    pub fn push(&mut self, command: Command) {
        self.redo_stack.clear();
        self.undo_stack.push_back(command);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self, store: &mut ElementStore) -> bool {
        let Some(command) = self.undo_stack.pop_back() else {
            return false;
        };
        command.undo(store);
        log::debug!("Undo {}", command_name(&command));
        self.redo_stack.push(command);
        true
    }

    /// Returns false when there is nothing to redo.
    pub fn redo(&mut self, store: &mut ElementStore) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        command.redo(store);
        log::debug!("Redo {}", command_name(&command));
        self.undo_stack.push_back(command);
        true
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the depth, evicting the oldest entries if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Move(_) => "move",
        Command::Create(_) => "create",
        Command::Delete(_) => "delete",
        Command::LayerOrder(_) => "layer",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Payload, TextPayload};
    use crate::store::LayerMove;
    use kurbo::Vec2;

    /// Deterministic xorshift generator for randomized tests.
    struct XorShift(u64);

    impl XorShift {
        fn next(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        fn below(&mut self, n: u64) -> u64 {
            self.next() % n
        }

        fn coord(&mut self) -> f64 {
            self.below(1000) as f64 - 500.0
        }
    }

    /// Observable state: insertion-ordered `(id, position, size, z)`.
    type State = Vec<(ElementId, Point, kurbo::Size, i64)>;

    fn state(store: &ElementStore) -> State {
        let mut ids: Vec<_> = store.all_elements().iter().map(|e| e.id.clone()).collect();
        ids.sort_by_key(|id| store.index_of(id));
        ids.iter()
            .filter_map(|id| store.element(id))
            .map(|e| (e.id.clone(), e.position, e.size(), e.z_index))
            .collect()
    }

    fn random_store(rng: &mut XorShift) -> ElementStore {
        let mut store = ElementStore::new();
        let count = 1 + rng.below(8);
        for _ in 0..count {
            let (x, y) = (rng.coord(), rng.coord());
            let el = store.add_element(Payload::Text(TextPayload::new("t")), x, y);
            el.set_size(10.0, 10.0);
        }
        store
    }

    fn random_subset(rng: &mut XorShift, store: &ElementStore) -> Vec<ElementId> {
        let picked: Vec<ElementId> = store
            .all_elements()
            .iter()
            .filter(|_| rng.below(2) == 0)
            .map(|e| e.id.clone())
            .collect();
        if picked.is_empty() {
            vec![store.all_elements()[0].id.clone()]
        } else {
            picked
        }
    }

    fn random_command(rng: &mut XorShift, store: &mut ElementStore) -> Command {
        let ids = random_subset(rng, store);
        match rng.below(4) {
            0 => {
                let moves = ids
                    .iter()
                    .filter_map(|id| store.element(id).map(|e| (id.clone(), e.position)))
                    .collect();
                Command::translate(moves, Vec2::new(rng.coord(), rng.coord()))
            }
            1 => {
                let mut el = Element::new(
                    Payload::Text(TextPayload::new("new")),
                    Point::new(rng.coord(), rng.coord()),
                    store.next_z_index(),
                );
                el.set_size(5.0, 5.0);
                Command::create(el)
            }
            2 => Command::delete(store, &ids),
            _ => {
                let movement = match rng.below(4) {
                    0 => LayerMove::ToFront,
                    1 => LayerMove::ToBack,
                    2 => LayerMove::Forward,
                    _ => LayerMove::Backward,
                };
                Command::LayerOrder(store.layer_plan(&ids, movement))
            }
        }
    }

    #[test]
    fn test_command_inverse_law_randomized() {
        let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
        for _ in 0..200 {
            let mut store = random_store(&mut rng);
            let command = random_command(&mut rng, &mut store);
            let before = state(&store);
            command.execute(&mut store);
            command.undo(&mut store);
            assert_eq!(state(&store), before, "inverse failed for {:?}", command);
        }
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut store = ElementStore::new();
        let mut history = History::default();
        let id = {
            let el = store.add_element(Payload::Text(TextPayload::new("a")), 0.0, 0.0);
            el.set_size(10.0, 10.0);
            el.id.clone()
        };
        history.execute(
            Command::translate(vec![(id.clone(), Point::ZERO)], Vec2::new(10.0, 5.0)),
            &mut store,
        );
        assert_eq!(store.element(&id).unwrap().position, Point::new(10.0, 5.0));

        assert!(history.undo(&mut store));
        assert_eq!(store.element(&id).unwrap().position, Point::ZERO);
        assert!(history.redo(&mut store));
        assert_eq!(store.element(&id).unwrap().position, Point::new(10.0, 5.0));
        assert!(!history.redo(&mut store));
    }

    #[test]
    fn test_empty_stacks_report_failure() {
        let mut store = ElementStore::new();
        let mut history = History::default();
        assert!(!history.undo(&mut store));
        assert!(!history.redo(&mut store));
    }

    #[test]
    fn test_new_command_invalidates_redo() {
        let mut store = ElementStore::new();
        let mut history = History::default();
        let mut el = Element::new(Payload::Text(TextPayload::new("a")), Point::ZERO, 0);
        el.set_size(1.0, 1.0);
        let id = el.id.clone();
        history.execute(Command::create(el), &mut store);
        history.execute(
            Command::translate(vec![(id, Point::ZERO)], Vec2::new(1.0, 1.0)),
            &mut store,
        );
        assert!(history.undo(&mut store));
        assert!(history.can_redo());

        let other = Element::new(Payload::Text(TextPayload::new("b")), Point::ZERO, 1);
        history.execute(Command::create(other), &mut store);
        assert!(!history.redo(&mut store));
    }

    #[test]
    fn test_undo_stack_bound() {
        let mut store = ElementStore::new();
        let mut history = History::new(50);
        let id = store
            .add_element(Payload::Text(TextPayload::new("a")), 0.0, 0.0)
            .id
            .clone();
        for i in 0..60 {
            let old = Point::new(i as f64, 0.0);
            history.execute(
                Command::translate(vec![(id.clone(), old)], Vec2::new(1.0, 0.0)),
                &mut store,
            );
        }
        assert_eq!(history.undo_len(), 50);

        let mut undone = 0;
        while history.undo(&mut store) {
            undone += 1;
        }
        assert_eq!(undone, 50);
        // The oldest 10 moves are unrecoverable
        assert_eq!(store.element(&id).unwrap().position, Point::new(10.0, 0.0));
    }

    #[test]
    fn test_delete_undo_restores_exactly() {
        let mut store = ElementStore::new();
        let mut ids = Vec::new();
        for i in 0..3 {
            let el = store.add_element(Payload::Text(TextPayload::new("x")), i as f64, 0.0);
            el.set_size(4.0, 4.0);
            ids.push(el.id.clone());
        }
        store.set_z_index(&ids[2], 0);
        store.select_all();
        let before = state(&store);

        let mut history = History::default();
        let command = Command::delete(&store, &[ids[2].clone(), ids[0].clone()]);
        history.execute(command, &mut store);
        assert_eq!(store.len(), 1);
        assert!(store.selected_ids().iter().all(|id| store.contains(id)));

        history.undo(&mut store);
        assert_eq!(state(&store), before);
        // Tie between ids[0] and ids[2] at z 0 still resolves by insertion order
        assert_eq!(store.all_elements()[0].id, ids[0]);
        assert!(store.next_z_index() >= 3);
    }

    #[test]
    fn test_create_is_idempotent() {
        let mut store = ElementStore::new();
        let el = Element::new(Payload::Text(TextPayload::new("a")), Point::ZERO, 0);
        let command = Command::create(el);
        command.execute(&mut store);
        command.execute(&mut store);
        assert_eq!(store.len(), 1);
        command.undo(&mut store);
        command.undo(&mut store);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_max_depth_evicts_oldest() {
        let mut store = ElementStore::new();
        let mut history = History::new(10);
        for _ in 0..10 {
            let el = Element::new(Payload::Text(TextPayload::new("a")), Point::ZERO, 0);
            history.execute(Command::create(el), &mut store);
        }
        history.set_max_depth(4);
        assert_eq!(history.undo_len(), 4);
        assert_eq!(history.max_depth(), 4);
    }
}
