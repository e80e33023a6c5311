//! The board: element store, history and camera behind one mutation API.

use crate::camera::Camera;
use crate::config::BoardConfig;
use crate::document::{self, BoardDocument, DocumentError};
use crate::elements::{ElementId, Payload};
use crate::history::{Command, History};
use crate::ingest::{self, AiResponse, Segment};
use crate::storage::{AutoSaveManager, Storage, StorageResult};
use crate::store::{ElementStore, LayerMove};
use kurbo::{Point, Vec2};

/// A board being edited.
///
/// Undoable mutations go through [`Board::execute`] or the helpers built on
/// it. Selection and view changes are not recorded.
#[derive(Debug, Clone)]
pub struct Board {
    pub store: ElementStore,
    pub camera: Camera,
    history: History,
    config: BoardConfig,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            store: ElementStore::new(),
            camera: Camera::with_zoom_bounds(config.min_zoom, config.max_zoom),
            history: History::new(config.max_undo_depth),
            config,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Execute and record a command. Empty commands are dropped.
    pub fn execute(&mut self, command: Command) -> bool {
        if command.is_empty() {
            return false;
        }
        self.history.execute(command, &mut self.store);
        true
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.store)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.store)
    }

    /// Start a new, empty board.
    pub fn clear(&mut self) {
        self.store.clear();
        self.history.clear();
        log::debug!("Board cleared");
    }

    /// Record elements that were just added to the store as one Create step.
    fn record_created(&mut self, ids: &[ElementId]) -> Vec<ElementId> {
        let command = Command::create_from_store(&self.store, ids);
        if !command.is_empty() {
            self.history.push(command);
        }
        ids.to_vec()
    }

    /// Add an element sized to its content, as an undoable step.
    pub fn create_element(&mut self, payload: Payload, position: Point) -> ElementId {
        let element = self.store.add_element(payload, position.x, position.y);
        element.fit_to_content();
        let id = element.id.clone();
        self.record_created(std::slice::from_ref(&id));
        id
    }

    /// Delete the selection. Returns the number of elements removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.store.selected_ids().to_vec();
        self.delete(&ids)
    }

    pub fn delete(&mut self, ids: &[ElementId]) -> usize {
        let command = Command::delete(&self.store, ids);
        let count = command.affected_ids().len();
        self.execute(command);
        count
    }

    /// Move elements from recorded positions by `delta`.
    ///
    /// `from` holds each element's position before the move, so a live drag
    /// preview can be committed with the same call.
    pub fn move_elements(&mut self, from: Vec<(ElementId, Point)>, delta: Vec2) -> bool {
        if !(delta.x.is_finite() && delta.y.is_finite()) || delta == Vec2::ZERO {
            return false;
        }
        self.execute(Command::translate(from, delta))
    }

    /// Move the selection by `delta` as one step.
    pub fn nudge_selected(&mut self, delta: Vec2) -> bool {
        let from = self
            .store
            .selected_elements()
            .iter()
            .map(|e| (e.id.clone(), e.position))
            .collect();
        self.move_elements(from, delta)
    }

    /// Reorder elements as one undoable step.
    pub fn reorder(&mut self, ids: &[ElementId], movement: LayerMove) -> bool {
        let plan = self.store.layer_plan(ids, movement);
        self.execute(Command::LayerOrder(plan))
    }

    pub fn reorder_selected(&mut self, movement: LayerMove) -> bool {
        let ids = self.store.selected_ids().to_vec();
        self.reorder(&ids, movement)
    }

    pub fn copy_selected(&mut self) -> String {
        self.store.copy_selected()
    }

    /// Copy then delete the selection.
    pub fn cut_selected(&mut self) -> String {
        let json = self.store.copy_selected();
        self.delete_selected();
        json
    }

    pub fn paste(&mut self, offset: Vec2) -> Vec<ElementId> {
        let ids = self.store.paste(offset.x, offset.y);
        self.record_created(&ids)
    }

    pub fn paste_from_json(&mut self, json: &str, target: Point) -> Vec<ElementId> {
        let ids = self.store.paste_from_json(json, target.x, target.y);
        self.record_created(&ids)
    }

    /// Copy and paste the selection at the configured offset.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        self.store.copy_selected();
        let offset = self.config.duplicate_offset;
        self.paste(Vec2::new(offset, offset))
    }

    pub fn ingest_segments(&mut self, segments: &[Segment], origin: Point) -> Vec<ElementId> {
        let ids = ingest::ingest_segments(&mut self.store, segments, origin);
        self.record_created(&ids)
    }

    pub fn ingest_ai_response(&mut self, response: &AiResponse, at: Point) -> Vec<ElementId> {
        let ids = ingest::ingest_ai_response(&mut self.store, response, at, self.config.text_wrap_width);
        self.record_created(&ids)
    }

    pub fn to_document(&self) -> Result<BoardDocument, DocumentError> {
        document::serialize(&self.store)
    }

    /// Replace the board with a document. History is cleared on success;
    /// on failure the board is unchanged.
    pub fn load_document(&mut self, document: &BoardDocument) -> Result<usize, DocumentError> {
        let count = document::load(&mut self.store, document)?;
        self.history.clear();
        Ok(count)
    }

    /// Replace the board with the autosave slot. Undo history starts over
    /// when something was restored; a miss or a failed load leaves it alone.
    pub async fn restore_autosave<S: Storage>(
        &mut self,
        autosave: &mut AutoSaveManager<S>,
    ) -> StorageResult<Option<usize>> {
        let restored = autosave.restore(&mut self.store).await?;
        if restored.is_some() {
            self.history.clear();
        }
        Ok(restored)
    }
}
