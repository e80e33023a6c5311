//! A headless editing session: board, input, images and autosave together.

use crate::clipboard::SystemClipboard;
use crate::config::AppConfig;
use crate::controller::Controller;
use crate::input::{Modifiers, PointerButton, Tool};
use crate::notify::{BoardChange, ChangeSet};
use blackboard_core::document;
use blackboard_core::{
    AiResponse, AutoSaveManager, Board, BoardDocument, DocumentError, ElementId,
    Segment, Storage, StorageError,
};
use blackboard_render::{AssetCache, Painter, RenderContext, SvgPainter, decode_bytes, render_board};
use kurbo::{Point, Size};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Invalid collaborator response: {0}")]
    Ingest(#[from] serde_json::Error),
}

/// Everything a host needs to drive one board.
pub struct Session<S: Storage> {
    pub board: Board,
    pub controller: Controller,
    assets: AssetCache,
    autosave: AutoSaveManager<S>,
    clipboard: Box<dyn SystemClipboard>,
    config: AppConfig,
}

impl<S: Storage> Session<S> {
    pub fn new(config: AppConfig, storage: Arc<S>, clipboard: Box<dyn SystemClipboard>) -> Self {
        let mut controller = Controller::new();
        controller.pen_color = config.pen_color;
        controller.pen_width = config.pen_width;
        controller.zoom_step = config.zoom_step;

        let mut autosave = AutoSaveManager::new(storage);
        autosave.set_interval(Duration::from_secs(config.board.autosave_interval_secs));

        Self {
            board: Board::new(config.board.clone()),
            controller,
            assets: AssetCache::new(),
            autosave,
            clipboard,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn autosave(&self) -> &AutoSaveManager<S> {
        &self.autosave
    }

    /// Load the last autosave and start the autosave timer.
    ///
    /// A successful restore replaces the board, so undo history starts over.
    pub fn restore_at(&mut self, now: Instant) -> Result<Option<usize>, SessionError> {
        let restored = pollster::block_on(self.board.restore_autosave(&mut self.autosave))?;
        if restored.is_some() {
            self.sync_assets();
        }
        self.autosave.start_at(now);
        Ok(restored)
    }

    pub fn restore(&mut self) -> Result<Option<usize>, SessionError> {
        self.restore_at(Instant::now())
    }

    // --- Input ---

    pub fn set_tool(&mut self, tool: Tool) -> bool {
        self.controller.set_tool(&mut self.board, tool);
        self.settle(true)
    }

    pub fn pointer_down(&mut self, position: Point, button: PointerButton, modifiers: Modifiers) -> bool {
        let redraw = self
            .controller
            .pointer_down(&mut self.board, position, button, modifiers);
        self.settle(redraw)
    }

    pub fn pointer_move(&mut self, position: Point) -> bool {
        let redraw = self.controller.pointer_move(&mut self.board, position);
        self.settle(redraw)
    }

    pub fn pointer_up(&mut self, position: Point) -> bool {
        let redraw = self.controller.pointer_up(&mut self.board, position);
        self.settle(redraw)
    }

    pub fn wheel(&mut self, position: Point, notches: f64) -> bool {
        let redraw = self.controller.wheel(&mut self.board, position, notches);
        self.settle(redraw)
    }

    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
        let redraw = self
            .controller
            .key_down(&mut self.board, self.clipboard.as_mut(), key, modifiers);
        self.settle(redraw)
    }

    /// React to the changes a handler reported.
    fn settle(&mut self, redraw: bool) -> bool {
        let changes: ChangeSet = self.controller.notifier_mut().take_pending();
        if changes.content {
            self.autosave.mark_dirty();
            self.sync_assets();
        }
        redraw || !changes.is_empty()
    }

    fn notify_content(&mut self) -> bool {
        let notifier = self.controller.notifier_mut();
        notifier.emit(BoardChange::Content);
        notifier.emit(BoardChange::Selection);
        self.settle(true)
    }

    // --- Content from outside the canvas ---

    /// Place a collaborator answer at the center of the viewport.
    pub fn insert_ai_response(&mut self, json: &str) -> Result<Vec<ElementId>, SessionError> {
        let response = AiResponse::from_json(json)?;
        let at = self.viewport_center();
        let ids = self.board.ingest_ai_response(&response, at);
        if !ids.is_empty() {
            self.notify_content();
        }
        Ok(ids)
    }

    /// Place positioned segments relative to the viewport's top-left corner.
    pub fn insert_segments(&mut self, segments: &[Segment]) -> Vec<ElementId> {
        let origin = self.board.camera.screen_to_canvas(Point::ZERO);
        let ids = self.board.ingest_segments(segments, origin);
        if !ids.is_empty() {
            self.notify_content();
        }
        ids
    }

    fn viewport_center(&self) -> Point {
        let viewport = self.config.viewport();
        self.board
            .camera
            .screen_to_canvas(Point::new(viewport.width / 2.0, viewport.height / 2.0))
    }

    // --- Images ---

    /// Sources the host still has to fetch.
    pub fn pending_images(&self) -> Vec<(ElementId, String)> {
        self.assets.pending()
    }

    /// Hand over fetched image bytes. Returns whether a redraw is due.
    pub fn complete_image(&mut self, id: &ElementId, src: &str, bytes: &[u8]) -> bool {
        let result = decode_bytes(bytes);
        self.assets.complete(&self.board.store, id, src, result)
    }

    fn sync_assets(&mut self) {
        let pruned = self.assets.prune(&self.board.store);
        let settled = self.assets.load_embedded(&self.board.store);
        if pruned + settled > 0 {
            log::debug!("Image cache: {} pruned, {} decoded", pruned, settled);
        }
    }

    // --- Persistence ---

    /// Drive the autosave timer. Storage errors are logged, not returned.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        match pollster::block_on(self.autosave.tick_at(now, &self.board.store)) {
            Ok(saved) => saved,
            Err(e) => {
                log::error!("Autosave failed: {}", e);
                false
            }
        }
    }

    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn save_now(&mut self) -> Result<(), SessionError> {
        pollster::block_on(self.autosave.save(&self.board.store))?;
        Ok(())
    }

    pub fn export_document(&self, path: &Path) -> Result<(), SessionError> {
        document::export_to_file(path, &self.board.store)?;
        Ok(())
    }

    /// Replace the board with a document file. Undo history starts over.
    pub fn import_document(&mut self, path: &Path) -> Result<usize, SessionError> {
        let json = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let document = BoardDocument::from_json(&json)?;
        let count = self.board.load_document(&document)?;
        self.notify_content();
        Ok(count)
    }

    // --- Rendering ---

    pub fn render(&self, painter: &mut dyn Painter) {
        let preview = self.controller.preview();
        let ctx = RenderContext::new(&self.board, self.config.viewport())
            .with_assets(&self.assets)
            .with_background(self.config.background_color.into())
            .with_selection_color(self.config.selection_color.into())
            .with_marquee(self.controller.marquee())
            .with_preview_stroke(preview.as_ref());
        render_board(painter, &ctx);
    }

    pub fn render_svg(&self) -> String {
        let viewport: Size = self.config.viewport();
        let mut painter = SvgPainter::new(viewport);
        self.render(&mut painter);
        painter.finish()
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use blackboard_core::{MemoryStorage, Payload, TextPayload};
    use blackboard_render::DisplayList;

    fn session() -> Session<MemoryStorage> {
        Session::new(
            AppConfig::default(),
            Arc::new(MemoryStorage::new()),
            Box::new(MemoryClipboard::new()),
        )
    }

    fn draw_stroke(session: &mut Session<MemoryStorage>) {
        session.set_tool(Tool::Pen);
        session.pointer_down(Point::new(10.0, 10.0), PointerButton::Primary, Modifiers::NONE);
        session.pointer_move(Point::new(40.0, 20.0));
        session.pointer_up(Point::new(60.0, 50.0));
    }

    #[test]
    fn test_content_change_marks_dirty_and_autosaves() {
        let mut s = session();
        let start = Instant::now();
        assert_eq!(s.restore_at(start).unwrap(), None);
        assert!(!s.autosave().is_dirty());

        draw_stroke(&mut s);
        assert!(s.autosave().is_dirty());

        // Not yet due
        assert!(!s.tick_at(start + Duration::from_secs(1)));
        assert!(s.tick_at(start + Duration::from_secs(31)));
        assert!(!s.autosave().is_dirty());

        // A fresh session on the same storage restores the stroke
        let storage = Arc::clone(s.autosave().storage());
        let mut other = Session::new(AppConfig::default(), storage, Box::new(MemoryClipboard::new()));
        assert_eq!(other.restore_at(start).unwrap(), Some(1));
        assert_eq!(other.board.store.len(), 1);
    }

    #[test]
    fn test_restore_discards_undo_history() {
        let mut s = session();
        s.board.create_element(Payload::Text(TextPayload::new("saved")), Point::ZERO);
        s.save_now().unwrap();
        draw_stroke(&mut s);
        assert_eq!(s.board.store.len(), 2);
        assert!(s.board.history().can_undo());

        assert_eq!(s.restore_at(Instant::now()).unwrap(), Some(1));
        assert!(!s.board.history().can_undo());
        // Undo has nothing stale to replay against the restored board
        assert!(!s.key_down("z", Modifiers::CTRL));
        assert_eq!(s.board.store.len(), 1);
    }

    #[test]
    fn test_export_failure_is_document_error() {
        let dir = tempfile::tempdir().unwrap();
        let s = session();
        let result = s.export_document(&dir.path().join("missing").join("board.json"));
        assert!(matches!(result, Err(SessionError::Document(DocumentError::Io { .. }))));
    }

    #[test]
    fn test_view_change_does_not_dirty() {
        let mut s = session();
        assert!(s.wheel(Point::new(100.0, 100.0), -1.0));
        assert!(!s.autosave().is_dirty());
    }

    #[test]
    fn test_insert_ai_response_centers_and_undoes() {
        let mut s = session();
        let json = r#"{"content": "The derivative of sin is cos", "hasGraph": true, "graphData": {"expression": "cos(x)"}}"#;
        let ids = s.insert_ai_response(json).unwrap();
        assert_eq!(ids.len(), 2);
        let text = s.board.store.element(&ids[0]).unwrap();
        assert_eq!(text.position, Point::new(640.0, 400.0));
        assert!(s.autosave().is_dirty());

        assert!(s.key_down("z", Modifiers::CTRL));
        assert!(s.board.store.is_empty());

        assert!(matches!(s.insert_ai_response("{"), Err(SessionError::Ingest(_))));
    }

    #[test]
    fn test_export_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        let mut s = session();
        s.board.create_element(Payload::Text(TextPayload::new("keep me")), Point::new(3.0, 4.0));
        s.export_document(&path).unwrap();

        let mut other = session();
        assert_eq!(other.import_document(&path).unwrap(), 1);
        assert!(!other.board.history().can_undo());
        let element = other.board.store.all_elements()[0];
        assert_eq!(element.position, Point::new(3.0, 4.0));

        let missing = other.import_document(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(SessionError::Document(DocumentError::Io { .. }))));
        assert_eq!(other.board.store.len(), 1);
    }

    #[test]
    fn test_render_includes_marquee_and_preview() {
        let mut s = session();
        s.pointer_down(Point::new(5.0, 5.0), PointerButton::Primary, Modifiers::NONE);
        s.pointer_move(Point::new(50.0, 50.0));

        let mut list = DisplayList::new();
        s.render(&mut list);
        // Background, then marquee fill and outline
        assert_eq!(list.len(), 3);
        s.pointer_up(Point::new(50.0, 50.0));

        let svg = s.render_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"1280\""));
    }

    #[test]
    fn test_external_image_completion() {
        use blackboard_core::ImagePayload;
        let mut s = session();
        let id = s
            .board
            .create_element(Payload::Image(ImagePayload::new("https://example.com/a.png", 1.0, 1.0)), Point::ZERO);
        s.notify_content();
        assert_eq!(s.pending_images(), vec![(id.clone(), "https://example.com/a.png".to_string())]);

        let img = image_bytes();
        assert!(s.complete_image(&id, "https://example.com/a.png", &img));
        assert!(s.assets().image(&id).is_some());
        assert!(s.pending_images().is_empty());
    }

    fn image_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        bytes.into_inner()
    }
}
