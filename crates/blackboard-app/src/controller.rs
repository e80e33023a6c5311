//! Pointer, wheel and keyboard handling for a board.
//!
//! Positions passed to the handlers are in screen coordinates. Every handler
//! returns whether the host should redraw, and reports what it changed
//! through the controller's [`Notifier`].

use crate::clipboard::SystemClipboard;
use crate::input::{Modifiers, PointerButton, Tool};
use crate::notify::{BoardChange, Notifier};
use crate::shortcuts::{Action, ShortcutRegistry};
use blackboard_core::{Board, ElementId, LayerMove, Payload, SerializableColor, StrokePayload};
use blackboard_render::StrokePreview;
use kurbo::{Point, Rect, Vec2};

/// Gesture in progress between pointer down and up.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    /// Dragging the selection. `origins` are positions at pointer down.
    Moving {
        start: Point,
        origins: Vec<(ElementId, Point)>,
        delta: Vec2,
    },
    /// Rubber-band selection, in screen coordinates.
    Marquee {
        start: Point,
        current: Point,
        base: Vec<ElementId>,
    },
    /// Pen stroke, in canvas coordinates.
    Drawing { points: Vec<Point> },
    Panning { last: Point },
}

/// Translates input events into board operations.
#[derive(Debug)]
pub struct Controller {
    tool: Tool,
    gesture: Gesture,
    notifier: Notifier,
    pub pen_color: SerializableColor,
    pub pen_width: f64,
    /// Zoom change per wheel notch.
    pub zoom_step: f64,
    /// Last pointer position, used as the paste target.
    pointer: Point,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            tool: Tool::default(),
            gesture: Gesture::Idle,
            notifier: Notifier::new(),
            pen_color: SerializableColor::black(),
            pen_width: StrokePayload::DEFAULT_WIDTH,
            zoom_step: 0.1,
            pointer: Point::ZERO,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools. Any gesture in progress is cancelled.
    pub fn set_tool(&mut self, board: &mut Board, tool: Tool) {
        if self.tool != tool {
            self.cancel_gesture(board);
            self.tool = tool;
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Current marquee rectangle in screen coordinates.
    pub fn marquee(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::Marquee { start, current, .. } => Some(Rect::from_points(*start, *current)),
            _ => None,
        }
    }

    /// Stroke being drawn, for the renderer.
    pub fn preview(&self) -> Option<StrokePreview> {
        match &self.gesture {
            Gesture::Drawing { points } => Some(StrokePreview {
                points: points.clone(),
                color: self.pen_color.into(),
                width: self.pen_width,
            }),
            _ => None,
        }
    }

    pub fn pointer_down(
        &mut self,
        board: &mut Board,
        position: Point,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> bool {
        self.pointer = position;
        if !self.is_idle() {
            return false;
        }
        if button == PointerButton::Middle
            || (button == PointerButton::Primary && self.tool == Tool::Pan)
        {
            self.gesture = Gesture::Panning { last: position };
            return false;
        }
        if button != PointerButton::Primary {
            return false;
        }

        let canvas = board.camera.screen_to_canvas(position);
        match self.tool {
            Tool::Pen => {
                self.gesture = Gesture::Drawing {
                    points: vec![canvas],
                };
                true
            }
            Tool::Select => self.select_down(board, position, canvas, modifiers),
            Tool::Pan => false,
        }
    }

    fn select_down(
        &mut self,
        board: &mut Board,
        screen: Point,
        canvas: Point,
        modifiers: Modifiers,
    ) -> bool {
        let hit = board
            .store
            .element_at(canvas.x, canvas.y)
            .map(|e| e.id.clone());

        let Some(id) = hit else {
            let base = if modifiers.shift {
                board.store.selected_ids().to_vec()
            } else {
                if !board.store.selected_ids().is_empty() {
                    board.store.clear_selection();
                    self.notifier.emit(BoardChange::Selection);
                }
                Vec::new()
            };
            self.gesture = Gesture::Marquee {
                start: screen,
                current: screen,
                base,
            };
            return true;
        };

        if modifiers.shift {
            board.store.toggle_selection(&id);
            self.notifier.emit(BoardChange::Selection);
            if !board.store.is_selected(&id) {
                return true;
            }
        } else if !board.store.is_selected(&id) {
            board.store.select_element(&id, false);
            self.notifier.emit(BoardChange::Selection);
        }

        let origins = board
            .store
            .selected_elements()
            .iter()
            .map(|e| (e.id.clone(), e.position))
            .collect();
        self.gesture = Gesture::Moving {
            start: canvas,
            origins,
            delta: Vec2::ZERO,
        };
        true
    }

    pub fn pointer_move(&mut self, board: &mut Board, position: Point) -> bool {
        self.pointer = position;
        let canvas = board.camera.screen_to_canvas(position);
        match &mut self.gesture {
            Gesture::Idle => false,
            Gesture::Panning { last } => {
                let delta = position - *last;
                *last = position;
                if delta == Vec2::ZERO {
                    return false;
                }
                board.camera.pan_by(delta);
                self.notifier.emit(BoardChange::View);
                true
            }
            Gesture::Drawing { points } => {
                if points.last() == Some(&canvas) {
                    return false;
                }
                points.push(canvas);
                true
            }
            Gesture::Marquee { current, .. } => {
                *current = position;
                self.apply_marquee(board);
                true
            }
            Gesture::Moving {
                start,
                origins,
                delta,
            } => {
                *delta = canvas - *start;
                for (id, origin) in origins.iter() {
                    board.store.set_position(id, *origin + *delta);
                }
                true
            }
        }
    }

    pub fn pointer_up(&mut self, board: &mut Board, position: Point) -> bool {
        let mut redraw = self.pointer_move(board, position);
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Panning { .. } => {}
            Gesture::Marquee { .. } => redraw = true,
            Gesture::Drawing { points } => {
                if points.is_empty() {
                    return redraw;
                }
                let (stroke, origin) =
                    StrokePayload::from_absolute(&points, self.pen_color, self.pen_width);
                board.create_element(Payload::Stroke(stroke), origin);
                self.notifier.emit(BoardChange::Content);
                redraw = true;
            }
            Gesture::Moving { mut origins, delta, .. } => {
                origins.retain(|(id, _)| board.store.contains(id));
                // Put elements back so the command records the move from its origin
                for (id, origin) in &origins {
                    board.store.set_position(id, *origin);
                }
                if !origins.is_empty() && delta.hypot() > board.config().drag_threshold {
                    board.move_elements(origins, delta);
                    self.notifier.emit(BoardChange::Content);
                }
                redraw |= delta != Vec2::ZERO;
            }
        }
        redraw
    }

    /// Zoom around the cursor. Positive `notches` scroll down and zoom out.
    pub fn wheel(&mut self, board: &mut Board, position: Point, notches: f64) -> bool {
        let before = (board.camera.zoom, board.camera.pan);
        board.camera.zoom_at(position, -notches * self.zoom_step);
        if (board.camera.zoom, board.camera.pan) == before {
            return false;
        }
        self.notifier.emit(BoardChange::View);
        true
    }

    /// Resolve a key press through the shortcut registry and perform it.
    pub fn key_down(
        &mut self,
        board: &mut Board,
        clipboard: &mut dyn SystemClipboard,
        key: &str,
        modifiers: Modifiers,
    ) -> bool {
        match ShortcutRegistry::lookup(key, modifiers.ctrl, modifiers.shift) {
            Some(action) => self.perform(board, clipboard, action),
            None => false,
        }
    }

    pub fn perform(
        &mut self,
        board: &mut Board,
        clipboard: &mut dyn SystemClipboard,
        action: Action,
    ) -> bool {
        log::debug!("Action {:?}", action);
        // A drag in progress is rolled back before the board changes under it
        let cancelled = match action {
            Action::Copy | Action::Escape => false,
            _ => self.cancel_gesture(board),
        };
        let redraw = match action {
            Action::Undo => self.content_changed(board.undo()),
            Action::Redo => self.content_changed(board.redo()),
            Action::Delete => {
                let removed = board.delete_selected() > 0;
                self.selection_and_content_changed(removed)
            }
            Action::Copy => {
                if !board.store.selected_ids().is_empty() {
                    let json = board.copy_selected();
                    if let Err(e) = clipboard.set_text(&json) {
                        log::warn!("{}", e);
                    }
                }
                false
            }
            Action::Cut => {
                if board.store.selected_ids().is_empty() {
                    false
                } else {
                    let json = board.cut_selected();
                    if let Err(e) = clipboard.set_text(&json) {
                        log::warn!("{}", e);
                    }
                    self.selection_and_content_changed(true)
                }
            }
            Action::Paste => {
                let target = board.camera.screen_to_canvas(self.pointer);
                let mut ids = match clipboard.get_text() {
                    Some(text) => board.paste_from_json(&text, target),
                    None => Vec::new(),
                };
                if ids.is_empty() && !board.store.clipboard().is_empty() {
                    let offset = board.config().duplicate_offset;
                    ids = board.paste(Vec2::new(offset, offset));
                }
                self.selection_and_content_changed(!ids.is_empty())
            }
            Action::Duplicate => {
                let created = !board.duplicate_selected().is_empty();
                self.selection_and_content_changed(created)
            }
            Action::SelectAll => {
                board.store.select_all();
                self.notifier.emit(BoardChange::Selection);
                true
            }
            Action::BringToFront => self.content_changed(board.reorder_selected(LayerMove::ToFront)),
            Action::SendToBack => self.content_changed(board.reorder_selected(LayerMove::ToBack)),
            Action::BringForward => self.content_changed(board.reorder_selected(LayerMove::Forward)),
            Action::SendBackward => {
                self.content_changed(board.reorder_selected(LayerMove::Backward))
            }
            Action::Nudge { dx, dy } => {
                let moved = board.nudge_selected(Vec2::new(f64::from(dx), f64::from(dy)));
                self.content_changed(moved)
            }
            Action::Escape => {
                let aborted = self.cancel_gesture(board);
                let had_selection = !board.store.selected_ids().is_empty();
                if had_selection {
                    board.store.clear_selection();
                    self.notifier.emit(BoardChange::Selection);
                }
                aborted || had_selection
            }
        };
        cancelled || redraw
    }

    /// Abandon the current gesture, restoring dragged elements.
    fn cancel_gesture(&mut self, board: &mut Board) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => false,
            Gesture::Moving { origins, .. } => {
                for (id, origin) in &origins {
                    board.store.set_position(id, *origin);
                }
                true
            }
            Gesture::Marquee { .. } | Gesture::Drawing { .. } | Gesture::Panning { .. } => true,
        }
    }

    fn apply_marquee(&mut self, board: &mut Board) {
        let Gesture::Marquee {
            start,
            current,
            base,
        } = &self.gesture
        else {
            return;
        };
        let a = board.camera.screen_to_canvas(*start);
        let b = board.camera.screen_to_canvas(*current);
        board.store.select_in_bounds(a.x, a.y, b.x - a.x, b.y - a.y);
        for id in base {
            board.store.add_to_selection(id);
        }
        self.notifier.emit(BoardChange::Selection);
    }

    fn content_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.notifier.emit(BoardChange::Content);
        }
        changed
    }

    fn selection_and_content_changed(&mut self, changed: bool) -> bool {
        if changed {
            self.notifier.emit(BoardChange::Content);
            self.notifier.emit(BoardChange::Selection);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use blackboard_core::TextPayload;
    use kurbo::Size;

    /// Board with a 100x40 box at (0, 0) and one at (200, 0).
    fn board_with_two() -> (Board, ElementId, ElementId) {
        let mut board = Board::default();
        let a = board.create_element(Payload::Text(TextPayload::new("a")), Point::ZERO);
        let b = board.create_element(Payload::Text(TextPayload::new("b")), Point::new(200.0, 0.0));
        for id in [&a, &b] {
            board.store.element_mut(id).unwrap().set_size(100.0, 40.0);
        }
        (board, a, b)
    }

    fn position(board: &Board, id: &ElementId) -> Point {
        board.store.element(id).unwrap().position
    }

    fn drag(controller: &mut Controller, board: &mut Board, from: Point, to: Point) {
        controller.pointer_down(board, from, PointerButton::Primary, Modifiers::NONE);
        controller.pointer_move(board, from.midpoint(to));
        controller.pointer_up(board, to);
    }

    #[test]
    fn test_click_selects_topmost() {
        let (mut board, a, b) = board_with_two();
        let mut controller = Controller::new();

        assert!(controller.pointer_down(&mut board, Point::new(10.0, 10.0), PointerButton::Primary, Modifiers::NONE));
        controller.pointer_up(&mut board, Point::new(10.0, 10.0));
        assert_eq!(board.store.selected_ids(), &[a.clone()]);

        // Shift adds, shift again toggles off
        controller.pointer_down(&mut board, Point::new(210.0, 10.0), PointerButton::Primary, Modifiers::SHIFT);
        controller.pointer_up(&mut board, Point::new(210.0, 10.0));
        assert!(board.store.is_selected(&a) && board.store.is_selected(&b));
        controller.pointer_down(&mut board, Point::new(210.0, 10.0), PointerButton::Primary, Modifiers::SHIFT);
        controller.pointer_up(&mut board, Point::new(210.0, 10.0));
        assert_eq!(board.store.selected_ids(), &[a]);
        assert!(controller.notifier_mut().take_pending().selection);
    }

    #[test]
    fn test_drag_commits_single_move() {
        let (mut board, a, _) = board_with_two();
        let mut controller = Controller::new();
        let undo_before = board.history().undo_len();

        drag(&mut controller, &mut board, Point::new(10.0, 10.0), Point::new(60.0, 30.0));
        assert_eq!(position(&board, &a), Point::new(50.0, 20.0));
        assert_eq!(board.history().undo_len(), undo_before + 1);
        assert!(controller.notifier_mut().take_pending().content);

        assert!(board.undo());
        assert_eq!(position(&board, &a), Point::ZERO);
    }

    #[test]
    fn test_drag_under_threshold_snaps_back() {
        let (mut board, a, _) = board_with_two();
        let mut controller = Controller::new();
        let undo_before = board.history().undo_len();

        controller.pointer_down(&mut board, Point::new(10.0, 10.0), PointerButton::Primary, Modifiers::NONE);
        controller.pointer_move(&mut board, Point::new(12.0, 11.0));
        // Live preview moves the element
        assert_eq!(position(&board, &a), Point::new(2.0, 1.0));
        controller.pointer_up(&mut board, Point::new(12.0, 11.0));

        assert_eq!(position(&board, &a), Point::ZERO);
        assert_eq!(board.history().undo_len(), undo_before);
    }

    #[test]
    fn test_drag_respects_zoom() {
        let (mut board, a, _) = board_with_two();
        board.camera.zoom = 2.0;
        let mut controller = Controller::new();
        drag(&mut controller, &mut board, Point::new(10.0, 10.0), Point::new(110.0, 10.0));
        assert_eq!(position(&board, &a), Point::new(50.0, 0.0));
    }

    #[test]
    fn test_marquee_selects_intersecting() {
        let (mut board, a, b) = board_with_two();
        let mut controller = Controller::new();

        controller.pointer_down(&mut board, Point::new(-10.0, 100.0), PointerButton::Primary, Modifiers::NONE);
        controller.pointer_move(&mut board, Point::new(50.0, 20.0));
        assert!(controller.marquee().is_some());
        controller.pointer_up(&mut board, Point::new(50.0, 20.0));
        assert!(controller.marquee().is_none());
        assert_eq!(board.store.selected_ids(), &[a.clone()]);

        // Shift-marquee keeps the existing selection
        controller.pointer_down(&mut board, Point::new(150.0, 100.0), PointerButton::Primary, Modifiers::SHIFT);
        controller.pointer_up(&mut board, Point::new(250.0, 20.0));
        assert!(board.store.is_selected(&a) && board.store.is_selected(&b));

        // Plain click on empty space clears
        controller.pointer_down(&mut board, Point::new(500.0, 500.0), PointerButton::Primary, Modifiers::NONE);
        controller.pointer_up(&mut board, Point::new(500.0, 500.0));
        assert!(board.store.selected_ids().is_empty());
    }

    #[test]
    fn test_pen_creates_stroke() {
        let mut board = Board::default();
        let mut controller = Controller::new();
        controller.set_tool(&mut board, Tool::Pen);

        controller.pointer_down(&mut board, Point::new(10.0, 10.0), PointerButton::Primary, Modifiers::NONE);
        controller.pointer_move(&mut board, Point::new(20.0, 15.0));
        assert_eq!(controller.preview().map(|p| p.points.len()), Some(2));
        controller.pointer_up(&mut board, Point::new(30.0, 40.0));

        let elements = board.store.all_elements();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].position, Point::new(10.0, 10.0));
        assert_eq!(elements[0].size(), Size::new(20.0, 30.0));
        assert!(controller.preview().is_none());
        assert!(board.history().can_undo());
    }

    #[test]
    fn test_pan_and_middle_drag() {
        let mut board = Board::default();
        let mut controller = Controller::new();

        controller.pointer_down(&mut board, Point::new(0.0, 0.0), PointerButton::Middle, Modifiers::NONE);
        assert!(controller.pointer_move(&mut board, Point::new(30.0, -10.0)));
        controller.pointer_up(&mut board, Point::new(30.0, -10.0));
        assert_eq!(board.camera.pan, Vec2::new(30.0, -10.0));

        controller.set_tool(&mut board, Tool::Pan);
        controller.pointer_down(&mut board, Point::new(0.0, 0.0), PointerButton::Primary, Modifiers::NONE);
        controller.pointer_up(&mut board, Point::new(5.0, 5.0));
        assert_eq!(board.camera.pan, Vec2::new(35.0, -5.0));
        assert!(controller.notifier_mut().take_pending().view);
    }

    #[test]
    fn test_wheel_zooms_at_cursor() {
        let mut board = Board::default();
        let mut controller = Controller::new();
        let cursor = Point::new(100.0, 100.0);
        let anchor = board.camera.screen_to_canvas(cursor);

        assert!(controller.wheel(&mut board, cursor, -5.0));
        assert!((board.camera.zoom - 1.5).abs() < 1e-9);
        let after = board.camera.canvas_to_screen(anchor);
        assert!((after - cursor).hypot() < 1e-9);

        // Clamped at the bound: nothing changes
        board.camera.zoom = board.camera.max_zoom;
        assert!(!controller.wheel(&mut board, cursor, -1.0));
    }

    #[test]
    fn test_keyboard_clipboard_and_history() {
        let (mut board, a, _) = board_with_two();
        let mut controller = Controller::new();
        let mut clipboard = MemoryClipboard::new();
        board.store.select_element(&a, false);

        assert!(!controller.key_down(&mut board, &mut clipboard, "c", Modifiers::CTRL));
        assert!(clipboard.get_text().is_some());

        controller.pointer_move(&mut board, Point::new(400.0, 300.0));
        assert!(controller.key_down(&mut board, &mut clipboard, "v", Modifiers::CTRL));
        assert_eq!(board.store.len(), 3);
        let pasted = board.store.selected_ids()[0].clone();
        assert_eq!(position(&board, &pasted), Point::new(400.0, 300.0));

        assert!(controller.key_down(&mut board, &mut clipboard, "z", Modifiers::CTRL));
        assert_eq!(board.store.len(), 2);
        assert!(controller.key_down(&mut board, &mut clipboard, "Z", Modifiers { shift: true, ctrl: true }));
        assert_eq!(board.store.len(), 3);

        board.store.select_element(&pasted, false);
        assert!(controller.key_down(&mut board, &mut clipboard, "Delete", Modifiers::NONE));
        assert_eq!(board.store.len(), 2);
        assert!(!controller.key_down(&mut board, &mut clipboard, "q", Modifiers::NONE));
    }

    #[test]
    fn test_paste_falls_back_to_internal_clipboard() {
        let (mut board, a, _) = board_with_two();
        let mut controller = Controller::new();
        let mut clipboard = MemoryClipboard::new();
        clipboard.set_text("not elements").unwrap();
        board.store.select_element(&a, false);
        board.copy_selected();

        assert!(controller.perform(&mut board, &mut clipboard, Action::Paste));
        let pasted = board.store.selected_ids()[0].clone();
        assert_eq!(position(&board, &pasted), Point::new(20.0, 20.0));
    }

    #[test]
    fn test_layer_and_nudge_actions() {
        let (mut board, a, b) = board_with_two();
        let mut controller = Controller::new();
        let mut clipboard = MemoryClipboard::new();
        board.store.select_element(&a, false);

        assert!(controller.perform(&mut board, &mut clipboard, Action::BringToFront));
        assert_eq!(board.store.all_elements().last().unwrap().id, a);
        assert!(controller.perform(&mut board, &mut clipboard, Action::SendToBack));
        assert_eq!(board.store.all_elements()[0].id, a);

        assert!(controller.key_down(&mut board, &mut clipboard, "ArrowRight", Modifiers::SHIFT));
        assert_eq!(position(&board, &a), Point::new(10.0, 0.0));
        assert_eq!(position(&board, &b), Point::new(200.0, 0.0));

        assert!(controller.perform(&mut board, &mut clipboard, Action::Duplicate));
        assert_eq!(board.store.len(), 3);
        assert!(controller.perform(&mut board, &mut clipboard, Action::SelectAll));
        assert_eq!(board.store.selected_ids().len(), 3);
    }

    #[test]
    fn test_escape_cancels_drag() {
        let (mut board, a, _) = board_with_two();
        let mut controller = Controller::new();
        let mut clipboard = MemoryClipboard::new();

        controller.pointer_down(&mut board, Point::new(10.0, 10.0), PointerButton::Primary, Modifiers::NONE);
        controller.pointer_move(&mut board, Point::new(80.0, 80.0));
        assert!(controller.perform(&mut board, &mut clipboard, Action::Escape));
        assert_eq!(position(&board, &a), Point::ZERO);
        assert!(controller.is_idle());
        assert!(board.store.selected_ids().is_empty());
        // Pointer up after cancel does nothing
        controller.pointer_up(&mut board, Point::new(80.0, 80.0));
        assert_eq!(position(&board, &a), Point::ZERO);
    }

    #[test]
    fn test_undo_mid_drag_cancels_drag_first() {
        let (mut board, a, _) = board_with_two();
        let mut controller = Controller::new();
        let mut clipboard = MemoryClipboard::new();

        drag(&mut controller, &mut board, Point::new(10.0, 10.0), Point::new(60.0, 10.0));
        assert_eq!(position(&board, &a), Point::new(50.0, 0.0));
        let undo_len = board.history().undo_len();

        controller.pointer_down(&mut board, Point::new(60.0, 10.0), PointerButton::Primary, Modifiers::NONE);
        controller.pointer_move(&mut board, Point::new(160.0, 10.0));
        assert_eq!(position(&board, &a), Point::new(150.0, 0.0));

        assert!(controller.key_down(&mut board, &mut clipboard, "z", Modifiers::CTRL));
        assert!(controller.is_idle());
        assert_eq!(position(&board, &a), Point::ZERO);

        // Releasing the abandoned drag records nothing and moves nothing
        controller.pointer_up(&mut board, Point::new(160.0, 10.0));
        assert_eq!(position(&board, &a), Point::ZERO);
        assert_eq!(board.history().undo_len(), undo_len - 1);

        assert!(board.redo());
        assert_eq!(position(&board, &a), Point::new(50.0, 0.0));
        assert!(board.undo());
        assert_eq!(position(&board, &a), Point::ZERO);
    }

    #[test]
    fn test_delete_mid_drag_records_only_delete() {
        let (mut board, _, b) = board_with_two();
        let mut controller = Controller::new();
        let mut clipboard = MemoryClipboard::new();
        let undo_len = board.history().undo_len();

        controller.pointer_down(&mut board, Point::new(210.0, 10.0), PointerButton::Primary, Modifiers::NONE);
        controller.pointer_move(&mut board, Point::new(260.0, 10.0));
        assert!(controller.perform(&mut board, &mut clipboard, Action::Delete));
        assert!(!board.store.contains(&b));

        controller.pointer_up(&mut board, Point::new(300.0, 10.0));
        assert_eq!(board.history().undo_len(), undo_len + 1);

        assert!(board.undo());
        assert_eq!(position(&board, &b), Point::new(200.0, 0.0));
    }

    #[test]
    fn test_release_skips_elements_removed_during_drag() {
        let (mut board, a, b) = board_with_two();
        let mut controller = Controller::new();
        board.store.select_all();
        let undo_len = board.history().undo_len();

        controller.pointer_down(&mut board, Point::new(10.0, 10.0), PointerButton::Primary, Modifiers::NONE);
        controller.pointer_move(&mut board, Point::new(40.0, 10.0));
        // Removed by something other than the controller
        assert_eq!(board.delete(&[b.clone()]), 1);

        controller.pointer_up(&mut board, Point::new(60.0, 10.0));
        assert_eq!(position(&board, &a), Point::new(50.0, 0.0));
        assert!(!board.store.contains(&b));
        assert_eq!(board.history().undo_len(), undo_len + 2);

        // Undo the move, then the delete
        assert!(board.undo());
        assert_eq!(position(&board, &a), Point::ZERO);
        assert!(!board.store.contains(&b));
        assert!(board.undo());
        assert!(board.store.contains(&b));
    }
}
