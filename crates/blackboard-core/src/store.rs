//! The canonical collection of board elements, z-order and selection.

use crate::clipboard::{self, ClipItem};
use crate::elements::{Element, ElementId, Payload};
use kurbo::{Point, Rect, Vec2};

/// Offset applied by [`ElementStore::duplicate_selected`].
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// A z-order adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMove {
    ToFront,
    ToBack,
    Forward,
    Backward,
}

/// A planned z-index change for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerChange {
    pub id: ElementId,
    pub old: i64,
    pub new: i64,
}

/// Owns all live elements, the selection and the internal clipboard.
///
/// Elements are kept in insertion order; paint order is a stable sort by
/// `z_index`, so equal z-indices paint in insertion order. Operations on
/// ids that are no longer present are no-ops.
#[derive(Debug, Clone, Default)]
pub struct ElementStore {
    elements: Vec<Element>,
    /// Ordered, duplicate-free, always a subset of `elements`.
    selected: Vec<ElementId>,
    next_z_index: i64,
    clipboard: Vec<ClipItem>,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an element on top of the stack and return it for further setup.
    ///
    /// The size starts at zero; callers size it from content metrics.
    pub fn add_element(&mut self, payload: Payload, x: f64, y: f64) -> &mut Element {
        let z_index = self.next_z_index;
        self.next_z_index += 1;
        let index = self.elements.len();
        self.elements
            .push(Element::new(payload, Point::new(x, y), z_index));
        log::debug!("Added {} element at z {}", self.elements[index].kind(), z_index);
        &mut self.elements[index]
    }

    /// Re-insert a detached element, keeping its id and z-index.
    ///
    /// `index` is the insertion-order slot (clamped); `None` appends.
    /// Returns false if an element with the same id is already present.
    pub fn insert_element(&mut self, element: Element, index: Option<usize>) -> bool {
        if self.contains(&element.id) {
            return false;
        }
        self.next_z_index = self.next_z_index.max(element.z_index + 1);
        let index = index
            .unwrap_or(self.elements.len())
            .min(self.elements.len());
        self.elements.insert(index, element);
        true
    }

    /// Remove an element and drop it from the selection.
    ///
    /// Returns the removed element and its insertion-order slot.
    pub fn remove_element(&mut self, id: &ElementId) -> Option<(usize, Element)> {
        self.selected.retain(|s| s != id);
        let index = self.index_of(id)?;
        Some((index, self.elements.remove(index)))
    }

    /// Reset elements, selection, clipboard and the z counter.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.selected.clear();
        self.clipboard.clear();
        self.next_z_index = 0;
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub fn element_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn next_z_index(&self) -> i64 {
        self.next_z_index
    }

    /// Raise the z counter above every live element.
    pub(crate) fn resync_z_counter(&mut self) {
        self.next_z_index = self
            .elements
            .iter()
            .map(|e| e.z_index + 1)
            .max()
            .unwrap_or(0)
            .max(self.next_z_index);
    }

    /// All elements in paint order (ascending z-index, ties in insertion order).
    pub fn all_elements(&self) -> Vec<&Element> {
        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    /// Topmost element whose bounding box contains the point (closed edges).
    pub fn element_at(&self, x: f64, y: f64) -> Option<&Element> {
        let point = Point::new(x, y);
        self.all_elements()
            .into_iter()
            .rev()
            .find(|e| e.contains_point(point))
    }

    /// Bounding box of every element.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(self.elements.iter())
    }

    // --- Selection ---

    pub fn selected_ids(&self) -> &[ElementId] {
        &self.selected
    }

    pub fn selected_elements(&self) -> Vec<&Element> {
        self.selected.iter().filter_map(|id| self.element(id)).collect()
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected.contains(id)
    }

    /// Bounding box of the selection.
    pub fn selection_bounds(&self) -> Option<Rect> {
        union_bounds(self.selected_elements().into_iter())
    }

    /// Select an element, replacing the selection unless `additive`.
    pub fn select_element(&mut self, id: &ElementId, additive: bool) {
        if !self.contains(id) {
            return;
        }
        if !additive {
            self.selected.clear();
        }
        self.add_to_selection(id);
    }

    pub fn toggle_selection(&mut self, id: &ElementId) {
        if self.is_selected(id) {
            self.remove_from_selection(id);
        } else {
            self.add_to_selection(id);
        }
    }

    pub fn add_to_selection(&mut self, id: &ElementId) {
        if self.contains(id) && !self.is_selected(id) {
            self.selected.push(id.clone());
        }
    }

    pub fn remove_from_selection(&mut self, id: &ElementId) {
        self.selected.retain(|s| s != id);
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Select every element, in paint order.
    pub fn select_all(&mut self) {
        self.selected = self.all_elements().iter().map(|e| e.id.clone()).collect();
    }

    /// Replace the selection with every element intersecting the rectangle.
    ///
    /// Negative extents are normalized. Edge-only contact does not count.
    pub fn select_in_bounds(&mut self, x: f64, y: f64, w: f64, h: f64) -> Vec<ElementId> {
        self.selected.clear();
        if ![x, y, w, h].iter().all(|v| v.is_finite()) {
            return Vec::new();
        }
        let marquee = Rect::new(x, y, x + w, y + h).abs();
        self.selected = self
            .all_elements()
            .into_iter()
            .filter(|e| e.intersects_rect(marquee))
            .map(|e| e.id.clone())
            .collect();
        self.selected.clone()
    }

    // --- Geometry and z-order mutation ---

    pub fn set_position(&mut self, id: &ElementId, position: Point) {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return;
        }
        if let Some(element) = self.element_mut(id) {
            element.position = position;
        }
    }

    pub fn translate(&mut self, id: &ElementId, delta: Vec2) {
        if let Some(element) = self.element_mut(id) {
            element.translate(delta);
        }
    }

    pub fn set_z_index(&mut self, id: &ElementId, z_index: i64) {
        if let Some(element) = self.element_mut(id) {
            element.z_index = z_index;
        }
    }

    /// Lowest z-index among live elements.
    pub fn min_z_index(&self) -> Option<i64> {
        self.elements.iter().map(|e| e.z_index).min()
    }

    /// Compute the z-index changes for moving `ids` without touching elements.
    ///
    /// `ToFront` consumes values from the z counter. For multi-element moves the
    /// relative order of the moved elements is preserved.
    pub fn layer_plan(&mut self, ids: &[ElementId], movement: LayerMove) -> Vec<LayerChange> {
        let targets: Vec<(ElementId, i64)> = self
            .all_elements()
            .into_iter()
            .filter(|e| ids.contains(&e.id))
            .map(|e| (e.id.clone(), e.z_index))
            .collect();

        match movement {
            LayerMove::ToFront => targets
                .into_iter()
                .map(|(id, old)| {
                    let new = self.next_z_index;
                    self.next_z_index += 1;
                    LayerChange { id, old, new }
                })
                .collect(),
            LayerMove::ToBack => {
                let Some(mut floor) = self.min_z_index() else {
                    return Vec::new();
                };
                let mut changes: Vec<LayerChange> = targets
                    .into_iter()
                    .rev()
                    .map(|(id, old)| {
                        floor -= 1;
                        LayerChange { id, old, new: floor }
                    })
                    .collect();
                changes.reverse();
                changes
            }
            LayerMove::Forward => targets
                .into_iter()
                .map(|(id, old)| LayerChange { id, old, new: old + 1 })
                .collect(),
            LayerMove::Backward => targets
                .into_iter()
                .map(|(id, old)| LayerChange { id, old, new: old - 1 })
                .collect(),
        }
    }

    fn apply_layer_move(&mut self, id: &ElementId, movement: LayerMove) -> Option<i64> {
        let change = self.layer_plan(std::slice::from_ref(id), movement).pop()?;
        self.set_z_index(&change.id, change.new);
        Some(change.new)
    }

    /// `z = next++`. Returns the new z-index.
    pub fn bring_to_front(&mut self, id: &ElementId) -> Option<i64> {
        self.apply_layer_move(id, LayerMove::ToFront)
    }

    /// `z = min - 1`. Returns the new z-index.
    pub fn send_to_back(&mut self, id: &ElementId) -> Option<i64> {
        self.apply_layer_move(id, LayerMove::ToBack)
    }

    /// `z + 1`, without resolving collisions.
    pub fn bring_forward(&mut self, id: &ElementId) -> Option<i64> {
        self.apply_layer_move(id, LayerMove::Forward)
    }

    /// `z - 1`, without resolving collisions.
    pub fn send_backward(&mut self, id: &ElementId) -> Option<i64> {
        self.apply_layer_move(id, LayerMove::Backward)
    }

    // --- Clipboard ---

    /// Snapshot the selection into the clipboard and return its transport encoding.
    pub fn copy_selected(&mut self) -> String {
        self.clipboard = self
            .selected_elements()
            .into_iter()
            .map(ClipItem::from_element)
            .collect();
        match clipboard::encode(&self.clipboard) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to encode clipboard: {}", e);
                "[]".to_string()
            }
        }
    }

    pub fn clipboard(&self) -> &[ClipItem] {
        &self.clipboard
    }

    /// Recreate the clipboard as new elements offset from their copied position.
    ///
    /// The new elements become the selection.
    pub fn paste(&mut self, offset_x: f64, offset_y: f64) -> Vec<ElementId> {
        if !(offset_x.is_finite() && offset_y.is_finite()) {
            return Vec::new();
        }
        let offset = Vec2::new(offset_x, offset_y);
        let items = self.clipboard.clone();
        let ids = self.place_items(items, |item| item.position + offset);
        log::debug!("Pasted {} elements", ids.len());
        ids
    }

    /// Paste an external clipboard snapshot, anchoring its top-left at the target.
    ///
    /// Relative layout is preserved. Malformed input pastes nothing.
    pub fn paste_from_json(&mut self, json: &str, target_x: f64, target_y: f64) -> Vec<ElementId> {
        if !(target_x.is_finite() && target_y.is_finite()) {
            return Vec::new();
        }
        let items = match clipboard::decode(json) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Ignoring clipboard contents: {}", e);
                return Vec::new();
            }
        };
        if items.is_empty() {
            return Vec::new();
        }
        let min_x = items.iter().map(|i| i.position.x).fold(f64::INFINITY, f64::min);
        let min_y = items.iter().map(|i| i.position.y).fold(f64::INFINITY, f64::min);
        let target = Point::new(target_x, target_y);
        self.place_items(items, |item| {
            target + Vec2::new(item.position.x - min_x, item.position.y - min_y)
        })
    }

    /// Copy the selection and paste it back at a fixed offset.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        self.copy_selected();
        self.paste(DUPLICATE_OFFSET, DUPLICATE_OFFSET)
    }

    fn place_items(
        &mut self,
        items: Vec<ClipItem>,
        place: impl Fn(&ClipItem) -> Point,
    ) -> Vec<ElementId> {
        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            let at = place(&item);
            let element = self.add_element(item.payload, at.x, at.y);
            element.set_size(item.size.width, item.size.height);
            ids.push(element.id.clone());
        }
        self.selected = ids.clone();
        ids
    }
}

fn union_bounds<'a>(elements: impl Iterator<Item = &'a Element>) -> Option<Rect> {
    elements
        .map(Element::bounds)
        .reduce(|acc, b| acc.union(b))
}
