//! Multi-selection state of the tab strip

/// Selected indices plus the active and anchor tabs.
///
/// `selected_indices` is kept sorted and free of duplicates. The active index
/// is normally a member of the selection; the anchor is where shift-click
/// range selection starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected_indices: Vec<usize>,
    active: Option<usize>,
    anchor: Option<usize>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_indices(&self) -> &[usize] {
        &self.selected_indices
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn set_active(&mut self, active: Option<usize>) {
        self.active = active;
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Option<usize>) {
        self.anchor = anchor;
    }

    pub fn len(&self) -> usize {
        self.selected_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_indices.is_empty()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected_indices.binary_search(&index).is_ok()
    }

    /// Shift everything at or after `index` up by one, for an insertion.
    pub fn increment_from(&mut self, index: usize) {
        for selected in &mut self.selected_indices {
            if *selected >= index {
                *selected += 1;
            }
        }
        increment_from_impl(index, &mut self.active);
        increment_from_impl(index, &mut self.anchor);
    }

    /// Forget `index` and shift everything after it down by one, for a
    /// removal. An active or anchor pointing at `index` becomes unset.
    pub fn decrement_from(&mut self, index: usize) {
        self.selected_indices.retain(|&selected| selected != index);
        for selected in &mut self.selected_indices {
            if *selected > index {
                *selected -= 1;
            }
        }
        decrement_from_impl(index, &mut self.active);
        decrement_from_impl(index, &mut self.anchor);
    }

    /// Make `index` the sole selection, the active tab and the anchor.
    pub fn set_selected_index(&mut self, index: usize) {
        self.selected_indices.clear();
        self.selected_indices.push(index);
        self.active = Some(index);
        self.anchor = Some(index);
    }

    pub fn add_index_to_selection(&mut self, index: usize) {
        if let Err(pos) = self.selected_indices.binary_search(&index) {
            self.selected_indices.insert(pos, index);
        }
    }

    /// Drop `index` from the selection. Active and anchor are left alone.
    pub fn remove_index_from_selection(&mut self, index: usize) {
        if let Ok(pos) = self.selected_indices.binary_search(&index) {
            self.selected_indices.remove(pos);
        }
    }

    /// Replace the selection with the range between the anchor and `index`,
    /// making `index` active.
    pub fn set_selection_from_anchor_to(&mut self, index: usize) {
        match self.anchor {
            None => self.set_selected_index(index),
            Some(anchor) => {
                let (lo, hi) = (anchor.min(index), anchor.max(index));
                self.selected_indices = (lo..=hi).collect();
                self.active = Some(index);
            }
        }
    }

    /// Like [`set_selection_from_anchor_to`](Self::set_selection_from_anchor_to)
    /// but keeps whatever was already selected.
    pub fn add_selection_from_anchor_to(&mut self, index: usize) {
        match self.anchor {
            None => self.set_selected_index(index),
            Some(anchor) => {
                let (lo, hi) = (anchor.min(index), anchor.max(index));
                for i in lo..=hi {
                    self.add_index_to_selection(i);
                }
                self.active = Some(index);
            }
        }
    }

    /// Remap indices for a tab moving from `from` to `to`.
    pub fn move_index(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let was_anchor = self.anchor == Some(from);
        let was_active = self.active == Some(from);
        let was_selected = self.is_selected(from);

        if to < from {
            self.increment_from(to);
            self.decrement_from(from + 1);
        } else {
            self.decrement_from(from);
            self.increment_from(to);
        }

        if was_active {
            self.active = Some(to);
        }
        if was_anchor {
            self.anchor = Some(to);
        }
        if was_selected {
            self.add_index_to_selection(to);
        }
    }

    pub fn clear(&mut self) {
        self.selected_indices.clear();
        self.active = None;
        self.anchor = None;
    }
}

fn increment_from_impl(index: usize, value: &mut Option<usize>) {
    if let Some(v) = value {
        if *v >= index {
            *v += 1;
        }
    }
}

fn decrement_from_impl(index: usize, value: &mut Option<usize>) {
    match *value {
        Some(v) if v == index => *value = None,
        Some(v) if v > index => *value = Some(v - 1),
        _ => {}
    }
}
