//! The tab strip model: ordered tabs, selection and opener relationships

use crate::delegate::TabStripDelegate;
use crate::entry::TabEntry;
use crate::observer::{ObserverId, ObserverList, TabStripObserver};
use crate::order_controller::OrderController;
use crate::selection::SelectionModel;
use std::collections::HashMap;
use tabstrip_core::{
    AddTabFlags, CloseTabFlags, Document, InsertionPolicy, PageTransition, TabChangeType, TabId,
    TabStripConfig, TabStripError, TabStripResult,
};

/// Owns the open tabs of one window and keeps their ordering, selection and
/// opener relationships consistent.
///
/// Mini tabs (pinned or app) always form a prefix of the strip. Whenever the
/// strip is non-empty exactly one tab is active and it is part of the
/// selection. Opener and group links are stored as [`TabId`]s and swept when
/// the tab they point at leaves the strip or has its contents replaced.
///
/// Indices passed to the model must be in range; passing a bad index is a
/// programmer error and panics. Use [`validate_index`](Self::validate_index)
/// when an index comes from outside.
pub struct TabStripModel<D: Document> {
    pub(crate) delegate: Box<dyn TabStripDelegate<D>>,
    pub(crate) tabs: HashMap<TabId, TabEntry<D>>,
    pub(crate) order: Vec<TabId>,
    pub(crate) selection: SelectionModel,
    order_controller: OrderController,
    observers: ObserverList<D>,
    closing_all: bool,
    config: TabStripConfig,
}

impl<D: Document> TabStripModel<D> {
    pub fn new(delegate: Box<dyn TabStripDelegate<D>>) -> Self {
        Self::with_config(delegate, &TabStripConfig::default())
    }

    pub fn with_config(delegate: Box<dyn TabStripDelegate<D>>, config: &TabStripConfig) -> Self {
        log::debug!(
            "Creating tab strip model (insertion policy {:?})",
            config.insertion_policy
        );
        Self {
            delegate,
            tabs: HashMap::new(),
            order: Vec::new(),
            selection: SelectionModel::new(),
            order_controller: OrderController::new(config.insertion_policy),
            observers: ObserverList::new(),
            closing_all: false,
            config: config.clone(),
        }
    }

    pub fn delegate(&self) -> &dyn TabStripDelegate<D> {
        self.delegate.as_ref()
    }

    // Observers

    pub fn add_observer(&mut self, observer: Box<dyn TabStripObserver<D>>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> Option<Box<dyn TabStripObserver<D>>> {
        self.observers.remove(id)
    }

    pub fn has_observer(&self, id: ObserverId) -> bool {
        self.observers.has(id)
    }

    // Policy

    pub fn order_controller(&self) -> &OrderController {
        &self.order_controller
    }

    pub fn insertion_policy(&self) -> InsertionPolicy {
        self.order_controller.insertion_policy()
    }

    pub fn set_insertion_policy(&mut self, policy: InsertionPolicy) {
        self.order_controller.set_insertion_policy(policy);
        self.config.insertion_policy = policy;
    }

    pub fn config(&self) -> &TabStripConfig {
        &self.config
    }

    // Queries

    pub fn count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index < self.order.len()
    }

    /// Check an externally supplied index before handing it to the model.
    pub fn validate_index(&self, index: usize) -> TabStripResult<usize> {
        if self.contains_index(index) {
            Ok(index)
        } else {
            Err(TabStripError::IndexOutOfRange {
                index,
                count: self.count(),
            })
        }
    }

    /// Set while every tab is being closed, and when the last tab leaves.
    pub fn closing_all(&self) -> bool {
        self.closing_all
    }

    pub fn active_index(&self) -> Option<usize> {
        self.selection.active()
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.selection.active().map(|index| self.order[index])
    }

    pub fn active_contents(&self) -> Option<&D> {
        self.active_index().and_then(|index| self.contents_at(index))
    }

    pub fn contents_at(&self, index: usize) -> Option<&D> {
        let id = self.order.get(index)?;
        self.tabs.get(id).map(|entry| &entry.contents)
    }

    pub fn contents_at_mut(&mut self, index: usize) -> Option<&mut D> {
        let id = self.order.get(index)?;
        self.tabs.get_mut(id).map(|entry| &mut entry.contents)
    }

    pub fn contents(&self, id: TabId) -> Option<&D> {
        self.tabs.get(&id).map(|entry| &entry.contents)
    }

    pub fn contents_mut(&mut self, id: TabId) -> Option<&mut D> {
        self.tabs.get_mut(&id).map(|entry| &mut entry.contents)
    }

    pub fn id_at(&self, index: usize) -> TabId {
        self.check_index(index);
        self.order[index]
    }

    pub fn index_of(&self, id: TabId) -> Option<usize> {
        self.order.iter().position(|&tab| tab == id)
    }

    /// Tabs in strip order.
    pub fn iter(&self) -> impl Iterator<Item = (TabId, &D)> + '_ {
        self.order
            .iter()
            .map(move |id| (*id, &self.tabs[id].contents))
    }

    pub fn selection_model(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn is_tab_selected(&self, index: usize) -> bool {
        self.check_index(index);
        self.selection.is_selected(index)
    }

    pub fn is_tab_pinned(&self, index: usize) -> bool {
        self.entry(index).pinned
    }

    /// Pinned and app tabs are both shown in the compact mini form.
    pub fn is_mini_tab(&self, index: usize) -> bool {
        self.entry(index).is_mini()
    }

    pub fn is_app_tab(&self, index: usize) -> bool {
        self.entry(index).app
    }

    pub fn is_tab_blocked(&self, index: usize) -> bool {
        self.entry(index).blocked
    }

    pub fn is_tab_discarded(&self, index: usize) -> bool {
        self.entry(index).discarded
    }

    pub fn index_of_first_non_mini_tab(&self) -> usize {
        self.order
            .iter()
            .position(|id| !self.tabs[id].is_mini())
            .unwrap_or(self.order.len())
    }

    pub fn tabs_are_loading(&self) -> bool {
        self.tabs.values().any(|entry| entry.contents.is_loading())
    }

    // Insertion

    /// Add a tab at the position the order controller picks for appending.
    pub fn append_tab_contents(&mut self, contents: D, foreground: bool) -> usize {
        let index = self
            .order_controller
            .determine_insertion_index_for_appending(self);
        let flags = if foreground {
            AddTabFlags::ACTIVE | AddTabFlags::INHERIT_GROUP
        } else {
            AddTabFlags::empty()
        };
        self.insert_tab_contents_at(index, contents, flags)
    }

    /// Insert a tab, returning the index it actually landed at.
    ///
    /// The index is clamped so mini tabs stay in front. App documents are
    /// always pinned. The first tab of an empty strip is always activated.
    pub fn insert_tab_contents_at(&mut self, index: usize, contents: D, flags: AddTabFlags) -> usize {
        let app = self.delegate.is_app_document(&contents);
        let pin = app || flags.contains(AddTabFlags::PINNED);
        let index = self.constrain_insertion_index(index, pin);

        // A drag that detached the last tab and was then aborted leaves this
        // set.
        self.closing_all = false;

        let mut entry = TabEntry::new(contents, pin, app);
        if let Some(active_id) = self.active_id() {
            let foreground = flags.contains(AddTabFlags::ACTIVE);
            if flags.contains(AddTabFlags::INHERIT_GROUP) {
                if foreground {
                    self.forget_all_openers();
                }
                entry.set_group(Some(active_id));
            } else if flags.contains(AddTabFlags::INHERIT_OPENER) {
                if foreground {
                    self.forget_all_openers();
                }
                entry.opener = Some(active_id);
            }
        }

        let id = TabId::new();
        self.tabs.insert(id, entry);
        self.order.insert(index, id);
        self.selection.increment_from(index);

        let active = flags.contains(AddTabFlags::ACTIVE) || self.selection.active().is_none();
        log::debug!("Inserted tab {:?} at {} (active: {})", id, index, active);

        let contents = &self.tabs[&id].contents;
        self.observers
            .for_each(|o| o.tab_inserted_at(contents, index, active));

        if active {
            let mut new_model = self.selection.clone();
            new_model.set_selected_index(index);
            self.set_selection(new_model, false);
        }
        index
    }

    /// Add a tab the way a navigation of kind `transition` asks for.
    ///
    /// Link clicks are placed by the order controller and join the active
    /// tab's group unless `FORCE_INDEX` is set. Typed navigations opened at
    /// the end of the strip also join the group, but only until the user
    /// leaves them. Everything else goes to `index`, appending when it is
    /// absent or past the end.
    pub fn add_tab_contents(
        &mut self,
        contents: D,
        index: Option<usize>,
        transition: PageTransition,
        flags: AddTabFlags,
    ) -> usize {
        let mut inherit_group = flags.contains(AddTabFlags::INHERIT_GROUP);

        let index = if transition == PageTransition::Link
            && !flags.contains(AddTabFlags::FORCE_INDEX)
        {
            inherit_group = true;
            self.order_controller.determine_insertion_index(
                self,
                transition,
                flags.contains(AddTabFlags::ACTIVE),
            )
        } else {
            match index {
                Some(index) if index <= self.count() => index,
                _ => self
                    .order_controller
                    .determine_insertion_index_for_appending(self),
            }
        };

        if transition == PageTransition::Typed && index == self.count() {
            inherit_group = true;
        }

        let mut flags = flags;
        if inherit_group {
            flags |= AddTabFlags::INHERIT_GROUP;
        }
        let index = self.insert_tab_contents_at(index, contents, flags);

        if inherit_group && transition == PageTransition::Typed {
            self.entry_mut(index).reset_group_on_select = true;
        }
        index
    }

    /// Clamp `index` to the mini or non-mini region.
    pub fn constrain_insertion_index(&self, index: usize, mini_tab: bool) -> usize {
        let first_non_mini = self.index_of_first_non_mini_tab();
        if mini_tab {
            index.min(first_non_mini)
        } else {
            index.max(first_non_mini).min(self.count())
        }
    }

    // Replacement

    /// Swap the document of the tab at `index`, returning the old one.
    ///
    /// The tab keeps its position and flags but gets a new [`TabId`];
    /// relationships pointing at the old id are dropped.
    pub fn replace_tab_contents_at(&mut self, index: usize, new_contents: D) -> D {
        self.check_index(index);
        let old_id = self.order[index];
        self.forget_openers_and_groups_referencing(old_id);

        let mut entry = self.take_entry(old_id);
        let old_contents = std::mem::replace(&mut entry.contents, new_contents);
        let new_id = TabId::new();
        self.tabs.insert(new_id, entry);
        self.order[index] = new_id;
        log::debug!("Replaced tab {:?} at {} with {:?}", old_id, index, new_id);

        let new_contents = &self.tabs[&new_id].contents;
        self.observers
            .for_each(|o| o.tab_replaced_at(&old_contents, new_contents, index));

        // Observers treat replacing the active contents as an activation.
        if self.selection.active() == Some(index) {
            self.observers.for_each(|o| {
                o.active_tab_changed(Some(&old_contents), new_contents, index, false)
            });
        }
        old_contents
    }

    /// Replace the tab's document with a lightweight `placeholder` and mark
    /// it discarded until it is next activated.
    pub fn discard_tab_contents_at(&mut self, index: usize, placeholder: D) -> D {
        let old_contents = self.replace_tab_contents_at(index, placeholder);
        self.entry_mut(index).discarded = true;
        log::info!("Discarded tab at {}", index);
        old_contents
    }

    /// Open `contents` right after `index` in the same group and close the
    /// tab at `index`.
    pub fn replace_with_new_tab_at(&mut self, index: usize, contents: D) {
        self.check_index(index);
        self.insert_tab_contents_at(
            index + 1,
            contents,
            AddTabFlags::ACTIVE | AddTabFlags::INHERIT_GROUP,
        );
        self.internal_close_tabs(&[index], CloseTabFlags::empty());
    }

    // Removal

    /// Remove the tab at `index` and hand its document back to the caller.
    pub fn detach_tab_contents_at(&mut self, index: usize) -> D {
        self.check_index(index);

        let was_selected = self.selection.is_selected(index);
        let next_selected = self
            .order_controller
            .determine_new_selected_index(self, index);

        let id = self.order.remove(index);
        let contents = self.take_entry(id).contents;
        self.forget_openers_and_groups_referencing(id);
        if self.order.is_empty() {
            self.closing_all = true;
        }
        log::debug!("Detached tab {:?} from {}", id, index);

        self.observers
            .for_each(|o| o.tab_detached_at(&contents, index));

        if self.order.is_empty() {
            self.selection.clear();
            self.observers.for_each(|o| o.tab_strip_empty());
            return contents;
        }

        let old_active = self.selection.active();
        self.selection.decrement_from(index);
        let old_model = self.selection.clone();
        if old_active == Some(index) {
            self.observers.for_each(|o| o.tab_deactivated(&contents));
            match self.selection.selected_indices().first().copied() {
                // Other tabs are still selected; the first of them takes over.
                Some(first) => {
                    self.selection.set_active(Some(first));
                    self.selection.set_anchor(Some(first));
                }
                None => {
                    if let Some(next) = next_selected {
                        self.selection.set_selected_index(next);
                    }
                }
            }
            self.notify_if_active_changed(Some(id), Some(&contents), false);
        }

        // `old_model` is taken after the decrement, so compare against the
        // selection membership instead.
        if was_selected {
            self.observers
                .for_each(|o| o.tab_selection_changed(&old_model));
        }
        contents
    }

    /// Close the tab at `index`. Returns false if the delegate blocked it.
    pub fn close_tab_contents_at(&mut self, index: usize, flags: CloseTabFlags) -> bool {
        self.internal_close_tabs(&[index], flags)
    }

    /// Close several tabs. Tabs are resolved up front, so indices refer to
    /// the strip as it is now. Returns false if any close was blocked.
    pub fn close_tabs_at(&mut self, indices: &[usize], flags: CloseTabFlags) -> bool {
        self.internal_close_tabs(indices, flags)
    }

    pub fn close_all_tabs(&mut self) -> bool {
        self.closing_all = true;
        let indices: Vec<usize> = (0..self.count()).rev().collect();
        log::info!("Closing all {} tabs", indices.len());
        self.internal_close_tabs(&indices, CloseTabFlags::CREATE_HISTORICAL_RECORD)
    }

    pub fn close_selected_tabs(&mut self) -> bool {
        let indices = self.selection.selected_indices().to_vec();
        self.internal_close_tabs(
            &indices,
            CloseTabFlags::CREATE_HISTORICAL_RECORD | CloseTabFlags::USER_GESTURE,
        )
    }

    fn internal_close_tabs(&mut self, indices: &[usize], flags: CloseTabFlags) -> bool {
        for &index in indices {
            self.check_index(index);
        }
        // Closing one tab can shift the others, so work by id.
        let ids: Vec<TabId> = indices.iter().map(|&index| self.order[index]).collect();

        let mut all_closed = true;
        for id in ids {
            let Some(index) = self.index_of(id) else {
                continue;
            };
            let Some(entry) = self.tabs.get_mut(&id) else {
                continue;
            };

            entry.contents.on_close_started();
            // An unload handler re-entering the close must not clear the mark.
            if !entry.contents.closed_by_user_gesture() {
                entry
                    .contents
                    .set_closed_by_user_gesture(flags.contains(CloseTabFlags::USER_GESTURE));
            }

            if self.delegate.should_block_close(&mut entry.contents) {
                log::info!("Close of tab {:?} was blocked", id);
                all_closed = false;
                continue;
            }

            self.internal_close_tab(
                id,
                index,
                flags.contains(CloseTabFlags::CREATE_HISTORICAL_RECORD),
            );
        }
        all_closed
    }

    fn internal_close_tab(&mut self, id: TabId, index: usize, create_historical_record: bool) {
        let contents = &self.tabs[&id].contents;
        self.observers.for_each(|o| o.tab_closing_at(contents, index));

        if create_historical_record {
            self.delegate
                .create_historical_record(&self.tabs[&id].contents, index);
        }

        log::info!("Closing tab {:?}", id);
        drop(self.detach_tab_contents_at(index));
    }

    /// Ask the delegate for the most recently closed tab and reopen it.
    pub fn restore_last_closed_tab(&mut self) -> bool {
        if !self.delegate.can_restore_tab() {
            return false;
        }
        let Some(restored) = self.delegate.restore_last_closed() else {
            return false;
        };
        let index = restored
            .index
            .filter(|&index| index <= self.count())
            .unwrap_or_else(|| {
                self.order_controller
                    .determine_insertion_index_for_appending(self)
            });
        let mut flags = AddTabFlags::ACTIVE;
        if restored.pinned {
            flags |= AddTabFlags::PINNED;
        }
        let index = self.insert_tab_contents_at(index, restored.contents, flags);
        log::info!("Restored closed tab at {}", index);
        true
    }

    // Moving

    /// Move a tab. Moves that would mix mini and non-mini tabs are ignored.
    pub fn move_tab_contents_at(&mut self, index: usize, to_position: usize, select_after_move: bool) {
        self.check_index(index);
        self.check_index(to_position);
        if index == to_position {
            return;
        }

        let first_non_mini = self.index_of_first_non_mini_tab();
        if (index < first_non_mini && to_position >= first_non_mini)
            || (to_position < first_non_mini && index >= first_non_mini)
        {
            log::debug!(
                "Ignoring move {} -> {} across the mini tab boundary",
                index,
                to_position
            );
            return;
        }

        self.move_tab_contents_at_impl(index, to_position, select_after_move);
    }

    /// Move the selected tabs so they are contiguous starting at `index`.
    ///
    /// Selected mini tabs move first and stay in the mini region; if `index`
    /// lies past the room they can take, the non-mini tabs land as if the
    /// mini tabs had been moved to `index`.
    pub fn move_selected_tabs_to(&mut self, index: usize) {
        let total_mini_count = self.index_of_first_non_mini_tab();
        let selected_count = self.selection.len();
        let selected_mini_count = self
            .selection
            .selected_indices()
            .iter()
            .take_while(|&&i| self.is_mini_tab(i))
            .count();

        let mut index = index;
        if selected_mini_count > 0 {
            let mini_limit = total_mini_count - selected_mini_count;
            self.move_selected_tabs_to_impl(mini_limit.min(index), 0, selected_mini_count);
            if index > mini_limit {
                index += selected_mini_count;
            }
        }
        if selected_mini_count == selected_count {
            return;
        }

        self.move_selected_tabs_to_impl(
            index.max(total_mini_count),
            selected_mini_count,
            selected_count - selected_mini_count,
        );
    }

    pub fn move_tab_next(&mut self) {
        let Some(active) = self.active_index() else {
            return;
        };
        let new_index = (active + 1).min(self.count() - 1);
        self.move_tab_contents_at(active, new_index, true);
    }

    pub fn move_tab_previous(&mut self) {
        let Some(active) = self.active_index() else {
            return;
        };
        self.move_tab_contents_at(active, active.saturating_sub(1), true);
    }

    fn move_tab_contents_at_impl(&mut self, index: usize, to_position: usize, select_after_move: bool) {
        let id = self.order.remove(index);
        self.order.insert(to_position, id);
        self.selection.move_index(index, to_position);
        log::debug!("Moved tab {:?} from {} to {}", id, index, to_position);

        let contents = &self.tabs[&id].contents;
        self.observers
            .for_each(|o| o.tab_moved(contents, index, to_position));

        if select_after_move {
            let mut new_model = self.selection.clone();
            new_model.set_selected_index(to_position);
            self.set_selection(new_model, false);
        }
    }

    /// Move `length` selected tabs, starting at position `start` of the
    /// selection, so they sit contiguously at `index`.
    fn move_selected_tabs_to_impl(&mut self, index: usize, start: usize, length: usize) {
        let end = start + length;
        let count_before_index = self.selection.selected_indices()[start..end]
            .iter()
            .enumerate()
            .take_while(|&(n, &selected)| selected < index + n)
            .count();

        // Tabs before `index` shift the selection as they move, so the next
        // one to move is always at `start`.
        let mut target_index = index + count_before_index;
        let mut tab_index = start;
        while tab_index < end && self.selection.selected_indices()[start] < index {
            let from = self.selection.selected_indices()[start];
            self.move_tab_contents_at(from, target_index - 1, false);
            tab_index += 1;
        }

        while tab_index < end {
            let from = self.selection.selected_indices()[tab_index];
            if from != target_index {
                self.move_tab_contents_at(from, target_index, false);
            }
            tab_index += 1;
            target_index += 1;
        }
    }

    // Tab state

    /// Pin or unpin a tab, moving it to the edge of the mini region.
    /// App tabs cannot be unpinned.
    pub fn set_tab_pinned(&mut self, index: usize, pinned: bool) {
        self.check_index(index);
        if self.entry(index).pinned == pinned {
            return;
        }

        let mut index = index;
        if self.entry(index).app {
            if !pinned {
                log::warn!("Refusing to unpin app tab at {}", index);
                return;
            }
            // App tabs are mini either way, so nothing moves.
            self.entry_mut(index).pinned = true;
        } else {
            let non_mini_tab_index = self.index_of_first_non_mini_tab();
            self.entry_mut(index).pinned = pinned;
            if pinned && index != non_mini_tab_index {
                self.move_tab_contents_at_impl(index, non_mini_tab_index, false);
                index = non_mini_tab_index;
            } else if !pinned && index + 1 != non_mini_tab_index {
                self.move_tab_contents_at_impl(index, non_mini_tab_index - 1, false);
                index = non_mini_tab_index - 1;
            }

            let contents = &self.tabs[&self.order[index]].contents;
            self.observers
                .for_each(|o| o.tab_mini_state_changed(contents, index));
        }

        log::info!("Tab at {} pinned: {}", index, pinned);
        let contents = &self.tabs[&self.order[index]].contents;
        self.observers
            .for_each(|o| o.tab_pinned_state_changed(contents, index));
    }

    pub fn set_tab_blocked(&mut self, index: usize, blocked: bool) {
        self.check_index(index);
        if self.entry(index).blocked == blocked {
            return;
        }
        self.entry_mut(index).blocked = blocked;

        let contents = &self.tabs[&self.order[index]].contents;
        self.observers
            .for_each(|o| o.tab_blocked_state_changed(contents, index));
    }

    /// Tell observers that something about the tab at `index` changed.
    pub fn update_tab_state_at(&mut self, index: usize, change_type: TabChangeType) {
        self.check_index(index);
        let contents = &self.tabs[&self.order[index]].contents;
        self.observers
            .for_each(|o| o.tab_changed_at(contents, index, change_type));
    }

    pub fn active_tab_clicked(&mut self, index: usize) {
        self.check_index(index);
        self.observers.for_each(|o| o.active_tab_clicked(index));
    }

    // Selection

    pub fn activate_tab_at(&mut self, index: usize, user_gesture: bool) {
        self.check_index(index);
        let mut new_model = self.selection.clone();
        new_model.set_selected_index(index);
        self.set_selection(new_model, user_gesture);
    }

    pub fn add_tab_at_to_selection(&mut self, index: usize) {
        self.check_index(index);
        let mut new_model = self.selection.clone();
        new_model.add_index_to_selection(index);
        self.set_selection(new_model, false);
    }

    /// Select everything between the anchor and `index`.
    pub fn extend_selection_to(&mut self, index: usize) {
        self.check_index(index);
        let mut new_model = self.selection.clone();
        new_model.set_selection_from_anchor_to(index);
        self.set_selection(new_model, false);
    }

    /// Flip the selection state of `index`. The last selected tab cannot be
    /// deselected.
    pub fn toggle_selection_at(&mut self, index: usize) {
        self.check_index(index);
        let mut new_model = self.selection.clone();
        if self.selection.is_selected(index) {
            if self.selection.len() == 1 {
                return;
            }
            new_model.remove_index_from_selection(index);
            new_model.set_anchor(Some(index));
            if new_model.active().map_or(true, |active| active == index) {
                let first = new_model.selected_indices().first().copied();
                new_model.set_active(first);
            }
        } else {
            new_model.add_index_to_selection(index);
            new_model.set_anchor(Some(index));
            new_model.set_active(Some(index));
        }
        self.set_selection(new_model, false);
    }

    /// Add everything between the anchor and `index` to the selection.
    pub fn add_selection_from_anchor_to(&mut self, index: usize) {
        self.check_index(index);
        let mut new_model = self.selection.clone();
        new_model.add_selection_from_anchor_to(index);
        self.set_selection(new_model, false);
    }

    /// Adopt a selection built elsewhere. It must name an active tab.
    pub fn set_selection_from_model(&mut self, source: SelectionModel) {
        let active = source.active();
        assert!(
            active.is_some_and(|index| self.contains_index(index) && source.is_selected(index)),
            "selection must have a selected, in-range active tab"
        );
        self.set_selection(source, false);
    }

    pub fn select_next_tab(&mut self) {
        self.select_relative_tab(true);
    }

    pub fn select_previous_tab(&mut self) {
        self.select_relative_tab(false);
    }

    pub fn select_last_tab(&mut self) {
        if self.is_empty() {
            return;
        }
        self.activate_tab_at(self.count() - 1, true);
    }

    /// Activate the neighbouring tab, wrapping around the ends.
    pub fn select_relative_tab(&mut self, next: bool) {
        let Some(active) = self.active_index() else {
            return;
        };
        let count = self.count();
        let index = if next {
            (active + 1) % count
        } else {
            (active + count - 1) % count
        };
        self.activate_tab_at(index, true);
    }

    fn set_selection(&mut self, new_model: SelectionModel, user_gesture: bool) {
        let old_id = self.active_id();
        if new_model.active() != self.selection.active() {
            if let Some(old_id) = old_id {
                let contents = &self.tabs[&old_id].contents;
                self.observers.for_each(|o| o.tab_deactivated(contents));
            }
        }

        let old_model = std::mem::replace(&mut self.selection, new_model);
        self.notify_if_active_changed(old_id, None, user_gesture);

        if self.selection != old_model {
            self.observers
                .for_each(|o| o.tab_selection_changed(&old_model));
        }
    }

    /// Fire `active_tab_changed` if the active tab is no longer `old_id`.
    /// `detached` carries the old contents when they already left the strip.
    fn notify_if_active_changed(&mut self, old_id: Option<TabId>, detached: Option<&D>, user_gesture: bool) {
        let Some(index) = self.selection.active() else {
            return;
        };
        let new_id = self.order[index];
        if old_id == Some(new_id) {
            return;
        }

        let reset = self
            .order_controller
            .on_active_changed(self, old_id, index, user_gesture);
        if let Some(id) = reset.forget_group_of {
            self.forget_group(id);
        }
        if reset.forget_all_openers {
            self.forget_all_openers();
        }

        let tabs = &self.tabs;
        let old_contents = detached.or_else(|| {
            old_id
                .and_then(|id| tabs.get(&id))
                .map(|entry| &entry.contents)
        });
        let new_contents = &tabs[&new_id].contents;
        self.observers.for_each(|o| {
            o.active_tab_changed(old_contents, new_contents, index, user_gesture)
        });

        // Activating a discarded tab reloads it.
        self.entry_mut(index).discarded = false;
    }

    // Openers and groups

    pub fn opener_of(&self, index: usize) -> Option<TabId> {
        self.entry(index).opener
    }

    pub fn set_opener_of(&mut self, index: usize, opener: TabId) {
        self.entry_mut(index).opener = Some(opener);
    }

    pub fn group_of(&self, index: usize) -> Option<TabId> {
        self.entry(index).group
    }

    pub fn should_reset_group_on_select(&self, index: usize) -> bool {
        self.entry(index).reset_group_on_select
    }

    /// The nearest tab opened by `opener`, scanning right of `start_index`
    /// first and then leftwards from it.
    pub fn index_of_next_tab_opened_by(
        &self,
        opener: TabId,
        start_index: usize,
        use_group: bool,
    ) -> Option<usize> {
        self.check_index(start_index);
        let matches = |i: &usize| self.tabs[&self.order[*i]].opened_by(opener, use_group);
        (start_index + 1..self.count())
            .find(matches)
            .or_else(|| (0..start_index).rev().find(matches))
    }

    /// The leftmost tab before `start_index` opened by `opener`.
    pub fn index_of_first_tab_opened_by(&self, opener: TabId, start_index: usize) -> Option<usize> {
        self.check_index(start_index);
        (0..start_index).find(|&i| self.entry(i).opener == Some(opener))
    }

    /// The rightmost tab after `start_index` opened by `opener`.
    pub fn index_of_last_tab_opened_by(&self, opener: TabId, start_index: usize) -> Option<usize> {
        self.check_index(start_index);
        (start_index + 1..self.count())
            .rev()
            .find(|&i| self.entry(i).opener == Some(opener))
    }

    pub fn forget_all_openers(&mut self) {
        for entry in self.tabs.values_mut() {
            entry.forget_opener();
        }
    }

    /// Detach the tab `id` from its group and opener.
    pub fn forget_group(&mut self, id: TabId) {
        if let Some(entry) = self.tabs.get_mut(&id) {
            entry.set_group(None);
        }
    }

    /// Record that tab `id` is navigating. Navigations that start a new task
    /// drop all opener relationships, except for the first one out of a new
    /// tab page sitting at the end of the strip.
    pub fn notify_navigated(&mut self, id: TabId, transition: PageTransition) {
        if !transition.starts_new_task() || self.is_new_tab_at_end(id) {
            return;
        }
        log::debug!("Tab {:?} started a new task via {:?}", id, transition);
        self.forget_all_openers();
        self.forget_group(id);
    }

    fn is_new_tab_at_end(&self, id: TabId) -> bool {
        let Some(entry) = self.tabs.get(&id) else {
            return false;
        };
        let is_new_tab_page = entry
            .contents
            .url()
            .is_some_and(|url| self.config.is_new_tab_url(url));
        is_new_tab_page
            && self.order.last() == Some(&id)
            && entry.contents.navigation_entry_count() == 1
    }

    fn forget_openers_and_groups_referencing(&mut self, id: TabId) {
        for entry in self.tabs.values_mut() {
            entry.forget_references_to(id);
        }
    }

    // Internals

    fn check_index(&self, index: usize) {
        assert!(
            self.contains_index(index),
            "tab index {index} out of range for {} tabs",
            self.count()
        );
    }

    fn entry(&self, index: usize) -> &TabEntry<D> {
        self.check_index(index);
        &self.tabs[&self.order[index]]
    }

    fn entry_mut(&mut self, index: usize) -> &mut TabEntry<D> {
        self.check_index(index);
        let id = self.order[index];
        self.tabs
            .get_mut(&id)
            .unwrap_or_else(|| panic!("tab {id:?} is ordered but has no entry"))
    }

    fn take_entry(&mut self, id: TabId) -> TabEntry<D> {
        self.tabs
            .remove(&id)
            .unwrap_or_else(|| panic!("tab {id:?} is ordered but has no entry"))
    }
}

impl<D: Document> Drop for TabStripModel<D> {
    fn drop(&mut self) {
        self.observers.for_each(|o| o.tab_strip_model_deleted());
    }
}
