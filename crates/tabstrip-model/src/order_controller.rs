//! Placement and reselection policy for the tab strip

use crate::model::TabStripModel;
use tabstrip_core::{Document, InsertionPolicy, PageTransition, TabId};

/// Decides where new tabs go and which tab becomes active after a removal.
#[derive(Debug, Clone, Default)]
pub struct OrderController {
    insertion_policy: InsertionPolicy,
}

/// Relationship cleanup requested when the active tab changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct OpenerReset {
    pub forget_group_of: Option<TabId>,
    pub forget_all_openers: bool,
}

impl OrderController {
    pub fn new(insertion_policy: InsertionPolicy) -> Self {
        Self { insertion_policy }
    }

    pub fn insertion_policy(&self) -> InsertionPolicy {
        self.insertion_policy
    }

    pub fn set_insertion_policy(&mut self, policy: InsertionPolicy) {
        self.insertion_policy = policy;
    }

    pub fn determine_insertion_index_for_appending<D: Document>(
        &self,
        strip: &TabStripModel<D>,
    ) -> usize {
        strip.count()
    }

    /// Where a tab opened with `transition` should be inserted.
    ///
    /// Link clicks cluster around the active tab: foreground tabs land right
    /// next to it, background tabs after the last (or, inserting before,
    /// ahead of the first) tab it already opened. Everything else appends.
    pub fn determine_insertion_index<D: Document>(
        &self,
        strip: &TabStripModel<D>,
        transition: PageTransition,
        foreground: bool,
    ) -> usize {
        if strip.is_empty() {
            return 0;
        }

        let active = match strip.active_index() {
            Some(active) if transition == PageTransition::Link => active,
            _ => return self.determine_insertion_index_for_appending(strip),
        };

        let delta = match self.insertion_policy {
            InsertionPolicy::InsertAfter => 1,
            InsertionPolicy::InsertBefore => 0,
        };
        if foreground {
            return active + delta;
        }

        let opener = strip.id_at(active);
        let sibling = match self.insertion_policy {
            InsertionPolicy::InsertAfter => strip.index_of_last_tab_opened_by(opener, active),
            InsertionPolicy::InsertBefore => strip.index_of_first_tab_opened_by(opener, active),
        };
        sibling.unwrap_or(active) + delta
    }

    /// The index, after removal, of the tab to activate when the tab at
    /// `removing_index` goes away. `None` if the strip will be empty.
    pub fn determine_new_selected_index<D: Document>(
        &self,
        strip: &TabStripModel<D>,
        removing_index: usize,
    ) -> Option<usize> {
        let count = strip.count();
        assert!(
            removing_index < count,
            "removing index {removing_index} out of range for {count} tabs"
        );
        if count == 1 {
            return None;
        }

        let active = strip.active_index();
        if let Some(active) = active.filter(|&active| active != removing_index) {
            return Some(if active > removing_index {
                active - 1
            } else {
                active
            });
        }

        // Indices below are in pre-removal terms.
        let valid = |index: usize| {
            if removing_index < index {
                index - 1
            } else {
                index
            }
        };

        // A child of the removed tab wins over its siblings.
        let removed = strip.id_at(removing_index);
        if let Some(child) = strip.index_of_next_tab_opened_by(removed, removing_index, false) {
            return Some(valid(child));
        }

        if let Some(parent) = strip.opener_of(removing_index) {
            if let Some(sibling) = strip.index_of_next_tab_opened_by(parent, removing_index, false)
            {
                return Some(valid(sibling));
            }
            if let Some(parent_index) = strip.index_of(parent) {
                return Some(valid(parent_index));
            }
        }

        if removing_index + 1 < count {
            Some(removing_index)
        } else {
            Some(removing_index - 1)
        }
    }

    /// Opener bookkeeping for a change of the active tab.
    ///
    /// `old` is the previously active tab if it is still in the strip and
    /// `new_index` is the newly active one. A tab marked to reset its group
    /// on select loses the group once it is left. A user-initiated switch
    /// between unrelated tabs forgets all openers; moving between a tab and
    /// its opener, or between siblings, keeps them.
    pub(crate) fn on_active_changed<D: Document>(
        &self,
        strip: &TabStripModel<D>,
        old: Option<TabId>,
        new_index: usize,
        user_gesture: bool,
    ) -> OpenerReset {
        let mut reset = OpenerReset::default();

        let mut old_opener = None;
        if let Some(old_index) = old.and_then(|id| strip.index_of(id)) {
            old_opener = strip.opener_of(old_index);
            if strip.should_reset_group_on_select(old_index) {
                reset.forget_group_of = old;
            }
        }

        let new_id = strip.id_at(new_index);
        let new_opener = strip.opener_of(new_index);
        if user_gesture
            && new_opener != old_opener
            && (old.is_none() || new_opener != old)
            && old_opener != Some(new_id)
        {
            reset.forget_all_openers = true;
        }
        reset
    }
}
