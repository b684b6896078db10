//! Change notifications emitted by the tab strip model

use crate::selection::SelectionModel;
use tabstrip_core::TabChangeType;

/// Receives structural and state changes of a [`TabStripModel`].
///
/// Every method has an empty default so observers only implement what they
/// care about. Notifications are delivered synchronously, inside the
/// mutating call, in observer registration order.
///
/// [`TabStripModel`]: crate::TabStripModel
#[allow(unused_variables)]
pub trait TabStripObserver<D> {
    /// A tab was inserted at `index`. `foreground` is true when it is about
    /// to become the active tab.
    fn tab_inserted_at(&mut self, contents: &D, index: usize, foreground: bool) {}

    /// A tab is about to be closed. The tab is still in the strip.
    fn tab_closing_at(&mut self, contents: &D, index: usize) {}

    /// A tab left the strip. `index` is where it used to be.
    fn tab_detached_at(&mut self, contents: &D, index: usize) {}

    /// The active tab is about to lose its active status.
    fn tab_deactivated(&mut self, contents: &D) {}

    /// A different tab became active, or the active tab's contents were
    /// replaced.
    fn active_tab_changed(
        &mut self,
        old_contents: Option<&D>,
        new_contents: &D,
        index: usize,
        user_gesture: bool,
    ) {
    }

    /// The selection changed; `old_model` is the selection before the change.
    fn tab_selection_changed(&mut self, old_model: &SelectionModel) {}

    fn tab_moved(&mut self, contents: &D, from_index: usize, to_index: usize) {}

    /// Something about the tab at `index` changed, as reported by the
    /// embedder through [`TabStripModel::update_tab_state_at`].
    ///
    /// [`TabStripModel::update_tab_state_at`]: crate::TabStripModel::update_tab_state_at
    fn tab_changed_at(&mut self, contents: &D, index: usize, change_type: TabChangeType) {}

    fn tab_replaced_at(&mut self, old_contents: &D, new_contents: &D, index: usize) {}

    fn tab_pinned_state_changed(&mut self, contents: &D, index: usize) {}

    /// The tab moved in or out of the mini (pinned or app) region.
    fn tab_mini_state_changed(&mut self, contents: &D, index: usize) {}

    fn tab_blocked_state_changed(&mut self, contents: &D, index: usize) {}

    /// The user clicked the tab that is already active.
    fn active_tab_clicked(&mut self, index: usize) {}

    /// The last tab was removed.
    fn tab_strip_empty(&mut self) {}

    /// The model is being dropped.
    fn tab_strip_model_deleted(&mut self) {}
}

/// Handle returned by [`ObserverList::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registration-ordered list of boxed observers.
pub struct ObserverList<D> {
    observers: Vec<(ObserverId, Box<dyn TabStripObserver<D>>)>,
    next_id: u64,
}

impl<D> ObserverList<D> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            next_id: 1,
        }
    }

    pub fn add(&mut self, observer: Box<dyn TabStripObserver<D>>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    /// Unregister an observer, handing it back to the caller.
    pub fn remove(&mut self, id: ObserverId) -> Option<Box<dyn TabStripObserver<D>>> {
        let pos = self.observers.iter().position(|(oid, _)| *oid == id)?;
        Some(self.observers.remove(pos).1)
    }

    pub fn has(&self, id: ObserverId) -> bool {
        self.observers.iter().any(|(oid, _)| *oid == id)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn for_each(&mut self, mut f: impl FnMut(&mut dyn TabStripObserver<D>)) {
        for (_, observer) in &mut self.observers {
            f(observer.as_mut());
        }
    }
}

impl<D> Default for ObserverList<D> {
    fn default() -> Self {
        Self::new()
    }
}
