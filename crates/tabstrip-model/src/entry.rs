//! Per-tab bookkeeping held by the model

use tabstrip_core::TabId;

/// One open tab: the document plus strip-level state.
#[derive(Debug)]
pub(crate) struct TabEntry<D> {
    pub contents: D,
    pub pinned: bool,
    /// Cached from the delegate at insertion; app tabs are always mini.
    pub app: bool,
    pub blocked: bool,
    pub discarded: bool,
    /// The tab that opened this one, if it is still around.
    pub opener: Option<TabId>,
    /// The tab whose task this one belongs to. Survives selection changes
    /// that clear `opener`.
    pub group: Option<TabId>,
    /// Forget `group` once this tab stops being active. Set for tabs typed
    /// into existence at the end of the strip.
    pub reset_group_on_select: bool,
}

impl<D> TabEntry<D> {
    pub fn new(contents: D, pinned: bool, app: bool) -> Self {
        Self {
            contents,
            pinned,
            app,
            blocked: false,
            discarded: false,
            opener: None,
            group: None,
            reset_group_on_select: false,
        }
    }

    pub fn is_mini(&self) -> bool {
        self.pinned || self.app
    }

    /// Joining a group also makes the group owner this tab's opener.
    pub fn set_group(&mut self, group: Option<TabId>) {
        self.group = group;
        self.opener = group;
    }

    pub fn forget_opener(&mut self) {
        self.opener = None;
    }

    /// Whether this tab was opened by `tab`, optionally also counting group
    /// membership.
    pub fn opened_by(&self, tab: TabId, use_group: bool) -> bool {
        self.opener == Some(tab) || (use_group && self.group == Some(tab))
    }

    /// Drop any relationship pointing at `tab`.
    pub fn forget_references_to(&mut self, tab: TabId) {
        if self.group == Some(tab) {
            self.group = None;
        }
        if self.opener == Some(tab) {
            self.opener = None;
        }
    }
}
