//! Services the tab strip model needs from its embedder

/// A tab handed back by [`TabStripDelegate::restore_last_closed`].
#[derive(Debug)]
pub struct RestoredTab<D> {
    pub contents: D,
    /// Where the tab used to live; `None` appends.
    pub index: Option<usize>,
    pub pinned: bool,
}

/// Decisions and side effects the model delegates to whoever embeds it.
///
/// The delegate never receives the model itself. Operations that produce
/// new tabs (duplicate, restore, new blank tab) return documents and the
/// model inserts them.
#[allow(unused_variables)]
pub trait TabStripDelegate<D> {
    /// App documents are forced into the pinned region and cannot be
    /// unpinned. Queried once, when a document enters the strip.
    fn is_app_document(&self, contents: &D) -> bool {
        false
    }

    /// Run unload handlers. Returning true vetoes the close; the document
    /// stays in the strip.
    fn should_block_close(&mut self, contents: &mut D) -> bool {
        false
    }

    /// Remember a closing tab so it can be restored later.
    fn create_historical_record(&mut self, contents: &D, index: usize) {}

    fn can_duplicate_contents(&self, contents: &D) -> bool {
        false
    }

    fn duplicate_contents(&mut self, contents: &D) -> Option<D> {
        None
    }

    /// A fresh document for the new tab page.
    fn create_blank_contents(&mut self) -> Option<D> {
        None
    }

    fn can_restore_tab(&self) -> bool {
        false
    }

    fn restore_last_closed(&mut self) -> Option<RestoredTab<D>> {
        None
    }

    fn can_bookmark_all_tabs(&self) -> bool {
        false
    }

    fn bookmark_all_tabs(&mut self, tabs: &[&D]) {}

    fn can_reload_contents(&self, contents: &D) -> bool {
        true
    }
}

/// Delegate that never vetoes and provides no services.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDelegate;

impl<D> TabStripDelegate<D> for DefaultDelegate {}
