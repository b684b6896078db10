//! Tab strip model
//!
//! Owns the ordered tabs of a browser window: insertion placement, closing
//! and detaching, pinning, moves, multi-selection, and the opener and group
//! relationships that decide which tab to return to when one closes.
//! Changes are reported synchronously to registered [`TabStripObserver`]s;
//! embedder services come in through a [`TabStripDelegate`].

mod context_menu;
mod delegate;
mod entry;
mod model;
mod observer;
mod order_controller;
mod selection;

pub use context_menu::ContextMenuCommand;
pub use delegate::{DefaultDelegate, RestoredTab, TabStripDelegate};
pub use model::TabStripModel;
pub use observer::{ObserverId, ObserverList, TabStripObserver};
pub use order_controller::OrderController;
pub use selection::SelectionModel;

pub use tabstrip_core::{
    AddTabFlags, CloseTabFlags, Document, InsertionPolicy, PageInfo, PageTransition,
    TabChangeType, TabId,
};
