//! Common types used throughout the tab strip

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Unique identifier for a document hosted in the tab strip
///
/// Ids are never reused, so a stale id simply stops resolving once its
/// document leaves the strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl TabId {
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

/// How a navigation or a new tab was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageTransition {
    Link,
    Typed,
    AutoBookmark,
    Generated,
    StartPage,
    FormSubmit,
    Reload,
    Keyword,
}

impl PageTransition {
    /// Whether a navigation of this kind starts a task unrelated to whatever
    /// the tab was showing before. Link clicks, form submissions and reloads
    /// continue the current task.
    pub fn starts_new_task(self) -> bool {
        matches!(
            self,
            Self::Typed | Self::AutoBookmark | Self::Generated | Self::Keyword | Self::StartPage
        )
    }
}

bitflags! {
    /// Options for inserting a tab
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AddTabFlags: u32 {
        /// Make the new tab the active one.
        const ACTIVE = 1 << 0;
        /// Force the tab into the pinned region.
        const PINNED = 1 << 1;
        /// Ignore the order controller and use the caller's index.
        const FORCE_INDEX = 1 << 2;
        /// Set group and opener to the active tab.
        const INHERIT_GROUP = 1 << 3;
        /// Set only the opener to the active tab.
        const INHERIT_OPENER = 1 << 4;
    }
}

bitflags! {
    /// Options for closing tabs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CloseTabFlags: u32 {
        /// Ask the delegate to remember the tab for "reopen closed tab".
        const CREATE_HISTORICAL_RECORD = 1 << 0;
        /// The close was initiated by the user.
        const USER_GESTURE = 1 << 1;
    }
}

/// Where link-opened tabs land relative to the tab that opened them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionPolicy {
    #[default]
    InsertAfter,
    InsertBefore,
}

/// What changed about a tab when observers get a `tab_changed_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabChangeType {
    /// Only the loading state changed.
    LoadingOnly,
    /// Only the title changed and the page is not loading.
    TitleNotLoading,
    /// Anything may have changed.
    All,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_ids_are_unique() {
        let a = TabId::new();
        let b = TabId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn task_starting_transitions() {
        assert!(PageTransition::Typed.starts_new_task());
        assert!(PageTransition::AutoBookmark.starts_new_task());
        assert!(PageTransition::Generated.starts_new_task());
        assert!(PageTransition::Keyword.starts_new_task());
        assert!(PageTransition::StartPage.starts_new_task());
        assert!(!PageTransition::Link.starts_new_task());
        assert!(!PageTransition::FormSubmit.starts_new_task());
        assert!(!PageTransition::Reload.starts_new_task());
    }

    #[test]
    fn transition_serializes_snake_case() {
        let json = serde_json::to_string(&PageTransition::AutoBookmark).unwrap();
        assert_eq!(json, "\"auto_bookmark\"");
        let policy: InsertionPolicy = serde_json::from_str("\"insert_before\"").unwrap();
        assert_eq!(policy, InsertionPolicy::InsertBefore);
    }
}
