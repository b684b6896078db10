//! Tab context menu commands

use crate::model::TabStripModel;
use crate::selection::SelectionModel;
use serde::{Deserialize, Serialize};
use tabstrip_core::{AddTabFlags, CloseTabFlags, Document, PageTransition, TabId};

/// Commands offered by the tab context menu.
///
/// Commands apply to the whole selection when the tab they were invoked on
/// is selected, otherwise to that tab alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMenuCommand {
    NewTab,
    Reload,
    Duplicate,
    CloseTab,
    CloseOtherTabs,
    CloseTabsToRight,
    RestoreTab,
    TogglePinned,
    BookmarkAllTabs,
    SelectByDomain,
    SelectByOpener,
}

impl ContextMenuCommand {
    pub const ALL: [ContextMenuCommand; 11] = [
        Self::NewTab,
        Self::Reload,
        Self::Duplicate,
        Self::CloseTab,
        Self::CloseOtherTabs,
        Self::CloseTabsToRight,
        Self::RestoreTab,
        Self::TogglePinned,
        Self::BookmarkAllTabs,
        Self::SelectByDomain,
        Self::SelectByOpener,
    ];
}

impl<D: Document> TabStripModel<D> {
    pub fn is_context_menu_command_enabled(
        &self,
        context_index: usize,
        command: ContextMenuCommand,
    ) -> bool {
        match command {
            ContextMenuCommand::NewTab | ContextMenuCommand::CloseTab => true,
            ContextMenuCommand::Reload => self
                .indices_for_command(context_index)
                .into_iter()
                .filter_map(|index| self.contents_at(index))
                .any(|contents| self.delegate.can_reload_contents(contents)),
            ContextMenuCommand::CloseOtherTabs | ContextMenuCommand::CloseTabsToRight => {
                !self
                    .indices_closed_by_command(context_index, command)
                    .is_empty()
            }
            ContextMenuCommand::Duplicate => self
                .indices_for_command(context_index)
                .into_iter()
                .filter_map(|index| self.contents_at(index))
                .any(|contents| self.delegate.can_duplicate_contents(contents)),
            ContextMenuCommand::RestoreTab => self.delegate.can_restore_tab(),
            ContextMenuCommand::TogglePinned => self
                .indices_for_command(context_index)
                .into_iter()
                .any(|index| !self.is_app_tab(index)),
            ContextMenuCommand::BookmarkAllTabs => self.delegate.can_bookmark_all_tabs(),
            ContextMenuCommand::SelectByDomain | ContextMenuCommand::SelectByOpener => true,
        }
    }

    pub fn execute_context_menu_command(
        &mut self,
        context_index: usize,
        command: ContextMenuCommand,
    ) {
        assert!(
            self.contains_index(context_index),
            "tab index {context_index} out of range for {} tabs",
            self.count()
        );
        log::debug!("Context menu {:?} on tab {}", command, context_index);

        match command {
            ContextMenuCommand::NewTab => {
                if let Some(contents) = self.delegate.create_blank_contents() {
                    self.add_tab_contents(
                        contents,
                        Some(context_index + 1),
                        PageTransition::Typed,
                        AddTabFlags::ACTIVE,
                    );
                }
            }

            ContextMenuCommand::Reload => {
                for index in self.indices_for_command(context_index) {
                    let id = self.order[index];
                    let Some(entry) = self.tabs.get_mut(&id) else {
                        continue;
                    };
                    if self.delegate.can_reload_contents(&entry.contents) {
                        entry.contents.reload();
                    }
                }
            }

            ContextMenuCommand::Duplicate => {
                // Duplicates shift indices, so remember tabs by id.
                for id in self.ids_for_command(context_index) {
                    let Some(index) = self.index_of(id) else {
                        continue;
                    };
                    let source = &self.tabs[&id];
                    if !self.delegate.can_duplicate_contents(&source.contents) {
                        continue;
                    }
                    let pinned = source.pinned;
                    if let Some(duplicate) = self.delegate.duplicate_contents(&source.contents) {
                        let mut flags = AddTabFlags::ACTIVE | AddTabFlags::INHERIT_GROUP;
                        if pinned {
                            flags |= AddTabFlags::PINNED;
                        }
                        self.insert_tab_contents_at(index + 1, duplicate, flags);
                    }
                }
            }

            ContextMenuCommand::CloseTab => {
                for id in self.ids_for_command(context_index) {
                    if let Some(index) = self.index_of(id) {
                        self.close_tab_contents_at(
                            index,
                            CloseTabFlags::CREATE_HISTORICAL_RECORD | CloseTabFlags::USER_GESTURE,
                        );
                    }
                }
            }

            ContextMenuCommand::CloseOtherTabs | ContextMenuCommand::CloseTabsToRight => {
                let indices = self.indices_closed_by_command(context_index, command);
                self.close_tabs_at(&indices, CloseTabFlags::CREATE_HISTORICAL_RECORD);
            }

            ContextMenuCommand::RestoreTab => {
                self.restore_last_closed_tab();
            }

            ContextMenuCommand::TogglePinned => {
                let indices = self.indices_for_command(context_index);
                if self.will_context_menu_pin(context_index) {
                    for index in indices {
                        if !self.is_app_tab(index) {
                            self.set_tab_pinned(index, true);
                        }
                    }
                } else {
                    // Unpinning moves tabs, so go from the back to keep order.
                    for index in indices.into_iter().rev() {
                        if !self.is_app_tab(index) {
                            self.set_tab_pinned(index, false);
                        }
                    }
                }
            }

            ContextMenuCommand::BookmarkAllTabs => {
                let tabs: Vec<&D> = self
                    .order
                    .iter()
                    .map(|id| &self.tabs[id].contents)
                    .collect();
                self.delegate.bookmark_all_tabs(&tabs);
            }

            ContextMenuCommand::SelectByDomain | ContextMenuCommand::SelectByOpener => {
                let indices = if command == ContextMenuCommand::SelectByDomain {
                    self.indices_with_same_domain(context_index)
                } else {
                    self.indices_with_same_opener(context_index)
                };
                let mut selection = SelectionModel::new();
                selection.set_selected_index(context_index);
                for index in indices {
                    selection.add_index_to_selection(index);
                }
                self.set_selection_from_model(selection);
            }
        }
    }

    /// Indices closed by `CloseOtherTabs` or `CloseTabsToRight`, in
    /// descending order. Mini tabs are never closed, and neither is the
    /// context tab or, when it is selected, the rest of the selection.
    pub fn indices_closed_by_command(&self, index: usize, command: ContextMenuCommand) -> Vec<usize> {
        assert!(
            matches!(
                command,
                ContextMenuCommand::CloseOtherTabs | ContextMenuCommand::CloseTabsToRight
            ),
            "{command:?} does not close tabs in bulk"
        );
        let is_selected = self.is_tab_selected(index);
        let start = if command == ContextMenuCommand::CloseTabsToRight {
            match self.selection.selected_indices().last() {
                Some(&last) if is_selected => last + 1,
                _ => index + 1,
            }
        } else {
            0
        };

        (start..self.count())
            .rev()
            .filter(|&i| {
                i != index && !self.is_mini_tab(i) && (!is_selected || !self.is_tab_selected(i))
            })
            .collect()
    }

    /// Whether `TogglePinned` on `index` pins (true) or unpins (false).
    pub fn will_context_menu_pin(&self, index: usize) -> bool {
        let all_pinned = self
            .indices_for_command(index)
            .into_iter()
            .filter(|&i| !self.is_app_tab(i))
            .all(|i| self.is_tab_pinned(i));
        !all_pinned
    }

    /// The tabs a command invoked on `index` applies to.
    pub fn indices_for_command(&self, index: usize) -> Vec<usize> {
        if self.is_tab_selected(index) {
            self.selection.selected_indices().to_vec()
        } else {
            vec![index]
        }
    }

    fn ids_for_command(&self, index: usize) -> Vec<TabId> {
        self.indices_for_command(index)
            .into_iter()
            .map(|i| self.order[i])
            .collect()
    }

    fn indices_with_same_domain(&self, index: usize) -> Vec<usize> {
        let host = |i: usize| {
            self.contents_at(i)
                .and_then(|contents| contents.url())
                .and_then(|url| url.host_str())
        };
        let Some(domain) = host(index).filter(|domain| !domain.is_empty()) else {
            return Vec::new();
        };
        (0..self.count())
            .filter(|&i| i != index && host(i) == Some(domain))
            .collect()
    }

    /// Tabs in the same group as `index`, or opened from it when it has no
    /// group.
    fn indices_with_same_opener(&self, index: usize) -> Vec<usize> {
        let opener = self.group_of(index).unwrap_or(self.order[index]);
        (0..self.count())
            .filter(|&i| i != index && (self.group_of(i) == Some(opener) || self.order[i] == opener))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::DefaultDelegate;
    use tabstrip_core::PageInfo;
    use url::Url;

    fn strip_of(urls: &[&str]) -> TabStripModel<PageInfo> {
        let mut strip = TabStripModel::new(Box::new(DefaultDelegate));
        for url in urls {
            strip.append_tab_contents(PageInfo::new(Url::parse(url).unwrap()), true);
        }
        strip
    }

    fn closed(strip: &TabStripModel<PageInfo>, index: usize, command: ContextMenuCommand) -> Vec<usize> {
        strip.indices_closed_by_command(index, command)
    }

    #[test]
    fn indices_closed_by_command_skips_pinned() {
        let urls = ["https://a.test/"; 5];
        let mut strip = strip_of(&urls);
        strip.activate_tab_at(0, true);

        assert_eq!(closed(&strip, 0, ContextMenuCommand::CloseTabsToRight), vec![4, 3, 2, 1]);
        assert_eq!(closed(&strip, 1, ContextMenuCommand::CloseTabsToRight), vec![4, 3, 2]);
        assert_eq!(closed(&strip, 0, ContextMenuCommand::CloseOtherTabs), vec![4, 3, 2, 1]);
        assert_eq!(closed(&strip, 1, ContextMenuCommand::CloseOtherTabs), vec![4, 3, 2, 0]);

        strip.set_tab_pinned(0, true);
        strip.set_tab_pinned(1, true);
        assert_eq!(closed(&strip, 0, ContextMenuCommand::CloseTabsToRight), vec![4, 3, 2]);
        assert_eq!(closed(&strip, 2, ContextMenuCommand::CloseTabsToRight), vec![4, 3]);
        assert_eq!(closed(&strip, 0, ContextMenuCommand::CloseOtherTabs), vec![4, 3, 2]);
        assert_eq!(closed(&strip, 2, ContextMenuCommand::CloseOtherTabs), vec![4, 3]);
    }

    #[test]
    fn select_by_domain() {
        let mut strip = strip_of(&[
            "https://a.test/1",
            "https://b.test/",
            "https://a.test/2",
            "about:blank",
        ]);
        strip.execute_context_menu_command(0, ContextMenuCommand::SelectByDomain);
        assert_eq!(strip.selection_model().selected_indices(), &[0, 2]);
        assert_eq!(strip.active_index(), Some(0));

        // Hostless pages select only themselves.
        strip.execute_context_menu_command(3, ContextMenuCommand::SelectByDomain);
        assert_eq!(strip.selection_model().selected_indices(), &[3]);
    }

    #[test]
    fn toggle_pinned_flips_whole_selection() {
        let mut strip = strip_of(&["https://a.test/", "https://b.test/", "https://c.test/"]);
        strip.activate_tab_at(0, true);
        strip.add_tab_at_to_selection(1);
        assert!(strip.will_context_menu_pin(0));

        strip.execute_context_menu_command(0, ContextMenuCommand::TogglePinned);
        assert!(strip.is_tab_pinned(0) && strip.is_tab_pinned(1));
        assert!(!strip.will_context_menu_pin(0));

        strip.execute_context_menu_command(0, ContextMenuCommand::TogglePinned);
        assert!(!strip.is_tab_pinned(0) && !strip.is_tab_pinned(1));
    }

    #[test]
    fn default_delegate_disables_services() {
        let strip = strip_of(&["https://a.test/"]);
        assert!(strip.is_context_menu_command_enabled(0, ContextMenuCommand::NewTab));
        assert!(strip.is_context_menu_command_enabled(0, ContextMenuCommand::Reload));
        assert!(!strip.is_context_menu_command_enabled(0, ContextMenuCommand::Duplicate));
        assert!(!strip.is_context_menu_command_enabled(0, ContextMenuCommand::RestoreTab));
        assert!(!strip.is_context_menu_command_enabled(0, ContextMenuCommand::BookmarkAllTabs));
        assert!(!strip.is_context_menu_command_enabled(0, ContextMenuCommand::CloseOtherTabs));
    }

    #[test]
    fn command_names_round_trip_through_json() {
        let json = serde_json::to_string(&ContextMenuCommand::CloseTabsToRight).unwrap();
        assert_eq!(json, "\"close_tabs_to_right\"");
    }
}
