//! Shared fixtures for the tab strip integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use tabstrip_model::{
    DefaultDelegate, PageInfo, RestoredTab, SelectionModel, TabChangeType, TabStripDelegate,
    TabStripModel, TabStripObserver,
};
use url::Url;

pub fn page(name: &str) -> PageInfo {
    let url = Url::parse(&format!("https://{}.example/", name)).expect("valid test url");
    PageInfo::new(url).with_title(name)
}

pub fn page_at(name: &str, url: &str) -> PageInfo {
    PageInfo::new(Url::parse(url).expect("valid test url")).with_title(name)
}

pub fn strip() -> TabStripModel<PageInfo> {
    TabStripModel::new(Box::new(DefaultDelegate))
}

pub fn title_at(strip: &TabStripModel<PageInfo>, index: usize) -> String {
    strip
        .contents_at(index)
        .map(PageInfo::display_title)
        .unwrap_or_default()
}

pub fn active_title(strip: &TabStripModel<PageInfo>) -> String {
    strip
        .active_contents()
        .map(PageInfo::display_title)
        .unwrap_or_default()
}

pub fn titles(strip: &TabStripModel<PageInfo>) -> String {
    strip
        .iter()
        .map(|(_, contents)| contents.display_title())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Titles in strip order, each followed by `a` for app tabs and `p` for
/// pinned tabs, e.g. `"2p 0 1"`.
pub fn pinned_state(strip: &TabStripModel<PageInfo>) -> String {
    (0..strip.count())
        .map(|i| {
            let mut state = title_at(strip, i);
            if strip.is_app_tab(i) {
                state.push('a');
            }
            if strip.is_tab_pinned(i) {
                state.push('p');
            }
            state
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append `tab_count` tabs titled by their index, pin the first
/// `pinned_count` and select the space separated indices in `selected`.
/// The first selected index becomes active.
pub fn prepare_for_selection_test(
    strip: &mut TabStripModel<PageInfo>,
    tab_count: usize,
    pinned_count: usize,
    selected: &str,
) {
    for i in 0..tab_count {
        strip.append_tab_contents(page(&i.to_string()), true);
    }
    for i in 0..pinned_count {
        strip.set_tab_pinned(i, true);
    }

    let mut selection = SelectionModel::new();
    for index in selected.split_whitespace() {
        selection.add_index_to_selection(index.parse().expect("numeric index"));
    }
    let first = selection.selected_indices().first().copied();
    selection.set_active(first);
    strip.set_selection_from_model(selection);
}

// Observer

#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    fn push(&self, event: String) {
        self.0.borrow_mut().push(event);
    }
}

/// Records every notification as a short string keyed by page title.
pub struct Recorder {
    log: EventLog,
}

impl TabStripObserver<PageInfo> for Recorder {
    fn tab_inserted_at(&mut self, contents: &PageInfo, index: usize, foreground: bool) {
        let suffix = if foreground { " fg" } else { "" };
        self.log
            .push(format!("insert {} {}{}", contents.display_title(), index, suffix));
    }

    fn tab_closing_at(&mut self, contents: &PageInfo, index: usize) {
        self.log
            .push(format!("closing {} {}", contents.display_title(), index));
    }

    fn tab_detached_at(&mut self, contents: &PageInfo, index: usize) {
        self.log
            .push(format!("detach {} {}", contents.display_title(), index));
    }

    fn tab_deactivated(&mut self, contents: &PageInfo) {
        self.log
            .push(format!("deactivate {}", contents.display_title()));
    }

    fn active_tab_changed(
        &mut self,
        old_contents: Option<&PageInfo>,
        new_contents: &PageInfo,
        index: usize,
        _user_gesture: bool,
    ) {
        let old = old_contents
            .map(PageInfo::display_title)
            .unwrap_or_else(|| "-".to_string());
        self.log.push(format!(
            "activate {} {} from {}",
            new_contents.display_title(),
            index,
            old
        ));
    }

    fn tab_selection_changed(&mut self, _old_model: &SelectionModel) {
        self.log.push("select".to_string());
    }

    fn tab_moved(&mut self, contents: &PageInfo, from_index: usize, to_index: usize) {
        self.log.push(format!(
            "move {} {}->{}",
            contents.display_title(),
            from_index,
            to_index
        ));
    }

    fn tab_changed_at(&mut self, contents: &PageInfo, index: usize, change_type: TabChangeType) {
        self.log.push(format!(
            "change {} {} {:?}",
            contents.display_title(),
            index,
            change_type
        ));
    }

    fn tab_replaced_at(&mut self, old_contents: &PageInfo, new_contents: &PageInfo, index: usize) {
        self.log.push(format!(
            "replace {}->{} {}",
            old_contents.display_title(),
            new_contents.display_title(),
            index
        ));
    }

    fn tab_pinned_state_changed(&mut self, contents: &PageInfo, index: usize) {
        self.log
            .push(format!("pin {} {}", contents.display_title(), index));
    }

    fn tab_mini_state_changed(&mut self, contents: &PageInfo, index: usize) {
        self.log
            .push(format!("mini {} {}", contents.display_title(), index));
    }

    fn tab_blocked_state_changed(&mut self, contents: &PageInfo, index: usize) {
        self.log
            .push(format!("block {} {}", contents.display_title(), index));
    }

    fn active_tab_clicked(&mut self, index: usize) {
        self.log.push(format!("click {}", index));
    }

    fn tab_strip_empty(&mut self) {
        self.log.push("empty".to_string());
    }

    fn tab_strip_model_deleted(&mut self) {
        self.log.push("deleted".to_string());
    }
}

pub fn observe(strip: &mut TabStripModel<PageInfo>) -> EventLog {
    let log = EventLog::default();
    strip.add_observer(Box::new(Recorder { log: log.clone() }));
    log
}

// Delegate

/// State shared between a test and its [`ScriptedDelegate`].
#[derive(Default)]
pub struct DelegateState {
    /// Titles treated as app documents.
    pub apps: Vec<String>,
    /// Titles whose close is vetoed.
    pub block_close: Vec<String>,
    /// (title, index) of every historical record.
    pub historical: Vec<(String, usize)>,
    pub closed: Vec<RestoredTab<PageInfo>>,
    pub can_duplicate: bool,
    pub bookmarked: Vec<String>,
    pub blank_tabs_created: usize,
}

pub type SharedState = Rc<RefCell<DelegateState>>;

pub struct ScriptedDelegate {
    state: SharedState,
}

impl TabStripDelegate<PageInfo> for ScriptedDelegate {
    fn is_app_document(&self, contents: &PageInfo) -> bool {
        self.state
            .borrow()
            .apps
            .contains(&contents.display_title())
    }

    fn should_block_close(&mut self, contents: &mut PageInfo) -> bool {
        self.state
            .borrow()
            .block_close
            .contains(&contents.display_title())
    }

    fn create_historical_record(&mut self, contents: &PageInfo, index: usize) {
        let mut state = self.state.borrow_mut();
        state.historical.push((contents.display_title(), index));
        state.closed.push(RestoredTab {
            contents: contents.clone(),
            index: Some(index),
            pinned: false,
        });
    }

    fn can_duplicate_contents(&self, _contents: &PageInfo) -> bool {
        self.state.borrow().can_duplicate
    }

    fn duplicate_contents(&mut self, contents: &PageInfo) -> Option<PageInfo> {
        let title = format!("{}+", contents.display_title());
        Some(contents.clone().with_title(title))
    }

    fn create_blank_contents(&mut self) -> Option<PageInfo> {
        let mut state = self.state.borrow_mut();
        state.blank_tabs_created += 1;
        Some(page_at("new", "about:newtab"))
    }

    fn can_restore_tab(&self) -> bool {
        !self.state.borrow().closed.is_empty()
    }

    fn restore_last_closed(&mut self) -> Option<RestoredTab<PageInfo>> {
        self.state.borrow_mut().closed.pop()
    }

    fn can_bookmark_all_tabs(&self) -> bool {
        true
    }

    fn bookmark_all_tabs(&mut self, tabs: &[&PageInfo]) {
        self.state.borrow_mut().bookmarked = tabs.iter().map(|tab| tab.display_title()).collect();
    }
}

pub fn scripted_strip() -> (TabStripModel<PageInfo>, SharedState) {
    let state = SharedState::default();
    let delegate = ScriptedDelegate {
        state: state.clone(),
    };
    (TabStripModel::new(Box::new(delegate)), state)
}
