//! Runs a [`Script`] against a fresh strip.

use crate::script::{page, Script, Step};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tabstrip_core::{
    AddTabFlags, CloseTabFlags, PageInfo, TabChangeType, TabStripConfig, TabStripError,
    TabStripResult,
};
use tabstrip_model::{
    RestoredTab, SelectionModel, TabStripDelegate, TabStripModel, TabStripObserver,
};
use url::Url;

/// Embedder state behind [`ReplayDelegate`].
#[derive(Debug, Default)]
struct EmbedderState {
    apps: Vec<Url>,
    block_close: Vec<Url>,
    new_tab_url: Option<Url>,
    closed: Vec<RestoredTab<PageInfo>>,
    bookmarked: Vec<String>,
}

struct ReplayDelegate {
    state: Rc<RefCell<EmbedderState>>,
}

fn url_in(urls: &[Url], contents: &PageInfo) -> bool {
    contents.url.as_ref().is_some_and(|url| urls.contains(url))
}

impl TabStripDelegate<PageInfo> for ReplayDelegate {
    fn is_app_document(&self, contents: &PageInfo) -> bool {
        url_in(&self.state.borrow().apps, contents)
    }

    fn should_block_close(&mut self, contents: &mut PageInfo) -> bool {
        let blocked = url_in(&self.state.borrow().block_close, contents);
        if blocked {
            log::info!("{} refused to close", contents.display_title());
        }
        blocked
    }

    fn create_historical_record(&mut self, contents: &PageInfo, index: usize) {
        self.state.borrow_mut().closed.push(RestoredTab {
            contents: contents.clone(),
            index: Some(index),
            pinned: false,
        });
    }

    fn can_duplicate_contents(&self, contents: &PageInfo) -> bool {
        contents.url.is_some()
    }

    fn duplicate_contents(&mut self, contents: &PageInfo) -> Option<PageInfo> {
        let mut copy = contents.clone();
        copy.closed_by_user_gesture = false;
        copy.close_started = false;
        Some(copy)
    }

    fn create_blank_contents(&mut self) -> Option<PageInfo> {
        self.state.borrow().new_tab_url.clone().map(PageInfo::new)
    }

    fn can_restore_tab(&self) -> bool {
        !self.state.borrow().closed.is_empty()
    }

    fn restore_last_closed(&mut self) -> Option<RestoredTab<PageInfo>> {
        let mut restored = self.state.borrow_mut().closed.pop()?;
        restored.contents.closed_by_user_gesture = false;
        restored.contents.close_started = false;
        Some(restored)
    }

    fn can_bookmark_all_tabs(&self) -> bool {
        true
    }

    fn bookmark_all_tabs(&mut self, tabs: &[&PageInfo]) {
        self.state.borrow_mut().bookmarked = tabs.iter().map(|tab| tab.display_title()).collect();
    }
}

/// Logs every notification and keeps a copy for the report.
struct EventLogger {
    events: Rc<RefCell<Vec<String>>>,
}

impl EventLogger {
    fn record(&self, event: String) {
        log::debug!("{}", event);
        self.events.borrow_mut().push(event);
    }
}

impl TabStripObserver<PageInfo> for EventLogger {
    fn tab_inserted_at(&mut self, contents: &PageInfo, index: usize, foreground: bool) {
        let how = if foreground { "foreground" } else { "background" };
        self.record(format!(
            "inserted {} at {} ({})",
            contents.display_title(),
            index,
            how
        ));
    }

    fn tab_closing_at(&mut self, contents: &PageInfo, index: usize) {
        self.record(format!("closing {} at {}", contents.display_title(), index));
    }

    fn tab_detached_at(&mut self, contents: &PageInfo, index: usize) {
        self.record(format!("detached {} from {}", contents.display_title(), index));
    }

    fn active_tab_changed(
        &mut self,
        _old_contents: Option<&PageInfo>,
        new_contents: &PageInfo,
        index: usize,
        user_gesture: bool,
    ) {
        let by = if user_gesture { " by user" } else { "" };
        self.record(format!(
            "activated {} at {}{}",
            new_contents.display_title(),
            index,
            by
        ));
    }

    fn tab_selection_changed(&mut self, _old_model: &SelectionModel) {
        self.record("selection changed".to_string());
    }

    fn tab_moved(&mut self, contents: &PageInfo, from_index: usize, to_index: usize) {
        self.record(format!(
            "moved {} from {} to {}",
            contents.display_title(),
            from_index,
            to_index
        ));
    }

    fn tab_changed_at(&mut self, contents: &PageInfo, index: usize, change_type: TabChangeType) {
        self.record(format!(
            "changed {} at {} ({:?})",
            contents.display_title(),
            index,
            change_type
        ));
    }

    fn tab_replaced_at(&mut self, old_contents: &PageInfo, new_contents: &PageInfo, index: usize) {
        self.record(format!(
            "replaced {} with {} at {}",
            old_contents.display_title(),
            new_contents.display_title(),
            index
        ));
    }

    fn tab_pinned_state_changed(&mut self, contents: &PageInfo, index: usize) {
        self.record(format!("pinned state of {} at {}", contents.display_title(), index));
    }

    fn tab_blocked_state_changed(&mut self, contents: &PageInfo, index: usize) {
        self.record(format!("blocked state of {} at {}", contents.display_title(), index));
    }

    fn tab_strip_empty(&mut self) {
        self.record("strip empty".to_string());
    }
}

#[derive(Debug, Serialize)]
pub struct TabReport {
    pub index: usize,
    pub title: String,
    pub url: Option<Url>,
    pub active: bool,
    pub selected: bool,
    pub pinned: bool,
    pub mini: bool,
    pub app: bool,
    pub blocked: bool,
    pub loading: bool,
    /// Index of the tab that opened this one.
    pub opener: Option<usize>,
    /// Index of the tab whose group this one belongs to.
    pub group: Option<usize>,
}

/// Final state of a replayed session.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub steps: usize,
    pub active_index: Option<usize>,
    pub selected: Vec<usize>,
    pub anchor: Option<usize>,
    pub tabs: Vec<TabReport>,
    /// Tabs the delegate could still restore.
    pub closed_tabs: usize,
    pub bookmarked: Vec<String>,
    pub event_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

impl ReplayReport {
    fn capture(strip: &TabStripModel<PageInfo>, steps: usize, state: &EmbedderState) -> Self {
        let selection = strip.selection_model();
        let index_of = |id| strip.index_of(id);
        let tabs = strip
            .iter()
            .enumerate()
            .map(|(index, (_, contents))| TabReport {
                index,
                title: contents.display_title(),
                url: contents.url.clone(),
                active: strip.active_index() == Some(index),
                selected: selection.is_selected(index),
                pinned: strip.is_tab_pinned(index),
                mini: strip.is_mini_tab(index),
                app: strip.is_app_tab(index),
                blocked: strip.is_tab_blocked(index),
                loading: contents.loading,
                opener: strip.opener_of(index).and_then(index_of),
                group: strip.group_of(index).and_then(index_of),
            })
            .collect();

        Self {
            steps,
            active_index: strip.active_index(),
            selected: selection.selected_indices().to_vec(),
            anchor: selection.anchor(),
            tabs,
            closed_tabs: state.closed.len(),
            bookmarked: state.bookmarked.clone(),
            event_count: 0,
            events: None,
        }
    }
}

/// Replay `script` and capture the resulting strip.
///
/// Steps are validated before they reach the model; the first invalid step
/// aborts the replay with a script error naming it.
pub fn run(
    script: &Script,
    config: &TabStripConfig,
    include_events: bool,
) -> TabStripResult<ReplayReport> {
    let mut config = config.clone();
    if let Some(policy) = script.insertion_policy {
        config.insertion_policy = policy;
    }

    let state = Rc::new(RefCell::new(EmbedderState {
        apps: script.apps.clone(),
        block_close: script.block_close.clone(),
        new_tab_url: Some(config.new_tab_url.clone()),
        ..EmbedderState::default()
    }));
    let events = Rc::new(RefCell::new(Vec::new()));

    let mut strip = TabStripModel::with_config(
        Box::new(ReplayDelegate {
            state: state.clone(),
        }),
        &config,
    );
    strip.add_observer(Box::new(EventLogger {
        events: events.clone(),
    }));

    for (n, step) in script.steps.iter().enumerate() {
        log::debug!("Step {}: {:?}", n + 1, step);
        apply(&mut strip, step)
            .map_err(|err| TabStripError::script(format!("step {}: {}", n + 1, err)))?;
    }

    let mut report = ReplayReport::capture(&strip, script.steps.len(), &state.borrow());
    let events = events.borrow();
    report.event_count = events.len();
    if include_events {
        report.events = Some(events.clone());
    }
    log::info!(
        "Replayed {} steps, {} tabs remain",
        report.steps,
        report.tabs.len()
    );
    Ok(report)
}

fn insertion_flags(active: bool, pinned: bool) -> AddTabFlags {
    let mut flags = AddTabFlags::empty();
    flags.set(AddTabFlags::ACTIVE, active);
    flags.set(AddTabFlags::PINNED, pinned);
    flags
}

/// Steps that act on the active tab or the selection.
fn needs_tabs(step: &Step) -> bool {
    matches!(
        step,
        Step::CloseSelected
            | Step::MoveSelected { .. }
            | Step::MoveNext
            | Step::MovePrevious
            | Step::SelectNext
            | Step::SelectPrevious
            | Step::SelectLast
    )
}

fn apply(strip: &mut TabStripModel<PageInfo>, step: &Step) -> TabStripResult<()> {
    if strip.is_empty() && needs_tabs(step) {
        return Err(TabStripError::Empty);
    }
    match step {
        Step::Append {
            url,
            title,
            foreground,
        } => {
            strip.append_tab_contents(page(url, title.as_deref()), *foreground);
        }
        Step::Open {
            url,
            title,
            transition,
            index,
            active,
            pinned,
        } => {
            strip.add_tab_contents(
                page(url, title.as_deref()),
                *index,
                *transition,
                insertion_flags(*active, *pinned),
            );
        }
        Step::Insert {
            index,
            url,
            title,
            active,
            pinned,
            inherit_opener,
        } => {
            if *index > strip.count() {
                return Err(TabStripError::IndexOutOfRange {
                    index: *index,
                    count: strip.count(),
                });
            }
            let mut flags = insertion_flags(*active, *pinned);
            flags.set(AddTabFlags::INHERIT_OPENER, *inherit_opener);
            strip.insert_tab_contents_at(*index, page(url, title.as_deref()), flags);
        }
        Step::Activate {
            index,
            user_gesture,
        } => {
            let index = strip.validate_index(*index)?;
            strip.activate_tab_at(index, *user_gesture);
        }
        Step::Close {
            index,
            user_gesture,
        } => {
            let index = strip.validate_index(*index)?;
            let mut flags = CloseTabFlags::CREATE_HISTORICAL_RECORD;
            flags.set(CloseTabFlags::USER_GESTURE, *user_gesture);
            if !strip.close_tab_contents_at(index, flags) {
                log::info!("Close of tab {} was vetoed", index);
            }
        }
        Step::CloseSelected => {
            if !strip.close_selected_tabs() {
                log::info!("Closing the selection was vetoed");
            }
        }
        Step::CloseAll => {
            if !strip.close_all_tabs() {
                log::info!("Closing all tabs was vetoed");
            }
        }
        Step::Detach { index } => {
            let index = strip.validate_index(*index)?;
            let contents = strip.detach_tab_contents_at(index);
            log::info!("Detached {}", contents.display_title());
        }
        Step::Pin { index, pinned } => {
            let index = strip.validate_index(*index)?;
            strip.set_tab_pinned(index, *pinned);
        }
        Step::Block { index, blocked } => {
            let index = strip.validate_index(*index)?;
            strip.set_tab_blocked(index, *blocked);
        }
        Step::Move { from, to, select } => {
            let from = strip.validate_index(*from)?;
            let to = strip.validate_index(*to)?;
            strip.move_tab_contents_at(from, to, *select);
        }
        Step::MoveSelected { to } => {
            let count = strip.count();
            if *to + strip.selection_model().len() > count {
                return Err(TabStripError::IndexOutOfRange { index: *to, count });
            }
            strip.move_selected_tabs_to(*to);
        }
        Step::MoveNext => strip.move_tab_next(),
        Step::MovePrevious => strip.move_tab_previous(),
        Step::SelectNext => strip.select_next_tab(),
        Step::SelectPrevious => strip.select_previous_tab(),
        Step::SelectLast => strip.select_last_tab(),
        Step::ToggleSelection { index } => {
            let index = strip.validate_index(*index)?;
            strip.toggle_selection_at(index);
        }
        Step::ExtendSelection { index } => {
            let index = strip.validate_index(*index)?;
            strip.extend_selection_to(index);
        }
        Step::AddSelectionFromAnchor { index } => {
            let index = strip.validate_index(*index)?;
            strip.add_selection_from_anchor_to(index);
        }
        Step::Navigate {
            index,
            url,
            transition,
        } => {
            let index = strip.validate_index(*index)?;
            // The model inspects the page it is leaving.
            strip.notify_navigated(strip.id_at(index), *transition);
            if let Some(contents) = strip.contents_at_mut(index) {
                contents.navigate(url.clone());
            }
            strip.update_tab_state_at(index, TabChangeType::All);
        }
        Step::Loading { index, loading } => {
            let index = strip.validate_index(*index)?;
            if let Some(contents) = strip.contents_at_mut(index) {
                contents.loading = *loading;
            }
            strip.update_tab_state_at(index, TabChangeType::LoadingOnly);
        }
        Step::ContextMenu { index, command } => {
            let index = strip.validate_index(*index)?;
            if strip.is_context_menu_command_enabled(index, *command) {
                strip.execute_context_menu_command(index, *command);
            } else {
                log::warn!("{:?} is disabled for tab {}", command, index);
            }
        }
        Step::Restore => {
            if !strip.restore_last_closed_tab() {
                log::info!("No closed tab to restore");
            }
        }
        Step::ForgetOpeners => strip.forget_all_openers(),
    }
    Ok(())
}
