//! The contract between the tab strip and the content it hosts

use serde::{Deserialize, Serialize};
use url::Url;

/// Content hosted by one tab.
///
/// The tab strip owns each document exclusively while it is in the strip and
/// only reads the handful of facts below. Everything else about the content
/// (rendering, history, scripting) lives behind the implementation.
pub trait Document {
    /// The committed URL, if the document has navigated anywhere.
    fn url(&self) -> Option<&Url>;

    /// Number of entries in the document's session history.
    fn navigation_entry_count(&self) -> usize;

    fn is_loading(&self) -> bool {
        false
    }

    /// Whether a close of this document was initiated by the user.
    fn closed_by_user_gesture(&self) -> bool;

    fn set_closed_by_user_gesture(&mut self, closed: bool);

    /// Called once a close of the document begins, before unload handlers.
    fn on_close_started(&mut self) {}

    fn reload(&mut self) {}
}

/// Page metadata; the stock [`Document`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub url: Option<Url>,
    pub title: Option<String>,
    pub favicon: Option<Url>,
    pub loading: bool,
    pub navigation_entries: usize,
    pub closed_by_user_gesture: bool,
    pub close_started: bool,
    pub reload_count: u32,
}

impl PageInfo {
    /// A page that has committed exactly one navigation to `url`.
    pub fn new(url: Url) -> Self {
        Self {
            url: Some(url),
            navigation_entries: 1,
            ..Self::blank()
        }
    }

    /// A page that has not navigated anywhere yet.
    pub fn blank() -> Self {
        Self {
            url: None,
            title: None,
            favicon: None,
            loading: false,
            navigation_entries: 0,
            closed_by_user_gesture: false,
            close_started: false,
            reload_count: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Commit a navigation to `url`, growing the session history.
    pub fn navigate(&mut self, url: Url) {
        self.url = Some(url);
        self.navigation_entries += 1;
    }

    /// Title for display, falling back to the URL.
    pub fn display_title(&self) -> String {
        match (&self.title, &self.url) {
            (Some(title), _) => title.clone(),
            (None, Some(url)) => url.to_string(),
            (None, None) => "Untitled".to_string(),
        }
    }
}

impl Default for PageInfo {
    fn default() -> Self {
        Self::blank()
    }
}

impl Document for PageInfo {
    fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    fn navigation_entry_count(&self) -> usize {
        self.navigation_entries
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn closed_by_user_gesture(&self) -> bool {
        self.closed_by_user_gesture
    }

    fn set_closed_by_user_gesture(&mut self, closed: bool) {
        self.closed_by_user_gesture = closed;
    }

    fn on_close_started(&mut self) {
        self.close_started = true;
    }

    fn reload(&mut self) {
        self.reload_count += 1;
        self.loading = true;
    }
}
