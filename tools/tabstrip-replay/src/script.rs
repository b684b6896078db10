//! Replay script format.
//!
//! A script is a JSON document listing the steps to run against a fresh
//! strip, plus a little embedder state for the delegate:
//!
//! ```json
//! {
//!   "apps": ["https://mail.example/"],
//!   "steps": [
//!     { "op": "append", "url": "https://home.example/" },
//!     { "op": "open", "url": "https://a.example/", "transition": "link" },
//!     { "op": "close", "index": 0 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tabstrip_core::{InsertionPolicy, PageInfo, PageTransition, TabStripError, TabStripResult};
use tabstrip_model::ContextMenuCommand;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// Pages at these URLs are app documents.
    pub apps: Vec<Url>,

    /// Pages at these URLs veto their own close.
    pub block_close: Vec<Url>,

    /// Overrides the configured policy for this script.
    pub insertion_policy: Option<InsertionPolicy>,

    pub steps: Vec<Step>,
}

/// One operation against the strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Append {
        url: Url,
        title: Option<String>,
        #[serde(default = "yes")]
        foreground: bool,
    },
    /// Open a tab the way a navigation of `transition` would.
    Open {
        url: Url,
        title: Option<String>,
        #[serde(default = "link")]
        transition: PageTransition,
        index: Option<usize>,
        #[serde(default)]
        active: bool,
        #[serde(default)]
        pinned: bool,
    },
    Insert {
        index: usize,
        url: Url,
        title: Option<String>,
        #[serde(default)]
        active: bool,
        #[serde(default)]
        pinned: bool,
        #[serde(default)]
        inherit_opener: bool,
    },
    Activate {
        index: usize,
        #[serde(default = "yes")]
        user_gesture: bool,
    },
    Close {
        index: usize,
        #[serde(default = "yes")]
        user_gesture: bool,
    },
    CloseSelected,
    CloseAll,
    Detach {
        index: usize,
    },
    Pin {
        index: usize,
        #[serde(default = "yes")]
        pinned: bool,
    },
    Block {
        index: usize,
        #[serde(default = "yes")]
        blocked: bool,
    },
    Move {
        from: usize,
        to: usize,
        #[serde(default)]
        select: bool,
    },
    MoveSelected {
        to: usize,
    },
    MoveNext,
    MovePrevious,
    SelectNext,
    SelectPrevious,
    SelectLast,
    ToggleSelection {
        index: usize,
    },
    ExtendSelection {
        index: usize,
    },
    AddSelectionFromAnchor {
        index: usize,
    },
    /// Navigate an existing tab, forgetting openers when the navigation
    /// starts a new task.
    Navigate {
        index: usize,
        url: Url,
        #[serde(default = "link")]
        transition: PageTransition,
    },
    Loading {
        index: usize,
        loading: bool,
    },
    ContextMenu {
        index: usize,
        command: ContextMenuCommand,
    },
    Restore,
    ForgetOpeners,
}

fn yes() -> bool {
    true
}

fn link() -> PageTransition {
    PageTransition::Link
}

impl Script {
    pub fn from_json_str(json: &str) -> TabStripResult<Self> {
        let script: Self = serde_json::from_str(json)?;
        if script.steps.is_empty() {
            return Err(TabStripError::script("script has no steps"));
        }
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> TabStripResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let script = Self::from_json_str(&contents)?;
        log::debug!("Loaded {} steps from {}", script.steps.len(), path.display());
        Ok(script)
    }
}

/// Page for a step that creates a tab.
pub(crate) fn page(url: &Url, title: Option<&str>) -> PageInfo {
    let page = PageInfo::new(url.clone());
    match title {
        Some(title) => page.with_title(title),
        None => page,
    }
}
