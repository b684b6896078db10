//! Tab Strip Core Library
//!
//! This crate provides shared types, errors, configuration and logging setup
//! for the tab strip model and its tools.

pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{LogSettings, TabStripConfig};
pub use document::{Document, PageInfo};
pub use error::{TabStripError, TabStripResult};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use types::{
    AddTabFlags, CloseTabFlags, InsertionPolicy, PageTransition, TabChangeType, TabId,
};
