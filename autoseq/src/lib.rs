//! Automation driver for the mSeq sequencing application.
//!
//! Two halves make up the crate: the naming layer ([`patterns`], [`naming`]),
//! which classifies the lab's BioI/PCR/plate folder conventions and
//! normalizes trace filenames, and the UI-driving layer ([`dialogs`],
//! [`navigation`], [`monitor`], [`automation`]), which walks mSeq through a
//! new-project run against the opaque [`ui::UiAutomation`] seam. Waiting is
//! bounded busy-polling throughout; nothing here spawns threads.

pub mod automation;
pub mod config;
pub mod dialogs;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod monitor;
pub mod naming;
pub mod navigation;
pub mod patterns;
#[cfg(test)]
mod tests;
pub mod ui;
pub mod utils;

pub use automation::MseqAutomation;
pub use config::MseqConfig;
pub use dialogs::{ButtonPress, DialogController, DialogKind, SelectionStrategy};
pub use errors::AutomationError;
pub use fs::{FileStore, LocalFileStore};
pub use monitor::ProcessMonitor;
pub use naming::NameNormalizer;
pub use navigation::{FolderNavigator, NavigationPath};
pub use patterns::PatternRegistry;
pub use ui::{
    AppHandle, ControlHandle, ListViewKind, NodeHandle, Rect, TitleFilter, UiAutomation,
    WindowHandle,
};
pub use utils::{poll_until, Clock, SystemClock};
