use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{MseqConfig, Timeouts};
use crate::errors::AutomationError;
use crate::ui::{
    AppHandle, ListViewKind, TitleFilter, UiAutomation, WindowHandle, KEY_ACCEPT, KEY_SELECT_ALL,
};
use crate::utils::{poll_until, Clock};

/// The dialogs mSeq raises during a project run, identified by title rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    BrowseFolder,
    Preferences,
    CopyFiles,
    ErrorWindow,
    CallBases,
    ReadInfo,
}

impl DialogKind {
    pub fn title_filter(&self) -> TitleFilter {
        match self {
            DialogKind::BrowseFolder => TitleFilter::PrefixAndFragment {
                prefix: "Browse".to_string(),
                fragment: "Folder".to_string(),
            },
            DialogKind::Preferences => TitleFilter::AnyOf(vec![
                "Mseq Preferences".to_string(),
                "mSeq Preferences".to_string(),
            ]),
            DialogKind::CopyFiles => TitleFilter::PrefixAndFragment {
                prefix: "Copy".to_string(),
                fragment: "sequence files".to_string(),
            },
            DialogKind::ErrorWindow => TitleFilter::ContainsIgnoreCase("error".to_string()),
            DialogKind::CallBases => TitleFilter::StartsWith("Call bases".to_string()),
            DialogKind::ReadInfo => TitleFilter::StartsWith("Read information for".to_string()),
        }
    }

    pub fn timeout(&self, timeouts: &Timeouts) -> Duration {
        let secs = match self {
            DialogKind::BrowseFolder => timeouts.browse_dialog_secs,
            DialogKind::Preferences => timeouts.preferences_secs,
            DialogKind::CopyFiles => timeouts.copy_files_secs,
            DialogKind::ErrorWindow => timeouts.error_window_secs,
            DialogKind::CallBases => timeouts.call_bases_secs,
            DialogKind::ReadInfo => timeouts.read_info_secs,
        };
        Duration::from_secs(secs)
    }

    /// Poll interval while waiting for this dialog; the slow dialogs get a
    /// coarser interval.
    pub fn retry_interval(&self) -> Duration {
        match self {
            DialogKind::ErrorWindow | DialogKind::CallBases => Duration::from_millis(300),
            _ => Duration::from_millis(100),
        }
    }
}

/// How a button ended up being pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonPress {
    /// A labeled button control was clicked.
    Button(String),
    /// No labeled control existed; the default-accept keystroke was sent.
    DefaultAccept,
}

/// Which select-all strategy satisfied a copy-files dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    ShellListView,
    PlainListView,
    CenterClick,
}

/// Locates and drives mSeq's dialogs without the orchestrator knowing any
/// window layout.
#[derive(Clone)]
pub struct DialogController {
    ui: Arc<dyn UiAutomation>,
    clock: Arc<dyn Clock>,
    timeouts: Timeouts,
    click_delay: Duration,
}

impl DialogController {
    pub fn new(ui: Arc<dyn UiAutomation>, clock: Arc<dyn Clock>, config: &MseqConfig) -> Self {
        Self {
            ui,
            clock,
            timeouts: config.timeouts.clone(),
            click_delay: config.delays.click(),
        }
    }

    /// Polls for a dialog of the given kind within its configured timeout.
    /// Returns false on timeout rather than raising.
    pub fn wait_for_dialog(&self, app: &AppHandle, kind: DialogKind) -> bool {
        let filter = kind.title_filter();
        poll_until(
            self.clock.as_ref(),
            kind.timeout(&self.timeouts),
            kind.retry_interval(),
            || self.find_window(app, &filter).is_some(),
        )
    }

    /// Currently-visible dialog of the given kind, if any.
    pub fn find_dialog(&self, app: &AppHandle, kind: DialogKind) -> Option<WindowHandle> {
        self.find_window(app, &kind.title_filter())
    }

    /// First existing window among an ordered list of exact titles.
    pub fn get_dialog_by_titles(&self, app: &AppHandle, titles: &[&str]) -> Option<WindowHandle> {
        titles.iter().find_map(|title| {
            self.find_window(app, &TitleFilter::Exact((*title).to_string()))
        })
    }

    /// The folder-browse dialog, preferring the known exact titles before
    /// falling back to the prefix rule.
    pub fn get_browse_dialog(&self, app: &AppHandle) -> Option<WindowHandle> {
        self.get_dialog_by_titles(app, &["Browse For Folder", "Browse for Folder"])
            .or_else(|| self.find_dialog(app, DialogKind::BrowseFolder))
    }

    fn find_window(&self, app: &AppHandle, filter: &TitleFilter) -> Option<WindowHandle> {
        let windows = match self.ui.windows(app) {
            Ok(windows) => windows,
            Err(e) => {
                debug!("window enumeration failed: {e}");
                return None;
            }
        };
        windows.into_iter().find(|window| {
            self.ui
                .window_title(window)
                .map(|title| filter.matches(&title))
                .unwrap_or(false)
        })
    }

    /// Clicks the first of `labels` that exists as a button control. When no
    /// labeled control exists, falls back to the default-accept keystroke.
    /// `None` means even the fallback could not be delivered.
    pub fn click_button(&self, dialog: &WindowHandle, labels: &[&str]) -> Option<ButtonPress> {
        for label in labels {
            match self.ui.find_button(dialog, label) {
                Ok(Some(button)) => {
                    if self.ui.click_control(&button).is_ok() {
                        self.clock.sleep(self.click_delay);
                        return Some(ButtonPress::Button((*label).to_string()));
                    }
                }
                Ok(None) => {}
                Err(e) => debug!("button lookup failed for {label:?}: {e}"),
            }
        }

        if self.ui.focus_window(dialog).is_ok() && self.ui.send_keys(dialog, KEY_ACCEPT).is_ok() {
            self.clock.sleep(self.click_delay);
            return Some(ButtonPress::DefaultAccept);
        }
        warn!("no button matched {labels:?} and default accept could not be sent");
        None
    }

    /// Selects every file listed in a copy-files dialog, trying the shell
    /// list view, the bare list view, then a center-click as a last resort.
    /// Returns the strategy that worked, or `None` when all three failed.
    pub fn select_all_files(&self, dialog: &WindowHandle) -> Option<SelectionStrategy> {
        if let Ok(Some(list)) = self.ui.find_list_view(dialog, ListViewKind::ShellView) {
            if self.ui.click_control(&list).is_ok()
                && self.ui.send_keys(dialog, KEY_SELECT_ALL).is_ok()
            {
                return Some(SelectionStrategy::ShellListView);
            }
        }

        if let Ok(Some(list)) = self.ui.find_list_view(dialog, ListViewKind::Plain) {
            if self.ui.click_control(&list).is_ok()
                && self.ui.send_keys(dialog, KEY_SELECT_ALL).is_ok()
            {
                return Some(SelectionStrategy::PlainListView);
            }
        }

        match self.center_click_select_all(dialog) {
            Ok(()) => Some(SelectionStrategy::CenterClick),
            Err(e) => {
                warn!("all select-all strategies failed: {e}");
                None
            }
        }
    }

    fn center_click_select_all(&self, dialog: &WindowHandle) -> Result<(), AutomationError> {
        let rect = self.ui.window_rect(dialog)?;
        let (x, y) = rect.center();
        self.ui.click_at(dialog, x, y)?;
        self.clock.sleep(self.click_delay);
        self.ui.send_keys(dialog, KEY_SELECT_ALL)
    }

    /// Closes every open read-information window, continuing past individual
    /// close failures. True iff at least one such window was found.
    pub fn close_all_read_info_dialogs(&self, app: &AppHandle) -> bool {
        let windows = match self.ui.windows(app) {
            Ok(windows) => windows,
            Err(e) => {
                warn!("error finding read information dialogs: {e}");
                return false;
            }
        };

        let filter = DialogKind::ReadInfo.title_filter();
        let mut found = false;
        for window in windows {
            let Ok(title) = self.ui.window_title(&window) else {
                continue;
            };
            if !filter.matches(&title) {
                continue;
            }
            found = true;
            info!("closing read information dialog: {title}");
            if let Err(e) = self.ui.close_window(&window) {
                warn!("error closing read dialog {title:?}: {e}");
            }
        }
        found
    }
}
