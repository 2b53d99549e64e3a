use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::MseqConfig;
use crate::dialogs::{DialogController, DialogKind};
use crate::errors::AutomationError;
use crate::fs::FileStore;
use crate::monitor::ProcessMonitor;
use crate::navigation::FolderNavigator;
use crate::ui::{AppHandle, TitleFilter, UiAutomation, WindowHandle, KEY_NEW_PROJECT};
use crate::utils::{poll_until, Clock};

/// Drives one mSeq instance through complete "process this folder" runs.
///
/// Holds the session state for exactly one external application instance:
/// its process handle, its main window, and whether this session has browsed
/// before. One orchestrator per instance; collaborators are injected so
/// several orchestrators (or a test with fakes) can coexist.
pub struct MseqAutomation {
    config: MseqConfig,
    ui: Arc<dyn UiAutomation>,
    fs: Arc<dyn FileStore>,
    clock: Arc<dyn Clock>,
    dialogs: DialogController,
    navigator: FolderNavigator,
    monitor: ProcessMonitor,
    app: Option<AppHandle>,
    main_window: Option<WindowHandle>,
    first_time_browsing: bool,
}

impl MseqAutomation {
    pub fn new(
        config: MseqConfig,
        ui: Arc<dyn UiAutomation>,
        fs: Arc<dyn FileStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let dialogs = DialogController::new(ui.clone(), clock.clone(), &config);
        let navigator = FolderNavigator::new(ui.clone(), clock.clone(), &config);
        let monitor = ProcessMonitor::new(dialogs.clone(), fs.clone(), clock.clone(), &config);
        Self {
            config,
            ui,
            fs,
            clock,
            dialogs,
            navigator,
            monitor,
            app: None,
            main_window: None,
            first_time_browsing: true,
        }
    }

    fn main_window_filter() -> TitleFilter {
        TitleFilter::StartsWithIgnoreCase("mseq".to_string())
    }

    fn find_main_window(&self, app: &AppHandle) -> Option<WindowHandle> {
        let filter = Self::main_window_filter();
        let windows = self.ui.windows(app).ok()?;
        windows.into_iter().find(|window| {
            self.ui
                .window_title(window)
                .map(|title| filter.matches(&title))
                .unwrap_or(false)
        })
    }

    /// Attaches to a running mSeq instance, launching one when none exists.
    ///
    /// Ambiguous matches resolve to the first instance with a warning. The
    /// one fatal failure in this module: a main window that never shows up
    /// after connect/launch.
    fn connect_or_start(&mut self) -> Result<(), AutomationError> {
        let filter = Self::main_window_filter();
        let instances = match self.ui.app_instances(&filter) {
            Ok(instances) => instances,
            Err(e) => {
                debug!("instance lookup failed, will launch: {e}");
                Vec::new()
            }
        };

        let app = match instances.split_first() {
            Some((first, rest)) => {
                if rest.is_empty() {
                    info!("connected to existing mSeq instance");
                } else {
                    warn!("multiple mSeq windows found, connecting to first instance");
                }
                first.clone()
            }
            None => {
                info!("starting new mSeq instance");
                self.ui.launch(&self.config.launch_command())?
            }
        };

        // The main window can lag behind process startup.
        let connect_timeout = Duration::from_secs(self.config.timeouts.connect_secs);
        poll_until(
            self.clock.as_ref(),
            connect_timeout,
            Duration::from_millis(100),
            || self.find_main_window(&app).is_some(),
        );

        match self.find_main_window(&app) {
            Some(window) => {
                self.app = Some(app);
                self.main_window = Some(window);
                Ok(())
            }
            None => {
                error!("could not find mSeq main window");
                Err(AutomationError::ElementNotFound(
                    "mSeq main window".to_string(),
                ))
            }
        }
    }

    /// Runs one end-to-end project for `folder_path`.
    ///
    /// `Ok(false)` covers every non-fatal miss: no trace files, the browse
    /// dialog never appearing, navigation failing, or no completion signal
    /// inside the bounded wait. Optional dialogs (preferences, file error,
    /// call bases) are dismissed when present and skipped without complaint
    /// when absent. `Err` is reserved for an unlocatable main window.
    pub fn process_folder(&mut self, folder_path: &Path) -> Result<bool, AutomationError> {
        if !self.fs.exists(folder_path) {
            warn!("folder does not exist: {}", folder_path.display());
            return Ok(false);
        }
        let trace_count = self
            .fs
            .refresh(folder_path)
            .iter()
            .filter(|name| name.ends_with(&self.config.abi_extension))
            .count();
        if trace_count == 0 {
            warn!(
                "no {} files found in {}",
                self.config.abi_extension,
                folder_path.display()
            );
            return Ok(false);
        }
        info!(
            "processing folder with {trace_count} trace files: {}",
            folder_path.display()
        );

        // Sweep leftovers from a previous run before starting a new project.
        if let Some(app) = &self.app {
            self.dialogs.close_all_read_info_dialogs(app);
        }

        let need_connect = match (&self.app, &self.main_window) {
            (Some(_), Some(window)) => !self.ui.window_exists(window),
            _ => true,
        };
        if need_connect {
            self.connect_or_start()?;
        }
        let (app, main_window) = match (self.app.clone(), self.main_window.clone()) {
            (Some(app), Some(window)) => (app, window),
            _ => {
                return Err(AutomationError::PlatformError(
                    "no live mSeq session after connect".to_string(),
                ))
            }
        };

        if let Err(e) = self.ui.focus_window(&main_window) {
            warn!("could not focus main window: {e}");
        }
        if let Err(e) = self.ui.send_keys(&main_window, KEY_NEW_PROJECT) {
            warn!("could not send new-project keystroke: {e}");
        }
        debug!("sent Ctrl+N to start new project");

        if !self.dialogs.wait_for_dialog(&app, DialogKind::BrowseFolder) {
            error!("Browse For Folder dialog not found");
            return Ok(false);
        }
        let Some(browse_dialog) = self.dialogs.get_browse_dialog(&app) else {
            error!("could not get Browse For Folder dialog reference");
            return Ok(false);
        };

        // The first browse after launch needs extra settle time.
        if self.first_time_browsing {
            self.first_time_browsing = false;
            self.clock.sleep(self.config.delays.first_browse());
        }

        let target = folder_path.to_string_lossy();
        if !self.navigator.navigate_to_folder(&browse_dialog, &target) {
            error!("failed to navigate to {}", folder_path.display());
            return Ok(false);
        }
        self.dialogs.click_button(&browse_dialog, &["OK", "&OK"]);

        // Preferences only shows on a fresh install profile; absence is fine.
        self.dialogs.wait_for_dialog(&app, DialogKind::Preferences);
        if let Some(preferences) = self
            .dialogs
            .get_dialog_by_titles(&app, &["Mseq Preferences", "mSeq Preferences"])
        {
            self.dialogs.click_button(&preferences, &["&OK", "OK"]);
        }

        self.dialogs.wait_for_dialog(&app, DialogKind::CopyFiles);
        if let Some(copy_dialog) = self.dialogs.find_dialog(&app, DialogKind::CopyFiles) {
            self.dialogs.select_all_files(&copy_dialog);
            self.dialogs.click_button(&copy_dialog, &["&Open", "Open"]);
        }

        // Expected whenever non-trace files sit next to the ab1s.
        self.dialogs.wait_for_dialog(&app, DialogKind::ErrorWindow);
        if let Some(error_dialog) = self
            .dialogs
            .get_dialog_by_titles(&app, &["File error", "Error"])
        {
            self.dialogs.click_button(&error_dialog, &["OK"]);
        }

        self.dialogs.wait_for_dialog(&app, DialogKind::CallBases);
        if let Some(call_bases) = self.dialogs.find_dialog(&app, DialogKind::CallBases) {
            self.dialogs.click_button(&call_bases, &["&Yes", "Yes"]);
        }

        let completed = self.monitor.wait_for_completion(&app, folder_path);

        // Always sweep read-info windows before returning.
        self.dialogs.close_all_read_info_dialogs(&app);

        if completed {
            info!("successfully processed {}", folder_path.display());
        } else {
            warn!(
                "processing may not have completed properly for {}",
                folder_path.display()
            );
        }
        Ok(completed)
    }

    /// Best-effort teardown: kill the process, falling back to closing the
    /// main window. Failures are logged, never raised.
    pub fn close(&mut self) {
        if let Some(app) = self.app.take() {
            match self.ui.kill_app(&app) {
                Ok(()) => info!("mSeq application closed"),
                Err(e) => {
                    warn!("error closing mSeq: {e}");
                    if let Some(window) = &self.main_window {
                        if self.ui.window_exists(window) {
                            if let Err(e) = self.ui.close_window(window) {
                                warn!("error closing mSeq main window: {e}");
                            }
                        }
                    }
                }
            }
        }
        self.main_window = None;
    }
}
