use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::MseqConfig;
use crate::dialogs::DialogController;
use crate::fs::FileStore;
use crate::ui::AppHandle;
use crate::utils::Clock;

/// Notification titles mSeq uses when it skipped low-quality reads.
const LOW_QUALITY_TITLES: [&str; 2] = ["Low quality files skipped", "Quality files skipped"];

/// Polls for one of mSeq's completion signals with a bounded wait.
pub struct ProcessMonitor {
    dialogs: DialogController,
    fs: Arc<dyn FileStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    max_wait: Duration,
    output_file_threshold: usize,
    text_extensions: Vec<String>,
}

impl ProcessMonitor {
    pub fn new(
        dialogs: DialogController,
        fs: Arc<dyn FileStore>,
        clock: Arc<dyn Clock>,
        config: &MseqConfig,
    ) -> Self {
        Self {
            dialogs,
            fs,
            clock,
            interval: Duration::from_millis(config.completion.poll_interval_ms),
            max_wait: Duration::from_secs(config.timeouts.process_completion_secs),
            output_file_threshold: config.completion.output_file_threshold,
            text_extensions: config.text_extensions.clone(),
        }
    }

    /// Waits for processing of `folder_path` to complete.
    ///
    /// Signals, checked in priority order on every poll:
    /// 1. a low-quality-skipped notification (dismissed, then done);
    /// 2. any open read-information window (closed, then treated as done;
    ///    this can under-wait jobs with multiple reads, behavior kept as-is);
    /// 3. the count of recognized output text files reaching the threshold.
    ///
    /// Returns false once the maximum wait elapses with no signal observed.
    pub fn wait_for_completion(&self, app: &AppHandle, folder_path: &Path) -> bool {
        let mut elapsed = Duration::ZERO;
        while elapsed < self.max_wait {
            if let Some(dialog) = self.dialogs.get_dialog_by_titles(app, &LOW_QUALITY_TITLES) {
                debug!("low quality notification observed, dismissing");
                self.dialogs.click_button(&dialog, &["OK"]);
                return true;
            }

            if self.dialogs.close_all_read_info_dialogs(app) {
                return true;
            }

            let count = self.output_file_count(folder_path);
            if count >= self.output_file_threshold {
                debug!("found {count} output text files in {}", folder_path.display());
                return true;
            }

            self.clock.sleep(self.interval);
            elapsed += self.interval;
        }
        false
    }

    /// Fresh count of recognized output text files in the folder. Bypasses
    /// the listing cache: the whole point is to observe files appearing.
    pub fn output_file_count(&self, folder_path: &Path) -> usize {
        self.fs
            .refresh(folder_path)
            .iter()
            .filter(|name| self.text_extensions.iter().any(|ext| name.ends_with(ext)))
            .count()
    }
}
