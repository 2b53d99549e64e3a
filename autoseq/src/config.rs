use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::AutomationError;

/// Per-dialog-kind timeouts, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub browse_dialog_secs: u64,
    pub preferences_secs: u64,
    pub copy_files_secs: u64,
    pub error_window_secs: u64,
    pub call_bases_secs: u64,
    pub read_info_secs: u64,
    /// Bound on waiting for the main window after connect/launch.
    pub connect_secs: u64,
    pub process_completion_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            browse_dialog_secs: 5,
            preferences_secs: 5,
            copy_files_secs: 5,
            error_window_secs: 5,
            call_bases_secs: 5,
            read_info_secs: 5,
            connect_secs: 10,
            process_completion_secs: 30,
        }
    }
}

/// Settle delays after UI interactions, accommodating asynchronous redraw.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiDelays {
    pub click_ms: u64,
    pub expand_ms: u64,
    /// Extra delay before the very first folder browse of a session; the
    /// browse dialog populates noticeably slower right after launch.
    pub first_browse_ms: u64,
}

impl Default for UiDelays {
    fn default() -> Self {
        Self {
            click_ms: 200,
            expand_ms: 300,
            first_browse_ms: 1000,
        }
    }
}

impl UiDelays {
    pub fn click(&self) -> Duration {
        Duration::from_millis(self.click_ms)
    }

    pub fn expand(&self) -> Duration {
        Duration::from_millis(self.expand_ms)
    }

    pub fn first_browse(&self) -> Duration {
        Duration::from_millis(self.first_browse_ms)
    }
}

/// Completion polling parameters for [`crate::monitor::ProcessMonitor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub poll_interval_ms: u64,
    /// Number of recognized output text files that signals a finished job.
    pub output_file_threshold: usize,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            output_file_threshold: 5,
        }
    }
}

/// Fixed configuration surface consumed by the automation core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MseqConfig {
    /// Directory holding the mSeq executable.
    pub mseq_dir: PathBuf,
    pub mseq_executable: String,
    /// Extension of the instrument trace files mSeq consumes.
    pub abi_extension: String,
    /// Output text file extensions mSeq writes next to the traces.
    pub text_extensions: Vec<String>,
    /// Display aliases for mapped network drives, keyed by drive token
    /// (e.g. "H:" -> "ABISync").
    pub network_drives: HashMap<String, String>,
    pub timeouts: Timeouts,
    pub delays: UiDelays,
    pub completion: CompletionSettings,
}

impl Default for MseqConfig {
    fn default() -> Self {
        Self {
            mseq_dir: PathBuf::from(r"C:\DNA\Mseq4\bin"),
            mseq_executable: "mSeq.exe".to_string(),
            abi_extension: ".ab1".to_string(),
            text_extensions: vec![
                ".raw.qual.txt".to_string(),
                ".raw.seq.txt".to_string(),
                ".seq.info.txt".to_string(),
                ".seq.qual.txt".to_string(),
                ".seq.txt".to_string(),
            ],
            network_drives: HashMap::new(),
            timeouts: Timeouts::default(),
            delays: UiDelays::default(),
            completion: CompletionSettings::default(),
        }
    }
}

impl MseqConfig {
    /// Loads configuration from a JSON file; missing keys fall back to the
    /// defaults above.
    pub fn load(path: &Path) -> Result<Self, AutomationError> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            AutomationError::InvalidArgument(format!(
                "invalid config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Shell command that launches mSeq from its install directory.
    pub fn launch_command(&self) -> String {
        format!(
            "cmd /c \"cd /d {} && {}\"",
            self.mseq_dir.display(),
            self.mseq_executable
        )
    }
}
