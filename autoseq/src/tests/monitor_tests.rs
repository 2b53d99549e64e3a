use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::MseqConfig;
use crate::dialogs::DialogController;
use crate::monitor::ProcessMonitor;
use crate::tests::fake::{FakeClock, FakeStore, FakeUi};

struct Fixture {
    ui: Arc<FakeUi>,
    clock: Arc<FakeClock>,
    store: Arc<FakeStore>,
    config: MseqConfig,
}

impl Fixture {
    fn new() -> Self {
        Self {
            ui: Arc::new(FakeUi::new()),
            clock: Arc::new(FakeClock::new()),
            store: Arc::new(FakeStore::new()),
            config: MseqConfig::default(),
        }
    }

    fn monitor(&self) -> ProcessMonitor {
        let dialogs = DialogController::new(self.ui.clone(), self.clock.clone(), &self.config);
        ProcessMonitor::new(dialogs, self.store.clone(), self.clock.clone(), &self.config)
    }
}

#[test]
fn low_quality_notification_ends_the_wait() {
    let fixture = Fixture::new();
    let app = fixture.ui.add_app();
    fixture.ui.add_window(&app, "mSeq 4.3.1");
    let notice = fixture.ui.add_window(&app, "Low quality files skipped");
    fixture.ui.set_buttons(&notice, &["OK"]);

    let monitor = fixture.monitor();
    assert!(monitor.wait_for_completion(&app, Path::new(r"C:\Data\Run1")));
    assert_eq!(
        fixture.ui.counters().clicked_controls,
        vec!["OK".to_string()]
    );
}

#[test]
fn alternate_low_quality_title_is_recognized() {
    let fixture = Fixture::new();
    let app = fixture.ui.add_app();
    let notice = fixture.ui.add_window(&app, "Quality files skipped");
    fixture.ui.set_buttons(&notice, &["OK"]);

    let monitor = fixture.monitor();
    assert!(monitor.wait_for_completion(&app, Path::new(r"C:\Data\Run1")));
}

#[test]
fn open_read_info_windows_signal_completion() {
    let fixture = Fixture::new();
    let app = fixture.ui.add_app();
    fixture.ui.add_window(&app, "mSeq 4.3.1");
    fixture
        .ui
        .add_window(&app, "Read information for B03_sample.ab1");

    let monitor = fixture.monitor();
    assert!(monitor.wait_for_completion(&app, Path::new(r"C:\Data\Run1")));
    assert_eq!(
        fixture.ui.counters().closed_windows,
        vec!["Read information for B03_sample.ab1".to_string()]
    );
}

#[test]
fn completes_once_enough_output_files_appear() {
    crate::tests::init_tracing();
    let fixture = Fixture::new();
    let app = fixture.ui.add_app();
    fixture.ui.add_window(&app, "mSeq 4.3.1");

    let folder = Path::new(r"C:\Data\Run1");
    let partial: Vec<String> = vec![
        "A01_x.ab1".to_string(),
        "A01_x.raw.qual.txt".to_string(),
        "A01_x.raw.seq.txt".to_string(),
    ];
    let complete: Vec<String> = vec![
        "A01_x.ab1".to_string(),
        "A01_x.raw.qual.txt".to_string(),
        "A01_x.raw.seq.txt".to_string(),
        "A01_x.seq.info.txt".to_string(),
        "A01_x.seq.qual.txt".to_string(),
        "A01_x.seq.txt".to_string(),
    ];
    fixture
        .store
        .script_refreshes(folder, vec![partial.clone(), partial, complete]);

    let monitor = fixture.monitor();
    assert!(monitor.wait_for_completion(&app, folder));
    // Two polls came up short before the third listing crossed the threshold.
    assert_eq!(fixture.clock.sleep_count(), 2);
    assert_eq!(fixture.store.refresh_calls(), 3);
}

#[test]
fn unrelated_text_files_do_not_count() {
    let fixture = Fixture::new();
    let folder = Path::new(r"C:\Data\Run1");
    fixture.store.set_dir(
        folder,
        &[
            "notes.txt",
            "readme.txt",
            "A01_x.seq.txt",
            "A01_x.seq.qual.txt",
        ],
    );

    let monitor = fixture.monitor();
    assert_eq!(monitor.output_file_count(folder), 2);
}

#[test]
fn gives_up_after_the_maximum_wait() {
    let mut fixture = Fixture::new();
    fixture.config.timeouts.process_completion_secs = 2;
    let app = fixture.ui.add_app();
    fixture.ui.add_window(&app, "mSeq 4.3.1");

    let monitor = fixture.monitor();
    assert!(!monitor.wait_for_completion(&app, Path::new(r"C:\Data\Run1")));
    // 2 s budget at the 500 ms poll interval.
    assert_eq!(fixture.clock.sleep_count(), 4);
    assert_eq!(fixture.clock.total_slept(), Duration::from_secs(2));
}
