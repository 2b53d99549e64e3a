use std::sync::Arc;
use std::time::Duration;

use crate::config::MseqConfig;
use crate::dialogs::{ButtonPress, DialogController, DialogKind, SelectionStrategy};
use crate::tests::fake::{FakeClock, FakeUi};
use crate::ui::{ListViewKind, Rect, UiAutomation};

fn controller(ui: &Arc<FakeUi>, clock: &Arc<FakeClock>) -> DialogController {
    DialogController::new(ui.clone(), clock.clone(), &MseqConfig::default())
}

#[test]
fn dialog_kinds_match_their_live_titles() {
    let cases = [
        (DialogKind::BrowseFolder, "Browse For Folder", true),
        (DialogKind::BrowseFolder, "Browse for Folder", true),
        (DialogKind::BrowseFolder, "Browse Network Folder", true),
        (DialogKind::BrowseFolder, "browse for folder", false),
        (DialogKind::Preferences, "mSeq Preferences", true),
        (DialogKind::Preferences, "Mseq Preferences", true),
        (DialogKind::Preferences, "MSEQ PREFERENCES", false),
        (DialogKind::CopyFiles, "Copy 12 sequence files", true),
        (DialogKind::CopyFiles, "Copy files", false),
        (DialogKind::ErrorWindow, "File Error", true),
        (DialogKind::ErrorWindow, "Low quality files skipped", false),
        (DialogKind::CallBases, "Call bases?", true),
        (DialogKind::ReadInfo, "Read information for A07_sample.ab1", true),
        (DialogKind::ReadInfo, "read information for x.ab1", false),
    ];
    for (kind, title, expected) in cases {
        assert_eq!(
            kind.title_filter().matches(title),
            expected,
            "{kind:?} vs {title:?}"
        );
    }
}

#[test]
fn slow_dialogs_poll_on_a_coarser_interval() {
    assert_eq!(
        DialogKind::ErrorWindow.retry_interval(),
        Duration::from_millis(300)
    );
    assert_eq!(
        DialogKind::CallBases.retry_interval(),
        Duration::from_millis(300)
    );
    assert_eq!(
        DialogKind::BrowseFolder.retry_interval(),
        Duration::from_millis(100)
    );
}

#[test]
fn wait_for_dialog_returns_immediately_when_present() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    ui.add_window(&app, "Browse For Folder");

    let dialogs = controller(&ui, &clock);
    assert!(dialogs.wait_for_dialog(&app, DialogKind::BrowseFolder));
    assert_eq!(clock.sleep_count(), 0);
}

#[test]
fn wait_for_dialog_exhausts_its_timeout() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    ui.add_window(&app, "mSeq 4.3.1");

    let dialogs = controller(&ui, &clock);
    assert!(!dialogs.wait_for_dialog(&app, DialogKind::Preferences));
    // 5 s budget at 100 ms per probe.
    assert_eq!(clock.total_slept(), Duration::from_secs(5));
}

#[test]
fn get_dialog_by_titles_respects_candidate_order() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    ui.add_window(&app, "Browse for Folder");
    let preferred = ui.add_window(&app, "Browse For Folder");

    let dialogs = controller(&ui, &clock);
    let found = dialogs.get_dialog_by_titles(&app, &["Browse For Folder", "Browse for Folder"]);
    assert_eq!(found, Some(preferred));
}

#[test]
fn browse_dialog_falls_back_to_the_prefix_rule() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    let dialog = ui.add_window(&app, "Browse Network Folder");

    let dialogs = controller(&ui, &clock);
    assert_eq!(dialogs.get_browse_dialog(&app), Some(dialog));
}

#[test]
fn click_button_prefers_the_first_matching_label() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    let dialog = ui.add_window(&app, "Call bases?");
    ui.set_buttons(&dialog, &["Yes", "No"]);

    let dialogs = controller(&ui, &clock);
    let press = dialogs.click_button(&dialog, &["&Yes", "Yes"]);
    assert_eq!(press, Some(ButtonPress::Button("Yes".to_string())));
    assert_eq!(ui.counters().clicked_controls, vec!["Yes".to_string()]);
}

#[test]
fn click_button_falls_back_to_default_accept() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    let dialog = ui.add_window(&app, "File error");

    let dialogs = controller(&ui, &clock);
    let press = dialogs.click_button(&dialog, &["OK"]);
    assert_eq!(press, Some(ButtonPress::DefaultAccept));

    let counters = ui.counters();
    assert!(counters.clicked_controls.is_empty());
    assert_eq!(counters.keys, vec![(dialog.0, "{ENTER}".to_string())]);
}

#[test]
fn click_button_on_a_vanished_dialog_reports_failure() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    let dialog = ui.add_window(&app, "File error");
    ui.close_window(&dialog).unwrap();

    let dialogs = controller(&ui, &clock);
    assert_eq!(dialogs.click_button(&dialog, &["OK"]), None);
}

#[test]
fn select_all_prefers_the_shell_list_view() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    let dialog = ui.add_window(&app, "Copy 3 sequence files");
    ui.add_list_view(&dialog, ListViewKind::ShellView);
    ui.add_list_view(&dialog, ListViewKind::Plain);

    let dialogs = controller(&ui, &clock);
    assert_eq!(
        dialogs.select_all_files(&dialog),
        Some(SelectionStrategy::ShellListView)
    );
    assert_eq!(ui.counters().keys, vec![(dialog.0, "^a".to_string())]);
}

#[test]
fn select_all_uses_the_bare_list_view_when_the_shell_shape_is_absent() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    let dialog = ui.add_window(&app, "Copy 3 sequence files");
    ui.add_list_view(&dialog, ListViewKind::Plain);

    let dialogs = controller(&ui, &clock);
    assert_eq!(
        dialogs.select_all_files(&dialog),
        Some(SelectionStrategy::PlainListView)
    );
}

#[test]
fn select_all_center_clicks_as_a_last_resort() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    let dialog = ui.add_window(&app, "Copy 3 sequence files");
    ui.set_rect(
        &dialog,
        Rect {
            left: 100,
            top: 50,
            right: 500,
            bottom: 350,
        },
    );

    let dialogs = controller(&ui, &clock);
    assert_eq!(
        dialogs.select_all_files(&dialog),
        Some(SelectionStrategy::CenterClick)
    );
    let counters = ui.counters();
    assert_eq!(counters.clicks_at, vec![(dialog.0, 200, 150)]);
    assert_eq!(counters.keys, vec![(dialog.0, "^a".to_string())]);
}

#[test]
fn select_all_gives_up_without_list_views_or_geometry() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    let dialog = ui.add_window(&app, "Copy 3 sequence files");

    let dialogs = controller(&ui, &clock);
    assert_eq!(dialogs.select_all_files(&dialog), None);
}

#[test]
fn closes_every_read_info_window_and_nothing_else() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    let main = ui.add_window(&app, "mSeq 4.3.1");
    ui.add_window(&app, "Read information for A01_one.ab1");
    ui.add_window(&app, "Read information for A02_two.ab1");

    let dialogs = controller(&ui, &clock);
    assert!(dialogs.close_all_read_info_dialogs(&app));

    let counters = ui.counters();
    assert_eq!(counters.closed_windows.len(), 2);
    assert!(counters
        .closed_windows
        .iter()
        .all(|title| title.starts_with("Read information for")));
    assert!(ui.window_exists(&main));
}

#[test]
fn read_info_sweep_reports_when_nothing_was_open() {
    let ui = Arc::new(FakeUi::new());
    let clock = Arc::new(FakeClock::new());
    let app = ui.add_app();
    ui.add_window(&app, "mSeq 4.3.1");

    let dialogs = controller(&ui, &clock);
    assert!(!dialogs.close_all_read_info_dialogs(&app));
    assert!(ui.counters().closed_windows.is_empty());
}
