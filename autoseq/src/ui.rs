//! The seam between the automation core and the external application.
//!
//! Everything the core knows about mSeq's windows goes through the
//! [`UiAutomation`] trait: an object-safe capability for finding windows,
//! clicking controls, walking tree views and sending keystrokes. A platform
//! binding implements it against the real accessibility APIs; tests implement
//! it over an in-memory window model.

use crate::errors::AutomationError;

/// Keystroke chords in the platform binding's notation.
pub const KEY_NEW_PROJECT: &str = "^n";
pub const KEY_SELECT_ALL: &str = "^a";
pub const KEY_ACCEPT: &str = "{ENTER}";

/// Opaque handle to a running instance of the external application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppHandle(pub u64);

/// Opaque handle to a currently-visible window. Scoped to the lifetime of
/// that window; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// Opaque handle to a tree-view node inside a window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub u64);

/// Opaque handle to a child control (button, list view) inside a window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlHandle(pub u64);

/// Window bounds in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Center point relative to the window's own origin.
    pub fn center(&self) -> (i32, i32) {
        ((self.right - self.left) / 2, (self.bottom - self.top) / 2)
    }
}

/// List-view lookup variants; newer OS builds expose the file list without
/// the shell-view wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListViewKind {
    /// Shell view wrapping the file list (Windows 10 shape).
    ShellView,
    /// Bare file list (Windows 11 shape).
    Plain,
}

/// Declarative window-title matching rule, evaluated against live titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleFilter {
    Exact(String),
    /// First match among an ordered candidate list.
    AnyOf(Vec<String>),
    StartsWith(String),
    StartsWithIgnoreCase(String),
    ContainsIgnoreCase(String),
    /// Title starts with `prefix` and contains `fragment` somewhere after.
    PrefixAndFragment { prefix: String, fragment: String },
}

impl TitleFilter {
    pub fn matches(&self, title: &str) -> bool {
        match self {
            TitleFilter::Exact(expected) => title == expected,
            TitleFilter::AnyOf(candidates) => candidates.iter().any(|c| title == c),
            TitleFilter::StartsWith(prefix) => title.starts_with(prefix.as_str()),
            TitleFilter::StartsWithIgnoreCase(prefix) => title
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
            TitleFilter::ContainsIgnoreCase(fragment) => {
                title.to_lowercase().contains(&fragment.to_lowercase())
            }
            TitleFilter::PrefixAndFragment { prefix, fragment } => {
                title.starts_with(prefix.as_str()) && title.contains(fragment.as_str())
            }
        }
    }
}

/// Capability the core needs from the external application.
///
/// Implementations must be cheap to query: every method is called from
/// polling loops. Failures are reported as [`AutomationError`]; the
/// components above this seam decide which failures are fatal.
pub trait UiAutomation: Send + Sync {
    /// Running application instances whose main window title matches.
    /// More than one entry means an ambiguous match; callers pick the first.
    fn app_instances(&self, filter: &TitleFilter) -> Result<Vec<AppHandle>, AutomationError>;

    /// Launches a new instance via the given shell command.
    fn launch(&self, command: &str) -> Result<AppHandle, AutomationError>;

    /// All currently-visible top-level windows of the application.
    fn windows(&self, app: &AppHandle) -> Result<Vec<WindowHandle>, AutomationError>;

    fn window_title(&self, window: &WindowHandle) -> Result<String, AutomationError>;

    fn window_exists(&self, window: &WindowHandle) -> bool;

    fn focus_window(&self, window: &WindowHandle) -> Result<(), AutomationError>;

    /// Sends raw keystrokes to the focused window.
    fn send_keys(&self, window: &WindowHandle, keys: &str) -> Result<(), AutomationError>;

    fn window_rect(&self, window: &WindowHandle) -> Result<Rect, AutomationError>;

    /// Clicks at window-relative coordinates.
    fn click_at(&self, window: &WindowHandle, x: i32, y: i32) -> Result<(), AutomationError>;

    /// Finds a button-class child control by its exact label.
    fn find_button(
        &self,
        window: &WindowHandle,
        label: &str,
    ) -> Result<Option<ControlHandle>, AutomationError>;

    fn click_control(&self, control: &ControlHandle) -> Result<(), AutomationError>;

    /// Finds the file list view of a copy-files dialog, by OS shape.
    fn find_list_view(
        &self,
        window: &WindowHandle,
        kind: ListViewKind,
    ) -> Result<Option<ControlHandle>, AutomationError>;

    /// Root nodes of the window's folder tree view. An empty result means no
    /// tree view control was found.
    fn tree_roots(&self, window: &WindowHandle) -> Result<Vec<NodeHandle>, AutomationError>;

    fn node_label(&self, node: &NodeHandle) -> Result<String, AutomationError>;

    fn node_children(&self, node: &NodeHandle) -> Result<Vec<NodeHandle>, AutomationError>;

    fn expand_node(&self, node: &NodeHandle) -> Result<(), AutomationError>;

    /// Clicks/selects a tree node.
    fn select_node(&self, node: &NodeHandle) -> Result<(), AutomationError>;

    fn close_window(&self, window: &WindowHandle) -> Result<(), AutomationError>;

    /// Forcibly terminates the application process.
    fn kill_app(&self, app: &AppHandle) -> Result<(), AutomationError>;
}
