use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::config::MseqConfig;
use crate::patterns::PatternRegistry;
use crate::ui::{NodeHandle, UiAutomation, WindowHandle};
use crate::utils::Clock;

/// A target location parsed for tree-view traversal: the drive or UNC share,
/// then the folder segments under it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPath {
    pub drive: String,
    pub folders: Vec<String>,
}

impl NavigationPath {
    /// Splits a flat path string on separators. A first segment carrying a
    /// colon is a local drive token; otherwise the first two segments name a
    /// UNC `\\server\share`.
    pub fn parse(path: &str) -> Self {
        let parts: Vec<&str> = path
            .split(['\\', '/'])
            .filter(|part| !part.is_empty())
            .collect();

        if parts.first().is_some_and(|first| first.contains(':')) {
            Self {
                drive: parts[0].to_string(),
                folders: parts[1..].iter().map(|s| s.to_string()).collect(),
            }
        } else {
            let drive = match (parts.first(), parts.get(1)) {
                (Some(server), Some(share)) => format!(r"\\{server}\{share}"),
                (Some(server), None) => format!(r"\\{server}"),
                _ => String::new(),
            };
            Self {
                drive,
                folders: parts.iter().skip(2).map(|s| s.to_string()).collect(),
            }
        }
    }
}

/// Walks the folder-picker tree view from its fixed root down to a target
/// path: Desktop, then This PC, then the drive, then each folder segment.
///
/// Navigation is single-attempt and fail-fast: the first unresolvable node
/// returns false and no further lookups happen. The UI may be left mid-way;
/// the caller decides how to react.
pub struct FolderNavigator {
    ui: Arc<dyn UiAutomation>,
    clock: Arc<dyn Clock>,
    registry: Arc<PatternRegistry>,
    network_drives: HashMap<String, String>,
    click_delay: Duration,
    expand_delay: Duration,
}

impl FolderNavigator {
    pub fn new(ui: Arc<dyn UiAutomation>, clock: Arc<dyn Clock>, config: &MseqConfig) -> Self {
        Self {
            ui,
            clock,
            registry: PatternRegistry::shared(),
            network_drives: config.network_drives.clone(),
            click_delay: config.delays.click(),
            expand_delay: config.delays.expand(),
        }
    }

    pub fn navigate_to_folder(&self, dialog: &WindowHandle, target_path: &str) -> bool {
        if let Err(e) = self.ui.focus_window(dialog) {
            warn!("could not focus browse dialog: {e}");
        }

        let path = NavigationPath::parse(target_path);

        let roots = match self.ui.tree_roots(dialog) {
            Ok(roots) if !roots.is_empty() => roots,
            Ok(_) | Err(_) => {
                error!("could not find tree view control");
                return false;
            }
        };

        let Some(desktop) = self.find_node(&roots, |label| label.contains("Desktop")) else {
            error!("could not find Desktop in tree view");
            return false;
        };
        self.step_into(&desktop);

        let Ok(desktop_children) = self.ui.node_children(&desktop) else {
            error!("could not list children of Desktop");
            return false;
        };
        let Some(this_pc) = self.find_node(&desktop_children, |label| {
            let lower = label.to_lowercase();
            lower.contains("pc") || lower.contains("computer")
        }) else {
            error!("could not find This PC under Desktop");
            return false;
        };
        self.step_into(&this_pc);

        let Ok(drives) = self.ui.node_children(&this_pc) else {
            error!("could not list drives under This PC");
            return false;
        };
        let Some(drive_node) = self.resolve_drive(&drives, &path.drive) else {
            error!("could not find drive {} in This PC", path.drive);
            return false;
        };
        self.select(&drive_node);

        if path.folders.is_empty() {
            return true;
        }

        let mut current = drive_node;
        for folder in &path.folders {
            if let Err(e) = self.ui.expand_node(&current) {
                warn!("could not expand node while seeking {folder:?}: {e}");
                return false;
            }
            self.clock.sleep(self.expand_delay);

            let Ok(children) = self.ui.node_children(&current) else {
                error!("could not list children while seeking {folder:?}");
                return false;
            };

            // Exact label match first, then case-insensitive substring.
            let next = self
                .find_node(&children, |label| label == folder.as_str())
                .or_else(|| {
                    let wanted = folder.to_lowercase();
                    self.find_node(&children, |label| label.to_lowercase().contains(&wanted))
                });
            let Some(next) = next else {
                error!("could not find folder {folder}");
                return false;
            };

            self.select(&next);
            current = next;
        }

        // Make sure the final folder ends up selected.
        if let Err(e) = self.ui.select_node(&current) {
            warn!("could not re-select final folder: {e}");
        }
        true
    }

    fn find_node(
        &self,
        nodes: &[NodeHandle],
        predicate: impl Fn(&str) -> bool,
    ) -> Option<NodeHandle> {
        nodes
            .iter()
            .find(|node| {
                self.ui
                    .node_label(node)
                    .map(|label| predicate(&label))
                    .unwrap_or(false)
            })
            .cloned()
    }

    /// Drive matching, in order of preference: exact label, substring,
    /// drive-letter extracted from the label, then the configured network
    /// alias as a substring.
    fn resolve_drive(&self, drives: &[NodeHandle], drive: &str) -> Option<NodeHandle> {
        for node in drives {
            let Ok(label) = self.ui.node_label(node) else {
                continue;
            };
            let letter = self.registry.extract("drive_letter", &label);
            if label == drive
                || label.contains(drive)
                || letter.as_deref().is_some_and(|l| l.eq_ignore_ascii_case(drive))
            {
                return Some(node.clone());
            }
        }

        // Mapped network drives can show a display alias instead of the share.
        let alias = self.network_drives.get(drive)?;
        self.find_node(drives, |label| label.contains(alias.as_str()))
    }

    /// Click, settle, expand, settle.
    fn step_into(&self, node: &NodeHandle) {
        self.select(node);
        if let Err(e) = self.ui.expand_node(node) {
            warn!("could not expand tree node: {e}");
        }
        self.clock.sleep(self.expand_delay);
    }

    fn select(&self, node: &NodeHandle) {
        if let Err(e) = self.ui.select_node(node) {
            warn!("could not select tree node: {e}");
        }
        self.clock.sleep(self.click_delay);
    }
}
