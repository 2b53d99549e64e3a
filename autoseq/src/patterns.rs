use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

static SHARED: Lazy<Arc<PatternRegistry>> = Lazy::new(|| Arc::new(PatternRegistry::new()));

/// Named catalog of the lab's file and folder naming conventions.
///
/// The catalog is fixed at construction and every query is a pure function of
/// the input text. Unknown pattern names behave as "no match" rather than
/// panicking, so callers can probe freely.
#[derive(Debug)]
pub struct PatternRegistry {
    patterns: HashMap<&'static str, Regex>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        let mut patterns = HashMap::new();
        let mut add = |name: &'static str, pattern: &str| {
            // The catalog is literal and covered by tests; a bad entry is a bug.
            patterns.insert(name, Regex::new(pattern).expect("valid catalog pattern"));
        };

        add("inumber", r"(?i)bioi-(\d+)");
        add("pcr_number", r"(?i)\{pcr(\d+).+\}");
        add("brace_content", r"\{.*?\}");
        add("bioi_folder", r"(?i)bioi-\d+");
        add("bioi_order_folder", r"(?i)bioi-\d+_.+_\d+");
        add("plate_folder", r"(?i)p\d+.+");
        add("pcr_folder", r"(?i)fb-pcr\d+_\d+");
        add("ind_blank_file", r"(?i)\{\d+[A-H]\}\.ab1$");
        add("plate_blank_file", r"(?i)^\d{2}[A-H]__\.ab1$");
        add("well_location", r"(?i)\{(\d+[A-H])\}");
        add("reinject_dilution", r"\{(\d+_\d+)\}");
        add("preemptive_flag", r"(?i)\{!P\}");
        add("order_number", r"_(\d+)(?:$|_)");
        add("drive_letter", r"([A-Za-z]:)");

        Self { patterns }
    }

    /// The process-wide default catalog.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    pub fn get(&self, name: &str) -> Option<&Regex> {
        self.patterns.get(name)
    }

    /// First match of the named pattern in `text`, with capture groups.
    pub fn captures<'t>(&self, name: &str, text: &'t str) -> Option<regex::Captures<'t>> {
        self.get(name)?.captures(text)
    }

    /// Extracts capture group 1 of the named pattern from `text`.
    pub fn extract(&self, name: &str, text: &str) -> Option<String> {
        self.extract_group(name, text, 1)
    }

    /// Extracts an arbitrary capture group of the named pattern from `text`.
    pub fn extract_group(&self, name: &str, text: &str, group: usize) -> Option<String> {
        self.captures(name, text)?
            .get(group)
            .map(|m| m.as_str().to_string())
    }

    pub fn contains(&self, name: &str, text: &str) -> bool {
        self.get(name).is_some_and(|p| p.is_match(text))
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}
