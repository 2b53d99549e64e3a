use std::sync::Arc;

use crate::patterns::PatternRegistry;

/// Normalizes filenames across the lab's naming conventions and extracts the
/// structured identifiers embedded in them.
///
/// Classification predicates deliberately overlap: an order folder also
/// satisfies the BioI prefix check. Callers that need a single class must
/// apply the predicates in priority order.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    registry: Arc<PatternRegistry>,
}

impl NameNormalizer {
    pub fn new() -> Self {
        Self {
            registry: PatternRegistry::shared(),
        }
    }

    pub fn with_registry(registry: Arc<PatternRegistry>) -> Self {
        Self { registry }
    }

    /// Normalizes a filename for comparison across naming conventions.
    ///
    /// Pipeline order matters: character substitution, then optional
    /// extension stripping, then suffix removal, then brace stripping.
    /// Braces are never in the substitution set, so spans whose content got
    /// substituted earlier still strip cleanly.
    pub fn normalize_filename(&self, file_name: &str, remove_extension: bool) -> String {
        let mut name = self.adjust_abi_chars(file_name);
        if remove_extension {
            if let Some(dot) = name.rfind('.') {
                name.truncate(dot);
            }
        }
        let name = self.neutralize_suffixes(&name);
        self.remove_brace_content(&name)
    }

    /// Maps the characters the ABI instrument software cannot represent to
    /// their safe equivalents.
    pub fn adjust_abi_chars(&self, file_name: &str) -> String {
        file_name
            .chars()
            .filter_map(|c| match c {
                ' ' | '"' | '\'' | '?' | ',' => None,
                '+' => Some('&'),
                '*' | '|' | '/' | '\\' | ':' | '<' | '>' => Some('-'),
                other => Some(other),
            })
            .collect()
    }

    /// Removes the fixed `_Premixed` and `_RTI` tokens wherever they occur.
    pub fn neutralize_suffixes(&self, file_name: &str) -> String {
        file_name.replace("_Premixed", "").replace("_RTI", "")
    }

    /// Strips every brace-delimited span (well tags, PCR tokens, flags).
    pub fn remove_brace_content(&self, text: &str) -> String {
        match self.registry.get("brace_content") {
            Some(pattern) => pattern.replace_all(text, "").into_owned(),
            None => text.to_string(),
        }
    }

    pub fn inumber_from_name(&self, name: &str) -> Option<String> {
        self.registry.extract("inumber", name)
    }

    pub fn pcr_number(&self, file_name: &str) -> Option<String> {
        self.registry.extract("pcr_number", file_name)
    }

    pub fn order_number(&self, folder_name: &str) -> Option<String> {
        self.registry.extract("order_number", folder_name)
    }

    pub fn is_bioi_folder(&self, folder_name: &str) -> bool {
        self.registry.contains("bioi_folder", folder_name)
    }

    pub fn is_order_folder(&self, folder_name: &str) -> bool {
        self.registry.contains("bioi_order_folder", folder_name)
    }

    pub fn is_plate_folder(&self, folder_name: &str) -> bool {
        self.registry.contains("plate_folder", folder_name)
    }

    pub fn is_pcr_folder(&self, folder_name: &str) -> bool {
        self.registry.contains("pcr_folder", folder_name)
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
