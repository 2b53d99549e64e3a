//! Filesystem capability: cached directory listings plus the move/zip/recency
//! helpers the sorting workflows need.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use regex::Regex;
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::AutomationError;
use crate::naming::NameNormalizer;
use crate::utils::Clock;

/// The slice of the filesystem the automation core depends on. Injectable so
/// completion polling and folder validation run against a stub in tests.
pub trait FileStore: Send + Sync {
    /// Directory listing, served from a per-path cache after the first read.
    /// Missing or unreadable directories list as empty.
    fn entries(&self, dir: &Path) -> Vec<String>;

    /// Re-reads a directory, replacing its cached listing, and returns the
    /// fresh contents.
    fn refresh(&self, dir: &Path) -> Vec<String>;

    fn exists(&self, path: &Path) -> bool;

    fn modified(&self, path: &Path) -> Option<SystemTime>;
}

/// Production [`FileStore`] over the local disk, with the richer file
/// operations used when shuffling sequencing results between folders.
pub struct LocalFileStore {
    clock: Arc<dyn Clock>,
    normalizer: NameNormalizer,
    cache: Mutex<HashMap<PathBuf, Vec<String>>>,
    move_retries: u32,
    move_retry_delay: Duration,
}

impl LocalFileStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            normalizer: NameNormalizer::new(),
            cache: Mutex::new(HashMap::new()),
            move_retries: 3,
            move_retry_delay: Duration::from_secs(1),
        }
    }

    fn read_dir(&self, dir: &Path) -> Vec<String> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                if dir.exists() {
                    warn!("error reading directory {}: {e}", dir.display());
                }
                return Vec::new();
            }
        };
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect()
    }

    /// Subdirectories whose names match `pattern` (any name when `None`).
    /// Matching is against the lowercased name, like the sorting scripts
    /// always did.
    pub fn folders_matching(&self, dir: &Path, pattern: Option<&Regex>) -> Vec<PathBuf> {
        self.entries(dir)
            .into_iter()
            .map(|name| dir.join(name))
            .filter(|path| path.is_dir())
            .filter(|path| match pattern {
                Some(pattern) => path
                    .file_name()
                    .map(|n| pattern.is_match(&n.to_string_lossy().to_lowercase()))
                    .unwrap_or(false),
                None => true,
            })
            .collect()
    }

    pub fn files_by_extension(&self, dir: &Path, extension: &str) -> Vec<PathBuf> {
        self.entries(dir)
            .into_iter()
            .filter(|name| name.ends_with(extension))
            .map(|name| dir.join(name))
            .collect()
    }

    pub fn contains_file_type(&self, dir: &Path, extension: &str) -> bool {
        self.entries(dir).iter().any(|name| name.ends_with(extension))
    }

    pub fn ensure_folder(&self, path: &Path) -> bool {
        if path.exists() {
            return true;
        }
        match fs::create_dir_all(path) {
            Ok(()) => {
                info!("created folder: {}", path.display());
                true
            }
            Err(e) => {
                warn!("error creating folder {}: {e}", path.display());
                false
            }
        }
    }

    /// Moves a file, creating destination parents as needed.
    pub fn move_file(&self, source: &Path, destination: &Path) -> bool {
        if let Some(parent) = destination.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("error creating parent for {}: {e}", destination.display());
                    return false;
                }
            }
        }
        match fs::rename(source, destination) {
            Ok(()) => {
                info!(
                    "moved file: {} -> {}",
                    display_name(source),
                    display_name(destination)
                );
                true
            }
            Err(e) => {
                warn!("error moving file {}: {e}", source.display());
                false
            }
        }
    }

    /// Moves a folder with bounded retries; a move can fail transiently while
    /// the external application still holds a file handle inside it.
    pub fn move_folder(&self, source: &Path, destination: &Path) -> bool {
        if let Some(parent) = destination.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("error creating destination parent folder: {e}");
                    return false;
                }
            }
        }

        for attempt in 1..=self.move_retries {
            match fs::rename(source, destination) {
                Ok(()) => {
                    info!(
                        "successfully moved {} to {}",
                        display_name(source),
                        display_name(destination)
                    );
                    return true;
                }
                Err(e) => {
                    warn!(
                        "error moving folder on attempt {attempt}/{}: {e}",
                        self.move_retries
                    );
                    if attempt < self.move_retries {
                        self.clock.sleep(self.move_retry_delay);
                    }
                }
            }
        }
        warn!(
            "failed to move folder after {} attempts: {}",
            self.move_retries,
            display_name(source)
        );
        false
    }

    /// Renames a file on disk to drop every brace-delimited span from its
    /// name. Returns the resulting path (the original on no-op or failure).
    pub fn rename_without_braces(&self, file_path: &Path) -> PathBuf {
        let Some(base_name) = file_path.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            return file_path.to_path_buf();
        };
        if !base_name.contains('{') && !base_name.contains('}') {
            return file_path.to_path_buf();
        }

        let new_name = self.normalizer.remove_brace_content(&base_name);
        let new_path = file_path.with_file_name(&new_name);
        if !file_path.exists() {
            return file_path.to_path_buf();
        }
        match fs::rename(file_path, &new_path) {
            Ok(()) => {
                info!("renamed {base_name} to {new_name}");
                new_path
            }
            Err(e) => {
                warn!("error renaming file {}: {e}", file_path.display());
                file_path.to_path_buf()
            }
        }
    }

    pub fn has_zip(&self, dir: &Path) -> bool {
        self.contains_file_type(dir, ".zip")
    }

    /// Zips files from `source_folder` into `zip_path` with deflate
    /// compression, honoring include/exclude extension filters.
    pub fn zip_files(
        &self,
        source_folder: &Path,
        zip_path: &Path,
        include_extensions: Option<&[&str]>,
        exclude_extensions: Option<&[&str]>,
    ) -> bool {
        match self.try_zip_files(source_folder, zip_path, include_extensions, exclude_extensions)
        {
            Ok(count) => {
                info!("created zip file with {count} files: {}", display_name(zip_path));
                true
            }
            Err(e) => {
                warn!("error creating zip file {}: {e}", zip_path.display());
                false
            }
        }
    }

    fn try_zip_files(
        &self,
        source_folder: &Path,
        zip_path: &Path,
        include_extensions: Option<&[&str]>,
        exclude_extensions: Option<&[&str]>,
    ) -> Result<usize, AutomationError> {
        let file = File::create(zip_path)?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut files_added = 0;
        for name in self.refresh(source_folder) {
            let file_path = source_folder.join(&name);
            if !file_path.is_file() {
                continue;
            }
            if let Some(include) = include_extensions {
                if !include.iter().any(|ext| name.ends_with(ext)) {
                    continue;
                }
            }
            if let Some(exclude) = exclude_extensions {
                if exclude.iter().any(|ext| name.ends_with(ext)) {
                    continue;
                }
            }

            writer
                .start_file(name.as_str(), options)
                .map_err(|e| AutomationError::PlatformError(format!("zip write: {e}")))?;
            let mut source = File::open(&file_path)?;
            io::copy(&mut source, &mut writer)?;
            files_added += 1;
        }

        writer
            .finish()
            .map_err(|e| AutomationError::PlatformError(format!("zip finish: {e}")))?;
        Ok(files_added)
    }

    /// Names of the files inside a zip archive; empty on read failure.
    pub fn zip_contents(&self, zip_path: &Path) -> Vec<String> {
        let archive = File::open(zip_path)
            .map_err(AutomationError::from)
            .and_then(|file| {
                ZipArchive::new(BufReader::new(file))
                    .map_err(|e| AutomationError::PlatformError(format!("zip read: {e}")))
            });
        match archive {
            Ok(archive) => archive.file_names().map(String::from).collect(),
            Err(e) => {
                warn!("error reading zip file {}: {e}", zip_path.display());
                Vec::new()
            }
        }
    }

    /// Copies a finished zip into the dump folder the delivery scripts watch.
    pub fn copy_zip_to_dump(&self, zip_path: &Path, dump_folder: &Path) -> Option<PathBuf> {
        if !self.ensure_folder(dump_folder) {
            return None;
        }
        let dest = dump_folder.join(zip_path.file_name()?);
        match fs::copy(zip_path, &dest) {
            Ok(_) => {
                info!("copied zip to dump folder: {}", display_name(zip_path));
                Some(dest)
            }
            Err(e) => {
                warn!("error copying zip to dump folder: {e}");
                None
            }
        }
    }

    /// I-number of the most recently modified folder under `dir`, looking
    /// back seven days.
    pub fn most_recent_inumber(&self, dir: &Path) -> Option<String> {
        let cutoff = SystemTime::now().checked_sub(Duration::from_secs(7 * 24 * 3600))?;

        let mut recent: Vec<(String, SystemTime)> = self
            .refresh(dir)
            .into_iter()
            .filter_map(|name| {
                let path = dir.join(&name);
                if !path.is_dir() {
                    return None;
                }
                let modified = self.modified(&path)?;
                (modified >= cutoff).then_some((name, modified))
            })
            .collect();

        recent.sort_by(|a, b| b.1.cmp(&a.1));
        let newest = recent.first()?;
        let inumber = self.normalizer.inumber_from_name(&newest.0);
        if let Some(inumber) = &inumber {
            info!("found most recent I number: {inumber}");
        }
        inumber
    }

    /// Text files across `dirs` modified within `window`, newest first.
    pub fn recent_files(&self, dirs: &[PathBuf], window: Duration) -> Vec<String> {
        let cutoff = SystemTime::now()
            .checked_sub(window)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut found: Vec<(String, SystemTime)> = Vec::new();
        for dir in dirs {
            for name in self.refresh(dir) {
                if !name.ends_with(".txt") {
                    continue;
                }
                let Some(modified) = self.modified(&dir.join(&name)) else {
                    continue;
                };
                if modified >= cutoff {
                    found.push((name, modified));
                }
            }
        }

        found.sort_by(|a, b| b.1.cmp(&a.1));
        found.into_iter().map(|(name, _)| name).collect()
    }

    /// Filters to names whose I-number exceeds `lower_inumber`. A missing or
    /// non-numeric bound passes everything through.
    pub fn inumbers_greater_than(&self, names: &[String], lower_inumber: Option<&str>) -> Vec<String> {
        let Some(lower) = lower_inumber.and_then(|i| i.parse::<u64>().ok()) else {
            return names.to_vec();
        };
        names
            .iter()
            .filter(|name| {
                self.normalizer
                    .inumber_from_name(name)
                    .and_then(|i| i.parse::<u64>().ok())
                    .is_some_and(|i| i > lower)
            })
            .cloned()
            .collect()
    }
}

impl FileStore for LocalFileStore {
    fn entries(&self, dir: &Path) -> Vec<String> {
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(cached) = cache.get(dir) {
            return cached.clone();
        }
        let listing = self.read_dir(dir);
        cache.insert(dir.to_path_buf(), listing.clone());
        listing
    }

    fn refresh(&self, dir: &Path) -> Vec<String> {
        let listing = self.read_dir(dir);
        let mut cache = match self.cache.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.insert(dir.to_path_buf(), listing.clone());
        listing
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
