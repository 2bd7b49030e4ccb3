use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use log::warn;
use crate::config::SortConfig;
use crate::{FailureRecord, TrackRecord};

/// Characters removed from folder names.
pub const DEFAULT_FORBIDDEN_CHARS: &str = "?|\"<>:;/\\.`',*";
/// Older, narrower set that keeps backticks and single quotes.
pub const LEGACY_FORBIDDEN_CHARS: &str = "?|\"<>:;/\\.,*";
/// Used when both the approved name and the blank label sanitize to nothing.
pub const FALLBACK_FOLDER: &str = "_Unknown";

/// Drop every forbidden character, keeping the rest in order.
pub fn sanitize_foldername(s: &str, forbidden: &str) -> String {
    s.chars().filter(|c| !forbidden.contains(*c)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPath {
    pub target_directory: PathBuf,
    pub destination_path: PathBuf,
}

/// Maps approved names (and optionally albums) to destination paths under `out_dir`.
///
/// Destinations are claimed in planning order. A later record landing on an already
/// claimed path gets `<stem>_<n>.<ext>` with the smallest free `n` starting at 2.
/// Claims compare case-insensitively so the plan also holds on case-folding filesystems.
pub struct PathPlanner {
    out_dir: PathBuf,
    include_album: bool,
    forbidden_chars: String,
    blank_name: String,
    claimed: HashSet<String>,
    collisions: usize,
}

impl PathPlanner {
    pub fn new(out_dir: impl Into<PathBuf>, config: &SortConfig) -> Self {
        Self {
            out_dir: out_dir.into(),
            include_album: config.include_album,
            forbidden_chars: config.forbidden_chars.clone(),
            blank_name: config.blank_name.clone(),
            claimed: HashSet::new(),
            collisions: 0,
        }
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn folder_for(&self, approved_name: &str) -> String {
        let folder = sanitize_foldername(approved_name, &self.forbidden_chars);
        if !folder.is_empty() {
            return folder;
        }
        let blank = sanitize_foldername(&self.blank_name, &self.forbidden_chars);
        if blank.is_empty() {
            FALLBACK_FOLDER.to_string()
        } else {
            blank
        }
    }

    pub fn target_directory(&self, approved_name: &str, album: Option<&str>) -> PathBuf {
        let mut target = self.out_dir.join(self.folder_for(approved_name));
        if self.include_album {
            if let Some(album) = album.filter(|a| !a.is_empty()) {
                let album = sanitize_foldername(album, &self.forbidden_chars);
                if !album.is_empty() {
                    target.push(album);
                }
            }
        }
        target
    }

    pub fn plan(&mut self, approved_name: &str, album: Option<&str>, source_path: &Path) -> PlannedPath {
        let target_directory = self.target_directory(approved_name, album);
        let file_name = source_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| source_path.as_os_str().to_os_string());

        let mut destination_path = target_directory.join(&file_name);
        if !self.claim(&destination_path) {
            self.collisions += 1;
            let mut n = 2;
            loop {
                let candidate = target_directory.join(numbered_name(&file_name, n));
                if self.claim(&candidate) {
                    warn!(
                        "Destination {} already taken, {} goes to {}",
                        destination_path.display(),
                        source_path.display(),
                        candidate.display()
                    );
                    destination_path = candidate;
                    break;
                }
                n += 1;
            }
        }

        PlannedPath {
            target_directory,
            destination_path,
        }
    }

    pub fn plan_tracks(&mut self, records: Vec<TrackRecord>) -> Vec<TrackRecord> {
        records
            .into_iter()
            .map(|mut record| {
                let planned = self.plan(&record.approved_name, Some(&record.album), &record.source_path);
                record.target_directory = planned.target_directory;
                record.destination_path = planned.destination_path;
                record
            })
            .collect()
    }

    pub fn plan_failures(&mut self, records: Vec<FailureRecord>) -> Vec<FailureRecord> {
        records
            .into_iter()
            .map(|mut record| {
                let planned = self.plan(&record.approved_name, None, &record.source_path);
                record.target_directory = planned.target_directory;
                record.destination_path = planned.destination_path;
                record
            })
            .collect()
    }

    fn claim(&mut self, destination: &Path) -> bool {
        self.claimed.insert(destination.to_string_lossy().to_lowercase())
    }
}

fn numbered_name(file_name: &std::ffi::OsStr, n: usize) -> OsString {
    let name = Path::new(file_name);
    let stem = name.file_stem().unwrap_or(file_name).to_string_lossy();
    match name.extension() {
        Some(ext) => OsString::from(format!("{}_{}.{}", stem, n, ext.to_string_lossy())),
        None => OsString::from(format!("{}_{}", stem, n)),
    }
}
