use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use log::{debug, warn};

/// Matching audio files grouped by the directory they live in.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub dirs: BTreeMap<PathBuf, Vec<String>>,
    pub total: usize,
}

impl ScanResult {
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.dirs
            .iter()
            .flat_map(|(dir, files)| files.iter().map(move |f| dir.join(f)))
    }
}

/// Lowercased, dot-prefixed extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e))
        .collect()
}

/// Walk `root` recursively and collect every file whose extension is in `extensions`.
///
/// `exclude` prunes a subtree, which keeps an output directory nested inside the
/// input from being picked up again on a re-run.
pub fn scan_directory(root: &Path, extensions: &[String], exclude: Option<&Path>) -> ScanResult {
    let wanted = normalize_extensions(extensions);
    let mut result = ScanResult::default();

    let walker = walkdir::WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| match exclude {
            Some(skip) => e.depth() == 0 || e.path() != skip,
            None => true,
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error accessing entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !wanted.contains(&extension_of(path)) {
            debug!("Skipping non-audio file: {}", path.display());
            continue;
        }

        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            continue;
        };
        result
            .dirs
            .entry(dir.to_path_buf())
            .or_default()
            .push(name.to_string_lossy().into_owned());
        result.total += 1;
    }

    println!("There were {} files with extension {:?} found", result.total, wanted);
    result
}
