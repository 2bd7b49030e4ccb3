use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use serde::Serialize;

pub mod analyzers;
pub mod audio;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod utils;

use audio::metadata::ExtractedTags;
use audio::scan::extension_of;

/// One successfully tagged audio file plus the fields the pipeline derives for it.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub source_path: PathBuf,
    pub artist: String,
    pub album: String,
    pub title: String,
    /// Kilobits per second, `None` when the container did not give us enough to compute it.
    pub bitrate: Option<u32>,
    pub file_extension: String,
    pub approved_name: String,
    pub matched_reference: bool,
    pub tags: BTreeMap<String, bool>,
    pub target_directory: PathBuf,
    pub destination_path: PathBuf,
}

impl TrackRecord {
    pub fn new(source_path: impl Into<PathBuf>, tags: ExtractedTags) -> Self {
        let source_path = source_path.into();
        let file_extension = extension_of(&source_path);
        Self {
            approved_name: tags.artist.clone(),
            artist: tags.artist,
            album: tags.album,
            title: tags.title,
            bitrate: tags.bitrate,
            file_extension,
            source_path,
            matched_reference: false,
            tags: BTreeMap::new(),
            target_directory: PathBuf::new(),
            destination_path: PathBuf::new(),
        }
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.source_path)
    }

    pub fn tag(&self, tag_name: &str) -> bool {
        self.tags.get(tag_name).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The file opened fine but carried no usable tags.
    NoTagData,
    /// The file could not be opened or probed at all.
    ExtractionError,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NoTagData => "no_tag_data",
            FailureReason::ExtractionError => "extraction_error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file whose metadata could not be read. Always filed under the failure category.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRecord {
    pub source_path: PathBuf,
    pub file_extension: String,
    pub failure_reason: FailureReason,
    pub approved_name: String,
    pub target_directory: PathBuf,
    pub destination_path: PathBuf,
}

impl FailureRecord {
    pub fn new(source_path: impl Into<PathBuf>, reason: FailureReason, failure_dirname: &str) -> Self {
        let source_path = source_path.into();
        Self {
            file_extension: extension_of(&source_path),
            source_path,
            failure_reason: reason,
            approved_name: failure_dirname.to_string(),
            target_directory: PathBuf::new(),
            destination_path: PathBuf::new(),
        }
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.source_path)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, thiserror::Error)]
pub enum SortError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Classifier file error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Reference catalog error: {0}")]
    Catalog(String),
    #[error("Metadata extraction error: {0}")]
    Metadata(String),
}

pub type Result<T> = std::result::Result<T, SortError>;

// Re-exports for convenience
pub use audio::metadata::{MetadataExtractor, TagReader};
pub use catalog::ReferenceCatalog;
pub use config::{ClassifierConfig, SearchField, SortConfig};
pub use pipeline::{Pipeline, PipelineOutput};
