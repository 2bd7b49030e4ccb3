use std::path::Path;
use serde::Deserialize;
use crate::analyzers::layout::DEFAULT_FORBIDDEN_CHARS;
use crate::utils::reporting::is_fixed_track_column;
use crate::{Result, SortError};

pub const DEFAULT_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".ogg", ".flac", ".wma", ".mp4", ".m4a"];
pub const DEFAULT_BLANK_NAME: &str = "_Unknown";
pub const DEFAULT_FAILURE_DIRNAME: &str = "_Failures";

/// Record text a classifier may search.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    Title,
    Album,
    Artist,
}

/// A keyword rule that flags matching tracks and reroutes them into `folder_name`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    pub name: String,
    pub tag_name: String,
    pub folder_name: String,
    pub keywords: Vec<String>,
    #[serde(default = "default_search_fields")]
    pub search_fields: Vec<SearchField>,
    #[serde(default)]
    pub case_sensitive: bool,
}

fn default_search_fields() -> Vec<SearchField> {
    vec![SearchField::Title, SearchField::Album]
}

impl ClassifierConfig {
    pub fn xmas() -> Self {
        Self {
            name: "xmas".into(),
            tag_name: "xmas_songs".into(),
            folder_name: "_Xmas".into(),
            keywords: vec!["xmas".into(), "christmas".into()],
            search_fields: default_search_fields(),
            case_sensitive: false,
        }
    }

    pub fn comedy() -> Self {
        Self {
            name: "comedy".into(),
            tag_name: "comedy_songs".into(),
            folder_name: "_Comedy".into(),
            keywords: vec!["funny".into(), "comedy".into()],
            search_fields: default_search_fields(),
            case_sensitive: false,
        }
    }

    pub fn builtin() -> Vec<Self> {
        vec![Self::xmas(), Self::comedy()]
    }
}

#[derive(Debug, Deserialize)]
struct ClassifierFile {
    #[serde(default)]
    classifier: Vec<ClassifierConfig>,
}

/// Parse `[[classifier]]` tables from TOML text.
pub fn parse_classifiers(text: &str) -> Result<Vec<ClassifierConfig>> {
    let file: ClassifierFile = toml::from_str(text)?;
    Ok(file.classifier)
}

/// Built-in presets overlaid with the ones in `path`; a file entry replaces a built-in of the same name.
pub fn available_classifiers(path: Option<&Path>) -> Result<Vec<ClassifierConfig>> {
    let mut presets = ClassifierConfig::builtin();
    if let Some(path) = path {
        let text = std::fs::read_to_string(path)?;
        for custom in parse_classifiers(&text)? {
            match presets.iter_mut().find(|p| p.name == custom.name) {
                Some(existing) => *existing = custom,
                None => presets.push(custom),
            }
        }
    }
    Ok(presets)
}

/// Pick presets by name, keeping the order the names were given in.
pub fn select_classifiers(available: &[ClassifierConfig], names: &[String]) -> Result<Vec<ClassifierConfig>> {
    let mut selected: Vec<ClassifierConfig> = Vec::new();
    for name in names {
        if selected.iter().any(|c| &c.name == name) {
            continue;
        }
        let preset = available.iter().find(|c| &c.name == name).ok_or_else(|| {
            let known: Vec<&str> = available.iter().map(|c| c.name.as_str()).collect();
            SortError::Config(format!("unknown filter '{}' (available: {})", name, known.join(", ")))
        })?;
        selected.push(preset.clone());
    }
    validate_classifiers(&selected)?;
    Ok(selected)
}

/// Every classifier needs its own tag name, and none may shadow a fixed manifest column.
pub fn validate_classifiers(classifiers: &[ClassifierConfig]) -> Result<()> {
    for (i, classifier) in classifiers.iter().enumerate() {
        let tag = classifier.tag_name.as_str();
        if tag.trim().is_empty() {
            return Err(SortError::Config(format!("classifier '{}' has an empty tag_name", classifier.name)));
        }
        if is_fixed_track_column(tag) {
            return Err(SortError::Config(format!(
                "classifier '{}' uses reserved tag_name '{}'",
                classifier.name, tag
            )));
        }
        if let Some(earlier) = classifiers[..i].iter().find(|c| c.tag_name == tag) {
            return Err(SortError::Config(format!(
                "classifiers '{}' and '{}' share tag_name '{}'",
                earlier.name, classifier.name, tag
            )));
        }
    }
    Ok(())
}

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct SortConfig {
    pub blank_name: String,
    pub failure_dirname: String,
    pub capitalize: bool,
    pub include_album: bool,
    pub forbidden_chars: String,
    pub classifiers: Vec<ClassifierConfig>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            blank_name: DEFAULT_BLANK_NAME.to_string(),
            failure_dirname: DEFAULT_FAILURE_DIRNAME.to_string(),
            capitalize: true,
            include_album: false,
            forbidden_chars: DEFAULT_FORBIDDEN_CHARS.to_string(),
            classifiers: Vec::new(),
        }
    }
}
