use log::info;
use regex::Regex;
use crate::config::{ClassifierConfig, SearchField};
use crate::{Result, SortError, TrackRecord};

/// Flags tracks whose text fields contain any of a set of keywords.
pub struct KeywordClassifier {
    config: ClassifierConfig,
    // None when there are no keywords at all; nothing can match then
    pattern: Option<Regex>,
}

impl KeywordClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let pattern = if config.keywords.is_empty() {
            None
        } else {
            let alternation = config
                .keywords
                .iter()
                .map(|k| {
                    let k = if config.case_sensitive { k.clone() } else { k.to_lowercase() };
                    regex::escape(&k)
                })
                .collect::<Vec<_>>()
                .join("|");
            let regex = Regex::new(&alternation).map_err(|e| {
                SortError::Config(format!("classifier '{}': {}", config.name, e))
            })?;
            Some(regex)
        };
        Ok(Self { config, pattern })
    }

    pub fn tag_name(&self) -> &str {
        &self.config.tag_name
    }

    pub fn folder_name(&self) -> &str {
        &self.config.folder_name
    }

    pub fn matches(&self, record: &TrackRecord) -> bool {
        let Some(pattern) = &self.pattern else {
            return false;
        };
        self.config.search_fields.iter().any(|field| {
            let text = match field {
                SearchField::Title => &record.title,
                SearchField::Album => &record.album,
                SearchField::Artist => &record.artist,
            };
            if self.config.case_sensitive {
                pattern.is_match(text)
            } else {
                pattern.is_match(&text.to_lowercase())
            }
        })
    }

    pub fn classify(&self, mut record: TrackRecord) -> TrackRecord {
        let hit = self.matches(&record);
        record.tags.insert(self.config.tag_name.clone(), hit);
        record
    }
}

/// Reroute a track into the folder of the first classifier that flagged it.
pub fn apply_overrides(classifiers: &[KeywordClassifier], mut record: TrackRecord) -> TrackRecord {
    if let Some(winner) = classifiers.iter().find(|c| record.tag(c.tag_name())) {
        record.approved_name = winner.folder_name().to_string();
    }
    record
}

/// Run every classifier over the whole batch, then resolve overrides in configured order.
pub fn classify_all(classifiers: &[KeywordClassifier], mut records: Vec<TrackRecord>) -> Vec<TrackRecord> {
    for classifier in classifiers {
        records = records.into_iter().map(|r| classifier.classify(r)).collect();
        let hits = records.iter().filter(|r| r.tag(classifier.tag_name())).count();
        info!(
            "Classifier '{}' flagged {} tracks for '{}'",
            classifier.config.name,
            hits,
            classifier.folder_name()
        );
    }
    records.into_iter().map(|r| apply_overrides(classifiers, r)).collect()
}
