use std::collections::HashMap;
use std::path::PathBuf;
use log::{debug, info};
use crate::TrackRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateMatch {
    pub kept: PathBuf,
    pub discarded: PathBuf,
    pub kept_bitrate: Option<u32>,
    pub discarded_bitrate: Option<u32>,
}

#[derive(Debug)]
pub struct DuplicateResults {
    /// Survivors, highest bitrate first.
    pub records: Vec<TrackRecord>,
    pub matches: Vec<DuplicateMatch>,
    pub total_files_scanned: usize,
}

impl DuplicateResults {
    pub fn removed(&self) -> usize {
        self.matches.len()
    }
}

/// Collapses tracks sharing a case-insensitive (title, artist) pair, keeping the best bitrate.
pub struct DuplicateAnalyzer;

impl DuplicateAnalyzer {
    pub fn duplicate_key(record: &TrackRecord) -> (String, String) {
        (record.title.to_lowercase(), record.artist.to_lowercase())
    }

    pub fn remove_duplicates(mut records: Vec<TrackRecord>) -> DuplicateResults {
        let total_files = records.len();

        // Stable, so equal bitrates keep their scan order. `None` sorts below any `Some`.
        records.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));

        // key -> index of the surviving record
        let mut kept_at: HashMap<(String, String), usize> = HashMap::with_capacity(records.len());
        let mut survivors: Vec<TrackRecord> = Vec::with_capacity(records.len());
        let mut matches = Vec::new();

        for record in records {
            let key = Self::duplicate_key(&record);
            let Some(&slot) = kept_at.get(&key) else {
                kept_at.insert(key, survivors.len());
                survivors.push(record);
                continue;
            };

            let kept = &survivors[slot];
            debug!(
                "Duplicate: keeping {} ({:?} kbps), dropping {} ({:?} kbps)",
                kept.source_path.display(),
                kept.bitrate,
                record.source_path.display(),
                record.bitrate
            );
            matches.push(DuplicateMatch {
                kept: kept.source_path.clone(),
                kept_bitrate: kept.bitrate,
                discarded: record.source_path,
                discarded_bitrate: record.bitrate,
            });
        }

        info!("There were {} duplicates, which have been removed from the record", matches.len());
        DuplicateResults {
            records: survivors,
            matches,
            total_files_scanned: total_files,
        }
    }
}
