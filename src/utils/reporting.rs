use std::collections::HashMap;
use std::path::Path;
use csv::Writer;
use crate::analyzers::duplicate::DuplicateMatch;
use crate::{FailureRecord, Result, TrackRecord};

pub const TRACK_MANIFEST: &str = "musicFileRecord.csv";
pub const FAILURE_MANIFEST: &str = "musicFileRecordFailures.csv";
pub const DUPLICATE_REPORT: &str = "musicFileDuplicates.csv";

/// Fixed track manifest columns; classifier tag columns sit between the two groups.
pub const TRACK_COLUMNS_BEFORE_TAGS: &[&str] = &[
    "source_path",
    "file_name",
    "file_extension",
    "artist",
    "album",
    "title",
    "bitrate",
    "approved_name",
    "matched_reference",
];
pub const TRACK_COLUMNS_AFTER_TAGS: &[&str] = &["target_directory", "destination_path"];

pub fn is_fixed_track_column(name: &str) -> bool {
    TRACK_COLUMNS_BEFORE_TAGS.contains(&name) || TRACK_COLUMNS_AFTER_TAGS.contains(&name)
}

/// Counts shown to the user before anything is copied.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub files_found: usize,
    pub tagged: usize,
    pub failed: usize,
    pub duplicates_removed: usize,
    pub reference_matches: usize,
    pub path_collisions: usize,
    pub classifier_hits: Vec<(String, usize)>,
    pub top_names: Vec<(String, usize)>,
    pub filetypes: Vec<(String, usize)>,
}

/// Count occurrences and order by count descending, then key ascending.
fn ranked<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().map(|(k, c)| (k.to_string(), c)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

impl RunSummary {
    pub fn new(
        files_found: usize,
        duplicates_removed: usize,
        path_collisions: usize,
        tracks: &[TrackRecord],
        failures: &[FailureRecord],
        tag_names: &[String],
    ) -> Self {
        let mut top_names = ranked(tracks.iter().map(|t| t.approved_name.as_str()));
        top_names.truncate(10);

        Self {
            files_found,
            tagged: tracks.len(),
            failed: failures.len(),
            duplicates_removed,
            reference_matches: tracks.iter().filter(|t| t.matched_reference).count(),
            path_collisions,
            classifier_hits: tag_names
                .iter()
                .map(|tag| (tag.clone(), tracks.iter().filter(|t| t.tag(tag)).count()))
                .collect(),
            top_names,
            filetypes: ranked(
                tracks
                    .iter()
                    .map(|t| t.file_extension.as_str())
                    .chain(failures.iter().map(|f| f.file_extension.as_str())),
            ),
        }
    }
}

pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_summary(&self, summary: &RunSummary) {
        println!("\nFiles discovered: {}", summary.files_found);
        println!("Tagged: {}  Failed: {}", summary.tagged, summary.failed);
        println!("Duplicates removed: {}", summary.duplicates_removed);
        println!("Reference artist matches: {}", summary.reference_matches);
        if summary.path_collisions > 0 {
            println!("Renamed to avoid path collisions: {}", summary.path_collisions);
        }
        for (tag, hits) in &summary.classifier_hits {
            println!("Flagged as {}: {}", tag, hits);
        }

        println!("\nTop {} folders by track count:", summary.top_names.len());
        for (name, count) in &summary.top_names {
            println!("  {:<40} {}", name, count);
        }

        println!("\nThe following filetypes were parsed:");
        for (ext, count) in &summary.filetypes {
            let ext = if ext.is_empty() { "(none)" } else { ext.as_str() };
            println!("  {:<8} {}", ext, count);
        }
        println!();
    }

    pub fn write_track_manifest(
        &self,
        tracks: &[TrackRecord],
        tag_names: &[String],
        output_path: impl AsRef<Path>,
    ) -> Result<()> {
        let output_path_ref = output_path.as_ref();
        let mut writer = Writer::from_path(output_path_ref)?;

        let mut header: Vec<&str> = TRACK_COLUMNS_BEFORE_TAGS.to_vec();
        header.extend(tag_names.iter().map(String::as_str));
        header.extend(TRACK_COLUMNS_AFTER_TAGS);
        writer.write_record(&header)?;

        for track in tracks {
            let mut row = vec![
                track.source_path.display().to_string(),
                track.file_name(),
                track.file_extension.clone(),
                track.artist.clone(),
                track.album.clone(),
                track.title.clone(),
                track.bitrate.map(|b| b.to_string()).unwrap_or_default(),
                track.approved_name.clone(),
                track.matched_reference.to_string(),
            ];
            row.extend(tag_names.iter().map(|tag| track.tag(tag).to_string()));
            row.push(track.target_directory.display().to_string());
            row.push(track.destination_path.display().to_string());
            writer.write_record(&row)?;
        }

        writer.flush()?;
        log::info!("Track manifest written: {}", output_path_ref.display());
        Ok(())
    }

    pub fn write_failure_manifest(&self, failures: &[FailureRecord], output_path: impl AsRef<Path>) -> Result<()> {
        let output_path_ref = output_path.as_ref();
        let mut writer = Writer::from_path(output_path_ref)?;

        writer.write_record([
            "source_path",
            "file_name",
            "file_extension",
            "failure_reason",
            "approved_name",
            "target_directory",
            "destination_path",
        ])?;

        for failure in failures {
            writer.write_record(&[
                failure.source_path.display().to_string(),
                failure.file_name(),
                failure.file_extension.clone(),
                failure.failure_reason.to_string(),
                failure.approved_name.clone(),
                failure.target_directory.display().to_string(),
                failure.destination_path.display().to_string(),
            ])?;
        }

        writer.flush()?;
        log::info!("Failure manifest written: {}", output_path_ref.display());
        Ok(())
    }

    /// One row per discarded copy, next to the copy that was kept instead.
    pub fn write_duplicate_report(&self, matches: &[DuplicateMatch], output_path: impl AsRef<Path>) -> Result<()> {
        let output_path_ref = output_path.as_ref();
        let mut writer = Writer::from_path(output_path_ref)?;

        writer.write_record(["Kept File", "Kept Bitrate", "Discarded File", "Discarded Bitrate"])?;

        let kbps = |b: Option<u32>| b.map_or("Unknown".to_string(), |b| format!("{} kbps", b));
        for m in matches {
            writer.write_record(&[
                m.kept.display().to_string(),
                kbps(m.kept_bitrate),
                m.discarded.display().to_string(),
                kbps(m.discarded_bitrate),
            ])?;
        }

        writer.flush()?;
        log::info!("Duplicate report written: {}", output_path_ref.display());
        Ok(())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
