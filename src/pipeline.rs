use std::path::{Path, PathBuf};
use log::info;
use crate::analyzers::classify::{classify_all, KeywordClassifier};
use crate::analyzers::duplicate::{DuplicateAnalyzer, DuplicateMatch};
use crate::analyzers::layout::PathPlanner;
use crate::analyzers::reconcile::NameReconciler;
use crate::audio::metadata::TagReader;
use crate::catalog::ReferenceCatalog;
use crate::config::{validate_classifiers, SortConfig};
use crate::utils::file_ops::{BackupStats, FileManager};
use crate::utils::reporting::{Reporter, RunSummary, DUPLICATE_REPORT, FAILURE_MANIFEST, TRACK_MANIFEST};
use crate::{FailureRecord, Result, TrackRecord};

/// Everything a run decided, before any file is copied.
#[derive(Debug)]
pub struct PipelineOutput {
    pub tracks: Vec<TrackRecord>,
    pub failures: Vec<FailureRecord>,
    pub duplicates: Vec<DuplicateMatch>,
    pub summary: RunSummary,
}

/// Runs extraction, dedup, name reconciliation, classification and path planning in order.
/// Each stage finishes the whole batch before the next starts.
pub struct Pipeline<R: TagReader> {
    reader: R,
    catalog: Option<ReferenceCatalog>,
    classifiers: Vec<KeywordClassifier>,
    config: SortConfig,
}

impl<R: TagReader> Pipeline<R> {
    pub fn new(reader: R, catalog: Option<ReferenceCatalog>, config: SortConfig) -> Result<Self> {
        validate_classifiers(&config.classifiers)?;
        let classifiers = config
            .classifiers
            .iter()
            .cloned()
            .map(KeywordClassifier::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            reader,
            catalog,
            classifiers,
            config,
        })
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.classifiers.iter().map(|c| c.tag_name().to_string()).collect()
    }

    /// Read tags for every path. Unreadable files become failure records; nothing here is fatal.
    pub fn extract(&self, paths: impl IntoIterator<Item = PathBuf>) -> (Vec<TrackRecord>, Vec<FailureRecord>) {
        let mut tracks = Vec::new();
        let mut failures = Vec::new();
        for path in paths {
            match self.reader.read_tags(&path) {
                Ok(tags) => tracks.push(TrackRecord::new(path, tags)),
                Err(reason) => failures.push(FailureRecord::new(path, reason, &self.config.failure_dirname)),
            }
        }
        info!("Extracted tags from {} files, {} failures", tracks.len(), failures.len());
        (tracks, failures)
    }

    /// Dedup, reconcile, classify and plan destinations under `out_dir`.
    pub fn process(
        &self,
        files_found: usize,
        tracks: Vec<TrackRecord>,
        failures: Vec<FailureRecord>,
        out_dir: &Path,
    ) -> PipelineOutput {
        let deduped = DuplicateAnalyzer::remove_duplicates(tracks);
        let duplicates_removed = deduped.removed();

        let reconciler = NameReconciler::new(
            self.catalog.as_ref(),
            self.config.blank_name.clone(),
            self.config.capitalize,
        );
        let tracks = reconciler.reconcile_all(deduped.records);
        let tracks = classify_all(&self.classifiers, tracks);

        let mut planner = PathPlanner::new(out_dir, &self.config);
        let tracks = planner.plan_tracks(tracks);
        let failures = planner.plan_failures(failures);

        let summary = RunSummary::new(
            files_found,
            duplicates_removed,
            planner.collisions(),
            &tracks,
            &failures,
            &self.tag_names(),
        );

        PipelineOutput {
            tracks,
            failures,
            duplicates: deduped.matches,
            summary,
        }
    }

    pub fn run(&self, paths: Vec<PathBuf>, out_dir: &Path) -> PipelineOutput {
        let files_found = paths.len();
        let (tracks, failures) = self.extract(paths);
        self.process(files_found, tracks, failures, out_dir)
    }

    /// Copy tracks, then failures, into their planned folders.
    pub fn backup(&self, output: &PipelineOutput, out_dir: &Path) -> Result<BackupStats> {
        let manager = FileManager::new(out_dir);
        manager.ensure_directory(manager.out_dir())?;

        println!("Backing up music that passed checks...");
        let mut stats = manager.backup(&output.tracks);
        println!("Backing up failures separately...");
        stats += manager.backup(&output.failures);

        info!(
            "Backup finished: {} copied, {} already present, {} failed",
            stats.copied, stats.skipped, stats.failed
        );
        Ok(stats)
    }

    pub fn write_manifests(&self, output: &PipelineOutput, out_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(out_dir)?;
        let reporter = Reporter::new();
        reporter.write_track_manifest(&output.tracks, &self.tag_names(), out_dir.join(TRACK_MANIFEST))?;
        reporter.write_failure_manifest(&output.failures, out_dir.join(FAILURE_MANIFEST))?;
        reporter.write_duplicate_report(&output.duplicates, out_dir.join(DUPLICATE_REPORT))?;
        Ok(())
    }
}
