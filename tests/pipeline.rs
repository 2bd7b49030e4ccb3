use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use music_sorter::audio::metadata::{clean_string, ExtractedTags};
use music_sorter::audio::scan::scan_directory;
use music_sorter::utils::reporting::{DUPLICATE_REPORT, FAILURE_MANIFEST, TRACK_MANIFEST};
use music_sorter::{ClassifierConfig, FailureReason, Pipeline, ReferenceCatalog, SortConfig, SortError, TagReader};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct FakeTags(HashMap<PathBuf, Result<ExtractedTags, FailureReason>>);

impl FakeTags {
    fn track(mut self, path: &Path, artist: &str, title: &str, album: &str, bitrate: Option<u32>) -> Self {
        let tags = ExtractedTags {
            artist: clean_string(artist),
            album: clean_string(album),
            title: clean_string(title),
            bitrate,
        };
        self.0.insert(path.to_path_buf(), Ok(tags));
        self
    }

    fn fail(mut self, path: &Path, reason: FailureReason) -> Self {
        self.0.insert(path.to_path_buf(), Err(reason));
        self
    }
}

impl TagReader for FakeTags {
    fn read_tags(&self, path: &Path) -> Result<ExtractedTags, FailureReason> {
        self.0.get(path).cloned().unwrap_or(Err(FailureReason::ExtractionError))
    }
}

fn touch(path: &Path, body: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[test]
fn beatles_round_trip() {
    let source = PathBuf::from("/in/misc/help.mp3");
    let reader = FakeTags::default().track(&source, "  The Beatles  ", "Help!", "", Some(320));
    let catalog = ReferenceCatalog::from_names(["The Beatles"]);
    let pipeline = Pipeline::new(reader, Some(catalog), SortConfig::default()).unwrap();

    let output = pipeline.run(vec![source], Path::new("/out"));

    let track = &output.tracks[0];
    assert_eq!(track.approved_name, "The Beatles");
    assert!(track.matched_reference);
    assert_eq!(track.target_directory, PathBuf::from("/out/The Beatles"));
    assert_eq!(track.destination_path, PathBuf::from("/out/The Beatles/help.mp3"));
}

#[test]
fn extraction_errors_route_to_failure_folder() {
    let bad = PathBuf::from("/in/bad.mp3");
    let empty = PathBuf::from("/in/empty.wav");
    let reader = FakeTags::default()
        .fail(&bad, FailureReason::ExtractionError)
        .fail(&empty, FailureReason::NoTagData);
    let pipeline = Pipeline::new(reader, None, SortConfig::default()).unwrap();

    let output = pipeline.run(vec![bad, empty], Path::new("/out"));

    assert!(output.tracks.is_empty());
    assert_eq!(output.failures.len(), 2);
    assert_eq!(output.failures[0].failure_reason, FailureReason::ExtractionError);
    assert_eq!(output.failures[0].approved_name, "_Failures");
    assert_eq!(output.failures[0].destination_path, PathBuf::from("/out/_Failures/bad.mp3"));
    assert_eq!(output.failures[1].failure_reason, FailureReason::NoTagData);
    assert_eq!(output.summary.failed, 2);
}

#[test]
fn classifier_override_beats_reference_match_and_respects_order() {
    let source = PathBuf::from("/in/song.mp3");
    let reader = FakeTags::default().track(&source, "weird al", "A Funny Christmas", "", Some(192));
    let catalog = ReferenceCatalog::from_names(["Weird Al"]);
    let config = SortConfig {
        classifiers: vec![ClassifierConfig::comedy(), ClassifierConfig::xmas()],
        ..SortConfig::default()
    };
    let pipeline = Pipeline::new(reader, Some(catalog), config).unwrap();

    let output = pipeline.run(vec![source], Path::new("/out"));

    let track = &output.tracks[0];
    assert!(track.matched_reference);
    assert!(track.tag("comedy_songs"));
    assert!(track.tag("xmas_songs"));
    assert_eq!(track.approved_name, "_Comedy");
    assert_eq!(track.target_directory, PathBuf::from("/out/_Comedy"));
}

fn holiday(tag_name: &str) -> ClassifierConfig {
    ClassifierConfig {
        name: "holiday".into(),
        tag_name: tag_name.into(),
        folder_name: "_Holiday".into(),
        keywords: vec!["easter".into()],
        search_fields: ClassifierConfig::xmas().search_fields,
        case_sensitive: false,
    }
}

#[test]
fn classifiers_sharing_a_tag_name_are_refused() {
    let config = SortConfig {
        classifiers: vec![ClassifierConfig::xmas(), holiday("xmas_songs")],
        ..SortConfig::default()
    };

    let result = Pipeline::new(FakeTags::default(), None, config);

    assert!(matches!(result, Err(SortError::Config(_))));
}

#[test]
fn later_classifier_with_its_own_tag_still_routes() {
    let source = PathBuf::from("/in/easter.mp3");
    let reader = FakeTags::default().track(&source, "Choir", "Easter Song", "", Some(192));
    let config = SortConfig {
        classifiers: vec![ClassifierConfig::xmas(), holiday("holiday_songs")],
        ..SortConfig::default()
    };
    let pipeline = Pipeline::new(reader, None, config).unwrap();

    let output = pipeline.run(vec![source], Path::new("/out"));

    let track = &output.tracks[0];
    assert!(!track.tag("xmas_songs"));
    assert!(track.tag("holiday_songs"));
    assert_eq!(track.approved_name, "_Holiday");
}

#[test]
fn duplicates_and_blank_artists() {
    let low = PathBuf::from("/in/a/song.mp3");
    let high = PathBuf::from("/in/b/song.flac");
    let anon = PathBuf::from("/in/c/track01.mp3");
    let reader = FakeTags::default()
        .track(&low, "adele", "Hello", "25", Some(128))
        .track(&high, "Adele", "hello", "25", Some(900))
        .track(&anon, "Unknown Artist", "Track 1", "", None);
    let config = SortConfig {
        include_album: true,
        ..SortConfig::default()
    };
    let pipeline = Pipeline::new(reader, None, config).unwrap();

    let output = pipeline.run(vec![low, high.clone(), anon], Path::new("/out"));

    assert_eq!(output.summary.duplicates_removed, 1);
    assert_eq!(output.duplicates[0].kept, high);
    assert_eq!(output.duplicates[0].discarded, PathBuf::from("/in/a/song.mp3"));
    assert_eq!(output.tracks.len(), 2);
    assert_eq!(output.tracks[0].source_path, high);
    assert_eq!(output.tracks[0].destination_path, PathBuf::from("/out/Adele/25/song.flac"));
    assert_eq!(output.tracks[1].approved_name, "_Unknown");
    assert_eq!(output.tracks[1].destination_path, PathBuf::from("/out/_Unknown/track01.mp3"));
}

#[test]
fn backup_and_manifests_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let in_dir = dir.path().join("in");
    let out_dir = dir.path().join("out");
    let one = in_dir.join("x/track.mp3");
    let two = in_dir.join("y/track.mp3");
    let broken = in_dir.join("z/broken.flac");
    touch(&one, b"one");
    touch(&two, b"two");
    touch(&broken, b"???");
    touch(&in_dir.join("x/cover.jpg"), b"jpg");

    let reader = FakeTags::default()
        .track(&one, "Band", "First", "", Some(320))
        .track(&two, "band", "Second", "", Some(256))
        .fail(&broken, FailureReason::ExtractionError);
    let config = SortConfig {
        classifiers: vec![ClassifierConfig::xmas()],
        ..SortConfig::default()
    };
    let pipeline = Pipeline::new(reader, None, config).unwrap();

    let extensions = vec![".mp3".to_string(), ".flac".to_string()];
    let scan = scan_directory(&in_dir, &extensions, Some(&out_dir));
    assert_eq!(scan.total, 3);

    let output = pipeline.run(scan.paths().collect(), &out_dir);
    assert_eq!(output.summary.path_collisions, 1);

    let stats = pipeline.backup(&output, &out_dir).unwrap();
    assert_eq!(stats.copied, 3);
    assert_eq!(fs::read(out_dir.join("Band/track.mp3")).unwrap(), b"one");
    assert_eq!(fs::read(out_dir.join("Band/track_2.mp3")).unwrap(), b"two");
    assert!(out_dir.join("_Failures/broken.flac").exists());

    pipeline.write_manifests(&output, &out_dir).unwrap();
    let mut reader = csv::Reader::from_path(out_dir.join(TRACK_MANIFEST)).unwrap();
    assert_eq!(reader.records().count(), 2);
    let mut reader = csv::Reader::from_path(out_dir.join(FAILURE_MANIFEST)).unwrap();
    assert_eq!(reader.records().count(), 1);
    let mut reader = csv::Reader::from_path(out_dir.join(DUPLICATE_REPORT)).unwrap();
    assert_eq!(reader.records().count(), 0);

    let rerun = pipeline.run(scan.paths().collect(), &out_dir);
    let stats = pipeline.backup(&rerun, &out_dir).unwrap();
    assert_eq!(stats.copied, 0);
    assert_eq!(stats.skipped, 3);
}
