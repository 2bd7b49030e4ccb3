use std::path::Path;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey};
use symphonia::core::probe::Hint;
use log::{debug, warn};
use crate::{FailureReason, Result, SortError};

/// Tag fields read from a file, already NUL-stripped and trimmed. Absent fields are empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTags {
    pub artist: String,
    pub album: String,
    pub title: String,
    pub bitrate: Option<u32>,
}

/// Anything that can turn an audio file into tags, or say why it could not.
pub trait TagReader {
    fn read_tags(&self, path: &Path) -> std::result::Result<ExtractedTags, FailureReason>;
}

pub fn clean_string(s: &str) -> String {
    s.replace('\0', "").trim().to_string()
}

pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Probe `path` with symphonia. `Ok(None)` means the file was readable but carried no tags.
    pub fn extract_metadata(path: impl AsRef<Path>) -> Result<Option<ExtractedTags>> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let size_bytes = file.metadata()?.len();

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let mut probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| SortError::Metadata(e.to_string()))?;

        let mut tags = ExtractedTags::default();
        let mut found = false;

        let mut format = probed.format;
        if let Some(revision) = format.metadata().current() {
            fill_from_revision(&mut tags, revision);
            found = true;
        }

        // ID3v2 and friends sit in front of the container and are read by the probe itself
        if let Some(metadata) = probed.metadata.get() {
            if let Some(revision) = metadata.current() {
                fill_from_revision(&mut tags, revision);
                found = true;
            }
        }

        if !found {
            return Ok(None);
        }

        if let Some(track) = format.default_track() {
            let params = &track.codec_params;
            if let (Some(time_base), Some(n_frames)) = (params.time_base, params.n_frames) {
                let time = time_base.calc_time(n_frames);
                let duration = time.seconds as f64 + time.frac;
                if duration > 0.0 {
                    let bitrate = (size_bytes * 8) as f64 / duration;
                    tags.bitrate = Some((bitrate / 1000.0) as u32);
                }
            }
        }

        Ok(Some(tags))
    }
}

fn fill_from_revision(tags: &mut ExtractedTags, revision: &MetadataRevision) {
    for tag in revision.tags() {
        let slot = match tag.std_key {
            Some(StandardTagKey::Artist) => &mut tags.artist,
            Some(StandardTagKey::TrackTitle) => &mut tags.title,
            Some(StandardTagKey::Album) => &mut tags.album,
            _ => continue,
        };
        if slot.is_empty() {
            *slot = clean_string(&tag.value.to_string());
        }
    }
}

impl TagReader for MetadataExtractor {
    fn read_tags(&self, path: &Path) -> std::result::Result<ExtractedTags, FailureReason> {
        match Self::extract_metadata(path) {
            Ok(Some(tags)) => {
                debug!("Read tags from {}: {:?}", path.display(), tags);
                Ok(tags)
            }
            Ok(None) => {
                warn!("No tag data in {}", path.display());
                Err(FailureReason::NoTagData)
            }
            Err(e) => {
                warn!("Error reading {}: {}", path.display(), e);
                Err(FailureReason::ExtractionError)
            }
        }
    }
}
