use log::info;
use crate::catalog::ReferenceCatalog;
use crate::TrackRecord;

/// Artist strings taggers leave behind when they have nothing better.
pub const MISSING_ARTIST_TAGS: &[&str] = &["", "no artist", "unknown artist", "unknown", "none", "artist"];

/// Picks the folder name for each track's artist.
pub struct NameReconciler<'a> {
    catalog: Option<&'a ReferenceCatalog>,
    blank_name: String,
    capitalize: bool,
}

impl<'a> NameReconciler<'a> {
    pub fn new(catalog: Option<&'a ReferenceCatalog>, blank_name: impl Into<String>, capitalize: bool) -> Self {
        Self {
            catalog,
            blank_name: blank_name.into(),
            capitalize,
        }
    }

    /// `(approved_name, matched_reference)` for a raw artist string.
    pub fn approve(&self, artist: &str) -> (String, bool) {
        let (mut name, matched) = match self.catalog.and_then(|c| c.lookup(artist)) {
            Some(entry) => (entry.name.clone(), true),
            None => (artist.to_string(), false),
        };

        if is_missing_artist(&name) {
            name = self.blank_name.clone();
        }
        if self.capitalize {
            name = capitalize_first(&name);
        }
        (name, matched)
    }

    pub fn reconcile(&self, mut record: TrackRecord) -> TrackRecord {
        let (approved_name, matched) = self.approve(&record.artist);
        record.approved_name = approved_name;
        record.matched_reference = matched;
        record
    }

    pub fn reconcile_all(&self, records: Vec<TrackRecord>) -> Vec<TrackRecord> {
        let records: Vec<TrackRecord> = records.into_iter().map(|r| self.reconcile(r)).collect();

        if self.catalog.is_some() {
            let matched: Vec<&TrackRecord> = records.iter().filter(|r| r.matched_reference).collect();
            let mut artists: Vec<&str> = matched.iter().map(|r| r.approved_name.as_str()).collect();
            artists.sort_unstable();
            artists.dedup();
            info!(
                "There are {} confirmed artists with a total of {} tracks",
                artists.len(),
                matched.len()
            );
        }
        records
    }
}

pub fn is_missing_artist(name: &str) -> bool {
    let lower = name.to_lowercase();
    MISSING_ARTIST_TAGS.contains(&lower.as_str())
}

/// Uppercase the first character and leave the rest alone. Empty input stays empty.
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::metadata::ExtractedTags;
    use pretty_assertions::assert_eq;

    fn track(artist: &str) -> TrackRecord {
        TrackRecord::new(
            "/music/song.mp3",
            ExtractedTags {
                artist: artist.into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn without_catalog_artist_passes_through() {
        let reconciler = NameReconciler::new(None, "_Unknown", false);
        let record = reconciler.reconcile(track("the beatles"));

        assert_eq!(record.approved_name, "the beatles");
        assert!(!record.matched_reference);
    }

    #[test]
    fn catalog_match_uses_canonical_casing() {
        let catalog = ReferenceCatalog::from_names(["The Beatles"]);
        let reconciler = NameReconciler::new(Some(&catalog), "_Unknown", true);

        let record = reconciler.reconcile(track("THE BEATLES"));
        assert_eq!(record.approved_name, "The Beatles");
        assert!(record.matched_reference);

        let record = reconciler.reconcile(track("beatles"));
        assert_eq!(record.approved_name, "Beatles");
        assert!(!record.matched_reference);
    }

    #[test]
    fn blank_placeholders_become_fallback_label() {
        let catalog = ReferenceCatalog::from_names(["Adele"]);
        let reconciler = NameReconciler::new(Some(&catalog), "_Unknown", true);

        for raw in ["", "no artist", "UNKNOWN Artist", "None", "ARTIST", "unknown"] {
            let record = reconciler.reconcile(track(raw));
            assert_eq!(record.approved_name, "_Unknown", "raw artist {:?}", raw);
            assert!(!record.matched_reference);
        }
    }

    #[test]
    fn capitalization_only_touches_first_character() {
        assert_eq!(capitalize_first("dEADMAU5"), "DEADMAU5");
        assert_eq!(capitalize_first("élan"), "Élan");
        assert_eq!(capitalize_first(""), "");

        let reconciler = NameReconciler::new(None, "", true);
        assert_eq!(reconciler.approve("none"), (String::new(), false));
    }

    #[test]
    fn approval_is_deterministic() {
        let catalog = ReferenceCatalog::from_names(["Pink", "PINK"]);
        let reconciler = NameReconciler::new(Some(&catalog), "_Unknown", true);

        let first = reconciler.approve("pink");
        for _ in 0..5 {
            assert_eq!(reconciler.approve("pink"), first);
        }
        assert_eq!(first, ("Pink".to_string(), true));
    }
}
