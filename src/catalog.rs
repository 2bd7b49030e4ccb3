use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use log::{info, warn};
use crate::{Result, SortError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub name_lowercase: String,
}

/// Canonical artist names, looked up by their lowercase form.
#[derive(Debug, Default)]
pub struct ReferenceCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl ReferenceCatalog {
    /// Build from names in load order. When two names share a lowercase form the first one wins.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let entry = CatalogEntry {
                name: name.to_string(),
                name_lowercase: name.to_lowercase(),
            };
            let position = catalog.entries.len();
            catalog.index.entry(entry.name_lowercase.clone()).or_insert(position);
            catalog.entries.push(entry);
        }
        catalog
    }

    /// Read a CSV whose header has a `name` column (surrounding spaces allowed). Other columns are ignored.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let name_column = csv_reader
            .headers()?
            .iter()
            .position(|h| h.trim() == "name")
            .ok_or_else(|| SortError::Catalog("reference list has no 'name' column".into()))?;

        let mut names = Vec::new();
        for row in csv_reader.records() {
            if let Some(name) = row?.get(name_column) {
                names.push(name.to_string());
            }
        }
        Ok(Self::from_names(names))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        if catalog.is_empty() {
            warn!("Reference list {} has no names; artists will not be matched", path.display());
        } else {
            info!("Loaded {} reference artists from {}", catalog.len(), path.display());
        }
        Ok(catalog)
    }

    /// Canonical spelling for an artist, matched exactly after lowercasing.
    pub fn lookup(&self, artist: &str) -> Option<&CatalogEntry> {
        self.index
            .get(&artist.to_lowercase())
            .map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
