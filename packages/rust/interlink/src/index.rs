//! Lazily-loaded, cached index of link targets.
//!
//! Index entries are markdown files whose front matter carries per-language
//! slugs (`en-slug`, `es-slug`, ...). Entries are loaded on first lookup and
//! cached for the rest of the run; misses are cached too, so repeated
//! lookups for the same key never touch the filesystem again.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tracing::{debug, warn};

use brainguide_document::Document;

/// One target resource eligible to be linked to.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Published slug per language, as authored (possibly empty).
    slugs: BTreeMap<String, String>,
}

impl IndexEntry {
    /// Collect `{language}-slug` fields from an index file's front matter.
    fn from_document(doc: &Document) -> Self {
        let mut slugs = BTreeMap::new();

        for (key, value) in &doc.front_matter {
            let (Some(key), Some(value)) = (key.as_str(), value.as_str()) else {
                continue;
            };
            if let Some(language) = key.strip_suffix("-slug") {
                slugs.insert(language.to_string(), value.to_string());
            }
        }

        Self { slugs }
    }

    /// The published slug for a language. Empty slugs count as absent: an
    /// entry may exist before its translation is published.
    pub fn slug(&self, language: &str) -> Option<&str> {
        self.slugs
            .get(language)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Per-run cache mapping normalized link keys to index entries.
#[derive(Debug)]
pub struct IndexCache {
    index_dir: PathBuf,
    entries: HashMap<String, Option<IndexEntry>>,
}

impl IndexCache {
    pub fn new(index_dir: PathBuf) -> Self {
        Self {
            index_dir,
            entries: HashMap::new(),
        }
    }

    /// Look up the index entry for a normalized key, loading it on first use.
    pub fn lookup(&mut self, key: &str) -> Option<&IndexEntry> {
        if !self.entries.contains_key(key) {
            let loaded = self.load(key);
            self.entries.insert(key.to_string(), loaded);
        }
        self.entries[key].as_ref()
    }

    /// Read and parse one index file. Any failure is a miss, not an error:
    /// an unresolvable link is left untouched by the caller.
    fn load(&self, key: &str) -> Option<IndexEntry> {
        let path = self.index_dir.join(format!("{key}.md"));

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => {
                debug!(key, path = %path.display(), "no index file for key");
                return None;
            }
        };

        match Document::parse(&content) {
            Ok(Some(doc)) => Some(IndexEntry::from_document(&doc)),
            Ok(None) => {
                warn!(path = %path.display(), "index file has no front matter");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), "unreadable index file: {e}");
                None
            }
        }
    }
}
