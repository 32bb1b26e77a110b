//! FAQ definitions and the keyword table built from them.
//!
//! The FAQ source is a list of entries, each with several trigger keywords and
//! one answer. Loading expands it into a flat, ordered `keyword -> answer`
//! table. A keyword declared twice is an authoring error and loading fails, so
//! one answer can never silently shadow another.
//!
//! The running bot reads the table through a [`FaqStore`], which hands out
//! immutable snapshots and swaps in a rebuilt table atomically on reload.

pub mod watcher;

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::base::types::Res;

// Types.

/// One FAQ entry as authored in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Keywords or question fragments that trigger this answer.
    #[serde(alias = "keywords")]
    pub questions: Vec<String>,
    pub answer: String,
}

impl FaqEntry {
    pub fn new<Q, S>(questions: Q, answer: &str) -> Self
    where
        Q: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            questions: questions.into_iter().map(Into::into).collect(),
            answer: answer.to_string(),
        }
    }
}

/// Flat keyword table, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaqTable {
    entries: Vec<(String, String)>,
}

impl FaqTable {
    /// Expand FAQ entries into a keyword table.
    ///
    /// Keywords are trimmed and lowercased. Fails on an empty keyword, an entry
    /// without keywords, or a keyword that appears more than once.
    pub fn load(entries: &[FaqEntry]) -> Res<Self> {
        let mut entries_out = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            if entry.questions.is_empty() {
                return Err(anyhow!("FAQ entry #{index} has no keywords."));
            }

            for question in &entry.questions {
                let keyword = normalize_keyword(question);

                if keyword.is_empty() {
                    return Err(anyhow!("FAQ entry #{index} has an empty keyword."));
                }

                if let Some(first) = seen.get(&keyword) {
                    return Err(anyhow!("Found duplicate keyword '{keyword}' in FAQ entries #{first} and #{index}."));
                }

                seen.insert(keyword.clone(), index);
                entries_out.push((keyword, entry.answer.clone()));
            }
        }

        debug!("Loaded {} FAQ keywords from {} entries.", entries_out.len(), entries.len());

        Ok(Self { entries: entries_out })
    }

    /// Parse and expand a JSON FAQ document.
    pub fn from_json(json: &str) -> Res<Self> {
        let entries: Vec<FaqEntry> = serde_json::from_str(json).context("FAQ file is not a valid list of entries")?;
        Self::load(&entries)
    }

    /// Read, parse and expand the FAQ file at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Res<Self> {
        let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read FAQ file `{}`", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to load FAQ file `{}`", path.display()))
    }

    /// The answer for the first keyword (in declaration order) contained in `text`.
    ///
    /// `text` is expected to already be lowercased.
    pub fn find_answer(&self, text: &str) -> Option<&str> {
        self.entries.iter().find(|(keyword, _)| text.contains(keyword.as_str())).map(|(_, answer)| answer.as_str())
    }

    /// The answer mapped to exactly `keyword`.
    pub fn get(&self, keyword: &str) -> Option<&str> {
        let keyword = normalize_keyword(keyword);
        self.entries.iter().find(|(k, _)| *k == keyword).map(|(_, answer)| answer.as_str())
    }

    /// All keywords, in declaration order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(keyword, _)| keyword.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

// Structs.

/// Shared handle to the current FAQ table.
///
/// It is designed to be trivially cloneable. Readers take a snapshot with
/// [`FaqStore::current`] and keep using it even if a reload happens meanwhile.
#[derive(Clone, Default)]
pub struct FaqStore {
    inner: Arc<RwLock<Arc<FaqTable>>>,
}

impl FaqStore {
    pub fn new(table: FaqTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    /// Load the store from a file on disk.
    pub fn from_file(path: &Path) -> Res<Self> {
        Ok(Self::new(FaqTable::from_file(path)?))
    }

    /// A snapshot of the current table.
    pub fn current(&self) -> Arc<FaqTable> {
        // The lock only ever guards a pointer swap, so a poisoned lock still holds a whole table.
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Swap in a new table.
    pub fn replace(&self, table: FaqTable) {
        let table = Arc::new(table);

        match self.inner.write() {
            Ok(mut guard) => *guard = table,
            Err(poisoned) => *poisoned.into_inner() = table,
        }
    }

    /// Rebuild the table from `path` and swap it in; the current table is kept on failure.
    pub fn reload(&self, path: &Path) -> Res<usize> {
        let table = FaqTable::from_file(path)?;
        let count = table.len();

        self.replace(table);

        Ok(count)
    }
}

// Tests.
