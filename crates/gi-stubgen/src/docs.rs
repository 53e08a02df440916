//! Documentation side-table.
//!
//! An optional, pre-extracted lookup table keyed by symbol: loaded once per
//! namespace from a JSON file, then queried by (class, member kind, member
//! name). Absence of the file or of any entry only omits docs from the
//! artifact; it never fails a run. Each load fully replaces the previous
//! state, and `clear` resets the table between independent runs.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberKind {
    Module,
    Class,
    Method,
    Function,
    Property,
    Field,
    Signal,
    Enum,
    EnumMember,
    Constant,
    Callback,
}

#[derive(Debug, Clone, Deserialize)]
struct DocEntry {
    #[serde(default)]
    class: Option<String>,
    kind: MemberKind,
    name: String,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DocKey {
    class: Option<String>,
    kind: MemberKind,
    name: String,
}

#[derive(Debug, Default)]
pub struct DocTable {
    entries: HashMap<DocKey, String>,
}

impl DocTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a JSON array of `{class?, kind, name, text}` entries,
    /// replacing any previously loaded state.
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<DocEntry> = serde_json::from_str(&raw)?;
        self.entries = entries
            .into_iter()
            .map(|e| {
                (
                    DocKey {
                        class: e.class,
                        kind: e.kind,
                        name: e.name,
                    },
                    e.text,
                )
            })
            .collect();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, class: Option<&str>, kind: MemberKind, name: &str) -> Option<&str> {
        let key = DocKey {
            class: class.map(str::to_owned),
            kind,
            name: name.to_owned(),
        };
        self.entries.get(&key).map(String::as_str)
    }
}
