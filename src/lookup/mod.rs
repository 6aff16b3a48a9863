//! Display-name lookup tables.
//!
//! Character ids and dan ranks are plain integers in the match data. The
//! tables translating them to names are supplied by the caller, either built
//! in code or loaded from a TOML file:
//!
//! ```toml
//! [characters]
//! 0 = "Paul"
//! 8 = "Kazuya"
//!
//! [ranks]
//! 0 = "Beginner"
//! 1 = "1st Dan"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{CharacterId, Rank};

/// Lookup failures.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Unknown character id: {0}")]
    UnknownCharacter(CharacterId),

    #[error("Unknown rank: {0}")]
    UnknownRank(Rank),

    #[error("Failed to read lookup tables: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse lookup tables: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid table key {key:?} in [{table}]")]
    InvalidKey { table: &'static str, key: String },
}

/// Integer key to display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable(BTreeMap<u32, String>);

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: u32, name: impl Into<String>) {
        self.0.insert(key, name.into());
    }

    pub fn get(&self, key: u32) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_raw(table: &'static str, raw: BTreeMap<String, String>) -> Result<Self, LookupError> {
        raw.into_iter()
            .map(|(key, name)| {
                key.trim()
                    .parse::<u32>()
                    .map(|k| (k, name))
                    .map_err(|_| LookupError::InvalidKey { table, key })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for NameTable {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[derive(Debug, Deserialize)]
struct RawTables {
    #[serde(default)]
    characters: BTreeMap<String, String>,
    #[serde(default)]
    ranks: BTreeMap<String, String>,
}

/// Character and rank name tables for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTables {
    pub characters: NameTable,
    pub ranks: NameTable,
}

impl LookupTables {
    pub fn new(characters: NameTable, ranks: NameTable) -> Self {
        Self { characters, ranks }
    }

    /// Load tables from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, LookupError> {
        let contents = std::fs::read_to_string(path)?;
        let tables = Self::from_toml_str(&contents)?;
        debug!(
            "Loaded {} character names and {} rank names from {:?}",
            tables.characters.len(),
            tables.ranks.len(),
            path
        );
        Ok(tables)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, LookupError> {
        let raw: RawTables = toml::from_str(contents)?;
        Ok(Self {
            characters: NameTable::from_raw("characters", raw.characters)?,
            ranks: NameTable::from_raw("ranks", raw.ranks)?,
        })
    }

    pub fn character_name(&self, id: CharacterId) -> Result<&str, LookupError> {
        self.characters
            .get(id)
            .ok_or(LookupError::UnknownCharacter(id))
    }

    pub fn rank_name(&self, rank: Rank) -> Result<&str, LookupError> {
        self.ranks.get(rank).ok_or(LookupError::UnknownRank(rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[characters]
0 = "Paul"
8 = "Kazuya"

[ranks]
0 = "Beginner"
1 = "1st Dan"
"#;

    #[test]
    fn test_from_toml_str() {
        let tables = LookupTables::from_toml_str(SAMPLE).unwrap();

        assert_eq!(tables.character_name(8).unwrap(), "Kazuya");
        assert_eq!(tables.rank_name(1).unwrap(), "1st Dan");
        assert_eq!(tables.characters.len(), 2);
    }

    #[test]
    fn test_unknown_keys_fail() {
        let tables = LookupTables::from_toml_str(SAMPLE).unwrap();

        assert!(matches!(
            tables.character_name(99),
            Err(LookupError::UnknownCharacter(99))
        ));
        assert!(matches!(
            tables.rank_name(30),
            Err(LookupError::UnknownRank(30))
        ));
    }

    #[test]
    fn test_invalid_key_rejected() {
        let err = LookupTables::from_toml_str("[characters]\npaul = \"Paul\"\n").unwrap_err();
        assert!(matches!(
            err,
            LookupError::InvalidKey {
                table: "characters",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let tables = LookupTables::from_toml_str("[ranks]\n0 = \"Beginner\"\n").unwrap();
        assert!(tables.characters.is_empty());
        assert_eq!(tables.ranks.len(), 1);
    }

    #[test]
    fn test_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tables.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let tables = LookupTables::from_file(&path).unwrap();
        assert_eq!(tables.character_name(0).unwrap(), "Paul");
    }

    #[test]
    fn test_name_table_from_iter() {
        let table: NameTable = [(1, "Law"), (2, "King")].into_iter().collect();
        assert_eq!(table.get(2), Some("King"));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn test_example_tables_parse() {
        let tables =
            LookupTables::from_toml_str(include_str!("../../tables.example.toml")).unwrap();
        assert_eq!(tables.rank_name(0).unwrap(), "Beginner");
        assert_eq!(tables.ranks.len(), 30);
        assert_eq!(tables.character_name(8).unwrap(), "Kazuya");
    }
}
