//! JSONL (JSON Lines) match rows.
//!
//! Each line is one flat match row. Blank lines are ignored and lines that
//! fail to parse are skipped with a warning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{RowSource, StorageError};
use crate::models::{MatchRecord, MatchRow};

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all entities from the file.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        index + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Count the lines `read_all` would return, without keeping them.
    pub fn count_valid(&self) -> Result<usize, StorageError> {
        if !self.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        let mut count = 0;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if !line.trim().is_empty() && serde_json::from_str::<T>(&line).is_ok() {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Match rows stored as JSONL.
pub struct JsonlMatchSource {
    reader: JsonlReader<MatchRow>,
}

impl JsonlMatchSource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            reader: JsonlReader::new(path),
        }
    }
}

impl RowSource for JsonlMatchSource {
    fn row_count(&self) -> Result<usize, StorageError> {
        self.reader.count_valid()
    }

    fn read_matches(&self) -> Result<Vec<MatchRecord>, StorageError> {
        let rows = self.reader.read_all()?;
        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }
}
