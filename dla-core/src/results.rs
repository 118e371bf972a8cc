//! Storage of gyration results across runs.
//!
//! Results are kept one row per atom count, with one radius column per
//! [`Layout`]. Recording a sample only touches the column of its layout.
//! [`GyrationTable`] is the in-memory table; [`JsonStore`] persists it to a
//! JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{error::StoreError, layout::Layout};

/// Outcome of one finished run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GyrationSample {
    pub atoms: usize,
    pub layout: Layout,
    pub radius: f64,
}

/// Anything that accepts finished-run results.
pub trait GyrationSink {
    fn record(&mut self, sample: &GyrationSample) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GyrationRow {
    pub atoms: usize,
    pub cube: Option<f64>,
    pub sphere: Option<f64>,
    pub random: Option<f64>,
}

impl GyrationRow {
    pub fn new(atoms: usize) -> Self {
        Self {
            atoms,
            ..Self::default()
        }
    }

    pub fn get(&self, layout: Layout) -> Option<f64> {
        match layout {
            Layout::Cube => self.cube,
            Layout::Sphere => self.sphere,
            Layout::Random => self.random,
        }
    }

    pub fn set(&mut self, layout: Layout, radius: f64) {
        let slot = match layout {
            Layout::Cube => &mut self.cube,
            Layout::Sphere => &mut self.sphere,
            Layout::Random => &mut self.random,
        };
        *slot = Some(radius);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GyrationTable {
    rows: BTreeMap<usize, GyrationRow>,
}

impl GyrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or updates the row for `sample.atoms`.
    pub fn upsert(&mut self, sample: &GyrationSample) -> &GyrationRow {
        let row = self
            .rows
            .entry(sample.atoms)
            .or_insert_with(|| GyrationRow::new(sample.atoms));
        row.set(sample.layout, sample.radius);
        row
    }

    pub fn get(&self, atoms: usize) -> Option<&GyrationRow> {
        self.rows.get(&atoms)
    }

    /// Rows in ascending atom count.
    pub fn rows(&self) -> impl Iterator<Item = &GyrationRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(atoms, radius)` pairs for every row that has a value for `layout`.
    pub fn with_layout(&self, layout: Layout) -> Vec<(usize, f64)> {
        self.rows
            .values()
            .filter_map(|row| row.get(layout).map(|r| (row.atoms, r)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

impl GyrationSink for GyrationTable {
    fn record(&mut self, sample: &GyrationSample) -> Result<(), StoreError> {
        self.upsert(sample);
        Ok(())
    }
}

/// A [`GyrationTable`] backed by a JSON file, rewritten on every change.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    table: GyrationTable,
}

impl JsonStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let table = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => GyrationTable::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => GyrationTable::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!("opened result store {} with {} rows", path.display(), table.len());
        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &GyrationTable {
        &self.table
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.table)?;
        std::fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Deletes every row and persists the empty table.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.table.clear();
        self.save()
    }
}

impl GyrationSink for JsonStore {
    fn record(&mut self, sample: &GyrationSample) -> Result<(), StoreError> {
        self.table.upsert(sample);
        self.save()
    }
}
