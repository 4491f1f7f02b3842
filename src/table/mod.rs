//! In-memory prediction table with per-image indexes.
//!
//! The table is loaded once from delimited text and never changes shape
//! afterwards. Only `label_new` is writable, through [`ReviewTable::set_label_new`].
//!
//! ## Indexes
//!
//! Each image gets three lookups built at load time:
//! - flagged `error_id` -> row (ordered)
//! - `(grid_x, grid_y)` -> row
//! - `grid_id` -> row
//!
//! Duplicate keys in any of them reject the table.

mod row;

pub use row::{ArtifactFlag, ErrorId, GridId, InitialLabel, ReviewRow};

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{LookupKey, ReviewError};
use row::RawRow;

/// Lookups for the rows of a single image.
#[derive(Debug, Default)]
struct ImageIndex {
    errors: BTreeMap<ErrorId, usize>,
    tiles: HashMap<(u32, u32), usize>,
    grids: HashMap<GridId, usize>,
}

/// The review table: model output per image tile plus reviewer labels.
#[derive(Debug)]
pub struct ReviewTable {
    rows: Vec<ReviewRow>,
    images: HashMap<String, ImageIndex>,
}

impl ReviewTable {
    /// Build a table from rows, validating per-image uniqueness.
    pub fn from_rows(rows: Vec<ReviewRow>) -> Result<Self, ReviewError> {
        let mut images: HashMap<String, ImageIndex> = HashMap::new();

        for (i, row) in rows.iter().enumerate() {
            let index = images.entry(row.image_name.clone()).or_default();

            if index.tiles.insert((row.grid_x, row.grid_y), i).is_some() {
                return Err(ReviewError::invalid_table(format!(
                    "duplicate tile ({}, {}) in image '{}'",
                    row.grid_x, row.grid_y, row.image_name
                )));
            }
            if index.grids.insert(row.grid_id, i).is_some() {
                return Err(ReviewError::invalid_table(format!(
                    "duplicate grid_id {} in image '{}'",
                    row.grid_id, row.image_name
                )));
            }
            if row.is_flagged() && index.errors.insert(row.error_id, i).is_some() {
                return Err(ReviewError::invalid_table(format!(
                    "duplicate error_id {} in image '{}'",
                    row.error_id, row.image_name
                )));
            }
        }

        Ok(Self { rows, images })
    }

    /// Parse a table from any reader of comma-delimited text with a header row.
    pub fn from_reader<R: Read>(reader: R, initial: InitialLabel) -> Result<Self, ReviewError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let rows = csv_reader
            .deserialize::<RawRow>()
            .map(|raw| raw.map(|raw| raw.into_row(initial)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(rows)
    }

    /// Load a table from a file.
    pub fn load(path: &Path, initial: InitialLabel) -> Result<Self, ReviewError> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(std::io::BufReader::new(file), initial)?;
        log::info!(
            "Loaded {} rows for {} images from {:?}",
            table.len(),
            table.images.len(),
            path
        );
        Ok(table)
    }

    /// Write every row, including `label_new`, as comma-delimited text.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), ReviewError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the table to a file, replacing it.
    pub fn write_csv(&self, path: &Path) -> Result<(), ReviewError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path)?;
        self.to_writer(std::io::BufWriter::new(file))?;
        log::info!("Exported {} rows to {:?}", self.rows.len(), path);
        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in load order.
    pub fn rows(&self) -> &[ReviewRow] {
        &self.rows
    }

    /// Whether any row belongs to the image.
    pub fn contains_image(&self, image: &str) -> bool {
        self.images.contains_key(image)
    }

    /// Flagged error ids of an image in ascending order. Empty for unknown images.
    pub fn error_ids(&self, image: &str) -> Vec<ErrorId> {
        self.images
            .get(image)
            .map(|index| index.errors.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Row of a flagged error region.
    pub fn row_by_error(&self, image: &str, error_id: ErrorId) -> Result<&ReviewRow, ReviewError> {
        self.index(image)
            .and_then(|index| index.errors.get(&error_id))
            .map(|&i| &self.rows[i])
            .ok_or_else(|| ReviewError::lookup_miss(image, LookupKey::ErrorId(error_id)))
    }

    /// Row of the tile whose top-left corner is `(grid_x, grid_y)`.
    pub fn row_at_tile(&self, image: &str, grid_x: u32, grid_y: u32) -> Result<&ReviewRow, ReviewError> {
        self.index(image)
            .and_then(|index| index.tiles.get(&(grid_x, grid_y)))
            .map(|&i| &self.rows[i])
            .ok_or_else(|| {
                ReviewError::lookup_miss(image, LookupKey::Tile { x: grid_x, y: grid_y })
            })
    }

    /// Row of a grid tile by id.
    pub fn row_by_grid(&self, image: &str, grid_id: GridId) -> Result<&ReviewRow, ReviewError> {
        self.grid_position(image, grid_id).map(|i| &self.rows[i])
    }

    /// Set the reviewer label of a tile and return the updated row.
    pub fn set_label_new(
        &mut self,
        image: &str,
        grid_id: GridId,
        flag: ArtifactFlag,
    ) -> Result<&ReviewRow, ReviewError> {
        let i = self.grid_position(image, grid_id)?;
        let row = &mut self.rows[i];
        if row.label_new != flag {
            log::debug!(
                "label_new of {}/{}: {} -> {}",
                image,
                grid_id,
                row.label_new,
                flag
            );
        }
        row.label_new = flag;
        Ok(&self.rows[i])
    }

    /// Number of rows whose reviewer label differs from the original label.
    pub fn changed_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_changed()).count()
    }

    fn index(&self, image: &str) -> Option<&ImageIndex> {
        self.images.get(image)
    }

    fn grid_position(&self, image: &str, grid_id: GridId) -> Result<usize, ReviewError> {
        self.index(image)
            .and_then(|index| index.grids.get(&grid_id))
            .copied()
            .ok_or_else(|| ReviewError::lookup_miss(image, LookupKey::GridId(grid_id)))
    }
}
