//! Owned review session state.
//!
//! All selection fields live here and are only written through setters that
//! publish a [`FieldChange`] when the value actually changes. Published
//! changes queue up in FIFO order until the application dispatches them.

use std::collections::VecDeque;

use crate::events::{Field, FieldChange, FieldValue};
use crate::table::{ArtifactFlag, ErrorId, GridId, ReviewTable};

/// Current values of the selection widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Selected image
    pub image: Option<String>,
    /// Selected error region
    pub error_id: Option<ErrorId>,
    /// Tile id resolved from the sliders
    pub grid_id: Option<GridId>,
    /// Horizontal slider
    pub grid_x: u32,
    /// Vertical slider
    pub grid_y: u32,
    /// Label toggle
    pub artifact: Option<ArtifactFlag>,
}

/// Slider position a debounced lookup was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileQuery {
    /// Image the sliders were on
    pub image: String,
    /// Horizontal slider value
    pub grid_x: u32,
    /// Vertical slider value
    pub grid_y: u32,
}

/// Tile the current `grid_id` was resolved for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTile {
    /// Image of the tile
    pub image: String,
    /// Left edge
    pub grid_x: u32,
    /// Top edge
    pub grid_y: u32,
    /// Tile id
    pub grid_id: GridId,
}

/// Table, image ordering and selection of one review session.
#[derive(Debug)]
pub struct SessionState {
    table: ReviewTable,
    image_order: Vec<String>,
    selection: Selection,
    error_options: Vec<ErrorId>,
    resolved: Option<ResolvedTile>,
    changes: VecDeque<FieldChange>,
}

impl SessionState {
    /// Create a session over a table and an image ordering.
    pub fn new(table: ReviewTable, image_order: Vec<String>) -> Self {
        Self {
            table,
            image_order,
            selection: Selection::default(),
            error_options: Vec::new(),
            resolved: None,
            changes: VecDeque::new(),
        }
    }

    /// The review table.
    pub fn table(&self) -> &ReviewTable {
        &self.table
    }

    /// The review table, for label writes.
    pub fn table_mut(&mut self) -> &mut ReviewTable {
        &mut self.table
    }

    /// Image names in navigation order.
    pub fn image_order(&self) -> &[String] {
        &self.image_order
    }

    /// Listed images the table has no rows for.
    pub fn images_without_rows(&self) -> Vec<&str> {
        self.image_order
            .iter()
            .filter(|name| !self.table.contains_image(name))
            .map(String::as_str)
            .collect()
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Error ids offered for the selected image.
    pub fn error_options(&self) -> &[ErrorId] {
        &self.error_options
    }

    /// Tile the current grid id belongs to, once resolved.
    pub fn resolved(&self) -> Option<&ResolvedTile> {
        self.resolved.as_ref()
    }

    /// Slider position of the selected image, if an image is selected.
    pub fn tile_query(&self) -> Option<TileQuery> {
        self.selection.image.as_ref().map(|image| TileQuery {
            image: image.clone(),
            grid_x: self.selection.grid_x,
            grid_y: self.selection.grid_y,
        })
    }

    /// Whether the resolved grid id belongs to the current slider position.
    pub fn is_settled(&self) -> bool {
        match (&self.resolved, &self.selection.image) {
            (Some(tile), Some(image)) => {
                tile.image == *image
                    && tile.grid_x == self.selection.grid_x
                    && tile.grid_y == self.selection.grid_y
            }
            _ => false,
        }
    }

    /// Next queued change, oldest first.
    pub fn pop_change(&mut self) -> Option<FieldChange> {
        self.changes.pop_front()
    }

    /// Whether changes are waiting to be dispatched.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    fn publish(&mut self, field: Field, value: FieldValue) {
        self.changes.push_back(FieldChange::new(field, value));
    }

    /// Select an image.
    ///
    /// The resolved tile belongs to the old image and is dropped until a
    /// lookup on the new one succeeds.
    pub fn set_image(&mut self, image: &str) {
        if self.selection.image.as_deref() == Some(image) {
            return;
        }
        self.selection.image = Some(image.to_string());
        self.clear_resolved();
        self.publish(Field::Image, FieldValue::Image(image.to_string()));
    }

    /// Replace the error options offered for the selected image.
    pub fn set_error_options(&mut self, options: Vec<ErrorId>) {
        self.error_options = options;
    }

    /// Select an error region (or none).
    pub fn set_error_id(&mut self, error_id: Option<ErrorId>) {
        if self.selection.error_id == error_id {
            return;
        }
        self.selection.error_id = error_id;
        self.publish(Field::ErrorId, FieldValue::ErrorId(error_id));
    }

    /// Move the horizontal slider.
    pub fn set_grid_x(&mut self, value: u32) {
        if self.selection.grid_x == value {
            return;
        }
        self.selection.grid_x = value;
        self.publish(Field::GridX, FieldValue::Coord(value));
    }

    /// Move the vertical slider.
    pub fn set_grid_y(&mut self, value: u32) {
        if self.selection.grid_y == value {
            return;
        }
        self.selection.grid_y = value;
        self.publish(Field::GridY, FieldValue::Coord(value));
    }

    /// Record the grid id resolved for a slider position.
    ///
    /// Publishes when the id changes or when it now belongs to a different
    /// tile than before (same id on another image).
    pub fn resolve_grid_id(&mut self, query: &TileQuery, grid_id: GridId) {
        let tile = ResolvedTile {
            image: query.image.clone(),
            grid_x: query.grid_x,
            grid_y: query.grid_y,
            grid_id,
        };
        let tile_changed = self.resolved.as_ref() != Some(&tile);
        let id_changed = self.selection.grid_id != Some(grid_id);

        self.selection.grid_id = Some(grid_id);
        self.resolved = Some(tile);

        if id_changed || tile_changed {
            self.publish(Field::GridId, FieldValue::GridId(grid_id));
        }
    }

    /// Forget the resolved tile, e.g. after a lookup found no row under the
    /// sliders.
    pub fn clear_resolved(&mut self) {
        self.resolved = None;
        self.selection.grid_id = None;
    }

    /// Set the label toggle.
    pub fn set_artifact(&mut self, flag: ArtifactFlag) {
        if self.selection.artifact == Some(flag) {
            return;
        }
        self.selection.artifact = Some(flag);
        self.publish(Field::Artifact, FieldValue::Artifact(flag));
    }

    /// 1-based position of the selected image among images with flagged
    /// tiles, as `(index, count)`.
    pub fn image_progress(&self) -> Option<(usize, usize)> {
        let image = self.selection.image.as_deref()?;
        let reviewable: Vec<&String> = self
            .image_order
            .iter()
            .filter(|name| !self.table.error_ids(name).is_empty())
            .collect();
        let pos = reviewable.iter().position(|name| name.as_str() == image)?;
        Some((pos + 1, reviewable.len()))
    }

    /// 1-based position of the selected error within its image.
    pub fn error_progress(&self) -> Option<(usize, usize)> {
        let error_id = self.selection.error_id?;
        let pos = self.error_options.iter().position(|&id| id == error_id)?;
        Some((pos + 1, self.error_options.len()))
    }
}
