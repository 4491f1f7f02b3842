//! Traversal over the ordered `(image, error_id)` address space and the
//! lookups that derive one selection field from another.
//!
//! Everything here is a pure function of its inputs. Images without any
//! flagged tile are skipped when stepping between images. Stepping past the
//! first or last image returns [`ReviewError::BoundaryOverrun`]; callers keep
//! their current selection in that case.

use std::collections::HashMap;
use std::fmt;

use crate::error::{LookupKey, ReviewError};
use crate::table::{ArtifactFlag, ErrorId, GridId, ReviewRow, ReviewTable};

/// Source of the ordered flagged error ids of each image.
pub trait ErrorSource {
    /// Flagged error ids of `image` in ascending order.
    fn error_ids(&self, image: &str) -> Vec<ErrorId>;
}

impl ErrorSource for ReviewTable {
    fn error_ids(&self, image: &str) -> Vec<ErrorId> {
        ReviewTable::error_ids(self, image)
    }
}

impl ErrorSource for HashMap<String, Vec<ErrorId>> {
    fn error_ids(&self, image: &str) -> Vec<ErrorId> {
        self.get(image).cloned().unwrap_or_default()
    }
}

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards later images/errors
    Forward,
    /// Towards earlier images/errors
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// A flagged region: image plus error id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Image name
    pub image: String,
    /// Flagged error id within the image
    pub error_id: ErrorId,
}

impl Address {
    /// Create a new address.
    pub fn new(image: impl Into<String>, error_id: ErrorId) -> Self {
        Self {
            image: image.into(),
            error_id,
        }
    }
}

/// Next flagged region after `(current_image, current_error_id)`.
pub fn next_error<S: ErrorSource>(
    current_image: &str,
    current_error_id: ErrorId,
    errors: &S,
    image_order: &[String],
) -> Result<Address, ReviewError> {
    step_error(
        current_image,
        current_error_id,
        errors,
        image_order,
        Direction::Forward,
    )
}

/// Previous flagged region before `(current_image, current_error_id)`.
pub fn prev_error<S: ErrorSource>(
    current_image: &str,
    current_error_id: ErrorId,
    errors: &S,
    image_order: &[String],
) -> Result<Address, ReviewError> {
    step_error(
        current_image,
        current_error_id,
        errors,
        image_order,
        Direction::Backward,
    )
}

fn step_error<S: ErrorSource>(
    current_image: &str,
    current_error_id: ErrorId,
    errors: &S,
    image_order: &[String],
    direction: Direction,
) -> Result<Address, ReviewError> {
    let ids = errors.error_ids(current_image);
    let pos = ids
        .iter()
        .position(|&id| id == current_error_id)
        .ok_or_else(|| {
            ReviewError::lookup_miss(current_image, LookupKey::ErrorId(current_error_id))
        })?;

    let within = match direction {
        Direction::Forward => ids.get(pos + 1),
        Direction::Backward => pos.checked_sub(1).and_then(|p| ids.get(p)),
    };

    match within {
        Some(&error_id) => Ok(Address::new(current_image, error_id)),
        None => step_image(current_image, errors, image_order, direction),
    }
}

/// First region of the next image (forward) or last region of the previous
/// image (backward) that has any flagged tile.
pub fn step_image<S: ErrorSource>(
    current_image: &str,
    errors: &S,
    image_order: &[String],
    direction: Direction,
) -> Result<Address, ReviewError> {
    let pos = image_order
        .iter()
        .position(|name| name == current_image)
        .ok_or_else(|| ReviewError::lookup_miss(current_image, LookupKey::Image))?;

    let candidates: Box<dyn Iterator<Item = &String> + '_> = match direction {
        Direction::Forward => Box::new(image_order[pos + 1..].iter()),
        Direction::Backward => Box::new(image_order[..pos].iter().rev()),
    };

    for image in candidates {
        let ids = errors.error_ids(image);
        let picked = match direction {
            Direction::Forward => ids.first(),
            Direction::Backward => ids.last(),
        };
        if let Some(&error_id) = picked {
            return Ok(Address::new(image.clone(), error_id));
        }
        log::trace!("Skipping image '{}' without flagged tiles", image);
    }

    Err(ReviewError::boundary(current_image, direction))
}

/// First flagged region in the whole ordering.
pub fn first_error<S: ErrorSource>(errors: &S, image_order: &[String]) -> Option<Address> {
    image_order.iter().find_map(|image| {
        errors
            .error_ids(image)
            .first()
            .map(|&error_id| Address::new(image.clone(), error_id))
    })
}

/// Slider position `(grid_x, grid_y)` of a flagged region.
pub fn update_slider_from_error(
    table: &ReviewTable,
    image: &str,
    error_id: ErrorId,
) -> Result<(u32, u32), ReviewError> {
    let row = table.row_by_error(image, error_id)?;
    Ok((row.grid_x, row.grid_y))
}

/// Error id selected by a slider position.
///
/// An unflagged tile keeps `previous`.
pub fn update_error_from_slider(
    table: &ReviewTable,
    image: &str,
    grid_x: u32,
    grid_y: u32,
    previous: Option<ErrorId>,
) -> Result<Option<ErrorId>, ReviewError> {
    let row = table.row_at_tile(image, grid_x, grid_y)?;
    if row.is_flagged() {
        Ok(Some(row.error_id))
    } else {
        Ok(previous)
    }
}

/// Grid id of the tile at a slider position.
pub fn update_grid_id(
    table: &ReviewTable,
    image: &str,
    grid_x: u32,
    grid_y: u32,
) -> Result<GridId, ReviewError> {
    Ok(table.row_at_tile(image, grid_x, grid_y)?.grid_id)
}

/// Current reviewer label of a tile.
pub fn lookup_label(
    table: &ReviewTable,
    image: &str,
    grid_id: GridId,
) -> Result<ArtifactFlag, ReviewError> {
    Ok(table.row_by_grid(image, grid_id)?.label_new)
}

/// Set the reviewer label of a tile and return its display fields.
pub fn apply_label(
    table: &mut ReviewTable,
    image: &str,
    grid_id: GridId,
    flag: ArtifactFlag,
) -> Result<ReviewRow, ReviewError> {
    table.set_label_new(image, grid_id, flag).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(image: &str, error_id: ErrorId, grid_id: GridId, x: u32, y: u32) -> ReviewRow {
        ReviewRow {
            error_id,
            grid_id,
            image_name: image.to_string(),
            grid_x: x,
            grid_y: y,
            label: ArtifactFlag::Artifact,
            preds: ArtifactFlag::Artifact,
            scores: 0.5,
            confmat_labels: "TP".to_string(),
            label_new: ArtifactFlag::Artifact,
        }
    }

    fn table() -> ReviewTable {
        ReviewTable::from_rows(vec![
            row("img1", 0, 10, 0, 0),
            row("img1", 1, 11, 200, 0),
            row("img1", 2, 12, 400, 0),
            row("img1", -1, 13, 600, 0),
            row("img2", 0, 20, 0, 200),
            row("img2", 1, 21, 200, 200),
            row("img4", 0, 40, 0, 0),
        ])
        .unwrap()
    }

    fn order() -> Vec<String> {
        ["img1", "img2", "img3", "img4"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_next_within_image() {
        let next = next_error("img1", 0, &table(), &order()).unwrap();
        assert_eq!(next, Address::new("img1", 1));
    }

    #[test]
    fn test_next_moves_to_next_image() {
        let next = next_error("img1", 2, &table(), &order()).unwrap();
        assert_eq!(next, Address::new("img2", 0));
    }

    #[test]
    fn test_prev_moves_to_last_of_previous_image() {
        let prev = prev_error("img2", 0, &table(), &order()).unwrap();
        assert_eq!(prev, Address::new("img1", 2));
    }

    #[test]
    fn test_images_without_errors_skipped() {
        let table = table();
        assert_eq!(
            next_error("img2", 1, &table, &order()).unwrap(),
            Address::new("img4", 0)
        );
        assert_eq!(
            prev_error("img4", 0, &table, &order()).unwrap(),
            Address::new("img2", 1)
        );
    }

    #[test]
    fn test_boundaries() {
        let table = table();
        let err = next_error("img4", 0, &table, &order()).unwrap_err();
        assert!(matches!(
            err,
            ReviewError::BoundaryOverrun {
                direction: Direction::Forward,
                ..
            }
        ));
        assert!(prev_error("img1", 0, &table, &order()).unwrap_err().is_boundary());
    }

    #[test]
    fn test_next_prev_round_trip() {
        let table = table();
        let order = order();
        let start = [("img1", 0), ("img1", 1), ("img1", 2), ("img2", 0), ("img2", 1)];
        for (image, error_id) in start {
            let next = next_error(image, error_id, &table, &order).unwrap();
            let back = prev_error(&next.image, next.error_id, &table, &order).unwrap();
            assert_eq!(back, Address::new(image, error_id));
        }
    }

    #[test]
    fn test_unknown_error_is_lookup_miss() {
        let err = next_error("img1", 7, &table(), &order()).unwrap_err();
        assert!(matches!(err, ReviewError::LookupMiss { .. }));
    }

    #[test]
    fn test_map_error_source() {
        let mut lists: HashMap<String, Vec<ErrorId>> = HashMap::new();
        lists.insert("a".to_string(), vec![3, 5]);
        lists.insert("b".to_string(), vec![1]);
        let order = vec!["a".to_string(), "b".to_string()];

        assert_eq!(next_error("a", 3, &lists, &order).unwrap(), Address::new("a", 5));
        assert_eq!(next_error("a", 5, &lists, &order).unwrap(), Address::new("b", 1));
        assert_eq!(first_error(&lists, &order), Some(Address::new("a", 3)));
    }

    #[test]
    fn test_slider_round_trip() {
        let table = table();
        for error_id in [0, 1, 2] {
            let (x, y) = update_slider_from_error(&table, "img1", error_id).unwrap();
            let back = update_error_from_slider(&table, "img1", x, y, None).unwrap();
            assert_eq!(back, Some(error_id));
        }
    }

    #[test]
    fn test_unflagged_tile_keeps_previous_error() {
        let table = table();
        let kept = update_error_from_slider(&table, "img1", 600, 0, Some(2)).unwrap();
        assert_eq!(kept, Some(2));
    }

    #[test]
    fn test_grid_id_from_slider() {
        assert_eq!(update_grid_id(&table(), "img1", 400, 0).unwrap(), 12);
        assert!(update_grid_id(&table(), "img1", 800, 0).is_err());
    }

    #[test]
    fn test_apply_then_lookup() {
        let mut table = table();
        let row = apply_label(&mut table, "img1", 11, ArtifactFlag::NoArtifact).unwrap();
        assert_eq!(row.grid_id, 11);
        assert_eq!(row.label_new, ArtifactFlag::NoArtifact);
        assert_eq!(
            lookup_label(&table, "img1", 11).unwrap(),
            ArtifactFlag::NoArtifact
        );
    }
}
