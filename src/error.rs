//! Error types for review session operations.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::navigation::Direction;
use crate::table::{ErrorId, GridId};

/// Key used for a table lookup that found no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Lookup by flagged error id
    ErrorId(ErrorId),
    /// Lookup by grid tile id
    GridId(GridId),
    /// Lookup by tile position
    Tile {
        /// Left edge of the tile
        x: u32,
        /// Top edge of the tile
        y: u32,
    },
    /// The image itself is not part of the ordering
    Image,
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::ErrorId(id) => write!(f, "error_id {}", id),
            LookupKey::GridId(id) => write!(f, "grid_id {}", id),
            LookupKey::Tile { x, y } => write!(f, "tile ({}, {})", x, y),
            LookupKey::Image => write!(f, "image entry"),
        }
    }
}

/// Errors that can occur while loading or reviewing a prediction table.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited text
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Table content violates a structural invariant
    #[error("Invalid review table: {message}")]
    InvalidTable {
        /// Description of the violation
        message: String,
    },

    /// Requested address does not exist in the table
    #[error("No row for image '{image}' with {key}")]
    LookupMiss {
        /// Image that was searched
        image: String,
        /// What was searched for
        key: LookupKey,
    },

    /// Navigation ran past the first or last image
    #[error("Cannot move {direction} past image '{image}'")]
    BoundaryOverrun {
        /// Image at the boundary
        image: String,
        /// Direction of the attempted move
        direction: Direction,
    },

    /// Image file missing or undecodable
    #[error("Failed to load image {path:?}: {message}")]
    ImageLoad {
        /// Path of the image
        path: PathBuf,
        /// Decoder or filesystem message
        message: String,
    },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ReviewError {
    /// Create an invalid table error with a message.
    pub fn invalid_table(message: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: message.into(),
        }
    }

    /// Create a lookup miss for an image and key.
    pub fn lookup_miss(image: impl Into<String>, key: LookupKey) -> Self {
        Self::LookupMiss {
            image: image.into(),
            key,
        }
    }

    /// Create a boundary overrun error.
    pub fn boundary(image: impl Into<String>, direction: Direction) -> Self {
        Self::BoundaryOverrun {
            image: image.into(),
            direction,
        }
    }

    /// Whether this error comes from navigating past the ends of the image list.
    pub fn is_boundary(&self) -> bool {
        matches!(self, Self::BoundaryOverrun { .. })
    }
}
