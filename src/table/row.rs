//! Row and label types of the prediction table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::UNFLAGGED_ERROR_ID;

/// Per-image identifier of a flagged region (`-1` when the tile is not flagged).
pub type ErrorId = i64;

/// Identifier of a grid tile within an image.
pub type GridId = i64;

/// Binary classification of a tile.
///
/// Stored in the table as `1` (artifact) and `0` (no artifact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ArtifactFlag {
    /// The tile contains no artifact
    NoArtifact,
    /// The tile contains an artifact
    Artifact,
}

impl ArtifactFlag {
    /// Get the display name used by the label toggle.
    pub fn name(&self) -> &'static str {
        match self {
            ArtifactFlag::NoArtifact => "no artifact",
            ArtifactFlag::Artifact => "artifact",
        }
    }

    /// The opposite classification.
    pub fn toggled(self) -> Self {
        match self {
            ArtifactFlag::NoArtifact => ArtifactFlag::Artifact,
            ArtifactFlag::Artifact => ArtifactFlag::NoArtifact,
        }
    }
}

impl TryFrom<i64> for ArtifactFlag {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ArtifactFlag::NoArtifact),
            1 => Ok(ArtifactFlag::Artifact),
            other => Err(format!("label must be 0 or 1, got {}", other)),
        }
    }
}

impl From<ArtifactFlag> for i64 {
    fn from(flag: ArtifactFlag) -> Self {
        match flag {
            ArtifactFlag::NoArtifact => 0,
            ArtifactFlag::Artifact => 1,
        }
    }
}

impl fmt::Display for ArtifactFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", i64::from(*self))
    }
}

/// Which column seeds `label_new` when the table does not carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialLabel {
    /// Start from the original label
    #[default]
    Label,
    /// Start from the model prediction
    Preds,
}

/// Row as it appears on disk, where `label_new` may be missing.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawRow {
    pub image_name: String,
    pub error_id: ErrorId,
    pub grid_id: GridId,
    pub grid_x: u32,
    pub grid_y: u32,
    pub label: ArtifactFlag,
    pub preds: ArtifactFlag,
    pub scores: f64,
    pub confmat_labels: String,
    #[serde(default)]
    pub label_new: Option<ArtifactFlag>,
}

impl RawRow {
    pub(crate) fn into_row(self, initial: InitialLabel) -> ReviewRow {
        let seed = match initial {
            InitialLabel::Label => self.label,
            InitialLabel::Preds => self.preds,
        };
        ReviewRow {
            label_new: self.label_new.unwrap_or(seed),
            image_name: self.image_name,
            error_id: self.error_id,
            grid_id: self.grid_id,
            grid_x: self.grid_x,
            grid_y: self.grid_y,
            label: self.label,
            preds: self.preds,
            scores: self.scores,
            confmat_labels: self.confmat_labels,
        }
    }
}

/// One grid tile of one image with its model output and reviewer label.
///
/// Field order matches the display columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRow {
    /// Flagged region id, or `-1`
    pub error_id: ErrorId,
    /// Grid tile id
    pub grid_id: GridId,
    /// Image the tile belongs to (file stem)
    pub image_name: String,
    /// Left edge of the tile
    pub grid_x: u32,
    /// Top edge of the tile
    pub grid_y: u32,
    /// Original label
    pub label: ArtifactFlag,
    /// Model prediction
    pub preds: ArtifactFlag,
    /// Model score
    pub scores: f64,
    /// Confusion-matrix category of the prediction
    pub confmat_labels: String,
    /// Reviewer-corrected label
    pub label_new: ArtifactFlag,
}

impl ReviewRow {
    /// Whether the tile is a flagged error region.
    pub fn is_flagged(&self) -> bool {
        self.error_id != UNFLAGGED_ERROR_ID
    }

    /// Whether the reviewer label differs from the original label.
    pub fn is_changed(&self) -> bool {
        self.label_new != self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_conversion() {
        assert_eq!(ArtifactFlag::try_from(1), Ok(ArtifactFlag::Artifact));
        assert_eq!(ArtifactFlag::try_from(0), Ok(ArtifactFlag::NoArtifact));
        assert!(ArtifactFlag::try_from(2).is_err());
        assert_eq!(i64::from(ArtifactFlag::Artifact), 1);
    }

    #[test]
    fn test_toggled() {
        assert_eq!(ArtifactFlag::Artifact.toggled(), ArtifactFlag::NoArtifact);
        assert_eq!(ArtifactFlag::NoArtifact.toggled(), ArtifactFlag::Artifact);
    }

    #[test]
    fn test_missing_label_new_seeded() {
        let raw = RawRow {
            image_name: "img".to_string(),
            error_id: 0,
            grid_id: 1,
            grid_x: 0,
            grid_y: 0,
            label: ArtifactFlag::NoArtifact,
            preds: ArtifactFlag::Artifact,
            scores: 0.9,
            confmat_labels: "FP".to_string(),
            label_new: None,
        };

        let from_label = raw.clone().into_row(InitialLabel::Label);
        assert_eq!(from_label.label_new, ArtifactFlag::NoArtifact);
        assert!(!from_label.is_changed());

        let from_preds = raw.into_row(InitialLabel::Preds);
        assert_eq!(from_preds.label_new, ArtifactFlag::Artifact);
        assert!(from_preds.is_changed());
    }
}
