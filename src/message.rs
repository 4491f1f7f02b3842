//! Application message types.
//!
//! Every reviewer input is a message in the Elm architecture style. Messages
//! only write selection fields; derived state follows through field change
//! events.

use crate::table::{ArtifactFlag, ErrorId};

/// Messages that update the review session.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Image dropdown changed
    SelectImage(String),
    /// Error dropdown changed
    SelectError(ErrorId),
    /// Horizontal slider moved
    SetGridX(u32),
    /// Vertical slider moved
    SetGridY(u32),
    /// Label toggle changed
    SetArtifact(ArtifactFlag),
    /// Flip the label toggle
    ToggleArtifact,
    /// Go to the next flagged region
    Next,
    /// Go to the previous flagged region
    Prev,
}
