//! Field change events and per-field subscriptions.
//!
//! Every selection field publishes a [`FieldChange`] when its value actually
//! changes. The [`EventBus`] maps each field to the ordered list of
//! [`Reaction`]s that re-derive dependent state. The standard wiring is:
//!
//! | Field      | Reactions                                            |
//! |------------|------------------------------------------------------|
//! | `Image`    | refresh error options, schedule grid id lookup       |
//! | `ErrorId`  | move sliders to the error's tile                     |
//! | `GridX/Y`  | schedule grid id lookup, schedule error id lookup    |
//! | `GridId`   | refresh label, render preview, render row            |
//! | `Artifact` | apply label                                          |

use std::collections::HashMap;
use std::fmt;

use crate::table::{ArtifactFlag, ErrorId, GridId};

/// A selection field that can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Selected image
    Image,
    /// Selected error region
    ErrorId,
    /// Horizontal slider
    GridX,
    /// Vertical slider
    GridY,
    /// Resolved tile id
    GridId,
    /// Label toggle
    Artifact,
}

/// New value carried by a change event.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Image name
    Image(String),
    /// Error id, or none for an image without flagged tiles
    ErrorId(Option<ErrorId>),
    /// Slider position
    Coord(u32),
    /// Tile id
    GridId(GridId),
    /// Label
    Artifact(ArtifactFlag),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Image(name) => write!(f, "{}", name),
            FieldValue::ErrorId(Some(id)) => write!(f, "{}", id),
            FieldValue::ErrorId(None) => write!(f, "-"),
            FieldValue::Coord(value) => write!(f, "{}", value),
            FieldValue::GridId(id) => write!(f, "{}", id),
            FieldValue::Artifact(flag) => write!(f, "{}", flag.name()),
        }
    }
}

/// A `(field, new value)` event.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Field that changed
    pub field: Field,
    /// Its new value
    pub value: FieldValue,
}

impl FieldChange {
    /// Create a change event.
    pub fn new(field: Field, value: FieldValue) -> Self {
        Self { field, value }
    }
}

/// Work triggered by a field change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// Reload the error options of the selected image and select the first
    RefreshErrorOptions,
    /// Move the sliders to the selected error's tile
    SyncSliderFromError,
    /// Debounced: resolve the grid id under the sliders
    ScheduleGridIdLookup,
    /// Debounced: resolve the error id under the sliders
    ScheduleErrorLookup,
    /// Load the reviewer label of the resolved tile into the toggle
    RefreshLabel,
    /// Render the resolved tile crop
    RenderPreview,
    /// Render the resolved tile's table row
    RenderRow,
    /// Write the toggle value into the table
    ApplyLabel,
}

/// Ordered per-field subscriptions.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscriptions: HashMap<Field, Vec<Reaction>>,
}

impl EventBus {
    /// Create a bus without subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus with the reviewer's standard wiring.
    pub fn standard() -> Self {
        let mut bus = Self::new();
        bus.subscribe(Field::Image, Reaction::RefreshErrorOptions);
        bus.subscribe(Field::Image, Reaction::ScheduleGridIdLookup);
        bus.subscribe(Field::ErrorId, Reaction::SyncSliderFromError);
        bus.subscribe(Field::GridX, Reaction::ScheduleGridIdLookup);
        bus.subscribe(Field::GridY, Reaction::ScheduleGridIdLookup);
        bus.subscribe(Field::GridX, Reaction::ScheduleErrorLookup);
        bus.subscribe(Field::GridY, Reaction::ScheduleErrorLookup);
        bus.subscribe(Field::GridId, Reaction::RefreshLabel);
        bus.subscribe(Field::GridId, Reaction::RenderPreview);
        bus.subscribe(Field::GridId, Reaction::RenderRow);
        bus.subscribe(Field::Artifact, Reaction::ApplyLabel);
        bus
    }

    /// Append a reaction to a field's subscriptions.
    pub fn subscribe(&mut self, field: Field, reaction: Reaction) {
        self.subscriptions.entry(field).or_default().push(reaction);
    }

    /// Reactions for a field, in subscription order.
    pub fn reactions(&self, field: Field) -> &[Reaction] {
        self.subscriptions
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_order_preserved() {
        let bus = EventBus::standard();
        assert_eq!(
            bus.reactions(Field::GridId),
            &[
                Reaction::RefreshLabel,
                Reaction::RenderPreview,
                Reaction::RenderRow
            ]
        );
        assert_eq!(
            bus.reactions(Field::GridX),
            &[Reaction::ScheduleGridIdLookup, Reaction::ScheduleErrorLookup]
        );
    }

    #[test]
    fn test_unsubscribed_field_is_empty() {
        let bus = EventBus::new();
        assert!(bus.reactions(Field::Artifact).is_empty());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(FieldValue::ErrorId(None).to_string(), "-");
        assert_eq!(
            FieldValue::Artifact(ArtifactFlag::Artifact).to_string(),
            "artifact"
        );
    }
}
