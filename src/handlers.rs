//! Reaction handlers.
//!
//! Each handler re-derives one piece of state from the session after a field
//! change, keeping the dispatch loop in `ReviewApp` small. Handlers never
//! panic: lookup failures come back as `Err` for the dispatcher to log.

use std::path::Path;

use crate::config::ReviewConfig;
use crate::error::ReviewError;
use crate::navigation::{
    apply_label, lookup_label, update_error_from_slider, update_grid_id, update_slider_from_error,
};
use crate::render::{Content, OutputRegion, Region, placeholder, render_tile};
use crate::state::{SessionState, TileQuery, image_path};
use crate::table::ReviewRow;

/// Load the error options of the selected image and select its first error.
///
/// The sliders are re-synced even when the first error id equals the old one,
/// since it now addresses a tile of another image.
pub fn handle_refresh_error_options(session: &mut SessionState) -> Result<(), ReviewError> {
    let Some(image) = session.selection().image.clone() else {
        return Ok(());
    };

    let options = session.table().error_ids(&image);
    let first = options.first().copied();
    log::debug!("📋 {} error options for '{}'", options.len(), image);
    session.set_error_options(options);
    session.set_error_id(first);

    if first.is_some() {
        handle_sync_slider_from_error(session)?;
    }
    Ok(())
}

/// Move the sliders to the tile of the selected error.
pub fn handle_sync_slider_from_error(session: &mut SessionState) -> Result<(), ReviewError> {
    let selection = session.selection();
    let (Some(image), Some(error_id)) = (selection.image.clone(), selection.error_id) else {
        return Ok(());
    };

    let (grid_x, grid_y) = update_slider_from_error(session.table(), &image, error_id)?;
    log::debug!("🎚️  Error {} -> sliders ({}, {})", error_id, grid_x, grid_y);
    session.set_grid_x(grid_x);
    session.set_grid_y(grid_y);
    Ok(())
}

/// A query for an image that is no longer selected.
fn is_stale(session: &SessionState, query: &TileQuery) -> bool {
    session.selection().image.as_deref() != Some(query.image.as_str())
}

/// Debounced body: resolve the grid id under the sliders.
pub fn handle_resolve_grid_id(session: &mut SessionState, query: TileQuery) {
    if is_stale(session, &query) {
        log::trace!("Dropping stale grid id lookup for '{}'", query.image);
        return;
    }

    match update_grid_id(session.table(), &query.image, query.grid_x, query.grid_y) {
        Ok(grid_id) => {
            log::debug!(
                "🔎 Tile ({}, {}) of '{}' is grid {}",
                query.grid_x,
                query.grid_y,
                query.image,
                grid_id
            );
            session.resolve_grid_id(&query, grid_id);
        }
        Err(e) => {
            log::warn!("Grid id lookup failed: {}", e);
            session.clear_resolved();
        }
    }
}

/// Debounced body: resolve the error id under the sliders.
///
/// An unflagged tile keeps the current error.
pub fn handle_resolve_error_id(session: &mut SessionState, query: TileQuery) {
    if is_stale(session, &query) {
        log::trace!("Dropping stale error id lookup for '{}'", query.image);
        return;
    }

    let previous = session.selection().error_id;
    match update_error_from_slider(
        session.table(),
        &query.image,
        query.grid_x,
        query.grid_y,
        previous,
    ) {
        Ok(error_id) => session.set_error_id(error_id),
        Err(e) => log::warn!("Error id lookup failed: {}", e),
    }
}

/// Load the reviewer label of the resolved tile into the toggle.
pub fn handle_refresh_label(session: &mut SessionState) -> Result<(), ReviewError> {
    let Some(tile) = session.resolved().cloned() else {
        return Ok(());
    };

    let flag = lookup_label(session.table(), &tile.image, tile.grid_id)?;
    session.set_artifact(flag);
    Ok(())
}

/// Write the toggle value into the table row of the resolved tile.
///
/// Nothing is written unless the resolved tile is the one under the sliders.
/// Returns the updated row when the stored label actually changed.
pub fn handle_apply_label(session: &mut SessionState) -> Result<Option<ReviewRow>, ReviewError> {
    let (Some(tile), Some(flag)) = (session.resolved().cloned(), session.selection().artifact)
    else {
        return Ok(None);
    };
    if !session.is_settled() {
        log::warn!(
            "Tile under the sliders is not resolved, label {} not written",
            flag.name()
        );
        return Ok(None);
    }

    if lookup_label(session.table(), &tile.image, tile.grid_id)? == flag {
        return Ok(None);
    }

    let row = apply_label(session.table_mut(), &tile.image, tile.grid_id, flag)?;
    log::info!(
        "🏷️  '{}' grid {} labelled {}",
        tile.image,
        tile.grid_id,
        flag.name()
    );
    Ok(Some(row))
}

/// Render the resolved tile crop, or a placeholder when the image can't be
/// loaded.
pub fn handle_render_preview<O: OutputRegion>(
    session: &SessionState,
    output: &mut O,
    config: &ReviewConfig,
    image_dir: &Path,
) {
    let Some(tile) = session.resolved() else {
        return;
    };

    let path = image_path(image_dir, &tile.image, &config.image_extension);
    let content = match render_tile(
        &path,
        tile.grid_x,
        tile.grid_y,
        config.tile_size,
        config.preview_size,
    ) {
        Ok(image) => Content::Image(image),
        Err(e) => {
            log::warn!("Preview unavailable: {}", e);
            Content::Placeholder {
                image: placeholder(config.preview_size),
                message: e.to_string(),
            }
        }
    };
    output.render(Region::Preview, content);
}

/// Render the table row of the resolved tile.
pub fn handle_render_row<O: OutputRegion>(
    session: &SessionState,
    output: &mut O,
) -> Result<(), ReviewError> {
    let Some(tile) = session.resolved() else {
        return Ok(());
    };

    let row = session.table().row_by_grid(&tile.image, tile.grid_id)?;
    output.render(Region::Rows, Content::Rows(vec![row.clone()]));
    Ok(())
}
