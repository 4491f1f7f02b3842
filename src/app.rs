//! Review application.
//!
//! `ReviewApp` follows the Elm architecture: [`Message`]s write selection
//! fields, every actual change is queued as a [`FieldChange`](crate::events::FieldChange),
//! and [`ReviewApp::dispatch`] drains that queue in FIFO order running the
//! reactions the [`EventBus`] has subscribed for each field. Slider-driven
//! lookups go through [`Debounced`] wrappers whose timers live in a
//! [`TimerQueue`] polled by [`ReviewApp::tick`].

use std::path::{Path, PathBuf};
use std::time::Duration;
use web_time::Instant;

use crate::config::ReviewConfig;
use crate::debounce::{Debounced, TimerQueue, debounce};
use crate::error::{LookupKey, ReviewError};
use crate::events::{EventBus, Reaction};
use crate::export::AutoExportManager;
use crate::handlers::{
    handle_apply_label, handle_refresh_error_options, handle_refresh_label, handle_render_preview,
    handle_render_row, handle_resolve_error_id, handle_resolve_grid_id,
    handle_sync_slider_from_error,
};
use crate::message::Message;
use crate::navigation::{Address, Direction, first_error, next_error, prev_error, step_image};
use crate::render::{Content, OutputRegion, Region};
use crate::state::{SessionState, TileQuery};
use crate::table::ArtifactFlag;


/// One interactive review session bound to an output.
pub struct ReviewApp<O: OutputRegion> {
    session: SessionState,
    scheduler: TimerQueue<SessionState>,
    bus: EventBus,
    grid_lookup: Debounced<SessionState, TileQuery>,
    error_lookup: Debounced<SessionState, TileQuery>,
    output: O,
    config: ReviewConfig,
    image_dir: PathBuf,
    auto_export: AutoExportManager,
}

impl<O: OutputRegion> ReviewApp<O> {
    /// Create an application over a loaded session.
    pub fn new(
        session: SessionState,
        config: ReviewConfig,
        image_dir: impl Into<PathBuf>,
        output: O,
    ) -> Self {
        let wait = config.debounce_wait();
        let auto_export = AutoExportManager::from_config(&config.auto_export);
        log::info!(
            "Review session: {} rows, {} images, debounce {:?}",
            session.table().len(),
            session.image_order().len(),
            wait
        );

        Self {
            session,
            scheduler: TimerQueue::new(),
            bus: EventBus::standard(),
            grid_lookup: debounce(wait)(handle_resolve_grid_id),
            error_lookup: debounce(wait)(handle_resolve_error_id),
            output,
            config,
            image_dir: image_dir.into(),
            auto_export,
        }
    }

    /// Session state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Output the app renders into.
    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Apply a message at `now` and dispatch the changes it caused.
    ///
    /// Lookup and boundary errors leave the selection as it was.
    pub fn update(&mut self, message: Message, now: Instant) -> Result<(), ReviewError> {
        log::debug!("📨 {:?}", message);
        match message {
            Message::SelectImage(image) => {
                if !self.session.image_order().contains(&image) {
                    return Err(ReviewError::lookup_miss(image, LookupKey::Image));
                }
                self.session.set_image(&image);
            }
            Message::SelectError(error_id) => {
                let Some(image) = self.session.selection().image.clone() else {
                    log::warn!("No image selected, ignoring error {}", error_id);
                    return Ok(());
                };
                if !self.session.error_options().contains(&error_id) {
                    return Err(ReviewError::lookup_miss(image, LookupKey::ErrorId(error_id)));
                }
                self.session.set_error_id(Some(error_id));
            }
            Message::SetGridX(value) => {
                let value = self.config.snap_x(value);
                self.session.set_grid_x(value);
            }
            Message::SetGridY(value) => {
                let value = self.config.snap_y(value);
                self.session.set_grid_y(value);
            }
            Message::SetArtifact(flag) => return self.label_current(Some(flag), now),
            Message::ToggleArtifact => return self.label_current(None, now),
            Message::Next => return self.navigate(Direction::Forward, now),
            Message::Prev => return self.navigate(Direction::Backward, now),
        }
        self.dispatch(now);
        Ok(())
    }

    /// Write a label for the tile under the sliders, flipping the toggle when
    /// no flag is given.
    ///
    /// Pending lookups run first so the label can't land on the tile the
    /// sliders just left. A position without a table row is rejected.
    fn label_current(
        &mut self,
        flag: Option<ArtifactFlag>,
        now: Instant,
    ) -> Result<(), ReviewError> {
        self.settle(now);

        let Some(query) = self.session.tile_query() else {
            log::warn!("No image selected, ignoring label");
            return Ok(());
        };
        if !self.session.is_settled() {
            let e = ReviewError::lookup_miss(
                query.image,
                LookupKey::Tile {
                    x: query.grid_x,
                    y: query.grid_y,
                },
            );
            log::warn!("⛔ Label not written: {}", e);
            self.output.render(Region::Status, Content::Text(e.to_string()));
            return Err(e);
        }

        let flag = flag.unwrap_or_else(|| match self.session.selection().artifact {
            Some(current) => current.toggled(),
            None => ArtifactFlag::Artifact,
        });
        self.session.set_artifact(flag);
        self.dispatch(now);
        Ok(())
    }

    /// Run pending lookups immediately and dispatch their changes.
    fn settle(&mut self, now: Instant) {
        let fired = self.scheduler.flush(&mut self.session);
        if fired > 0 {
            log::trace!("⏱️  {} timer(s) flushed", fired);
            self.dispatch(now);
        }
    }

    fn navigate(&mut self, direction: Direction, now: Instant) -> Result<(), ReviewError> {
        let selection = self.session.selection();
        let table = self.session.table();
        let order = self.session.image_order();

        let target = match (selection.image.as_deref(), selection.error_id) {
            (None, _) => match first_error(table, order) {
                Some(address) => Ok(address),
                None => {
                    log::warn!("No flagged tiles to review");
                    return Ok(());
                }
            },
            (Some(image), Some(error_id)) => match direction {
                Direction::Forward => next_error(image, error_id, table, order),
                Direction::Backward => prev_error(image, error_id, table, order),
            },
            (Some(image), None) => step_image(image, table, order, direction),
        };

        match target {
            Ok(address) => {
                self.go_to(address, now);
                Ok(())
            }
            Err(e) => {
                if e.is_boundary() {
                    log::warn!("⛔ {}", e);
                    self.output.render(Region::Status, Content::Text(e.to_string()));
                }
                Err(e)
            }
        }
    }

    /// Select an image, let its error options settle, then select the error.
    fn go_to(&mut self, address: Address, now: Instant) {
        log::debug!("➡️  Going to '{}' error {}", address.image, address.error_id);
        self.session.set_image(&address.image);
        self.dispatch(now);
        self.session.set_error_id(Some(address.error_id));
        self.dispatch(now);
    }

    /// Drain queued field changes, running subscribed reactions in order.
    pub fn dispatch(&mut self, now: Instant) {
        while let Some(change) = self.session.pop_change() {
            log::trace!("{:?} = {}", change.field, change.value);
            let reactions = self.bus.reactions(change.field).to_vec();
            for reaction in reactions {
                if let Err(e) = self.react(reaction, now) {
                    log::warn!("{:?} failed: {}", reaction, e);
                }
            }
        }
    }

    fn react(&mut self, reaction: Reaction, now: Instant) -> Result<(), ReviewError> {
        match reaction {
            Reaction::RefreshErrorOptions => handle_refresh_error_options(&mut self.session)?,
            Reaction::SyncSliderFromError => handle_sync_slider_from_error(&mut self.session)?,
            Reaction::ScheduleGridIdLookup => {
                if let Some(query) = self.session.tile_query() {
                    self.grid_lookup.call(&mut self.scheduler, now, query);
                }
            }
            Reaction::ScheduleErrorLookup => {
                if let Some(query) = self.session.tile_query() {
                    self.error_lookup.call(&mut self.scheduler, now, query);
                }
            }
            Reaction::RefreshLabel => handle_refresh_label(&mut self.session)?,
            Reaction::RenderPreview => handle_render_preview(
                &self.session,
                &mut self.output,
                &self.config,
                &self.image_dir,
            ),
            Reaction::RenderRow => handle_render_row(&self.session, &mut self.output)?,
            Reaction::ApplyLabel => {
                if let Some(row) = handle_apply_label(&mut self.session)? {
                    self.auto_export.record_change(now);
                    self.output.render(Region::Rows, Content::Rows(vec![row]));
                }
            }
        }
        Ok(())
    }

    /// Run timers due at `now`, dispatch what they changed and export if due.
    ///
    /// Returns the number of timer callbacks that ran.
    pub fn tick(&mut self, now: Instant) -> usize {
        let fired = self.scheduler.run_due(now, &mut self.session);
        if fired > 0 {
            log::trace!("⏱️  {} timer(s) fired", fired);
            self.dispatch(now);
        }

        if self.auto_export.is_due(now) {
            self.run_auto_export(now);
        }
        fired
    }

    /// Time until the next pending lookup is due.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_next(now)
    }

    /// Whether no debounced lookup is waiting.
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    fn run_auto_export(&mut self, now: Instant) {
        let Some(path) = self.config.auto_export.path.clone() else {
            return;
        };
        let result = self.export(&path);
        if let Err(e) = &result {
            log::error!("Auto-export failed: {}", e);
        }
        self.auto_export.record_attempt(now, result.is_ok());
    }

    /// Export pending label changes to the auto-export path, if configured.
    pub fn flush_auto_export(&mut self, now: Instant) {
        if self.auto_export.is_enabled() && self.auto_export.has_unexported() {
            self.run_auto_export(now);
        }
    }

    /// Write the table with its corrected labels to `path`.
    ///
    /// Returns the number of rows whose label differs from the original.
    pub fn export(&self, path: &Path) -> Result<usize, ReviewError> {
        self.session.table().write_csv(path)?;
        let changed = self.session.table().changed_count();
        log::info!("💾 Exported {:?} ({} changed labels)", path, changed);
        Ok(changed)
    }

    /// Re-render the preview and row of the current tile.
    pub fn show(&mut self) -> Result<(), ReviewError> {
        handle_render_preview(
            &self.session,
            &mut self.output,
            &self.config,
            &self.image_dir,
        );
        handle_render_row(&self.session, &mut self.output)
    }

    /// One-line progress summary.
    pub fn status(&self) -> String {
        let selection = self.session.selection();
        let image = match (selection.image.as_deref(), self.session.image_progress()) {
            (Some(name), Some((i, n))) => format!("image {} ({}/{})", name, i, n),
            (Some(name), None) => format!("image {}", name),
            (None, _) => "no image".to_string(),
        };
        let error = match (selection.error_id, self.session.error_progress()) {
            (Some(id), Some((j, m))) => format!("error {} ({}/{})", id, j, m),
            _ => "no error".to_string(),
        };
        let tile = match self.session.resolved() {
            Some(tile) if self.session.is_settled() => format!(
                "grid {} at ({}, {})",
                tile.grid_id, tile.grid_x, tile.grid_y
            ),
            _ => format!(
                "sliders ({}, {}) pending",
                selection.grid_x, selection.grid_y
            ),
        };
        let label = selection.artifact.map_or("-", |flag| flag.name());

        format!(
            "{}, {}, {}, label {}, reviewed {} changed labels",
            image,
            error,
            tile,
            label,
            self.session.table().changed_count()
        )
    }

    /// Render the progress summary into the status region.
    pub fn render_status(&mut self) {
        let status = self.status();
        self.output.render(Region::Status, Content::Text(status));
    }
}
