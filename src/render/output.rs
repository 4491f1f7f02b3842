//! Output regions the reviewer renders into.

use image::RgbaImage;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::rows::format_rows;
use crate::constants::PREVIEW_FILE;
use crate::table::ReviewRow;

/// Where rendered content goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Scaled tile crop
    Preview,
    /// Display columns of the selected tile
    Rows,
    /// Progress and messages
    Status,
}

/// Something to show in a region.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Rendered tile
    Image(RgbaImage),
    /// Stand-in for a tile that couldn't be rendered
    Placeholder {
        /// Placeholder raster
        image: RgbaImage,
        /// Why the tile is missing
        message: String,
    },
    /// Table rows
    Rows(Vec<ReviewRow>),
    /// Free text
    Text(String),
}

/// Rendering boundary. Each call replaces what the region showed before.
pub trait OutputRegion {
    /// Replace the content of `region`.
    fn render(&mut self, region: Region, content: Content);
}

/// Output for the terminal front end.
///
/// Previews are written as PNG files into a directory; rows and text go to
/// the given writer.
pub struct TerminalOutput<W: Write> {
    preview_dir: PathBuf,
    writer: W,
}

impl<W: Write> TerminalOutput<W> {
    /// Create a terminal output writing previews into `preview_dir`.
    pub fn new(preview_dir: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            preview_dir: preview_dir.into(),
            writer,
        }
    }

    /// Path the preview image is written to.
    pub fn preview_path(&self) -> PathBuf {
        self.preview_dir.join(PREVIEW_FILE)
    }

    /// The text writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn save_preview(&mut self, image: &RgbaImage) {
        let path = self.preview_path();
        if let Err(e) = write_png(&self.preview_dir, &path, image) {
            log::warn!("Failed to write preview {:?}: {}", path, e);
            return;
        }
        self.line(&format!("[preview] {}", path.display()));
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.writer, "{}", text) {
            log::warn!("Failed to write output: {}", e);
        }
    }
}

fn write_png(dir: &Path, path: &Path, image: &RgbaImage) -> Result<(), image::ImageError> {
    std::fs::create_dir_all(dir)?;
    image.save(path)
}

impl<W: Write> OutputRegion for TerminalOutput<W> {
    fn render(&mut self, region: Region, content: Content) {
        match (region, content) {
            (_, Content::Image(image)) => self.save_preview(&image),
            (_, Content::Placeholder { image, message }) => {
                self.save_preview(&image);
                self.line(&format!("[preview unavailable] {}", message));
            }
            (_, Content::Rows(rows)) => {
                let text = format_rows(&rows);
                self.line(&text);
            }
            (Region::Status, Content::Text(text)) => self.line(&format!("[status] {}", text)),
            (_, Content::Text(text)) => self.line(&text),
        }
    }
}

/// Output that keeps every render call in memory.
#[derive(Debug, Default)]
pub struct RecordingOutput {
    renders: Vec<(Region, Content)>,
}

impl RecordingOutput {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All render calls in order.
    pub fn renders(&self) -> &[(Region, Content)] {
        &self.renders
    }

    /// Most recent content of a region.
    pub fn last(&self, region: Region) -> Option<&Content> {
        self.renders
            .iter()
            .rev()
            .find(|(r, _)| *r == region)
            .map(|(_, content)| content)
    }

    /// Number of render calls for a region.
    pub fn count(&self, region: Region) -> usize {
        self.renders.iter().filter(|(r, _)| *r == region).count()
    }

    /// Forget recorded calls.
    pub fn clear(&mut self) {
        self.renders.clear();
    }
}

impl OutputRegion for RecordingOutput {
    fn render(&mut self, region: Region, content: Content) {
        self.renders.push((region, content));
    }
}
