//! Rendering of the selected tile into output regions.
//!
//! - `preview`: crop the tile out of its source image and scale it up
//! - `rows`: text table of the tile's display columns
//! - `output`: the [`OutputRegion`] boundary plus terminal and in-memory sinks

mod output;
mod preview;
mod rows;

pub use output::{Content, OutputRegion, RecordingOutput, Region, TerminalOutput};
pub use preview::{crop_tile, load_image, placeholder, render_tile};
pub use rows::format_rows;
