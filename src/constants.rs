//! Global constants for the tile review tool

/// `error_id` value of a tile that carries no flagged region
pub const UNFLAGGED_ERROR_ID: i64 = -1;

/// Default debounce wait for slider-driven lookups (milliseconds)
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Default grid tile edge length in source pixels
pub const DEFAULT_TILE_SIZE: u32 = 200;

/// Default edge length of the rendered tile preview
pub const DEFAULT_PREVIEW_SIZE: u32 = 400;

/// Default upper bound of the horizontal grid slider
pub const DEFAULT_SLIDER_X_MAX: u32 = 4000;

/// Default upper bound of the vertical grid slider
pub const DEFAULT_SLIDER_Y_MAX: u32 = 2000;

/// Default image file extension (without the dot)
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Prediction table file name inside the root directory
pub const DEFAULT_TABLE_FILE: &str = "test_outputs.csv";

/// Image directory name inside the root directory
pub const DEFAULT_IMAGE_DIR: &str = "test_full";

/// File name of the rendered preview inside the output directory
pub const PREVIEW_FILE: &str = "preview.png";

/// Columns shown for the currently selected tile
pub const DISPLAY_COLUMNS: &[&str] = &[
    "error_id",
    "grid_id",
    "image_name",
    "grid_x",
    "grid_y",
    "label",
    "preds",
    "scores",
    "confmat_labels",
    "label_new",
];
