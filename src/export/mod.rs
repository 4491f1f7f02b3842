//! Writing the corrected table back to disk.

mod auto_export;

pub use auto_export::AutoExportManager;
