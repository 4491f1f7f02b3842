//! Session state and image discovery.

mod project;
mod session;

pub use project::{image_path, list_images};
pub use session::{ResolvedTile, Selection, SessionState, TileQuery};
