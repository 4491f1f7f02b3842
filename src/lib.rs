//! tile-review - interactive review of flagged image tiles
//!
//! A reviewer pages through images, inspects flagged grid tiles ("errors")
//! and confirms or corrects an artifact label per tile. Labels are written
//! into an in-memory prediction table that can be exported as CSV.
//!
//! The core pieces are a [`debounce`] utility that coalesces slider drags
//! before lookups run, and the pure traversal and lookup logic in
//! [`navigation`]. [`ReviewApp`] wires them together through field change
//! events.

mod app;
pub mod command;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod error;
pub mod events;
pub mod export;
mod handlers;
pub mod message;
pub mod navigation;
pub mod render;
pub mod state;
pub mod table;

pub use app::ReviewApp;
pub use config::ReviewConfig;
pub use error::ReviewError;
pub use message::Message;
