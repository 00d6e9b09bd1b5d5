//! User Interface module
//!
//! Terminal UI using ratatui: the sectioned drink grid, the detail view,
//! and the alert shown when loading fails.

pub mod app;
pub mod grid;
pub mod widgets;

pub use app::{App, Screen, LOAD_ERROR_TITLE};
pub use grid::{ContentLayout, FlowLayout, GridLayout, IndexPath, MenuDataSource, Selection};
