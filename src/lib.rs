//! Drinkmenu - a terminal drink menu browser
//!
//! Fetches a categorized drink menu from a remote endpoint, shows it as a
//! two-column grid with thumbnails, and opens a detail view per drink.

pub mod config;
pub mod fetch;
pub mod menu;
pub mod render;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use fetch::{Dispatcher, FetchError, HttpMenuService, MenuService};
pub use menu::{Drink, DrinkCategory, PriceTag};
