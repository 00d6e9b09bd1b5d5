//! Menu and image fetching
//!
//! `MenuService` is the boundary the UI consumes. `HttpMenuService` talks to
//! the remote menu endpoint; `Dispatcher` runs requests off the UI thread and
//! hands the results back as `FetchEvent`s.

pub mod dispatcher;
pub mod http;

use std::sync::Arc;

use image::DynamicImage;
use thiserror::Error;

use crate::menu::DrinkCategory;

pub use dispatcher::Dispatcher;
pub use http::HttpMenuService;

/// Errors raised while fetching or decoding the menu
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with {status} for {url}")]
    Status { status: u16, url: String },
    #[error("could not decode menu: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid image URL: {0}")]
    InvalidUrl(String),
    #[error("could not start fetch: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Source of menu data and images
pub trait MenuService: Send + Sync {
    /// Fetch and decode the full menu. Single shot, no retries.
    fn fetch_menu(&self) -> Result<Vec<DrinkCategory>, FetchError>;

    /// Fetch an image. Best effort: any failure yields `None`.
    fn fetch_image(&self, url: &str) -> Option<Arc<DynamicImage>>;
}

/// Completion of a background request, delivered to the UI thread
#[derive(Debug)]
pub enum FetchEvent {
    MenuLoaded(Result<Vec<DrinkCategory>, FetchError>),
    ImageLoaded {
        url: String,
        image: Option<Arc<DynamicImage>>,
    },
}
