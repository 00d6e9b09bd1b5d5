//! Background request dispatch
//!
//! Every request runs on its own worker thread. Results come back over a
//! channel and are drained by the UI thread once per frame, so all state
//! changes happen on that thread.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use super::{FetchError, FetchEvent, MenuService};

pub struct Dispatcher {
    service: Arc<dyn MenuService>,
    sender: Sender<FetchEvent>,
    receiver: Receiver<FetchEvent>,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn MenuService>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            service,
            sender,
            receiver,
        }
    }

    /// Start fetching the menu
    pub fn request_menu(&self) {
        let service = Arc::clone(&self.service);
        self.spawn(
            "menu",
            move || FetchEvent::MenuLoaded(service.fetch_menu()),
            |e| FetchEvent::MenuLoaded(Err(FetchError::Spawn(e))),
        );
    }

    /// Start fetching an image. No cancellation once started.
    pub fn request_image(&self, url: &str) {
        let service = Arc::clone(&self.service);
        let job_url = url.to_string();
        let failed_url = url.to_string();
        self.spawn(
            "image",
            move || {
                let image = service.fetch_image(&job_url);
                FetchEvent::ImageLoaded { url: job_url, image }
            },
            move |_| FetchEvent::ImageLoaded {
                url: failed_url,
                image: None,
            },
        );
    }

    /// Drain every completed request without blocking
    pub fn poll(&self) -> Vec<FetchEvent> {
        self.receiver.try_iter().collect()
    }

    /// Run `job` on a worker thread. If no thread can be started, the
    /// event built by `on_error` is delivered instead so every request
    /// still completes.
    fn spawn<F, E>(&self, kind: &str, job: F, on_error: E)
    where
        F: FnOnce() -> FetchEvent + Send + 'static,
        E: FnOnce(io::Error) -> FetchEvent,
    {
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(format!("fetch-{}", kind))
            .spawn(move || {
                // The receiver only goes away when the app is shutting down
                let _ = sender.send(job());
            })
            .map(|_| ());

        self.report_spawn(kind, spawned, on_error);
    }

    fn report_spawn<E>(&self, kind: &str, spawned: io::Result<()>, on_error: E)
    where
        E: FnOnce(io::Error) -> FetchEvent,
    {
        if let Err(e) = spawned {
            log::error!("Failed to spawn {} fetch thread: {}", kind, e);
            let _ = self.sender.send(on_error(e));
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use image::DynamicImage;

    use crate::fetch::{FetchError, MenuService};
    use crate::menu::DrinkCategory;

    /// In-memory service for tests
    pub struct FakeService {
        pub menu: Option<Vec<DrinkCategory>>,
        pub images: HashMap<String, Arc<DynamicImage>>,
        pub menu_calls: AtomicUsize,
    }

    impl FakeService {
        pub fn serving(menu: Vec<DrinkCategory>) -> Self {
            Self {
                menu: Some(menu),
                images: HashMap::new(),
                menu_calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                menu: None,
                images: HashMap::new(),
                menu_calls: AtomicUsize::new(0),
            }
        }

        pub fn with_image(mut self, url: &str) -> Self {
            self.images
                .insert(url.to_string(), Arc::new(DynamicImage::new_rgba8(2, 2)));
            self
        }
    }

    impl MenuService for FakeService {
        fn fetch_menu(&self) -> Result<Vec<DrinkCategory>, FetchError> {
            self.menu_calls.fetch_add(1, Ordering::SeqCst);
            self.menu.clone().ok_or(FetchError::Status {
                status: 503,
                url: "http://menu.test/records".to_string(),
            })
        }

        fn fetch_image(&self, url: &str) -> Option<Arc<DynamicImage>> {
            self.images.get(url).cloned()
        }
    }
}
