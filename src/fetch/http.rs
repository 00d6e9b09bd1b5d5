//! HTTP implementation of `MenuService`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use image::DynamicImage;
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;

use super::{FetchError, MenuService};
use crate::config::Config;
use crate::menu::{decode_menu, DrinkCategory};

/// Fetches the menu and images over HTTP
pub struct HttpMenuService {
    http: Client,
    menu_url: String,
    api_key: Option<String>,
    /// Decoded images by URL
    images: Mutex<HashMap<String, Arc<DynamicImage>>>,
}

impl HttpMenuService {
    /// Build a service from configuration
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("drinkmenu/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            menu_url: config.menu_url.clone(),
            api_key: config.api_key.clone(),
            images: Mutex::new(HashMap::new()),
        })
    }

    fn get_bytes(&self, url: &str, authorized: bool) -> Result<Vec<u8>, FetchError> {
        let mut request = self.http.get(url);
        if authorized {
            if let Some(key) = &self.api_key {
                request = request.header(AUTHORIZATION, format!("Bearer {}", key));
            }
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.bytes()?.to_vec())
    }

    fn download_image(&self, url: &str) -> Result<DynamicImage, String> {
        let bytes = self.get_bytes(url, false).map_err(|e| e.to_string())?;
        image::load_from_memory(&bytes).map_err(|e| e.to_string())
    }
}

impl MenuService for HttpMenuService {
    fn fetch_menu(&self) -> Result<Vec<DrinkCategory>, FetchError> {
        log::info!("Fetching menu from {}", self.menu_url);
        let body = self.get_bytes(&self.menu_url, true)?;
        let categories = decode_menu(&body)?;

        let drinks: usize = categories.iter().map(|c| c.drinks.len()).sum();
        log::info!("Fetched {} categories, {} drinks", categories.len(), drinks);
        Ok(categories)
    }

    fn fetch_image(&self, url: &str) -> Option<Arc<DynamicImage>> {
        if let Some(image) = self.images.lock().get(url) {
            return Some(Arc::clone(image));
        }

        match self.download_image(url) {
            Ok(image) => {
                let image = Arc::new(image);
                self.images.lock().insert(url.to_string(), Arc::clone(&image));
                Some(image)
            }
            Err(e) => {
                log::warn!("Could not load image {}: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    const MENU_BODY: &str = r#"{ "records": [ { "fields": {
        "name": "Taro Milk", "priceM": 50,
        "description": "Smooth", "category": "Milk Tea",
        "imageURL": "https://img.example.com/full/taro.png",
        "thumbnail": []
    } } ] }"#;

    /// Serve a single HTTP response on a local port.
    ///
    /// Returns the base URL and a handle yielding the raw request head.
    fn serve_once(status: &str, body: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let status = status.to_string();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let mut response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            )
            .into_bytes();
            response.extend_from_slice(&body);
            // The client may hang up early on error statuses
            let _ = stream.write_all(&response);
            String::from_utf8_lossy(&request).into_owned()
        });

        (base, handle)
    }

    fn service_for(menu_url: String, api_key: Option<&str>) -> HttpMenuService {
        let config = Config {
            menu_url,
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
            ..Config::default()
        };
        HttpMenuService::new(&config).unwrap()
    }

    #[test]
    fn test_error_status_is_reported() {
        let (base, server) = serve_once("404 Not Found", b"missing".to_vec());
        let url = format!("{}/menu", base);
        let service = service_for(url.clone(), None);

        match service.fetch_menu() {
            Err(FetchError::Status { status, url: failed }) => {
                assert_eq!(status, 404);
                assert_eq!(failed, url);
            }
            other => panic!("expected status error, got {:?}", other),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_menu_request_sends_bearer_key() {
        let (base, server) = serve_once("200 OK", MENU_BODY.as_bytes().to_vec());
        let service = service_for(format!("{}/menu", base), Some("secret-key"));

        service.fetch_menu().unwrap();
        let request = server.join().unwrap().to_lowercase();
        assert!(request.starts_with("get /menu "));
        assert!(request.contains("authorization: bearer secret-key"));
    }

    #[test]
    fn test_menu_request_without_key_is_anonymous() {
        let (base, server) = serve_once("200 OK", MENU_BODY.as_bytes().to_vec());
        let service = service_for(format!("{}/menu", base), None);

        service.fetch_menu().unwrap();
        assert!(!server.join().unwrap().to_lowercase().contains("authorization:"));
    }

    #[test]
    fn test_ok_body_decodes_into_categories() {
        let (base, server) = serve_once("200 OK", MENU_BODY.as_bytes().to_vec());
        let service = service_for(format!("{}/menu", base), Some("secret-key"));

        let categories = service.fetch_menu().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Milk Tea");
        assert_eq!(categories[0].drinks[0].name, "Taro Milk");
        assert_eq!(categories[0].drinks[0].price_label(), "M 50");
        server.join().unwrap();
    }

    #[test]
    fn test_malformed_body_is_a_decode_error() {
        let (base, server) = serve_once("200 OK", b"{ not json".to_vec());
        let service = service_for(format!("{}/menu", base), None);

        assert!(matches!(service.fetch_menu(), Err(FetchError::Decode(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_non_image_bytes_yield_none() {
        let (base, server) = serve_once("200 OK", b"<html>not a picture</html>".to_vec());
        let service = service_for(format!("{}/menu", base), Some("secret-key"));

        assert!(service.fetch_image(&format!("{}/thumb.png", base)).is_none());
        // Image hosts never see the menu key
        assert!(!server.join().unwrap().to_lowercase().contains("authorization:"));
    }

    #[test]
    fn test_png_bytes_are_decoded_and_memoized() {
        let mut png = Cursor::new(Vec::new());
        DynamicImage::new_rgba8(3, 2)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        let (base, server) = serve_once("200 OK", png.into_inner());
        let service = service_for(format!("{}/menu", base), None);
        let url = format!("{}/thumb.png", base);

        let first = service.fetch_image(&url).expect("decoded image");
        assert_eq!((first.width(), first.height()), (3, 2));
        server.join().unwrap();

        // The server is gone; the second call is served from memory
        let second = service.fetch_image(&url).expect("memoized image");
        assert!(Arc::ptr_eq(&first, &second));
    }

    fn unreachable_config() -> Config {
        Config {
            // Port 9 (discard) on localhost is closed on test machines
            menu_url: "http://127.0.0.1:9/menu".to_string(),
            timeout_secs: 1,
            ..Config::default()
        }
    }

    #[test]
    fn test_unreachable_menu_is_an_error() {
        let service = HttpMenuService::new(&unreachable_config()).unwrap();
        let result = service.fetch_menu();
        assert!(matches!(result, Err(FetchError::Http(_))));
    }

    #[test]
    fn test_unreachable_image_is_none() {
        let service = HttpMenuService::new(&unreachable_config()).unwrap();
        assert!(service.fetch_image("http://127.0.0.1:9/thumb.png").is_none());
    }

    #[test]
    fn test_memoized_image_skips_network() {
        let service = HttpMenuService::new(&unreachable_config()).unwrap();
        let url = "http://127.0.0.1:9/cached.png";
        let image = Arc::new(DynamicImage::new_rgba8(4, 4));
        service.images.lock().insert(url.to_string(), Arc::clone(&image));

        let fetched = service.fetch_image(url).expect("memoized image");
        assert!(Arc::ptr_eq(&fetched, &image));
    }
}
