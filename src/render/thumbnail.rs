//! Downloaded images and their terminal renditions

use std::collections::HashMap;
use std::sync::Arc;

use image::{imageops::FilterType, DynamicImage, Rgba};
use ratatui::{buffer::Buffer, layout::Rect, style::Color};

/// Load state of one image URL
#[derive(Debug, Clone)]
pub enum ImageState {
    Loading,
    Ready(Arc<DynamicImage>),
    /// The fetch gave nothing back; the placeholder stays
    Missing,
}

/// Images known to the UI, keyed by URL.
///
/// Keying by URL means a late completion can only ever update the drink it
/// was requested for.
#[derive(Default)]
pub struct ImageStore {
    states: HashMap<String, ImageState>,
    blocks: HashMap<String, HalfBlockImage>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `url` as loading. Returns true if it was unknown and a fetch
    /// should be started.
    pub fn request(&mut self, url: &str) -> bool {
        if self.states.contains_key(url) {
            return false;
        }
        self.states.insert(url.to_string(), ImageState::Loading);
        true
    }

    /// Record the result of a fetch
    pub fn resolve(&mut self, url: String, image: Option<Arc<DynamicImage>>) {
        self.blocks.remove(&url);
        let state = match image {
            Some(image) => ImageState::Ready(image),
            None => ImageState::Missing,
        };
        self.states.insert(url, state);
    }

    pub fn state(&self, url: &str) -> Option<&ImageState> {
        self.states.get(url)
    }

    pub fn image(&self, url: &str) -> Option<Arc<DynamicImage>> {
        match self.states.get(url) {
            Some(ImageState::Ready(image)) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    pub fn is_ready(&self, url: &str) -> bool {
        matches!(self.states.get(url), Some(ImageState::Ready(_)))
    }

    /// Build (or rebuild on resize) the half-block rendition of `url`
    pub fn prepare_blocks(&mut self, url: &str, width: u16, height: u16) {
        let Some(image) = self.image(url) else {
            return;
        };
        let fresh = self
            .blocks
            .get(url)
            .is_some_and(|b| b.width == width && b.height == height);
        if !fresh {
            self.blocks
                .insert(url.to_string(), HalfBlockImage::from_image(&image, width, height));
        }
    }

    pub fn blocks(&self, url: &str) -> Option<&HalfBlockImage> {
        self.blocks.get(url)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// An image scaled to a block of cells, two pixels per cell ("▀" with the
/// top pixel as foreground and the bottom one as background)
#[derive(Debug, Clone, PartialEq)]
pub struct HalfBlockImage {
    pub width: u16,
    pub height: u16,
    cells: Vec<(Color, Color)>,
}

impl HalfBlockImage {
    pub fn from_image(image: &DynamicImage, width: u16, height: u16) -> Self {
        if width == 0 || height == 0 {
            return Self {
                width,
                height,
                cells: Vec::new(),
            };
        }

        let scaled = image
            .resize_exact(width as u32, height as u32 * 2, FilterType::Triangle)
            .to_rgba8();

        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for row in 0..height as u32 {
            for col in 0..width as u32 {
                let top = to_color(scaled.get_pixel(col, row * 2));
                let bottom = to_color(scaled.get_pixel(col, row * 2 + 1));
                cells.push((top, bottom));
            }
        }

        Self { width, height, cells }
    }

    /// Colors of the cell at (`col`, `row`)
    pub fn cell(&self, col: u16, row: u16) -> Option<(Color, Color)> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells
            .get(row as usize * self.width as usize + col as usize)
            .copied()
    }

    /// Draw into `area`, starting at image row `first_row` (for images
    /// partly scrolled off the top)
    pub fn draw(&self, buf: &mut Buffer, area: Rect, first_row: u16) {
        for y in 0..area.height {
            let row = first_row + y;
            if row >= self.height {
                break;
            }
            for x in 0..area.width.min(self.width) {
                let Some((top, bottom)) = self.cell(x, row) else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                    cell.set_char('▀').set_fg(top).set_bg(bottom);
                }
            }
        }
    }
}

/// Blend over black so transparent areas stay dark
fn to_color(pixel: &Rgba<u8>) -> Color {
    let [r, g, b, a] = pixel.0;
    let blend = |c: u8| ((c as u16 * a as u16) / 255) as u8;
    Color::Rgb(blend(r), blend(g), blend(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    /// 2x4 pixels: top half red, bottom half blue
    fn two_tone() -> DynamicImage {
        let mut img = RgbaImage::new(2, 4);
        for (_, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = if y < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            };
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_store_requests_each_url_once() {
        let mut store = ImageStore::new();
        assert!(store.request("https://img.test/a.png"));
        assert!(!store.request("https://img.test/a.png"));
        assert!(matches!(store.state("https://img.test/a.png"), Some(ImageState::Loading)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_resolves_missing() {
        let mut store = ImageStore::new();
        store.request("https://img.test/a.png");
        store.resolve("https://img.test/a.png".to_string(), None);

        assert!(matches!(store.state("https://img.test/a.png"), Some(ImageState::Missing)));
        assert!(store.image("https://img.test/a.png").is_none());
        // A missing image is not fetched again
        assert!(!store.request("https://img.test/a.png"));
    }

    #[test]
    fn test_prepare_blocks_only_for_ready_images() {
        let mut store = ImageStore::new();
        store.prepare_blocks("https://img.test/a.png", 4, 2);
        assert!(store.blocks("https://img.test/a.png").is_none());

        store.resolve("https://img.test/a.png".to_string(), Some(Arc::new(two_tone())));
        store.prepare_blocks("https://img.test/a.png", 4, 2);
        let blocks = store.blocks("https://img.test/a.png").unwrap();
        assert_eq!((blocks.width, blocks.height), (4, 2));
    }

    #[test]
    fn test_half_blocks_split_pixels() {
        let blocks = HalfBlockImage::from_image(&two_tone(), 2, 2);
        assert_eq!(blocks.cell(0, 0), Some((Color::Rgb(255, 0, 0), Color::Rgb(255, 0, 0))));
        assert_eq!(blocks.cell(1, 1), Some((Color::Rgb(0, 0, 255), Color::Rgb(0, 0, 255))));
        assert_eq!(blocks.cell(2, 0), None);
    }

    #[test]
    fn test_draw_clips_to_area() {
        let blocks = HalfBlockImage::from_image(&two_tone(), 2, 2);
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 4));

        // Skip the first image row, as if scrolled
        blocks.draw(&mut buf, Rect::new(1, 1, 2, 3), 1);

        assert_eq!(buf[(1, 1)].symbol(), "▀");
        assert_eq!(buf[(1, 1)].fg, Color::Rgb(0, 0, 255));
        assert_eq!(buf[(1, 2)].symbol(), " ");
        assert_eq!(buf[(0, 1)].symbol(), " ");
    }

    #[test]
    fn test_transparent_pixels_are_dark() {
        assert_eq!(to_color(&Rgba([200, 100, 50, 0])), Color::Rgb(0, 0, 0));
        assert_eq!(to_color(&Rgba([200, 100, 50, 255])), Color::Rgb(200, 100, 50));
    }
}
