//! Kitty Graphics Protocol implementation
//!
//! Draws downloaded drink images over the grid in supporting terminals.
//! Supported by: Ghostty, Kitty, WezTerm
//!
//! Protocol documentation: https://sw.kovidgoyal.net/kitty/graphics-protocol/

use std::collections::HashMap;
use std::io::{self, Cursor, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageEncoder, RgbaImage};

/// Kitty limits the payload of a single escape sequence
const CHUNK_SIZE: usize = 4096;

/// An image shown over a block of terminal cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlacement {
    pub url: String,
    pub col: u16,
    pub row: u16,
    pub cols: u16,
    pub rows: u16,
}

/// Kitty Graphics Protocol handler
pub struct KittyGraphics {
    /// Uploaded image IDs by image URL
    uploaded: HashMap<String, u32>,
    /// Next available image ID
    next_id: u32,
    /// Placements drawn after the last sync
    placed: Vec<ImagePlacement>,
    /// Whether to suppress terminal responses
    quiet: bool,
}

impl KittyGraphics {
    pub fn new() -> Self {
        Self {
            uploaded: HashMap::new(),
            next_id: 1,
            placed: Vec::new(),
            quiet: true,
        }
    }

    fn quiet_flag(&self) -> u8 {
        if self.quiet {
            2
        } else {
            0
        }
    }

    /// Upload an image once and get its ID
    pub fn upload_image<W: Write>(&mut self, out: &mut W, url: &str, image: &DynamicImage) -> io::Result<u32> {
        if let Some(id) = self.uploaded.get(url) {
            return Ok(*id);
        }

        let id = self.next_id;
        self.next_id += 1;

        let png_data = encode_png(&image.to_rgba8())?;
        let encoded = BASE64.encode(&png_data);

        // a=t (transmit), t=d (direct), f=100 (PNG format), i=ID, q=quiet
        let chunks: Vec<&[u8]> = encoded.as_bytes().chunks(CHUNK_SIZE).collect();
        for (i, chunk) in chunks.iter().enumerate() {
            let more = if i + 1 == chunks.len() { 0 } else { 1 };
            // base64 output is ASCII
            let chunk = String::from_utf8_lossy(chunk);

            if i == 0 {
                write!(
                    out,
                    "\x1b_Ga=t,t=d,f=100,i={},q={},m={};{}\x1b\\",
                    id,
                    self.quiet_flag(),
                    more,
                    chunk
                )?;
            } else {
                write!(out, "\x1b_Gm={};{}\x1b\\", more, chunk)?;
            }
        }

        self.uploaded.insert(url.to_string(), id);
        Ok(id)
    }

    /// Display an uploaded image scaled to a block of cells
    pub fn place<W: Write>(&self, out: &mut W, image_id: u32, placement: &ImagePlacement) -> io::Result<()> {
        // Move cursor to position first
        write!(out, "\x1b[{};{}H", placement.row + 1, placement.col + 1)?;

        // a=p (put), c=columns, r=rows, C=1 (leave the cursor alone)
        write!(
            out,
            "\x1b_Ga=p,i={},c={},r={},C=1,q={}\x1b\\",
            image_id,
            placement.cols,
            placement.rows,
            self.quiet_flag()
        )
    }

    /// Remove every visible placement, keeping uploaded data
    pub fn clear_placements<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        write!(out, "\x1b_Ga=d,d=a,q={}\x1b\\", self.quiet_flag())?;
        self.placed.clear();
        Ok(())
    }

    /// Delete all uploaded images
    pub fn clear_all<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        write!(out, "\x1b_Ga=d,d=A,q={}\x1b\\", self.quiet_flag())?;
        self.uploaded.clear();
        self.placed.clear();
        Ok(())
    }

    /// Bring the terminal's placements in line with `placements`.
    ///
    /// Nothing is written when the set is unchanged since the last call.
    /// Placements whose image `lookup` cannot provide are skipped.
    pub fn sync<W, F>(&mut self, out: &mut W, placements: &[ImagePlacement], lookup: F) -> io::Result<()>
    where
        W: Write,
        F: Fn(&str) -> Option<std::sync::Arc<DynamicImage>>,
    {
        if placements == self.placed.as_slice() {
            return Ok(());
        }

        self.clear_placements(out)?;
        for placement in placements {
            let Some(image) = lookup(&placement.url) else {
                continue;
            };
            let id = self.upload_image(out, &placement.url, &image)?;
            self.place(out, id, placement)?;
        }
        out.flush()?;

        self.placed = placements.to_vec();
        Ok(())
    }
}

impl Default for KittyGraphics {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode an RGBA image as PNG bytes
fn encode_png(image: &RgbaImage) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(Cursor::new(&mut buffer));

    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(io::Error::other)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn placement(url: &str, col: u16) -> ImagePlacement {
        ImagePlacement {
            url: url.to_string(),
            col,
            row: 2,
            cols: 10,
            rows: 5,
        }
    }

    #[test]
    fn test_upload_once_per_url() {
        let mut kitty = KittyGraphics::new();
        let image = DynamicImage::new_rgba8(4, 4);
        let mut out = Vec::new();

        let first = kitty.upload_image(&mut out, "https://img.test/a.png", &image).unwrap();
        let written = out.len();
        let second = kitty.upload_image(&mut out, "https://img.test/a.png", &image).unwrap();

        assert_eq!(first, second);
        assert_eq!(out.len(), written);
        assert!(kitty.uploaded.contains_key("https://img.test/a.png"));
        assert!(String::from_utf8(out).unwrap().starts_with("\x1b_Ga=t,t=d,f=100,i=1,"));
    }

    #[test]
    fn test_sync_skips_unchanged_placements() {
        let mut kitty = KittyGraphics::new();
        let image = Arc::new(DynamicImage::new_rgba8(4, 4));
        let placements = vec![placement("https://img.test/a.png", 0)];

        let mut out = Vec::new();
        kitty.sync(&mut out, &placements, |_| Some(Arc::clone(&image))).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[3;1H"));
        assert!(text.contains("a=p,i=1,c=10,r=5,C=1"));

        let mut out = Vec::new();
        kitty.sync(&mut out, &placements, |_| Some(Arc::clone(&image))).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_sync_skips_missing_images() {
        let mut kitty = KittyGraphics::new();
        let placements = vec![placement("https://img.test/gone.png", 0)];

        let mut out = Vec::new();
        kitty.sync(&mut out, &placements, |_| None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("a=d,d=a"));
        assert!(!text.contains("a=p"));
    }

    #[test]
    fn test_large_upload_is_chunked() {
        let mut kitty = KittyGraphics::new();
        // Noisy pixels so PNG compression cannot shrink below one chunk
        let mut img = RgbaImage::new(64, 64);
        for (i, pixel) in img.pixels_mut().enumerate() {
            let v = (i as u32).wrapping_mul(2_654_435_761);
            *pixel = image::Rgba([v as u8, (v >> 8) as u8, (v >> 16) as u8, 255]);
        }

        let mut out = Vec::new();
        kitty.upload_image(&mut out, "big", &DynamicImage::ImageRgba8(img)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("m=1;"));
        assert!(text.contains("\x1b_Gm=0;"));
    }
}
