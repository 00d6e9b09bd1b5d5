//! Render mode detection and configuration
//!
//! Automatically detects terminal capabilities and selects the best rendering mode.

use std::env;

use serde::{Deserialize, Serialize};

/// Available rendering modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// Placeholder boxes instead of images
    /// Works everywhere
    #[default]
    Ascii,

    /// Half-block characters colored per pixel pair
    /// Needs Unicode and true color
    Blocks,

    /// Kitty Graphics Protocol
    /// Full image support, best visuals
    /// Supported by: Ghostty, Kitty, WezTerm
    Kitty,
}

impl RenderMode {
    /// Get a human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Ascii => "ASCII",
            RenderMode::Blocks => "Blocks",
            RenderMode::Kitty => "Kitty Graphics",
        }
    }

    /// Next mode in the cycle
    pub fn next(&self) -> Self {
        match self {
            RenderMode::Ascii => RenderMode::Blocks,
            RenderMode::Blocks => RenderMode::Kitty,
            RenderMode::Kitty => RenderMode::Ascii,
        }
    }
}

/// Detect the best rendering mode for the current terminal
pub fn detect_render_mode() -> RenderMode {
    if is_kitty_supported() {
        log::info!("Detected Kitty graphics protocol support");
        return RenderMode::Kitty;
    }

    if is_unicode_supported() && detect_true_color() {
        log::info!("Using half-block rendering mode");
        return RenderMode::Blocks;
    }

    log::info!("Falling back to ASCII rendering mode");
    RenderMode::Ascii
}

/// Check if Kitty graphics protocol is likely supported
fn is_kitty_supported() -> bool {
    if let Ok(term) = env::var("TERM") {
        let term_lower = term.to_lowercase();
        if term_lower.contains("kitty") || term_lower.contains("ghostty") {
            return true;
        }
    }

    if let Ok(term_prog) = env::var("TERM_PROGRAM") {
        let prog_lower = term_prog.to_lowercase();
        if prog_lower.contains("kitty") || prog_lower.contains("ghostty") || prog_lower.contains("wezterm") {
            return true;
        }
    }

    // Set by Kitty, Ghostty and WezTerm respectively
    ["KITTY_WINDOW_ID", "GHOSTTY_RESOURCES_DIR", "WEZTERM_PANE"]
        .iter()
        .any(|var| env::var(var).is_ok())
}

/// Check if Unicode is well-supported
fn is_unicode_supported() -> bool {
    for var in ["LC_ALL", "LC_CTYPE", "LANG"] {
        if let Ok(value) = env::var(var) {
            if !value.is_empty() {
                let upper = value.to_uppercase();
                return upper.contains("UTF-8") || upper.contains("UTF8");
            }
        }
    }

    // Modern terminals generally support Unicode
    true
}

/// Check if true color (24-bit) is supported
fn detect_true_color() -> bool {
    match env::var("COLORTERM") {
        Ok(colorterm) => {
            let ct = colorterm.to_lowercase();
            ct.contains("truecolor") || ct.contains("24bit")
        }
        // Not advertised; the linux console is the common holdout
        Err(_) => env::var("TERM").map_or(true, |term| term != "linux"),
    }
}
