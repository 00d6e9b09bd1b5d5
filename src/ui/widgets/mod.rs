//! UI widgets

pub mod alert;
pub mod drink_detail;
pub mod menu_grid;

pub use alert::{Alert, AlertWidget};
pub use drink_detail::DrinkDetailWidget;
pub use menu_grid::MenuGridWidget;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const BORDER_COLOR: Color = Color::Rgb(100, 100, 120);
pub const HEADER_BG: Color = Color::Rgb(40, 40, 50);
pub const PRICE_COLOR: Color = Color::Rgb(230, 190, 90);
pub const PLACEHOLDER_COLOR: Color = Color::Rgb(60, 60, 70);

/// Truncate a string to fit within `max_width` terminal columns, adding "…" if truncated.
///
/// Wide characters (CJK) count as two columns.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    // One column is reserved for the ellipsis
    let budget = max_width - 1;
    let mut truncated = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        truncated.push(c);
    }
    truncated.push('…');
    truncated
}

/// Center a rect of the given percentage size inside `r`
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
