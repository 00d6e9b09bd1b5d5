//! Sectioned two-column drink grid
//!
//! Rendering only: geometry comes from `ContentLayout`, contents from a
//! `MenuDataSource`, and images from the `ImageStore`.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use super::{truncate, HEADER_BG, PLACEHOLDER_COLOR, PRICE_COLOR};
use crate::render::{ImageState, ImageStore, RenderMode};
use crate::ui::grid::{ContentLayout, ContentRect, GridLayout, IndexPath, MenuDataSource};

pub struct MenuGridWidget<'a, S: ?Sized, L> {
    source: &'a S,
    layout: &'a L,
    content: &'a ContentLayout,
    images: &'a ImageStore,
    scroll: u32,
    cursor: Option<IndexPath>,
    mode: RenderMode,
}

impl<'a, S, L> MenuGridWidget<'a, S, L>
where
    S: MenuDataSource + ?Sized,
    L: GridLayout,
{
    pub fn new(source: &'a S, layout: &'a L, content: &'a ContentLayout, images: &'a ImageStore) -> Self {
        Self {
            source,
            layout,
            content,
            images,
            scroll: 0,
            cursor: None,
            mode: RenderMode::Ascii,
        }
    }

    pub fn scroll(mut self, scroll: u32) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn cursor(mut self, cursor: Option<IndexPath>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Screen row of a content y, if it falls inside `area`
    fn screen_row(&self, area: Rect, content_y: u32) -> Option<u16> {
        let offset = content_y.checked_sub(self.scroll)?;
        if offset < area.height as u32 {
            Some(area.y + offset as u16)
        } else {
            None
        }
    }

    fn render_header(&self, section: usize, y: u16, area: Rect, buf: &mut Buffer) {
        let title = self.source.section_title(section).unwrap_or_default();
        let style = Style::default()
            .fg(Color::White)
            .bg(HEADER_BG)
            .add_modifier(Modifier::BOLD);

        for row in 0..self.layout.header_height() {
            let y = y + row;
            if y >= area.y + area.height {
                break;
            }
            buf.set_style(Rect::new(area.x, y, area.width, 1), style);
            if row == 0 {
                let text = format!(" {}", truncate(title, area.width.saturating_sub(2) as usize));
                buf.set_stringn(area.x, y, text, area.width as usize, style);
            }
        }
    }

    fn render_item(&self, path: IndexPath, rect: ContentRect, area: Rect, buf: &mut Buffer) {
        let Some(drink) = self.source.drink_at(path) else {
            return;
        };
        let selected = self.cursor == Some(path);
        let x = area.x + rect.x;
        let width = rect.width.min((area.x + area.width).saturating_sub(x));
        if width == 0 {
            return;
        }

        let label_height = self.layout.label_height().min(rect.height);
        let thumb_rows = rect.height - label_height;

        // Thumbnail, clipped at the top when partly scrolled away
        let first_row = self.scroll.saturating_sub(rect.y).min(thumb_rows as u32) as u16;
        if let Some(top) = self.screen_row(area, rect.y + first_row as u32) {
            let visible_rows = (thumb_rows - first_row).min(area.y + area.height - top);
            let thumb_area = Rect::new(x + 1, top, width.saturating_sub(2), visible_rows);
            self.render_thumbnail(&drink.thumbnail_url, thumb_area, first_row, thumb_rows, buf);
        }

        let label_style = if selected {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let lines = [
            (truncate(&drink.name, width.saturating_sub(2) as usize), label_style.fg(Color::White)),
            (drink.price_label(), label_style.fg(PRICE_COLOR)),
        ];
        for (line, (text, style)) in lines.iter().enumerate().take(label_height as usize) {
            let content_y = rect.y + thumb_rows as u32 + line as u32;
            if let Some(y) = self.screen_row(area, content_y) {
                buf.set_style(Rect::new(x, y, width, 1), *style);
                buf.set_stringn(x + 1, y, text, width.saturating_sub(2) as usize, *style);
            }
        }

        if selected {
            self.render_selection_marks(rect, x, width, area, buf);
        }
    }

    fn render_thumbnail(&self, url: &str, area: Rect, first_row: u16, rows: u16, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let state = self.images.state(url);
        match (self.mode, state) {
            (RenderMode::Blocks, Some(ImageState::Ready(_))) => {
                if let Some(blocks) = self.images.blocks(url) {
                    blocks.draw(buf, area, first_row);
                    return;
                }
            }
            // Kitty draws the image over these cells after the frame
            (RenderMode::Kitty, Some(ImageState::Ready(_))) => return,
            _ => {}
        }

        let fill = Style::default().fg(PLACEHOLDER_COLOR);
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char('·').set_style(fill);
                }
            }
        }

        let indicator = match state {
            Some(ImageState::Ready(_)) => "[ image ]",
            _ => "loading…",
        };
        let middle = rows / 2;
        if middle >= first_row && middle - first_row < area.height {
            let len = indicator.chars().count() as u16;
            let ix = area.x + area.width.saturating_sub(len) / 2;
            buf.set_stringn(
                ix,
                area.y + middle - first_row,
                indicator,
                area.width as usize,
                Style::default().fg(Color::Gray),
            );
        }
    }

    /// Corner marks around the selected cell's thumbnail
    fn render_selection_marks(&self, rect: ContentRect, x: u16, width: u16, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let right = x + width.saturating_sub(1);
        let bottom = rect.y + rect.height.saturating_sub(1) as u32;
        for (content_y, left_mark, right_mark) in [(rect.y, '┌', '┐'), (bottom, '└', '┘')] {
            if let Some(y) = self.screen_row(area, content_y) {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(left_mark).set_style(style);
                }
                if let Some(cell) = buf.cell_mut((right, y)) {
                    cell.set_char(right_mark).set_style(style);
                }
            }
        }
    }
}

impl<S, L> Widget for MenuGridWidget<'_, S, L>
where
    S: MenuDataSource + ?Sized,
    L: GridLayout,
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (path, rect) in self.content.visible_items(self.scroll, area.height) {
            self.render_item(path, rect, area, buf);
        }

        for (section, header_top) in self.content.visible_headers(self.scroll, area.height) {
            if let Some(y) = self.screen_row(area, header_top) {
                self.render_header(section, y, area, buf);
            }
        }

        if self.layout.pins_headers() {
            if let Some(section) = self.content.pinned_section(self.scroll) {
                self.render_header(section, area.y, area, buf);
            }
        }
    }
}
