//! Detail view for a single drink

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::{BORDER_COLOR, PLACEHOLDER_COLOR, PRICE_COLOR};
use crate::menu::Drink;
use crate::render::{ImageState, ImageStore, RenderMode};

pub struct DrinkDetailWidget<'a> {
    drink: &'a Drink,
    images: &'a ImageStore,
    mode: RenderMode,
}

impl<'a> DrinkDetailWidget<'a> {
    pub fn new(drink: &'a Drink, images: &'a ImageStore) -> Self {
        Self {
            drink,
            images,
            mode: RenderMode::Ascii,
        }
    }

    pub fn mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    fn block(drink: &Drink) -> Block<'_> {
        Block::default()
            .title(format!(" {} ", drink.name))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER_COLOR))
    }

    /// Where the full-size image goes for a widget rendered into `area`.
    ///
    /// Square in pixels: twice as many columns as rows.
    pub fn image_area(area: Rect) -> Rect {
        let inner = Block::default().borders(Borders::ALL).inner(area);
        let rows = (inner.height / 2).min(inner.width / 2);
        let cols = rows * 2;
        Rect::new(inner.x + (inner.width - cols) / 2, inner.y, cols, rows)
    }

    fn render_image(&self, area: Rect, buf: &mut Buffer) {
        let url = &self.drink.image_url;
        match (self.mode, self.images.state(url)) {
            (RenderMode::Blocks, Some(ImageState::Ready(_))) => {
                if let Some(blocks) = self.images.blocks(url) {
                    blocks.draw(buf, area, 0);
                    return;
                }
            }
            (RenderMode::Kitty, Some(ImageState::Ready(_))) => return,
            _ => {}
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(PLACEHOLDER_COLOR));
        let inner = block.inner(area);
        block.render(area, buf);

        let indicator = match self.images.state(url) {
            Some(ImageState::Ready(_)) => "[ image ]",
            _ => "loading…",
        };
        let middle = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, inner.height.min(1));
        Paragraph::new(Span::styled(indicator, Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center)
            .render(middle, buf);
    }
}

impl Widget for DrinkDetailWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Self::block(self.drink);
        let inner = block.inner(area);
        block.render(area, buf);

        let image = Self::image_area(area);
        if image.width > 0 && image.height > 0 {
            self.render_image(image, buf);
        }

        let text_top = image.y + image.height + 1;
        if text_top >= inner.y + inner.height {
            return;
        }
        let text_area = Rect::new(inner.x + 1, text_top, inner.width.saturating_sub(2), inner.y + inner.height - text_top);

        let lines = vec![
            Line::from(Span::styled(
                self.drink.name.as_str(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(self.drink.price_label(), Style::default().fg(PRICE_COLOR))),
            Line::from(""),
            Line::from(Span::styled(
                self.drink.description.as_str(),
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            Line::from(Span::styled("[Esc] Back  [q] Quit", Style::default().fg(Color::DarkGray))),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(text_area, buf);
    }
}
