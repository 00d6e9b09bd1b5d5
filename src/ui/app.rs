//! Main UI Application
//!
//! Owns all menu state. Only the UI thread touches it: background fetch
//! results arrive through the dispatcher and are applied in `update`.

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use image::DynamicImage;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use super::grid::{self, ContentLayout, FlowLayout, GridLayout, IndexPath, Selection};
use super::widgets::{Alert, AlertWidget, DrinkDetailWidget, MenuGridWidget, HEADER_BG};
use crate::fetch::{Dispatcher, FetchEvent};
use crate::menu::{Drink, DrinkCategory};
use crate::render::{ImagePlacement, ImageStore, RenderMode};

/// Title of the alert shown when the menu cannot be loaded
pub const LOAD_ERROR_TITLE: &str = "Failed to fetch data!";

/// Which screen is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Menu,
    /// The drink handed over from the grid
    Detail(Drink),
}

/// Main UI application
pub struct App {
    dispatcher: Dispatcher,
    /// Menu sections in display order; empty until a load succeeds
    categories: Vec<DrinkCategory>,
    screen: Screen,
    layout: FlowLayout,
    /// Geometry for the current categories and viewport width
    content: ContentLayout,
    /// Selected grid position, if the user has moved the cursor
    cursor: Option<IndexPath>,
    /// Vertical scroll offset into the grid, in rows
    scroll: u32,
    /// Grid area from the last frame
    viewport: Rect,
    images: ImageStore,
    alert: Option<Alert>,
    render_mode: RenderMode,
    load_requested: bool,
    loading: bool,
    /// Kitty image placements for the last frame
    placements: Vec<ImagePlacement>,
}

impl App {
    pub fn new(dispatcher: Dispatcher, render_mode: RenderMode) -> Self {
        let layout = FlowLayout::terminal();
        let categories = Vec::new();
        let content = ContentLayout::compute(categories.as_slice(), &layout, 0);

        Self {
            dispatcher,
            categories,
            screen: Screen::Menu,
            layout,
            content,
            cursor: None,
            scroll: 0,
            viewport: Rect::default(),
            images: ImageStore::new(),
            alert: None,
            render_mode,
            load_requested: false,
            loading: false,
            placements: Vec::new(),
        }
    }

    pub fn categories(&self) -> &[DrinkCategory] {
        &self.categories
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn cursor(&self) -> Option<IndexPath> {
        self.cursor
    }

    pub fn scroll(&self) -> u32 {
        self.scroll
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Cycle through render modes
    pub fn cycle_render_mode(&mut self) {
        self.render_mode = self.render_mode.next();
        log::info!("Switched to render mode: {:?}", self.render_mode);
    }

    /// Kitty placements computed by the last `render`
    pub fn image_placements(&self) -> &[ImagePlacement] {
        &self.placements
    }

    /// A downloaded image, if ready
    pub fn image(&self, url: &str) -> Option<Arc<DynamicImage>> {
        self.images.image(url)
    }

    /// Request the menu. Only the first call on a screen does anything.
    pub fn load(&mut self) {
        if self.load_requested {
            return;
        }
        self.load_requested = true;
        self.loading = true;
        self.dispatcher.request_menu();
    }

    /// Apply every completed background request
    pub fn update(&mut self) {
        for event in self.dispatcher.poll() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::MenuLoaded(Ok(categories)) => {
                self.loading = false;
                self.show_menu(categories);
            }
            FetchEvent::MenuLoaded(Err(e)) => {
                self.loading = false;
                log::error!("Menu fetch failed: {}", e);
                self.alert = Some(Alert::new(LOAD_ERROR_TITLE, e.to_string()));
            }
            FetchEvent::ImageLoaded { url, image } => {
                if image.is_none() {
                    log::debug!("No image for {}", url);
                }
                self.images.resolve(url, image);
            }
        }
    }

    /// Replace the menu and reload the grid
    fn show_menu(&mut self, categories: Vec<DrinkCategory>) {
        self.categories = categories;
        self.cursor = None;
        self.scroll = 0;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.content = ContentLayout::compute(self.categories.as_slice(), &self.layout, self.viewport.width);
        self.scroll = self.scroll.min(self.content.max_scroll(self.viewport.height));
    }

    /// Hand the selected drink to the detail screen.
    ///
    /// Without a selection the first drink is shown; with nothing to show
    /// this does nothing.
    pub fn open_selected(&mut self) {
        match grid::resolve_selection(self.categories.as_slice(), self.cursor) {
            Selection::Drink(drink) => {
                log::info!("Showing {}", drink.name);
                self.screen = Screen::Detail(drink.clone());
            }
            Selection::None => log::debug!("Nothing to show for {:?}", self.cursor),
        }
    }

    /// Return from the detail screen
    pub fn unwind(&mut self) {
        self.screen = Screen::Menu;
    }

    pub fn move_cursor(&mut self, direction: grid::Direction) {
        let source = self.categories.as_slice();
        let next = match self.cursor {
            Some(path) => Some(grid::move_cursor(source, self.layout.columns(), path, direction)),
            None => grid::first_item(source),
        };

        if let Some(path) = next {
            self.cursor = Some(path);
            self.scroll = self.content.scroll_to_reveal(path, self.scroll, self.viewport.height);
        }
    }

    /// Handle keyboard input, returns true if should quit
    pub fn handle_input(&mut self, key: KeyEvent) -> Result<bool> {
        // Global quit shortcut
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Backspace | KeyCode::Char(' ')) {
                self.alert = None;
            }
            return Ok(false);
        }

        match self.screen {
            Screen::Menu => Ok(self.handle_menu_input(key)),
            Screen::Detail(_) => Ok(self.handle_detail_input(key)),
        }
    }

    fn handle_menu_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(grid::Direction::Up),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(grid::Direction::Down),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(grid::Direction::Left),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(grid::Direction::Right),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('m') => self.cycle_render_mode(),
            _ => {}
        }
        false
    }

    fn handle_detail_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => self.unwind(),
            KeyCode::Char('m') => self.cycle_render_mode(),
            _ => {}
        }
        false
    }

    /// Start a fetch for `url` unless one was already made
    fn request_image(&mut self, url: &str) {
        if self.images.request(url) {
            self.dispatcher.request_image(url);
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        // Clear the entire screen first to prevent artifacts
        frame.render_widget(Clear, frame.area());
        self.placements.clear();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_title_bar(frame, chunks[0]);

        match self.screen.clone() {
            Screen::Menu => self.render_menu(frame, chunks[1]),
            Screen::Detail(drink) => self.render_detail(frame, chunks[1], &drink),
        }

        self.render_help_bar(frame, chunks[2]);

        if let Some(alert) = &self.alert {
            // Images would cover the popup
            self.placements.clear();
            frame.render_widget(AlertWidget::new(alert), frame.area());
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let status = if self.loading {
            "Loading menu…".to_string()
        } else {
            let drinks: usize = self.categories.iter().map(|c| c.drinks.len()).sum();
            format!("{} categories · {} drinks", self.categories.len(), drinks)
        };

        let style = Style::default().bg(HEADER_BG).fg(Color::White);
        frame.render_widget(Paragraph::new("").style(style), area);
        frame.render_widget(
            Paragraph::new(Span::styled(" Drink Menu", style.add_modifier(Modifier::BOLD))),
            area,
        );
        frame.render_widget(
            Paragraph::new(Span::styled(format!("{} ", status), style.fg(Color::Gray)))
                .alignment(Alignment::Right),
            area,
        );
    }

    fn render_help_bar(&self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(Color::DarkGray);

        let keys: &[(&str, &str)] = match self.screen {
            Screen::Menu => &[("←↑↓→", "Move"), ("Enter", "Details"), ("m", "Render mode"), ("q", "Quit")],
            Screen::Detail(_) => &[("Esc", "Back"), ("m", "Render mode"), ("q", "Quit")],
        };

        let mut spans = Vec::new();
        for (key, desc) in keys {
            spans.push(Span::styled(format!(" {} ", key), key_style));
            spans.push(Span::styled(format!("{} ", desc), desc_style));
        }
        spans.push(Span::styled(format!(" [{}]", self.render_mode.name()), desc_style));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_menu(&mut self, frame: &mut Frame, area: Rect) {
        if area != self.viewport {
            self.viewport = area;
            self.relayout();
        }
        self.scroll = self.scroll.min(self.content.max_scroll(area.height));

        if self.categories.is_empty() {
            let message = if self.loading { "Loading menu…" } else { "No drinks to show" };
            let middle = Rect::new(area.x, area.y + area.height / 2, area.width, area.height.min(1));
            frame.render_widget(
                Paragraph::new(Span::styled(message, Style::default().fg(Color::Gray)))
                    .alignment(Alignment::Center),
                middle,
            );
            return;
        }

        let visible = self.content.visible_items(self.scroll, area.height);
        let thumb_rows = self.content.item.height.saturating_sub(self.layout.label_height());
        let pinned_rows = if self.layout.pins_headers() {
            self.layout.header_height() as u32
        } else {
            0
        };

        for (path, rect) in &visible {
            let Some(url) = self
                .categories
                .get(path.section)
                .and_then(|c| c.drinks.get(path.row))
                .map(|d| d.thumbnail_url.clone())
            else {
                continue;
            };

            // Each visible cell asks for its own thumbnail
            self.request_image(&url);

            let cols = rect.width.saturating_sub(2);
            match self.render_mode {
                RenderMode::Blocks => self.images.prepare_blocks(&url, cols, thumb_rows),
                RenderMode::Kitty => {
                    // Only whole thumbnails below the pinned header
                    let fully_visible = rect.y >= self.scroll + pinned_rows
                        && rect.y + thumb_rows as u32 <= self.scroll + area.height as u32;
                    if fully_visible && self.images.is_ready(&url) && cols > 0 && thumb_rows > 0 {
                        self.placements.push(ImagePlacement {
                            url,
                            col: area.x + rect.x + 1,
                            row: area.y + (rect.y - self.scroll) as u16,
                            cols,
                            rows: thumb_rows,
                        });
                    }
                }
                RenderMode::Ascii => {}
            }
        }

        let widget = MenuGridWidget::new(self.categories.as_slice(), &self.layout, &self.content, &self.images)
            .scroll(self.scroll)
            .cursor(self.cursor)
            .mode(self.render_mode);
        frame.render_widget(widget, area);
    }

    fn render_detail(&mut self, frame: &mut Frame, area: Rect, drink: &Drink) {
        self.request_image(&drink.image_url);

        let image_area = DrinkDetailWidget::image_area(area);
        match self.render_mode {
            RenderMode::Blocks => self
                .images
                .prepare_blocks(&drink.image_url, image_area.width, image_area.height),
            RenderMode::Kitty if self.images.is_ready(&drink.image_url) && image_area.area() > 0 => {
                self.placements.push(ImagePlacement {
                    url: drink.image_url.clone(),
                    col: image_area.x,
                    row: image_area.y,
                    cols: image_area.width,
                    rows: image_area.height,
                });
            }
            _ => {}
        }

        frame.render_widget(
            DrinkDetailWidget::new(drink, &self.images).mode(self.render_mode),
            area,
        );
    }
}
