//! Sectioned grid model
//!
//! The grid is driven by two narrow capabilities: a `MenuDataSource` that
//! answers "what is in section i", and a `GridLayout` that answers "how big is
//! everything". `ContentLayout` combines them into content coordinates that
//! the widget and the scroll logic share.

use crate::menu::{Drink, DrinkCategory};

/// Position of an item in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

/// Supplies sections and items to the grid
pub trait MenuDataSource {
    fn number_of_sections(&self) -> usize;
    fn number_of_items(&self, section: usize) -> usize;
    fn section_title(&self, section: usize) -> Option<&str>;
    fn drink_at(&self, path: IndexPath) -> Option<&Drink>;
}

impl MenuDataSource for [DrinkCategory] {
    fn number_of_sections(&self) -> usize {
        self.len()
    }

    fn number_of_items(&self, section: usize) -> usize {
        self.get(section).map_or(0, |c| c.drinks.len())
    }

    fn section_title(&self, section: usize) -> Option<&str> {
        self.get(section).map(|c| c.name.as_str())
    }

    fn drink_at(&self, path: IndexPath) -> Option<&Drink> {
        self.get(path.section)?.drinks.get(path.row)
    }
}

/// Width and height in layout units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

/// Sizes the grid's cells and headers
pub trait GridLayout {
    fn columns(&self) -> u16;
    fn item_size(&self, viewport_width: u16) -> Size;
    fn item_spacing(&self) -> u16;
    fn header_height(&self) -> u16;
    /// Rows under the thumbnail reserved for name and price
    fn label_height(&self) -> u16;
    fn pins_headers(&self) -> bool;
}

/// Fixed-column flow layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLayout {
    pub columns: u16,
    pub item_spacing: u16,
    pub label_height: u16,
    pub header_height: u16,
    /// Thumbnail height is `width / row_divisor`
    pub row_divisor: u16,
    pub pin_headers: bool,
}

impl Default for FlowLayout {
    /// Two columns, square thumbnails with a 50 unit label strip
    fn default() -> Self {
        Self {
            columns: 2,
            item_spacing: 0,
            label_height: 50,
            header_height: 50,
            row_divisor: 1,
            pin_headers: true,
        }
    }
}

impl FlowLayout {
    /// Terminal cells are about twice as tall as they are wide
    pub fn terminal() -> Self {
        Self {
            label_height: 2,
            header_height: 1,
            row_divisor: 2,
            ..Self::default()
        }
    }
}

impl GridLayout for FlowLayout {
    fn columns(&self) -> u16 {
        self.columns.max(1)
    }

    fn item_size(&self, viewport_width: u16) -> Size {
        let columns = self.columns();
        let gaps = self.item_spacing.saturating_mul(columns - 1);
        let width = viewport_width.saturating_sub(gaps) / columns;
        let height = (width / self.row_divisor.max(1)).saturating_add(self.label_height);
        Size { width, height }
    }

    fn item_spacing(&self) -> u16 {
        self.item_spacing
    }

    fn header_height(&self) -> u16 {
        self.header_height
    }

    fn label_height(&self) -> u16 {
        self.label_height
    }

    fn pins_headers(&self) -> bool {
        self.pin_headers
    }
}

/// A rectangle in content coordinates (y grows down from the top of the grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRect {
    pub x: u16,
    pub y: u32,
    pub width: u16,
    pub height: u16,
}

impl ContentRect {
    pub fn bottom(&self) -> u32 {
        self.y + self.height as u32
    }
}

/// Vertical placement of one section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionFrame {
    pub section: usize,
    pub header_top: u32,
    pub items_top: u32,
    pub items: usize,
    pub bottom: u32,
}

/// Resolved geometry for a data source at a given viewport width
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLayout {
    pub sections: Vec<SectionFrame>,
    pub item: Size,
    pub columns: u16,
    pub spacing: u16,
    pub header_height: u16,
    pub total_height: u32,
}

impl ContentLayout {
    pub fn compute<S, L>(source: &S, layout: &L, viewport_width: u16) -> Self
    where
        S: MenuDataSource + ?Sized,
        L: GridLayout,
    {
        let item = layout.item_size(viewport_width);
        let columns = layout.columns();
        let spacing = layout.item_spacing();
        let header_height = layout.header_height();

        let mut sections = Vec::with_capacity(source.number_of_sections());
        let mut y: u32 = 0;
        for section in 0..source.number_of_sections() {
            let items = source.number_of_items(section);
            let rows = items.div_ceil(columns as usize) as u32;
            let header_top = y;
            let items_top = header_top + header_height as u32;
            let rows_height = if rows == 0 {
                0
            } else {
                rows * item.height as u32 + (rows - 1) * spacing as u32
            };
            let bottom = items_top + rows_height;

            sections.push(SectionFrame {
                section,
                header_top,
                items_top,
                items,
                bottom,
            });
            y = bottom;
        }

        Self {
            sections,
            item,
            columns,
            spacing,
            header_height,
            total_height: y,
        }
    }

    /// Frame of an item, or `None` when the path is out of range
    pub fn item_frame(&self, path: IndexPath) -> Option<ContentRect> {
        let frame = self.sections.get(path.section)?;
        if path.row >= frame.items {
            return None;
        }

        let columns = self.columns as usize;
        let column = (path.row % columns) as u16;
        let line = (path.row / columns) as u32;

        Some(ContentRect {
            x: column * (self.item.width + self.spacing),
            y: frame.items_top + line * (self.item.height as u32 + self.spacing as u32),
            width: self.item.width,
            height: self.item.height,
        })
    }

    /// Items intersecting the vertical window `[top, top + height)`
    pub fn visible_items(&self, top: u32, height: u16) -> Vec<(IndexPath, ContentRect)> {
        let bottom = top + height as u32;
        let mut visible = Vec::new();

        for frame in &self.sections {
            if frame.bottom <= top || frame.items_top >= bottom {
                continue;
            }
            for row in 0..frame.items {
                let path = IndexPath::new(frame.section, row);
                if let Some(rect) = self.item_frame(path) {
                    if rect.bottom() > top && rect.y < bottom {
                        visible.push((path, rect));
                    }
                }
            }
        }

        visible
    }

    /// Headers intersecting the window, with their content y
    pub fn visible_headers(&self, top: u32, height: u16) -> Vec<(usize, u32)> {
        let bottom = top + height as u32;
        self.sections
            .iter()
            .filter(|f| f.header_top + self.header_height as u32 > top && f.header_top < bottom)
            .map(|f| (f.section, f.header_top))
            .collect()
    }

    /// Section whose header sticks to the top of the viewport
    pub fn pinned_section(&self, top: u32) -> Option<usize> {
        self.sections
            .iter()
            .filter(|f| f.header_top <= top && top < f.bottom)
            .map(|f| f.section)
            .last()
    }

    /// Scroll offset that brings `path` fully into view.
    ///
    /// Moving onto the first line of a section also reveals its header.
    pub fn scroll_to_reveal(&self, path: IndexPath, scroll: u32, viewport_height: u16) -> u32 {
        let Some(rect) = self.item_frame(path) else {
            return scroll;
        };
        let frame = &self.sections[path.section];
        let first_line = path.row < self.columns as usize;

        let top = if first_line { frame.header_top } else { rect.y };
        let pinned = if first_line { 0 } else { self.header_height as u32 };

        if top < scroll + pinned {
            return top.saturating_sub(pinned);
        }

        let viewport = viewport_height as u32;
        if rect.bottom() > scroll + viewport {
            let scroll = rect.bottom().saturating_sub(viewport);
            return scroll.min(top.saturating_sub(pinned));
        }

        scroll
    }

    /// Largest useful scroll offset
    pub fn max_scroll(&self, viewport_height: u16) -> u32 {
        self.total_height.saturating_sub(viewport_height as u32)
    }
}

/// Result of resolving the current grid selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    Drink(&'a Drink),
    None,
}

/// Resolve the selected path to a drink.
///
/// With nothing selected the first drink of the first section is used.
pub fn resolve_selection<S>(source: &S, selected: Option<IndexPath>) -> Selection<'_>
where
    S: MenuDataSource + ?Sized,
{
    let path = selected.unwrap_or(IndexPath::new(0, 0));
    match source.drink_at(path) {
        Some(drink) => Selection::Drink(drink),
        None => Selection::None,
    }
}

/// Direction for cursor movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// First item of the first non-empty section
pub fn first_item<S: MenuDataSource + ?Sized>(source: &S) -> Option<IndexPath> {
    (0..source.number_of_sections())
        .find(|&s| source.number_of_items(s) > 0)
        .map(|s| IndexPath::new(s, 0))
}

/// Move a cursor one step through the grid.
///
/// Vertical moves cross section boundaries and skip empty sections; the
/// column is kept where the target line allows it.
pub fn move_cursor<S>(source: &S, columns: u16, from: IndexPath, direction: Direction) -> IndexPath
where
    S: MenuDataSource + ?Sized,
{
    let columns = columns.max(1) as usize;
    let count = source.number_of_items(from.section);
    if from.row >= count {
        return first_item(source).unwrap_or(from);
    }

    let column = from.row % columns;
    let line = from.row / columns;
    let last_line = (count - 1) / columns;

    match direction {
        Direction::Left if column > 0 => IndexPath::new(from.section, from.row - 1),
        Direction::Right if column + 1 < columns && from.row + 1 < count => {
            IndexPath::new(from.section, from.row + 1)
        }
        Direction::Down if line < last_line => {
            IndexPath::new(from.section, (from.row + columns).min(count - 1))
        }
        Direction::Down => (from.section + 1..source.number_of_sections())
            .find(|&s| source.number_of_items(s) > 0)
            .map(|s| IndexPath::new(s, column.min(source.number_of_items(s) - 1)))
            .unwrap_or(from),
        Direction::Up if line > 0 => IndexPath::new(from.section, from.row - columns),
        Direction::Up => (0..from.section)
            .rev()
            .find(|&s| source.number_of_items(s) > 0)
            .map(|s| {
                let count = source.number_of_items(s);
                let last_line_start = ((count - 1) / columns) * columns;
                IndexPath::new(s, (last_line_start + column).min(count - 1))
            })
            .unwrap_or(from),
        _ => from,
    }
}
