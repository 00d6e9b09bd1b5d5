//! Modal alert with a single dismiss action

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

/// A message the user has to dismiss
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub action: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            action: "Dismiss".to_string(),
        }
    }
}

pub struct AlertWidget<'a> {
    alert: &'a Alert,
}

impl<'a> AlertWidget<'a> {
    pub fn new(alert: &'a Alert) -> Self {
        Self { alert }
    }
}

impl Widget for AlertWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup = super::centered_rect(60, 40, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.alert.title))
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(Color::Rgb(200, 80, 80)));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.alert.message.as_str(),
                Style::default().fg(Color::White),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("[ {} ]", self.alert.action),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
        ];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
