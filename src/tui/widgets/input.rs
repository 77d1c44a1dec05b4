//! Single-line input bar (search box and open prompt)

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

pub struct InputBar<'a> {
    label: &'a str,
    value: &'a str,
    placeholder: &'a str,
    active: bool,
    theme: Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(label: &'a str, value: &'a str, theme: Theme) -> Self {
        Self {
            label,
            value,
            placeholder: "",
            active: false,
            theme,
        }
    }

    /// Muted text shown while the value is empty and not being edited
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Whether keystrokes currently go to this bar (draws a cursor)
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label_style = if self.active {
            Style::default()
                .fg(self.theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.muted())
        };

        let mut spans = vec![Span::styled(format!("{}: ", self.label), label_style)];
        if self.value.is_empty() && !self.active {
            spans.push(Span::styled(
                self.placeholder,
                Style::default().fg(self.theme.muted()),
            ));
        } else {
            spans.push(Span::styled(self.value, Style::default().fg(self.theme.text())));
        }
        if self.active {
            spans.push(Span::styled("▏", Style::default().fg(self.theme.accent())));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
