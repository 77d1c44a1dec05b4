//! Error view - failure summary with expandable diagnostic detail

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::tui::theme::Theme;
use crate::types::RemoteDetail;

pub struct ErrorView<'a> {
    message: &'a str,
    detail: Option<&'a RemoteDetail>,
    expanded: bool,
    theme: Theme,
}

impl<'a> ErrorView<'a> {
    pub fn new(
        message: &'a str,
        detail: Option<&'a RemoteDetail>,
        expanded: bool,
        theme: Theme,
    ) -> Self {
        Self {
            message,
            detail,
            expanded,
            theme,
        }
    }
}

impl Widget for ErrorView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::default(),
            Line::from(Span::styled(
                format!("Error: {}", self.message),
                Style::default()
                    .fg(self.theme.error())
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            Line::default(),
        ];

        match (self.detail, self.expanded) {
            (Some(detail), true) => {
                lines.extend(detail.render().lines().map(|line| {
                    Line::from(Span::styled(
                        line.to_string(),
                        Style::default().fg(self.theme.text()),
                    ))
                }));
                lines.push(Line::default());
                lines.push(hint("d: hide details  o: open another source", self.theme));
            }
            (Some(_), false) => {
                lines.push(hint("d: show details  o: open another source", self.theme));
            }
            (None, _) => lines.push(hint("o: open another source", self.theme)),
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

fn hint(text: &'static str, theme: Theme) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(theme.muted()))).alignment(Alignment::Center)
}
