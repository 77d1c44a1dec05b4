//! Users view - directory of every user name in the loaded data

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

pub struct UsersView<'a> {
    users: &'a [String],
    selected: usize,
    theme: Theme,
}

impl<'a> UsersView<'a> {
    pub fn new(users: &'a [String], selected: usize, theme: Theme) -> Self {
        Self {
            users,
            selected,
            theme,
        }
    }

    /// First visible row so that `selected` stays on screen
    pub fn window_start(selected: usize, visible: usize) -> usize {
        if visible == 0 {
            return 0;
        }
        (selected + 1).saturating_sub(visible)
    }
}

impl Widget for UsersView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        if self.users.is_empty() {
            Paragraph::new(Span::styled(
                "No users in the loaded data",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        }

        let header = Line::from(Span::styled(
            format!("{} users (Enter to search)", self.users.len()),
            Style::default()
                .fg(self.theme.heading())
                .add_modifier(Modifier::BOLD),
        ));

        let visible = area.height.saturating_sub(1) as usize;
        let start = Self::window_start(self.selected, visible);

        let mut lines = vec![header];
        for (i, name) in self.users.iter().enumerate().skip(start).take(visible) {
            let is_selected = i == self.selected;
            let (marker, style) = if is_selected {
                (
                    "▸ ",
                    Style::default()
                        .fg(self.theme.accent())
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("  ", Style::default().fg(self.theme.text()))
            };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(self.theme.accent())),
                Span::styled(name.as_str(), style),
            ]));
        }

        Paragraph::new(lines).render(area, buf);
    }
}
