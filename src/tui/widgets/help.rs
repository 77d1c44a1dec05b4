//! Help popup widget - displays keyboard shortcuts

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::tui::theme::Theme;

/// Version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

const POPUP_WIDTH: u16 = 48;
const POPUP_HEIGHT: u16 = 26;

const NAVIGATION: &[(&str, &str)] = &[
    ("Tab / Shift+Tab", "Switch view"),
    ("1-4", "Jump to view"),
    ("Up/Down or j/k", "Scroll / select"),
    ("Enter", "Search selected user"),
];

const DATA: &[(&str, &str)] = &[
    ("/", "Search user ID or name"),
    ("c", "Clear search"),
    ("o", "Open file or YYYY-MM month"),
    ("r", "Reload current source"),
    ("l", "Log out of the API"),
    ("d", "Toggle error detail"),
];

const GENERAL: &[(&str, &str)] = &[("q / Esc", "Quit"), ("?", "Toggle help")];

/// Help popup widget showing keyboard shortcuts
pub struct HelpPopup {
    theme: Theme,
}

impl HelpPopup {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Calculate centered popup area
    pub fn centered_area(area: Rect) -> Rect {
        let x = area.x + (area.width.saturating_sub(POPUP_WIDTH)) / 2;
        let y = area.y + (area.height.saturating_sub(POPUP_HEIGHT)) / 2;
        Rect {
            x,
            y,
            width: POPUP_WIDTH.min(area.width),
            height: POPUP_HEIGHT.min(area.height),
        }
    }

    fn section<'a>(&self, title: &'a str, keys: &[(&'a str, &'a str)], width: u16) -> Vec<Line<'a>> {
        let mut lines = vec![
            Line::from(Span::styled(
                title,
                Style::default()
                    .fg(self.theme.heading())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "─".repeat(width as usize),
                Style::default().fg(self.theme.muted()),
            )),
        ];
        lines.extend(keys.iter().map(|(key, desc)| {
            Line::from(vec![
                Span::styled(
                    format!("  {:<18}", key),
                    Style::default().fg(self.theme.accent()),
                ),
                Span::styled(*desc, Style::default().fg(self.theme.text())),
            ])
        }));
        lines.push(Line::default());
        lines
    }
}

impl Default for HelpPopup {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Widget for HelpPopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Overlay
        Clear.render(area, buf);

        let title = format!(" vendtrack v{} ", VERSION);
        let block = Block::default()
            .title(title)
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = vec![Line::default()];
        lines.extend(self.section("Navigation", NAVIGATION, inner.width));
        lines.extend(self.section("Data", DATA, inner.width));
        lines.extend(self.section("General", GENERAL, inner.width));
        lines.push(
            Line::from(Span::styled(
                "Press ? to close",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center),
        );

        Paragraph::new(lines).render(inner, buf);
    }
}
