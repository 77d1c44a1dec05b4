//! View tabs and the bar that lists them

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::tui::theme::Theme;

const TABS: [Tab; 4] = [Tab::Overview, Tab::Records, Tab::Hours, Tab::Users];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Summary cards, top items, busiest hours
    #[default]
    Overview,
    /// Matching records in load order
    Records,
    /// 24-hour histogram
    Hours,
    /// User directory
    Users,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Records => "Records",
            Self::Hours => "Hours",
            Self::Users => "Users",
        }
    }

    fn position(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        TABS[(self.position() + 1) % TABS.len()]
    }

    pub fn prev(self) -> Self {
        TABS[(self.position() + TABS.len() - 1) % TABS.len()]
    }

    /// Tab for a number key, 1-based
    pub fn from_number(n: u8) -> Option<Self> {
        TABS.get((n as usize).checked_sub(1)?).copied()
    }
}

pub struct TabBar {
    selected: Tab,
    theme: Theme,
}

impl TabBar {
    pub fn new(selected: Tab, theme: Theme) -> Self {
        Self { selected, theme }
    }
}

impl Widget for TabBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::with_capacity(TABS.len() * 2);
        for (i, tab) in TABS.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Style::default().fg(self.theme.muted())));
            }
            if *tab == self.selected {
                spans.push(Span::styled(
                    format!("[{}]", tab.label()),
                    Style::default()
                        .fg(self.theme.accent())
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::styled(
                    tab.label(),
                    Style::default().fg(self.theme.muted()),
                ));
            }
        }

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}
