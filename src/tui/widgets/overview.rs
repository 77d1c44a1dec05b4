//! Overview widget: summary cards, top items and busiest hours

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::services::{
    format_amount, format_number, format_percentage_bar, pad_width, truncate_width,
};
use crate::tui::theme::Theme;
use crate::types::AggregateStats;

/// Maximum content width (keeps the cards together on wide terminals)
const MAX_CONTENT_WIDTH: u16 = 100;
const BAR_WIDTH: usize = 16;
/// Display cells for an item name in the top-items list
const ITEM_WIDTH: usize = 14;

/// Which records the statistics cover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    All,
    Query { query: &'a str },
}

pub struct Overview<'a> {
    stats: Option<&'a AggregateStats>,
    scope: Scope<'a>,
    theme: Theme,
}

impl<'a> Overview<'a> {
    pub fn new(stats: Option<&'a AggregateStats>, scope: Scope<'a>, theme: Theme) -> Self {
        Self {
            stats,
            scope,
            theme,
        }
    }
}

impl Widget for Overview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content_width = area.width.min(MAX_CONTENT_WIDTH);
        let x_offset = (area.width.saturating_sub(content_width)) / 2;
        let area = Rect {
            x: area.x + x_offset,
            width: content_width,
            ..area
        };

        let chunks = Layout::vertical([
            Constraint::Length(1), // Scope title
            Constraint::Length(1), // Blank
            Constraint::Length(3), // Cards
            Constraint::Length(1), // Blank
            Constraint::Fill(1),   // Top lists
        ])
        .split(area);

        self.render_title(chunks[0], buf);

        let Some(stats) = self.stats else {
            let message = match self.scope {
                Scope::All => "No records loaded".to_string(),
                Scope::Query { query } => format!("No records match {:?}", query),
            };
            Paragraph::new(Span::styled(message, Style::default().fg(self.theme.muted())))
                .alignment(Alignment::Center)
                .render(chunks[2], buf);
            return;
        };

        self.render_cards(stats, chunks[2], buf);

        let [items_area, hours_area] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .areas(chunks[4]);
        self.render_top_items(stats, items_area, buf);
        self.render_top_hours(stats, hours_area, buf);
    }
}

impl Overview<'_> {
    fn render_title(&self, area: Rect, buf: &mut Buffer) {
        let title = match self.scope {
            Scope::All => "All records".to_string(),
            Scope::Query { query } => format!("Results for {:?}", query),
        };
        Paragraph::new(Span::styled(
            title,
            Style::default()
                .fg(self.theme.heading())
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(area, buf);
    }

    fn render_cards(&self, stats: &AggregateStats, area: Rect, buf: &mut Buffer) {
        let third_card = match self.scope {
            // Filtered view shows the favorite item in place of the user count
            Scope::Query { .. } => (
                stats.favorite_item().unwrap_or("-").to_string(),
                "favorite item",
            ),
            Scope::All => (format_number(stats.unique_users), "users"),
        };

        let cards = [
            (
                format_amount(stats.total_spent),
                "total spent",
                self.theme.amount(),
            ),
            (
                format_number(stats.total_items),
                "items bought",
                self.theme.stat(),
            ),
            (third_card.0, third_card.1, self.theme.accent()),
        ];

        let areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
        for ((value, label, color), card_area) in cards.into_iter().zip(areas.iter()) {
            Paragraph::new(vec![
                Line::from(Span::styled(
                    value,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(label, Style::default().fg(self.theme.muted()))),
            ])
            .alignment(Alignment::Center)
            .render(*card_area, buf);
        }
    }

    fn render_top_items(&self, stats: &AggregateStats, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![self.section_header("Top items")];
        for (rank, item) in stats.top_items.iter().enumerate() {
            let share = item.share(stats.total_items);
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}. ", rank + 1),
                    Style::default().fg(self.theme.muted()),
                ),
                Span::styled(
                    pad_width(&truncate_width(&item.name, ITEM_WIDTH), ITEM_WIDTH + 1),
                    Style::default().fg(self.theme.text()),
                ),
                Span::styled(
                    format_percentage_bar(share, BAR_WIDTH),
                    Style::default().fg(self.theme.bar()),
                ),
                Span::styled(
                    format!(" {:>4} ({:.0}%)", format_number(item.count), share),
                    Style::default().fg(self.theme.text()),
                ),
            ]));
        }
        Paragraph::new(lines).render(area, buf);
    }

    fn render_top_hours(&self, stats: &AggregateStats, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![self.section_header("Busiest hours")];
        for slot in &stats.top_hours {
            lines.push(Line::from(vec![
                Span::styled(slot.label(), Style::default().fg(self.theme.heading())),
                Span::styled(
                    format!("  {:>4}", format_number(slot.count)),
                    Style::default().fg(self.theme.text()),
                ),
            ]));
        }
        Paragraph::new(lines).render(area, buf);
    }

    fn section_header(&self, title: &'static str) -> Line<'static> {
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(self.theme.text())
                .add_modifier(Modifier::BOLD),
        ))
    }
}
