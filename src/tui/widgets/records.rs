//! Records view - table of the transactions matching the search

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Widget},
};

use crate::services::{format_amount, truncate_width};
use crate::tui::theme::Theme;
use crate::types::ConsumptionRecord;

const TIME_WIDTH: u16 = 19;
const ID_WIDTH: u16 = 10;
const NAME_WIDTH: u16 = 16;
const ITEM_WIDTH: u16 = 18;
const AMOUNT_WIDTH: u16 = 9;

pub struct RecordsView<'a> {
    records: &'a [&'a ConsumptionRecord],
    scroll: usize,
    /// Set when no search is active, to show the hint instead of an empty table
    query_empty: bool,
    theme: Theme,
}

impl<'a> RecordsView<'a> {
    pub fn new(
        records: &'a [&'a ConsumptionRecord],
        scroll: usize,
        query_empty: bool,
        theme: Theme,
    ) -> Self {
        Self {
            records,
            scroll,
            query_empty,
            theme,
        }
    }

    /// Rows that fit below the header line
    pub fn visible_rows(height: u16) -> usize {
        height.saturating_sub(1) as usize
    }

    /// Largest useful scroll offset for `total` rows in `height` lines
    pub fn max_scroll(total: usize, height: u16) -> usize {
        total.saturating_sub(Self::visible_rows(height))
    }
}

impl Widget for RecordsView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        if self.query_empty || self.records.is_empty() {
            let hint = if self.query_empty {
                "Press / and type a user ID or name to list their records"
            } else {
                "No matching records"
            };
            Paragraph::new(Span::styled(hint, Style::default().fg(self.theme.muted())))
                .alignment(Alignment::Center)
                .render(area, buf);
            return;
        }

        let header = Row::new(vec![
            Cell::from("Time"),
            Cell::from("User ID"),
            Cell::from("Name"),
            Cell::from("Item"),
            Cell::from(Line::from("Amount").alignment(Alignment::Right)),
        ])
        .style(
            Style::default()
                .fg(self.theme.heading())
                .add_modifier(Modifier::BOLD),
        );

        let visible = Self::visible_rows(area.height);
        let scroll = self.scroll.min(Self::max_scroll(self.records.len(), area.height));
        let rows: Vec<Row> = self
            .records
            .iter()
            .skip(scroll)
            .take(visible)
            .map(|record| self.row(record))
            .collect();

        Table::new(
            rows,
            [
                Constraint::Length(TIME_WIDTH),
                Constraint::Length(ID_WIDTH),
                Constraint::Length(NAME_WIDTH),
                Constraint::Length(ITEM_WIDTH),
                Constraint::Length(AMOUNT_WIDTH),
            ],
        )
        .header(header)
        .column_spacing(2)
        .render(area, buf);
    }
}

impl RecordsView<'_> {
    /// Text cells are cut by display width so wide names end in an ellipsis
    /// rather than being clipped mid-column
    fn row(&self, record: &ConsumptionRecord) -> Row<'static> {
        let text = Style::default().fg(self.theme.text());
        Row::new(vec![
            Cell::from(record.local_time_label()).style(Style::default().fg(self.theme.muted())),
            Cell::from(truncate_width(&record.user_id, ID_WIDTH as usize)).style(text),
            Cell::from(truncate_width(&record.user_name, NAME_WIDTH as usize)).style(text),
            Cell::from(truncate_width(&record.beverage_name, ITEM_WIDTH as usize)).style(text),
            Cell::from(Line::from(format_amount(record.price)).alignment(Alignment::Right))
                .style(Style::default().fg(self.theme.amount())),
        ])
    }
}
