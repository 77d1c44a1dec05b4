//! Hours view - 24-bucket purchase histogram by local hour of day

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::services::format_number;
use crate::tui::theme::Theme;
use crate::types::HOURS_PER_DAY;

const LABEL_WIDTH: u16 = 7; // "HH:00  "
const COUNT_WIDTH: u16 = 7;
const MAX_BAR_WIDTH: u16 = 60;

pub struct HoursView<'a> {
    hourly: Option<&'a [usize; HOURS_PER_DAY]>,
    title: &'a str,
    theme: Theme,
}

impl<'a> HoursView<'a> {
    pub fn new(hourly: Option<&'a [usize; HOURS_PER_DAY]>, title: &'a str, theme: Theme) -> Self {
        Self {
            hourly,
            title,
            theme,
        }
    }

    /// Bar length for `count`, scaled so `peak` fills `width`; non-zero counts get at least one cell
    pub fn bar_len(count: usize, peak: usize, width: u16) -> usize {
        if count == 0 || peak == 0 {
            return 0;
        }
        let len = (count as f64 / peak as f64 * width as f64).round() as usize;
        len.clamp(1, width as usize)
    }
}

impl Widget for HoursView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(hourly) = self.hourly else {
            Paragraph::new(Span::styled(
                "No records to chart",
                Style::default().fg(self.theme.muted()),
            ))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        };

        let peak = hourly.iter().copied().max().unwrap_or(0);
        let bar_width = area
            .width
            .saturating_sub(LABEL_WIDTH + COUNT_WIDTH)
            .min(MAX_BAR_WIDTH);

        let mut lines = vec![Line::from(Span::styled(
            self.title,
            Style::default()
                .fg(self.theme.heading())
                .add_modifier(Modifier::BOLD),
        ))];

        for (hour, &count) in hourly.iter().enumerate() {
            let bar = "█".repeat(Self::bar_len(count, peak, bar_width));
            let count_style = if count > 0 && count == peak {
                Style::default()
                    .fg(self.theme.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.text())
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:02}:00  ", hour),
                    Style::default().fg(self.theme.muted()),
                ),
                Span::styled(bar, Style::default().fg(self.theme.bar())),
                Span::styled(format!(" {}", format_number(count)), count_style),
            ]));
        }

        Paragraph::new(lines).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_len_scales_to_peak() {
        assert_eq!(HoursView::bar_len(10, 10, 40), 40);
        assert_eq!(HoursView::bar_len(5, 10, 40), 20);
        assert_eq!(HoursView::bar_len(0, 10, 40), 0);
    }

    #[test]
    fn test_bar_len_small_counts_visible() {
        assert_eq!(HoursView::bar_len(1, 1000, 40), 1);
    }

    #[test]
    fn test_renders_every_hour() {
        let mut hourly = [0usize; HOURS_PER_DAY];
        hourly[9] = 4;
        let area = Rect::new(0, 0, 60, 26);
        let mut buf = Buffer::empty(area);
        HoursView::new(Some(&hourly), "All records", Theme::Dark).render(area, &mut buf);

        let row = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect()
        };
        assert!(row(0).contains("All records"));
        assert!(row(1).starts_with("00:00"));
        assert!(row(10).contains("09:00"));
        assert!(row(10).contains('█'));
        assert!(row(24).starts_with("23:00"));
    }
}
