//! Loading panel shown while an ingestion runs in the background

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::services::IngestSource;
use crate::tui::theme::Theme;

/// Braille animation frames
const FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// What the background load is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStage {
    /// Parsing a local file or pasted text
    Reading,
    /// Login plus range query against the vending API
    Fetching,
}

impl LoadingStage {
    pub fn for_source(source: &IngestSource) -> Self {
        match source {
            IngestSource::Remote { .. } => Self::Fetching,
            IngestSource::File(_) | IngestSource::Text { .. } => Self::Reading,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Reading => "Reading records",
            Self::Fetching => "Fetching events from the vending API",
        }
    }
}

pub struct Spinner<'a> {
    frame: usize,
    stage: LoadingStage,
    source: Option<&'a str>,
    theme: Theme,
}

impl<'a> Spinner<'a> {
    pub fn new(frame: usize, stage: LoadingStage, theme: Theme) -> Self {
        Self {
            frame,
            stage,
            source: None,
            theme,
        }
    }

    /// Label of the source being loaded, shown under the message
    pub fn source(mut self, label: &'a str) -> Self {
        self.source = Some(label);
        self
    }

    pub fn current_char(&self) -> char {
        FRAMES[self.frame % FRAMES.len()]
    }

    /// Frame index after `frame`, wrapping
    pub fn next_frame(frame: usize) -> usize {
        (frame + 1) % FRAMES.len()
    }
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [_, body, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(area);

        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!("{} ", self.current_char()),
                Style::default().fg(self.theme.accent()),
            ),
            Span::styled(
                self.stage.message(),
                Style::default()
                    .fg(self.theme.text())
                    .add_modifier(Modifier::BOLD),
            ),
        ])];
        if let Some(source) = self.source {
            lines.push(Line::from(Span::styled(
                source,
                Style::default().fg(self.theme.heading()),
            )));
        }
        lines.push(Line::from(Span::styled(
            "q: quit",
            Style::default().fg(self.theme.muted()),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(body, buf);
    }
}
