//! Color roles for dark and light terminals

use ratatui::style::Color;

/// Background luma above which the light palette is used
const LIGHT_LUMA_THRESHOLD: f32 = 0.6;

struct Palette {
    text: Color,
    accent: Color,
    muted: Color,
    heading: Color,
    amount: Color,
    bar: Color,
    error: Color,
    stat: Color,
}

const DARK: Palette = Palette {
    text: Color::White,
    accent: Color::Cyan,
    muted: Color::DarkGray,
    heading: Color::Yellow,
    amount: Color::Magenta,
    bar: Color::Green,
    error: Color::Red,
    stat: Color::Blue,
};

// 256-color indices stay readable on white backgrounds
const LIGHT: Palette = Palette {
    text: Color::Black,
    accent: Color::Indexed(25),
    muted: Color::Gray,
    heading: Color::Indexed(130),
    amount: Color::Indexed(90),
    bar: Color::Indexed(22),
    error: Color::Indexed(124),
    stat: Color::Indexed(25),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Query the terminal background. Call before `ratatui::init`, since
    /// the probe needs cooked mode.
    pub fn detect() -> Self {
        Self::from_luma(terminal_light::luma().ok())
    }

    fn from_luma(luma: Option<f32>) -> Self {
        match luma {
            Some(l) if l > LIGHT_LUMA_THRESHOLD => Self::Light,
            _ => Self::Dark,
        }
    }

    fn palette(self) -> &'static Palette {
        match self {
            Self::Dark => &DARK,
            Self::Light => &LIGHT,
        }
    }

    pub fn text(self) -> Color {
        self.palette().text
    }

    /// Selected tab, key names, input cursor
    pub fn accent(self) -> Color {
        self.palette().accent
    }

    pub fn muted(self) -> Color {
        self.palette().muted
    }

    /// Section titles, timestamps, source labels
    pub fn heading(self) -> Color {
        self.palette().heading
    }

    pub fn amount(self) -> Color {
        self.palette().amount
    }

    /// Histogram and share bars
    pub fn bar(self) -> Color {
        self.palette().bar
    }

    pub fn error(self) -> Color {
        self.palette().error
    }

    /// Item and user count cards
    pub fn stat(self) -> Color {
        self.palette().stat
    }
}
