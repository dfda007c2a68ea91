use ratatui::style::Color;
use scrollstage_core::ThemeMode;

/// Palette for one theme mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub bg: Color,
    pub surface: Color,
    pub fg: Color,
    pub muted: Color,
    pub border: Color,

    /// Progress fill and active markers
    pub accent: Color,
    /// Accent while the theme transition is playing
    pub glow: Color,
    /// Unfilled part of the progress rail
    pub track: Color,

    pub selection: Color,
    pub status_bg: Color,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(0xff, 0xff, 0xff),
            surface: Color::Rgb(0xf3, 0xf4, 0xf6),
            fg: Color::Rgb(0x11, 0x18, 0x27),
            muted: Color::Rgb(0x6b, 0x72, 0x80),
            border: Color::Rgb(0xd1, 0xd5, 0xdb),
            accent: Color::Rgb(0xa8, 0x55, 0xf7),
            glow: Color::Rgb(0x93, 0x33, 0xea),
            track: Color::Rgb(0xd1, 0xd5, 0xdb),
            selection: Color::Rgb(0xe9, 0xd5, 0xff),
            status_bg: Color::Rgb(0xe5, 0xe7, 0xeb),
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(0x11, 0x18, 0x27),
            surface: Color::Rgb(0x1f, 0x29, 0x37),
            fg: Color::Rgb(0xf9, 0xfa, 0xfb),
            muted: Color::Rgb(0x9c, 0xa3, 0xaf),
            border: Color::Rgb(0x37, 0x41, 0x51),
            accent: Color::Rgb(0xfb, 0xbf, 0x24),
            glow: Color::Rgb(0xfc, 0xd3, 0x4d),
            track: Color::Rgb(0x37, 0x41, 0x51),
            selection: Color::Rgb(0x45, 0x3a, 0x0f),
            status_bg: Color::Rgb(0x37, 0x41, 0x51),
        }
    }

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::for_mode(ThemeMode::default())
    }
}
