use ratatui::style::Color;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub accent: Color,
    pub glow: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
    pub dim: Color,
    pub surface: Color,
    pub surface_light: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub highlight_bg: Color,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThemeName {
    #[default]
    Aurora,
    Midnight,
    Rose,
    Moss,
}

impl ThemeName {
    pub fn label(&self) -> &str {
        match self {
            Self::Aurora => "Aurora",
            Self::Midnight => "Midnight",
            Self::Rose => "Rose",
            Self::Moss => "Moss",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Aurora => Self::Midnight,
            Self::Midnight => Self::Rose,
            Self::Rose => Self::Moss,
            Self::Moss => Self::Aurora,
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            Self::Aurora => Theme {
                accent: Color::Rgb(167, 139, 250),
                glow: Color::Rgb(236, 72, 153),
                green: Color::Rgb(134, 239, 172),
                yellow: Color::Rgb(253, 224, 71),
                red: Color::Rgb(252, 165, 165),
                dim: Color::Rgb(100, 96, 120),
                surface: Color::Reset,
                surface_light: Color::Reset,
                text: Color::Rgb(237, 233, 254),
                text_dim: Color::Rgb(160, 150, 190),
                border: Color::Rgb(60, 52, 84),
                highlight_bg: Color::Rgb(59, 39, 94),
            },
            Self::Midnight => Theme {
                accent: Color::Rgb(96, 165, 250),
                glow: Color::Rgb(129, 140, 248),
                green: Color::Rgb(74, 222, 128),
                yellow: Color::Rgb(250, 204, 21),
                red: Color::Rgb(248, 113, 113),
                dim: Color::Rgb(71, 85, 105),
                surface: Color::Reset,
                surface_light: Color::Reset,
                text: Color::Rgb(226, 232, 240),
                text_dim: Color::Rgb(148, 163, 184),
                border: Color::Rgb(51, 65, 85),
                highlight_bg: Color::Rgb(30, 41, 59),
            },
            Self::Rose => Theme {
                accent: Color::Rgb(244, 114, 182),
                glow: Color::Rgb(251, 113, 133),
                green: Color::Rgb(110, 231, 183),
                yellow: Color::Rgb(252, 211, 77),
                red: Color::Rgb(239, 68, 68),
                dim: Color::Rgb(120, 90, 105),
                surface: Color::Reset,
                surface_light: Color::Reset,
                text: Color::Rgb(253, 242, 248),
                text_dim: Color::Rgb(190, 150, 170),
                border: Color::Rgb(90, 55, 75),
                highlight_bg: Color::Rgb(80, 30, 60),
            },
            Self::Moss => Theme {
                accent: Color::Rgb(163, 190, 140),
                glow: Color::Rgb(208, 135, 112),
                green: Color::Rgb(184, 187, 38),
                yellow: Color::Rgb(235, 203, 139),
                red: Color::Rgb(191, 97, 106),
                dim: Color::Rgb(110, 115, 95),
                surface: Color::Reset,
                surface_light: Color::Reset,
                text: Color::Rgb(229, 233, 220),
                text_dim: Color::Rgb(160, 165, 140),
                border: Color::Rgb(70, 78, 60),
                highlight_bg: Color::Rgb(55, 62, 45),
            },
        }
    }
}
