//! Built-in presentation themes

/// Colors (RGB hex, no `#`) and font used for every slide of a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationTheme {
    pub name: &'static str,
    pub background: &'static str,
    pub title_color: &'static str,
    pub body_color: &'static str,
    pub accent: &'static str,
    pub font: &'static str,
}

const THEMES: [PresentationTheme; 3] = [
    PresentationTheme {
        name: "classic",
        background: "FFFFFF",
        title_color: "1F3864",
        body_color: "262626",
        accent: "2E75B6",
        font: "Calibri",
    },
    PresentationTheme {
        name: "midnight",
        background: "1B1F2A",
        title_color: "F2C14E",
        body_color: "E8E8E8",
        accent: "5DA9E9",
        font: "Segoe UI",
    },
    PresentationTheme {
        name: "campus",
        background: "F7F3EA",
        title_color: "7A1F2B",
        body_color: "333333",
        accent: "3D6B4F",
        font: "Georgia",
    },
];

impl PresentationTheme {
    pub const NAMES: [&'static str; 3] = ["classic", "midnight", "campus"];

    /// Look up a built-in theme, ignoring case
    pub fn by_name(name: &str) -> Option<Self> {
        let wanted = name.trim().to_ascii_lowercase();
        THEMES.iter().copied().find(|t| t.name == wanted)
    }
}

impl Default for PresentationTheme {
    fn default() -> Self {
        THEMES[0]
    }
}
