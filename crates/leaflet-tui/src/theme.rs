use ratatui::prelude::Color;

// Tokyonight-inspired defaults; header/status colors are the only
// themed surfaces in the reader.
const TN_BG_ALT: Color = Color::Rgb(31, 35, 53); // #1f2335
const TN_FG: Color = Color::Rgb(192, 202, 245); // #c0caf5
const TN_BG_STRONG: Color = Color::Rgb(65, 72, 104); // #414868
const TN_BLUE: Color = Color::Rgb(122, 162, 247); // #7aa2f7

#[derive(Clone)]
pub struct Theme {
    pub title_fg: Color,
    pub title_bg: Color,
    pub status_fg: Color,
    pub status_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            title_fg: TN_FG,
            title_bg: TN_BG_ALT,
            status_fg: TN_BLUE,
            status_bg: TN_BG_STRONG,
        }
    }
}
