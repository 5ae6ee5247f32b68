pub mod app;
pub mod images;
pub mod theme;
pub mod views;

pub use app::App;
pub use theme::Theme;
