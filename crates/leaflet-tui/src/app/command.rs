use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use leaflet_core::paging::{self, Mode};
use ratatui::prelude::Rect;

use super::types::{Command, CommandOutcome};
use super::App;

impl Command {
    /// Translate a key press under the current mode.
    ///
    /// The arrow and page keys swap meanings between the panes: in the
    /// contents list the arrows move line by line and PgUp/PgDn jump,
    /// while inside a chapter the arrows turn pages and PgUp/PgDn give
    /// the fine-grained line scroll.
    pub(super) fn from_key(mode: Mode, key: KeyEvent) -> Option<Self> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Exit),
            KeyCode::Char('c') if ctrl => Some(Command::Exit),
            KeyCode::Tab | KeyCode::Left | KeyCode::Right => Some(Command::Switch),
            KeyCode::Down => Some(match mode {
                Mode::Toc => Command::LineDown,
                Mode::Chapter => Command::PageDown,
            }),
            KeyCode::Up => Some(match mode {
                Mode::Toc => Command::LineUp,
                Mode::Chapter => Command::PageUp,
            }),
            KeyCode::PageDown => Some(match mode {
                Mode::Toc => Command::PageDown,
                Mode::Chapter => Command::LineDown,
            }),
            KeyCode::PageUp => Some(match mode {
                Mode::Toc => Command::PageUp,
                Mode::Chapter => Command::LineUp,
            }),
            KeyCode::Char('i') if matches!(mode, Mode::Chapter) => Some(Command::OpenImages),
            _ => None,
        }
    }
}

impl App {
    pub(super) fn apply_command(&mut self, command: Command, viewport: Rect) -> CommandOutcome {
        self.status = None;
        let h = viewport.height as usize;
        match command {
            Command::Exit => return CommandOutcome::Exit,
            Command::Switch => match self.nav.mode {
                Mode::Toc => self.enter_chapter(viewport.width as usize, h),
                Mode::Chapter => self.nav.mode = Mode::Toc,
            },
            Command::LineDown => {
                let n = self.content_len();
                paging::line_down(&mut self.nav, n, h);
            }
            Command::LineUp => {
                let n = self.content_len();
                paging::line_up(&mut self.nav, n, h);
            }
            Command::PageDown => {
                let n = self.content_len();
                paging::page_down(&mut self.nav, n, h);
            }
            Command::PageUp => {
                let n = self.content_len();
                paging::page_up(&mut self.nav, n, h);
            }
            Command::OpenImages => self.open_visible_images(h),
        }
        CommandOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_scroll_lines_in_the_contents_list() {
        assert_eq!(
            Command::from_key(Mode::Toc, key(KeyCode::Down)),
            Some(Command::LineDown)
        );
        assert_eq!(
            Command::from_key(Mode::Toc, key(KeyCode::Up)),
            Some(Command::LineUp)
        );
    }

    #[test]
    fn arrows_turn_pages_inside_a_chapter() {
        assert_eq!(
            Command::from_key(Mode::Chapter, key(KeyCode::Down)),
            Some(Command::PageDown)
        );
        assert_eq!(
            Command::from_key(Mode::Chapter, key(KeyCode::Up)),
            Some(Command::PageUp)
        );
    }

    #[test]
    fn page_keys_take_the_opposite_role_per_mode() {
        assert_eq!(
            Command::from_key(Mode::Toc, key(KeyCode::PageDown)),
            Some(Command::PageDown)
        );
        assert_eq!(
            Command::from_key(Mode::Chapter, key(KeyCode::PageDown)),
            Some(Command::LineDown)
        );
        assert_eq!(
            Command::from_key(Mode::Chapter, key(KeyCode::PageUp)),
            Some(Command::LineUp)
        );
    }

    #[test]
    fn quit_keys_work_in_both_modes() {
        for mode in [Mode::Toc, Mode::Chapter] {
            assert_eq!(Command::from_key(mode, key(KeyCode::Char('q'))), Some(Command::Exit));
            assert_eq!(Command::from_key(mode, key(KeyCode::Esc)), Some(Command::Exit));
            assert_eq!(
                Command::from_key(mode, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
                Some(Command::Exit)
            );
        }
    }

    #[test]
    fn switch_keys_are_mode_independent() {
        for mode in [Mode::Toc, Mode::Chapter] {
            for code in [KeyCode::Tab, KeyCode::Left, KeyCode::Right] {
                assert_eq!(Command::from_key(mode, key(code)), Some(Command::Switch));
            }
        }
    }

    #[test]
    fn image_key_only_fires_inside_a_chapter() {
        assert_eq!(
            Command::from_key(Mode::Chapter, key(KeyCode::Char('i'))),
            Some(Command::OpenImages)
        );
        assert_eq!(Command::from_key(Mode::Toc, key(KeyCode::Char('i'))), None);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(Command::from_key(Mode::Toc, key(KeyCode::Enter)), None);
        assert_eq!(Command::from_key(Mode::Chapter, key(KeyCode::Char('x'))), None);
    }
}
