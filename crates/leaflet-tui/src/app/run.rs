use std::io::stdout;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use super::types::{Command, CommandOutcome};
use super::App;

impl App {
    /// Take over the terminal and run the blocking event loop until the
    /// user quits. The screen is restored on both the clean path and
    /// terminal errors.
    pub fn run(mut self) -> std::io::Result<()> {
        let mut stdout = stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        result
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> std::io::Result<()>
    where
        std::io::Error: From<B::Error>,
    {
        loop {
            let mut viewport = Rect::default();
            terminal.draw(|f| {
                viewport = f.area();
                self.draw(f);
            })?;

            // Block until input; every accepted key triggers a redraw,
            // and a resize simply redraws with clamped offsets.
            match event::read()? {
                Event::Key(key) => {
                    if let Some(command) = Command::from_key(self.nav.mode, key) {
                        if self.apply_command(command, viewport) == CommandOutcome::Exit {
                            return Ok(());
                        }
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }
}
