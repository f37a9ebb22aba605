pub mod events;
pub mod state;
pub mod ui;

use anyhow::Result;
use crossterm::event::{self, Event};

use crate::domain::email::MailRecord;
use crate::speech::Speaker;
use crate::terminal::state::AppState;

/// Interactive picker over fetched records; Enter speaks the selection.
pub fn run_tui(title: &str, records: Vec<MailRecord>, speaker: &dyn Speaker) -> Result<()> {
    let mut state = AppState::new(title, records);

    let mut terminal = ratatui::init();
    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|f| ui::render(f, &state))?;
            if let Event::Key(key) = event::read()?
                && events::handle_key(key, &mut state, speaker)
            {
                return Ok(());
            }
        }
    })();
    ratatui::restore();

    result
}
