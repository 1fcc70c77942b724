pub mod app;
pub mod ui;

use std::{error::Error, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use crate::storage::KeyValueStore;
use app::{App, InputField, InputMode};
use ui::ui;

pub fn run_tui<S: KeyValueStore>(kv: S) -> Result<(), Box<dyn Error>> {
    // Load before touching the terminal so a storage error prints normally.
    let mut app = App::new(kv)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend, S: KeyValueStore>(terminal: &mut Terminal<B>, app: &mut App<S>) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Right | KeyCode::Char('l') => app.next_day(),
                KeyCode::Left | KeyCode::Char('h') => app.prev_day(),
                KeyCode::Char(']') => app.next_week(),
                KeyCode::Char('[') => app.prev_week(),
                KeyCode::Char('t') => app.today(),
                KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
                KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                KeyCode::Char('a') => app.start_edit(InputField::Title),
                KeyCode::Char('e') => app.start_edit(InputField::Details),
                KeyCode::Char('c') => app.start_edit(InputField::ChecklistItem),
                KeyCode::Char('v') => app.toggle_view(),
                _ => {}
            },
            InputMode::Editing => match key.code {
                KeyCode::Enter => app.handle_input(),
                KeyCode::Esc => app.cancel_edit(),
                KeyCode::Char(c) => app.input_buffer.push(c),
                KeyCode::Backspace => {
                    app.input_buffer.pop();
                }
                _ => {}
            },
        }
    }
}
