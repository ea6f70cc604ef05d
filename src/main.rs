use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use xdo::cli::Cli;
use xdo::{logging, ui, App, TaskStore};

fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_file) = &cli.log_file {
        logging::init(log_file, cli.log_level.into())?;
    }

    let (store, outcome) = TaskStore::open(&cli.file);
    let mut app = App::new(store);
    app.report_load(&outcome);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "event loop failed");
    }
    result?;
    Ok(())
}
