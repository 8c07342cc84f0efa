//! TUI (Terminal User Interface) for the handheld simulator
//!
//! Virtual LCD, keypad, control panel, activity log and firmware bundle
//! exporter, driven from the host keyboard.

pub mod app;
pub mod keypad;
pub mod render;

pub use app::App;

use crate::bundle::GenerationResult;
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use ratatui::prelude::*;
use std::io::{stdout, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Run the TUI until the user quits.
///
/// `results` is the receiving end of the channel the app's generation
/// tasks report on.
pub async fn run(
    mut app: App,
    mut results: mpsc::UnboundedReceiver<GenerationResult>,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    info!("TUI started");
    let outcome = event_loop(&mut terminal, &mut app, &mut results).await;

    // Cleanup, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("TUI stopped");
    outcome
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    results: &mut mpsc::UnboundedReceiver<GenerationResult>,
) -> Result<()> {
    let mut events = EventStream::new();
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| render::render(f, app))?;

        tokio::select! {
            // Terminal events
            event = events.next() => {
                match event {
                    Some(Ok(event)) => handle_event(app, event),
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }

            // Finished generations
            result = results.recv() => {
                if let Some(result) = result {
                    app.finish_generation(result);
                }
            }

            // Redraw tick
            _ = tokio::time::sleep(tick_rate) => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle terminal events
fn handle_event(app: &mut App, event: Event) {
    let Event::Key(key) = event else {
        return;
    };
    if key.kind != KeyEventKind::Press {
        return;
    }

    match keypad::translate(&key) {
        Some(command) => {
            debug!(?command, "Host key");
            app.handle_command(command);
        }
        None => debug!("Unmapped host key {:?}", key.code),
    }
}
