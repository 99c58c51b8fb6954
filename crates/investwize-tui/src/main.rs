mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use anyhow::Result;
use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    // Logging is best effort; the app still runs without a writable config dir
    let log_path = logging::init();

    let mut app = App::new();
    match &log_path {
        Ok(path) => tracing::info!(path = %path.display(), "investwize starting"),
        Err(e) => eprintln!("investwize: logging disabled: {e:#}"),
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    if let Err(e) = &result {
        tracing::error!(error = %e, "investwize exited with error");
    } else {
        tracing::info!(messages = app.conversation.len(), "investwize exiting");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event).await?;
    }

    Ok(())
}
