use anyhow::Result;

mod agent;
mod app;
mod config;
mod conversation;
mod handler;
mod tui;
mod ui;

use agent::AgentClient;
use app::App;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::default());
    let agent = AgentClient::new(&config.resolve_endpoint());
    let mut app = App::new(agent);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = run(&mut terminal, &mut events, &mut app).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, events: &mut tui::EventHandler, app: &mut App) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => break,
        }

        // The tick keeps this loop turning, so a finished agent call is
        // picked up within one tick even with no input
        app.poll_reply().await;
    }
    Ok(())
}
