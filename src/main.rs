use std::sync::Arc;

use anyhow::Result;
use chatbot_core::{Config, Conversation, GeminiClient};
use tracing::info;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    let log_path = logging::init(&logging::log_dir()?)?;
    info!(
        model = %config.model,
        base_url = %config.base_url,
        log = %log_path.display(),
        "Starting chatbot"
    );

    let client = GeminiClient::with_base_url(&config.api_key, &config.model, &config.base_url);
    let conversation = Arc::new(Conversation::new(Arc::new(client)));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, conversation).await;
    tui::restore()?;

    info!("Exiting");
    result
}

async fn run(terminal: &mut Tui, conversation: Arc<Conversation>) -> Result<()> {
    let mut events = EventHandler::new();
    let mut app = App::new(conversation, events.sender());

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event),
            None => break,
        }
    }

    Ok(())
}
