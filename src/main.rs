use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use courier::app::{AppActor, AppState};
use courier::gateway::GatewayActor;
use courier::messages::ui_events::key_to_ui_event;
use courier::messages::{GatewayCommand, GatewayEvent, RenderState, UiEvent};
use courier::storage::Store;
use courier::ui::draw_ui;

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to a file; the terminal belongs to the UI
    let file_appender = tracing_appender::rolling::never(".", "courier.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Channels between the three layers
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (gw_cmd_tx, gw_cmd_rx) = mpsc::unbounded_channel::<GatewayCommand>();
    let (gw_event_tx, gw_event_rx) = mpsc::unbounded_channel::<GatewayEvent>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    let gateway_actor = GatewayActor::new(gw_event_tx);
    tokio::spawn(gateway_actor.run(gw_cmd_rx));

    let state = AppState::new(Store::open()?);
    let app_actor = AppActor::new(state, gw_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, gw_event_rx));

    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for input with a timeout so render updates keep flowing
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Some(event) = key_to_ui_event(
                    key,
                    current_state.screen,
                    current_state.input_mode,
                    current_state.confirming,
                    current_state.prompting,
                ) {
                    let quit = event == UiEvent::Quit;
                    let _ = ui_tx.send(event);
                    if quit {
                        break;
                    }
                }
            }
        }

        // Adopt the freshest snapshot (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}
