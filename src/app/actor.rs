//! App actor - owns the application state and processes events
//!
//! Runs on the tokio runtime next to the gateway actor. The UI thread is the
//! only other party: it sends UiEvents in and receives RenderState snapshots
//! back. State is owned exclusively here; nothing else locks or shares it.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::app::state::AppState;
use crate::messages::{GatewayCommand, GatewayEvent, RenderState, UiEvent};

pub struct AppActor {
    state: AppState,
    gateway_tx: mpsc::UnboundedSender<GatewayCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        gateway_tx: mpsc::UnboundedSender<GatewayCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            gateway_tx,
            render_tx,
        }
    }

    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut gateway_rx: mpsc::UnboundedReceiver<GatewayEvent>,
    ) {
        info!("app actor started");
        self.render();

        loop {
            tokio::select! {
                event = ui_rx.recv() => {
                    let Some(event) = event else {
                        debug!("ui channel closed");
                        break;
                    };
                    if event == UiEvent::Quit {
                        let _ = self.gateway_tx.send(GatewayCommand::Shutdown);
                        break;
                    }
                    if let Some(command) = self.state.handle_ui_event(event) {
                        if self.gateway_tx.send(command).is_err() {
                            debug!("gateway channel closed");
                            break;
                        }
                    }
                    self.render();
                }
                event = gateway_rx.recv() => {
                    let Some(event) = event else {
                        debug!("gateway event channel closed");
                        break;
                    };
                    self.state.handle_gateway_event(event);
                    self.render();
                }
            }
        }
        info!("app actor stopped");
    }

    fn render(&mut self) {
        self.state.expire_notice();
        let _ = self.render_tx.send(self.state.to_render_state());
    }
}
