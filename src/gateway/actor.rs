//! Gateway actor - runs HTTP requests and database commands on the runtime
//!
//! HTTP sends are spawned into a JoinSet so a slow server never blocks the
//! command loop. Database commands run sequentially on the single session.

use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::info;

use crate::error::DatabaseError;
use crate::gateway::http;
use crate::gateway::sql::{self, DbSession};
use crate::messages::{GatewayCommand, GatewayEvent};

pub struct GatewayActor {
    client: reqwest::Client,
    session: Option<DbSession>,
    event_tx: mpsc::UnboundedSender<GatewayEvent>,
    http_tasks: JoinSet<()>,
}

impl GatewayActor {
    pub fn new(event_tx: mpsc::UnboundedSender<GatewayEvent>) -> Self {
        GatewayActor {
            client: http::create_client(),
            session: None,
            event_tx,
            http_tasks: JoinSet::new(),
        }
    }

    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<GatewayCommand>) {
        info!("gateway actor started");
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(GatewayCommand::SendRequest { token, request }) => {
                            let client = self.client.clone();
                            let event_tx = self.event_tx.clone();
                            self.http_tasks.spawn(async move {
                                info!(token, method = request.method.as_str(), url = %request.url, "sending request");
                                let event = http::send(&client, request, token).await;
                                let _ = event_tx.send(event);
                            });
                        }

                        Some(GatewayCommand::Connect { token, config }) => {
                            info!(token, host = %config.host, database = %config.database, "connecting");
                            let result = match sql::connect(&config, self.event_tx.clone()).await {
                                Ok(session) => {
                                    self.session = Some(session);
                                    Ok(())
                                }
                                Err(e) => Err(e),
                            };
                            let _ = self.event_tx.send(GatewayEvent::Connected { token, result });
                        }

                        Some(GatewayCommand::ExecuteQuery { token, query }) => {
                            let start = Instant::now();
                            let result = match &self.session {
                                Some(session) => session.execute(&query).await,
                                None => Err(DatabaseError::NotConnected),
                            };
                            let time_ms = start.elapsed().as_millis() as u64;
                            if matches!(result, Err(DatabaseError::ConnectionLost(_))) {
                                self.session = None;
                            }
                            let _ = self.event_tx.send(GatewayEvent::QueryDone { token, time_ms, result });
                        }

                        Some(GatewayCommand::ListTables { token }) => {
                            let result = match &self.session {
                                Some(session) => session.list_tables().await,
                                None => Err(DatabaseError::NotConnected),
                            };
                            let _ = self.event_tx.send(GatewayEvent::Tables { token, result });
                        }

                        Some(GatewayCommand::ListColumns { token, table }) => {
                            let result = match &self.session {
                                Some(session) => session.list_columns(&table).await,
                                None => Err(DatabaseError::NotConnected),
                            };
                            let _ = self.event_tx.send(GatewayEvent::Columns { token, table, result });
                        }

                        Some(GatewayCommand::Shutdown) | None => break,
                    }
                }

                // Reap finished HTTP tasks
                Some(_result) = self.http_tasks.join_next() => {}
            }
        }
        info!("gateway actor stopped");
    }
}
