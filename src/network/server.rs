//! WebSocket Game Server
//!
//! Async WebSocket server for Bug Hunt clients. Every request and the
//! background scan ticker go through one `SessionManager` behind one
//! mutex. Lifecycle events are broadcast to every connected client.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn, error, debug, instrument};

use crate::core::clock::now_seconds;
use crate::core::position::Position;
use crate::core::rng::DeterministicRng;
use crate::game::events::GameEvent;
use crate::game::portal::PortalCatalog;
use crate::game::snippet::{SnippetError, SnippetLibrary};
use crate::game::state::Difficulty;
use crate::network::config::ServerConfig;
use crate::network::protocol::{
    ClientMessage, ServerMessage, ErrorCode, GameStartedInfo, ListingInfo, ProbeRequest,
    ProbeResponse,
};
use crate::network::session::SessionManager;

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Snippet library could not be loaded.
    #[error("Snippet library error: {0}")]
    Snippets(#[from] SnippetError),
}

/// The one session manager, shared by handlers and the scan ticker.
pub type SharedSession = Arc<Mutex<SessionManager<DeterministicRng>>>;

/// Connected client state.
struct ConnectedClient {
    /// Connection time.
    connected_at: Instant,
    /// Last activity.
    last_activity: Instant,
}

/// Everything a request handler needs, cheap to clone into tasks.
#[derive(Clone)]
struct Shared {
    session: SharedSession,
    snippets: Arc<SnippetLibrary>,
    portals: Arc<PortalCatalog>,
    events_tx: broadcast::Sender<GameEvent>,
}

impl Shared {
    /// Run one client request under the session lock.
    async fn dispatch(&self, msg: ClientMessage) -> ServerMessage {
        let now = now_seconds();
        let mut manager = self.session.lock().await;

        let reply = match msg {
            ClientMessage::StartGame { player_name, difficulty } => {
                let difficulty = difficulty
                    .as_deref()
                    .map(Difficulty::from_name)
                    .unwrap_or_default();
                let snippet = self.snippets.choose(manager.rng_mut());
                let start = manager.start_new_game(&player_name, snippet, difficulty, now);
                ServerMessage::GameStarted(GameStartedInfo {
                    session_id: start.session_id,
                    player_name,
                    compiler_scan_position: start.compiler_scan_position,
                    scan_speed: start.scan_speed,
                    code_snippet: ListingInfo::from(snippet),
                })
            }
            ClientMessage::ScanStatus => match manager.poll_scan(now) {
                Ok(poll) => ServerMessage::ScanStatus(poll),
                Err(e) => e.into(),
            },
            ClientMessage::Probe(ProbeRequest { line, column }) => {
                match manager.probe(line, column, now) {
                    Ok(result) => ServerMessage::ProbeResult(ProbeResponse {
                        line: result.probe.line,
                        column: result.probe.column,
                        hit: result.hit(),
                        message: result.message().to_string(),
                    }),
                    Err(e) => e.into(),
                }
            }
            ClientMessage::SubmitStats(stats) => {
                let player_name = stats.player_name.clone();
                manager.submit_stats(stats, now);
                ServerMessage::StatsRecorded { player_name }
            }
            ClientMessage::Leaderboard { limit } => ServerMessage::Leaderboard {
                entries: manager.leaderboard(limit),
            },
            ClientMessage::StopGame => ServerMessage::GameStopped {
                was_active: manager.stop(now),
            },
            ClientMessage::PlaceBug { line, column } => {
                let position = Position::new(line, column);
                match manager.place_bug(position) {
                    Ok(fake_errors_count) => ServerMessage::BugPlaced {
                        bug_position: position,
                        fake_errors_count,
                    },
                    Err(e) => e.into(),
                }
            }
            ClientMessage::ExitPortal => match self.portals.random_placed(manager.rng_mut()) {
                Some(portal) => ServerMessage::ExitPortal(portal),
                None => ServerMessage::error(ErrorCode::NotFound, "No exit portals configured"),
            },
            ClientMessage::GameStats => match manager.game_stats(now) {
                Ok(stats) => ServerMessage::GameStats(stats),
                Err(e) => e.into(),
            },
            ClientMessage::Ping { timestamp } => ServerMessage::Pong {
                timestamp,
                server_time: server_time_millis(),
            },
        };

        let events = manager.take_events();
        drop(manager);
        self.publish(events);

        reply
    }

    fn publish(&self, events: Vec<GameEvent>) {
        for event in events {
            // No subscribers is fine
            let _ = self.events_tx.send(event);
        }
    }
}

fn server_time_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// Session state and shared resources.
    shared: Shared,
    /// Connected clients.
    clients: Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server, loading the snippet library named in
    /// the config (or the built-in one).
    pub fn new(config: ServerConfig) -> Result<Self, GameServerError> {
        let snippets = match &config.snippet_path {
            Some(path) => {
                let library = SnippetLibrary::from_path(path)?;
                info!("Loaded {} snippets from {}", library.snippets().len(), path.display());
                library
            }
            None => SnippetLibrary::default(),
        };
        Ok(Self::with_content(config, snippets, PortalCatalog::default()))
    }

    /// Create a server over explicit snippets and portals.
    pub fn with_content(config: ServerConfig, snippets: SnippetLibrary, portals: PortalCatalog) -> Self {
        let rng = match config.seed {
            Some(seed) => {
                info!("Using fixed seed {}", hex::encode(seed.to_be_bytes()));
                DeterministicRng::new(seed)
            }
            None => DeterministicRng::from_entropy(),
        };

        let (shutdown_tx, _) = broadcast::channel(1);
        let (events_tx, _) = broadcast::channel(256);

        Self {
            shared: Shared {
                session: Arc::new(Mutex::new(SessionManager::new(config.game.clone(), rng))),
                snippets: Arc::new(snippets),
                portals: Arc::new(portals),
                events_tx,
            },
            config,
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            shutdown_tx,
        }
    }

    /// Run the server.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("Game server listening on {}", self.config.bind_addr);

        let ticker_handle = self.spawn_scan_ticker();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let clients_count = self.clients.read().await.len();
                            if clients_count >= self.config.max_connections {
                                warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            }

                            info!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        ticker_handle.abort();

        Ok(())
    }

    /// Spawn the background task that advances the scan on a fixed cadence.
    pub fn spawn_scan_ticker(&self) -> JoinHandle<()> {
        let shared = self.shared.clone();
        let period = self.config.scan_poll_interval;
        let shutdown_rx = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            Self::run_scan_ticker(shared, period, shutdown_rx).await;
        })
    }

    async fn run_scan_ticker(shared: Shared, period: Duration, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let events = {
                        let mut manager = shared.session.lock().await;
                        if manager.is_scanning() {
                            if let Ok(poll) = manager.poll_scan(now_seconds()) {
                                if poll.game_over {
                                    debug!("Scan ticker ended the session");
                                }
                            }
                        }
                        manager.take_events()
                    };
                    shared.publish(events);
                }
                _ = shutdown_rx.recv() => {
                    debug!("Scan ticker stopping");
                    break;
                }
            }
        }
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let clients = self.clients.clone();
        let shared = self.shared.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut events_rx = self.shared.events_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);

            // Register client
            {
                let mut clients = clients.write().await;
                clients.insert(addr, ConnectedClient {
                    connected_at: Instant::now(),
                    last_activity: Instant::now(),
                });
            }

            // Spawn message sender task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            // Handle incoming messages
            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        let client_msg = match msg {
                            Some(Ok(Message::Text(text))) => match ClientMessage::from_json(&text) {
                                Ok(m) => m,
                                Err(e) => {
                                    debug!("Invalid message from {}: {}", addr, e);
                                    let _ = msg_tx.send(ServerMessage::error(
                                        ErrorCode::InvalidInput,
                                        "Invalid message format",
                                    )).await;
                                    continue;
                                }
                            },
                            Some(Ok(Message::Binary(data))) => match ProbeRequest::from_bytes(&data) {
                                Ok(probe) => ClientMessage::Probe(probe),
                                Err(e) => {
                                    debug!("Invalid binary probe from {}: {}", addr, e);
                                    let _ = msg_tx.send(ServerMessage::error(
                                        ErrorCode::InvalidInput,
                                        "Invalid binary probe",
                                    )).await;
                                    continue;
                                }
                            },
                            Some(Ok(Message::Ping(_))) => {
                                let _ = msg_tx.send(ServerMessage::Pong {
                                    timestamp: 0,
                                    server_time: server_time_millis(),
                                }).await;
                                continue;
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                error!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            _ => continue,
                        };

                        // Update activity
                        {
                            let mut clients = clients.write().await;
                            if let Some(client) = clients.get_mut(&addr) {
                                client.last_activity = Instant::now();
                            }
                        }

                        let reply = shared.dispatch(client_msg).await;
                        if msg_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                    event = events_rx.recv() => {
                        match event {
                            Ok(event) => {
                                if msg_tx.send(ServerMessage::Event(event)).await.is_err() {
                                    break;
                                }
                            }
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                warn!("Client {} lagged, skipped {} events", addr, skipped);
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        let _ = msg_tx.send(ServerMessage::Shutdown {
                            reason: "Server shutting down".to_string(),
                        }).await;
                        break;
                    }
                }
            }

            // Cleanup
            drop(msg_tx);
            if tokio::time::timeout(Duration::from_secs(1), sender_task).await.is_err() {
                debug!("Sender task for {} did not drain in time", addr);
            }

            if let Some(client) = clients.write().await.remove(&addr) {
                info!(
                    "Client {} cleaned up after {:?} (idle {:?})",
                    addr,
                    client.connected_at.elapsed(),
                    client.last_activity.elapsed()
                );
            }
        });
    }

    /// Handle one client request as if it came over a connection.
    pub async fn handle_message(&self, msg: ClientMessage) -> ServerMessage {
        self.shared.dispatch(msg).await
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.shared.events_tx.subscribe()
    }

    /// The shared session manager.
    pub fn session(&self) -> SharedSession {
        self.shared.session.clone()
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active connection count.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }
}
