//! TCP server for the control socket
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.
//!
//! Each connection gets a reader loop (this module) and a writer task fed by an
//! unbounded channel. A dispatcher task routes messages coming back from the
//! game loop to one client or to every streaming client.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            max_pending_commands: 16,
        }
    }
}

impl ServerConfig {
    /// Read `BLOCKFALL_AI_HOST`, `BLOCKFALL_AI_PORT` and
    /// `BLOCKFALL_AI_MAX_PENDING`. Unset variables take the defaults; set but
    /// unparsable ones are an error.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let host = lookup("BLOCKFALL_AI_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);

        let port = match lookup("BLOCKFALL_AI_PORT") {
            Some(s) => s
                .trim()
                .parse()
                .with_context(|| format!("invalid BLOCKFALL_AI_PORT: {:?}", s))?,
            None => defaults.port,
        };

        let max_pending_commands = match lookup("BLOCKFALL_AI_MAX_PENDING") {
            Some(s) => s
                .trim()
                .parse()
                .with_context(|| format!("invalid BLOCKFALL_AI_MAX_PENDING: {:?}", s))?,
            None => defaults.max_pending_commands,
        };

        Ok(Self {
            host,
            port,
            max_pending_commands,
        })
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        Self::disabled_from(std::env::var("BLOCKFALL_AI_DISABLED").ok().as_deref())
    }

    fn disabled_from(value: Option<&str>) -> bool {
        value
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub handshaken: bool,
    pub stream_observations: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Shared server state
pub struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    /// Id of the controlling client. Lock before `clients` when taking both.
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    pub async fn controller_id(&self) -> Option<usize> {
        *self.controller.read().await
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn broadcast(&self, obs: ObservationMessage) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    /// Record `seq` if it is strictly greater than the client's last one.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return false;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    /// Mark a client handshaken and give it the controller seat if it is free.
    async fn complete_hello(&self, client_id: usize, stream_observations: bool) -> Role {
        let mut controller = self.controller.write().await;
        let mut clients = self.clients.write().await;
        if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
            client.handshaken = true;
            client.stream_observations = stream_observations;
        }

        match *controller {
            Some(id) if id == client_id => Role::Controller,
            Some(_) => Role::Observer,
            None => {
                *controller = Some(client_id);
                eprintln!("[Adapter] Client {} is now controller", client_id);
                Role::Controller
            }
        }
    }

    /// Drop a client; if it held the controller seat, promote the
    /// longest-connected handshaken client.
    async fn remove_client(&self, client_id: usize) {
        let mut controller = self.controller.write().await;
        let mut clients = self.clients.write().await;

        clients.retain(|c| c.id != client_id);
        if *controller != Some(client_id) {
            return;
        }

        let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
        *controller = next_id;
        match next_id {
            Some(new_id) => eprintln!("[Adapter] Client {} promoted to controller", new_id),
            None => eprintln!("[Adapter] Controller {} released", client_id),
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the TCP server. `ready_tx`, when given, receives the bound address
/// once the listener is up (port 0 picks a free port).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;
    let bound = listener.local_addr()?;
    eprintln!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        tx.send(bound)
            .map_err(|_| anyhow!("ready receiver dropped before the server started"))?;
    }

    let state = Arc::new(ServerState::new());
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state
                            .send_to(client_id, ClientOutbound::Observation(obs))
                            .await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        state.broadcast(obs).await;
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        eprintln!("[Adapter] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, &state, command_tx).await {
                eprintln!("[Adapter] Client {} error: {}", client_id, e);
            }
            eprintln!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Serialize each message as one JSON line until the channel closes or the
/// socket fails.
async fn write_loop<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<ClientOutbound>)
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut buf: Vec<u8> = Vec::with_capacity(4096);
    while let Some(msg) = rx.recv().await {
        buf.clear();
        let encoded = match &msg {
            ClientOutbound::Welcome(m) => serde_json::to_writer(&mut buf, m),
            ClientOutbound::Ack(m) => serde_json::to_writer(&mut buf, m),
            ClientOutbound::Error(m) => serde_json::to_writer(&mut buf, m),
            ClientOutbound::Observation(m) => serde_json::to_writer(&mut buf, m),
        };
        if encoded.is_err() {
            continue;
        }
        buf.push(b'\n');
        if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
            break;
        }
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, rx) = mpsc::unbounded_channel::<ClientOutbound>();
    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        handshaken: false,
        stream_observations: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(write_loop(writer, rx));
    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    let result = loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e.into()),
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Err(failure) => {
                reply_error(
                    failure.seq,
                    ErrorCode::BadMessage,
                    &format!("invalid message: {}", failure.message),
                );
            }

            Ok(ParsedMessage::Hello(hello)) => {
                if !state.check_and_update_seq(client_id, hello.seq).await {
                    reply_error(hello.seq, ErrorCode::BadMessage, "seq must be strictly increasing");
                    continue;
                }

                let role = state
                    .complete_hello(client_id, hello.stream_observations)
                    .await;
                if let Some(info) = hello.client.as_ref() {
                    eprintln!(
                        "[Adapter] Client {} hello: {} {} ({:?})",
                        client_id, info.name, info.version, role
                    );
                }
                let _ = tx.send(ClientOutbound::Welcome(create_welcome(hello.seq, role)));

                // Waits for queue space: the first observation must not be lost.
                if hello.stream_observations {
                    let request = InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    };
                    if command_tx.send(request).await.is_err() {
                        break Err(anyhow!("game loop stopped accepting commands"));
                    }
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(cmd.seq, ErrorCode::HandshakeRequired, "send hello before command");
                    continue;
                }

                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply_error(cmd.seq, ErrorCode::BadMessage, "seq must be strictly increasing");
                    continue;
                }

                if state.controller_id().await != Some(client_id) {
                    reply_error(
                        cmd.seq,
                        ErrorCode::NotController,
                        "only the controller may send commands",
                    );
                    continue;
                }

                if cmd.actions.overflow {
                    reply_error(
                        cmd.seq,
                        ErrorCode::TooManyActions,
                        &format!("at most {} actions per command", MAX_ACTIONS_PER_COMMAND),
                    );
                    continue;
                }

                // Ack is sent by the game loop after the command is applied.
                let inbound = InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Actions {
                        actions: cmd.actions.actions,
                        ignored: cmd.actions.ignored,
                    },
                };
                if command_tx.try_send(inbound).is_err() {
                    reply_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }
        }
    };

    drop(reply_error);
    drop(tx);
    state.remove_client(client_id).await;
    let _ = write_task.await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7777);
        assert_eq!(config.max_pending_commands, 16);
    }

    #[test]
    fn config_reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BLOCKFALL_AI_HOST", "0.0.0.0"),
            ("BLOCKFALL_AI_PORT", "9000"),
            ("BLOCKFALL_AI_MAX_PENDING", "4"),
        ]))
        .unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_pending_commands, 4);
    }

    #[test]
    fn config_rejects_bad_port() {
        let err = ServerConfig::from_lookup(lookup(&[("BLOCKFALL_AI_PORT", "seventy")]))
            .unwrap_err();
        assert!(err.to_string().contains("BLOCKFALL_AI_PORT"));
    }

    #[test]
    fn disabled_flag_values() {
        assert!(ServerConfig::disabled_from(Some("1")));
        assert!(ServerConfig::disabled_from(Some("TRUE")));
        assert!(!ServerConfig::disabled_from(Some("0")));
        assert!(!ServerConfig::disabled_from(None));
    }

    #[tokio::test]
    async fn controller_seat_passes_to_oldest_handshaken_client() {
        let state = ServerState::new();
        for id in 1..=3 {
            let (tx, _rx) = mpsc::unbounded_channel();
            state.clients.write().await.push(ClientHandle {
                id,
                addr: "127.0.0.1:1".parse().unwrap(),
                handshaken: false,
                stream_observations: true,
                last_seq: None,
                tx,
            });
        }

        assert_eq!(state.complete_hello(1, true).await, Role::Controller);
        assert_eq!(state.complete_hello(3, true).await, Role::Observer);

        // Client 2 never said hello, so 3 takes over.
        state.remove_client(1).await;
        assert_eq!(state.controller_id().await, Some(3));

        state.remove_client(3).await;
        assert_eq!(state.controller_id().await, None);
        assert_eq!(state.client_count().await, 1);

        assert_eq!(state.complete_hello(2, false).await, Role::Controller);
    }

    #[tokio::test]
    async fn seq_must_increase() {
        let state = ServerState::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        state.clients.write().await.push(ClientHandle {
            id: 1,
            addr: "127.0.0.1:1".parse().unwrap(),
            handshaken: true,
            stream_observations: false,
            last_seq: None,
            tx,
        });
        assert!(state.check_and_update_seq(1, 5).await);
        assert!(!state.check_and_update_seq(1, 5).await);
        assert!(!state.check_and_update_seq(1, 4).await);
        assert!(state.check_and_update_seq(1, 6).await);
    }
}
