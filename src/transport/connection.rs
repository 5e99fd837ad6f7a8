//! Realtime client: connection lifecycle, socket task and reconnection.
//!
//! # Socket Task
//!
//! Each established connection spawns a tokio task that handles:
//!
//! - Incoming frames from the server (binary schema or JSON text)
//! - Outgoing frames handed over by [`RealtimeClient::send_message`]
//! - Close/error detection and the reconnection policy
//!
//! # Lifecycle
//!
//! ```text
//!                connect()            transport open
//! DISCONNECTED ────────────► CONNECTING ────────────► CONNECTED
//!      ▲                        │                        │
//!      │   close / error        │        close / error   │
//!      └────────────────────────┴────────◄───────────────┘
//!                 (reconnect while budget remains)
//! ```
//!
//! A `connect` while connecting or connected is a no-op; an unexpected
//! closure schedules a reconnect after a fixed backoff until the retry
//! budget (default 5) is spent; an explicit [`RealtimeClient::disconnect`]
//! never reconnects. Reconnect timers carry the generation number of the
//! attempt that scheduled them and discard themselves when superseded.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, error, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::Error;
use crate::protocol::{ChatMessage, decode_json, encode_json};

use super::events::{EventBus, EventKind, ListenerId, TransportEvent};

// ============================================================================
// Constants
// ============================================================================

/// Raw state values stored in the atomic state byte.
const STATE_DISCONNECTED: u8 = 0;
const STATE_CONNECTING: u8 = 1;
const STATE_CONNECTED: u8 = 2;
const STATE_CLOSING: u8 = 3;

// ============================================================================
// ConnectionState
// ============================================================================

/// Public read of the transport lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport, initial and terminal state.
    Disconnected,
    /// Handshake in flight.
    Connecting,
    /// Transport open, frames flow.
    Connected,
    /// Explicit close requested, transport winding down.
    Closing,
    /// Any raw transport state this client does not recognize.
    Unknown,
}

impl ConnectionState {
    /// Decodes the raw state byte; unrecognized values map to `Unknown`.
    #[inline]
    #[must_use]
    const fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_DISCONNECTED => Self::Disconnected,
            STATE_CONNECTING => Self::Connecting,
            STATE_CONNECTED => Self::Connected,
            STATE_CLOSING => Self::Closing,
            _ => Self::Unknown,
        }
    }
}

// ============================================================================
// SocketCommand
// ============================================================================

/// Commands handed to the socket task.
enum SocketCommand {
    /// Transmit a prepared frame.
    Send(Message),
    /// Close the transport.
    Close,
}

/// Concrete stream type produced by [`connect_async`].
type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// RealtimeClient
// ============================================================================

/// Realtime transport client for the chat service.
///
/// Owns at most one live WebSocket at a time. All failure reporting is
/// asynchronous: public methods never return errors; subscribe to
/// [`EventKind::Error`] instead. The client is cheap to clone; clones share
/// the same connection and listener registry.
///
/// # Example
///
/// ```no_run
/// use chatlink::{ChatMessage, ClientConfig, EventKind, RealtimeClient};
///
/// # async fn example() -> chatlink::Result<()> {
/// let client = RealtimeClient::new(ClientConfig::builder().build()?);
///
/// client.on(EventKind::Message, |event| {
///     println!("inbound: {event:?}");
/// });
///
/// client.connect("alice").await;
/// client.send_message(&ChatMessage::text("alice", "bob", "hi"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<ClientInner>,
}

impl RealtimeClient {
    /// Creates a disconnected client from a validated configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                state: AtomicU8::new(STATE_DISCONNECTED),
                generation: AtomicU64::new(0),
                retries: AtomicU32::new(0),
                manual_close: AtomicBool::new(false),
                identity: Mutex::new(None),
                command_tx: Mutex::new(None),
                events: EventBus::new(),
            }),
        }
    }

    /// Opens the realtime connection for `identity`.
    ///
    /// No-op while already connecting or connected. The outcome is reported
    /// through the `connected` / `error` events, never as a return value.
    /// An unexpected closure later triggers automatic reconnection with the
    /// configured budget and backoff.
    pub async fn connect(&self, identity: &str) {
        if identity.is_empty() {
            warn!("connect called with empty identity");
            self.inner
                .events
                .publish(&TransportEvent::Error(Error::config(
                    "identity must not be empty",
                )));
            return;
        }

        *self.inner.identity.lock() = Some(identity.to_owned());
        self.inner.manual_close.store(false, Ordering::SeqCst);

        ClientInner::try_connect(Arc::clone(&self.inner), None).await;
    }

    /// Closes the connection and suppresses reconnection.
    ///
    /// The `disconnected` event is emitted by the socket task once the close
    /// handshake unwinds, not synchronously here.
    pub fn disconnect(&self) {
        self.inner.manual_close.store(true, Ordering::SeqCst);

        let command_tx = self.inner.command_tx.lock().take();
        match command_tx {
            Some(tx) => {
                self.inner.set_state(STATE_CLOSING);
                if tx.send(SocketCommand::Close).is_err() {
                    // Socket task already gone; settle the state ourselves.
                    self.inner.set_state(STATE_DISCONNECTED);
                }
                debug!("disconnect requested");
            }
            None => {
                self.inner.set_state(STATE_DISCONNECTED);
                trace!("disconnect with no active transport");
            }
        }
    }

    /// Sends a chat message, fire-and-forget.
    ///
    /// While not connected the message is dropped with a warning: no queue,
    /// no error. With a schema configured the payload travels as a binary
    /// frame, otherwise as a JSON text frame. At-most-once semantics: there
    /// is no acknowledgment and no retry of the send itself.
    pub fn send_message(&self, message: &ChatMessage) {
        if self.connection_state() != ConnectionState::Connected {
            warn!("websocket not connected, dropping outbound message");
            return;
        }

        let frame = match self.inner.config.codec() {
            Some(codec) => match codec.encode(message) {
                Ok(frame) => Message::Binary(frame.into()),
                Err(e) => {
                    warn!(error = %e, "failed to encode outbound message, dropping");
                    return;
                }
            },
            None => match encode_json(message) {
                Ok(text) => Message::Text(text.into()),
                Err(e) => {
                    warn!(error = %e, "failed to serialize outbound message, dropping");
                    return;
                }
            },
        };

        let guard = self.inner.command_tx.lock();
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(SocketCommand::Send(frame)).is_err() {
                    warn!("socket task gone, dropping outbound message");
                }
            }
            None => warn!("no active transport, dropping outbound message"),
        }
    }

    /// Sends the heartbeat sentinel through [`Self::send_message`].
    ///
    /// No response correlation exists client-side; the server is expected to
    /// treat it as a keepalive.
    pub fn send_heartbeat(&self) {
        self.send_message(&ChatMessage::heartbeat());
    }

    /// Registers a listener for `kind`, appended after existing listeners.
    pub fn on(
        &self,
        kind: EventKind,
        callback: impl Fn(&TransportEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.inner.events.subscribe(kind, callback)
    }

    /// Removes a listener registered with [`Self::on`]. No-op if unknown.
    ///
    /// Returns `true` when a listener was actually removed.
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        self.inner.events.unsubscribe(kind, id)
    }

    /// Returns the current lifecycle state.
    #[inline]
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        ConnectionState::from_raw(self.inner.state.load(Ordering::SeqCst))
    }

    /// Returns the client configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

// ============================================================================
// ClientInner
// ============================================================================

/// Shared state behind the cloneable handle.
struct ClientInner {
    /// Validated configuration.
    config: ClientConfig,
    /// Raw lifecycle state, see `STATE_*`.
    state: AtomicU8,
    /// Connection generation; bumped by every connect attempt. Reconnect
    /// timers from older generations discard themselves.
    generation: AtomicU64,
    /// Reconnection attempts consumed since the last successful open.
    retries: AtomicU32,
    /// Set by `disconnect()`; suppresses reconnection.
    manual_close: AtomicBool,
    /// Identity of the session owner, kept for reconnects.
    identity: Mutex<Option<String>>,
    /// Command channel into the socket task, present while a transport
    /// exists.
    command_tx: Mutex<Option<mpsc::UnboundedSender<SocketCommand>>>,
    /// Listener registry.
    events: EventBus,
}

impl ClientInner {
    #[inline]
    fn set_state(&self, raw: u8) {
        self.state.store(raw, Ordering::SeqCst);
    }

    /// Entry point for both explicit connects and scheduled reconnects.
    ///
    /// `retry_of` carries the generation of the attempt that scheduled this
    /// retry; a mismatch means the retry was superseded.
    async fn try_connect(inner: Arc<Self>, retry_of: Option<u64>) {
        if let Some(scheduled_gen) = retry_of {
            if inner.generation.load(Ordering::SeqCst) != scheduled_gen
                || inner.manual_close.load(Ordering::SeqCst)
            {
                debug!("discarding superseded reconnect attempt");
                return;
            }
        }

        let prev = inner.state.load(Ordering::SeqCst);
        if prev == STATE_CONNECTING || prev == STATE_CONNECTED {
            trace!("connect ignored: already connecting or connected");
            return;
        }
        if inner
            .state
            .compare_exchange(prev, STATE_CONNECTING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            // Lost the race to a concurrent connect.
            return;
        }

        let generation = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Self::establish(inner, generation).await;
    }

    /// Loads the schema, performs the handshake and spawns the socket task.
    async fn establish(inner: Arc<Self>, generation: u64) {
        let Some(identity) = inner.identity.lock().clone() else {
            inner.set_state(STATE_DISCONNECTED);
            return;
        };

        // Schema load: idempotent, fatal to this attempt on failure.
        if let Some(codec) = inner.config.codec() {
            if let Err(e) = codec.load() {
                error!(error = %e, "schema load failed, aborting connection attempt");
                inner.set_state(STATE_DISCONNECTED);
                inner.events.publish(&TransportEvent::Error(e));
                return;
            }
        }

        let url = inner.config.session_url(&identity);
        debug!(%url, generation, "opening websocket");

        match connect_async(url.as_str()).await {
            Ok((socket, _response)) => {
                if inner.manual_close.load(Ordering::SeqCst) {
                    debug!("connection superseded by disconnect, dropping socket");
                    inner.set_state(STATE_DISCONNECTED);
                    return;
                }

                let (command_tx, command_rx) = mpsc::unbounded_channel();
                *inner.command_tx.lock() = Some(command_tx);
                inner.retries.store(0, Ordering::SeqCst);
                inner.set_state(STATE_CONNECTED);

                info!(user = %identity, "websocket connected");
                inner.events.publish(&TransportEvent::Connected);

                tokio::spawn(Self::run_socket(
                    Arc::clone(&inner),
                    socket,
                    command_rx,
                    generation,
                ));
            }
            Err(e) => {
                warn!(error = %e, "websocket connect failed");
                inner.set_state(STATE_DISCONNECTED);
                inner.events.publish(&TransportEvent::Error(e.into()));
                inner.events.publish(&TransportEvent::Disconnected);
                Self::maybe_schedule_reconnect(&inner, generation);
            }
        }
    }

    /// Socket task: pumps inbound frames and outbound commands until the
    /// transport goes away, then settles state and reconnection.
    async fn run_socket(
        inner: Arc<Self>,
        socket: Socket,
        mut command_rx: mpsc::UnboundedReceiver<SocketCommand>,
        generation: u64,
    ) {
        let (mut sink, mut stream) = socket.split();

        loop {
            tokio::select! {
                frame = stream.next() => {
                    match frame {
                        Some(Ok(Message::Binary(bytes))) => {
                            inner.handle_binary_frame(&bytes);
                        }

                        Some(Ok(Message::Text(text))) => {
                            inner.handle_text_frame(text.as_str());
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("websocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "websocket error");
                            inner.events.publish(&TransportEvent::Error(e.into()));
                            break;
                        }

                        None => {
                            debug!("websocket stream ended");
                            break;
                        }

                        // Ignore Ping, Pong, raw frames.
                        _ => {}
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(SocketCommand::Send(frame)) => {
                            if let Err(e) = sink.send(frame).await {
                                warn!(error = %e, "failed to write frame");
                            }
                        }

                        Some(SocketCommand::Close) | None => {
                            debug!("close requested");
                            let _ = sink.close().await;
                            break;
                        }
                    }
                }
            }
        }

        // A newer connection owns the shared state once the generation moved
        // on; only the current generation may settle it.
        if inner.generation.load(Ordering::SeqCst) == generation {
            *inner.command_tx.lock() = None;
            inner.set_state(STATE_DISCONNECTED);
            inner.events.publish(&TransportEvent::Disconnected);

            if inner.manual_close.load(Ordering::SeqCst) {
                debug!("socket task terminated after explicit disconnect");
            } else {
                Self::maybe_schedule_reconnect(&inner, generation);
            }
        } else {
            trace!(generation, "stale socket task terminated");
        }
    }

    /// Schedules one reconnect attempt if budget remains.
    fn maybe_schedule_reconnect(inner: &Arc<Self>, generation: u64) {
        let budget = inner.config.retry_budget();
        let attempts = inner.retries.load(Ordering::SeqCst);

        if attempts >= budget {
            warn!(budget, "reconnect budget exhausted, staying disconnected");
            return;
        }
        inner.retries.store(attempts + 1, Ordering::SeqCst);

        let backoff = inner.config.retry_backoff();
        debug!(
            attempt = attempts + 1,
            budget,
            backoff_ms = backoff.as_millis() as u64,
            "scheduling reconnect"
        );

        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            sleep(backoff).await;
            Self::try_connect(inner, Some(generation)).await;
        });
    }

    /// Decodes a binary frame and publishes it; decode failures are dropped.
    fn handle_binary_frame(&self, frame: &[u8]) {
        let Some(codec) = self.config.codec() else {
            warn!(len = frame.len(), "binary frame without a schema, dropping");
            return;
        };

        match codec.decode(frame) {
            Ok(message) => {
                trace!(id = %message.id, "inbound binary message");
                self.events.publish(&TransportEvent::Message(message));
            }
            Err(e) => warn!(error = %e, "failed to decode binary frame, dropping"),
        }
    }

    /// Parses a JSON text frame and publishes it; parse failures are dropped.
    fn handle_text_frame(&self, text: &str) {
        match decode_json(text) {
            Ok(message) => {
                trace!(id = %message.id, "inbound text message");
                self.events.publish(&TransportEvent::Message(message));
            }
            Err(e) => warn!(error = %e, "failed to parse text frame, dropping"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    use crate::protocol::BinaryCodec;
    use crate::protocol::codec::FrameCodec;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Loopback server that upgrades every connection, counts accepts and
    /// echoes every data frame back to the sender.
    async fn spawn_echo_server() -> (u16, Arc<AtomicU32>) {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let accepted = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                tokio::spawn(async move {
                    let Ok(mut socket) = accept_async(stream).await else {
                        return;
                    };
                    while let Some(Ok(frame)) = socket.next().await {
                        if (frame.is_binary() || frame.is_text())
                            && socket.send(frame).await.is_err()
                        {
                            break;
                        }
                    }
                });
            }
        });

        (port, accepted)
    }

    fn test_config(port: u16, budget: u32) -> ClientConfig {
        ClientConfig::builder()
            .endpoint(format!("ws://127.0.0.1:{port}/ws"))
            .retry_budget(budget)
            .retry_backoff(Duration::from_millis(20))
            .build()
            .expect("config")
    }

    async fn wait_for_state(client: &RealtimeClient, want: ConnectionState) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
        while client.connection_state() != want {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {want:?}, currently {:?}",
                client.connection_state()
            );
            sleep(Duration::from_millis(10)).await;
        }
    }

    async fn wait_for_count(counter: &AtomicU32, want: u32) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
        while counter.load(Ordering::SeqCst) < want {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for count {want}, currently {}",
                counter.load(Ordering::SeqCst)
            );
            sleep(Duration::from_millis(10)).await;
        }
    }

    #[test]
    fn test_initial_state() {
        let client = RealtimeClient::new(test_config(1, 5));
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_state_from_raw() {
        assert_eq!(ConnectionState::from_raw(0), ConnectionState::Disconnected);
        assert_eq!(ConnectionState::from_raw(2), ConnectionState::Connected);
        assert_eq!(ConnectionState::from_raw(200), ConnectionState::Unknown);
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let (port, accepted) = spawn_echo_server().await;
        let client = RealtimeClient::new(test_config(port, 5));

        client.connect("alice").await;
        client.connect("alice").await;
        client.connect("alice").await;

        wait_for_state(&client, ConnectionState::Connected).await;
        sleep(Duration::from_millis(50)).await;

        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connect_with_empty_identity_reports_error() {
        let client = RealtimeClient::new(test_config(1, 5));
        let errors = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&errors);
        client.on(EventKind::Error, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        client.connect("").await;

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_send_while_disconnected_is_silent() {
        let client = RealtimeClient::new(test_config(1, 5));

        // No transport exists; both calls must be no-ops without panicking.
        client.send_message(&ChatMessage::text("alice", "bob", "dropped"));
        client.send_heartbeat();

        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_binary_round_trip_through_echo_server() {
        let (port, _accepted) = spawn_echo_server().await;
        let client = RealtimeClient::new(test_config(port, 5));

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        client.on(EventKind::Message, move |event| {
            if let TransportEvent::Message(message) = event {
                sink.lock().push(message.clone());
            }
        });

        client.connect("alice").await;
        wait_for_state(&client, ConnectionState::Connected).await;

        let outbound = ChatMessage::text("alice", "bob", "over the wire");
        client.send_message(&outbound);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
        while received.lock().is_empty() {
            assert!(tokio::time::Instant::now() < deadline, "no echo received");
            sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(received.lock()[0], outbound);
    }

    #[tokio::test]
    async fn test_json_fallback_heartbeat_round_trip() {
        let (port, _accepted) = spawn_echo_server().await;
        let config = ClientConfig::builder()
            .endpoint(format!("ws://127.0.0.1:{port}/ws"))
            .retry_backoff(Duration::from_millis(20))
            .json_only()
            .build()
            .expect("config");
        let client = RealtimeClient::new(config);

        let heartbeats = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&heartbeats);
        client.on(EventKind::Message, move |event| {
            if let TransportEvent::Message(message) = event {
                if message.is_heartbeat() && message.content == "ping" {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        client.connect("alice").await;
        wait_for_state(&client, ConnectionState::Connected).await;

        client.send_heartbeat();
        wait_for_count(&heartbeats, 1).await;
    }

    #[tokio::test]
    async fn test_retry_budget_exhaustion() {
        // Reserve a port, then close the listener so every connect refuses.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let client = RealtimeClient::new(test_config(port, 3));
        let disconnects = Arc::new(AtomicU32::new(0));
        let errors = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&disconnects);
        client.on(EventKind::Disconnected, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&errors);
        client.on(EventKind::Error, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        client.connect("carol").await;

        // Initial attempt plus 3 retries, each failing fast on loopback.
        wait_for_count(&disconnects, 4).await;
        sleep(Duration::from_millis(200)).await;

        assert_eq!(disconnects.load(Ordering::SeqCst), 4);
        assert_eq!(errors.load(Ordering::SeqCst), 4);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_suppresses_reconnect() {
        let (port, accepted) = spawn_echo_server().await;
        let client = RealtimeClient::new(test_config(port, 5));

        client.connect("alice").await;
        wait_for_state(&client, ConnectionState::Connected).await;

        client.disconnect();
        wait_for_state(&client, ConnectionState::Disconnected).await;

        // Well past several backoff intervals: no new connection may appear.
        sleep(Duration::from_millis(150)).await;
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_explicit_reconnect_after_disconnect() {
        let (port, accepted) = spawn_echo_server().await;
        let client = RealtimeClient::new(test_config(port, 5));

        client.connect("alice").await;
        wait_for_state(&client, ConnectionState::Connected).await;
        client.disconnect();
        wait_for_state(&client, ConnectionState::Disconnected).await;

        client.connect("alice").await;
        wait_for_state(&client, ConnectionState::Connected).await;

        assert_eq!(accepted.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_schema_load_failure_aborts_attempt() {
        struct BrokenCodec;

        impl FrameCodec for BrokenCodec {
            fn load(&self) -> crate::Result<()> {
                Err(Error::schema("descriptor unavailable"))
            }
            fn encode(&self, message: &ChatMessage) -> crate::Result<Vec<u8>> {
                BinaryCodec.encode(message)
            }
            fn decode(&self, frame: &[u8]) -> crate::Result<ChatMessage> {
                BinaryCodec.decode(frame)
            }
        }

        let (port, accepted) = spawn_echo_server().await;
        let config = ClientConfig::builder()
            .endpoint(format!("ws://127.0.0.1:{port}/ws"))
            .retry_backoff(Duration::from_millis(20))
            .codec(Arc::new(BrokenCodec))
            .build()
            .expect("config");
        let client = RealtimeClient::new(config);

        let errors = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&errors);
        client.on(EventKind::Error, move |event| {
            if let TransportEvent::Error(e) = event {
                assert!(e.is_codec_error());
            }
            counter.fetch_add(1, Ordering::SeqCst);
        });

        client.connect("alice").await;

        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);
        // The attempt aborted before the handshake; nothing reached the
        // server and no reconnect was scheduled for a schema failure.
        sleep(Duration::from_millis(100)).await;
        assert_eq!(accepted.load(Ordering::SeqCst), 0);
    }
}
