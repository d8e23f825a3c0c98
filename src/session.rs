// ABOUTME: SMPP v3.4 session state machine shared by the client and server acceptor
// ABOUTME: Owns bind state, sequence number allocation, request/response correlation, and keep-alive

use crate::client::types::{BindCredentials, BindType};
use crate::codec::Frame;
use crate::connection::Connection;
use crate::datatypes::{
    BindReceiver, BindTransceiver, BindTransmitter, CommandStatus, EnquireLink,
    EnquireLinkResponse, InterfaceVersion, NumericPlanIndicator, Password, SystemId, SystemType,
    TypeOfNumber, Unbind, UnbindResponse,
};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, Mutex};

/// Which end of the TCP connection this session represents. An `Initiator`
/// issues the bind request (the ESME side); an `Acceptor` receives it (the
/// SMSC side). Both roles run the same correlation/keep-alive machinery once
/// bound — only who originates the bind differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Acceptor,
}

/// SMPP v3.4 session state (spec section 2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
    BoundTx,
    BoundRx,
    BoundTrx,
    Unbinding,
}

impl ConnectionState {
    pub fn is_bound(self) -> bool {
        matches!(
            self,
            ConnectionState::BoundTx | ConnectionState::BoundRx | ConnectionState::BoundTrx
        )
    }

    pub fn can_transmit(self) -> bool {
        matches!(self, ConnectionState::BoundTx | ConnectionState::BoundTrx)
    }

    pub fn can_receive(self) -> bool {
        matches!(self, ConnectionState::BoundRx | ConnectionState::BoundTrx)
    }
}

/// Shared tuning knobs for both client and server sessions, mirroring the
/// defaults table in the SMPP v3.4 specification section 2.2.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub system_id: String,
    pub password: String,
    pub system_type: String,
    pub interface_version: InterfaceVersion,
    pub addr_ton: TypeOfNumber,
    pub addr_npi: NumericPlanIndicator,
    pub address_range: String,
    pub bind_timeout: Duration,
    pub enquire_link_interval: Duration,
    pub response_timeout: Duration,
    pub max_connections: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 2775,
            system_id: String::new(),
            password: String::new(),
            system_type: String::new(),
            interface_version: InterfaceVersion::SmppV34,
            addr_ton: TypeOfNumber::Unknown,
            addr_npi: NumericPlanIndicator::Unknown,
            address_range: String::new(),
            bind_timeout: Duration::from_secs(30),
            enquire_link_interval: Duration::from_secs(60),
            response_timeout: Duration::from_secs(30),
            max_connections: 100,
        }
    }
}

impl SessionConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, system_id: impl Into<String>, password: impl Into<String>) -> Self {
        self.system_id = system_id.into();
        self.password = password.into();
        self
    }

    pub fn with_system_type(mut self, system_type: impl Into<String>) -> Self {
        self.system_type = system_type.into();
        self
    }

    pub fn with_bind_timeout(mut self, timeout: Duration) -> Self {
        self.bind_timeout = timeout;
        self
    }

    pub fn with_enquire_link_interval(mut self, interval: Duration) -> Self {
        self.enquire_link_interval = interval;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }
}

/// One in-flight request awaiting its response, per invariant I3/I4: exactly
/// one of {matching response, timeout, cancellation, teardown} resolves it,
/// and no two in-flight requests on the same session share a sequence number.
struct PendingEntry {
    deadline: Instant,
    waiter: oneshot::Sender<Frame>,
}

struct SharedState {
    state: Mutex<ConnectionState>,
    pending: Mutex<HashMap<u32, PendingEntry>>,
    next_seq: AtomicU32,
    last_tx: Mutex<Instant>,
    last_rx: Mutex<Instant>,
    peer_system_id: Mutex<Option<String>>,
}

enum Outbound {
    Frame(Frame),
}

/// A PDU the session's dispatch loop could not correlate to a pending
/// request and does not answer itself (`submit_sm`, `deliver_sm`): handed to
/// whoever is driving the session (server acceptor or bound client) to
/// answer at the application level.
pub struct IncomingRequest {
    pub frame: Frame,
    pub reply: oneshot::Sender<Frame>,
}

/// Cheaply-cloneable handle to a running session. All session I/O — bind,
/// unbind, request/response, keep-alive — goes through this handle; the
/// actual socket is owned by the [`Session`] driver task.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<SharedState>,
    outbound: mpsc::Sender<Outbound>,
    role: Role,
    response_timeout: Duration,
}

impl SessionHandle {
    pub async fn state(&self) -> ConnectionState {
        *self.shared.state.lock().await
    }

    pub async fn peer_system_id(&self) -> Option<String> {
        self.shared.peer_system_id.lock().await.clone()
    }

    /// Allocate the next sequence number, wrapping 1..=0x7FFFFFFF (0 and the
    /// top bit's range are reserved on the wire; see `CodecError::ReservedSequenceNumber`).
    pub fn next_sequence_number(&self) -> u32 {
        loop {
            let current = self.shared.next_seq.load(Ordering::SeqCst);
            let next = if current >= 0x7FFF_FFFF { 1 } else { current + 1 };
            if self
                .shared
                .next_seq
                .compare_exchange(current, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return next;
            }
        }
    }

    async fn set_state(&self, new_state: ConnectionState) {
        *self.shared.state.lock().await = new_state;
    }

    /// Send `frame` and wait for the matching response, enforcing invariant
    /// I4 (no duplicate in-flight sequence number) and the response timeout.
    pub async fn send_request(&self, frame: Frame, sequence_number: u32) -> Result<Frame> {
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.shared.pending.lock().await;
            if pending.contains_key(&sequence_number) {
                return Err(Error::InvalidState(format!(
                    "sequence_number {sequence_number} already has a request in flight"
                )));
            }
            pending.insert(
                sequence_number,
                PendingEntry {
                    deadline: Instant::now() + self.response_timeout,
                    waiter: tx,
                },
            );
        }

        if self.outbound.send(Outbound::Frame(frame)).await.is_err() {
            self.shared.pending.lock().await.remove(&sequence_number);
            return Err(Error::ConnectionError("session closed".to_string()));
        }

        match tokio::time::timeout(self.response_timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(Error::Cancelled),
            Err(_) => {
                self.shared.pending.lock().await.remove(&sequence_number);
                Err(Error::Timeout)
            }
        }
    }

    /// Send a PDU that expects no correlated response (e.g. a response PDU
    /// we're emitting, or a one-way notification).
    pub async fn send(&self, frame: Frame) -> Result<()> {
        self.outbound
            .send(Outbound::Frame(frame))
            .await
            .map_err(|_| Error::ConnectionError("session closed".to_string()))
    }

    /// Issue a bind request as the initiating (ESME) side. Only valid from
    /// `Open`.
    pub async fn bind(&self, credentials: &BindCredentials) -> Result<()> {
        if self.role != Role::Initiator {
            return Err(Error::InvalidState("only the initiating side calls bind()".to_string()));
        }
        if self.state().await != ConnectionState::Open {
            return Err(Error::InvalidState("bind() requires the Open state".to_string()));
        }

        let seq = self.next_sequence_number();
        let system_type = SystemType::from(credentials.system_type.as_deref().unwrap_or(""));
        let system_id = SystemId::from(credentials.system_id.as_str());
        let password = Some(Password::from(credentials.password.as_str()));

        let (frame, target_state) = match credentials.bind_type {
            BindType::Transmitter => (
                Frame::BindTransmitter(Box::new(BindTransmitter {
                    command_status: CommandStatus::Ok,
                    sequence_number: seq,
                    system_id,
                    password,
                    system_type,
                    interface_version: credentials.interface_version,
                    addr_ton: TypeOfNumber::Unknown,
                    addr_npi: NumericPlanIndicator::Unknown,
                    address_range: Default::default(),
                })),
                ConnectionState::BoundTx,
            ),
            BindType::Receiver => (
                Frame::BindReceiver(Box::new(BindReceiver {
                    command_status: CommandStatus::Ok,
                    sequence_number: seq,
                    system_id,
                    password,
                    system_type,
                    interface_version: credentials.interface_version,
                    addr_ton: TypeOfNumber::Unknown,
                    addr_npi: NumericPlanIndicator::Unknown,
                    address_range: Default::default(),
                })),
                ConnectionState::BoundRx,
            ),
            BindType::Transceiver => (
                Frame::BindTransceiver(Box::new(BindTransceiver {
                    command_status: CommandStatus::Ok,
                    sequence_number: seq,
                    system_id,
                    password,
                    system_type,
                    interface_version: credentials.interface_version,
                    addr_ton: TypeOfNumber::Unknown,
                    addr_npi: NumericPlanIndicator::Unknown,
                    address_range: Default::default(),
                })),
                ConnectionState::BoundTrx,
            ),
        };

        let response = self.send_request(frame, seq).await?;
        let status = match &response {
            Frame::BindTransmitterResp(r) => r.command_status,
            Frame::BindReceiverResp(r) => r.command_status,
            Frame::BindTransceiverResp(r) => r.command_status,
            _ => return Err(Error::InvalidState("unexpected bind response PDU".to_string())),
        };

        if status != CommandStatus::Ok {
            return Err(Error::BindError(status));
        }

        *self.shared.peer_system_id.lock().await = Some(credentials.system_id.clone());
        self.set_state(target_state).await;
        Ok(())
    }

    /// Record a successful bind negotiated by the server acceptor on the
    /// peer's behalf (the acceptor answers the bind request directly rather
    /// than going through [`SessionHandle::bind`], which is initiator-only).
    pub async fn mark_bound(&self, state: ConnectionState, peer_system_id: impl Into<String>) {
        *self.shared.peer_system_id.lock().await = Some(peer_system_id.into());
        self.set_state(state).await;
    }

    /// Initiate unbind from a bound state, per spec: transitions to
    /// `Unbinding` while the response is outstanding.
    pub async fn unbind(&self) -> Result<()> {
        let current = self.state().await;
        if !current.is_bound() {
            return Err(Error::InvalidState("unbind() requires a bound state".to_string()));
        }

        self.set_state(ConnectionState::Unbinding).await;
        let seq = self.next_sequence_number();
        let frame = Frame::Unbind(Unbind {
            command_status: CommandStatus::Ok,
            sequence_number: seq,
        });

        let result = self.send_request(frame, seq).await;
        self.set_state(ConnectionState::Closed).await;

        match result {
            Ok(Frame::UnbindResp(resp)) if resp.command_status == CommandStatus::Ok => Ok(()),
            Ok(Frame::UnbindResp(resp)) => Err(Error::BindError(resp.command_status)),
            Ok(_) => Err(Error::InvalidState("unexpected unbind response PDU".to_string())),
            // A closed connection while waiting for unbind_resp is an acceptable teardown.
            Err(Error::ConnectionError(_)) | Err(Error::Cancelled) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// The driver for a single SMPP session: owns the `Connection`, runs the
/// read loop, answers `enquire_link` automatically, matches responses
/// against `pending`, and sweeps timed-out requests.
///
/// Spawn [`Session::run`] as its own task; interact with the session through
/// the paired [`SessionHandle`].
pub struct Session {
    connection: Connection,
    shared: Arc<SharedState>,
    outbound_rx: mpsc::Receiver<Outbound>,
    config: SessionConfig,
    incoming: mpsc::Sender<IncomingRequest>,
}

impl Session {
    /// Build a fresh session over `connection`. Returns the handle callers
    /// use plus a receiver for PDUs the driver can't answer itself
    /// (`submit_sm`, `deliver_sm`) and the driver task to spawn.
    pub fn new(
        connection: Connection,
        config: SessionConfig,
        role: Role,
    ) -> (SessionHandle, mpsc::Receiver<IncomingRequest>, Session) {
        let now = Instant::now();
        let shared = Arc::new(SharedState {
            state: Mutex::new(ConnectionState::Open),
            pending: Mutex::new(HashMap::new()),
            next_seq: AtomicU32::new(0),
            last_tx: Mutex::new(now),
            last_rx: Mutex::new(now),
            peer_system_id: Mutex::new(None),
        });
        let (outbound_tx, outbound_rx) = mpsc::channel(64);
        let (incoming_tx, incoming_rx) = mpsc::channel(64);

        let handle = SessionHandle {
            shared: shared.clone(),
            outbound: outbound_tx,
            role,
            response_timeout: config.response_timeout,
        };

        let driver = Session {
            connection,
            shared,
            outbound_rx,
            config,
            incoming: incoming_tx,
        };

        (handle, incoming_rx, driver)
    }

    /// Drive the session until the connection closes or an unrecoverable
    /// protocol error occurs.
    pub async fn run(mut self) -> Result<()> {
        let mut keepalive = tokio::time::interval(self.config.enquire_link_interval);
        let mut sweep = tokio::time::interval(Duration::from_secs(1));
        keepalive.tick().await;
        sweep.tick().await;

        loop {
            tokio::select! {
                frame = self.connection.read_frame() => {
                    match frame? {
                        Some(frame) => {
                            *self.shared.last_rx.lock().await = Instant::now();
                            if self.dispatch(frame).await? {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                outbound = self.outbound_rx.recv() => {
                    match outbound {
                        Some(Outbound::Frame(frame)) => {
                            self.connection.write_frame(&frame).await?;
                            *self.shared.last_tx.lock().await = Instant::now();
                        }
                        // Every `SessionHandle` was dropped; nothing can
                        // drive this session anymore.
                        None => break,
                    }
                }
                _ = keepalive.tick() => {
                    self.maybe_send_keepalive().await?;
                }
                _ = sweep.tick() => {
                    self.sweep_timeouts().await;
                }
            }
        }

        *self.shared.state.lock().await = ConnectionState::Closed;
        Ok(())
    }

    /// Returns `Ok(true)` when the session should stop running (peer
    /// unbound us, or we answered their unbind and the connection is done).
    async fn dispatch(&mut self, frame: Frame) -> Result<bool> {
        let sequence_number = frame_sequence_number(&frame);

        if is_response(&frame) {
            let waiter = self.shared.pending.lock().await.remove(&sequence_number);
            if let Some(entry) = waiter {
                let _ = entry.waiter.send(frame);
            }
            return Ok(false);
        }

        match frame {
            Frame::EnquireLink(req) => {
                self.connection
                    .write_frame(&Frame::EnquireLinkResp(EnquireLinkResponse::new(
                        req.sequence_number,
                    )))
                    .await?;
                *self.shared.last_tx.lock().await = Instant::now();
                Ok(false)
            }
            Frame::Unbind(req) => {
                self.connection
                    .write_frame(&Frame::UnbindResp(UnbindResponse::new(
                        req.sequence_number,
                    )))
                    .await?;
                *self.shared.state.lock().await = ConnectionState::Closed;
                Ok(true)
            }
            other => {
                let (tx, rx) = oneshot::channel();
                if self
                    .incoming
                    .send(IncomingRequest { frame: other, reply: tx })
                    .await
                    .is_ok()
                {
                    if let Ok(response) = rx.await {
                        self.connection.write_frame(&response).await?;
                        *self.shared.last_tx.lock().await = Instant::now();
                    }
                }
                Ok(false)
            }
        }
    }

    async fn maybe_send_keepalive(&mut self) -> Result<()> {
        let idle_for = self.shared.last_tx.lock().await.elapsed();
        if idle_for >= self.config.enquire_link_interval {
            let seq = {
                let current = self.shared.next_seq.load(Ordering::SeqCst);
                let next = if current >= 0x7FFF_FFFF { 1 } else { current + 1 };
                self.shared.next_seq.store(next, Ordering::SeqCst);
                next
            };
            self.connection
                .write_frame(&Frame::EnquireLink(EnquireLink::new(seq)))
                .await?;
            *self.shared.last_tx.lock().await = Instant::now();
        }

        let since_rx = self.shared.last_rx.lock().await.elapsed();
        if since_rx >= self.config.enquire_link_interval * 2 {
            return Err(Error::Timeout);
        }

        Ok(())
    }

    async fn sweep_timeouts(&mut self) {
        let now = Instant::now();
        let mut pending = self.shared.pending.lock().await;
        let expired: Vec<u32> = pending
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .map(|(seq, _)| *seq)
            .collect();
        for seq in expired {
            // Dropping the waiter resolves the caller's `rx.await` with an
            // error; the caller's own `tokio::time::timeout` also fires
            // around the same deadline, whichever observes it first wins.
            pending.remove(&seq);
        }
    }
}

fn is_response(frame: &Frame) -> bool {
    matches!(
        frame,
        Frame::BindTransmitterResp(_)
            | Frame::BindReceiverResp(_)
            | Frame::BindTransceiverResp(_)
            | Frame::SubmitSmResp(_)
            | Frame::DeliverSmResp(_)
            | Frame::EnquireLinkResp(_)
            | Frame::UnbindResp(_)
            | Frame::GenericNack(_)
    )
}

fn frame_sequence_number(frame: &Frame) -> u32 {
    match frame {
        Frame::BindTransmitter(p) => p.sequence_number,
        Frame::BindReceiver(p) => p.sequence_number,
        Frame::BindTransceiver(p) => p.sequence_number,
        Frame::SubmitSm(p) => p.sequence_number,
        Frame::DeliverSm(p) => p.sequence_number,
        Frame::EnquireLink(p) => p.sequence_number,
        Frame::Unbind(p) => p.sequence_number,
        Frame::BindTransmitterResp(p) => p.sequence_number,
        Frame::BindReceiverResp(p) => p.sequence_number,
        Frame::BindTransceiverResp(p) => p.sequence_number,
        Frame::SubmitSmResp(p) => p.sequence_number,
        Frame::DeliverSmResp(p) => p.sequence_number,
        Frame::EnquireLinkResp(p) => p.sequence_number,
        Frame::UnbindResp(p) => p.sequence_number,
        Frame::GenericNack(p) => p.sequence_number,
        Frame::Outbind(p) => p.sequence_number,
        Frame::Unknown { header, .. } => header.sequence_number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_with_next_seq(next_seq: u32) -> SessionHandle {
        let (tx, _rx) = mpsc::channel(1);
        let shared = Arc::new(SharedState {
            state: Mutex::new(ConnectionState::Open),
            pending: Mutex::new(HashMap::new()),
            next_seq: AtomicU32::new(next_seq),
            last_tx: Mutex::new(Instant::now()),
            last_rx: Mutex::new(Instant::now()),
            peer_system_id: Mutex::new(None),
        });
        SessionHandle {
            shared,
            outbound: tx,
            role: Role::Initiator,
            response_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn sequence_number_wraps_past_max() {
        let handle = handle_with_next_seq(0x7FFF_FFFF);
        assert_eq!(handle.next_sequence_number(), 1);
        assert_ne!(handle.next_sequence_number(), 0);
    }

    #[test]
    fn sequence_number_increments_normally() {
        let handle = handle_with_next_seq(5);
        assert_eq!(handle.next_sequence_number(), 6);
        assert_eq!(handle.next_sequence_number(), 7);
    }

    #[test]
    fn connection_state_bound_predicates() {
        assert!(ConnectionState::BoundTx.can_transmit());
        assert!(!ConnectionState::BoundTx.can_receive());
        assert!(ConnectionState::BoundRx.can_receive());
        assert!(!ConnectionState::BoundRx.can_transmit());
        assert!(ConnectionState::BoundTrx.can_transmit());
        assert!(ConnectionState::BoundTrx.can_receive());
        assert!(!ConnectionState::Open.is_bound());
    }
}
