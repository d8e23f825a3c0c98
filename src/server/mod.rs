// ABOUTME: SMPP server acceptor: binds a TcpListener, authenticates incoming binds, and routes traffic
// ABOUTME: Structurally grounded on TheGU-rust-smpp-sim's smpp::server/session loop, kept on the teacher's tokio stack

pub mod registry;
pub mod shutdown;

use crate::connection::Connection;
use crate::datatypes::{
    BindReceiverResponse, BindTransceiverResponse, BindTransmitterResponse, CommandStatus,
    DeliverSm, MessageId, SystemId,
};
use crate::error::{Error, Result};
use crate::session::{ConnectionState, IncomingRequest, Role, Session, SessionConfig, SessionHandle};
use crate::Frame;
use registry::{SessionId, SessionRegistry};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Notify};

/// Server-side event hooks. `authenticate` is the only required method;
/// the rest default to no-ops, following the pattern set by
/// [`crate::client::keepalive::KeepAliveConfig`]'s builder defaults — most
/// deployments only care about a handful of these.
///
/// Implemented generically (`Server<H>`) rather than as a trait object so
/// these can be `async fn` without pulling in an `async-trait`-style crate.
pub trait ServerHooks: Send + Sync + 'static {
    /// Decide whether `system_id`/`password` may bind. The only hook every
    /// server must implement.
    fn authenticate(
        &self,
        system_id: &str,
        password: &str,
        system_type: &str,
    ) -> impl std::future::Future<Output = bool> + Send;

    /// A TCP connection was accepted (not yet bound).
    fn on_client_connected(&self, _peer: std::net::SocketAddr) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }

    /// `system_id` completed a bind.
    fn on_client_bound(&self, _system_id: &str, _state: ConnectionState) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }

    /// A previously-bound client disconnected.
    fn on_client_disconnected(&self, _system_id: &str) -> impl std::future::Future<Output = ()> + Send {
        async {}
    }

    /// A bound client submitted a message. Returning a `MessageId` lets the
    /// hook control what's echoed back in `submit_sm_resp`.
    fn on_message_received(
        &self,
        _system_id: &str,
        _to: &str,
        _from: &str,
        _text: &str,
    ) -> impl std::future::Future<Output = MessageId> + Send {
        async { MessageId::default() }
    }
}

/// SMPP server acceptor (the SMSC side): listens for connections, negotiates
/// bind per spec section 4.1, and routes `submit_sm`/`deliver_sm` between
/// bound sessions.
pub struct Server<H: ServerHooks> {
    config: SessionConfig,
    hooks: Arc<H>,
    registry: Arc<SessionRegistry>,
    next_session_id: Arc<AtomicU64>,
    shutdown: Arc<Notify>,
    listener_done: Arc<Notify>,
}

impl<H: ServerHooks> Server<H> {
    pub fn new(config: SessionConfig, hooks: H) -> Self {
        Self {
            config,
            hooks: Arc::new(hooks),
            registry: Arc::new(SessionRegistry::new()),
            next_session_id: Arc::new(AtomicU64::new(1)),
            shutdown: Arc::new(Notify::new()),
            listener_done: Arc::new(Notify::new()),
        }
    }

    /// Bind `config.host:config.port` and start accepting connections in a
    /// background task. Idempotent in the sense that calling it again after
    /// `stop()` starts a fresh listener.
    pub async fn start(&self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::ConnectionError(e.to_string()))?;
        tracing::info!(%addr, "SMPP server listening");

        let config = self.config.clone();
        let hooks = self.hooks.clone();
        let registry = self.registry.clone();
        let next_session_id = self.next_session_id.clone();
        let shutdown = self.shutdown.clone();
        let listener_done = self.listener_done.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.notified() => break,
                    accepted = listener.accept() => {
                        match accepted {
                            Ok((socket, peer)) => {
                                if registry.len().await >= config.max_connections {
                                    tracing::warn!(%peer, "rejecting connection: at max_connections");
                                    tokio::spawn(reject_at_capacity(socket));
                                    continue;
                                }

                                let id = next_session_id.fetch_add(1, Ordering::SeqCst);
                                let config = config.clone();
                                let hooks = hooks.clone();
                                let registry = registry.clone();
                                tokio::spawn(async move {
                                    if let Err(e) = handle_connection(id, socket, peer, config, hooks, registry).await {
                                        tracing::warn!(%peer, error = %e, "session ended with error");
                                    }
                                });
                            }
                            Err(e) => tracing::error!(error = %e, "accept() failed"),
                        }
                    }
                }
            }
            listener_done.notify_one();
        });

        Ok(())
    }

    /// Gracefully shut down: stop accepting, unbind every live session, and
    /// wait up to `grace_period` before forcing stragglers closed. See
    /// [`shutdown::shutdown`] for the full sequence.
    pub async fn stop(&self, grace_period: std::time::Duration) {
        shutdown::shutdown(&self.shutdown, &self.listener_done, &self.registry, grace_period).await;
    }

    /// Route a `deliver_sm` to the session bound under `system_id`. Fails if
    /// no such session is currently bound and able to receive.
    pub async fn deliver_sm(&self, system_id: &str, from: &str, to: &str, text: &str) -> Result<()> {
        let handle = self
            .registry
            .find_by_peer_system_id(system_id)
            .await
            .ok_or_else(|| Error::InvalidState(format!("no bound session for system_id {system_id}")))?;

        if !handle.state().await.can_receive() {
            return Err(Error::InvalidState(format!(
                "session {system_id} is not bound to receive"
            )));
        }

        let seq = handle.next_sequence_number();
        let pdu = DeliverSm::builder()
            .sequence_number(seq)
            .source_addr(from)
            .destination_addr(to)
            .short_message(text)
            .build()
            .map_err(|e| Error::InvalidState(e.to_string()))?;

        let response = handle.send_request(Frame::DeliverSm(Box::new(pdu)), seq).await?;
        match response {
            Frame::DeliverSmResp(resp) if resp.command_status == CommandStatus::Ok => Ok(()),
            Frame::DeliverSmResp(resp) => Err(Error::BindError(resp.command_status)),
            _ => Err(Error::InvalidState("unexpected deliver_sm response".to_string())),
        }
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        self.registry.clone()
    }
}

async fn reject_at_capacity(socket: TcpStream) {
    use crate::datatypes::GenericNack;
    let mut conn = Connection::new(socket);
    let nack = GenericNack::new(CommandStatus::SystemError, 0);
    let _ = conn.write_frame(&Frame::GenericNack(nack)).await;
}

async fn handle_connection<H: ServerHooks>(
    id: SessionId,
    socket: TcpStream,
    peer: std::net::SocketAddr,
    config: SessionConfig,
    hooks: Arc<H>,
    registry: Arc<SessionRegistry>,
) -> Result<()> {
    hooks.on_client_connected(peer).await;

    let connection = Connection::new(socket);
    let (handle, mut incoming, driver) = Session::new(connection, config.clone(), Role::Acceptor);
    registry.insert(id, handle.clone()).await;

    let driver_task = tokio::spawn(driver.run());

    let bind_result = await_bind(&handle, &mut incoming, hooks.as_ref(), &config).await;
    match bind_result {
        Ok((system_id, state)) => {
            registry.set_peer_system_id(id, system_id.clone()).await;
            hooks.on_client_bound(&system_id, state).await;
            serve_bound_session(&system_id, &mut incoming, hooks.as_ref()).await;
            hooks.on_client_disconnected(&system_id).await;
        }
        Err(e) => {
            tracing::warn!(%peer, error = %e, "bind failed");
        }
    }

    registry.remove(id).await;
    let _ = driver_task.await;
    Ok(())
}

/// Wait for the client's bind request, authenticate it, and answer. Returns
/// the bound `system_id` and the resulting connection state.
async fn await_bind<H: ServerHooks>(
    handle: &SessionHandle,
    incoming: &mut mpsc::Receiver<IncomingRequest>,
    hooks: &H,
    config: &SessionConfig,
) -> Result<(String, ConnectionState)> {
    let request = tokio::time::timeout(config.bind_timeout, incoming.recv())
        .await
        .map_err(|_| Error::Timeout)?
        .ok_or_else(|| Error::ConnectionError("connection closed before bind".to_string()))?;

    let (system_id, password, system_type, target_state, seq) = match &request.frame {
        Frame::BindTransmitter(p) => (
            p.system_id.to_string(),
            p.password.as_ref().map(|pw| pw.to_string()).unwrap_or_default(),
            p.system_type.to_string(),
            ConnectionState::BoundTx,
            p.sequence_number,
        ),
        Frame::BindReceiver(p) => (
            p.system_id.to_string(),
            p.password.as_ref().map(|pw| pw.to_string()).unwrap_or_default(),
            p.system_type.to_string(),
            ConnectionState::BoundRx,
            p.sequence_number,
        ),
        Frame::BindTransceiver(p) => (
            p.system_id.to_string(),
            p.password.as_ref().map(|pw| pw.to_string()).unwrap_or_default(),
            p.system_type.to_string(),
            ConnectionState::BoundTrx,
            p.sequence_number,
        ),
        _ => {
            let _ = request.reply.send(Frame::GenericNack(
                crate::datatypes::GenericNack::new(CommandStatus::IncorrectBindStatus, 0),
            ));
            return Err(Error::InvalidState("expected a bind request".to_string()));
        }
    };

    if !hooks.authenticate(&system_id, &password, &system_type).await {
        let response = bind_response(target_state, seq, SystemId::from(system_id.as_str()), CommandStatus::InvalidPassword);
        let _ = request.reply.send(response);
        return Err(Error::AuthenticationError);
    }

    let response = bind_response(target_state, seq, SystemId::from(system_id.as_str()), CommandStatus::Ok);
    let _ = request.reply.send(response);

    handle.mark_bound(target_state, system_id.clone()).await;
    Ok((system_id, target_state))
}

fn bind_response(state: ConnectionState, seq: u32, system_id: SystemId, status: CommandStatus) -> Frame {
    match state {
        ConnectionState::BoundTx => {
            let mut resp = BindTransmitterResponse::new(seq, system_id);
            resp.command_status = status;
            Frame::BindTransmitterResp(resp)
        }
        ConnectionState::BoundRx => {
            let mut resp = BindReceiverResponse::new(seq, system_id);
            resp.command_status = status;
            Frame::BindReceiverResp(resp)
        }
        _ => {
            let mut resp = BindTransceiverResponse::new(seq, system_id);
            resp.command_status = status;
            Frame::BindTransceiverResp(resp)
        }
    }
}

/// Once bound, the only requests a session forwards to application code are
/// `submit_sm` (everything else — `enquire_link`, `unbind` — is answered
/// inside [`Session::run`] itself).
async fn serve_bound_session<H: ServerHooks>(
    system_id: &str,
    incoming: &mut mpsc::Receiver<IncomingRequest>,
    hooks: &H,
) {
    while let Some(request) = incoming.recv().await {
        match request.frame {
            Frame::SubmitSm(pdu) => {
                let to = pdu.destination_addr.as_str().unwrap_or_default().to_string();
                let from = pdu.source_addr.as_str().unwrap_or_default().to_string();
                let text = pdu.short_message.to_string();
                let message_id = hooks.on_message_received(system_id, &to, &from, &text).await;

                let response = crate::datatypes::SubmitSmResponse::new(pdu.sequence_number, message_id);
                let _ = request.reply.send(Frame::SubmitSmResp(response));
            }
            other => {
                let seq = match &other {
                    Frame::Unknown { header, .. } => header.sequence_number,
                    _ => 0,
                };
                let _ = request.reply.send(Frame::GenericNack(crate::datatypes::GenericNack::new(
                    CommandStatus::InvalidCommandId,
                    seq,
                )));
            }
        }
    }
}
