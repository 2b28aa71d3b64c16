use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::DocumentGateway;
use crate::models::{
    BroadcastCursorMessage, BroadcastOperationMessage, ClientEnvelope, CursorMessage,
    ErrorMessage, InitMessage, JoinMessage, OperationMessage, ServerEnvelope, UserEntry,
    UserJoinedMessage, UserLeftMessage,
};
use crate::ws::connctx::{ConnCtx, Membership};
use crate::ws::registry::{RegistryError, SessionRegistry};
use crate::ws::session::{DocSession, Participant};

/// Counters the diagnostics endpoint reads.
#[derive(Debug, Default)]
pub struct HubStats {
    pub connections: AtomicUsize,
    pub open_sessions: AtomicUsize,
    pub accepted_ops: AtomicU64,
}

/// Commands the connection tasks feed into the hub queue. `Detach` is the
/// synthetic trailing leave a disconnect turns into.
pub enum HubCommand {
    Attach {
        conn: Uuid,
        outbound: mpsc::UnboundedSender<String>,
    },
    Envelope {
        conn: Uuid,
        envelope: ClientEnvelope,
    },
    Detach {
        conn: Uuid,
    },
}

#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    pub fn send(&self, command: HubCommand) {
        // The hub outlives every connection; a send only fails at shutdown.
        let _ = self.tx.send(command);
    }
}

/// Sequential actor owning all session state.
///
/// Every envelope from every connection funnels through one queue and is
/// handled to completion before the next is pulled, so registry lookups,
/// transform, apply and history append are atomic per envelope without
/// locking. Total order of acceptance equals arrival order at the queue.
pub struct Hub {
    registry: SessionRegistry,
    connections: HashMap<Uuid, ConnCtx>,
    gateway: Arc<dyn DocumentGateway>,
    stats: Arc<HubStats>,
    rx: mpsc::UnboundedReceiver<HubCommand>,
}

impl Hub {
    pub fn new(gateway: Arc<dyn DocumentGateway>, stats: Arc<HubStats>) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            registry: SessionRegistry::new(),
            connections: HashMap::new(),
            gateway,
            stats,
            rx,
        };
        (hub, HubHandle { tx })
    }

    pub async fn run(mut self) {
        info!("Collaboration hub started");
        while let Some(command) = self.rx.recv().await {
            self.handle(command).await;
        }
        info!("Collaboration hub stopped");
    }

    async fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Attach { conn, outbound } => {
                self.connections.insert(conn, ConnCtx::new(outbound));
                self.stats
                    .connections
                    .store(self.connections.len(), Ordering::Relaxed);
            }
            HubCommand::Envelope { conn, envelope } => match envelope {
                ClientEnvelope::Join(msg) => self.handle_join(conn, msg).await,
                ClientEnvelope::Operation(msg) => self.handle_operation(conn, msg),
                ClientEnvelope::Cursor(msg) => self.handle_cursor(conn, msg),
                ClientEnvelope::Leave => self.handle_leave(conn),
            },
            HubCommand::Detach { conn } => {
                self.handle_leave(conn);
                self.connections.remove(&conn);
                self.stats
                    .connections
                    .store(self.connections.len(), Ordering::Relaxed);
            }
        }
    }

    async fn handle_join(&mut self, conn: Uuid, msg: JoinMessage) {
        if !self.connections.contains_key(&conn) {
            return;
        }

        // A connection holds at most one membership; joining again moves it.
        if self
            .connections
            .get(&conn)
            .is_some_and(|ctx| ctx.membership.is_some())
        {
            self.handle_leave(conn);
        }

        let session = match self.registry.resolve(msg.document_id, self.gateway.as_ref()).await {
            Ok(session) => session,
            Err(RegistryError::NotFound) => {
                warn!("Join rejected: document {} not found", msg.document_id);
                send_error(
                    &self.connections,
                    conn,
                    format!("Document {} not found", msg.document_id),
                );
                return;
            }
            Err(RegistryError::Gateway(e)) => {
                error!("Failed to load document {}: {}", msg.document_id, e);
                send_error(
                    &self.connections,
                    conn,
                    format!("Document {} not found", msg.document_id),
                );
                return;
            }
        };

        session.participants.insert(
            conn,
            Participant {
                user_id: msg.user_id.clone(),
                username: msg.username.clone(),
            },
        );
        info!(
            "User {} ({}) joined document {} ({} participants)",
            msg.user_id,
            msg.username,
            msg.document_id,
            session.participants.len()
        );

        let users: Vec<UserEntry> = session
            .participants
            .values()
            .map(|p| UserEntry {
                user_id: p.user_id.clone(),
                username: p.username.clone(),
            })
            .collect();
        let init = frame(&ServerEnvelope::Init(InitMessage {
            content: session.content.clone(),
            version: session.version,
            users,
        }));
        send_frame(&self.connections, conn, &init);

        let joined = frame(&ServerEnvelope::UserJoined(UserJoinedMessage {
            user_id: msg.user_id.clone(),
            username: msg.username.clone(),
        }));
        broadcast(&self.connections, session, Some(conn), &joined);

        if let Some(ctx) = self.connections.get_mut(&conn) {
            ctx.membership = Some(Membership {
                document_id: msg.document_id,
                user_id: msg.user_id,
                username: msg.username,
            });
        }
        self.stats
            .open_sessions
            .store(self.registry.len(), Ordering::Relaxed);
    }

    fn handle_operation(&mut self, conn: Uuid, msg: OperationMessage) {
        let Some(membership) = self
            .connections
            .get(&conn)
            .and_then(|ctx| ctx.membership.clone())
        else {
            send_error(
                &self.connections,
                conn,
                "Operation for a document you have not joined".to_string(),
            );
            return;
        };
        if membership.document_id != msg.document_id {
            send_error(
                &self.connections,
                conn,
                format!("Operation for a document you have not joined: {}", msg.document_id),
            );
            return;
        }

        let document_id = membership.document_id;
        let Some(session) = self.registry.get_mut(document_id) else {
            // A membership without a session would mean eviction raced an
            // envelope, which the sequential queue rules out.
            error!("No session for joined document {}", document_id);
            return;
        };

        let accepted = session.accept(msg.operation, &membership.user_id, msg.client_version);
        let server_version = session.version;
        self.stats.accepted_ops.fetch_add(1, Ordering::Relaxed);

        // Best-effort persistence; the gateway drops stale versions, so
        // overlapping saves may complete in any order.
        let gateway = Arc::clone(&self.gateway);
        let content = session.content.clone();
        tokio::spawn(async move {
            if let Err(e) = gateway
                .save(document_id, &content, server_version as i32)
                .await
            {
                warn!("Best-effort save of document {} failed: {}", document_id, e);
            }
        });

        let outgoing = frame(&ServerEnvelope::Operation(BroadcastOperationMessage {
            user_id: membership.user_id,
            username: membership.username,
            operation: accepted.operation,
            server_version,
        }));
        broadcast(&self.connections, session, Some(conn), &outgoing);
    }

    fn handle_cursor(&mut self, conn: Uuid, msg: CursorMessage) {
        let Some(membership) = self
            .connections
            .get(&conn)
            .and_then(|ctx| ctx.membership.as_ref())
        else {
            send_error(
                &self.connections,
                conn,
                "Cursor for a document you have not joined".to_string(),
            );
            return;
        };
        if membership.document_id != msg.document_id {
            return;
        }
        let Some(session) = self.registry.get(membership.document_id) else {
            return;
        };

        // Ephemeral: never persisted, never in history, never transformed.
        let outgoing = frame(&ServerEnvelope::Cursor(BroadcastCursorMessage {
            user_id: membership.user_id.clone(),
            username: membership.username.clone(),
            position: msg.position,
        }));
        broadcast(&self.connections, session, Some(conn), &outgoing);
    }

    fn handle_leave(&mut self, conn: Uuid) {
        let Some(membership) = self
            .connections
            .get_mut(&conn)
            .and_then(|ctx| ctx.membership.take())
        else {
            return;
        };
        let Membership {
            document_id,
            user_id,
            username,
        } = membership;

        let now_empty = {
            let Some(session) = self.registry.get_mut(document_id) else {
                return;
            };
            if session.participants.remove(&conn).is_some() {
                info!(
                    "User {} ({}) left document {} ({} participants remain)",
                    user_id,
                    username,
                    document_id,
                    session.participants.len()
                );
                let left = frame(&ServerEnvelope::UserLeft(UserLeftMessage {
                    user_id,
                    username,
                }));
                broadcast(&self.connections, session, None, &left);
            }
            session.participants.is_empty()
        };

        if now_empty {
            self.registry.release(document_id);
            self.stats
                .open_sessions
                .store(self.registry.len(), Ordering::Relaxed);
        }
    }
}

fn frame(envelope: &ServerEnvelope) -> String {
    serde_json::to_string(envelope).unwrap()
}

fn send_frame(connections: &HashMap<Uuid, ConnCtx>, conn: Uuid, payload: &str) {
    if let Some(ctx) = connections.get(&conn) {
        let _ = ctx.outbound.send(payload.to_string());
    }
}

fn send_error(connections: &HashMap<Uuid, ConnCtx>, conn: Uuid, error: String) {
    let payload = serde_json::to_string(&ErrorMessage { error }).unwrap();
    send_frame(connections, conn, &payload);
}

/// Deliver a frame to every participant of the session except `skip`.
fn broadcast(
    connections: &HashMap<Uuid, ConnCtx>,
    session: &DocSession,
    skip: Option<Uuid>,
    payload: &str,
) {
    for conn in session.participants.keys() {
        if Some(*conn) == skip {
            continue;
        }
        send_frame(connections, *conn, payload);
    }
}
