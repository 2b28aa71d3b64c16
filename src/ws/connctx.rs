use tokio::sync::mpsc;
use uuid::Uuid;

/// What a connection joined as: the document and the identity it supplied.
#[derive(Clone, Debug)]
pub struct Membership {
    pub document_id: Uuid,
    pub user_id: String,
    pub username: String,
}

/// Per-connection state held by the hub. The context is a lookup key into a
/// session's participant map; it never owns the session.
#[derive(Debug)]
pub struct ConnCtx {
    /// Frames queued here are drained to the socket by the connection's
    /// writer task.
    pub outbound: mpsc::UnboundedSender<String>,
    /// At most one document membership at a time.
    pub membership: Option<Membership>,
}

impl ConnCtx {
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self {
            outbound,
            membership: None,
        }
    }
}
