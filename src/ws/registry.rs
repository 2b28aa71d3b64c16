use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::db::{DocumentGateway, GatewayError};
use crate::ws::session::DocSession;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("document not found")]
    NotFound,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Table of open sessions, keyed by document id.
///
/// Lazily populated: a resolve for an unresident document loads it through
/// the gateway and seeds a fresh session. Owned exclusively by the hub actor,
/// which awaits `resolve` to completion before handling the next envelope —
/// so two concurrent joins for the same unresident document are serialized
/// and can never create duplicate sessions.
pub struct SessionRegistry {
    sessions: HashMap<Uuid, DocSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Return the resident session for `document_id`, creating it from the
    /// gateway if needed. Fails with `NotFound` without creating anything
    /// when the store has no such document.
    pub async fn resolve(
        &mut self,
        document_id: Uuid,
        gateway: &dyn DocumentGateway,
    ) -> Result<&mut DocSession, RegistryError> {
        match self.sessions.entry(document_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let loaded = gateway
                    .load(document_id)
                    .await?
                    .ok_or(RegistryError::NotFound)?;
                info!(
                    "Session created for document {} at version {}",
                    document_id, loaded.version
                );
                Ok(entry.insert(DocSession::new(document_id, loaded.content, loaded.version)))
            }
        }
    }

    pub fn get(&self, document_id: Uuid) -> Option<&DocSession> {
        self.sessions.get(&document_id)
    }

    pub fn get_mut(&mut self, document_id: Uuid) -> Option<&mut DocSession> {
        self.sessions.get_mut(&document_id)
    }

    /// Drop the session for `document_id`. Called when its participant set
    /// empties; the persisted document is unaffected.
    pub fn release(&mut self, document_id: Uuid) -> bool {
        let removed = self.sessions.remove(&document_id).is_some();
        if removed {
            info!("Session for document {} released", document_id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::MemoryGateway;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn resolve_unknown_document_creates_nothing() {
        let gateway = MemoryGateway::default();
        let mut registry = SessionRegistry::new();

        let result = registry.resolve(Uuid::new_v4(), &gateway).await;
        assert!(matches!(result, Err(RegistryError::NotFound)));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn resolve_seeds_session_from_gateway() {
        let id = Uuid::new_v4();
        let gateway = MemoryGateway::with_document(id, "Hello", 4);
        let mut registry = SessionRegistry::new();

        let session = registry.resolve(id, &gateway).await.unwrap();
        assert_eq!(session.content, "Hello");
        assert_eq!(session.version, 4);
        assert!(session.history.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn resolve_reuses_resident_session_without_reloading() {
        let id = Uuid::new_v4();
        let gateway = MemoryGateway::with_document(id, "", 0);
        let mut registry = SessionRegistry::new();

        registry.resolve(id, &gateway).await.unwrap();
        registry.resolve(id, &gateway).await.unwrap();

        assert_eq!(gateway.loads.load(Ordering::Relaxed), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn release_evicts_and_next_resolve_reloads() {
        let id = Uuid::new_v4();
        let gateway = MemoryGateway::with_document(id, "", 0);
        let mut registry = SessionRegistry::new();

        registry.resolve(id, &gateway).await.unwrap();
        assert!(registry.release(id));
        assert!(registry.is_empty());

        registry.resolve(id, &gateway).await.unwrap();
        assert_eq!(gateway.loads.load(Ordering::Relaxed), 2);
    }
}
