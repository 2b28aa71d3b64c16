pub mod docstore;

pub use docstore::DocStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable state handed to a session when it is created.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LoadedDocument {
    pub content: String,
    pub version: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The capability the collaboration core needs from the durable store:
/// load a document by id when a session is created, and persist accepted
/// content best-effort after each operation.
///
/// `save` must be a monotonic write — a call carrying an older version than
/// the stored one is dropped, so overlapping fire-and-forget saves can
/// complete in any order without regressing the persisted document.
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    async fn load(&self, document_id: Uuid) -> Result<Option<LoadedDocument>, GatewayError>;

    async fn save(
        &self,
        document_id: Uuid,
        content: &str,
        version: i32,
    ) -> Result<(), GatewayError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory gateway with the same monotonic save contract as the
    /// Postgres store.
    #[derive(Default)]
    pub struct MemoryGateway {
        pub docs: Mutex<HashMap<Uuid, LoadedDocument>>,
        pub loads: AtomicUsize,
    }

    impl MemoryGateway {
        pub fn with_document(document_id: Uuid, content: &str, version: i32) -> Self {
            let gateway = Self::default();
            gateway.docs.lock().unwrap().insert(
                document_id,
                LoadedDocument {
                    content: content.to_string(),
                    version,
                },
            );
            gateway
        }

        pub fn stored(&self, document_id: Uuid) -> Option<LoadedDocument> {
            self.docs.lock().unwrap().get(&document_id).cloned()
        }
    }

    #[async_trait]
    impl DocumentGateway for MemoryGateway {
        async fn load(&self, document_id: Uuid) -> Result<Option<LoadedDocument>, GatewayError> {
            self.loads.fetch_add(1, Ordering::Relaxed);
            Ok(self.docs.lock().unwrap().get(&document_id).cloned())
        }

        async fn save(
            &self,
            document_id: Uuid,
            content: &str,
            version: i32,
        ) -> Result<(), GatewayError> {
            let mut docs = self.docs.lock().unwrap();
            if let Some(doc) = docs.get_mut(&document_id) {
                if doc.version < version {
                    doc.content = content.to_string();
                    doc.version = version;
                }
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn stale_save_does_not_overwrite_newer_version() {
        let id = Uuid::new_v4();
        let gateway = MemoryGateway::with_document(id, "", 0);

        gateway.save(id, "newer", 2).await.unwrap();
        gateway.save(id, "older", 1).await.unwrap();

        let stored = gateway.stored(id).unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.content, "newer");
    }
}
