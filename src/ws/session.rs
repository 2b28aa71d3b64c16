use std::collections::HashMap;
use uuid::Uuid;

use crate::ot::{self, AcceptedOperation, Operation};

#[derive(Clone, Debug)]
pub struct Participant {
    pub user_id: String,
    pub username: String,
}

/// Authoritative in-memory state for one open document.
///
/// Lives exactly as long as at least one participant is connected: created on
/// the first join, dropped from the registry the instant the participant map
/// empties. `version - base_version == history.len()` always holds, and the
/// content equals the loaded content with the history replayed in order.
#[derive(Debug)]
pub struct DocSession {
    pub document_id: Uuid,
    pub content: String,
    pub version: usize,
    /// Document version at load time. `history` only holds operations
    /// accepted since, so client versions are offset by this before slicing.
    base_version: usize,
    pub history: Vec<AcceptedOperation>,
    pub participants: HashMap<Uuid, Participant>,
}

impl DocSession {
    pub fn new(document_id: Uuid, content: String, version: i32) -> Self {
        let version = version.max(0) as usize;
        Self {
            document_id,
            content,
            version,
            base_version: version,
            history: Vec::new(),
            participants: HashMap::new(),
        }
    }

    /// Accept an operation authored against `client_version`: rebase it over
    /// the history the author has not seen, apply it to the content, bump the
    /// version and append it to the history.
    pub fn accept(
        &mut self,
        operation: Operation,
        author_id: &str,
        client_version: usize,
    ) -> AcceptedOperation {
        let from = client_version
            .saturating_sub(self.base_version)
            .min(self.history.len());
        let transformed = ot::transform(operation, author_id, &self.history[from..]);
        ot::apply(&mut self.content, &transformed);

        let accepted = AcceptedOperation {
            operation: transformed,
            author_id: author_id.to_string(),
        };
        self.history.push(accepted.clone());
        self.version += 1;
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(position: usize, text: &str) -> Operation {
        Operation::Insert {
            position,
            text: text.to_string(),
        }
    }

    fn delete(position: usize, length: usize) -> Operation {
        Operation::Delete { position, length }
    }

    #[test]
    fn accept_increments_version_and_history_in_lockstep() {
        let mut session = DocSession::new(Uuid::new_v4(), String::new(), 0);

        session.accept(insert(0, "Hi"), "u1", 0);
        assert_eq!(session.content, "Hi");
        assert_eq!(session.version, 1);
        assert_eq!(session.history.len(), 1);

        session.accept(insert(2, "!"), "u1", 1);
        assert_eq!(session.content, "Hi!");
        assert_eq!(session.version, 2);
        assert_eq!(session.history.len(), 2);
    }

    #[test]
    fn concurrent_inserts_converge_with_all_characters_kept() {
        // Both authors saw "Hi" at version 1; u1 appends "!", u2 prepends
        // "Yo". The second acceptance is rebased over the first.
        let mut session = DocSession::new(Uuid::new_v4(), String::new(), 0);
        session.accept(insert(0, "Hi"), "u1", 0);

        session.accept(insert(2, "!"), "u1", 1);
        session.accept(insert(0, "Yo"), "u2", 1);

        assert_eq!(session.content, "YoHi!");
        assert_eq!(session.version, 3);
    }

    #[test]
    fn concurrent_inserts_converge_in_the_other_acceptance_order() {
        let mut session = DocSession::new(Uuid::new_v4(), String::new(), 0);
        session.accept(insert(0, "Hi"), "u1", 0);

        session.accept(insert(0, "Yo"), "u2", 1);
        session.accept(insert(2, "!"), "u1", 1);

        assert_eq!(session.content, "YoHi!");
        assert_eq!(session.version, 3);
    }

    #[test]
    fn overlapping_deletes_shift_by_the_overlap() {
        let mut session = DocSession::new(Uuid::new_v4(), "abcdef".to_string(), 0);

        session.accept(delete(0, 2), "u1", 0);
        assert_eq!(session.content, "cdef");

        // Authored against version 0, so rebased over the first delete:
        // position 1 shifts left by the single overlapping character.
        let accepted = session.accept(delete(1, 3), "u2", 0);
        assert_eq!(accepted.operation, delete(0, 3));
        assert_eq!(session.content, "f");
        assert_eq!(session.version, 2);
    }

    #[test]
    fn replaying_history_reproduces_content() {
        let base = "The quick brown fox".to_string();
        let mut session = DocSession::new(Uuid::new_v4(), base.clone(), 0);

        session.accept(insert(4, "very "), "u1", 0);
        session.accept(delete(0, 4), "u2", 0);
        session.accept(insert(0, "A "), "u3", 1);
        session.accept(delete(8, 6), "u1", 2);
        session.accept(insert(2, "so "), "u2", 4);

        let mut replayed = base;
        for accepted in &session.history {
            crate::ot::apply(&mut replayed, &accepted.operation);
        }
        assert_eq!(replayed, session.content);
        assert_eq!(session.version, session.history.len());
    }

    #[test]
    fn sessions_loaded_above_version_zero_offset_client_versions() {
        let mut session = DocSession::new(Uuid::new_v4(), "abc".to_string(), 3);
        assert_eq!(session.version, 3);

        // The author saw version 3 (everything loaded), so there is nothing
        // to rebase against.
        session.accept(insert(3, "d"), "u1", 3);
        assert_eq!(session.content, "abcd");
        assert_eq!(session.version, 4);

        // An author still at version 3 is rebased over the insert above.
        let accepted = session.accept(insert(3, "X"), "u2", 3);
        assert_eq!(accepted.operation, insert(4, "X"));
        assert_eq!(session.content, "abcdX");
    }
}
