use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ot::Operation;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JoinMessage {
    pub document_id: Uuid,
    pub user_id: String,
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OperationMessage {
    pub document_id: Uuid,
    pub user_id: String,
    pub operation: Operation,
    pub client_version: usize,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CursorMessage {
    pub document_id: Uuid,
    pub position: usize,
}

/// Envelopes a client may send. Unrecognized tags fail deserialization and
/// are reported back to the sender as a validation error.
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientEnvelope {
    #[serde(rename = "join")]
    Join(JoinMessage),
    #[serde(rename = "operation")]
    Operation(OperationMessage),
    #[serde(rename = "cursor")]
    Cursor(CursorMessage),
    #[serde(rename = "leave")]
    Leave,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserEntry {
    pub user_id: String,
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InitMessage {
    pub content: String,
    pub version: usize,
    pub users: Vec<UserEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinedMessage {
    pub user_id: String,
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserLeftMessage {
    pub user_id: String,
    pub username: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastOperationMessage {
    pub user_id: String,
    pub username: String,
    pub operation: Operation,
    pub server_version: usize,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastCursorMessage {
    pub user_id: String,
    pub username: String,
    pub position: usize,
}

/// Envelopes the server sends to participants.
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerEnvelope {
    #[serde(rename = "init")]
    Init(InitMessage),
    #[serde(rename = "user_joined")]
    UserJoined(UserJoinedMessage),
    #[serde(rename = "operation")]
    Operation(BroadcastOperationMessage),
    #[serde(rename = "cursor")]
    Cursor(BroadcastCursorMessage),
    #[serde(rename = "user_left")]
    UserLeft(UserLeftMessage),
}

/// Untagged failure reply, e.g. for a join against an unknown document.
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorMessage {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_envelope() {
        let id = Uuid::new_v4();
        let raw = format!(
            r#"{{"type":"join","documentId":"{id}","userId":"u1","username":"Ada"}}"#
        );
        let envelope: ClientEnvelope = serde_json::from_str(&raw).unwrap();
        match envelope {
            ClientEnvelope::Join(msg) => {
                assert_eq!(msg.document_id, id);
                assert_eq!(msg.user_id, "u1");
                assert_eq!(msg.username, "Ada");
            }
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    #[test]
    fn parses_operation_envelope_with_insert() {
        let id = Uuid::new_v4();
        let raw = format!(
            r#"{{"type":"operation","documentId":"{id}","userId":"u1","operation":{{"type":"insert","position":0,"text":"Hi"}},"clientVersion":0}}"#
        );
        let envelope: ClientEnvelope = serde_json::from_str(&raw).unwrap();
        match envelope {
            ClientEnvelope::Operation(msg) => {
                assert_eq!(msg.client_version, 0);
                assert_eq!(
                    msg.operation,
                    Operation::Insert {
                        position: 0,
                        text: "Hi".to_string()
                    }
                );
            }
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    #[test]
    fn parses_operation_envelope_with_delete() {
        let id = Uuid::new_v4();
        let raw = format!(
            r#"{{"type":"operation","documentId":"{id}","userId":"u1","operation":{{"type":"delete","position":2,"length":3}},"clientVersion":1}}"#
        );
        let envelope: ClientEnvelope = serde_json::from_str(&raw).unwrap();
        match envelope {
            ClientEnvelope::Operation(msg) => {
                assert_eq!(
                    msg.operation,
                    Operation::Delete {
                        position: 2,
                        length: 3
                    }
                );
            }
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    #[test]
    fn parses_leave_envelope() {
        let envelope: ClientEnvelope = serde_json::from_str(r#"{"type":"leave"}"#).unwrap();
        assert!(matches!(envelope, ClientEnvelope::Leave));
    }

    #[test]
    fn rejects_unknown_tag() {
        let result = serde_json::from_str::<ClientEnvelope>(r#"{"type":"shout","volume":11}"#);
        assert!(result.is_err());
    }

    #[test]
    fn init_envelope_uses_camel_case_and_tag() {
        let frame = serde_json::to_value(ServerEnvelope::Init(InitMessage {
            content: "Hi".to_string(),
            version: 1,
            users: vec![UserEntry {
                user_id: "u1".to_string(),
                username: "Ada".to_string(),
            }],
        }))
        .unwrap();

        assert_eq!(frame["type"], "init");
        assert_eq!(frame["content"], "Hi");
        assert_eq!(frame["version"], 1);
        assert_eq!(frame["users"][0]["userId"], "u1");
        assert_eq!(frame["users"][0]["username"], "Ada");
    }

    #[test]
    fn operation_broadcast_carries_server_version() {
        let frame = serde_json::to_value(ServerEnvelope::Operation(BroadcastOperationMessage {
            user_id: "u2".to_string(),
            username: "Grace".to_string(),
            operation: Operation::Insert {
                position: 0,
                text: "Yo".to_string(),
            },
            server_version: 3,
        }))
        .unwrap();

        assert_eq!(frame["type"], "operation");
        assert_eq!(frame["serverVersion"], 3);
        assert_eq!(frame["operation"]["type"], "insert");
        assert_eq!(frame["operation"]["position"], 0);
    }

    #[test]
    fn error_reply_is_a_bare_object() {
        let frame = serde_json::to_value(ErrorMessage {
            error: "Document not found".to_string(),
        })
        .unwrap();
        assert_eq!(frame, serde_json::json!({"error": "Document not found"}));
    }
}
