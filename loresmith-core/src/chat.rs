//! Per-session chat history.
//!
//! An append-only message log per session. Messages are immutable once
//! created: append assigns the id and timestamp, and nothing ever edits a
//! stored message. Ordering is insertion order.

use crate::ids::{CharacterId, MessageId, SessionId};
use crate::narrators::Narrator;
use crate::storage::{DocumentStore, StorageError, CHAT_LOGS_KEY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opening line seeded into a fresh session log.
const ADVENTURE_BEGINS: &str = "The table falls quiet. The adventure begins.";

/// Line announcing a session restart after a reset.
const SESSION_RESTARTED: &str = "The story starts over. What came before is set aside.";

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry in a session's chat log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: ChatRole,
    pub content: String,
    /// Stored as an ISO-8601 string on disk, rehydrated to a typed value.
    pub timestamp: DateTime<Utc>,
    /// The character speaking, when a specific one is.
    pub author_id: Option<CharacterId>,
    /// Display name of the author (character or narrator).
    pub author_name: String,
}

/// Fields a caller supplies when appending; id and timestamp are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub role: ChatRole,
    pub content: String,
    pub author_id: Option<CharacterId>,
    pub author_name: String,
}

impl MessageDraft {
    /// A user-authored message spoken by a character.
    pub fn user(content: impl Into<String>, author_id: CharacterId, author_name: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            author_id: Some(author_id),
            author_name: author_name.into(),
        }
    }

    /// An assistant message authored by the narrator.
    pub fn narrator(content: impl Into<String>, narrator: &Narrator) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            author_id: None,
            author_name: narrator.name.clone(),
        }
    }
}

impl ChatMessage {
    fn new(draft: MessageDraft) -> Self {
        Self {
            id: MessageId::new(),
            role: draft.role,
            content: draft.content,
            timestamp: Utc::now(),
            author_id: draft.author_id,
            author_name: draft.author_name,
        }
    }
}

/// The chat history store: session id to ordered message list.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    logs: HashMap<SessionId, Vec<ChatMessage>>,
    loaded: bool,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all session logs from storage.
    pub async fn load(&mut self, docs: &DocumentStore) {
        self.logs = docs.load(CHAT_LOGS_KEY, HashMap::new()).await;
        self.loaded = true;
    }

    /// Write all session logs back to storage.
    pub async fn persist(&self, docs: &DocumentStore) -> Result<(), StorageError> {
        docs.save(CHAT_LOGS_KEY, &self.logs).await
    }

    /// Whether the initial load attempt has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The messages for a session, oldest first. Sessions with no log read
    /// as empty rather than absent.
    pub fn messages(&self, session_id: SessionId) -> &[ChatMessage] {
        self.logs
            .get(&session_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a session has any log at all (even an empty one).
    pub fn has_log(&self, session_id: SessionId) -> bool {
        self.logs.contains_key(&session_id)
    }

    /// Assign an id and the current timestamp, then append. Returns the
    /// stored message.
    pub fn append(&mut self, session_id: SessionId, draft: MessageDraft) -> ChatMessage {
        let message = ChatMessage::new(draft);
        self.logs
            .entry(session_id)
            .or_default()
            .push(message.clone());
        message
    }

    /// Replace the whole log with a single narrator-authored message
    /// announcing a restart.
    pub fn reset(&mut self, session_id: SessionId, narrator: &Narrator) {
        let message = ChatMessage::new(MessageDraft::narrator(SESSION_RESTARTED, narrator));
        self.logs.insert(session_id, vec![message]);
    }

    /// Idempotent seed: if the session has no existing log, create a
    /// one-message opening; if any log already exists, do nothing.
    /// Returns whether a log was created.
    pub fn initialize(&mut self, session_id: SessionId, narrator: &Narrator) -> bool {
        if self.logs.contains_key(&session_id) {
            return false;
        }
        let message = ChatMessage::new(MessageDraft::narrator(ADVENTURE_BEGINS, narrator));
        self.logs.insert(session_id, vec![message]);
        true
    }

    /// Remove multiple session logs in one batch; used after cascading
    /// campaign deletion.
    pub fn purge(&mut self, session_ids: &[SessionId]) {
        for id in session_ids {
            self.logs.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrators::NarratorDraft;

    fn narrator() -> Narrator {
        Narrator::new(NarratorDraft {
            name: "The Chronicler".to_string(),
            description: String::new(),
            instructions: "Narrate.".to_string(),
            temperature: 0.7,
            max_length: 512,
            tone: "epic".to_string(),
        })
    }

    #[test]
    fn test_append_assigns_id_and_timestamp_in_order() {
        let mut chat = ChatLog::new();
        let session = SessionId::new();
        let speaker = CharacterId::new();

        let first = chat.append(session, MessageDraft::user("I open the door.", speaker, "Wren"));
        let second = chat.append(session, MessageDraft::narrator("It creaks.", &narrator()));

        let messages = chat.messages(session);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, first.id);
        assert_eq!(messages[1].id, second.id);
        assert_ne!(first.id, second.id);
        assert!(messages[0].timestamp <= messages[1].timestamp);
        assert_eq!(messages[0].author_id, Some(speaker));
        assert_eq!(messages[1].author_name, "The Chronicler");
    }

    #[test]
    fn test_messages_default_to_empty() {
        let chat = ChatLog::new();
        assert!(chat.messages(SessionId::new()).is_empty());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut chat = ChatLog::new();
        let session = SessionId::new();
        let narrator = narrator();

        assert!(chat.initialize(session, &narrator));
        let seeded: Vec<_> = chat.messages(session).to_vec();
        assert_eq!(seeded.len(), 1);
        assert_eq!(seeded[0].role, ChatRole::Assistant);

        assert!(!chat.initialize(session, &narrator));
        let after = chat.messages(session);
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, seeded[0].id);
    }

    #[test]
    fn test_initialize_does_not_touch_existing_history() {
        let mut chat = ChatLog::new();
        let session = SessionId::new();
        chat.append(
            session,
            MessageDraft::user("We were mid-scene.", CharacterId::new(), "Wren"),
        );

        assert!(!chat.initialize(session, &narrator()));
        assert_eq!(chat.messages(session).len(), 1);
        assert_eq!(chat.messages(session)[0].content, "We were mid-scene.");
    }

    #[test]
    fn test_reset_replaces_log_with_single_restart_message() {
        let mut chat = ChatLog::new();
        let session = SessionId::new();
        let narrator = narrator();

        chat.append(
            session,
            MessageDraft::user("A long history.", CharacterId::new(), "Wren"),
        );
        chat.append(session, MessageDraft::narrator("Indeed.", &narrator));

        chat.reset(session, &narrator);

        let messages = chat.messages(session);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::Assistant);
        assert_eq!(messages[0].author_name, "The Chronicler");
    }

    #[test]
    fn test_purge_removes_only_named_sessions() {
        let mut chat = ChatLog::new();
        let doomed_a = SessionId::new();
        let doomed_b = SessionId::new();
        let kept = SessionId::new();
        let narrator = narrator();

        chat.initialize(doomed_a, &narrator);
        chat.initialize(doomed_b, &narrator);
        chat.initialize(kept, &narrator);

        chat.purge(&[doomed_a, doomed_b]);

        assert!(!chat.has_log(doomed_a));
        assert!(!chat.has_log(doomed_b));
        assert!(chat.has_log(kept));
    }
}
