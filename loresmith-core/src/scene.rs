//! Per-session scene control.
//!
//! Tracks, for each session, who authors each character's lines: the
//! player, the AI narrator, or nobody (the character is absent from the
//! scene). Characters with no entry read as player-controlled.

use crate::ids::{CharacterId, SessionId};
use crate::storage::{DocumentStore, StorageError, SCENE_STATES_KEY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Who authors a character's dialogue in the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    #[default]
    Player,
    Ai,
    Absent,
}

/// The scene state store: session id to character-id→mode map.
#[derive(Debug, Clone, Default)]
pub struct SceneBoard {
    scenes: HashMap<SessionId, HashMap<CharacterId, ControlMode>>,
    loaded: bool,
}

impl SceneBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all scene states from storage.
    pub async fn load(&mut self, docs: &DocumentStore) {
        self.scenes = docs.load(SCENE_STATES_KEY, HashMap::new()).await;
        self.loaded = true;
    }

    /// Write all scene states back to storage.
    pub async fn persist(&self, docs: &DocumentStore) -> Result<(), StorageError> {
        docs.save(SCENE_STATES_KEY, &self.scenes).await
    }

    /// Whether the initial load attempt has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Point update: set one character's mode, preserving every other
    /// entry for that session.
    pub fn set_control(&mut self, session_id: SessionId, character_id: CharacterId, mode: ControlMode) {
        self.scenes
            .entry(session_id)
            .or_default()
            .insert(character_id, mode);
    }

    /// A character's control mode, defaulting to player control when no
    /// entry exists.
    pub fn control(&self, session_id: SessionId, character_id: CharacterId) -> ControlMode {
        self.scenes
            .get(&session_id)
            .and_then(|scene| scene.get(&character_id))
            .copied()
            .unwrap_or_default()
    }

    /// Whether any entries exist for a session.
    pub fn has_scene(&self, session_id: SessionId) -> bool {
        self.scenes.contains_key(&session_id)
    }
}
