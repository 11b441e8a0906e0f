//! Narrator registry.
//!
//! Narrators are configurable AI personas (system instructions plus
//! generation parameters) kept in a global registry, independent of any
//! campaign. A single "active narrator" pointer selects which persona
//! authors assistant replies; the pointer is persisted and self-healing:
//! a stale or missing id resolves to the first registry entry on load and
//! the correction is written back.

use crate::ids::NarratorId;
use crate::storage::{DocumentStore, StorageError, ACTIVE_NARRATOR_KEY, NARRATORS_KEY};
use serde::{Deserialize, Serialize};

/// A configurable AI persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Narrator {
    pub id: NarratorId,
    pub name: String,
    pub description: String,
    /// System-prompt text prepended to every generation request.
    pub instructions: String,
    /// Sampling temperature, clamped to [0, 1].
    pub temperature: f32,
    /// Maximum reply length in tokens.
    pub max_length: u32,
    pub tone: String,
}

/// Mutable fields of a narrator; identity is never part of this set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarratorDraft {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub temperature: f32,
    pub max_length: u32,
    pub tone: String,
}

impl Narrator {
    pub fn new(draft: NarratorDraft) -> Self {
        Self {
            id: NarratorId::new(),
            name: draft.name,
            description: draft.description,
            instructions: draft.instructions,
            temperature: draft.temperature.clamp(0.0, 1.0),
            max_length: draft.max_length,
            tone: draft.tone,
        }
    }

    pub fn apply(&mut self, draft: NarratorDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.instructions = draft.instructions;
        self.temperature = draft.temperature.clamp(0.0, 1.0);
        self.max_length = draft.max_length;
        self.tone = draft.tone;
    }
}

/// The global narrator registry plus the persisted active-narrator pointer.
#[derive(Debug, Clone, Default)]
pub struct NarratorRegistry {
    narrators: Vec<Narrator>,
    active: Option<NarratorId>,
    loaded: bool,
}

impl NarratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three personas seeded on first run.
    pub fn builtins() -> Vec<Narrator> {
        vec![
            Narrator::new(NarratorDraft {
                name: "The Chronicler".to_string(),
                description: "A balanced, classic storyteller.".to_string(),
                instructions: include_str!("prompts/chronicler.txt").to_string(),
                temperature: 0.7,
                max_length: 1024,
                tone: "epic".to_string(),
            }),
            Narrator::new(NarratorDraft {
                name: "The Ashen Judge".to_string(),
                description: "A grim narrator of harsh worlds and costly victories.".to_string(),
                instructions: include_str!("prompts/ashen_judge.txt").to_string(),
                temperature: 0.6,
                max_length: 900,
                tone: "grim".to_string(),
            }),
            Narrator::new(NarratorDraft {
                name: "The Merry Cantor".to_string(),
                description: "A playful narrator who keeps the table laughing.".to_string(),
                instructions: include_str!("prompts/merry_cantor.txt").to_string(),
                temperature: 0.9,
                max_length: 800,
                tone: "whimsical".to_string(),
            }),
        ]
    }

    /// Load the registry and resolve the active pointer.
    ///
    /// First run (no persisted registry) seeds the built-ins and persists
    /// them. A persisted active id that no longer matches any entry falls
    /// back to the first entry, and the corrected id is persisted back.
    pub async fn load(&mut self, docs: &DocumentStore) -> Result<(), StorageError> {
        let stored: Option<Vec<Narrator>> = docs.load(NARRATORS_KEY, None).await;
        let first_run = stored.is_none();

        self.narrators = stored.unwrap_or_else(Self::builtins);
        if first_run {
            docs.save(NARRATORS_KEY, &self.narrators).await?;
        }

        let persisted: Option<NarratorId> = docs.load(ACTIVE_NARRATOR_KEY, None).await;
        let resolved = persisted
            .filter(|id| self.narrators.iter().any(|n| n.id == *id))
            .or_else(|| self.narrators.first().map(|n| n.id));

        if resolved != persisted {
            if persisted.is_some() {
                tracing::warn!("persisted active narrator no longer exists, falling back to first");
            }
            docs.save(ACTIVE_NARRATOR_KEY, &resolved).await?;
        }

        self.active = resolved;
        self.loaded = true;
        Ok(())
    }

    /// Write the registry and active pointer back to storage.
    pub async fn persist(&self, docs: &DocumentStore) -> Result<(), StorageError> {
        docs.save(NARRATORS_KEY, &self.narrators).await?;
        docs.save(ACTIVE_NARRATOR_KEY, &self.active).await?;
        Ok(())
    }

    /// Whether the initial load attempt has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn narrators(&self) -> &[Narrator] {
        &self.narrators
    }

    pub fn get(&self, id: NarratorId) -> Option<&Narrator> {
        self.narrators.iter().find(|n| n.id == id)
    }

    /// The currently active narrator, if the registry is non-empty.
    ///
    /// `None` means "no narrator available" and is a valid state for
    /// dependent components, not an error.
    pub fn active(&self) -> Option<&Narrator> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_id(&self) -> Option<NarratorId> {
        self.active
    }

    /// Select the active narrator. Ignored unless `id` resolves to an
    /// existing entry; returns whether the selection was applied.
    pub fn set_active(&mut self, id: NarratorId) -> bool {
        if self.get(id).is_some() {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// Append a new narrator. If the registry was empty it becomes active.
    pub fn add(&mut self, draft: NarratorDraft) -> Narrator {
        let narrator = Narrator::new(draft);
        if self.active.is_none() {
            self.active = Some(narrator.id);
        }
        self.narrators.push(narrator.clone());
        narrator
    }

    /// Replace the mutable fields of an existing narrator in place.
    /// Unknown ids are ignored; returns whether an entry was updated.
    pub fn update(&mut self, id: NarratorId, draft: NarratorDraft) -> bool {
        match self.narrators.iter_mut().find(|n| n.id == id) {
            Some(narrator) => {
                narrator.apply(draft);
                true
            }
            None => false,
        }
    }

    /// Remove a narrator. If it was active, the first remaining entry
    /// becomes active, or none if the registry is now empty.
    pub fn remove(&mut self, id: NarratorId) -> bool {
        let before = self.narrators.len();
        self.narrators.retain(|n| n.id != id);
        if self.narrators.len() == before {
            return false;
        }
        if self.active == Some(id) {
            self.active = self.narrators.first().map(|n| n.id);
        }
        true
    }
}
