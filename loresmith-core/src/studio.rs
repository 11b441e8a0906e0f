//! The studio orchestrator.
//!
//! The one component aware of all four stores. It owns the document store,
//! the transient active-session pointer, and the one-shot startup guard,
//! and it is the facade the UI layer calls: every mutating operation goes
//! through here, updates the owning store, and persists the touched
//! document before returning.
//!
//! The four stores load independently at startup; no derived view is
//! meaningful until all four report loaded, and startup initialization
//! additionally waits for a narrator to resolve as active.

use crate::campaigns::CampaignDirectory;
use crate::chat::{ChatLog, ChatMessage, MessageDraft};
use crate::ids::{AdventureId, CampaignId, CharacterId, LoreId, NarratorId, SessionId};
use crate::narrators::{Narrator, NarratorDraft, NarratorRegistry};
use crate::scene::{ControlMode, SceneBoard};
use crate::scribe::WorldSeed;
use crate::storage::{DocumentStore, StorageError};
use crate::world::{
    Adventure, AdventureDraft, Campaign, CampaignDraft, Faction, GameSession, GlossaryDraft,
    GlossaryTerm, HouseRule, HouseRuleDraft, ImportantItem, Location, LoreDraft,
    NonPlayerCharacter, PersonaDraft, PlayerCharacter,
};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from studio operations.
///
/// Domain-level misses (unknown ids, empty registry) are never errors;
/// this only carries environment failures from the persistence layer.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Generates facade pass-throughs that forward to the campaign directory
/// and persist the campaign document before returning.
macro_rules! directory_ops {
    ($($(#[$doc:meta])* $name:ident ( $($arg:ident : $ty:ty),* ) -> $ret:ty;)+) => {
        $(
            $(#[$doc])*
            pub async fn $name(&mut self, $($arg: $ty),*) -> Result<$ret, StudioError> {
                let result = self.campaigns.$name($($arg),*);
                self.campaigns.persist(&self.docs).await?;
                Ok(result)
            }
        )+
    };
}

/// The campaign studio: stores, active pointers, and the UI facade.
#[derive(Debug)]
pub struct Studio {
    docs: DocumentStore,
    narrators: NarratorRegistry,
    campaigns: CampaignDirectory,
    chat: ChatLog,
    scenes: SceneBoard,
    /// Transient: never persisted, re-seeded by startup initialization.
    active_session: Option<SessionId>,
    initialized: bool,
}

impl Studio {
    /// Open the studio over a document directory, load all four stores,
    /// and run startup initialization.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StudioError> {
        let docs = DocumentStore::open(root).await?;
        let mut studio = Self {
            docs,
            narrators: NarratorRegistry::new(),
            campaigns: CampaignDirectory::new(),
            chat: ChatLog::new(),
            scenes: SceneBoard::new(),
            active_session: None,
            initialized: false,
        };
        studio.load_all().await?;
        Ok(studio)
    }

    /// Run the four independent store loads, then attempt the one-shot
    /// startup initialization.
    async fn load_all(&mut self) -> Result<(), StudioError> {
        let docs = self.docs.clone();
        let (resolved, (), (), ()) = futures::join!(
            self.narrators.load(&docs),
            self.campaigns.load(&docs),
            self.chat.load(&docs),
            self.scenes.load(&docs),
        );
        resolved?;
        self.try_initialize().await
    }

    /// One-shot startup seeding. Runs only after all four stores report
    /// loaded and a narrator has resolved active; if any session exists,
    /// the first one in document order becomes active and its chat log is
    /// seeded idempotently.
    async fn try_initialize(&mut self) -> Result<(), StudioError> {
        if self.initialized || !self.is_ready() {
            return Ok(());
        }
        let Some(narrator) = self.narrators.active().cloned() else {
            return Ok(());
        };
        self.initialized = true;

        let first_session = self
            .campaigns
            .campaigns()
            .iter()
            .flat_map(|c| c.adventures.iter())
            .flat_map(|a| a.sessions.iter())
            .next()
            .map(|s| s.id);

        if let Some(session_id) = first_session {
            self.active_session = Some(session_id);
            if self.chat.initialize(session_id, &narrator) {
                self.chat.persist(&self.docs).await?;
            }
        }
        Ok(())
    }

    /// Whether all four stores have completed their initial load attempt.
    pub fn is_ready(&self) -> bool {
        self.narrators.is_loaded()
            && self.campaigns.is_loaded()
            && self.chat.is_loaded()
            && self.scenes.is_loaded()
    }

    /// Whether startup initialization has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ========================================================================
    // Active-session resolution
    // ========================================================================

    pub fn active_session_id(&self) -> Option<SessionId> {
        self.active_session
    }

    /// Select the active session. The pointer is transient and accepts any
    /// id; resolvers simply find nothing for an unmatched one.
    pub fn set_active_session(&mut self, session_id: SessionId) {
        self.active_session = Some(session_id);
    }

    /// The campaign owning the active session, resolved by scanning the
    /// forest. `None` when no session is active or the id matches nothing.
    pub fn active_campaign(&self) -> Option<&Campaign> {
        let session_id = self.active_session?;
        self.campaigns
            .find_session(session_id)
            .map(|(campaign, _, _)| campaign)
    }

    /// The adventure owning the active session.
    pub fn active_adventure(&self) -> Option<&Adventure> {
        let session_id = self.active_session?;
        self.campaigns
            .find_session(session_id)
            .map(|(_, adventure, _)| adventure)
    }

    /// The active session itself.
    pub fn active_session(&self) -> Option<&GameSession> {
        let session_id = self.active_session?;
        self.campaigns
            .find_session(session_id)
            .map(|(_, _, session)| session)
    }

    // ========================================================================
    // Derived views (recomputed per access, empty when nothing is active)
    // ========================================================================

    pub fn player_characters(&self) -> &[PlayerCharacter] {
        self.active_campaign()
            .map(|c| c.player_characters.as_slice())
            .unwrap_or(&[])
    }

    pub fn adventure_npcs(&self) -> &[NonPlayerCharacter] {
        self.active_campaign()
            .map(|c| c.adventure_npcs.as_slice())
            .unwrap_or(&[])
    }

    pub fn recurrent_npcs(&self) -> &[NonPlayerCharacter] {
        self.active_campaign()
            .map(|c| c.recurrent_npcs.as_slice())
            .unwrap_or(&[])
    }

    pub fn locations(&self) -> &[Location] {
        self.active_campaign()
            .map(|c| c.locations.as_slice())
            .unwrap_or(&[])
    }

    pub fn factions(&self) -> &[Faction] {
        self.active_campaign()
            .map(|c| c.factions.as_slice())
            .unwrap_or(&[])
    }

    pub fn glossary(&self) -> &[GlossaryTerm] {
        self.active_campaign()
            .map(|c| c.glossary.as_slice())
            .unwrap_or(&[])
    }

    pub fn items(&self) -> &[ImportantItem] {
        self.active_campaign()
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn house_rules(&self) -> &[HouseRule] {
        self.active_campaign()
            .map(|c| c.house_rules.as_slice())
            .unwrap_or(&[])
    }

    // ========================================================================
    // Narrators
    // ========================================================================

    pub fn narrators(&self) -> &[Narrator] {
        self.narrators.narrators()
    }

    pub fn active_narrator(&self) -> Option<&Narrator> {
        self.narrators.active()
    }

    pub async fn add_narrator(&mut self, draft: NarratorDraft) -> Result<Narrator, StudioError> {
        let narrator = self.narrators.add(draft);
        self.narrators.persist(&self.docs).await?;
        // A registry that was empty at startup may now satisfy the
        // initialization preconditions.
        self.try_initialize().await?;
        Ok(narrator)
    }

    pub async fn update_narrator(
        &mut self,
        id: NarratorId,
        draft: NarratorDraft,
    ) -> Result<bool, StudioError> {
        let updated = self.narrators.update(id, draft);
        if updated {
            self.narrators.persist(&self.docs).await?;
        }
        Ok(updated)
    }

    pub async fn remove_narrator(&mut self, id: NarratorId) -> Result<bool, StudioError> {
        let removed = self.narrators.remove(id);
        if removed {
            self.narrators.persist(&self.docs).await?;
        }
        Ok(removed)
    }

    /// Select the active narrator. Silently ignored unless the id resolves
    /// to an existing entry.
    pub async fn set_active_narrator(&mut self, id: NarratorId) -> Result<bool, StudioError> {
        let applied = self.narrators.set_active(id);
        if applied {
            self.narrators.persist(&self.docs).await?;
        }
        Ok(applied)
    }

    // ========================================================================
    // Campaign directory facade
    // ========================================================================

    pub fn campaigns(&self) -> &[Campaign] {
        self.campaigns.campaigns()
    }

    pub fn campaign(&self, id: CampaignId) -> Option<&Campaign> {
        self.campaigns.get(id)
    }

    directory_ops! {
        /// Create a campaign and return it.
        create_campaign(draft: CampaignDraft) -> Campaign;
        /// Replace a campaign's own fields; unknown ids are no-ops.
        update_campaign(id: CampaignId, draft: CampaignDraft) -> bool;
        /// Append an adventure to a campaign.
        add_adventure(campaign_id: CampaignId, draft: AdventureDraft) -> Option<Adventure>;
        /// Update an adventure matched by its own id.
        update_adventure(adventure_id: AdventureId, draft: AdventureDraft) -> bool;
        /// Remove an adventure. Chat and scene state are left behind.
        remove_adventure(adventure_id: AdventureId) -> bool;
        /// Create a session under an adventure and return it.
        add_session(adventure_id: AdventureId, name: String) -> Option<GameSession>;
        /// Rename a session.
        rename_session(session_id: SessionId, name: String) -> bool;
        /// Remove a session. Chat and scene state are left behind.
        remove_session(session_id: SessionId) -> bool;
        /// Merge a generated world payload into a campaign.
        populate(campaign_id: CampaignId, seed: WorldSeed) -> bool;

        add_player_character(campaign_id: CampaignId, draft: PersonaDraft) -> Option<PlayerCharacter>;
        update_player_character(campaign_id: CampaignId, entry_id: CharacterId, draft: PersonaDraft) -> bool;
        remove_player_character(campaign_id: CampaignId, entry_id: CharacterId) -> bool;

        add_adventure_npc(campaign_id: CampaignId, draft: PersonaDraft) -> Option<NonPlayerCharacter>;
        update_adventure_npc(campaign_id: CampaignId, entry_id: CharacterId, draft: PersonaDraft) -> bool;
        remove_adventure_npc(campaign_id: CampaignId, entry_id: CharacterId) -> bool;

        add_recurrent_npc(campaign_id: CampaignId, draft: PersonaDraft) -> Option<NonPlayerCharacter>;
        update_recurrent_npc(campaign_id: CampaignId, entry_id: CharacterId, draft: PersonaDraft) -> bool;
        remove_recurrent_npc(campaign_id: CampaignId, entry_id: CharacterId) -> bool;

        add_location(campaign_id: CampaignId, draft: LoreDraft) -> Option<Location>;
        update_location(campaign_id: CampaignId, entry_id: LoreId, draft: LoreDraft) -> bool;
        remove_location(campaign_id: CampaignId, entry_id: LoreId) -> bool;

        add_faction(campaign_id: CampaignId, draft: LoreDraft) -> Option<Faction>;
        update_faction(campaign_id: CampaignId, entry_id: LoreId, draft: LoreDraft) -> bool;
        remove_faction(campaign_id: CampaignId, entry_id: LoreId) -> bool;

        add_glossary_term(campaign_id: CampaignId, draft: GlossaryDraft) -> Option<GlossaryTerm>;
        update_glossary_term(campaign_id: CampaignId, entry_id: LoreId, draft: GlossaryDraft) -> bool;
        remove_glossary_term(campaign_id: CampaignId, entry_id: LoreId) -> bool;

        add_item(campaign_id: CampaignId, draft: LoreDraft) -> Option<ImportantItem>;
        update_item(campaign_id: CampaignId, entry_id: LoreId, draft: LoreDraft) -> bool;
        remove_item(campaign_id: CampaignId, entry_id: LoreId) -> bool;

        add_house_rule(campaign_id: CampaignId, draft: HouseRuleDraft) -> Option<HouseRule>;
        update_house_rule(campaign_id: CampaignId, entry_id: LoreId, draft: HouseRuleDraft) -> bool;
        remove_house_rule(campaign_id: CampaignId, entry_id: LoreId) -> bool;
    }

    /// Delete a campaign and cascade: the chat logs of every session that
    /// existed under it are purged in the same user action. If the active
    /// session was among them, fall back to the first session of the new
    /// first campaign, or none.
    pub async fn delete_campaign(&mut self, id: CampaignId) -> Result<Vec<SessionId>, StudioError> {
        let removed = self.campaigns.delete_campaign(id);
        self.chat.purge(&removed);
        self.campaigns.persist(&self.docs).await?;
        self.chat.persist(&self.docs).await?;

        if let Some(active) = self.active_session {
            if removed.contains(&active) {
                self.active_session = self
                    .campaigns
                    .campaigns()
                    .first()
                    .and_then(|c| c.first_session())
                    .map(|s| s.id);
            }
        }
        Ok(removed)
    }

    // ========================================================================
    // Chat and scene facade
    // ========================================================================

    pub fn messages(&self, session_id: SessionId) -> &[ChatMessage] {
        self.chat.messages(session_id)
    }

    /// Append a message to a session's log and persist it.
    pub async fn append_message(
        &mut self,
        session_id: SessionId,
        draft: MessageDraft,
    ) -> Result<ChatMessage, StudioError> {
        let message = self.chat.append(session_id, draft);
        self.chat.persist(&self.docs).await?;
        Ok(message)
    }

    /// Replace a session's log with a restart announcement from the active
    /// narrator. With no narrator available this is a no-op.
    pub async fn reset_chat(&mut self, session_id: SessionId) -> Result<bool, StudioError> {
        let Some(narrator) = self.narrators.active().cloned() else {
            return Ok(false);
        };
        self.chat.reset(session_id, &narrator);
        self.chat.persist(&self.docs).await?;
        Ok(true)
    }

    /// Seed a session's opening message if it has no log yet. With no
    /// narrator available this is a no-op.
    pub async fn initialize_chat(&mut self, session_id: SessionId) -> Result<bool, StudioError> {
        let Some(narrator) = self.narrators.active().cloned() else {
            return Ok(false);
        };
        let seeded = self.chat.initialize(session_id, &narrator);
        if seeded {
            self.chat.persist(&self.docs).await?;
        }
        Ok(seeded)
    }

    pub fn control(&self, session_id: SessionId, character_id: CharacterId) -> ControlMode {
        self.scenes.control(session_id, character_id)
    }

    /// Set one character's control mode for a session and persist it.
    pub async fn set_control(
        &mut self,
        session_id: SessionId,
        character_id: CharacterId,
        mode: ControlMode,
    ) -> Result<(), StudioError> {
        self.scenes.set_control(session_id, character_id, mode);
        self.scenes.persist(&self.docs).await?;
        Ok(())
    }

    /// Direct access to the scene board for read-heavy callers.
    pub fn scenes(&self) -> &SceneBoard {
        &self.scenes
    }

    /// Direct access to the chat log for read-heavy callers.
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }
}
