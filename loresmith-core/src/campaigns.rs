//! Campaign repository.
//!
//! CRUD over the campaign hierarchy and its sub-collections. Every
//! operation addresses its target by id; an id that matches nothing leaves
//! the collection unchanged and reports the no-op through its return
//! value. No operation here raises an error — the repository's only
//! failure mode is "nothing matched", which callers treat as routine.

use crate::ids::{AdventureId, CampaignId, CharacterId, LoreId, SessionId};
use crate::scribe::WorldSeed;
use crate::storage::{DocumentStore, StorageError, CAMPAIGNS_KEY};
use crate::world::{
    Adventure, AdventureDraft, Campaign, CampaignDraft, Faction, GameSession, GlossaryDraft,
    GlossaryTerm, HouseRule, HouseRuleDraft, ImportantItem, Location, LoreDraft,
    NonPlayerCharacter, PersonaDraft, PlayerCharacter,
};

/// Generated world-population lists are capped at this many entries each.
const MAX_GENERATED_ENTRIES: usize = 3;

/// Generates the uniform add/update/remove trio for one campaign-scoped
/// sub-collection.
macro_rules! collection_ops {
    ($field:ident, $entity:ty, $draft:ty, $id:ty, $add:ident, $update:ident, $remove:ident) => {
        /// Append a new entry to the addressed campaign's collection.
        /// Returns the created entry, or `None` if the campaign is unknown.
        pub fn $add(&mut self, campaign_id: CampaignId, draft: $draft) -> Option<$entity> {
            self.with_campaign(campaign_id, |campaign| {
                let entry = <$entity>::new(draft);
                campaign.$field.push(entry.clone());
                entry
            })
        }

        /// Replace the mutable fields of an entry in place, preserving its
        /// id. Unknown campaign or entry ids are no-ops.
        pub fn $update(&mut self, campaign_id: CampaignId, entry_id: $id, draft: $draft) -> bool {
            self.with_campaign(campaign_id, |campaign| {
                match campaign.$field.iter_mut().find(|e| e.id == entry_id) {
                    Some(entry) => {
                        entry.apply(draft);
                        true
                    }
                    None => false,
                }
            })
            .unwrap_or(false)
        }

        /// Remove an entry. Unknown campaign or entry ids are no-ops.
        pub fn $remove(&mut self, campaign_id: CampaignId, entry_id: $id) -> bool {
            self.with_campaign(campaign_id, |campaign| {
                let before = campaign.$field.len();
                campaign.$field.retain(|e| e.id != entry_id);
                campaign.$field.len() != before
            })
            .unwrap_or(false)
        }
    };
}

/// The full campaign forest plus its persistence state.
#[derive(Debug, Clone, Default)]
pub struct CampaignDirectory {
    campaigns: Vec<Campaign>,
    loaded: bool,
}

impl CampaignDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the campaign list from storage.
    pub async fn load(&mut self, docs: &DocumentStore) {
        self.campaigns = docs.load(CAMPAIGNS_KEY, Vec::new()).await;
        self.loaded = true;
    }

    /// Write the campaign list back to storage.
    pub async fn persist(&self, docs: &DocumentStore) -> Result<(), StorageError> {
        docs.save(CAMPAIGNS_KEY, &self.campaigns).await
    }

    /// Whether the initial load attempt has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn campaigns(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn get(&self, id: CampaignId) -> Option<&Campaign> {
        self.campaigns.iter().find(|c| c.id == id)
    }

    fn with_campaign<R>(
        &mut self,
        id: CampaignId,
        op: impl FnOnce(&mut Campaign) -> R,
    ) -> Option<R> {
        self.campaigns.iter_mut().find(|c| c.id == id).map(op)
    }

    fn adventure_mut(&mut self, id: AdventureId) -> Option<&mut Adventure> {
        self.campaigns
            .iter_mut()
            .flat_map(|c| c.adventures.iter_mut())
            .find(|a| a.id == id)
    }

    // ========================================================================
    // Campaigns
    // ========================================================================

    /// Create a campaign with empty sub-collections and return it.
    pub fn create_campaign(&mut self, draft: CampaignDraft) -> Campaign {
        let campaign = Campaign::new(draft);
        self.campaigns.push(campaign.clone());
        campaign
    }

    /// Replace a campaign's own fields in place; sub-collections and
    /// identity are untouched. Unknown ids are no-ops.
    pub fn update_campaign(&mut self, id: CampaignId, draft: CampaignDraft) -> bool {
        self.with_campaign(id, |campaign| campaign.apply(draft))
            .is_some()
    }

    /// Remove a campaign and return the flattened list of every session id
    /// that existed under any of its adventures, so dependent stores can
    /// clean up in the same user action. Unknown ids return an empty list.
    pub fn delete_campaign(&mut self, id: CampaignId) -> Vec<SessionId> {
        let Some(index) = self.campaigns.iter().position(|c| c.id == id) else {
            return Vec::new();
        };
        let campaign = self.campaigns.remove(index);
        campaign.session_ids()
    }

    // ========================================================================
    // Adventures and sessions
    // ========================================================================

    /// Append an adventure with an empty session list to the addressed
    /// campaign. Returns the created adventure, or `None` if the campaign
    /// is unknown.
    pub fn add_adventure(&mut self, campaign_id: CampaignId, draft: AdventureDraft) -> Option<Adventure> {
        self.with_campaign(campaign_id, |campaign| {
            let adventure = Adventure::new(draft.name, draft.premise);
            campaign.adventures.push(adventure.clone());
            adventure
        })
    }

    /// Replace an adventure's fields in place, matched by its own id across
    /// every campaign. Adventure ids are generated and never reused, so a
    /// process-wide match is unambiguous.
    pub fn update_adventure(&mut self, adventure_id: AdventureId, draft: AdventureDraft) -> bool {
        match self.adventure_mut(adventure_id) {
            Some(adventure) => {
                adventure.apply(draft);
                true
            }
            None => false,
        }
    }

    /// Remove an adventure, matched by its own id across every campaign.
    ///
    /// Does not touch chat histories or scene state for the adventure's
    /// sessions; only whole-campaign deletion cascades.
    pub fn remove_adventure(&mut self, adventure_id: AdventureId) -> bool {
        for campaign in &mut self.campaigns {
            let before = campaign.adventures.len();
            campaign.adventures.retain(|a| a.id != adventure_id);
            if campaign.adventures.len() != before {
                return true;
            }
        }
        false
    }

    /// Create a session under the matching adventure and return it.
    /// Returns `None` if the adventure is unknown.
    pub fn add_session(&mut self, adventure_id: AdventureId, name: impl Into<String>) -> Option<GameSession> {
        let adventure = self.adventure_mut(adventure_id)?;
        let session = GameSession::new(name);
        adventure.sessions.push(session.clone());
        Some(session)
    }

    /// Rename a session, matched by its own id across the whole forest.
    pub fn rename_session(&mut self, session_id: SessionId, name: impl Into<String>) -> bool {
        let session = self
            .campaigns
            .iter_mut()
            .flat_map(|c| c.adventures.iter_mut())
            .flat_map(|a| a.sessions.iter_mut())
            .find(|s| s.id == session_id);
        match session {
            Some(session) => {
                session.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Remove a single session.
    ///
    /// Like adventure removal, this does not touch the session's chat
    /// history or scene state.
    pub fn remove_session(&mut self, session_id: SessionId) -> bool {
        for adventure in self.campaigns.iter_mut().flat_map(|c| c.adventures.iter_mut()) {
            let before = adventure.sessions.len();
            adventure.sessions.retain(|s| s.id != session_id);
            if adventure.sessions.len() != before {
                return true;
            }
        }
        false
    }

    /// Resolve a session id to its owning campaign, adventure, and the
    /// session itself by scanning the forest. Linear in the total number
    /// of sessions, which is fine at expected collection sizes.
    pub fn find_session(
        &self,
        session_id: SessionId,
    ) -> Option<(&Campaign, &Adventure, &GameSession)> {
        for campaign in &self.campaigns {
            for adventure in &campaign.adventures {
                for session in &adventure.sessions {
                    if session.id == session_id {
                        return Some((campaign, adventure, session));
                    }
                }
            }
        }
        None
    }

    // ========================================================================
    // Sub-collections
    // ========================================================================

    collection_ops!(
        player_characters,
        PlayerCharacter,
        PersonaDraft,
        CharacterId,
        add_player_character,
        update_player_character,
        remove_player_character
    );

    collection_ops!(
        adventure_npcs,
        NonPlayerCharacter,
        PersonaDraft,
        CharacterId,
        add_adventure_npc,
        update_adventure_npc,
        remove_adventure_npc
    );

    collection_ops!(
        recurrent_npcs,
        NonPlayerCharacter,
        PersonaDraft,
        CharacterId,
        add_recurrent_npc,
        update_recurrent_npc,
        remove_recurrent_npc
    );

    collection_ops!(
        locations,
        Location,
        LoreDraft,
        LoreId,
        add_location,
        update_location,
        remove_location
    );

    collection_ops!(
        factions,
        Faction,
        LoreDraft,
        LoreId,
        add_faction,
        update_faction,
        remove_faction
    );

    collection_ops!(
        glossary,
        GlossaryTerm,
        GlossaryDraft,
        LoreId,
        add_glossary_term,
        update_glossary_term,
        remove_glossary_term
    );

    collection_ops!(
        items,
        ImportantItem,
        LoreDraft,
        LoreId,
        add_item,
        update_item,
        remove_item
    );

    collection_ops!(
        house_rules,
        HouseRule,
        HouseRuleDraft,
        LoreId,
        add_house_rule,
        update_house_rule,
        remove_house_rule
    );

    // ========================================================================
    // Generated content
    // ========================================================================

    /// Merge a generated world-population payload into the addressed
    /// campaign. Only the fields present in the seed are applied; every
    /// generated sub-entity is assigned a fresh id; each list contributes
    /// at most three entries. Returns whether the campaign was found.
    pub fn populate(&mut self, campaign_id: CampaignId, seed: WorldSeed) -> bool {
        self.with_campaign(campaign_id, |campaign| {
            if let Some(description) = seed.world_description {
                campaign.world_description = description;
            }
            for npc in seed.recurrent_npcs.into_iter().take(MAX_GENERATED_ENTRIES) {
                campaign.recurrent_npcs.push(NonPlayerCharacter::new(PersonaDraft {
                    name: npc.name,
                    description: npc.description,
                }));
            }
            for location in seed.locations.into_iter().take(MAX_GENERATED_ENTRIES) {
                campaign.locations.push(Location::new(LoreDraft {
                    name: location.name,
                    description: location.description,
                }));
            }
            for faction in seed.factions.into_iter().take(MAX_GENERATED_ENTRIES) {
                campaign.factions.push(Faction::new(LoreDraft {
                    name: faction.name,
                    description: faction.description,
                }));
            }
            for term in seed.glossary_terms.into_iter().take(MAX_GENERATED_ENTRIES) {
                campaign.glossary.push(GlossaryTerm::new(GlossaryDraft {
                    term: term.term,
                    definition: term.definition,
                }));
            }
            for item in seed.important_items.into_iter().take(MAX_GENERATED_ENTRIES) {
                campaign.items.push(ImportantItem::new(LoreDraft {
                    name: item.name,
                    description: item.description,
                }));
            }
            for rule in seed.house_rules.into_iter().take(MAX_GENERATED_ENTRIES) {
                campaign.house_rules.push(HouseRule::new(HouseRuleDraft {
                    title: rule.title,
                    text: rule.text,
                }));
            }
            for adventure in seed.adventures.into_iter().take(MAX_GENERATED_ENTRIES) {
                campaign
                    .adventures
                    .push(Adventure::new(adventure.name, adventure.premise));
            }
        })
        .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scribe::{AdventureSeed, LoreSeed, PersonaSeed};

    fn campaign_draft(name: &str) -> CampaignDraft {
        CampaignDraft {
            name: name.to_string(),
            world_description: "A world.".to_string(),
            unique_features: String::new(),
            tone: "epic".to_string(),
        }
    }

    fn directory_with_campaign() -> (CampaignDirectory, CampaignId) {
        let mut directory = CampaignDirectory::new();
        let campaign = directory.create_campaign(campaign_draft("Test Campaign"));
        (directory, campaign.id)
    }

    #[test]
    fn test_add_and_update_location() {
        let (mut directory, campaign_id) = directory_with_campaign();

        let location = directory
            .add_location(
                campaign_id,
                LoreDraft {
                    name: "The Hollow Spire".to_string(),
                    description: "A tower with no inside.".to_string(),
                },
            )
            .unwrap();

        assert!(directory.update_location(
            campaign_id,
            location.id,
            LoreDraft {
                name: "The Hollow Spire".to_string(),
                description: "A tower that is only outside.".to_string(),
            },
        ));

        let stored = &directory.get(campaign_id).unwrap().locations[0];
        assert_eq!(stored.id, location.id);
        assert_eq!(stored.description, "A tower that is only outside.");
    }

    #[test]
    fn test_operations_on_unknown_campaign_are_noops() {
        let (mut directory, campaign_id) = directory_with_campaign();
        let stranger = CampaignId::new();

        assert!(directory
            .add_player_character(
                stranger,
                PersonaDraft {
                    name: "Nobody".to_string(),
                    description: String::new(),
                },
            )
            .is_none());
        assert!(!directory.update_campaign(stranger, campaign_draft("Renamed")));
        assert!(directory.delete_campaign(stranger).is_empty());
        assert!(directory
            .add_adventure(
                stranger,
                AdventureDraft {
                    name: "Lost".to_string(),
                    premise: String::new(),
                },
            )
            .is_none());

        // The real campaign is untouched.
        let campaign = directory.get(campaign_id).unwrap();
        assert_eq!(campaign.name, "Test Campaign");
        assert!(campaign.player_characters.is_empty());
    }

    #[test]
    fn test_remove_unknown_entry_is_noop() {
        let (mut directory, campaign_id) = directory_with_campaign();

        directory
            .add_faction(
                campaign_id,
                LoreDraft {
                    name: "The Gilded Hand".to_string(),
                    description: "Merchants and worse.".to_string(),
                },
            )
            .unwrap();

        assert!(!directory.remove_faction(campaign_id, LoreId::new()));
        assert_eq!(directory.get(campaign_id).unwrap().factions.len(), 1);
    }

    #[test]
    fn test_add_session_returns_created_session() {
        let (mut directory, campaign_id) = directory_with_campaign();
        let adventure = directory
            .add_adventure(
                campaign_id,
                AdventureDraft {
                    name: "Act One".to_string(),
                    premise: "It begins.".to_string(),
                },
            )
            .unwrap();

        let session = directory.add_session(adventure.id, "First Night").unwrap();
        assert_eq!(session.name, "First Night");

        let (_, stored_adventure, stored_session) = directory.find_session(session.id).unwrap();
        assert_eq!(stored_adventure.id, adventure.id);
        assert_eq!(stored_session.id, session.id);
    }

    #[test]
    fn test_update_adventure_matches_by_own_id_across_campaigns() {
        let mut directory = CampaignDirectory::new();
        let first = directory.create_campaign(campaign_draft("First"));
        let second = directory.create_campaign(campaign_draft("Second"));
        directory
            .add_adventure(
                first.id,
                AdventureDraft {
                    name: "Opening".to_string(),
                    premise: "A door.".to_string(),
                },
            )
            .unwrap();
        let target = directory
            .add_adventure(
                second.id,
                AdventureDraft {
                    name: "Elsewhere".to_string(),
                    premise: "A window.".to_string(),
                },
            )
            .unwrap();

        assert!(directory.update_adventure(
            target.id,
            AdventureDraft {
                name: "Elsewhere, Revised".to_string(),
                premise: "A window, opened.".to_string(),
            },
        ));

        let stored = &directory.get(second.id).unwrap().adventures[0];
        assert_eq!(stored.id, target.id);
        assert_eq!(stored.name, "Elsewhere, Revised");
        // The other campaign's adventure is untouched.
        assert_eq!(directory.get(first.id).unwrap().adventures[0].name, "Opening");
    }

    #[test]
    fn test_delete_campaign_returns_all_session_ids() {
        let (mut directory, campaign_id) = directory_with_campaign();
        let first = directory
            .add_adventure(
                campaign_id,
                AdventureDraft {
                    name: "Act One".to_string(),
                    premise: String::new(),
                },
            )
            .unwrap();
        let second = directory
            .add_adventure(
                campaign_id,
                AdventureDraft {
                    name: "Act Two".to_string(),
                    premise: String::new(),
                },
            )
            .unwrap();

        let s1 = directory.add_session(first.id, "One").unwrap();
        let s2 = directory.add_session(first.id, "Two").unwrap();
        let s3 = directory.add_session(second.id, "Three").unwrap();

        let removed = directory.delete_campaign(campaign_id);
        assert_eq!(removed, vec![s1.id, s2.id, s3.id]);
        assert!(directory.get(campaign_id).is_none());
    }

    #[test]
    fn test_remove_session_and_adventure() {
        let (mut directory, campaign_id) = directory_with_campaign();
        let adventure = directory
            .add_adventure(
                campaign_id,
                AdventureDraft {
                    name: "Act One".to_string(),
                    premise: String::new(),
                },
            )
            .unwrap();
        let session = directory.add_session(adventure.id, "One").unwrap();

        assert!(directory.remove_session(session.id));
        assert!(directory.find_session(session.id).is_none());
        assert!(!directory.remove_session(session.id));

        assert!(directory.remove_adventure(adventure.id));
        assert!(directory.get(campaign_id).unwrap().adventures.is_empty());
        assert!(!directory.remove_adventure(adventure.id));
    }

    #[test]
    fn test_populate_merges_only_present_fields_and_caps_lists() {
        let (mut directory, campaign_id) = directory_with_campaign();

        let seed = WorldSeed {
            world_description: Some("A colder world.".to_string()),
            recurrent_npcs: vec![PersonaSeed {
                name: "Marrow the Lender".to_string(),
                description: "Remembers every debt.".to_string(),
            }],
            locations: vec![
                LoreSeed {
                    name: "One".to_string(),
                    description: String::new(),
                },
                LoreSeed {
                    name: "Two".to_string(),
                    description: String::new(),
                },
                LoreSeed {
                    name: "Three".to_string(),
                    description: String::new(),
                },
                LoreSeed {
                    name: "Four".to_string(),
                    description: String::new(),
                },
            ],
            adventures: vec![AdventureSeed {
                name: "The Long Thaw".to_string(),
                premise: "The ice is leaving, and things wake under it.".to_string(),
            }],
            ..WorldSeed::default()
        };

        assert!(directory.populate(campaign_id, seed));

        let campaign = directory.get(campaign_id).unwrap();
        assert_eq!(campaign.world_description, "A colder world.");
        assert_eq!(campaign.recurrent_npcs.len(), 1);
        // Lists are capped at three entries.
        assert_eq!(campaign.locations.len(), 3);
        assert_eq!(campaign.adventures.len(), 1);
        assert!(campaign.adventures[0].sessions.is_empty());
        // Absent fields leave existing data untouched.
        assert_eq!(campaign.tone, "epic");
        assert!(campaign.factions.is_empty());
    }

    #[test]
    fn test_populate_without_description_keeps_existing() {
        let (mut directory, campaign_id) = directory_with_campaign();

        assert!(directory.populate(campaign_id, WorldSeed::default()));
        assert_eq!(
            directory.get(campaign_id).unwrap().world_description,
            "A world."
        );
        assert!(!directory.populate(CampaignId::new(), WorldSeed::default()));
    }
}
