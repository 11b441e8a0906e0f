//! Campaign world types.
//!
//! Contains the campaign hierarchy (campaigns, adventures, sessions) and
//! every campaign-scoped sub-collection: player characters, the two NPC
//! scopes, locations, factions, glossary terms, important items, and house
//! rules.

use crate::ids::{AdventureId, CampaignId, CharacterId, LoreId, SessionId};
use serde::{Deserialize, Serialize};

// ============================================================================
// Drafts
// ============================================================================

/// Mutable fields of a campaign, used for create and update operations.
/// Identity is never part of the replaceable field set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub name: String,
    pub world_description: String,
    pub unique_features: String,
    pub tone: String,
}

/// Mutable fields of an adventure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdventureDraft {
    pub name: String,
    pub premise: String,
}

/// Mutable fields of a player character or NPC.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaDraft {
    pub name: String,
    pub description: String,
}

/// Mutable fields of a location, faction, or important item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoreDraft {
    pub name: String,
    pub description: String,
}

/// Mutable fields of a glossary term.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlossaryDraft {
    pub term: String,
    pub definition: String,
}

/// Mutable fields of a house rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HouseRuleDraft {
    pub title: String,
    pub text: String,
}

// ============================================================================
// Sub-collection entities
// ============================================================================

/// A player-controlled character, usable in any session of its campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCharacter {
    pub id: CharacterId,
    pub name: String,
    pub description: String,
}

impl PlayerCharacter {
    pub fn new(draft: PersonaDraft) -> Self {
        Self {
            id: CharacterId::new(),
            name: draft.name,
            description: draft.description,
        }
    }

    pub fn apply(&mut self, draft: PersonaDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }
}

/// A non-player character. Stored campaign-wide in one of two scopes:
/// tied to a specific adventure, or recurring across the whole campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonPlayerCharacter {
    pub id: CharacterId,
    pub name: String,
    pub description: String,
}

impl NonPlayerCharacter {
    pub fn new(draft: PersonaDraft) -> Self {
        Self {
            id: CharacterId::new(),
            name: draft.name,
            description: draft.description,
        }
    }

    pub fn apply(&mut self, draft: PersonaDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }
}

/// A notable place in the campaign world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: LoreId,
    pub name: String,
    pub description: String,
}

impl Location {
    pub fn new(draft: LoreDraft) -> Self {
        Self {
            id: LoreId::new(),
            name: draft.name,
            description: draft.description,
        }
    }

    pub fn apply(&mut self, draft: LoreDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }
}

/// An organization or group with its own agenda.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub id: LoreId,
    pub name: String,
    pub description: String,
}

impl Faction {
    pub fn new(draft: LoreDraft) -> Self {
        Self {
            id: LoreId::new(),
            name: draft.name,
            description: draft.description,
        }
    }

    pub fn apply(&mut self, draft: LoreDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }
}

/// A term of art in the campaign world and what it means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub id: LoreId,
    pub term: String,
    pub definition: String,
}

impl GlossaryTerm {
    pub fn new(draft: GlossaryDraft) -> Self {
        Self {
            id: LoreId::new(),
            term: draft.term,
            definition: draft.definition,
        }
    }

    pub fn apply(&mut self, draft: GlossaryDraft) {
        self.term = draft.term;
        self.definition = draft.definition;
    }
}

/// An artifact or object of narrative significance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportantItem {
    pub id: LoreId,
    pub name: String,
    pub description: String,
}

impl ImportantItem {
    pub fn new(draft: LoreDraft) -> Self {
        Self {
            id: LoreId::new(),
            name: draft.name,
            description: draft.description,
        }
    }

    pub fn apply(&mut self, draft: LoreDraft) {
        self.name = draft.name;
        self.description = draft.description;
    }
}

/// A table rule the group has agreed on for this campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseRule {
    pub id: LoreId,
    pub title: String,
    pub text: String,
}

impl HouseRule {
    pub fn new(draft: HouseRuleDraft) -> Self {
        Self {
            id: LoreId::new(),
            title: draft.title,
            text: draft.text,
        }
    }

    pub fn apply(&mut self, draft: HouseRuleDraft) {
        self.title = draft.title;
        self.text = draft.text;
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

/// One continuous play session within an adventure.
///
/// The unit of chat history and scene control: both stores key their state
/// by session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: SessionId,
    pub name: String,
}

impl GameSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            name: name.into(),
        }
    }
}

/// A story arc within a campaign.
///
/// The premise is replayed into every generation request as persistent
/// context for the narrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adventure {
    pub id: AdventureId,
    pub name: String,
    pub premise: String,
    #[serde(default)]
    pub sessions: Vec<GameSession>,
}

impl Adventure {
    pub fn new(name: impl Into<String>, premise: impl Into<String>) -> Self {
        Self {
            id: AdventureId::new(),
            name: name.into(),
            premise: premise.into(),
            sessions: Vec::new(),
        }
    }

    pub fn apply(&mut self, draft: AdventureDraft) {
        self.name = draft.name;
        self.premise = draft.premise;
    }
}

/// Top-level authored world container: root of the hierarchy, owner of all
/// world-building sub-collections and adventures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub world_description: String,
    pub unique_features: String,
    pub tone: String,
    #[serde(default)]
    pub player_characters: Vec<PlayerCharacter>,
    /// NPCs narratively tied to a specific adventure, stored campaign-wide.
    #[serde(default)]
    pub adventure_npcs: Vec<NonPlayerCharacter>,
    /// NPCs that recur across the whole campaign.
    #[serde(default)]
    pub recurrent_npcs: Vec<NonPlayerCharacter>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub factions: Vec<Faction>,
    #[serde(default)]
    pub glossary: Vec<GlossaryTerm>,
    #[serde(default)]
    pub items: Vec<ImportantItem>,
    #[serde(default)]
    pub house_rules: Vec<HouseRule>,
    #[serde(default)]
    pub adventures: Vec<Adventure>,
}

impl Campaign {
    pub fn new(draft: CampaignDraft) -> Self {
        Self {
            id: CampaignId::new(),
            name: draft.name,
            world_description: draft.world_description,
            unique_features: draft.unique_features,
            tone: draft.tone,
            player_characters: Vec::new(),
            adventure_npcs: Vec::new(),
            recurrent_npcs: Vec::new(),
            locations: Vec::new(),
            factions: Vec::new(),
            glossary: Vec::new(),
            items: Vec::new(),
            house_rules: Vec::new(),
            adventures: Vec::new(),
        }
    }

    pub fn apply(&mut self, draft: CampaignDraft) {
        self.name = draft.name;
        self.world_description = draft.world_description;
        self.unique_features = draft.unique_features;
        self.tone = draft.tone;
    }

    /// Every session id under this campaign, flattened in document order.
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.adventures
            .iter()
            .flat_map(|a| a.sessions.iter().map(|s| s.id))
            .collect()
    }

    /// Whether any adventure of this campaign owns the given session.
    pub fn contains_session(&self, session_id: SessionId) -> bool {
        self.adventures
            .iter()
            .any(|a| a.sessions.iter().any(|s| s.id == session_id))
    }

    /// The first session in document order, if any.
    pub fn first_session(&self) -> Option<&GameSession> {
        self.adventures.iter().flat_map(|a| a.sessions.iter()).next()
    }
}
