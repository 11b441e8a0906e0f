//! Campaign authoring and session chat engine with an AI narrator.
//!
//! This crate provides:
//! - A durable document store: one JSON file per collection, forgiving
//!   loads, synchronous-with-the-step writes
//! - The campaign hierarchy (campaigns, adventures, sessions) and all
//!   campaign-scoped world-building sub-collections
//! - A narrator registry of AI personas with a persisted, self-healing
//!   active pointer
//! - Per-session chat history and scene control
//! - The studio orchestrator that ties the four stores together and
//!   resolves the active session into its owning campaign and adventure
//!
//! # Quick Start
//!
//! ```ignore
//! use loresmith_core::{CampaignDraft, Studio};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut studio = Studio::open("./lore").await?;
//!
//!     let campaign = studio
//!         .create_campaign(CampaignDraft {
//!             name: "The Sundered Vale".into(),
//!             world_description: "A valley split by cataclysm.".into(),
//!             unique_features: "Floating shards of the old capital.".into(),
//!             tone: "melancholy".into(),
//!         })
//!         .await?;
//!
//!     println!("{} campaigns", studio.campaigns().len());
//!     println!("created {}", campaign.name);
//!     Ok(())
//! }
//! ```

pub mod campaigns;
pub mod chat;
pub mod ids;
pub mod narrators;
pub mod scene;
pub mod scribe;
pub mod storage;
pub mod studio;
pub mod testing;
pub mod world;

// Re-export for convenience
pub use loresmith_macros::Tool;

// Primary public API
pub use campaigns::CampaignDirectory;
pub use chat::{ChatLog, ChatMessage, ChatRole, MessageDraft};
pub use ids::{
    AdventureId, CampaignId, CharacterId, LoreId, MessageId, NarratorId, SessionId,
};
pub use narrators::{Narrator, NarratorDraft, NarratorRegistry};
pub use scene::{ControlMode, SceneBoard};
pub use scribe::{
    AdventureSeed, PersonaSeed, PromptContext, Scribe, ScribeError, WorldSeed,
};
pub use storage::{DocumentStore, StorageError};
pub use studio::{Studio, StudioError};
pub use testing::MockScribe;
pub use world::{
    Adventure, AdventureDraft, Campaign, CampaignDraft, Faction, GameSession, GlossaryDraft,
    GlossaryTerm, HouseRule, HouseRuleDraft, ImportantItem, Location, LoreDraft,
    NonPlayerCharacter, PersonaDraft, PlayerCharacter,
};
