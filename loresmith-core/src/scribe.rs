//! The generation boundary.
//!
//! Assembles prompts for the external text-generation service and pins
//! content-generation requests to fixed structured shapes. The service
//! itself is an external collaborator; everything here is the seam: what
//! we send (ordered role/content pairs, an assembled system prompt, the
//! narrator's generation parameters) and how we validate what comes back.
//!
//! Collaborator failures are the one kind of error meant to surface to the
//! end user, so every variant of [`ScribeError`] carries a readable
//! description.

use crate::chat::{ChatMessage, ChatRole};
use crate::narrators::Narrator;
use crate::world::{Adventure, Campaign};
use claude::{Claude, Message, Request, ToolChoice};
use loresmith_macros::Tool;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the generation collaborator.
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("generation request failed: {0}")]
    Api(#[from] claude::Error),

    #[error("the narrator returned an empty reply")]
    EmptyReply,

    #[error("the reply carried no structured content")]
    MissingContent,

    #[error("generated content did not match the expected shape: {0}")]
    Malformed(String),
}

/// Everything that scopes a generation request: the active narrator and,
/// when available, the active adventure and its campaign.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub narrator: &'a Narrator,
    pub adventure: Option<&'a Adventure>,
    pub campaign: Option<&'a Campaign>,
}

impl PromptContext<'_> {
    /// Assemble the system prompt: narrator instructions, then the
    /// campaign's world context, then the adventure premise. The premise
    /// is replayed into every request so the narrator never loses the arc.
    pub fn system_prompt(&self) -> String {
        let mut prompt = self.narrator.instructions.clone();

        if let Some(campaign) = self.campaign {
            prompt.push_str("\n\n## The World\n");
            prompt.push_str(&campaign.name);
            if !campaign.world_description.is_empty() {
                prompt.push_str(": ");
                prompt.push_str(&campaign.world_description);
            }
            if !campaign.tone.is_empty() {
                prompt.push_str(&format!("\nTone: {}", campaign.tone));
            }
            if !campaign.unique_features.is_empty() {
                prompt.push_str(&format!("\nWhat sets it apart: {}", campaign.unique_features));
            }
        }

        if let Some(adventure) = self.adventure {
            prompt.push_str("\n\n## Current Adventure\n");
            prompt.push_str(&adventure.name);
            if !adventure.premise.is_empty() {
                prompt.push_str(": ");
                prompt.push_str(&adventure.premise);
            }
        }

        prompt
    }
}

// ============================================================================
// Structured generation shapes
// ============================================================================

/// Propose a new adventure for this campaign
#[derive(Debug, Clone, Default, Tool, Serialize, Deserialize)]
#[tool(name = "propose_adventure")]
#[serde(default)]
pub struct AdventureSeed {
    /// Evocative adventure title
    pub name: String,
    /// Two or three sentence premise for the story arc
    pub premise: String,
}

/// Propose a character for this campaign
#[derive(Debug, Clone, Default, Tool, Serialize, Deserialize)]
#[tool(name = "propose_character")]
#[serde(default)]
pub struct PersonaSeed {
    /// Character name
    pub name: String,
    /// Short description covering appearance, manner, and motive
    pub description: String,
}

/// A generated named entry in the world
#[derive(Debug, Clone, Default, Tool, Serialize, Deserialize)]
#[serde(default)]
pub struct LoreSeed {
    /// Name of the place, group, or object
    pub name: String,
    /// Short description
    pub description: String,
}

/// A generated glossary entry
#[derive(Debug, Clone, Default, Tool, Serialize, Deserialize)]
#[serde(default)]
pub struct GlossarySeed {
    /// The term of art
    pub term: String,
    /// What it means in this world
    pub definition: String,
}

/// A generated table rule
#[derive(Debug, Clone, Default, Tool, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseRuleSeed {
    /// Short rule title
    pub title: String,
    /// The rule itself
    pub text: String,
}

/// Populate a campaign world with starting content. Provide exactly three
/// entries for each list
#[derive(Debug, Clone, Default, Tool, Serialize, Deserialize)]
#[tool(name = "populate_world")]
#[serde(default)]
pub struct WorldSeed {
    /// A paragraph describing the world
    #[tool(optional)]
    pub world_description: Option<String>,
    /// Recurring NPCs the players will meet again and again
    pub recurrent_npcs: Vec<PersonaSeed>,
    /// Notable places
    pub locations: Vec<LoreSeed>,
    /// Organizations with their own agendas
    pub factions: Vec<LoreSeed>,
    /// Terms of art in this world
    pub glossary_terms: Vec<GlossarySeed>,
    /// Objects of narrative significance
    pub important_items: Vec<LoreSeed>,
    /// Rules the table plays by
    pub house_rules: Vec<HouseRuleSeed>,
    /// Story arcs to offer the players
    pub adventures: Vec<AdventureSeed>,
}

// ============================================================================
// Client wrapper
// ============================================================================

/// The narrator-side client: chat narration plus structured conjuring.
#[derive(Clone)]
pub struct Scribe {
    client: Claude,
}

impl Scribe {
    pub fn new(client: Claude) -> Self {
        Self { client }
    }

    /// Build a scribe from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, ScribeError> {
        Ok(Self::new(Claude::from_env()?))
    }

    /// Send the session history and receive the narrator's next reply.
    pub async fn narrate(
        &self,
        history: &[ChatMessage],
        context: &PromptContext<'_>,
    ) -> Result<String, ScribeError> {
        let messages = history
            .iter()
            .map(|m| match m.role {
                ChatRole::User => Message::user(&m.content),
                ChatRole::Assistant => Message::assistant(&m.content),
            })
            .collect();

        let request = Request::new(messages)
            .with_system(context.system_prompt())
            .with_temperature(context.narrator.temperature)
            .with_max_tokens(context.narrator.max_length as usize);

        let response = self.client.complete(request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(ScribeError::EmptyReply);
        }
        Ok(text)
    }

    /// Generate an adventure outline.
    pub async fn conjure_adventure(
        &self,
        brief: &str,
        context: &PromptContext<'_>,
    ) -> Result<AdventureSeed, ScribeError> {
        let value = self.conjure(brief, context, AdventureSeed::as_tool()).await?;
        serde_json::from_value(value).map_err(|e| ScribeError::Malformed(e.to_string()))
    }

    /// Generate a character sketch.
    pub async fn conjure_character(
        &self,
        brief: &str,
        context: &PromptContext<'_>,
    ) -> Result<PersonaSeed, ScribeError> {
        let value = self.conjure(brief, context, PersonaSeed::as_tool()).await?;
        serde_json::from_value(value).map_err(|e| ScribeError::Malformed(e.to_string()))
    }

    /// Generate a full world-population payload.
    pub async fn conjure_world(
        &self,
        brief: &str,
        context: &PromptContext<'_>,
    ) -> Result<WorldSeed, ScribeError> {
        let value = self.conjure(brief, context, WorldSeed::as_tool()).await?;
        serde_json::from_value(value).map_err(|e| ScribeError::Malformed(e.to_string()))
    }

    /// One-shot structured request: force the named tool and return its
    /// input payload for the caller to validate into a typed shape.
    async fn conjure(
        &self,
        brief: &str,
        context: &PromptContext<'_>,
        tool: claude::Tool,
    ) -> Result<serde_json::Value, ScribeError> {
        let tool_name = tool.name.clone();
        let request = Request::new(vec![Message::user(brief)])
            .with_system(context.system_prompt())
            .with_temperature(context.narrator.temperature)
            .with_max_tokens(context.narrator.max_length as usize)
            .with_tools(vec![tool])
            .with_tool_choice(ToolChoice::Tool {
                name: tool_name.clone(),
            });

        let response = self.client.complete(request).await?;
        response
            .tool_input(&tool_name)
            .cloned()
            .ok_or(ScribeError::MissingContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrators::NarratorDraft;
    use crate::world::{CampaignDraft, Campaign, Adventure};

    fn narrator() -> Narrator {
        Narrator::new(NarratorDraft {
            name: "The Chronicler".to_string(),
            description: String::new(),
            instructions: "Narrate in second person.".to_string(),
            temperature: 0.7,
            max_length: 512,
            tone: "epic".to_string(),
        })
    }

    #[test]
    fn test_system_prompt_replays_premise_and_world() {
        let narrator = narrator();
        let campaign = Campaign::new(CampaignDraft {
            name: "The Sundered Vale".to_string(),
            world_description: "A valley split by cataclysm.".to_string(),
            unique_features: "Floating shards.".to_string(),
            tone: "melancholy".to_string(),
        });
        let adventure = Adventure::new("Act One", "The vale stirs.");

        let context = PromptContext {
            narrator: &narrator,
            adventure: Some(&adventure),
            campaign: Some(&campaign),
        };
        let prompt = context.system_prompt();

        assert!(prompt.starts_with("Narrate in second person."));
        assert!(prompt.contains("The Sundered Vale: A valley split by cataclysm."));
        assert!(prompt.contains("Tone: melancholy"));
        assert!(prompt.contains("Floating shards."));
        assert!(prompt.contains("Act One: The vale stirs."));
    }

    #[test]
    fn test_system_prompt_without_campaign_is_just_instructions() {
        let narrator = narrator();
        let context = PromptContext {
            narrator: &narrator,
            adventure: None,
            campaign: None,
        };
        assert_eq!(context.system_prompt(), "Narrate in second person.");
    }

    #[test]
    fn test_adventure_seed_schema() {
        assert_eq!(AdventureSeed::tool_name(), "propose_adventure");
        let schema = AdventureSeed::input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["name"]["type"], "string");
        assert_eq!(schema["properties"]["premise"]["type"], "string");
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "name"));
        assert!(required.iter().any(|v| v == "premise"));
    }

    #[test]
    fn test_world_seed_schema_nests_object_arrays() {
        let schema = WorldSeed::input_schema();
        let npcs = &schema["properties"]["recurrent_npcs"];
        assert_eq!(npcs["type"], "array");
        assert_eq!(npcs["items"]["type"], "object");
        assert_eq!(npcs["items"]["properties"]["name"]["type"], "string");

        // The optional description is not required.
        let required = schema["required"].as_array().unwrap();
        assert!(!required.iter().any(|v| v == "world_description"));
        assert!(required.iter().any(|v| v == "locations"));
    }

    #[test]
    fn test_world_seed_coerces_payload_and_drops_unknown_fields() {
        let payload = serde_json::json!({
            "world_description": "A colder world.",
            "locations": [{"name": "The Hollow Spire", "description": "Empty.", "mood": "ominous"}],
            "spurious_field": 42
        });

        let seed: WorldSeed = serde_json::from_value(payload).unwrap();
        assert_eq!(seed.world_description.as_deref(), Some("A colder world."));
        assert_eq!(seed.locations.len(), 1);
        assert_eq!(seed.locations[0].name, "The Hollow Spire");
        // Absent lists default to empty.
        assert!(seed.factions.is_empty());
        assert!(seed.adventures.is_empty());
    }

    #[test]
    fn test_mismatched_payload_is_a_malformed_error() {
        let payload = serde_json::json!({"locations": "not a list"});
        let err = serde_json::from_value::<WorldSeed>(payload)
            .map_err(|e| ScribeError::Malformed(e.to_string()))
            .unwrap_err();
        assert!(matches!(err, ScribeError::Malformed(_)));
    }
}
