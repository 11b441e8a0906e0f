//! Testing utilities.
//!
//! Provides `MockScribe`, a scripted stand-in for the generation
//! collaborator, so session flows can be exercised deterministically and
//! without network access.

use crate::chat::ChatMessage;
use crate::scribe::{PromptContext, ScribeError};

/// A mock scribe that returns scripted narrator replies in order.
pub struct MockScribe {
    replies: Vec<String>,
    reply_index: usize,
}

impl MockScribe {
    /// Create a mock with scripted replies.
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies,
            reply_index: 0,
        }
    }

    /// Return the next scripted reply.
    ///
    /// Mirrors [`crate::scribe::Scribe::narrate`] but is synchronous and
    /// never fails; when the script runs out a fixed line is returned.
    pub fn narrate(
        &mut self,
        _history: &[ChatMessage],
        _context: &PromptContext<'_>,
    ) -> Result<String, ScribeError> {
        let reply = if self.reply_index < self.replies.len() {
            let r = self.replies[self.reply_index].clone();
            self.reply_index += 1;
            r
        } else {
            "The narrator has no more scripted replies.".to_string()
        };
        Ok(reply)
    }

    /// Add a reply to the end of the script.
    pub fn queue_reply(&mut self, reply: impl Into<String>) {
        self.replies.push(reply.into());
    }

    /// Replay the script from the beginning.
    pub fn rewind(&mut self) {
        self.reply_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrators::{Narrator, NarratorDraft};

    #[test]
    fn test_scripted_replies_in_order() {
        let narrator = Narrator::new(NarratorDraft {
            name: "Mock".to_string(),
            instructions: "Narrate.".to_string(),
            ..NarratorDraft::default()
        });
        let context = PromptContext {
            narrator: &narrator,
            adventure: None,
            campaign: None,
        };

        let mut mock = MockScribe::new(vec!["First.".to_string(), "Second.".to_string()]);
        assert_eq!(mock.narrate(&[], &context).unwrap(), "First.");
        assert_eq!(mock.narrate(&[], &context).unwrap(), "Second.");
        assert_eq!(
            mock.narrate(&[], &context).unwrap(),
            "The narrator has no more scripted replies."
        );

        mock.rewind();
        assert_eq!(mock.narrate(&[], &context).unwrap(), "First.");
    }
}
