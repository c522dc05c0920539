// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Messages and conversations reconstructed from a chat transcript

use crate::debug_trace::{DebugPayload, DebugRecord};
use crate::evaluation::RecommendationEvaluation;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Classification of a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Sent by the agent identity; opens conversations
    UserRequest,
    /// "Please wait" acknowledgement from the backend
    Processing,
    /// Diagnostic trace emitted by the recommendation engine
    Debug,
    /// Omitted audio attachment
    Audio,
    /// Anything else the backend sends
    Recommendation,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::UserRequest => "user_request",
            MessageType::Processing => "processing",
            MessageType::Debug => "debug",
            MessageType::Audio => "audio",
            MessageType::Recommendation => "recommendation",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classified transcript message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub timestamp: NaiveDateTime,
    pub sender: String,
    /// Content with surrounding whitespace removed
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub conversation_id: usize,
    /// Decoded diagnostic payload; `None` for non-debug messages and for
    /// debug messages whose payload could not be decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_info: Option<DebugPayload>,
    /// Set on the first recommendation message of a persona-matched conversation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_evaluation: Option<RecommendationEvaluation>,
}

impl Message {
    pub fn new(
        timestamp: NaiveDateTime,
        sender: impl Into<String>,
        content: impl Into<String>,
        message_type: MessageType,
        conversation_id: usize,
    ) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            content: content.into(),
            message_type,
            conversation_id,
            debug_info: None,
            recommendation_evaluation: None,
        }
    }

    pub fn is(&self, message_type: MessageType) -> bool {
        self.message_type == message_type
    }
}

/// Persona annotation attached to a matched conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaRef {
    pub id: String,
    pub description: String,
}

/// An ordered, non-empty run of messages opened by an agent turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: usize,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<PersonaRef>,
}

impl Conversation {
    pub fn new(id: usize, messages: Vec<Message>) -> Self {
        Self {
            id,
            messages,
            persona: None,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// First message of the given type
    pub fn first_of(&self, message_type: MessageType) -> Option<&Message> {
        self.messages.iter().find(|m| m.is(message_type))
    }

    /// Content of the opening user request
    pub fn request(&self) -> Option<&str> {
        self.first_of(MessageType::UserRequest)
            .map(|m| m.content.as_str())
    }

    /// The recommendation message evaluations are attached to
    pub fn recommendation(&self) -> Option<&Message> {
        self.first_of(MessageType::Recommendation)
    }

    pub fn recommendation_mut(&mut self) -> Option<&mut Message> {
        self.messages
            .iter_mut()
            .find(|m| m.is(MessageType::Recommendation))
    }

    pub fn evaluation(&self) -> Option<&RecommendationEvaluation> {
        self.recommendation()
            .and_then(|m| m.recommendation_evaluation.as_ref())
    }

    /// Drop persona and evaluation annotations
    pub fn clear_annotations(&mut self) {
        self.persona = None;
        for message in &mut self.messages {
            message.recommendation_evaluation = None;
        }
    }

    /// Number of messages classified as debug, decoded or not
    pub fn debug_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is(MessageType::Debug))
            .count()
    }

    /// Debug records for every successfully decoded debug message, in
    /// message order
    pub fn debug_records(&self) -> Vec<DebugRecord> {
        self.messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is(MessageType::Debug))
            .filter_map(|(index, m)| {
                m.debug_info
                    .as_ref()
                    .map(|payload| DebugRecord::new(self.id, index, m.timestamp, payload.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_trace::ConceptTag;
    use chrono::NaiveDate;

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(20, minute, 0)
            .unwrap()
    }

    fn sample() -> Conversation {
        let mut debug = Message::new(ts(1), "Bot", "[DEBUG] ...", MessageType::Debug, 0);
        debug.debug_info = Some(DebugPayload::Metadata(vec![ConceptTag::new(
            "Cuisine", "Italian",
        )]));
        Conversation::new(
            0,
            vec![
                Message::new(ts(0), "Wagner", "dinner?", MessageType::UserRequest, 0),
                debug,
                Message::new(ts(2), "Bot", "[DEBUG] broken", MessageType::Debug, 0),
                Message::new(ts(3), "Bot", "- A – nice", MessageType::Recommendation, 0),
            ],
        )
    }

    #[test]
    fn test_accessors() {
        let conversation = sample();
        assert_eq!(conversation.request(), Some("dinner?"));
        assert_eq!(conversation.recommendation().unwrap().content, "- A – nice");
        assert_eq!(conversation.debug_count(), 2);
        assert!(conversation.evaluation().is_none());
    }

    #[test]
    fn test_debug_records_skip_undecoded() {
        let records = sample().debug_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message_index, 1);
        assert_eq!(records[0].conversation_id, 0);
    }

    #[test]
    fn test_message_type_serialization() {
        let json = serde_json::to_string(&MessageType::UserRequest).unwrap();
        assert_eq!(json, "\"user_request\"");
        assert_eq!(MessageType::Recommendation.to_string(), "recommendation");
    }
}
