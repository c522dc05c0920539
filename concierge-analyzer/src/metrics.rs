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

//! Per-conversation timing and annotation metrics

use chrono::{Duration, NaiveDateTime};
use concierge_core::{Conversation, DebugPayload, MessageType};
use serde::Serialize;

/// Timing, debug and evaluation figures for one conversation.
///
/// Durations are seconds measured from the opening request and are absent
/// when either endpoint is missing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationMetrics {
    pub conversation_id: usize,
    pub request: Option<String>,
    pub time_to_first_response: Option<f64>,
    pub time_to_processing: Option<f64>,
    pub time_to_recommendation: Option<f64>,
    pub total_conversation_time: Option<f64>,
    pub debug_count: usize,
    /// Tags in the last decoded metadata payload
    pub metadata_count: usize,
    /// Keys of the last decoded context `results` mapping
    pub context_keys: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation_accuracy: Option<f64>,
}

fn seconds(delta: Duration) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

impl ConversationMetrics {
    pub fn from_conversation(conversation: &Conversation, agent_sender: &str) -> Self {
        let request = conversation.first_of(MessageType::UserRequest);
        let request_time = request.map(|m| m.timestamp);
        let since_request = |at: Option<NaiveDateTime>| -> Option<f64> {
            Some(seconds(at? - request_time?))
        };

        let first_response = conversation
            .messages
            .iter()
            .find(|m| !m.is(MessageType::UserRequest) && m.sender != agent_sender)
            .map(|m| m.timestamp);
        let processing = conversation
            .first_of(MessageType::Processing)
            .map(|m| m.timestamp);
        let recommendation = conversation.recommendation().map(|m| m.timestamp);
        let last = conversation.messages.last().map(|m| m.timestamp);

        let mut metadata_count = 0;
        let mut context_keys = Vec::new();
        for message in &conversation.messages {
            match &message.debug_info {
                Some(DebugPayload::Metadata(tags)) => metadata_count = tags.len(),
                Some(payload @ DebugPayload::Context(_)) => {
                    if let Some(results) = payload.context_results() {
                        context_keys = results.keys().cloned().collect();
                    }
                }
                _ => {}
            }
        }

        Self {
            conversation_id: conversation.id,
            request: request.map(|m| m.content.clone()),
            time_to_first_response: since_request(first_response),
            time_to_processing: since_request(processing),
            time_to_recommendation: since_request(recommendation),
            total_conversation_time: since_request(last),
            debug_count: conversation.debug_count(),
            metadata_count,
            context_keys,
            persona_id: conversation.persona.as_ref().map(|p| p.id.clone()),
            persona_description: conversation.persona.as_ref().map(|p| p.description.clone()),
            recommendation_accuracy: conversation.evaluation().map(|e| e.accuracy),
        }
    }
}

/// One line per conversation for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    pub conversation_id: usize,
    pub request: String,
    pub recommendation: String,
    pub timestamp: Option<NaiveDateTime>,
}

impl ConversationSummary {
    pub fn from_conversation(conversation: &Conversation) -> Self {
        let request = conversation.first_of(MessageType::UserRequest);
        Self {
            conversation_id: conversation.id,
            request: request
                .map(|m| m.content.clone())
                .unwrap_or_else(|| "No request".to_string()),
            recommendation: conversation
                .recommendation()
                .map(|m| m.content.clone())
                .unwrap_or_else(|| "No recommendation".to_string()),
            timestamp: request.map(|m| m.timestamp),
        }
    }
}
