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

//! Transcript parsing: message classification and conversation segmentation
//!
//! A transcript is exported chat text where every message starts with a
//! bracketed timestamp:
//!
//! ```text
//! [2024-03-01, 8:15:02 PM] Wagner: Find me a romantic Italian place
//! [2024-03-01, 8:15:04 PM] Concierge: Por favor, aguarde...
//! [2024-03-01, 8:15:09 PM] Concierge: [DEBUG] Metadados relacionados ['Cuisine -> Italian']
//! [2024-03-01, 8:15:30 PM] Concierge: Here are my picks:
//! - Osteria Francescana – tasting menu
//! ```
//!
//! A message's content runs until the next `[YYYY-MM-DD` marker, so it may
//! span several lines. Each message is classified, debug payloads are
//! decoded, and messages are grouped into conversations that open whenever
//! the agent speaks after anyone else.

use crate::config::TranscriptConfig;
use crate::debug_trace::{DebugRecord, DebugTraceExtractor};
use crate::error::{ConciergeError, Result};
use crate::message::{Conversation, Message, MessageType};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Start of a timestamped message
static MESSAGE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\d{4}-\d{2}-\d{2}").expect("message start pattern is valid"));

/// A `(timestamp, sender, content)` triple before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage<'a> {
    pub timestamp: &'a str,
    pub sender: &'a str,
    pub content: &'a str,
}

/// Result of parsing one transcript
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedTranscript {
    pub conversations: Vec<Conversation>,
    /// Decoded debug payloads across all conversations, in transcript order
    pub debug_records: Vec<DebugRecord>,
}

impl ParsedTranscript {
    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(Conversation::len).sum()
    }
}

/// Split transcript text into raw message triples.
///
/// Text before the first timestamp and chunks without a `] sender: ` header
/// are skipped.
pub fn split_messages(text: &str) -> Vec<RawMessage<'_>> {
    let starts: Vec<usize> = MESSAGE_START.find_iter(text).map(|m| m.start()).collect();

    if let Some(&first) = starts.first() {
        if !text[..first].trim().is_empty() {
            debug!(bytes = first, "Ignoring text before the first timestamped message");
        }
    }

    let mut messages = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let chunk = &text[start..end];
        match split_header(chunk) {
            Some(raw) => messages.push(raw),
            None => warn!(
                offset = start,
                "Skipping transcript line without a '[timestamp] sender: ' header"
            ),
        }
    }
    messages
}

fn split_header(chunk: &str) -> Option<RawMessage<'_>> {
    let body = chunk.strip_prefix('[')?;
    let (timestamp, rest) = body.split_once("] ")?;
    let (sender, content) = rest.split_once(": ")?;
    Some(RawMessage {
        timestamp,
        sender,
        content,
    })
}

/// Classifies messages and segments them into conversations
#[derive(Debug, Clone)]
pub struct TranscriptParser {
    config: TranscriptConfig,
    extractor: DebugTraceExtractor,
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new(TranscriptConfig::default())
    }
}

impl TranscriptParser {
    pub fn new(config: TranscriptConfig) -> Self {
        let extractor = DebugTraceExtractor::new(&config);
        Self { config, extractor }
    }

    pub fn config(&self) -> &TranscriptConfig {
        &self.config
    }

    /// Assign exactly one type, checking rules in priority order
    pub fn classify(&self, sender: &str, content: &str) -> MessageType {
        if sender == self.config.agent_sender {
            MessageType::UserRequest
        } else if self
            .config
            .processing_phrases
            .iter()
            .any(|phrase| content.contains(phrase.as_str()))
        {
            MessageType::Processing
        } else if content.starts_with(self.config.debug_prefix.as_str()) {
            MessageType::Debug
        } else if content.contains(self.config.audio_marker.as_str()) {
            MessageType::Audio
        } else {
            MessageType::Recommendation
        }
    }

    /// Parse timestamps with the configured format. Narrow and regular
    /// no-break spaces, common in chat exports, count as plain spaces.
    pub fn parse_timestamp(&self, text: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
        let normalized: String = text
            .trim()
            .chars()
            .map(|c| if c == '\u{202f}' || c == '\u{a0}' { ' ' } else { c })
            .collect();
        NaiveDateTime::parse_from_str(&normalized, &self.config.timestamp_format)
    }

    /// Parse a transcript into conversations.
    ///
    /// Fails with [`ConciergeError::Format`] if any timestamp is invalid.
    /// Undecodable debug payloads only clear that message's `debug_info`.
    pub fn parse(&self, text: &str) -> Result<ParsedTranscript> {
        info!(length = text.len(), "Starting to parse transcript");

        let raw_messages = split_messages(text);
        info!(messages = raw_messages.len(), "Found messages in transcript");

        let agent = self.config.agent_sender.as_str();
        let mut parsed = ParsedTranscript::default();
        let mut current: Vec<Message> = Vec::new();
        let mut previous_sender: Option<&str> = None;

        for (index, raw) in raw_messages.iter().enumerate() {
            let timestamp =
                self.parse_timestamp(raw.timestamp)
                    .map_err(|e| ConciergeError::Format {
                        index,
                        timestamp: raw.timestamp.to_string(),
                        reason: e.to_string(),
                    })?;

            let sender = raw.sender.trim();
            let content = raw.content.trim();

            // The agent speaking after anyone else opens a new conversation
            if sender == agent && previous_sender != Some(agent) && !current.is_empty() {
                let id = parsed.conversations.len();
                parsed
                    .conversations
                    .push(Conversation::new(id, std::mem::take(&mut current)));
            }

            let conversation_id = parsed.conversations.len();
            let message_type = self.classify(sender, content);
            let mut message = Message::new(timestamp, sender, content, message_type, conversation_id);

            if message_type == MessageType::Debug {
                match self.extractor.extract(content) {
                    Ok(Some(payload)) => {
                        parsed.debug_records.push(DebugRecord::new(
                            conversation_id,
                            current.len(),
                            timestamp,
                            payload.clone(),
                        ));
                        message.debug_info = Some(payload);
                    }
                    Ok(None) => {
                        debug!(message = index, "Debug message without a known marker");
                    }
                    Err(e) => {
                        warn!(
                            message = index,
                            conversation_id,
                            error = %e,
                            "Dropping undecodable debug payload"
                        );
                    }
                }
            }

            current.push(message);
            previous_sender = Some(sender);
        }

        if !current.is_empty() {
            let id = parsed.conversations.len();
            parsed.conversations.push(Conversation::new(id, current));
        }

        info!(
            conversations = parsed.conversations.len(),
            debug_records = parsed.debug_records.len(),
            "Parsed transcript"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_trace::DebugKind;
    use proptest::prelude::*;

    const TRANSCRIPT: &str = "\
[2024-03-01, 8:15:02 PM] Wagner: Find me a romantic Italian place
[2024-03-01, 8:15:04 PM] Concierge: Por favor, aguarde...
[2024-03-01, 8:15:09 PM] Concierge: [DEBUG] Metadados relacionados ['Cuisine -> Italian', 'Mood -> Romantic']
[2024-03-01, 8:15:30 PM] Concierge: Here are my picks:
- Osteria Francescana – tasting menu
- Trattoria Bella – cozy
[2024-03-01, 8:20:00 PM] Wagner: Something for brunch?
[2024-03-01, 8:20:01 PM] Wagner: Near the beach
[2024-03-01, 8:20:05 PM] Concierge: \u{200e}audio omitted
[2024-03-01, 8:20:09 PM] Concierge: [DEBUG] Metadados relacionados ['Cuisine -> Italian'
";

    #[test]
    fn test_split_messages_multiline_content() {
        let raws = split_messages(TRANSCRIPT);
        assert_eq!(raws.len(), 8);
        assert_eq!(raws[0].timestamp, "2024-03-01, 8:15:02 PM");
        assert_eq!(raws[0].sender, "Wagner");
        assert!(raws[3].content.contains("Trattoria Bella"));
    }

    #[test]
    fn test_split_skips_headerless_chunks() {
        let text = "preamble\n[2024-03-01, 8:15:02 PM] Messages are encrypted\n[2024-03-01, 8:15:03 PM] Bot: hi";
        let raws = split_messages(text);
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].content, "hi");
    }

    #[test]
    fn test_classification_priority() {
        let parser = TranscriptParser::default();
        assert_eq!(parser.classify("Wagner", "[DEBUG] x"), MessageType::UserRequest);
        assert_eq!(
            parser.classify("Bot", "[DEBUG] Please, wait"),
            MessageType::Processing
        );
        assert_eq!(parser.classify("Bot", "[DEBUG] x"), MessageType::Debug);
        assert_eq!(parser.classify("Bot", "note [DEBUG]"), MessageType::Recommendation);
        assert_eq!(parser.classify("Bot", "\u{200e}audio omitted"), MessageType::Audio);
        assert_eq!(parser.classify("Bot", "- Bella"), MessageType::Recommendation);
    }

    #[test]
    fn test_parse_segments_conversations() {
        let parsed = TranscriptParser::default().parse(TRANSCRIPT).unwrap();
        assert_eq!(parsed.conversations.len(), 2);
        assert_eq!(parsed.message_count(), 8);

        let first = &parsed.conversations[0];
        assert_eq!(first.id, 0);
        assert_eq!(first.len(), 4);
        assert_eq!(first.messages[1].message_type, MessageType::Processing);
        assert_eq!(first.messages[3].message_type, MessageType::Recommendation);

        // Consecutive agent messages stay together
        let second = &parsed.conversations[1];
        assert_eq!(second.len(), 4);
        assert!(second.messages.iter().all(|m| m.conversation_id == 1));
        assert_eq!(second.messages[2].message_type, MessageType::Audio);
    }

    #[test]
    fn test_parse_collects_debug_records() {
        let parsed = TranscriptParser::default().parse(TRANSCRIPT).unwrap();
        assert_eq!(parsed.debug_records.len(), 1);
        let record = &parsed.debug_records[0];
        assert_eq!(record.kind, DebugKind::Metadata);
        assert_eq!(record.conversation_id, 0);
        assert_eq!(record.message_index, 2);

        // The truncated payload in the second conversation is dropped, not fatal
        let broken = &parsed.conversations[1].messages[3];
        assert_eq!(broken.message_type, MessageType::Debug);
        assert!(broken.debug_info.is_none());
    }

    #[test]
    fn test_invalid_timestamp_is_fatal() {
        let text = "[2024-03-01, 8:15:02 PM] Wagner: hi\n[2024-13-45, 99:00:00 XM] Bot: hello";
        let err = TranscriptParser::default().parse(text).unwrap_err();
        match err {
            ConciergeError::Format {
                index, timestamp, ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(timestamp, "2024-13-45, 99:00:00 XM");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_narrow_no_break_space_timestamp() {
        let parser = TranscriptParser::default();
        let ts = parser.parse_timestamp("2024-03-01, 8:15:02\u{202f}PM").unwrap();
        assert_eq!(ts.format("%H:%M:%S").to_string(), "20:15:02");
    }

    #[test]
    fn test_no_agent_turns_single_conversation() {
        let text = "[2024-03-01, 8:15:02 PM] Bot: one\n[2024-03-01, 8:15:03 PM] Bot: two";
        let parsed = TranscriptParser::default().parse(text).unwrap();
        assert_eq!(parsed.conversations.len(), 1);
        assert_eq!(parsed.conversations[0].len(), 2);
    }

    #[test]
    fn test_padded_sender_is_trimmed_before_agent_check() {
        let text = "[2024-03-01, 8:15:02 PM] Bot: one\n[2024-03-01, 8:15:03 PM] Wagner : hi";
        let parsed = TranscriptParser::default().parse(text).unwrap();
        assert_eq!(parsed.conversations.len(), 2);
        let opener = &parsed.conversations[1].messages[0];
        assert_eq!(opener.sender, "Wagner");
        assert_eq!(opener.message_type, MessageType::UserRequest);
    }

    #[test]
    fn test_leading_backend_messages_form_first_conversation() {
        let text = "[2024-03-01, 8:15:02 PM] Bot: welcome\n[2024-03-01, 8:15:03 PM] Wagner: hi";
        let parsed = TranscriptParser::default().parse(text).unwrap();
        assert_eq!(parsed.conversations.len(), 2);
        assert_eq!(parsed.conversations[1].messages[0].sender, "Wagner");
        assert_eq!(parsed.conversations[1].messages[0].conversation_id, 1);
    }

    #[test]
    fn test_empty_transcript() {
        let parsed = TranscriptParser::default().parse("").unwrap();
        assert!(parsed.conversations.is_empty());
    }

    proptest! {
        #[test]
        fn prop_segmentation_conserves_messages(senders in proptest::collection::vec(prop_oneof![Just("Wagner"), Just("Bot")], 0..40)) {
            let text: String = senders
                .iter()
                .enumerate()
                .map(|(i, s)| format!("[2024-03-01, 8:{:02}:00 PM] {}: message {}\n", i % 60, s, i))
                .collect();
            let parsed = TranscriptParser::default().parse(&text).unwrap();

            prop_assert_eq!(parsed.message_count(), senders.len());
            for (i, conversation) in parsed.conversations.iter().enumerate() {
                prop_assert_eq!(conversation.id, i);
                prop_assert!(!conversation.is_empty());
                prop_assert!(conversation.messages.iter().all(|m| m.conversation_id == i));
            }
            if !senders.contains(&"Wagner") && !senders.is_empty() {
                prop_assert_eq!(parsed.conversations.len(), 1);
            }
        }
    }
}
