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

//! Debug Trace Extraction
//!
//! The recommendation engine interleaves diagnostic messages with its
//! answers. Three kinds are understood:
//!
//! - **metadata**: concepts tagged on the request, e.g.
//!   `[DEBUG] Metadados relacionados ['Cuisine -> Italian', 'Mood -> Romantic']`
//! - **context**: the refined request context as a mapping
//! - **candidates**: scored candidate restaurants per category under `results`
//!
//! Payloads are structural literals (see [`crate::literal`]). Each payload
//! kind has a fixed list of shape decoders tried in order; the first one that
//! accepts the literal wins. A payload no decoder accepts is a
//! [`PayloadDecodeError`], which the transcript parser recovers from by
//! dropping that single annotation.

use crate::config::TranscriptConfig;
use crate::literal::{Literal, LiteralError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between a category and its value, or a score and its name
pub const ARROW: &str = " -> ";

/// Category assigned to metadata strings without an arrow
pub const UNCATEGORIZED: &str = "uncategorized";

/// Debug payload kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugKind {
    Metadata,
    Context,
    Candidates,
}

/// A (category, value) concept tag such as `Cuisine -> Italian`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConceptTag {
    pub category: String,
    pub value: String,
}

impl ConceptTag {
    pub fn new(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            value: value.into(),
        }
    }

    /// Parse `"Category -> Value"`; text without an arrow becomes an
    /// uncategorized tag.
    pub fn from_arrow(text: &str) -> Self {
        match text.split_once(ARROW) {
            Some((category, value)) => Self::new(category.trim(), value.trim()),
            None => Self::new(UNCATEGORIZED, text.trim()),
        }
    }

    /// Whether the tag came from an explicit `category -> value` pair
    pub fn is_categorized(&self) -> bool {
        self.category != UNCATEGORIZED
    }

    /// `"Category: Value"` label used in co-occurrence reports
    pub fn label(&self) -> String {
        format!("{}: {}", self.category, self.value)
    }
}

/// A scored candidate restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub score: f64,
}

/// Candidates proposed for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateGroup {
    pub category: String,
    pub restaurants: Vec<Candidate>,
}

/// Decoded diagnostic payload attached to a debug message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DebugPayload {
    Metadata(Vec<ConceptTag>),
    /// Context mapping kept as-is
    Context(serde_json::Value),
    Candidates(Vec<CandidateGroup>),
}

impl DebugPayload {
    pub fn kind(&self) -> DebugKind {
        match self {
            DebugPayload::Metadata(_) => DebugKind::Metadata,
            DebugPayload::Context(_) => DebugKind::Context,
            DebugPayload::Candidates(_) => DebugKind::Candidates,
        }
    }

    pub fn as_metadata(&self) -> Option<&[ConceptTag]> {
        match self {
            DebugPayload::Metadata(tags) => Some(tags),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&serde_json::Value> {
        match self {
            DebugPayload::Context(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_candidates(&self) -> Option<&[CandidateGroup]> {
        match self {
            DebugPayload::Candidates(groups) => Some(groups),
            _ => None,
        }
    }

    /// The `results` mapping of a context payload, when present
    pub fn context_results(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.as_context()?.get("results")?.as_object()
    }
}

/// A decoded debug payload located within the parsed transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugRecord {
    pub conversation_id: usize,
    /// Index of the source message within its conversation
    pub message_index: usize,
    pub kind: DebugKind,
    pub timestamp: NaiveDateTime,
    pub payload: DebugPayload,
}

impl DebugRecord {
    pub fn new(
        conversation_id: usize,
        message_index: usize,
        timestamp: NaiveDateTime,
        payload: DebugPayload,
    ) -> Self {
        Self {
            conversation_id,
            message_index,
            kind: payload.kind(),
            timestamp,
            payload,
        }
    }
}

/// Why a debug payload was dropped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadDecodeError {
    #[error("{kind:?} payload is not a valid literal: {source}")]
    Literal {
        kind: DebugKind,
        #[source]
        source: LiteralError,
    },

    #[error("{kind:?} payload has unexpected shape, expected {expected}")]
    UnexpectedShape {
        kind: DebugKind,
        expected: &'static str,
    },

    #[error("{kind:?} payload is missing key '{key}'")]
    MissingKey { kind: DebugKind, key: &'static str },
}

type TagDecoder = fn(&Literal) -> Option<Vec<ConceptTag>>;
type CandidateDecoder = fn(&Literal) -> Option<Candidate>;

/// Metadata shapes, in the order they are tried
const METADATA_DECODERS: [(&str, TagDecoder); 3] = [
    ("arrow_strings", decode_tag_strings),
    ("tag_records", decode_tag_records),
    ("category_mapping", decode_tag_mapping),
];

/// Candidate entry shapes, in the order they are tried
const CANDIDATE_DECODERS: [(&str, CandidateDecoder); 2] = [
    ("scored_string", decode_scored_string),
    ("scored_record", decode_scored_record),
];

/// `['Cuisine -> Italian', 'Mood -> Romantic']`
fn decode_tag_strings(literal: &Literal) -> Option<Vec<ConceptTag>> {
    literal
        .as_sequence()?
        .iter()
        .map(|item| item.as_str().map(ConceptTag::from_arrow))
        .collect()
}

/// `[{'category': 'Cuisine', 'value': 'Italian'}]`
fn decode_tag_records(literal: &Literal) -> Option<Vec<ConceptTag>> {
    literal
        .as_sequence()?
        .iter()
        .map(|item| {
            let category = item.get("category")?.as_str()?;
            let value = item
                .get("value")
                .or_else(|| item.get("concept"))?
                .as_str()?;
            Some(ConceptTag::new(category.trim(), value.trim()))
        })
        .collect()
}

/// `{'Cuisine': 'Italian', 'Mood': ['Romantic', 'Quiet']}`
fn decode_tag_mapping(literal: &Literal) -> Option<Vec<ConceptTag>> {
    let mut tags = Vec::new();
    for (key, value) in literal.as_dict()? {
        let category = key.as_str()?.trim();
        if let Some(single) = value.as_str() {
            tags.push(ConceptTag::new(category, single.trim()));
        } else {
            for item in value.as_sequence()? {
                tags.push(ConceptTag::new(category, item.as_str()?.trim()));
            }
        }
    }
    Some(tags)
}

/// `'0.91 -> Osteria Francescana'`; an unparseable score counts as 0.0
fn decode_scored_string(literal: &Literal) -> Option<Candidate> {
    let (score, name) = literal.as_str()?.split_once(ARROW)?;
    Some(Candidate {
        name: name.trim().to_string(),
        score: score.trim().parse().unwrap_or(0.0),
    })
}

/// `{'name': 'Osteria Francescana', 'score': 0.91}`
fn decode_scored_record(literal: &Literal) -> Option<Candidate> {
    let name = literal.get("name")?.as_str()?;
    let score = literal.get("score").and_then(Literal::as_f64).unwrap_or(0.0);
    Some(Candidate {
        name: name.trim().to_string(),
        score,
    })
}

fn parse_literal(kind: DebugKind, text: &str) -> Result<Literal, PayloadDecodeError> {
    Literal::parse(text).map_err(|source| PayloadDecodeError::Literal { kind, source })
}

/// Normalize a metadata literal into concept tags
pub fn decode_metadata(literal: &Literal) -> Result<Vec<ConceptTag>, PayloadDecodeError> {
    METADATA_DECODERS
        .iter()
        .find_map(|(shape, decode)| {
            let tags = decode(literal)?;
            tracing::trace!(shape = *shape, tags = tags.len(), "decoded metadata payload");
            Some(tags)
        })
        .ok_or(PayloadDecodeError::UnexpectedShape {
            kind: DebugKind::Metadata,
            expected: "a list of 'Category -> Value' strings, a list of records or a mapping",
        })
}

/// Validate a context literal; the mapping is kept verbatim as JSON
pub fn decode_context(literal: &Literal) -> Result<serde_json::Value, PayloadDecodeError> {
    if literal.as_dict().is_none() {
        return Err(PayloadDecodeError::UnexpectedShape {
            kind: DebugKind::Context,
            expected: "a mapping",
        });
    }
    Ok(literal.to_json())
}

/// Normalize a candidates literal into per-category scored candidates.
///
/// Categories whose value is not a list are skipped, as are entries no
/// candidate decoder accepts.
pub fn decode_candidates(literal: &Literal) -> Result<Vec<CandidateGroup>, PayloadDecodeError> {
    let kind = DebugKind::Candidates;
    if literal.as_dict().is_none() {
        return Err(PayloadDecodeError::UnexpectedShape {
            kind,
            expected: "a mapping",
        });
    }
    let results = literal
        .get("results")
        .ok_or(PayloadDecodeError::MissingKey {
            kind,
            key: "results",
        })?
        .as_dict()
        .ok_or(PayloadDecodeError::UnexpectedShape {
            kind,
            expected: "a 'results' mapping of category to candidates",
        })?;

    let mut groups = Vec::with_capacity(results.len());
    for (category, entries) in results {
        let Some(entries) = entries.as_sequence() else {
            continue;
        };
        let category = match category {
            Literal::Str(s) => s.clone(),
            other => other.to_string(),
        };
        let restaurants = entries
            .iter()
            .filter_map(|entry| {
                CANDIDATE_DECODERS
                    .iter()
                    .find_map(|(_, decode)| decode(entry))
            })
            .collect();
        groups.push(CandidateGroup {
            category,
            restaurants,
        });
    }
    Ok(groups)
}

/// Recognises debug markers and decodes their payloads
#[derive(Debug, Clone)]
pub struct DebugTraceExtractor {
    markers: [(DebugKind, String); 3],
}

impl DebugTraceExtractor {
    pub fn new(config: &TranscriptConfig) -> Self {
        Self {
            markers: [
                (DebugKind::Metadata, config.metadata_marker.clone()),
                (DebugKind::Context, config.context_marker.clone()),
                (DebugKind::Candidates, config.candidates_marker.clone()),
            ],
        }
    }

    /// Decode the payload of a debug message.
    ///
    /// Returns `Ok(None)` when the content carries none of the known markers.
    pub fn extract(&self, content: &str) -> Result<Option<DebugPayload>, PayloadDecodeError> {
        let Some((kind, payload_text)) = self.locate(content) else {
            return Ok(None);
        };

        let literal = parse_literal(kind, payload_text)?;
        let payload = match kind {
            DebugKind::Metadata => DebugPayload::Metadata(decode_metadata(&literal)?),
            DebugKind::Context => DebugPayload::Context(decode_context(&literal)?),
            DebugKind::Candidates => DebugPayload::Candidates(decode_candidates(&literal)?),
        };
        Ok(Some(payload))
    }

    /// Find the first matching marker and return the text following it,
    /// without the optional `:` separator.
    fn locate<'c>(&self, content: &'c str) -> Option<(DebugKind, &'c str)> {
        self.markers.iter().find_map(|(kind, marker)| {
            let start = content.find(marker.as_str())? + marker.len();
            let rest = content[start..].trim_start();
            let rest = rest.strip_prefix(':').unwrap_or(rest).trim();
            Some((*kind, rest))
        })
    }
}

impl Default for DebugTraceExtractor {
    fn default() -> Self {
        Self::new(&TranscriptConfig::default())
    }
}
