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

//! Concierge Analyzer Core
//!
//! Transcript model, parsing and debug-trace decoding for concierge chat
//! exports.

pub mod config;
pub mod debug_trace;
pub mod error;
pub mod evaluation;
pub mod literal;
pub mod message;
pub mod recommendation;
pub mod transcript;

pub use config::{AnalyzerConfig, InsightConfig, PersonaConfig, TranscriptConfig};
pub use debug_trace::{
    Candidate, CandidateGroup, ConceptTag, DebugKind, DebugPayload, DebugRecord,
    DebugTraceExtractor, PayloadDecodeError,
};
pub use error::{ConciergeError, Result};
pub use evaluation::{PositionOutcome, ReconciledName, RecommendationEvaluation};
pub use literal::{Literal, LiteralError};
pub use message::{Conversation, Message, MessageType, PersonaRef};
pub use recommendation::extract_recommended_names;
pub use transcript::{ParsedTranscript, TranscriptParser};
