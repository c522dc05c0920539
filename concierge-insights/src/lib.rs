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

//! Concierge Insight Miner
//!
//! Cross-conversation analysis of the recommendation engine's debug trace:
//! frequency counters, concept and restaurant graphs, co-occurrence reports
//! and per-conversation debug summaries.

pub mod counter;
pub mod graph;
pub mod insight;
pub mod miner;

pub use counter::FrequencyCounter;
pub use graph::{EdgeRef, NodeKind, TypedGraph};
pub use insight::{
    CategoryAssociation, CategoryConcepts, ConceptAssociation, ConceptEvolution, ConceptPair,
    ConversationDebugAnalysis, ConversationInsight, ConversationInsightKind,
    CrossRecommendationInsights, GlobalInsight, GlobalInsightKind, Network, NetworkData,
    NetworkEdge, NetworkNode, RestaurantCount, ScoredCandidate,
};
pub use miner::InsightMiner;
