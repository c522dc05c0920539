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

//! Insight report types
//!
//! Every insight serializes as `{"type", "title", "description", "data"}`.

use crate::graph::NodeKind;
use concierge_core::{CandidateGroup, ConceptTag};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate insight over all conversations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalInsight {
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: GlobalInsightKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GlobalInsightKind {
    BasicStats {
        conversation_count: usize,
        debug_message_count: usize,
        unique_categories: usize,
        unique_concepts: usize,
        unique_restaurants: usize,
    },
    CategoryDistribution {
        categories: Vec<(String, usize)>,
    },
    ConceptDistribution {
        concepts: Vec<(String, usize)>,
    },
    RestaurantDistribution {
        restaurants: Vec<(String, usize)>,
    },
    ConceptRelationships {
        relationships: Vec<ConceptPair>,
    },
    /// Distinct concepts per category
    CategoryRichness {
        richness: Vec<(String, usize)>,
    },
}

impl GlobalInsight {
    pub fn new(title: impl Into<String>, description: impl Into<String>, kind: GlobalInsightKind) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind,
        }
    }
}

/// Two concepts seen in the same conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptPair {
    pub concept1: String,
    pub concept2: String,
    /// Number of conversations containing both
    pub frequency: usize,
}

/// A category with its concepts ranked by global frequency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryConcepts {
    pub category: String,
    pub concepts: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub size: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Network {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
}

/// Render-ready concept and restaurant networks
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkData {
    pub concept_network: Network,
    pub restaurant_network: Network,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptAssociation {
    pub category: String,
    pub concept: String,
    pub restaurant: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestaurantCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAssociation {
    pub category: String,
    pub top_restaurants: Vec<RestaurantCount>,
}

/// Which restaurants were recommended alongside which concepts.
///
/// Every concept of a conversation is credited with every restaurant that
/// conversation recommended; this is co-occurrence, not attribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrossRecommendationInsights {
    pub concept_restaurant_associations: Vec<ConceptAssociation>,
    pub category_restaurant_associations: Vec<CategoryAssociation>,
}

/// Latest state of each debug stage within one conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConceptEvolution {
    pub metadata: Vec<ConceptTag>,
    pub context: serde_json::Map<String, serde_json::Value>,
    pub candidates: Vec<CandidateGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub category: String,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationInsight {
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: ConversationInsightKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ConversationInsightKind {
    MetadataSummary {
        count: usize,
        categories: BTreeMap<String, usize>,
        top_categories: Vec<(String, usize)>,
    },
    ContextSummary {
        categories: Vec<String>,
        values_count: usize,
    },
    CandidatesSummary {
        total_candidates: usize,
        category_count: usize,
        categories: Vec<String>,
        candidate_distribution: Vec<(String, usize)>,
        avg_scores: Vec<(String, f64)>,
    },
    TopCandidates {
        top_candidates: Vec<ScoredCandidate>,
    },
}

impl ConversationInsight {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        kind: ConversationInsightKind,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind,
        }
    }
}

/// Debug analysis of a single conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationDebugAnalysis {
    pub conversation_id: usize,
    pub request: Option<String>,
    pub debug_count: usize,
    pub concept_evolution: ConceptEvolution,
    pub insights: Vec<ConversationInsight>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_insight_json_shape() {
        let insight = GlobalInsight::new(
            "Top 10 Categories",
            "Most frequently used categories in debug data",
            GlobalInsightKind::CategoryDistribution {
                categories: vec![("Cuisine".to_string(), 2)],
            },
        );
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "category_distribution");
        assert_eq!(json["title"], "Top 10 Categories");
        assert_eq!(json["data"]["categories"][0][0], "Cuisine");
        assert_eq!(json["data"]["categories"][0][1], 2);
    }

    #[test]
    fn test_network_edge_weight_omitted_when_absent() {
        let edge = NetworkEdge {
            source: "Cuisine".into(),
            target: "Italian".into(),
            weight: None,
        };
        let json = serde_json::to_value(&edge).unwrap();
        assert!(json.get("weight").is_none());
    }
}
