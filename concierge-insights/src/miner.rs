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

//! Cross-conversation insight miner
//!
//! Built once from a parsed transcript. Metadata payloads feed the category
//! and concept counters and the concept graph; candidate payloads feed the
//! restaurant counter and the restaurant graph. Every projection is computed
//! from that state on demand.

use crate::counter::FrequencyCounter;
use crate::graph::{NodeKind, TypedGraph};
use crate::insight::{
    CategoryAssociation, CategoryConcepts, ConceptAssociation, ConceptEvolution, ConceptPair,
    ConversationDebugAnalysis, ConversationInsight, ConversationInsightKind,
    CrossRecommendationInsights, GlobalInsight, GlobalInsightKind, Network, NetworkData,
    NetworkEdge, NetworkNode, RestaurantCount, ScoredCandidate,
};
use concierge_core::{
    extract_recommended_names, CandidateGroup, ConceptTag, ConciergeError, Conversation,
    DebugPayload, DebugRecord, InsightConfig, Result,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use tracing::{debug, info};

pub struct InsightMiner {
    config: InsightConfig,
    requests: Vec<Option<String>>,
    /// Names extracted from each conversation's first recommendation
    recommendations: Vec<Vec<String>>,
    records: Vec<DebugRecord>,
    category_counts: FrequencyCounter<String>,
    concept_counts: FrequencyCounter<String>,
    restaurant_counts: FrequencyCounter<String>,
    /// Concepts per category, both in first-seen order
    category_concepts: Vec<(String, Vec<String>)>,
    category_slots: HashMap<String, usize>,
    /// Categorized tags per conversation, repeats included
    conversation_concepts: BTreeMap<usize, Vec<ConceptTag>>,
    concept_graph: TypedGraph,
    restaurant_graph: TypedGraph,
}

impl InsightMiner {
    pub fn build(conversations: &[Conversation], config: &InsightConfig) -> Self {
        let mut miner = Self {
            config: config.clone(),
            requests: conversations
                .iter()
                .map(|c| c.request().map(str::to_string))
                .collect(),
            recommendations: conversations
                .iter()
                .map(|c| {
                    c.recommendation()
                        .map(|m| extract_recommended_names(&m.content))
                        .unwrap_or_default()
                })
                .collect(),
            records: Vec::new(),
            category_counts: FrequencyCounter::new(),
            concept_counts: FrequencyCounter::new(),
            restaurant_counts: FrequencyCounter::new(),
            category_concepts: Vec::new(),
            category_slots: HashMap::new(),
            conversation_concepts: BTreeMap::new(),
            concept_graph: TypedGraph::new(),
            restaurant_graph: TypedGraph::new(),
        };

        let records: Vec<DebugRecord> = conversations
            .iter()
            .flat_map(Conversation::debug_records)
            .collect();
        for record in &records {
            match &record.payload {
                DebugPayload::Metadata(tags) => miner.add_metadata(record.conversation_id, tags),
                DebugPayload::Candidates(groups) => miner.add_candidates(groups),
                DebugPayload::Context(_) => {}
            }
        }
        miner.records = records;

        info!(
            conversations = miner.requests.len(),
            debug_records = miner.records.len(),
            categories = miner.category_counts.len(),
            concepts = miner.concept_counts.len(),
            restaurants = miner.restaurant_counts.len(),
            "Built insight miner"
        );
        miner
    }

    fn add_metadata(&mut self, conversation_id: usize, tags: &[ConceptTag]) {
        for tag in tags.iter().filter(|t| t.is_categorized()) {
            self.category_counts.increment(tag.category.clone());
            self.concept_counts.increment(tag.value.clone());

            let slot = match self.category_slots.get(&tag.category) {
                Some(&slot) => slot,
                None => {
                    self.category_slots
                        .insert(tag.category.clone(), self.category_concepts.len());
                    self.category_concepts.push((tag.category.clone(), Vec::new()));
                    self.category_concepts.len() - 1
                }
            };
            let concepts = &mut self.category_concepts[slot].1;
            if !concepts.contains(&tag.value) {
                concepts.push(tag.value.clone());
            }

            self.conversation_concepts
                .entry(conversation_id)
                .or_default()
                .push(tag.clone());

            let category = self.concept_graph.add_node(&tag.category, NodeKind::Category);
            let concept = self.concept_graph.add_node(&tag.value, NodeKind::Concept);
            self.concept_graph.add_edge(category, concept, None);
        }
    }

    fn add_candidates(&mut self, groups: &[CandidateGroup]) {
        for group in groups {
            let category = self
                .restaurant_graph
                .add_node(&group.category, NodeKind::Category);
            for candidate in &group.restaurants {
                self.restaurant_counts.increment(candidate.name.clone());
                let restaurant = self
                    .restaurant_graph
                    .add_node(&candidate.name, NodeKind::Restaurant);
                self.restaurant_graph
                    .add_edge(category, restaurant, Some(candidate.score));
            }
        }
    }

    pub fn conversation_count(&self) -> usize {
        self.requests.len()
    }

    pub fn debug_records(&self) -> &[DebugRecord] {
        &self.records
    }

    pub fn concept_graph(&self) -> &TypedGraph {
        &self.concept_graph
    }

    pub fn restaurant_graph(&self) -> &TypedGraph {
        &self.restaurant_graph
    }

    pub fn top_categories(&self, n: usize) -> Vec<(String, usize)> {
        self.category_counts.most_common(n)
    }

    pub fn top_concepts(&self, n: usize) -> Vec<(String, usize)> {
        self.concept_counts.most_common(n)
    }

    pub fn top_restaurants(&self, n: usize) -> Vec<(String, usize)> {
        self.restaurant_counts.most_common(n)
    }

    /// Categories in first-seen order, each with its concepts ranked by
    /// global frequency
    pub fn category_hierarchy(&self) -> Vec<CategoryConcepts> {
        self.category_concepts
            .iter()
            .map(|(category, concepts)| {
                let mut ranked: Vec<(String, usize)> = concepts
                    .iter()
                    .map(|concept| (concept.clone(), self.concept_counts.get(concept.as_str())))
                    .collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1));
                CategoryConcepts {
                    category: category.clone(),
                    concepts: ranked,
                }
            })
            .collect()
    }

    /// Concept pairs ranked by the number of conversations containing both
    pub fn concept_relationships(&self) -> Vec<ConceptPair> {
        let mut pairs: FrequencyCounter<(String, String)> = FrequencyCounter::new();
        for tags in self.conversation_concepts.values() {
            let unique: Vec<&ConceptTag> = tags.iter().collect::<BTreeSet<_>>().into_iter().collect();
            for (i, first) in unique.iter().enumerate() {
                for second in &unique[i + 1..] {
                    pairs.increment((first.label(), second.label()));
                }
            }
        }

        pairs
            .most_common(self.config.relationship_limit)
            .into_iter()
            .map(|((concept1, concept2), frequency)| ConceptPair {
                concept1,
                concept2,
                frequency,
            })
            .collect()
    }

    /// Debug records of one conversation in message order
    pub fn conversation_debug_sequence(&self, conversation_id: usize) -> Vec<&DebugRecord> {
        let mut sequence: Vec<&DebugRecord> = self
            .records
            .iter()
            .filter(|r| r.conversation_id == conversation_id)
            .collect();
        sequence.sort_by_key(|r| r.message_index);
        sequence
    }

    pub fn concept_evolution(&self, conversation_id: usize) -> ConceptEvolution {
        let mut evolution = ConceptEvolution::default();
        for record in self.conversation_debug_sequence(conversation_id) {
            match &record.payload {
                DebugPayload::Metadata(tags) => evolution.metadata = tags.clone(),
                DebugPayload::Context(_) => {
                    if let Some(results) = record.payload.context_results() {
                        evolution.context = results.clone();
                    }
                }
                DebugPayload::Candidates(groups) => evolution.candidates = groups.clone(),
            }
        }
        evolution
    }

    /// Fails with [`ConciergeError::NotFound`] when the conversation has no
    /// decoded debug records
    pub fn analyze_conversation_debug(&self, conversation_id: usize) -> Result<ConversationDebugAnalysis> {
        let debug_count = self.conversation_debug_sequence(conversation_id).len();
        if debug_count == 0 {
            return Err(ConciergeError::NotFound { conversation_id });
        }

        let evolution = self.concept_evolution(conversation_id);
        let mut insights = Vec::new();

        if !evolution.metadata.is_empty() {
            let mut per_category = FrequencyCounter::new();
            for tag in &evolution.metadata {
                per_category.increment(tag.category.clone());
            }
            let count = evolution.metadata.len();
            insights.push(ConversationInsight::new(
                "Initial Concepts",
                format!("Found {} initial concepts related to the request", count),
                ConversationInsightKind::MetadataSummary {
                    count,
                    categories: per_category.iter().map(|(k, c)| (k.clone(), c)).collect(),
                    top_categories: per_category
                        .most_common(self.config.conversation_top_categories),
                },
            ));
        }

        if !evolution.context.is_empty() {
            let categories: Vec<String> = evolution.context.keys().cloned().collect();
            let values_count = evolution
                .context
                .values()
                .filter_map(|v| v.as_array())
                .map(Vec::len)
                .sum();
            insights.push(ConversationInsight::new(
                "Refined Context",
                format!(
                    "Request was refined to {} context categories with {} total values",
                    categories.len(),
                    values_count
                ),
                ConversationInsightKind::ContextSummary {
                    categories,
                    values_count,
                },
            ));
        }

        if !evolution.candidates.is_empty() {
            insights.extend(self.candidate_insights(&evolution.candidates));
        }

        debug!(conversation_id, insights = insights.len(), "Analyzed conversation debug trace");

        Ok(ConversationDebugAnalysis {
            conversation_id,
            request: self.requests.get(conversation_id).cloned().flatten(),
            debug_count,
            concept_evolution: evolution,
            insights,
        })
    }

    fn candidate_insights(&self, groups: &[CandidateGroup]) -> [ConversationInsight; 2] {
        let total_candidates: usize = groups.iter().map(|g| g.restaurants.len()).sum();

        let mut avg_scores: Vec<(String, f64)> = groups
            .iter()
            .filter(|g| !g.restaurants.is_empty())
            .map(|g| {
                let sum: f64 = g.restaurants.iter().map(|r| r.score).sum();
                (g.category.clone(), sum / g.restaurants.len() as f64)
            })
            .collect();
        avg_scores.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut ranked: Vec<ScoredCandidate> = groups
            .iter()
            .flat_map(|g| {
                g.restaurants.iter().map(move |r| ScoredCandidate {
                    category: g.category.clone(),
                    name: r.name.clone(),
                    score: r.score,
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(self.config.conversation_top_candidates);

        [
            ConversationInsight::new(
                "Recommendation Candidates",
                format!(
                    "Found {} restaurant candidates across {} categories",
                    total_candidates,
                    groups.len()
                ),
                ConversationInsightKind::CandidatesSummary {
                    total_candidates,
                    category_count: groups.len(),
                    categories: groups.iter().map(|g| g.category.clone()).collect(),
                    candidate_distribution: groups
                        .iter()
                        .map(|g| (g.category.clone(), g.restaurants.len()))
                        .collect(),
                    avg_scores,
                },
            ),
            ConversationInsight::new(
                "Top Candidates by Score",
                "Highest scoring restaurant candidates across all categories",
                ConversationInsightKind::TopCandidates {
                    top_candidates: ranked,
                },
            ),
        ]
    }

    pub fn generate_global_insights(&self) -> Vec<GlobalInsight> {
        let n = self.config.top_n;
        let mut insights = vec![GlobalInsight::new(
            "Debug Data Overview",
            "Summary statistics about the debug information",
            GlobalInsightKind::BasicStats {
                conversation_count: self.conversation_count(),
                debug_message_count: self.records.len(),
                unique_categories: self.category_counts.len(),
                unique_concepts: self.concept_counts.len(),
                unique_restaurants: self.restaurant_counts.len(),
            },
        )];

        if !self.category_counts.is_empty() {
            insights.push(GlobalInsight::new(
                format!("Top {} Categories", n),
                "Most frequently used categories in debug data",
                GlobalInsightKind::CategoryDistribution {
                    categories: self.top_categories(n),
                },
            ));
        }

        if !self.concept_counts.is_empty() {
            insights.push(GlobalInsight::new(
                format!("Top {} Concepts", n),
                "Most frequently mentioned concepts in debug data",
                GlobalInsightKind::ConceptDistribution {
                    concepts: self.top_concepts(n),
                },
            ));
        }

        if !self.restaurant_counts.is_empty() {
            insights.push(GlobalInsight::new(
                format!("Top {} Restaurants", n),
                "Most frequently suggested restaurants",
                GlobalInsightKind::RestaurantDistribution {
                    restaurants: self.top_restaurants(n),
                },
            ));
        }

        let mut relationships = self.concept_relationships();
        if !relationships.is_empty() {
            relationships.truncate(n);
            insights.push(GlobalInsight::new(
                "Concept Co-occurrence Patterns",
                "Concepts that frequently appear together in the same conversation",
                GlobalInsightKind::ConceptRelationships { relationships },
            ));
        }

        if !self.category_concepts.is_empty() {
            let mut richness: Vec<(String, usize)> = self
                .category_concepts
                .iter()
                .map(|(category, concepts)| (category.clone(), concepts.len()))
                .collect();
            richness.sort_by(|a, b| b.1.cmp(&a.1));
            richness.truncate(n);
            insights.push(GlobalInsight::new(
                "Category Richness",
                "Number of unique concepts per category",
                GlobalInsightKind::CategoryRichness { richness },
            ));
        }

        insights
    }

    pub fn generate_network_data(&self) -> NetworkData {
        let cap = self.config.node_size_cap;

        let concept_nodes = self
            .concept_graph
            .nodes()
            .map(|(name, kind)| {
                let size = match kind {
                    NodeKind::Category => 10.0 + self.category_counts.get(name) as f64,
                    NodeKind::Concept => 5.0 + self.concept_counts.get(name) as f64 * 0.5,
                    NodeKind::Restaurant => 5.0,
                };
                let count = if self.concept_counts.contains(name) {
                    self.concept_counts.get(name)
                } else {
                    self.category_counts.get(name)
                };
                NetworkNode {
                    id: name.to_string(),
                    kind,
                    size: size.min(cap),
                    count,
                }
            })
            .collect();
        let concept_edges = self
            .concept_graph
            .edges()
            .into_iter()
            .map(|e| NetworkEdge {
                source: e.source.to_string(),
                target: e.target.to_string(),
                weight: None,
            })
            .collect();

        let restaurant_nodes = self
            .restaurant_graph
            .nodes()
            .map(|(name, kind)| {
                let size = match kind {
                    NodeKind::Category => 10.0,
                    NodeKind::Restaurant => 5.0 + self.restaurant_counts.get(name) as f64,
                    NodeKind::Concept => 5.0,
                };
                NetworkNode {
                    id: name.to_string(),
                    kind,
                    size: size.min(cap),
                    count: self.restaurant_counts.get(name),
                }
            })
            .collect();

        let top: HashSet<String> = self
            .restaurant_counts
            .most_common(self.config.edge_restaurant_limit)
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        let is_category =
            |name: &str| self.restaurant_graph.node_kind(name) == Some(NodeKind::Category);
        let restaurant_edges = self
            .restaurant_graph
            .edges()
            .into_iter()
            .filter(|e| {
                top.contains(e.source)
                    || top.contains(e.target)
                    || is_category(e.source)
                    || is_category(e.target)
            })
            .map(|e| NetworkEdge {
                source: e.source.to_string(),
                target: e.target.to_string(),
                weight: Some(e.weight.unwrap_or(1.0)),
            })
            .collect();

        NetworkData {
            concept_network: Network {
                nodes: concept_nodes,
                edges: concept_edges,
            },
            restaurant_network: Network {
                nodes: restaurant_nodes,
                edges: restaurant_edges,
            },
        }
    }

    /// Per-conversation co-occurrence tallies: (concept, restaurant) and
    /// (category, restaurant), each pair counted once per conversation
    fn association_tallies(
        &self,
    ) -> (
        FrequencyCounter<(ConceptTag, String)>,
        FrequencyCounter<(String, String)>,
    ) {
        let mut by_concept = FrequencyCounter::new();
        let mut by_category = FrequencyCounter::new();

        for (conversation_id, tags) in &self.conversation_concepts {
            let restaurants = distinct(
                self.recommendations
                    .get(*conversation_id)
                    .map(Vec::as_slice)
                    .unwrap_or_default(),
            );
            let tags = distinct(tags);
            let categories = distinct(tags.iter().map(|t| t.category.clone()).collect::<Vec<_>>().as_slice());

            for tag in &tags {
                for restaurant in &restaurants {
                    by_concept.increment((tag.clone(), restaurant.clone()));
                }
            }
            for category in &categories {
                for restaurant in &restaurants {
                    by_category.increment((category.clone(), restaurant.clone()));
                }
            }
        }

        (by_concept, by_category)
    }

    /// Restaurant counts credited to `category`, in first-seen order
    pub fn category_restaurant_counts(&self, category: &str) -> Vec<(String, usize)> {
        let (_, by_category) = self.association_tallies();
        by_category
            .iter()
            .filter(|((c, _), _)| c == category)
            .map(|((_, restaurant), count)| (restaurant.clone(), count))
            .collect()
    }

    pub fn cross_recommendation_insights(&self) -> CrossRecommendationInsights {
        let (by_concept, by_category) = self.association_tallies();

        let mut concept_restaurant_associations: Vec<ConceptAssociation> = group_by_key(&by_concept)
            .into_iter()
            .filter_map(|(tag, restaurants)| {
                let (restaurant, count) = restaurants.most_common(1).into_iter().next()?;
                Some(ConceptAssociation {
                    category: tag.category,
                    concept: tag.value,
                    restaurant,
                    count,
                })
            })
            .collect();
        concept_restaurant_associations.sort_by(|a, b| b.count.cmp(&a.count));
        concept_restaurant_associations.truncate(self.config.association_limit);

        let category_restaurant_associations = group_by_key(&by_category)
            .into_iter()
            .map(|(category, restaurants)| CategoryAssociation {
                category,
                top_restaurants: restaurants
                    .most_common(self.config.category_top_restaurants)
                    .into_iter()
                    .map(|(name, count)| RestaurantCount { name, count })
                    .collect(),
            })
            .collect();

        CrossRecommendationInsights {
            concept_restaurant_associations,
            category_restaurant_associations,
        }
    }
}

fn distinct<T: Clone + Eq + Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

/// Split `(key, restaurant)` counts into one counter per key, keys in
/// first-seen order
fn group_by_key<K: Clone + Eq + Hash>(
    pairs: &FrequencyCounter<(K, String)>,
) -> Vec<(K, FrequencyCounter<String>)> {
    let mut groups: Vec<(K, FrequencyCounter<String>)> = Vec::new();
    let mut slots: HashMap<K, usize> = HashMap::new();
    for ((key, restaurant), count) in pairs.iter() {
        let slot = *slots.entry(key.clone()).or_insert_with(|| {
            groups.push((key.clone(), FrequencyCounter::new()));
            groups.len() - 1
        });
        groups[slot].1.add(restaurant.clone(), count);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::TranscriptParser;

    const TRANSCRIPT: &str = "\
[2024-03-01, 8:15:02 PM] Wagner: Find me a romantic Italian place
[2024-03-01, 8:15:04 PM] Concierge: Por favor, aguarde...
[2024-03-01, 8:15:09 PM] Concierge: [DEBUG] Metadados relacionados ['Cuisine -> Italian', 'Mood -> Romantic', 'candlelight']
[2024-03-01, 8:15:12 PM] Concierge: [DEBUG] Contexto entendido {'results': {'Cuisine': ['Italian', 'Pasta'], 'Mood': ['Romantic']}}
[2024-03-01, 8:15:20 PM] Concierge: [DEBUG] Restaurantes candidatos {'results': {'Italian': ['0.92 -> Osteria Francescana', '0.75 -> Trattoria Bella'], 'Romantic': ['0.81 -> Osteria Francescana']}}
[2024-03-01, 8:15:30 PM] Concierge: Here are my picks:
- Osteria Francescana – tasting menu
- Trattoria Bella – cozy
[2024-03-01, 8:20:00 PM] Wagner: Something Italian for lunch
[2024-03-01, 8:20:09 PM] Concierge: [DEBUG] Metadados relacionados ['Cuisine -> Italian', 'Meal -> Lunch']
[2024-03-01, 8:20:30 PM] Concierge: Try these:
- Trattoria Bella – quick
[2024-03-01, 8:25:00 PM] Wagner: Anything?
[2024-03-01, 8:25:05 PM] Concierge: [DEBUG] Metadados relacionados ['Cuisine -> Italian'
";

    fn miner() -> InsightMiner {
        let parsed = TranscriptParser::default().parse(TRANSCRIPT).unwrap();
        InsightMiner::build(&parsed.conversations, &InsightConfig::default())
    }

    #[test]
    fn test_counters() {
        let miner = miner();
        assert_eq!(miner.conversation_count(), 3);
        assert_eq!(miner.debug_records().len(), 4);
        assert_eq!(
            miner.top_categories(10),
            vec![
                ("Cuisine".to_string(), 2),
                ("Mood".to_string(), 1),
                ("Meal".to_string(), 1)
            ]
        );
        assert_eq!(miner.top_concepts(1), vec![("Italian".to_string(), 2)]);
        assert_eq!(
            miner.top_restaurants(10),
            vec![
                ("Osteria Francescana".to_string(), 2),
                ("Trattoria Bella".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_concept_graph_skips_uncategorized() {
        let miner = miner();
        let graph = miner.concept_graph();
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_kind("candlelight"), None);
    }

    #[test]
    fn test_restaurant_graph_weights() {
        let miner = miner();
        let edges = miner.restaurant_graph().edges();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].source, "Italian");
        assert_eq!(edges[0].target, "Osteria Francescana");
        assert_eq!(edges[0].weight, Some(0.92));
    }

    #[test]
    fn test_category_hierarchy() {
        let hierarchy = miner().category_hierarchy();
        assert_eq!(hierarchy[0].category, "Cuisine");
        assert_eq!(hierarchy[0].concepts, vec![("Italian".to_string(), 2)]);
        assert_eq!(hierarchy.len(), 3);
    }

    #[test]
    fn test_concept_relationships_counted_per_conversation() {
        let relationships = miner().concept_relationships();
        assert_eq!(relationships.len(), 2);
        assert_eq!(relationships[0].concept1, "Cuisine: Italian");
        assert_eq!(relationships[0].concept2, "Mood: Romantic");
        assert_eq!(relationships[0].frequency, 1);
        assert_eq!(relationships[1].concept1, "Cuisine: Italian");
        assert_eq!(relationships[1].concept2, "Meal: Lunch");
    }

    #[test]
    fn test_cross_recommendations() {
        let miner = miner();
        let cross = miner.cross_recommendation_insights();

        let italian = &cross.concept_restaurant_associations[0];
        assert_eq!(italian.concept, "Italian");
        assert_eq!(italian.restaurant, "Trattoria Bella");
        assert_eq!(italian.count, 2);

        let cuisine = &cross.category_restaurant_associations[0];
        assert_eq!(cuisine.category, "Cuisine");
        assert_eq!(cuisine.top_restaurants[0].name, "Trattoria Bella");
        assert_eq!(cuisine.top_restaurants[0].count, 2);
        assert_eq!(cuisine.top_restaurants[1].count, 1);

        // Two conversations mention Cuisine: 2 + 1 distinct recommendations
        let total: usize = miner
            .category_restaurant_counts("Cuisine")
            .iter()
            .map(|(_, count)| count)
            .sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_analyze_conversation_debug() {
        let analysis = miner().analyze_conversation_debug(0).unwrap();
        assert_eq!(analysis.request.as_deref(), Some("Find me a romantic Italian place"));
        assert_eq!(analysis.debug_count, 3);
        assert_eq!(analysis.concept_evolution.metadata.len(), 3);
        assert_eq!(analysis.concept_evolution.context.len(), 2);
        assert_eq!(analysis.insights.len(), 4);

        match &analysis.insights[1].kind {
            ConversationInsightKind::ContextSummary { values_count, .. } => {
                assert_eq!(*values_count, 3)
            }
            other => panic!("unexpected insight: {other:?}"),
        }
        match &analysis.insights[3].kind {
            ConversationInsightKind::TopCandidates { top_candidates } => {
                assert_eq!(top_candidates.len(), 3);
                assert_eq!(top_candidates[0].score, 0.92);
                assert_eq!(top_candidates[1].category, "Romantic");
            }
            other => panic!("unexpected insight: {other:?}"),
        }
    }

    #[test]
    fn test_analyze_conversation_without_records() {
        let err = miner().analyze_conversation_debug(2).unwrap_err();
        assert!(matches!(err, ConciergeError::NotFound { conversation_id: 2 }));
        assert!(miner().analyze_conversation_debug(99).is_err());
    }

    #[test]
    fn test_global_insights() {
        let insights = miner().generate_global_insights();
        assert_eq!(insights.len(), 6);
        match &insights[0].kind {
            GlobalInsightKind::BasicStats {
                conversation_count,
                debug_message_count,
                unique_restaurants,
                ..
            } => {
                assert_eq!(*conversation_count, 3);
                assert_eq!(*debug_message_count, 4);
                assert_eq!(*unique_restaurants, 2);
            }
            other => panic!("unexpected insight: {other:?}"),
        }
        assert_eq!(insights[1].title, "Top 10 Categories");
    }

    #[test]
    fn test_network_data_sizes() {
        let network = miner().generate_network_data();
        let cuisine = &network.concept_network.nodes[0];
        assert_eq!(cuisine.id, "Cuisine");
        assert_eq!(cuisine.size, 12.0);
        assert_eq!(cuisine.count, 2);
        let italian = &network.concept_network.nodes[1];
        assert_eq!(italian.size, 6.0);
        assert_eq!(network.concept_network.edges.len(), 3);

        let osteria = network
            .restaurant_network
            .nodes
            .iter()
            .find(|n| n.id == "Osteria Francescana")
            .unwrap();
        assert_eq!(osteria.size, 7.0);
        assert_eq!(network.restaurant_network.edges.len(), 3);
    }

    #[test]
    fn test_node_size_capped() {
        let parsed = TranscriptParser::default().parse(TRANSCRIPT).unwrap();
        let config = InsightConfig {
            node_size_cap: 8.0,
            ..InsightConfig::default()
        };
        let network = InsightMiner::build(&parsed.conversations, &config).generate_network_data();
        assert!(network
            .concept_network
            .nodes
            .iter()
            .all(|n| n.size <= 8.0));
    }
}
