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

//! Recommendation and full-analysis reports

use crate::metrics::ConversationMetrics;
use concierge_core::{
    extract_recommended_names, Conversation, DebugPayload, PersonaRef, ReconciledName,
};
use concierge_evals::{PersonaAnalysisSummary, ReferenceRestaurants};
use concierge_insights::{CrossRecommendationInsights, GlobalInsight, NetworkData};
use serde::Serialize;

/// A candidate from the engine's debug trace, reconciled against the
/// reference list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRestaurant {
    pub category: String,
    #[serde(flatten)]
    pub restaurant: ReconciledName,
}

/// What one conversation recommended and how it compares to the persona
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRecord {
    pub conversation_id: usize,
    pub request: String,
    /// Names as extracted from the recommendation bullets
    pub potential_restaurants: Vec<String>,
    pub matched_restaurants: Vec<ReconciledName>,
    pub candidate_restaurants: Vec<CandidateRestaurant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<PersonaRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub expected_restaurants: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_expected: Vec<ReconciledName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    pub full_recommendation: String,
}

impl RecommendationRecord {
    /// `None` when the conversation has no recommendation message
    pub fn from_conversation(
        conversation: &Conversation,
        reference: &ReferenceRestaurants,
    ) -> Option<Self> {
        let recommendation = conversation.recommendation()?;
        let potential_restaurants = extract_recommended_names(&recommendation.content);
        let matched_restaurants = potential_restaurants
            .iter()
            .map(|name| reference.reconcile_name(name))
            .collect();

        let candidate_restaurants = conversation
            .messages
            .iter()
            .filter_map(|m| match &m.debug_info {
                Some(DebugPayload::Candidates(groups)) => Some(groups),
                _ => None,
            })
            .flatten()
            .flat_map(|group| {
                group.restaurants.iter().map(move |candidate| CandidateRestaurant {
                    category: group.category.clone(),
                    restaurant: reference.reconcile_name(&candidate.name),
                })
            })
            .collect();

        let evaluation = recommendation.recommendation_evaluation.as_ref();
        let expected_restaurants = evaluation
            .map(|e| e.expected_recommendations.clone())
            .unwrap_or_default();
        let matched_expected = if reference.is_empty() {
            Vec::new()
        } else {
            expected_restaurants
                .iter()
                .map(|name| reference.reconcile_name(name))
                .collect()
        };

        Some(Self {
            conversation_id: conversation.id,
            request: conversation
                .request()
                .unwrap_or("No request")
                .to_string(),
            potential_restaurants,
            matched_restaurants,
            candidate_restaurants,
            persona: conversation.persona.clone(),
            expected_restaurants,
            matched_expected,
            accuracy: evaluation.map(|e| e.accuracy),
            full_recommendation: recommendation.content.clone(),
        })
    }
}

/// Everything the analyzer computes for one transcript
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub conversation_count: usize,
    pub message_count: usize,
    pub metrics: Vec<ConversationMetrics>,
    pub recommendations: Vec<RecommendationRecord>,
    pub persona_summary: PersonaAnalysisSummary,
    pub global_insights: Vec<GlobalInsight>,
    pub network: NetworkData,
    pub cross_recommendations: CrossRecommendationInsights,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use concierge_core::{Candidate, CandidateGroup, Message, MessageType};

    fn conversation() -> Conversation {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(20, 15, 0)
            .unwrap();
        let mut candidates = Message::new(ts, "Concierge", "[DEBUG] ...", MessageType::Debug, 4);
        candidates.debug_info = Some(DebugPayload::Candidates(vec![CandidateGroup {
            category: "Italian".to_string(),
            restaurants: vec![Candidate {
                name: "osteria francescana".to_string(),
                score: 0.9,
            }],
        }]));
        Conversation::new(
            4,
            vec![
                candidates,
                Message::new(
                    ts,
                    "Concierge",
                    "- Osteria Francescana – tasting\n- Trattoria Bella – cozy",
                    MessageType::Recommendation,
                    4,
                ),
            ],
        )
    }

    #[test]
    fn test_record_reconciles_names() {
        let reference = ReferenceRestaurants::new(vec!["Osteria Francescana".to_string()]);
        let record = RecommendationRecord::from_conversation(&conversation(), &reference).unwrap();

        assert_eq!(record.conversation_id, 4);
        assert_eq!(record.request, "No request");
        assert_eq!(
            record.potential_restaurants,
            vec!["Osteria Francescana".to_string(), "Trattoria Bella".to_string()]
        );
        assert_eq!(
            record.matched_restaurants[0].reference_match.as_deref(),
            Some("Osteria Francescana")
        );
        assert!(record.matched_restaurants[1].reference_match.is_none());
        assert_eq!(record.candidate_restaurants.len(), 1);
        assert_eq!(record.candidate_restaurants[0].restaurant.name, "Osteria Francescana");
        assert!(record.accuracy.is_none());
    }

    #[test]
    fn test_no_recommendation_no_record() {
        let conversation = Conversation::new(0, Vec::new());
        assert!(RecommendationRecord::from_conversation(&conversation, &ReferenceRestaurants::default()).is_none());
    }
}
