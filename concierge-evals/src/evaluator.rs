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

//! Recommendation scoring against a persona's expected restaurants

use crate::equivalence::is_same_restaurant;
use crate::persona::Persona;
use crate::reference::ReferenceRestaurants;
use concierge_core::{
    extract_recommended_names, Conversation, PositionOutcome, RecommendationEvaluation,
};

/// Position score for an expected item found at `position`.
///
/// 1.0 at the expected rank, 0.67 anywhere inside the expected list's
/// length, 0.33 further out, 0 when missing.
pub fn position_score(expected_rank: usize, position: Option<usize>, expected_len: usize) -> f64 {
    match position {
        Some(p) if p == expected_rank => 1.0,
        Some(p) if p < expected_len => 0.67,
        Some(_) => 0.33,
        None => 0.0,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEvaluator<'a> {
    reference: Option<&'a ReferenceRestaurants>,
}

impl<'a> RecommendationEvaluator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile expected names against a reference list
    pub fn with_reference(mut self, reference: &'a ReferenceRestaurants) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Score the conversation's first recommendation message for `persona`
    pub fn evaluate_conversation(
        &self,
        persona: &Persona,
        conversation: &Conversation,
    ) -> RecommendationEvaluation {
        let actual = conversation
            .recommendation()
            .map(|m| extract_recommended_names(&m.content))
            .unwrap_or_default();
        self.evaluate(&persona.expected_recommendations, actual)
    }

    pub fn evaluate(&self, expected: &[String], actual: Vec<String>) -> RecommendationEvaluation {
        let mut matched_items = Vec::new();
        let mut position_analysis = Vec::with_capacity(expected.len());

        for (rank, wanted) in expected.iter().enumerate() {
            let position = actual.iter().position(|name| is_same_restaurant(wanted, name));
            if position.is_some() {
                matched_items.push(wanted.clone());
            }
            position_analysis.push(PositionOutcome {
                expected: wanted.clone(),
                found: position.is_some(),
                position,
                position_score: position_score(rank, position, expected.len()),
            });
        }

        let matches = matched_items.len();
        let ratio = |denominator: usize| {
            if denominator == 0 {
                0.0
            } else {
                matches as f64 / denominator as f64
            }
        };
        let recall = ratio(expected.len());

        let extra_recommendations = actual
            .iter()
            .filter(|name| !expected.iter().any(|wanted| is_same_restaurant(wanted, name)))
            .cloned()
            .collect();

        let matched_expected = match self.reference {
            Some(reference) if !reference.is_empty() => expected
                .iter()
                .map(|wanted| reference.reconcile_name(wanted))
                .collect(),
            _ => Vec::new(),
        };

        RecommendationEvaluation {
            expected_recommendations: expected.to_vec(),
            precision: ratio(actual.len()),
            extra_count: actual.len().saturating_sub(matches),
            missing_count: expected.len() - matches,
            actual_recommendations: actual,
            matched_items,
            extra_recommendations,
            position_analysis,
            accuracy: recall,
            recall,
            matched_expected,
        }
    }
}
