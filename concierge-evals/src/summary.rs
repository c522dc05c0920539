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

//! Persona analysis summary across conversations

use concierge_core::Conversation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accuracy bucket labels with their inclusive upper bounds
const ACCURACY_BUCKETS: [(&str, f64); 4] = [
    ("0-25%", 0.25),
    ("26-50%", 0.5),
    ("51-75%", 0.75),
    ("76-100%", f64::INFINITY),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaAnalysisSummary {
    pub persona_count: usize,
    pub matched_conversations: usize,
    pub avg_accuracy: f64,
    pub avg_precision: f64,
    pub avg_recall: f64,
    pub accuracy_distribution: BTreeMap<String, usize>,
    /// Number of evaluated conversations per count of actual recommendations
    pub recommendation_counts: BTreeMap<usize, usize>,
}

impl PersonaAnalysisSummary {
    pub fn from_conversations(persona_count: usize, conversations: &[Conversation]) -> Self {
        let mut summary = Self {
            persona_count,
            accuracy_distribution: ACCURACY_BUCKETS
                .iter()
                .map(|(label, _)| (label.to_string(), 0))
                .collect(),
            ..Self::default()
        };

        let mut accuracies = Vec::new();
        let mut precisions = Vec::new();
        let mut recalls = Vec::new();

        for conversation in conversations.iter().filter(|c| c.persona.is_some()) {
            summary.matched_conversations += 1;
            let Some(evaluation) = conversation.evaluation() else {
                continue;
            };
            accuracies.push(evaluation.accuracy);
            precisions.push(evaluation.precision);
            recalls.push(evaluation.recall);
            *summary
                .recommendation_counts
                .entry(evaluation.actual_recommendations.len())
                .or_insert(0) += 1;
        }

        for accuracy in &accuracies {
            if let Some((label, _)) = ACCURACY_BUCKETS.iter().find(|(_, upper)| accuracy <= upper) {
                *summary
                    .accuracy_distribution
                    .entry(label.to_string())
                    .or_insert(0) += 1;
            }
        }

        summary.avg_accuracy = mean(&accuracies);
        summary.avg_precision = mean(&precisions);
        summary.avg_recall = mean(&recalls);
        summary
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
