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

//! Recommendation evaluation contracts
//!
//! Produced by `concierge-evals` and stored on the recommendation message of a
//! persona-matched conversation.

use serde::{Deserialize, Serialize};

/// Outcome for one expected recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionOutcome {
    pub expected: String,
    pub found: bool,
    /// Rank of the first equivalent actual recommendation
    pub position: Option<usize>,
    /// 1.0 same rank, 0.67 within the expected window, 0.33 further out, 0 missing
    pub position_score: f64,
}

/// A name paired with its match in the reference restaurant list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledName {
    pub extracted: String,
    pub reference_match: Option<String>,
    /// Reference name when matched, else the extracted name
    pub name: String,
}

impl ReconciledName {
    pub fn new(extracted: impl Into<String>, reference_match: Option<String>) -> Self {
        let extracted = extracted.into();
        let name = reference_match.clone().unwrap_or_else(|| extracted.clone());
        Self {
            extracted,
            reference_match,
            name,
        }
    }
}

/// Scores of the actual recommendations against a persona's expected ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEvaluation {
    pub expected_recommendations: Vec<String>,
    pub actual_recommendations: Vec<String>,
    pub matched_items: Vec<String>,
    pub extra_recommendations: Vec<String>,
    pub position_analysis: Vec<PositionOutcome>,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub extra_count: usize,
    pub missing_count: usize,
    /// Expected names reconciled against the reference list, when one is loaded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_expected: Vec<ReconciledName>,
}

impl RecommendationEvaluation {
    pub fn match_count(&self) -> usize {
        self.matched_items.len()
    }
}
