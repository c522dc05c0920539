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

//! # Concierge Persona Evaluation
//!
//! Matches conversations to reference personas and scores the restaurants
//! the concierge recommended against the ones each persona expects.
//!
//! ## Example
//!
//! ```rust,ignore
//! use concierge_evals::{PersonaMatcher, PersonaTable, RecommendationEvaluator};
//!
//! let table = PersonaTable::from_path("personas.csv", &config.personas)?;
//! let matcher = PersonaMatcher::new(&table, config.personas.fuzzy_threshold);
//! if let Some(found) = matcher.match_conversation(&conversation) {
//!     let evaluation = RecommendationEvaluator::new()
//!         .evaluate_conversation(found.persona, &conversation);
//! }
//! ```

pub mod equivalence;
pub mod evaluator;
pub mod matcher;
pub mod persona;
pub mod reference;
pub mod summary;

pub use equivalence::{is_same_restaurant, EquivalenceRules, STOP_WORDS};
pub use evaluator::{position_score, RecommendationEvaluator};
pub use matcher::{MatchKind, PersonaMatch, PersonaMatcher};
pub use persona::{Persona, PersonaTable};
pub use reference::ReferenceRestaurants;
pub use summary::PersonaAnalysisSummary;
