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

//! Concierge Analyzer
//!
//! Ties transcript parsing, persona evaluation and insight mining into one
//! owned analysis session.
//!
//! ```rust,ignore
//! use concierge_analyzer::ConciergeAnalyzer;
//!
//! let mut analyzer = ConciergeAnalyzer::new(config);
//! analyzer.load_personas_from_path("personas.csv")?;
//! analyzer.parse(&transcript)?;
//! let report = analyzer.report();
//! ```

pub mod analyzer;
pub mod metrics;
pub mod report;

pub use analyzer::ConciergeAnalyzer;
pub use metrics::{ConversationMetrics, ConversationSummary};
pub use report::{AnalysisReport, CandidateRestaurant, RecommendationRecord};
