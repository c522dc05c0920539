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

//! Configuration for transcript parsing, persona matching and insight mining
//!
//! Every field has a default matching the concierge chat exports the analyzer
//! was built for, so an empty TOML file is a valid configuration.

use crate::error::{ConciergeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level analyzer configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub transcript: TranscriptConfig,
    #[serde(default)]
    pub personas: PersonaConfig,
    #[serde(default)]
    pub insights: InsightConfig,
}

/// How transcript lines are recognised and classified
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptConfig {
    /// Sender name of the agent issuing requests. Messages from this sender
    /// open conversations and are classified as user requests.
    #[serde(default = "default_agent_sender")]
    pub agent_sender: String,

    /// Phrases marking a "please wait" processing message (any language)
    #[serde(default = "default_processing_phrases")]
    pub processing_phrases: Vec<String>,

    /// Prefix every debug message starts with
    #[serde(default = "default_debug_prefix")]
    pub debug_prefix: String,

    /// Substring identifying an omitted audio attachment
    #[serde(default = "default_audio_marker")]
    pub audio_marker: String,

    /// chrono format string for the bracketed timestamp
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    #[serde(default = "default_metadata_marker")]
    pub metadata_marker: String,

    #[serde(default = "default_context_marker")]
    pub context_marker: String,

    #[serde(default = "default_candidates_marker")]
    pub candidates_marker: String,
}

/// Persona reference table layout and matching threshold
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PersonaConfig {
    #[serde(default = "default_id_column")]
    pub id_column: String,

    #[serde(default = "default_description_column")]
    pub description_column: String,

    #[serde(default = "default_input_column")]
    pub input_column: String,

    /// Ordered expected-recommendation columns (at most three are read)
    #[serde(default = "default_option_columns")]
    pub option_columns: Vec<String>,

    /// Minimum share of the persona's input words that must appear in the
    /// request for a fuzzy match
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
}

/// Limits applied when projecting insight miner state
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InsightConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_relationship_limit")]
    pub relationship_limit: usize,

    #[serde(default = "default_association_limit")]
    pub association_limit: usize,

    #[serde(default = "default_category_top_restaurants")]
    pub category_top_restaurants: usize,

    #[serde(default = "default_node_size_cap")]
    pub node_size_cap: f64,

    /// Restaurants ranked within this limit keep their edges in the
    /// rendered restaurant network
    #[serde(default = "default_edge_restaurant_limit")]
    pub edge_restaurant_limit: usize,

    #[serde(default = "default_conversation_top_candidates")]
    pub conversation_top_candidates: usize,

    #[serde(default = "default_conversation_top_categories")]
    pub conversation_top_categories: usize,
}

/// Maximum number of expected recommendations per persona
pub const MAX_EXPECTED_RECOMMENDATIONS: usize = 3;

// Default values
fn default_agent_sender() -> String {
    "Wagner".to_string()
}

fn default_processing_phrases() -> Vec<String> {
    vec!["Please, wait".to_string(), "Por favor, aguarde".to_string()]
}

fn default_debug_prefix() -> String {
    "[DEBUG]".to_string()
}

fn default_audio_marker() -> String {
    "audio omitted".to_string()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d, %I:%M:%S %p".to_string()
}

fn default_metadata_marker() -> String {
    "[DEBUG] Metadados relacionados".to_string()
}

fn default_context_marker() -> String {
    "[DEBUG] Contexto entendido".to_string()
}

fn default_candidates_marker() -> String {
    "[DEBUG] Restaurantes candidatos".to_string()
}

fn default_id_column() -> String {
    "No.".to_string()
}

fn default_description_column() -> String {
    "PERSONA".to_string()
}

fn default_input_column() -> String {
    "Input".to_string()
}

fn default_option_columns() -> Vec<String> {
    (1..=MAX_EXPECTED_RECOMMENDATIONS)
        .map(|i| format!("Anwar - Option {}", i))
        .collect()
}

fn default_fuzzy_threshold() -> f64 {
    0.7
}

fn default_top_n() -> usize {
    10
}

fn default_relationship_limit() -> usize {
    20
}

fn default_association_limit() -> usize {
    20
}

fn default_category_top_restaurants() -> usize {
    3
}

fn default_node_size_cap() -> f64 {
    30.0
}

fn default_edge_restaurant_limit() -> usize {
    30
}

fn default_conversation_top_candidates() -> usize {
    5
}

fn default_conversation_top_categories() -> usize {
    5
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            agent_sender: default_agent_sender(),
            processing_phrases: default_processing_phrases(),
            debug_prefix: default_debug_prefix(),
            audio_marker: default_audio_marker(),
            timestamp_format: default_timestamp_format(),
            metadata_marker: default_metadata_marker(),
            context_marker: default_context_marker(),
            candidates_marker: default_candidates_marker(),
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            description_column: default_description_column(),
            input_column: default_input_column(),
            option_columns: default_option_columns(),
            fuzzy_threshold: default_fuzzy_threshold(),
        }
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            relationship_limit: default_relationship_limit(),
            association_limit: default_association_limit(),
            category_top_restaurants: default_category_top_restaurants(),
            node_size_cap: default_node_size_cap(),
            edge_restaurant_limit: default_edge_restaurant_limit(),
            conversation_top_candidates: default_conversation_top_candidates(),
            conversation_top_categories: default_conversation_top_categories(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - CONCIERGE_AGENT_SENDER: sender name of the requesting agent (default: Wagner)
    /// - CONCIERGE_TIMESTAMP_FORMAT: chrono format of transcript timestamps
    /// - CONCIERGE_FUZZY_THRESHOLD: persona fuzzy match threshold (default: 0.7)
    /// - CONCIERGE_TOP_N: size of ranked insight lists (default: 10)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(sender) = std::env::var("CONCIERGE_AGENT_SENDER") {
            self.transcript.agent_sender = sender;
        }

        if let Ok(format) = std::env::var("CONCIERGE_TIMESTAMP_FORMAT") {
            self.transcript.timestamp_format = format;
        }

        if let Ok(threshold) = std::env::var("CONCIERGE_FUZZY_THRESHOLD") {
            if let Ok(val) = threshold.parse() {
                self.personas.fuzzy_threshold = val;
            }
        }

        if let Ok(top_n) = std::env::var("CONCIERGE_TOP_N") {
            if let Ok(val) = top_n.parse() {
                self.insights.top_n = val;
            }
        }
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.transcript.agent_sender.trim().is_empty() {
            return Err(ConciergeError::Config(
                "transcript.agent_sender must not be empty".to_string(),
            ));
        }
        if self.transcript.timestamp_format.is_empty() {
            return Err(ConciergeError::Config(
                "transcript.timestamp_format must not be empty".to_string(),
            ));
        }
        let threshold = self.personas.fuzzy_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConciergeError::Config(format!(
                "personas.fuzzy_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        Ok(())
    }
}
