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

//! Analysis session over one transcript
//!
//! The analyzer owns everything derived from a transcript: conversations,
//! debug records, the insight miner, and the persona and reference tables
//! the conversations are evaluated against. Build one per transcript.

use crate::metrics::{ConversationMetrics, ConversationSummary};
use crate::report::{AnalysisReport, RecommendationRecord};
use concierge_core::{AnalyzerConfig, Conversation, DebugRecord, Result, TranscriptParser};
use concierge_evals::{
    PersonaAnalysisSummary, PersonaMatcher, PersonaTable, RecommendationEvaluator,
    ReferenceRestaurants,
};
use concierge_insights::{
    ConversationDebugAnalysis, CrossRecommendationInsights, GlobalInsight, InsightMiner,
    NetworkData,
};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub struct ConciergeAnalyzer {
    config: AnalyzerConfig,
    parser: TranscriptParser,
    conversations: Vec<Conversation>,
    debug_records: Vec<DebugRecord>,
    miner: InsightMiner,
    personas: Option<PersonaTable>,
    reference: ReferenceRestaurants,
}

impl Default for ConciergeAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl ConciergeAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let parser = TranscriptParser::new(config.transcript.clone());
        let miner = InsightMiner::build(&[], &config.insights);
        Self {
            config,
            parser,
            conversations: Vec::new(),
            debug_records: Vec::new(),
            miner,
            personas: None,
            reference: ReferenceRestaurants::default(),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Parse a transcript, replacing any previous one. Conversations are
    /// evaluated right away when personas are loaded.
    pub fn parse(&mut self, transcript: &str) -> Result<&[Conversation]> {
        let parsed = self.parser.parse(transcript)?;
        self.conversations = parsed.conversations;
        self.debug_records = parsed.debug_records;
        self.miner = InsightMiner::build(&self.conversations, &self.config.insights);

        if self.personas.is_some() {
            self.analyze_personas();
        }
        Ok(&self.conversations)
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn conversation(&self, conversation_id: usize) -> Option<&Conversation> {
        self.conversations.get(conversation_id)
    }

    pub fn debug_records(&self) -> &[DebugRecord] {
        &self.debug_records
    }

    pub fn insights(&self) -> &InsightMiner {
        &self.miner
    }

    pub fn personas(&self) -> Option<&PersonaTable> {
        self.personas.as_ref()
    }

    /// Install a persona table; returns the number of personas
    pub fn load_personas(&mut self, table: PersonaTable) -> usize {
        let count = table.len();
        self.personas = Some(table);
        if !self.conversations.is_empty() {
            self.analyze_personas();
        }
        count
    }

    pub fn load_personas_from_reader<R: Read>(&mut self, reader: R) -> Result<usize> {
        let table = PersonaTable::from_reader(reader, &self.config.personas)?;
        Ok(self.load_personas(table))
    }

    pub fn load_personas_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let table = PersonaTable::from_path(path, &self.config.personas)?;
        Ok(self.load_personas(table))
    }

    pub fn reference_restaurants(&self) -> &ReferenceRestaurants {
        &self.reference
    }

    pub fn set_reference_restaurants(&mut self, reference: ReferenceRestaurants) {
        self.reference = reference;
        if self.personas.is_some() && !self.conversations.is_empty() {
            self.analyze_personas();
        }
    }

    /// Attach persona and evaluation annotations; returns the number of
    /// matched conversations. Earlier annotations are discarded first.
    pub fn analyze_personas(&mut self) -> usize {
        let Some(table) = &self.personas else {
            warn!("No persona data loaded, skipping persona analysis");
            return 0;
        };

        let matcher = PersonaMatcher::new(table, self.config.personas.fuzzy_threshold);
        let evaluator = RecommendationEvaluator::new().with_reference(&self.reference);

        let mut matched = 0;
        for conversation in &mut self.conversations {
            conversation.clear_annotations();
            let Some(found) = matcher.match_conversation(conversation) else {
                continue;
            };
            matched += 1;

            let evaluation = conversation
                .recommendation()
                .is_some()
                .then(|| evaluator.evaluate_conversation(found.persona, conversation));
            conversation.persona = Some(found.persona.reference());
            if let (Some(evaluation), Some(message)) = (evaluation, conversation.recommendation_mut()) {
                message.recommendation_evaluation = Some(evaluation);
            }
        }

        info!(
            conversations = self.conversations.len(),
            matched,
            "Persona analysis complete"
        );
        matched
    }

    pub fn get_conversation_metrics(&self) -> Vec<ConversationMetrics> {
        let agent = self.config.transcript.agent_sender.as_str();
        self.conversations
            .iter()
            .map(|c| ConversationMetrics::from_conversation(c, agent))
            .collect()
    }

    pub fn extract_restaurant_recommendations(&self) -> Vec<RecommendationRecord> {
        self.conversations
            .iter()
            .filter_map(|c| RecommendationRecord::from_conversation(c, &self.reference))
            .collect()
    }

    pub fn conversation_summaries(&self) -> Vec<ConversationSummary> {
        self.conversations
            .iter()
            .map(ConversationSummary::from_conversation)
            .collect()
    }

    pub fn persona_analysis_summary(&self) -> PersonaAnalysisSummary {
        let persona_count = self.personas.as_ref().map_or(0, PersonaTable::len);
        PersonaAnalysisSummary::from_conversations(persona_count, &self.conversations)
    }

    /// Reference restaurant names, or the personas' expected restaurants
    /// when no reference list is loaded
    pub fn known_restaurants(&self) -> Vec<String> {
        if !self.reference.is_empty() {
            return self.reference.names().to_vec();
        }
        let mut names: Vec<String> = self
            .personas
            .iter()
            .flat_map(|table| table.expected_restaurants())
            .filter(|name| name.chars().count() > 2)
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn generate_global_insights(&self) -> Vec<GlobalInsight> {
        self.miner.generate_global_insights()
    }

    pub fn generate_network_data(&self) -> NetworkData {
        self.miner.generate_network_data()
    }

    pub fn get_cross_recommendations_insights(&self) -> CrossRecommendationInsights {
        self.miner.cross_recommendation_insights()
    }

    pub fn analyze_conversation_debug(&self, conversation_id: usize) -> Result<ConversationDebugAnalysis> {
        self.miner.analyze_conversation_debug(conversation_id)
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            conversation_count: self.conversations.len(),
            message_count: self.conversations.iter().map(Conversation::len).sum(),
            metrics: self.get_conversation_metrics(),
            recommendations: self.extract_restaurant_recommendations(),
            persona_summary: self.persona_analysis_summary(),
            global_insights: self.generate_global_insights(),
            network: self.generate_network_data(),
            cross_recommendations: self.get_cross_recommendations_insights(),
        }
    }
}
