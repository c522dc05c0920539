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

// End-to-end tests: transcript text and persona CSV in, reports out.

use concierge_analyzer::ConciergeAnalyzer;
use concierge_core::{AnalyzerConfig, ConciergeError, MessageType};
use concierge_evals::ReferenceRestaurants;
use concierge_insights::GlobalInsightKind;
use proptest::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const PERSONAS: &str = "\
No.,PERSONA,Input,Anwar - Option 1,Anwar - Option 2,Anwar - Option 3
P1,Romantic couple,find me a romantic italian place,Osteria Francescana,Il Ristorante,
P2,Family brunch,brunch near the beach with kids,Praia Café,,
";

const TRANSCRIPT: &str = "\
[2024-03-01, 8:15:02 PM] Wagner: Find me a romantic Italian place
[2024-03-01, 8:15:04 PM] Concierge: Por favor, aguarde...
[2024-03-01, 8:15:09 PM] Concierge: [DEBUG] Metadados relacionados ['Cuisine -> Italian', 'Mood -> Romantic']
[2024-03-01, 8:15:20 PM] Concierge: [DEBUG] Restaurantes candidatos {'results': {'Italian': ['0.92 -> Osteria Francescana', '0.75 -> Trattoria Bella']}}
[2024-03-01, 8:15:30 PM] Concierge: Here are my picks:
- Osteria Francescana – tasting menu
- Trattoria Bella – cozy trattoria
[2024-03-01, 8:20:00 PM] Wagner: Any brunch near the beach with kids?
[2024-03-01, 8:20:05 PM] Concierge: [DEBUG] Metadados relacionados ['Cuisine -> Brunch', 'Mood -> Relaxed'
[2024-03-01, 8:20:30 PM] Concierge: ‎audio omitted
";

fn analyzer_with_personas() -> ConciergeAnalyzer {
    let mut analyzer = ConciergeAnalyzer::default();
    analyzer
        .load_personas_from_reader(PERSONAS.as_bytes())
        .expect("persona table loads");
    analyzer.parse(TRANSCRIPT).expect("transcript parses");
    analyzer
}

#[test]
fn test_exact_persona_match_scores_half() {
    let analyzer = analyzer_with_personas();
    let conversation = &analyzer.conversations()[0];

    let persona = conversation.persona.as_ref().expect("persona matched");
    assert_eq!(persona.id, "P1");
    assert_eq!(persona.description, "Romantic couple");

    let evaluation = conversation.evaluation().expect("evaluation attached");
    assert_eq!(evaluation.accuracy, 0.5);
    assert_eq!(evaluation.precision, 0.5);
    assert_eq!(evaluation.missing_count, 1);
    assert_eq!(evaluation.extra_count, 1);
    assert_eq!(
        evaluation.actual_recommendations,
        vec!["Osteria Francescana".to_string(), "Trattoria Bella".to_string()]
    );
}

#[test]
fn test_persona_without_recommendation_has_no_evaluation() {
    let analyzer = analyzer_with_personas();
    let conversation = &analyzer.conversations()[1];
    assert_eq!(conversation.persona.as_ref().map(|p| p.id.as_str()), Some("P2"));
    assert!(conversation.evaluation().is_none());
    assert!(conversation
        .messages
        .iter()
        .any(|m| m.is(MessageType::Audio)));
}

#[test]
fn test_metadata_payload_feeds_concept_graph() {
    let analyzer = analyzer_with_personas();
    let debug = &analyzer.conversations()[0].messages[2];
    let tags = debug
        .debug_info
        .as_ref()
        .and_then(|p| p.as_metadata())
        .expect("metadata decoded");
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].category, "Cuisine");
    assert_eq!(tags[1].value, "Romantic");

    let network = analyzer.generate_network_data();
    assert_eq!(network.concept_network.edges.len(), 2);
}

#[test]
fn test_malformed_payload_excluded_from_insights() {
    let analyzer = analyzer_with_personas();
    let broken = &analyzer.conversations()[1].messages[1];
    assert_eq!(broken.message_type, MessageType::Debug);
    assert!(broken.debug_info.is_none());

    let insights = analyzer.generate_global_insights();
    match &insights[0].kind {
        GlobalInsightKind::BasicStats {
            conversation_count,
            debug_message_count,
            unique_concepts,
            ..
        } => {
            assert_eq!(*conversation_count, 2);
            assert_eq!(*debug_message_count, 2);
            assert_eq!(*unique_concepts, 2);
        }
        other => panic!("unexpected insight: {other:?}"),
    }

    let err = analyzer.analyze_conversation_debug(1).unwrap_err();
    assert!(matches!(err, ConciergeError::NotFound { conversation_id: 1 }));
}

#[test]
fn test_analyze_personas_is_idempotent() {
    let mut analyzer = analyzer_with_personas();
    let before = analyzer.conversations().to_vec();
    assert_eq!(analyzer.analyze_personas(), 2);
    assert_eq!(analyzer.analyze_personas(), 2);
    assert_eq!(analyzer.conversations(), before.as_slice());
}

#[test]
fn test_personas_loaded_after_parse() {
    let mut analyzer = ConciergeAnalyzer::default();
    analyzer.parse(TRANSCRIPT).unwrap();
    assert!(analyzer.conversations()[0].persona.is_none());

    analyzer.load_personas_from_reader(PERSONAS.as_bytes()).unwrap();
    assert!(analyzer.conversations()[0].persona.is_some());
}

#[test]
fn test_reference_restaurants_reconcile_names() {
    let mut analyzer = analyzer_with_personas();
    analyzer.set_reference_restaurants(ReferenceRestaurants::from_sheet_names([
        "Sheet1",
        "OSTERIA FRANCESCANA",
        "Il Ristorante",
    ]));

    let evaluation = analyzer.conversations()[0].evaluation().unwrap();
    assert_eq!(evaluation.matched_expected.len(), 2);
    assert_eq!(evaluation.matched_expected[0].name, "OSTERIA FRANCESCANA");

    let records = analyzer.extract_restaurant_recommendations();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(
        record.matched_restaurants[0].reference_match.as_deref(),
        Some("OSTERIA FRANCESCANA")
    );
    assert_eq!(record.candidate_restaurants.len(), 2);
    assert_eq!(record.accuracy, Some(0.5));
    assert_eq!(
        analyzer.known_restaurants(),
        vec!["Il Ristorante".to_string(), "OSTERIA FRANCESCANA".to_string()]
    );
}

#[test]
fn test_known_restaurants_fall_back_to_personas() {
    let analyzer = analyzer_with_personas();
    assert_eq!(
        analyzer.known_restaurants(),
        vec![
            "Il Ristorante".to_string(),
            "Osteria Francescana".to_string(),
            "Praia Café".to_string()
        ]
    );
}

#[test]
fn test_metrics_and_summaries() {
    let analyzer = analyzer_with_personas();
    let metrics = analyzer.get_conversation_metrics();
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].time_to_processing, Some(2.0));
    assert_eq!(metrics[0].time_to_recommendation, Some(28.0));
    assert_eq!(metrics[0].metadata_count, 2);
    assert_eq!(metrics[0].persona_id.as_deref(), Some("P1"));
    assert_eq!(metrics[0].recommendation_accuracy, Some(0.5));
    assert_eq!(metrics[1].debug_count, 1);

    let summaries = analyzer.conversation_summaries();
    assert_eq!(summaries[1].recommendation, "No recommendation");

    let summary = analyzer.persona_analysis_summary();
    assert_eq!(summary.persona_count, 2);
    assert_eq!(summary.matched_conversations, 2);
    assert_eq!(summary.avg_accuracy, 0.5);
    assert_eq!(summary.accuracy_distribution["26-50%"], 1);
}

#[test]
fn test_report_serializes() {
    let report = analyzer_with_personas().report();
    assert_eq!(report.conversation_count, 2);
    assert_eq!(report.message_count, 8);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["global_insights"][0]["type"], "basic_stats");
    assert_eq!(json["recommendations"][0]["persona"]["id"], "P1");
}

#[test]
fn test_personas_and_config_from_disk() {
    let mut personas = NamedTempFile::new().unwrap();
    personas.write_all(PERSONAS.as_bytes()).unwrap();

    let mut config_file = NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "[transcript]\nagent_sender = \"Wagner\"\n\n[personas]\nfuzzy_threshold = 0.5\n"
    )
    .unwrap();

    let config = AnalyzerConfig::from_file(config_file.path()).unwrap();
    assert_eq!(config.personas.fuzzy_threshold, 0.5);

    let mut analyzer = ConciergeAnalyzer::new(config);
    assert_eq!(analyzer.load_personas_from_path(personas.path()).unwrap(), 2);
    analyzer.parse(TRANSCRIPT).unwrap();
    assert_eq!(analyzer.persona_analysis_summary().matched_conversations, 2);
}

#[test]
fn test_invalid_timestamp_aborts_parse() {
    let mut analyzer = ConciergeAnalyzer::default();
    let err = analyzer
        .parse("[2024-03-01, 25:99:00 PM] Wagner: hi")
        .unwrap_err();
    assert!(matches!(err, ConciergeError::Format { index: 0, .. }));
}

fn conversation_text(index: usize, categories: &[&str], restaurants: &[&str]) -> String {
    let tags: Vec<String> = categories
        .iter()
        .map(|c| format!("'{c} -> {c}{index}'"))
        .collect();
    let bullets: String = restaurants.iter().map(|r| format!("- {r}\n")).collect();
    let minute = index % 60;
    format!(
        "[2024-03-01, 9:{minute:02}:00 PM] Wagner: request {index}\n\
         [2024-03-01, 9:{minute:02}:05 PM] Concierge: [DEBUG] Metadados relacionados [{}]\n\
         [2024-03-01, 9:{minute:02}:30 PM] Concierge: Picks:\n{bullets}",
        tags.join(", ")
    )
}

proptest! {
    #[test]
    fn prop_category_counts_equal_distinct_recommendations(
        conversations in proptest::collection::vec(
            (
                proptest::sample::subsequence(vec!["Cuisine", "Mood", "Meal"], 0..=3),
                proptest::collection::vec(prop_oneof![Just("Bella"), Just("Luna"), Just("Sol")], 0..5),
            ),
            1..8,
        )
    ) {
        let transcript: String = conversations
            .iter()
            .enumerate()
            .map(|(i, (categories, restaurants))| conversation_text(i, categories, restaurants))
            .collect();

        let mut analyzer = ConciergeAnalyzer::default();
        analyzer.parse(&transcript).unwrap();
        prop_assert_eq!(analyzer.conversations().len(), conversations.len());

        for category in ["Cuisine", "Mood", "Meal"] {
            let expected: usize = conversations
                .iter()
                .filter(|(categories, _)| categories.contains(&category))
                .map(|(_, restaurants)| {
                    let mut distinct = restaurants.clone();
                    distinct.sort();
                    distinct.dedup();
                    distinct.len()
                })
                .sum();
            let credited: usize = analyzer
                .insights()
                .category_restaurant_counts(category)
                .iter()
                .map(|(_, count)| count)
                .sum();
            prop_assert_eq!(credited, expected);
        }
    }
}
