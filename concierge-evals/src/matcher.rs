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

//! Persona matching
//!
//! A conversation is matched through its opening request. An exact,
//! case-insensitive match on the persona input phrase wins; otherwise the
//! first persona in table order whose input words mostly appear in the
//! request is taken, even when a later persona would overlap more.

use crate::persona::{Persona, PersonaTable};
use concierge_core::Conversation;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonaMatch<'a> {
    pub persona: &'a Persona,
    pub kind: MatchKind,
}

pub struct PersonaMatcher<'a> {
    table: &'a PersonaTable,
    threshold: f64,
}

impl<'a> PersonaMatcher<'a> {
    pub fn new(table: &'a PersonaTable, threshold: f64) -> Self {
        Self { table, threshold }
    }

    pub fn match_conversation(&self, conversation: &Conversation) -> Option<PersonaMatch<'a>> {
        let found = self.match_request(conversation.request()?);
        if let Some(found) = &found {
            debug!(
                conversation_id = conversation.id,
                persona = %found.persona.id,
                kind = ?found.kind,
                "Matched conversation to persona"
            );
        }
        found
    }

    pub fn match_request(&self, request: &str) -> Option<PersonaMatch<'a>> {
        let request = request.trim().to_lowercase();
        if request.is_empty() {
            return None;
        }

        let exact = self
            .table
            .iter()
            .find(|p| !p.input_phrase.is_empty() && p.input_phrase.to_lowercase() == request);
        if let Some(persona) = exact {
            return Some(PersonaMatch {
                persona,
                kind: MatchKind::Exact,
            });
        }

        let request_words: HashSet<&str> = request.split_whitespace().collect();
        self.table
            .iter()
            .find(|persona| self.is_fuzzy_match(&persona.input_phrase, &request_words))
            .map(|persona| PersonaMatch {
                persona,
                kind: MatchKind::Fuzzy,
            })
    }

    fn is_fuzzy_match(&self, input_phrase: &str, request_words: &HashSet<&str>) -> bool {
        let input = input_phrase.to_lowercase();
        let input_words: HashSet<&str> = input.split_whitespace().collect();
        if input_words.is_empty() {
            return false;
        }
        let common = input_words.intersection(request_words).count();
        common as f64 >= self.threshold * input_words.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PersonaTable {
        PersonaTable::new(vec![
            Persona::new("P1", "Romantic", "find me a romantic italian place", vec![]),
            Persona::new("P2", "Brunch", "brunch near the beach", vec![]),
            Persona::new("P3", "Brunch kids", "brunch near the beach with kids", vec![]),
            Persona::new("P4", "Blank", "   ", vec![]),
        ])
    }

    #[test]
    fn test_exact_match_ignores_case() {
        let table = table();
        let matcher = PersonaMatcher::new(&table, 0.7);
        let found = matcher.match_request("  Find me a Romantic Italian place ").unwrap();
        assert_eq!(found.persona.id, "P1");
        assert_eq!(found.kind, MatchKind::Exact);
    }

    #[test]
    fn test_fuzzy_first_match_wins() {
        let table = table();
        let matcher = PersonaMatcher::new(&table, 0.7);
        // P3 overlaps fully, but P2 comes first and clears the threshold
        let found = matcher
            .match_request("any brunch near the beach with kids please")
            .unwrap();
        assert_eq!(found.persona.id, "P2");
        assert_eq!(found.kind, MatchKind::Fuzzy);
    }

    #[test]
    fn test_threshold_boundary() {
        let table = PersonaTable::new(vec![Persona::new(
            "P1",
            "",
            "one two three four five six seven eight nine ten",
            vec![],
        )]);
        let matcher = PersonaMatcher::new(&table, 0.7);
        assert!(matcher
            .match_request("one two three four five six seven")
            .is_some());
        assert!(matcher
            .match_request("one two three four five six")
            .is_none());
    }

    #[test]
    fn test_blank_input_never_matches() {
        let table = PersonaTable::new(vec![Persona::new("P4", "", "   ", vec![])]);
        let matcher = PersonaMatcher::new(&table, 0.7);
        assert!(matcher.match_request("anything at all").is_none());
    }

    #[test]
    fn test_no_match() {
        let table = table();
        let matcher = PersonaMatcher::new(&table, 0.7);
        assert!(matcher.match_request("sushi downtown").is_none());
        assert!(matcher.match_request("").is_none());
    }
}
