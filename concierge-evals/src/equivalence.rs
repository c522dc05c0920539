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

//! Same-restaurant equivalence
//!
//! Restaurant names in recommendations, persona tables and candidate traces
//! rarely agree byte for byte ("The Grill Room" vs "grill room"). Two names are
//! treated as the same restaurant when, after case folding and trimming:
//!
//! 1. they are identical, or
//! 2. their word sets, minus [`STOP_WORDS`], share at least
//!    `min_overlap × |smaller set|` words, **unless** the longer name is more
//!    than `max_length_ratio` times longer and the whole shorter name is just
//!    one word of a multi-word longer name ("Parigi" vs "Bistrot Parigi").
//!
//! The relation is reflexive and symmetric but not transitive.

use std::collections::HashSet;

/// Words that never identify a restaurant on their own
pub const STOP_WORDS: &[&str] = &[
    "the",
    "restaurant",
    "café",
    "cafe",
    "bar",
    "grill",
    "bistro",
    "kitchen",
];

/// Rule table for [`is_same_restaurant`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquivalenceRules {
    pub stop_words: &'static [&'static str],
    /// Required share of the smaller filtered word set
    pub min_overlap: f64,
    /// Character-length ratio above which the embedded-word guard applies
    pub max_length_ratio: f64,
}

impl Default for EquivalenceRules {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS,
            min_overlap: 0.8,
            max_length_ratio: 1.5,
        }
    }
}

impl EquivalenceRules {
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();

        if a == b {
            return true;
        }

        let words_a = self.significant_words(&a);
        let words_b = self.significant_words(&b);
        if words_a.is_empty() || words_b.is_empty() {
            return false;
        }

        let shared = words_a.intersection(&words_b).count();
        let smaller = words_a.len().min(words_b.len());
        if (shared as f64) < smaller as f64 * self.min_overlap {
            return false;
        }

        let (len_a, len_b) = (a.chars().count(), b.chars().count());
        let (shorter, longer, shorter_len, longer_len) = if len_a < len_b {
            (&a, &b, len_a, len_b)
        } else {
            (&b, &a, len_b, len_a)
        };

        if longer_len as f64 > shorter_len as f64 * self.max_length_ratio {
            let longer_words: Vec<&str> = longer.split_whitespace().collect();
            if longer_words.len() > 1 && longer_words.contains(&shorter.as_str()) {
                return false;
            }
        }

        true
    }

    fn significant_words<'a>(&self, name: &'a str) -> HashSet<&'a str> {
        name.split_whitespace()
            .filter(|word| !self.stop_words.contains(word))
            .collect()
    }
}

/// Check two restaurant names with the default rules
pub fn is_same_restaurant(a: &str, b: &str) -> bool {
    EquivalenceRules::default().equivalent(a, b)
}
