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

//! Reference restaurant list used to reconcile extracted names

use crate::equivalence::is_same_restaurant;
use concierge_core::ReconciledName;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Workbook tab names that never name a restaurant
const NON_RESTAURANT_SHEETS: &[&str] = &[
    "sheet1", "sheet2", "sheet3", "sheet4", "sheet5", "index", "data", "info", "summary",
    "contents", "cover",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRestaurants {
    names: Vec<String>,
}

impl ReferenceRestaurants {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Build the list from spreadsheet tab names, dropping placeholder tabs,
    /// numeric names, `_`-prefixed names and single characters. The result is
    /// sorted.
    pub fn from_sheet_names<I, S>(sheet_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = sheet_names
            .into_iter()
            .filter_map(|name| {
                let name = name.as_ref().trim();
                is_restaurant_sheet(name).then(|| name.to_string())
            })
            .collect();
        names.sort();

        info!(restaurants = names.len(), "Extracted reference restaurants from sheet names");
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Reference name for `name`: a case-insensitive exact match first, then
    /// the first equivalent name.
    pub fn reconcile(&self, name: &str) -> Option<&str> {
        let folded = name.trim().to_lowercase();
        if folded.is_empty() {
            return None;
        }

        self.names
            .iter()
            .find(|candidate| candidate.trim().to_lowercase() == folded)
            .or_else(|| self.names.iter().find(|candidate| is_same_restaurant(name, candidate)))
            .map(String::as_str)
    }

    pub fn reconcile_name(&self, name: &str) -> ReconciledName {
        ReconciledName::new(name, self.reconcile(name).map(str::to_string))
    }
}

fn is_restaurant_sheet(name: &str) -> bool {
    let folded = name.to_lowercase();
    !NON_RESTAURANT_SHEETS.contains(&folded.as_str())
        && !name.chars().all(|c| c.is_numeric())
        && !name.starts_with('_')
        && name.chars().count() > 1
}
