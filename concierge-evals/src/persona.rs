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

//! Persona reference table
//!
//! Each persona pairs an input phrase a tester sends to the concierge with up
//! to three restaurants the concierge is expected to recommend. Tables are
//! loaded from CSV exports with a header row.

use concierge_core::config::{PersonaConfig, MAX_EXPECTED_RECOMMENDATIONS};
use concierge_core::{ConciergeError, PersonaRef, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// A reference test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub description: String,
    pub input_phrase: String,
    /// Ordered, at most three entries
    pub expected_recommendations: Vec<String>,
}

impl Persona {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        input_phrase: impl Into<String>,
        expected_recommendations: Vec<String>,
    ) -> Self {
        let mut expected_recommendations = expected_recommendations;
        expected_recommendations.truncate(MAX_EXPECTED_RECOMMENDATIONS);
        Self {
            id: id.into(),
            description: description.into(),
            input_phrase: input_phrase.into(),
            expected_recommendations,
        }
    }

    pub fn reference(&self) -> PersonaRef {
        PersonaRef {
            id: self.id.clone(),
            description: self.description.clone(),
        }
    }
}

/// Personas in table order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaTable {
    personas: Vec<Persona>,
}

/// Header positions of the configured columns
struct ColumnLayout {
    id: usize,
    description: Option<usize>,
    input: Option<usize>,
    options: Vec<usize>,
}

impl ColumnLayout {
    fn resolve(headers: &csv::StringRecord, config: &PersonaConfig) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let id = position(config.id_column.as_str()).ok_or_else(|| {
            ConciergeError::PersonaTable(format!("missing '{}' column", config.id_column))
        })?;

        let options: Vec<usize> = config
            .option_columns
            .iter()
            .take(MAX_EXPECTED_RECOMMENDATIONS)
            .filter_map(|name| position(name.as_str()))
            .collect();
        if options.is_empty() {
            warn!("Persona table has no expected recommendation columns");
        }

        Ok(Self {
            id,
            description: position(config.description_column.as_str()),
            input: position(config.input_column.as_str()),
            options,
        })
    }
}

fn cell(record: &csv::StringRecord, index: Option<usize>) -> &str {
    index.and_then(|i| record.get(i)).unwrap_or("")
}

impl PersonaTable {
    pub fn new(personas: Vec<Persona>) -> Self {
        Self { personas }
    }

    /// Read a persona table from CSV.
    ///
    /// Rows with an empty identifier and rows the CSV reader rejects are
    /// skipped. Fails only when the header row cannot be read or lacks the
    /// identifier column.
    pub fn from_reader<R: Read>(reader: R, config: &PersonaConfig) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| ConciergeError::PersonaTable(e.to_string()))?
            .clone();
        let layout = ColumnLayout::resolve(&headers, config)?;

        let mut personas = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!(row, error = %e, "Skipping unreadable persona row");
                    continue;
                }
            };

            let id = cell(&record, Some(layout.id));
            if id.is_empty() {
                debug!(row, "Skipping persona row without an identifier");
                continue;
            }

            let expected = layout
                .options
                .iter()
                .map(|&i| cell(&record, Some(i)))
                .filter(|option| !option.is_empty())
                .map(str::to_string)
                .collect();

            personas.push(Persona::new(
                id,
                cell(&record, layout.description),
                cell(&record, layout.input),
                expected,
            ));
        }

        info!(personas = personas.len(), "Loaded personas");
        Ok(Self::new(personas))
    }

    pub fn from_path<P: AsRef<Path>>(path: P, config: &PersonaConfig) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading personas");
        let file = File::open(path)?;
        Self::from_reader(file, config)
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Persona> {
        self.personas.iter()
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// Distinct expected recommendations across all personas, in first-seen
    /// order
    pub fn expected_restaurants(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for name in self
            .personas
            .iter()
            .flat_map(|p| p.expected_recommendations.iter())
        {
            if !seen.contains(&name.as_str()) {
                seen.push(name.as_str());
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a PersonaTable {
    type Item = &'a Persona;
    type IntoIter = std::slice::Iter<'a, Persona>;

    fn into_iter(self) -> Self::IntoIter {
        self.personas.iter()
    }
}
