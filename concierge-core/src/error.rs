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

//! Error types shared by the Concierge Analyzer crates.

use thiserror::Error;

/// Errors surfaced by the analysis pipeline.
///
/// Only `Format` aborts a transcript parse. Malformed debug payloads are
/// reported through [`PayloadDecodeError`](crate::debug_trace::PayloadDecodeError)
/// and recovered inside the parser.
#[derive(Debug, Error)]
pub enum ConciergeError {
    #[error("Invalid timestamp '{timestamp}' in message {index}: {reason}")]
    Format {
        index: usize,
        timestamp: String,
        reason: String,
    },

    #[error("No debug records found for conversation {conversation_id}")]
    NotFound { conversation_id: usize },

    #[error("Persona table error: {0}")]
    PersonaTable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConciergeError>;
