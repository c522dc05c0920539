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

//! Restaurant name extraction from recommendation messages
//!
//! Recommendations arrive as bullet lists:
//!
//! ```text
//! Here are my suggestions:
//! - Osteria Francescana – intimate tasting menu
//! - Trattoria Bella - family run
//! ```
//!
//! A name starts after `"- "` and is the shortest run of characters without a
//! colon that is followed by optional whitespace and then a dash, an en dash,
//! a line break, or the end of the text. Scanning resumes right after each
//! name, so a `" - description"` tail on the same line can itself be picked
//! up as a bullet.

const BULLET: &str = "- ";

/// Extract recommended restaurant names in order of appearance
pub fn extract_recommended_names(content: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut pos = 0;

    while let Some(offset) = content[pos..].find(BULLET) {
        let start = pos + offset + BULLET.len();
        match name_end(content, start) {
            Some(end) => {
                let name = content[start..end].trim();
                if !name.is_empty() {
                    names.push(name.to_string());
                }
                pos = end;
            }
            // Retry from the character after the dash
            None => pos = pos + offset + 1,
        }
        if pos >= content.len() {
            break;
        }
    }

    names
}

/// End offset of the shortest colon-free name starting at `start`
fn name_end(text: &str, start: usize) -> Option<usize> {
    let mut end = start;
    for c in text[start..].chars() {
        if c == ':' {
            return None;
        }
        end += c.len_utf8();
        if is_name_terminator(&text[end..]) {
            return Some(end);
        }
    }
    None
}

/// Whitespace followed by a dash or en dash, whitespace containing a line
/// break, or end of text
fn is_name_terminator(rest: &str) -> bool {
    if rest.is_empty() {
        return true;
    }
    for c in rest.chars() {
        if c == '\n' {
            return true;
        }
        if !c.is_whitespace() {
            return c == '-' || c == '–';
        }
    }
    false
}
