//! Answer formatting.
//!
//! Splits raw generated text into the primary answer and labeled
//! supplementary sections for expandable display. The delimiter convention
//! is part of the template contract: a line of the form `[詳細:ラベル]`
//! (full-width colon accepted) starts a detail section that runs to the
//! next marker. Anything that does not parse as a marker stays in the main
//! answer; formatting never fails.

use serde::{Deserialize, Serialize};

/// One labeled supplementary section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailSection {
    /// Section label (e.g. "交通")
    pub label: String,

    /// Section body
    pub text: String,
}

/// A display-ready answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedAnswer {
    /// Primary answer text
    pub main: String,

    /// Supplementary sections in document order
    pub details: Vec<DetailSection>,
}

/// Parse a detail marker line; `None` when the line is ordinary text.
fn parse_marker(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let inner = trimmed
        .strip_prefix("[詳細:")
        .or_else(|| trimmed.strip_prefix("[詳細："))?;
    let label = inner.strip_suffix(']')?.trim();
    if label.is_empty() {
        return None;
    }
    Some(label)
}

/// Split raw generated text into main answer and detail sections.
pub fn format_answer(raw: &str) -> FormattedAnswer {
    let mut main_lines: Vec<&str> = Vec::new();
    let mut details: Vec<DetailSection> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in raw.lines() {
        if let Some(label) = parse_marker(line) {
            if let Some((label, lines)) = current.take() {
                details.push(DetailSection {
                    label,
                    text: lines.join("\n").trim().to_string(),
                });
            }
            current = Some((label.to_string(), Vec::new()));
        } else if let Some((_, ref mut lines)) = current {
            lines.push(line);
        } else {
            main_lines.push(line);
        }
    }

    if let Some((label, lines)) = current {
        details.push(DetailSection {
            label,
            text: lines.join("\n").trim().to_string(),
        });
    }

    FormattedAnswer {
        main: main_lines.join("\n").trim().to_string(),
        details,
    }
}
