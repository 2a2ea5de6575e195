//! Collapsed summary of an AI-authored review.
//!
//! Reviews are semi-structured markdown:
//!
//! ```text
//! **Decision:** Great choice
//! **👍 Pros**
//! - Hydrating
//! **👎 Cons**
//! - Pricey
//! ```
//!
//! A section starts at a heading line (one beginning with `**` or `#`) and runs
//! until the next heading or end of text. Missing sections yield empty fields.

use serde::{Deserialize, Serialize};

/// Maximum bullets kept per list in the collapsed view.
pub const MAX_KEY_POINTS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewKeyPoints {
    pub decision: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Decision,
    Pros,
    Cons,
    Other,
}

impl ReviewKeyPoints {
    pub fn extract(review: &str) -> Self {
        let mut decision: Option<Vec<&str>> = None;
        let mut pros: Option<Vec<&str>> = None;
        let mut cons: Option<Vec<&str>> = None;
        let mut current = Section::Other;

        for line in review.lines() {
            if let Some((section, inline)) = classify_heading(line) {
                current = section;
                // Only the first occurrence of each section counts.
                let slot = match section {
                    Section::Decision => &mut decision,
                    Section::Pros => &mut pros,
                    Section::Cons => &mut cons,
                    Section::Other => continue,
                };
                if slot.is_some() {
                    current = Section::Other;
                    continue;
                }
                *slot = Some(vec![inline]);
                continue;
            }

            let slot = match current {
                Section::Decision => &mut decision,
                Section::Pros => &mut pros,
                Section::Cons => &mut cons,
                Section::Other => continue,
            };
            if let Some(lines) = slot.as_mut() {
                lines.push(line);
            }
        }

        Self {
            decision: decision
                .map(|lines| lines.join("\n").trim().to_string())
                .unwrap_or_default(),
            pros: pros.map(|lines| bullets(&lines)).unwrap_or_default(),
            cons: cons.map(|lines| bullets(&lines)).unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.decision.is_empty() && self.pros.is_empty() && self.cons.is_empty()
    }
}

/// Returns the section a heading line opens, plus any text after the marker.
fn classify_heading(line: &str) -> Option<(Section, &str)> {
    let trimmed = line.trim_start();
    if !(trimmed.starts_with("**") || trimmed.starts_with('#')) {
        return None;
    }

    let body = trimmed.trim_start_matches(['*', '#', ' ']);

    if let Some(rest) = strip_prefix_ignore_case(body, "decision:") {
        return Some((Section::Decision, rest.trim_start_matches('*').trim()));
    }

    let (label, rest) = split_bold(body);
    let section = if label.contains('👍') || first_word_is(label, "pros") {
        Section::Pros
    } else if label.contains('👎') || first_word_is(label, "cons") {
        Section::Cons
    } else {
        Section::Other
    };
    Some((section, rest))
}

/// Split `"👍 Pros** trailing"` into `("👍 Pros", "trailing")`.
fn split_bold(body: &str) -> (&str, &str) {
    match body.find("**") {
        Some(end) => (&body[..end], body[end + 2..].trim()),
        None => (body, ""),
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

fn first_word_is(label: &str, word: &str) -> bool {
    label
        .split(|c: char| !c.is_alphabetic())
        .find(|w| !w.is_empty())
        .is_some_and(|w| w.eq_ignore_ascii_case(word))
}

fn bullets(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| line.trim().strip_prefix('-'))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .take(MAX_KEY_POINTS)
        .map(str::to_string)
        .collect()
}
