//! Tolerant parsing of model responses into [`LlmAssessment`] values.
//!
//! Responses are asked for in a fixed `Summary:`/`Score:`/`Issues:`/
//! `Follow-Ups:` template but models drift. The parser salvages whatever
//! sections it can find and reports each deviation as a warning instead of
//! failing the assessment.

use crate::workflows::applicants::domain::LlmAssessment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Score,
    Issues,
    FollowUps,
}

pub(crate) fn parse_assessment(raw: &str) -> (LlmAssessment, Vec<String>) {
    let mut summary_lines: Vec<String> = Vec::new();
    let mut score_text: Option<String> = None;
    let mut issue_lines: Vec<String> = Vec::new();
    let mut follow_up_lines: Vec<String> = Vec::new();
    let mut current: Option<Section> = None;

    for line in raw.lines() {
        let trimmed = line.trim();
        if let Some(rest) = header(trimmed, "Summary:") {
            current = Some(Section::Summary);
            if !rest.is_empty() {
                summary_lines.push(rest.to_string());
            }
        } else if let Some(rest) = header(trimmed, "Score:") {
            current = Some(Section::Score);
            if !rest.is_empty() {
                score_text = Some(rest.to_string());
            }
        } else if let Some(rest) = header(trimmed, "Issues:") {
            current = Some(Section::Issues);
            if !rest.is_empty() {
                issue_lines.push(rest.to_string());
            }
        } else if let Some(rest) = header(trimmed, "Follow-Ups:") {
            current = Some(Section::FollowUps);
            if !rest.is_empty() {
                follow_up_lines.push(rest.to_string());
            }
        } else if !trimmed.is_empty() {
            match current {
                Some(Section::Summary) => summary_lines.push(trimmed.to_string()),
                Some(Section::Score) => {
                    if score_text.is_none() {
                        score_text = Some(trimmed.to_string());
                    }
                }
                Some(Section::Issues) => issue_lines.push(trimmed.to_string()),
                Some(Section::FollowUps) => follow_up_lines.push(trimmed.to_string()),
                None => {}
            }
        }
    }

    let mut warnings = Vec::new();

    let summary = summary_lines.join(" ");
    if summary.is_empty() {
        warnings.push("response contained no summary section".to_string());
    }

    let score = match &score_text {
        Some(text) => match extract_score(text) {
            Some(score) if (1..=10).contains(&score) => Some(score),
            Some(score) => {
                warnings.push(format!("score {score} outside the 1-10 range, left unset"));
                None
            }
            None => {
                warnings.push(format!("could not read a score from '{text}'"));
                None
            }
        },
        None => {
            warnings.push("response contained no score section".to_string());
            None
        }
    };

    let issues = split_issues(&issue_lines);
    let follow_ups: Vec<String> = follow_up_lines
        .iter()
        .map(|line| strip_bullet(line).to_string())
        .filter(|entry| !entry.is_empty())
        .collect();

    (
        LlmAssessment {
            summary,
            score,
            issues,
            follow_ups,
        },
        warnings,
    )
}

/// Case-insensitive header match, returning the remainder of the line.
fn header<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let head = line.get(..name.len())?;
    if head.eq_ignore_ascii_case(name) {
        Some(line[name.len()..].trim())
    } else {
        None
    }
}

/// First run of digits anywhere in the text, so "8/10" and "**9**" both
/// read cleanly.
fn extract_score(text: &str) -> Option<u8> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn split_issues(lines: &[String]) -> Vec<String> {
    let joined = lines
        .iter()
        .map(|line| strip_bullet(line))
        .collect::<Vec<_>>()
        .join(", ");
    let normalized = joined.trim();
    if normalized.is_empty() || normalized.eq_ignore_ascii_case("none") {
        return Vec::new();
    }
    normalized
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    for prefix in ["- ", "* ", "\u{2022} "] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return rest.trim();
        }
    }
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    trimmed
}
