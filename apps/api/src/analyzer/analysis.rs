//! Resume analysis: scores a resume against a job description via the LLM.
//!
//! The model's reply is never trusted verbatim: it is read into `RawAnalysis`
//! (every field optional, scores as plain numbers) and then converted into a
//! `ResumeAnalysis` by `TryFrom`, which rejects anything out of shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::analyzer::prompts::{ANALYZE_PROMPT_TEMPLATE, ANALYZE_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

/// Resume text beyond this is truncated before prompting.
pub const MAX_RESUME_CHARS: usize = 30_000;
pub const MAX_JD_CHARS: usize = 20_000;

// ────────────────────────────────────────────────────────────────────────────
// Validated output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub overall_score: u8, // 0 – 100
    pub categorical_scores: Vec<CategoryScore>,
    pub summary: String,
    pub missing_keywords: Vec<String>,
    pub actionable_suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: u8,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub area: String,
    pub suggestion: String,
    pub example: Option<RewriteExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteExample {
    /// Original resume text; empty when the suggestion adds new content.
    pub before: String,
    pub after: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Raw model output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawAnalysis {
    pub overall_score: Option<f64>,
    pub categorical_scores: Option<Vec<RawCategoryScore>>,
    pub summary: Option<String>,
    pub missing_keywords: Option<Vec<String>>,
    pub actionable_suggestions: Option<Vec<RawSuggestion>>,
}

#[derive(Debug, Deserialize)]
pub struct RawCategoryScore {
    pub category: Option<String>,
    pub score: Option<f64>,
    pub explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSuggestion {
    pub area: Option<String>,
    pub suggestion: Option<String>,
    pub example: Option<RawExample>,
}

#[derive(Debug, Deserialize)]
pub struct RawExample {
    pub before: Option<String>,
    pub after: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisShapeError {
    #[error("missing field `{0}`")]
    Missing(&'static str),

    #[error("field `{0}` is blank")]
    Blank(&'static str),

    #[error("score `{field}` = {value} is outside 0..=100")]
    ScoreOutOfRange { field: &'static str, value: f64 },

    #[error("no categorical scores returned")]
    NoCategories,
}

impl TryFrom<RawAnalysis> for ResumeAnalysis {
    type Error = AnalysisShapeError;

    fn try_from(raw: RawAnalysis) -> Result<Self, Self::Error> {
        let overall_score = score(
            "overall_score",
            raw.overall_score
                .ok_or(AnalysisShapeError::Missing("overall_score"))?,
        )?;

        let categorical_scores = raw
            .categorical_scores
            .ok_or(AnalysisShapeError::Missing("categorical_scores"))?
            .into_iter()
            .map(|c| {
                Ok(CategoryScore {
                    category: required_text("categorical_scores.category", c.category)?,
                    score: score(
                        "categorical_scores.score",
                        c.score
                            .ok_or(AnalysisShapeError::Missing("categorical_scores.score"))?,
                    )?,
                    explanation: c.explanation.map(|e| e.trim().to_string()).unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, AnalysisShapeError>>()?;
        if categorical_scores.is_empty() {
            return Err(AnalysisShapeError::NoCategories);
        }

        let summary = required_text("summary", raw.summary)?;

        let mut missing_keywords: Vec<String> = raw
            .missing_keywords
            .unwrap_or_default()
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        let mut seen = std::collections::HashSet::new();
        missing_keywords.retain(|k| seen.insert(k.to_lowercase()));

        let actionable_suggestions = raw
            .actionable_suggestions
            .unwrap_or_default()
            .into_iter()
            .map(|s| {
                let example = s.example.and_then(|e| {
                    let after = e.after.map(|a| a.trim().to_string()).filter(|a| !a.is_empty())?;
                    Some(RewriteExample {
                        before: e.before.map(|b| b.trim().to_string()).unwrap_or_default(),
                        after,
                    })
                });
                Ok(Suggestion {
                    area: required_text("actionable_suggestions.area", s.area)?,
                    suggestion: required_text("actionable_suggestions.suggestion", s.suggestion)?,
                    example,
                })
            })
            .collect::<Result<Vec<_>, AnalysisShapeError>>()?;

        Ok(ResumeAnalysis {
            overall_score,
            categorical_scores,
            summary,
            missing_keywords,
            actionable_suggestions,
        })
    }
}

fn score(field: &'static str, value: f64) -> Result<u8, AnalysisShapeError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(AnalysisShapeError::ScoreOutOfRange { field, value });
    }
    Ok(value.round() as u8)
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, AnalysisShapeError> {
    let value = value.ok_or(AnalysisShapeError::Missing(field))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(AnalysisShapeError::Blank(field));
    }
    Ok(value.to_string())
}

/// Cuts `text` to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Scores `resume_text` against `jd_text`. A malformed model reply is a 422.
pub async fn analyze_resume(
    llm: &LlmClient,
    resume_text: &str,
    jd_text: &str,
) -> Result<ResumeAnalysis, AppError> {
    let prompt = ANALYZE_PROMPT_TEMPLATE
        .replace("{resume_text}", truncate_chars(resume_text.trim(), MAX_RESUME_CHARS))
        .replace("{jd_text}", truncate_chars(jd_text.trim(), MAX_JD_CHARS));

    let system = format!("{ANALYZE_SYSTEM} {JSON_ONLY_SYSTEM}");

    let raw = match llm.call_json::<RawAnalysis>(&prompt, &system).await {
        Ok(raw) => raw,
        Err(LlmError::Parse(e)) => {
            warn!("analysis reply was not valid JSON: {e}");
            return Err(AppError::UnprocessableEntity(
                "The analysis service returned a malformed result".to_string(),
            ));
        }
        Err(e) => return Err(AppError::Llm(format!("resume analysis failed: {e}"))),
    };

    ResumeAnalysis::try_from(raw).map_err(|e| {
        warn!("analysis reply rejected: {e}");
        AppError::UnprocessableEntity(format!(
            "The analysis service returned an invalid result: {e}"
        ))
    })
}
