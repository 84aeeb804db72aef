//! Resume rewrite: applies accepted suggestions to the original resume text.

use crate::analyzer::analysis::{truncate_chars, Suggestion, MAX_RESUME_CHARS};
use crate::analyzer::prompts::{IMPROVE_PROMPT_TEMPLATE, IMPROVE_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::prompts::NO_FABRICATION_INSTRUCTION;
use crate::llm_client::LlmClient;

/// Renders suggestions as a numbered list for the rewrite prompt.
pub fn render_suggestions(suggestions: &[Suggestion]) -> String {
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let mut line = format!("{}. [{}] {}", i + 1, s.area, s.suggestion);
            if let Some(example) = &s.example {
                if example.before.is_empty() {
                    line.push_str(&format!("\n   Add: \"{}\"", example.after));
                } else {
                    line.push_str(&format!(
                        "\n   Replace: \"{}\"\n   With: \"{}\"",
                        example.before, example.after
                    ));
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rewrites `resume_text` with the given suggestions applied.
pub async fn improve_resume(
    llm: &LlmClient,
    resume_text: &str,
    suggestions: &[Suggestion],
) -> Result<String, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if suggestions.is_empty() {
        return Err(AppError::Validation(
            "at least one suggestion is required".to_string(),
        ));
    }

    let prompt = IMPROVE_PROMPT_TEMPLATE
        .replace("{rules}", NO_FABRICATION_INSTRUCTION)
        .replace("{suggestions}", &render_suggestions(suggestions))
        .replace("{resume_text}", truncate_chars(resume_text.trim(), MAX_RESUME_CHARS));

    let text = llm
        .call_text(&prompt, IMPROVE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("resume rewrite failed: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "The rewrite service returned an empty resume".to_string(),
        ));
    }
    Ok(text)
}
