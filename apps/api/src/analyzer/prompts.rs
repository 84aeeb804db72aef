// LLM prompt constants for the resume analyzer.
// Reuses cross-cutting fragments from llm_client::prompts where they apply.

/// System prompt for resume analysis.
pub const ANALYZE_SYSTEM: &str = "You are an expert career coach and professional resume reviewer \
    for a top tech company. You conduct in-depth analyses of resumes against specific job descriptions.";

/// Analysis prompt template. Replace `{resume_text}` and `{jd_text}` before sending.
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"Conduct an in-depth analysis of the resume below against the job description.

Return a JSON object with this EXACT schema (no extra fields):
{
  "overall_score": 0,
  "categorical_scores": [
    { "category": "Keyword Alignment", "score": 0, "explanation": "" },
    { "category": "Experience Relevance", "score": 0, "explanation": "" },
    { "category": "Clarity & Formatting", "score": 0, "explanation": "" },
    { "category": "Impact & Quantifiable Results", "score": 0, "explanation": "" }
  ],
  "summary": "",
  "missing_keywords": [],
  "actionable_suggestions": [
    {
      "area": "Skills Section",
      "suggestion": "",
      "example": { "before": "", "after": "" }
    }
  ]
}

Rules:
- overall_score: a holistic 0-100 integer for the overall match.
- categorical_scores: exactly the four categories above, each scored 0-100 with a one or two sentence explanation.
- summary: a concise, professional summary of the resume's fit for the role.
- missing_keywords: crucial keywords from the job description that do not appear in the resume.
- actionable_suggestions: concrete changes. "area" names the section, e.g. "Skills Section",
  "Project Experience", "Work History - [Job Title]". "example.before" quotes the original text
  (empty when adding new content); "example.after" is the improved text.

--- RESUME ---
{resume_text}
---

--- JOB DESCRIPTION ---
{jd_text}
---"#;

/// System prompt for resume rewriting. Output is plain text, not JSON.
pub const IMPROVE_SYSTEM: &str = "You are an expert resume writer. \
    You rewrite resumes to apply specific reviewer suggestions while keeping the candidate's facts intact. \
    Respond with the full rewritten resume as plain text only. \
    Do NOT add commentary before or after the resume.";

/// Rewrite prompt template. Replace `{resume_text}`, `{suggestions}` and `{rules}` before sending.
pub const IMPROVE_PROMPT_TEMPLATE: &str = r#"Rewrite the resume below, applying every suggestion in the list.

{rules}

--- SUGGESTIONS ---
{suggestions}
---

--- RESUME ---
{resume_text}
---"#;
