// Shared prompt fragments. Each feature that calls the model keeps its own
// prompts.rs alongside it and composes these where needed.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps model edits faithful to the candidate's actual history.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Never invent employers, dates, degrees, metrics or technologies \
    that do not appear in the resume. Rephrase and reorganise what is there; \
    where a suggestion needs facts the resume lacks, leave a bracketed placeholder \
    such as [add metric] instead of guessing.";
