use crate::errors::AppError;

/// Accepts `+` followed by 8 to 15 digits, ignoring spaces and dashes.
pub fn normalize_whatsapp_number(raw: &str) -> Result<String, AppError> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    let digits = compact
        .strip_prefix('+')
        .ok_or_else(|| invalid_number(raw))?;

    if !(8..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid_number(raw));
    }
    Ok(compact)
}

/// Minimal shape check; deliverability is the email provider's problem.
pub fn validate_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        });
    if !valid || email.contains(char::is_whitespace) {
        return Err(AppError::Validation(format!("'{email}' is not a valid email address")));
    }
    Ok(email.to_string())
}

fn invalid_number(raw: &str) -> AppError {
    AppError::Validation(format!(
        "'{raw}' is not a valid WhatsApp number (expected international format, e.g. +919876543210)"
    ))
}
