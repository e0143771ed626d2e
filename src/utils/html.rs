// src/utils/html.rs

use std::collections::BTreeMap;

use crate::error::AppError;

/// Sanitises user-authored text that other users' browsers will render
/// (quiz descriptions, question prompts and options).
///
/// Text without any markup is kept exactly as written, so `2 < 3 & 4 > 1`
/// is not turned into entities. Text that does contain markup goes
/// through the ammonia whitelist: harmless markup such as <b> survives,
/// <script> and event-handler attributes are stripped along with their
/// content.
pub fn clean_html(input: &str) -> String {
    if ammonia::is_html(input) {
        ammonia::clean(input)
    } else {
        input.to_string()
    }
}

pub fn clean_optional(input: Option<String>) -> Option<String> {
    input.map(|text| clean_html(&text))
}

/// Cleans a mandatory field. Input that was nothing but stripped markup
/// is rejected instead of being stored empty.
pub fn clean_required(input: &str, field: &str) -> Result<String, AppError> {
    let cleaned = clean_html(input);
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(AppError::BadRequest(format!("{} must contain text", field)));
    }

    Ok(cleaned.to_string())
}

/// Cleans every option text, keeping the labels.
pub fn clean_options(options: BTreeMap<String, String>) -> Result<BTreeMap<String, String>, AppError> {
    options
        .into_iter()
        .map(|(label, text)| {
            let text = clean_required(&text, &format!("Option '{}'", label))?;
            Ok((label, text))
        })
        .collect()
}
