//! Response normalization: defensive parsing and rating stabilization.
//!
//! Model replies arrive as free text that usually contains JSON, sometimes
//! fenced, sometimes with raw newlines inside string values, sometimes
//! wrapped in prose. Parsing runs as an ordered pipeline of strategies,
//! stopping at the first success.

use serde_json::Value;

use stylecheck_core::{Error, OutfitAnalysis, Result};

/// Phrases indicating the model itself could not see an outfit, checked when
/// every parse attempt has failed.
const NO_OUTFIT_MARKERS: [&str; 4] = ["unable to view", "cannot see", "no outfit", "unclear"];

const UNCLEAR_IMAGE_MESSAGE: &str = "Please upload a clear photo of your outfit. Make sure the \
                                     image shows your clothing clearly and is well-lit.";

/// Parse a raw model reply into a normalized verdict.
///
/// `NoOutfitDetected` is a semantic outcome, not a structural one: it is
/// raised both for an explicit `{"error": ...}` reply and for unparseable
/// text that mentions an unviewable image.
pub fn parse_reply(raw: &str) -> Result<OutfitAnalysis> {
    let cleaned = strip_fences(raw);
    // Raw newlines are illegal inside JSON string values; collapse them
    // before any parse attempt.
    let flattened = cleaned.replace('\n', " ");

    if let Ok(value) = serde_json::from_str::<Value>(&flattened) {
        return interpret(value);
    }

    // The model sometimes wraps its JSON in explanatory prose; retry on the
    // first-{ .. last-} span alone.
    if let Some(span) = brace_span(&flattened) {
        if let Ok(value) = serde_json::from_str::<Value>(span) {
            return interpret(value);
        }
    }

    let lower = flattened.to_lowercase();
    if NO_OUTFIT_MARKERS.iter().any(|m| lower.contains(m)) {
        return Err(Error::no_outfit(UNCLEAR_IMAGE_MESSAGE));
    }

    Err(Error::Parse)
}

/// Normalize a raw rating onto the stable half-point scale.
///
/// Step order matters: clamp to [0, 10]; in the ambiguous [3, 5.5] band
/// subtract 0.5 and re-clamp the lower bound to 3 (be more critical where
/// scores mislead the most); round to the nearest 0.5; snap to a whole
/// number when within 0.1 of one.
pub fn normalize_rating(rating: f64) -> f64 {
    let mut normalized = rating.clamp(0.0, 10.0);

    if (3.0..=5.5).contains(&normalized) {
        normalized = (normalized - 0.5).max(3.0);
    }

    normalized = (normalized * 2.0).round() / 2.0;

    if (normalized - normalized.round()).abs() < 0.1 {
        normalized = normalized.round();
    }

    normalized
}

fn interpret(value: Value) -> Result<OutfitAnalysis> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return Err(Error::InvalidAnalysisFormat),
    };

    if let Some(reason) = obj.get("error").and_then(Value::as_str) {
        return Err(Error::no_outfit(reason));
    }

    let rating_value = obj
        .get("rating")
        .filter(|v| !v.is_null())
        .ok_or(Error::InvalidAnalysisFormat)?;
    let occasion = obj
        .get("occasion")
        .and_then(Value::as_str)
        .ok_or(Error::InvalidAnalysisFormat)?;
    let suggestions_value = obj
        .get("suggestions")
        .filter(|v| !v.is_null())
        .ok_or(Error::InvalidAnalysisFormat)?;
    let feedback = obj
        .get("feedback")
        .and_then(Value::as_str)
        .ok_or(Error::InvalidAnalysisFormat)?;

    // The model occasionally quotes the number.
    let rating = rating_value
        .as_f64()
        .or_else(|| rating_value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or(Error::InvalidAnalysisFormat)?;

    // Present-but-malformed suggestions degrade to an empty list rather
    // than failing the whole verdict.
    let suggestions = suggestions_value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(OutfitAnalysis {
        rating: normalize_rating(rating),
        occasion: occasion.to_string(),
        suggestions,
        feedback: clean_feedback(feedback),
    })
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        Some(rest)
    } else {
        trimmed.strip_prefix("```")
    };
    match inner {
        Some(rest) => {
            let rest = rest.trim();
            rest.strip_suffix("```").map(str::trim_end).unwrap_or(rest)
        }
        None => trimmed,
    }
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start <= end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Unescape literal `\n`, break before each bullet marker so multi-bullet
/// feedback renders as separate lines, and drop a leading blank line.
fn clean_feedback(feedback: &str) -> String {
    let unescaped = feedback.replace("\\n", "\n");
    let broken = unescaped.replace("• ", "\n• ");
    broken.strip_prefix('\n').unwrap_or(&broken).to_string()
}
