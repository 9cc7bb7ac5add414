//! Core data types for StyleCheck.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized outfit-critique verdict.
///
/// Immutable once produced; constructed only by the response normalizer.
/// `rating` is always clamped to [0, 10] and rounded to the nearest 0.5 by
/// the time it reaches a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitAnalysis {
    /// Rating out of 10, half-point granularity.
    pub rating: f64,
    /// Short free-form occasion label ("Casual", "Business", ...).
    pub occasion: String,
    /// Up to three concrete improvement suggestions.
    pub suggestions: Vec<String>,
    /// Newline-delimited bullet feedback, at most three bullets.
    pub feedback: String,
}

/// A self-describing inline-encoded image.
///
/// Transient: produced and consumed within one analysis call, never retained
/// after the request completes.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// MIME type selected from the image reference's extension.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub inline_data: String,
}

impl ImagePayload {
    /// Render as a `data:<mime>;base64,<data>` URI for the model endpoint.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.inline_data)
    }
}

/// A persisted outfit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    pub id: String,
    pub user_id: String,
    pub image_url: String,
    pub rating: f64,
    pub occasion: String,
    pub suggestions: Vec<String>,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inputs for creating an outfit record.
#[derive(Debug, Clone, Serialize)]
pub struct NewOutfit {
    pub user_id: String,
    pub image_url: String,
    pub rating: f64,
    pub occasion: String,
    pub suggestions: Vec<String>,
    pub feedback: String,
}

impl NewOutfit {
    /// Build from a verdict plus the record's owner and image location.
    pub fn from_analysis(user_id: &str, image_url: &str, analysis: &OutfitAnalysis) -> Self {
        Self {
            user_id: user_id.to_string(),
            image_url: image_url.to_string(),
            rating: analysis.rating,
            occasion: analysis.occasion.clone(),
            suggestions: analysis.suggestions.clone(),
            feedback: analysis.feedback.clone(),
        }
    }
}

/// A normalized user record from the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub age: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate statistics over a user's outfit records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub total_outfits: usize,
    /// Average rating rounded to one decimal place.
    pub average_rating: f64,
    /// Most frequent occasion label, empty when no records exist.
    pub favorite_occasion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_is_self_describing() {
        let payload = ImagePayload {
            mime_type: "image/png".to_string(),
            inline_data: "aGVsbG8=".to_string(),
        };
        assert_eq!(payload.data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn new_outfit_copies_verdict_fields() {
        let analysis = OutfitAnalysis {
            rating: 7.5,
            occasion: "Casual".to_string(),
            suggestions: vec!["Swap the sneakers".to_string()],
            feedback: "• Solid fit".to_string(),
        };
        let new = NewOutfit::from_analysis("user-1", "https://img/x.jpg", &analysis);
        assert_eq!(new.rating, 7.5);
        assert_eq!(new.occasion, "Casual");
        assert_eq!(new.suggestions.len(), 1);
    }
}
