//! Backend-as-a-service collaborators: outfit records, object storage, and
//! identity, plus an in-memory record store for the local fallback path.

pub mod auth;
pub mod memory;
pub mod outfits;
pub mod storage;

pub use auth::SupabaseAuth;
pub use memory::InMemoryOutfitStore;
pub use outfits::SupabaseOutfitStore;
pub use storage::SupabaseObjectStore;

use stylecheck_core::{Outfit, UserStats};

/// Aggregate a user's records into stats. Average rating is rounded to one
/// decimal place; favorite occasion is the most frequent label.
pub(crate) fn compute_stats(records: &[Outfit]) -> UserStats {
    let total = records.len();
    let average = if total == 0 {
        0.0
    } else {
        let sum: f64 = records.iter().map(|o| o.rating).sum();
        ((sum / total as f64) * 10.0).round() / 10.0
    };

    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for outfit in records {
        *counts.entry(outfit.occasion.as_str()).or_insert(0) += 1;
    }
    let favorite = counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(occasion, _)| occasion.to_string())
        .unwrap_or_default();

    UserStats {
        total_outfits: total,
        average_rating: average,
        favorite_occasion: favorite,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn outfit(rating: f64, occasion: &str) -> Outfit {
        let now = Utc::now();
        Outfit {
            id: "x".into(),
            user_id: "u".into(),
            image_url: "https://img".into(),
            rating,
            occasion: occasion.into(),
            suggestions: vec![],
            feedback: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn stats_over_empty_records() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_outfits, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert!(stats.favorite_occasion.is_empty());
    }

    #[test]
    fn stats_average_and_favorite() {
        let records = vec![
            outfit(7.0, "Casual"),
            outfit(8.0, "Casual"),
            outfit(5.5, "Formal"),
        ];
        let stats = compute_stats(&records);
        assert_eq!(stats.total_outfits, 3);
        assert_eq!(stats.average_rating, 6.8);
        assert_eq!(stats.favorite_occasion, "Casual");
    }
}
