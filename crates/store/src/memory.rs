//! In-memory outfit store. Serves two roles: a standalone backend when no
//! remote endpoint is configured, and the holding pen for records that could
//! not be synced remotely.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use stylecheck_core::{NewOutfit, Outfit, OutfitStore, Result, UserStats};

use crate::compute_stats;

#[derive(Default)]
pub struct InMemoryOutfitStore {
    records: DashMap<String, Outfit>,
}

impl InMemoryOutfitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed record, keeping its id. Used for records built
    /// locally after remote persistence gave up.
    pub fn insert(&self, outfit: Outfit) {
        self.records.insert(outfit.id.clone(), outfit);
    }

    fn records_for(&self, user_id: &str) -> Vec<Outfit> {
        let mut records: Vec<Outfit> = self
            .records
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

#[async_trait]
impl OutfitStore for InMemoryOutfitStore {
    async fn create(&self, outfit: &NewOutfit) -> Result<Outfit> {
        let now = Utc::now();
        let record = Outfit {
            id: Uuid::new_v4().to_string(),
            user_id: outfit.user_id.clone(),
            image_url: outfit.image_url.clone(),
            rating: outfit.rating,
            occasion: outfit.occasion.clone(),
            suggestions: outfit.suggestions.clone(),
            feedback: outfit.feedback.clone(),
            created_at: now,
            updated_at: now,
        };
        self.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<Outfit>> {
        Ok(self.records_for(user_id))
    }

    async fn get(&self, id: &str) -> Result<Option<Outfit>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records.remove(id);
        Ok(())
    }

    async fn search(&self, user_id: &str, query: &str) -> Result<Vec<Outfit>> {
        let needle = query.to_lowercase();
        Ok(self
            .records_for(user_id)
            .into_iter()
            .filter(|o| {
                o.occasion.to_lowercase().contains(&needle)
                    || o.feedback.to_lowercase().contains(&needle)
            })
            .collect())
    }

    async fn stats(&self, user_id: &str) -> Result<UserStats> {
        Ok(compute_stats(&self.records_for(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_outfit(user_id: &str, rating: f64, occasion: &str, feedback: &str) -> NewOutfit {
        NewOutfit {
            user_id: user_id.into(),
            image_url: "data:image/jpeg;base64,AAAA".into(),
            rating,
            occasion: occasion.into(),
            suggestions: vec!["Add a belt".into()],
            feedback: feedback.into(),
        }
    }

    #[tokio::test]
    async fn create_then_list_scoped_by_user() {
        let store = InMemoryOutfitStore::new();
        store
            .create(&new_outfit("alice", 7.0, "Casual", "Nice fit"))
            .await
            .unwrap();
        store
            .create(&new_outfit("bob", 6.0, "Formal", "Sharp"))
            .await
            .unwrap();

        let records = store.list("alice").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].occasion, "Casual");
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryOutfitStore::new();
        let first = store
            .create(&new_outfit("alice", 5.0, "Casual", "a"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store
            .create(&new_outfit("alice", 6.0, "Formal", "b"))
            .await
            .unwrap();

        let records = store.list("alice").await.unwrap();
        assert_eq!(records[0].id, second.id);
        assert_eq!(records[1].id, first.id);
    }

    #[tokio::test]
    async fn get_and_delete() {
        let store = InMemoryOutfitStore::new();
        let record = store
            .create(&new_outfit("alice", 7.5, "Date Night", "Great"))
            .await
            .unwrap();

        assert!(store.get(&record.id).await.unwrap().is_some());
        store.delete(&record.id).await.unwrap();
        assert!(store.get(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_matches_occasion_and_feedback() {
        let store = InMemoryOutfitStore::new();
        store
            .create(&new_outfit("alice", 7.0, "Business Casual", "Clean lines"))
            .await
            .unwrap();
        store
            .create(&new_outfit("alice", 6.0, "Formal", "great color balance"))
            .await
            .unwrap();

        assert_eq!(store.search("alice", "casual").await.unwrap().len(), 1);
        assert_eq!(store.search("alice", "COLOR").await.unwrap().len(), 1);
        assert!(store.search("alice", "beach").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_keeps_local_id() {
        let store = InMemoryOutfitStore::new();
        let now = Utc::now();
        store.insert(Outfit {
            id: "local_1700000000000".into(),
            user_id: "alice".into(),
            image_url: "data:image/jpeg;base64,AAAA".into(),
            rating: 6.5,
            occasion: "Casual".into(),
            suggestions: vec![],
            feedback: "ok".into(),
            created_at: now,
            updated_at: now,
        });

        let fetched = store.get("local_1700000000000").await.unwrap().unwrap();
        assert_eq!(fetched.user_id, "alice");
    }
}
