//! In-memory card store, keyed by card id, insertion-ordered.
use super::CardStore;
use crate::error::Result;
use crate::models::ReviewCard;

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    cards: Vec<ReviewCard>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: Vec<ReviewCard>) -> Self {
        let mut store = Self::new();
        for card in &cards {
            store.put(card);
        }
        store
    }

    pub fn get(&self, id: &str) -> Option<&ReviewCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn put(&mut self, card: &ReviewCard) {
        match self.cards.iter_mut().find(|c| c.id == card.id) {
            Some(existing) => *existing = card.clone(),
            None => self.cards.push(card.clone()),
        }
    }
}

impl CardStore for MemoryStore {
    fn read_all_cards(&self) -> Result<Vec<ReviewCard>> {
        Ok(self.cards.clone())
    }

    fn upsert_card(&mut self, card: &ReviewCard) -> Result<()> {
        self.put(card);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use chrono::NaiveDate;

    #[test]
    fn test_upsert_replaces_by_id() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut store = MemoryStore::new();
        let mut card = ReviewCard::new(ContentType::Grammar, "g001", today);
        store.upsert_card(&card).unwrap();
        store
            .upsert_card(&ReviewCard::new(ContentType::Grammar, "g002", today))
            .unwrap();

        card.total_reviews = 7;
        store.upsert_card(&card).unwrap();

        let cards = store.read_all_cards().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "grammar-g001");
        assert_eq!(cards[0].total_reviews, 7);
        assert_eq!(store.get("grammar-g002").map(|c| c.total_reviews), Some(0));
    }
}
