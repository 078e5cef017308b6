//! Read-only summaries over the card collection, for dashboards and `stats`.
use super::due::{RECENT_MISTAKE_WINDOW_DAYS, due_cards, recent_mistakes};
use crate::catalog::Catalog;
use crate::models::{ReviewCard, Stage};
use chrono::NaiveDate;

pub fn struggling_cards(cards: &[ReviewCard]) -> Vec<ReviewCard> {
    cards.iter().filter(|c| c.is_struggling()).cloned().collect()
}

/// Per-content-type overview.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeckSummary {
    /// Catalog items without a card yet.
    pub unseen: usize,
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub mature: usize,
    pub due_today: usize,
    pub struggling: usize,
    pub recent_mistakes: usize,
}

impl DeckSummary {
    pub fn studied(&self) -> usize {
        self.new + self.learning + self.review + self.mature
    }

    pub fn count(&self, stage: Stage) -> usize {
        match stage {
            Stage::New => self.new,
            Stage::Learning => self.learning,
            Stage::Review => self.review,
            Stage::Mature => self.mature,
        }
    }
}

/// Summarises the cards of `catalog`'s type that still have catalog content.
pub fn summarize(cards: &[ReviewCard], catalog: &Catalog, today: NaiveDate) -> DeckSummary {
    let valid = catalog.id_set();
    let cards: Vec<ReviewCard> = cards
        .iter()
        .filter(|c| c.content_type == catalog.content_type && valid.contains(c.content_id.as_str()))
        .cloned()
        .collect();

    let mut summary = DeckSummary {
        unseen: catalog.len().saturating_sub(cards.len()),
        due_today: due_cards(&cards, today).len(),
        struggling: struggling_cards(&cards).len(),
        recent_mistakes: recent_mistakes(&cards, today, RECENT_MISTAKE_WINDOW_DAYS).len(),
        ..DeckSummary::default()
    };
    for card in &cards {
        match card.stage() {
            Stage::New => summary.new += 1,
            Stage::Learning => summary.learning += 1,
            Stage::Review => summary.review += 1,
            Stage::Mature => summary.mature += 1,
        }
    }
    summary
}
