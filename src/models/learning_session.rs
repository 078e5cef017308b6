//! Session runners: walk a queue one card at a time.
//! Review sessions feed every rating through the SM-2 scheduler and persist it;
//! cram sessions only keep score.

use super::{ContentType, Rating, ReviewCard, StudyRecord, sm2};
use crate::database::CardStore;
use crate::error::Result;
use crate::queue::CramItem;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::info;

/// Running totals for one content type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub reviewed: u32,
    pub correct: u32,
    pub new_cards: u32,
}

/// A review session over a prepared queue.
/// Each card is shown once; a lapsed card comes back through the due queue
/// on a later day, not within the session.
pub struct ReviewSession {
    queue: Vec<ReviewCard>,
    current_index: usize,
    tallies: BTreeMap<ContentType, Tally>,
}

impl ReviewSession {
    pub fn new(queue: Vec<ReviewCard>) -> Self {
        Self {
            queue,
            current_index: 0,
            tallies: BTreeMap::new(),
        }
    }

    pub fn current_card(&self) -> Option<&ReviewCard> {
        self.queue.get(self.current_index)
    }

    /// Schedules the current card, stores the result and moves to the next card.
    /// Returns the updated card, or `None` when the session is already complete.
    pub fn rate_current<S: CardStore>(
        &mut self,
        store: &mut S,
        rating: Rating,
        today: NaiveDate,
    ) -> Result<Option<ReviewCard>> {
        let Some(card) = self.queue.get(self.current_index) else {
            return Ok(None);
        };

        let updated = sm2::review_card(card, rating, today);
        store.upsert_card(&updated)?;

        let tally = self.tallies.entry(card.content_type).or_default();
        tally.reviewed += 1;
        tally.correct += u32::from(rating.is_correct());
        if card.total_reviews == 0 {
            tally.new_cards += 1;
        }

        self.queue[self.current_index] = updated.clone();
        self.current_index += 1;
        Ok(Some(updated))
    }

    pub fn reviewed_count(&self) -> usize {
        self.current_index
    }

    pub fn total_count(&self) -> usize {
        self.queue.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.reviewed_count()
    }

    pub fn is_completed(&self) -> bool {
        self.current_index >= self.queue.len()
    }

    pub fn tally(&self, content_type: ContentType) -> Tally {
        self.tallies.get(&content_type).copied().unwrap_or_default()
    }

    /// One study log entry per content type that got at least one rating.
    pub fn records(&self, today: NaiveDate) -> Vec<StudyRecord> {
        let records: Vec<StudyRecord> = self
            .tallies
            .iter()
            .filter(|(_, t)| t.reviewed > 0)
            .map(|(&module, t)| StudyRecord {
                date: today,
                module: module.into(),
                cards_reviewed: t.reviewed,
                cards_correct: t.correct,
                new_cards_studied: t.new_cards,
            })
            .collect();
        info!(modules = records.len(), reviewed = self.reviewed_count(), "review session finished");
        records
    }

    pub fn progress_message(&self) -> String {
        format!(
            "Card {} of {} ({} left)",
            (self.current_index + 1).min(self.total_count()),
            self.total_count(),
            self.remaining_count()
        )
    }
}

/// A cram drill. Holds no store, so it cannot touch scheduling state.
pub struct CramSession {
    items: Vec<CramItem>,
    current_index: usize,
    tallies: BTreeMap<ContentType, Tally>,
}

impl CramSession {
    pub fn new(items: Vec<CramItem>) -> Self {
        Self {
            items,
            current_index: 0,
            tallies: BTreeMap::new(),
        }
    }

    pub fn current_item(&self) -> Option<&CramItem> {
        self.items.get(self.current_index)
    }

    /// Records a got-it / missed answer for the current item and advances.
    pub fn answer(&mut self, correct: bool) -> Option<&CramItem> {
        let item = self.items.get(self.current_index)?;
        let tally = self.tallies.entry(item.content_type).or_default();
        tally.reviewed += 1;
        tally.correct += u32::from(correct);
        self.current_index += 1;
        self.items.get(self.current_index - 1)
    }

    pub fn is_completed(&self) -> bool {
        self.current_index >= self.items.len()
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn tally(&self, content_type: ContentType) -> Tally {
        self.tallies.get(&content_type).copied().unwrap_or_default()
    }
}
