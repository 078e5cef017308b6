//! Persistence for review cards.
//!
//! The scheduling core only ever needs two operations from storage: read the
//! whole card collection, and insert-or-replace a single card by id. It never
//! deletes individual cards.

pub mod db;
pub mod memory;

pub use db::SqliteStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::ReviewCard;

pub trait CardStore {
    fn read_all_cards(&self) -> Result<Vec<ReviewCard>>;

    /// Inserts the card, or replaces the stored card with the same `id`.
    fn upsert_card(&mut self, card: &ReviewCard) -> Result<()>;
}
