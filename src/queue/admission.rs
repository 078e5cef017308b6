//! Admission of not-yet-studied catalog items.
use crate::catalog::Catalog;
use crate::database::CardStore;
use crate::error::Result;
use crate::models::ReviewCard;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info};

/// Catalog ids of this catalog's type that have no card yet, in catalog
/// order, at most `cap` of them.
pub fn select_new_items<'a>(catalog: &'a Catalog, cards: &[ReviewCard], cap: usize) -> Vec<&'a str> {
    let studied: HashSet<&str> = cards
        .iter()
        .filter(|c| c.content_type == catalog.content_type)
        .map(|c| c.content_id.as_str())
        .collect();
    catalog
        .ids
        .iter()
        .map(String::as_str)
        .filter(|id| !studied.contains(id))
        .take(cap)
        .collect()
}

/// Creates a card for each selected item and stores it right away.
///
/// Each card is written before the next one is built, so an interrupted
/// admission picks up where it stopped on the next call.
pub fn admit_new_items<S: CardStore>(
    store: &mut S,
    catalog: &Catalog,
    cards: &[ReviewCard],
    cap: usize,
    today: NaiveDate,
) -> Result<Vec<ReviewCard>> {
    let mut admitted = Vec::new();
    for content_id in select_new_items(catalog, cards, cap) {
        let card = ReviewCard::new(catalog.content_type, content_id, today);
        store.upsert_card(&card)?;
        debug!(card = %card.id, "admitted new item");
        admitted.push(card);
    }
    info!(
        content_type = %catalog.content_type,
        admitted = admitted.len(),
        cap,
        "new item admission"
    );
    Ok(admitted)
}
