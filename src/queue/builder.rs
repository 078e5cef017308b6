//! Turns the card collection into an ordered queue for one session.
//!
//! Every builder first drops cards whose content has disappeared from the
//! catalog, since catalogs can shrink between sessions.

use super::admission::admit_new_items;
use super::due::due_cards;
use crate::catalog::{Catalog, CatalogSet};
use crate::database::CardStore;
use crate::error::Result;
use crate::models::{ContentType, ReviewCard, Stage};
use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Cards of the catalog's type whose content is still in the catalog.
pub fn retain_known_content(cards: &[ReviewCard], catalog: &Catalog) -> Vec<ReviewCard> {
    let valid = catalog.id_set();
    let (kept, orphaned): (Vec<&ReviewCard>, Vec<&ReviewCard>) = cards
        .iter()
        .filter(|c| c.content_type == catalog.content_type)
        .partition(|c| valid.contains(c.content_id.as_str()));
    if !orphaned.is_empty() {
        warn!(
            content_type = %catalog.content_type,
            orphaned = orphaned.len(),
            "ignoring cards whose content is no longer in the catalog"
        );
    }
    kept.into_iter().cloned().collect()
}

/// Queue for a single-module session: due cards, then today's new cards.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionQueue {
    pub cards: Vec<ReviewCard>,
    pub due_count: usize,
    pub new_count: usize,
}

/// Builds a single-module queue, admitting (and storing) new items on the way.
pub fn build_single_session<S: CardStore>(
    store: &mut S,
    catalog: &Catalog,
    daily_new_cap: usize,
    today: NaiveDate,
) -> Result<SessionQueue> {
    let all_cards = store.read_all_cards()?;
    let valid = retain_known_content(&all_cards, catalog);
    let mut cards = due_cards(&valid, today);
    let due_count = cards.len();

    let admitted = admit_new_items(store, catalog, &valid, daily_new_cap, today)?;
    let new_count = admitted.len();
    cards.extend(admitted);

    info!(
        content_type = %catalog.content_type,
        due = due_count,
        new = new_count,
        "built review session"
    );
    Ok(SessionQueue { cards, due_count, new_count })
}

/// Round-robin merge: one card from each non-empty bucket per pass, in
/// bucket order, until every bucket is drained.
pub fn interleave(buckets: Vec<Vec<ReviewCard>>) -> Vec<ReviewCard> {
    let total = buckets.iter().map(Vec::len).sum();
    let mut iters: Vec<_> = buckets.into_iter().map(Vec::into_iter).collect();
    let mut merged = Vec::with_capacity(total);
    while merged.len() < total {
        for iter in iters.iter_mut() {
            if let Some(card) = iter.next() {
                merged.push(card);
            }
        }
    }
    merged
}

/// Queue for a mixed session over every content type.
#[derive(Clone, Debug, PartialEq)]
pub struct MixedQueue {
    pub cards: Vec<ReviewCard>,
    pub due_by_type: BTreeMap<ContentType, usize>,
}

/// Due cards of all types, interleaved vocabulary → grammar → listening.
/// Mixed sessions never admit new items.
pub fn build_mixed_session(cards: &[ReviewCard], catalogs: &CatalogSet, today: NaiveDate) -> MixedQueue {
    let mut due_by_type = BTreeMap::new();
    let buckets = ContentType::ALL
        .iter()
        .map(|&ty| {
            let due = due_cards(&retain_known_content(cards, catalogs.get(ty)), today);
            due_by_type.insert(ty, due.len());
            due
        })
        .collect();
    let cards = interleave(buckets);
    info!(due = cards.len(), "built mixed session");
    MixedQueue { cards, due_by_type }
}

/// Which items a cram session draws from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CramFilter {
    /// Every catalog item, studied or not.
    #[default]
    All,
    Struggling,
    Mature,
}

impl FromStr for CramFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(CramFilter::All),
            "struggling" => Ok(CramFilter::Struggling),
            "mature" => Ok(CramFilter::Mature),
            other => Err(format!("unknown cram filter {other:?} (all, struggling, mature)")),
        }
    }
}

impl fmt::Display for CramFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CramFilter::All => "all",
            CramFilter::Struggling => "struggling",
            CramFilter::Mature => "mature",
        })
    }
}

/// An item to drill in cram mode. Deliberately not a `ReviewCard`: cram
/// results never feed the scheduler.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CramItem {
    pub content_type: ContentType,
    pub content_id: String,
}

/// Random sample of items, ignoring due dates.
///
/// `limit` of `None` keeps the whole shuffled pool.
pub fn build_cram_queue<R: Rng + ?Sized>(
    cards: &[ReviewCard],
    catalogs: &CatalogSet,
    types: &[ContentType],
    filter: CramFilter,
    limit: Option<usize>,
    rng: &mut R,
) -> Vec<CramItem> {
    let mut pool: Vec<CramItem> = Vec::new();
    for ty in ContentType::ALL.into_iter().filter(|ty| types.contains(ty)) {
        let catalog = catalogs.get(ty);
        let ids: Vec<String> = match filter {
            CramFilter::All => catalog.ids.clone(),
            CramFilter::Struggling | CramFilter::Mature => retain_known_content(cards, catalog)
                .into_iter()
                .filter(|c| match filter {
                    CramFilter::Struggling => c.is_struggling(),
                    _ => c.stage() == Stage::Mature,
                })
                .map(|c| c.content_id)
                .collect(),
        };
        pool.extend(ids.into_iter().map(|content_id| CramItem { content_type: ty, content_id }));
    }

    pool.shuffle(rng);
    if let Some(limit) = limit {
        pool.truncate(limit);
    }
    info!(%filter, items = pool.len(), "built cram queue");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 7).unwrap()
    }

    fn days_ago(n: u64) -> NaiveDate {
        today().checked_sub_days(chrono::Days::new(n)).unwrap()
    }

    fn card(ty: ContentType, id: &str, due: NaiveDate) -> ReviewCard {
        ReviewCard::new(ty, id, due)
    }

    fn catalogs() -> CatalogSet {
        CatalogSet::new(
            Catalog::new(ContentType::Vocabulary, ["v1", "v2", "v3", "v4"]),
            Catalog::new(ContentType::Grammar, ["g1", "g2"]),
            Catalog::new(ContentType::Listening, ["l1"]),
        )
    }

    #[test]
    fn test_orphans_are_dropped() {
        let cards = vec![
            card(ContentType::Vocabulary, "v1", today()),
            card(ContentType::Vocabulary, "gone", today()),
            card(ContentType::Grammar, "g1", today()),
        ];
        let kept = retain_known_content(&cards, &catalogs().vocabulary);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "vocabulary-v1");
    }

    #[test]
    fn test_single_session_due_then_new() {
        let mut store = MemoryStore::with_cards(vec![
            card(ContentType::Vocabulary, "v3", days_ago(1)),
            card(ContentType::Vocabulary, "v1", days_ago(4)),
            card(ContentType::Vocabulary, "gone", days_ago(9)),
        ]);
        let mut future = card(ContentType::Vocabulary, "v2", today());
        future.due_date = today().succ_opt().unwrap();
        future.interval = 1;
        store.upsert_card(&future).unwrap();

        let queue =
            build_single_session(&mut store, &catalogs().vocabulary, 20, today()).unwrap();
        let ids: Vec<&str> = queue.cards.iter().map(|c| c.content_id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v3", "v4"]);
        assert_eq!(queue.due_count, 2);
        assert_eq!(queue.new_count, 1);
        assert!(store.get("vocabulary-v4").is_some());
    }

    #[test]
    fn test_new_cards_visible_to_next_admission_same_day() {
        let mut store = MemoryStore::new();
        let vocab = catalogs().vocabulary;
        let first = build_single_session(&mut store, &vocab, 2, today()).unwrap();
        assert_eq!(first.new_count, 2);

        // Unreviewed admitted cards are due today, so they come back as due.
        let second = build_single_session(&mut store, &vocab, 2, today()).unwrap();
        assert_eq!(second.due_count, 2);
        assert_eq!(second.new_count, 2);
        let ids: Vec<&str> = second.cards.iter().map(|c| c.content_id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn test_interleave_round_robin() {
        let v: Vec<ReviewCard> = ["v1", "v2", "v3"]
            .iter()
            .map(|id| card(ContentType::Vocabulary, id, today()))
            .collect();
        let g = vec![card(ContentType::Grammar, "g1", today())];
        let l: Vec<ReviewCard> = ["l1", "l2"]
            .iter()
            .map(|id| card(ContentType::Listening, id, today()))
            .collect();

        let ids: Vec<String> = interleave(vec![v, Vec::new(), g, l])
            .into_iter()
            .map(|c| c.content_id)
            .collect();
        assert_eq!(ids, vec!["v1", "g1", "l1", "v2", "l2", "v3"]);
        assert!(interleave(vec![Vec::new(), Vec::new()]).is_empty());
    }

    #[test]
    fn test_mixed_session() {
        let cards = vec![
            card(ContentType::Grammar, "g2", days_ago(1)),
            card(ContentType::Vocabulary, "v1", days_ago(2)),
            card(ContentType::Vocabulary, "v2", days_ago(3)),
            card(ContentType::Listening, "orphan", days_ago(5)),
            card(ContentType::Grammar, "g1", days_ago(8)),
        ];
        let queue = build_mixed_session(&cards, &catalogs(), today());
        let ids: Vec<&str> = queue.cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["vocabulary-v2", "grammar-g1", "vocabulary-v1", "grammar-g2"]
        );
        assert_eq!(queue.due_by_type[&ContentType::Vocabulary], 2);
        assert_eq!(queue.due_by_type[&ContentType::Grammar], 2);
        assert_eq!(queue.due_by_type[&ContentType::Listening], 0);
    }

    #[test]
    fn test_cram_all_is_reproducible_with_seed() {
        let types = [ContentType::Vocabulary, ContentType::Grammar];
        let a = build_cram_queue(
            &[],
            &catalogs(),
            &types,
            CramFilter::All,
            None,
            &mut ChaCha8Rng::seed_from_u64(42),
        );
        let b = build_cram_queue(
            &[],
            &catalogs(),
            &types,
            CramFilter::All,
            None,
            &mut ChaCha8Rng::seed_from_u64(42),
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        let unique: HashSet<&CramItem> = a.iter().collect();
        assert_eq!(unique.len(), 6);
        assert!(a.iter().all(|i| i.content_type != ContentType::Listening));
    }

    #[test]
    fn test_cram_limit() {
        let items = build_cram_queue(
            &[],
            &catalogs(),
            &ContentType::ALL,
            CramFilter::All,
            Some(3),
            &mut ChaCha8Rng::seed_from_u64(7),
        );
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_cram_struggling_and_mature_filters() {
        let mut weak = card(ContentType::Vocabulary, "v1", today());
        weak.interval = 1;
        weak.total_reviews = 5;
        weak.total_correct = 1;
        let mut strong = card(ContentType::Vocabulary, "v2", today());
        strong.interval = 30;
        strong.repetitions = 5;
        strong.total_reviews = 5;
        strong.total_correct = 5;
        let mut orphan = card(ContentType::Vocabulary, "gone", today());
        orphan.total_reviews = 9;
        let cards = vec![weak, strong, orphan];

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let struggling = build_cram_queue(
            &cards,
            &catalogs(),
            &ContentType::ALL,
            CramFilter::Struggling,
            None,
            &mut rng,
        );
        assert_eq!(
            struggling,
            vec![CramItem { content_type: ContentType::Vocabulary, content_id: "v1".into() }]
        );

        let mature = build_cram_queue(
            &cards,
            &catalogs(),
            &ContentType::ALL,
            CramFilter::Mature,
            Some(10),
            &mut rng,
        );
        assert_eq!(
            mature,
            vec![CramItem { content_type: ContentType::Vocabulary, content_id: "v2".into() }]
        );
    }

    #[test]
    fn test_cram_filter_parse() {
        assert_eq!("mature".parse::<CramFilter>().unwrap(), CramFilter::Mature);
        assert!("fresh".parse::<CramFilter>().is_err());
    }
}
