//! Property-based tests for the scheduler and the due-set selector.
//!
//! Invariants covered:
//! - Ease factor never drops below 1.3
//! - A lapse resets repetitions and interval without touching the ease factor
//! - Review/correct counters move by exactly one review per rating
//! - Due date is always today + interval after a review
//! - `due_cards` keeps exactly the due cards, ordered by due date then ease
//! - Every card has exactly one stage

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use study_srs::models::sm2::{MIN_EASE_FACTOR, review_card};
use study_srs::queue::due_cards;
use study_srs::{ContentType, Rating, ReviewCard, Stage};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn base_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn arb_day() -> impl Strategy<Value = NaiveDate> {
    (0u64..=730).prop_map(|offset| base_day() + Days::new(offset))
}

fn arb_rating() -> impl Strategy<Value = Rating> {
    prop::sample::select(Rating::ALL.to_vec())
}

fn arb_card() -> impl Strategy<Value = ReviewCard> {
    (
        0usize..1000,                  // content id
        (130u32..=400),                // ease factor * 100
        0u32..=400,                    // interval
        0u32..=30,                     // repetitions
        arb_day(),                     // due date
        (0u32..=50, 0u32..=50),        // reviews, correct
    )
        .prop_map(|(n, ease, interval, repetitions, due_date, (a, b))| {
            let mut card = ReviewCard::new(ContentType::Vocabulary, format!("v{n:04}"), due_date);
            card.ease_factor = f64::from(ease) / 100.0;
            card.interval = interval;
            card.repetitions = repetitions;
            card.total_reviews = a.max(b);
            card.total_correct = a.min(b);
            card
        })
}

// ============================================================================
// Scheduler
// ============================================================================

proptest! {
    #[test]
    fn ease_factor_never_below_floor(card in arb_card(), rating in arb_rating(), today in arb_day()) {
        let next = review_card(&card, rating, today);
        prop_assert!(next.ease_factor >= MIN_EASE_FACTOR);
    }

    #[test]
    fn lapse_resets_interval_and_keeps_ease(card in arb_card(), today in arb_day()) {
        let next = review_card(&card, Rating::Again, today);
        prop_assert_eq!(next.repetitions, 0);
        prop_assert_eq!(next.interval, 1);
        prop_assert_eq!(next.ease_factor, card.ease_factor);
        prop_assert_eq!(next.last_incorrect_date, Some(today));
    }

    #[test]
    fn counters_and_dates_after_review(card in arb_card(), rating in arb_rating(), today in arb_day()) {
        let next = review_card(&card, rating, today);
        prop_assert_eq!(next.total_reviews, card.total_reviews + 1);
        prop_assert_eq!(next.total_correct, card.total_correct + u32::from(rating != Rating::Again));
        prop_assert!(next.total_correct <= next.total_reviews);
        prop_assert_eq!(next.due_date, today + Days::new(u64::from(next.interval)));
        prop_assert_eq!(next.last_review_date, Some(today));
        prop_assert_eq!(&next.id, &card.id);
        prop_assert_eq!(&next.content_id, &card.content_id);
        if rating != Rating::Again {
            prop_assert_eq!(next.last_incorrect_date, card.last_incorrect_date);
        }
    }

    #[test]
    fn rating_sequence_from_new_card(ratings in prop::collection::vec(arb_rating(), 1..40)) {
        let mut card = ReviewCard::new(ContentType::Grammar, "g001", base_day());
        let mut today = base_day();
        for rating in ratings {
            card = review_card(&card, rating, today);
            prop_assert!(card.ease_factor >= MIN_EASE_FACTOR);
            prop_assert!(card.interval >= 1);
            prop_assert!(card.total_correct <= card.total_reviews);
            prop_assert_ne!(card.stage(), Stage::New);
            today = card.due_date;
        }
    }
}

// ============================================================================
// Due-set selector and stages
// ============================================================================

proptest! {
    #[test]
    fn due_cards_filters_and_orders(cards in prop::collection::vec(arb_card(), 0..60), today in arb_day()) {
        let due = due_cards(&cards, today);
        let expected = cards.iter().filter(|c| c.due_date <= today).count();
        prop_assert_eq!(due.len(), expected);
        for pair in due.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.due_date < b.due_date
                || (a.due_date == b.due_date && a.ease_factor <= b.ease_factor));
        }
        prop_assert!(due.iter().all(|c| c.due_date <= today));
    }

    #[test]
    fn stage_is_total(card in arb_card()) {
        let stage = card.stage();
        let expected = if card.repetitions == 0 && card.interval == 0 {
            Stage::New
        } else if card.interval < 7 {
            Stage::Learning
        } else if card.interval < 21 {
            Stage::Review
        } else {
            Stage::Mature
        };
        prop_assert_eq!(stage, expected);
    }

    #[test]
    fn struggling_needs_three_reviews(card in arb_card()) {
        if card.total_reviews < 3 {
            prop_assert!(!card.is_struggling());
        }
    }
}
