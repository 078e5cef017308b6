//! SM-2 (SuperMemo 2) scheduling with four rating buckets.
//!
//! - Ratings Hard/Good/Easy (3-5) adjust the ease factor (EF); Again (0) leaves it alone
//! - Again resets repetitions to 0 and schedules the card for tomorrow
//! - Successful reviews grow the interval 1 day → 6 days → previous interval × EF
//! - EF never falls below 1.3 and has no ceiling
//!
//! Everything here is pure: "today" is passed in, nothing is persisted.

use super::{Rating, ReviewCard};
use chrono::{Days, NaiveDate};
use tracing::debug;

pub const MIN_EASE_FACTOR: f64 = 1.3;

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3.
/// Again keeps the current EF.
pub fn next_ease_factor(ease_factor: f64, rating: Rating) -> f64 {
    if !rating.is_correct() {
        return ease_factor;
    }
    let penalty = 5.0 - rating.quality() as f64;
    (ease_factor + (0.1 - penalty * (0.08 + penalty * 0.02))).max(MIN_EASE_FACTOR)
}

/// Applies one rating to a card and returns the updated state.
pub fn review_card(card: &ReviewCard, rating: Rating, today: NaiveDate) -> ReviewCard {
    let ease_factor = next_ease_factor(card.ease_factor, rating);

    let (interval, repetitions) = match (rating, card.repetitions) {
        (Rating::Again, _) => (1, 0),
        (_, 0) => (1, 1),
        (_, 1) => (6, 2),
        (_, reps) => (
            (card.interval as f64 * ease_factor).round() as u32,
            reps.saturating_add(1),
        ),
    };

    let due_date = today
        .checked_add_days(Days::new(interval as u64))
        .unwrap_or(NaiveDate::MAX);

    debug!(
        card = %card.id,
        rating = rating.label(),
        ease_factor,
        interval,
        repetitions,
        %due_date,
        "scheduled review"
    );

    ReviewCard {
        ease_factor,
        interval,
        repetitions,
        due_date,
        last_review_date: Some(today),
        total_reviews: card.total_reviews.saturating_add(1),
        total_correct: card.total_correct.saturating_add(u32::from(rating.is_correct())),
        last_incorrect_date: if rating.is_correct() {
            card.last_incorrect_date
        } else {
            Some(today)
        },
        ..card.clone()
    }
}

/// Label for the interval a rating would produce, without applying it.
pub fn next_interval(card: &ReviewCard, rating: Rating, today: NaiveDate) -> String {
    if rating == Rating::Again {
        return "<1m".to_string();
    }
    format_interval(review_card(card, rating, today).interval)
}

/// Labels for every rating button, in `Rating::ALL` order.
pub fn preview_intervals(card: &ReviewCard, today: NaiveDate) -> [(Rating, String); 4] {
    Rating::ALL.map(|rating| (rating, next_interval(card, rating, today)))
}

/// Short human form of a day count: `3d`, `2w`, `4mo`.
pub fn format_interval(days: u32) -> String {
    let days_f = days as f64;
    if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", (days_f / 7.0).round())
    } else {
        format!("{}mo", (days_f / 30.0).round())
    }
}
