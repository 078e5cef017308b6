//! Due-set selection and the recent-mistakes query.
use crate::models::ReviewCard;
use chrono::{Days, NaiveDate};

/// How far back `recent_mistakes` looks by default.
pub const RECENT_MISTAKE_WINDOW_DAYS: u64 = 7;

/// Cards due on or before `today`, most overdue first, lowest ease first
/// among cards due the same day.
pub fn due_cards(cards: &[ReviewCard], today: NaiveDate) -> Vec<ReviewCard> {
    let mut due: Vec<ReviewCard> = cards
        .iter()
        .filter(|c| c.due_date <= today)
        .cloned()
        .collect();
    due.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.ease_factor.total_cmp(&b.ease_factor))
    });
    due
}

/// Cards failed within the last `window_days` days, most recent failure first.
pub fn recent_mistakes(cards: &[ReviewCard], today: NaiveDate, window_days: u64) -> Vec<ReviewCard> {
    let cutoff = today
        .checked_sub_days(Days::new(window_days))
        .unwrap_or(NaiveDate::MIN);
    let mut mistakes: Vec<ReviewCard> = cards
        .iter()
        .filter(|c| c.last_incorrect_date.is_some_and(|d| d >= cutoff))
        .cloned()
        .collect();
    mistakes.sort_by(|a, b| b.last_incorrect_date.cmp(&a.last_incorrect_date));
    mistakes
}
