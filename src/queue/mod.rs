//! Selecting and ordering what to study today.
pub mod admission;
pub mod builder;
pub mod classify;
pub mod due;

pub use admission::{admit_new_items, select_new_items};
pub use builder::{
    CramFilter, CramItem, MixedQueue, SessionQueue, build_cram_queue, build_mixed_session,
    build_single_session, interleave, retain_known_content,
};
pub use classify::{DeckSummary, struggling_cards, summarize};
pub use due::{RECENT_MISTAKE_WINDOW_DAYS, due_cards, recent_mistakes};
