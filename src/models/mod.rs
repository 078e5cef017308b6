pub mod content_type;
pub mod learning_session;
pub mod rating;
pub mod review_card;
pub mod sm2;
pub mod study_record;

pub use content_type::ContentType;
pub use learning_session::{CramSession, ReviewSession, Tally};
pub use rating::Rating;
pub use review_card::{ReviewCard, Stage};
pub use study_record::{Streak, StudyModule, StudyRecord};
