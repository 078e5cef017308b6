pub mod app;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;
pub mod queue;

pub use error::{Result, StudyError};
pub use models::{ContentType, Rating, ReviewCard, Stage};
