//! SQLite storage for review cards, the study log and the streak
//!
//! Cards are stored one row per card id and written with insert-or-replace
//! semantics. Dates are `YYYY-MM-DD` text; "never" dates are NULL.

use super::CardStore;
use crate::error::Result;
use crate::models::{ContentType, ReviewCard, Streak, StudyModule, StudyRecord};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::{debug, info};

const CARD_COLUMNS: &str = "id, content_type, content_id, ease_factor, interval_days, repetitions,
     due_date, last_review_date, total_reviews, total_correct, last_incorrect_date";

impl ToSql for ContentType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ContentType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for StudyModule {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for StudyModule {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Opens (or creates) the database at `path` and makes sure all tables exist.
pub fn init_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    Ok(conn)
}

/// Creates the schema if missing
///
/// - `review_cards`: one row per (content type, content id), keyed by card id
/// - `study_sessions`: append-only study log
/// - `app_state`: key/value pairs (streak)
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_cards (
            id TEXT PRIMARY KEY,
            content_type TEXT NOT NULL,
            content_id TEXT NOT NULL,
            ease_factor REAL NOT NULL DEFAULT 2.5,
            interval_days INTEGER NOT NULL DEFAULT 0,
            repetitions INTEGER NOT NULL DEFAULT 0,
            due_date TEXT NOT NULL,
            last_review_date TEXT,
            total_reviews INTEGER NOT NULL DEFAULT 0,
            total_correct INTEGER NOT NULL DEFAULT 0,
            last_incorrect_date TEXT,
            UNIQUE(content_type, content_id)
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS study_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            module TEXT NOT NULL,
            cards_reviewed INTEGER NOT NULL,
            cards_correct INTEGER NOT NULL,
            new_cards_studied INTEGER NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewCard> {
    Ok(ReviewCard {
        id: row.get(0)?,
        content_type: row.get(1)?,
        content_id: row.get(2)?,
        ease_factor: row.get(3)?,
        interval: row.get(4)?,
        repetitions: row.get(5)?,
        due_date: row.get(6)?,
        last_review_date: row.get(7)?,
        total_reviews: row.get(8)?,
        total_correct: row.get(9)?,
        last_incorrect_date: row.get(10)?,
    })
}

/// Inserts the card or replaces the row with the same id.
pub fn upsert_review_card(card: &ReviewCard, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO review_cards (id, content_type, content_id, ease_factor, interval_days,
             repetitions, due_date, last_review_date, total_reviews, total_correct, last_incorrect_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
             content_type = excluded.content_type,
             content_id = excluded.content_id,
             ease_factor = excluded.ease_factor,
             interval_days = excluded.interval_days,
             repetitions = excluded.repetitions,
             due_date = excluded.due_date,
             last_review_date = excluded.last_review_date,
             total_reviews = excluded.total_reviews,
             total_correct = excluded.total_correct,
             last_incorrect_date = excluded.last_incorrect_date",
        params![
            card.id,
            card.content_type,
            card.content_id,
            card.ease_factor,
            card.interval,
            card.repetitions,
            card.due_date,
            card.last_review_date,
            card.total_reviews,
            card.total_correct,
            card.last_incorrect_date,
        ],
    )?;
    debug!(card = %card.id, due = %card.due_date, "stored review card");
    Ok(())
}

/// All cards in insertion order.
pub fn get_all_review_cards(conn: &Connection) -> Result<Vec<ReviewCard>> {
    let mut stmt = conn.prepare(&format!("SELECT {CARD_COLUMNS} FROM review_cards ORDER BY rowid"))?;
    let cards = stmt
        .query_map([], card_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(cards)
}

pub fn get_review_card(id: &str, conn: &Connection) -> Result<Option<ReviewCard>> {
    let card = conn
        .query_row(
            &format!("SELECT {CARD_COLUMNS} FROM review_cards WHERE id = ?1"),
            params![id],
            card_from_row,
        )
        .optional()?;
    Ok(card)
}

/// Appends a study log entry
pub fn add_study_record(record: &StudyRecord, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO study_sessions (date, module, cards_reviewed, cards_correct, new_cards_studied)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.date,
            record.module,
            record.cards_reviewed,
            record.cards_correct,
            record.new_cards_studied,
        ],
    )?;
    Ok(())
}

pub fn get_study_records(conn: &Connection) -> Result<Vec<StudyRecord>> {
    let mut stmt = conn.prepare(
        "SELECT date, module, cards_reviewed, cards_correct, new_cards_studied
         FROM study_sessions ORDER BY id",
    )?;
    let records = stmt
        .query_map([], |row| {
            Ok(StudyRecord {
                date: row.get(0)?,
                module: row.get(1)?,
                cards_reviewed: row.get(2)?,
                cards_correct: row.get(3)?,
                new_cards_studied: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

fn get_state(key: &str, conn: &Connection) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM app_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

fn set_state(key: &str, value: &str, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO app_state (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Reads the streak; a fresh database has a zero streak.
pub fn get_streak(conn: &Connection) -> Result<Streak> {
    let count = get_state("streak_count", conn)?
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let last_study_date = match get_state("last_study_date", conn)? {
        Some(v) if !v.is_empty() => Some(crate::clock::parse_iso_date(&v)?),
        _ => None,
    };
    Ok(Streak { count, last_study_date })
}

pub fn save_streak(streak: &Streak, conn: &Connection) -> Result<()> {
    set_state("streak_count", &streak.count.to_string(), conn)?;
    let last = streak
        .last_study_date
        .map(|d| d.to_string())
        .unwrap_or_default();
    set_state("last_study_date", &last, conn)?;
    Ok(())
}

/// Erases all progress: cards, study log and streak.
pub fn reset_all_data(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM review_cards", ())?;
    tx.execute("DELETE FROM study_sessions", ())?;
    tx.execute("DELETE FROM app_state", ())?;
    tx.commit()?;
    info!("erased all study progress");
    Ok(())
}

/// Replaces all progress with the given cards, log and streak in one transaction.
pub fn replace_all_data(
    cards: &[ReviewCard],
    records: &[StudyRecord],
    streak: &Streak,
    conn: &Connection,
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM review_cards", ())?;
    tx.execute("DELETE FROM study_sessions", ())?;
    tx.execute("DELETE FROM app_state", ())?;
    for card in cards {
        upsert_review_card(card, &tx)?;
    }
    for record in records {
        add_study_record(record, &tx)?;
    }
    save_streak(streak, &tx)?;
    tx.commit()?;
    Ok(())
}

/// `CardStore` backed by a SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self { conn: init_database(path)? })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    pub fn get_card(&self, id: &str) -> Result<Option<ReviewCard>> {
        get_review_card(id, &self.conn)
    }

    pub fn study_records(&self) -> Result<Vec<StudyRecord>> {
        get_study_records(&self.conn)
    }

    pub fn add_study_record(&mut self, record: &StudyRecord) -> Result<()> {
        add_study_record(record, &self.conn)
    }

    pub fn streak(&self) -> Result<Streak> {
        get_streak(&self.conn)
    }

    pub fn save_streak(&mut self, streak: &Streak) -> Result<()> {
        save_streak(streak, &self.conn)
    }

    pub fn reset_all(&mut self) -> Result<()> {
        reset_all_data(&self.conn)
    }

    pub fn replace_all(
        &mut self,
        cards: &[ReviewCard],
        records: &[StudyRecord],
        streak: &Streak,
    ) -> Result<()> {
        replace_all_data(cards, records, streak, &self.conn)
    }
}

impl CardStore for SqliteStore {
    fn read_all_cards(&self) -> Result<Vec<ReviewCard>> {
        get_all_review_cards(&self.conn)
    }

    fn upsert_card(&mut self, card: &ReviewCard) -> Result<()> {
        upsert_review_card(card, &self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn test_card_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut card = ReviewCard::new(ContentType::Listening, "lv027-3", day(2, 7));
        card.ease_factor = 2.36;
        card.interval = 24;
        card.repetitions = 4;
        card.last_review_date = Some(day(2, 7));
        card.last_incorrect_date = Some(day(1, 30));
        card.total_reviews = 6;
        card.total_correct = 5;

        store.upsert_card(&card).unwrap();
        let cards = store.read_all_cards().unwrap();
        assert_eq!(cards, vec![card.clone()]);
        assert_eq!(store.get_card("listening-lv027-3").unwrap(), Some(card));
        assert_eq!(store.get_card("listening-missing").unwrap(), None);
    }

    #[test]
    fn test_upsert_keeps_one_row_per_id() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let first = ReviewCard::new(ContentType::Vocabulary, "v001", day(2, 7));
        let second = ReviewCard::new(ContentType::Vocabulary, "v002", day(2, 7));
        store.upsert_card(&first).unwrap();
        store.upsert_card(&second).unwrap();

        let mut updated = first.clone();
        updated.interval = 6;
        updated.repetitions = 2;
        store.upsert_card(&updated).unwrap();

        let cards = store.read_all_cards().unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "vocabulary-v001");
        assert_eq!(cards[0].interval, 6);
        assert_eq!(cards[1].id, "vocabulary-v002");
    }

    #[test]
    fn test_streak_and_records() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.streak().unwrap(), Streak::default());

        let streak = Streak { count: 3, last_study_date: Some(day(3, 1)) };
        store.save_streak(&streak).unwrap();
        assert_eq!(store.streak().unwrap(), streak);

        let record = StudyRecord {
            date: day(3, 1),
            module: StudyModule::Reading,
            cards_reviewed: 12,
            cards_correct: 9,
            new_cards_studied: 5,
        };
        store.add_study_record(&record).unwrap();
        assert_eq!(store.study_records().unwrap(), vec![record]);
    }

    #[test]
    fn test_reset_all() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .upsert_card(&ReviewCard::new(ContentType::Grammar, "g001", day(1, 1)))
            .unwrap();
        store
            .save_streak(&Streak { count: 2, last_study_date: Some(day(1, 1)) })
            .unwrap();
        store.reset_all().unwrap();
        assert!(store.read_all_cards().unwrap().is_empty());
        assert_eq!(store.streak().unwrap(), Streak::default());
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study.sqlite3");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store
                .upsert_card(&ReviewCard::new(ContentType::Vocabulary, "v010", day(4, 4)))
                .unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.read_all_cards().unwrap().len(), 1);
    }
}
