//! Application state and command handlers.
//! Wires the scheduling core to the SQLite store, the catalogs, the config and
//! the clock, and runs interactive review and cram sessions over text I/O.

use crate::catalog::CatalogSet;
use crate::clock::Clock;
use crate::config::StudyConfig;
use crate::database::{CardStore, SqliteStore};
use crate::error::{Result, StudyError};
use crate::export::json::{ExportData, export_json_to_path, import_json};
use crate::models::{ContentType, CramSession, Rating, ReviewCard, ReviewSession, Stage, sm2};
use crate::models::study_record::totals_for_day;
use crate::queue::{
    self, CramFilter, RECENT_MISTAKE_WINDOW_DAYS, build_cram_queue, build_mixed_session,
    build_single_session, recent_mistakes, retain_known_content, select_new_items,
};
use chrono::Utc;
use comfy_table::{Cell, Table};
use rand::Rng;
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// What a review session covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionKind {
    /// Due cards of one type, then today's new items of that type.
    Module(ContentType),
    /// Due cards of every type, interleaved. No new items.
    Mixed,
}

impl FromStr for SessionKind {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mixed" => Ok(SessionKind::Mixed),
            other => other.parse().map(SessionKind::Module),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CramOptions {
    pub types: Vec<ContentType>,
    pub filter: CramFilter,
    /// `None` drills the whole pool.
    pub limit: Option<usize>,
}

impl Default for CramOptions {
    fn default() -> Self {
        Self {
            types: ContentType::ALL.to_vec(),
            filter: CramFilter::All,
            limit: Some(20),
        }
    }
}

/// How a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    pub total: usize,
    pub reviewed: usize,
    pub correct: usize,
    pub completed: bool,
}

pub struct App {
    config: StudyConfig,
    store: SqliteStore,
    catalogs: CatalogSet,
    clock: Box<dyn Clock>,
}

impl App {
    pub fn new(config: StudyConfig, store: SqliteStore, catalogs: CatalogSet, clock: Box<dyn Clock>) -> Self {
        Self { config, store, catalogs, clock }
    }

    /// Opens the database and loads the catalogs named by `config`.
    pub fn open(config: StudyConfig, clock: Box<dyn Clock>) -> Result<Self> {
        let store = SqliteStore::open(&config.database_path)?;
        let catalogs = CatalogSet::load(&config.catalog_dir)?;
        Ok(Self::new(config, store, catalogs, clock))
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    /// Prints how much is waiting today per content type.
    pub fn print_due(&self, out: &mut dyn Write) -> Result<()> {
        let today = self.clock.today();
        let cards = self.store.read_all_cards()?;

        let mut table = Table::new();
        table.set_header(vec!["Type", "Due", "New today", "Catalog"]);
        for ty in ContentType::ALL {
            let catalog = self.catalogs.get(ty);
            let due = queue::due_cards(&retain_known_content(&cards, catalog), today).len();
            let new = select_new_items(catalog, &cards, self.config.daily_new.for_type(ty)).len();
            table.add_row(vec![
                Cell::new(ty),
                Cell::new(due),
                Cell::new(new),
                Cell::new(catalog.len()),
            ]);
        }
        writeln!(out, "Study queue for {today}")?;
        writeln!(out, "{table}")?;
        Ok(())
    }

    /// Runs an interactive review session.
    ///
    /// Each prompt takes `0`, `3`, `4` or `5`; `q` or end of input stops early.
    /// Every rating is stored as soon as it is given. The study log and
    /// streak are updated only when the whole queue has been worked through.
    pub fn run_review(
        &mut self,
        kind: SessionKind,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
    ) -> Result<SessionOutcome> {
        let today = self.clock.today();
        let queue = match kind {
            SessionKind::Module(ty) => {
                let cap = self.config.daily_new.for_type(ty);
                let built = build_single_session(&mut self.store, self.catalogs.get(ty), cap, today)?;
                writeln!(out, "{ty} review: {} due, {} new", built.due_count, built.new_count)?;
                built.cards
            }
            SessionKind::Mixed => {
                let cards = self.store.read_all_cards()?;
                let built = build_mixed_session(&cards, &self.catalogs, today);
                let parts: Vec<String> = built
                    .due_by_type
                    .iter()
                    .map(|(ty, n)| format!("{ty} {n}"))
                    .collect();
                writeln!(out, "mixed review: {}", parts.join(", "))?;
                built.cards
            }
        };

        let mut session = ReviewSession::new(queue);
        if session.is_completed() {
            writeln!(out, "Nothing to review today.")?;
            return Ok(SessionOutcome { total: 0, reviewed: 0, correct: 0, completed: true });
        }

        let mut line = String::new();
        while let Some(card) = session.current_card() {
            // Read per rating so a session running past midnight schedules from the new day.
            let today = self.clock.today();
            let previews: Vec<String> = sm2::preview_intervals(card, today)
                .iter()
                .map(|(rating, label)| format!("{}={} ({label})", rating.quality(), rating.label()))
                .collect();
            writeln!(
                out,
                "\n{}  [{}] {}  {}",
                session.progress_message(),
                card.content_type,
                card.content_id,
                card.stage()
            )?;
            writeln!(out, "  {}", previews.join("  "))?;
            write!(out, "rating> ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let answer = line.trim();
            if answer.eq_ignore_ascii_case("q") {
                break;
            }
            let rating = match answer.parse::<u8>().map(Rating::try_from) {
                Ok(Ok(rating)) => rating,
                Ok(Err(e)) => {
                    writeln!(out, "{e}")?;
                    continue;
                }
                Err(_) => {
                    writeln!(out, "enter 0 (again), 3 (hard), 4 (good), 5 (easy) or q")?;
                    continue;
                }
            };

            if let Some(updated) = session.rate_current(&mut self.store, rating, today)? {
                writeln!(
                    out,
                    "  next review {} ({})",
                    updated.due_date,
                    sm2::format_interval(updated.interval)
                )?;
            }
        }

        let today = self.clock.today();
        let correct: usize = ContentType::ALL
            .iter()
            .map(|&ty| session.tally(ty).correct as usize)
            .sum();
        let outcome = SessionOutcome {
            total: session.total_count(),
            reviewed: session.reviewed_count(),
            correct,
            completed: session.is_completed(),
        };

        if outcome.completed {
            for record in session.records(today) {
                self.store.add_study_record(&record)?;
            }
            let streak = self.store.streak()?.record_study(today);
            self.store.save_streak(&streak)?;
            writeln!(
                out,
                "\nSession complete: {} reviewed, {} correct. Streak: {} day(s).",
                outcome.reviewed, outcome.correct, streak.count
            )?;
        } else {
            writeln!(
                out,
                "\nStopped after {} of {} cards. Ratings so far are saved.",
                outcome.reviewed, outcome.total
            )?;
        }
        Ok(outcome)
    }

    /// Runs a cram drill. Answers are `y`/`n`; nothing is written to the store.
    pub fn run_cram<R: Rng + ?Sized>(
        &mut self,
        options: &CramOptions,
        rng: &mut R,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
    ) -> Result<SessionOutcome> {
        let cards = self.store.read_all_cards()?;
        let items = build_cram_queue(
            &cards,
            &self.catalogs,
            &options.types,
            options.filter,
            options.limit,
            rng,
        );
        if items.is_empty() {
            writeln!(out, "No items match the cram filter.")?;
            return Ok(SessionOutcome { total: 0, reviewed: 0, correct: 0, completed: true });
        }

        let mut cram = CramSession::new(items);
        let mut line = String::new();
        let mut answered = 0;
        while let Some(item) = cram.current_item() {
            writeln!(
                out,
                "\n[{}/{}] [{}] {}",
                answered + 1,
                cram.total_count(),
                item.content_type,
                item.content_id
            )?;
            write!(out, "got it? (y/n/q)> ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => cram.answer(true),
                "n" | "no" => cram.answer(false),
                "q" => break,
                _ => {
                    writeln!(out, "answer y, n or q")?;
                    continue;
                }
            };
            answered += 1;
        }

        let correct: usize = ContentType::ALL
            .iter()
            .map(|&ty| cram.tally(ty).correct as usize)
            .sum();
        writeln!(out, "\nCram finished: {correct}/{answered} correct.")?;
        Ok(SessionOutcome {
            total: cram.total_count(),
            reviewed: answered,
            correct,
            completed: cram.is_completed(),
        })
    }

    /// Puts a catalog item on the review list. Existing cards are left alone.
    pub fn add_to_review_list(&mut self, content_type: ContentType, content_id: &str) -> Result<ReviewCard> {
        if !self.catalogs.get(content_type).contains(content_id) {
            return Err(StudyError::NotInCatalog {
                content_type,
                content_id: content_id.to_string(),
            });
        }
        let id = ReviewCard::card_id(content_type, content_id);
        if let Some(existing) = self.store.get_card(&id)? {
            return Ok(existing);
        }
        let card = ReviewCard::new(content_type, content_id, self.clock.today());
        self.store.upsert_card(&card)?;
        info!(card = %card.id, "added to review list");
        Ok(card)
    }

    /// Shows a card's state and what each rating would do to it.
    pub fn print_preview(&self, card_id: &str, out: &mut dyn Write) -> Result<()> {
        let card = self
            .store
            .get_card(card_id)?
            .ok_or_else(|| StudyError::CardNotFound(card_id.to_string()))?;
        let today = self.clock.today();

        writeln!(out, "{} ({})", card.id, card.stage())?;
        writeln!(
            out,
            "  ease {:.2}, interval {}d, repetitions {}, due {}",
            card.ease_factor, card.interval, card.repetitions, card.due_date
        )?;
        match card.accuracy() {
            Some(acc) => writeln!(
                out,
                "  {}/{} correct ({:.0}%){}",
                card.total_correct,
                card.total_reviews,
                acc * 100.0,
                if card.is_struggling() { ", struggling" } else { "" }
            )?,
            None => writeln!(out, "  never reviewed")?,
        }
        for (rating, label) in sm2::preview_intervals(&card, today) {
            writeln!(out, "  {} {:<5} -> {label}", rating.quality(), rating.label())?;
        }
        Ok(())
    }

    /// Progress overview: stages, due, struggling, recent mistakes, streak.
    pub fn print_stats(&self, out: &mut dyn Write) -> Result<()> {
        let today = self.clock.today();
        let cards = self.store.read_all_cards()?;

        let mut table = Table::new();
        let mut header = vec!["Type".to_string(), "Unseen".to_string()];
        header.extend(Stage::ALL.iter().map(|s| s.to_string()));
        header.extend(["Due", "Struggling", "Mistakes (7d)"].map(String::from));
        table.set_header(header);
        for ty in ContentType::ALL {
            let summary = queue::summarize(&cards, self.catalogs.get(ty), today);
            let mut row = vec![Cell::new(ty), Cell::new(summary.unseen)];
            row.extend(Stage::ALL.iter().map(|&s| Cell::new(summary.count(s))));
            row.extend([
                Cell::new(summary.due_today),
                Cell::new(summary.struggling),
                Cell::new(summary.recent_mistakes),
            ]);
            table.add_row(row);
        }
        writeln!(out, "{table}")?;

        let streak = self.store.streak()?;
        let (reviewed, correct, new) = totals_for_day(&self.store.study_records()?, today);
        writeln!(out, "Streak: {} day(s)", streak.current(today))?;
        writeln!(out, "Today: {reviewed} reviewed, {correct} correct, {new} new")?;

        let known: Vec<ReviewCard> = ContentType::ALL
            .iter()
            .flat_map(|&ty| retain_known_content(&cards, self.catalogs.get(ty)))
            .collect();
        let mistakes = recent_mistakes(&known, today, RECENT_MISTAKE_WINDOW_DAYS);
        if !mistakes.is_empty() {
            writeln!(out, "Recent mistakes:")?;
            for card in mistakes.iter().take(10) {
                if let Some(date) = card.last_incorrect_date {
                    writeln!(out, "  {}  {}", date, card.id)?;
                }
            }
        }
        Ok(())
    }

    pub fn export(&self, path: &Path) -> Result<ExportData> {
        let data = ExportData::collect(&self.store, Utc::now())?;
        export_json_to_path(&data, path)?;
        Ok(data)
    }

    /// Replaces all progress with the contents of an export file.
    pub fn import(&mut self, path: &Path) -> Result<ExportData> {
        let data = import_json(path)?;
        data.restore_into(&mut self.store)?;
        info!(cards = data.review_cards.len(), "imported progress");
        Ok(data)
    }

    /// Erases all cards, the study log and the streak.
    pub fn reset(&mut self) -> Result<()> {
        self.store.reset_all()
    }
}
