//! Leaderboard store mirrored to the local key-value store.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::LocalStore;

/// Storage key holding the JSON-encoded leaderboard.
pub const LEADERBOARD_KEY: &str = "excel_cherry_leaderboard";

/// Lowest auto-generated score (inclusive).
pub const RANDOM_SCORE_MIN: u64 = 1_000;
/// Upper bound for auto-generated scores (exclusive).
pub const RANDOM_SCORE_MAX: u64 = 60_000;

static LEADING_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?([0-9]+)").expect("invalid digits regex"));

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player name or alias.
    pub name: String,
    /// Non-negative score.
    pub score: u64,
}

impl LeaderboardEntry {
    /// Build an entry from a name and score.
    pub fn new(name: impl Into<String>, score: u64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Display colour tier for a rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    /// First place.
    Gold,
    /// Second place.
    Silver,
    /// Third place.
    Bronze,
    /// Everyone else.
    Standard,
}

/// Tier for the zero-based `index` in the sorted list.
pub fn rank_tier(index: usize) -> RankTier {
    match index {
        0 => RankTier::Gold,
        1 => RankTier::Silver,
        2 => RankTier::Bronze,
        _ => RankTier::Standard,
    }
}

/// Default rows used when nothing usable is persisted.
pub fn seed_entries() -> Vec<LeaderboardEntry> {
    vec![
        LeaderboardEntry::new("Santa_Claus_99", 99_999),
        LeaderboardEntry::new("Rudolph_Red", 85_000),
        LeaderboardEntry::new("Frosty_The_Snowman", 72_000),
        LeaderboardEntry::new("Elf_On_Shelf", 68_000),
        LeaderboardEntry::new("Grinch_Gamer", 54_000),
    ]
}

/// Parse user score input such as `"12,500"`.
///
/// Commas are dropped, leading whitespace and an optional `+` are skipped,
/// and the first run of digits is used, so `"12 500"` reads as `12`. Values
/// too large for `u64` saturate. Returns `None` for empty, non-numeric,
/// negative or zero input, in which case callers substitute a random score.
pub fn parse_score(text: &str) -> Option<u64> {
    let cleaned = text.replace(',', "");
    let digits = LEADING_DIGITS.captures(cleaned.trim_start())?.get(1)?;
    // Only overflow can fail on a pure digit run.
    let score = digits.as_str().parse::<u64>().unwrap_or(u64::MAX);
    (score > 0).then_some(score)
}

/// Render a score with thousands separators, e.g. `99,999`.
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// In-memory leaderboard kept sorted by score, descending.
#[derive(Debug)]
pub struct Leaderboard {
    store: LocalStore,
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Load the persisted list, falling back to the seed rows when it is
    /// missing or cannot be decoded.
    pub fn load(store: LocalStore) -> Self {
        let entries = match store.get(LEADERBOARD_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<LeaderboardEntry>>(&raw) {
                Ok(entries) => {
                    info!(rows = entries.len(), "Leaderboard restored");
                    entries
                }
                Err(err) => {
                    warn!("Discarding unreadable leaderboard: {err}");
                    seed_entries()
                }
            },
            Ok(None) => {
                debug!("No persisted leaderboard; using seed rows");
                seed_entries()
            }
            Err(err) => {
                warn!("Failed to read leaderboard: {err:#}");
                seed_entries()
            }
        };
        Self { store, entries }
    }

    /// Current rows, best score first.
    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the board has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a row. Blank names are ignored; a missing, unparsable or zero
    /// score is replaced with a random one.
    pub fn add(&mut self, name: &str, score_text: &str) -> Result<&[LeaderboardEntry]> {
        self.add_with_rng(name, score_text, &mut rand::thread_rng())
    }

    /// [`Leaderboard::add`] with an explicit random source.
    pub fn add_with_rng<R: Rng>(
        &mut self,
        name: &str,
        score_text: &str,
        rng: &mut R,
    ) -> Result<&[LeaderboardEntry]> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(&self.entries);
        }

        let score = parse_score(score_text)
            .unwrap_or_else(|| rng.gen_range(RANDOM_SCORE_MIN..RANDOM_SCORE_MAX));
        self.entries.push(LeaderboardEntry::new(name, score));
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        info!(name, score, "Leaderboard entry added");

        self.persist()?;
        Ok(&self.entries)
    }

    /// Remove the row at `index`. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Result<&[LeaderboardEntry]> {
        if index >= self.entries.len() {
            debug!(index, rows = self.entries.len(), "Ignoring removal of unknown row");
            return Ok(&self.entries);
        }

        let removed = self.entries.remove(index);
        info!(name = %removed.name, score = removed.score, "Leaderboard entry removed");

        self.persist()?;
        Ok(&self.entries)
    }

    fn persist(&self) -> Result<()> {
        let serialized =
            serde_json::to_string(&self.entries).context("failed to serialize leaderboard")?;
        self.store
            .set(LEADERBOARD_KEY, &serialized)
            .context("failed to persist leaderboard")
    }
}
