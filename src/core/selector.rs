//! Weighted status selection.
//!
//! A roll `r` is drawn uniformly from `[0, 100)` and the entries are walked in
//! order, accumulating their percentages; the first entry whose running total
//! exceeds `r` wins. When the percentages sum to less than 100 the roll can
//! land in the unconfigured gap, in which case the first entry is returned.
//!
//! Percentages are expected to sum to at most 100 (enforced when statuses are
//! written). If a bad write lets the sum exceed 100 the walk still terminates,
//! but the later entries become less likely than configured.

use crate::domain::model::UrlHttpStatus;
use crate::domain::ports::RollSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

pub const PERCENT_SCALE: u32 = 100;

pub trait Weighted {
    fn percentage(&self) -> u32;
}

impl Weighted for UrlHttpStatus {
    fn percentage(&self) -> u32 {
        self.percentage
    }
}

/// Picks the entry covering `roll`. Returns `None` only for an empty slice.
pub fn select_status<T: Weighted>(entries: &[T], roll: u32) -> Option<&T> {
    let first = entries.first()?;
    let mut cumulative: u64 = 0;

    for entry in entries {
        cumulative += u64::from(entry.percentage());
        if u64::from(roll) < cumulative {
            return Some(entry);
        }
    }

    Some(first)
}

pub fn draw_roll<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(0..PERCENT_SCALE)
}

pub fn select_status_with<'a, T: Weighted, R: Rng + ?Sized>(
    entries: &'a [T],
    rng: &mut R,
) -> Option<&'a T> {
    select_status(entries, draw_roll(rng))
}

/// Production source: a fresh draw from the thread-local generator per roll.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRolls;

impl RollSource for ThreadRolls {
    fn roll(&self) -> u32 {
        draw_roll(&mut rand::thread_rng())
    }
}

/// Reproducible source for tests and demos.
#[derive(Debug)]
pub struct SeededRolls {
    rng: Mutex<StdRng>,
}

impl SeededRolls {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RollSource for SeededRolls {
    fn roll(&self) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        draw_roll(&mut *rng)
    }
}
