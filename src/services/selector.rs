use rand::{seq::SliceRandom, Rng};
use std::collections::HashSet;

use crate::models::WebinarPick;

/// Categories surfaced on the activities path
pub const ACTIVITY_RESULT_LIMIT: usize = 6;

/// Picks surfaced on the webinar path
pub const WEBINAR_PICK_LIMIT: usize = 3;

/// Uniformly shuffles the candidates and keeps the first `n`
///
/// Ratings ride along as annotations only; they do not influence which
/// candidates survive.
pub fn random_top_n<T, R: Rng + ?Sized>(mut candidates: Vec<T>, n: usize, rng: &mut R) -> Vec<T> {
    candidates.shuffle(rng);
    candidates.truncate(n);
    candidates
}

/// Accumulates webinar picks with name-level dedup up to a fixed cap
#[derive(Debug)]
pub struct WebinarAccumulator {
    cap: usize,
    seen_names: HashSet<String>,
    picks: Vec<WebinarPick>,
}

impl WebinarAccumulator {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            seen_names: HashSet::new(),
            picks: Vec::with_capacity(cap),
        }
    }

    /// Accepts the draw unless the cap is reached or its name was already taken
    pub fn offer(&mut self, pick: WebinarPick) -> bool {
        if self.is_full() || self.seen_names.contains(&pick.name) {
            return false;
        }
        self.seen_names.insert(pick.name.clone());
        self.picks.push(pick);
        true
    }

    pub fn is_full(&self) -> bool {
        self.picks.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Final, independent shuffle of the accepted picks
    pub fn finish<R: Rng + ?Sized>(mut self, rng: &mut R) -> Vec<WebinarPick> {
        self.picks.shuffle(rng);
        self.picks
    }
}
