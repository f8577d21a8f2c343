//! Round generation
//!
//! A round is one target pair plus distinct distractor pairs, shuffled and
//! laid out on a fresh grid.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::grid::Grid;
use super::state::GameOption;
use crate::consts::{ALPHABET, TARGET_LEN};
use crate::settings::Settings;

/// A freshly generated round
#[derive(Debug, Clone)]
pub struct Round {
    pub target: String,
    pub options: Vec<GameOption>,
    pub grid: Grid,
}

/// Random uppercase letter pair
pub fn random_pair<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TARGET_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// `count` distinct pairs, none equal to `target`.
///
/// Loops until enough unique pairs are drawn, so `count` must stay below
/// the 675 pairs that differ from the target.
pub fn distractors<R: Rng + ?Sized>(rng: &mut R, target: &str, count: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let pair = random_pair(rng);
        if pair == target {
            continue;
        }
        if seen.insert(pair.clone()) {
            out.push(pair);
        }
    }
    out
}

/// Build a round: generate, shuffle, place, shuffle again.
///
/// `next_id` hands out option ids. Placement errors (grid too small) leave
/// the trailing options unplaced and are logged.
pub fn generate<R, F>(rng: &mut R, settings: &Settings, mut next_id: F) -> Round
where
    R: Rng + ?Sized,
    F: FnMut() -> u32,
{
    let target = random_pair(rng);
    let distractor_count = settings.option_count.saturating_sub(1);

    let mut options = Vec::with_capacity(settings.option_count.max(1));
    options.push(GameOption {
        id: next_id(),
        letters: target.clone(),
        is_correct: true,
        cell: None,
    });
    for letters in distractors(rng, &target, distractor_count) {
        options.push(GameOption {
            id: next_id(),
            letters,
            is_correct: false,
            cell: None,
        });
    }

    options.shuffle(rng);

    let mut grid = Grid::new(settings.grid_rows, settings.grid_cols);
    if let Err(e) = grid.place_all(&mut options) {
        log::error!("Round placement incomplete: {e}");
    }

    // List order only; cells are already assigned
    options.shuffle(rng);

    log::debug!(
        "Generated round: target={} options={} placed={}",
        target,
        options.len(),
        grid.occupied_count()
    );

    Round {
        target,
        options,
        grid,
    }
}
