//! Flavour text printed under a failed run.
//!
//! Lines are picked by weight through a [`RandomSource`] handed in by the
//! caller, so tests can pin the choice and nothing shares a global generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed integers.
pub trait RandomSource {
    /// A value in `0..upper`. `upper` is never zero.
    fn below(&mut self, upper: u32) -> u32;
}

/// [`RandomSource`] backed by an entropy-seeded generator.
pub struct SystemRandom {
    rng: StdRng,
}

impl SystemRandom {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandom {
    fn below(&mut self, upper: u32) -> u32 {
        self.rng.gen_range(0..upper)
    }
}

/// `{check}` is replaced by the first failed check, `{headline}` by its
/// diagnosis. Lines mentioning `{headline}` are only used when one exists.
const FAILURE_LINES: &[(&str, u32)] = &[
    ("Push held at the gate. {check} has objections.", 6),
    ("{check} would like a word before this leaves the building.", 4),
    ("Not today: {headline}", 5),
    ("The remote can wait. {check} cannot.", 3),
    ("{headline}. The hook remembers so you don't have to.", 2),
    ("Fix {check}, then try again. The branch isn't going anywhere.", 4),
    ("Somewhere a CI runner just breathed a sigh of relief.", 1),
];

const SKIP_ONLY_LINES: &[(&str, u32)] = &[
    ("All clear, though some checks sat this one out.", 3),
    ("Green enough. Skipped checks are still waiting on another machine.", 1),
];

/// Pick one item by weight. `None` when `items` is empty or every weight is zero.
pub fn pick_weighted<'a, T>(items: &'a [(T, u32)], rng: &mut dyn RandomSource) -> Option<&'a T> {
    let total: u32 = items.iter().map(|(_, w)| *w).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.below(total);
    for (item, weight) in items {
        if roll < *weight {
            return Some(item);
        }
        roll -= weight;
    }
    None
}

/// Flavour line for a run whose first failure is `check`.
pub fn failure_line(check: &str, headline: &str, rng: &mut dyn RandomSource) -> String {
    let usable: Vec<(&str, u32)> = FAILURE_LINES
        .iter()
        .filter(|(line, _)| !headline.is_empty() || !line.contains("{headline}"))
        .copied()
        .collect();
    let template = pick_weighted(&usable, rng).copied().unwrap_or("{check} failed.");
    template
        .replace("{check}", check)
        .replace("{headline}", headline)
}

/// Flavour line for a passing run in which some checks were skipped.
pub fn skip_only_line(rng: &mut dyn RandomSource) -> &'static str {
    pick_weighted(SKIP_ONLY_LINES, rng)
        .copied()
        .unwrap_or("All clear.")
}
