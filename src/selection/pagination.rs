//! Page-based sampling without replacement.
//!
//! Ranked ids are cut into pages of `page_size`. Every draw picks a page among
//! the pages that still hold candidates, with weight `exp(-r)` for the page at
//! 1-based position `r` in that active list, then picks one candidate uniformly
//! from it and removes it. Emptied pages drop out and the weights are
//! recomputed over what is left.

use rand::Rng;

use crate::types::identifiers::CandidateId;
use crate::types::selection_result::SelectionResult;

/// Normalized `exp(-r)` weights for `r = 1..=active`.
pub fn page_distribution(active: usize) -> Vec<f64> {
    let raw: Vec<f64> = (1..=active).map(|r| (-(r as f64)).exp()).collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Working pages for one sampling run. Never persisted.
#[derive(Debug, Clone)]
pub struct Pages<'a> {
    pages: Vec<Vec<&'a CandidateId>>,
}

impl<'a> Pages<'a> {
    pub fn partition(ranked: &[&'a CandidateId], page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let pages = ranked.chunks(page_size).map(|chunk| chunk.to_vec()).collect();
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&[&'a CandidateId]> {
        self.pages.get(index).map(Vec::as_slice)
    }

    /// Original indices of non-empty pages, in rank order.
    pub fn active(&self) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| !page.is_empty())
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn is_exhausted(&self) -> bool {
        self.pages.iter().all(Vec::is_empty)
    }

    /// Removes and returns the candidate at `slot` of page `page`. Rank order of
    /// the remaining candidates is kept.
    fn take(&mut self, page: usize, slot: usize) -> &'a CandidateId {
        self.pages[page].remove(slot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSampler {
    pub page_size: usize,
    pub draws: usize,
}

impl PaginationSampler {
    pub fn new(page_size: usize, draws: usize) -> Self {
        Self { page_size, draws }
    }

    /// Up to `draws` picks. Stops early once every page is empty; that is a
    /// normal outcome, not an error.
    pub fn sample<R: Rng>(&self, ranked: &[&CandidateId], rng: &mut R) -> SelectionResult {
        let mut pages = Pages::partition(ranked, self.page_size);
        let mut selected = SelectionResult::new();

        for _ in 0..self.draws {
            let active = pages.active();
            if active.is_empty() {
                break;
            }

            let distribution = page_distribution(active.len());
            let page = active[categorical(&distribution, rng)];

            let len = pages.pages[page].len();
            let slot = rng.gen_range(0..len);
            selected.record(pages.take(page, slot).clone());
        }

        selected
    }
}

/// One `f64` in `[0, 1)` against the cumulative distribution. Rounding slack
/// at the top lands on the last entry.
fn categorical<R: Rng>(distribution: &[f64], rng: &mut R) -> usize {
    let u: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (idx, p) in distribution.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return idx;
        }
    }
    distribution.len() - 1
}
