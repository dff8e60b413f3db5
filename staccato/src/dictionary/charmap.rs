//! Dense remapping from code points (and synthetic POS contexts) to
//! symbol ids.

use crate::common::CP_MAX;
use crate::errors::Result;

/// Occurrence counter over the extended code-point space. Indices
/// `0..=CP_MAX` are code points, `CP_MAX + 1` is BOS, and the tail above
/// it holds one slot per part-of-speech context in order of first
/// appearance.
pub struct CodeCounter {
    counts: Vec<(u64, usize)>,
}

impl Default for CodeCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeCounter {
    pub fn new() -> Self {
        // One extra tail slot so the context of the built-in unknown
        // record exists even before any pattern is read.
        Self {
            counts: (0..CP_MAX + 3).map(|u| (0, u)).collect(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Adds `weight` occurrences of the symbol at `index`.
    #[inline(always)]
    pub fn add(&mut self, index: usize, weight: u64) {
        self.counts[index].0 += weight;
    }

    /// Grows the POS tail when `fi` is a newly assigned context id.
    /// Context ids are handed out sequentially by the interner, so a new
    /// one always lands exactly one past the current tail.
    pub fn extend_context(&mut self, fi: usize) {
        if fi + CP_MAX == self.counts.len() {
            self.counts.push((0, fi + CP_MAX));
        }
    }

    /// Assigns symbol ids in decreasing count order (ties resolved on the
    /// index) and returns the full `c2i` table. Symbols that never
    /// occurred keep id 0.
    pub fn into_sids(mut self) -> Result<Vec<u16>> {
        let full_len = self.counts.len();
        self.counts[1..].sort_unstable_by(|a, b| b.cmp(a));
        let mut c2i = vec![0; full_len];
        for (i, &(count, index)) in self.counts.iter().enumerate().skip(1) {
            if count == 0 {
                break;
            }
            c2i[index] = u16::try_from(i)?;
        }
        Ok(c2i)
    }
}
