//! Two-bank skewed predictor (e-gskew / e-pskew)
//!
//! Both banks are addressed from the same folded (address, history)
//! vector through different skewing functions. The prediction is the
//! majority of the two bank votes and the bimodal vote.

use super::skew::SkewFields;
use crate::counter::sat_update;
use crate::counter::votes_taken;

/// Positions of one branch in the two banks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BankIndices {
    pub first: usize,
    pub second: usize,
}

impl BankIndices {
    pub fn at_width(fields: &SkewFields, idx_length: usize) -> Self {
        let n = idx_length as u32;
        Self {
            first: fields.first_bank(n),
            second: fields.second_bank(n),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SkewedPredictor {
    first: Vec<u8>,
    second: Vec<u8>,
    idx_length: usize,
    max: u8,
}

impl SkewedPredictor {
    pub fn new(idx_length: usize, max: u8, init: u8) -> Self {
        Self {
            first: vec![init; 1 << idx_length],
            second: vec![init; 1 << idx_length],
            idx_length,
            max,
        }
    }

    /// Bank positions at this predictor's own index width
    pub fn indices(&self, fields: &SkewFields) -> BankIndices {
        BankIndices::at_width(fields, self.idx_length)
    }

    pub fn counters(&self, at: BankIndices) -> (u8, u8) {
        (self.first[at.first], self.second[at.second])
    }

    /// Majority of the two bank votes and `bimodal_vote`
    pub fn predict(&self, at: BankIndices, bimodal_vote: bool) -> bool {
        let (first, second) = self.counters(at);
        let votes = votes_taken(first, self.max) as u32
            + votes_taken(second, self.max) as u32
            + bimodal_vote as u32;
        votes >= 2
    }

    /// Trains both banks at `at`
    ///
    /// When `prediction` was wrong both banks move toward `resolved`.
    /// When it was right only the banks that voted for `resolved` are
    /// reinforced; a dissenting bank keeps its counter.
    pub fn update(
        &mut self,
        at: BankIndices,
        prediction: bool,
        resolved: bool,
    ) {
        let (first, second) = self.counters(at);
        let train_all = prediction != resolved;

        if train_all || votes_taken(first, self.max) == resolved {
            self.first[at.first] = sat_update(first, self.max, resolved);
        }
        if train_all || votes_taken(second, self.max) == resolved {
            self.second[at.second] = sat_update(second, self.max, resolved);
        }
    }

    pub fn num_entries(&self) -> usize {
        self.first.len() + self.second.len()
    }

    #[cfg(test)]
    pub(crate) fn set_counters(
        &mut self,
        at: BankIndices,
        first: u8,
        second: u8,
    ) {
        self.first[at.first] = first;
        self.second[at.second] = second;
    }
}
