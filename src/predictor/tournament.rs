//! Tournament selectors
//!
//! Each entry is a saturating counter choosing between a primary and an
//! alternate predictor. Counters at or below `max / 2` select the primary.

use crate::counter::sat_decrement;
use crate::counter::sat_increment;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    Primary,
    Alternate,
}

#[derive(Clone, Debug)]
pub struct TournamentSelector {
    counters: Vec<u8>,
    max: u8,
}

impl TournamentSelector {
    pub fn new(idx_length: usize, max: u8, init: u8) -> Self {
        Self {
            counters: vec![init; 1 << idx_length],
            max,
        }
    }

    /// Direct-mapped index, `pc mod size`
    pub fn direct_index(&self, pc: u32) -> usize {
        (pc as usize) % self.counters.len()
    }

    pub fn select(&self, index: usize) -> Selection {
        if self.counters[index] <= self.max / 2 {
            Selection::Primary
        } else {
            Selection::Alternate
        }
    }

    /// Moves the entry toward whichever side was correct
    pub fn train(&mut self, index: usize, winner: Selection) {
        let counter = self.counters[index];
        self.counters[index] = match winner {
            Selection::Primary => sat_decrement(counter),
            Selection::Alternate => sat_increment(counter, self.max),
        };
    }

    pub fn num_entries(&self) -> usize {
        self.counters.len()
    }

    #[cfg(test)]
    pub(crate) fn counter(&self, index: usize) -> u8 {
        self.counters[index]
    }

    #[cfg(test)]
    pub(crate) fn set_counter(&mut self, index: usize, value: u8) {
        self.counters[index] = value;
    }
}
