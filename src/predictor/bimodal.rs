//! Direct-mapped bimodal predictor

use crate::counter::sat_update;
use crate::counter::votes_taken;

/// Table of saturating counters indexed by `pc mod size`
#[derive(Clone, Debug)]
pub struct BimodalPredictor {
    counters: Vec<u8>,
    max: u8,
}

impl BimodalPredictor {
    pub fn new(idx_length: usize, max: u8, init: u8) -> Self {
        Self {
            counters: vec![init; 1 << idx_length],
            max,
        }
    }

    pub fn index(&self, pc: u32) -> usize {
        (pc as usize) % self.counters.len()
    }

    pub fn counter(&self, pc: u32) -> u8 {
        self.counters[self.index(pc)]
    }

    pub fn predict(&self, pc: u32) -> bool {
        votes_taken(self.counter(pc), self.max)
    }

    /// Trains the counter for `pc`
    ///
    /// On an overall mispredict the counter always moves toward the
    /// resolved direction. Otherwise it is only reinforced when its own
    /// vote already matched.
    pub fn update(&mut self, pc: u32, resolved: bool, mispredicted: bool) {
        let index = self.index(pc);
        let counter = self.counters[index];
        if mispredicted || votes_taken(counter, self.max) == resolved {
            self.counters[index] = sat_update(counter, self.max, resolved);
        }
    }

    pub fn num_entries(&self) -> usize {
        self.counters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_vote() {
        let bimodal = BimodalPredictor::new(15, 3, 2);
        assert_eq!(bimodal.num_entries(), 1 << 15);
        assert!(bimodal.predict(0));
        assert!(bimodal.predict(u32::MAX));

        let weak = BimodalPredictor::new(4, 3, 1);
        assert!(!weak.predict(3));
    }

    #[test]
    fn test_aliasing_by_modulo() {
        let mut bimodal = BimodalPredictor::new(4, 3, 2);
        bimodal.update(0x3, false, true);
        assert_eq!(bimodal.counter(0x13), 1);
        assert_eq!(bimodal.counter(0x4), 2);
    }

    #[test]
    fn test_mispredict_always_trains() {
        let mut bimodal = BimodalPredictor::new(4, 3, 2);
        // The counter votes taken, the resolved direction is not-taken
        bimodal.update(5, false, true);
        assert_eq!(bimodal.counter(5), 1);
        bimodal.update(5, true, true);
        assert_eq!(bimodal.counter(5), 2);
    }

    #[test]
    fn test_correct_overall_only_reinforces_agreeing_vote() {
        let mut bimodal = BimodalPredictor::new(4, 3, 2);
        // Overall prediction was right but bimodal voted taken
        bimodal.update(5, false, false);
        assert_eq!(bimodal.counter(5), 2);

        bimodal.update(5, true, false);
        assert_eq!(bimodal.counter(5), 3);
        bimodal.update(5, true, false);
        assert_eq!(bimodal.counter(5), 3);
    }
}
